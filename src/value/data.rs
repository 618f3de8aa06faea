/*
 * ==========================================================================
 * ABAPX - Reports with Claws!
 * ==========================================================================
 * 
 * Author:   Sam Wilcox
 * Email:    sam@pawx-lang.com
 * Website:  https://www.pawx-lang.com
 * Github:   https://github.com/samwilcox/abapx
 * 
 * License:
 * This file is part of the ABAPX report interpreter project.
 * 
 * ABAPX is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 * 
 * You may choose either license to govern your use of this software.
 * Full license text available at:
 *    https://license.pawx-lang.com
 * 
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * 
 * ==========================================================================
 */

use std::cmp::Ordering;
use std::fmt;

use serde_json::json;

use crate::error::{AbapError, ErrorKind, Result};
use crate::value::types::{BaseType, Type};

/// Payload of a value. Which variant is used follows from the type:
///
/// - `i`, `n`, `p` → `Number`
/// - `f` → `Float`
/// - textual types and `x` → `Text`
/// - records → `Struct`, one entry per field, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Number(i64),
    Float(f64),
    Text(String),
    Struct(Vec<(String, Value)>),
}

/// A typed runtime value.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub ty: Type,
    pub data: Data,
}

/// The four arithmetic statements plus `DIV` and `MOD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntDivide,
    Modulo,
}

impl ArithOp {
    /// Maps an operator lexeme (`+ - * / div mod`) to an operation.
    pub fn parse(symbol: &str) -> Option<Self> {
        let op = match symbol.to_lowercase().as_str() {
            "+" => ArithOp::Add,
            "-" => ArithOp::Subtract,
            "*" => ArithOp::Multiply,
            "/" => ArithOp::Divide,
            "div" => ArithOp::IntDivide,
            "mod" => ArithOp::Modulo,
            _ => return None,
        };
        Some(op)
    }

    fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Subtract => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
            ArithOp::IntDivide => "DIV",
            ArithOp::Modulo => "MOD",
        }
    }
}

impl Value {
    /* ------------------------------------------------------------------------
     * Construction
     * --------------------------------------------------------------------- */

    /// The initial value of a type: zero, blank text, `00000000` for dates,
    /// `000000` for times, `00` per byte for hex, and records field by field.
    pub fn initial(ty: &Type) -> Self {
        let data = match ty.base {
            BaseType::I | BaseType::N | BaseType::P => Data::Number(0),
            BaseType::F => Data::Float(0.0),
            BaseType::C | BaseType::String | BaseType::XString => Data::Text(String::new()),
            BaseType::D => Data::Text("0".repeat(8)),
            BaseType::T => Data::Text("0".repeat(6)),
            BaseType::X => Data::Text("00".repeat(ty.length.unwrap_or(1))),
            BaseType::Struct => Data::Struct(
                ty.fields()
                    .iter()
                    .map(|(name, field)| (name.clone(), Value::initial(field)))
                    .collect(),
            ),
        };

        Self {
            ty: ty.clone(),
            data,
        }
    }

    pub fn integer(number: i64) -> Self {
        Self {
            ty: Type::integer(),
            data: Data::Number(number),
        }
    }

    pub fn float(number: f64) -> Self {
        Self {
            ty: Type::float(),
            data: Data::Float(number),
        }
    }

    /// A `c` value exactly as long as its text (at least 1).
    pub fn char(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            ty: Type::char(text.chars().count()),
            data: Data::Text(text),
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self {
            ty: Type::string(),
            data: Data::Text(text.into()),
        }
    }

    pub fn date(text: impl Into<String>) -> Self {
        Self {
            ty: Type::date(),
            data: Data::Text(text.into()),
        }
    }

    pub fn time(text: impl Into<String>) -> Self {
        Self {
            ty: Type::time(),
            data: Data::Text(text.into()),
        }
    }

    /// Builds a record value whose type is derived from the given fields.
    pub fn record(items: Vec<(String, Value)>) -> Result<Self> {
        let mut ty = Type::record();
        for (name, value) in &items {
            ty.add_field(name.as_str(), value.ty.clone())?;
        }

        Ok(Self {
            ty,
            data: Data::Struct(items),
        })
    }

    /// The same payload under another type of the same family.
    ///
    /// # Errors
    /// `Arithmetic` when a float headed for an integer payload is not
    /// finite or does not fit an `i64` once rounded.
    pub(crate) fn retag(&self, ty: &Type) -> Result<Self> {
        let data = match (&self.data, ty.base) {
            (Data::Number(n), BaseType::F) => Data::Float(*n as f64),
            (Data::Float(f), base) if base != BaseType::F && base.is_numeric() => {
                Data::Number(float_to_integer(*f, ty)?)
            }
            (data, _) => data.clone(),
        };

        Ok(Self {
            ty: ty.clone(),
            data,
        })
    }

    /* ------------------------------------------------------------------------
     * Inspection
     * --------------------------------------------------------------------- */

    pub fn is_numeric(&self) -> bool {
        self.ty.is_numeric()
    }

    pub fn is_textual(&self) -> bool {
        self.ty.is_textual()
    }

    pub fn is_struct(&self) -> bool {
        self.ty.is_struct()
    }

    pub fn is_initial(&self) -> bool {
        *self == Value::initial(&self.ty)
    }

    /// The type's length when it has one, otherwise the natural length of
    /// the payload: digits for numbers, characters for text.
    pub fn get_length(&self) -> usize {
        if let Some(length) = self.ty.length {
            return length;
        }

        match &self.data {
            Data::Number(n) => n.to_string().len(),
            Data::Float(f) => f.to_string().len(),
            Data::Text(text) => text.chars().count(),
            Data::Struct(fields) => fields.iter().map(|(_, value)| value.get_length()).sum(),
        }
    }

    /// The payload as text, without padding.
    pub fn as_text(&self) -> String {
        match &self.data {
            Data::Number(n) => n.to_string(),
            Data::Float(f) => f.to_string(),
            Data::Text(text) => text.clone(),
            Data::Struct(fields) => fields
                .iter()
                .map(|(_, value)| value.as_text())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self.data {
            Data::Number(n) => Some(n as f64),
            Data::Float(f) => Some(f),
            _ => None,
        }
    }

    /* ------------------------------------------------------------------------
     * Record Fields
     * --------------------------------------------------------------------- */

    /// # Errors
    /// - `IncompatibleTypes` if this is not a record
    /// - `UnknownField` if the record has no such field
    pub fn get_field(&self, name: &str) -> Result<&Value> {
        match &self.data {
            Data::Struct(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value)
                .ok_or_else(|| unknown_field(name, &self.ty)),
            _ => Err(not_a_record(name, self)),
        }
    }

    pub fn get_field_mut(&mut self, name: &str) -> Result<&mut Value> {
        let problem = match &self.data {
            Data::Struct(fields) if fields.iter().any(|(field, _)| field == name) => None,
            Data::Struct(_) => Some(unknown_field(name, &self.ty)),
            _ => Some(not_a_record(name, self)),
        };
        if let Some(error) = problem {
            return Err(error);
        }

        match &mut self.data {
            Data::Struct(fields) => fields
                .iter_mut()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value)
                .ok_or_else(|| AbapError::new(ErrorKind::UnknownField, format!("no field '{}'", name))),
            _ => Err(AbapError::new(
                ErrorKind::IncompatibleTypes,
                format!("cannot access field '{}'", name),
            )),
        }
    }

    /// Stores `value` in a field, converted to the field's declared type.
    pub fn set_field(&mut self, name: &str, value: &Value, allow_structs: bool) -> Result<()> {
        let field_ty = self
            .ty
            .field(name)
            .cloned()
            .ok_or_else(|| unknown_field(name, &self.ty))?;
        let converted = field_ty.convert(value, allow_structs)?;
        *self.get_field_mut(name)? = converted;
        Ok(())
    }

    /* ------------------------------------------------------------------------
     * Comparison
     * --------------------------------------------------------------------- */

    /// Orders two values: numbers numerically, text lexically.
    ///
    /// # Errors
    /// `IncompatibleTypes` for records, or a number against text.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        if self.is_numeric() && other.is_numeric() {
            return match (&self.data, &other.data) {
                (Data::Number(a), Data::Number(b)) => Ok(a.cmp(b)),
                _ => {
                    let (a, b) = (self.as_f64(), other.as_f64());
                    a.partial_cmp(&b).ok_or_else(|| incompatible("compare", self, other))
                }
            };
        }

        let comparable_text = (self.is_textual() && other.is_textual())
            || (!self.is_struct() && self.ty.base == other.ty.base);

        match (&self.data, &other.data) {
            (Data::Text(a), Data::Text(b)) if comparable_text => Ok(a.cmp(b)),
            _ => Err(incompatible("compare", self, other)),
        }
    }

    /// Equality; records compare field by field.
    pub fn equals(&self, other: &Value) -> Result<bool> {
        match (&self.data, &other.data) {
            (Data::Struct(a), Data::Struct(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for ((name_a, value_a), (name_b, value_b)) in a.iter().zip(b) {
                    if name_a != name_b || !value_a.equals(value_b)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(self.compare(other)? == Ordering::Equal),
        }
    }

    /* ------------------------------------------------------------------------
     * Arithmetic
     * --------------------------------------------------------------------- */

    /// Applies `op`. The result has the left operand's type and has to fit
    /// that type's length.
    ///
    /// # Errors
    /// - `IncompatibleTypes` unless both operands are numeric
    /// - `Arithmetic` on division by zero or integer overflow
    /// - `LengthOverflow` when the result is longer than the left type allows
    pub fn arith(&self, op: ArithOp, other: &Value) -> Result<Value> {
        if !self.is_numeric() || !other.is_numeric() {
            return Err(incompatible(op.symbol(), self, other));
        }

        let result = match (&self.data, &other.data) {
            (Data::Number(a), Data::Number(b)) => Value::integer(integer_arith(op, *a, *b)?),
            _ => {
                let a = self.as_f64().unwrap_or_default();
                let b = other.as_f64().unwrap_or_default();
                Value::float(float_arith(op, a, b)?)
            }
        };

        let result = result.retag(&self.ty)?;
        if let Some(length) = self.ty.length {
            let digits = result.as_text().len();
            if digits > length {
                return Err(AbapError::new(
                    ErrorKind::LengthOverflow,
                    format!("result {} does not fit {}({})", result.as_text(), self.ty, length),
                ));
            }
        }
        Ok(result)
    }

    pub fn add(&self, other: &Value) -> Result<Value> {
        self.arith(ArithOp::Add, other)
    }

    pub fn sub(&self, other: &Value) -> Result<Value> {
        self.arith(ArithOp::Subtract, other)
    }

    pub fn mul(&self, other: &Value) -> Result<Value> {
        self.arith(ArithOp::Multiply, other)
    }

    pub fn div(&self, other: &Value) -> Result<Value> {
        self.arith(ArithOp::Divide, other)
    }

    /* ------------------------------------------------------------------------
     * Rendering
     * --------------------------------------------------------------------- */

    /// Text as written to the report. Numbers with a fixed length are
    /// zero-padded on the left unless `no_zero` is set.
    pub fn to_text(&self, no_zero: bool) -> String {
        let text = self.as_text();

        match self.ty.length {
            Some(length) if self.is_numeric() && !no_zero => format!("{:0>width$}", text, width = length),
            _ => text,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match &self.data {
            Data::Number(n) => json!(n),
            Data::Float(f) => json!(f),
            Data::Text(text) => json!(text),
            Data::Struct(fields) => {
                let map = fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Dump format: numbers bare, text quoted, records as
/// `BEGIN a = 1, b = 'x', END`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Data::Number(n) => write!(f, "{}", n),
            Data::Float(x) => write!(f, "{}", x),
            Data::Text(text) => write!(f, "'{}'", text.replace('\'', "''")),
            Data::Struct(fields) => {
                f.write_str("BEGIN ")?;
                for (name, value) in fields {
                    write!(f, "{} = {}, ", name, value)?;
                }
                f.write_str("END")
            }
        }
    }
}

/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn float_to_integer(f: f64, ty: &Type) -> Result<i64> {
    let rounded = f.round();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        return Ok(rounded as i64);
    }
    Err(AbapError::new(
        ErrorKind::Arithmetic,
        format!("{} does not fit type {}", f, ty),
    ))
}

fn integer_arith(op: ArithOp, a: i64, b: i64) -> Result<i64> {
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Subtract => a.checked_sub(b),
        ArithOp::Multiply => a.checked_mul(b),
        ArithOp::Divide | ArithOp::IntDivide => {
            if b == 0 {
                return Err(division_by_zero(a));
            }
            a.checked_div(b)
        }
        ArithOp::Modulo => {
            if b == 0 {
                return Err(division_by_zero(a));
            }
            a.checked_rem_euclid(b)
        }
    };

    result.ok_or_else(|| {
        AbapError::new(
            ErrorKind::Arithmetic,
            format!("{} {} {} overflows", a, op.symbol(), b),
        )
    })
}

fn float_arith(op: ArithOp, a: f64, b: f64) -> Result<f64> {
    if b == 0.0 && matches!(op, ArithOp::Divide | ArithOp::IntDivide | ArithOp::Modulo) {
        return Err(AbapError::new(
            ErrorKind::Arithmetic,
            format!("division of {} by zero", a),
        ));
    }

    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Subtract => a - b,
        ArithOp::Multiply => a * b,
        ArithOp::Divide => a / b,
        ArithOp::IntDivide => (a / b).trunc(),
        ArithOp::Modulo => a.rem_euclid(b),
    };

    if !result.is_finite() {
        return Err(AbapError::new(
            ErrorKind::Arithmetic,
            format!("{} {} {} overflows", a, op.symbol(), b),
        ));
    }
    Ok(result)
}

fn division_by_zero(a: i64) -> AbapError {
    AbapError::new(
        ErrorKind::Arithmetic,
        format!("division of {} by zero", a),
    )
}

fn incompatible(operation: &str, a: &Value, b: &Value) -> AbapError {
    AbapError::new(
        ErrorKind::IncompatibleTypes,
        format!(
            "cannot {} {} of type {} and {} of type {}",
            operation, a, a.ty, b, b.ty
        ),
    )
}

fn unknown_field(name: &str, ty: &Type) -> AbapError {
    AbapError::new(
        ErrorKind::UnknownField,
        format!("no field '{}' in {}", name, ty),
    )
}

fn not_a_record(name: &str, value: &Value) -> AbapError {
    AbapError::new(
        ErrorKind::IncompatibleTypes,
        format!("cannot access field '{}' of {} of type {}", name, value, value.ty),
    )
}
