/*
 * =============================================================================
 *  ABAPX - Reports with Claws!
 * =============================================================================
 *
 *  File:     types.rs
 *  Purpose:  Base types, length rules and value conversion.
 *
 *  Author:   Sam Wilcox
 *  Email:    sam@pawx-lang.com
 *  Website:  https://www.pawx-lang.com
 *  GitHub:   https://github.com/samwilcox/abapx
 *
 * -----------------------------------------------------------------------------
 *  License:
 * -----------------------------------------------------------------------------
 *  This file is part of the ABAPX report interpreter project.
 *
 *  ABAPX is dual-licensed under the terms of:
 *    - The MIT License
 *    - The Apache License, Version 2.0
 *
 *  You may choose either license to govern your use of this software.
 *
 *  Full license text available at:
 *      https://license.pawx-lang.com
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under these licenses is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * =============================================================================
 */

use std::fmt;

use crate::error::{AbapError, ErrorKind, Result};
use crate::value::data::Value;

/* ============================================================================
 * Base Types
 * ============================================================================
 */

/// The elementary category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// Fixed-length character text.
    C,
    /// Numeric text.
    N,
    /// Date, `YYYYMMDD`.
    D,
    /// Time, `HHMMSS`.
    T,
    /// Hexadecimal bytes.
    X,
    I,
    /// Packed decimal.
    P,
    F,
    String,
    XString,
    Struct,
}

impl BaseType {
    /// Looks up a type name as written in a program (case-insensitive).
    ///
    /// `struct` is not a name a program can write; records are declared
    /// with `BEGIN OF`.
    pub fn parse(name: &str) -> Option<Self> {
        let base = match name.to_lowercase().as_str() {
            "c" => BaseType::C,
            "n" => BaseType::N,
            "d" => BaseType::D,
            "t" => BaseType::T,
            "x" => BaseType::X,
            "i" => BaseType::I,
            "p" => BaseType::P,
            "f" => BaseType::F,
            "string" => BaseType::String,
            "xstring" => BaseType::XString,
            _ => return None,
        };
        Some(base)
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseType::C => "c",
            BaseType::N => "n",
            BaseType::D => "d",
            BaseType::T => "t",
            BaseType::X => "x",
            BaseType::I => "i",
            BaseType::P => "p",
            BaseType::F => "f",
            BaseType::String => "string",
            BaseType::XString => "xstring",
            BaseType::Struct => "struct",
        }
    }

    /// Types that must carry a length.
    pub fn is_fixed_length(self) -> bool {
        matches!(self, BaseType::X | BaseType::C | BaseType::N | BaseType::P)
    }

    pub fn default_length(self) -> Option<usize> {
        match self {
            BaseType::C | BaseType::N => Some(1),
            _ => None,
        }
    }

    pub fn forced_length(self) -> Option<usize> {
        match self {
            BaseType::D => Some(8),
            BaseType::T => Some(6),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, BaseType::N | BaseType::I | BaseType::F | BaseType::P)
    }

    pub fn is_textual(self) -> bool {
        matches!(
            self,
            BaseType::C | BaseType::D | BaseType::T | BaseType::String | BaseType::XString
        )
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/* ============================================================================
 * Types
 * ============================================================================
 */

/// A base type plus its length and, for records, its ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub base: BaseType,
    pub length: Option<usize>,
    fields: Vec<(String, Type)>,
}

impl Type {
    /// Creates an elementary or (empty) record type, applying length rules:
    ///
    /// - `c` and `n` default to length 1
    /// - `x`, `c`, `n` and `p` require a length
    /// - `d` and `t` always have length 8 and 6
    /// - every other type forbids a length
    ///
    /// # Errors
    /// `InvalidType` when the length breaks one of these rules.
    pub fn new(base: BaseType, length: Option<usize>) -> Result<Self> {
        let length = match (base.forced_length(), length) {
            (Some(forced), None) => Some(forced),
            (Some(forced), Some(given)) if given == forced => Some(forced),
            (Some(forced), Some(given)) => {
                return Err(AbapError::new(
                    ErrorKind::InvalidType,
                    format!("type {} has length {}, not {}", base, forced, given),
                ));
            }
            (None, given) => {
                let length = given.or_else(|| base.default_length());

                if length.is_some() != base.is_fixed_length() {
                    let message = if base.is_fixed_length() {
                        format!("type {} needs a length", base)
                    } else {
                        format!("type {} cannot have a length", base)
                    };
                    return Err(AbapError::new(ErrorKind::InvalidType, message));
                }

                if length == Some(0) {
                    return Err(AbapError::new(
                        ErrorKind::InvalidType,
                        format!("type {} cannot have length 0", base),
                    ));
                }

                length
            }
        };

        Ok(Self {
            base,
            length,
            fields: Vec::new(),
        })
    }

    /// An empty record type; fields are added with `add_field`.
    pub fn record() -> Self {
        Self {
            base: BaseType::Struct,
            length: None,
            fields: Vec::new(),
        }
    }

    pub fn integer() -> Self {
        Self::variable(BaseType::I)
    }

    pub fn float() -> Self {
        Self::variable(BaseType::F)
    }

    pub fn string() -> Self {
        Self::variable(BaseType::String)
    }

    /// `c` of the given length (at least 1).
    pub fn char(length: usize) -> Self {
        Self {
            base: BaseType::C,
            length: Some(length.max(1)),
            fields: Vec::new(),
        }
    }

    pub fn date() -> Self {
        Self {
            base: BaseType::D,
            length: Some(8),
            fields: Vec::new(),
        }
    }

    pub fn time() -> Self {
        Self {
            base: BaseType::T,
            length: Some(6),
            fields: Vec::new(),
        }
    }

    fn variable(base: BaseType) -> Self {
        Self {
            base,
            length: None,
            fields: Vec::new(),
        }
    }

    /// Appends a field to a record type.
    ///
    /// # Errors
    /// - `DuplicateField` if the record already has a field of that name
    /// - `InvalidType` if this is not a record type
    pub fn add_field(&mut self, name: impl Into<String>, ty: Type) -> Result<()> {
        let name = name.into().to_lowercase();

        if !self.is_struct() {
            return Err(AbapError::new(
                ErrorKind::InvalidType,
                format!("cannot add field '{}' to type {}", name, self),
            ));
        }

        if self.field(&name).is_some() {
            return Err(AbapError::new(
                ErrorKind::DuplicateField,
                format!("field '{}' is already declared", name),
            ));
        }

        self.fields.push((name, ty));
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }

    pub fn fields(&self) -> &[(String, Type)] {
        &self.fields
    }

    pub fn is_struct(&self) -> bool {
        self.base == BaseType::Struct
    }

    pub fn is_numeric(&self) -> bool {
        self.base.is_numeric()
    }

    pub fn is_textual(&self) -> bool {
        self.base.is_textual()
    }

    /// The value for which `IS INITIAL` holds.
    pub fn initial(&self) -> Value {
        Value::initial(self)
    }

    /// Converts `value` so it can be stored in a container of this type.
    ///
    /// Numeric to numeric and textual to textual re-tag the payload; any
    /// other pairing needs identical base types. Record targets need an
    /// identical record type, and only when `allow_structs` is set.
    ///
    /// # Errors
    /// - `StructConversionNotAllowed` for a record target without `allow_structs`
    /// - `LengthOverflow` when the value is longer than this type's length
    /// - `IncompatibleTypes` when the base types cannot be converted
    pub fn convert(&self, value: &Value, allow_structs: bool) -> Result<Value> {
        if self.is_struct() {
            if !allow_structs {
                return Err(AbapError::new(
                    ErrorKind::StructConversionNotAllowed,
                    format!("cannot convert {} to {}", value, self),
                ));
            }
            if value.ty != *self {
                return Err(AbapError::new(
                    ErrorKind::IncompatibleTypes,
                    format!("cannot convert {} to {}", value.ty, self),
                ));
            }
            return Ok(value.clone());
        }

        if let Some(length) = self.length {
            let actual = value.get_length();
            if actual > length {
                return Err(AbapError::new(
                    ErrorKind::LengthOverflow,
                    format!("{} has length {}, which does not fit {}({})", value, actual, self, length),
                ));
            }
        }

        if (self.is_numeric() && value.is_numeric()) || (self.is_textual() && value.is_textual()) {
            return value.retag(self);
        }

        if self.base != value.ty.base {
            return Err(AbapError::new(
                ErrorKind::IncompatibleTypes,
                format!("cannot convert {} of type {} to type {}", value, value.ty, self),
            ));
        }

        value.retag(self)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_struct() {
            return write!(f, "{}", self.base);
        }

        f.write_str("BEGIN ")?;
        for (name, ty) in &self.fields {
            write!(f, "{} TYPE {}, ", name, ty)?;
        }
        f.write_str("END")
    }
}
