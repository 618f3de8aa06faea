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

use crate::error::{AbapError, ErrorKind, Result};
use crate::interpreter::environment::{Environment, SYSTEM_NAME};
use crate::interpreter::Runner;
use crate::lexer::token::{is_char_literal, is_string_literal, literal_text};
use crate::value::{Value, Var};

/// Separates a variable from its record fields: `addr-zip-code`.
pub const FIELD_SEPARATOR: char = '-';

/* ============================================================================
 * References
 * ============================================================================
 */

/// An assignable target: a whole variable, or one field inside a record
/// variable.
///
/// Both variants read and write through the environment, so assignment
/// does not care which one it was handed.
#[derive(Debug, Clone, PartialEq)]
pub enum Ref {
    Var(String),

    Field {
        var: String,
        /// Records walked through before reaching `field`.
        path: Vec<String>,
        field: String,
    },
}

impl Ref {
    pub fn get(&self, env: &Environment) -> Result<Value> {
        match self {
            Ref::Var(name) => Ok(lookup(env, name)?.get().clone()),
            Ref::Field { var, path, field } => {
                let mut container = lookup(env, var)?.get();
                for name in path {
                    container = container.get_field(name)?;
                }
                Ok(container.get_field(field)?.clone())
            }
        }
    }

    /// Stores `value`, converted to the target's declared type.
    pub fn set(&self, env: &mut Environment, value: &Value) -> Result<()> {
        match self {
            Ref::Var(name) => lookup_mut(env, name)?.set(value),
            Ref::Field { var, path, field } => {
                let mut container = lookup_mut(env, var)?.value_mut()?;
                for name in path {
                    container = container.get_field_mut(name)?;
                }
                container.set_field(field, value, false)
            }
        }
    }

    /// Resets the target to its type's initial value.
    pub fn clear(&self, env: &mut Environment) -> Result<()> {
        match self {
            Ref::Var(name) => lookup_mut(env, name)?.clear(),
            Ref::Field { var, path, field } => {
                let mut container = lookup_mut(env, var)?.value_mut()?;
                for name in path {
                    container = container.get_field_mut(name)?;
                }
                let initial = container.get_field(field)?.ty.initial();
                container.set_field(field, &initial, true)
            }
        }
    }
}

fn lookup<'a>(env: &'a Environment, name: &str) -> Result<&'a Var> {
    env.get(name).ok_or_else(|| undefined(name))
}

fn lookup_mut<'a>(env: &'a mut Environment, name: &str) -> Result<&'a mut Var> {
    env.get_mut(name).ok_or_else(|| undefined(name))
}

fn undefined(name: &str) -> AbapError {
    AbapError::new(
        ErrorKind::UndefinedVariable,
        format!("'{}' is not declared", name),
    )
}

/// `-?[0-9]+`
fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/* ============================================================================
 * Operand Resolution
 * ============================================================================
 */

impl Runner {
    /// Resolves an operand lexeme to a value.
    ///
    /// - `'text'` → `c`, trailing blanks removed
    /// - `` `text` `` → `string`, kept exactly
    /// - `-?digits` → `i`
    /// - anything else → a variable, optionally followed by `-field` parts
    pub fn parse_value(&self, text: &str) -> Result<Value> {
        if let Some(literal) = literal_text(text) {
            if is_char_literal(text) {
                return Ok(Value::char(literal.trim_end()));
            }
            if is_string_literal(text) {
                return Ok(Value::string(literal));
            }
        }

        if is_integer(text) {
            let number = text.parse::<i64>().map_err(|_| {
                AbapError::new(
                    ErrorKind::Arithmetic,
                    format!("number {} is out of range", text),
                )
            })?;
            return Ok(Value::integer(number));
        }

        let mut parts = text.split(FIELD_SEPARATOR);
        let root = parts.next().unwrap_or_default().to_lowercase();

        let mut value = if root == SYSTEM_NAME {
            self.system_value()?
        } else {
            lookup(&self.environment, &root)?.get().clone()
        };

        for field in parts {
            value = value.get_field(&field.to_lowercase())?.clone();
        }

        Ok(value)
    }

    /// Resolves a destination lexeme to a reference.
    ///
    /// # Errors
    /// - `ReadOnlyVariable` for literals and the system record
    /// - `UndefinedVariable` if the variable is not declared
    pub fn parse_ref(&self, text: &str) -> Result<Ref> {
        if literal_text(text).is_some() || is_integer(text) {
            return Err(AbapError::new(
                ErrorKind::ReadOnlyVariable,
                format!("cannot assign to literal {}", text),
            ));
        }

        let mut parts: Vec<String> = text
            .split(FIELD_SEPARATOR)
            .map(|part| part.to_lowercase())
            .collect();
        let var = parts.remove(0);

        if var == SYSTEM_NAME {
            return Err(AbapError::new(
                ErrorKind::ReadOnlyVariable,
                format!("cannot assign to system field {}", text),
            ));
        }
        lookup(&self.environment, &var)?;

        Ok(match parts.pop() {
            None => Ref::Var(var),
            Some(field) => Ref::Field {
                var,
                path: parts,
                field,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::RunnerConfig;
    use crate::value::{BaseType, Type};

    fn runner() -> Runner {
        let mut runner = Runner::new(RunnerConfig::default());

        let mut zip = Type::record();
        zip.add_field("code", Type::new(BaseType::N, Some(5)).unwrap()).unwrap();
        let mut addr = Type::record();
        addr.add_field("city", Type::string()).unwrap();
        addr.add_field("zip", zip).unwrap();

        runner.environment.define(Var::new("addr", addr, None).unwrap()).unwrap();
        runner
            .environment
            .define(Var::new("n", Type::integer(), Some(&Value::integer(4))).unwrap())
            .unwrap();
        runner
    }

    #[test]
    fn literals() {
        let runner = runner();
        assert_eq!(runner.parse_value("'ab  ").unwrap(), Value::char("ab"));
        assert_eq!(runner.parse_value("`ab  ").unwrap(), Value::string("ab  "));
        assert_eq!(runner.parse_value("-12").unwrap(), Value::integer(-12));

        let err = runner.parse_value("99999999999999999999").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Arithmetic);
    }

    #[test]
    fn variables_and_fields() {
        let runner = runner();
        assert_eq!(runner.parse_value("n").unwrap(), Value::integer(4));
        assert_eq!(runner.parse_value("addr-zip-code").unwrap().to_text(false), "00000");

        assert_eq!(runner.parse_value("nope").unwrap_err().kind, ErrorKind::UndefinedVariable);
        assert_eq!(runner.parse_value("addr-street").unwrap_err().kind, ErrorKind::UnknownField);
        assert_eq!(runner.parse_value("n-x").unwrap_err().kind, ErrorKind::IncompatibleTypes);
    }

    #[test]
    fn references_write_through() {
        let mut runner = runner();

        let code = runner.parse_ref("addr-zip-code").unwrap();
        assert_eq!(
            code,
            Ref::Field {
                var: "addr".into(),
                path: vec!["zip".into()],
                field: "code".into(),
            }
        );
        code.set(&mut runner.environment, &Value::integer(42)).unwrap();
        assert_eq!(code.get(&runner.environment).unwrap().to_text(false), "00042");

        code.clear(&mut runner.environment).unwrap();
        assert!(code.get(&runner.environment).unwrap().is_initial());

        let n = runner.parse_ref("n").unwrap();
        n.set(&mut runner.environment, &Value::integer(9)).unwrap();
        assert_eq!(runner.parse_value("n").unwrap(), Value::integer(9));
    }

    #[test]
    fn read_only_targets() {
        let runner = runner();
        for target in ["'x", "5", "sy-datum"] {
            assert_eq!(runner.parse_ref(target).unwrap_err().kind, ErrorKind::ReadOnlyVariable);
        }
        assert_eq!(runner.parse_ref("ghost").unwrap_err().kind, ErrorKind::UndefinedVariable);
    }

    #[test]
    fn system_fields_are_readable() {
        let runner = runner();
        assert_eq!(runner.parse_value("sy-linsz").unwrap(), Value::integer(40));
        assert_eq!(runner.parse_value("sy-index").unwrap(), Value::integer(0));
        assert_eq!(runner.parse_value("sy-datum").unwrap().get_length(), 8);
    }
}
