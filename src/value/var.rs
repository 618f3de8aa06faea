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

use std::fmt;

use crate::error::{AbapError, ErrorKind, Result};
use crate::value::data::Value;
use crate::value::types::Type;

/// A named binding created by a declaration.
///
/// The stored value always has the variable's declared type; every write
/// goes through `Type::convert`.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: Type,
    value: Value,

    /// Declared with `CONSTANTS`.
    pub constant: bool,
}

impl Var {
    /// Creates a variable holding `value`, or the type's initial value.
    ///
    /// # Errors
    /// Whatever converting `value` to `ty` raises.
    pub fn new(name: &str, ty: Type, value: Option<&Value>) -> Result<Self> {
        let value = match value {
            Some(value) => ty.convert(value, true)?,
            None => ty.initial(),
        };

        Ok(Self {
            name: name.to_lowercase(),
            ty,
            value,
            constant: false,
        })
    }

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    pub fn get(&self) -> &Value {
        &self.value
    }

    /// Assigns a new value. Whole records cannot be assigned.
    pub fn set(&mut self, value: &Value) -> Result<()> {
        self.check_writable()?;
        self.value = self.ty.convert(value, false)?;
        Ok(())
    }

    /// Resets to the initial value of the declared type.
    pub fn clear(&mut self) -> Result<()> {
        self.check_writable()?;
        self.value = self.ty.initial();
        Ok(())
    }

    /// Mutable access for field writes.
    pub fn value_mut(&mut self) -> Result<&mut Value> {
        self.check_writable()?;
        Ok(&mut self.value)
    }

    fn check_writable(&self) -> Result<()> {
        if self.constant {
            return Err(AbapError::new(
                ErrorKind::ReadOnlyVariable,
                format!("'{}' is a constant", self.name),
            ));
        }
        Ok(())
    }
}

/// `name(length) TYPE type VALUE value`, the length only for fixed-length types.
impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(length) = self.ty.length {
            write!(f, "({})", length)?;
        }
        write!(f, " TYPE {} VALUE {}", self.ty, self.value)
    }
}
