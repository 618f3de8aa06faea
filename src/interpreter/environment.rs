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

use std::collections::HashMap;

use serde_json::Map;

use crate::error::{AbapError, ErrorKind, Result};
use crate::value::{Type, Var};

/// Name of the read-only system record.
pub const SYSTEM_NAME: &str = "sy";

/// Every variable and named type a run has declared.
///
/// Variables keep their declaration order so dumps read top to bottom like
/// the program. Nothing is ever removed during a run.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Vec<Var>,
    index: HashMap<String, usize>,
    types: HashMap<String, Type>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable.
    ///
    /// # Errors
    /// `DuplicateDeclaration` if the name is taken, or is the system record.
    pub fn define(&mut self, var: Var) -> Result<()> {
        if var.name == SYSTEM_NAME || self.index.contains_key(&var.name) {
            return Err(AbapError::new(
                ErrorKind::DuplicateDeclaration,
                format!("'{}' is already declared", var.name),
            ));
        }

        self.index.insert(var.name.clone(), self.vars.len());
        self.vars.push(var);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Var> {
        self.index.get(&name.to_lowercase()).map(|&i| &self.vars[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Var> {
        match self.index.get(&name.to_lowercase()) {
            Some(&i) => self.vars.get_mut(i),
            None => None,
        }
    }

    /// Registers a named type from a `TYPES` declaration.
    pub fn define_type(&mut self, name: &str, ty: Type) -> Result<()> {
        let name = name.to_lowercase();
        if self.types.contains_key(&name) {
            return Err(AbapError::new(
                ErrorKind::DuplicateDeclaration,
                format!("type '{}' is already declared", name),
            ));
        }
        self.types.insert(name, ty);
        Ok(())
    }

    pub fn lookup_type(&self, name: &str) -> Option<&Type> {
        self.types.get(&name.to_lowercase())
    }

    /// Variables in declaration order.
    pub fn vars(&self) -> impl Iterator<Item = &Var> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// One `name(length) TYPE type VALUE value` line per variable.
    pub fn dump(&self) -> String {
        self.vars.iter().map(|var| format!("{}\n", var)).collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map: Map<String, serde_json::Value> = self
            .vars
            .iter()
            .map(|var| (var.name.clone(), var.get().to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}
