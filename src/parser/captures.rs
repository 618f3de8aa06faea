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

use std::collections::BTreeMap;

use serde::Serialize;

/// One named piece of a parsed statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Capture {
    /// A single lexeme, e.g. an operand or a type name.
    Single(String),

    /// A `+flag` that was reached.
    Flag(bool),

    /// The captures of a named sub-rule.
    Nested(Captures),

    /// One capture map per match of a repeated sub-rule.
    Repeated(Vec<Captures>),
}

/// Capture name → capture, as produced by matching a statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Captures(BTreeMap<String, Capture>);

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, capture: Capture) {
        self.0.insert(name.into(), capture);
    }

    /// Adds every capture of `other`, overwriting on name clashes.
    pub fn merge(&mut self, other: Captures) {
        self.0.extend(other.0);
    }

    pub fn get(&self, name: &str) -> Option<&Capture> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Capture)> {
        self.0.iter().map(|(name, capture)| (name.as_str(), capture))
    }

    /// The lexeme bound to `name`, if it is a single capture.
    pub fn single(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(Capture::Single(lexeme)) => Some(lexeme),
            _ => None,
        }
    }

    /// Whether the flag `name` was set.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(Capture::Flag(true)))
    }

    pub fn nested(&self, name: &str) -> Option<&Captures> {
        match self.0.get(name) {
            Some(Capture::Nested(captures)) => Some(captures),
            _ => None,
        }
    }

    /// The matches of a repeated sub-rule; empty when there were none.
    pub fn repeated(&self, name: &str) -> &[Captures] {
        match self.0.get(name) {
            Some(Capture::Repeated(list)) => list,
            _ => &[],
        }
    }
}

impl<const N: usize> From<[(&str, Capture); N]> for Captures {
    fn from(items: [(&str, Capture); N]) -> Self {
        let mut captures = Captures::new();
        for (name, capture) in items {
            captures.insert(name, capture);
        }
        captures
    }
}
