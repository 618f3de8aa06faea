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

use regex::RegexBuilder;
use tracing::trace;

use crate::error::{AbapError, ErrorKind, Result};
use crate::interpreter::Runner;
use crate::parser::Captures;
use crate::value::Value;

/* ============================================================================
 * Logical Expressions
 * ============================================================================
 */

/// A condition is the capture map of the `cond` rule:
///
///   [NOT] clause [AND | OR | EQUIV cond]
///
/// `NOT` applies to the first clause only; the continuation binds to the
/// right, so `a AND b OR c` reads `a AND (b OR c)`. A condition without any
/// clause (a plain `ELSE`) is true.
impl Runner {
    pub fn eval_bool(&self, cond: &Captures) -> Result<bool> {
        let mut result = if let Some(sub) = cond.nested("sub") {
            self.eval_bool(sub)?
        } else if cond.flag("initial") {
            let value = self.operand(cond, "left")?;
            value.is_initial() != cond.flag("not_initial")
        } else if let Some(op) = cond.single("op") {
            let left = self.operand(cond, "left")?;
            let right = self.operand(cond, "right")?;
            compare(&left, op, &right)?
        } else {
            true
        };

        if cond.flag("negate") {
            result = !result;
        }

        if let Some(next) = cond.nested("next") {
            let rest = self.eval_bool(next)?;
            result = if cond.flag("and") {
                result && rest
            } else if cond.flag("or") {
                result || rest
            } else {
                result == rest
            };
        }

        trace!(?cond, result, "condition");
        Ok(result)
    }

    fn operand(&self, cond: &Captures, name: &str) -> Result<Value> {
        let text = cond.single(name).ok_or_else(|| {
            AbapError::new(
                ErrorKind::GrammarMismatch,
                format!("condition is missing its {} operand", name),
            )
        })?;
        self.parse_value(text)
    }
}

/// Applies a relational or text operator.
///
/// # Errors
/// - `InvalidOperator` for an unknown operator
/// - `IncompatibleTypes` when the operands cannot be compared
pub fn compare(left: &Value, op: &str, right: &Value) -> Result<bool> {
    let result = match op.to_lowercase().as_str() {
        "=" | "eq" => left.equals(right)?,
        "<>" | "ne" => !left.equals(right)?,
        "<" | "lt" => left.compare(right)? == Ordering::Less,
        ">" | "gt" => left.compare(right)? == Ordering::Greater,
        "<=" | "le" => left.compare(right)? != Ordering::Greater,
        ">=" | "ge" => left.compare(right)? != Ordering::Less,

        "co" => contains_only(&text(left)?, &text(right)?),
        "cn" => !contains_only(&text(left)?, &text(right)?),
        "ca" => contains_any(&text(left)?, &text(right)?),
        "na" => !contains_any(&text(left)?, &text(right)?),
        "cs" => contains_string(&text(left)?, &text(right)?),
        "ns" => !contains_string(&text(left)?, &text(right)?),
        "cp" => covers_pattern(&text(left)?, &text(right)?)?,
        "np" => !covers_pattern(&text(left)?, &text(right)?)?,

        other => {
            return Err(AbapError::new(
                ErrorKind::InvalidOperator,
                format!("unknown comparison operator '{}'", other),
            ))
        }
    };

    Ok(result)
}

fn text(value: &Value) -> Result<String> {
    if value.is_struct() {
        return Err(AbapError::new(
            ErrorKind::IncompatibleTypes,
            format!("cannot use record {} as text", value),
        ));
    }
    Ok(value.to_text(false))
}

/// Every character of `left` occurs in `right`.
fn contains_only(left: &str, right: &str) -> bool {
    left.chars().all(|c| right.contains(c))
}

/// Some character of `left` occurs in `right`.
fn contains_any(left: &str, right: &str) -> bool {
    left.chars().any(|c| right.contains(c))
}

/// `right` occurs in `left`, ignoring case.
fn contains_string(left: &str, right: &str) -> bool {
    left.to_lowercase().contains(&right.to_lowercase())
}

/// Pattern match, ignoring case: `*` any run, `+` one character, `#`
/// takes the next character literally.
fn covers_pattern(left: &str, pattern: &str) -> Result<bool> {
    let mut source = String::from("^");
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '*' => source.push_str(".*"),
            '+' => source.push('.'),
            '#' => {
                let escaped = chars.next().unwrap_or('#');
                source.push_str(&regex::escape(&escaped.to_string()));
            }
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');

    let regex = RegexBuilder::new(&source)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| {
            AbapError::new(
                ErrorKind::InvalidOperator,
                format!("bad pattern '{}': {}", pattern, e),
            )
        })?;

    Ok(regex.is_match(left))
}
