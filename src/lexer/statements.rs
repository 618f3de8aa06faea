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

use serde::Serialize;
use tracing::debug;

use crate::error::{AbapError, ErrorKind, Result};
use crate::lexer::token::{is_literal, to_source, LexMode, Lexeme};

const CHAIN: &str = ":";
const SEPARATOR: &str = ",";
const TERMINATOR: &str = ".";

/// One complete command, ending at a period.
///
/// In statement mode every non-literal lexeme is lower-cased, so keyword
/// and identifier comparisons downstream never have to think about case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Statement {
    pub lexemes: Vec<Lexeme>,
}

impl Statement {
    pub fn new(lexemes: Vec<Lexeme>) -> Self {
        Self { lexemes }
    }

    /// Leading lexeme, if any.
    pub fn keyword(&self) -> Option<&str> {
        self.lexemes.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lexemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexemes.is_empty()
    }
}

/// Re-serializes the statement as source text (`write 'a' .` style, one
/// space between lexemes). Lexing the result yields the same lexemes.
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lexeme in &self.lexemes {
            write!(f, "{} ", to_source(lexeme))?;
        }
        f.write_str(TERMINATOR)
    }
}

/// Groups a lexeme sequence into statements.
///
/// A colon turns everything seen so far into a chain prefix that is put in
/// front of every comma-separated body until the closing period:
///
/// ```text
/// DATA: a TYPE i, b TYPE c.   →   data a type i .
///                                 data b type c .
/// ```
///
/// # Errors
/// - `UnexpectedChain` for a second colon in one statement
/// - `UnexpectedSeparator` for a comma outside a chained statement
/// - `MissingTerminator` if the input ends inside a statement
pub fn to_statements(lexemes: &[Lexeme], mode: LexMode) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    let mut body: Vec<Lexeme> = Vec::new();
    let mut chain_prefix: Option<Vec<Lexeme>> = None;

    for lexeme in lexemes {
        match lexeme.as_str() {
            CHAIN => {
                if chain_prefix.is_some() {
                    return Err(AbapError::new(
                        ErrorKind::UnexpectedChain,
                        format!(
                            "unexpected ':' after '{}' (only one is allowed per statement)",
                            body.join(" ")
                        ),
                    ));
                }
                chain_prefix = Some(std::mem::take(&mut body));
            }

            SEPARATOR | TERMINATOR => {
                if lexeme == SEPARATOR && chain_prefix.is_none() {
                    return Err(AbapError::new(
                        ErrorKind::UnexpectedSeparator,
                        format!("unexpected ',' after '{}'", body.join(" ")),
                    )
                    .with_help("start a chained statement with ':' before using ','"));
                }

                let parts = std::mem::take(&mut body);
                let statement = match &chain_prefix {
                    Some(prefix) => prefix.iter().cloned().chain(parts).collect(),
                    None => parts,
                };

                if lexeme == TERMINATOR {
                    chain_prefix = None;
                }

                // A lone period is an empty statement.
                if !statement.is_empty() {
                    let statement = Statement::new(statement);
                    debug!(statement = %statement, "segmented");
                    statements.push(statement);
                }
            }

            _ => {
                if mode == LexMode::Statement && !is_literal(lexeme) {
                    body.push(lexeme.to_lowercase());
                } else {
                    body.push(lexeme.clone());
                }
            }
        }
    }

    if chain_prefix.is_some() || !body.is_empty() {
        let pending: Vec<&str> = chain_prefix
            .iter()
            .flatten()
            .chain(body.iter())
            .map(String::as_str)
            .collect();
        return Err(AbapError::new(
            ErrorKind::MissingTerminator,
            format!("missing '.' at end of statement '{}'", pending.join(" ")),
        ));
    }

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn segment(text: &str) -> Result<Vec<Statement>> {
        to_statements(&lex(text, LexMode::Statement)?, LexMode::Statement)
    }

    fn words(statement: &Statement) -> Vec<&str> {
        statement.lexemes.iter().map(String::as_str).collect()
    }

    #[test]
    fn statements_serialize_as_lexeme_lists() {
        let statements = segment("WRITE 'a'. ULINE.").unwrap();
        assert_eq!(
            serde_json::to_value(&statements).unwrap(),
            serde_json::json!([["write", "'a"], ["uline"]])
        );
    }

    #[test]
    fn lowercases_everything_but_literals() {
        let stmts = segment("WRITE 'Hello' Name.").unwrap();
        assert_eq!(words(&stmts[0]), vec!["write", "'Hello", "name"]);
    }

    #[test]
    fn expands_chained_statements() {
        let stmts = segment("DATA: A TYPE C LENGTH 3, B TYPE C LENGTH 3.").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(words(&stmts[0]), vec!["data", "a", "type", "c", "length", "3"]);
        assert_eq!(words(&stmts[1]), vec!["data", "b", "type", "c", "length", "3"]);
    }

    #[test]
    fn chain_prefix_ends_at_period() {
        let stmts = segment("WRITE: 'a', 'b'. ULINE.").unwrap();
        assert_eq!(stmts.len(), 3);
        assert_eq!(words(&stmts[2]), vec!["uline"]);
    }

    #[test]
    fn lone_periods_are_skipped() {
        let stmts = segment("ULINE. . ULINE.").unwrap();
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn second_colon_is_an_error() {
        let err = segment("WRITE: a: b.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedChain);
    }

    #[test]
    fn comma_without_chain_is_an_error() {
        let err = segment("WRITE a, b.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedSeparator);
    }

    #[test]
    fn missing_period_is_an_error() {
        let err = segment("WRITE a. WRITE b").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingTerminator);

        let err = segment("WRITE: a,").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingTerminator);
    }

    #[test]
    fn display_round_trips_through_the_lexer() {
        let stmts = segment("DATA: x TYPE c VALUE 'it''s', y TYPE string VALUE `a b`.").unwrap();
        for stmt in &stmts {
            let text = stmt.to_string();
            let again = segment(&text).unwrap();
            assert_eq!(again, vec![stmt.clone()]);
        }
    }
}
