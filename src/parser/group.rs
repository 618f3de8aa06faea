/*
 * =============================================================================
 *  ABAPX - Reports with Claws!
 * =============================================================================
 *
 *  File:     group.rs
 *  Purpose:  Nests flat statements into IF chains, loops and record
 *            declaration blocks.
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

use serde::Serialize;
use tracing::debug;

use crate::error::{AbapError, ErrorKind, Result};
use crate::parser::captures::Captures;
use crate::parser::parser::ParsedStatement;

/* ============================================================================
 * Grouped Statement Tree
 * ============================================================================
 */

/// A statement after grouping: either a plain statement or one that owns a
/// nested block of statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupedStatement {
    /// Anything that opens no block.
    Statement(ParsedStatement),

    /// `while`, `do`, and `begin of ... end of` record declarations.
    Block {
        #[serde(flatten)]
        statement: ParsedStatement,
        block: Vec<GroupedStatement>,
    },

    /// An `if` chain: one part per `if`, `elseif` and `else`.
    Conditional { parts: Vec<ConditionalPart> },
}

/// One branch of an `if` chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalPart {
    pub keyword: String,
    pub captures: Captures,
    pub block: Vec<GroupedStatement>,
}

impl GroupedStatement {
    pub fn keyword(&self) -> &str {
        match self {
            GroupedStatement::Statement(statement) => &statement.keyword,
            GroupedStatement::Block { statement, .. } => &statement.keyword,
            GroupedStatement::Conditional { .. } => "if",
        }
    }

    /// Writes the tree with two spaces of indentation per level.
    pub fn write_tree(&self, out: &mut String, depth: usize) {
        let tabs = "  ".repeat(depth);

        match self {
            GroupedStatement::Statement(statement) => {
                out.push_str(&format!("{}{} -> {}\n", tabs, statement.keyword, render(&statement.captures)));
            }
            GroupedStatement::Block { statement, block } => {
                out.push_str(&format!("{}{} -> {}\n", tabs, statement.keyword, render(&statement.captures)));
                for child in block {
                    child.write_tree(out, depth + 1);
                }
            }
            GroupedStatement::Conditional { parts } => {
                out.push_str(&format!("{}if\n", tabs));
                for part in parts {
                    out.push_str(&format!("{}->{} {}\n", tabs, part.keyword, render(&part.captures)));
                    for child in &part.block {
                        child.write_tree(out, depth + 1);
                    }
                }
            }
        }
    }
}

fn render(captures: &Captures) -> String {
    serde_json::to_string(captures).unwrap_or_default()
}

/* ============================================================================
 * Grouping Stack
 * ============================================================================
 */

/// A statement whose block is still being collected.
enum Pending {
    If {
        parts: Vec<ConditionalPart>,
        has_else: bool,
    },

    /// `while` or `do`
    Loop(ParsedStatement),

    /// A `begin of` declaration (`data`, `constants` or `types`).
    Record(ParsedStatement),
}

impl Pending {
    fn describe(&self) -> String {
        match self {
            Pending::If { .. } => "if".to_string(),
            Pending::Loop(statement) => statement.keyword.clone(),
            Pending::Record(statement) => format!(
                "{} begin of {}",
                statement.keyword,
                statement.captures.single("struc").unwrap_or("?")
            ),
        }
    }
}

/// One open block: the pending statement and the output list it interrupted.
struct Frame {
    pending: Pending,
    saved: Vec<GroupedStatement>,
}

/// Turns the flat statement list into a block-structured tree.
///
/// # Errors
/// - `MismatchedBlockKind` when a closer does not belong to the open block
/// - `MismatchedBlockName` when `end of x` closes `begin of y`
/// - `UnbalancedBlock` when a closer has no opener, or an opener is never closed
pub fn group(statements: Vec<ParsedStatement>) -> Result<Vec<GroupedStatement>> {
    let mut output: Vec<GroupedStatement> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for statement in statements {
        debug!(keyword = %statement.keyword, depth = stack.len(), "grouping");

        match statement.keyword.as_str() {
            "if" => {
                let part = ConditionalPart {
                    keyword: statement.keyword,
                    captures: statement.captures,
                    block: Vec::new(),
                };
                stack.push(Frame {
                    pending: Pending::If {
                        parts: vec![part],
                        has_else: false,
                    },
                    saved: std::mem::take(&mut output),
                });
            }

            "elseif" | "else" | "endif" => {
                let frame = pop_frame(&mut stack, &statement)?;
                let (mut parts, has_else) = match frame.pending {
                    Pending::If { parts, has_else } => (parts, has_else),
                    other => return Err(mismatched_kind(&other, &statement)),
                };

                if has_else && statement.keyword != "endif" {
                    return Err(AbapError::new(
                        ErrorKind::MismatchedBlockKind,
                        format!("'{}' after 'else'", statement.keyword),
                    ));
                }

                if let Some(last) = parts.last_mut() {
                    last.block = std::mem::take(&mut output);
                }

                if statement.keyword == "endif" {
                    output = frame.saved;
                    output.push(GroupedStatement::Conditional { parts });
                } else {
                    let has_else = statement.keyword == "else";
                    parts.push(ConditionalPart {
                        keyword: statement.keyword,
                        captures: statement.captures,
                        block: Vec::new(),
                    });
                    stack.push(Frame {
                        pending: Pending::If { parts, has_else },
                        saved: frame.saved,
                    });
                }
            }

            "while" | "do" => {
                stack.push(Frame {
                    pending: Pending::Loop(statement),
                    saved: std::mem::take(&mut output),
                });
            }

            closer @ ("endwhile" | "enddo") => {
                let opener = if closer == "endwhile" { "while" } else { "do" };
                let frame = pop_frame(&mut stack, &statement)?;
                let opened = match frame.pending {
                    Pending::Loop(opened) if opened.keyword == opener => opened,
                    other => return Err(mismatched_kind(&other, &statement)),
                };

                let block = std::mem::replace(&mut output, frame.saved);
                output.push(GroupedStatement::Block {
                    statement: opened,
                    block,
                });
            }

            _ if statement.captures.flag("begin") => {
                stack.push(Frame {
                    pending: Pending::Record(statement),
                    saved: std::mem::take(&mut output),
                });
            }

            _ if statement.captures.flag("end") => {
                let frame = pop_frame(&mut stack, &statement)?;
                let opened = match frame.pending {
                    Pending::Record(opened) => opened,
                    other => return Err(mismatched_kind(&other, &statement)),
                };

                if opened.keyword != statement.keyword {
                    return Err(mismatched_kind(&Pending::Record(opened), &statement));
                }

                let begin_name = opened.captures.single("struc");
                let end_name = statement.captures.single("struc");
                if begin_name != end_name {
                    return Err(AbapError::new(
                        ErrorKind::MismatchedBlockName,
                        format!(
                            "'end of {}' closes 'begin of {}'",
                            end_name.unwrap_or("?"),
                            begin_name.unwrap_or("?")
                        ),
                    ));
                }

                let block = std::mem::replace(&mut output, frame.saved);
                output.push(GroupedStatement::Block {
                    statement: opened,
                    block,
                });
            }

            _ => output.push(GroupedStatement::Statement(statement)),
        }
    }

    if let Some(frame) = stack.last() {
        return Err(AbapError::new(
            ErrorKind::UnbalancedBlock,
            format!("'{}' is never closed", frame.pending.describe()),
        ));
    }

    Ok(output)
}

fn pop_frame(stack: &mut Vec<Frame>, closer: &ParsedStatement) -> Result<Frame> {
    stack.pop().ok_or_else(|| {
        AbapError::new(
            ErrorKind::UnbalancedBlock,
            format!("'{}' without an open block", closer.keyword),
        )
    })
}

fn mismatched_kind(open: &Pending, closer: &ParsedStatement) -> AbapError {
    AbapError::new(
        ErrorKind::MismatchedBlockKind,
        format!("'{}' cannot close '{}'", closer.keyword, open.describe()),
    )
}
