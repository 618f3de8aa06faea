/*
 * =============================================================================
 *  ABAPX - Reports with Claws!
 * =============================================================================
 *
 *  File:     loader.rs
 *  Purpose:  Folds a grammar description into one rule tree per keyword.
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

use tracing::debug;

use crate::error::{AbapError, ErrorKind, Result};
use crate::grammar::node::{GrammarNode, Terminal, TerminalKind};
use crate::grammar::{Grammar, Rule};
use crate::lexer::token::literal_text;
use crate::lexer::{lex, to_statements, LexMode, Statement};

/// One slot at the current nesting level while a definition is folded.
enum Item {
    Node(GrammarNode),

    /// A `|` waiting for the node on its right.
    Bar,
}

/// What an open bracket will turn into once it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Sequence,
    Optional,
}

impl Group {
    fn closer(self) -> &'static str {
        match self {
            Group::Sequence => "}",
            Group::Optional => "]",
        }
    }
}

/// Loads a whole grammar description.
///
/// The text goes through the same lexer and segmenter as programs, in
/// grammar mode, and every resulting statement defines one keyword.
pub fn load_grammar(text: &str) -> Result<Grammar> {
    let lexemes = lex(text, LexMode::Grammar)?;
    let statements = to_statements(&lexemes, LexMode::Grammar)?;

    let mut grammar = Grammar::default();

    for statement in &statements {
        let (keyword, rule) = fold_definition(statement)?;
        grammar.define(&keyword, rule);
    }

    check_references(&grammar)?;

    debug!(rules = grammar.len(), "grammar loaded");
    Ok(grammar)
}

/// Folds one definition statement into a rule.
fn fold_definition(statement: &Statement) -> Result<(String, Rule)> {
    let keyword = match statement.keyword() {
        Some(keyword) => keyword.to_string(),
        None => {
            return Err(AbapError::new(
                ErrorKind::UnbalancedGroup,
                "empty grammar definition",
            ))
        }
    };

    // An uppercase keyword is matched as part of its own rule.
    let is_statement = keyword.to_uppercase() == keyword;
    let body = if is_statement {
        &statement.lexemes[..]
    } else {
        &statement.lexemes[1..]
    };

    let mut level: Vec<Item> = Vec::new();
    let mut stack: Vec<(Group, Vec<Item>)> = Vec::new();

    for lexeme in body {
        match lexeme.as_str() {
            "{" => stack.push((Group::Sequence, std::mem::take(&mut level))),
            "[" => stack.push((Group::Optional, std::mem::take(&mut level))),

            closer @ ("}" | "]") => {
                let (group, outer) = match stack.pop() {
                    Some(frame) => frame,
                    None => {
                        return Err(unbalanced(
                            &keyword,
                            format!("'{}' without a matching opener", closer),
                        ))
                    }
                };

                if group.closer() != closer {
                    return Err(unbalanced(
                        &keyword,
                        format!("expected '{}' but found '{}'", group.closer(), closer),
                    ));
                }

                let inner = GrammarNode::Sequence(close_level(&keyword, level)?);
                let node = match group {
                    Group::Sequence => inner,
                    Group::Optional => GrammarNode::Optional(Box::new(inner)),
                };

                level = outer;
                append(&keyword, &mut level, node)?;
            }

            "|" => level.push(Item::Bar),

            word => {
                let node = match literal_text(word) {
                    Some(text) => GrammarNode::Literal(text.to_string()),
                    None => GrammarNode::Terminal(Terminal::parse(word)),
                };
                append(&keyword, &mut level, node)?;
            }
        }
    }

    if let Some((group, _)) = stack.last() {
        return Err(unbalanced(
            &keyword,
            format!("'{}' is never closed", group.closer()),
        ));
    }

    let node = GrammarNode::Sequence(close_level(&keyword, level)?);
    Ok((keyword, Rule { node, statement: is_statement }))
}

/// Appends a node, folding it into an alternation with its left neighbour
/// when a `|` sits between them.
fn append(keyword: &str, level: &mut Vec<Item>, node: GrammarNode) -> Result<()> {
    let mut node = node;

    while let Some(Item::Bar) = level.last() {
        level.pop();
        match level.pop() {
            Some(Item::Node(previous)) => {
                node = GrammarNode::Alternation(Box::new(previous), Box::new(node));
            }
            _ => return Err(unbalanced(keyword, "'|' has nothing on its left")),
        }
    }

    level.push(Item::Node(node));
    Ok(())
}

fn close_level(keyword: &str, level: Vec<Item>) -> Result<Vec<GrammarNode>> {
    level
        .into_iter()
        .map(|item| match item {
            Item::Node(node) => Ok(node),
            Item::Bar => Err(unbalanced(keyword, "'|' has nothing on its right")),
        })
        .collect()
}

fn unbalanced(keyword: &str, detail: impl AsRef<str>) -> AbapError {
    AbapError::new(
        ErrorKind::UnbalancedGroup,
        format!("in definition of {}: {}", keyword, detail.as_ref()),
    )
}

/// Every named or repeated rule reference has to resolve.
fn check_references(grammar: &Grammar) -> Result<()> {
    for (keyword, rule) in grammar.rules() {
        let mut missing: Option<String> = None;

        rule.node.for_each_terminal(&mut |terminal: &Terminal| {
            let is_reference = match terminal.kind {
                TerminalKind::Repeat => true,
                TerminalKind::Word => terminal.named && !terminal.is_keyword(),
                _ => false,
            };

            if is_reference && missing.is_none() && grammar.rule(&terminal.target).is_none() {
                missing = Some(terminal.to_string());
            }
        });

        if let Some(reference) = missing {
            return Err(AbapError::new(
                ErrorKind::UnresolvedRuleReference,
                format!("{} refers to undefined rule in '{}'", keyword, reference),
            ));
        }
    }

    Ok(())
}
