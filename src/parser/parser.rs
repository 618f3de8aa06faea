/*
 * =============================================================================
 *  ABAPX - Reports with Claws!
 * =============================================================================
 *
 *  File:     parser.rs
 *  Purpose:  Grammar-driven backtracking matcher that turns statements
 *            into keyword + capture maps.
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

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{AbapError, ErrorKind, Result};
use crate::grammar::{Grammar, GrammarNode, Terminal, TerminalKind};
use crate::lexer::Statement;
use crate::parser::captures::{Capture, Captures};

/// Keyword implied by `x = ...` statements.
pub const ASSIGNMENT_KEYWORD: &str = "compute";

/// `/`, a 1-based column, and an output length in parentheses, all optional.
const POSITION_PATTERN: &str = r"^/?([0-9]+)?(\(([0-9]+|\*\*?)\))?$";

/// A statement matched against its keyword's rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedStatement {
    pub keyword: String,
    pub captures: Captures,
}

impl ParsedStatement {
    pub fn new(keyword: impl Into<String>, captures: Captures) -> Self {
        Self {
            keyword: keyword.into(),
            captures,
        }
    }
}

/// A successful match: where matching continues and what it captured.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched {
    pub next: usize,
    pub captures: Captures,
}

/// Matches statements against a borrowed grammar.
///
/// The parser holds no state of its own, so one grammar can back any
/// number of parsers at the same time.
pub struct Parser<'g> {
    grammar: &'g Grammar,
}

/// Parses every statement of a program.
pub fn parse(statements: &[Statement], grammar: &Grammar) -> Result<Vec<ParsedStatement>> {
    let parser = Parser::new(grammar);
    statements.iter().map(|s| parser.parse_statement(s)).collect()
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Parses one statement against the rule of its leading keyword.
    ///
    /// A statement whose second lexeme is `=` is an assignment and is parsed
    /// as if it started with `COMPUTE`.
    ///
    /// # Errors
    /// - `InvalidKeyword` if no statement rule exists for the keyword
    /// - `GrammarMismatch` if the rule does not match, or leaves lexemes over
    pub fn parse_statement(&self, statement: &Statement) -> Result<ParsedStatement> {
        let lexemes: Vec<String> = match statement.lexemes.get(1) {
            Some(second) if second == "=" => std::iter::once(ASSIGNMENT_KEYWORD.to_string())
                .chain(statement.lexemes.iter().cloned())
                .collect(),
            _ => statement.lexemes.clone(),
        };

        let keyword = match lexemes.first() {
            Some(keyword) => keyword.to_lowercase(),
            None => {
                return Err(AbapError::new(ErrorKind::InvalidKeyword, "empty statement"));
            }
        };

        let rule = self.grammar.statement_rule(&keyword).ok_or_else(|| {
            AbapError::new(
                ErrorKind::InvalidKeyword,
                format!("invalid keyword '{}' in statement: {}", keyword, statement),
            )
        })?;

        let matched = self.match_node(&lexemes, 0, rule, 0).ok_or_else(|| {
            AbapError::new(
                ErrorKind::GrammarMismatch,
                format!("couldn't parse statement: {}", statement),
            )
        })?;

        if matched.next < lexemes.len() {
            return Err(AbapError::new(
                ErrorKind::GrammarMismatch,
                format!(
                    "couldn't parse entire statement: {} (stopped at '{}')",
                    statement, lexemes[matched.next]
                ),
            ));
        }

        debug!(keyword = %keyword, captures = ?matched.captures, "parsed");
        Ok(ParsedStatement::new(keyword, matched.captures))
    }

    /// Matches `node` against `lexemes` starting at `position`.
    ///
    /// Returns `None` when the node does not match; captures made along a
    /// failed path are simply dropped by the caller.
    pub fn match_node(
        &self,
        lexemes: &[String],
        position: usize,
        node: &GrammarNode,
        depth: usize,
    ) -> Option<Matched> {
        trace!(depth, position, node = ?node, "match");

        match node {
            GrammarNode::Sequence(children) => {
                let mut next = position;
                let mut captures = Captures::new();
                for child in children {
                    let matched = self.match_node(lexemes, next, child, depth + 1)?;
                    next = matched.next;
                    captures.merge(matched.captures);
                }
                Some(Matched { next, captures })
            }

            GrammarNode::Optional(inner) => Some(
                self.match_node(lexemes, position, inner, depth + 1)
                    .unwrap_or(Matched {
                        next: position,
                        captures: Captures::new(),
                    }),
            ),

            GrammarNode::Alternation(left, right) => self
                .match_node(lexemes, position, left, depth + 1)
                .or_else(|| self.match_node(lexemes, position, right, depth + 1)),

            GrammarNode::Literal(text) => {
                let lexeme = lexemes.get(position)?;
                if lexeme.to_uppercase() == text.to_uppercase() {
                    Some(Matched {
                        next: position + 1,
                        captures: Captures::new(),
                    })
                } else {
                    None
                }
            }

            GrammarNode::Terminal(terminal) => self.match_terminal(lexemes, position, terminal, depth),
        }
    }

    fn match_terminal(
        &self,
        lexemes: &[String],
        position: usize,
        terminal: &Terminal,
        depth: usize,
    ) -> Option<Matched> {
        let mut captures = Captures::new();

        match terminal.kind {
            TerminalKind::Flag => {
                captures.insert(terminal.capture.clone(), Capture::Flag(true));
                Some(Matched {
                    next: position,
                    captures,
                })
            }

            TerminalKind::Position => {
                let lexeme = lexemes.get(position)?;
                if !is_position(lexeme) {
                    return None;
                }
                captures.insert(terminal.capture.clone(), Capture::Single(lexeme.clone()));
                Some(Matched {
                    next: position + 1,
                    captures,
                })
            }

            TerminalKind::Repeat => {
                let rule = self.grammar.rule(&terminal.target)?;
                let mut next = position;
                let mut list = Vec::new();

                while let Some(matched) = self.match_node(lexemes, next, rule, depth + 1) {
                    if matched.captures.is_empty() || matched.next == next {
                        break;
                    }
                    next = matched.next;
                    list.push(matched.captures);
                }

                captures.insert(terminal.capture.clone(), Capture::Repeated(list));
                Some(Matched { next, captures })
            }

            TerminalKind::Word if terminal.is_keyword() => {
                let lexeme = lexemes.get(position)?;
                if lexeme.to_uppercase() == terminal.target {
                    Some(Matched {
                        next: position + 1,
                        captures,
                    })
                } else {
                    None
                }
            }

            TerminalKind::Word => match self.grammar.rule(&terminal.target) {
                Some(rule) => {
                    let matched = self.match_node(lexemes, position, rule, depth + 1)?;
                    if terminal.named {
                        captures.insert(terminal.capture.clone(), Capture::Nested(matched.captures));
                    } else {
                        captures = matched.captures;
                    }
                    Some(Matched {
                        next: matched.next,
                        captures,
                    })
                }

                None => {
                    let lexeme = lexemes.get(position)?;
                    captures.insert(terminal.capture.clone(), Capture::Single(lexeme.clone()));
                    Some(Matched {
                        next: position + 1,
                        captures,
                    })
                }
            },
        }
    }
}

/// Whether a lexeme is a write position such as `/`, `/5`, `10(4)` or `(*)`.
///
/// A bare column number is not a position on its own; it needs a `/` or a
/// length so that `WRITE 5.` still writes the number 5.
pub fn is_position(lexeme: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(POSITION_PATTERN).expect("valid position pattern"));

    (lexeme.starts_with('/') || lexeme.contains('(')) && pattern.is_match(lexeme)
}

/// Splits a position lexeme into `(new_line, column, length)`.
///
/// `column` is 1-based; `length` is `None` for `(*)`, `(**)` or when absent.
pub fn split_position(lexeme: &str) -> (bool, Option<usize>, Option<usize>) {
    let new_line = lexeme.starts_with('/');
    let rest = lexeme.trim_start_matches('/');

    let (column, length) = match rest.split_once('(') {
        Some((column, length)) => (column, length.trim_end_matches(')')),
        None => (rest, ""),
    };

    (new_line, column.parse().ok(), length.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{lex, to_statements, LexMode};

    fn statements(text: &str) -> Vec<Statement> {
        to_statements(&lex(text, LexMode::Statement).unwrap(), LexMode::Statement).unwrap()
    }

    fn parse_one(grammar: &Grammar, text: &str) -> Result<ParsedStatement> {
        Parser::new(grammar).parse_statement(&statements(text)[0])
    }

    fn single(value: &str) -> Capture {
        Capture::Single(value.to_string())
    }

    #[test]
    fn keywords_are_consumed_without_captures() {
        let grammar = Grammar::load("MOVE source TO dest .").unwrap();
        let parsed = parse_one(&grammar, "MOVE 'a' TO x.").unwrap();
        assert_eq!(parsed.keyword, "move");
        assert_eq!(
            parsed.captures,
            Captures::from([("source", single("'a")), ("dest", single("x"))])
        );
    }

    #[test]
    fn optional_never_fails_the_sequence() {
        let grammar = Grammar::load("SKIP [ lines ] .").unwrap();
        assert!(parse_one(&grammar, "SKIP.").unwrap().captures.is_empty());
        assert_eq!(
            parse_one(&grammar, "SKIP 3.").unwrap().captures.single("lines"),
            Some("3")
        );
    }

    #[test]
    fn alternation_backtracks_to_the_right_branch() {
        let grammar = Grammar::load("SKIP { TO LINE +to_line line } | lines .").unwrap();
        let to_line = parse_one(&grammar, "SKIP TO LINE 4.").unwrap();
        assert!(to_line.captures.flag("to_line"));
        assert_eq!(to_line.captures.single("line"), Some("4"));

        let lines = parse_one(&grammar, "SKIP 2.").unwrap();
        assert!(!lines.captures.flag("to_line"));
        assert_eq!(lines.captures.single("lines"), Some("2"));
    }

    #[test]
    fn first_matching_definition_wins() {
        let grammar = Grammar::load("SKIP a . SKIP a b .").unwrap();
        let err = parse_one(&grammar, "SKIP 1 2.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::GrammarMismatch);
    }

    #[test]
    fn named_rules_nest_and_unnamed_rules_flatten() {
        let grammar = Grammar::load("IF cond . ASSERT check:cond . cond left op right .").unwrap();

        let flat = parse_one(&grammar, "IF a = b.").unwrap();
        assert_eq!(flat.captures.single("op"), Some("="));

        let nested = parse_one(&grammar, "ASSERT a = b.").unwrap();
        assert_eq!(nested.captures.nested("check").unwrap().single("left"), Some("a"));
    }

    #[test]
    fn repeated_rules_collect_a_list() {
        let grammar = Grammar::load("CLEAR targets:target+ . target dest .").unwrap();
        let parsed = parse_one(&grammar, "CLEAR a b c.").unwrap();
        let dests: Vec<_> = parsed
            .captures
            .repeated("targets")
            .iter()
            .map(|c| c.single("dest").unwrap())
            .collect();
        assert_eq!(dests, vec!["a", "b", "c"]);

        let none = parse_one(&grammar, "CLEAR.").unwrap();
        assert!(none.captures.repeated("targets").is_empty());
    }

    #[test]
    fn assignment_shorthand_parses_as_compute() {
        let grammar = Grammar::builtin().unwrap();
        let parsed = parse_one(&grammar, "x = a + 1.").unwrap();
        assert_eq!(parsed.keyword, "compute");
        assert_eq!(parsed.captures.single("dest"), Some("x"));
        assert_eq!(parsed.captures.single("operator"), Some("+"));
        assert_eq!(parsed.captures.single("operand"), Some("1"));
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let grammar = Grammar::builtin().unwrap();
        let err = parse_one(&grammar, "PERFORM foo.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidKeyword);

        // helper rules cannot start a statement
        let err = parse_one(&grammar, "cond a = b.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidKeyword);
    }

    #[test]
    fn leftover_lexemes_are_a_mismatch() {
        let grammar = Grammar::builtin().unwrap();
        let err = parse_one(&grammar, "ULINE now.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::GrammarMismatch);
    }

    #[test]
    fn write_position_is_optional() {
        let grammar = Grammar::builtin().unwrap();

        let plain = parse_one(&grammar, "WRITE 5.").unwrap();
        assert_eq!(plain.captures.single("source"), Some("5"));
        assert!(plain.captures.get("at").is_none());

        let positioned = parse_one(&grammar, "WRITE /10(4) x NO-GAP.").unwrap();
        assert_eq!(positioned.captures.single("at"), Some("/10(4)"));
        assert_eq!(positioned.captures.single("source"), Some("x"));
        assert!(positioned.captures.flag("no_gap"));

        let bare = parse_one(&grammar, "WRITE /.").unwrap();
        assert_eq!(bare.captures.single("at"), Some("/"));
        assert!(bare.captures.get("source").is_none());
    }

    #[test]
    fn boolean_expressions_nest_through_rules() {
        let grammar = Grammar::builtin().unwrap();
        let parsed = parse_one(&grammar, "IF NOT ( a = 1 OR b IS INITIAL ) AND c CS 'x'.").unwrap();
        let captures = &parsed.captures;

        assert!(captures.flag("negate"));
        let sub = captures.nested("sub").unwrap();
        assert_eq!(sub.single("left"), Some("a"));
        assert!(sub.flag("or"));
        assert!(sub.nested("next").unwrap().flag("initial"));

        assert!(captures.flag("and"));
        let next = captures.nested("next").unwrap();
        assert_eq!(next.single("op"), Some("cs"));
        assert_eq!(next.single("right"), Some("'x"));
    }

    #[test]
    fn position_lexemes() {
        assert!(is_position("/"));
        assert!(is_position("/5"));
        assert!(is_position("10(4)"));
        assert!(is_position("/(**)"));
        assert!(!is_position("5"));
        assert!(!is_position("x"));
        assert!(!is_position("/x"));

        assert_eq!(split_position("/"), (true, None, None));
        assert_eq!(split_position("/12(3)"), (true, Some(12), Some(3)));
        assert_eq!(split_position("4(*)"), (false, Some(4), None));
    }
}
