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

/// Name of the built-in write-position terminal.
pub const POSITION_TERMINAL: &str = "<at>";

/// How a terminal behaves when it is matched.
///
/// Only the spelling of the terminal decides this. Whether a `Word` names
/// another rule, a required keyword or a plain capture is settled while
/// matching, against the grammar the parser was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    /// `+name`: records `name = true`, consumes nothing.
    Flag,

    /// `name` or `capture:rule`
    Word,

    /// `rule+` or `capture:rule+`: zero or more matches of a rule.
    Repeat,

    /// `<at>` or `capture:<at>`: a write position specifier.
    Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    /// Name the match is stored under.
    pub capture: String,

    /// Rule, keyword or capture the terminal refers to.
    pub target: String,

    pub kind: TerminalKind,

    /// Written as `capture:target`.
    pub named: bool,
}

impl Terminal {
    /// Classifies a bare grammar word.
    ///
    /// ```text
    /// +begin        → Flag      capture "begin"
    /// dest          → Word      capture "dest",    target "dest"
    /// sub:cond      → Word      capture "sub",     target "cond"   (named)
    /// targets:item+ → Repeat    capture "targets", target "item"   (named)
    /// <at>          → Position  capture "at"
    /// ```
    pub fn parse(word: &str) -> Self {
        if let Some(flag) = word.strip_prefix('+') {
            if is_identifier(flag) {
                return Self {
                    capture: flag.to_string(),
                    target: flag.to_string(),
                    kind: TerminalKind::Flag,
                    named: false,
                };
            }
        }

        let (capture, target, named) = match word.split_once(':') {
            Some((capture, target)) => (capture, target, true),
            None => (word, word, false),
        };

        if target == POSITION_TERMINAL {
            let capture = if named { capture } else { "at" };
            return Self {
                capture: capture.to_string(),
                target: target.to_string(),
                kind: TerminalKind::Position,
                named,
            };
        }

        if let Some(rule) = target.strip_suffix('+') {
            if is_identifier(rule) {
                let capture = if named { capture } else { rule };
                return Self {
                    capture: capture.to_string(),
                    target: rule.to_string(),
                    kind: TerminalKind::Repeat,
                    named,
                };
            }
        }

        Self {
            capture: capture.to_string(),
            target: target.to_string(),
            kind: TerminalKind::Word,
            named,
        }
    }

    /// Uppercase words are required keywords, never captures.
    pub fn is_keyword(&self) -> bool {
        self.kind == TerminalKind::Word && self.target.to_uppercase() == self.target
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TerminalKind::Flag => write!(f, "+{}", self.capture),
            TerminalKind::Repeat if self.named => write!(f, "{}:{}+", self.capture, self.target),
            TerminalKind::Repeat => write!(f, "{}+", self.target),
            _ if self.named => write!(f, "{}:{}", self.capture, self.target),
            _ => f.write_str(&self.target),
        }
    }
}

/// A keyword's syntax as a tree.
///
/// Rules refer to each other only by name (see `Terminal::target`), so the
/// tree itself never forms a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarNode {
    /// A quoted lexeme that must appear as written (case-insensitively).
    Literal(String),

    Terminal(Terminal),

    Sequence(Vec<GrammarNode>),

    Optional(Box<GrammarNode>),

    /// First branch that matches wins.
    Alternation(Box<GrammarNode>, Box<GrammarNode>),
}

impl GrammarNode {
    /// Calls `visit` for every terminal in the tree.
    pub fn for_each_terminal<'a>(&'a self, visit: &mut impl FnMut(&'a Terminal)) {
        match self {
            GrammarNode::Literal(_) => {}
            GrammarNode::Terminal(terminal) => visit(terminal),
            GrammarNode::Sequence(nodes) => {
                for node in nodes {
                    node.for_each_terminal(visit);
                }
            }
            GrammarNode::Optional(inner) => inner.for_each_terminal(visit),
            GrammarNode::Alternation(left, right) => {
                left.for_each_terminal(visit);
                right.for_each_terminal(visit);
            }
        }
    }

    /// Writes the node as an indented tree, two spaces per level.
    pub fn write_tree(&self, out: &mut String, depth: usize) {
        let tabs = "  ".repeat(depth);

        match self {
            GrammarNode::Literal(text) => out.push_str(&format!("{}'{}'\n", tabs, text)),
            GrammarNode::Terminal(terminal) => out.push_str(&format!("{}{}\n", tabs, terminal)),
            GrammarNode::Sequence(nodes) => {
                out.push_str(&format!("{}{{\n", tabs));
                for node in nodes {
                    node.write_tree(out, depth + 1);
                }
                out.push_str(&format!("{}}}\n", tabs));
            }
            GrammarNode::Optional(inner) => {
                out.push_str(&format!("{}[\n", tabs));
                inner.write_tree(out, depth + 1);
                out.push_str(&format!("{}]\n", tabs));
            }
            GrammarNode::Alternation(left, right) => {
                left.write_tree(out, depth);
                out.push_str(&format!("{}|\n", tabs));
                right.write_tree(out, depth);
            }
        }
    }
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c == '_' || c.is_alphanumeric())
}
