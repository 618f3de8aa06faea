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

/// Grammar node tree and terminal classification.
pub mod node;

/// Folds a grammar description into rules.
pub mod loader;

use std::collections::HashMap;

use crate::error::Result;

pub use loader::load_grammar;
pub use node::{GrammarNode, Terminal, TerminalKind};

/// The statement grammar shipped with the interpreter.
pub const BUILTIN_SYNTAX: &str = include_str!("../../grammar/abap.syntax");

/// One keyword's syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub node: GrammarNode,

    /// Defined with an uppercase keyword, so it may start a statement.
    /// Lowercase definitions are helper rules only reachable by reference.
    pub statement: bool,
}

/// Mapping from keyword (case-insensitive) to its rule.
///
/// Built once and read-only afterwards; parsers only ever borrow it.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: HashMap<String, Rule>,

    /// Keywords in the order they were first defined.
    order: Vec<String>,
}

impl Grammar {
    /// Loads a grammar description text.
    pub fn load(text: &str) -> Result<Self> {
        load_grammar(text)
    }

    /// Loads the grammar shipped with the interpreter.
    pub fn builtin() -> Result<Self> {
        load_grammar(BUILTIN_SYNTAX)
    }

    /// Adds a definition. A keyword defined twice keeps both definitions as
    /// alternatives, the earlier one tried first.
    pub(crate) fn define(&mut self, keyword: &str, rule: Rule) {
        let key = keyword.to_lowercase();

        match self.rules.remove(&key) {
            Some(previous) => {
                let merged = Rule {
                    node: GrammarNode::Alternation(Box::new(previous.node), Box::new(rule.node)),
                    statement: previous.statement || rule.statement,
                };
                self.rules.insert(key, merged);
            }
            None => {
                self.order.push(key.clone());
                self.rules.insert(key, rule);
            }
        }
    }

    /// Looks up any rule, statement or helper.
    pub fn rule(&self, name: &str) -> Option<&GrammarNode> {
        self.rules.get(&name.to_lowercase()).map(|rule| &rule.node)
    }

    /// Looks up a rule that may start a statement.
    pub fn statement_rule(&self, keyword: &str) -> Option<&GrammarNode> {
        self.rules
            .get(&keyword.to_lowercase())
            .filter(|rule| rule.statement)
            .map(|rule| &rule.node)
    }

    /// Rules in definition order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.order
            .iter()
            .filter_map(move |key| self.rules.get(key).map(|rule| (key.as_str(), rule)))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Pretty-prints every rule as an indented tree.
    pub fn describe(&self) -> String {
        let mut out = String::from("KEYWORDS:\n");
        for (keyword, rule) in self.rules() {
            out.push('\n');
            out.push_str(&format!("{}:\n", keyword));
            rule.node.write_tree(&mut out, 1);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_grammar_loads() {
        let grammar = Grammar::builtin().unwrap();
        for keyword in [
            "report", "data", "constants", "types", "move", "compute", "add", "subtract",
            "multiply", "divide", "clear", "write", "uline", "skip", "new-line", "if", "elseif",
            "else", "endif", "while", "endwhile", "do", "enddo", "exit", "continue", "assert",
        ] {
            assert!(grammar.statement_rule(keyword).is_some(), "missing {}", keyword);
        }
        for helper in ["typing", "decl", "target", "cond", "clause", "logic"] {
            assert!(grammar.rule(helper).is_some(), "missing {}", helper);
            assert!(grammar.statement_rule(helper).is_none(), "{} is a statement", helper);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let grammar = Grammar::load("ULINE .").unwrap();
        assert!(grammar.statement_rule("uline").is_some());
        assert!(grammar.statement_rule("ULINE").is_some());
        assert!(grammar.statement_rule("UlInE").is_some());
    }

    #[test]
    fn describe_lists_rules_in_definition_order() {
        let grammar = Grammar::load("ULINE . SKIP [ lines ] .").unwrap();
        let text = grammar.describe();
        let uline = text.find("uline:").unwrap();
        let skip = text.find("skip:").unwrap();
        assert!(uline < skip);
        assert!(text.contains("    [\n"));
    }
}
