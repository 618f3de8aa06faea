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

//! The shipped grammar against the statements it is meant to accept.

use abapx::grammar::Grammar;
use abapx::lexer::{lex, to_statements, LexMode, Statement};
use abapx::parser::{Capture, Parser};
use abapx::ErrorKind;

fn statements(source: &str) -> Vec<Statement> {
    let lexemes = lex(source, LexMode::Statement).unwrap();
    to_statements(&lexemes, LexMode::Statement).unwrap()
}

#[test]
fn statement_text_lexes_back_to_itself() {
    let source = "REPORT 'it''s'. DATA: a TYPE c LENGTH 3 VALUE 'x y', b LIKE a.
                  WRITE / `a``b` NO-GAP. IF a CP '*x#*'. ENDIF.";

    for statement in statements(source) {
        let text = statement.to_string();
        let again = statements(&text);
        assert_eq!(again, vec![statement], "{}", text);
    }
}

#[test]
fn every_statement_keyword_has_a_working_example() {
    let grammar = Grammar::builtin().unwrap();
    let parser = Parser::new(&grammar);

    let examples = [
        ("report", "REPORT zdemo LINE-SIZE 60."),
        ("data", "DATA total TYPE p LENGTH 8 VALUE 0."),
        ("data", "DATA BEGIN OF addr."),
        ("constants", "CONSTANTS max LIKE total VALUE 10."),
        ("types", "TYPES name TYPE c LENGTH 20."),
        ("move", "MOVE 'a' TO b."),
        ("compute", "COMPUTE x = y * 2."),
        ("compute", "x = `text`."),
        ("add", "ADD 1 TO n."),
        ("subtract", "SUBTRACT 1 FROM n."),
        ("multiply", "MULTIPLY n BY 3."),
        ("divide", "DIVIDE n BY 3."),
        ("clear", "CLEAR a b-c d."),
        ("write", "WRITE /10(5) total NO-ZERO."),
        ("uline", "ULINE."),
        ("skip", "SKIP 2."),
        ("skip", "SKIP TO LINE 5."),
        ("new-line", "NEW-LINE."),
        ("if", "IF NOT ( a = 1 OR b IS NOT INITIAL ) AND c CS 'x'."),
        ("elseif", "ELSEIF a <> 2."),
        ("else", "ELSE."),
        ("endif", "ENDIF."),
        ("while", "WHILE i < 10."),
        ("endwhile", "ENDWHILE."),
        ("do", "DO 3 TIMES."),
        ("do", "DO."),
        ("enddo", "ENDDO."),
        ("exit", "EXIT."),
        ("continue", "CONTINUE."),
        ("assert", "ASSERT sy-index GE 1."),
    ];

    for (keyword, source) in examples {
        let statement = &statements(source)[0];
        let parsed = parser
            .parse_statement(statement)
            .unwrap_or_else(|err| panic!("{}: {}", source, err));
        assert_eq!(parsed.keyword, keyword, "{}", source);
    }
}

#[test]
fn write_position_versus_operand() {
    let grammar = Grammar::builtin().unwrap();
    let parser = Parser::new(&grammar);

    let parsed = parser.parse_statement(&statements("WRITE 5(3) x.")[0]).unwrap();
    assert_eq!(parsed.captures.single("at"), Some("5(3)"));
    assert_eq!(parsed.captures.single("source"), Some("x"));

    let parsed = parser.parse_statement(&statements("WRITE 5.")[0]).unwrap();
    assert_eq!(parsed.captures.single("at"), None);
    assert_eq!(parsed.captures.single("source"), Some("5"));
}

#[test]
fn clear_collects_every_target() {
    let grammar = Grammar::builtin().unwrap();
    let parser = Parser::new(&grammar);

    let parsed = parser.parse_statement(&statements("CLEAR a b c.")[0]).unwrap();
    match parsed.captures.get("targets") {
        Some(Capture::Repeated(targets)) => {
            let names: Vec<_> = targets.iter().filter_map(|t| t.single("dest")).collect();
            assert_eq!(names, vec!["a", "b", "c"]);
        }
        other => panic!("expected repeated targets, got {:?}", other),
    }
}

#[test]
fn helper_rules_cannot_start_a_statement() {
    let grammar = Grammar::builtin().unwrap();
    let parser = Parser::new(&grammar);

    let err = parser.parse_statement(&statements("cond a = b.")[0]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidKeyword);
}

#[test]
fn custom_grammar_replaces_the_builtin_one() {
    let grammar = Grammar::load("SAY word .").unwrap();
    let parser = Parser::new(&grammar);

    let parsed = parser.parse_statement(&statements("say hello.")[0]).unwrap();
    assert_eq!(parsed.captures.single("word"), Some("hello"));

    let err = parser.parse_statement(&statements("WRITE x.")[0]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidKeyword);
}
