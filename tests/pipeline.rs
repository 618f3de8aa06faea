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

//! End-to-end tests: program text in, report and variables out.

use abapx::interpreter::FixedClock;
use abapx::lexer::{lex, to_statements, LexMode};
use abapx::parser::{group, parse};
use abapx::value::Value;
use abapx::{interpret, ErrorKind, Execution, Grammar, Result, Runner, RunnerConfig};
use chrono::NaiveDate;

fn run(source: &str) -> Result<Execution> {
    let grammar = Grammar::builtin()?;
    interpret(source, &grammar, RunnerConfig::default())
}

fn first_line(source: &str) -> String {
    run(source).unwrap().report.lines[0].trim_end().to_string()
}

fn error_kind(source: &str) -> ErrorKind {
    run(source).unwrap_err().kind
}

fn var(execution: &Execution, name: &str) -> Value {
    execution.environment.get(name).unwrap().get().clone()
}

// ---------------------------------------------------------------------------
// Basics
// ---------------------------------------------------------------------------

#[test]
fn declare_move_write() {
    let execution = run("REPORT 'T'. DATA X TYPE I. MOVE 3 TO X. WRITE X.").unwrap();

    assert_eq!(execution.report.title, "T");
    assert!(execution.report.lines[0].starts_with('3'));
    assert_eq!(var(&execution, "x"), Value::integer(3));
}

#[test]
fn report_layout() {
    let execution = run("REPORT demo LINE-SIZE 6. WRITE 'hi'.").unwrap();
    let rendered = execution.report.to_string();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "REPORT: DEMO");
    assert_eq!(lines[1], "******");
    assert_eq!(lines[2], "hi    ");
    assert_eq!(lines.last(), Some(&"******"));
    assert_eq!(lines.len(), 2 + 20 + 1);
}

#[test]
fn chained_declarations_expand() {
    let execution = run("REPORT 'c'. DATA: A TYPE C LENGTH 3, B TYPE C LENGTH 3. A = 'abc'.").unwrap();

    let a = execution.environment.get("a").unwrap();
    let b = execution.environment.get("b").unwrap();
    assert_eq!(a.to_string(), "a(3) TYPE c VALUE 'abc'");
    assert_eq!(b.to_string(), "b(3) TYPE c VALUE ''");
}

#[test]
fn program_structure_errors() {
    assert_eq!(error_kind(""), ErrorKind::EmptyProgram);
    assert_eq!(error_kind("* only a comment\n"), ErrorKind::EmptyProgram);
    assert_eq!(error_kind("DATA x TYPE i. REPORT 'late'."), ErrorKind::MissingReport);
    assert_eq!(error_kind("REPORT 'a'. REPORT 'b'."), ErrorKind::MisplacedReport);
}

#[test]
fn errors_from_every_stage_reach_the_caller() {
    assert_eq!(error_kind("REPORT 'a"), ErrorKind::UnterminatedLiteral);
    assert_eq!(error_kind("REPORT 'a'"), ErrorKind::MissingTerminator);
    assert_eq!(error_kind("REPORT 'a'. PERFORM x."), ErrorKind::InvalidKeyword);
    assert_eq!(error_kind("REPORT 'a'. ULINE 3."), ErrorKind::GrammarMismatch);
    assert_eq!(error_kind("REPORT 'a'. IF 1 = 1."), ErrorKind::UnbalancedBlock);
    assert_eq!(error_kind("REPORT 'a'. WRITE x."), ErrorKind::UndefinedVariable);
    assert_eq!(error_kind("REPORT 'a'. DATA x. DATA x."), ErrorKind::DuplicateDeclaration);
    assert_eq!(error_kind("REPORT 'a'. ASSERT 1 = 2."), ErrorKind::AssertionFailure);
    assert_eq!(error_kind("REPORT 'a'. SKIP TO LINE 3."), ErrorKind::UnimplementedFeature);
}

// ---------------------------------------------------------------------------
// Types and values
// ---------------------------------------------------------------------------

#[test]
fn fixed_numeric_is_zero_padded() {
    for (value, expected) in [("7", "00007"), ("42", "00042"), ("12345", "12345")] {
        let source = format!("REPORT 'n'. DATA n TYPE n LENGTH 5 VALUE {}. WRITE n.", value);
        assert_eq!(first_line(&source), expected);
    }

    assert_eq!(
        first_line("REPORT 'n'. DATA n TYPE n LENGTH 5 VALUE 42. WRITE n NO-ZERO."),
        "42"
    );
    assert_eq!(
        error_kind("REPORT 'n'. DATA n TYPE n LENGTH 5 VALUE 123456."),
        ErrorKind::LengthOverflow
    );
}

#[test]
fn length_suffix_on_the_name() {
    let execution = run("REPORT 'n'. DATA code(4) TYPE n VALUE 12.").unwrap();
    assert_eq!(execution.environment.get("code").unwrap().to_string(), "code(4) TYPE n VALUE 12");
}

#[test]
fn arithmetic_statements() {
    let execution = run(
        "REPORT 'math'.
         DATA: a TYPE i VALUE 7, b TYPE i, c TYPE i, d TYPE i.
         b = a DIV 2.
         c = a MOD 4.
         d = a * 3.
         ADD 1 TO d.
         SUBTRACT 2 FROM d.
         MULTIPLY d BY 2.
         DIVIDE d BY 4.
         COMPUTE a = a - 10.",
    )
    .unwrap();

    assert_eq!(var(&execution, "b"), Value::integer(3));
    assert_eq!(var(&execution, "c"), Value::integer(3));
    assert_eq!(var(&execution, "d"), Value::integer(10));
    assert_eq!(var(&execution, "a"), Value::integer(-3));

    assert_eq!(error_kind("REPORT 'm'. DATA a TYPE i. a = 1 / 0."), ErrorKind::Arithmetic);
    assert_eq!(error_kind("REPORT 'm'. DATA a TYPE i. a = 1 ** 2."), ErrorKind::InvalidOperator);
    assert_eq!(error_kind("REPORT 'm'. DATA a TYPE i. a = 'x' + 1."), ErrorKind::IncompatibleTypes);
}

#[test]
fn clear_resets_every_target() {
    let execution = run(
        "REPORT 'clr'.
         DATA: a TYPE i VALUE 5, s TYPE string VALUE `x`.
         CLEAR a s.",
    )
    .unwrap();
    assert!(var(&execution, "a").is_initial());
    assert!(var(&execution, "s").is_initial());
}

#[test]
fn records_and_field_references() {
    let execution = run(
        "REPORT 'rec'.
         DATA: BEGIN OF addr,
                 city TYPE string VALUE `Oslo`,
                 BEGIN OF zip,
                   code TYPE n LENGTH 4,
                 END OF zip,
               END OF addr.
         MOVE 42 TO addr-zip-code.
         WRITE addr-zip-code.
         WRITE addr-city.",
    )
    .unwrap();

    assert_eq!(execution.report.lines[0].trim_end(), "0042 Oslo");
    let dump = execution.environment.dump();
    assert!(dump.contains("zip = BEGIN code = 42, END"), "{}", dump);

    assert_eq!(
        error_kind("REPORT 'r'. DATA: BEGIN OF a, x TYPE i, END OF a. a-y = 1."),
        ErrorKind::UnknownField
    );
    assert_eq!(
        error_kind("REPORT 'r'. DATA: BEGIN OF a, x TYPE i, x TYPE c, END OF a."),
        ErrorKind::DuplicateField
    );
    assert_eq!(
        error_kind("REPORT 'r'. DATA: BEGIN OF a, x TYPE i, END OF b."),
        ErrorKind::MismatchedBlockName
    );
}

#[test]
fn constants_and_named_types() {
    assert_eq!(
        error_kind("REPORT 'k'. CONSTANTS pi TYPE i VALUE 3. pi = 4."),
        ErrorKind::ReadOnlyVariable
    );

    assert_eq!(
        first_line("REPORT 'k'. TYPES money TYPE p LENGTH 8. DATA cash TYPE money VALUE 5. WRITE cash."),
        "00000005"
    );

    let execution = run(
        "REPORT 'k'.
         TYPES: BEGIN OF point, x TYPE i, y TYPE i, END OF point.
         DATA p TYPE point.
         p-x = 3.",
    )
    .unwrap();
    assert_eq!(execution.environment.get("p").unwrap().get().get_field("x").unwrap(), &Value::integer(3));

    assert_eq!(error_kind("REPORT 'k'. DATA x TYPE nothing."), ErrorKind::InvalidType);
}

// ---------------------------------------------------------------------------
// Control flow
// ---------------------------------------------------------------------------

#[test]
fn if_chain_takes_the_first_true_branch() {
    let program = |n: i32| {
        format!(
            "REPORT 'if'.
             DATA n TYPE i VALUE {}.
             IF n < 0.
               WRITE 'neg'.
             ELSEIF n = 0.
               WRITE 'zero'.
             ELSE.
               WRITE 'pos'.
             ENDIF.",
            n
        )
    };

    assert_eq!(first_line(&program(-1)), "neg");
    assert_eq!(first_line(&program(0)), "zero");
    assert_eq!(first_line(&program(5)), "pos");
}

#[test]
fn loops_with_exit_and_continue() {
    let execution = run(
        "REPORT 'loops'.
         DATA total TYPE i.
         DO 5 TIMES.
           IF sy-index = 4.
             EXIT.
           ENDIF.
           ADD sy-index TO total.
         ENDDO.",
    )
    .unwrap();
    assert_eq!(var(&execution, "total"), Value::integer(6));

    assert_eq!(
        first_line(
            "REPORT 'c'.
             DO 4 TIMES.
               IF sy-index = 2. CONTINUE. ENDIF.
               WRITE sy-index NO-GAP.
             ENDDO."
        ),
        "134"
    );

    assert_eq!(
        first_line(
            "REPORT 'w'.
             DATA i TYPE i.
             WHILE i < 3.
               i = i + 1.
               WRITE i NO-GAP.
             ENDWHILE."
        ),
        "123"
    );
}

#[test]
fn exit_outside_a_loop_ends_the_program() {
    let execution = run("REPORT 'e'. WRITE 'a'. EXIT. WRITE 'b'.").unwrap();
    assert_eq!(execution.report.lines[0].trim_end(), "a");
}

// ---------------------------------------------------------------------------
// List output
// ---------------------------------------------------------------------------

#[test]
fn write_positions_and_options() {
    assert_eq!(first_line("REPORT 'w'. WRITE 'a'. WRITE 'b'."), "a b");
    assert_eq!(first_line("REPORT 'w'. WRITE 'a' NO-GAP. WRITE 'b'."), "ab");
    assert_eq!(first_line("REPORT 'w'. WRITE 5(3) 'abcdef'."), "    abc");

    let execution = run("REPORT 'w'. WRITE 'a'. WRITE / 'b'. WRITE /. NEW-LINE. WRITE 'c'.").unwrap();
    let lines: Vec<_> = execution.report.lines.iter().map(|l| l.trim_end()).collect();
    assert_eq!(&lines[..3], &["a", "b", "c"]);
}

#[test]
fn uline_and_skip() {
    let execution = run("REPORT 'u' LINE-SIZE 4. WRITE 'a'. ULINE. SKIP 2. WRITE 'b'.").unwrap();
    let lines = &execution.report.lines;
    assert_eq!(lines[0], "a   ");
    assert_eq!(lines[1], "----");
    assert_eq!(lines[2], "    ");
    assert_eq!(lines[3], "    ");
    assert_eq!(lines[4], "b   ");
}

#[test]
fn screen_grows_and_wraps() {
    let execution = run("REPORT 'g' LINE-SIZE 3. WRITE 'abcd'. SKIP 30.").unwrap();
    assert_eq!(execution.report.lines[0], "abc");
    assert_eq!(execution.report.lines[1], "d  ");
    assert!(execution.report.lines.len() > 20);
}

// ---------------------------------------------------------------------------
// System fields
// ---------------------------------------------------------------------------

#[test]
fn system_fields_use_the_injected_clock() {
    let source = "REPORT 'sy' LINE-SIZE 12.
                  DATA: d LIKE sy-datum, t LIKE sy-uzeit, w TYPE i.
                  d = sy-datum.
                  t = sy-uzeit.
                  w = sy-linsz.
                  WRITE d.";

    let grammar = Grammar::builtin().unwrap();
    let lexemes = lex(source, LexMode::Statement).unwrap();
    let statements = to_statements(&lexemes, LexMode::Statement).unwrap();
    let grouped = group(parse(&statements, &grammar).unwrap()).unwrap();

    let instant = NaiveDate::from_ymd_opt(2019, 1, 5)
        .unwrap()
        .and_hms_opt(6, 5, 0)
        .unwrap();
    let execution = Runner::new(RunnerConfig::default())
        .with_clock(FixedClock(instant))
        .run(&grouped)
        .unwrap();

    assert_eq!(execution.report.lines[0].trim_end(), "20190105");
    assert_eq!(var(&execution, "t"), Value::time("060500"));
    assert_eq!(var(&execution, "w"), Value::integer(12));

    assert_eq!(error_kind("REPORT 's'. sy-linsz = 3."), ErrorKind::ReadOnlyVariable);
}

#[test]
fn variable_dump_and_json() {
    let execution = run("REPORT 'v'. DATA: n TYPE n LENGTH 3 VALUE 7, s TYPE string VALUE `hi`.").unwrap();
    assert_eq!(
        execution.environment.dump(),
        "n(3) TYPE n VALUE 7\ns TYPE string VALUE 'hi'\n"
    );
    assert_eq!(execution.environment.to_json(), serde_json::json!({"n": 7, "s": "hi"}));
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

#[test]
fn line_size_is_bounded() {
    assert_eq!(
        error_kind("REPORT t LINE-SIZE 900000000000000000. WRITE 'x'."),
        ErrorKind::ScreenLimit
    );
    assert_eq!(error_kind("REPORT t LINE-SIZE 0."), ErrorKind::ScreenLimit);

    let execution = run("REPORT t LINE-SIZE 1023. WRITE 'x'.").unwrap();
    assert_eq!(execution.report.lines[0].len(), abapx::interpreter::MAX_LINE_SIZE);
}

#[test]
fn skip_count_is_bounded() {
    assert_eq!(error_kind("REPORT t. SKIP 900000000000000000."), ErrorKind::ScreenLimit);

    let execution = run("REPORT t. SKIP 1000.").unwrap();
    assert_eq!(execution.report.lines.len(), 1001);
}

#[test]
fn write_length_stops_at_the_line_end() {
    let execution = run("REPORT t LINE-SIZE 5. WRITE 2(99) 'abcdefgh'.").unwrap();
    assert_eq!(execution.report.lines[0], " abcd");

    let execution = run("REPORT t. WRITE (900000000000000000) 'x'. WRITE 'y'.").unwrap();
    assert_eq!(execution.report.lines[0].trim_end(), "x");
    assert_eq!(execution.report.lines[1].trim_end(), " y");
}

#[test]
fn float_too_large_for_an_integer_is_an_error() {
    assert_eq!(
        error_kind("REPORT t. DATA: f TYPE f, i TYPE i. f = 10000000000. f = f * f. i = f."),
        ErrorKind::Arithmetic
    );
}
