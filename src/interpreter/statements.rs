/*
 * =============================================================================
 *  ABAPX - Reports with Claws!
 * =============================================================================
 *
 *  File:     statements.rs
 *  Purpose:  Statement execution: declarations, assignment, arithmetic,
 *            list output and control flow.
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
use crate::interpreter::display::{MAX_LINE_SIZE, MAX_SKIP_LINES};
use crate::interpreter::Runner;
use crate::lexer::token::literal_text;
use crate::parser::parser::split_position;
use crate::parser::{Captures, GroupedStatement, ParsedStatement};
use crate::value::{ArithOp, BaseType, Data, Type, Value, Var};

/* ============================================================================
 * Execution Control Signals
 * ============================================================================
 */

/// How a statement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecSignal {
    /// Normal fall-through execution.
    None,

    /// `EXIT`: leave the innermost loop.
    Exit,

    /// `CONTINUE`: start the next pass of the innermost loop.
    Continue,
}

/* ============================================================================
 * Statement Execution Entry Point
 * ============================================================================
 */

impl Runner {
    /// Runs statements in order until one of them raises a signal.
    pub fn exec_block(&mut self, block: &[GroupedStatement]) -> Result<ExecSignal> {
        for statement in block {
            match self.exec_statement(statement)? {
                ExecSignal::None => {}
                signal => return Ok(signal),
            }
        }
        Ok(ExecSignal::None)
    }

    pub fn exec_statement(&mut self, statement: &GroupedStatement) -> Result<ExecSignal> {
        debug!(keyword = statement.keyword(), "exec");

        match statement {
            GroupedStatement::Statement(parsed) => self.exec_simple(parsed),

            GroupedStatement::Conditional { parts } => {
                for part in parts {
                    if self.eval_bool(&part.captures)? {
                        return self.exec_block(&part.block);
                    }
                }
                Ok(ExecSignal::None)
            }

            GroupedStatement::Block { statement, block } => match statement.keyword.as_str() {
                "while" => self.exec_while(&statement.captures, block),
                "do" => self.exec_do(&statement.captures, block),
                _ => {
                    self.declare_record(statement, block)?;
                    Ok(ExecSignal::None)
                }
            },
        }
    }

    fn exec_simple(&mut self, statement: &ParsedStatement) -> Result<ExecSignal> {
        let captures = &statement.captures;

        match statement.keyword.as_str() {
            "report" => self.exec_report(captures)?,
            "data" | "constants" | "types" => self.declare(&statement.keyword, captures)?,

            "move" => {
                let value = self.parse_value(required(captures, "source")?)?;
                self.assign(required(captures, "dest")?, &value)?;
            }
            "compute" => self.exec_compute(captures)?,
            "add" => self.exec_arith(captures, ArithOp::Add)?,
            "subtract" => self.exec_arith(captures, ArithOp::Subtract)?,
            "multiply" => self.exec_arith(captures, ArithOp::Multiply)?,
            "divide" => self.exec_arith(captures, ArithOp::Divide)?,
            "clear" => {
                for target in captures.repeated("targets") {
                    let target = self.parse_ref(required(target, "dest")?)?;
                    target.clear(&mut self.environment)?;
                }
            }

            "write" => self.exec_write(captures)?,
            "uline" => self.screen.uline(),
            "new-line" => self.screen.end_line(),
            "skip" => self.exec_skip(captures)?,

            "exit" => return Ok(ExecSignal::Exit),
            "continue" => return Ok(ExecSignal::Continue),

            "assert" => {
                if !self.eval_bool(captures)? {
                    return Err(AbapError::new(
                        ErrorKind::AssertionFailure,
                        format!("assertion failed: {}", serde_json::to_string(captures).unwrap_or_default()),
                    ));
                }
            }

            other => {
                return Err(AbapError::new(
                    ErrorKind::UnimplementedFeature,
                    format!("statement '{}' cannot be executed here", other),
                ));
            }
        }

        Ok(ExecSignal::None)
    }

    /* ------------------------------------------------------------------------
     * REPORT
     * --------------------------------------------------------------------- */

    fn exec_report(&mut self, captures: &Captures) -> Result<()> {
        if self.title.is_some() {
            return Err(AbapError::new(
                ErrorKind::MisplacedReport,
                "REPORT must be the first statement, and appear only once",
            ));
        }

        let title = required(captures, "title")?;
        self.title = Some(literal_text(title).unwrap_or(title).to_string());

        if let Some(width) = captures.single("width") {
            let width = self.count(width)?;
            if !(1..=MAX_LINE_SIZE as i64).contains(&width) {
                return Err(AbapError::new(
                    ErrorKind::ScreenLimit,
                    format!("LINE-SIZE {} is outside 1 to {}", width, MAX_LINE_SIZE),
                ));
            }
            self.screen.set_width(width as usize);
        }
        Ok(())
    }

    /* ------------------------------------------------------------------------
     * Assignment And Arithmetic
     * --------------------------------------------------------------------- */

    fn assign(&mut self, dest: &str, value: &Value) -> Result<()> {
        let target = self.parse_ref(dest)?;
        target.set(&mut self.environment, value)
    }

    fn exec_compute(&mut self, captures: &Captures) -> Result<()> {
        let mut value = self.parse_value(required(captures, "source")?)?;

        if let Some(symbol) = captures.single("operator") {
            let op = ArithOp::parse(symbol).ok_or_else(|| {
                AbapError::new(
                    ErrorKind::InvalidOperator,
                    format!("unknown arithmetic operator '{}'", symbol),
                )
            })?;
            let operand = self.parse_value(required(captures, "operand")?)?;
            value = value.arith(op, &operand)?;
        }

        self.assign(required(captures, "dest")?, &value)
    }

    /// `ADD a TO b`, `SUBTRACT a FROM b`, `MULTIPLY b BY a`, `DIVIDE b BY a`:
    /// the destination is the left operand and receives the result.
    fn exec_arith(&mut self, captures: &Captures, op: ArithOp) -> Result<()> {
        let source = self.parse_value(required(captures, "source")?)?;
        let target = self.parse_ref(required(captures, "dest")?)?;

        let current = target.get(&self.environment)?;
        let result = current.arith(op, &source)?;
        target.set(&mut self.environment, &result)
    }

    /* ------------------------------------------------------------------------
     * List Output
     * --------------------------------------------------------------------- */

    fn exec_write(&mut self, captures: &Captures) -> Result<()> {
        let mut length = None;

        if let Some(at) = captures.single("at") {
            let (new_line, column, width) = split_position(at);
            if new_line {
                self.screen.end_line();
            }
            if let Some(column) = column {
                self.screen.set_column(column.saturating_sub(1));
            }
            length = width.map(|width| width.min(self.screen.remaining()));
        }

        let source = match captures.single("source") {
            Some(source) => source,
            None => return Ok(()),
        };

        let value = self.parse_value(source)?;
        let mut text = value.to_text(captures.flag("no_zero"));
        if let Some(length) = length {
            text = format!("{:<width$.width$}", text, width = length);
        }

        self.screen.puts(&text);
        if !captures.flag("no_gap") {
            self.screen.spacebar();
        }
        Ok(())
    }

    fn exec_skip(&mut self, captures: &Captures) -> Result<()> {
        if captures.flag("to_line") {
            return Err(AbapError::new(
                ErrorKind::UnimplementedFeature,
                "SKIP TO LINE is not supported",
            ));
        }

        let lines = match captures.single("lines") {
            Some(lines) => self.count(lines)?,
            None => 1,
        };
        if lines > MAX_SKIP_LINES as i64 {
            return Err(AbapError::new(
                ErrorKind::ScreenLimit,
                format!("SKIP {} is more than {} lines", lines, MAX_SKIP_LINES),
            ));
        }

        self.screen.end_line();
        for _ in 0..lines.max(0) {
            self.screen.newline();
        }
        Ok(())
    }

    /* ------------------------------------------------------------------------
     * Loops
     * --------------------------------------------------------------------- */

    fn exec_while(&mut self, cond: &Captures, block: &[GroupedStatement]) -> Result<ExecSignal> {
        self.loops.push(0);
        let result = self.run_passes(None, Some(cond), block);
        self.loops.pop();
        result
    }

    fn exec_do(&mut self, captures: &Captures, block: &[GroupedStatement]) -> Result<ExecSignal> {
        let times = match captures.single("count") {
            Some(count) => Some(self.count(count)?.max(0)),
            None => None,
        };

        self.loops.push(0);
        let result = self.run_passes(times, None, block);
        self.loops.pop();
        result
    }

    /// Runs `block` until `times` passes are done, `cond` turns false, or
    /// the block exits. A loop without either limit runs until `EXIT`.
    fn run_passes(
        &mut self,
        times: Option<i64>,
        cond: Option<&Captures>,
        block: &[GroupedStatement],
    ) -> Result<ExecSignal> {
        let mut pass: i64 = 0;

        loop {
            if let Some(times) = times {
                if pass >= times {
                    break;
                }
            }
            if let Some(cond) = cond {
                if !self.eval_bool(cond)? {
                    break;
                }
            }

            pass += 1;
            if let Some(index) = self.loops.last_mut() {
                *index = pass;
            }

            match self.exec_block(block)? {
                ExecSignal::Exit => break,
                ExecSignal::Continue | ExecSignal::None => {}
            }
        }

        Ok(ExecSignal::None)
    }

    /* ------------------------------------------------------------------------
     * Declarations
     * --------------------------------------------------------------------- */

    fn declare(&mut self, keyword: &str, captures: &Captures) -> Result<()> {
        let (name, ty) = self.declared_type(captures)?;

        if keyword == "types" {
            return self.environment.define_type(&name, ty);
        }

        let value = match captures.single("value") {
            Some(value) => Some(self.parse_value(value)?),
            None => None,
        };

        let var = Var::new(&name, ty, value.as_ref())?;
        let var = if keyword == "constants" { var.constant() } else { var };
        debug!(%var, "declared");
        self.environment.define(var)
    }

    fn declare_record(&mut self, opener: &ParsedStatement, block: &[GroupedStatement]) -> Result<()> {
        let name = required(&opener.captures, "struc")?.to_lowercase();
        let value = self.build_record(block)?;

        match opener.keyword.as_str() {
            "types" => self.environment.define_type(&name, value.ty),
            keyword => {
                let var = Var::new(&name, value.ty.clone(), Some(&value))?;
                let var = if keyword == "constants" { var.constant() } else { var };
                debug!(%var, "declared");
                self.environment.define(var)
            }
        }
    }

    /// Builds a record value from the field declarations of a
    /// `BEGIN OF ... END OF` block, nested records included.
    fn build_record(&self, block: &[GroupedStatement]) -> Result<Value> {
        let mut fields: Vec<(String, Value)> = Vec::new();

        for statement in block {
            match statement {
                GroupedStatement::Statement(field) if is_declaration(&field.keyword) => {
                    let (name, ty) = self.declared_type(&field.captures)?;
                    let value = match field.captures.single("value") {
                        Some(value) => ty.convert(&self.parse_value(value)?, true)?,
                        None => ty.initial(),
                    };
                    fields.push((name, value));
                }

                GroupedStatement::Block { statement, block } if is_declaration(&statement.keyword) => {
                    let name = required(&statement.captures, "struc")?.to_lowercase();
                    fields.push((name, self.build_record(block)?));
                }

                other => {
                    return Err(AbapError::new(
                        ErrorKind::InvalidType,
                        format!("'{}' is not allowed inside BEGIN OF ... END OF", other.keyword()),
                    ));
                }
            }
        }

        Value::record(fields)
    }

    /// Resolves the name and type of a declaration.
    ///
    /// The type comes from `TYPE name [LENGTH n]` (a base type or a name
    /// declared with `TYPES`), from `LIKE operand`, or defaults to `c`. A
    /// length may also be written as a suffix: `name(10)`.
    fn declared_type(&self, captures: &Captures) -> Result<(String, Type)> {
        let declared = required(captures, "name")?.to_lowercase();

        let (name, suffix) = match declared.split_once('(') {
            Some((name, rest)) => {
                let length = rest.trim_end_matches(')');
                (name.to_string(), Some(parse_length(length)?))
            }
            None => (declared.clone(), None),
        };

        let length = match captures.single("length") {
            Some(length) => Some(parse_length(literal_text(length).unwrap_or(length))?),
            None => suffix,
        };

        let ty = if let Some(type_name) = captures.single("type") {
            match BaseType::parse(type_name) {
                Some(base) => Type::new(base, length)?,
                None => {
                    let named = self.environment.lookup_type(type_name).cloned().ok_or_else(|| {
                        AbapError::new(
                            ErrorKind::InvalidType,
                            format!("unknown type '{}'", type_name),
                        )
                    })?;
                    if length.is_some() {
                        return Err(AbapError::new(
                            ErrorKind::InvalidType,
                            format!("type '{}' cannot be given a length", type_name),
                        ));
                    }
                    named
                }
            }
        } else if let Some(like) = captures.single("like") {
            self.parse_value(like)?.ty
        } else {
            Type::new(BaseType::C, length)?
        };

        Ok((name, ty))
    }

    /// A whole number operand: a literal or a numeric variable.
    fn count(&self, text: &str) -> Result<i64> {
        let value = self.parse_value(text)?;
        match value.data {
            Data::Number(n) => Ok(n),
            Data::Float(f) => Ok(f.round() as i64),
            _ => {
                let text = value.as_text();
                text.trim().parse().map_err(|_| {
                    AbapError::new(
                        ErrorKind::IncompatibleTypes,
                        format!("{} is not a number", value),
                    )
                })
            }
        }
    }
}

fn is_declaration(keyword: &str) -> bool {
    matches!(keyword, "data" | "constants" | "types")
}

fn parse_length(text: &str) -> Result<usize> {
    text.trim().parse().map_err(|_| {
        AbapError::new(
            ErrorKind::InvalidType,
            format!("'{}' is not a valid length", text),
        )
    })
}

/// A capture the grammar guarantees for this statement.
fn required<'a>(captures: &'a Captures, name: &str) -> Result<&'a str> {
    captures.single(name).ok_or_else(|| {
        AbapError::new(
            ErrorKind::GrammarMismatch,
            format!("statement is missing '{}'", name),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::interpreter::RunnerConfig;
    use crate::lexer::{lex, to_statements, LexMode};
    use crate::parser::{group, parse};

    /// Runs statements on a runner that already has a title, so programs
    /// here need no REPORT of their own.
    fn exec(source: &str) -> Result<Runner> {
        let grammar = Grammar::builtin()?;
        let statements = to_statements(&lex(source, LexMode::Statement)?, LexMode::Statement)?;
        let grouped = group(parse(&statements, &grammar)?)?;

        let mut runner = Runner::new(RunnerConfig { width: 10, height: 3 });
        runner.title = Some("test".to_string());
        runner.exec_block(&grouped)?;
        Ok(runner)
    }

    fn value_of(runner: &Runner, name: &str) -> Value {
        runner.environment.get(name).unwrap().get().clone()
    }

    #[test]
    fn declared_types() {
        let runner = exec(
            "DATA: a, b(4) TYPE n, c TYPE c LENGTH 2, d TYPE d, e LIKE b, f TYPE string.",
        )
        .unwrap();

        let shapes: Vec<_> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|name| {
                let ty = value_of(&runner, name).ty;
                (ty.base, ty.length)
            })
            .collect();
        assert_eq!(
            shapes,
            vec![
                (BaseType::C, Some(1)),
                (BaseType::N, Some(4)),
                (BaseType::C, Some(2)),
                (BaseType::D, Some(8)),
                (BaseType::N, Some(4)),
                (BaseType::String, None),
            ]
        );
    }

    #[test]
    fn named_types_take_no_length() {
        let err = exec("TYPES t TYPE i. DATA x TYPE t LENGTH 3.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidType);
    }

    #[test]
    fn record_blocks_only_hold_declarations() {
        let runner = exec("DATA BEGIN OF r. DATA a TYPE i. DATA END OF r.").unwrap();
        assert!(value_of(&runner, "r").is_struct());

        let err = exec("DATA BEGIN OF r. WRITE 'x'. DATA END OF r.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidType);

        let err = exec("TYPES BEGIN OF r. TYPES END OF r. DATA x TYPE r. MOVE x TO x.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::StructConversionNotAllowed);
    }

    #[test]
    fn compute_with_and_without_operator() {
        let runner = exec("DATA: x TYPE i, y TYPE f. x = 5. y = x / 2.").unwrap();
        assert_eq!(value_of(&runner, "x"), Value::integer(5));
        assert_eq!(value_of(&runner, "y"), Value::float(2.0));
    }

    #[test]
    fn second_report_is_misplaced() {
        let err = exec("REPORT again.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MisplacedReport);
    }

    #[test]
    fn loop_index_is_per_loop() {
        let runner = exec(
            "DATA: outer TYPE i, inner TYPE i.
             DO 2 TIMES.
               DO 3 TIMES.
                 inner = sy-index.
               ENDDO.
               outer = sy-index.
             ENDDO.",
        )
        .unwrap();
        assert_eq!(value_of(&runner, "inner"), Value::integer(3));
        assert_eq!(value_of(&runner, "outer"), Value::integer(2));
        assert!(runner.loops.is_empty());
    }

    #[test]
    fn do_without_count_runs_until_exit() {
        let runner = exec(
            "DATA n TYPE i.
             DO.
               ADD 1 TO n.
               IF n >= 7. EXIT. ENDIF.
             ENDDO.",
        )
        .unwrap();
        assert_eq!(value_of(&runner, "n"), Value::integer(7));
    }

    #[test]
    fn write_pads_and_truncates_to_length() {
        let runner = exec("WRITE (4) 'ab' NO-GAP. WRITE (2) 'xyz'.").unwrap();
        assert_eq!(runner.screen.as_lines()[0], "ab  xy    ");
    }

    #[test]
    fn exit_leaves_only_the_innermost_loop() {
        let runner = exec(
            "DATA n TYPE i.
             DO 3 TIMES.
               DO 5 TIMES.
                 EXIT.
               ENDDO.
               ADD 1 TO n.
             ENDDO.",
        )
        .unwrap();
        assert_eq!(value_of(&runner, "n"), Value::integer(3));
    }
}
