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

pub mod diagnostics;
pub mod error;
pub mod grammar;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod value;

pub use error::{AbapError, ErrorKind, Result, Stage};
pub use grammar::Grammar;
pub use interpreter::{Execution, Report, Runner, RunnerConfig};

use lexer::LexMode;

/// Runs program text through every stage: lex, segment, parse, group, run.
///
/// The grammar is only borrowed, so one loaded grammar can serve any
/// number of programs.
pub fn interpret(source: &str, grammar: &Grammar, config: RunnerConfig) -> Result<Execution> {
    let lexemes = lexer::lex(source, LexMode::Statement)?;
    let statements = lexer::to_statements(&lexemes, LexMode::Statement)?;
    let parsed = parser::parse(&statements, grammar)?;
    let grouped = parser::group(parsed)?;
    Runner::new(config).run(&grouped)
}
