/*
 * =============================================================================
 *  ABAPX - Reports with Claws!
 * =============================================================================
 *
 *  File:     mod.rs
 *  Purpose:  The runner: owns the environment, the list screen and the
 *            loop stack for a single program run.
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

pub mod display;
pub mod environment;
pub mod expressions;
pub mod operands;
pub mod statements;
pub mod system;

use tracing::info;

use crate::error::{AbapError, ErrorKind, Result};
use crate::parser::GroupedStatement;
use crate::value::Value;

pub use display::{Report, Screen, MAX_LINE_SIZE, MAX_SKIP_LINES};
pub use environment::Environment;
pub use operands::Ref;
pub use statements::ExecSignal;
pub use system::{Clock, FixedClock, LocalClock, SystemState};

/// Screen size a run starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 20,
        }
    }
}

/// The result of a successful run.
#[derive(Debug, Clone)]
pub struct Execution {
    pub report: Report,
    pub environment: Environment,
}

/// Executes one grouped program.
///
/// A runner owns its environment and screen for exactly one run; `run`
/// consumes it, so state never leaks from one program into the next.
pub struct Runner {
    clock: Box<dyn Clock>,
    pub(crate) environment: Environment,
    pub(crate) screen: Screen,
    pub(crate) title: Option<String>,

    /// Current pass of every enclosing loop, innermost last.
    pub(crate) loops: Vec<i64>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("environment", &self.environment)
            .field("screen", &self.screen)
            .field("title", &self.title)
            .field("loops", &self.loops)
            .finish_non_exhaustive()
    }
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            clock: Box::new(LocalClock),
            environment: Environment::new(),
            screen: Screen::new(config.width, config.height),
            title: None,
            loops: Vec::new(),
        }
    }

    /// Replaces the clock behind `sy-datum` and `sy-uzeit`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Runs a whole program.
    ///
    /// The first statement has to be `REPORT`. `EXIT` or `CONTINUE` outside
    /// of any loop ends the program early; the report so far is kept.
    ///
    /// # Errors
    /// - `EmptyProgram` for an empty statement list
    /// - `MissingReport` if the first statement is not `REPORT`
    /// - anything a statement raises; the partial report is discarded
    pub fn run(mut self, statements: &[GroupedStatement]) -> Result<Execution> {
        let first = statements.first().ok_or_else(|| {
            AbapError::new(ErrorKind::EmptyProgram, "there are no statements to run")
        })?;

        if first.keyword() != "report" {
            return Err(AbapError::new(
                ErrorKind::MissingReport,
                format!("program starts with '{}' instead of REPORT", first.keyword()),
            )
            .with_help("Start the program with a statement like: REPORT zdemo."));
        }

        info!(statements = statements.len(), "running");
        let signal = self.exec_block(statements)?;
        if signal != ExecSignal::None {
            info!(?signal, "program left early");
        }

        let title = self.title.take().unwrap_or_default();
        Ok(Execution {
            report: Report::new(title, &self.screen),
            environment: self.environment,
        })
    }

    /// The `sy` record as of right now.
    pub fn system_value(&self) -> Result<Value> {
        let (column, line) = self.screen.cursor();
        let state = SystemState {
            line_size: self.screen.width(),
            index: self.loops.last().copied().unwrap_or(0),
            column: column + 1,
            line: line + 1,
        };
        system::system_record(self.clock.as_ref(), state)
    }
}
