/*
 * =============================================================================
 *  ABAPX - Reports with Claws!
 * =============================================================================
 *
 *  File:     main.rs
 *  Purpose:  Command line front end. Runs a program through the chosen
 *            stage and prints the requested artifacts.
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

//! Command-line driver for the ABAPX report interpreter.
//!
//! Reads a program from a file (or stdin), runs it through the pipeline up
//! to the requested stage, and prints whichever intermediate artifacts were
//! asked for.
//!
//! # Examples
//!
//! ```bash
//! # Run a report and print it
//! abapx demo.abap
//!
//! # Show how statements were parsed, as JSON
//! abapx demo.abap --stage parse --parsed-stmts --json
//!
//! # List the grammar
//! abapx --keywords --stage lex < /dev/null
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::info;

use abapx::diagnostics::DiagnosticPrinter;
use abapx::lexer::{lex, to_statements, LexMode};
use abapx::parser::{group, parse};
use abapx::{AbapError, Grammar, Runner, RunnerConfig};

/// Last pipeline stage to run. Every stage implies the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Stage {
    Lex,
    Parse,
    Group,
    Run,
}

#[derive(Parser, Debug)]
#[command(name = "abapx")]
#[command(author, version, about = "Interpreter for ABAP-style report programs", long_about = None)]
struct Cli {
    /// Program file; reads stdin when omitted
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Last stage to run
    #[arg(long, value_enum, default_value = "run")]
    stage: Stage,

    /// Grammar description to use instead of the built-in one
    #[arg(long, value_name = "FILE")]
    grammar: Option<PathBuf>,

    /// Print every grammar rule as a tree
    #[arg(long)]
    keywords: bool,

    /// Lex the input as a grammar description
    #[arg(long)]
    lex_syntax: bool,

    /// Print lexemes, one per line
    #[arg(long)]
    lexemes: bool,

    /// Print segmented statements
    #[arg(long)]
    stmts: bool,

    /// Print parsed statements
    #[arg(long)]
    parsed_stmts: bool,

    /// Print the grouped statement tree
    #[arg(long)]
    grouped_stmts: bool,

    /// Print the report (the default when nothing else is requested)
    #[arg(long)]
    report: bool,

    /// Print the final variables
    #[arg(long)]
    vars: bool,

    /// Print statements, the report and variables as JSON
    #[arg(long)]
    json: bool,

    /// Screen width
    #[arg(long, default_value_t = RunnerConfig::default().width)]
    width: usize,

    /// Screen height
    #[arg(long, default_value_t = RunnerConfig::default().height)]
    height: usize,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn wants_report(&self) -> bool {
        self.report
            || !(self.keywords
                || self.lexemes
                || self.stmts
                || self.parsed_stmts
                || self.grouped_stmts
                || self.vars)
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error(transparent)]
    Abap(#[from] AbapError),

    #[error("cannot write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let file_name = match &cli.input {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_string(),
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Abap(error)) => {
            DiagnosticPrinter::new(file_name).print(&error);
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let grammar = match &cli.grammar {
        Some(path) => Grammar::load(&read_file(path)?)?,
        None => Grammar::builtin()?,
    };
    info!(rules = grammar.len(), "grammar ready");

    if cli.keywords {
        print!("{}", grammar.describe());
    }

    let text = match &cli.input {
        Some(path) => read_file(path)?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            text
        }
    };

    // lex text into statements
    let mode = if cli.lex_syntax {
        LexMode::Grammar
    } else {
        LexMode::Statement
    };
    let lexemes = lex(&text, mode)?;
    if cli.lexemes {
        for lexeme in &lexemes {
            println!("{}", lexeme);
        }
    }

    let statements = to_statements(&lexemes, mode)?;
    info!(statements = statements.len(), "lexed");
    if cli.stmts {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&statements)?);
        } else {
            for statement in &statements {
                println!("{}", statement);
            }
        }
    }

    if cli.stage < Stage::Parse || cli.lex_syntax {
        return Ok(());
    }

    // parse statements
    let parsed = parse(&statements, &grammar)?;
    info!(statements = parsed.len(), "parsed");
    if cli.parsed_stmts {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        } else {
            println!("PARSED STATEMENTS:");
            for statement in &parsed {
                println!("{} -> {}", statement.keyword, serde_json::to_string(&statement.captures)?);
            }
        }
    }

    if cli.stage < Stage::Group {
        return Ok(());
    }

    // group statements into blocks
    let grouped = group(parsed)?;
    info!(statements = grouped.len(), "grouped");
    if cli.grouped_stmts {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&grouped)?);
        } else {
            println!("GROUPED STATEMENTS:");
            let mut out = String::new();
            for statement in &grouped {
                statement.write_tree(&mut out, 1);
            }
            print!("{}", out);
        }
    }

    if cli.stage < Stage::Run {
        return Ok(());
    }

    // run
    let config = RunnerConfig {
        width: cli.width,
        height: cli.height,
    };
    let execution = Runner::new(config).run(&grouped)?;
    info!("finished");

    if cli.wants_report() {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&execution.report)?);
        } else {
            print!("{}", execution.report);
        }
    }
    if cli.vars {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&execution.environment.to_json())?);
        } else {
            print!("{}", execution.environment.dump());
        }
    }

    Ok(())
}

fn read_file(path: &PathBuf) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}
