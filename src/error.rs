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

use thiserror::Error;

/// Pipeline stage an error was raised in.
///
/// Used by the diagnostic printer so a host can tell a syntax problem in the
/// program text apart from a failure while the report was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Segment,
    Grammar,
    Parse,
    Group,
    Types,
    Runtime,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lex => "lexer",
            Stage::Segment => "segmenter",
            Stage::Grammar => "grammar",
            Stage::Parse => "parser",
            Stage::Group => "grouper",
            Stage::Types => "types",
            Stage::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

/// Every failure the interpreter can report.
///
/// All kinds are fatal: the stage that raises one stops immediately and the
/// error travels unchanged to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    // Lexical
    #[error("unterminated literal")]
    UnterminatedLiteral,
    #[error("unsupported character")]
    UnsupportedCharacter,

    // Segmentation
    #[error("unexpected chain")]
    UnexpectedChain,
    #[error("unexpected separator")]
    UnexpectedSeparator,
    #[error("missing terminator")]
    MissingTerminator,

    // Grammar loading
    #[error("unbalanced group")]
    UnbalancedGroup,
    #[error("unresolved rule reference")]
    UnresolvedRuleReference,

    // Statement parsing
    #[error("invalid keyword")]
    InvalidKeyword,
    #[error("grammar mismatch")]
    GrammarMismatch,

    // Grouping
    #[error("mismatched block kind")]
    MismatchedBlockKind,
    #[error("mismatched block name")]
    MismatchedBlockName,
    #[error("unbalanced block")]
    UnbalancedBlock,

    // Types and values
    #[error("length overflow")]
    LengthOverflow,
    #[error("incompatible types")]
    IncompatibleTypes,
    #[error("struct conversion not allowed")]
    StructConversionNotAllowed,
    #[error("duplicate field")]
    DuplicateField,
    #[error("unknown field")]
    UnknownField,
    #[error("invalid type")]
    InvalidType,

    // Runtime
    #[error("duplicate declaration")]
    DuplicateDeclaration,
    #[error("undefined variable")]
    UndefinedVariable,
    #[error("read-only variable")]
    ReadOnlyVariable,
    #[error("invalid operator")]
    InvalidOperator,
    #[error("arithmetic error")]
    Arithmetic,
    #[error("misplaced report")]
    MisplacedReport,
    #[error("missing report")]
    MissingReport,
    #[error("empty program")]
    EmptyProgram,
    #[error("assertion failure")]
    AssertionFailure,
    #[error("unimplemented feature")]
    UnimplementedFeature,
    #[error("screen limit exceeded")]
    ScreenLimit,
}

impl ErrorKind {
    /// Stable error code (E_LEX_UNTERMINATED, E_RUN_UNDEFINED, ...)
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnterminatedLiteral => "E_LEX_UNTERMINATED",
            ErrorKind::UnsupportedCharacter => "E_LEX_CHARACTER",
            ErrorKind::UnexpectedChain => "E_SEG_CHAIN",
            ErrorKind::UnexpectedSeparator => "E_SEG_SEPARATOR",
            ErrorKind::MissingTerminator => "E_SEG_TERMINATOR",
            ErrorKind::UnbalancedGroup => "E_GRAMMAR_GROUP",
            ErrorKind::UnresolvedRuleReference => "E_GRAMMAR_REFERENCE",
            ErrorKind::InvalidKeyword => "E_PARSE_KEYWORD",
            ErrorKind::GrammarMismatch => "E_PARSE_MISMATCH",
            ErrorKind::MismatchedBlockKind => "E_GROUP_KIND",
            ErrorKind::MismatchedBlockName => "E_GROUP_NAME",
            ErrorKind::UnbalancedBlock => "E_GROUP_UNBALANCED",
            ErrorKind::LengthOverflow => "E_TYPE_LENGTH",
            ErrorKind::IncompatibleTypes => "E_TYPE_INCOMPATIBLE",
            ErrorKind::StructConversionNotAllowed => "E_TYPE_STRUCT",
            ErrorKind::DuplicateField => "E_TYPE_DUPLICATE_FIELD",
            ErrorKind::UnknownField => "E_TYPE_UNKNOWN_FIELD",
            ErrorKind::InvalidType => "E_TYPE_INVALID",
            ErrorKind::DuplicateDeclaration => "E_RUN_DUPLICATE",
            ErrorKind::UndefinedVariable => "E_RUN_UNDEFINED",
            ErrorKind::ReadOnlyVariable => "E_RUN_READ_ONLY",
            ErrorKind::InvalidOperator => "E_RUN_OPERATOR",
            ErrorKind::Arithmetic => "E_RUN_ARITHMETIC",
            ErrorKind::MisplacedReport => "E_RUN_MISPLACED_REPORT",
            ErrorKind::MissingReport => "E_RUN_MISSING_REPORT",
            ErrorKind::EmptyProgram => "E_RUN_EMPTY",
            ErrorKind::AssertionFailure => "E_RUN_ASSERT",
            ErrorKind::UnimplementedFeature => "E_RUN_UNIMPLEMENTED",
            ErrorKind::ScreenLimit => "E_RUN_SCREEN_LIMIT",
        }
    }

    pub fn stage(self) -> Stage {
        use ErrorKind::*;

        match self {
            UnterminatedLiteral | UnsupportedCharacter => Stage::Lex,
            UnexpectedChain | UnexpectedSeparator | MissingTerminator => Stage::Segment,
            UnbalancedGroup | UnresolvedRuleReference => Stage::Grammar,
            InvalidKeyword | GrammarMismatch => Stage::Parse,
            MismatchedBlockKind | MismatchedBlockName | UnbalancedBlock => Stage::Group,
            LengthOverflow | IncompatibleTypes | StructConversionNotAllowed | DuplicateField
            | UnknownField | InvalidType => Stage::Types,
            _ => Stage::Runtime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct AbapError {
    /// What went wrong, as a stable, matchable kind.
    pub kind: ErrorKind,

    /// Human-readable message naming the offending statement, lexeme or value.
    pub message: String,

    /// Optional note / help text
    pub help: Option<String>,
}

pub type Result<T> = std::result::Result<T, AbapError>;

impl AbapError {
    /// Generic constructor
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            help: None,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn stage(&self) -> Stage {
        self.kind.stage()
    }

    /// Attach a help message to the error (builder-style).
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}
