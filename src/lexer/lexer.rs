/*
 * =============================================================================
 *  ABAPX - Reports with Claws!
 * =============================================================================
 *
 *  File:     lexer.rs
 *  Purpose:  Character-level lexer shared by program text and grammar
 *            descriptions. Produces raw lexemes; literals keep their quote.
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

use tracing::trace;

use crate::error::{AbapError, ErrorKind, Result};
use crate::lexer::token::{LexMode, Lexeme, CHAR_QUOTE, STRING_QUOTE};

/// Marker that turns the rest of a line into a comment when it is the very
/// first character of the line.
const LINE_COMMENT: char = '*';

/// Marker that turns the rest of a line into a comment anywhere between
/// lexemes.
const TRAILING_COMMENT: char = '"';

/// States of the character-driven lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the first character of a line.
    Newline,

    /// Inside a comment, waiting for the end of the line.
    Comment,

    /// Between lexemes.
    Whitespace,

    /// Inside a `'...'` literal.
    CharLiteral,

    /// Just saw a `'` inside a character literal: either it doubles the quote
    /// or it closes the literal.
    CharLiteralQuote,

    /// Inside a `` `...` `` literal.
    StringLiteral,

    /// Just saw a backtick inside a string literal.
    StringLiteralQuote,

    /// Collecting a bare word.
    Word,
}

/// Converts raw text into an ordered list of lexemes.
///
/// # Parameters
/// - `text`: program text or grammar description
/// - `mode`: which punctuation is split into single-character lexemes
///
/// # Errors
/// - `UnterminatedLiteral` if the input ends inside a literal
/// - `UnsupportedCharacter` for control characters outside literals
pub fn lex(text: &str, mode: LexMode) -> Result<Vec<Lexeme>> {
    let mut lexer = Lexer::new(mode);

    for ch in text.chars() {
        lexer.feed(ch)?;
    }

    lexer.finish()
}

struct Lexer {
    mode: LexMode,
    state: State,
    lexeme: String,
    lexemes: Vec<Lexeme>,

    /// 1-based line number, for error messages only.
    line: usize,
}

impl Lexer {
    fn new(mode: LexMode) -> Self {
        Self {
            mode,
            state: State::Newline,
            lexeme: String::new(),
            lexemes: Vec::new(),
            line: 1,
        }
    }

    /// Feeds one character through the state machine.
    ///
    /// A state may hand the same character on to the next state, which is
    /// why this loops until some state consumes it.
    fn feed(&mut self, ch: char) -> Result<()> {
        loop {
            trace!(ch = ?ch, state = ?self.state, "lex");

            let consumed = match self.state {
                State::Newline => {
                    if ch == LINE_COMMENT {
                        self.state = State::Comment;
                        true
                    } else {
                        self.state = State::Whitespace;
                        false
                    }
                }

                State::Comment => {
                    if ch == '\n' {
                        self.state = State::Newline;
                    }
                    true
                }

                State::Whitespace => {
                    if ch == '\n' {
                        self.state = State::Newline;
                    } else if ch.is_whitespace() {
                        // skip
                    } else if self.mode.is_single_char(ch) {
                        self.lexemes.push(ch.to_string());
                    } else if ch == TRAILING_COMMENT {
                        self.state = State::Comment;
                    } else if ch == CHAR_QUOTE {
                        self.lexeme.push(ch);
                        self.state = State::CharLiteral;
                    } else if ch == STRING_QUOTE {
                        self.lexeme.push(ch);
                        self.state = State::StringLiteral;
                    } else {
                        self.check_supported(ch)?;
                        self.state = State::Word;
                        return self.feed_word(ch);
                    }
                    true
                }

                State::CharLiteral => {
                    if ch == CHAR_QUOTE {
                        self.state = State::CharLiteralQuote;
                    } else {
                        self.lexeme.push(ch);
                    }
                    true
                }

                State::CharLiteralQuote => {
                    if ch == CHAR_QUOTE {
                        self.lexeme.push(ch);
                        self.state = State::CharLiteral;
                        true
                    } else {
                        self.emit();
                        false
                    }
                }

                State::StringLiteral => {
                    if ch == STRING_QUOTE {
                        self.state = State::StringLiteralQuote;
                    } else {
                        self.lexeme.push(ch);
                    }
                    true
                }

                State::StringLiteralQuote => {
                    if ch == STRING_QUOTE {
                        self.lexeme.push(ch);
                        self.state = State::StringLiteral;
                        true
                    } else {
                        self.emit();
                        false
                    }
                }

                State::Word => return self.feed_word(ch),
            };

            if consumed {
                if ch == '\n' {
                    self.line += 1;
                }
                return Ok(());
            }
        }
    }

    fn feed_word(&mut self, ch: char) -> Result<()> {
        if ch.is_whitespace() || self.mode.is_single_char(ch) {
            self.emit();
            return self.feed(ch);
        }

        self.check_supported(ch)?;
        self.lexeme.push(ch);
        Ok(())
    }

    /// Closes the current lexeme and goes back to skipping whitespace.
    fn emit(&mut self) {
        self.lexemes.push(std::mem::take(&mut self.lexeme));
        self.state = State::Whitespace;
    }

    fn check_supported(&self, ch: char) -> Result<()> {
        if ch.is_control() {
            return Err(AbapError::new(
                ErrorKind::UnsupportedCharacter,
                format!("unsupported character {:?} on line {}", ch, self.line),
            ));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Lexeme>> {
        match self.state {
            State::CharLiteral | State::StringLiteral => {
                return Err(AbapError::new(
                    ErrorKind::UnterminatedLiteral,
                    format!(
                        "literal {} is not closed before the end of input (line {})",
                        self.lexeme, self.line
                    ),
                )
                .with_help("close the literal with the same quote it was opened with"));
            }
            _ => {}
        }

        if !self.lexeme.is_empty() {
            self.lexemes.push(std::mem::take(&mut self.lexeme));
        }

        Ok(self.lexemes)
    }
}
