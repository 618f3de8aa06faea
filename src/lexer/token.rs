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

/// A raw token string produced by the lexer.
///
/// Literals keep their opening quote so later stages can tell literal text
/// apart from identifiers and keywords:
///
/// ```text
/// 'Hello'   →  'Hello        (character literal)
/// `World`   →  `World        (string literal)
/// total     →  total         (bare word)
/// ```
pub type Lexeme = String;

/// Opening marker of a character literal (`'text'`).
pub const CHAR_QUOTE: char = '\'';

/// Opening marker of a string literal (`` `text` ``).
pub const STRING_QUOTE: char = '`';

/// Which set of punctuation the lexer splits into single-character lexemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    /// Program text: `.` `,` `:`
    Statement,

    /// Grammar descriptions: `(` `)` `[` `]` `{` `}` `|` `.`
    Grammar,
}

impl LexMode {
    pub fn single_char_lexemes(self) -> &'static str {
        match self {
            LexMode::Statement => ".,:",
            LexMode::Grammar => "()[]{}|.",
        }
    }

    pub fn is_single_char(self, ch: char) -> bool {
        self.single_char_lexemes().contains(ch)
    }
}

pub fn is_char_literal(lexeme: &str) -> bool {
    lexeme.starts_with(CHAR_QUOTE)
}

pub fn is_string_literal(lexeme: &str) -> bool {
    lexeme.starts_with(STRING_QUOTE)
}

/// True for both quoting styles.
pub fn is_literal(lexeme: &str) -> bool {
    is_char_literal(lexeme) || is_string_literal(lexeme)
}

/// The text of a literal lexeme without its quote marker.
pub fn literal_text(lexeme: &str) -> Option<&str> {
    if is_literal(lexeme) {
        Some(&lexeme[1..])
    } else {
        None
    }
}

/// Turns a lexeme back into source text.
///
/// Literals get their closing quote back and embedded quotes are doubled
/// again, so the result lexes to the very same lexeme.
pub fn to_source(lexeme: &str) -> String {
    let quote = match lexeme.chars().next() {
        Some(q) if q == CHAR_QUOTE || q == STRING_QUOTE => q,
        _ => return lexeme.to_string(),
    };

    let mut out = String::with_capacity(lexeme.len() + 2);
    out.push(quote);
    for ch in lexeme[1..].chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
    out
}
