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

/// Character-driven state machine that turns text into lexemes.
pub mod lexer;

/// Groups lexemes into period-terminated statements, expanding chains.
pub mod statements;

/// Lexeme helpers: quote markers, lexing modes, re-serialization.
pub mod token;

pub use lexer::lex;
pub use statements::{to_statements, Statement};
pub use token::{LexMode, Lexeme};
