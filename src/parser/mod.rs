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

/// Capture maps produced by matching a statement.
pub mod captures;

/// Backtracking matcher:
/// - Owns the `Parser` struct
/// - Exposes the main `parse(statements, grammar)` entry point
pub mod parser;

/// Second pass that nests block statements:
/// - if / elseif / else / endif
/// - while / do loops
/// - begin of / end of record declarations
pub mod group;

/// Re-export the public entry points so callers can use:
/// `crate::parser::parse(...)` and `crate::parser::group(...)`
pub use captures::{Capture, Captures};
pub use group::{group, ConditionalPart, GroupedStatement};
pub use parser::{parse, ParsedStatement, Parser};
