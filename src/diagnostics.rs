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

use crate::error::AbapError;

/// Responsible for rendering human-friendly, compiler-style diagnostics
/// for ABAPX errors.
///
/// This printer:
/// - Formats errors with their stable code and message
/// - Names the file and the pipeline stage that failed
/// - Optionally shows a helpful follow-up hint
///
/// The output is inspired by `rustc` diagnostics and stays readable
/// without color.
pub struct DiagnosticPrinter {
    /// Name of the program being interpreted (e.g. `demo.abap`, `<stdin>`).
    ///
    /// Used only for display purposes in diagnostics.
    file_name: String,
}

impl DiagnosticPrinter {
    /// Creates a new diagnostic printer for a given program.
    ///
    /// # Arguments
    /// - `file_name` → The name of the file being executed
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Renders a diagnostic.
    ///
    /// # Output Example
    /// ```text
    /// error[E_RUN_UNDEFINED]: undefined variable: 'x' is not declared
    ///   --> demo.abap (runtime)
    ///
    /// help: Declare it first with DATA.
    /// ```
    pub fn render(&self, error: &AbapError) -> String {
        let mut out = format!(
            "error[{}]: {}\n  --> {} ({})\n",
            error.code(),
            error,
            self.file_name,
            error.stage()
        );

        if let Some(help) = &error.help {
            out.push_str(&format!("\nhelp: {}\n", help));
        }

        out
    }

    /// Prints a formatted error diagnostic to stderr.
    pub fn print(&self, error: &AbapError) {
        eprint!("{}", self.render(error));
    }
}
