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

use serde::Serialize;

/* ============================================================================
 * Screen
 * ============================================================================
 */

/// Widest line a list can have.
pub const MAX_LINE_SIZE: usize = 1023;

/// Most blank lines one `SKIP` may produce, and the tallest starting grid.
pub const MAX_SKIP_LINES: usize = 1000;

/// A character grid with a write cursor.
///
/// The grid starts at the configured size and grows by one blank row each
/// time the cursor moves past the bottom. Writing past the right edge wraps
/// to the next row.
#[derive(Debug, Clone)]
pub struct Screen {
    width: usize,
    rows: Vec<Vec<char>>,
    x: usize,
    y: usize,
}

impl Screen {
    /// Both sizes are clamped to `1..=MAX_LINE_SIZE` and `1..=MAX_SKIP_LINES`.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.clamp(1, MAX_LINE_SIZE);
        Self {
            width,
            rows: vec![vec![' '; width]; height.clamp(1, MAX_SKIP_LINES)],
            x: 0,
            y: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cursor as `(column, row)`, both 0-based.
    pub fn cursor(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Changes the line width, keeping what is already on screen.
    ///
    /// Callers check the width against `MAX_LINE_SIZE` first; anything
    /// outside `1..=MAX_LINE_SIZE` is clamped here.
    pub fn set_width(&mut self, width: usize) {
        let width = width.clamp(1, MAX_LINE_SIZE);
        for row in &mut self.rows {
            row.resize(width, ' ');
        }
        self.width = width;
        if self.x >= width {
            self.newline();
        }
    }

    pub fn putc(&mut self, c: char) {
        self.rows[self.y][self.x] = c;
        self.spacebar();
    }

    pub fn puts(&mut self, text: &str) {
        for c in text.chars() {
            self.putc(c);
        }
    }

    /// Moves one cell right, wrapping at the edge.
    pub fn spacebar(&mut self) {
        self.x += 1;
        if self.x >= self.width {
            self.newline();
        }
    }

    pub fn newline(&mut self) {
        self.x = 0;
        self.y += 1;
        if self.y >= self.rows.len() {
            self.rows.push(vec![' '; self.width]);
        }
    }

    /// Starts a new line unless the cursor already is at the start of one.
    pub fn end_line(&mut self) {
        if self.x != 0 {
            self.newline();
        }
    }

    /// Moves to a 0-based column of the current line.
    pub fn set_column(&mut self, column: usize) {
        self.x = column.min(self.width - 1);
    }

    /// Cells left on the current line, the cursor cell included.
    pub fn remaining(&self) -> usize {
        self.width - self.x
    }

    /// A full-width line of dashes on a line of its own.
    pub fn uline(&mut self) {
        self.end_line();
        for _ in 0..self.width {
            self.putc('-');
        }
    }

    pub fn as_lines(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.iter().collect()).collect()
    }
}

/* ============================================================================
 * Report
 * ============================================================================
 */

/// The finished output of a run: the title plus the screen rows.
///
/// ```text
/// REPORT: TITLE
/// ****************
/// rows as stored
/// ****************
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub width: usize,
    pub lines: Vec<String>,
}

impl Report {
    pub fn new(title: impl Into<String>, screen: &Screen) -> Self {
        Self {
            title: title.into(),
            width: screen.width(),
            lines: screen.as_lines(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = "*".repeat(self.width);

        writeln!(f, "REPORT: {}", self.title.to_uppercase())?;
        writeln!(f, "{}", border)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f, "{}", border)
    }
}
