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

use chrono::{Local, NaiveDateTime};

use crate::error::Result;
use crate::value::Value;

/// Source of the current date and time for `sy-datum` and `sy-uzeit`.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Runtime state the system record reports on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemState {
    pub line_size: usize,

    /// Current pass of the innermost loop, 0 outside loops.
    pub index: i64,

    /// 1-based cursor position.
    pub column: usize,
    pub line: usize,
}

/// Builds the `sy` record. Nothing here is cached; every read of a system
/// field builds a fresh record.
pub fn system_record(clock: &dyn Clock, state: SystemState) -> Result<Value> {
    let now = clock.now();

    Value::record(vec![
        ("linsz".to_string(), Value::integer(state.line_size as i64)),
        ("datum".to_string(), Value::date(now.format("%Y%m%d").to_string())),
        ("uzeit".to_string(), Value::time(now.format("%H%M%S").to_string())),
        ("index".to_string(), Value::integer(state.index)),
        ("colno".to_string(), Value::integer(state.column as i64)),
        ("linno".to_string(), Value::integer(state.line as i64)),
    ])
}
