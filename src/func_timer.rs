/*
 *  func_timer.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scope timer for the per-frame pipeline
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::{Duration, Instant};

use log::{trace, warn};

/// Times a scope against a budget and reports when it goes out of scope.
///
/// Over budget is a warning, anything else is trace-level.
pub struct FrameTimer {
    name: &'static str,
    budget: Duration,
    start: Instant,
}

impl FrameTimer {
    pub fn new(name: &'static str, budget: Duration) -> Self {
        FrameTimer {
            name,
            budget,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn is_over_budget(&self) -> bool {
        self.elapsed() > self.budget
    }
}

// called automatically when the timer goes out of scope
impl Drop for FrameTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        if duration > self.budget {
            warn!("'{}' took {:?}, over its {:?} budget", self.name, duration, self.budget);
        } else {
            trace!("'{}' took {:?}", self.name, duration);
        }
    }
}
