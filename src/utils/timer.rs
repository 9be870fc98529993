// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// timer.rs
//
// This file contains the scoped phase timers. Each phase acquires a timer
// at entry and releases it at exit; the accumulated durations feed the
// statistics section of the report when timing is requested.

use std::time::Instant;

pub struct PhaseTimer {
    name: &'static str,
    start: Instant,
}

#[derive(Debug, Default)]
pub struct TimeCollector {
    enabled: bool,
    phases: Vec<(String, f64)>,
}

impl TimeCollector {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            phases: Vec::new(),
        }
    }

    pub fn start(&self, name: &'static str) -> Option<PhaseTimer> {
        if self.enabled {
            Some(PhaseTimer {
                name,
                start: Instant::now(),
            })
        } else {
            None
        }
    }

    pub fn stop(&mut self, timer: Option<PhaseTimer>) {
        if let Some(timer) = timer {
            let elapsed = timer.start.elapsed().as_secs_f64() * 1000.0;
            self.phases.push((timer.name.to_string(), elapsed));
        }
    }

    pub fn phases(&self) -> &[(String, f64)] {
        &self.phases
    }
}
