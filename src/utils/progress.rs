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

// progress.rs
//
// This file contains the stderr progress ticker for the state construction.
// Large machine descriptions can take a while; one dot per hundred states
// keeps the user informed.

use std::io::Write;

pub struct Ticker {
    enabled: bool,
    count: usize,
    ticked: bool,
}

impl Ticker {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            count: 0,
            ticked: false,
        }
    }

    /// Count one new state; every hundredth emits a tick.
    pub fn tick(&mut self) {
        self.count += 1;
        if self.enabled && self.count % 100 == 0 {
            eprint!(".");
            let _ = std::io::stderr().flush();
            self.ticked = true;
        }
    }

    /// Terminate the tick line, if any tick was written.
    pub fn finish(&mut self) {
        if self.ticked {
            eprintln!();
            self.ticked = false;
        }
    }

    pub fn states_counted(&self) -> usize {
        self.count
    }
}
