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

// config.rs
//
// This file contains the configuration struct for the generator core.
// Options mirror the recognized command set; unknown options are rejected.

use crate::errors::GeneratorError;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Treat `|` nondeterministically and run subset construction.
    pub ndfa: bool,
    /// Skip the minimization phase entirely.
    pub no_minimization: bool,
    /// Collect wall-clock timings per phase for the report.
    pub time: bool,
    /// Emit the human-readable report alongside the tables.
    pub verbose_report: bool,
    /// Demote the warning-capable checker errors to warnings.
    pub warnings: bool,
    /// Number of automata for the heuristic unit partitioner. Used only when
    /// the description declares no automata.
    pub automata_count: Option<usize>,
    /// Emit a progress tick to stderr every 100 constructed states.
    pub progress: bool,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self {
            ndfa: false,
            no_minimization: false,
            time: false,
            verbose_report: false,
            warnings: false,
            automata_count: None,
            progress: true,
        }
    }

    pub fn with_ndfa(mut self, enabled: bool) -> Self {
        self.ndfa = enabled;
        self
    }

    pub fn with_no_minimization(mut self, enabled: bool) -> Self {
        self.no_minimization = enabled;
        self
    }

    pub fn with_time(mut self, enabled: bool) -> Self {
        self.time = enabled;
        self
    }

    pub fn with_verbose_report(mut self, enabled: bool) -> Self {
        self.verbose_report = enabled;
        self
    }

    pub fn with_warnings(mut self, enabled: bool) -> Self {
        self.warnings = enabled;
        self
    }

    pub fn with_automata_count(mut self, count: usize) -> Self {
        assert!(count > 0, "Automata count must be positive");
        self.automata_count = Some(count);
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Apply a list of textual options of the historical form
    /// (`no-minimization`, `ndfa`, `time`, `v`, `w`), with or without a
    /// leading dash. Unknown options are rejected; `split` is recognized
    /// but has never been implemented.
    pub fn parse_options(mut self, options: &[&str]) -> Result<Self, GeneratorError> {
        for option in options {
            let name = option.trim_start_matches('-');
            match name {
                "no-minimization" => self.no_minimization = true,
                "ndfa" => self.ndfa = true,
                "time" => self.time = true,
                "v" => self.verbose_report = true,
                "w" => self.warnings = true,
                "split" => {
                    return Err(GeneratorError::UnimplementedOption("-split".to_string()));
                },
                _ => return Err(GeneratorError::InvalidOption(option.to_string())),
            }
        }
        Ok(self)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}
