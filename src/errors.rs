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

// errors.rs
//
// This file contains the error types for the pipeline hazard generator.
// It defines the fatal generator errors and the diagnostics collected by
// the description checker.

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum GeneratorError {
    // Option errors
    InvalidOption(String),
    UnimplementedOption(String),

    // Description errors
    ParseError { line: usize, message: String },
    CheckFailed { errors: usize },

    // Reservation set errors
    CycleOutOfRange { cycle: usize, max_cycles: usize },

    // System errors
    IoError(std::io::Error),
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::InvalidOption(name) => {
                write!(f, "invalid option `{}`", name)
            },
            GeneratorError::UnimplementedOption(name) => {
                write!(f, "option `{}` has not been implemented yet", name)
            },
            GeneratorError::ParseError { line, message } => {
                write!(f, "line {}: {}", line, message)
            },
            GeneratorError::CheckFailed { errors } => {
                write!(f, "description check failed with {} error(s)", errors)
            },
            GeneratorError::CycleOutOfRange { cycle, max_cycles } => {
                write!(
                    f,
                    "reservation cycle {} is out of range (max cycles {})",
                    cycle, max_cycles
                )
            },
            GeneratorError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for GeneratorError {}

impl From<std::io::Error> for GeneratorError {
    fn from(error: std::io::Error) -> Self {
        GeneratorError::IoError(error)
    }
}

/// Severity of a checker diagnostic. Errors stop the pipeline at the end of
/// the phase that produced them; warnings are reported and processing goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}
