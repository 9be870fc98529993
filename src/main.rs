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

// main.rs
//
// This file contains the main entry point for the pipeline hazard
// generator. It provides a command-line interface for generating the
// recognizer tables from a machine description file, or for checking a
// description without building anything.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use pipegen_rust::errors::Severity;
use pipegen_rust::output::Failure;
use pipegen_rust::{generate, parse_description, GeneratorConfig};

#[derive(Parser)]
#[command(name = "pipegen_rust")]
#[command(about = "A pipeline hazard recognizer generator written in Rust")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the recognizer tables from a machine description
    Generate {
        /// Input machine description file
        #[arg(short, long)]
        input: PathBuf,

        /// Write the generated tables as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the human-readable report
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Treat `|` nondeterministically and run subset construction
        #[arg(long)]
        ndfa: bool,

        /// Skip automaton minimization
        #[arg(long)]
        no_minimization: bool,

        /// Collect per-phase wall-clock timings
        #[arg(long)]
        time: bool,

        /// Demote the warning-capable errors to warnings
        #[arg(short, long)]
        warnings: bool,

        /// Number of automata for the heuristic unit partition
        #[arg(long)]
        automata: Option<usize>,
    },
    /// Check a machine description without generating anything
    Check {
        /// Input machine description file
        #[arg(short, long)]
        input: PathBuf,

        /// Demote the warning-capable errors to warnings
        #[arg(short, long)]
        warnings: bool,
    },
}

fn print_diagnostics(diagnostics: &[pipegen_rust::Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Error => eprintln!("{} {}", "error:".red().bold(), diagnostic.message),
            Severity::Warning => {
                eprintln!("{} {}", "warning:".yellow().bold(), diagnostic.message)
            },
        }
    }
}

fn fail(failure: Failure) -> ExitCode {
    print_diagnostics(&failure.diagnostics);
    eprintln!("{} {}", "error:".red().bold(), failure.error);
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            report,
            ndfa,
            no_minimization,
            time,
            warnings,
            automata,
        } => {
            let text = match fs::read_to_string(&input) {
                Ok(text) => text,
                Err(err) => {
                    eprintln!("{} cannot read {}: {}", "error:".red().bold(), input.display(), err);
                    return ExitCode::FAILURE;
                },
            };
            let decls = match parse_description(&text) {
                Ok(decls) => decls,
                Err(err) => {
                    eprintln!("{} {}: {}", "error:".red().bold(), input.display(), err);
                    return ExitCode::FAILURE;
                },
            };
            let mut config = GeneratorConfig::new()
                .with_ndfa(ndfa)
                .with_no_minimization(no_minimization)
                .with_time(time)
                .with_warnings(warnings)
                .with_verbose_report(report.is_some());
            if let Some(count) = automata {
                config = config.with_automata_count(count);
            }

            let generation = match generate(&decls, &config) {
                Ok(generation) => generation,
                Err(failure) => return fail(failure),
            };
            print_diagnostics(&generation.warnings);

            if let Some(path) = output {
                let json = match serde_json::to_string_pretty(generation.dfa.generated()) {
                    Ok(json) => json,
                    Err(err) => {
                        eprintln!("{} cannot serialize tables: {}", "error:".red().bold(), err);
                        return ExitCode::FAILURE;
                    },
                };
                if let Err(err) = fs::write(&path, json) {
                    eprintln!(
                        "{} cannot write {}: {}",
                        "error:".red().bold(),
                        path.display(),
                        err
                    );
                    return ExitCode::FAILURE;
                }
                println!("Tables written to {}", path.display());
            }
            if let (Some(path), Some(text)) = (report, generation.report.as_ref()) {
                if let Err(err) = fs::write(&path, text) {
                    eprintln!(
                        "{} cannot write {}: {}",
                        "error:".red().bold(),
                        path.display(),
                        err
                    );
                    let _ = fs::remove_file(&path);
                    return ExitCode::FAILURE;
                }
                println!("Report written to {}", path.display());
            }

            for entry in &generation.stats.automata {
                println!(
                    "automaton {}: {} state(s), {} arc(s)",
                    entry.automaton, entry.minimal_states, entry.minimal_arcs
                );
            }
            ExitCode::SUCCESS
        },
        Commands::Check { input, warnings } => {
            let text = match fs::read_to_string(&input) {
                Ok(text) => text,
                Err(err) => {
                    eprintln!("{} cannot read {}: {}", "error:".red().bold(), input.display(), err);
                    return ExitCode::FAILURE;
                },
            };
            let decls = match parse_description(&text) {
                Ok(decls) => decls,
                Err(err) => {
                    eprintln!("{} {}: {}", "error:".red().bold(), input.display(), err);
                    return ExitCode::FAILURE;
                },
            };
            let config = GeneratorConfig::new().with_warnings(warnings);
            match pipegen_rust::check_only(&decls, &config) {
                Ok(diagnostics) => {
                    print_diagnostics(&diagnostics);
                    println!("Description is valid");
                    ExitCode::SUCCESS
                },
                Err(failure) => fail(failure),
            }
        },
    }
}
