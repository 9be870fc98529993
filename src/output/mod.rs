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

// mod.rs
//
// This file drives the whole generation pipeline: check, transform,
// partition, build, encode, and report. Each phase must complete cleanly
// before the next runs.

pub mod emitter;
pub mod report;
pub mod runtime;

use log::info;
use serde::Serialize;

use crate::config::GeneratorConfig;
use crate::description::checker;
use crate::description::decls::Decl;
use crate::description::transform;
use crate::automaton::partition::units_to_automata;
use crate::automaton::reservs::SetDims;
use crate::errors::{Diagnostic, GeneratorError};
use crate::utils::timer::TimeCollector;

use emitter::GeneratedDfa;
use runtime::Dfa;

#[derive(Debug, Clone, Serialize)]
pub struct AutomatonStatsEntry {
    pub automaton: usize,
    pub name: Option<String>,
    pub ndfa_states: usize,
    pub ndfa_arcs: usize,
    pub dfa_states: usize,
    pub dfa_arcs: usize,
    pub minimal_states: usize,
    pub minimal_arcs: usize,
    pub locked_states: usize,
    pub transition_comb: bool,
    pub transition_elements: usize,
    pub state_alts_comb: bool,
    pub state_alts_elements: usize,
    pub min_delay_bits: u8,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationStats {
    pub automata: Vec<AutomatonStatsEntry>,
    pub phase_times_ms: Vec<(String, f64)>,
}

/// Everything a successful run hands to the collaborators.
#[derive(Debug)]
pub struct Generation {
    pub dfa: Dfa,
    pub report: Option<String>,
    pub warnings: Vec<Diagnostic>,
    pub stats: GenerationStats,
}

/// A failed run: the fatal error plus whatever diagnostics were collected
/// before the pipeline stopped.
#[derive(Debug)]
pub struct Failure {
    pub error: GeneratorError,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<GeneratorError> for Failure {
    fn from(error: GeneratorError) -> Self {
        Self {
            error,
            diagnostics: Vec::new(),
        }
    }
}

/// Run the whole pipeline on a declaration list.
pub fn generate(decls: &[Decl], config: &GeneratorConfig) -> Result<Generation, Failure> {
    let mut timers = TimeCollector::new(config.time);

    let timer = timers.start("check");
    let (mut desc, mut warnings) = match checker::check(decls, config) {
        Ok(result) => result,
        Err(diagnostics) => {
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            return Err(Failure {
                error: GeneratorError::CheckFailed { errors },
                diagnostics,
            });
        },
    };
    timers.stop(timer);

    let timer = timers.start("transform");
    transform::transform_insn_regexps(&mut desc);
    timers.stop(timer);

    let timer = timers.start("partition");
    units_to_automata(&mut desc, config);
    warnings.extend(transform::check_unit_distribution(&desc));
    timers.stop(timer);

    let timer = timers.start("build automata");
    let automata = crate::automaton::build_automata(&mut desc, config)?;
    timers.stop(timer);

    let timer = timers.start("encode tables");
    let dims = SetDims::new(desc.max_insn_reserv_cycles, desc.units_num());
    let generated: GeneratedDfa = emitter::emit(&desc, &automata, &dims);
    timers.stop(timer);

    let mut stats = GenerationStats {
        automata: automata
            .iter()
            .zip(&generated.automata)
            .map(|(automaton, tables)| AutomatonStatsEntry {
                automaton: automaton.automaton_num,
                name: automaton.name.clone(),
                ndfa_states: automaton.stats.ndfa_states,
                ndfa_arcs: automaton.stats.ndfa_arcs,
                dfa_states: automaton.stats.dfa_states,
                dfa_arcs: automaton.stats.dfa_arcs,
                minimal_states: automaton.stats.minimal_states,
                minimal_arcs: automaton.stats.minimal_arcs,
                locked_states: tables.dead_lock.iter().filter(|&&b| b == 1).count(),
                transition_comb: tables.transition.is_comb(),
                transition_elements: tables.transition.stored_len(),
                state_alts_comb: tables.state_alts.is_comb(),
                state_alts_elements: tables.state_alts.stored_len(),
                min_delay_bits: tables.min_issue_delay.bits_per_entry,
            })
            .collect(),
        phase_times_ms: Vec::new(),
    };
    stats.phase_times_ms = timers.phases().to_vec();

    let report = if config.verbose_report {
        Some(report::write_report(
            &desc, &automata, &generated, &stats, &dims,
        ))
    } else {
        None
    };

    info!(
        "generated {} automaton(s) for {} instruction(s)",
        generated.automata.len(),
        desc.insns_num()
    );

    Ok(Generation {
        dfa: Dfa::new(generated),
        report,
        warnings,
        stats,
    })
}

/// Run only the front phases: check and canonicalize, reporting
/// diagnostics without building any automaton.
pub fn check_only(decls: &[Decl], config: &GeneratorConfig) -> Result<Vec<Diagnostic>, Failure> {
    let (mut desc, mut warnings) = match checker::check(decls, config) {
        Ok(result) => result,
        Err(diagnostics) => {
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            return Err(Failure {
                error: GeneratorError::CheckFailed { errors },
                diagnostics,
            });
        },
    };
    transform::transform_insn_regexps(&mut desc);
    units_to_automata(&mut desc, config);
    warnings.extend(transform::check_unit_distribution(&desc));
    Ok(warnings)
}
