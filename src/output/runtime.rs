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

// runtime.rs
//
// This file contains the runtime query surface over the generated tables.
// A scheduler state is one state order number per automaton; every query
// the generated recognizer promises is answered here directly from the
// encoded tables.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::output::emitter::GeneratedDfa;

/// One scheduler state: the current state order number of every automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    parts: Vec<u32>,
}

#[derive(Debug)]
pub struct Dfa {
    generated: GeneratedDfa,
    started: bool,
    insn_code_cache: HashMap<String, u32>,
}

impl Dfa {
    pub fn new(generated: GeneratedDfa) -> Self {
        Self {
            generated,
            started: false,
            insn_code_cache: HashMap::new(),
        }
    }

    pub fn generated(&self) -> &GeneratedDfa {
        &self.generated
    }

    /// Number of per-automaton words a scheduler state occupies.
    pub fn state_size(&self) -> usize {
        self.generated.automata.len()
    }

    pub fn new_state(&self) -> DfaState {
        let mut state = DfaState {
            parts: vec![0; self.state_size()],
        };
        self.state_reset(&mut state);
        state
    }

    pub fn state_reset(&self, state: &mut DfaState) {
        for (part, automaton) in state.parts.iter_mut().zip(&self.generated.automata) {
            *part = automaton.start_state;
        }
    }

    /// Issue the instruction: negative when the transition was taken (the
    /// state advances), otherwise the minimal number of cycles the
    /// instruction has to wait.
    pub fn state_transition(&self, state: &mut DfaState, insn_code: usize) -> i32 {
        let mut targets = Vec::with_capacity(state.parts.len());
        for (part, automaton) in state.parts.iter().zip(&self.generated.automata) {
            let class = automaton.class_of(insn_code);
            let target = automaton.transition.get(*part as usize, class);
            if target >= automaton.states_num {
                return self.min_issue_delay(state, insn_code) as i32;
            }
            targets.push(target);
        }
        state.parts.copy_from_slice(&targets);
        -1
    }

    /// Number of distinct reservation alternatives the instruction can take
    /// from this state; zero when it cannot issue at all.
    pub fn state_alts(&self, state: &DfaState, insn_code: usize) -> usize {
        let mut alts = 1usize;
        for (part, automaton) in state.parts.iter().zip(&self.generated.automata) {
            let class = automaton.class_of(insn_code);
            let here = automaton.state_alts.get(*part as usize, class) as usize;
            if here == 0 {
                return 0;
            }
            alts *= here;
        }
        alts
    }

    pub fn min_issue_delay(&self, state: &DfaState, insn_code: usize) -> u32 {
        let mut delay = 0u32;
        for (part, automaton) in state.parts.iter().zip(&self.generated.automata) {
            let class = automaton.class_of(insn_code);
            delay = delay.max(automaton.min_issue_delay.get(*part as usize, class));
        }
        delay
    }

    /// True when nothing but the clock can leave the state.
    pub fn state_dead_lock_p(&self, state: &DfaState) -> bool {
        state
            .parts
            .iter()
            .zip(&self.generated.automata)
            .any(|(part, automaton)| automaton.dead_lock.get(*part as usize) == Some(&1))
    }

    /// Delay between two conflicting instructions: issue the first into a
    /// fresh state, then ask how long the second has to wait.
    pub fn min_insn_conflict_delay(&self, insn1: usize, insn2: usize) -> u32 {
        let mut state = self.new_state();
        let _ = self.state_transition(&mut state, insn1);
        self.min_issue_delay(&state, insn2)
    }

    /// Result latency between a producer and a consumer; a matching bypass
    /// overrides the producer's default latency.
    pub fn insn_latency(&self, insn1: usize, insn2: usize) -> u64 {
        let producer = match self.generated.insns.get(insn1) {
            Some(producer) => producer,
            None => return 0,
        };
        for bypass in &producer.bypasses {
            if bypass.in_insn_code as usize == insn2 {
                return bypass.latency;
            }
        }
        producer.default_latency
    }

    pub fn print_reservation(&self, writer: &mut impl Write, insn_code: usize) -> io::Result<()> {
        match self.generated.insns.get(insn_code) {
            Some(insn) => write!(writer, "{}", insn.reservation),
            None => write!(writer, "nothing"),
        }
    }

    /// Dense query unit code of a unit name, if the unit was declared
    /// queryable.
    pub fn get_cpu_unit_code(&self, name: &str) -> Option<usize> {
        self.generated
            .query_units
            .iter()
            .find(|unit| unit.name == name)
            .map(|unit| unit.code as usize)
    }

    /// Whether the query unit is reserved on the current cycle of the state.
    pub fn cpu_unit_reservation_p(&self, state: &DfaState, unit_code: usize) -> bool {
        state
            .parts
            .iter()
            .zip(&self.generated.automata)
            .any(|(part, automaton)| {
                automaton
                    .reserved_units
                    .as_ref()
                    .map(|table| table.reserved_p(*part as usize, unit_code))
                    .unwrap_or(false)
            })
    }

    pub fn advance_cycle(&self, state: &mut DfaState) {
        let code = self.generated.advance_cycle_code as usize;
        let _ = self.state_transition(state, code);
    }

    /// Prepare the recognizer for queries (the generated code allocates its
    /// working storage here).
    pub fn dfa_start(&mut self) {
        self.started = true;
        self.insn_code_cache.clear();
    }

    pub fn dfa_finish(&mut self) {
        self.started = false;
        self.insn_code_cache.clear();
    }

    pub fn dfa_clean_insn_cache(&mut self) {
        self.insn_code_cache.clear();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Cached instruction-name lookup, filled lazily between cache cleans.
    pub fn dfa_insn_code(&mut self, name: &str) -> Option<u32> {
        if let Some(&code) = self.insn_code_cache.get(name) {
            return Some(code);
        }
        let code = self
            .generated
            .insns
            .iter()
            .find(|insn| insn.name == name)
            .map(|insn| insn.code)?;
        self.insn_code_cache.insert(name.to_string(), code);
        Some(code)
    }
}
