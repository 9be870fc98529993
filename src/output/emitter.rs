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

// emitter.rs
//
// This file contains the description object handed to the code and report
// writers: the per-automaton tables, the instruction table with bypasses
// and canonical reservation strings, and the global constants of the
// generated recognizer.

use serde::Serialize;

use crate::description::decls::Description;
use crate::automaton::builder::BuiltAutomaton;
use crate::automaton::reservs::SetDims;
use crate::automaton::state::StateId;
use crate::tables::encoder::{encode_automaton, AutomatonTables};

#[derive(Debug, Clone, Serialize)]
pub struct BypassEntry {
    pub latency: u64,
    pub in_insn_code: u32,
    pub guard: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsnEntry {
    pub name: String,
    pub code: u32,
    pub default_latency: u64,
    /// Opaque to the generator; emitted verbatim for the scheduler's guard.
    pub condition: Option<String>,
    /// Canonical reservation, printable form.
    pub reservation: String,
    pub bypasses: Vec<BypassEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryUnitEntry {
    pub name: String,
    pub code: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDfa {
    pub automata: Vec<AutomatonTables>,
    pub insns: Vec<InsnEntry>,
    pub query_units: Vec<QueryUnitEntry>,
    /// Instruction code of the advance-cycle pseudo-instruction.
    pub advance_cycle_code: u32,
    /// Most instructions issuable on one cycle across all automata.
    pub max_issue_rate: u32,
    /// Smallest 2^k - 1 covering every latency and reservation length.
    pub max_insn_queue_index: u32,
}

pub fn emit(
    desc: &Description,
    automata: &[BuiltAutomaton],
    dims: &SetDims,
) -> GeneratedDfa {
    let tables: Vec<AutomatonTables> = automata
        .iter()
        .map(|automaton| encode_automaton(desc, automaton, dims))
        .collect();

    let insns: Vec<InsnEntry> = desc
        .insns
        .iter()
        .map(|insn| InsnEntry {
            name: insn.name.clone(),
            code: insn.insn_num as u32,
            default_latency: insn.default_latency,
            condition: insn.condition.clone(),
            reservation: insn
                .transformed_regexp
                .as_ref()
                .map(|regexp| regexp.to_string())
                .unwrap_or_else(|| insn.regexp.to_string()),
            bypasses: insn
                .bypasses
                .iter()
                .map(|&bypass| {
                    let bypass = &desc.bypasses[bypass];
                    BypassEntry {
                        latency: bypass.latency,
                        in_insn_code: bypass.in_insn as u32,
                        guard: bypass.guard.clone(),
                    }
                })
                .collect(),
        })
        .collect();

    let query_units: Vec<QueryUnitEntry> = desc
        .units
        .iter()
        .filter_map(|unit| {
            unit.query_num.map(|query_num| QueryUnitEntry {
                name: unit.name.clone(),
                code: query_num as u32,
            })
        })
        .collect();

    GeneratedDfa {
        automata: tables,
        insns,
        query_units,
        advance_cycle_code: desc.insns_num() as u32,
        max_issue_rate: max_issue_rate(automata),
        max_insn_queue_index: max_insn_queue_index(desc),
    }
}

/// Longest chain of non-advance-cycle, non-self-loop arcs anywhere in the
/// final automata: an upper bound on how many instructions one cycle can
/// absorb.
fn max_issue_rate(automata: &[BuiltAutomaton]) -> u32 {
    let mut rate = 1usize;
    for automaton in automata {
        let advance_index = automaton.advance_cycle_ainsn();
        let mut memo: Vec<Option<usize>> = vec![None; automaton.pool.len()];
        let mut on_path: Vec<bool> = vec![false; automaton.pool.len()];
        for &state in &automaton.ordered_states {
            let length = longest_issue_chain(
                automaton,
                state,
                advance_index,
                &mut memo,
                &mut on_path,
            );
            rate = rate.max(length);
        }
    }
    rate as u32
}

fn longest_issue_chain(
    automaton: &BuiltAutomaton,
    state: StateId,
    advance_index: usize,
    memo: &mut Vec<Option<usize>>,
    on_path: &mut Vec<bool>,
) -> usize {
    if let Some(length) = memo[state] {
        return length;
    }
    if on_path[state] {
        return 0;
    }
    on_path[state] = true;
    let mut best = 0usize;
    for arc in &automaton.pool.states[state].out_arcs {
        if arc.ainsn == advance_index || arc.to == state {
            continue;
        }
        let tail = longest_issue_chain(automaton, arc.to, advance_index, memo, on_path);
        best = best.max(1 + tail);
    }
    on_path[state] = false;
    memo[state] = Some(best);
    best
}

/// Smallest `2^k - 1` at least the maximum of the default latencies, the
/// bypass latencies, and the reservation length in cycles.
fn max_insn_queue_index(desc: &Description) -> u32 {
    let mut max_value = desc.max_insn_reserv_cycles as u64;
    for insn in &desc.insns {
        max_value = max_value.max(insn.default_latency);
    }
    for bypass in &desc.bypasses {
        max_value = max_value.max(bypass.latency);
    }
    let mut index: u64 = 1;
    while index - 1 < max_value {
        index *= 2;
    }
    (index - 1) as u32
}
