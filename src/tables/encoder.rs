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

// encoder.rs
//
// This file contains the per-automaton table encoder. From a minimized and
// enumerated automaton it produces the translate, transition,
// state-alternatives, min-issue-delay, deadlock, and reserved-units tables
// the runtime queries consult.

use log::debug;
use serde::Serialize;

use crate::description::decls::Description;
use crate::automaton::builder::BuiltAutomaton;
use crate::automaton::reservs::SetDims;
use crate::automaton::state::StateId;
use crate::tables::comb::StateClassTable;

/// Min-issue-delay entries packed at 1, 2, 4, or 8 bits per element,
/// whichever is the smallest width holding the automaton's maximum delay.
#[derive(Debug, Clone, Serialize)]
pub struct MinDelayTable {
    pub rows: usize,
    pub cols: usize,
    pub bits_per_entry: u8,
    pub max_value: u8,
    pub data: Vec<u8>,
}

impl MinDelayTable {
    fn pack(values: &[u8], rows: usize, cols: usize) -> Self {
        let max_value = values.iter().copied().max().unwrap_or(0);
        let bits_per_entry: u8 = match max_value {
            0..=1 => 1,
            2..=3 => 2,
            4..=15 => 4,
            _ => 8,
        };
        let per_byte = 8 / bits_per_entry as usize;
        let mut data = vec![0u8; (values.len() + per_byte - 1) / per_byte.max(1)];
        for (i, &value) in values.iter().enumerate() {
            let byte = i / per_byte;
            let slot = i % per_byte;
            data[byte] |= value << (slot as u8 * bits_per_entry);
        }
        Self {
            rows,
            cols,
            bits_per_entry,
            max_value,
            data,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        if row >= self.rows || col >= self.cols {
            return 0;
        }
        let index = row * self.cols + col;
        let per_byte = 8 / self.bits_per_entry as usize;
        let byte = self.data[index / per_byte];
        let slot = index % per_byte;
        let mask = if self.bits_per_entry == 8 {
            0xFF
        } else {
            (1u8 << self.bits_per_entry) - 1
        };
        ((byte >> (slot as u8 * self.bits_per_entry)) & mask) as u32
    }
}

/// Reserved query units on cycle 0, one bit row per state.
#[derive(Debug, Clone, Serialize)]
pub struct ReservedUnitsTable {
    pub bytes_per_state: usize,
    pub data: Vec<u8>,
}

impl ReservedUnitsTable {
    pub fn reserved_p(&self, state: usize, query_unit: usize) -> bool {
        let byte = state * self.bytes_per_state + query_unit / 8;
        self.data
            .get(byte)
            .map(|b| (b >> (query_unit % 8)) & 1 != 0)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AutomatonTables {
    pub automaton_num: usize,
    pub name: Option<String>,
    pub start_state: u32,
    pub states_num: u32,
    pub insn_equiv_classes_num: u32,
    /// Instruction code to equivalence class; index `insns_num` is the
    /// advance-cycle pseudo-instruction.
    pub translate: Vec<u32>,
    pub transition: StateClassTable,
    pub state_alts: StateClassTable,
    pub min_issue_delay: MinDelayTable,
    pub dead_lock: Vec<u8>,
    pub reserved_units: Option<ReservedUnitsTable>,
}

impl AutomatonTables {
    /// Map an instruction code to its column class; out-of-range codes get
    /// the out-of-range class.
    pub fn class_of(&self, insn_code: usize) -> usize {
        self.translate
            .get(insn_code)
            .map(|&class| class as usize)
            .unwrap_or(self.insn_equiv_classes_num as usize)
    }
}

pub fn encode_automaton(
    desc: &Description,
    automaton: &BuiltAutomaton,
    dims: &SetDims,
) -> AutomatonTables {
    let states_num = automaton.ordered_states.len();
    let classes_num = automaton.insn_equiv_classes_num;
    let advance_index = automaton.advance_cycle_ainsn();

    // 1. Translate vector.
    let mut translate = Vec::with_capacity(desc.insns_num() + 1);
    for insn in 0..=desc.insns_num() {
        translate.push(automaton.ainsns[insn].equiv_class_num as u32);
    }

    // 2 and 3. Transition and state-alternatives matrices.
    let undefined = states_num as u32;
    let mut transition = vec![undefined; states_num * classes_num];
    let mut state_alts = vec![0u32; states_num * classes_num];
    for (order, &state) in automaton.ordered_states.iter().enumerate() {
        for arc in &automaton.pool.states[state].out_arcs {
            let class = automaton.ainsns[arc.ainsn].equiv_class_num;
            let to_order = automaton.pool.states[arc.to]
                .order_num
                .unwrap_or(states_num);
            transition[order * classes_num + class] = to_order as u32;
            state_alts[order * classes_num + class] = arc.alts as u32;
        }
    }
    let transition = StateClassTable::build(transition, states_num, classes_num, undefined);
    let state_alts = StateClassTable::build(state_alts, states_num, classes_num, 0);
    debug!(
        "automaton {}: transition {} ({} elements), state alts {} ({} elements)",
        automaton.automaton_num,
        if transition.is_comb() { "comb" } else { "full" },
        transition.stored_len(),
        if state_alts.is_comb() { "comb" } else { "full" },
        state_alts.stored_len(),
    );

    // 4. Min issue delay, one column pass per equivalence class.
    let mut delays = vec![0u8; states_num * classes_num];
    for ainsn_index in 0..automaton.ainsns.len() {
        if !automaton.ainsns[ainsn_index].first_of_equiv_class {
            continue;
        }
        let class = automaton.ainsns[ainsn_index].equiv_class_num;
        let mut memo: Vec<i64> = vec![-1; automaton.pool.len()];
        let mut visited: Vec<bool> = vec![false; automaton.pool.len()];
        for (order, &state) in automaton.ordered_states.iter().enumerate() {
            let delay = min_issue_delay_pass(
                automaton,
                state,
                class,
                advance_index,
                &mut memo,
                &mut visited,
            );
            let clamped = if delay < 0 { 0 } else { delay.min(255) } as u8;
            delays[order * classes_num + class] = clamped;
        }
    }
    let min_issue_delay = MinDelayTable::pack(&delays, states_num, classes_num);

    // 5. Deadlock vector: states whose only way forward is the clock.
    let dead_lock: Vec<u8> = automaton
        .ordered_states
        .iter()
        .map(|&state| {
            let arcs = &automaton.pool.states[state].out_arcs;
            (arcs.len() == 1 && arcs[0].ainsn == advance_index) as u8
        })
        .collect();

    // 6. Reserved query units on cycle 0 of each state.
    let reserved_units = if desc.query_units_num > 0 {
        let bytes_per_state = (desc.query_units_num + 7) / 8;
        let mut data = vec![0u8; states_num * bytes_per_state];
        for (order, &state) in automaton.ordered_states.iter().enumerate() {
            let reservs = &automaton.pool.states[state].reservs;
            for unit in &desc.units {
                if let Some(query_num) = unit.query_num {
                    if reservs.test(dims, 0, unit.unit_num) {
                        data[order * bytes_per_state + query_num / 8] |=
                            1 << (query_num % 8);
                    }
                }
            }
        }
        Some(ReservedUnitsTable {
            bytes_per_state,
            data,
        })
    } else {
        None
    };

    AutomatonTables {
        automaton_num: automaton.automaton_num,
        name: automaton.name.clone(),
        start_state: automaton.pool.states[automaton.start_state]
            .order_num
            .unwrap_or(0) as u32,
        states_num: states_num as u32,
        insn_equiv_classes_num: classes_num as u32,
        translate,
        transition,
        state_alts,
        min_issue_delay,
        dead_lock,
        reserved_units,
    }
}

/// Minimum number of cycles before an instruction of the class can issue
/// from the state: 0 with a direct arc, otherwise the best over all arcs,
/// where only advance-cycle costs a cycle. Cycles in the graph return the
/// memoized (possibly still unknown) value.
fn min_issue_delay_pass(
    automaton: &BuiltAutomaton,
    state: StateId,
    class: usize,
    advance_index: usize,
    memo: &mut Vec<i64>,
    visited: &mut Vec<bool>,
) -> i64 {
    if visited[state] {
        return memo[state];
    }
    visited[state] = true;
    let mut best: i64 = -1;
    let arcs = automaton.pool.states[state].out_arcs.clone();
    for arc in &arcs {
        if automaton.ainsns[arc.ainsn].equiv_class_num == class {
            best = 0;
            break;
        }
        let delay = min_issue_delay_pass(automaton, arc.to, class, advance_index, memo, visited);
        if delay >= 0 {
            let delay = delay + (arc.ainsn == advance_index) as i64;
            if best < 0 || delay < best {
                best = delay;
            }
        }
    }
    memo[state] = best;
    best
}
