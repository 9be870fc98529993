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

// alt_states.rs
//
// This file contains the per-automaton instruction views. For every
// instruction each reservation alternative is turned into an interned state
// holding the alternative's footprint on this automaton's units; identical
// looking instructions collapse behind one representative.

use std::collections::HashMap;

use crate::description::decls::Description;
use crate::description::transform::{alternative_cycles, cycle_units, regexp_alternatives};
use crate::automaton::reservs::{ReservSet, SetDims};
use crate::automaton::state::{canonical_state_list, StateId, StatePool};
use crate::errors::GeneratorError;

/// One instruction as seen by one automaton.
#[derive(Debug, Clone)]
pub struct AInsn {
    /// Instruction number in the description; the advance-cycle
    /// pseudo-instruction uses one past the last real instruction.
    pub insn_num: usize,
    /// Alternative footprints in source order.
    pub alt_states: Vec<StateId>,
    pub sorted_alt_states: Vec<StateId>,
    /// False when an earlier instruction has the same sorted alternatives;
    /// only representatives drive the state-graph construction.
    pub first_insn_with_same_reservs: bool,
    /// Index of the representative ainsn (self for representatives).
    pub same_reservs_rep: usize,
    pub equiv_class_num: usize,
    pub first_of_equiv_class: bool,
    pub arc_exists: bool,
}

impl AInsn {
    pub fn is_advance_cycle(&self, desc: &Description) -> bool {
        self.insn_num == desc.insns_num()
    }
}

/// Build the ainsn list of one automaton: one entry per instruction in
/// declaration order, then the advance-cycle pseudo-instruction.
pub fn build_ainsns(
    desc: &Description,
    automaton_num: usize,
    dims: &SetDims,
    pool: &mut StatePool,
    unique_counter: &mut usize,
) -> Result<Vec<AInsn>, GeneratorError> {
    let mut ainsns: Vec<AInsn> = Vec::with_capacity(desc.insns_num() + 1);
    let mut first_by_reservs: HashMap<Vec<StateId>, usize> = HashMap::new();

    for insn in &desc.insns {
        let regexp = insn
            .transformed_regexp
            .as_ref()
            .unwrap_or(&insn.regexp);
        let mut alt_states: Vec<StateId> = Vec::new();
        // Alternatives are walked in reverse and prepended, which restores
        // the source order in the final list.
        for alternative in regexp_alternatives(regexp).into_iter().rev() {
            let mut reservs = ReservSet::empty(dims);
            for (cycle, element) in alternative_cycles(alternative).into_iter().enumerate() {
                for unit in cycle_units(element) {
                    if desc.units[unit].automaton_num == Some(automaton_num) {
                        reservs.set(dims, cycle, desc.units[unit].unit_num)?;
                    }
                }
            }
            let (state, _) = pool.intern(automaton_num, reservs, unique_counter);
            alt_states.insert(0, state);
        }
        let sorted_alt_states = canonical_state_list(alt_states.clone());

        let index = ainsns.len();
        let (first, rep) = match first_by_reservs.get(&sorted_alt_states) {
            Some(&rep) => (false, rep),
            None => {
                first_by_reservs.insert(sorted_alt_states.clone(), index);
                (true, index)
            },
        };
        ainsns.push(AInsn {
            insn_num: insn.insn_num,
            alt_states,
            sorted_alt_states,
            first_insn_with_same_reservs: first,
            same_reservs_rep: rep,
            equiv_class_num: 0,
            first_of_equiv_class: false,
            arc_exists: false,
        });
    }

    // The advance-cycle pseudo-instruction is always present and never has
    // alternatives of its own.
    let advance_index = ainsns.len();
    ainsns.push(AInsn {
        insn_num: desc.insns_num(),
        alt_states: Vec::new(),
        sorted_alt_states: Vec::new(),
        first_insn_with_same_reservs: true,
        same_reservs_rep: advance_index,
        equiv_class_num: 0,
        first_of_equiv_class: false,
        arc_exists: false,
    });

    Ok(ainsns)
}

/// Automata in which the instruction reserves at least one unit.
pub fn important_automata(desc: &Description, insn_num: usize) -> Vec<usize> {
    let insn = &desc.insns[insn_num];
    let regexp = match &insn.transformed_regexp {
        Some(regexp) => regexp,
        None => return Vec::new(),
    };
    let mut automata: Vec<usize> = regexp_alternatives(regexp)
        .into_iter()
        .flat_map(|alternative| {
            alternative_cycles(alternative)
                .into_iter()
                .flat_map(cycle_units)
                .collect::<Vec<_>>()
        })
        .filter_map(|unit| desc.units[unit].automaton_num)
        .collect();
    automata.sort_unstable();
    automata.dedup();
    automata
}
