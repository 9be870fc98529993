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

// minimize.rs
//
// This file contains the automaton minimizer: partition refinement over the
// reachable states, starting from a single class. The transition signature
// includes the per-instruction alternatives counts and the cycle-0
// reservation of every query unit, so user-visible unit queries survive the
// merge.

use std::collections::HashMap;

use log::debug;

use crate::description::decls::Description;
use crate::automaton::builder::{reachable_states, BuiltAutomaton};
use crate::automaton::reservs::SetDims;
use crate::automaton::state::{canonical_state_list, StateId};

/// Refinement signature of one state: for each instruction with an arc, the
/// destination's previous color and the alternatives count, plus the query
/// units reserved on the state's cycle 0.
type Signature = (Vec<(usize, usize, usize)>, Vec<bool>);

pub fn minimize(automaton: &mut BuiltAutomaton, desc: &Description, dims: &SetDims) {
    let reachable = reachable_states(&automaton.pool, automaton.start_state);
    let state_count = automaton.pool.len();

    let query_units: Vec<usize> = desc
        .units
        .iter()
        .filter(|u| u.query_p)
        .map(|u| u.unit_num)
        .collect();
    let mut query_presence: Vec<Vec<bool>> = vec![Vec::new(); state_count];
    for &state in &reachable {
        let reservs = &automaton.pool.states[state].reservs;
        query_presence[state] = query_units
            .iter()
            .map(|&unit| reservs.test(dims, 0, unit))
            .collect();
    }

    // Two alternating color fields: each iteration writes one while reading
    // the colors the previous iteration produced.
    let mut current: Vec<usize> = vec![0; state_count];
    let mut next: Vec<usize> = vec![0; state_count];
    let mut class_count = 1usize;
    loop {
        let mut color_of_key: HashMap<(usize, Signature), usize> = HashMap::new();
        let mut new_count = 0usize;
        for &state in &reachable {
            let mut arcs: Vec<(usize, usize, usize)> = automaton.pool.states[state]
                .out_arcs
                .iter()
                .map(|arc| (arc.ainsn, current[arc.to], arc.alts))
                .collect();
            arcs.sort_unstable();
            let key = (current[state], (arcs, query_presence[state].clone()));
            let color = *color_of_key.entry(key).or_insert_with(|| {
                let color = new_count;
                new_count += 1;
                color
            });
            next[state] = color;
        }
        std::mem::swap(&mut current, &mut next);
        if new_count == class_count {
            break;
        }
        class_count = new_count;
    }

    // Merge every class into its first reachable member.
    let mut rep_of_class: HashMap<usize, StateId> = HashMap::new();
    let mut members_of_class: HashMap<usize, Vec<StateId>> = HashMap::new();
    for &state in &reachable {
        rep_of_class.entry(current[state]).or_insert(state);
        members_of_class.entry(current[state]).or_default().push(state);
    }

    for (&class, members) in &members_of_class {
        if members.len() < 2 {
            continue;
        }
        let rep = rep_of_class[&class];
        let components: Vec<StateId> = members
            .iter()
            .flat_map(|&member| {
                let member_state = &automaton.pool.states[member];
                if member_state.component_states.is_empty() {
                    vec![member]
                } else {
                    member_state.component_states.clone()
                }
            })
            .collect();
        automaton.pool.states[rep].component_states = canonical_state_list(components);
    }

    // Re-target the representatives' arcs through the class mapping; the
    // start state migrates too. Non-representative states are abandoned.
    let representatives: Vec<StateId> = rep_of_class.values().copied().collect();
    for &rep in &representatives {
        let retargeted: Vec<_> = automaton.pool.states[rep]
            .out_arcs
            .iter()
            .map(|arc| {
                let mut arc = arc.clone();
                arc.to = rep_of_class[&current[arc.to]];
                arc
            })
            .collect();
        automaton.pool.states[rep].out_arcs = retargeted;
    }
    automaton.start_state = rep_of_class[&current[automaton.start_state]];

    debug!(
        "minimization: {} -> {} state(s)",
        reachable.len(),
        class_count
    );
}
