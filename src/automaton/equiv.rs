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

// equiv.rs
//
// This file contains the instruction equivalence classifier. Two
// instructions are equivalent when, from every state, their arcs agree on
// destination and alternatives count (or are equally absent). Table columns
// are keyed by the resulting dense class numbers.

use std::collections::HashMap;

use log::debug;

use crate::automaton::builder::BuiltAutomaton;
use crate::automaton::state::StateId;

pub fn set_insn_equiv_classes(automaton: &mut BuiltAutomaton) {
    let representatives: Vec<usize> = (0..automaton.ainsns.len())
        .filter(|&index| automaton.ainsns[index].first_insn_with_same_reservs)
        .collect();

    // Start with one class holding every instruction, then split against
    // each state in turn.
    let ordered = automaton.ordered_states.clone();
    let mut classes: Vec<Vec<usize>> = vec![representatives];
    for &state in &ordered {
        classes = split_classes_by_state(automaton, &classes, state);
    }

    // Dense class numbers, assigned in ainsn order.
    let mut next_class = 0usize;
    let mut first_of_class: Vec<Option<usize>> = vec![None; classes.len()];
    let class_index_of: HashMap<usize, usize> = classes
        .iter()
        .enumerate()
        .flat_map(|(i, class)| class.iter().map(move |&member| (member, i)))
        .collect();
    for index in 0..automaton.ainsns.len() {
        let rep = automaton.ainsns[index].same_reservs_rep;
        let class_index = class_index_of[&rep];
        let class_num = match first_of_class[class_index] {
            Some(num) => num,
            None => {
                let num = next_class;
                next_class += 1;
                first_of_class[class_index] = Some(num);
                automaton.ainsns[index].first_of_equiv_class = true;
                num
            },
        };
        automaton.ainsns[index].equiv_class_num = class_num;
    }
    automaton.insn_equiv_classes_num = next_class;
    debug!(
        "automaton {}: {} instruction equivalence class(es)",
        automaton.automaton_num, automaton.insn_equiv_classes_num
    );
}

fn split_classes_by_state(
    automaton: &BuiltAutomaton,
    classes: &[Vec<usize>],
    state: StateId,
) -> Vec<Vec<usize>> {
    let mut arc_of_ainsn: HashMap<usize, (StateId, usize)> = HashMap::new();
    for arc in &automaton.pool.states[state].out_arcs {
        arc_of_ainsn.insert(arc.ainsn, (arc.to, arc.alts));
    }

    let mut result: Vec<Vec<usize>> = Vec::with_capacity(classes.len());
    for class in classes {
        let mut groups: Vec<(Option<(StateId, usize)>, Vec<usize>)> = Vec::new();
        for &member in class {
            let signature = arc_of_ainsn.get(&member).copied();
            match groups.iter_mut().find(|(sig, _)| *sig == signature) {
                Some((_, members)) => members.push(member),
                None => groups.push((signature, vec![member])),
            }
        }
        for (_, members) in groups {
            result.push(members);
        }
    }
    result
}
