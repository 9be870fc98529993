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
// This file drives the per-automaton construction: worklist building,
// optional minimization, state enumeration, and instruction equivalence
// classification, for every automaton of the partitioned description.

pub mod alt_states;
pub mod builder;
pub mod equiv;
pub mod minimize;
pub mod partition;
pub mod reservs;
pub mod state;

use std::collections::HashMap;

use crate::config::GeneratorConfig;
use crate::description::decls::Description;
use crate::errors::GeneratorError;
use crate::utils::progress::Ticker;

use alt_states::important_automata;
use builder::{count_arcs, enumerate_states, make_automaton, BuiltAutomaton};
use reservs::{ConflictChecker, SetDims};

pub fn build_automata(
    desc: &mut Description,
    config: &GeneratorConfig,
) -> Result<Vec<BuiltAutomaton>, GeneratorError> {
    let dims = SetDims::new(desc.max_insn_reserv_cycles, desc.units_num());
    let checker = ConflictChecker::new(desc, dims);
    let mut ticker = Ticker::new(config.progress);
    let mut unique_counter = 0usize;
    let mut automata = Vec::with_capacity(desc.automata_num);

    for automaton_num in 0..desc.automata_num {
        let mut automaton = make_automaton(
            desc,
            &checker,
            automaton_num,
            config.ndfa,
            &mut unique_counter,
            &mut ticker,
        )?;
        if !config.no_minimization {
            minimize::minimize(&mut automaton, desc, &dims);
        }
        enumerate_states(&mut automaton);
        automaton.stats.minimal_states = automaton.ordered_states.len();
        automaton.stats.minimal_arcs = count_arcs(&automaton.pool, &automaton.ordered_states);
        equiv::set_insn_equiv_classes(&mut automaton);
        automata.push(automaton);
    }
    ticker.finish();

    // Populate the description-level per-instruction fields now that every
    // automaton view exists.
    let important: Vec<Vec<usize>> = (0..desc.insns_num())
        .map(|insn| important_automata(desc, insn))
        .collect();
    for (insn, automata_list) in important.into_iter().enumerate() {
        desc.insns[insn].important_automata = automata_list;
    }

    // Global instruction equivalence: equal per-automaton classes everywhere.
    let mut global_class: HashMap<Vec<usize>, usize> = HashMap::new();
    for insn in 0..desc.insns_num() {
        let key: Vec<usize> = automata
            .iter()
            .map(|automaton| automaton.ainsns[insn].equiv_class_num)
            .collect();
        let next = global_class.len();
        let class = *global_class.entry(key).or_insert(next);
        desc.insns[insn].equiv_class_num = Some(class);
    }

    Ok(automata)
}
