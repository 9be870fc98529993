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

// builder.rs
//
// This file contains the worklist construction of one automaton. From the
// empty start state every viable instruction alternative spawns a masked
// union state; an advance-cycle arc shifts the reservation window. In
// nondeterministic mode a subset construction then composes multi-arc
// bundles into single arcs to composed states.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::description::decls::Description;
use crate::automaton::alt_states::{build_ainsns, AInsn};
use crate::automaton::reservs::{ConflictChecker, ReservSet, SetDims};
use crate::automaton::state::{canonical_state_list, Arc, StateId, StatePool};
use crate::errors::GeneratorError;
use crate::utils::progress::Ticker;

#[derive(Debug, Clone, Copy, Default)]
pub struct AutomatonStats {
    pub ndfa_states: usize,
    pub ndfa_arcs: usize,
    pub dfa_states: usize,
    pub dfa_arcs: usize,
    pub minimal_states: usize,
    pub minimal_arcs: usize,
}

#[derive(Debug)]
pub struct BuiltAutomaton {
    pub automaton_num: usize,
    pub name: Option<String>,
    pub pool: StatePool,
    pub ainsns: Vec<AInsn>,
    pub start_state: StateId,
    pub reservs_matter: ReservSet,
    /// Reachable states in enumeration order after minimization; index i is
    /// the state with `order_num == i`.
    pub ordered_states: Vec<StateId>,
    pub insn_equiv_classes_num: usize,
    pub stats: AutomatonStats,
}

impl BuiltAutomaton {
    pub fn advance_cycle_ainsn(&self) -> usize {
        self.ainsns.len() - 1
    }
}

/// Cycle-unit bits that can still influence a future transition: a unit is
/// kept from its minimum occupancy cycle on, and always when it is a query
/// unit or occurs in an exclusion, presence, or absence set.
fn form_reservs_matter(
    desc: &Description,
    automaton_num: usize,
    dims: &SetDims,
) -> Result<ReservSet, GeneratorError> {
    let mut matter = ReservSet::empty(dims);
    for unit in &desc.units {
        if unit.automaton_num != Some(automaton_num) {
            continue;
        }
        let min_occ = unit.min_occ_cycle_num.unwrap_or(0);
        for cycle in 0..dims.cycles {
            if cycle >= min_occ || unit.query_p || unit.in_set_p {
                matter.set(dims, cycle, unit.unit_num)?;
            }
        }
    }
    Ok(matter)
}

/// Build the automaton's state graph by worklist construction.
pub fn make_automaton(
    desc: &Description,
    checker: &ConflictChecker,
    automaton_num: usize,
    ndfa: bool,
    unique_counter: &mut usize,
    ticker: &mut Ticker,
) -> Result<BuiltAutomaton, GeneratorError> {
    let dims = *checker.dims();
    let mut pool = StatePool::new();
    let mut ainsns = build_ainsns(desc, automaton_num, &dims, &mut pool, unique_counter)?;
    let reservs_matter = form_reservs_matter(desc, automaton_num, &dims)?;

    let (start_state, _) = pool.intern(automaton_num, ReservSet::empty(&dims), unique_counter);
    let advance_index = ainsns.len() - 1;

    let mut stack: Vec<StateId> = vec![start_state];

    while let Some(state) = stack.pop() {
        let state_reservs = pool.states[state].reservs.clone();
        for ainsn_index in 0..advance_index {
            if !ainsns[ainsn_index].first_insn_with_same_reservs {
                continue;
            }
            let alternatives = ainsns[ainsn_index].alt_states.clone();
            for alt in alternatives {
                let alt_reservs = pool.states[alt].reservs.clone();
                if checker.intersects(&state_reservs, &alt_reservs) {
                    continue;
                }
                let union = state_reservs.or(&alt_reservs);
                if !checker.final_patterns_ok(&union) {
                    continue;
                }
                let candidate = union.and(&reservs_matter);
                let (target, new) = pool.intern(automaton_num, candidate, unique_counter);
                if new {
                    ticker.tick();
                    stack.push(target);
                }
                pool.add_arc(state, ainsn_index, target);
                ainsns[ainsn_index].arc_exists = true;
                if !ndfa {
                    break;
                }
            }
        }
        // Time always passes: the advance-cycle transition shifts the window.
        let shifted = state_reservs.shift(&dims).and(&reservs_matter);
        let (target, new) = pool.intern(automaton_num, shifted, unique_counter);
        if new {
            ticker.tick();
            stack.push(target);
        }
        pool.add_arc(state, advance_index, target);
        ainsns[advance_index].arc_exists = true;
    }

    let mut automaton = BuiltAutomaton {
        automaton_num,
        name: desc
            .automata
            .get(automaton_num)
            .map(|decl| decl.name.clone()),
        pool,
        ainsns,
        start_state,
        reservs_matter,
        ordered_states: Vec::new(),
        insn_equiv_classes_num: 0,
        stats: AutomatonStats::default(),
    };

    let reachable = reachable_states(&automaton.pool, automaton.start_state);
    let arcs = count_arcs(&automaton.pool, &reachable);
    automaton.stats.ndfa_states = reachable.len();
    automaton.stats.ndfa_arcs = arcs;

    if ndfa {
        ndfa_to_dfa(&mut automaton, unique_counter, ticker);
    }
    let reachable = reachable_states(&automaton.pool, automaton.start_state);
    automaton.stats.dfa_states = reachable.len();
    automaton.stats.dfa_arcs = count_arcs(&automaton.pool, &reachable);
    debug!(
        "automaton {}: {} state(s), {} arc(s) before minimization",
        automaton_num, automaton.stats.dfa_states, automaton.stats.dfa_arcs
    );

    Ok(automaton)
}

/// Subset construction: every bundle of same-instruction arcs becomes one
/// arc to a composed state whose identity is the sorted union of the
/// bundle's atomic destinations.
fn ndfa_to_dfa(automaton: &mut BuiltAutomaton, unique_counter: &mut usize, ticker: &mut Ticker) {
    let automaton_num = automaton.automaton_num;
    let mut work: Vec<StateId> = vec![automaton.start_state];
    let mut seen: HashSet<StateId> = HashSet::new();
    seen.insert(automaton.start_state);

    while let Some(state) = work.pop() {
        let source_arcs: Vec<Arc> = if automaton.pool.states[state].component_states.is_empty() {
            automaton.pool.states[state].out_arcs.clone()
        } else {
            automaton.pool.states[state]
                .component_states
                .clone()
                .into_iter()
                .flat_map(|component| automaton.pool.states[component].out_arcs.clone())
                .collect()
        };

        let mut order: Vec<usize> = Vec::new();
        let mut buckets: HashMap<usize, Vec<Arc>> = HashMap::new();
        for arc in source_arcs {
            if !buckets.contains_key(&arc.ainsn) {
                order.push(arc.ainsn);
            }
            buckets.entry(arc.ainsn).or_default().push(arc);
        }

        let mut new_arcs: Vec<Arc> = Vec::new();
        for ainsn in order {
            let bucket = &buckets[&ainsn];
            let alts: usize = bucket.iter().map(|arc| arc.alts).sum();
            let mut components: Vec<StateId> = bucket
                .iter()
                .flat_map(|arc| {
                    let dest = &automaton.pool.states[arc.to];
                    if dest.component_states.is_empty() {
                        vec![arc.to]
                    } else {
                        dest.component_states.clone()
                    }
                })
                .collect();
            components = canonical_state_list(components);
            let target = if components.len() == 1 {
                components[0]
            } else {
                let reservs = components
                    .iter()
                    .map(|&component| automaton.pool.states[component].reservs.clone())
                    .reduce(|a, b| a.or(&b))
                    .unwrap_or_else(|| automaton.pool.states[state].reservs.clone());
                let (target, new) = automaton.pool.intern_composed(
                    automaton_num,
                    components,
                    reservs,
                    unique_counter,
                );
                if new {
                    ticker.tick();
                }
                target
            };
            new_arcs.push(Arc {
                ainsn,
                to: target,
                alts,
            });
            if seen.insert(target) {
                work.push(target);
            }
        }
        automaton.pool.states[state].out_arcs = new_arcs;
    }
}

/// Reachable states in depth-first preorder, following arcs in their list
/// order. This order is also the enumeration order of the final automaton.
pub fn reachable_states(pool: &StatePool, start: StateId) -> Vec<StateId> {
    let mut visited: HashSet<StateId> = HashSet::new();
    let mut order: Vec<StateId> = Vec::new();
    let mut stack: Vec<StateId> = vec![start];
    visited.insert(start);
    while let Some(state) = stack.pop() {
        order.push(state);
        // Push in reverse so the first arc is visited first.
        for arc in pool.states[state].out_arcs.iter().rev() {
            if visited.insert(arc.to) {
                stack.push(arc.to);
            }
        }
    }
    order
}

pub fn count_arcs(pool: &StatePool, states: &[StateId]) -> usize {
    states.iter().map(|&state| pool.states[state].out_arcs.len()).sum()
}

/// Assign dense order numbers to the reachable states; the start state gets
/// number zero.
pub fn enumerate_states(automaton: &mut BuiltAutomaton) {
    let reachable = reachable_states(&automaton.pool, automaton.start_state);
    for (order, &state) in reachable.iter().enumerate() {
        automaton.pool.states[state].order_num = Some(order);
    }
    automaton.ordered_states = reachable;
}
