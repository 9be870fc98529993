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

// state.rs
//
// This file contains the state and arc arenas of one automaton under
// construction. States are interned by content: atomic states by their
// reservation set, composed states by their sorted component list. Arena
// indices stay stable until the whole automaton is dropped.

use std::collections::HashMap;

use crate::automaton::reservs::ReservSet;

pub type StateId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arc {
    pub ainsn: usize,
    pub to: StateId,
    /// Number of distinct reservation alternatives of the same instruction
    /// that take the source to this destination.
    pub alts: usize,
}

#[derive(Debug, Clone)]
pub struct State {
    /// Unique across every state allocated in the run, all automata included.
    pub unique_num: usize,
    pub automaton_num: usize,
    pub reservs: ReservSet,
    /// Atomic component states of a composed or merged state; empty for an
    /// atomic state.
    pub component_states: Vec<StateId>,
    pub out_arcs: Vec<Arc>,
    /// Dense enumeration number assigned after minimization; unset for
    /// states that did not survive into the final automaton.
    pub order_num: Option<usize>,
}

/// Arena for the states of one automaton, with the two content-keyed intern
/// tables. The arena is append-only; dead states are simply left behind and
/// reclaimed when the automaton is dropped after encoding.
#[derive(Debug, Default)]
pub struct StatePool {
    pub states: Vec<State>,
    by_reservs: HashMap<ReservSet, StateId>,
    by_components: HashMap<Vec<StateId>, StateId>,
}

impl StatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an atomic state by its reservation set. Returns the state id
    /// and whether it was newly allocated.
    pub fn intern(
        &mut self,
        automaton_num: usize,
        reservs: ReservSet,
        unique_counter: &mut usize,
    ) -> (StateId, bool) {
        if let Some(&existing) = self.by_reservs.get(&reservs) {
            return (existing, false);
        }
        let id = self.states.len();
        self.by_reservs.insert(reservs.clone(), id);
        self.states.push(State {
            unique_num: next_unique(unique_counter),
            automaton_num,
            reservs,
            component_states: Vec::new(),
            out_arcs: Vec::new(),
            order_num: None,
        });
        (id, true)
    }

    /// Intern a composed state by its canonical (sorted, deduplicated)
    /// component list.
    pub fn intern_composed(
        &mut self,
        automaton_num: usize,
        components: Vec<StateId>,
        reservs: ReservSet,
        unique_counter: &mut usize,
    ) -> (StateId, bool) {
        debug_assert!(components.windows(2).all(|w| w[0] < w[1]));
        if let Some(&existing) = self.by_components.get(&components) {
            return (existing, false);
        }
        let id = self.states.len();
        self.by_components.insert(components.clone(), id);
        self.states.push(State {
            unique_num: next_unique(unique_counter),
            automaton_num,
            reservs,
            component_states: components,
            out_arcs: Vec::new(),
            order_num: None,
        });
        (id, true)
    }

    /// Add an arc, folding repeats: a second arc with the same instruction
    /// and destination only bumps the alternatives count.
    pub fn add_arc(&mut self, from: StateId, ainsn: usize, to: StateId) {
        let arcs = &mut self.states[from].out_arcs;
        for arc in arcs.iter_mut() {
            if arc.ainsn == ainsn && arc.to == to {
                arc.alts += 1;
                return;
            }
        }
        arcs.push(Arc { ainsn, to, alts: 1 });
    }

    pub fn arc_for_ainsn(&self, state: StateId, ainsn: usize) -> Option<&Arc> {
        self.states[state].out_arcs.iter().find(|a| a.ainsn == ainsn)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

fn next_unique(counter: &mut usize) -> usize {
    let value = *counter;
    *counter += 1;
    value
}

/// Canonicalize an alt-state or component list: sort by id and drop
/// duplicates. Two canonical lists are equal iff they are pointwise equal.
pub fn canonical_state_list(mut states: Vec<StateId>) -> Vec<StateId> {
    states.sort_unstable();
    states.dedup();
    states
}
