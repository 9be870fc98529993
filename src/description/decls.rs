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

// decls.rs
//
// This file contains the declaration records delivered by the front end and
// the linked description the checker builds from them. Declarations are kept
// in per-kind arenas addressed by dense indices; the input order within each
// kind is preserved in all numbered outputs.

use crate::description::regexp::Regexp;

/// One typed declaration record as delivered by the front end. Reservation
/// expressions arrive as verbatim strings; the checker parses them.
#[derive(Debug, Clone)]
pub enum Decl {
    Automaton {
        names: Vec<String>,
    },
    Unit {
        names: Vec<String>,
        automaton: Option<String>,
        query: bool,
    },
    Exclusion {
        first: Vec<String>,
        second: Vec<String>,
    },
    Presence {
        targets: Vec<String>,
        patterns: Vec<Vec<String>>,
        final_p: bool,
    },
    Absence {
        targets: Vec<String>,
        patterns: Vec<Vec<String>>,
        final_p: bool,
    },
    Reservation {
        name: String,
        expr: String,
    },
    InsnReservation {
        name: String,
        latency: i64,
        condition: Option<String>,
        expr: String,
    },
    Bypass {
        latency: i64,
        out_insn: String,
        in_insn: String,
        guard: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct AutomatonDecl {
    pub name: String,
    pub automaton_num: usize,
    pub used: bool,
}

/// A functional unit. Exclusion and pattern lists hold unit indices; the
/// occupancy cycle bounds are derived by the checker from every instruction
/// reservation that mentions the unit.
#[derive(Debug, Clone)]
pub struct UnitDecl {
    pub name: String,
    pub automaton_name: Option<String>,
    pub query_p: bool,
    pub unit_num: usize,
    pub query_num: Option<usize>,
    pub automaton_num: Option<usize>,
    pub excl: Vec<usize>,
    pub presence: Vec<Vec<usize>>,
    pub final_presence: Vec<Vec<usize>>,
    pub absence: Vec<Vec<usize>>,
    pub final_absence: Vec<Vec<usize>>,
    pub min_occ_cycle_num: Option<usize>,
    pub max_occ_cycle_num: usize,
    pub in_set_p: bool,
    pub used: bool,
}

impl UnitDecl {
    pub fn new(name: String, automaton_name: Option<String>, query_p: bool, unit_num: usize) -> Self {
        Self {
            name,
            automaton_name,
            query_p,
            unit_num,
            query_num: None,
            automaton_num: None,
            excl: Vec::new(),
            presence: Vec::new(),
            final_presence: Vec::new(),
            absence: Vec::new(),
            final_absence: Vec::new(),
            min_occ_cycle_num: None,
            max_occ_cycle_num: 0,
            in_set_p: false,
            used: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReservationDecl {
    pub name: String,
    pub regexp: Regexp,
    pub used: bool,
    /// Cycle-detection pass number; 0 when the reservation was never visited.
    pub loop_pass_num: usize,
}

#[derive(Debug, Clone)]
pub struct BypassDecl {
    pub latency: u64,
    pub out_insn_name: String,
    pub in_insn_name: String,
    pub guard: Option<String>,
    pub out_insn: usize,
    pub in_insn: usize,
}

#[derive(Debug, Clone)]
pub struct InsnDecl {
    pub name: String,
    pub condition: Option<String>,
    pub default_latency: u64,
    pub insn_num: usize,
    pub regexp: Regexp,
    pub transformed_regexp: Option<Regexp>,
    /// Indices into `Description::bypasses` of bypasses whose producer is
    /// this instruction, in declaration order.
    pub bypasses: Vec<usize>,
    pub equiv_class_num: Option<usize>,
    /// Automata in which this instruction reserves at least one unit.
    pub important_automata: Vec<usize>,
}

/// The fully linked machine description the checker hands to the automaton
/// builder. Arenas are append-only; indices stay valid for the whole run.
#[derive(Debug, Clone, Default)]
pub struct Description {
    pub automata: Vec<AutomatonDecl>,
    pub units: Vec<UnitDecl>,
    pub reservations: Vec<ReservationDecl>,
    pub insns: Vec<InsnDecl>,
    pub bypasses: Vec<BypassDecl>,
    pub query_units_num: usize,
    /// One past the maximum cycle at which any instruction reserves a unit.
    pub max_insn_reserv_cycles: usize,
    /// Number of automata after unit partitioning (at least 1).
    pub automata_num: usize,
}

impl Description {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insns_num(&self) -> usize {
        self.insns.len()
    }

    pub fn units_num(&self) -> usize {
        self.units.len()
    }

    pub fn unit_by_name(&self, name: &str) -> Option<&UnitDecl> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Units assigned to the given automaton, in declaration order.
    pub fn units_of_automaton(&self, automaton_num: usize) -> Vec<usize> {
        self.units
            .iter()
            .filter(|u| u.automaton_num == Some(automaton_num))
            .map(|u| u.unit_num)
            .collect()
    }
}
