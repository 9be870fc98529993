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

// intern.rs
//
// This file contains the name-keyed intern tables for declarations.
// Units and named reservations live in one shared namespace; automata and
// instructions each have their own.

use std::collections::HashMap;

/// What a name in the shared unit/reservation namespace refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitReservRef {
    Unit(usize),
    Reserv(usize),
}

/// Outcome of an insert-if-absent probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interned<T> {
    New,
    Existing(T),
}

#[derive(Debug, Default)]
pub struct InternTables {
    automatons: HashMap<String, usize>,
    insns: HashMap<String, usize>,
    unit_reserv: HashMap<String, UnitReservRef>,
}

impl InternTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_automaton(&mut self, name: &str, num: usize) -> Interned<usize> {
        match self.automatons.get(name) {
            Some(&existing) => Interned::Existing(existing),
            None => {
                self.automatons.insert(name.to_string(), num);
                Interned::New
            },
        }
    }

    pub fn find_automaton(&self, name: &str) -> Option<usize> {
        self.automatons.get(name).copied()
    }

    pub fn insert_insn(&mut self, name: &str, num: usize) -> Interned<usize> {
        match self.insns.get(name) {
            Some(&existing) => Interned::Existing(existing),
            None => {
                self.insns.insert(name.to_string(), num);
                Interned::New
            },
        }
    }

    pub fn find_insn(&self, name: &str) -> Option<usize> {
        self.insns.get(name).copied()
    }

    pub fn insert_unit_reserv(
        &mut self,
        name: &str,
        entry: UnitReservRef,
    ) -> Interned<UnitReservRef> {
        match self.unit_reserv.get(name) {
            Some(&existing) => Interned::Existing(existing),
            None => {
                self.unit_reserv.insert(name.to_string(), entry);
                Interned::New
            },
        }
    }

    pub fn find_unit_reserv(&self, name: &str) -> Option<UnitReservRef> {
        self.unit_reserv.get(name).copied()
    }

    pub fn find_unit(&self, name: &str) -> Option<usize> {
        match self.unit_reserv.get(name) {
            Some(UnitReservRef::Unit(num)) => Some(*num),
            _ => None,
        }
    }
}
