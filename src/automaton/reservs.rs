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

// reservs.rs
//
// This file contains the reservation bitset algebra. A reservation set is a
// fixed-width bit string indexed by (cycle, unit); the conflict checker
// layers exclusion, presence, and absence pattern checks on top of the raw
// bit intersection.

use crate::description::decls::Description;
use crate::errors::GeneratorError;

pub const WORD_BITS: usize = 64;

/// Geometry shared by every reservation set of one run: all automata use the
/// global unit numbering, so sets are directly comparable across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetDims {
    pub cycles: usize,
    pub units: usize,
    pub words_per_cycle: usize,
}

impl SetDims {
    pub fn new(cycles: usize, units: usize) -> Self {
        let words_per_cycle = if units == 0 { 1 } else { (units + WORD_BITS - 1) / WORD_BITS };
        Self {
            cycles: cycles.max(1),
            units,
            words_per_cycle,
        }
    }

    fn words(&self) -> usize {
        self.cycles * self.words_per_cycle
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReservSet {
    words: Vec<u64>,
}

impl ReservSet {
    pub fn empty(dims: &SetDims) -> Self {
        Self {
            words: vec![0; dims.words()],
        }
    }

    fn index(dims: &SetDims, cycle: usize, unit: usize) -> (usize, u64) {
        let word = cycle * dims.words_per_cycle + unit / WORD_BITS;
        let mask = 1u64 << (unit % WORD_BITS);
        (word, mask)
    }

    pub fn set(&mut self, dims: &SetDims, cycle: usize, unit: usize) -> Result<(), GeneratorError> {
        if cycle >= dims.cycles {
            return Err(GeneratorError::CycleOutOfRange {
                cycle,
                max_cycles: dims.cycles,
            });
        }
        let (word, mask) = Self::index(dims, cycle, unit);
        self.words[word] |= mask;
        Ok(())
    }

    pub fn test(&self, dims: &SetDims, cycle: usize, unit: usize) -> bool {
        if cycle >= dims.cycles {
            return false;
        }
        let (word, mask) = Self::index(dims, cycle, unit);
        self.words[word] & mask != 0
    }

    pub fn or(&self, other: &ReservSet) -> ReservSet {
        ReservSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a | b)
                .collect(),
        }
    }

    pub fn and(&self, other: &ReservSet) -> ReservSet {
        ReservSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
        }
    }

    /// Advance one cycle: cycle 0 is dropped, every later cycle moves down
    /// by one, and the last cycle becomes empty.
    pub fn shift(&self, dims: &SetDims) -> ReservSet {
        let mut words = vec![0; dims.words()];
        let wpc = dims.words_per_cycle;
        for cycle in 1..dims.cycles {
            let src = cycle * wpc;
            let dst = (cycle - 1) * wpc;
            words[dst..dst + wpc].copy_from_slice(&self.words[src..src + wpc]);
        }
        ReservSet { words }
    }

    /// True when some (cycle, unit) bit is set in both operands.
    pub fn bits_intersect(&self, other: &ReservSet) -> bool {
        self.words.iter().zip(&other.words).any(|(a, b)| a & b != 0)
    }

    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn units_on_cycle(&self, dims: &SetDims, cycle: usize) -> Vec<usize> {
        let mut units = Vec::new();
        if cycle >= dims.cycles {
            return units;
        }
        let base = cycle * dims.words_per_cycle;
        for word_index in 0..dims.words_per_cycle {
            let mut word = self.words[base + word_index];
            while word != 0 {
                let bit = word.trailing_zeros() as usize;
                let unit = word_index * WORD_BITS + bit;
                if unit < dims.units {
                    units.push(unit);
                }
                word &= word - 1;
            }
        }
        units
    }

    fn cycle_words(&self, dims: &SetDims, cycle: usize) -> &[u64] {
        let base = cycle * dims.words_per_cycle;
        &self.words[base..base + dims.words_per_cycle]
    }
}

/// A single-cycle unit mask, used for exclusion sets and pattern sets.
type CycleMask = Vec<u64>;

fn mask_with(dims: &SetDims, units: &[usize]) -> CycleMask {
    let mut mask = vec![0u64; dims.words_per_cycle];
    for &unit in units {
        mask[unit / WORD_BITS] |= 1u64 << (unit % WORD_BITS);
    }
    mask
}

fn mask_subset(pattern: &[u64], cycle: &[u64]) -> bool {
    pattern.iter().zip(cycle).all(|(p, c)| p & !c == 0)
}

fn mask_overlap(mask: &[u64], cycle: &[u64]) -> bool {
    mask.iter().zip(cycle).any(|(m, c)| m & c != 0)
}

/// The unified intersection predicate of the automaton construction. Wraps
/// the raw bit test with the exclusion, presence, and absence constraints
/// attached to the units of the description.
#[derive(Debug)]
pub struct ConflictChecker {
    dims: SetDims,
    unit_excl: Vec<CycleMask>,
    presence: Vec<Vec<CycleMask>>,
    final_presence: Vec<Vec<CycleMask>>,
    absence: Vec<Vec<CycleMask>>,
    final_absence: Vec<Vec<CycleMask>>,
}

impl ConflictChecker {
    pub fn new(desc: &Description, dims: SetDims) -> Self {
        let patterns = |lists: &[Vec<usize>]| -> Vec<CycleMask> {
            lists.iter().map(|p| mask_with(&dims, p)).collect()
        };
        Self {
            dims,
            unit_excl: desc.units.iter().map(|u| mask_with(&dims, &u.excl)).collect(),
            presence: desc.units.iter().map(|u| patterns(&u.presence)).collect(),
            final_presence: desc
                .units
                .iter()
                .map(|u| patterns(&u.final_presence))
                .collect(),
            absence: desc.units.iter().map(|u| patterns(&u.absence)).collect(),
            final_absence: desc
                .units
                .iter()
                .map(|u| patterns(&u.final_absence))
                .collect(),
        }
    }

    pub fn dims(&self) -> &SetDims {
        &self.dims
    }

    /// True iff the operands collide: some bit is set in both, some unit of
    /// one cycle excludes a cycle-identical unit of the other, or the union
    /// violates a presence or absence pattern of a reserved unit.
    pub fn intersects(&self, a: &ReservSet, b: &ReservSet) -> bool {
        if a.bits_intersect(b) {
            return true;
        }
        for cycle in 0..self.dims.cycles {
            let a_cycle = a.cycle_words(&self.dims, cycle);
            for &unit in b.units_on_cycle(&self.dims, cycle).iter() {
                if mask_overlap(&self.unit_excl[unit], a_cycle) {
                    return true;
                }
            }
        }
        let union = a.or(b);
        !self.patterns_ok(&union, false)
    }

    /// Check the settled reservation set of a candidate state against the
    /// final presence and absence patterns.
    pub fn final_patterns_ok(&self, set: &ReservSet) -> bool {
        self.patterns_ok(set, true)
    }

    fn patterns_ok(&self, set: &ReservSet, final_p: bool) -> bool {
        let (presence, absence) = if final_p {
            (&self.final_presence, &self.final_absence)
        } else {
            (&self.presence, &self.absence)
        };
        for cycle in 0..self.dims.cycles {
            let cycle_mask = set.cycle_words(&self.dims, cycle);
            for &unit in set.units_on_cycle(&self.dims, cycle).iter() {
                let presence_patterns = &presence[unit];
                if !presence_patterns.is_empty()
                    && !presence_patterns
                        .iter()
                        .any(|pattern| mask_subset(pattern, cycle_mask))
                {
                    return false;
                }
                if absence[unit]
                    .iter()
                    .any(|pattern| mask_subset(pattern, cycle_mask))
                {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_drops_cycle_zero() {
        let dims = SetDims::new(3, 4);
        let mut set = ReservSet::empty(&dims);
        set.set(&dims, 0, 1).unwrap();
        set.set(&dims, 1, 2).unwrap();
        set.set(&dims, 2, 3).unwrap();
        let shifted = set.shift(&dims);
        assert!(shifted.test(&dims, 0, 2));
        assert!(shifted.test(&dims, 1, 3));
        assert!(!shifted.test(&dims, 2, 3));
        assert!(!shifted.test(&dims, 0, 1));
    }

    #[test]
    fn set_rejects_out_of_range_cycle() {
        let dims = SetDims::new(2, 4);
        let mut set = ReservSet::empty(&dims);
        assert!(set.set(&dims, 2, 0).is_err());
    }
}
