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

// partition.rs
//
// This file contains the unit to automaton assignment. With declared
// automata each unit follows its declaration; otherwise a heuristic packs
// units into the requested number of automata, bounding the estimated DFA
// size of each as the product of per-unit occupancy ranges.

use log::debug;

use crate::config::GeneratorConfig;
use crate::description::decls::Description;

// Overflow-safe ceiling for the per-automaton size estimate.
const MAX_AUTOMATON_BOUND: f64 = 1.0e18;

pub fn units_to_automata(desc: &mut Description, config: &GeneratorConfig) {
    if !desc.automata.is_empty() {
        for unit in &mut desc.units {
            if unit.automaton_num.is_none() {
                unit.automaton_num = Some(0);
            }
        }
        desc.automata_num = desc.automata.len();
        debug!("declared partition into {} automaton(s)", desc.automata_num);
        return;
    }

    let count = config.automata_count.unwrap_or(1);
    if count <= 1 || desc.units.len() <= 1 {
        for unit in &mut desc.units {
            unit.automaton_num = Some(0);
        }
        desc.automata_num = 1;
        return;
    }

    desc.automata_num = distribute_heuristically(desc, count);
    debug!("heuristic partition into {} automaton(s)", desc.automata_num);
}

fn occupancy_range(desc: &Description, unit: usize) -> usize {
    let decl = &desc.units[unit];
    match decl.min_occ_cycle_num {
        Some(min) => decl.max_occ_cycle_num - min + 1,
        None => 1,
    }
}

/// The shared per-bucket bound: the k-th root of the whole-machine size
/// estimate, so k evenly loaded buckets fit under it.
fn one_automaton_bound(desc: &Description, count: usize) -> f64 {
    let mut bound = 1.0f64;
    for unit in 0..desc.units.len() {
        let root = (occupancy_range(desc, unit) as f64).powf(1.0 / count as f64);
        if MAX_AUTOMATON_BOUND / root > bound {
            bound *= root;
        }
    }
    bound
}

fn distribute_heuristically(desc: &mut Description, count: usize) -> usize {
    let bound = one_automaton_bound(desc, count);
    let mut order: Vec<usize> = (0..desc.units.len()).collect();
    order.sort_by(|&a, &b| {
        desc.units[b]
            .max_occ_cycle_num
            .cmp(&desc.units[a].max_occ_cycle_num)
            .then(a.cmp(&b))
    });

    let mut automaton = 0usize;
    let mut estimate = 1.0f64;
    let mut bucket_filled = false;
    for unit in order {
        let value = occupancy_range(desc, unit) as f64;
        if bucket_filled && estimate * value > bound && automaton + 1 < count {
            automaton += 1;
            estimate = 1.0;
            bucket_filled = false;
        }
        desc.units[unit].automaton_num = Some(automaton);
        estimate *= value;
        bucket_filled = true;
    }
    automaton + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::decls::UnitDecl;

    fn unit(name: &str, num: usize, min: usize, max: usize) -> UnitDecl {
        let mut unit = UnitDecl::new(name.to_string(), None, false, num);
        unit.min_occ_cycle_num = Some(min);
        unit.max_occ_cycle_num = max;
        unit
    }

    #[test]
    fn heuristic_uses_every_bucket_for_wide_units() {
        let mut desc = Description::new();
        desc.units.push(unit("a", 0, 0, 7));
        desc.units.push(unit("b", 1, 0, 7));
        let config = GeneratorConfig::new().with_automata_count(2);
        units_to_automata(&mut desc, &config);
        assert_eq!(desc.automata_num, 2);
        assert_ne!(desc.units[0].automaton_num, desc.units[1].automaton_num);
    }

    #[test]
    fn declared_units_keep_their_automaton() {
        let mut desc = Description::new();
        desc.automata.push(crate::description::decls::AutomatonDecl {
            name: "pipe".to_string(),
            automaton_num: 0,
            used: true,
        });
        let mut u = unit("a", 0, 0, 0);
        u.automaton_num = None;
        desc.units.push(u);
        units_to_automata(&mut desc, &GeneratorConfig::new());
        assert_eq!(desc.units[0].automaton_num, Some(0));
        assert_eq!(desc.automata_num, 1);
    }
}
