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

// transform.rs
//
// This file contains the regexp transformer. It rewrites every instruction
// reservation into the canonical shape `oneof(sequence(allof(unit...)...)...)`
// by unrolling repetitions, flattening nested operators, and lifting
// alternation to the top, after substituting named reservations.

use log::debug;

use crate::description::decls::{Description, ReservationDecl};
use crate::description::regexp::Regexp;
use crate::errors::Diagnostic;

/// Rewrite every instruction reservation into canonical form. The original
/// parse trees are kept; the canonical copy is stored in
/// `transformed_regexp` and is what the automaton builder reads.
pub fn transform_insn_regexps(desc: &mut Description) {
    let reservations = desc.reservations.clone();
    for insn in &mut desc.insns {
        let copied = copy_erasing_reserv(&insn.regexp, &reservations);
        let transformed = transform_regexp(copied);
        debug!("canonical reservation of `{}`: {}", insn.name, transformed);
        insn.transformed_regexp = Some(transformed);
    }
}

/// Deep-copy a regexp, substituting every reference to a named reservation
/// with a copy of the referenced expression. Reservation cycles were
/// rejected by the checker, so the substitution terminates.
fn copy_erasing_reserv(regexp: &Regexp, reservations: &[ReservationDecl]) -> Regexp {
    match regexp {
        Regexp::Reserv { decl: Some(num), .. } => {
            copy_erasing_reserv(&reservations[*num].regexp, reservations)
        },
        Regexp::Reserv { decl: None, name } => Regexp::Unit {
            name: name.clone(),
            decl: None,
        },
        Regexp::Unit { .. } | Regexp::Nothing => regexp.clone(),
        Regexp::Repeat(operand, count) => Regexp::Repeat(
            Box::new(copy_erasing_reserv(operand, reservations)),
            *count,
        ),
        Regexp::Sequence(operands) => Regexp::Sequence(
            operands
                .iter()
                .map(|operand| copy_erasing_reserv(operand, reservations))
                .collect(),
        ),
        Regexp::Allof(operands) => Regexp::Allof(
            operands
                .iter()
                .map(|operand| copy_erasing_reserv(operand, reservations))
                .collect(),
        ),
        Regexp::Oneof(operands) => Regexp::Oneof(
            operands
                .iter()
                .map(|operand| copy_erasing_reserv(operand, reservations))
                .collect(),
        ),
    }
}

/// Apply the rewrite rules until a fixed point is reached.
pub fn transform_regexp(regexp: Regexp) -> Regexp {
    let mut current = regexp;
    loop {
        let mut changed = false;
        current = transform_pass(current, &mut changed);
        if !changed {
            return current;
        }
    }
}

fn transform_pass(regexp: Regexp, changed: &mut bool) -> Regexp {
    // Children first, then the rules at this node.
    let node = match regexp {
        Regexp::Repeat(operand, count) => {
            let operand = transform_pass(*operand, changed);
            // T1: unroll the repetition into an explicit sequence.
            *changed = true;
            return Regexp::Sequence(vec![operand; count]);
        },
        Regexp::Sequence(operands) => Regexp::Sequence(
            operands
                .into_iter()
                .map(|operand| transform_pass(operand, changed))
                .collect(),
        ),
        Regexp::Allof(operands) => Regexp::Allof(
            operands
                .into_iter()
                .map(|operand| transform_pass(operand, changed))
                .collect(),
        ),
        Regexp::Oneof(operands) => Regexp::Oneof(
            operands
                .into_iter()
                .map(|operand| transform_pass(operand, changed))
                .collect(),
        ),
        leaf => return leaf,
    };

    match node {
        // T2: flatten nested operators of the same kind; collapse singletons.
        Regexp::Sequence(operands) => {
            let operands = flatten(
                operands,
                |op| matches!(op, Regexp::Sequence(_)),
                |op| match op {
                    Regexp::Sequence(inner) => inner,
                    other => vec![other],
                },
                changed,
            );
            if let Some(lifted) = lift_oneof(&operands) {
                *changed = true;
                return Regexp::Oneof(
                    lifted
                        .into_iter()
                        .map(Regexp::Sequence)
                        .collect(),
                );
            }
            collapse(Regexp::Sequence(operands), changed)
        },
        Regexp::Allof(operands) => {
            let operands = flatten(
                operands,
                |op| matches!(op, Regexp::Allof(_)),
                |op| match op {
                    Regexp::Allof(inner) => inner,
                    other => vec![other],
                },
                changed,
            );
            if let Some(lifted) = lift_oneof(&operands) {
                *changed = true;
                return Regexp::Oneof(lifted.into_iter().map(Regexp::Allof).collect());
            }
            if let Some(transposed) = transpose_allof(&operands) {
                *changed = true;
                return transposed;
            }
            collapse(Regexp::Allof(operands), changed)
        },
        Regexp::Oneof(operands) => {
            let operands = flatten(
                operands,
                |op| matches!(op, Regexp::Oneof(_)),
                |op| match op {
                    Regexp::Oneof(inner) => inner,
                    other => vec![other],
                },
                changed,
            );
            collapse(Regexp::Oneof(operands), changed)
        },
        other => other,
    }
}

fn flatten(
    operands: Vec<Regexp>,
    is_nested: impl Fn(&Regexp) -> bool,
    into_parts: impl Fn(Regexp) -> Vec<Regexp>,
    changed: &mut bool,
) -> Vec<Regexp> {
    if !operands.iter().any(&is_nested) {
        return operands;
    }
    *changed = true;
    operands.into_iter().flat_map(into_parts).collect()
}

fn collapse(regexp: Regexp, changed: &mut bool) -> Regexp {
    match regexp {
        Regexp::Sequence(mut operands)
        | Regexp::Allof(mut operands)
        | Regexp::Oneof(mut operands)
            if operands.len() == 1 =>
        {
            *changed = true;
            operands.pop().unwrap()
        },
        other => other,
    }
}

/// T3, alternation lifting: replace the first `Oneof` operand with each of
/// its alternatives in turn. Returns one operand vector per alternative.
fn lift_oneof(operands: &[Regexp]) -> Option<Vec<Vec<Regexp>>> {
    let position = operands
        .iter()
        .position(|op| matches!(op, Regexp::Oneof(_)))?;
    let alternatives = match &operands[position] {
        Regexp::Oneof(alts) => alts,
        _ => unreachable!(),
    };
    Some(
        alternatives
            .iter()
            .map(|alt| {
                let mut row = operands.to_vec();
                row[position] = alt.clone();
                row
            })
            .collect(),
    )
}

/// T3, sequence transposition: `allof(seq, seq, ..., scalar...)` becomes a
/// sequence of per-cycle allofs. The allof at position `i` collects the
/// i-th element of every sequence operand; scalar operands join position 0.
fn transpose_allof(operands: &[Regexp]) -> Option<Regexp> {
    let scalar = |op: &Regexp| matches!(op, Regexp::Unit { .. } | Regexp::Nothing);
    if !operands.iter().any(|op| matches!(op, Regexp::Sequence(_))) {
        return None;
    }
    if !operands
        .iter()
        .all(|op| scalar(op) || matches!(op, Regexp::Sequence(_)))
    {
        return None;
    }
    let length = operands
        .iter()
        .map(|op| match op {
            Regexp::Sequence(inner) => inner.len(),
            _ => 1,
        })
        .max()
        .unwrap_or(1);
    let mut cycles: Vec<Vec<Regexp>> = vec![Vec::new(); length];
    for operand in operands {
        match operand {
            Regexp::Sequence(inner) => {
                for (i, elem) in inner.iter().enumerate() {
                    cycles[i].push(elem.clone());
                }
            },
            scalar_op => cycles[0].push(scalar_op.clone()),
        }
    }
    Some(Regexp::Sequence(
        cycles
            .into_iter()
            .map(|mut cycle| {
                if cycle.is_empty() {
                    Regexp::Nothing
                } else if cycle.len() == 1 {
                    cycle.pop().unwrap()
                } else {
                    Regexp::Allof(cycle)
                }
            })
            .collect(),
    ))
}

/// The top-level alternatives of a canonical regexp.
pub fn regexp_alternatives(regexp: &Regexp) -> Vec<&Regexp> {
    match regexp {
        Regexp::Oneof(alternatives) => alternatives.iter().collect(),
        other => vec![other],
    }
}

/// The per-cycle elements of one canonical alternative.
pub fn alternative_cycles(alternative: &Regexp) -> Vec<&Regexp> {
    match alternative {
        Regexp::Sequence(elements) => elements.iter().collect(),
        other => vec![other],
    }
}

/// The linked unit indices reserved by one canonical cycle element.
pub fn cycle_units(element: &Regexp) -> Vec<usize> {
    match element {
        Regexp::Unit { decl: Some(num), .. } => vec![*num],
        Regexp::Allof(operands) => operands
            .iter()
            .filter_map(|op| match op {
                Regexp::Unit { decl: Some(num), .. } => Some(*num),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// True when the regexp has the canonical shape: a `Oneof` (or a degenerate
/// reduction) of sequences of allofs of unit/nothing leaves, with no
/// `Reserv` or `Repeat` nodes anywhere.
pub fn canonical_p(regexp: &Regexp) -> bool {
    regexp_alternatives(regexp).iter().all(|alternative| {
        !matches!(alternative, Regexp::Oneof(_))
            && alternative_cycles(alternative).iter().all(|element| {
                match element {
                    Regexp::Unit { .. } | Regexp::Nothing => true,
                    Regexp::Allof(operands) => operands
                        .iter()
                        .all(|op| matches!(op, Regexp::Unit { .. } | Regexp::Nothing)),
                    _ => false,
                }
            })
    })
}

/// Warn when some alternative of an instruction leaves an automaton idle on
/// a cycle where another alternative reserves one of that automaton's units.
/// Such reservations usually mean a missing unit mention, and they make the
/// per-automaton views of the alternatives diverge.
pub fn check_unit_distribution(desc: &Description) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    for insn in &desc.insns {
        let regexp = match &insn.transformed_regexp {
            Some(regexp) => regexp,
            None => continue,
        };
        let alternatives = regexp_alternatives(regexp);
        if alternatives.len() < 2 {
            continue;
        }
        // Per alternative, per cycle: the set of automata with a reserved unit.
        let per_alt: Vec<Vec<Vec<usize>>> = alternatives
            .iter()
            .map(|alternative| {
                alternative_cycles(alternative)
                    .iter()
                    .map(|element| {
                        let mut automata: Vec<usize> = cycle_units(element)
                            .iter()
                            .filter_map(|&unit| desc.units[unit].automaton_num)
                            .collect();
                        automata.sort_unstable();
                        automata.dedup();
                        automata
                    })
                    .collect()
            })
            .collect();
        let max_cycles = per_alt.iter().map(|alt| alt.len()).max().unwrap_or(0);
        let mut reported: Vec<usize> = Vec::new();
        for cycle in 0..max_cycles {
            let mut automata_on_cycle: Vec<usize> = per_alt
                .iter()
                .flat_map(|alt| alt.get(cycle).cloned().unwrap_or_default())
                .collect();
            automata_on_cycle.sort_unstable();
            automata_on_cycle.dedup();
            for alt in &per_alt {
                let here = match alt.get(cycle) {
                    Some(here) if !here.is_empty() => here,
                    _ => continue,
                };
                for &automaton in &automata_on_cycle {
                    if !here.contains(&automaton) && !reported.contains(&automaton) {
                        reported.push(automaton);
                        let automaton_name = desc
                            .automata
                            .get(automaton)
                            .map(|a| a.name.clone())
                            .unwrap_or_else(|| format!("#{}", automaton));
                        diags.push(Diagnostic::warning(format!(
                            "units of automaton `{}` are not used on the same cycle \
                             in all alternatives of reservation of insn `{}`",
                            automaton_name, insn.name
                        )));
                    }
                }
            }
        }
    }
    diags
}
