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

// report.rs
//
// This file contains the human-readable report writer: unit constraint
// sets, canonical reservations, the state graph of every automaton, and
// the numerical statistics of the run.

use std::fmt::Write;

use crate::description::decls::Description;
use crate::automaton::builder::BuiltAutomaton;
use crate::automaton::reservs::SetDims;
use crate::output::emitter::GeneratedDfa;
use crate::output::GenerationStats;

const LINE_WIDTH: usize = 70;

pub fn write_report(
    desc: &Description,
    automata: &[BuiltAutomaton],
    dfa: &GeneratedDfa,
    stats: &GenerationStats,
    dims: &SetDims,
) -> String {
    let mut out = String::new();

    // (i) Unit constraint sets.
    for unit in &desc.units {
        let sets: [(&str, &Vec<Vec<usize>>); 4] = [
            ("presence", &unit.presence),
            ("final presence", &unit.final_presence),
            ("absence", &unit.absence),
            ("final absence", &unit.final_absence),
        ];
        if unit.excl.is_empty() && sets.iter().all(|(_, list)| list.is_empty()) {
            continue;
        }
        let _ = writeln!(out, "unit {}:", unit.name);
        if !unit.excl.is_empty() {
            let names: Vec<&str> = unit.excl.iter().map(|&u| desc.units[u].name.as_str()).collect();
            write_wrapped(&mut out, "  exclusion set:", &names);
        }
        for (label, patterns) in sets {
            for pattern in patterns {
                let names: Vec<&str> =
                    pattern.iter().map(|&u| desc.units[u].name.as_str()).collect();
                write_wrapped(&mut out, &format!("  {} pattern:", label), &names);
            }
        }
    }
    if !out.is_empty() {
        let _ = writeln!(out);
    }

    // (ii) Reservations and instruction reservations, canonical form.
    for reservation in &desc.reservations {
        let _ = writeln!(out, "reservation {}: {}", reservation.name, reservation.regexp);
    }
    for insn in &desc.insns {
        let reservation = insn
            .transformed_regexp
            .as_ref()
            .unwrap_or(&insn.regexp);
        let _ = writeln!(
            out,
            "insn reservation {} (latency {}): {}",
            insn.name, insn.default_latency, reservation
        );
    }
    let _ = writeln!(out);

    // (iii) Automaton sections.
    for (automaton, tables) in automata.iter().zip(&dfa.automata) {
        let name = automaton
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", automaton.automaton_num));
        let _ = writeln!(out, "automaton {}", name);
        let members: Vec<&str> = desc
            .units_of_automaton(automaton.automaton_num)
            .into_iter()
            .map(|unit| desc.units[unit].name.as_str())
            .collect();
        write_wrapped(&mut out, "  units:", &members);
        for (order, &state) in automaton.ordered_states.iter().enumerate() {
            let reservs = render_reservs(desc, automaton, state, dims);
            let _ = writeln!(out, "  state {}: {}", order, reservs);
            for arc in &automaton.pool.states[state].out_arcs {
                let ainsn = &automaton.ainsns[arc.ainsn];
                let insn_name = if ainsn.insn_num == desc.insns_num() {
                    "$advance_cycle"
                } else {
                    desc.insns[ainsn.insn_num].name.as_str()
                };
                let to_order = automaton.pool.states[arc.to].order_num.unwrap_or(0);
                let _ = writeln!(
                    out,
                    "    class {} ({}) -> state {}  alts {}",
                    ainsn.equiv_class_num, insn_name, to_order, arc.alts
                );
            }
        }
        let _ = writeln!(
            out,
            "  start state {}, {} state(s), {} equivalence class(es)",
            tables.start_state, tables.states_num, tables.insn_equiv_classes_num
        );
        let _ = writeln!(out);
    }

    // (iv) Statistics.
    let _ = writeln!(out, "statistics:");
    for entry in &stats.automata {
        let name = entry
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", entry.automaton));
        let _ = writeln!(
            out,
            "  automaton {}: NDFA {} state(s) {} arc(s); DFA {} state(s) {} arc(s); \
             minimal {} state(s) {} arc(s); {} locked state(s)",
            name,
            entry.ndfa_states,
            entry.ndfa_arcs,
            entry.dfa_states,
            entry.dfa_arcs,
            entry.minimal_states,
            entry.minimal_arcs,
            entry.locked_states
        );
        let _ = writeln!(
            out,
            "    transition table: {} ({} elements); state alts table: {} ({} elements); \
             min delay: {} bit(s) per element",
            if entry.transition_comb { "comb" } else { "full" },
            entry.transition_elements,
            if entry.state_alts_comb { "comb" } else { "full" },
            entry.state_alts_elements,
            entry.min_delay_bits
        );
    }
    if !stats.phase_times_ms.is_empty() {
        let _ = writeln!(out, "  phase times:");
        for (phase, millis) in &stats.phase_times_ms {
            let _ = writeln!(out, "    {}: {:.2} ms", phase, millis);
        }
    }

    out
}

/// Render a state's reservation set as a cycle-grouped expression, e.g.
/// `alu+mul, nothing, mem`. Trailing empty cycles are trimmed.
fn render_reservs(
    desc: &Description,
    automaton: &BuiltAutomaton,
    state: usize,
    dims: &SetDims,
) -> String {
    let reservs = &automaton.pool.states[state].reservs;
    let mut cycles: Vec<String> = Vec::new();
    for cycle in 0..dims.cycles {
        let units = reservs.units_on_cycle(dims, cycle);
        if units.is_empty() {
            cycles.push("nothing".to_string());
        } else {
            let names: Vec<&str> = units.iter().map(|&u| desc.units[u].name.as_str()).collect();
            cycles.push(names.join("+"));
        }
    }
    while cycles.len() > 1 && cycles.last().map(|c| c == "nothing").unwrap_or(false) {
        cycles.pop();
    }
    cycles.join(", ")
}

/// Write a labelled name enumeration, folding at the report line width.
fn write_wrapped(out: &mut String, label: &str, names: &[&str]) {
    let mut line = label.to_string();
    for name in names {
        if line.len() + name.len() + 1 > LINE_WIDTH {
            let _ = writeln!(out, "{}", line);
            line = format!("    {}", name);
        } else {
            line.push(' ');
            line.push_str(name);
        }
    }
    let _ = writeln!(out, "{}", line);
}
