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

// checker.rs
//
// This file contains the declaration checker. It links names to
// declarations, detects reservation cycles, symmetrizes exclusion sets,
// resolves presence/absence patterns, and computes per-unit occupancy
// cycle bounds. Any error stops the pipeline before the transformer runs.

use log::debug;

use crate::config::GeneratorConfig;
use crate::description::decls::{
    AutomatonDecl, BypassDecl, Decl, Description, InsnDecl, ReservationDecl, UnitDecl,
};
use crate::description::intern::{InternTables, Interned, UnitReservRef};
use crate::description::regexp::Regexp;
use crate::errors::Diagnostic;

/// Check and link a declaration list. On success the linked description is
/// returned together with any warnings; on failure the full diagnostic list
/// (warnings and errors) is returned instead.
pub fn check(
    decls: &[Decl],
    config: &GeneratorConfig,
) -> Result<(Description, Vec<Diagnostic>), Vec<Diagnostic>> {
    let mut checker = Checker {
        desc: Description::new(),
        tables: InternTables::new(),
        diags: Vec::new(),
        demote: config.warnings,
    };

    checker.process_automaton_decls(decls);
    checker.process_unit_and_insn_decls(decls);
    checker.process_bypass_decls(decls);
    checker.process_exclusion_decls(decls);
    checker.process_pattern_decls(decls);
    checker.link_regexps();
    let cycle_free = checker.check_reservation_cycles();
    if cycle_free {
        checker.evaluate_occupancy_cycles();
    }
    checker.check_usage();

    let errors = checker.diags.iter().filter(|d| d.is_error()).count();
    debug!(
        "checker finished: {} unit(s), {} insn(s), {} diagnostic(s)",
        checker.desc.units_num(),
        checker.desc.insns_num(),
        checker.diags.len()
    );
    if errors > 0 {
        Err(checker.diags)
    } else {
        Ok((checker.desc, checker.diags))
    }
}

struct Checker {
    desc: Description,
    tables: InternTables,
    diags: Vec<Diagnostic>,
    demote: bool,
}

impl Checker {
    fn error(&mut self, message: impl Into<String>) {
        self.diags.push(Diagnostic::error(message));
    }

    /// A diagnostic from the fixed warning-capable set: an error unless the
    /// user asked for demotion.
    fn demotable(&mut self, message: impl Into<String>) {
        if self.demote {
            self.diags.push(Diagnostic::warning(message));
        } else {
            self.diags.push(Diagnostic::error(message));
        }
    }

    /// Names must not contain a double quote; `nothing` is reserved in the
    /// unit/reservation namespace. Returns false when the name is unusable.
    fn check_name(&mut self, name: &str, reject_nothing: bool) -> bool {
        if name.contains('"') {
            self.error(format!("name `{}` contains a quote", name));
            return false;
        }
        if reject_nothing && name == "nothing" {
            self.error("`nothing` is used as a unit or reservation name");
            return false;
        }
        true
    }

    // Step 1: intern automaton declarations.
    fn process_automaton_decls(&mut self, decls: &[Decl]) {
        for decl in decls {
            if let Decl::Automaton { names } = decl {
                for name in names {
                    if !self.check_name(name, false) {
                        continue;
                    }
                    let num = self.desc.automata.len();
                    match self.tables.insert_automaton(name, num) {
                        Interned::Existing(_) => {
                            self.demotable(format!("repeated declaration of automaton `{}`", name));
                        },
                        Interned::New => {
                            self.desc.automata.push(AutomatonDecl {
                                name: name.clone(),
                                automaton_num: num,
                                used: false,
                            });
                        },
                    }
                }
            }
        }
    }

    // Step 2: number and intern units, reservations, and insn reservations.
    fn process_unit_and_insn_decls(&mut self, decls: &[Decl]) {
        for decl in decls {
            match decl {
                Decl::Unit {
                    names,
                    automaton,
                    query,
                } => {
                    for name in names {
                        self.add_unit(name, automaton.as_deref(), *query);
                    }
                },
                Decl::Reservation { name, expr } => {
                    self.add_reservation(name, expr);
                },
                Decl::InsnReservation {
                    name,
                    latency,
                    condition,
                    expr,
                } => {
                    self.add_insn_reservation(name, *latency, condition.as_deref(), expr);
                },
                _ => {},
            }
        }
        self.desc.query_units_num = self
            .desc
            .units
            .iter()
            .filter(|u| u.query_p)
            .count();
    }

    fn add_unit(&mut self, name: &str, automaton: Option<&str>, query: bool) {
        if !self.check_name(name, true) {
            return;
        }
        let unit_num = self.desc.units.len();
        match self
            .tables
            .insert_unit_reserv(name, UnitReservRef::Unit(unit_num))
        {
            Interned::Existing(_) => {
                self.error(format!("repeated declaration of `{}`", name));
                return;
            },
            Interned::New => {},
        }
        let mut unit = UnitDecl::new(name.to_string(), automaton.map(str::to_string), query, unit_num);
        if query {
            let query_num = self.desc.units.iter().filter(|u| u.query_p).count();
            unit.query_num = Some(query_num);
        }
        if let Some(automaton_name) = automaton {
            match self.tables.find_automaton(automaton_name) {
                Some(num) => {
                    unit.automaton_num = Some(num);
                    self.desc.automata[num].used = true;
                },
                None => {
                    self.error(format!(
                        "automaton `{}` of unit `{}` is not declared",
                        automaton_name, name
                    ));
                },
            }
        }
        self.desc.units.push(unit);
    }

    fn add_reservation(&mut self, name: &str, expr: &str) {
        if !self.check_name(name, true) {
            return;
        }
        let num = self.desc.reservations.len();
        match self
            .tables
            .insert_unit_reserv(name, UnitReservRef::Reserv(num))
        {
            Interned::Existing(_) => {
                self.error(format!("repeated declaration of `{}`", name));
                return;
            },
            Interned::New => {},
        }
        let regexp = match Regexp::parse(expr) {
            Ok(regexp) => regexp,
            Err(err) => {
                self.error(format!("reservation `{}`: {}", name, err));
                Regexp::Nothing
            },
        };
        self.desc.reservations.push(ReservationDecl {
            name: name.to_string(),
            regexp,
            used: false,
            loop_pass_num: 0,
        });
    }

    fn add_insn_reservation(
        &mut self,
        name: &str,
        latency: i64,
        condition: Option<&str>,
        expr: &str,
    ) {
        if !self.check_name(name, false) {
            return;
        }
        if latency < 0 {
            self.error(format!("negative latency {} of insn `{}`", latency, name));
            return;
        }
        let insn_num = self.desc.insns.len();
        match self.tables.insert_insn(name, insn_num) {
            Interned::Existing(_) => {
                self.error(format!("repeated declaration of insn reservation `{}`", name));
                return;
            },
            Interned::New => {},
        }
        let regexp = match Regexp::parse(expr) {
            Ok(regexp) => regexp,
            Err(err) => {
                self.error(format!("insn reservation `{}`: {}", name, err));
                Regexp::Nothing
            },
        };
        self.desc.insns.push(InsnDecl {
            name: name.to_string(),
            condition: condition.map(str::to_string),
            default_latency: latency as u64,
            insn_num,
            regexp,
            transformed_regexp: None,
            bypasses: Vec::new(),
            equiv_class_num: None,
            important_automata: Vec::new(),
        });
    }

    // Step 3: validate bypass endpoints and cross-link the bypass lists.
    fn process_bypass_decls(&mut self, decls: &[Decl]) {
        for decl in decls {
            let (latency, out_insn, in_insn, guard) = match decl {
                Decl::Bypass {
                    latency,
                    out_insn,
                    in_insn,
                    guard,
                } => (*latency, out_insn, in_insn, guard),
                _ => continue,
            };
            if latency < 0 {
                self.error(format!(
                    "negative latency {} of bypass `{}` -> `{}`",
                    latency, out_insn, in_insn
                ));
                continue;
            }
            let out_num = match self.tables.find_insn(out_insn) {
                Some(num) => num,
                None => {
                    self.error(format!(
                        "there is no insn reservation `{}` for a bypass",
                        out_insn
                    ));
                    continue;
                },
            };
            let in_num = match self.tables.find_insn(in_insn) {
                Some(num) => num,
                None => {
                    self.error(format!(
                        "there is no insn reservation `{}` for a bypass",
                        in_insn
                    ));
                    continue;
                },
            };
            let mut duplicate = false;
            for &bypass_num in &self.desc.insns[out_num].bypasses.clone() {
                let existing = &self.desc.bypasses[bypass_num];
                if existing.in_insn == in_num {
                    if existing.latency == latency as u64 {
                        self.demotable(format!(
                            "the same bypass `{}` -> `{}` is already defined",
                            out_insn, in_insn
                        ));
                    } else {
                        self.error(format!(
                            "bypass `{}` -> `{}` is already defined with different latency",
                            out_insn, in_insn
                        ));
                    }
                    duplicate = true;
                    break;
                }
            }
            if duplicate {
                continue;
            }
            let bypass_num = self.desc.bypasses.len();
            self.desc.bypasses.push(BypassDecl {
                latency: latency as u64,
                out_insn_name: out_insn.clone(),
                in_insn_name: in_insn.clone(),
                guard: guard.clone(),
                out_insn: out_num,
                in_insn: in_num,
            });
            self.desc.insns[out_num].bypasses.push(bypass_num);
        }
    }

    fn resolve_unit_list(&mut self, names: &[String], context: &str) -> Vec<usize> {
        let mut units = Vec::new();
        for name in names {
            match self.tables.find_unit_reserv(name) {
                Some(UnitReservRef::Unit(num)) => units.push(num),
                Some(UnitReservRef::Reserv(_)) => {
                    self.error(format!("`{}` in {} is not a unit", name, context));
                },
                None => {
                    self.error(format!("undeclared unit `{}` in {}", name, context));
                },
            }
        }
        units
    }

    // Step 4: symmetrize the exclusion sets.
    fn process_exclusion_decls(&mut self, decls: &[Decl]) {
        for decl in decls {
            let (first, second) = match decl {
                Decl::Exclusion { first, second } => (first, second),
                _ => continue,
            };
            let first_units = self.resolve_unit_list(first, "exclusion set");
            let second_units = self.resolve_unit_list(second, "exclusion set");
            for &a in &first_units {
                for &b in &second_units {
                    if a == b {
                        let name = self.desc.units[a].name.clone();
                        self.error(format!("unit `{}` excludes itself", name));
                        continue;
                    }
                    if self.desc.units[a].automaton_num != self.desc.units[b].automaton_num {
                        self.error(format!(
                            "units `{}` and `{}` in exclusion set belong to different automata",
                            self.desc.units[a].name, self.desc.units[b].name
                        ));
                        continue;
                    }
                    if !self.desc.units[a].excl.contains(&b) {
                        self.desc.units[a].excl.push(b);
                    }
                    if !self.desc.units[b].excl.contains(&a) {
                        self.desc.units[b].excl.push(a);
                    }
                    self.desc.units[a].in_set_p = true;
                    self.desc.units[b].in_set_p = true;
                }
            }
        }
    }

    // Step 5: resolve presence/absence targets and patterns to unit indices.
    fn process_pattern_decls(&mut self, decls: &[Decl]) {
        for decl in decls {
            let (targets, patterns, final_p, absence_p) = match decl {
                Decl::Presence {
                    targets,
                    patterns,
                    final_p,
                } => (targets, patterns, *final_p, false),
                Decl::Absence {
                    targets,
                    patterns,
                    final_p,
                } => (targets, patterns, *final_p, true),
                _ => continue,
            };
            let context = if absence_p {
                "absence set"
            } else {
                "presence set"
            };
            let target_units = self.resolve_unit_list(targets, context);
            let resolved_patterns: Vec<Vec<usize>> = patterns
                .iter()
                .map(|pattern| self.resolve_unit_list(pattern, context))
                .filter(|pattern| !pattern.is_empty())
                .collect();
            for &target in &target_units {
                self.add_patterns_to_unit(target, &resolved_patterns, final_p, absence_p);
            }
        }
    }

    fn add_patterns_to_unit(
        &mut self,
        target: usize,
        patterns: &[Vec<usize>],
        final_p: bool,
        absence_p: bool,
    ) {
        for pattern in patterns {
            for &unit in pattern {
                if self.desc.units[unit].automaton_num != self.desc.units[target].automaton_num {
                    self.error(format!(
                        "units `{}` and `{}` in presence/absence set belong to different automata",
                        self.desc.units[target].name, self.desc.units[unit].name
                    ));
                }
                if absence_p && unit == target {
                    let name = self.desc.units[target].name.clone();
                    self.error(format!("unit `{}` requires own absence", name));
                }
                self.desc.units[unit].in_set_p = true;
            }
            if pattern.len() == 1 {
                let other = pattern[0];
                if !absence_p && self.desc.units[target].excl.contains(&other) {
                    self.demotable(format!(
                        "unit `{}` excludes and requires presence of unit `{}`",
                        self.desc.units[target].name, self.desc.units[other].name
                    ));
                }
                let opposite = if absence_p {
                    let unit = &self.desc.units[target];
                    unit.presence
                        .iter()
                        .chain(unit.final_presence.iter())
                        .any(|p| p.len() == 1 && p[0] == other)
                } else {
                    let unit = &self.desc.units[target];
                    unit.absence
                        .iter()
                        .chain(unit.final_absence.iter())
                        .any(|p| p.len() == 1 && p[0] == other)
                };
                if opposite {
                    self.demotable(format!(
                        "unit `{}` requires both absence and presence of unit `{}`",
                        self.desc.units[target].name, self.desc.units[other].name
                    ));
                }
            }
            self.desc.units[target].in_set_p = true;
            let unit = &mut self.desc.units[target];
            let list = match (absence_p, final_p) {
                (false, false) => &mut unit.presence,
                (false, true) => &mut unit.final_presence,
                (true, false) => &mut unit.absence,
                (true, true) => &mut unit.final_absence,
            };
            list.push(pattern.clone());
        }
    }

    // Step 6: rewrite unit references that actually name reservations, and
    // link the remaining unit references to their declarations.
    fn link_regexps(&mut self) {
        for i in 0..self.desc.reservations.len() {
            let mut regexp =
                std::mem::replace(&mut self.desc.reservations[i].regexp, Regexp::Nothing);
            let owner = self.desc.reservations[i].name.clone();
            self.link_regexp(&mut regexp, &owner);
            self.desc.reservations[i].regexp = regexp;
        }
        for i in 0..self.desc.insns.len() {
            let mut regexp = std::mem::replace(&mut self.desc.insns[i].regexp, Regexp::Nothing);
            let owner = self.desc.insns[i].name.clone();
            self.link_regexp(&mut regexp, &owner);
            self.desc.insns[i].regexp = regexp;
        }
    }

    fn link_regexp(&mut self, regexp: &mut Regexp, owner: &str) {
        match regexp {
            Regexp::Unit { name, decl } => match self.tables.find_unit_reserv(name) {
                Some(UnitReservRef::Unit(num)) => {
                    *decl = Some(num);
                    self.desc.units[num].used = true;
                },
                Some(UnitReservRef::Reserv(num)) => {
                    self.desc.reservations[num].used = true;
                    *regexp = Regexp::Reserv {
                        name: name.clone(),
                        decl: Some(num),
                    };
                },
                None => {
                    self.error(format!(
                        "undeclared unit or reservation `{}` in reservation of `{}`",
                        name, owner
                    ));
                },
            },
            Regexp::Reserv { .. } | Regexp::Nothing => {},
            Regexp::Repeat(operand, _) => self.link_regexp(operand, owner),
            Regexp::Sequence(operands) | Regexp::Allof(operands) | Regexp::Oneof(operands) => {
                for operand in operands {
                    self.link_regexp(operand, owner);
                }
            },
        }
    }

    // Step 7: reject reservations that reach themselves. The occupancy walk
    // must not run over cyclic definitions, so the result gates step 8.
    fn check_reservation_cycles(&mut self) -> bool {
        let mut pass_num = 0usize;
        let mut cycle_free = true;
        for start in 0..self.desc.reservations.len() {
            pass_num += 1;
            let regexp = self.desc.reservations[start].regexp.clone();
            if self.regexp_reaches(&regexp, start, pass_num) {
                let name = self.desc.reservations[start].name.clone();
                self.error(format!("cycle in definition of reservation `{}`", name));
                cycle_free = false;
            }
        }
        cycle_free
    }

    fn regexp_reaches(&mut self, regexp: &Regexp, start: usize, pass_num: usize) -> bool {
        match regexp {
            Regexp::Reserv { decl: Some(num), .. } => {
                if *num == start {
                    return true;
                }
                if self.desc.reservations[*num].loop_pass_num == pass_num {
                    return false;
                }
                self.desc.reservations[*num].loop_pass_num = pass_num;
                let inner = self.desc.reservations[*num].regexp.clone();
                self.regexp_reaches(&inner, start, pass_num)
            },
            Regexp::Reserv { decl: None, .. }
            | Regexp::Unit { .. }
            | Regexp::Nothing => false,
            Regexp::Repeat(operand, _) => self.regexp_reaches(operand, start, pass_num),
            Regexp::Sequence(operands) | Regexp::Allof(operands) | Regexp::Oneof(operands) => {
                operands
                    .iter()
                    .any(|operand| self.regexp_reaches(operand, start, pass_num))
            },
        }
    }

    // Step 8: derive per-unit occupancy bounds and the global cycle count.
    fn evaluate_occupancy_cycles(&mut self) {
        let mut max_cycle = 0usize;
        let reservations = self.desc.reservations.clone();
        for i in 0..self.desc.insns.len() {
            let regexp = self.desc.insns[i].regexp.clone();
            let (max_finish, _) =
                process_regexp_cycles(&regexp, &reservations, &mut self.desc.units, 0, 0);
            if max_finish > max_cycle {
                max_cycle = max_finish;
            }
        }
        self.desc.max_insn_reserv_cycles = max_cycle + 1;
    }

    fn check_usage(&mut self) {
        for i in 0..self.desc.automata.len() {
            if !self.desc.automata[i].used {
                let name = self.desc.automata[i].name.clone();
                self.demotable(format!("automaton `{}` is not used", name));
            }
        }
        for i in 0..self.desc.units.len() {
            if !self.desc.units[i].used {
                let name = self.desc.units[i].name.clone();
                self.demotable(format!("unit `{}` is not used", name));
            }
        }
        for i in 0..self.desc.reservations.len() {
            if !self.desc.reservations[i].used {
                let name = self.desc.reservations[i].name.clone();
                self.demotable(format!("reservation `{}` is not used", name));
            }
        }
    }
}

/// Walk a linked regexp, recording at which cycles each unit can be
/// reserved. Returns the (max, min) finishing cycles of the expression when
/// started at the given cycles.
fn process_regexp_cycles(
    regexp: &Regexp,
    reservations: &[ReservationDecl],
    units: &mut [UnitDecl],
    max_start: usize,
    min_start: usize,
) -> (usize, usize) {
    match regexp {
        Regexp::Unit { decl: Some(num), .. } => {
            let unit = &mut units[*num];
            if unit.max_occ_cycle_num < max_start {
                unit.max_occ_cycle_num = max_start;
            }
            match unit.min_occ_cycle_num {
                Some(min) if min <= min_start => {},
                _ => unit.min_occ_cycle_num = Some(min_start),
            }
            (max_start, min_start)
        },
        Regexp::Unit { decl: None, .. } | Regexp::Nothing => (max_start, min_start),
        Regexp::Reserv { decl: Some(num), .. } => {
            let inner = reservations[*num].regexp.clone();
            process_regexp_cycles(&inner, reservations, units, max_start, min_start)
        },
        Regexp::Reserv { decl: None, .. } => (max_start, min_start),
        Regexp::Sequence(operands) => {
            let mut max_cycle = max_start;
            let mut min_cycle = min_start;
            for (i, operand) in operands.iter().enumerate() {
                let (next_max, next_min) = if i == 0 {
                    (max_cycle, min_cycle)
                } else {
                    (max_cycle + 1, min_cycle + 1)
                };
                let (max_finish, min_finish) =
                    process_regexp_cycles(operand, reservations, units, next_max, next_min);
                max_cycle = max_finish;
                min_cycle = min_finish;
            }
            (max_cycle, min_cycle)
        },
        Regexp::Repeat(operand, count) => {
            let mut max_cycle = max_start;
            let mut min_cycle = min_start;
            for i in 0..*count {
                let (next_max, next_min) = if i == 0 {
                    (max_cycle, min_cycle)
                } else {
                    (max_cycle + 1, min_cycle + 1)
                };
                let (max_finish, min_finish) =
                    process_regexp_cycles(operand, reservations, units, next_max, next_min);
                max_cycle = max_finish;
                min_cycle = min_finish;
            }
            (max_cycle, min_cycle)
        },
        Regexp::Allof(operands) => {
            let mut max_finish = max_start;
            let mut min_finish = min_start;
            for operand in operands {
                let (op_max, op_min) =
                    process_regexp_cycles(operand, reservations, units, max_start, min_start);
                max_finish = max_finish.max(op_max);
                min_finish = min_finish.max(op_min);
            }
            (max_finish, min_finish)
        },
        Regexp::Oneof(operands) => {
            let mut max_finish = max_start;
            let mut min_finish = usize::MAX;
            for operand in operands {
                let (op_max, op_min) =
                    process_regexp_cycles(operand, reservations, units, max_start, min_start);
                max_finish = max_finish.max(op_max);
                min_finish = min_finish.min(op_min);
            }
            if min_finish == usize::MAX {
                min_finish = min_start;
            }
            (max_finish, min_finish)
        },
    }
}
