use pipegen_rust::{generate, parse_description, Generation, GeneratorConfig};

fn run(text: &str, config: GeneratorConfig) -> Generation {
    let decls = parse_description(text).expect("front end should accept the text");
    generate(&decls, &config.with_progress(false)).expect("generation should succeed")
}

#[test]
fn two_unit_pipeline_issues_independently() {
    let text = "
        unit alu, mul
        insn add 1 = alu
        insn imul 3 = mul
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    assert_eq!(dfa.state_size(), 1);

    let mut state = dfa.new_state();
    assert_eq!(dfa.min_issue_delay(&state, 0), 0);
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
    // Both units are free again after one cycle.
    dfa.advance_cycle(&mut state);
    assert_eq!(state, dfa.new_state());
    assert_eq!(dfa.insn_latency(0, 1), 1);
    assert_eq!(dfa.insn_latency(1, 0), 3);
}

#[test]
fn same_unit_conflicts_within_a_cycle() {
    let text = "
        unit alu
        insn add 1 = alu
        insn sub 1 = alu
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let mut state = dfa.new_state();
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
    // The second reservation of alu has to wait one cycle.
    let delay = dfa.state_transition(&mut state, 1);
    assert_eq!(delay, 1);
    dfa.advance_cycle(&mut state);
    assert_eq!(dfa.state_transition(&mut state, 1), -1);
}

#[test]
fn exclusion_forces_serialization() {
    let text = "
        unit u1, u2
        exclusion u1 : u2
        insn ia 1 = u1
        insn ib 1 = u2
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let mut state = dfa.new_state();
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
    // u2 is excluded while u1 is reserved on the same cycle.
    assert_eq!(dfa.min_issue_delay(&state, 1), 1);
    assert!(dfa.state_transition(&mut state, 1) >= 0);
    assert!(dfa.state_dead_lock_p(&state));
    dfa.advance_cycle(&mut state);
    assert_eq!(dfa.state_transition(&mut state, 1), -1);
}

#[test]
fn ndfa_counts_both_alternatives() {
    let text = "
        unit u
        insn i 1 = u | u, u
    ";
    let generation = run(text, GeneratorConfig::new().with_ndfa(true));
    let dfa = &generation.dfa;
    let state = dfa.new_state();
    assert_eq!(dfa.state_alts(&state, 0), 2);
}

#[test]
fn deterministic_mode_picks_the_first_alternative() {
    let text = "
        unit u
        insn i 1 = u | u, u
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let mut state = dfa.new_state();
    assert_eq!(dfa.state_alts(&state, 0), 1);
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
    // The first alternative occupies u for a single cycle.
    dfa.advance_cycle(&mut state);
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
}

#[test]
fn presence_pattern_gates_the_transition() {
    let text = "
        unit a, b, c
        presence a : b c
        insn ia 1 = a
        insn iabc 1 = a + b + c
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let mut state = dfa.new_state();
    // A lone reservation of a violates the presence pattern.
    assert!(dfa.state_transition(&mut state, 0) >= 0);
    assert_eq!(state, dfa.new_state());
    assert_eq!(dfa.state_transition(&mut state, 1), -1);
}

#[test]
fn absence_pattern_rejects_co_reservation() {
    let text = "
        unit a, b
        absence a : b
        insn iab 1 = a + b
        insn ia 1 = a
        insn ib 1 = b
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let mut state = dfa.new_state();
    // a and b together violate a's absence pattern.
    assert!(dfa.state_transition(&mut state, 0) >= 0);
    assert_eq!(dfa.state_transition(&mut state, 1), -1);
    // Adding b into the same cycle is likewise rejected.
    assert!(dfa.state_transition(&mut state, 2) >= 0);
}

#[test]
fn bypass_overrides_default_latency() {
    let text = "
        unit fu
        insn prod 4 = fu
        insn cons 1 = fu
        insn other 1 = fu
        bypass 1 prod cons
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    assert_eq!(dfa.insn_latency(0, 1), 1);
    assert_eq!(dfa.insn_latency(0, 2), 4);
    assert_eq!(dfa.insn_latency(1, 0), 1);
}

#[test]
fn multi_cycle_reservation_blocks_following_issues() {
    let text = "
        unit mem
        insn load 2 = mem, mem
        insn store 1 = mem
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let mut state = dfa.new_state();
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
    // mem is busy for two cycles; a store must wait both out.
    assert_eq!(dfa.min_issue_delay(&state, 1), 2);
    dfa.advance_cycle(&mut state);
    assert_eq!(dfa.min_issue_delay(&state, 1), 1);
    dfa.advance_cycle(&mut state);
    assert_eq!(dfa.state_transition(&mut state, 1), -1);
}

#[test]
fn declared_automata_split_the_state_space() {
    let text = "
        automaton pipe_a, pipe_b
        unit alu : pipe_a
        unit mul : pipe_b
        insn add 1 = alu
        insn imul 3 = mul
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    assert_eq!(dfa.state_size(), 2);
    let mut state = dfa.new_state();
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
    assert_eq!(dfa.state_transition(&mut state, 1), -1);
}

#[test]
fn min_insn_conflict_delay_measures_unit_pressure() {
    let text = "
        unit mem
        insn load 2 = mem, mem
        insn store 1 = mem
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    assert_eq!(dfa.min_insn_conflict_delay(0, 1), 2);
    assert_eq!(dfa.min_insn_conflict_delay(1, 0), 1);
}

#[test]
fn query_units_survive_minimization() {
    let text = "
        unit alu
        query_unit port
        insn add 1 = alu + port
        insn nopish 1 = alu
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let code = dfa.get_cpu_unit_code("port").expect("port is a query unit");
    let mut state = dfa.new_state();
    assert!(!dfa.cpu_unit_reservation_p(&state, code));
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
    assert!(dfa.cpu_unit_reservation_p(&state, code));
    assert!(dfa.get_cpu_unit_code("alu").is_none());
}

#[test]
fn minimization_preserves_the_accepted_language() {
    let text = "
        unit u1, u2
        exclusion u1 : u2
        insn ia 1 = u1
        insn ib 1 = u2
        insn both 1 = u1, u2
    ";
    let minimized = run(text, GeneratorConfig::new());
    let plain = run(text, GeneratorConfig::new().with_no_minimization(true));

    // Drive both recognizers through every instruction sequence of length
    // three (with advance-cycle as a fourth symbol) and compare outcomes.
    let advance = minimized.dfa.generated().advance_cycle_code as usize;
    let symbols = [0usize, 1, 2, advance];
    for &a in &symbols {
        for &b in &symbols {
            for &c in &symbols {
                let mut s1 = minimized.dfa.new_state();
                let mut s2 = plain.dfa.new_state();
                for &insn in &[a, b, c] {
                    let r1 = minimized.dfa.state_transition(&mut s1, insn);
                    let r2 = plain.dfa.state_transition(&mut s2, insn);
                    assert_eq!(r1 < 0, r2 < 0, "sequence {:?} diverged", (a, b, c));
                }
            }
        }
    }
    let min_states = minimized.stats.automata[0].minimal_states;
    let full_states = plain.stats.automata[0].minimal_states;
    assert!(min_states <= full_states);
}

#[test]
fn deterministic_recognizers_have_unique_arcs_per_class() {
    // After subset construction there is at most one transition per
    // (state, class) pair, so the transition table is well defined.
    let text = "
        unit u, v
        insn i 1 = u | v | u, v
        insn j 1 = v
    ";
    let generation = run(text, GeneratorConfig::new().with_ndfa(true));
    let tables = &generation.dfa.generated().automata[0];
    for state in 0..tables.states_num {
        for class in 0..tables.insn_equiv_classes_num {
            let target = tables.transition.get(state as usize, class as usize);
            assert!(target <= tables.states_num);
        }
    }
}

#[test]
fn heuristic_partition_builds_requested_automata() {
    let text = "
        unit a, b
        insn i1 1 = a, a
        insn i2 1 = b, b
    ";
    let generation = run(text, GeneratorConfig::new().with_automata_count(2));
    assert_eq!(generation.dfa.state_size(), 2);
    let dfa = &generation.dfa;
    let mut state = dfa.new_state();
    assert_eq!(dfa.state_transition(&mut state, 0), -1);
    assert_eq!(dfa.state_transition(&mut state, 1), -1);
}
