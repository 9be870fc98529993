use pipegen_rust::tables::comb::StateClassTable;
use pipegen_rust::{generate, parse_description, Generation, GeneratorConfig};

fn run(text: &str, config: GeneratorConfig) -> Generation {
    let decls = parse_description(text).expect("front end should accept the text");
    generate(&decls, &config.with_progress(false)).expect("generation should succeed")
}

#[test]
fn comb_lookup_equals_full_matrix() {
    // A sparse matrix with one non-default entry per row compresses well;
    // every lookup must still match the uncompressed value.
    let rows = 16;
    let cols = 8;
    let default = 999u32;
    let mut matrix = vec![default; rows * cols];
    for row in 0..rows {
        matrix[row * cols + row % cols] = row as u32;
    }
    let table = StateClassTable::build(matrix.clone(), rows, cols, default);
    assert!(table.is_comb(), "sparse matrix should choose the comb encoding");
    for row in 0..rows {
        for col in 0..cols {
            assert_eq!(table.get(row, col), matrix[row * cols + col]);
        }
    }
}

#[test]
fn dense_matrices_stay_uncompressed() {
    let rows = 4;
    let cols = 4;
    let matrix: Vec<u32> = (0..rows * cols).map(|i| i as u32).collect();
    let table = StateClassTable::build(matrix.clone(), rows, cols, u32::MAX);
    assert!(!table.is_comb(), "dense matrix should keep the full encoding");
    for row in 0..rows {
        for col in 0..cols {
            assert_eq!(table.get(row, col), matrix[row * cols + col]);
        }
    }
}

#[test]
fn out_of_range_lookups_return_the_default() {
    let table = StateClassTable::build(vec![1, 2, 3, 4], 2, 2, 77);
    assert_eq!(table.get(5, 0), 77);
    assert_eq!(table.get(0, 5), 77);
}

#[test]
fn translate_table_covers_the_advance_cycle_code() {
    let text = "
        unit alu, mul
        insn add 1 = alu
        insn imul 3 = mul
    ";
    let generation = run(text, GeneratorConfig::new());
    let tables = &generation.dfa.generated().automata[0];
    // Two instructions plus the advance-cycle pseudo-instruction.
    assert_eq!(tables.translate.len(), 3);
    let advance = generation.dfa.generated().advance_cycle_code as usize;
    assert_eq!(advance, 2);
    assert!(tables.translate[advance] < tables.insn_equiv_classes_num);
    // Out-of-range instruction codes map to the out-of-range class.
    assert_eq!(tables.class_of(100), tables.insn_equiv_classes_num as usize);
}

#[test]
fn equivalent_insns_share_a_class() {
    let text = "
        unit alu
        insn add 1 = alu
        insn sub 1 = alu
        insn wide 1 = alu, alu
    ";
    let generation = run(text, GeneratorConfig::new());
    let tables = &generation.dfa.generated().automata[0];
    // add and sub are indistinguishable; wide reserves an extra cycle.
    assert_eq!(tables.translate[0], tables.translate[1]);
    assert_ne!(tables.translate[0], tables.translate[2]);
}

#[test]
fn transition_and_alts_tables_agree_with_queries() {
    let text = "
        unit u1, u2
        exclusion u1 : u2
        insn ia 1 = u1
        insn ib 1 = u2
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let tables = &dfa.generated().automata[0];
    let start = tables.start_state as usize;
    let class_a = tables.class_of(0);
    let target = tables.transition.get(start, class_a);
    assert!(target < tables.states_num);
    assert_eq!(tables.state_alts.get(start, class_a), 1);
    // From the post-issue state the excluded instruction has no entry.
    let class_b = tables.class_of(1);
    assert_eq!(
        tables.transition.get(target as usize, class_b),
        tables.states_num
    );
    assert_eq!(tables.state_alts.get(target as usize, class_b), 0);
    assert_eq!(tables.min_issue_delay.get(target as usize, class_b), 1);
}

#[test]
fn deadlock_vector_marks_clock_only_states() {
    let text = "
        unit u1, u2
        exclusion u1 : u2
        insn ia 1 = u1
        insn ib 1 = u2
    ";
    let generation = run(text, GeneratorConfig::new());
    let tables = &generation.dfa.generated().automata[0];
    let start = tables.start_state as usize;
    assert_eq!(tables.dead_lock[start], 0);
    let locked: usize = tables.dead_lock.iter().map(|&b| b as usize).sum();
    assert_eq!(locked, generation.stats.automata[0].locked_states);
    assert!(locked >= 1, "the post-issue states are clock-only");
}

#[test]
fn reserved_units_table_tracks_cycle_zero() {
    let text = "
        query_unit p0, p1
        insn i0 1 = p0
        insn i1 1 = p1
        insn i01 1 = p0 + p1
    ";
    let generation = run(text, GeneratorConfig::new());
    let dfa = &generation.dfa;
    let tables = &dfa.generated().automata[0];
    let reserved = tables.reserved_units.as_ref().expect("query units exist");
    assert_eq!(reserved.bytes_per_state, 1);
    let mut state = dfa.new_state();
    assert_eq!(dfa.state_transition(&mut state, 2), -1);
    let p0 = dfa.get_cpu_unit_code("p0").unwrap();
    let p1 = dfa.get_cpu_unit_code("p1").unwrap();
    assert!(dfa.cpu_unit_reservation_p(&state, p0));
    assert!(dfa.cpu_unit_reservation_p(&state, p1));
    dfa.advance_cycle(&mut state);
    assert!(!dfa.cpu_unit_reservation_p(&state, p0));
}

#[test]
fn min_delay_table_packs_to_the_smallest_width() {
    let text = "
        unit mem
        insn load 2 = mem, mem
        insn store 1 = mem
    ";
    let generation = run(text, GeneratorConfig::new());
    let tables = &generation.dfa.generated().automata[0];
    // The longest wait in this machine is two cycles, which fits two bits.
    assert_eq!(tables.min_issue_delay.max_value, 2);
    assert_eq!(tables.min_issue_delay.bits_per_entry, 2);
}

#[test]
fn global_constants_cover_latencies_and_reservations() {
    let text = "
        unit fu
        insn prod 9 = fu
        insn cons 1 = fu
        bypass 3 prod cons
    ";
    let generation = run(text, GeneratorConfig::new());
    let generated = generation.dfa.generated();
    // Smallest 2^k - 1 covering max(9, 3, 1 cycle) is 15.
    assert_eq!(generated.max_insn_queue_index, 15);
    assert_eq!(generated.advance_cycle_code, 2);
    assert!(generated.max_issue_rate >= 1);
}

#[test]
fn issue_rate_counts_parallel_issues() {
    let text = "
        unit a, b, c
        insn ia 1 = a
        insn ib 1 = b
        insn ic 1 = c
    ";
    let generation = run(text, GeneratorConfig::new());
    // Three independent units allow three issues in one cycle.
    assert_eq!(generation.dfa.generated().max_issue_rate, 3);
}

#[test]
fn generated_tables_serialize_to_json() {
    let text = "
        unit alu
        insn add 1 = alu
    ";
    let generation = run(text, GeneratorConfig::new());
    let json = serde_json::to_string(generation.dfa.generated()).unwrap();
    assert!(json.contains("\"advance_cycle_code\""));
    assert!(json.contains("\"add\""));
}
