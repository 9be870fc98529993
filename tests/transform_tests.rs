use pipegen_rust::description::checker;
use pipegen_rust::description::regexp::Regexp;
use pipegen_rust::description::transform::{
    alternative_cycles, canonical_p, check_unit_distribution, cycle_units, regexp_alternatives,
    transform_insn_regexps, transform_regexp,
};
use pipegen_rust::automaton::partition::units_to_automata;
use pipegen_rust::{parse_description, GeneratorConfig};

fn canonicalize(text: &str) -> Regexp {
    transform_regexp(Regexp::parse(text).unwrap())
}

#[test]
fn repeat_unrolls_into_sequences() {
    let regexp = canonicalize("u * 3");
    assert!(canonical_p(&regexp));
    let alternatives = regexp_alternatives(&regexp);
    assert_eq!(alternatives.len(), 1);
    assert_eq!(alternative_cycles(alternatives[0]).len(), 3);
}

#[test]
fn nested_operators_flatten() {
    let regexp = canonicalize("(a, (b, c)), d");
    assert!(canonical_p(&regexp));
    let alternatives = regexp_alternatives(&regexp);
    assert_eq!(alternative_cycles(alternatives[0]).len(), 4);
}

#[test]
fn alternation_lifts_to_the_top() {
    // Two binary choices multiply out to four alternatives.
    let regexp = canonicalize("(a | b), (c | d)");
    assert!(canonical_p(&regexp));
    assert_eq!(regexp_alternatives(&regexp).len(), 4);
}

#[test]
fn alternation_lifts_out_of_allof() {
    let regexp = canonicalize("a + (b | c)");
    assert!(canonical_p(&regexp));
    assert_eq!(regexp_alternatives(&regexp).len(), 2);
}

#[test]
fn allof_of_sequences_transposes() {
    let regexp = canonicalize("(a, b) + (c, d)");
    assert!(canonical_p(&regexp));
    let alternatives = regexp_alternatives(&regexp);
    assert_eq!(alternatives.len(), 1);
    let cycles = alternative_cycles(alternatives[0]);
    assert_eq!(cycles.len(), 2);
    // Cycle 0 holds a and c, cycle 1 holds b and d.
    match cycles[0] {
        Regexp::Allof(operands) => assert_eq!(operands.len(), 2),
        other => panic!("expected allof on cycle 0, got {:?}", other),
    }
}

#[test]
fn scalars_join_the_first_cycle_of_a_transposed_allof() {
    let regexp = canonicalize("(a, b) + c");
    assert!(canonical_p(&regexp));
    let alternatives = regexp_alternatives(&regexp);
    let cycles = alternative_cycles(alternatives[0]);
    assert_eq!(cycles.len(), 2);
    match cycles[0] {
        Regexp::Allof(operands) => assert_eq!(operands.len(), 2),
        other => panic!("expected allof on cycle 0, got {:?}", other),
    }
    assert!(matches!(cycles[1], Regexp::Unit { .. }));
}

#[test]
fn transformation_reaches_a_fixed_point() {
    let gnarly = "((a | b) * 2, (c + (d | e))) | nothing";
    let once = canonicalize(gnarly);
    assert!(canonical_p(&once));
    let twice = transform_regexp(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn named_reservations_are_erased() {
    let text = "
        unit u, v
        reservation pair = u, v
        insn i 1 = pair, pair
    ";
    let decls = parse_description(text).unwrap();
    let (mut desc, _) = checker::check(&decls, &GeneratorConfig::new()).unwrap();
    transform_insn_regexps(&mut desc);
    let transformed = desc.insns[0].transformed_regexp.as_ref().unwrap();
    assert!(canonical_p(transformed));
    let alternatives = regexp_alternatives(transformed);
    let cycles = alternative_cycles(alternatives[0]);
    assert_eq!(cycles.len(), 4);
    assert_eq!(cycle_units(cycles[0]), vec![0]);
    assert_eq!(cycle_units(cycles[1]), vec![1]);
}

#[test]
fn distribution_check_flags_lopsided_alternatives() {
    let text = "
        automaton p0, p1
        unit a : p0
        unit b : p1
        unit c : p0
        insn i 1 = a + b | c
    ";
    let decls = parse_description(text).unwrap();
    let (mut desc, _) = checker::check(&decls, &GeneratorConfig::new()).unwrap();
    transform_insn_regexps(&mut desc);
    units_to_automata(&mut desc, &GeneratorConfig::new());
    let warnings = check_unit_distribution(&desc);
    assert!(
        warnings.iter().any(|w| w.message.contains("p1")),
        "expected a distribution warning about p1, got {:?}",
        warnings
    );
}

#[test]
fn distribution_check_accepts_balanced_alternatives() {
    let text = "
        automaton p0, p1
        unit a : p0
        unit b : p1
        unit c : p0
        insn i 1 = a + b | c + b
    ";
    let decls = parse_description(text).unwrap();
    let (mut desc, _) = checker::check(&decls, &GeneratorConfig::new()).unwrap();
    transform_insn_regexps(&mut desc);
    units_to_automata(&mut desc, &GeneratorConfig::new());
    assert!(check_unit_distribution(&desc).is_empty());
}
