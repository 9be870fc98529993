use pipegen_rust::description::checker;
use pipegen_rust::{parse_description, GeneratorConfig};

fn check_text(text: &str, config: &GeneratorConfig) -> Result<usize, Vec<String>> {
    let decls = parse_description(text).expect("front end should accept the text");
    match checker::check(&decls, config) {
        Ok((desc, warnings)) => {
            assert!(warnings.iter().all(|d| !d.is_error()));
            Ok(desc.insns_num())
        },
        Err(diags) => Err(diags.iter().map(|d| d.to_string()).collect()),
    }
}

#[test]
fn accepts_a_small_valid_description() {
    let text = "
        unit alu, mul
        insn add 1 = alu
        insn imul 3 = mul
    ";
    assert_eq!(check_text(text, &GeneratorConfig::new()), Ok(2));
}

#[test]
fn rejects_reservation_cycles() {
    // r and s reference each other.
    let text = "
        unit u
        reservation r = s
        reservation s = r
        insn i 1 = r
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(
        errors.iter().any(|e| e.contains("cycle in definition")),
        "missing cycle diagnostic: {:?}",
        errors
    );
}

#[test]
fn accepts_acyclic_reservation_chains() {
    let text = "
        unit u, v
        reservation inner = u, v
        reservation outer = inner, u
        insn i 1 = outer
    ";
    assert!(check_text(text, &GeneratorConfig::new()).is_ok());
}

#[test]
fn rejects_nothing_as_declaration_name() {
    let text = "
        unit nothing
        insn i 1 = nothing
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("`nothing`")));
}

#[test]
fn rejects_undeclared_names_in_reservations() {
    let text = "
        unit alu
        insn add 1 = missing_unit
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("undeclared unit or reservation")));
}

#[test]
fn rejects_negative_latency() {
    let text = "
        unit alu
        insn add -1 = alu
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("negative latency")));
}

#[test]
fn rejects_repeated_unit_declaration() {
    let text = "
        unit alu
        unit alu
        insn add 1 = alu
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("repeated declaration")));
}

#[test]
fn repeated_automaton_demotes_with_warnings_option() {
    let text = "
        automaton pipe
        automaton pipe
        unit alu : pipe
        insn add 1 = alu
    ";
    assert!(check_text(text, &GeneratorConfig::new()).is_err());
    assert!(check_text(text, &GeneratorConfig::new().with_warnings(true)).is_ok());
}

#[test]
fn rejects_self_exclusion() {
    let text = "
        unit u1, u2
        exclusion u1 : u1 u2
        insn i 1 = u1
        insn j 1 = u2
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("excludes itself")));
}

#[test]
fn rejects_cross_automaton_exclusion() {
    let text = "
        automaton p0, p1
        unit a : p0
        unit b : p1
        exclusion a : b
        insn i 1 = a
        insn j 1 = b
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("different automata")));
}

#[test]
fn rejects_self_absence() {
    let text = "
        unit a, b
        absence a : a b
        insn i 1 = a
        insn j 1 = b
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("requires own absence")));
}

#[test]
fn exclusion_plus_presence_is_demotable() {
    let text = "
        unit a, b
        exclusion a : b
        presence a : b
        insn i 1 = a
        insn j 1 = b
    ";
    assert!(check_text(text, &GeneratorConfig::new()).is_err());
    assert!(check_text(text, &GeneratorConfig::new().with_warnings(true)).is_ok());
}

#[test]
fn duplicate_bypass_same_latency_is_demotable() {
    let text = "
        unit fu
        insn prod 4 = fu
        insn cons 1 = fu
        bypass 2 prod cons
        bypass 2 prod cons
    ";
    assert!(check_text(text, &GeneratorConfig::new()).is_err());
    assert!(check_text(text, &GeneratorConfig::new().with_warnings(true)).is_ok());
}

#[test]
fn duplicate_bypass_with_different_latency_is_fatal() {
    let text = "
        unit fu
        insn prod 4 = fu
        insn cons 1 = fu
        bypass 2 prod cons
        bypass 3 prod cons
    ";
    // Not demotable: conflicting latencies stay an error even with -w.
    assert!(check_text(text, &GeneratorConfig::new().with_warnings(true)).is_err());
}

#[test]
fn rejects_bypass_to_unknown_insn() {
    let text = "
        unit fu
        insn prod 4 = fu
        bypass 2 prod missing
    ";
    let errors = check_text(text, &GeneratorConfig::new()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("no insn reservation")));
}

#[test]
fn unused_unit_warns_only_with_warnings_option() {
    let text = "
        unit alu, idle
        insn add 1 = alu
    ";
    assert!(check_text(text, &GeneratorConfig::new()).is_err());
    assert!(check_text(text, &GeneratorConfig::new().with_warnings(true)).is_ok());
}

#[test]
fn rejects_quoted_names() {
    let decls = vec![pipegen_rust::description::decls::Decl::Unit {
        names: vec!["bad\"name".to_string()],
        automaton: None,
        query: false,
    }];
    let result = checker::check(&decls, &GeneratorConfig::new());
    assert!(result.is_err());
}

#[test]
fn computes_occupancy_bounds() {
    let text = "
        unit fetch, mem
        insn load 2 = fetch, nothing, mem * 2
    ";
    let decls = parse_description(text).unwrap();
    let (desc, _) = checker::check(&decls, &GeneratorConfig::new()).unwrap();
    // fetch occupies cycle 0; mem occupies cycles 2 and 3.
    assert_eq!(desc.units[0].min_occ_cycle_num, Some(0));
    assert_eq!(desc.units[0].max_occ_cycle_num, 0);
    assert_eq!(desc.units[1].min_occ_cycle_num, Some(2));
    assert_eq!(desc.units[1].max_occ_cycle_num, 3);
    assert_eq!(desc.max_insn_reserv_cycles, 4);
}
