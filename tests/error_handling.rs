use pipegen_rust::description::regexp::Regexp;
use pipegen_rust::errors::GeneratorError;
use pipegen_rust::{generate, parse_description, GeneratorConfig};

#[test]
fn unknown_options_are_rejected() {
    let result = GeneratorConfig::new().parse_options(&["-bogus"]);
    match result {
        Err(GeneratorError::InvalidOption(name)) => assert_eq!(name, "-bogus"),
        other => panic!("expected invalid option error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn split_option_is_recognized_but_unimplemented() {
    let result = GeneratorConfig::new().parse_options(&["-split"]);
    match result {
        Err(GeneratorError::UnimplementedOption(name)) => assert_eq!(name, "-split"),
        other => panic!("expected unimplemented option error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn known_options_all_parse() {
    let config = GeneratorConfig::new()
        .parse_options(&["-ndfa", "no-minimization", "time", "-v", "w"])
        .unwrap();
    assert!(config.ndfa);
    assert!(config.no_minimization);
    assert!(config.time);
    assert!(config.verbose_report);
    assert!(config.warnings);
}

#[test]
fn empty_reservation_strings_are_rejected() {
    assert!(Regexp::parse("").is_err());
    assert!(Regexp::parse("   ").is_err());
}

#[test]
fn malformed_reservation_strings_are_rejected() {
    for text in ["a,", "(a", "a)", "a * x", "a *", "| a", "a + + b"] {
        assert!(Regexp::parse(text).is_err(), "`{}` should not parse", text);
    }
}

#[test]
fn repetition_below_two_is_rejected() {
    assert!(Regexp::parse("a * 0").is_err());
    assert!(Regexp::parse("a * 1").is_err());
    assert!(Regexp::parse("a * 2").is_ok());
}

#[test]
fn unparseable_insn_reservation_is_a_checker_error() {
    let text = "
        unit alu
        insn add 1 = (alu
    ";
    let decls = parse_description(text).unwrap();
    let failure = generate(&decls, &GeneratorConfig::new().with_progress(false)).unwrap_err();
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| d.is_error() && d.message.contains("add")));
}

#[test]
fn front_end_reports_line_numbers() {
    let text = "unit alu\nbroken declaration here\n";
    match parse_description(text) {
        Err(GeneratorError::ParseError { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn front_end_rejects_malformed_bypass() {
    assert!(parse_description("bypass 1 prod\n").is_err());
    assert!(parse_description("bypass x prod cons\n").is_err());
}

#[test]
fn failure_stops_before_any_output() {
    let text = "
        unit alu
        insn add 1 = missing
    ";
    let decls = parse_description(text).unwrap();
    let config = GeneratorConfig::new()
        .with_verbose_report(true)
        .with_progress(false);
    let failure = generate(&decls, &config).unwrap_err();
    match failure.error {
        GeneratorError::CheckFailed { errors } => assert!(errors >= 1),
        other => panic!("expected check failure, got {}", other),
    }
}

#[test]
fn error_messages_name_the_faulty_declaration() {
    let text = "
        unit alu
        insn add 1 = alu
        bypass 2 add missing
    ";
    let decls = parse_description(text).unwrap();
    let failure = generate(&decls, &GeneratorConfig::new().with_progress(false)).unwrap_err();
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| d.message.contains("missing")));
}
