use mdint_core::IntegratorError;
use mdint_integrators::{SplittingScheme, StepKind};
use proptest::prelude::*;

fn code_of(err: IntegratorError) -> String {
    match err {
        IntegratorError::InvalidScheme(info) => info.code,
        other => panic!("unexpected error family: {other}"),
    }
}

#[test]
fn baoab_parses_in_order() {
    let scheme = SplittingScheme::parse("BAOAB").unwrap();
    assert_eq!(
        scheme.steps(),
        &[
            StepKind::Kick,
            StepKind::Drift,
            StepKind::Stochastic,
            StepKind::Drift,
            StepKind::Kick
        ]
    );
    assert_eq!(scheme, SplittingScheme::baoab());
    assert_eq!(scheme.to_string(), "BAOAB");
}

#[test]
fn lowercase_is_accepted() {
    let scheme: SplittingScheme = "baoab".parse().unwrap();
    assert_eq!(scheme.to_string(), "BAOAB");
}

#[test]
fn order_is_significant() {
    let abo = SplittingScheme::parse("ABO").unwrap();
    let oba = SplittingScheme::parse("OBA").unwrap();
    assert_ne!(abo, oba);
    assert_eq!(abo.count(StepKind::Drift), oba.count(StepKind::Drift));
}

#[test]
fn rejections_carry_codes() {
    assert_eq!(code_of(SplittingScheme::parse("BAXAB").unwrap_err()), "unknown-symbol");
    assert_eq!(code_of(SplittingScheme::parse("BAB").unwrap_err()), "missing-symbol");
    assert_eq!(code_of(SplittingScheme::parse("AO").unwrap_err()), "missing-symbol");
    assert_eq!(code_of(SplittingScheme::parse("").unwrap_err()), "missing-symbol");
    assert_eq!(
        code_of(SplittingScheme::parse("OBAOB").unwrap_err()),
        "repeated-stochastic"
    );
}

#[test]
fn unknown_symbol_reports_position() {
    let err = SplittingScheme::parse("BA OAB").unwrap_err();
    let info = err.info();
    assert_eq!(info.context.get("position").map(String::as_str), Some("2"));
    assert_eq!(info.context.get("symbol").map(String::as_str), Some(" "));
}

#[test]
fn scheme_serializes_as_string() {
    let scheme = SplittingScheme::parse("BAOAB").unwrap();
    let json = serde_json::to_string(&scheme).unwrap();
    assert_eq!(json, "\"BAOAB\"");
    let back: SplittingScheme = serde_json::from_str("\"obaab\"").unwrap();
    assert_eq!(back.to_string(), "OBAAB");
    assert!(serde_json::from_str::<SplittingScheme>("\"BAB\"").is_err());
}

proptest! {
    #[test]
    fn parse_succeeds_exactly_for_valid_strings(text in "[abcoABCO]{0,10}") {
        let upper = text.to_ascii_uppercase();
        let valid = upper.chars().all(|c| matches!(c, 'A' | 'B' | 'O'))
            && upper.contains('A')
            && upper.contains('B')
            && upper.matches('O').count() == 1;
        let parsed = SplittingScheme::parse(&text);
        prop_assert_eq!(parsed.is_ok(), valid);
        if let Ok(scheme) = parsed {
            prop_assert_eq!(scheme.to_string(), upper);
            prop_assert_eq!(scheme.len(), text.len());
        }
    }
}
