//! End-to-end integration tests for tutor-viz.
//!
//! These tests exercise the public pipeline from problem text through
//! classification, extraction, building and validation, checking the
//! properties every rendered diagram relies on.

use serde_json::json;

use tutor_viz::analysis::{QuestionAnalysis, Subject};
use tutor_viz::builders;
use tutor_viz::classify::{self, DiagramKind};
use tutor_viz::config::TutorConfig;
use tutor_viz::diagram::{DiagramData, DiagramState};
use tutor_viz::division::{StepKind, simulate};
use tutor_viz::extract::{DivisionOperands, extract_division_numbers};
use tutor_viz::pipeline::DiagramEngine;
use tutor_viz::validate;

fn engine() -> DiagramEngine {
    DiagramEngine::default()
}

fn final_calculation(state: &DiagramState) -> &str {
    state
        .final_step()
        .and_then(|s| s.show_calculation.as_deref())
        .unwrap_or_default()
}

// ── Long division ───────────────────────────────────────────────────────

#[test]
fn simulator_matches_integer_division() {
    for dividend in (0..2_000).step_by(7) {
        for divisor in 1..=13 {
            let trace = simulate(dividend, divisor).unwrap();
            assert_eq!(trace.quotient, dividend / divisor, "{dividend} ÷ {divisor}");
            assert_eq!(trace.remainder, dividend % divisor, "{dividend} ÷ {divisor}");
            assert_eq!(trace.quotient_from_steps(), trace.quotient);
            assert_eq!(trace.remainder_from_steps(), Some(trace.remainder));
        }
    }
}

#[test]
fn simulator_is_deterministic() {
    assert_eq!(simulate(98_765, 43).unwrap(), simulate(98_765, 43).unwrap());
}

#[test]
fn leading_zero_quotient_digit() {
    let trace = simulate(7248, 8).unwrap();
    let first_divide = trace
        .steps
        .iter()
        .find(|s| s.kind == StepKind::Divide)
        .unwrap();
    assert_eq!(first_divide.position, 0);
    assert_eq!(first_divide.quotient_digit, Some(0));
    assert_eq!(trace.quotient_digits(), vec![0, 9, 0, 6]);
    assert_eq!((trace.quotient, trace.remainder), (906, 0));
}

#[test]
fn divisor_larger_than_dividend_terminates() {
    let trace = simulate(5, 12).unwrap();
    assert_eq!((trace.quotient, trace.remainder), (0, 5));
    assert_eq!(trace.steps.last().map(|s| s.kind), Some(StepKind::Remainder));
    assert!(simulate(12, 0).is_err());
}

#[test]
fn extraction_puts_larger_value_first() {
    let expected = Some(DivisionOperands {
        dividend: 7248,
        divisor: 8,
    });
    assert_eq!(extract_division_numbers("7,248 ÷ 8"), expected);
    assert_eq!(extract_division_numbers("7,248 crayons among 8 boxes"), expected);
    assert_eq!(
        extract_division_numbers("divide 456 by 12"),
        Some(DivisionOperands {
            dividend: 456,
            divisor: 12
        })
    );
}

#[test]
fn crayon_problem_end_to_end() {
    let question = QuestionAnalysis::new(
        "A factory packs 7,248 crayons equally among 8 boxes. How many crayons go in each box?",
        "division",
        Subject::Math,
    );
    let state = engine().generate(&question).unwrap();
    assert_eq!(state.kind(), DiagramKind::LongDivision);
    assert_eq!(state.visible_step, 0);
    assert!(final_calculation(&state).ends_with("7248 ÷ 8 = 906"));
}

// ── Physics ─────────────────────────────────────────────────────────────

#[test]
fn incline_components_follow_trigonometry() {
    let config = TutorConfig::default();
    for (mass, angle) in [(5.0, 30.0), (12.0, 45.0), (2.5, 10.0), (40.0, 60.0)] {
        let text = format!("A {mass} kg block sits on a {angle}° incline");
        let state = builders::build(DiagramKind::InclinedPlane, &text, &config).unwrap();
        let DiagramData::InclinedPlane(d) = &state.data else {
            panic!("expected inclined-plane data");
        };
        let incline = d.incline.unwrap();
        let g = config.physics.gravity;
        let rad = f64::to_radians(angle);
        assert!((incline.perpendicular_component - mass * g * rad.cos()).abs() <= 0.1);
        assert!((incline.parallel_component - mass * g * rad.sin()).abs() <= 0.1);

        let normal = d.forces.iter().find(|f| f.name == "normal").unwrap();
        assert!((normal.magnitude - mass * g * rad.cos()).abs() <= 0.1);
    }
}

#[test]
fn physics_builders_fill_defaults() {
    let state = engine()
        .generate(&QuestionAnalysis::new(
            "What forces act on the box?",
            "forces",
            Subject::Science,
        ))
        .unwrap();
    let DiagramData::Fbd(d) = &state.data else {
        panic!("expected force diagram");
    };
    assert_eq!(d.object.mass, 5.0);
    assert!(d.forces.iter().all(|f| f.magnitude >= 0.0));
}

// ── Final step contract ─────────────────────────────────────────────────

#[test]
fn numeric_diagrams_end_with_their_answer() {
    let cases = [
        ("What is 7248 ÷ 8?", Subject::Math, "906"),
        ("Solve 3x + 5 = 20", Subject::Math, "x = 5"),
        ("What is 1/2 + 1/3?", Subject::Math, "5/6"),
        ("Find the hypotenuse of a right triangle with legs 3 and 4", Subject::Math, "5"),
        ("Use a number line to find -3 + 5", Subject::Math, "2"),
        ("A 10 kg box rests on a table. Find its weight.", Subject::Science, "100N"),
        ("What is the molar mass of a water molecule?", Subject::Science, "18.015"),
    ];
    for (text, subject, answer) in cases {
        let state = engine()
            .generate(&QuestionAnalysis::new(text, "", subject))
            .unwrap_or_else(|| panic!("no diagram for {text}"));
        let calc = final_calculation(&state);
        assert!(!calc.is_empty(), "{text}: empty final calculation");
        assert!(!calc.contains('?'), "{text}: placeholder in `{calc}`");
        assert!(calc.contains(answer), "{text}: `{calc}` lacks {answer}");
    }
}

// ── Classification ──────────────────────────────────────────────────────

#[test]
fn division_cue_beats_equation_cue() {
    assert_eq!(
        classify::classify("solve 100 ÷ 4 = x", "", Subject::Math),
        Some(DiagramKind::LongDivision)
    );
}

#[test]
fn unsupported_questions_yield_nothing() {
    let engine = engine();
    for (text, subject) in [
        ("Summarise chapter two of the novel", Subject::Language),
        ("Who signed the Magna Carta?", Subject::History),
        ("Share the pizza fairly", Subject::Math),
    ] {
        assert!(
            engine.generate(&QuestionAnalysis::new(text, "", subject)).is_none(),
            "{text}"
        );
    }
}

// ── Validation ──────────────────────────────────────────────────────────

#[test]
fn every_generated_diagram_is_a_validation_fixed_point() {
    let engine = engine();
    let questions = [
        ("A 5 kg box is pulled with 20 N across a floor with friction", Subject::Science),
        ("A ball is launched at 20 m/s at 30°", Subject::Science),
        ("Graph y = x² - 4", Subject::Math),
        ("Sam has 3 times as many stickers as Tom. Together they have 48.", Subject::Math),
        ("How many electrons does sodium have?", Subject::Science),
        ("Label the organelles in a plant cell", Subject::Science),
        ("Write the complementary strand of the DNA ATGCCGTA", Subject::Science),
    ];
    for (text, subject) in questions {
        let once = engine
            .generate(&QuestionAnalysis::new(text, "", subject))
            .unwrap_or_else(|| panic!("no diagram for {text}"));
        let twice = validate::validate(&once, Some(once.kind())).unwrap();
        assert_eq!(once, twice, "{text}");
        assert_eq!(once.total_steps, once.step_config.len());
    }
}

#[test]
fn external_payloads_are_repaired_or_rejected() {
    let trace = simulate(96, 4).unwrap();
    let repaired = validate::validate_value(
        json!({
            "type": "long_division",
            "data": serde_json::to_value(&trace).unwrap(),
            "visibleStep": -3,
            "stepConfig": [{"stepLabel": "Set up"}, {"stepLabel": "Divide"}]
        }),
        Some(DiagramKind::LongDivision),
    )
    .unwrap();
    assert_eq!(repaired.visible_step, 0);
    assert_eq!(repaired.total_steps, 2);

    assert!(validate::validate_value(json!({"data": {"x": 1}}), None).is_none());
    assert!(validate::validate_value(json!({"type": "pie_chart", "data": {}}), None).is_none());
    assert!(validate::validate_json("not json", None).is_err());
}

#[test]
fn diagram_json_uses_wire_names() {
    let state = engine()
        .generate(&QuestionAnalysis::new("What is 96 ÷ 4?", "", Subject::Math))
        .unwrap();
    let value = serde_json::to_value(&state).unwrap();
    assert_eq!(value["type"], "long_division");
    assert_eq!(value["visibleStep"], 0);
    assert!(value["stepConfig"][0]["stepLabel"].is_string());
    assert_eq!(value["evolutionMode"], "auto-advance");

    let back: DiagramState = serde_json::from_value(value).unwrap();
    assert_eq!(back, state);
}

// ── Config ──────────────────────────────────────────────────────────────

#[test]
fn config_file_changes_builder_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tutor.toml");
    std::fs::write(&path, "[physics]\ngravity = 9.8\ndefault_mass = 2\n").unwrap();

    let config = TutorConfig::load(&path).unwrap();
    let state = DiagramEngine::new(config)
        .generate(&QuestionAnalysis::new(
            "What forces act on the box?",
            "",
            Subject::Science,
        ))
        .unwrap();
    assert_eq!(
        state.step_config[1].show_calculation.as_deref(),
        Some("W = mg = 2 × 9.8 = 19.6N")
    );
}
