//! Multi-turn conversation tests: step reveal, external diagrams and ASCII
//! rescue through `DiagramEngine::process_turn`.

use tutor_viz::analysis::{QuestionAnalysis, Subject};
use tutor_viz::config::TutorConfig;
use tutor_viz::diagram::{DiagramData, DiagramState};
use tutor_viz::evolution::{self, AsciiSignature, EvolutionState};
use tutor_viz::pipeline::{DiagramEngine, DiagramSource, TurnInput, TurnOutcome};

fn ask(engine: &DiagramEngine, text: &str, subject: Subject) -> TurnOutcome {
    engine.process_turn(TurnInput {
        analysis: Some(QuestionAnalysis::new(text, "", subject)),
        turn: 1,
        ..Default::default()
    })
}

fn follow_up(engine: &DiagramEngine, previous: Option<DiagramState>, turn: u32) -> TurnOutcome {
    engine.process_turn(TurnInput {
        previous,
        message: Some("Good, keep going.".into()),
        turn,
        ..Default::default()
    })
}

#[test]
fn one_step_per_turn_until_complete() {
    let engine = DiagramEngine::default();
    let first = ask(&engine, "What is 7248 ÷ 8?", Subject::Math);
    let total = first.diagram.as_ref().unwrap().total_steps;
    assert!(total > 2);

    let mut previous = first.diagram;
    for turn in 2..=total as u32 {
        let outcome = follow_up(&engine, previous.clone(), turn);
        assert_eq!(outcome.source, DiagramSource::Continued);
        let diagram = outcome.diagram.unwrap();
        assert_eq!(diagram.visible_step, turn as usize - 1);
        assert_eq!(diagram.conversation_turn, Some(turn));
        // Same problem every turn.
        assert_eq!(diagram.data, previous.as_ref().unwrap().data);
        previous = Some(diagram);
    }

    let last = previous.unwrap();
    assert!(last.is_complete());
    assert_eq!(
        EvolutionState::of(Some(&last)),
        EvolutionState::Complete { total }
    );

    // Complete diagrams are not re-emitted.
    let after = follow_up(&engine, Some(last), total as u32 + 1);
    assert_eq!(after.source, DiagramSource::Absent);
    assert!(after.diagram.is_none());
}

#[test]
fn previous_turn_is_never_mutated() {
    let engine = DiagramEngine::default();
    let first = ask(&engine, "Solve 2x + 4 = 10", Subject::Math)
        .diagram
        .unwrap();
    let snapshot = first.clone();
    let _ = follow_up(&engine, Some(first.clone()), 2);
    assert_eq!(first, snapshot);
}

#[test]
fn new_question_replaces_diagram_in_progress() {
    let engine = DiagramEngine::default();
    let division = ask(&engine, "What is 96 ÷ 4?", Subject::Math).diagram;

    let outcome = engine.process_turn(TurnInput {
        analysis: Some(QuestionAnalysis::new(
            "How many electrons does carbon have?",
            "",
            Subject::Science,
        )),
        previous: division,
        turn: 3,
        ..Default::default()
    });
    assert_eq!(outcome.source, DiagramSource::Generated);
    let diagram = outcome.diagram.unwrap();
    assert!(matches!(diagram.data, DiagramData::Atom(_)));
    assert_eq!(diagram.visible_step, 0);
}

#[test]
fn undrawable_new_question_ends_diagram_in_progress() {
    let engine = DiagramEngine::default();
    let division = ask(&engine, "What is 7248 ÷ 8?", Subject::Math).diagram;
    assert_eq!(division.as_ref().unwrap().visible_step, 0);

    let outcome = engine.process_turn(TurnInput {
        analysis: Some(QuestionAnalysis::new(
            "Why did the Roman empire fall?",
            "",
            Subject::History,
        )),
        previous: division,
        message: Some("Many historians point to several causes.".into()),
        turn: 2,
        ..Default::default()
    });
    assert_eq!(outcome.source, DiagramSource::Absent);
    assert!(outcome.diagram.is_none());
    assert_eq!(outcome.evolution, EvolutionState::NoDiagram);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Many historians point to several causes.")
    );
}

#[test]
fn external_diagram_is_authoritative() {
    let engine = DiagramEngine::default();
    let previous = ask(&engine, "What is 96 ÷ 4?", Subject::Math).diagram;
    let mut external = engine
        .generate(&QuestionAnalysis::new("What is 7248 ÷ 8?", "", Subject::Math))
        .unwrap();
    external.visible_step = 2;

    let outcome = engine.process_turn(TurnInput {
        previous,
        external: Some(serde_json::to_value(&external).unwrap()),
        turn: 2,
        ..Default::default()
    });
    assert_eq!(outcome.source, DiagramSource::External);
    let diagram = outcome.diagram.unwrap();
    assert_eq!(diagram.visible_step, 2);
    assert_eq!(diagram.data, external.data);
}

#[test]
fn monotonic_policy_clamps_to_last_step() {
    let mut config = TutorConfig::default();
    config.evolution.enforce_monotonic_steps = true;
    let engine = DiagramEngine::new(config);

    let mut previous = ask(&engine, "What is 96 ÷ 4?", Subject::Math)
        .diagram
        .unwrap();
    previous.visible_step = previous.total_steps - 1;
    let mut external = previous.clone();
    external.visible_step = 0;

    let outcome = engine.process_turn(TurnInput {
        previous: Some(previous.clone()),
        external: Some(serde_json::to_value(&external).unwrap()),
        turn: 9,
        ..Default::default()
    });
    assert_eq!(
        outcome.diagram.unwrap().visible_step,
        previous.total_steps - 1
    );
}

#[test]
fn ascii_division_in_message_is_replaced() {
    let engine = DiagramEngine::default();
    let message = "Let's line it up:\n\n```\n     ____\n4 ) 96\n```\n\nHow many 4s fit in 9?";
    let outcome = engine.process_turn(TurnInput {
        message: Some(message.into()),
        turn: 2,
        ..Default::default()
    });
    assert_eq!(outcome.source, DiagramSource::Rescued);
    let DiagramData::LongDivision(trace) = &outcome.diagram.as_ref().unwrap().data else {
        panic!("expected long division");
    };
    assert_eq!((trace.dividend, trace.divisor, trace.quotient), (96, 4, 24));
    assert_eq!(
        outcome.message.as_deref(),
        Some("Let's line it up:\n\nHow many 4s fit in 9?")
    );
}

#[test]
fn unrescuable_message_is_untouched() {
    let engine = DiagramEngine::default();
    let message = "Here is a divider line:\n__________\nNow think about it.";
    assert!(
        evolution::detect_ascii_layout(message).contains(&AsciiSignature::RuleLine)
    );
    let outcome = engine.process_turn(TurnInput {
        message: Some(message.into()),
        turn: 2,
        ..Default::default()
    });
    assert_eq!(outcome.source, DiagramSource::Absent);
    assert_eq!(outcome.message.as_deref(), Some(message));
}

#[test]
fn turn_outcome_serializes_for_persistence() {
    let engine = DiagramEngine::default();
    let outcome = ask(&engine, "What is 96 ÷ 4?", Subject::Math);
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["source"], "generated");
    assert_eq!(value["evolution"]["state"], "IN_PROGRESS");
    assert_eq!(value["diagram"]["type"], "long_division");
    assert_eq!(value["diagram"]["conversationTurn"], 1);
}
