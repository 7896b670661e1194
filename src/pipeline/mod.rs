//! Per-turn diagram pipeline.
//!
//! [`DiagramEngine`] is the single entry point a tutoring request handler
//! calls once per conversational turn. It holds only configuration, so one
//! engine can serve any number of sessions concurrently.
//!
//! # Turn pipeline
//!
//! 1. A diagram supplied by the dialogue service is validated; if it
//!    survives it is authoritative. A step index that falls behind the
//!    previous turn's diagram is logged, and raised when
//!    `evolution.enforce_monotonic_steps` is set.
//! 2. A new question (a `QuestionAnalysis`) is classified and built from
//!    scratch.
//! 3. Otherwise, unless this turn asked a new question, the previous
//!    turn's diagram advances one step. A new question without a drawable
//!    category ends the previous diagram.
//! 4. Otherwise, if the message drew a division in ASCII, the diagram is
//!    rescued from it and the ASCII is stripped from the message.
//! 5. Otherwise the turn has no diagram.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{QuestionAnalysis, excerpt};
use crate::builders;
use crate::classify::{self, DiagramKind};
use crate::config::TutorConfig;
use crate::diagram::DiagramState;
use crate::evolution::{self, EvolutionState};
use crate::validate;

/// Which path produced a turn's diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramSource {
    /// Supplied by the dialogue service and validated.
    External,
    /// Built from a new question.
    Generated,
    /// The previous diagram, one step further.
    Continued,
    /// Recovered from an ASCII layout in the message.
    Rescued,
    /// No diagram this turn.
    Absent,
}

/// Everything the engine needs for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    /// Set only when the student asked a new question this turn.
    pub analysis: Option<QuestionAnalysis>,
    /// Diagram attached to the previous turn.
    pub previous: Option<DiagramState>,
    /// Diagram payload from the dialogue service, untrusted.
    pub external: Option<Value>,
    /// Free-text tutoring message for this turn.
    pub message: Option<String>,
    pub turn: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub diagram: Option<DiagramState>,
    /// The message to display, with rescued ASCII removed.
    pub message: Option<String>,
    pub evolution: EvolutionState,
    pub source: DiagramSource,
}

impl TurnOutcome {
    fn new(diagram: Option<DiagramState>, message: Option<String>, source: DiagramSource) -> Self {
        Self {
            evolution: EvolutionState::of(diagram.as_ref()),
            diagram,
            message,
            source,
        }
    }
}

/// Classifies, builds, validates and evolves diagrams.
#[derive(Debug, Clone, Default)]
pub struct DiagramEngine {
    config: TutorConfig,
}

impl DiagramEngine {
    pub fn new(config: TutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Fresh diagram for a question, if it has a drawable category.
    pub fn generate(&self, analysis: &QuestionAnalysis) -> Option<DiagramState> {
        let kind = classify::classify_analysis(analysis)?;
        self.generate_kind(kind, &analysis.question_text)
    }

    /// Fresh diagram of a known category.
    pub fn generate_kind(&self, kind: DiagramKind, text: &str) -> Option<DiagramState> {
        match builders::build(kind, text, &self.config) {
            Some(state) => {
                tracing::info!(%kind, steps = state.total_steps, "generated diagram");
                Some(state)
            }
            None => {
                tracing::info!(%kind, text = excerpt(text), "category detected but nothing to draw");
                None
            }
        }
    }

    /// Run the turn pipeline.
    pub fn process_turn(&self, input: TurnInput) -> TurnOutcome {
        let TurnInput {
            analysis,
            previous,
            external,
            message,
            turn,
        } = input;
        let expected_kind = previous.as_ref().map(DiagramState::kind);

        if let Some(state) = external.and_then(|v| validate::validate_value(v, expected_kind)) {
            let state = self.reconcile_external(state, previous.as_ref()).with_turn(turn);
            return TurnOutcome::new(Some(state), message, DiagramSource::External);
        }

        if let Some(analysis) = &analysis {
            if let Some(state) = self.generate(analysis) {
                return TurnOutcome::new(Some(state.with_turn(turn)), message, DiagramSource::Generated);
            }
            if previous.is_some() {
                tracing::debug!(turn, "new question replaces the previous diagram");
            }
        } else if let Some(state) = previous
            .as_ref()
            .and_then(|prev| evolution::continue_diagram(prev, turn))
        {
            return TurnOutcome::new(Some(state), message, DiagramSource::Continued);
        }

        let rescue = match &message {
            Some(text) if self.config.evolution.rescue_enabled => {
                evolution::rescue_from_message(text, Some(turn))
            }
            _ => None,
        };
        if let Some(rescue) = rescue {
            return TurnOutcome::new(
                Some(rescue.diagram),
                Some(rescue.cleaned_message),
                DiagramSource::Rescued,
            );
        }

        TurnOutcome::new(None, message, DiagramSource::Absent)
    }

    /// Apply the step-regression policy to a valid external diagram.
    fn reconcile_external(&self, mut state: DiagramState, previous: Option<&DiagramState>) -> DiagramState {
        let Some(prev) = previous.filter(|p| p.kind() == state.kind()) else {
            return state;
        };
        let expected = match evolution::continuation(prev) {
            Some(next) => next.next_step,
            None => prev.visible_step,
        };
        if state.visible_step >= expected {
            return state;
        }

        if self.config.evolution.enforce_monotonic_steps {
            let raised = expected.min(state.total_steps - 1);
            tracing::warn!(
                kind = %state.kind(),
                received = state.visible_step,
                expected,
                raised,
                "external diagram regressed, raising visible step"
            );
            state.visible_step = raised;
        } else {
            tracing::warn!(
                kind = %state.kind(),
                received = state.visible_step,
                expected,
                "external diagram regressed, keeping it as sent"
            );
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::analysis::Subject;

    fn division_question() -> QuestionAnalysis {
        QuestionAnalysis::new(
            "Use long division to find 7,248 ÷ 8",
            "long division",
            Subject::Math,
        )
    }

    #[test]
    fn new_question_generates() {
        let engine = DiagramEngine::default();
        let outcome = engine.process_turn(TurnInput {
            analysis: Some(division_question()),
            turn: 1,
            ..Default::default()
        });
        assert_eq!(outcome.source, DiagramSource::Generated);
        let diagram = outcome.diagram.unwrap();
        assert_eq!(diagram.kind(), DiagramKind::LongDivision);
        assert_eq!(diagram.conversation_turn, Some(1));
        assert_eq!(outcome.evolution, EvolutionState::InProgress { step: 0, total: 5 });
    }

    #[test]
    fn later_turn_continues_previous() {
        let engine = DiagramEngine::default();
        let first = engine.generate(&division_question()).unwrap().with_turn(1);
        let outcome = engine.process_turn(TurnInput {
            previous: Some(first),
            turn: 2,
            ..Default::default()
        });
        assert_eq!(outcome.source, DiagramSource::Continued);
        assert_eq!(outcome.diagram.unwrap().visible_step, 1);
    }

    #[test]
    fn history_question_has_no_diagram() {
        let engine = DiagramEngine::default();
        let outcome = engine.process_turn(TurnInput {
            analysis: Some(QuestionAnalysis::new(
                "Why did the Roman Empire fall?",
                "rome",
                Subject::History,
            )),
            message: Some("Great question!".into()),
            turn: 1,
            ..Default::default()
        });
        assert_eq!(outcome.source, DiagramSource::Absent);
        assert_eq!(outcome.evolution, EvolutionState::NoDiagram);
        assert_eq!(outcome.message.as_deref(), Some("Great question!"));
    }

    #[test]
    fn invalid_external_falls_through() {
        let engine = DiagramEngine::default();
        let outcome = engine.process_turn(TurnInput {
            analysis: Some(division_question()),
            external: Some(json!({"type": "long_division"})),
            turn: 1,
            ..Default::default()
        });
        assert_eq!(outcome.source, DiagramSource::Generated);
    }

    fn regressed_external(engine: &DiagramEngine) -> (DiagramState, TurnOutcome) {
        let mut prev = engine.generate(&division_question()).unwrap();
        prev.visible_step = 2;
        let mut external = prev.clone();
        external.visible_step = 0;
        let outcome = engine.process_turn(TurnInput {
            previous: Some(prev.clone()),
            external: Some(serde_json::to_value(&external).unwrap()),
            turn: 4,
            ..Default::default()
        });
        (prev, outcome)
    }

    #[test]
    fn regressed_external_is_kept_by_default() {
        let (_, outcome) = regressed_external(&DiagramEngine::default());
        assert_eq!(outcome.source, DiagramSource::External);
        let diagram = outcome.diagram.unwrap();
        assert_eq!(diagram.visible_step, 0);
        assert_eq!(diagram.conversation_turn, Some(4));
    }

    #[test]
    fn regressed_external_is_raised_when_enforced() {
        let mut config = TutorConfig::default();
        config.evolution.enforce_monotonic_steps = true;
        let (prev, outcome) = regressed_external(&DiagramEngine::new(config));
        assert_eq!(outcome.diagram.unwrap().visible_step, prev.visible_step + 1);
    }

    #[test]
    fn ascii_message_is_rescued() {
        let engine = DiagramEngine::default();
        let outcome = engine.process_turn(TurnInput {
            message: Some("Set it up:\n8 ) 7248\nWhat goes first?".into()),
            turn: 2,
            ..Default::default()
        });
        assert_eq!(outcome.source, DiagramSource::Rescued);
        assert_eq!(outcome.message.as_deref(), Some("Set it up:\nWhat goes first?"));
    }

    #[test]
    fn rescue_can_be_disabled() {
        let mut config = TutorConfig::default();
        config.evolution.rescue_enabled = false;
        let message = "Set it up:\n8 ) 7248";
        let outcome = DiagramEngine::new(config).process_turn(TurnInput {
            message: Some(message.into()),
            turn: 2,
            ..Default::default()
        });
        assert_eq!(outcome.source, DiagramSource::Absent);
        assert_eq!(outcome.message.as_deref(), Some(message));
    }
}
