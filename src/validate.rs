//! State validator.
//!
//! Every diagram is checked before it leaves the crate, whether it came from
//! a builder or from the external dialogue service. The policy is two-tier:
//!
//! - **Reject** when `type` or `data` is missing, unknown, malformed or
//!   empty. These cannot be defaulted safely, so the outcome is "no diagram".
//! - **Repair** step counters: a missing or negative `visibleStep` becomes
//!   0, a `totalSteps` below 1 becomes 1, a missing `totalSteps` is taken
//!   from the `stepConfig` length, a `totalSteps` that disagrees with a
//!   non-empty `stepConfig` is replaced by its length, and a `visibleStep`
//!   past the end is clamped to the last step.
//!
//! Checks run on the loosely typed [`RawDiagram`], and typed states are
//! validated by round-tripping through it, so `validate` is idempotent.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::classify::DiagramKind;
use crate::diagram::{DiagramData, DiagramState, EvolutionMode, RawDiagram};
use crate::error::{DiagramError, TutorResult};

/// Why a diagram was rejected outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("diagram is not a JSON object")]
    NotAnObject,

    #[error("diagram fields have the wrong shape: {message}")]
    MalformedDiagram { message: String },

    #[error("diagram has no `type`")]
    MissingType,

    #[error("unknown diagram type `{name}`")]
    UnknownType { name: String },

    #[error("diagram has no `data`")]
    MissingData,

    #[error("`{kind}` diagram has empty `data`")]
    EmptyData { kind: DiagramKind },

    #[error("`{kind}` diagram data is malformed: {message}")]
    MalformedData { kind: DiagramKind, message: String },
}

/// A minor defect fixed in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    VisibleStepMissing,
    VisibleStepNegative { was: i64 },
    VisibleStepPastEnd { was: i64, now: usize },
    TotalStepsMissing { inferred: usize },
    TotalStepsTooSmall { was: i64 },
    TotalStepsMismatch { was: usize, now: usize },
    UnknownEvolutionMode { name: String },
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VisibleStepMissing => write!(f, "visibleStep missing, set to 0"),
            Self::VisibleStepNegative { was } => write!(f, "visibleStep {was} is negative, set to 0"),
            Self::VisibleStepPastEnd { was, now } => {
                write!(f, "visibleStep {was} is past the last step, clamped to {now}")
            }
            Self::TotalStepsMissing { inferred } => {
                write!(f, "totalSteps missing, inferred {inferred} from stepConfig")
            }
            Self::TotalStepsTooSmall { was } => write!(f, "totalSteps {was} is below 1, set to 1"),
            Self::TotalStepsMismatch { was, now } => {
                write!(f, "totalSteps {was} disagrees with {now} stepConfig entries, set to {now}")
            }
            Self::UnknownEvolutionMode { name } => {
                write!(f, "unknown evolutionMode `{name}` dropped")
            }
        }
    }
}

/// A validated state and the repairs applied to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked {
    pub state: DiagramState,
    pub repairs: Vec<Repair>,
}

/// Step counter from a loosely typed JSON value. Floats truncate toward
/// negative infinity; numeric strings are accepted. Anything else counts as
/// absent.
fn step_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
        }
        _ => None,
    }
}

/// Run every check on a wire-form diagram.
pub fn check(raw: RawDiagram) -> Result<Checked, RejectReason> {
    // type
    let name = raw
        .kind
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(RejectReason::MissingType)?;
    let kind = DiagramKind::from_wire(name).ok_or_else(|| RejectReason::UnknownType {
        name: name.to_string(),
    })?;

    // data
    let data = match raw.data {
        None | Some(Value::Null) => return Err(RejectReason::MissingData),
        Some(Value::Object(map)) if map.is_empty() => {
            return Err(RejectReason::EmptyData { kind });
        }
        Some(value @ Value::Object(_)) => value,
        Some(_) => {
            return Err(RejectReason::MalformedData {
                kind,
                message: "expected an object".into(),
            });
        }
    };
    let data = DiagramData::from_value(kind, data).map_err(|e| RejectReason::MalformedData {
        kind,
        message: e.to_string(),
    })?;
    if data.is_empty() {
        return Err(RejectReason::EmptyData { kind });
    }

    let mut repairs = Vec::new();

    // totalSteps
    let total_steps = match raw.total_steps.as_ref().and_then(step_number) {
        None => {
            let inferred = raw.step_config.len().max(1);
            repairs.push(Repair::TotalStepsMissing { inferred });
            inferred
        }
        Some(n) if n < 1 => {
            repairs.push(Repair::TotalStepsTooSmall { was: n });
            1
        }
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    };
    // The step list is what gets rendered, so it wins over the count.
    let configured = raw.step_config.len();
    let total_steps = if configured > 0 && configured != total_steps {
        repairs.push(Repair::TotalStepsMismatch {
            was: total_steps,
            now: configured,
        });
        configured
    } else {
        total_steps
    };

    // visibleStep
    let visible_step = match raw.visible_step.as_ref().and_then(step_number) {
        None => {
            repairs.push(Repair::VisibleStepMissing);
            0
        }
        Some(n) if n < 0 => {
            repairs.push(Repair::VisibleStepNegative { was: n });
            0
        }
        Some(n) => {
            let n_usize = usize::try_from(n).unwrap_or(usize::MAX);
            if n_usize >= total_steps {
                let now = total_steps - 1;
                repairs.push(Repair::VisibleStepPastEnd { was: n, now });
                now
            } else {
                n_usize
            }
        }
    };

    let evolution_mode = match raw.evolution_mode {
        None => None,
        Some(name) => match EvolutionMode::from_wire(&name) {
            Some(mode) => Some(mode),
            None => {
                repairs.push(Repair::UnknownEvolutionMode { name });
                None
            }
        },
    };

    Ok(Checked {
        state: DiagramState {
            visible_step,
            total_steps,
            data,
            step_config: raw.step_config,
            evolution_mode,
            conversation_turn: raw.conversation_turn,
        },
        repairs,
    })
}

fn category_label(category: Option<DiagramKind>) -> &'static str {
    category.map_or("unspecified", DiagramKind::as_str)
}

/// Validate a wire-form diagram. `category` is the diagram category the
/// caller expected, used as log context.
pub fn validate_raw(raw: RawDiagram, category: Option<DiagramKind>) -> Option<DiagramState> {
    let category = category_label(category);
    match check(raw) {
        Ok(Checked { state, repairs }) => {
            for repair in &repairs {
                tracing::warn!(category, kind = %state.kind(), %repair, "repaired diagram");
            }
            Some(state)
        }
        Err(reason) => {
            tracing::warn!(category, %reason, "rejected diagram");
            None
        }
    }
}

/// Validate a typed diagram. Applying it twice changes nothing beyond the
/// first pass.
pub fn validate(diagram: &DiagramState, category: Option<DiagramKind>) -> Option<DiagramState> {
    validate_raw(RawDiagram::from(diagram.clone()), category)
}

/// Validate an untrusted JSON value, e.g. a diagram embedded in a dialogue
/// message.
pub fn validate_value(value: Value, category: Option<DiagramKind>) -> Option<DiagramState> {
    if !value.is_object() {
        tracing::warn!(category = category_label(category), reason = %RejectReason::NotAnObject, "rejected diagram");
        return None;
    }
    match serde_json::from_value::<RawDiagram>(value) {
        Ok(raw) => validate_raw(raw, category),
        Err(e) => {
            let reason = RejectReason::MalformedDiagram {
                message: e.to_string(),
            };
            tracing::warn!(category = category_label(category), %reason, "rejected diagram");
            None
        }
    }
}

/// Validate a JSON document. Text that is not JSON at all is an error;
/// a well-formed document that fails the checks is `Ok(None)`.
pub fn validate_json(json: &str, category: Option<DiagramKind>) -> TutorResult<Option<DiagramState>> {
    let value: Value = serde_json::from_str(json).map_err(DiagramError::from)?;
    Ok(validate_value(value, category))
}
