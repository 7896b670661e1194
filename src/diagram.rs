//! The diagram description handed to the rendering layer.
//!
//! [`DiagramState`] is the typed form: its payload is a [`DiagramData`] sum
//! type whose variant *is* the diagram `type`, so a typed diagram can never
//! lack a type or carry data for the wrong one. On the wire the state is a
//! flat JSON object (`type`, `visibleStep`, `totalSteps`, `data`,
//! `stepConfig`, ...). [`RawDiagram`] mirrors that object field for field
//! with everything optional, and deserializing a `DiagramState` always goes
//! through the validator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builders::biology::{CellData, DnaData};
use crate::builders::chemistry::{AtomData, MoleculeData};
use crate::builders::math::{
    BarModelData, CoordinatePlaneData, EquationData, FractionData, NumberLineData, TriangleData,
};
use crate::builders::physics::{ForceDiagram, ProjectileData};
use crate::classify::DiagramKind;
use crate::division::DivisionTrace;
use crate::validate::{self, RejectReason};

pub use crate::builders::physics::{ForceData, ForceType};

/// A point in diagram space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Round to one decimal place, the precision shown to students.
pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Format a number without a trailing `.0` for whole values.
pub(crate) fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{}", round1(v))
    }
}

// ── StepConfig ──────────────────────────────────────────────────────────

/// What becomes visible at one reveal step, and the text shown with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepConfig {
    pub step_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_calculation: Option<String>,
    /// Names of data elements first revealed at this step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reveal: Vec<String>,
}

impl StepConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            step_label: label.into(),
            show_calculation: None,
            reveal: Vec::new(),
        }
    }

    pub fn calculation(mut self, calc: impl Into<String>) -> Self {
        self.show_calculation = Some(calc.into());
        self
    }

    pub fn reveals(mut self, element: impl Into<String>) -> Self {
        self.reveal.push(element.into());
        self
    }
}

/// How a diagram evolves across conversational turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionMode {
    /// Each new turn reveals exactly one more step.
    #[serde(rename = "auto-advance")]
    AutoAdvance,
}

impl EvolutionMode {
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "auto-advance" => Some(Self::AutoAdvance),
            _ => None,
        }
    }
}

// ── DiagramData ─────────────────────────────────────────────────────────

/// Category-specific payload. The variant doubles as the diagram `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiagramData {
    Fbd(ForceDiagram),
    InclinedPlane(ForceDiagram),
    Projectile(ProjectileData),
    LongDivision(DivisionTrace),
    Equation(EquationData),
    Fraction(FractionData),
    CoordinatePlane(CoordinatePlaneData),
    BarModel(BarModelData),
    Triangle(TriangleData),
    NumberLine(NumberLineData),
    Atom(AtomData),
    Molecule(MoleculeData),
    Cell(CellData),
    Dna(DnaData),
}

impl DiagramData {
    pub fn kind(&self) -> DiagramKind {
        match self {
            Self::Fbd(_) => DiagramKind::Fbd,
            Self::InclinedPlane(_) => DiagramKind::InclinedPlane,
            Self::Projectile(_) => DiagramKind::Projectile,
            Self::LongDivision(_) => DiagramKind::LongDivision,
            Self::Equation(_) => DiagramKind::Equation,
            Self::Fraction(_) => DiagramKind::Fraction,
            Self::CoordinatePlane(_) => DiagramKind::CoordinatePlane,
            Self::BarModel(_) => DiagramKind::BarModel,
            Self::Triangle(_) => DiagramKind::Triangle,
            Self::NumberLine(_) => DiagramKind::NumberLine,
            Self::Atom(_) => DiagramKind::Atom,
            Self::Molecule(_) => DiagramKind::Molecule,
            Self::Cell(_) => DiagramKind::Cell,
            Self::Dna(_) => DiagramKind::Dna,
        }
    }

    /// Decode the payload for `kind` from an untyped JSON value.
    pub fn from_value(kind: DiagramKind, value: Value) -> Result<Self, serde_json::Error> {
        use serde_json::from_value as de;
        Ok(match kind {
            DiagramKind::Fbd => Self::Fbd(de(value)?),
            DiagramKind::InclinedPlane => Self::InclinedPlane(de(value)?),
            DiagramKind::Projectile => Self::Projectile(de(value)?),
            DiagramKind::LongDivision => Self::LongDivision(de(value)?),
            DiagramKind::Equation => Self::Equation(de(value)?),
            DiagramKind::Fraction => Self::Fraction(de(value)?),
            DiagramKind::CoordinatePlane => Self::CoordinatePlane(de(value)?),
            DiagramKind::BarModel => Self::BarModel(de(value)?),
            DiagramKind::Triangle => Self::Triangle(de(value)?),
            DiagramKind::NumberLine => Self::NumberLine(de(value)?),
            DiagramKind::Atom => Self::Atom(de(value)?),
            DiagramKind::Molecule => Self::Molecule(de(value)?),
            DiagramKind::Cell => Self::Cell(de(value)?),
            DiagramKind::Dna => Self::Dna(de(value)?),
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// True when the payload has nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Fbd(d) | Self::InclinedPlane(d) => d.forces.is_empty(),
            Self::Projectile(d) => d.trajectory.is_empty(),
            Self::LongDivision(d) => d.steps.is_empty(),
            Self::Equation(d) => d.equation.trim().is_empty(),
            Self::Fraction(d) => d.operands.is_empty(),
            Self::CoordinatePlane(d) => d.function.is_none() && d.points.is_empty(),
            Self::BarModel(d) => d.bars.is_empty(),
            Self::Triangle(d) => d.sides.iter().chain(d.angles.iter()).all(Option::is_none),
            Self::NumberLine(d) => d.min >= d.max,
            Self::Atom(d) => d.shells.is_empty(),
            Self::Molecule(d) => d.atoms.is_empty(),
            Self::Cell(d) => d.organelles.is_empty(),
            Self::Dna(d) => d.base_pairs.is_empty(),
        }
    }
}

// ── DiagramState ────────────────────────────────────────────────────────

/// One turn's diagram: payload, reveal position and per-step annotations.
///
/// Invariants (restored by the validator when violated):
/// `total_steps >= 1` and `visible_step < total_steps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDiagram", into = "RawDiagram")]
pub struct DiagramState {
    pub visible_step: usize,
    pub total_steps: usize,
    pub data: DiagramData,
    pub step_config: Vec<StepConfig>,
    pub evolution_mode: Option<EvolutionMode>,
    pub conversation_turn: Option<u32>,
}

impl DiagramState {
    /// A fresh auto-advancing diagram showing its first step.
    pub fn new(data: DiagramData, step_config: Vec<StepConfig>) -> Self {
        Self {
            visible_step: 0,
            total_steps: step_config.len().max(1),
            data,
            step_config,
            evolution_mode: Some(EvolutionMode::AutoAdvance),
            conversation_turn: None,
        }
    }

    pub fn kind(&self) -> DiagramKind {
        self.data.kind()
    }

    pub fn with_turn(mut self, turn: u32) -> Self {
        self.conversation_turn = Some(turn);
        self
    }

    /// Step annotation for the currently visible step.
    pub fn current_step(&self) -> Option<&StepConfig> {
        self.step_config.get(self.visible_step)
    }

    pub fn final_step(&self) -> Option<&StepConfig> {
        self.step_config.last()
    }

    pub fn is_complete(&self) -> bool {
        self.visible_step + 1 >= self.total_steps
    }
}

impl TryFrom<RawDiagram> for DiagramState {
    type Error = RejectReason;

    fn try_from(raw: RawDiagram) -> Result<Self, Self::Error> {
        validate::check(raw).map(|checked| checked.state)
    }
}

// ── RawDiagram ──────────────────────────────────────────────────────────

/// Untrusted wire form of a diagram: every field optional and loosely typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDiagram {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_step: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub step_config: Vec<StepConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_turn: Option<u32>,
}

impl From<DiagramState> for RawDiagram {
    fn from(state: DiagramState) -> Self {
        Self {
            kind: Some(state.kind().as_str().to_string()),
            visible_step: Some(Value::from(state.visible_step)),
            total_steps: Some(Value::from(state.total_steps)),
            data: Some(state.data.to_value()),
            step_config: state.step_config,
            evolution_mode: state.evolution_mode.map(|m| match m {
                EvolutionMode::AutoAdvance => "auto-advance".to_string(),
            }),
            conversation_turn: state.conversation_turn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::division::simulate;

    fn division_state() -> DiagramState {
        let trace = simulate(96, 4).unwrap();
        DiagramState::new(
            DiagramData::LongDivision(trace),
            vec![
                StepConfig::new("Set up"),
                StepConfig::new("Divide").calculation("96 ÷ 4 = 24"),
            ],
        )
    }

    #[test]
    fn new_state_defaults() {
        let state = division_state();
        assert_eq!(state.visible_step, 0);
        assert_eq!(state.total_steps, 2);
        assert_eq!(state.kind(), DiagramKind::LongDivision);
        assert_eq!(state.evolution_mode, Some(EvolutionMode::AutoAdvance));
        assert!(!state.is_complete());
    }

    #[test]
    fn wire_shape() {
        let json = serde_json::to_value(division_state().with_turn(3)).unwrap();
        assert_eq!(json["type"], "long_division");
        assert_eq!(json["visibleStep"], 0);
        assert_eq!(json["totalSteps"], 2);
        assert_eq!(json["data"]["quotient"], 24);
        assert_eq!(json["stepConfig"][1]["showCalculation"], "96 ÷ 4 = 24");
        assert_eq!(json["evolutionMode"], "auto-advance");
        assert_eq!(json["conversationTurn"], 3);
        assert!(json["stepConfig"][0].get("showCalculation").is_none());
    }

    #[test]
    fn deserializes_through_validator() {
        let state = division_state();
        let json = serde_json::to_string(&state).unwrap();
        let back: DiagramState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn deserialize_rejects_missing_type() {
        let err = serde_json::from_str::<DiagramState>(r#"{"data": {"x": 1}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(50.0), "50");
        assert_eq!(fmt_num(43.30127), "43.3");
        assert_eq!(round1(24.99), 25.0);
    }
}
