//! Number-line diagrams for integer addition/subtraction and inequalities.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagram::{DiagramData, DiagramState, StepConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jump {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InequalityMark {
    pub variable: String,
    pub value: i64,
    pub direction: Direction,
    /// Closed circle when the boundary is included.
    pub inclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberLineData {
    pub min: i64,
    pub max: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default)]
    pub jumps: Vec<Jump>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inequality: Option<InequalityMark>,
}

static RE_INEQUALITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([a-z])\s*(<=|>=|≤|≥|<|>)\s*(-?\d+)").unwrap());

// `-3 + 5`, `4 - 7`, `2 - (-6)`
static RE_SUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+)\s*([+\-−])\s*(?:\(\s*(-?\d+)\s*\)|(\d+))").unwrap()
});

/// Margin of two ticks beyond the marked values, at least ten wide.
fn bounds(values: &[i64]) -> (i64, i64) {
    let lo = values.iter().copied().min().unwrap_or(0).saturating_sub(2);
    let hi = values.iter().copied().max().unwrap_or(0).saturating_add(2);
    let width = hi.saturating_sub(lo);
    if width < 10 {
        let pad = (10 - width + 1) / 2;
        (lo.saturating_sub(pad), hi.saturating_add(pad))
    } else {
        (lo, hi)
    }
}

fn signed(n: i64) -> String {
    if n < 0 { format!("({n})") } else { n.to_string() }
}

/// Build a number line from an inequality or a two-term integer sum.
pub fn build_number_line(text: &str) -> Option<DiagramState> {
    if let Some(c) = RE_INEQUALITY.captures(text) {
        let variable = c[1].to_lowercase();
        let value: i64 = c[3].parse().ok()?;
        let (direction, inclusive) = match &c[2] {
            "<" => (Direction::Left, false),
            "<=" | "≤" => (Direction::Left, true),
            ">" => (Direction::Right, false),
            _ => (Direction::Right, true),
        };
        return Some(inequality(variable, &c[2], value, direction, inclusive));
    }

    let c = RE_SUM.captures(text)?;
    let start: i64 = c[1].parse().ok()?;
    let operand: i64 = c.get(3).or_else(|| c.get(4))?.as_str().parse().ok()?;
    let op = &c[2];
    let delta = if op == "+" { operand } else { operand.checked_neg()? };
    let result = start.checked_add(delta)?;
    Some(jump(start, op, operand, result))
}

fn jump(start: i64, op: &str, operand: i64, result: i64) -> DiagramState {
    let (min, max) = bounds(&[start, result]);
    let sym = if op == "+" { "+" } else { "−" };
    let expression = format!("{} {sym} {}", start, signed(operand));
    let distance = result.abs_diff(start);
    let heading = if result >= start { "right" } else { "left" };

    let steps = vec![
        StepConfig::new("Draw the number line")
            .calculation(format!("from {min} to {max}"))
            .reveals("line"),
        StepConfig::new(format!("Start at {start}")).reveals("start"),
        StepConfig::new(format!("Jump {distance} to the {heading}"))
            .calculation(format!("{start} → {result}"))
            .reveals("jump"),
        StepConfig::new("Read where you land")
            .calculation(format!("{expression} = {result}"))
            .reveals("result"),
    ];
    DiagramState::new(
        DiagramData::NumberLine(NumberLineData {
            min,
            max,
            start: Some(start),
            jumps: vec![Jump { from: start, to: result }],
            result: Some(result),
            inequality: None,
        }),
        steps,
    )
}

fn inequality(
    variable: String,
    relation: &str,
    value: i64,
    direction: Direction,
    inclusive: bool,
) -> DiagramState {
    let (min, max) = bounds(&[value]);
    let circle = if inclusive { "a closed" } else { "an open" };
    let (side, words) = match (direction, inclusive) {
        (Direction::Left, false) => ("left", "less than"),
        (Direction::Left, true) => ("left", "less than or equal to"),
        (Direction::Right, false) => ("right", "greater than"),
        (Direction::Right, true) => ("right", "greater than or equal to"),
    };

    let steps = vec![
        StepConfig::new("Draw the number line")
            .calculation(format!("from {min} to {max}"))
            .reveals("line"),
        StepConfig::new(format!("Put {circle} circle at {value}")).reveals("boundary"),
        StepConfig::new(format!("Shade to the {side}")).reveals("shading"),
        StepConfig::new("Read the solution set")
            .calculation(format!(
                "{variable} {relation} {value}: every number {words} {value}"
            ))
            .reveals("result"),
    ];
    DiagramState::new(
        DiagramData::NumberLine(NumberLineData {
            min,
            max,
            start: None,
            jumps: Vec::new(),
            result: None,
            inequality: Some(InequalityMark {
                variable,
                value,
                direction,
                inclusive,
            }),
        }),
        steps,
    )
}
