//! Triangle diagrams: Pythagoras, the angle sum and perimeter.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagram::{DiagramData, DiagramState, StepConfig, fmt_num, round1};
use crate::extract::parse_number;

/// Sides `a`, `b`, `c` and their opposite angles `A`, `B`, `C`. In a right
/// triangle `c` is the hypotenuse and `C` the right angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriangleData {
    pub sides: [Option<f64>; 3],
    pub angles: [Option<f64>; 3],
    pub right_angle: bool,
    /// What was solved for: `"c"`, `"b"`, `"C"`, `"perimeter"`.
    pub solved_for: String,
    pub answer: f64,
}

const NUM: &str = r"(\d+(?:\.\d+)?)";
const UNIT: &str = r"\s*(?:cm|mm|m|in|ft|units?)?";

static RE_HYPOTENUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)hypotenuse\s+(?:is\s+|of\s+|=\s*){NUM}")).unwrap()
});

static RE_ONE_LEG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:one\s+)?(?:leg|side)\s+(?:is\s+|of\s+|=\s*)?{NUM}")).unwrap()
});

static RE_LEGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\blegs\b(?:\s+(?:are|of|measuring))?\s+{NUM}{UNIT}\s*(?:and|,)\s*{NUM}"
    ))
    .unwrap()
});

static RE_THREE_SIDES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bsides\b(?:\s+(?:are|of|measuring))?\s+{NUM}{UNIT}\s*,\s*{NUM}{UNIT}\s*,?\s*(?:and\s+)?{NUM}"
    ))
    .unwrap()
});

static RE_ANGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i){NUM}\s*(?:°|degrees?\b)")).unwrap());

static RE_RIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bright(?:[\s-]+angled?)?\s+triangle\b").unwrap());

/// Build a triangle diagram, trying hypotenuse-and-leg, two legs, three
/// sides, then angles.
pub fn build_triangle(text: &str) -> Option<DiagramState> {
    let right = RE_RIGHT.is_match(text);

    if let Some(h) = RE_HYPOTENUSE.captures(text) {
        let c = parse_number(&h[1])?;
        // The leg pattern also sees "side" in the hypotenuse clause; take the
        // first match outside it.
        let span = h.get(0)?.range();
        let a = RE_ONE_LEG
            .captures_iter(text)
            .find(|m| m.get(0).is_some_and(|m| !span.contains(&m.start())))
            .and_then(|m| parse_number(&m[1]))?;
        return missing_leg(a, c);
    }
    if let Some(m) = RE_LEGS.captures(text) {
        return hypotenuse(parse_number(&m[1])?, parse_number(&m[2])?);
    }
    if let Some(m) = RE_THREE_SIDES.captures(text) {
        return perimeter(
            parse_number(&m[1])?,
            parse_number(&m[2])?,
            parse_number(&m[3])?,
        );
    }

    let angles: Vec<f64> = RE_ANGLE
        .captures_iter(text)
        .filter_map(|c| parse_number(&c[1]))
        .collect();
    match (angles.as_slice(), right) {
        ([a, b, ..], _) => third_angle(*a, *b, false),
        ([a], true) => third_angle(*a, 90.0, true),
        _ => None,
    }
}

fn draw_steps(known: String, rule: &str) -> Vec<StepConfig> {
    vec![
        StepConfig::new("Draw the triangle").reveals("triangle"),
        StepConfig::new("Label what we know")
            .calculation(known)
            .reveals("labels"),
        StepConfig::new("Choose the rule")
            .calculation(rule.to_string())
            .reveals("rule"),
    ]
}

fn hypotenuse(a: f64, b: f64) -> Option<DiagramState> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }
    let sum = a * a + b * b;
    let c = round1(sum.sqrt());
    let mut steps = draw_steps(format!("a = {}, b = {}", fmt_num(a), fmt_num(b)), "a² + b² = c²");
    steps.push(
        StepConfig::new("Solve for the hypotenuse")
            .calculation(format!(
                "c = √({}² + {}²) = √{} = {}",
                fmt_num(a),
                fmt_num(b),
                fmt_num(sum),
                fmt_num(c)
            ))
            .reveals("answer"),
    );
    Some(right_triangle([Some(a), Some(b), Some(c)], "c", c, steps))
}

fn missing_leg(a: f64, c: f64) -> Option<DiagramState> {
    if a <= 0.0 || c <= a {
        return None;
    }
    let diff = c * c - a * a;
    let b = round1(diff.sqrt());
    let mut steps = draw_steps(format!("a = {}, c = {}", fmt_num(a), fmt_num(c)), "a² + b² = c²");
    steps.push(
        StepConfig::new("Solve for the missing leg")
            .calculation(format!(
                "b = √({}² − {}²) = √{} = {}",
                fmt_num(c),
                fmt_num(a),
                fmt_num(diff),
                fmt_num(b)
            ))
            .reveals("answer"),
    );
    Some(right_triangle([Some(a), Some(b), Some(c)], "b", b, steps))
}

fn right_triangle(sides: [Option<f64>; 3], solved_for: &str, answer: f64, steps: Vec<StepConfig>) -> DiagramState {
    DiagramState::new(
        DiagramData::Triangle(TriangleData {
            sides,
            angles: [None, None, Some(90.0)],
            right_angle: true,
            solved_for: solved_for.to_string(),
            answer,
        }),
        steps,
    )
}

fn perimeter(a: f64, b: f64, c: f64) -> Option<DiagramState> {
    let mut sorted = [a, b, c];
    sorted.sort_by(f64::total_cmp);
    if sorted[0] <= 0.0 || sorted[0] + sorted[1] <= sorted[2] {
        return None;
    }
    let is_right = (sorted[0].powi(2) + sorted[1].powi(2) - sorted[2].powi(2)).abs() < 1e-6;
    let p = a + b + c;
    let mut steps = draw_steps(
        format!("a = {}, b = {}, c = {}", fmt_num(a), fmt_num(b), fmt_num(c)),
        "P = a + b + c",
    );
    steps.push(
        StepConfig::new("Add the sides")
            .calculation(format!(
                "P = {} + {} + {} = {}",
                fmt_num(a),
                fmt_num(b),
                fmt_num(c),
                fmt_num(p)
            ))
            .reveals("answer"),
    );
    Some(DiagramState::new(
        DiagramData::Triangle(TriangleData {
            sides: [Some(sorted[0]), Some(sorted[1]), Some(sorted[2])],
            angles: [None, None, is_right.then_some(90.0)],
            right_angle: is_right,
            solved_for: "perimeter".into(),
            answer: p,
        }),
        steps,
    ))
}

fn third_angle(a: f64, b: f64, right: bool) -> Option<DiagramState> {
    let c = 180.0 - a - b;
    if a <= 0.0 || b <= 0.0 || c <= 0.0 {
        return None;
    }
    let mut steps = draw_steps(
        format!("A = {}°, B = {}°", fmt_num(a), fmt_num(b)),
        "A + B + C = 180°",
    );
    steps.push(
        StepConfig::new("Solve for the third angle")
            .calculation(format!(
                "C = 180° − {}° − {}° = {}°",
                fmt_num(a),
                fmt_num(b),
                fmt_num(c)
            ))
            .reveals("answer"),
    );
    Some(DiagramState::new(
        DiagramData::Triangle(TriangleData {
            sides: [None; 3],
            angles: [Some(a), Some(b), Some(c)],
            right_angle: right || [a, b, c].contains(&90.0),
            solved_for: "C".into(),
            answer: c,
        }),
        steps,
    ))
}
