//! Equation-balance diagrams for one-variable linear equations.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::diagram::{DiagramData, DiagramState, StepConfig, fmt_num};
use crate::extract::parse_number;

/// `a·x + b = c`, solved by inverse operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquationData {
    /// The equation as the student sees it.
    pub equation: String,
    pub variable: String,
    pub coefficient: f64,
    pub constant: f64,
    pub rhs: f64,
    pub solution: f64,
    /// Both sides after each inverse operation.
    #[serde(default)]
    pub transformations: Vec<String>,
}

// `3x + 5 = 20`, `x - 7 = 3`, `-2x = 10`. The leading class keeps the
// variable from being the tail of a word.
static RE_LINEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[^a-z\d.])(-?\d+(?:\.\d+)?|-)?\s*\*?\s*([a-z])\s*(?:([+\-−])\s*(\d+(?:\.\d+)?)\s*)?=\s*(-?\d+(?:\.\d+)?)",
    )
    .unwrap()
});

// `12 × 3 = x`
static RE_ARITHMETIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*([+\-−×*÷/])\s*(-?\d+(?:\.\d+)?)\s*=\s*\b([a-zA-Z])\b").unwrap()
});

fn term(coefficient: f64, variable: &str) -> String {
    if coefficient == 1.0 {
        variable.to_string()
    } else if coefficient == -1.0 {
        format!("-{variable}")
    } else {
        format!("{}{variable}", fmt_num(coefficient))
    }
}

fn with_constant(lhs: &str, constant: f64) -> String {
    if constant > 0.0 {
        format!("{lhs} + {}", fmt_num(constant))
    } else if constant < 0.0 {
        format!("{lhs} − {}", fmt_num(-constant))
    } else {
        lhs.to_string()
    }
}

fn parse_linear(caps: &Captures) -> Option<(f64, String, f64, f64)> {
    let coefficient = match caps.get(1).map(|m| m.as_str()) {
        None => 1.0,
        Some("-") => -1.0,
        Some(raw) => parse_number(raw)?,
    };
    let variable = caps[2].to_lowercase();
    let constant = match (caps.get(3), caps.get(4)) {
        (Some(sign), Some(value)) => {
            let v = parse_number(value.as_str())?;
            if sign.as_str() == "+" { v } else { -v }
        }
        _ => 0.0,
    };
    let rhs = parse_number(&caps[5])?;
    Some((coefficient, variable, constant, rhs))
}

/// Build a balance diagram from the first solvable equation in `text`.
pub fn build_equation(text: &str) -> Option<DiagramState> {
    if let Some(caps) = RE_LINEAR.captures(text) {
        let (a, variable, b, c) = parse_linear(&caps)?;
        if a == 0.0 {
            return None;
        }
        return Some(solve_linear(a, &variable, b, c));
    }
    let caps = RE_ARITHMETIC.captures(text)?;
    solve_arithmetic(&caps)
}

fn solve_linear(a: f64, variable: &str, b: f64, c: f64) -> DiagramState {
    let solution = (c - b) / a;
    let lhs = with_constant(&term(a, variable), b);
    let equation = format!("{lhs} = {}", fmt_num(c));

    let mut steps = vec![
        StepConfig::new("Write the equation as a balance")
            .calculation(equation.clone())
            .reveals("equation"),
    ];
    let mut transformations = Vec::new();

    let isolated = c - b;
    if b != 0.0 {
        let (verb, op) = if b > 0.0 { ("Subtract", "−") } else { ("Add", "+") };
        let after = format!("{} = {}", term(a, variable), fmt_num(isolated));
        steps.push(
            StepConfig::new(format!("{verb} {} on both sides", fmt_num(b.abs())))
                .calculation(format!(
                    "{lhs} {op} {k} = {c} {op} {k}, so {after}",
                    k = fmt_num(b.abs()),
                    c = fmt_num(c),
                ))
                .reveals("constant"),
        );
        transformations.push(after);
    }
    if a != 1.0 {
        let after = format!("{variable} = {}", fmt_num(solution));
        steps.push(
            StepConfig::new(format!("Divide both sides by {}", fmt_num(a)))
                .calculation(format!(
                    "{} ÷ {k} = {} ÷ {k}, so {after}",
                    term(a, variable),
                    fmt_num(isolated),
                    k = fmt_num(a),
                ))
                .reveals("coefficient"),
        );
        transformations.push(after);
    }
    steps.push(
        StepConfig::new("Check by substituting back")
            .calculation(format!(
                "{} = {} ✓, so {variable} = {}",
                with_constant(&format!("{} × {}", fmt_num(a), fmt_num(solution)), b),
                fmt_num(c),
                fmt_num(solution),
            ))
            .reveals("solution"),
    );

    tracing::debug!(%equation, solution, "built equation diagram");
    DiagramState::new(
        DiagramData::Equation(EquationData {
            equation,
            variable: variable.to_string(),
            coefficient: a,
            constant: b,
            rhs: c,
            solution,
            transformations,
        }),
        steps,
    )
}

fn solve_arithmetic(caps: &Captures) -> Option<DiagramState> {
    let left = parse_number(&caps[1])?;
    let right = parse_number(&caps[3])?;
    let op = &caps[2];
    let variable = caps[4].to_lowercase();
    let (result, symbol) = match op {
        "+" => (left + right, "+"),
        "-" | "−" => (left - right, "−"),
        "×" | "*" => (left * right, "×"),
        _ if right == 0.0 => return None,
        _ => (left / right, "÷"),
    };

    let expression = format!("{} {symbol} {}", fmt_num(left), fmt_num(right));
    let equation = format!("{expression} = {variable}");
    let steps = vec![
        StepConfig::new("Write the equation")
            .calculation(equation.clone())
            .reveals("equation"),
        StepConfig::new("Work out the left side")
            .calculation(format!(
                "{expression} = {}, so {variable} = {}",
                fmt_num(result),
                fmt_num(result)
            ))
            .reveals("solution"),
    ];

    Some(DiagramState::new(
        DiagramData::Equation(EquationData {
            equation,
            variable: variable.clone(),
            coefficient: 1.0,
            constant: 0.0,
            rhs: result,
            solution: result,
            transformations: vec![format!("{variable} = {}", fmt_num(result))],
        }),
        steps,
    ))
}
