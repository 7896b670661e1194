//! Fraction diagrams: simplification and the four operations.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagram::{DiagramData, DiagramState, StepConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `None` when the product overflows.
fn lcm(a: i64, b: i64) -> Option<i64> {
    (a / gcd(a, b)).checked_mul(b)?.checked_abs()
}

impl Fraction {
    /// `None` for a zero denominator or a part too large to negate. The
    /// sign is carried by the numerator.
    pub fn new(numerator: i64, denominator: i64) -> Option<Self> {
        if denominator == 0 || numerator == i64::MIN {
            return None;
        }
        let sign = denominator.signum();
        Some(Self {
            numerator: numerator.checked_mul(sign)?,
            denominator: denominator.checked_mul(sign)?,
        })
    }

    pub fn simplified(self) -> Self {
        let g = gcd(self.numerator, self.denominator).max(1);
        Self {
            numerator: self.numerator / g,
            denominator: self.denominator / g,
        }
    }

    fn scaled_to(self, denominator: i64) -> Option<Self> {
        let factor = denominator / self.denominator;
        Some(Self {
            numerator: self.numerator.checked_mul(factor)?,
            denominator,
        })
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractionOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl FractionOp {
    fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Add),
            "-" | "−" => Some(Self::Subtract),
            "×" | "*" | "x" => Some(Self::Multiply),
            "÷" => Some(Self::Divide),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "−",
            Self::Multiply => "×",
            Self::Divide => "÷",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FractionData {
    pub operands: Vec<Fraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<FractionOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_denominator: Option<i64>,
    /// Before simplification.
    pub result: Fraction,
    pub simplified: Fraction,
}

static RE_BINARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+)\s*/\s*(\d+)\s*([+\-−×*x÷])\s*(-?\d+)\s*/\s*(\d+)").unwrap()
});

static RE_OF_WHOLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s+of\s+(\d+)\b").unwrap());

static RE_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(-?\d+)\s*/\s*(\d+)").unwrap());

fn int(s: &str) -> Option<i64> {
    s.parse().ok()
}

/// Build a fraction diagram: a two-operand operation, "a/b of n", or a
/// single fraction to simplify, tried in that order.
pub fn build_fraction(text: &str) -> Option<DiagramState> {
    if let Some(c) = RE_BINARY.captures(text) {
        let left = Fraction::new(int(&c[1])?, int(&c[2])?)?;
        let right = Fraction::new(int(&c[4])?, int(&c[5])?)?;
        let op = FractionOp::from_symbol(&c[3])?;
        return operate(left, op, right);
    }
    if let Some(c) = RE_OF_WHOLE.captures(text) {
        let part = Fraction::new(int(&c[1])?, int(&c[2])?)?;
        let whole = Fraction::new(int(&c[3])?, 1)?;
        return operate(part, FractionOp::Multiply, whole);
    }
    let c = RE_SINGLE.captures(text)?;
    simplify_only(Fraction::new(int(&c[1])?, int(&c[2])?)?)
}

fn simplify_step(result: Fraction, simplified: Fraction) -> StepConfig {
    let calc = if result == simplified {
        format!("{result} is already in simplest form, so the answer is {result}")
    } else {
        let g = gcd(result.numerator, result.denominator);
        format!(
            "divide top and bottom by {g}: {result} = {simplified}, so the answer is {simplified}"
        )
    };
    StepConfig::new("Simplify").calculation(calc).reveals("simplified")
}

fn operate(left: Fraction, op: FractionOp, right: Fraction) -> Option<DiagramState> {
    let sym = op.symbol();
    let mut steps = vec![
        StepConfig::new("Draw both fractions")
            .calculation(format!("{left} {sym} {right}"))
            .reveals("operands"),
    ];
    let mut common_denominator = None;

    let result = match op {
        FractionOp::Add | FractionOp::Subtract => {
            let lcd = lcm(left.denominator, right.denominator)?;
            common_denominator = Some(lcd);
            let (l, r) = (left.scaled_to(lcd)?, right.scaled_to(lcd)?);
            let numerator = if op == FractionOp::Add {
                l.numerator.checked_add(r.numerator)?
            } else {
                l.numerator.checked_sub(r.numerator)?
            };
            let result = Fraction::new(numerator, lcd)?;
            steps.push(
                StepConfig::new(format!("Cut both into {lcd} equal parts"))
                    .calculation(format!("{left} = {}/{lcd}, {right} = {}/{lcd}", l.numerator, r.numerator))
                    .reveals("common-denominator"),
            );
            steps.push(
                StepConfig::new(if op == FractionOp::Add {
                    "Add the numerators"
                } else {
                    "Subtract the numerators"
                })
                .calculation(format!(
                    "{}/{lcd} {sym} {}/{lcd} = {numerator}/{lcd}",
                    l.numerator, r.numerator
                ))
                .reveals("result"),
            );
            result
        }
        FractionOp::Multiply => {
            let result = Fraction::new(
                left.numerator.checked_mul(right.numerator)?,
                left.denominator.checked_mul(right.denominator)?,
            )?;
            steps.push(
                StepConfig::new("Multiply tops and bottoms")
                    .calculation(format!(
                        "{left} × {right} = ({} × {})/({} × {}) = {}/{}",
                        left.numerator,
                        right.numerator,
                        left.denominator,
                        right.denominator,
                        result.numerator,
                        result.denominator
                    ))
                    .reveals("result"),
            );
            result
        }
        FractionOp::Divide => {
            let flipped = Fraction::new(right.denominator, right.numerator)?;
            let result = Fraction::new(
                left.numerator.checked_mul(flipped.numerator)?,
                left.denominator.checked_mul(flipped.denominator)?,
            )?;
            steps.push(
                StepConfig::new("Flip the second fraction and multiply")
                    .calculation(format!("{left} ÷ {right} = {left} × {flipped}"))
                    .reveals("reciprocal"),
            );
            steps.push(
                StepConfig::new("Multiply tops and bottoms")
                    .calculation(format!("{left} × {flipped} = {}/{}", result.numerator, result.denominator))
                    .reveals("result"),
            );
            result
        }
    };

    let simplified = result.simplified();
    steps.push(simplify_step(result, simplified));

    tracing::debug!(%left, %right, %simplified, "built fraction diagram");
    Some(DiagramState::new(
        DiagramData::Fraction(FractionData {
            operands: vec![left, right],
            operation: Some(op),
            common_denominator,
            result,
            simplified,
        }),
        steps,
    ))
}

fn simplify_only(fraction: Fraction) -> Option<DiagramState> {
    let simplified = fraction.simplified();
    let g = gcd(fraction.numerator, fraction.denominator);
    let steps = vec![
        StepConfig::new("Draw the fraction")
            .calculation(fraction.to_string())
            .reveals("operands"),
        StepConfig::new("Find the greatest common factor")
            .calculation(format!(
                "gcd({}, {}) = {g}",
                fraction.numerator.abs(),
                fraction.denominator
            ))
            .reveals("gcd"),
        simplify_step(fraction, simplified),
    ];
    Some(DiagramState::new(
        DiagramData::Fraction(FractionData {
            operands: vec![fraction],
            operation: None,
            common_denominator: None,
            result: fraction,
            simplified,
        }),
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(state: &DiagramState) -> &FractionData {
        let DiagramData::Fraction(d) = &state.data else {
            panic!("expected fraction data");
        };
        d
    }

    fn last_calc(state: &DiagramState) -> String {
        state.final_step().unwrap().show_calculation.clone().unwrap()
    }

    #[test]
    fn addition_uses_least_common_denominator() {
        let state = build_fraction("What is 1/4 + 1/6?").unwrap();
        let d = data(&state);
        assert_eq!(d.common_denominator, Some(12));
        assert_eq!(d.result, Fraction { numerator: 5, denominator: 12 });
        assert_eq!(
            state.step_config[1].show_calculation.as_deref(),
            Some("1/4 = 3/12, 1/6 = 2/12")
        );
        assert!(last_calc(&state).ends_with("the answer is 5/12"));
    }

    #[test]
    fn subtraction_then_simplify() {
        let state = build_fraction("3/4 - 1/4").unwrap();
        assert_eq!(data(&state).simplified, Fraction { numerator: 1, denominator: 2 });
        assert!(last_calc(&state).contains("2/4 = 1/2"));
    }

    #[test]
    fn multiplication() {
        let state = build_fraction("2/3 × 3/4").unwrap();
        assert_eq!(data(&state).result, Fraction { numerator: 6, denominator: 12 });
        assert!(last_calc(&state).ends_with("the answer is 1/2"));
        assert_eq!(state.total_steps, 3);
    }

    #[test]
    fn division_flips_divisor() {
        let state = build_fraction("1/2 ÷ 1/4").unwrap();
        assert_eq!(data(&state).simplified.to_string(), "2");
        assert_eq!(
            state.step_config[1].show_calculation.as_deref(),
            Some("1/2 ÷ 1/4 = 1/2 × 4")
        );
    }

    #[test]
    fn fraction_of_whole_number() {
        let state = build_fraction("What is 3/4 of 12?").unwrap();
        assert_eq!(data(&state).simplified.to_string(), "9");
    }

    #[test]
    fn simplify_single_fraction() {
        let state = build_fraction("Simplify 6/8").unwrap();
        assert_eq!(state.total_steps, 3);
        assert_eq!(
            state.step_config[1].show_calculation.as_deref(),
            Some("gcd(6, 8) = 2")
        );
        assert!(last_calc(&state).ends_with("the answer is 3/4"));
    }

    #[test]
    fn zero_denominators_rejected() {
        assert!(build_fraction("1/0 + 1/2").is_none());
        assert!(build_fraction("1/2 ÷ 0/3").is_none());
        assert!(build_fraction("no fractions").is_none());
    }

    #[test]
    fn overflowing_arithmetic_yields_nothing() {
        assert!(build_fraction("What is 1/99999999999 + 1/99999999998?").is_none());
        assert!(build_fraction("What is 9999999999/2 × 9999999999/3?").is_none());
        assert!(Fraction::new(i64::MIN, 1).is_none());
    }
}
