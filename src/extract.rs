//! Regex-driven extraction of numeric quantities from problem text.
//!
//! Each field owns an ordered cascade of `(pattern, extractor)` pairs. The
//! cascade is evaluated first-match-wins, and an extractor may veto a match
//! (returning `None`) so the cascade keeps looking. Fields are extracted
//! independently; nothing here cross-validates one field against another.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::analysis::excerpt;

/// Default gravitational acceleration (m/s²) used by classroom problems.
pub const DEFAULT_GRAVITY: f64 = 10.0;

// ── Number parsing ──────────────────────────────────────────────────────

/// Parse a decimal number, stripping thousands separators (`7,248` → 7248).
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative integer, stripping thousands separators.
pub fn parse_integer(raw: &str) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<u64>().ok()
}

// ── Pattern cascade ─────────────────────────────────────────────────────

type Extractor = fn(&str, &Captures<'_>) -> Option<f64>;

/// One candidate pattern for a numeric field.
struct FieldPattern {
    regex: &'static LazyLock<Regex>,
    extract: Extractor,
}

/// Run a cascade: the first pattern whose match the extractor accepts wins.
fn first_match(patterns: &[FieldPattern], text: &str) -> Option<f64> {
    patterns.iter().find_map(|p| {
        p.regex
            .captures_iter(text)
            .find_map(|caps| (p.extract)(text, &caps))
    })
}

fn capture_number(_text: &str, caps: &Captures<'_>) -> Option<f64> {
    caps.get(1).and_then(|m| parse_number(m.as_str()))
}

fn capture_grams(text: &str, caps: &Captures<'_>) -> Option<f64> {
    capture_number(text, caps).map(|g| g / 1000.0)
}

/// Rejects forces that are really a named tension, normal or friction force.
fn capture_applied(text: &str, caps: &Captures<'_>) -> Option<f64> {
    let whole = caps.get(0)?;
    let start = text.floor_char_boundary(whole.start().saturating_sub(12));
    let before = text[start..whole.start()].to_lowercase();
    if ["tension", "normal", "friction", "net"]
        .iter()
        .any(|w| before.contains(w))
    {
        return None;
    }
    capture_number(text, caps)
}

/// Friction coefficients above 2 are almost certainly something else.
fn capture_coefficient(text: &str, caps: &Captures<'_>) -> Option<f64> {
    capture_number(text, caps).filter(|mu| *mu <= 2.0)
}

/// A speed followed by `²` or `^2` is an acceleration, not a velocity.
fn capture_speed(text: &str, caps: &Captures<'_>) -> Option<f64> {
    match caps.get(2) {
        Some(suffix) if !suffix.as_str().is_empty() => None,
        _ => capture_number(text, caps),
    }
}

// ── Physics patterns ────────────────────────────────────────────────────

static RE_MASS_KG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:kg|kilograms?)\b").unwrap()
});

static RE_MASS_GRAMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:g|grams?)\b").unwrap()
});

static RE_MASS_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmass\s*(?:of\s+|is\s+|=\s*|:\s*)?(\d+(?:\.\d+)?)").unwrap()
});

static RE_ANGLE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:°|º|degrees?\b|deg\b)").unwrap()
});

static RE_ANGLE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:angle|inclined?|θ|theta)\s*(?:of\s+|is\s+|=\s*|at\s+)?(\d+(?:\.\d+)?)")
        .unwrap()
});

static RE_APPLIED_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:applied\s+force|push(?:es|ed|ing)?|pull(?:s|ed|ing)?|force)\b[^.\d]{0,30}?(\d+(?:\.\d+)?)\s*(?:n|newtons?)\b",
    )
    .unwrap()
});

static RE_APPLIED_UNIT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:n|newtons?)\s+(?:applied\s+)?(?:force|push|pull)\b")
        .unwrap()
});

static RE_TENSION_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btension\b[^.\d]{0,30}?(\d+(?:\.\d+)?)").unwrap()
});

static RE_TENSION_UNIT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:n|newtons?)\s+(?:of\s+)?tension\b").unwrap()
});

static RE_FRICTION_COEFFICIENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:coefficient\s+of\s+(?:kinetic\s+|static\s+)?friction|friction\s+coefficient|μ[ks]?|\bmu)\s*(?:is|of|=|:)?\s*(\d*\.\d+|\d+)",
    )
    .unwrap()
});

static RE_GRAVITY_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bg\s*=\s*(\d+(?:\.\d+)?)").unwrap()
});

static RE_GRAVITY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bgravity\b[^.\d]{0,20}?(\d+(?:\.\d+)?)\s*m/s").unwrap()
});

static RE_VELOCITY_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:m/s|meters?\s+per\s+second)(²|\^2|2)?").unwrap()
});

static RE_VELOCITY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:velocity|speed)\b[^.\d]{0,20}?(\d+(?:\.\d+)?)").unwrap()
});

static RE_HEIGHT_ADJECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:m|meters?|metres?)\s+(?:high|tall|above)\b").unwrap()
});

static RE_HEIGHT_NOUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:height|cliff|building|tower|table)\b[^.\d]{0,25}?(\d+(?:\.\d+)?)\s*(?:m|meters?|metres?)\b",
    )
    .unwrap()
});

static MASS_PATTERNS: &[FieldPattern] = &[
    FieldPattern { regex: &RE_MASS_KG, extract: capture_number },
    FieldPattern { regex: &RE_MASS_GRAMS, extract: capture_grams },
    FieldPattern { regex: &RE_MASS_WORD, extract: capture_number },
];

static ANGLE_PATTERNS: &[FieldPattern] = &[
    FieldPattern { regex: &RE_ANGLE_UNIT, extract: capture_number },
    FieldPattern { regex: &RE_ANGLE_WORD, extract: capture_number },
];

static APPLIED_PATTERNS: &[FieldPattern] = &[
    FieldPattern { regex: &RE_APPLIED_VERB, extract: capture_applied },
    FieldPattern { regex: &RE_APPLIED_UNIT_FIRST, extract: capture_number },
];

static TENSION_PATTERNS: &[FieldPattern] = &[
    FieldPattern { regex: &RE_TENSION_WORD, extract: capture_number },
    FieldPattern { regex: &RE_TENSION_UNIT_FIRST, extract: capture_number },
];

static FRICTION_PATTERNS: &[FieldPattern] = &[
    FieldPattern { regex: &RE_FRICTION_COEFFICIENT, extract: capture_coefficient },
];

static GRAVITY_PATTERNS: &[FieldPattern] = &[
    FieldPattern { regex: &RE_GRAVITY_SYMBOL, extract: capture_number },
    FieldPattern { regex: &RE_GRAVITY_WORD, extract: capture_number },
];

static VELOCITY_PATTERNS: &[FieldPattern] = &[
    FieldPattern { regex: &RE_VELOCITY_UNIT, extract: capture_speed },
    FieldPattern { regex: &RE_VELOCITY_WORD, extract: capture_number },
];

static HEIGHT_PATTERNS: &[FieldPattern] = &[
    FieldPattern { regex: &RE_HEIGHT_ADJECTIVE, extract: capture_number },
    FieldPattern { regex: &RE_HEIGHT_NOUN, extract: capture_number },
];

// ── PhysicsContext ──────────────────────────────────────────────────────

/// Numeric fields pulled out of a physics problem.
///
/// Every field but `gravity` is optional; builders substitute defaults for
/// whatever is missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicsContext {
    pub mass: Option<f64>,
    /// Degrees.
    pub angle: Option<f64>,
    pub applied_force: Option<f64>,
    pub friction_coefficient: Option<f64>,
    pub tension: Option<f64>,
    /// Launch speed in m/s.
    pub velocity: Option<f64>,
    /// Launch height in metres.
    pub height: Option<f64>,
    pub gravity: f64,
}

impl PhysicsContext {
    /// Extract every field from `text`. `default_gravity` applies when the
    /// text does not state `g`.
    pub fn extract(text: &str, default_gravity: f64) -> Self {
        let ctx = Self {
            mass: first_match(MASS_PATTERNS, text),
            angle: first_match(ANGLE_PATTERNS, text),
            applied_force: first_match(APPLIED_PATTERNS, text),
            friction_coefficient: first_match(FRICTION_PATTERNS, text),
            tension: first_match(TENSION_PATTERNS, text),
            velocity: first_match(VELOCITY_PATTERNS, text),
            height: first_match(HEIGHT_PATTERNS, text),
            gravity: first_match(GRAVITY_PATTERNS, text).unwrap_or(default_gravity),
        };
        tracing::debug!(text = excerpt(text), ?ctx, "extracted physics context");
        ctx
    }
}

// ── Division operands ───────────────────────────────────────────────────

/// Dividend and divisor of a division problem. `dividend >= divisor` always
/// holds for values produced by [`extract_division_numbers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionOperands {
    pub dividend: u64,
    pub divisor: u64,
}

/// Which capture group holds the divisor in a sentence's own framing.
#[derive(Debug, Clone, Copy)]
enum OperandOrder {
    DividendFirst,
    DivisorFirst,
}

struct DivisionPattern {
    regex: &'static LazyLock<Regex>,
    order: OperandOrder,
}

/// Integer with optional thousands separators.
const INT: &str = r"(\d{1,3}(?:,\d{3})+|\d+)";

static RE_DIV_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{INT}\s*[÷/]\s*{INT}")).unwrap());

static RE_DIV_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bdivide\s+{INT}\s+(?:by|into)\s+{INT}")).unwrap()
});

static RE_DIV_DIVIDED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i){INT}\s+divided\s+by\s+{INT}")).unwrap());

static RE_DIV_QUOTIENT_OF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bquotient\s+of\s+{INT}\s+and\s+{INT}")).unwrap()
});

static RE_DIV_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{INT}\s*[)|]\s*{INT}")).unwrap());

static RE_DIV_AMONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){INT}\s+(?:[a-z]+\s+){{0,5}}?(?:among|between|into|across)\s+(?:the\s+)?{INT}"
    ))
    .unwrap()
});

static RE_DIV_REVERSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){INT}\s+(?:boxes|groups|bags|teams|rows|students|friends|children|people|shelves|tables|baskets|classes|buses)\b[^\d]*?{INT}"
    ))
    .unwrap()
});

static DIVISION_PATTERNS: &[DivisionPattern] = &[
    DivisionPattern { regex: &RE_DIV_SYMBOL, order: OperandOrder::DividendFirst },
    DivisionPattern { regex: &RE_DIV_VERB, order: OperandOrder::DividendFirst },
    DivisionPattern { regex: &RE_DIV_DIVIDED_BY, order: OperandOrder::DividendFirst },
    DivisionPattern { regex: &RE_DIV_QUOTIENT_OF, order: OperandOrder::DividendFirst },
    DivisionPattern { regex: &RE_DIV_BRACKET, order: OperandOrder::DivisorFirst },
    DivisionPattern { regex: &RE_DIV_AMONG, order: OperandOrder::DividendFirst },
    DivisionPattern { regex: &RE_DIV_REVERSED, order: OperandOrder::DivisorFirst },
];

/// Extract `{dividend, divisor}` from a division problem statement.
///
/// Supports symbol notation (`÷`, `/`), "divide X by Y", "X divided by Y",
/// long-division bracket layouts (`8 ) 7248`), "X items among Y groups" and
/// reversed framings ("8 boxes hold 7,248 crayons"). The larger value is
/// always the dividend. Returns `None` when no pattern matches or the
/// divisor would be zero.
pub fn extract_division_numbers(text: &str) -> Option<DivisionOperands> {
    let operands = DIVISION_PATTERNS.iter().find_map(|p| {
        let caps = p.regex.captures(text)?;
        let first = parse_integer(caps.get(1)?.as_str())?;
        let second = parse_integer(caps.get(2)?.as_str())?;
        let (dividend, divisor) = match p.order {
            OperandOrder::DividendFirst => (first, second),
            OperandOrder::DivisorFirst => (second, first),
        };
        Some(if dividend < divisor {
            DivisionOperands {
                dividend: divisor,
                divisor: dividend,
            }
        } else {
            DivisionOperands { dividend, divisor }
        })
    });

    match operands {
        Some(ops) if ops.divisor == 0 => {
            tracing::debug!(text = excerpt(text), "division operands rejected: zero divisor");
            None
        }
        Some(ops) => {
            tracing::debug!(dividend = ops.dividend, divisor = ops.divisor, "extracted division operands");
            Some(ops)
        }
        None => {
            tracing::debug!(text = excerpt(text), "no division operands found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(dividend: u64, divisor: u64) -> Option<DivisionOperands> {
        Some(DivisionOperands { dividend, divisor })
    }

    // ── Number parsing ──────────────────────────────────────────────

    #[test]
    fn parse_strips_thousands_separators() {
        assert_eq!(parse_number("7,248"), Some(7248.0));
        assert_eq!(parse_integer("1,000,000"), Some(1_000_000));
        assert_eq!(parse_number("0.25"), Some(0.25));
        assert_eq!(parse_integer("abc"), None);
    }

    // ── Division operands ───────────────────────────────────────────

    #[test]
    fn division_symbol_notation() {
        assert_eq!(extract_division_numbers("7,248 ÷ 8"), ops(7248, 8));
        assert_eq!(extract_division_numbers("What is 144/12?"), ops(144, 12));
    }

    #[test]
    fn division_word_forms() {
        assert_eq!(extract_division_numbers("divide 456 by 12"), ops(456, 12));
        assert_eq!(extract_division_numbers("What is 96 divided by 4?"), ops(96, 4));
        assert_eq!(
            extract_division_numbers("Find the quotient of 625 and 5"),
            ops(625, 5)
        );
    }

    #[test]
    fn division_word_problem_framing() {
        assert_eq!(
            extract_division_numbers("7,248 crayons among 8 boxes"),
            ops(7248, 8)
        );
        assert_eq!(
            extract_division_numbers("48 cookies are shared equally among 6 friends"),
            ops(48, 6)
        );
    }

    #[test]
    fn division_reversed_framing_swaps() {
        assert_eq!(
            extract_division_numbers("8 boxes need to hold 7,248 crayons"),
            ops(7248, 8)
        );
    }

    #[test]
    fn division_bracket_layout() {
        assert_eq!(extract_division_numbers("8 ) 7248"), ops(7248, 8));
        assert_eq!(extract_division_numbers("12 | 456"), ops(456, 12));
    }

    #[test]
    fn division_smaller_first_is_swapped() {
        assert_eq!(extract_division_numbers("divide 8 by 7248"), ops(7248, 8));
    }

    #[test]
    fn division_no_match() {
        assert_eq!(extract_division_numbers("What is photosynthesis?"), None);
        assert_eq!(extract_division_numbers("divide 0 by 0"), None);
    }

    // ── Physics fields ──────────────────────────────────────────────

    #[test]
    fn physics_mass_and_angle() {
        let ctx = PhysicsContext::extract(
            "A 5 kg block rests on a ramp inclined at 30° to the horizontal.",
            DEFAULT_GRAVITY,
        );
        assert_eq!(ctx.mass, Some(5.0));
        assert_eq!(ctx.angle, Some(30.0));
        assert_eq!(ctx.gravity, 10.0);
    }

    #[test]
    fn physics_mass_in_grams() {
        let ctx = PhysicsContext::extract("A 500 g cart", DEFAULT_GRAVITY);
        assert_eq!(ctx.mass, Some(0.5));
    }

    #[test]
    fn physics_applied_force_and_friction() {
        let ctx = PhysicsContext::extract(
            "A 10 kg box is pushed with a force of 40 N. The coefficient of friction is 0.2.",
            DEFAULT_GRAVITY,
        );
        assert_eq!(ctx.applied_force, Some(40.0));
        assert_eq!(ctx.friction_coefficient, Some(0.2));
        assert_eq!(ctx.tension, None);
    }

    #[test]
    fn physics_tension_is_not_applied_force() {
        let ctx = PhysicsContext::extract(
            "A rope exerts a tension force of 25 N on a 3 kg sled.",
            DEFAULT_GRAVITY,
        );
        assert_eq!(ctx.tension, Some(25.0));
        assert_eq!(ctx.applied_force, None);
    }

    #[test]
    fn physics_gravity_override() {
        let ctx = PhysicsContext::extract("Use g = 9.8 for a 2 kg mass.", DEFAULT_GRAVITY);
        assert_eq!(ctx.gravity, 9.8);
    }

    #[test]
    fn physics_projectile_fields() {
        let ctx = PhysicsContext::extract(
            "A ball is thrown at 20 m/s at an angle of 45 degrees from a cliff 15 m high.",
            DEFAULT_GRAVITY,
        );
        assert_eq!(ctx.velocity, Some(20.0));
        assert_eq!(ctx.angle, Some(45.0));
        assert_eq!(ctx.height, Some(15.0));
    }

    #[test]
    fn acceleration_is_not_velocity() {
        let ctx = PhysicsContext::extract("gravity is 9.8 m/s²", DEFAULT_GRAVITY);
        assert_eq!(ctx.velocity, None);
        assert_eq!(ctx.gravity, 9.8);
    }

    #[test]
    fn physics_nothing_found() {
        let ctx = PhysicsContext::extract("Draw the forces on a book on a table.", DEFAULT_GRAVITY);
        assert_eq!(ctx.mass, None);
        assert_eq!(ctx.applied_force, None);
        assert_eq!(ctx.gravity, DEFAULT_GRAVITY);
    }
}
