//! Digit-by-digit long-division simulator.
//!
//! Produces the full trace a student writes on paper: setup, then for each
//! quotient position a divide/multiply/subtract cycle followed by either a
//! bring-down or the terminal remainder/complete row. Positions index the
//! dividend's digits, so the quotient digits (leading zeros included) line
//! up column for column with the dividend.
//!
//! Zero quotient digits are always emitted explicitly, both for leading
//! positions where the divisor does not yet fit and for interior positions
//! after a bring-down (`7248 ÷ 8` yields the digits `0 9 0 6`).

use serde::{Deserialize, Serialize};

use crate::error::DivisionError;

/// Kind of row in a long-division trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Setup,
    Divide,
    Multiply,
    Subtract,
    BringDown,
    Remainder,
    Complete,
}

/// One row of a long-division trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongDivisionStep {
    /// Monotonic index from 0.
    pub step: usize,
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Dividend digit index this row belongs to.
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotient_digit: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
    pub explanation: String,
}

impl LongDivisionStep {
    fn new(kind: StepKind, position: usize, explanation: String) -> Self {
        Self {
            step: 0,
            kind,
            position,
            working_number: None,
            quotient_digit: None,
            product: None,
            difference: None,
            calculation: None,
            explanation,
        }
    }
}

/// Complete result of simulating one division problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionTrace {
    pub dividend: u64,
    pub divisor: u64,
    pub quotient: u64,
    pub remainder: u64,
    pub steps: Vec<LongDivisionStep>,
}

impl DivisionTrace {
    /// Quotient digits by position, leading zeros included.
    pub fn quotient_digits(&self) -> Vec<u8> {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::Divide)
            .filter_map(|s| s.quotient_digit)
            .collect()
    }

    /// Quotient rebuilt from the trace's divide rows.
    pub fn quotient_from_steps(&self) -> u64 {
        self.quotient_digits()
            .iter()
            .fold(0u64, |acc, d| acc * 10 + u64::from(*d))
    }

    /// Remainder as recorded by the trace's final subtract row.
    pub fn remainder_from_steps(&self) -> Option<u64> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.kind == StepKind::Subtract)
            .and_then(|s| s.difference)
    }

    /// Rows belonging to one dividend position.
    pub fn steps_at(&self, position: usize) -> impl Iterator<Item = &LongDivisionStep> {
        self.steps.iter().filter(move |s| s.position == position)
    }

    /// `"906"` or `"906 R 3"`.
    pub fn answer(&self) -> String {
        if self.remainder == 0 {
            self.quotient.to_string()
        } else {
            format!("{} R {}", self.quotient, self.remainder)
        }
    }
}

fn digits_of(n: u64) -> Vec<u64> {
    n.to_string()
        .bytes()
        .map(|b| u64::from(b - b'0'))
        .collect()
}

/// Simulate long division of `dividend` by `divisor`.
///
/// Deterministic: equal inputs always yield equal traces. A dividend of 0 or
/// one smaller than the divisor still terminates with a well-formed trace.
pub fn simulate(dividend: u64, divisor: u64) -> Result<DivisionTrace, DivisionError> {
    if divisor == 0 {
        return Err(DivisionError::ZeroDivisor { dividend });
    }

    let digits = digits_of(dividend);
    let mut steps = Vec::new();

    // Setup: take leading digits until the divisor fits, or all of them.
    let mut taken = 1;
    let mut working = digits[0];
    while working < divisor && taken < digits.len() {
        working = working * 10 + digits[taken];
        taken += 1;
    }

    let mut setup = LongDivisionStep::new(
        StepKind::Setup,
        0,
        if taken == 1 {
            format!("Write {divisor} outside the bracket and {dividend} inside. Start with the first digit, {working}.")
        } else if working >= divisor {
            format!("{divisor} does not fit into the first digit, so start with the first {taken} digits: {working}.")
        } else {
            format!("{divisor} is larger than {dividend}, so the quotient is 0.")
        },
    );
    setup.working_number = Some(working);
    steps.push(setup);

    // Leading positions absorbed by setup each get an explicit zero digit.
    let mut prefix = 0u64;
    for (position, digit) in digits.iter().enumerate().take(taken - 1) {
        prefix = prefix * 10 + digit;
        let mut row = LongDivisionStep::new(
            StepKind::Divide,
            position,
            format!("{divisor} goes into {prefix} zero times, so write 0 above this digit."),
        );
        row.working_number = Some(prefix);
        row.quotient_digit = Some(0);
        row.calculation = Some(format!("{prefix} ÷ {divisor} = 0"));
        steps.push(row);
    }

    let mut position = taken - 1;
    loop {
        let q = working / divisor;
        let product = q * divisor;
        let difference = working - product;

        let mut divide = LongDivisionStep::new(
            StepKind::Divide,
            position,
            if q == 0 {
                format!("{divisor} does not go into {working}, so write 0 in the quotient.")
            } else {
                format!("How many times does {divisor} go into {working}? {q} times.")
            },
        );
        divide.working_number = Some(working);
        divide.quotient_digit = Some(q as u8);
        divide.calculation = Some(format!("{working} ÷ {divisor} = {q}"));
        steps.push(divide);

        let mut multiply = LongDivisionStep::new(
            StepKind::Multiply,
            position,
            format!("Multiply the quotient digit by the divisor: {q} × {divisor} = {product}."),
        );
        multiply.quotient_digit = Some(q as u8);
        multiply.product = Some(product);
        multiply.calculation = Some(format!("{q} × {divisor} = {product}"));
        steps.push(multiply);

        let mut subtract = LongDivisionStep::new(
            StepKind::Subtract,
            position,
            format!("Subtract {product} from {working} to get {difference}."),
        );
        subtract.working_number = Some(working);
        subtract.product = Some(product);
        subtract.difference = Some(difference);
        subtract.calculation = Some(format!("{working} − {product} = {difference}"));
        steps.push(subtract);

        if position + 1 < digits.len() {
            position += 1;
            let next = digits[position];
            working = difference * 10 + next;
            let mut bring = LongDivisionStep::new(
                StepKind::BringDown,
                position,
                format!("Bring down the next digit, {next}, to make {working}."),
            );
            bring.working_number = Some(working);
            bring.difference = Some(difference);
            steps.push(bring);
        } else {
            let quotient = dividend / divisor;
            let mut last = if difference > 0 {
                LongDivisionStep::new(
                    StepKind::Remainder,
                    position,
                    format!("No digits are left. The remainder is {difference}."),
                )
            } else {
                LongDivisionStep::new(
                    StepKind::Complete,
                    position,
                    "No digits are left and nothing remains. The division is complete.".to_string(),
                )
            };
            last.difference = Some(difference);
            last.calculation = Some(if difference > 0 {
                format!("{dividend} ÷ {divisor} = {quotient} R {difference}")
            } else {
                format!("{dividend} ÷ {divisor} = {quotient}")
            });
            steps.push(last);
            break;
        }
    }

    for (i, step) in steps.iter_mut().enumerate() {
        step.step = i;
    }

    let trace = DivisionTrace {
        dividend,
        divisor,
        quotient: dividend / divisor,
        remainder: dividend % divisor,
        steps,
    };
    debug_assert_eq!(trace.quotient_from_steps(), trace.quotient);
    tracing::debug!(dividend, divisor, rows = trace.steps.len(), "simulated long division");
    Ok(trace)
}
