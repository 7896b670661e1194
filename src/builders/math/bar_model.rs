//! Bar-model (tape) diagrams for comparison word problems.
//!
//! Three shapes are recognised: "A has N times as many as B", "A has N
//! more/fewer than B", and two stated quantities. A total or one stated
//! quantity then pins down the unknowns.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagram::{DiagramData, DiagramState, StepConfig, fmt_num};
use crate::extract::parse_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    /// Drawn length, in units.
    pub units: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarModelData {
    pub bars: Vec<Bar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_value: Option<f64>,
}

const VERBS: &str = r"(?:has|had|have|owns|collected|scored|saved|made|read|sold|baked|picked)";

static RE_TIMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b([a-z]+)\s+{VERBS}\s+(\d+(?:\.\d+)?)\s+times\s+as\s+(?:many|much)\b[^.]*?\bas\s+([a-z]+)"
    ))
    .unwrap()
});

static RE_DIFFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b([a-z]+)\s+{VERBS}\s+(\d+(?:\.\d+)?)\s+(more|fewer|less)\b[^.]*?\bthan\s+([a-z]+)"
    ))
    .unwrap()
});

static RE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b([a-z]+)\s+{VERBS}\s+(\d+(?:\.\d+)?)\s+([a-z]+)")).unwrap()
});

static RE_TOTAL_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:together|altogether|combined|in\s+all|in\s+total|total\s+of)\b\D{0,30}?(\d+(?:\.\d+)?)")
        .unwrap()
});

static RE_TOTAL_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s+(?:[a-z]+\s+){0,2}(?:altogether|in\s+all|in\s+total|combined)\b")
        .unwrap()
});

fn name(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn total_in(text: &str) -> Option<f64> {
    [&RE_TOTAL_BEFORE, &RE_TOTAL_AFTER]
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| parse_number(&c[1])))
}

/// Quantities stated outright ("Tom has 12 marbles"), keyed by name.
fn stated_values(text: &str) -> HashMap<String, f64> {
    RE_VALUE
        .captures_iter(text)
        .filter(|c| {
            !matches!(
                c[3].to_lowercase().as_str(),
                "times" | "more" | "fewer" | "less"
            )
        })
        .filter_map(|c| Some((name(&c[1]), parse_number(&c[2])?)))
        .collect()
}

/// Build a bar model from a two-quantity comparison problem.
pub fn build_bar_model(text: &str) -> Option<DiagramState> {
    let total = total_in(text);
    let stated = stated_values(text);

    if let Some(c) = RE_TIMES.captures(text) {
        let (big, small) = (name(&c[1]), name(&c[3]));
        let factor = parse_number(&c[2])?;
        if factor <= 0.0 {
            return None;
        }
        return times_model(&big, factor, &small, total, &stated);
    }
    if let Some(c) = RE_DIFFERENCE.captures(text) {
        let (subject, other) = (name(&c[1]), name(&c[4]));
        let diff = parse_number(&c[2])?;
        let subject_larger = c[3].eq_ignore_ascii_case("more");
        return difference_model(&subject, subject_larger, diff, &other, total, &stated);
    }
    two_values_model(text)
}

fn times_model(
    big: &str,
    factor: f64,
    small: &str,
    total: Option<f64>,
    stated: &HashMap<String, f64>,
) -> Option<DiagramState> {
    let f = fmt_num(factor);
    let (unit, unit_calc) = if let Some(total) = total {
        let units = factor + 1.0;
        let unit = total / units;
        (
            unit,
            format!(
                "{f} + 1 = {} units, {} ÷ {} = {} per unit",
                fmt_num(units),
                fmt_num(total),
                fmt_num(units),
                fmt_num(unit)
            ),
        )
    } else if let Some(&v) = stated.get(small) {
        (v, format!("1 unit = {small}'s {}", fmt_num(v)))
    } else if let Some(&v) = stated.get(big) {
        let unit = v / factor;
        (unit, format!("{} ÷ {f} = {} per unit", fmt_num(v), fmt_num(unit)))
    } else {
        return None;
    };

    let big_value = factor * unit;
    let bars = vec![
        Bar {
            label: big.to_string(),
            units: factor,
            value: big_value,
        },
        Bar {
            label: small.to_string(),
            units: 1.0,
            value: unit,
        },
    ];
    let steps = vec![
        StepConfig::new(format!("Draw one unit for {small}")).reveals(format!("bar-{small}")),
        StepConfig::new(format!("Draw {f} units for {big}")).reveals(format!("bar-{big}")),
        StepConfig::new(if total.is_some() { "Bracket the total" } else { "Label the known bar" })
            .calculation(match total {
                Some(t) => format!("total = {}", fmt_num(t)),
                None => unit_calc.clone(),
            })
            .reveals("bracket"),
        StepConfig::new("Find one unit")
            .calculation(unit_calc)
            .reveals("unit"),
        StepConfig::new("Answer")
            .calculation(format!(
                "{small} = {}, {big} = {f} × {} = {}",
                fmt_num(unit),
                fmt_num(unit),
                fmt_num(big_value)
            ))
            .reveals("answer"),
    ];
    Some(DiagramState::new(
        DiagramData::BarModel(BarModelData {
            bars,
            total: Some(total.unwrap_or(big_value + unit)),
            difference: None,
            unit_value: Some(unit),
        }),
        steps,
    ))
}

fn difference_model(
    subject: &str,
    subject_larger: bool,
    diff: f64,
    other: &str,
    total: Option<f64>,
    stated: &HashMap<String, f64>,
) -> Option<DiagramState> {
    let (larger, smaller) = if subject_larger {
        (subject, other)
    } else {
        (other, subject)
    };

    let (large_value, small_value, solve_calc) = if let Some(total) = total {
        let small = (total - diff) / 2.0;
        (
            small + diff,
            small,
            format!(
                "({} − {}) ÷ 2 = {}",
                fmt_num(total),
                fmt_num(diff),
                fmt_num(small)
            ),
        )
    } else if let Some(&v) = stated.get(smaller) {
        (v + diff, v, format!("{} + {} = {}", fmt_num(v), fmt_num(diff), fmt_num(v + diff)))
    } else if let Some(&v) = stated.get(larger) {
        (v, v - diff, format!("{} − {} = {}", fmt_num(v), fmt_num(diff), fmt_num(v - diff)))
    } else {
        return None;
    };
    if small_value < 0.0 {
        return None;
    }

    let bars = vec![
        Bar {
            label: larger.to_string(),
            units: large_value,
            value: large_value,
        },
        Bar {
            label: smaller.to_string(),
            units: small_value,
            value: small_value,
        },
    ];
    let steps = vec![
        StepConfig::new(format!("Draw {smaller}'s bar")).reveals(format!("bar-{smaller}")),
        StepConfig::new(format!("Draw {larger}'s bar, {} longer", fmt_num(diff)))
            .reveals(format!("bar-{larger}")),
        StepConfig::new("Mark the difference")
            .calculation(format!("difference = {}", fmt_num(diff)))
            .reveals("difference"),
        StepConfig::new("Work out the unknown bar")
            .calculation(solve_calc)
            .reveals("unit"),
        StepConfig::new("Answer")
            .calculation(format!(
                "{smaller} = {}, {larger} = {}",
                fmt_num(small_value),
                fmt_num(large_value)
            ))
            .reveals("answer"),
    ];
    Some(DiagramState::new(
        DiagramData::BarModel(BarModelData {
            bars,
            total: Some(total.unwrap_or(large_value + small_value)),
            difference: Some(diff),
            unit_value: None,
        }),
        steps,
    ))
}

fn two_values_model(text: &str) -> Option<DiagramState> {
    let mut found: Vec<(String, f64)> = Vec::new();
    for c in RE_VALUE.captures_iter(text) {
        if matches!(c[3].to_lowercase().as_str(), "times" | "more" | "fewer" | "less") {
            continue;
        }
        let label = name(&c[1]);
        if found.iter().any(|(l, _)| *l == label) {
            continue;
        }
        found.push((label, parse_number(&c[2])?));
    }
    let [(a, av), (b, bv)] = <[(String, f64); 2]>::try_from(found.get(..2)?.to_vec()).ok()?;

    let (diff, total) = ((av - bv).abs(), av + bv);
    let bars = vec![
        Bar {
            label: a.clone(),
            units: av,
            value: av,
        },
        Bar {
            label: b.clone(),
            units: bv,
            value: bv,
        },
    ];
    let steps = vec![
        StepConfig::new(format!("Draw {a}'s bar"))
            .calculation(format!("{a} = {}", fmt_num(av)))
            .reveals(format!("bar-{a}")),
        StepConfig::new(format!("Draw {b}'s bar"))
            .calculation(format!("{b} = {}", fmt_num(bv)))
            .reveals(format!("bar-{b}")),
        StepConfig::new("Compare the bars")
            .calculation(format!(
                "difference = {}, total = {}",
                fmt_num(diff),
                fmt_num(total)
            ))
            .reveals("answer"),
    ];
    Some(DiagramState::new(
        DiagramData::BarModel(BarModelData {
            bars,
            total: Some(total),
            difference: Some(diff),
            unit_value: None,
        }),
        steps,
    ))
}
