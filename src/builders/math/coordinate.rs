//! Coordinate-plane diagrams: lines, parabolas and plotted points.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::diagram::{DiagramData, DiagramState, StepConfig, fmt_num, round1};
use crate::extract::parse_number;

/// A function graphed on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlotFunction {
    Linear { slope: f64, intercept: f64 },
    Quadratic { a: f64, b: f64, c: f64 },
}

impl PlotFunction {
    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            Self::Linear { slope, intercept } => slope * x + intercept,
            Self::Quadratic { a, b, c } => a * x * x + b * x + c,
        }
    }

    /// `y = 2x + 3`, `y = x² − 4`.
    pub fn expression(&self) -> String {
        let mut out = String::from("y =");
        let terms: Vec<(f64, &str)> = match *self {
            Self::Linear { slope, intercept } => vec![(slope, "x"), (intercept, "")],
            Self::Quadratic { a, b, c } => vec![(a, "x²"), (b, "x"), (c, "")],
        };
        let mut first = true;
        for (coef, var) in terms {
            if coef == 0.0 && !(first && var.is_empty()) {
                continue;
            }
            let magnitude = if !var.is_empty() && coef.abs() == 1.0 {
                String::new()
            } else {
                fmt_num(coef.abs())
            };
            match (first, coef < 0.0) {
                (true, true) => out.push_str(&format!(" -{magnitude}{var}")),
                (true, false) => out.push_str(&format!(" {magnitude}{var}")),
                (false, true) => out.push_str(&format!(" − {magnitude}{var}")),
                (false, false) => out.push_str(&format!(" + {magnitude}{var}")),
            }
            first = false;
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

impl LabeledPoint {
    fn new(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            label: label.into(),
            x: round1(x),
            y: round1(y),
        }
    }

    fn coords(&self) -> String {
        format!("({}, {})", fmt_num(self.x), fmt_num(self.y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatePlaneData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<PlotFunction>,
    #[serde(default)]
    pub points: Vec<LabeledPoint>,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    /// Intercepts, vertex, roots.
    #[serde(default)]
    pub features: Vec<LabeledPoint>,
}

// Quadratic before linear: `y = x² - 4` also starts like a line.
static RE_QUADRATIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\by\s*=\s*(-?\d*\.?\d*)\s*x\s*(?:²|\^\s*2)(?:\s*([+\-−])\s*(\d*\.?\d*)\s*x\b)?(?:\s*([+\-−])\s*(\d+(?:\.\d+)?))?",
    )
    .unwrap()
});

static RE_LINEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\by\s*=\s*(-?\d*\.?\d*)\s*x\b(?:\s*([+\-−])\s*(\d+(?:\.\d+)?))?").unwrap()
});

static RE_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*\)").unwrap()
});

/// `""` is 1, `"-"` is -1.
fn coefficient(raw: Option<&str>) -> Option<f64> {
    match raw.unwrap_or("") {
        "" => Some(1.0),
        "-" => Some(-1.0),
        s => parse_number(s),
    }
}

fn signed(caps: &Captures, sign: usize, value: usize, bare_is_one: bool) -> Option<f64> {
    let Some(sign) = caps.get(sign) else {
        return Some(0.0);
    };
    let raw = caps.get(value).map_or("", |m| m.as_str());
    let v = if raw.is_empty() && bare_is_one {
        1.0
    } else {
        parse_number(raw)?
    };
    Some(if sign.as_str() == "+" { v } else { -v })
}

/// Range covering `values` with one unit of margin, never narrower than
/// -5..5.
fn fit_range(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((-5.0f64, 5.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    [(lo - 1.0).floor(), (hi + 1.0).ceil()]
}

/// Build a coordinate-plane diagram from a function or a list of points.
pub fn build_coordinate_plane(text: &str) -> Option<DiagramState> {
    if let Some(c) = RE_QUADRATIC.captures(text) {
        let a = coefficient(c.get(1).map(|m| m.as_str()))?;
        let b = signed(&c, 2, 3, true)?;
        let k = signed(&c, 4, 5, false)?;
        if a != 0.0 {
            return Some(graph_quadratic(a, b, k));
        }
    }
    if let Some(c) = RE_LINEAR.captures(text) {
        let slope = coefficient(c.get(1).map(|m| m.as_str()))?;
        let intercept = signed(&c, 2, 3, false)?;
        return Some(graph_line(slope, intercept));
    }
    plot_points(text)
}

fn value_table(f: &PlotFunction, xs: &[f64]) -> Vec<LabeledPoint> {
    xs.iter()
        .map(|&x| LabeledPoint::new(String::new(), x, f.eval(x)))
        .collect()
}

fn table_calc(points: &[LabeledPoint]) -> String {
    points
        .iter()
        .map(|p| format!("x = {} → y = {}", fmt_num(p.x), fmt_num(p.y)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plane(function: PlotFunction, points: Vec<LabeledPoint>, features: Vec<LabeledPoint>) -> CoordinatePlaneData {
    let all = || points.iter().chain(features.iter());
    CoordinatePlaneData {
        function: Some(function),
        x_range: fit_range(all().map(|p| p.x)),
        y_range: fit_range(all().map(|p| p.y)),
        points,
        features,
    }
}

fn graph_line(slope: f64, intercept: f64) -> DiagramState {
    let f = PlotFunction::Linear { slope, intercept };
    let table = value_table(&f, &[-2.0, -1.0, 0.0, 1.0, 2.0]);

    let mut features = vec![LabeledPoint::new("y-intercept", 0.0, intercept)];
    let mut key = format!("y-intercept (0, {})", fmt_num(intercept));
    if slope != 0.0 {
        let root = LabeledPoint::new("x-intercept", -intercept / slope, 0.0);
        key.push_str(&format!(", x-intercept {}", root.coords()));
        features.push(root);
    }

    let steps = vec![
        StepConfig::new("Draw the axes").reveals("axes"),
        StepConfig::new("Make a table of values")
            .calculation(table_calc(&table))
            .reveals("table"),
        StepConfig::new("Plot the points").reveals("points"),
        StepConfig::new("Join them with a straight line")
            .calculation(format!(
                "{}: slope = {}, y-intercept = {}",
                f.expression(),
                fmt_num(slope),
                fmt_num(intercept)
            ))
            .reveals("function"),
        StepConfig::new("Mark where the line crosses the axes")
            .calculation(key)
            .reveals("features"),
    ];
    DiagramState::new(
        DiagramData::CoordinatePlane(plane(f, table, features)),
        steps,
    )
}

fn graph_quadratic(a: f64, b: f64, c: f64) -> DiagramState {
    let f = PlotFunction::Quadratic { a, b, c };
    let vx = -b / (2.0 * a);
    let xs: Vec<f64> = (-2..=2).map(|dx| vx.round() + f64::from(dx)).collect();
    let table = value_table(&f, &xs);

    let vertex = LabeledPoint::new("vertex", vx, f.eval(vx));
    let mut features = vec![vertex.clone()];
    let discriminant = b * b - 4.0 * a * c;
    let roots = if discriminant < 0.0 {
        "no real roots".to_string()
    } else if discriminant == 0.0 {
        features.push(LabeledPoint::new("root", vx, 0.0));
        format!("one root at x = {}", fmt_num(round1(vx)))
    } else {
        let sq = discriminant.sqrt();
        let (r1, r2) = ((-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a));
        let (r1, r2) = (r1.min(r2), r1.max(r2));
        features.push(LabeledPoint::new("root", r1, 0.0));
        features.push(LabeledPoint::new("root", r2, 0.0));
        format!("roots x = {} and x = {}", fmt_num(round1(r1)), fmt_num(round1(r2)))
    };

    let steps = vec![
        StepConfig::new("Draw the axes").reveals("axes"),
        StepConfig::new("Make a table of values around the vertex")
            .calculation(table_calc(&table))
            .reveals("table"),
        StepConfig::new("Plot the points").reveals("points"),
        StepConfig::new("Join them with a smooth parabola")
            .calculation(format!(
                "{} opens {}",
                f.expression(),
                if a > 0.0 { "upward" } else { "downward" }
            ))
            .reveals("function"),
        StepConfig::new("Mark the vertex and roots")
            .calculation(format!("{roots}; vertex {}", vertex.coords()))
            .reveals("features"),
    ];
    DiagramState::new(
        DiagramData::CoordinatePlane(plane(f, table, features)),
        steps,
    )
}

fn plot_points(text: &str) -> Option<DiagramState> {
    let points: Vec<LabeledPoint> = RE_POINT
        .captures_iter(text)
        .filter_map(|c| Some((parse_number(&c[1])?, parse_number(&c[2])?)))
        .zip('A'..='Z')
        .map(|((x, y), label)| LabeledPoint::new(label.to_string(), x, y))
        .collect();
    if points.is_empty() {
        return None;
    }

    let mut steps = vec![StepConfig::new("Draw the axes").reveals("axes")];
    for p in &points {
        steps.push(
            StepConfig::new(format!(
                "Plot {}: move {} along x, then {} along y",
                p.label,
                fmt_num(p.x),
                fmt_num(p.y)
            ))
            .calculation(format!("{} = {}", p.label, p.coords()))
            .reveals(format!("point-{}", p.label)),
        );
    }

    Some(DiagramState::new(
        DiagramData::CoordinatePlane(CoordinatePlaneData {
            function: None,
            x_range: fit_range(points.iter().map(|p| p.x)),
            y_range: fit_range(points.iter().map(|p| p.y)),
            points,
            features: Vec::new(),
        }),
        steps,
    ))
}
