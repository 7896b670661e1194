//! Keyword/regex classification of a problem into a diagram category.
//!
//! Classification runs over the concatenation of problem text and topic.
//! It is deliberately permissive: a wrong diagram is simply not shown,
//! while a missing one costs the student a visual. Precedence inside each
//! domain is fixed by the order of the cue tables below.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::{QuestionAnalysis, Subject, excerpt};

// ── DiagramKind ─────────────────────────────────────────────────────────

/// Closed set of diagram categories the rendering layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    Fbd,
    InclinedPlane,
    Projectile,
    LongDivision,
    Equation,
    Fraction,
    CoordinatePlane,
    BarModel,
    Triangle,
    NumberLine,
    Atom,
    Molecule,
    Cell,
    Dna,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 14] = [
        Self::Fbd,
        Self::InclinedPlane,
        Self::Projectile,
        Self::LongDivision,
        Self::Equation,
        Self::Fraction,
        Self::CoordinatePlane,
        Self::BarModel,
        Self::Triangle,
        Self::NumberLine,
        Self::Atom,
        Self::Molecule,
        Self::Cell,
        Self::Dna,
    ];

    /// Wire name used in the diagram `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fbd => "fbd",
            Self::InclinedPlane => "inclined_plane",
            Self::Projectile => "projectile",
            Self::LongDivision => "long_division",
            Self::Equation => "equation",
            Self::Fraction => "fraction",
            Self::CoordinatePlane => "coordinate_plane",
            Self::BarModel => "bar_model",
            Self::Triangle => "triangle",
            Self::NumberLine => "number_line",
            Self::Atom => "atom",
            Self::Molecule => "molecule",
            Self::Cell => "cell",
            Self::Dna => "dna",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    pub fn domain(self) -> Domain {
        match self {
            Self::Fbd | Self::InclinedPlane | Self::Projectile => Domain::Physics,
            Self::Atom | Self::Molecule => Domain::Chemistry,
            Self::Cell | Self::Dna => Domain::Biology,
            _ => Domain::Math,
        }
    }
}

impl std::fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain family a diagram kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Physics,
    Math,
    Chemistry,
    Biology,
}

// ── Cue tables ──────────────────────────────────────────────────────────

struct Cue {
    regex: &'static LazyLock<Regex>,
    kind: DiagramKind,
}

static RE_CUE_INCLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:incline[sd]?|inclined\s+plane|ramps?|slope[sd]?|wedge|hill)\b").unwrap()
});

static RE_CUE_FORCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:forces?|free[\s-]body|fbd|friction|newtons?|tension|push(?:es|ed)?|pull(?:s|ed)?|normal\s+force|weight|net\s+force|accelerat\w*)\b",
    )
    .unwrap()
});

static RE_CUE_PROJECTILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:projectiles?|launch(?:es|ed)?|thrown|throws?|kick(?:s|ed)?|trajector(?:y|ies)|cannon(?:ball)?|fired|range|parabolic\s+motion)\b",
    )
    .unwrap()
});

static RE_CUE_COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:graph(?:ing|ed)?|plot(?:ting|ted)?|coordinates?|x-axis|y-axis|slope|intercepts?|parabola|quadrants?|ordered\s+pairs?)\b|\by\s*=",
    )
    .unwrap()
});

static RE_CUE_BAR_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:times\s+as\s+(?:many|much)|more\s+than|fewer\s+than|less\s+than|how\s+many\s+more|how\s+many\s+fewer|altogether|in\s+all|compare[ds]?|bar\s+model|tape\s+diagram)\b",
    )
    .unwrap()
});

static RE_CUE_TRIANGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:triangles?|hypotenuse|pythagor\w*|right\s+angle|isosceles|equilateral|scalene|legs?\s+of)\b",
    )
    .unwrap()
});

static RE_CUE_NUMBER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:number\s+line|negative\s+numbers?|integers?|inequalit(?:y|ies)|absolute\s+value|opposites?)\b|(?:^|[\s(])-\d+\s*[+\-]|\b[a-z]\s*(?:<=?|>=?|≤|≥)\s*-?\d",
    )
    .unwrap()
});

static RE_CUE_LONG_DIVISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)÷|\b(?:long\s+division|divided\s+by|divide|division|quotient|remainder|share[ds]?\s+equally|split\s+equally)\b|\b(?:among|between)\s+\d+\s+(?:groups|boxes|bags|teams|friends|students|people|children)\b|\d{3,}\s*/\s*\d+",
    )
    .unwrap()
});

static RE_CUE_EQUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:equations?|solve\s+for|unknown|variable)\b|\b\d*[a-z]\s*(?:[+\-]\s*\d+(?:\.\d+)?\s*)?=|=\s*-?\d*[a-z]\b",
    )
    .unwrap()
});

static RE_CUE_FRACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:fractions?|numerators?|denominators?|halves|half|thirds?|quarters?|simplify)\b|\b\d+\s*/\s*\d+\b",
    )
    .unwrap()
});

static RE_CUE_MOLECULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:molecules?|molecular|covalent|ionic|bonds?|compounds?|lewis\s+structure)\b|\b(?:H2O|CO2|CH4|NH3|NaCl|HCl|O2|N2|H2)\b",
    )
    .unwrap()
});

static RE_CUE_ATOM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:atoms?|atomic|electrons?|protons?|neutrons?|electron\s+shells?|bohr|valence|isotopes?|periodic\s+table)\b",
    )
    .unwrap()
});

static RE_CUE_DNA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:dna|double\s+helix|base\s+pairs?|nucleotides?|complementary\s+strand|adenine|thymine|guanine|cytosine|replication)\b",
    )
    .unwrap()
});

static RE_CUE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:cells?|organelles?|mitochondri(?:a|on)|chloroplasts?|ribosomes?|cytoplasm|cell\s+membrane|cell\s+wall|vacuoles?|golgi)\b",
    )
    .unwrap()
});

static PHYSICS_CUES: &[Cue] = &[
    Cue { regex: &RE_CUE_INCLINE, kind: DiagramKind::InclinedPlane },
    Cue { regex: &RE_CUE_FORCE, kind: DiagramKind::Fbd },
    Cue { regex: &RE_CUE_PROJECTILE, kind: DiagramKind::Projectile },
];

static MATH_CUES: &[Cue] = &[
    Cue { regex: &RE_CUE_COORDINATE, kind: DiagramKind::CoordinatePlane },
    Cue { regex: &RE_CUE_BAR_MODEL, kind: DiagramKind::BarModel },
    Cue { regex: &RE_CUE_TRIANGLE, kind: DiagramKind::Triangle },
    Cue { regex: &RE_CUE_NUMBER_LINE, kind: DiagramKind::NumberLine },
    Cue { regex: &RE_CUE_LONG_DIVISION, kind: DiagramKind::LongDivision },
    Cue { regex: &RE_CUE_EQUATION, kind: DiagramKind::Equation },
    Cue { regex: &RE_CUE_FRACTION, kind: DiagramKind::Fraction },
];

static CHEMISTRY_CUES: &[Cue] = &[
    Cue { regex: &RE_CUE_MOLECULE, kind: DiagramKind::Molecule },
    Cue { regex: &RE_CUE_ATOM, kind: DiagramKind::Atom },
];

static BIOLOGY_CUES: &[Cue] = &[
    Cue { regex: &RE_CUE_DNA, kind: DiagramKind::Dna },
    Cue { regex: &RE_CUE_CELL, kind: DiagramKind::Cell },
];

fn first_cue(cues: &[Cue], haystack: &str) -> Option<DiagramKind> {
    cues.iter()
        .find(|c| c.regex.is_match(haystack))
        .map(|c| c.kind)
}

// ── Per-domain classifiers ──────────────────────────────────────────────

/// Inclined plane beats generic force cues, which beat projectile cues.
pub fn classify_physics(text: &str) -> Option<DiagramKind> {
    first_cue(PHYSICS_CUES, text)
}

/// Coordinate plane, bar model, triangle, number line, long division,
/// equation, fraction, in that order.
pub fn classify_math(text: &str) -> Option<DiagramKind> {
    first_cue(MATH_CUES, text)
}

/// Molecule cues win over atom cues ("atoms in a water molecule").
pub fn classify_chemistry(text: &str) -> Option<DiagramKind> {
    first_cue(CHEMISTRY_CUES, text)
}

/// DNA cues win over cell cues ("DNA in the cell nucleus").
pub fn classify_biology(text: &str) -> Option<DiagramKind> {
    first_cue(BIOLOGY_CUES, text)
}

// ── classify ────────────────────────────────────────────────────────────

/// Pick a diagram category for a problem, or `None` when nothing matches.
///
/// Math questions only consult math cues. Science questions try physics,
/// then chemistry, then biology. `Other` is unconstrained and tries every
/// domain with math last, since numbers appear in most science prompts.
/// History and language questions never get a diagram.
pub fn classify(text: &str, topic: &str, subject: Subject) -> Option<DiagramKind> {
    let haystack = format!("{text} {topic}");

    let kind = match subject {
        Subject::Math => classify_math(&haystack),
        Subject::Science => classify_physics(&haystack)
            .or_else(|| classify_chemistry(&haystack))
            .or_else(|| classify_biology(&haystack)),
        Subject::Other => classify_physics(&haystack)
            .or_else(|| classify_chemistry(&haystack))
            .or_else(|| classify_biology(&haystack))
            .or_else(|| classify_math(&haystack)),
        Subject::History | Subject::Language => None,
    };

    match kind {
        Some(kind) => tracing::debug!(%kind, %subject, text = excerpt(text), "classified problem"),
        None => tracing::debug!(%subject, text = excerpt(text), "no diagram category"),
    }
    kind
}

/// [`classify`] over a [`QuestionAnalysis`].
pub fn classify_analysis(analysis: &QuestionAnalysis) -> Option<DiagramKind> {
    classify(&analysis.question_text, &analysis.topic, analysis.subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Math precedence ─────────────────────────────────────────────

    #[test]
    fn division_beats_equation() {
        assert_eq!(
            classify("solve 100 ÷ 4 = x", "", Subject::Math),
            Some(DiagramKind::LongDivision)
        );
    }

    #[test]
    fn graphing_beats_everything_in_math() {
        assert_eq!(
            classify("graph y = x² by first finding roots", "", Subject::Math),
            Some(DiagramKind::CoordinatePlane)
        );
    }

    #[test]
    fn math_categories() {
        let cases = [
            ("Sam has 3 times as many marbles as Tom", DiagramKind::BarModel),
            ("Find the hypotenuse of a right triangle with legs 3 and 4", DiagramKind::Triangle),
            ("Use a number line to find -3 + 5", DiagramKind::NumberLine),
            ("7,248 crayons shared equally among 8 boxes", DiagramKind::LongDivision),
            ("Solve 3x + 5 = 20", DiagramKind::Equation),
            ("What is 1/2 + 1/4?", DiagramKind::Fraction),
        ];
        for (text, expected) in cases {
            assert_eq!(classify(text, "", Subject::Math), Some(expected), "{text}");
        }
    }

    #[test]
    fn topic_contributes_cues() {
        assert_eq!(
            classify("What is 7248 and 8?", "long division", Subject::Math),
            Some(DiagramKind::LongDivision)
        );
    }

    // ── Physics precedence ──────────────────────────────────────────

    #[test]
    fn incline_beats_force() {
        assert_eq!(
            classify("What forces act on a block on a ramp?", "", Subject::Science),
            Some(DiagramKind::InclinedPlane)
        );
    }

    #[test]
    fn force_beats_projectile() {
        assert_eq!(
            classify("A ball is thrown; what force acts on it?", "", Subject::Science),
            Some(DiagramKind::Fbd)
        );
        assert_eq!(
            classify("A ball is thrown at 20 m/s", "", Subject::Science),
            Some(DiagramKind::Projectile)
        );
    }

    // ── Chemistry / biology ─────────────────────────────────────────

    #[test]
    fn science_domains() {
        assert_eq!(
            classify("Draw the atoms in a water molecule", "", Subject::Science),
            Some(DiagramKind::Molecule)
        );
        assert_eq!(
            classify("How many electrons does sodium have?", "", Subject::Science),
            Some(DiagramKind::Atom)
        );
        assert_eq!(
            classify("Write the complementary strand of this DNA", "", Subject::Science),
            Some(DiagramKind::Dna)
        );
        assert_eq!(
            classify("Label the organelles of a plant cell", "", Subject::Science),
            Some(DiagramKind::Cell)
        );
    }

    // ── No match ────────────────────────────────────────────────────

    #[test]
    fn no_category() {
        assert_eq!(classify("Why did the Roman empire fall?", "", Subject::History), None);
        assert_eq!(classify("What is photosynthesis for?", "plants", Subject::Science), None);
        assert_eq!(classify("Write a haiku", "poetry", Subject::Language), None);
    }

    #[test]
    fn other_subject_falls_back_to_math() {
        assert_eq!(
            classify("divide 456 by 12", "", Subject::Other),
            Some(DiagramKind::LongDivision)
        );
    }

    // ── Wire names ──────────────────────────────────────────────────

    #[test]
    fn wire_names_round_trip() {
        for kind in DiagramKind::ALL {
            assert_eq!(DiagramKind::from_wire(kind.as_str()), Some(kind));
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
        assert_eq!(DiagramKind::from_wire("pie_chart"), None);
    }
}
