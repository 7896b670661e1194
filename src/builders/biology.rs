//! Biology diagram builders: labelled cells and DNA ladders.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::BiologyConfig;
use crate::diagram::{DiagramData, DiagramState, Point, StepConfig};

// ── Cell ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Animal,
    Plant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organelle {
    pub name: String,
    pub function: String,
    pub position: Point,
    /// Named in the question.
    #[serde(default)]
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub cell_type: CellType,
    pub organelles: Vec<Organelle>,
}

/// (name, function, x, y), outermost structures first.
type OrganelleTemplate = (&'static str, &'static str, f64, f64);

const ANIMAL_CELL: &[OrganelleTemplate] = &[
    ("cell membrane", "controls what enters and leaves the cell", 0.0, 1.0),
    ("cytoplasm", "jelly where most reactions happen", 0.6, 0.5),
    ("nucleus", "holds the DNA and controls the cell", 0.0, 0.0),
    ("mitochondria", "release energy by respiration", -0.5, -0.4),
    ("ribosomes", "make proteins", 0.4, -0.3),
    ("endoplasmic reticulum", "transports proteins", -0.3, 0.3),
    ("golgi apparatus", "packages and ships proteins", 0.5, 0.1),
    ("lysosome", "breaks down waste", -0.6, 0.1),
];

const PLANT_CELL: &[OrganelleTemplate] = &[
    ("cell wall", "supports and protects the cell", 0.0, 1.1),
    ("cell membrane", "controls what enters and leaves the cell", 0.0, 1.0),
    ("cytoplasm", "jelly where most reactions happen", 0.7, 0.6),
    ("nucleus", "holds the DNA and controls the cell", -0.5, 0.5),
    ("large vacuole", "stores cell sap and keeps the cell firm", 0.1, -0.1),
    ("chloroplasts", "absorb light for photosynthesis", 0.7, -0.5),
    ("mitochondria", "release energy by respiration", -0.6, -0.5),
    ("ribosomes", "make proteins", 0.5, 0.3),
];

static RE_PLANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:plant|leaf|chloroplasts?|cell\s+wall|vacuole|photosynth\w*)\b").unwrap()
});

/// First word of each organelle name is enough to count as a mention
/// ("mitochondrion", "golgi body").
fn mentioned(text: &str, organelle: &str) -> bool {
    let lower = text.to_lowercase();
    let key = match organelle {
        "mitochondria" => "mitochondri",
        "ribosomes" => "ribosome",
        "chloroplasts" => "chloroplast",
        "large vacuole" => "vacuole",
        "golgi apparatus" => "golgi",
        "endoplasmic reticulum" => "endoplasmic",
        other => other,
    };
    lower.contains(key)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Labelled cell, one step per organelle.
pub fn build_cell(text: &str) -> Option<DiagramState> {
    let (cell_type, template) = if RE_PLANT.is_match(text) {
        (CellType::Plant, PLANT_CELL)
    } else {
        (CellType::Animal, ANIMAL_CELL)
    };

    let organelles: Vec<Organelle> = template
        .iter()
        .map(|&(name, function, x, y)| Organelle {
            name: name.to_string(),
            function: function.to_string(),
            position: Point::new(x, y),
            highlighted: mentioned(text, name),
        })
        .collect();

    let steps = organelles
        .iter()
        .map(|o| {
            StepConfig::new(format!("{}: {}", capitalize(&o.name), o.function))
                .reveals(o.name.replace(' ', "-"))
        })
        .collect();

    tracing::debug!(?cell_type, organelles = organelles.len(), "built cell diagram");
    Some(DiagramState::new(
        DiagramData::Cell(CellData {
            cell_type,
            organelles,
        }),
        steps,
    ))
}

// ── DNA ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePair {
    pub index: usize,
    pub base: char,
    pub partner: char,
    /// A–T pairs share two hydrogen bonds, G–C pairs three.
    pub hydrogen_bonds: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnaData {
    pub strand: String,
    pub complement: String,
    pub base_pairs: Vec<BasePair>,
}

// Upper case only: lower-case runs of a/c/g/t are usually English words.
static RE_STRAND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([ACGT]{4,})\b").unwrap());

fn partner(base: char) -> Option<(char, u8)> {
    match base {
        'A' => Some(('T', 2)),
        'T' => Some(('A', 2)),
        'G' => Some(('C', 3)),
        'C' => Some(('G', 3)),
        _ => None,
    }
}

/// DNA ladder, one step per base pair. Uses the strand spelled out in the
/// question, else the configured default, truncated to
/// `max_base_pairs`.
pub fn build_dna(text: &str, config: &BiologyConfig) -> Option<DiagramState> {
    let strand: String = match RE_STRAND.captures(text) {
        Some(c) => c[1].to_string(),
        None => config.default_dna_strand.to_uppercase(),
    };
    let strand: String = strand.chars().take(config.max_base_pairs).collect();

    let base_pairs = strand
        .chars()
        .enumerate()
        .map(|(index, base)| {
            let (partner, hydrogen_bonds) = partner(base)?;
            Some(BasePair {
                index,
                base,
                partner,
                hydrogen_bonds,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    if base_pairs.is_empty() {
        return None;
    }
    let complement: String = base_pairs.iter().map(|p| p.partner).collect();

    let last = base_pairs.len() - 1;
    let steps = base_pairs
        .iter()
        .map(|p| {
            let step = StepConfig::new(format!(
                "Pair {}: {} with {}",
                p.index + 1,
                p.base,
                p.partner
            ))
            .calculation(format!("{}–{}: {} hydrogen bonds", p.base, p.partner, p.hydrogen_bonds))
            .reveals(format!("pair-{}", p.index));
            if p.index == last {
                step.calculation(format!(
                    "{}–{}: {} hydrogen bonds; complement of {strand} is {complement}",
                    p.base, p.partner, p.hydrogen_bonds
                ))
            } else {
                step
            }
        })
        .collect();

    Some(DiagramState::new(
        DiagramData::Dna(DnaData {
            strand,
            complement,
            base_pairs,
        }),
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animal_cell_by_default() {
        let state = build_cell("Label the parts of a cell, especially the nucleus").unwrap();
        let DiagramData::Cell(d) = &state.data else {
            panic!("expected cell data");
        };
        assert_eq!(d.cell_type, CellType::Animal);
        assert_eq!(state.total_steps, d.organelles.len());
        let nucleus = d.organelles.iter().find(|o| o.name == "nucleus").unwrap();
        assert!(nucleus.highlighted);
        assert!(!d.organelles.iter().any(|o| o.name == "cell wall"));
    }

    #[test]
    fn plant_cell_has_wall_and_chloroplasts() {
        let state = build_cell("What organelles does a plant cell have?").unwrap();
        let DiagramData::Cell(d) = &state.data else {
            panic!("expected cell data");
        };
        assert_eq!(d.cell_type, CellType::Plant);
        assert_eq!(d.organelles[0].name, "cell wall");
        assert!(d.organelles.iter().any(|o| o.name == "chloroplasts"));
        assert_eq!(
            state.step_config[0].step_label,
            "Cell wall: supports and protects the cell"
        );
    }

    #[test]
    fn dna_from_question() {
        let state = build_dna("Find the complement of ATGC", &BiologyConfig::default()).unwrap();
        let DiagramData::Dna(d) = &state.data else {
            panic!("expected DNA data");
        };
        assert_eq!(d.complement, "TACG");
        assert_eq!(state.total_steps, 4);
        assert_eq!(d.base_pairs[2].hydrogen_bonds, 3);
        assert!(
            state
                .final_step()
                .unwrap()
                .show_calculation
                .as_deref()
                .unwrap()
                .ends_with("complement of ATGC is TACG")
        );
    }

    #[test]
    fn dna_default_and_truncation() {
        let config = BiologyConfig {
            max_base_pairs: 3,
            ..BiologyConfig::default()
        };
        let state = build_dna("draw the double helix", &config).unwrap();
        let DiagramData::Dna(d) = &state.data else {
            panic!("expected DNA data");
        };
        assert_eq!(d.strand, "ATG");
        assert_eq!(state.total_steps, 3);
    }

    #[test]
    fn dna_with_bad_default_strand() {
        let config = BiologyConfig {
            default_dna_strand: "XYZ".into(),
            ..BiologyConfig::default()
        };
        assert!(build_dna("dna", &config).is_none());
    }
}
