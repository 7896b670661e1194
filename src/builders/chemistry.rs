//! Chemistry diagram builders: Bohr atoms and ball-and-stick molecules.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagram::{DiagramData, DiagramState, Point, StepConfig};

// ── Periodic table (first 20) ───────────────────────────────────────────

struct Element {
    symbol: &'static str,
    name: &'static str,
    atomic_number: u32,
    /// Most common isotope.
    mass_number: u32,
    atomic_mass: f64,
}

const fn el(
    symbol: &'static str,
    name: &'static str,
    atomic_number: u32,
    mass_number: u32,
    atomic_mass: f64,
) -> Element {
    Element {
        symbol,
        name,
        atomic_number,
        mass_number,
        atomic_mass,
    }
}

static ELEMENTS: [Element; 20] = [
    el("H", "hydrogen", 1, 1, 1.008),
    el("He", "helium", 2, 4, 4.003),
    el("Li", "lithium", 3, 7, 6.94),
    el("Be", "beryllium", 4, 9, 9.012),
    el("B", "boron", 5, 11, 10.81),
    el("C", "carbon", 6, 12, 12.011),
    el("N", "nitrogen", 7, 14, 14.007),
    el("O", "oxygen", 8, 16, 15.999),
    el("F", "fluorine", 9, 19, 18.998),
    el("Ne", "neon", 10, 20, 20.180),
    el("Na", "sodium", 11, 23, 22.990),
    el("Mg", "magnesium", 12, 24, 24.305),
    el("Al", "aluminium", 13, 27, 26.982),
    el("Si", "silicon", 14, 28, 28.085),
    el("P", "phosphorus", 15, 31, 30.974),
    el("S", "sulfur", 16, 32, 32.06),
    el("Cl", "chlorine", 17, 35, 35.45),
    el("Ar", "argon", 18, 40, 39.948),
    el("K", "potassium", 19, 39, 39.098),
    el("Ca", "calcium", 20, 40, 40.078),
];

/// Shell capacities for the first 20 elements (2, 8, 8, then the 4s pair).
const SHELL_CAPACITY: [u32; 4] = [2, 8, 8, 2];

fn element_by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

fn element_by_name(name: &str) -> Option<&'static Element> {
    let name = name.to_lowercase();
    let name = match name.as_str() {
        "aluminum" => "aluminium",
        "sulphur" => "sulfur",
        other => other,
    };
    ELEMENTS.iter().find(|e| e.name == name)
}

fn shells_for(electrons: u32) -> Vec<u32> {
    let mut left = electrons;
    SHELL_CAPACITY
        .iter()
        .map_while(|&cap| {
            (left > 0).then(|| {
                let n = left.min(cap);
                left -= n;
                n
            })
        })
        .collect()
}

// ── Atom ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomData {
    pub symbol: String,
    pub name: String,
    pub atomic_number: u32,
    pub protons: u32,
    pub neutrons: u32,
    pub electrons: u32,
    /// Electrons per shell, innermost first.
    pub shells: Vec<u32>,
}

static RE_ELEMENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<&str> = ELEMENTS.iter().map(|e| e.name).collect();
    Regex::new(&format!(r"(?i)\b({}|aluminum|sulphur)\b", names.join("|"))).unwrap()
});

static RE_ATOMIC_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\batomic\s+number\s+(?:of\s+|is\s+)?(\d{1,2})\b").unwrap());

// Symbols are only trusted next to the word "atom": a bare "C" or "I" is
// too common in prose.
static RE_SYMBOL_ATOM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]?)\s+atom\b").unwrap());

fn find_element(text: &str) -> Option<&'static Element> {
    if let Some(c) = RE_ELEMENT_NAME.captures(text) {
        return element_by_name(&c[1]);
    }
    if let Some(c) = RE_ATOMIC_NUMBER.captures(text) {
        let z: u32 = c[1].parse().ok()?;
        return ELEMENTS.iter().find(|e| e.atomic_number == z);
    }
    RE_SYMBOL_ATOM
        .captures_iter(text)
        .find_map(|c| element_by_symbol(&c[1]))
}

/// Bohr-model atom, one reveal step per electron shell.
pub fn build_atom(text: &str) -> Option<DiagramState> {
    let element = find_element(text)?;
    let z = element.atomic_number;
    let shells = shells_for(z);
    let neutrons = element.mass_number - z;

    let last = shells.len() - 1;
    let steps = shells
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let mut step = StepConfig::new(format!("Shell {}: {count} electrons", i + 1))
                .reveals(format!("shell-{}", i + 1));
            if i == 0 {
                step = step
                    .calculation(format!("nucleus: {z} protons, {neutrons} neutrons"))
                    .reveals("nucleus");
            }
            if i == last {
                let sum = shells
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(" + ");
                step = step.calculation(format!("{sum} = {z} electrons"));
            }
            step
        })
        .collect();

    tracing::debug!(element = element.symbol, ?shells, "built atom diagram");
    Some(DiagramState::new(
        DiagramData::Atom(AtomData {
            symbol: element.symbol.into(),
            name: element.name.into(),
            atomic_number: z,
            protons: z,
            neutrons,
            electrons: z,
            shells,
        }),
        steps,
    ))
}

// ── Molecule ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeAtom {
    pub id: usize,
    pub element: String,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub from: usize,
    pub to: usize,
    /// 1 single, 2 double, 3 triple.
    pub order: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoleculeData {
    pub formula: String,
    pub name: String,
    pub atoms: Vec<MoleculeAtom>,
    pub bonds: Vec<Bond>,
    /// g/mol.
    pub molar_mass: f64,
}

struct MoleculeTemplate {
    formula: &'static str,
    name: &'static str,
    atoms: &'static [(&'static str, f64, f64)],
    bonds: &'static [(usize, usize, u8)],
}

static MOLECULES: &[MoleculeTemplate] = &[
    MoleculeTemplate {
        formula: "H2O",
        name: "water",
        atoms: &[("O", 0.0, 0.0), ("H", -0.8, 0.6), ("H", 0.8, 0.6)],
        bonds: &[(0, 1, 1), (0, 2, 1)],
    },
    MoleculeTemplate {
        formula: "CO2",
        name: "carbon dioxide",
        atoms: &[("C", 0.0, 0.0), ("O", -1.2, 0.0), ("O", 1.2, 0.0)],
        bonds: &[(0, 1, 2), (0, 2, 2)],
    },
    MoleculeTemplate {
        formula: "CO",
        name: "carbon monoxide",
        atoms: &[("C", -0.6, 0.0), ("O", 0.6, 0.0)],
        bonds: &[(0, 1, 3)],
    },
    MoleculeTemplate {
        formula: "CH4",
        name: "methane",
        atoms: &[
            ("C", 0.0, 0.0),
            ("H", 0.0, 1.0),
            ("H", 1.0, 0.0),
            ("H", 0.0, -1.0),
            ("H", -1.0, 0.0),
        ],
        bonds: &[(0, 1, 1), (0, 2, 1), (0, 3, 1), (0, 4, 1)],
    },
    MoleculeTemplate {
        formula: "NH3",
        name: "ammonia",
        atoms: &[("N", 0.0, 0.0), ("H", -0.9, -0.5), ("H", 0.9, -0.5), ("H", 0.0, 1.0)],
        bonds: &[(0, 1, 1), (0, 2, 1), (0, 3, 1)],
    },
    MoleculeTemplate {
        formula: "O2",
        name: "oxygen gas",
        atoms: &[("O", -0.6, 0.0), ("O", 0.6, 0.0)],
        bonds: &[(0, 1, 2)],
    },
    MoleculeTemplate {
        formula: "N2",
        name: "nitrogen gas",
        atoms: &[("N", -0.6, 0.0), ("N", 0.6, 0.0)],
        bonds: &[(0, 1, 3)],
    },
    MoleculeTemplate {
        formula: "H2",
        name: "hydrogen gas",
        atoms: &[("H", -0.4, 0.0), ("H", 0.4, 0.0)],
        bonds: &[(0, 1, 1)],
    },
    MoleculeTemplate {
        formula: "HCl",
        name: "hydrogen chloride",
        atoms: &[("H", -0.7, 0.0), ("Cl", 0.7, 0.0)],
        bonds: &[(0, 1, 1)],
    },
    MoleculeTemplate {
        formula: "NaCl",
        name: "sodium chloride",
        atoms: &[("Na", -0.8, 0.0), ("Cl", 0.8, 0.0)],
        bonds: &[(0, 1, 1)],
    },
];

static RE_FORMULA: LazyLock<Regex> = LazyLock::new(|| {
    let formulas: Vec<&str> = MOLECULES.iter().map(|m| m.formula).collect();
    Regex::new(&format!(r"\b({})\b", formulas.join("|"))).unwrap()
});

static RE_MOLECULE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(water|carbon dioxide|carbon monoxide|methane|ammonia|oxygen gas|nitrogen gas|hydrogen gas|hydrogen chloride|hydrochloric acid|sodium chloride|table salt|salt)\b",
    )
    .unwrap()
});

/// `H₂O` → `H2O`.
fn normalize_subscripts(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '₀'..='₉' => char::from_digit(c as u32 - '₀' as u32, 10).unwrap_or(c),
            other => other,
        })
        .collect()
}

fn find_molecule(text: &str) -> Option<&'static MoleculeTemplate> {
    let text = normalize_subscripts(text);
    if let Some(c) = RE_FORMULA.captures(&text) {
        return MOLECULES.iter().find(|m| m.formula == &c[1]);
    }
    let c = RE_MOLECULE_NAME.captures(&text)?;
    let name = match c[1].to_lowercase().as_str() {
        "hydrochloric acid" => "hydrogen chloride",
        "table salt" | "salt" => "sodium chloride",
        other => return MOLECULES.iter().find(|m| m.name == other),
    };
    MOLECULES.iter().find(|m| m.name == name)
}

/// `M = 15.999 + 2 × 1.008 = 18.015 g/mol`
fn molar_mass(template: &MoleculeTemplate) -> Option<(f64, String)> {
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for (symbol, _, _) in template.atoms {
        match counts.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, n)) => *n += 1,
            None => counts.push((symbol, 1)),
        }
    }
    let mut total = 0.0;
    let mut terms = Vec::new();
    for (symbol, n) in counts {
        let mass = element_by_symbol(symbol)?.atomic_mass;
        total += f64::from(n) * mass;
        terms.push(if n == 1 {
            format!("{mass}")
        } else {
            format!("{n} × {mass}")
        });
    }
    let total = (total * 1000.0).round() / 1000.0;
    Some((total, format!("M = {} = {total:.3} g/mol", terms.join(" + "))))
}

fn bond_name(order: u8) -> &'static str {
    match order {
        1 => "single",
        2 => "double",
        _ => "triple",
    }
}

/// Ball-and-stick molecule: one step per atom, then one per bond. The last
/// step carries the molar mass.
pub fn build_molecule(text: &str) -> Option<DiagramState> {
    let template = find_molecule(text)?;
    let (mass, mass_calc) = molar_mass(template)?;

    let atoms: Vec<MoleculeAtom> = template
        .atoms
        .iter()
        .enumerate()
        .map(|(id, &(element, x, y))| MoleculeAtom {
            id,
            element: element.to_string(),
            position: Point::new(x, y),
        })
        .collect();
    let bonds: Vec<Bond> = template
        .bonds
        .iter()
        .map(|&(from, to, order)| Bond { from, to, order })
        .collect();

    let mut steps: Vec<StepConfig> = atoms
        .iter()
        .map(|a| {
            let name = element_by_symbol(&a.element).map_or("", |e| e.name);
            StepConfig::new(format!("Place an atom of {name} ({})", a.element))
                .reveals(format!("atom-{}", a.id))
        })
        .collect();
    steps.extend(bonds.iter().enumerate().map(|(i, b)| {
        StepConfig::new(format!(
            "Draw the {} bond {}–{}",
            bond_name(b.order),
            atoms[b.from].element,
            atoms[b.to].element
        ))
        .reveals(format!("bond-{i}"))
    }));
    if let Some(last) = steps.last_mut() {
        last.show_calculation = Some(mass_calc);
    }

    tracing::debug!(formula = template.formula, mass, "built molecule diagram");
    Some(DiagramState::new(
        DiagramData::Molecule(MoleculeData {
            formula: template.formula.into(),
            name: template.name.into(),
            atoms,
            bonds,
            molar_mass: mass,
        }),
        steps,
    ))
}
