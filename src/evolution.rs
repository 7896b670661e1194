//! Step-evolution coordinator.
//!
//! A conversation's diagram is a small state machine driven by the diagram
//! attached to the previous turn: no diagram, in progress at step `k` of
//! `n`, or complete. Auto-advancing diagrams reveal exactly one more step
//! per turn. Every turn gets a fresh [`DiagramState`]; the previous one is
//! only read.
//!
//! The coordinator also rescues turns whose free-text message drew a long
//! division by hand (bracket notation, rule lines, numeric code blocks):
//! the problem is re-extracted from the message, simulated, and the ASCII
//! fragments are stripped. When extraction fails the message is left as it
//! was.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::excerpt;
use crate::builders::math::build_long_division;
use crate::classify::DiagramKind;
use crate::diagram::{DiagramState, EvolutionMode};
use crate::extract::extract_division_numbers;
use crate::validate;

// ── State machine ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvolutionState {
    NoDiagram,
    InProgress { step: usize, total: usize },
    Complete { total: usize },
}

impl EvolutionState {
    /// State implied by the previous turn's diagram.
    pub fn of(previous: Option<&DiagramState>) -> Self {
        match previous {
            None => Self::NoDiagram,
            Some(d) if d.visible_step + 1 >= d.total_steps => Self::Complete {
                total: d.total_steps,
            },
            Some(d) => Self::InProgress {
                step: d.visible_step,
                total: d.total_steps,
            },
        }
    }
}

/// Instruction for the next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Continuation {
    pub next_step: usize,
    pub total_steps: usize,
    /// The next step is the last one.
    pub complete: bool,
}

/// What the next turn should show, or `None` once the diagram is complete.
pub fn continuation(previous: &DiagramState) -> Option<Continuation> {
    match EvolutionState::of(Some(previous)) {
        EvolutionState::InProgress { step, total } => {
            let next_step = step + 1;
            Some(Continuation {
                next_step,
                total_steps: total,
                complete: next_step + 1 >= total,
            })
        }
        _ => None,
    }
}

/// Next turn's diagram for an auto-advancing `previous`: same type and
/// data, one more step visible. `None` when the diagram is complete or does
/// not auto-advance.
pub fn continue_diagram(previous: &DiagramState, turn: u32) -> Option<DiagramState> {
    if previous.evolution_mode != Some(EvolutionMode::AutoAdvance) {
        return None;
    }
    let next = continuation(previous)?;
    let mut state = previous.clone();
    state.visible_step = next.next_step;
    state.conversation_turn = Some(turn);
    tracing::info!(
        kind = %state.kind(),
        step = next.next_step,
        total = next.total_steps,
        turn,
        "advanced diagram"
    );
    Some(state)
}

// ── ASCII rescue ────────────────────────────────────────────────────────

/// Traces of a hand-drawn division layout in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsciiSignature {
    /// `8 ) 7248` or `8 | 7248`
    BracketNotation,
    /// A run of underscores or dashes used as the division bar.
    RuleLine,
    /// A fenced code block holding nothing but digits and layout marks.
    NumericCodeBlock,
}

static RE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[)|]\s*\d+").unwrap());

static RE_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{4,}|-{5,}|—{3,}").unwrap());

static RE_CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\n?(.*?)```").unwrap());

static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

fn is_layout_char(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_whitespace()
        || matches!(
            c,
            '|' | ')' | '(' | '_' | '-' | '—' | '‾' | '÷' | '/' | '×' | '*' | '=' | 'R' | '.' | ','
        )
}

/// A line made only of digits and layout marks, with at least one digit or
/// rule run.
fn is_layout_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.chars().all(is_layout_char)
        && (RE_BRACKET.is_match(trimmed) || RE_RULE.is_match(trimmed) || trimmed.chars().any(|c| c.is_ascii_digit()))
}

fn is_numeric_block(body: &str) -> bool {
    body.chars().any(|c| c.is_ascii_digit()) && body.lines().all(|l| l.trim().is_empty() || is_layout_line(l))
}

/// Every signature present in `message`, in a fixed order.
pub fn detect_ascii_layout(message: &str) -> Vec<AsciiSignature> {
    let mut found = Vec::new();
    if message.lines().any(|l| is_layout_line(l) && RE_BRACKET.is_match(l)) {
        found.push(AsciiSignature::BracketNotation);
    }
    if message.lines().any(|l| is_layout_line(l) && RE_RULE.is_match(l)) {
        found.push(AsciiSignature::RuleLine);
    }
    if RE_CODE_BLOCK
        .captures_iter(message)
        .any(|c| is_numeric_block(&c[1]))
    {
        found.push(AsciiSignature::NumericCodeBlock);
    }
    found
}

fn is_division_mark(line: &str) -> bool {
    RE_BRACKET.is_match(line) || RE_RULE.is_match(line)
}

/// Remove numeric code blocks and every run of adjacent layout lines that
/// holds a bracket or rule line. Lone numeric lines are prose.
fn strip_layout(message: &str) -> String {
    let without_blocks = RE_CODE_BLOCK.replace_all(message, |c: &regex::Captures| {
        if is_numeric_block(&c[1]) {
            String::new()
        } else {
            c[0].to_string()
        }
    });
    let lines: Vec<&str> = without_blocks.lines().collect();
    let kept: Vec<&str> = lines
        .chunk_by(|a, b| is_layout_line(a) == is_layout_line(b))
        .filter(|run| !(is_layout_line(run[0]) && run.iter().any(|l| is_division_mark(l))))
        .flatten()
        .copied()
        .collect();
    RE_BLANK_RUN
        .replace_all(&kept.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// A diagram recovered from a message, and the message with the ASCII
/// fragments removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rescue {
    pub diagram: DiagramState,
    pub cleaned_message: String,
    pub signatures: Vec<AsciiSignature>,
}

/// Rebuild a long-division diagram from a message that drew one in ASCII.
///
/// `None` (and the message stays untouched) when the message shows no
/// layout signature or the problem cannot be re-extracted.
pub fn rescue_from_message(message: &str, turn: Option<u32>) -> Option<Rescue> {
    let signatures = detect_ascii_layout(message);
    if signatures.is_empty() {
        return None;
    }

    let Some(operands) = extract_division_numbers(message) else {
        tracing::warn!(?signatures, text = excerpt(message), "ASCII layout found but no division to rescue");
        return None;
    };
    let diagram = build_long_division(operands)?;
    let mut diagram = validate::validate(&diagram, Some(DiagramKind::LongDivision))?;
    diagram.conversation_turn = turn;

    let cleaned_message = strip_layout(message);
    tracing::info!(
        dividend = operands.dividend,
        divisor = operands.divisor,
        ?signatures,
        "rescued long division from message"
    );
    Some(Rescue {
        diagram,
        cleaned_message,
        signatures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{DiagramData, StepConfig};
    use crate::division::simulate;

    fn three_steps() -> DiagramState {
        DiagramState::new(
            DiagramData::LongDivision(simulate(96, 4).unwrap()),
            vec![
                StepConfig::new("setup"),
                StepConfig::new("9"),
                StepConfig::new("6").calculation("96 ÷ 4 = 24"),
            ],
        )
    }

    // ── Continuation ────────────────────────────────────────────────

    #[test]
    fn states() {
        let mut d = three_steps();
        assert_eq!(EvolutionState::of(None), EvolutionState::NoDiagram);
        assert_eq!(
            EvolutionState::of(Some(&d)),
            EvolutionState::InProgress { step: 0, total: 3 }
        );
        d.visible_step = 2;
        assert_eq!(EvolutionState::of(Some(&d)), EvolutionState::Complete { total: 3 });
    }

    #[test]
    fn advances_one_step_without_touching_previous() {
        let first = three_steps();
        let second = continue_diagram(&first, 2).unwrap();
        assert_eq!(first.visible_step, 0);
        assert_eq!(second.visible_step, 1);
        assert_eq!(second.conversation_turn, Some(2));
        assert_eq!(second.data, first.data);
        assert_eq!(second.step_config, first.step_config);

        let third = continue_diagram(&second, 3).unwrap();
        assert_eq!(third.visible_step, 2);
        assert!(third.is_complete());
        assert!(continue_diagram(&third, 4).is_none());
    }

    #[test]
    fn continuation_flags_last_step() {
        let d = three_steps();
        assert_eq!(
            continuation(&d),
            Some(Continuation {
                next_step: 1,
                total_steps: 3,
                complete: false
            })
        );
        let mut d = d;
        d.visible_step = 1;
        assert!(continuation(&d).unwrap().complete);
    }

    #[test]
    fn only_auto_advance_diagrams_move() {
        let mut d = three_steps();
        d.evolution_mode = None;
        assert!(continue_diagram(&d, 2).is_none());
    }

    #[test]
    fn evolution_state_wire_names() {
        let json = serde_json::to_value(EvolutionState::InProgress { step: 1, total: 4 }).unwrap();
        assert_eq!(json["state"], "IN_PROGRESS");
        assert_eq!(
            serde_json::to_value(EvolutionState::NoDiagram).unwrap()["state"],
            "NO_DIAGRAM"
        );
    }

    // ── Rescue ──────────────────────────────────────────────────────

    const ASCII_MESSAGE: &str = "Let's set it up like this:\n\n```\n    ____\n8 ) 7248\n```\n\nHow many times does 8 go into 7?";

    #[test]
    fn detects_signatures() {
        assert_eq!(
            detect_ascii_layout(ASCII_MESSAGE),
            vec![
                AsciiSignature::BracketNotation,
                AsciiSignature::RuleLine,
                AsciiSignature::NumericCodeBlock
            ]
        );
        assert!(detect_ascii_layout("Divide 7248 by 8. What do you get?").is_empty());
        assert_eq!(
            detect_ascii_layout("12 | 144"),
            vec![AsciiSignature::BracketNotation]
        );
    }

    #[test]
    fn rescue_builds_diagram_and_strips_ascii() {
        let rescue = rescue_from_message(ASCII_MESSAGE, Some(5)).unwrap();
        let DiagramData::LongDivision(trace) = &rescue.diagram.data else {
            panic!("expected long division");
        };
        assert_eq!((trace.dividend, trace.divisor), (7248, 8));
        assert_eq!(rescue.diagram.conversation_turn, Some(5));
        assert_eq!(
            rescue.cleaned_message,
            "Let's set it up like this:\n\nHow many times does 8 go into 7?"
        );
    }

    #[test]
    fn prose_code_blocks_survive() {
        let message = "```\nlet x = 1;\n```\n8 ) 96";
        let rescue = rescue_from_message(message, None).unwrap();
        assert!(rescue.cleaned_message.contains("let x = 1;"));
        assert!(!rescue.cleaned_message.contains("8 ) 96"));
    }

    #[test]
    fn worked_answer_lines_survive() {
        let message = "Set it up:\n   906\n  ____\n8 ) 7248\nWhat goes first?\n\nWe are aiming for\n7248 ÷ 8 = 906\n906";
        let rescue = rescue_from_message(message, None).unwrap();
        assert_eq!(
            rescue.cleaned_message,
            "Set it up:\nWhat goes first?\n\nWe are aiming for\n7248 ÷ 8 = 906\n906"
        );
    }

    #[test]
    fn failed_rescue_leaves_nothing() {
        // A rule line but no division problem anywhere.
        assert!(rescue_from_message("Notes\n----------\nGood work!", None).is_none());
        assert!(rescue_from_message("plain text", None).is_none());
    }
}
