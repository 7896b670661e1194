//! The upstream description of a homework problem.

use serde::{Deserialize, Serialize};

/// Broad school subject assigned to a question upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Science,
    History,
    Language,
    #[default]
    Other,
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Math => write!(f, "math"),
            Self::Science => write!(f, "science"),
            Self::History => write!(f, "history"),
            Self::Language => write!(f, "language"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Subject {
    type Err = std::convert::Infallible;

    /// Unknown subjects map to `Other` rather than failing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "math" | "maths" | "mathematics" => Self::Math,
            "science" | "physics" | "chemistry" | "biology" => Self::Science,
            "history" => Self::History,
            "language" | "english" | "reading" | "writing" => Self::Language,
            _ => Self::Other,
        })
    }
}

/// Read-only record describing a problem, produced by the question-analysis
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    /// Raw student-facing problem text.
    pub question_text: String,
    pub topic: String,
    pub subject: Subject,
}

impl QuestionAnalysis {
    pub fn new(question_text: impl Into<String>, topic: impl Into<String>, subject: Subject) -> Self {
        Self {
            question_text: question_text.into(),
            topic: topic.into(),
            subject,
        }
    }
}

/// Bounded prefix of `text` for log records.
pub(crate) fn excerpt(text: &str) -> &str {
    const MAX_EXCERPT: usize = 80;
    if text.len() <= MAX_EXCERPT {
        return text;
    }
    &text[..text.floor_char_boundary(MAX_EXCERPT)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_parses_loosely() {
        assert_eq!("Math".parse::<Subject>().unwrap(), Subject::Math);
        assert_eq!("physics".parse::<Subject>().unwrap(), Subject::Science);
        assert_eq!("art".parse::<Subject>().unwrap(), Subject::Other);
    }

    #[test]
    fn analysis_serializes_camel_case() {
        let qa = QuestionAnalysis::new("7248 ÷ 8", "division", Subject::Math);
        let json = serde_json::to_value(&qa).unwrap();
        assert_eq!(json["questionText"], "7248 ÷ 8");
        assert_eq!(json["subject"], "math");
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let text = "÷".repeat(60);
        let cut = excerpt(&text);
        assert!(cut.len() <= 80);
        assert!(cut.chars().all(|c| c == '÷'));
    }
}
