// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # tutor-viz
//!
//! Turns homework problems into step-revealed teaching diagrams and keeps
//! them in sync with a tutoring conversation.
//!
//! ## Architecture
//!
//! - **Extraction** (`extract`): regex cascades pull physical quantities and
//!   division operands out of free text
//! - **Classification** (`classify`): keyword rules pick one of the closed set
//!   of diagram kinds per domain
//! - **Simulation** (`division`): digit-by-digit long division trace
//! - **Builders** (`builders`): one pure builder per diagram kind, physics,
//!   math, chemistry and biology
//! - **Validation** (`validate`): the trust boundary for diagrams built here
//!   or received from the dialogue service
//! - **Evolution** (`evolution`): one step revealed per turn, plus rescue of
//!   long divisions drawn in ASCII
//! - **Pipeline** (`pipeline`): `DiagramEngine`, the per-turn entry point
//!
//! ## Library usage
//!
//! ```
//! use tutor_viz::analysis::{QuestionAnalysis, Subject};
//! use tutor_viz::pipeline::{DiagramEngine, DiagramSource, TurnInput};
//!
//! let engine = DiagramEngine::default();
//! let question = QuestionAnalysis::new("What is 7248 ÷ 8?", "long division", Subject::Math);
//!
//! let first = engine.process_turn(TurnInput {
//!     analysis: Some(question),
//!     turn: 1,
//!     ..Default::default()
//! });
//! assert_eq!(first.source, DiagramSource::Generated);
//!
//! let second = engine.process_turn(TurnInput {
//!     previous: first.diagram,
//!     turn: 2,
//!     ..Default::default()
//! });
//! assert_eq!(second.diagram.unwrap().visible_step, 1);
//! ```

pub mod analysis;
pub mod builders;
pub mod classify;
pub mod config;
pub mod diagram;
pub mod division;
pub mod error;
pub mod evolution;
pub mod extract;
pub mod pipeline;
pub mod validate;
