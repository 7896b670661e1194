//! Math diagram builders.
//!
//! Each builder reads what it needs straight from the problem text and
//! returns `None` when the text does not contain a problem it can solve.
//! When a diagram is built, its final step always carries the numeric
//! answer.

pub mod bar_model;
pub mod coordinate;
pub mod division;
pub mod equation;
pub mod fraction;
pub mod number_line;
pub mod triangle;

pub use bar_model::{Bar, BarModelData, build_bar_model};
pub use coordinate::{CoordinatePlaneData, LabeledPoint, PlotFunction, build_coordinate_plane};
pub use division::build_long_division;
pub use equation::{EquationData, build_equation};
pub use fraction::{Fraction, FractionData, FractionOp, build_fraction};
pub use number_line::{Direction, InequalityMark, Jump, NumberLineData, build_number_line};
pub use triangle::{TriangleData, build_triangle};
