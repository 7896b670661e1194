//! Domain diagram builders.
//!
//! Each builder is a pure function from problem text (plus extracted
//! parameters where the domain needs them) to a [`DiagramState`]. Physics
//! builders always succeed thanks to configured defaults; every other
//! builder returns `None` when the text lacks what its category needs.
//!
//! [`build`] dispatches on [`DiagramKind`] and passes the result through the
//! validator before handing it out.

pub mod biology;
pub mod chemistry;
pub mod math;
pub mod physics;

use crate::classify::DiagramKind;
use crate::config::TutorConfig;
use crate::diagram::DiagramState;
use crate::extract::{PhysicsContext, extract_division_numbers};
use crate::validate;

/// Build and validate the diagram for `kind` from `text`.
pub fn build(kind: DiagramKind, text: &str, config: &TutorConfig) -> Option<DiagramState> {
    let built = match kind {
        DiagramKind::Fbd | DiagramKind::InclinedPlane | DiagramKind::Projectile => {
            let ctx = PhysicsContext::extract(text, config.physics.gravity);
            Some(match kind {
                DiagramKind::Fbd => physics::build_fbd(&ctx, text, &config.physics),
                DiagramKind::InclinedPlane => {
                    physics::build_inclined_plane(&ctx, text, &config.physics)
                }
                _ => physics::build_projectile(&ctx, &config.physics),
            })
        }
        DiagramKind::LongDivision => {
            extract_division_numbers(text).and_then(math::build_long_division)
        }
        DiagramKind::Equation => math::build_equation(text),
        DiagramKind::Fraction => math::build_fraction(text),
        DiagramKind::CoordinatePlane => math::build_coordinate_plane(text),
        DiagramKind::BarModel => math::build_bar_model(text),
        DiagramKind::Triangle => math::build_triangle(text),
        DiagramKind::NumberLine => math::build_number_line(text),
        DiagramKind::Atom => chemistry::build_atom(text),
        DiagramKind::Molecule => chemistry::build_molecule(text),
        DiagramKind::Cell => biology::build_cell(text),
        DiagramKind::Dna => biology::build_dna(text, &config.biology),
    };

    let Some(state) = built else {
        tracing::debug!(%kind, "builder found nothing to draw");
        return None;
    };
    validate::validate(&state, Some(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_dispatches_to_its_own_builder() {
        let config = TutorConfig::default();
        let samples = [
            (DiagramKind::Fbd, "A 5 kg box rests on a table"),
            (DiagramKind::InclinedPlane, "A block on a 30° ramp"),
            (DiagramKind::Projectile, "A ball is thrown at 15 m/s"),
            (DiagramKind::LongDivision, "7248 ÷ 8"),
            (DiagramKind::Equation, "2x + 1 = 9"),
            (DiagramKind::Fraction, "1/2 + 1/3"),
            (DiagramKind::CoordinatePlane, "y = 2x - 1"),
            (DiagramKind::BarModel, "Ann has 10 pens and Bo has 4 pens."),
            (DiagramKind::Triangle, "legs 6 and 8"),
            (DiagramKind::NumberLine, "-2 + 7"),
            (DiagramKind::Atom, "an oxygen atom"),
            (DiagramKind::Molecule, "methane"),
            (DiagramKind::Cell, "animal cell"),
            (DiagramKind::Dna, "DNA strand GATTACA"),
        ];
        assert_eq!(samples.len(), DiagramKind::ALL.len());
        for (kind, text) in samples {
            let state = build(kind, text, &config).unwrap_or_else(|| panic!("{kind}: {text}"));
            assert_eq!(state.kind(), kind);
            assert_eq!(state.visible_step, 0);
            assert_eq!(state.total_steps, state.step_config.len());
        }
    }

    #[test]
    fn physics_builders_use_configured_gravity() {
        let mut config = TutorConfig::default();
        config.physics.gravity = 9.8;
        let state = build(DiagramKind::Fbd, "a 10 kg crate", &config).unwrap();
        assert_eq!(
            state.step_config[1].show_calculation.as_deref(),
            Some("W = mg = 10 × 9.8 = 98N")
        );
    }

    #[test]
    fn non_physics_builder_can_come_up_empty() {
        let config = TutorConfig::default();
        assert!(build(DiagramKind::LongDivision, "share the cake", &config).is_none());
        assert!(build(DiagramKind::Atom, "draw an atom", &config).is_none());
    }
}
