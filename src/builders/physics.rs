//! Free-body, inclined-plane and projectile diagrams.
//!
//! Force diagrams always carry weight and normal force. Friction appears
//! when a coefficient was extracted or the text says "friction"; applied and
//! tension forces appear only when a magnitude was extracted. The reveal
//! order is fixed: object, weight, normal, friction, applied, tension, then
//! (inclined plane only) the decomposition of weight. Every force step shows
//! the arithmetic that produced its magnitude.

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::diagram::{DiagramData, DiagramState, Point, StepConfig, fmt_num, round1};
use crate::extract::PhysicsContext;

/// Trajectory samples drawn for a projectile.
const TRAJECTORY_SAMPLES: usize = 24;

// ── Force types ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceType {
    Weight,
    Normal,
    Friction,
    Tension,
    Applied,
    Spring,
}

/// One force vector. The order of forces in a diagram is the reveal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceData {
    /// Unique within a diagram.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ForceType,
    /// Newtons, never negative.
    pub magnitude: f64,
    /// Degrees; 0 points right, positive turns counter-clockwise.
    pub angle: f64,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscript: Option<String>,
}

impl ForceData {
    fn new(kind: ForceType, magnitude: f64, angle: f64, symbol: &str) -> Self {
        let name = match kind {
            ForceType::Weight => "weight",
            ForceType::Normal => "normal",
            ForceType::Friction => "friction",
            ForceType::Tension => "tension",
            ForceType::Applied => "applied",
            ForceType::Spring => "spring",
        };
        Self {
            name: name.to_string(),
            kind,
            magnitude: magnitude.max(0.0),
            angle: normalize_angle(angle),
            symbol: symbol.to_string(),
            subscript: None,
        }
    }

    fn subscript(mut self, sub: &str) -> Self {
        self.subscript = Some(sub.to_string());
        self
    }
}

fn normalize_angle(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsObject {
    pub shape: String,
    /// kg.
    pub mass: f64,
    pub label: String,
}

/// Decomposition of weight along and across an incline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclineGeometry {
    /// Degrees above horizontal; the surface rises to the right.
    pub angle: f64,
    /// `mg·sin(θ)`, pointing down the slope.
    pub parallel_component: f64,
    /// `mg·cos(θ)`, pressing into the surface.
    pub perpendicular_component: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceDiagram {
    pub object: PhysicsObject,
    pub forces: Vec<ForceData>,
    pub gravity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incline: Option<InclineGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileData {
    pub initial_velocity: f64,
    pub launch_angle: f64,
    pub launch_height: f64,
    pub gravity: f64,
    pub vx: f64,
    pub vy: f64,
    pub time_of_flight: f64,
    pub max_height: f64,
    pub range: f64,
    pub trajectory: Vec<Point>,
}

fn mentions_friction(text: &str) -> bool {
    text.to_lowercase().contains("friction")
}

/// Friction coefficient to draw, if friction belongs in the diagram.
fn friction_coefficient(ctx: &PhysicsContext, text: &str, config: &PhysicsConfig) -> Option<f64> {
    ctx.friction_coefficient.or_else(|| {
        mentions_friction(text).then_some(config.default_friction_coefficient)
    })
}

// ── Free-body diagram ───────────────────────────────────────────────────

/// Object resting on a flat surface.
pub fn build_fbd(ctx: &PhysicsContext, text: &str, config: &PhysicsConfig) -> DiagramState {
    let m = ctx.mass.unwrap_or(config.default_mass);
    let g = ctx.gravity;
    let weight = m * g;
    let normal = weight;

    let mut forces = vec![
        ForceData::new(ForceType::Weight, weight, 270.0, "W"),
        ForceData::new(ForceType::Normal, normal, 90.0, "N"),
    ];
    let mut steps = vec![
        StepConfig::new("The object")
            .calculation(format!("m = {}kg", fmt_num(m)))
            .reveals("object"),
        StepConfig::new("Weight pulls straight down")
            .calculation(format!(
                "W = mg = {} × {} = {}N",
                fmt_num(m),
                fmt_num(g),
                fmt_num(weight)
            ))
            .reveals("weight"),
        StepConfig::new("The surface pushes back up")
            .calculation(format!("N = W = {}N", fmt_num(normal)))
            .reveals("normal"),
    ];

    if let Some(mu) = friction_coefficient(ctx, text, config) {
        let friction = round1(mu * normal);
        forces.push(ForceData::new(ForceType::Friction, friction, 180.0, "f"));
        steps.push(
            StepConfig::new("Friction opposes the motion")
                .calculation(format!(
                    "f = μN = {} × {} = {}N",
                    fmt_num(mu),
                    fmt_num(normal),
                    fmt_num(friction)
                ))
                .reveals("friction"),
        );
    }

    push_pulling_forces(ctx, &mut forces, &mut steps, 0.0);

    tracing::debug!(mass = m, forces = forces.len(), "built free-body diagram");
    DiagramState::new(
        DiagramData::Fbd(ForceDiagram {
            object: PhysicsObject {
                shape: "box".into(),
                mass: m,
                label: format!("{}kg", fmt_num(m)),
            },
            forces,
            gravity: g,
            incline: None,
        }),
        steps,
    )
}

/// Applied force then tension, each only if a magnitude was extracted.
fn push_pulling_forces(
    ctx: &PhysicsContext,
    forces: &mut Vec<ForceData>,
    steps: &mut Vec<StepConfig>,
    direction: f64,
) {
    if let Some(applied) = ctx.applied_force {
        forces.push(ForceData::new(ForceType::Applied, applied, direction, "F").subscript("app"));
        steps.push(
            StepConfig::new("The applied force")
                .calculation(format!("F_app = {}N", fmt_num(applied)))
                .reveals("applied"),
        );
    }
    if let Some(tension) = ctx.tension {
        forces.push(ForceData::new(ForceType::Tension, tension, direction, "T"));
        steps.push(
            StepConfig::new("Tension in the rope")
                .calculation(format!("T = {}N", fmt_num(tension)))
                .reveals("tension"),
        );
    }
}

// ── Inclined plane ──────────────────────────────────────────────────────

/// Object on a surface rising to the right at angle θ.
pub fn build_inclined_plane(ctx: &PhysicsContext, text: &str, config: &PhysicsConfig) -> DiagramState {
    let m = ctx.mass.unwrap_or(config.default_mass);
    let g = ctx.gravity;
    let theta = ctx.angle.unwrap_or(config.default_incline_angle);
    let rad = theta.to_radians();

    let weight = m * g;
    let normal = round1(weight * rad.cos());
    let parallel = round1(weight * rad.sin());

    let mut forces = vec![
        ForceData::new(ForceType::Weight, weight, 270.0, "W"),
        ForceData::new(ForceType::Normal, normal, 90.0 + theta, "N"),
    ];
    let mut steps = vec![
        StepConfig::new("The object on the incline")
            .calculation(format!("m = {}kg, θ = {}°", fmt_num(m), fmt_num(theta)))
            .reveals("object"),
        StepConfig::new("Weight pulls straight down")
            .calculation(format!(
                "W = mg = {} × {} = {}N",
                fmt_num(m),
                fmt_num(g),
                fmt_num(weight)
            ))
            .reveals("weight"),
        StepConfig::new("The normal force is perpendicular to the surface")
            .calculation(format!(
                "N = mg·cos(θ) = {} × {} × cos({}°) = {}N",
                fmt_num(m),
                fmt_num(g),
                fmt_num(theta),
                fmt_num(normal)
            ))
            .reveals("normal"),
    ];

    if let Some(mu) = friction_coefficient(ctx, text, config) {
        let friction = round1(mu * normal);
        forces.push(ForceData::new(ForceType::Friction, friction, theta, "f"));
        steps.push(
            StepConfig::new("Friction acts up the slope")
                .calculation(format!(
                    "f = μN = {} × {} = {}N",
                    fmt_num(mu),
                    fmt_num(normal),
                    fmt_num(friction)
                ))
                .reveals("friction"),
        );
    }

    push_pulling_forces(ctx, &mut forces, &mut steps, theta);

    steps.push(
        StepConfig::new("Split the weight into components")
            .calculation(format!(
                "W∥ = mg·sin(θ) = {} × {} × sin({}°) = {}N, W⊥ = mg·cos(θ) = {}N",
                fmt_num(m),
                fmt_num(g),
                fmt_num(theta),
                fmt_num(parallel),
                fmt_num(normal)
            ))
            .reveals("components"),
    );

    tracing::debug!(mass = m, angle = theta, forces = forces.len(), "built inclined-plane diagram");
    DiagramState::new(
        DiagramData::InclinedPlane(ForceDiagram {
            object: PhysicsObject {
                shape: "box".into(),
                mass: m,
                label: format!("{}kg", fmt_num(m)),
            },
            forces,
            gravity: g,
            incline: Some(InclineGeometry {
                angle: theta,
                parallel_component: parallel,
                perpendicular_component: normal,
            }),
        }),
        steps,
    )
}

// ── Projectile ──────────────────────────────────────────────────────────

/// Launch from height `h` (default ground level) at speed `v` and angle θ.
pub fn build_projectile(ctx: &PhysicsContext, config: &PhysicsConfig) -> DiagramState {
    let v = ctx.velocity.unwrap_or(config.default_launch_velocity);
    let theta = ctx.angle.unwrap_or(config.default_launch_angle);
    let h = ctx.height.unwrap_or(0.0).max(0.0);
    let g = ctx.gravity;
    let rad = theta.to_radians();

    let vx = v * rad.cos();
    let vy = v * rad.sin();
    let time = (vy + (vy * vy + 2.0 * g * h).sqrt()) / g;
    let max_height = h + vy.max(0.0).powi(2) / (2.0 * g);
    let range = vx * time;

    let trajectory = (0..=TRAJECTORY_SAMPLES)
        .map(|i| {
            let t = time * i as f64 / TRAJECTORY_SAMPLES as f64;
            let y = (h + vy * t - 0.5 * g * t * t).max(0.0);
            Point::new(round1(vx * t), round1(y))
        })
        .collect();

    let time_calc = if h == 0.0 {
        format!(
            "t = 2vy / g = 2 × {} / {} = {}s",
            fmt_num(vy),
            fmt_num(g),
            fmt_num(time)
        )
    } else {
        format!(
            "t = (vy + √(vy² + 2gh)) / g = ({} + √({}² + 2 × {} × {})) / {} = {}s",
            fmt_num(vy),
            fmt_num(vy),
            fmt_num(g),
            fmt_num(h),
            fmt_num(g),
            fmt_num(time)
        )
    };

    let steps = vec![
        StepConfig::new("The launch")
            .calculation(format!("v₀ = {}m/s at {}°", fmt_num(v), fmt_num(theta)))
            .reveals("launch"),
        StepConfig::new("Split the velocity into components")
            .calculation(format!(
                "vx = v·cos(θ) = {} × cos({}°) = {}m/s, vy = v·sin(θ) = {} × sin({}°) = {}m/s",
                fmt_num(v),
                fmt_num(theta),
                fmt_num(vx),
                fmt_num(v),
                fmt_num(theta),
                fmt_num(vy)
            ))
            .reveals("components"),
        StepConfig::new("Time in the air")
            .calculation(time_calc)
            .reveals("time"),
        StepConfig::new("Highest point")
            .calculation(format!(
                "H = h + vy² / 2g = {} + {}² / (2 × {}) = {}m",
                fmt_num(h),
                fmt_num(vy),
                fmt_num(g),
                fmt_num(max_height)
            ))
            .reveals("apex"),
        StepConfig::new("How far it lands")
            .calculation(format!(
                "R = vx × t = {} × {} ≈ {}m",
                fmt_num(vx),
                fmt_num(time),
                fmt_num(range)
            ))
            .reveals("range"),
    ];

    tracing::debug!(velocity = v, angle = theta, range, "built projectile diagram");
    DiagramState::new(
        DiagramData::Projectile(ProjectileData {
            initial_velocity: v,
            launch_angle: theta,
            launch_height: h,
            gravity: g,
            vx: round1(vx),
            vy: round1(vy),
            time_of_flight: round1(time),
            max_height: round1(max_height),
            range: round1(range),
            trajectory,
        }),
        steps,
    )
}
