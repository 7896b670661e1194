//! Long-division diagram: one reveal step per dividend digit.

use crate::diagram::{DiagramData, DiagramState, StepConfig};
use crate::division::{DivisionTrace, StepKind, simulate};
use crate::extract::DivisionOperands;

/// Build the diagram from extracted operands. `None` only for a zero
/// divisor, which the extractor never produces.
pub fn build_long_division(operands: DivisionOperands) -> Option<DiagramState> {
    let trace = match simulate(operands.dividend, operands.divisor) {
        Ok(trace) => trace,
        Err(e) => {
            tracing::warn!("long division not simulated: {e}");
            return None;
        }
    };

    let steps = step_config(&trace);
    tracing::debug!(
        dividend = trace.dividend,
        divisor = trace.divisor,
        steps = steps.len(),
        "built long-division diagram"
    );
    Some(DiagramState::new(DiagramData::LongDivision(trace), steps))
}

fn step_config(trace: &DivisionTrace) -> Vec<StepConfig> {
    let DivisionTrace {
        dividend, divisor, ..
    } = *trace;
    let digits = dividend.to_string().len();

    let mut steps = vec![
        StepConfig::new("Set up the problem")
            .calculation(format!("{divisor} ) {dividend}"))
            .reveals("setup"),
    ];

    for position in 0..digits {
        let rows: Vec<_> = trace.steps_at(position).collect();
        let brought = rows.iter().find(|r| r.kind == StepKind::BringDown);
        let divide = rows.iter().find(|r| r.kind == StepKind::Divide);
        let cycle = rows.iter().any(|r| r.kind == StepKind::Multiply);

        let label = match (brought, divide, cycle) {
            (_, Some(d), false) => format!(
                "{divisor} does not go into {}, so the quotient starts with 0",
                d.working_number.unwrap_or_default()
            ),
            (Some(b), _, _) => format!(
                "Bring down to make {} and divide",
                b.working_number.unwrap_or_default()
            ),
            _ => "Divide, multiply, subtract".to_string(),
        };

        let mut calc = rows
            .iter()
            .filter(|r| {
                matches!(
                    r.kind,
                    StepKind::Divide | StepKind::Multiply | StepKind::Subtract
                )
            })
            .filter_map(|r| r.calculation.clone())
            .collect::<Vec<_>>()
            .join(", ");

        if position + 1 == digits {
            calc.push_str(&format!(", so {dividend} ÷ {divisor} = {}", trace.answer()));
        }

        steps.push(
            StepConfig::new(label)
                .calculation(calc)
                .reveals(format!("digit-{position}")),
        );
    }

    steps
}
