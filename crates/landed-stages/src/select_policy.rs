use crate::state::{filled, PricingState};
use landed_calc::RateMatrix;
use landed_core::{EvaluationContext, PricingError, Stage};

/// Narrowest covering shipping policy, then the destination's zone row
#[derive(Default)]
pub struct SelectPolicyStage;

impl Stage<PricingState> for SelectPolicyStage {
    fn id(&self) -> &'static str {
        "policy.select.v1"
    }

    fn run(&self, mut state: PricingState, ctx: &EvaluationContext<'_>) -> Result<PricingState, PricingError> {
        let billable = filled(&state.billable, "billable weight", self.id())?;
        let matched = RateMatrix::new(ctx.inputs.policies).resolve(
            billable.billable_kg,
            &ctx.request().destination_country,
            ctx.config,
        )?;
        state.policy = Some(matched);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use landed_core::BillableWeight;

    #[test]
    fn test_out_of_order_is_calculation_error() {
        let fixture = Fixture::scenario_one();
        let err = SelectPolicyStage.run(PricingState::default(), &fixture.ctx()).unwrap_err();
        assert_eq!(
            err,
            PricingError::calculation("policy.select.v1 reached with no billable weight in state")
        );
    }

    #[test]
    fn test_policy_recorded() {
        let fixture = Fixture::scenario_one();
        let state = PricingState {
            billable: Some(BillableWeight {
                actual_kg: 0.4,
                volumetric_kg: 0.1,
                billable_kg: 0.4,
            }),
            ..Default::default()
        };
        let state = SelectPolicyStage.run(state, &fixture.ctx()).unwrap();
        assert_eq!(state.policy.unwrap().policy_id, "small-packet");
    }
}
