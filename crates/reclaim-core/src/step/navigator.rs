//! The booking wizard: a step pointer over a booking session, with gating.
//!
//! Forward movement is earned one step at a time by validating the current
//! step; backward movement is free so a client can revisit earlier data.
//! The pre-submission sweep re-checks every step from the start and, on
//! failure, parks the pointer at the first invalid step. Only that lowest
//! invalid step is surfaced per sweep; later invalid steps appear on the
//! next sweep once it is fixed. That staging is deliberate, not a bug: one
//! problem at a time.

use serde::{Deserialize, Serialize};

use crate::booking::session::{self, BookingCommand};
use crate::booking::{BookingState, StepId};
use crate::payment::PaymentGateway;
use crate::schema::FieldErrors;

use super::{StepError, check_step, validate_step};

/// The first step a sweep found invalid, with its field errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepFailure {
    pub step: StepId,
    pub errors: FieldErrors,
}

/// One booking session's wizard: collected state plus the active step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWizard {
    state: BookingState,
    step: StepId,
}

impl BookingWizard {
    /// A fresh wizard at the service-selection step with empty state.
    pub fn new() -> Self {
        Self {
            state: BookingState::default(),
            step: StepId::ServiceSelection,
        }
    }

    pub fn current_step(&self) -> StepId {
        self.step
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    /// Whether the wizard has reached the terminal step.
    pub fn is_complete(&self) -> bool {
        self.step == StepId::Success
    }

    /// Apply a state mutation through the session reducer.
    pub fn apply(&mut self, command: BookingCommand) {
        session::apply(&mut self.state, command);
    }

    /// Pure validity probe for the current step.
    ///
    /// Used to enable or disable the "Continue" control, so it must never
    /// trigger payment-intent creation: the confirmation probe is
    /// schema-only.
    pub fn is_current_step_valid(&self) -> bool {
        check_step(self.step, &self.state).is_ok()
    }

    /// Field errors for the current step, if any. Pure, like
    /// [`Self::is_current_step_valid`].
    pub fn current_step_errors(&self) -> Option<FieldErrors> {
        check_step(self.step, &self.state).err()
    }

    /// Validate the current step with side effects permitted.
    ///
    /// On the confirmation step this creates the payment intent if one
    /// does not exist yet. Used on an explicit "Continue".
    pub async fn validate_current_step(
        &mut self,
        gateway: &dyn PaymentGateway,
    ) -> Result<(), StepError> {
        validate_step(self.step, &mut self.state, gateway).await
    }

    /// Validate the current step and, on success, move forward one step.
    ///
    /// Returns the new step. Any validation failure blocks the advance
    /// and leaves the pointer where it was.
    pub async fn advance(&mut self, gateway: &dyn PaymentGateway) -> Result<StepId, StepError> {
        let Some(next) = self.step.next() else {
            return Err(StepError::Complete);
        };

        self.validate_current_step(gateway).await?;
        tracing::debug!(from = %self.step, to = %next, "advancing booking step");
        self.step = next;
        Ok(self.step)
    }

    /// Move back one step. Always permitted while the wizard is not
    /// complete; returns the (possibly unchanged) active step.
    pub fn back(&mut self) -> StepId {
        if let Some(prev) = self.step.prev() {
            if StepId::is_valid_transition(self.step, prev) {
                tracing::debug!(from = %self.step, to = %prev, "navigating back");
                self.step = prev;
            }
        }
        self.step
    }

    /// Jump directly to an earlier step. Forward jumps are refused; the
    /// only way forward is [`Self::advance`].
    pub fn go_back_to(&mut self, step: StepId) -> bool {
        if step.index() < self.step.index() && StepId::is_valid_transition(self.step, step) {
            self.step = step;
            true
        } else {
            false
        }
    }

    /// Re-validate every step from the start through the current step,
    /// short-circuiting at the first failure.
    ///
    /// Pure: uses the schema-only check for every step, including
    /// confirmation. Used before final submission to catch earlier data
    /// that went stale after it was committed.
    pub fn validate_all_steps_up_to_current(&self) -> Result<(), SweepFailure> {
        for step in self.steps_up_to_current() {
            if let Err(errors) = check_step(step, &self.state) {
                return Err(SweepFailure { step, errors });
            }
        }
        Ok(())
    }

    /// Sweep all steps up to the current one and, on the first failure,
    /// move the active step pointer to the failing step.
    ///
    /// Returns `true` when every step passed (pointer untouched), `false`
    /// when the pointer was moved to the first invalid step.
    pub fn validate_and_navigate_to_first_invalid_step(&mut self) -> bool {
        match self.validate_all_steps_up_to_current() {
            Ok(()) => true,
            Err(failure) => {
                tracing::info!(
                    step = %failure.step,
                    fields = failure.errors.len(),
                    "sweep found invalid step, navigating to it"
                );
                self.step = failure.step;
                false
            }
        }
    }

    fn steps_up_to_current(&self) -> impl Iterator<Item = StepId> {
        let current = self.step.index();
        StepId::ALL
            .into_iter()
            .filter(move |step| step.index() <= current && *step != StepId::Success)
    }
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new()
    }
}
