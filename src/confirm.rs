use crate::gateway::{Completion, MutationGateway, SubmitSpec};
use crate::services::ServiceResult;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    Open {
        target: i64,
    },
}

/// Blocking yes/no gate in front of a destructive action. Opening carries the
/// target row's key; confirming runs the mutation exactly once per open/close
/// cycle and closes whatever the outcome; cancelling closes with no side
/// effects.
#[derive(Clone, Debug, Default)]
pub struct ConfirmationModal {
    state: ModalState,
}

impl ConfirmationModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open { .. })
    }

    pub fn target(&self) -> Option<i64> {
        match self.state {
            ModalState::Open { target } => Some(target),
            ModalState::Closed => None,
        }
    }

    pub fn open(&mut self, target: i64) {
        self.state = ModalState::Open { target };
    }

    pub fn cancel(&mut self) {
        self.state = ModalState::Closed;
    }

    /// Run the confirmed mutation through the gateway. Returns `None` when
    /// the modal is closed (nothing to confirm) or when a submission is still
    /// in flight, so a rapid second click cannot double-submit.
    pub fn confirm(
        &mut self,
        gateway: &mut MutationGateway,
        spec: &SubmitSpec,
        op: impl FnOnce(i64) -> ServiceResult<()>,
    ) -> Option<Completion> {
        let target = self.target()?;
        let completion = gateway.submit(spec, || op(target))?;
        self.state = ModalState::Closed;
        Some(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::PortalError;

    fn spec() -> SubmitSpec {
        SubmitSpec::new("achievements.destroy", "Prestasi dihapus")
    }

    #[test]
    fn cancel_never_runs_the_mutation() {
        let mut modal = ConfirmationModal::new();
        let mut gateway = MutationGateway::new();
        modal.open(7);
        modal.cancel();
        let mut ran = false;
        let outcome = modal.confirm(&mut gateway, &spec(), |_| {
            ran = true;
            Ok(())
        });
        assert!(outcome.is_none());
        assert!(!ran);
    }

    #[test]
    fn confirm_runs_once_and_closes() {
        let mut modal = ConfirmationModal::new();
        let mut gateway = MutationGateway::new();
        modal.open(7);
        let mut calls = 0;
        let outcome = modal.confirm(&mut gateway, &spec(), |target| {
            assert_eq!(target, 7);
            calls += 1;
            Ok(())
        });
        assert!(outcome.unwrap().succeeded);
        assert!(!modal.is_open());
        // A second confirm on the now-closed modal is a no-op.
        let outcome = modal.confirm(&mut gateway, &spec(), |_| {
            calls += 1;
            Ok(())
        });
        assert!(outcome.is_none());
        assert_eq!(calls, 1);
    }

    #[test]
    fn in_flight_guard_blocks_double_click() {
        let mut modal = ConfirmationModal::new();
        let mut gateway = MutationGateway::new();
        modal.open(3);
        assert!(gateway.begin());
        let outcome = modal.confirm(&mut gateway, &spec(), |_| Ok(()));
        assert!(outcome.is_none());
        // Still open: the click was swallowed, not half-applied.
        assert!(modal.is_open());
    }

    #[test]
    fn failed_mutation_still_closes_modal() {
        let mut modal = ConfirmationModal::new();
        let mut gateway = MutationGateway::new();
        modal.open(9);
        let outcome = modal.confirm(&mut gateway, &spec(), |_| {
            Err(PortalError::Internal("timeout".into()))
        });
        let completion = outcome.unwrap();
        assert!(!completion.succeeded);
        assert!(!modal.is_open());
    }
}
