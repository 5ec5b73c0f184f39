use crate::notification::Severity;
use crate::services::{FieldErrors, ImageUpload, PortalError, ServiceResult};
use serde_json::Value;
use std::collections::BTreeMap;

/// Delay before the post-success navigation, within the 1000-1500 ms window
/// the admin screens use.
pub const REDIRECT_DELAY_MS: u64 = 1200;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MutationPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Body of a remote mutation: a plain field map, or multipart once a file
/// rides along.
#[derive(Clone, Debug)]
pub enum MutationPayload {
    Fields(BTreeMap<String, Value>),
    Multipart {
        fields: BTreeMap<String, Value>,
        files: Vec<ImageUpload>,
    },
}

impl MutationPayload {
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        match self {
            MutationPayload::Fields(fields) => fields,
            MutationPayload::Multipart { fields, .. } => fields,
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, MutationPayload::Multipart { .. })
    }

    /// Append a file, upgrading a plain payload to multipart.
    pub fn attach(self, file: ImageUpload) -> Self {
        match self {
            MutationPayload::Fields(fields) => MutationPayload::Multipart {
                fields,
                files: vec![file],
            },
            MutationPayload::Multipart { fields, mut files } => {
                files.push(file);
                MutationPayload::Multipart { fields, files }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct SubmitSpec {
    pub endpoint: String,
    pub success_message: String,
    pub redirect_to: Option<String>,
}

impl SubmitSpec {
    pub fn new(endpoint: &str, success_message: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            success_message: success_message.to_string(),
            redirect_to: None,
        }
    }

    pub fn redirecting_to(mut self, to: &str) -> Self {
        self.redirect_to = Some(to.to_string());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Redirect {
    pub to: String,
    pub delay_ms: u64,
}

/// What the screen does after a mutation settles: maybe flash a banner, maybe
/// navigate, maybe pin errors next to their inputs. The in-flight flag is
/// always cleared before this is handed back.
#[derive(Clone, Debug, Default)]
pub struct Completion {
    pub succeeded: bool,
    pub notification: Option<(Severity, String)>,
    pub field_errors: FieldErrors,
    pub redirect: Option<Redirect>,
}

/// Wraps a create/update/delete call: tracks the submitting phase, rejects
/// overlapping submissions from the same control, and folds the outcome into
/// a [`Completion`]. Failed mutations are never retried; the form simply
/// becomes interactive again.
#[derive(Clone, Debug, Default)]
pub struct MutationGateway {
    phase: MutationPhase,
    last_phase: MutationPhase,
}

impl MutationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    /// How the previous submission ended, for re-enabling controls.
    pub fn last_phase(&self) -> MutationPhase {
        self.last_phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == MutationPhase::Submitting
    }

    /// Enter the submitting phase. Returns false (and changes nothing) when a
    /// submission is already in flight: the double-submit guard.
    pub fn begin(&mut self) -> bool {
        if self.phase == MutationPhase::Submitting {
            return false;
        }
        self.phase = MutationPhase::Submitting;
        true
    }

    pub fn complete_ok(&mut self, spec: &SubmitSpec) -> Completion {
        self.last_phase = MutationPhase::Succeeded;
        self.phase = MutationPhase::Idle;
        Completion {
            succeeded: true,
            notification: Some((Severity::Success, spec.success_message.clone())),
            field_errors: FieldErrors::new(),
            redirect: spec.redirect_to.as_ref().map(|to| Redirect {
                to: to.clone(),
                delay_ms: REDIRECT_DELAY_MS,
            }),
        }
    }

    pub fn complete_err(&mut self, error: PortalError) -> Completion {
        self.last_phase = MutationPhase::Failed;
        self.phase = MutationPhase::Idle;
        match error {
            PortalError::Validation(field_errors) => Completion {
                succeeded: false,
                notification: None,
                field_errors,
                redirect: None,
            },
            other => Completion {
                succeeded: false,
                notification: Some((Severity::Error, other.to_string())),
                field_errors: FieldErrors::new(),
                redirect: None,
            },
        }
    }

    /// Run a mutation through the full lifecycle. `None` means the submission
    /// was rejected by the double-submit guard and the operation never ran.
    pub fn submit<T>(
        &mut self,
        spec: &SubmitSpec,
        op: impl FnOnce() -> ServiceResult<T>,
    ) -> Option<Completion> {
        if !self.begin() {
            return None;
        }
        match op() {
            Ok(_) => Some(self.complete_ok(spec)),
            Err(error) => Some(self.complete_err(error)),
        }
    }
}
