use crate::confirm::ConfirmationModal;
use crate::gateway::MutationGateway;

/// Render the shared delete-confirmation dialog. The confirm button is
/// disabled while a mutation is in flight.
pub fn render_confirm_modal(
    modal: &ConfirmationModal,
    gateway: &MutationGateway,
    prompt: &str,
) -> String {
    let Some(target) = modal.target() else {
        return String::new();
    };
    let disabled = if gateway.is_submitting() {
        " disabled"
    } else {
        ""
    };
    format!(
        "<div class=\"modal-backdrop\"><div class=\"modal\" role=\"dialog\" data-target=\"{}\"><p>{}</p><div class=\"modal-actions\"><button class=\"btn-cancel\">Batal</button><button class=\"btn-confirm\"{}>Hapus</button></div></div></div>",
        target, prompt, disabled
    )
}
