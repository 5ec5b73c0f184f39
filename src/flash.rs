use crate::notification::Severity;
use crate::services::PortalContext;
use serde_json::json;

/// One-shot message set alongside a redirect and consumed by the next render.
#[derive(Clone, Debug, PartialEq)]
pub struct FlashMessage {
    pub severity: Severity,
    pub message: String,
}

pub fn set_flash(ctx: &mut PortalContext, severity: Severity, message: &str) {
    ctx.session.set(
        "flash",
        json!({
            "severity": match severity {
                Severity::Success => "success",
                Severity::Error => "error",
            },
            "message": message,
        }),
    );
}

/// Consume the pending flash, leaving nothing behind. The banner receives the
/// returned value explicitly; nothing reads flash state out of band.
pub fn take_flash(ctx: &mut PortalContext) -> Option<FlashMessage> {
    let value = ctx.session.take("flash")?;
    let message = value.get("message")?.as_str()?.to_string();
    let severity = match value.get("severity").and_then(|s| s.as_str()) {
        Some("error") => Severity::Error,
        _ => Severity::Success,
    };
    Some(FlashMessage { severity, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_is_consumed_once() {
        let mut ctx = PortalContext::default();
        set_flash(&mut ctx, Severity::Success, "Data tersimpan");
        let flash = take_flash(&mut ctx).unwrap();
        assert_eq!(flash.severity, Severity::Success);
        assert_eq!(flash.message, "Data tersimpan");
        assert!(take_flash(&mut ctx).is_none());
    }

    #[test]
    fn newer_flash_replaces_older() {
        let mut ctx = PortalContext::default();
        set_flash(&mut ctx, Severity::Success, "Pertama");
        set_flash(&mut ctx, Severity::Error, "Kedua");
        let flash = take_flash(&mut ctx).unwrap();
        assert_eq!(flash.severity, Severity::Error);
        assert_eq!(flash.message, "Kedua");
    }

    #[test]
    fn missing_flash_is_none() {
        let mut ctx = PortalContext::default();
        assert!(take_flash(&mut ctx).is_none());
    }
}
