use crate::notification::{NotificationBanner, Severity};

/// Render the shared notification banner. Hidden state renders nothing so the
/// layout collapses.
pub fn render_banner(banner: &NotificationBanner) -> String {
    let Some(message) = banner.message() else {
        return String::new();
    };
    let class = match banner.severity() {
        Some(Severity::Error) => "banner banner-error",
        _ => "banner banner-success",
    };
    format!(
        "<div class=\"{}\" role=\"status\"><span class=\"banner-text\">{}</span><button class=\"banner-dismiss\" aria-label=\"Tutup\">&times;</button></div>",
        class,
        escape(message)
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn hidden_banner_renders_nothing() {
        let banner = NotificationBanner::new();
        assert!(render_banner(&banner).is_empty());
    }

    #[test]
    fn severity_picks_class() {
        let mut banner = NotificationBanner::new();
        banner.show("Gagal menyimpan", Severity::Error, Utc::now());
        let html = render_banner(&banner);
        assert!(html.contains("banner-error"));
        assert!(html.contains("Gagal menyimpan"));
    }

    #[test]
    fn message_is_escaped() {
        let mut banner = NotificationBanner::new();
        banner.show("<script>x</script>", Severity::Success, Utc::now());
        let html = render_banner(&banner);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
