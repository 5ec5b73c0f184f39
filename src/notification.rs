use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long a banner stays up before the timeout transition fires.
pub const AUTO_DISMISS_MS: i64 = 5000;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
enum BannerState {
    Hidden,
    Visible {
        message: String,
        severity: Severity,
        deadline: DateTime<Utc>,
    },
}

/// Transient success/error banner. Only one message is shown at a time: a new
/// `show` replaces the current message and restarts the auto-dismiss timer.
#[derive(Clone, Debug)]
pub struct NotificationBanner {
    state: BannerState,
}

impl Default for NotificationBanner {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBanner {
    pub fn new() -> Self {
        Self {
            state: BannerState::Hidden,
        }
    }

    pub fn show(&mut self, message: &str, severity: Severity, now: DateTime<Utc>) {
        self.state = BannerState::Visible {
            message: message.to_string(),
            severity,
            deadline: now + Duration::milliseconds(AUTO_DISMISS_MS),
        };
    }

    pub fn dismiss(&mut self) {
        self.state = BannerState::Hidden;
    }

    /// Apply the timeout transition. Returns true when the deadline passed
    /// and the banner hid itself on this call.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if let BannerState::Visible { deadline, .. } = &self.state {
            if now >= *deadline {
                self.state = BannerState::Hidden;
                return true;
            }
        }
        false
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, BannerState::Visible { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match &self.state {
            BannerState::Visible { message, .. } => Some(message),
            BannerState::Hidden => None,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match &self.state {
            BannerState::Visible { severity, .. } => Some(*severity),
            BannerState::Hidden => None,
        }
    }
}
