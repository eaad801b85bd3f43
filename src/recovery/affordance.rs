/// Visual tone of the save control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Busy,
    Success,
    Warning,
    Danger,
}

impl Tone {
    /// Background colour used by the page.
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Normal | Tone::Busy | Tone::Success => "#000000",
            Tone::Warning => "#F39C12",
            Tone::Danger => "#E74C3C",
        }
    }
}

pub const IDLE_LABEL: &str = "Save message";
pub const BUSY_LABEL: &str = "Saving...";
pub const SAVED_LABEL: &str = "Saved!";
pub const EDITED_LABEL: &str = "Edited!";
pub const SESSION_EXPIRED_LABEL: &str = "Session expired - refreshing...";
pub const FAILED_LABEL: &str = "Save failed - try again";

/// What the save control shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub label: String,
    pub tone: Tone,
    /// Input and button disabled.
    pub disabled: bool,
}

impl Affordance {
    fn new(label: &str, tone: Tone, disabled: bool) -> Self {
        Self {
            label: label.to_string(),
            tone,
            disabled,
        }
    }

    pub fn idle() -> Self {
        Self::new(IDLE_LABEL, Tone::Normal, false)
    }

    pub fn busy() -> Self {
        Self::new(BUSY_LABEL, Tone::Busy, true)
    }

    pub fn succeeded(label: &str) -> Self {
        Self::new(label, Tone::Success, true)
    }

    pub fn session_expired() -> Self {
        Self::new(SESSION_EXPIRED_LABEL, Tone::Warning, true)
    }

    /// The control is re-enabled right away so the user can edit and resubmit.
    pub fn failed() -> Self {
        Self::new(FAILED_LABEL, Tone::Danger, false)
    }
}
