use std::time::{Duration, Instant};

/// How long a popup stays on screen, dimmed, after its timeout
pub const FADE: Duration = Duration::from_millis(650);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Display phase of a popup at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Shown,
    Fading,
}

#[derive(Debug, Clone)]
pub struct Popup {
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
    timeout: Duration,
}

impl Popup {
    /// None once the popup has fully faded
    pub fn phase(&self, now: Instant) -> Option<Phase> {
        let age = now.saturating_duration_since(self.shown_at);
        if age < self.timeout {
            Some(Phase::Shown)
        } else if age < self.timeout + FADE {
            Some(Phase::Fading)
        } else {
            None
        }
    }
}

/// Stack of transient messages, oldest first
#[derive(Debug, Clone)]
pub struct Popups {
    items: Vec<Popup>,
    default_timeout: Duration,
}

impl Popups {
    pub fn new(default_timeout: Duration) -> Self {
        Popups {
            items: Vec::new(),
            default_timeout,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.show_at(message, severity, self.default_timeout, Instant::now());
    }

    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        timeout: Duration,
        now: Instant,
    ) {
        self.items.push(Popup {
            message: message.into(),
            severity,
            shown_at: now,
            timeout,
        });
    }

    /// Drop popups whose fade has finished
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|p| p.phase(now).is_some());
    }

    /// Popups still on screen with their phase
    pub fn visible(&self, now: Instant) -> Vec<(&Popup, Phase)> {
        self.items
            .iter()
            .filter_map(|p| p.phase(now).map(|phase| (p, phase)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Most recent message, if any
    pub fn last(&self) -> Option<&Popup> {
        self.items.last()
    }
}
