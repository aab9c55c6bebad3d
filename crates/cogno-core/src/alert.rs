use std::time::{Duration, Instant};

/// Debounces the audible alert while the user stays distracted.
///
/// An alert is due when the previous tick was not distracted, or when more
/// than `cooldown` has passed since the last alert. Leaving the distracted
/// state therefore re-arms the alert immediately.
#[derive(Debug, Clone)]
pub struct AlertGate {
    cooldown: Duration,
    last_distracted: bool,
    last_alert: Option<Instant>,
}

impl AlertGate {
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_distracted: false,
            last_alert: None,
        }
    }

    /// Record one classified tick and report whether the alert should sound.
    ///
    /// The alert timestamp is recorded whenever the gate opens, whether or
    /// not playback later succeeds.
    pub fn observe(&mut self, distracted: bool, now: Instant) -> bool {
        let fire = distracted && (!self.last_distracted || self.cooldown_elapsed(now));
        if fire {
            self.last_alert = Some(now);
        }
        self.last_distracted = distracted;
        fire
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.last_alert {
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
            None => true,
        }
    }

    #[must_use]
    pub const fn last_alert(&self) -> Option<Instant> {
        self.last_alert
    }

    #[must_use]
    pub const fn last_distracted(&self) -> bool {
        self.last_distracted
    }
}
