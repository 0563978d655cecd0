//! Cooperative pause/resume point for registration.

/// Gate installed on a connection by the authentication extension.
///
/// Other extensions may hold registration back with [`pause`] and release it
/// with [`resume`]. Both are idempotent: only the transition is reported.
///
/// [`pause`]: AuthenticationGate::pause
/// [`resume`]: AuthenticationGate::resume
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuthenticationGate {
    paused: Option<String>,
}

impl AuthenticationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause registration. Returns `true` if the gate was open.
    pub fn pause(&mut self, reason: &str) -> bool {
        if self.paused.is_some() {
            return false;
        }
        self.paused = Some(reason.to_string());
        true
    }

    /// Resume registration. Returns `true` if the gate was paused.
    pub fn resume(&mut self) -> bool {
        self.paused.take().is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_some()
    }

    /// Why the gate is paused, if it is.
    pub fn reason(&self) -> Option<&str> {
        self.paused.as_deref()
    }
}
