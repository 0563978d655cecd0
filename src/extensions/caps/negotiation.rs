//! Per-connection negotiation state.
//!
//! ```text
//!            LS / REQ              END
//!   Idle ─────────────▶ Negotiating ─────▶ Ended
//!     │                                     ▲
//!     └──────────────── END ────────────────┘
//! ```
//!
//! Alongside the negotiation state the session tracks which gate watcher is
//! attached. The start watcher pauses authentication when negotiation begins,
//! the end watcher resumes it on `END`. At most one of them is attached.

use ircdkit_proto::CapSubCommand;

/// Capability negotiation state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    #[default]
    Idle,
    Negotiating,
    Ended,
}

/// Which authentication gate watcher is attached.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GateWatch {
    /// Waiting for the first `LS`/`REQ` to pause the gate.
    #[default]
    Start,
    /// Gate paused; waiting for `END` to resume it.
    AwaitingEnd,
    /// No watcher attached.
    Detached,
}

/// What the caller must do to the connection's gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    Pause,
    Resume,
}

/// Reason recorded on the gate while negotiation holds it.
pub const PAUSE_REASON: &str = "capability negotiation";

/// Negotiation session owned by a connection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapSession {
    state: Negotiation,
    watch: GateWatch,
}

impl CapSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Negotiation {
        self.state
    }

    pub fn watch(&self) -> GateWatch {
        self.watch
    }

    /// Advance on a client subcommand.
    ///
    /// `gate_installed` reports whether the connection carries an
    /// authentication gate; without one the start watcher stays attached.
    pub fn advance(&mut self, sub: CapSubCommand, gate_installed: bool) -> Option<GateAction> {
        let starts = matches!(sub, CapSubCommand::LS | CapSubCommand::REQ);

        match sub {
            _ if starts => self.state = Negotiation::Negotiating,
            CapSubCommand::END => self.state = Negotiation::Ended,
            _ => {}
        }

        match self.watch {
            GateWatch::Start if starts && gate_installed => {
                self.watch = GateWatch::AwaitingEnd;
                Some(GateAction::Pause)
            }
            GateWatch::AwaitingEnd if sub == CapSubCommand::END => {
                self.watch = GateWatch::Detached;
                Some(GateAction::Resume)
            }
            _ => None,
        }
    }

    /// Detach both watchers once the connection is authenticated.
    pub fn detach(&mut self) {
        self.watch = GateWatch::Detached;
    }
}
