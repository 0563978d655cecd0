//! Keepalive watchdog.
//!
//! The [`Watchdog`] is a plain state machine over explicit instants; the
//! connection task sleeps until [`Watchdog::next_deadline`] and then delivers
//! [`Event::KeepaliveTick`]. The [`Ping`] extension drives it.

use std::time::{Duration, Instant};

use ircdkit_proto::Command;
use tracing::{debug, warn};

use crate::error::HandlerResult;
use crate::extensions::{Context, Event, Extension};

/// Outcome of a deadline passing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogAction {
    /// Send a liveness probe.
    Probe,
    /// The previous probe went unanswered.
    TimedOut,
}

/// Per-connection keepalive timer with a single repeating deadline.
#[derive(Debug, Clone)]
pub struct Watchdog {
    interval: Duration,
    deadline: Option<Instant>,
    awaiting_response: bool,
}

impl Watchdog {
    /// A zero interval disables the watchdog.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            awaiting_response: false,
        }
    }

    /// Restart the timer one interval from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.cancel();
        if !self.interval.is_zero() {
            self.deadline = Some(now + self.interval);
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.awaiting_response = false;
    }

    /// Advance the timer to `now`.
    pub fn tick(&mut self, now: Instant) -> Option<WatchdogAction> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }

        // A late tick still leaves the peer a full interval to answer.
        self.deadline = Some(now + self.interval);
        if self.awaiting_response {
            self.cancel();
            Some(WatchdogAction::TimedOut)
        } else {
            self.awaiting_response = true;
            Some(WatchdogAction::Probe)
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// The `ping` builtin.
pub struct Ping;

impl Extension for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn handle(&self, ctx: &mut Context<'_>, event: &Event<'_>) -> HandlerResult {
        match event {
            Event::Accepted | Event::Authorized => ctx.conn.watchdog_mut().schedule(ctx.now),
            Event::Command(msg) => {
                ctx.conn.watchdog_mut().schedule(ctx.now);
                match &msg.command {
                    Command::PING(..) => {
                        debug!(id = %ctx.conn.id(), "responding to ping");
                        let host = ctx.config().hostname.clone();
                        ctx.reply(Command::PONG(host, None))?;
                    }
                    Command::PONG(..) => debug!(mask = %ctx.conn.mask(), "received pong"),
                    _ => {}
                }
            }
            Event::Quit => ctx.conn.watchdog_mut().cancel(),
            Event::KeepaliveTick => match ctx.conn.watchdog_mut().tick(ctx.now) {
                Some(WatchdogAction::Probe) => {
                    let mask = ctx.conn.mask();
                    debug!(%mask, "pinging");
                    ctx.reply(Command::PING(mask, None))?;
                }
                Some(WatchdogAction::TimedOut) => {
                    warn!(id = %ctx.conn.id(), mask = %ctx.conn.mask(), "ping timeout");
                    ctx.conn.close();
                }
                None => {}
            },
            _ => {}
        }
        Ok(())
    }
}
