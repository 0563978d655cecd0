//! Capability negotiation (`CAP LS`, `LIST`, `REQ`, `END`).
//!
//! The offered set lives on the server; each connection carries its enabled
//! set and a [`CapSession`]. Starting negotiation pauses the connection's
//! [`AuthenticationGate`](super::AuthenticationGate) and `END` resumes it.

mod negotiation;
mod set;
mod subcommands;

pub use negotiation::{CapSession, GateAction, GateWatch, Negotiation, PAUSE_REASON};
pub use set::CapabilitySet;

use ircdkit_proto::CapSubCommand;
use tracing::debug;

use crate::error::{HandlerError, HandlerResult};
use crate::extensions::{Context, Event, Extension};

/// The `capabilities` builtin.
pub struct Capabilities;

impl Extension for Capabilities {
    fn name(&self) -> &'static str {
        "capabilities"
    }

    fn handle(&self, ctx: &mut Context<'_>, event: &Event<'_>) -> HandlerResult {
        match event {
            Event::Command(msg) if msg.command_name() == "CAP" => {
                // Client form: `CAP <sub> [<param>]`.
                let args = msg.args();
                let Some(token) = args.first() else {
                    return Err(HandlerError::NeedMoreParams);
                };
                match token.parse::<CapSubCommand>() {
                    Ok(sub) => on_cap(ctx, sub, args.get(1).copied()),
                    Err(_) => Err(HandlerError::InvalidCapCommand(token.to_ascii_uppercase())),
                }
            }
            Event::Authenticated => {
                ctx.conn.cap_session_mut().detach();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn on_cap(ctx: &mut Context<'_>, sub: CapSubCommand, param: Option<&str>) -> HandlerResult {
    if !sub.is_client_initiated() {
        return Err(HandlerError::InvalidCapCommand(sub.as_str().to_string()));
    }

    let nick = ctx.conn.nick_or_star();
    let result = match sub {
        CapSubCommand::LS => subcommands::handle_ls(ctx, &nick),
        CapSubCommand::LIST => subcommands::handle_list(ctx, &nick),
        CapSubCommand::REQ => subcommands::handle_req(ctx, &nick, param.unwrap_or("")),
        _ => {
            debug!(%nick, "capability negotiation ended");
            Ok(())
        }
    };

    // Gate watchers see the subcommand after its reply is queued.
    let gate_installed = ctx.conn.gate().is_some();
    match ctx.conn.cap_session_mut().advance(sub, gate_installed) {
        Some(GateAction::Pause) => {
            ctx.conn.pause_authentication(PAUSE_REASON);
        }
        Some(GateAction::Resume) => {
            ctx.conn.resume_authentication();
        }
        None => {}
    }

    result
}
