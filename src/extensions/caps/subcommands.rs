use ircdkit_proto::{CapSubCommand, Command};
use tracing::debug;

use crate::error::HandlerResult;
use crate::extensions::Context;

fn cap_reply(nick: &str, sub: CapSubCommand, param: String) -> Command {
    Command::CAP(Some(nick.to_string()), sub, None, Some(param))
}

/// Handle `CAP LS [version]` - list offered capabilities.
pub fn handle_ls(ctx: &mut Context<'_>, nick: &str) -> HandlerResult {
    let offered = ctx.server.capabilities();
    debug!(%nick, caps = %offered, "CAP LS");
    ctx.reply(cap_reply(nick, CapSubCommand::LS, offered.to_string()))
}

/// Handle `CAP LIST` - list capabilities enabled on this connection.
pub fn handle_list(ctx: &mut Context<'_>, nick: &str) -> HandlerResult {
    let enabled = ctx.conn.capabilities().to_string();
    debug!(%nick, caps = %enabled, "CAP LIST");
    ctx.reply(cap_reply(nick, CapSubCommand::LIST, enabled))
}

/// Handle `CAP REQ :<names>`.
///
/// The request is accepted only if every name is offered; a partial match
/// changes nothing. Either way the request is echoed back verbatim.
pub fn handle_req(ctx: &mut Context<'_>, nick: &str, requested: &str) -> HandlerResult {
    let names: Vec<&str> = requested.split_whitespace().collect();

    let reply = if !names.is_empty() && ctx.server.has_capabilities(&names) {
        ctx.conn.enable_capabilities(&names);
        debug!(%nick, requested, "CAP REQ ACK");
        CapSubCommand::ACK
    } else {
        debug!(%nick, requested, "CAP REQ NAK");
        CapSubCommand::NAK
    };

    ctx.reply(cap_reply(nick, reply, requested.to_string()))
}
