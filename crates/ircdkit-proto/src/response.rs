//! IRC numeric response codes used by the connection core.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

use std::str::FromStr;

/// IRC server response code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 410 - Invalid CAP subcommand
    ERR_INVALIDCAPCMD = 410,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 432 - Erroneous nickname
    ERR_ERRONEUSNICKNAME = 432,
    /// 433 - Nickname is already in use
    ERR_NICKNAMEINUSE = 433,
    /// 451 - You have not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - You may not reregister
    ERR_ALREADYREGISTRED = 462,
    /// 464 - Password incorrect
    ERR_PASSWDMISMATCH = 464,
}

impl Response {
    /// Numeric value of the response.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look a response up by its numeric value.
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            1 => Self::RPL_WELCOME,
            410 => Self::ERR_INVALIDCAPCMD,
            421 => Self::ERR_UNKNOWNCOMMAND,
            431 => Self::ERR_NONICKNAMEGIVEN,
            432 => Self::ERR_ERRONEUSNICKNAME,
            433 => Self::ERR_NICKNAMEINUSE,
            451 => Self::ERR_NOTREGISTERED,
            461 => Self::ERR_NEEDMOREPARAMS,
            462 => Self::ERR_ALREADYREGISTRED,
            464 => Self::ERR_PASSWDMISMATCH,
            _ => return None,
        })
    }

    /// Whether this is an error numeric (400-599).
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl FromStr for Response {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        s.parse::<u16>()
            .ok()
            .and_then(Response::from_code)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_digit_codes() {
        assert_eq!("001".parse::<Response>(), Ok(Response::RPL_WELCOME));
        assert_eq!("410".parse::<Response>(), Ok(Response::ERR_INVALIDCAPCMD));
        assert!("1".parse::<Response>().is_err());
        assert!("999".parse::<Response>().is_err());
    }

    #[test]
    fn error_range() {
        assert!(Response::ERR_NICKNAMEINUSE.is_error());
        assert!(!Response::RPL_WELCOME.is_error());
    }
}
