//! Typed AT commands.
//!
//! Each command renders its exact wire text through [`core::fmt::Display`]
//! and names the failure reported when the modem does not acknowledge it.
//! Constructors that take free-form input validate it, so a command that
//! exists is always sendable.

pub mod coap;
pub mod network;
pub mod psm;

use core::fmt;

use crate::Error;

/// Maximum rendered length of a command, without line delimiter.
pub const MAX_COMMAND_LEN: usize = 576;

pub trait AtCmd: fmt::Display {
    /// Failure reported when the command is not acknowledged.
    fn failure(&self) -> Error;
}

/// Liveness check
#[derive(Debug, Clone, Copy)]
pub struct At;

impl fmt::Display for At {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT")
    }
}

impl AtCmd for At {
    fn failure(&self) -> Error {
        Error::FailAt
    }
}

/// Reboot the module. Answered by `REBOOTING`, the boot banner and `OK`.
#[derive(Debug, Clone, Copy)]
pub struct Reboot;

impl fmt::Display for Reboot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+NRB")
    }
}

impl AtCmd for Reboot {
    fn failure(&self) -> Error {
        Error::FailReboot
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::format;

    #[test]
    fn general_commands() {
        assert_eq!(format!("{}", At), "AT");
        assert_eq!(format!("{}", Reboot), "AT+NRB");
        assert_eq!(At.failure(), Error::FailAt);
    }
}
