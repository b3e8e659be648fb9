//! Network service, radio and module configuration

use core::fmt;

use super::AtCmd;
use crate::Error;

/// `+NCONFIG` functions, in the order of the modem's configuration table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigFunction {
    AutoConnect,
    Cr0354Scrambling,
    Cr0859SiAvoid,
    CombineAttach,
    CellReselection,
    EnableBip,
}

impl ConfigFunction {
    const TABLE: [Self; 6] = [
        Self::AutoConnect,
        Self::Cr0354Scrambling,
        Self::Cr0859SiAvoid,
        Self::CombineAttach,
        Self::CellReselection,
        Self::EnableBip,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AutoConnect => "AUTOCONNECT",
            Self::Cr0354Scrambling => "CR_0354_0338_SCRAMBLING",
            Self::Cr0859SiAvoid => "CR_0859_SI_AVOID",
            Self::CombineAttach => "COMBINE_ATTACH",
            Self::CellReselection => "CELL_RESELECTION",
            Self::EnableBip => "ENABLE_BIP",
        }
    }
}

impl TryFrom<u8> for ConfigFunction {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self, Error> {
        Self::TABLE
            .get(usize::from(index))
            .copied()
            .ok_or(Error::ValueOutOfBounds)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigValue {
    True,
    False,
}

impl ConfigValue {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
        }
    }
}

impl TryFrom<u8> for ConfigValue {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self, Error> {
        match index {
            0 => Ok(Self::True),
            1 => Ok(Self::False),
            _ => Err(Error::ValueOutOfBounds),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SetConfig {
    pub function: ConfigFunction,
    pub value: ConfigValue,
}

impl fmt::Display for SetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AT+NCONFIG=\"{}\",\"{}\"",
            self.function.as_str(),
            self.value.as_str()
        )
    }
}

impl AtCmd for SetConfig {
    fn failure(&self) -> Error {
        Error::FailSetConfig
    }
}

/// EPS network registration status, answered by `+CEREG: <n>,<stat>`
#[derive(Debug, Clone, Copy)]
pub struct GetRegistrationStatus;

impl fmt::Display for GetRegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CEREG?")
    }
}

impl AtCmd for GetRegistrationStatus {
    fn failure(&self) -> Error {
        Error::FailRegistrationStatus
    }
}

/// Radio connection status, answered by `+CSCON: <n>,<mode>`
#[derive(Debug, Clone, Copy)]
pub struct GetConnectionStatus;

impl fmt::Display for GetConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CSCON?")
    }
}

impl AtCmd for GetConnectionStatus {
    fn failure(&self) -> Error {
        Error::FailConnectionStatus
    }
}

/// Answered by `+CSQ: <rssi>,<ber>`
#[derive(Debug, Clone, Copy)]
pub struct GetSignalQuality;

impl fmt::Display for GetSignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CSQ")
    }
}

impl AtCmd for GetSignalQuality {
    fn failure(&self) -> Error {
        Error::FailSignalQuality
    }
}

/// UE statistics dump, decoded by the statistics scanner
#[derive(Debug, Clone, Copy)]
pub struct GetStatistics;

impl fmt::Display for GetStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+NUESTATS")
    }
}

impl AtCmd for GetStatistics {
    fn failure(&self) -> Error {
        Error::FailStatistics
    }
}

/// PS attach or detach, `+CGATT`
#[derive(Debug, Clone, Copy)]
pub struct SetAttach(pub bool);

impl fmt::Display for SetAttach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CGATT={}", u8::from(self.0))
    }
}

impl AtCmd for SetAttach {
    fn failure(&self) -> Error {
        if self.0 {
            Error::FailAttach
        } else {
            Error::FailDetach
        }
    }
}

/// Automatic registration or deregistration, `+COPS`
#[derive(Debug, Clone, Copy)]
pub struct SetRegistration(pub bool);

impl fmt::Display for SetRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "AT+COPS=0" } else { "AT+COPS=2" })
    }
}

impl AtCmd for SetRegistration {
    fn failure(&self) -> Error {
        if self.0 {
            Error::FailRegister
        } else {
            Error::FailDeregister
        }
    }
}

/// Full or minimum functionality, `+CFUN`
#[derive(Debug, Clone, Copy)]
pub struct SetRadio(pub bool);

impl fmt::Display for SetRadio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CFUN={}", u8::from(self.0))
    }
}

impl AtCmd for SetRadio {
    fn failure(&self) -> Error {
        if self.0 {
            Error::FailRadioOn
        } else {
            Error::FailRadioOff
        }
    }
}
