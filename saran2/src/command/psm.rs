//! Power saving mode, `+CPSMS`

use core::fmt;

use super::AtCmd;
use crate::Error;

/// Periodic TAU timer units, 3GPP TS 24.008 GPRS Timer 3.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum T3412Unit {
    TenMinutes = 0b000,
    OneHour = 0b001,
    TenHours = 0b010,
    TwoSeconds = 0b011,
    ThirtySeconds = 0b100,
    OneMinute = 0b101,
    ThreeHundredTwentyHours = 0b110,
    Deactivated = 0b111,
}

/// Active time units, 3GPP TS 24.008 GPRS Timer 2.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum T3324Unit {
    TwoSeconds = 0b000,
    OneMinute = 0b001,
    SixMinutes = 0b010,
    Deactivated = 0b111,
}

/// A PSM timer as the 8 character binary string used on the wire: three
/// unit bits followed by a five bit value, e.g. `"00100011"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PsmTimer([u8; 8]);

impl PsmTimer {
    /// Validate a wire encoded timer.
    pub fn from_bits(bits: &[u8]) -> Result<Self, Error> {
        let bits: [u8; 8] = bits.try_into().map_err(|_| Error::ValueOutOfBounds)?;
        if bits.iter().all(|b| *b == b'0' || *b == b'1') {
            Ok(Self(bits))
        } else {
            Err(Error::ValueOutOfBounds)
        }
    }

    pub fn t3412(unit: T3412Unit, value: u8) -> Result<Self, Error> {
        Self::encode(unit as u8, value)
    }

    pub fn t3324(unit: T3324Unit, value: u8) -> Result<Self, Error> {
        Self::encode(unit as u8, value)
    }

    fn encode(unit: u8, value: u8) -> Result<Self, Error> {
        if value > 0b1_1111 {
            return Err(Error::ValueOutOfBounds);
        }
        let byte = (unit << 5) | value;
        let mut bits = [b'0'; 8];
        for (i, bit) in bits.iter_mut().enumerate() {
            if byte & (0x80 >> i) != 0 {
                *bit = b'1';
            }
        }
        Ok(Self(bits))
    }

    pub fn as_byte(&self) -> u8 {
        self.0
            .iter()
            .fold(0, |acc, bit| (acc << 1) | u8::from(*bit == b'1'))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII '0' and '1' are ever stored
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    fn unit(&self) -> u8 {
        self.as_byte() >> 5
    }

    fn value(&self) -> u32 {
        u32::from(self.as_byte() & 0b1_1111)
    }

    /// Decode as a T3412 value. `None` when the timer is deactivated.
    pub fn t3412_seconds(&self) -> Option<u32> {
        let step = match self.unit() {
            0b000 => 600,
            0b001 => 3_600,
            0b010 => 36_000,
            0b011 => 2,
            0b100 => 30,
            0b101 => 60,
            0b110 => 1_152_000,
            _ => return None,
        };
        Some(step * self.value())
    }

    /// Decode as a T3324 value. `None` when the timer is deactivated.
    pub fn t3324_seconds(&self) -> Option<u32> {
        let step = match self.unit() {
            0b000 => 2,
            0b010 => 360,
            0b111 => return None,
            // Other units are interpreted as one minute
            _ => 60,
        };
        Some(step * self.value())
    }
}

impl fmt::Display for PsmTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PsmMode {
    Disabled = 0,
    Enabled = 1,
}

/// Enable or disable PSM, keeping the configured timers
#[derive(Debug, Clone, Copy)]
pub struct SetPsm(pub PsmMode);

impl fmt::Display for SetPsm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CPSMS={}", self.0 as u8)
    }
}

impl AtCmd for SetPsm {
    fn failure(&self) -> Error {
        match self.0 {
            PsmMode::Enabled => Error::FailEnablePsm,
            PsmMode::Disabled => Error::FailDisablePsm,
        }
    }
}

/// Read PSM mode and requested timers, answered by
/// `+CPSMS: <mode>,,,"<T3412>","<T3324>"`
#[derive(Debug, Clone, Copy)]
pub struct GetPsm;

impl fmt::Display for GetPsm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CPSMS?")
    }
}

impl AtCmd for GetPsm {
    fn failure(&self) -> Error {
        Error::FailGetPsm
    }
}

/// Set mode and both timers at once. The modem has no command setting a
/// single timer.
#[derive(Debug, Clone, Copy)]
pub struct SetPsmTimers {
    pub mode: PsmMode,
    pub t3412: PsmTimer,
    pub t3324: PsmTimer,
}

impl fmt::Display for SetPsmTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AT+CPSMS={},,,\"{}\",\"{}\"",
            self.mode as u8, self.t3412, self.t3324
        )
    }
}

impl AtCmd for SetPsmTimers {
    fn failure(&self) -> Error {
        Error::FailSetTimer
    }
}
