//! Decoding of single line status replies.
//!
//! The transport hands over the rest of the line following the reply label,
//! e.g. ` 0,1` for `+CEREG: 0,1`. Trailing fields not listed here are
//! accepted and ignored.

use nom::{
    bytes::complete::{tag, take_while_m_n},
    character::complete::{char, space0, u8 as dec_u8},
    combinator::map_res,
    sequence::{delimited, preceded, separated_pair, tuple},
    IResult,
};

use crate::{
    command::psm::{PsmMode, PsmTimer},
    helpers::LossyStr,
    InternalError,
};

/// A reply line that can be decoded from the text following `PREFIX`.
pub trait Reply: Sized {
    const PREFIX: &'static [u8];

    fn parse(line: &[u8]) -> Result<Self, InternalError>;
}

fn finish<'a, O>(line: &'a [u8], res: IResult<&'a [u8], O>) -> Result<O, InternalError> {
    res.map(|(_, out)| out).map_err(|_| {
        warn!("Unable to decode reply {:?}", LossyStr(line));
        InternalError::Parse
    })
}

/// Two leading integer fields, `<a>,<b>`.
fn pair(i: &[u8]) -> IResult<&[u8], (u8, u8)> {
    preceded(space0, separated_pair(dec_u8, char(','), dec_u8))(i)
}

/// EPS registration state, `<stat>` of `+CEREG`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationState {
    NotRegistered = 0,
    Home = 1,
    Searching = 2,
    Denied = 3,
    Unknown = 4,
    Roaming = 5,
}

impl RegistrationState {
    pub const fn is_registered(&self) -> bool {
        matches!(self, Self::Home | Self::Roaming)
    }
}

impl TryFrom<u8> for RegistrationState {
    type Error = InternalError;

    fn try_from(stat: u8) -> Result<Self, InternalError> {
        Ok(match stat {
            0 => Self::NotRegistered,
            1 => Self::Home,
            2 => Self::Searching,
            3 => Self::Denied,
            4 => Self::Unknown,
            5 => Self::Roaming,
            _ => return Err(InternalError::Parse),
        })
    }
}

/// `+CEREG: <n>,<stat>[,...]`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistrationStatus {
    /// Unsolicited result code setting
    pub urc_mode: u8,
    pub state: RegistrationState,
}

impl Reply for RegistrationStatus {
    const PREFIX: &'static [u8] = b"+CEREG:";

    fn parse(line: &[u8]) -> Result<Self, InternalError> {
        let res = map_res(pair, |(urc_mode, stat): (u8, u8)| {
            RegistrationState::try_from(stat).map(|state| Self { urc_mode, state })
        })(line);
        finish(line, res)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionMode {
    Idle,
    Connected,
}

/// `+CSCON: <n>,<mode>`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionStatus {
    pub urc_mode: u8,
    pub mode: ConnectionMode,
}

impl Reply for ConnectionStatus {
    const PREFIX: &'static [u8] = b"+CSCON:";

    fn parse(line: &[u8]) -> Result<Self, InternalError> {
        let res = map_res(pair, |(urc_mode, mode): (u8, u8)| {
            let mode = match mode {
                0 => ConnectionMode::Idle,
                1 => ConnectionMode::Connected,
                _ => return Err(InternalError::Parse),
            };
            Ok(Self { urc_mode, mode })
        })(line);
        finish(line, res)
    }
}

/// `+CSQ: <rssi>,<ber>`, with 99 meaning not known.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalQuality {
    pub rssi: u8,
    pub ber: u8,
}

impl SignalQuality {
    /// Received signal strength in dBm, `None` if not detectable.
    pub fn rssi_dbm(&self) -> Option<i16> {
        (self.rssi <= 31).then(|| -113 + 2 * i16::from(self.rssi))
    }
}

impl Reply for SignalQuality {
    const PREFIX: &'static [u8] = b"+CSQ:";

    fn parse(line: &[u8]) -> Result<Self, InternalError> {
        let res = pair(line).map(|(i, (rssi, ber))| (i, Self { rssi, ber }));
        finish(line, res)
    }
}

fn quoted_timer(i: &[u8]) -> IResult<&[u8], PsmTimer> {
    map_res(
        delimited(
            char('"'),
            take_while_m_n(8, 8, |c: u8| c == b'0' || c == b'1'),
            char('"'),
        ),
        PsmTimer::from_bits,
    )(i)
}

/// `+CPSMS: <mode>,,,"<T3412>","<T3324>"`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PsmSettings {
    pub mode: PsmMode,
    /// Requested periodic TAU
    pub t3412: PsmTimer,
    /// Requested active time
    pub t3324: PsmTimer,
}

impl Reply for PsmSettings {
    const PREFIX: &'static [u8] = b"+CPSMS:";

    fn parse(line: &[u8]) -> Result<Self, InternalError> {
        let mode = map_res(preceded(space0, dec_u8), |mode: u8| match mode {
            0 => Ok(PsmMode::Disabled),
            1 => Ok(PsmMode::Enabled),
            _ => Err(InternalError::Parse),
        });
        let res = tuple((
            mode,
            tag(",,,"),
            quoted_timer,
            char(','),
            quoted_timer,
        ))(line)
        .map(|(i, (mode, _, t3412, _, t3324))| (i, Self { mode, t3412, t3324 }));
        finish(line, res)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::psm::{T3324Unit, T3412Unit};

    #[test]
    fn registration() {
        assert_eq!(
            RegistrationStatus::parse(b" 0,1"),
            Ok(RegistrationStatus {
                urc_mode: 0,
                state: RegistrationState::Home
            })
        );
        let status = RegistrationStatus::parse(b" 2,5,\"1A2B\",\"01A2B3C4\",9").unwrap();
        assert_eq!(status.state, RegistrationState::Roaming);
        assert!(status.state.is_registered());
        assert_eq!(
            RegistrationStatus::parse(b" 0,2").map(|s| s.state.is_registered()),
            Ok(false)
        );
        assert_eq!(RegistrationStatus::parse(b" 0,9"), Err(InternalError::Parse));
        assert_eq!(RegistrationStatus::parse(b" 0"), Err(InternalError::Parse));
    }

    #[test]
    fn connection() {
        assert_eq!(
            ConnectionStatus::parse(b" 0,1").map(|s| s.mode),
            Ok(ConnectionMode::Connected)
        );
        assert_eq!(
            ConnectionStatus::parse(b"1,0").map(|s| s.mode),
            Ok(ConnectionMode::Idle)
        );
        assert_eq!(ConnectionStatus::parse(b" 0,3"), Err(InternalError::Parse));
    }

    #[test]
    fn signal_quality() {
        let csq = SignalQuality::parse(b" 17,99").unwrap();
        assert_eq!(csq, SignalQuality { rssi: 17, ber: 99 });
        assert_eq!(csq.rssi_dbm(), Some(-79));
        assert_eq!(SignalQuality::parse(b" 99,99").unwrap().rssi_dbm(), None);
        assert_eq!(SignalQuality::parse(b" x,1"), Err(InternalError::Parse));
    }

    #[test]
    fn psm_settings() {
        let settings = PsmSettings::parse(b" 1,,,\"00100011\",\"00100010\"").unwrap();
        assert_eq!(settings.mode, PsmMode::Enabled);
        assert_eq!(
            settings.t3412,
            PsmTimer::t3412(T3412Unit::OneHour, 3).unwrap()
        );
        assert_eq!(
            settings.t3324,
            PsmTimer::t3324(T3324Unit::OneMinute, 2).unwrap()
        );

        assert_eq!(
            PsmSettings::parse(b"0,,,\"0010001\",\"00100010\""),
            Err(InternalError::Parse)
        );
        assert_eq!(
            PsmSettings::parse(b"2,,,\"00100011\",\"00100010\""),
            Err(InternalError::Parse)
        );
        assert_eq!(PsmSettings::parse(b" 1"), Err(InternalError::Parse));
    }
}
