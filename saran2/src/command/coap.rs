//! CoAP client commands, `+UCOAP`, `+USELCP` and `+UCOAPC`

use core::{fmt, net::IpAddr};

use super::AtCmd;
use crate::{
    config::{COAP_PAYLOAD_MAX, URI_MAX},
    Error,
};

/// Index of one of the modem's stored CoAP profiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileId(u8);

impl ProfileId {
    /// Validate `index` against the number of profile slots.
    pub const fn new(index: u8, profile_count: u8) -> Result<Self, Error> {
        if index < profile_count {
            Ok(Self(index))
        } else {
            Err(Error::InvalidProfile)
        }
    }

    pub const fn index(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileValidity {
    Invalid = 0,
    Valid = 1,
}

impl TryFrom<u8> for ProfileValidity {
    type Error = Error;

    fn try_from(flag: u8) -> Result<Self, Error> {
        match flag {
            0 => Ok(Self::Invalid),
            1 => Ok(Self::Valid),
            _ => Err(Error::ValueOutOfBounds),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    Save,
    Load,
    Select,
}

/// Save, restore or select a stored profile
#[derive(Debug, Clone, Copy)]
pub struct ProfileCommand {
    pub action: ProfileAction,
    pub profile: ProfileId,
}

impl fmt::Display for ProfileCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.action {
            ProfileAction::Save => 4,
            ProfileAction::Load => 5,
            ProfileAction::Select => 6,
        };
        write!(f, "AT+UCOAP={},\"{}\"", op, self.profile.index())
    }
}

impl AtCmd for ProfileCommand {
    fn failure(&self) -> Error {
        match self.action {
            ProfileAction::Save => Error::FailSaveProfile,
            ProfileAction::Load => Error::FailLoadProfile,
            ProfileAction::Select => Error::FailSelectProfile,
        }
    }
}

/// Mark the current profile valid or invalid
#[derive(Debug, Clone, Copy)]
pub struct SetProfileValidity(pub ProfileValidity);

impl fmt::Display for SetProfileValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+UCOAP=3,\"{}\"", self.0 as u8)
    }
}

impl AtCmd for SetProfileValidity {
    fn failure(&self) -> Error {
        Error::FailSetProfileValidity
    }
}

/// Destination server of the CoAP client
#[derive(Debug, Clone, Copy)]
pub struct SetDestination {
    pub ip: IpAddr,
    pub port: u16,
}

impl fmt::Display for SetDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+UCOAP=0,\"{}\",\"{}\"", self.ip, self.port)
    }
}

impl AtCmd for SetDestination {
    fn failure(&self) -> Error {
        Error::FailSetDestination
    }
}

/// `AT+UCOAP=1,"<uri>"`. The URI is limited to `URI_MAX` bytes of UTF-8,
/// not characters.
#[derive(Debug, Clone, Copy)]
pub struct SetUri<'a> {
    uri: &'a str,
}

impl<'a> SetUri<'a> {
    pub fn new(uri: &'a str) -> Result<Self, Error> {
        if uri.len() > URI_MAX {
            return Err(Error::UriTooLong);
        }
        Ok(Self { uri })
    }
}

impl fmt::Display for SetUri<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+UCOAP=1,\"{}\"", self.uri)
    }
}

impl AtCmd for SetUri<'_> {
    fn failure(&self) -> Error {
        Error::FailSetUri
    }
}

/// CoAP PDU header options the modem can include or leave out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PduOption {
    UriHost = 0,
    UriPort = 1,
    UriPath = 2,
    UriQuery = 3,
}

#[derive(Debug, Clone, Copy)]
pub struct SetPduHeader {
    pub option: PduOption,
    pub present: bool,
}

impl fmt::Display for SetPduHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AT+UCOAP=2,\"{}\",\"{}\"",
            self.option as u8,
            u8::from(self.present)
        )
    }
}

impl AtCmd for SetPduHeader {
    fn failure(&self) -> Error {
        Error::FailPduHeader
    }
}

/// Switch the AT interface to the CoAP client. Required before any
/// [`CoapRequest`].
#[derive(Debug, Clone, Copy)]
pub struct SelectCoapInterface;

impl fmt::Display for SelectCoapInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+USELCP=1")
    }
}

impl AtCmd for SelectCoapInterface {
    fn failure(&self) -> Error {
        Error::FailSelectCoapInterface
    }
}

/// CoAP content format identifier, as registered with IANA.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContentFormat {
    TextPlain,
    LinkFormat,
    Xml,
    OctetStream,
    Exi,
    Json,
    Cbor,
    Other(u16),
}

impl ContentFormat {
    pub const fn id(&self) -> u16 {
        match self {
            Self::TextPlain => 0,
            Self::LinkFormat => 40,
            Self::Xml => 41,
            Self::OctetStream => 42,
            Self::Exi => 47,
            Self::Json => 50,
            Self::Cbor => 60,
            Self::Other(id) => *id,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoapMethod {
    Get = 1,
    Delete = 2,
    Put = 3,
    Post = 4,
}

/// Issue a CoAP request with the current profile. The reply arrives as a
/// `+UCOAPCD` line after `OK`.
#[derive(Debug, Clone, Copy)]
pub struct CoapRequest<'a> {
    method: CoapMethod,
    body: Option<(&'a str, ContentFormat)>,
}

impl<'a> CoapRequest<'a> {
    pub const fn get() -> Self {
        Self {
            method: CoapMethod::Get,
            body: None,
        }
    }

    pub const fn delete() -> Self {
        Self {
            method: CoapMethod::Delete,
            body: None,
        }
    }

    pub fn put(payload: &'a str, format: ContentFormat) -> Result<Self, Error> {
        Self::with_body(CoapMethod::Put, payload, format)
    }

    pub fn post(payload: &'a str, format: ContentFormat) -> Result<Self, Error> {
        Self::with_body(CoapMethod::Post, payload, format)
    }

    fn with_body(
        method: CoapMethod,
        payload: &'a str,
        format: ContentFormat,
    ) -> Result<Self, Error> {
        if payload.len() > COAP_PAYLOAD_MAX {
            return Err(Error::PayloadTooLong);
        }
        // Sent inline between quotes
        if payload.contains('"') {
            return Err(Error::ValueOutOfBounds);
        }
        Ok(Self {
            method,
            body: Some((payload, format)),
        })
    }

    pub const fn method(&self) -> CoapMethod {
        self.method
    }
}

impl fmt::Display for CoapRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+UCOAPC={}", self.method as u8)?;
        if let Some((payload, format)) = self.body {
            write!(f, ",\"{}\",{}", payload, format.id())?;
        }
        Ok(())
    }
}

impl AtCmd for CoapRequest<'_> {
    fn failure(&self) -> Error {
        match self.method {
            CoapMethod::Get => Error::FailCoapGet,
            CoapMethod::Delete => Error::FailCoapDelete,
            CoapMethod::Put => Error::FailCoapPut,
            CoapMethod::Post => Error::FailCoapPost,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::net::Ipv4Addr;
    use std::{format, string::String};

    #[test]
    fn profile_range() {
        for index in 0..=u8::MAX {
            assert_eq!(ProfileId::new(index, 4).is_ok(), index < 4);
        }
        assert_eq!(ProfileId::new(0, 0), Err(Error::InvalidProfile));
    }

    #[test]
    fn profile_commands() {
        let profile = ProfileId::new(2, 4).unwrap();
        let cmd = |action| ProfileCommand { action, profile };

        assert_eq!(format!("{}", cmd(ProfileAction::Save)), "AT+UCOAP=4,\"2\"");
        assert_eq!(format!("{}", cmd(ProfileAction::Load)), "AT+UCOAP=5,\"2\"");
        assert_eq!(format!("{}", cmd(ProfileAction::Select)), "AT+UCOAP=6,\"2\"");
        assert_eq!(cmd(ProfileAction::Load).failure(), Error::FailLoadProfile);
    }

    #[test]
    fn validity_flag() {
        assert_eq!(ProfileValidity::try_from(0u8), Ok(ProfileValidity::Invalid));
        assert_eq!(ProfileValidity::try_from(1u8), Ok(ProfileValidity::Valid));
        for flag in 2..=u8::MAX {
            assert_eq!(ProfileValidity::try_from(flag), Err(Error::ValueOutOfBounds));
        }
        assert_eq!(
            format!("{}", SetProfileValidity(ProfileValidity::Valid)),
            "AT+UCOAP=3,\"1\""
        );
    }

    #[test]
    fn destination() {
        let cmd = SetDestination {
            ip: IpAddr::V4(Ipv4Addr::new(168, 134, 102, 18)),
            port: 5683,
        };
        assert_eq!(format!("{}", cmd), "AT+UCOAP=0,\"168.134.102.18\",\"5683\"");
    }

    #[test]
    fn uri_length() {
        let limit: String = "a".repeat(URI_MAX);
        assert!(SetUri::new(&limit).is_ok());

        let over: String = "a".repeat(URI_MAX + 1);
        assert!(matches!(SetUri::new(&over), Err(Error::UriTooLong)));

        // Multibyte characters count with their encoded length
        let wide: String = "é".repeat(URI_MAX / 2);
        assert!(SetUri::new(&wide).is_ok());
        let wide: String = "é".repeat(URI_MAX / 2 + 1);
        assert!(matches!(SetUri::new(&wide), Err(Error::UriTooLong)));

        let cmd = SetUri::new("coap://coap.me:5683/sink").unwrap();
        assert_eq!(format!("{}", cmd), "AT+UCOAP=1,\"coap://coap.me:5683/sink\"");
    }

    #[test]
    fn pdu_header() {
        let add_query = SetPduHeader {
            option: PduOption::UriQuery,
            present: true,
        };
        let remove_host = SetPduHeader {
            option: PduOption::UriHost,
            present: false,
        };
        assert_eq!(format!("{}", add_query), "AT+UCOAP=2,\"3\",\"1\"");
        assert_eq!(format!("{}", remove_host), "AT+UCOAP=2,\"0\",\"0\"");
    }

    #[test]
    fn requests() {
        assert_eq!(format!("{}", CoapRequest::get()), "AT+UCOAPC=1");
        assert_eq!(format!("{}", CoapRequest::delete()), "AT+UCOAPC=2");

        let put = CoapRequest::put("21.5", ContentFormat::TextPlain).unwrap();
        assert_eq!(format!("{}", put), "AT+UCOAPC=3,\"21.5\",0");
        assert_eq!(put.failure(), Error::FailCoapPut);

        let post = CoapRequest::post("{}", ContentFormat::Json).unwrap();
        assert_eq!(format!("{}", post), "AT+UCOAPC=4,\"{}\",50");
    }

    #[test]
    fn request_body_validation() {
        let max: String = "x".repeat(COAP_PAYLOAD_MAX);
        assert!(CoapRequest::post(&max, ContentFormat::OctetStream).is_ok());

        let over: String = "x".repeat(COAP_PAYLOAD_MAX + 1);
        assert!(matches!(
            CoapRequest::post(&over, ContentFormat::OctetStream),
            Err(Error::PayloadTooLong)
        ));
        assert!(matches!(
            CoapRequest::put("say \"hi\"", ContentFormat::TextPlain),
            Err(Error::ValueOutOfBounds)
        ));
    }
}
