/// Errors reported by an [`AtTransport`](crate::AtTransport).
///
/// These never reach the caller of a [`SaraN2`](crate::SaraN2) operation
/// directly: every operation maps them to its own failure code, so a timeout
/// and an unexpected token are indistinguishable from the outside.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InternalError {
    /// Serial write error
    Write,
    /// Timed out while waiting for a token or line
    Timeout,
    /// A line or command did not fit its buffer
    Overflow,
    /// A received line could not be decoded
    Parse,
}

/// Errors returned by the crate
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Profile index outside `0..profile_count`
    InvalidProfile,
    /// Argument outside its closed set of values
    ValueOutOfBounds,
    /// URI longer than 200 bytes
    UriTooLong,
    /// CoAP payload longer than 512 bytes
    PayloadTooLong,
    /// CoAP verb issued before the CoAP AT interface was selected
    CoapInterfaceNotSelected,
    /// Decoded payload does not fit the supplied buffer
    BufferTooSmall,

    FailAt,
    FailSelectProfile,
    FailLoadProfile,
    FailSaveProfile,
    FailSetProfileValidity,
    FailSetDestination,
    FailSetUri,
    FailPduHeader,
    FailSelectCoapInterface,
    FailCoapGet,
    FailCoapDelete,
    FailCoapPut,
    FailCoapPost,
    /// CoAP reply missing its status token, quotes or trailing digit
    FailParseResponse,
    FailReboot,
    FailEnablePsm,
    FailDisablePsm,
    FailGetPsm,
    FailSetTimer,
    FailRegistrationStatus,
    FailConnectionStatus,
    FailSetConfig,
    FailAttach,
    FailDetach,
    FailRegister,
    FailDeregister,
    FailRadioOn,
    FailRadioOff,
    FailStatistics,
    FailSignalQuality,
}

impl Error {
    /// Whether the error was raised by argument validation, before any I/O.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidProfile
                | Self::ValueOutOfBounds
                | Self::UriTooLong
                | Self::PayloadTooLong
                | Self::CoapInterfaceNotSelected
        )
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::InvalidProfile => "invalid profile index",
            Self::ValueOutOfBounds => "value out of bounds",
            Self::UriTooLong => "URI too long",
            Self::PayloadTooLong => "payload too long",
            Self::CoapInterfaceNotSelected => "CoAP AT interface not selected",
            Self::BufferTooSmall => "response buffer too small",
            Self::FailAt => "AT liveness check failed",
            Self::FailSelectProfile => "failed to select profile",
            Self::FailLoadProfile => "failed to load profile",
            Self::FailSaveProfile => "failed to save profile",
            Self::FailSetProfileValidity => "failed to set profile validity",
            Self::FailSetDestination => "failed to set CoAP destination",
            Self::FailSetUri => "failed to set CoAP URI",
            Self::FailPduHeader => "failed to change PDU header option",
            Self::FailSelectCoapInterface => "failed to select CoAP AT interface",
            Self::FailCoapGet => "CoAP GET failed",
            Self::FailCoapDelete => "CoAP DELETE failed",
            Self::FailCoapPut => "CoAP PUT failed",
            Self::FailCoapPost => "CoAP POST failed",
            Self::FailParseResponse => "failed to parse CoAP response",
            Self::FailReboot => "reboot failed",
            Self::FailEnablePsm => "failed to enable PSM",
            Self::FailDisablePsm => "failed to disable PSM",
            Self::FailGetPsm => "failed to read PSM settings",
            Self::FailSetTimer => "failed to set PSM timer",
            Self::FailRegistrationStatus => "failed to read registration status",
            Self::FailConnectionStatus => "failed to read connection status",
            Self::FailSetConfig => "failed to set configuration",
            Self::FailAttach => "network attach failed",
            Self::FailDetach => "network detach failed",
            Self::FailRegister => "network registration failed",
            Self::FailDeregister => "network deregistration failed",
            Self::FailRadioOn => "failed to switch radio on",
            Self::FailRadioOff => "failed to switch radio off",
            Self::FailStatistics => "failed to read UE statistics",
            Self::FailSignalQuality => "failed to read signal quality",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Error {}
