//! AT command transaction engine for the u-blox SARA-N2 NB-IoT module.
//!
//! The crate drives the module over a byte oriented serial link: it renders
//! typed AT commands, serializes access to the shared link so that one
//! command/response exchange never interleaves with another, and extracts
//! structured data (CoAP payloads and status codes, radio statistics, status
//! replies) from the module's loosely delimited output.
//!
//! The serial link is reached through [`AtTransport`].
//! [`SerialTransport`] implements it for any [`embedded_io`] serial port.
//!
//! # Example
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use saran2::{Config, SaraN2, SerialTransport};
//!
//! let modem: SaraN2<CriticalSectionRawMutex, _> =
//!     SaraN2::new(SerialTransport::new(uart), Config::default());
//!
//! modem.at()?;
//! modem.set_coap_destination("192.0.2.10".parse().unwrap(), 5683)?;
//! modem.set_coap_uri("coap://example.com/sensors")?;
//! modem.select_coap_interface()?;
//!
//! let mut buf = [0; saran2::COAP_PAYLOAD_MAX];
//! let response = modem.coap_get(&mut buf)?;
//! let payload = &buf[..response.len];
//! ```
//!
//! # Optional Cargo Features
//!
//! - **`defmt`** : Enable logging through `defmt`, and `defmt::Format` on
//!   public types.
//! - **`log`** : Enable logging through the `log` facade.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod config;
mod error;
pub(crate) mod helpers;
mod link;
mod modem;
mod reboot;
mod transport;

pub mod command;
pub mod response;
pub mod scanner;

#[cfg(test)]
mod mock;

pub use config::{Config, COAP_PAYLOAD_MAX, URI_MAX};
pub use error::{Error, InternalError};
pub use helpers::LossyStr;
pub use link::{Link, Transaction, OK};
pub use modem::SaraN2;
pub use reboot::{RebootSequence, RebootState, BOOT_BANNER, REBOOTING};
pub use response::{
    ConnectionMode, ConnectionStatus, PsmSettings, RegistrationState, RegistrationStatus,
    SignalQuality,
};
pub use scanner::{CoapResponse, UeStatistics};
pub use transport::{AtTransport, SerialTransport, TimeoutScope, LINE_TERM};

#[cfg(feature = "defmt")]
pub use defmt;
