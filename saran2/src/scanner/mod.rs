//! Byte level scanners for replies that are only partially delimited.
//!
//! Each scanner is a small state machine fed one byte at a time. The
//! `read_*` drivers pull bytes from the transport with the short scan
//! timeout and stop at an explicit byte ceiling, so a misbehaving modem can
//! never keep a transaction open longer than `ceiling × scan timeout`.

mod coap;
mod stats;

pub use coap::{read_coap_response, CoapResponse, PayloadScanner, COAP_RESPONSE_TOKEN};
pub use stats::{read_statistics, StatisticsScanner, UeStatistics, STATISTICS_FIELDS};

use embassy_time::Duration;

use crate::AtTransport;

/// Feed at most `limit` bytes from `transport` into `feed`, until it reports
/// completion or no byte arrives within `timeout`.
///
/// Returns the number of bytes consumed.
pub(crate) fn pump<T: AtTransport>(
    transport: &mut T,
    limit: usize,
    timeout: Duration,
    mut feed: impl FnMut(u8) -> bool,
) -> usize {
    for consumed in 0..limit {
        match transport.read_byte(timeout) {
            Some(byte) => {
                if feed(byte) {
                    return consumed + 1;
                }
            }
            None => {
                trace!("Scan idle after {} bytes", consumed);
                return consumed;
            }
        }
    }

    debug!("Scan stopped at ceiling of {} bytes", limit);
    limit
}
