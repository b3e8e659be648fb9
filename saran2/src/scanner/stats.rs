use heapless::Vec;

use crate::{
    helpers::{parse_i32, LossyStr},
    AtTransport, Config, Error,
};

/// Number of values in a `AT+NUESTATS` dump.
pub const STATISTICS_FIELDS: usize = 11;

/// Longest field kept while scanning. Longer text is a label and is dropped.
const FIELD_MAX_LEN: usize = 16;

/// Radio statistics reported by `AT+NUESTATS`, in wire order.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UeStatistics {
    /// Signal power in centibels
    pub signal_power: i32,
    /// Total power in centibels
    pub total_power: i32,
    pub tx_power: i32,
    /// Elapsed transmit time in milliseconds since last power cycle
    pub tx_time: i32,
    /// Elapsed receive time in milliseconds since last power cycle
    pub rx_time: i32,
    pub cell_id: i32,
    /// Coverage enhancement level
    pub ecl: i32,
    pub snr: i32,
    pub earfcn: i32,
    pub pci: i32,
    pub rsrq: i32,
}

impl From<[i32; STATISTICS_FIELDS]> for UeStatistics {
    fn from(v: [i32; STATISTICS_FIELDS]) -> Self {
        Self {
            signal_power: v[0],
            total_power: v[1],
            tx_power: v[2],
            tx_time: v[3],
            rx_time: v[4],
            cell_id: v[5],
            ecl: v[6],
            snr: v[7],
            earfcn: v[8],
            pci: v[9],
            rsrq: v[10],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Field {
    Idle,
    Capturing,
    Discarding,
}

/// Collects decimal fields separated by `,` or terminated by CR.
///
/// Text before a `:` is treated as a label and dropped, LF is ignored, and
/// fields that are not decimal integers are skipped.
pub struct StatisticsScanner {
    field: Vec<u8, FIELD_MAX_LEN>,
    state: Field,
    values: Vec<i32, STATISTICS_FIELDS>,
}

impl Default for StatisticsScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsScanner {
    pub fn new() -> Self {
        Self {
            field: Vec::new(),
            state: Field::Idle,
            values: Vec::new(),
        }
    }

    /// Feed one byte. Returns `true` once every field has been filled.
    pub fn feed(&mut self, byte: u8) -> bool {
        match byte {
            b'\n' => {}
            b':' => self.reset_field(),
            b',' | b'\r' => {
                if self.state == Field::Capturing {
                    match parse_i32(&self.field) {
                        Some(value) => {
                            // Cannot fail, scanning stops once full
                            self.values.push(value).ok();
                        }
                        None => trace!("Skipping field {:?}", LossyStr(&self.field)),
                    }
                }
                self.reset_field();
            }
            b' ' if self.state == Field::Idle => {}
            c => match self.state {
                Field::Idle | Field::Capturing => {
                    self.state = if self.field.push(c).is_ok() {
                        Field::Capturing
                    } else {
                        Field::Discarding
                    };
                }
                Field::Discarding => {}
            },
        }

        self.values.is_full()
    }

    fn reset_field(&mut self) {
        self.field.clear();
        self.state = Field::Idle;
    }

    /// Number of fields decoded so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn finish(self) -> Result<UeStatistics, Error> {
        let values: [i32; STATISTICS_FIELDS] = self.values.as_slice().try_into().map_err(|_| {
            warn!("Statistics dump incomplete ({} fields)", self.values.len());
            Error::FailStatistics
        })?;
        Ok(values.into())
    }
}

/// Scan a statistics dump following `AT+NUESTATS`.
///
/// Returns once the record is full, leaving the closing `OK` for the caller.
pub fn read_statistics<T: AtTransport>(
    transport: &mut T,
    config: &Config,
) -> Result<UeStatistics, Error> {
    let mut scanner = StatisticsScanner::new();
    let consumed = super::pump(
        transport,
        config.stats_scan_limit,
        config.scan_duration(),
        |byte| scanner.feed(byte),
    );
    trace!("Statistics scan consumed {} bytes", consumed);
    scanner.finish()
}
