use embassy_time::Duration;

/// Maximum length of a CoAP payload, both inline in PUT/POST and in replies.
pub const COAP_PAYLOAD_MAX: usize = 512;

/// Maximum length of a CoAP URI.
pub const URI_MAX: usize = 200;

/// Timeouts, limits and profile range used by [`SaraN2`](crate::SaraN2).
///
/// All durations are in milliseconds.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub(crate) command_timeout: u32,
    pub(crate) scan_timeout: u32,
    pub(crate) coap_timeout: u32,
    pub(crate) reboot_timeout: u32,
    pub(crate) profile_count: u8,
    pub(crate) coap_scan_limit: usize,
    pub(crate) stats_scan_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command_timeout: 500,
            scan_timeout: 100,
            coap_timeout: 10_000,
            reboot_timeout: 10_000,
            profile_count: 4,
            coap_scan_limit: COAP_PAYLOAD_MAX + 16,
            stats_scan_limit: 256,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline timeout for an acknowledgement or a reply line.
    #[must_use]
    pub const fn command_timeout(mut self, ms: u32) -> Self {
        self.command_timeout = ms;
        self
    }

    /// Per byte wait while scanning a reply burst. Should stay below the
    /// command timeout.
    #[must_use]
    pub const fn scan_timeout(mut self, ms: u32) -> Self {
        self.scan_timeout = ms;
        self
    }

    /// Wait for the `+UCOAPCD` status token after a CoAP verb was accepted.
    #[must_use]
    pub const fn coap_timeout(mut self, ms: u32) -> Self {
        self.coap_timeout = ms;
        self
    }

    /// Window for the boot banner and ready token after `REBOOTING`.
    #[must_use]
    pub const fn reboot_timeout(mut self, ms: u32) -> Self {
        self.reboot_timeout = ms;
        self
    }

    #[must_use]
    pub const fn profile_count(mut self, count: u8) -> Self {
        self.profile_count = count;
        self
    }

    /// Bytes scanned after the CoAP status code before giving up.
    #[must_use]
    pub const fn coap_scan_limit(mut self, bytes: usize) -> Self {
        self.coap_scan_limit = bytes;
        self
    }

    /// Bytes scanned from a `AT+NUESTATS` dump before giving up.
    #[must_use]
    pub const fn stats_scan_limit(mut self, bytes: usize) -> Self {
        self.stats_scan_limit = bytes;
        self
    }

    pub(crate) const fn command_duration(&self) -> Duration {
        Duration::from_millis(self.command_timeout as u64)
    }

    pub(crate) const fn scan_duration(&self) -> Duration {
        Duration::from_millis(self.scan_timeout as u64)
    }

    pub(crate) const fn coap_duration(&self) -> Duration {
        Duration::from_millis(self.coap_timeout as u64)
    }

    pub(crate) const fn reboot_duration(&self) -> Duration {
        Duration::from_millis(self.reboot_timeout as u64)
    }
}
