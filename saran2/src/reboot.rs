use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Instant;

use crate::{command::Reboot, link::OK, AtTransport, Config, Error, InternalError, Transaction};

/// Acknowledgement of `AT+NRB`, sent before the module restarts.
pub const REBOOTING: &[u8] = b"REBOOTING";

/// First line printed by the module once it has restarted.
pub const BOOT_BANNER: &[u8] = b"u-blox";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RebootState {
    /// `AT+NRB` sent, waiting for `REBOOTING`
    Requested,
    /// Waiting for the boot banner
    Rebooting,
    /// Waiting for the module to report ready
    BannerSeen,
    Ready,
    Failed,
}

/// Drives one reboot of the module.
///
/// The banner and the final `OK` share a single window of
/// `reboot_timeout`, measured from the `REBOOTING` acknowledgement.
pub struct RebootSequence {
    state: RebootState,
}

impl Default for RebootSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl RebootSequence {
    pub const fn new() -> Self {
        Self {
            state: RebootState::Requested,
        }
    }

    pub const fn state(&self) -> RebootState {
        self.state
    }

    fn advance(&mut self, next: RebootState) {
        debug!("Reboot {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub fn run<M: RawMutex, T: AtTransport>(
        &mut self,
        tx: &mut Transaction<'_, M, T>,
        config: &Config,
    ) -> Result<(), Error> {
        if self.state != RebootState::Requested {
            return Err(Error::FailReboot);
        }

        self.steps(tx, config).map_err(|e| {
            error!("Reboot failed in {:?}: {:?}", self.state, e);
            self.advance(RebootState::Failed);
            Error::FailReboot
        })
    }

    fn steps<M: RawMutex, T: AtTransport>(
        &mut self,
        tx: &mut Transaction<'_, M, T>,
        config: &Config,
    ) -> Result<(), InternalError> {
        tx.send(&Reboot)?;
        tx.expect(REBOOTING)?;
        self.advance(RebootState::Rebooting);

        let window = config.reboot_duration();
        let deadline = Instant::now() + window;
        let mut transport = tx.with_timeout(window);

        transport.expect(BOOT_BANNER)?;
        self.advance(RebootState::BannerSeen);

        transport.set_timeout(deadline.saturating_duration_since(Instant::now()));
        transport.expect(OK)?;
        self.advance(RebootState::Ready);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::{Chunk, MockTransport};
    use crate::Link;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::Duration;

    type TestLink = Link<CriticalSectionRawMutex, MockTransport>;

    const BASELINE: Duration = Duration::from_millis(500);

    fn reboot(link: &TestLink) -> (Result<(), Error>, RebootState) {
        let mut seq = RebootSequence::new();
        let res = seq.run(&mut link.transaction(), &Config::default());
        (res, seq.state())
    }

    #[test]
    fn ack_delay_banner_ready() {
        let link = TestLink::new(MockTransport::new().respond_chunks(
            "AT+NRB",
            &[
                Chunk::Text(b"\r\nREBOOTING\r\n"),
                Chunk::Gap(Duration::from_secs(3)),
                Chunk::Text(b"\r\nu-blox \r\n"),
                Chunk::Gap(Duration::from_millis(800)),
                Chunk::Text(b"\r\nOK\r\n"),
            ],
        ));

        assert_eq!(reboot(&link), (Ok(()), RebootState::Ready));

        let transport = link.into_inner();
        assert_eq!(transport.timeouts().first(), Some(&Duration::from_secs(10)));
        assert_eq!(transport.timeouts().last(), Some(&BASELINE));
        assert_eq!(transport.timeout(), BASELINE);
    }

    #[test]
    fn missing_banner() {
        let link = TestLink::new(MockTransport::new().respond_chunks(
            "AT+NRB",
            &[
                Chunk::Text(b"\r\nREBOOTING\r\n"),
                Chunk::Gap(Duration::from_secs(60)),
            ],
        ));

        assert_eq!(reboot(&link), (Err(Error::FailReboot), RebootState::Failed));
        assert_eq!(link.into_inner().timeout(), BASELINE);
    }

    #[test]
    fn missing_ready() {
        let link = TestLink::new(
            MockTransport::new().respond("AT+NRB", b"\r\nREBOOTING\r\n\r\nu-blox \r\n"),
        );
        assert_eq!(reboot(&link), (Err(Error::FailReboot), RebootState::Failed));
        assert_eq!(link.into_inner().timeout(), BASELINE);
    }

    #[test]
    fn ready_before_banner() {
        let link = TestLink::new(
            MockTransport::new().respond("AT+NRB", b"\r\nREBOOTING\r\nOK\r\nu-blox \r\n"),
        );
        assert_eq!(reboot(&link), (Err(Error::FailReboot), RebootState::Failed));
    }

    #[test]
    fn no_acknowledgement() {
        let link = TestLink::new(MockTransport::new().respond("AT+NRB", b"\r\nERROR\r\n"));
        assert_eq!(reboot(&link), (Err(Error::FailReboot), RebootState::Failed));

        // The transport timeout is never touched before `REBOOTING`
        assert!(link.into_inner().timeouts().is_empty());
    }

    #[test]
    fn sequence_is_single_use() {
        let link = TestLink::new(MockTransport::new().respond("AT+NRB", b"ERROR\r\n"));
        let mut seq = RebootSequence::new();
        let _ = seq.run(&mut link.transaction(), &Config::default());
        assert_eq!(
            seq.run(&mut link.transaction(), &Config::default()),
            Err(Error::FailReboot)
        );
    }
}
