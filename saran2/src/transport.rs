//! Line transport between the transaction engine and the serial link.
//!
//! [`AtTransport`] is the boundary the rest of the crate is written against:
//! send a delimited line, pull single bytes with a timeout, and hold the
//! active timeout used by the token and line receivers. [`SerialTransport`]
//! implements it for any [`embedded_io`] serial port.

use core::ops::{Deref, DerefMut};

use embassy_time::{Duration, Instant};
use embedded_io::{Read, ReadReady, Write};

use crate::{helpers::LossyStr, InternalError};

/// Line delimiter appended to every outgoing command.
pub const LINE_TERM: &[u8] = b"\r\n";

/// Default active timeout of a freshly created [`SerialTransport`].
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

pub trait AtTransport {
    /// Write `line` followed by [`LINE_TERM`].
    fn send(&mut self, line: &[u8]) -> Result<(), InternalError>;

    /// Wait at most `timeout` for the next received byte.
    fn read_byte(&mut self, timeout: Duration) -> Option<u8>;

    /// The active timeout applied by [`expect`](Self::expect) and
    /// [`recv_line`](Self::recv_line).
    fn timeout(&self) -> Duration;

    fn set_timeout(&mut self, timeout: Duration);

    /// Discard received input that has not been read yet.
    fn flush(&mut self);

    /// Read the next byte, giving up at `deadline`.
    fn read_byte_before(&mut self, deadline: Instant) -> Option<u8> {
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        self.read_byte(deadline.saturating_duration_since(now))
    }

    /// Consume input until a line starts with `token`.
    ///
    /// The remainder of the matching line is left unread, so a caller can
    /// continue scanning right after the token.
    fn expect(&mut self, token: &[u8]) -> Result<(), InternalError> {
        let deadline = Instant::now() + self.timeout();
        let mut matched = 0;
        let mut line_start = true;

        while let Some(c) = self.read_byte_before(deadline) {
            if c == b'\r' || c == b'\n' {
                matched = 0;
                line_start = true;
                continue;
            }

            if line_start && token.get(matched) == Some(&c) {
                matched += 1;
                if matched == token.len() {
                    trace!("Matched token {:?}", LossyStr(token));
                    return Ok(());
                }
            } else {
                line_start = false;
                matched = 0;
            }
        }

        debug!("Timed out waiting for {:?}", LossyStr(token));
        Err(InternalError::Timeout)
    }

    /// Consume input until a line starts with `prefix`, and copy the rest of
    /// that line (without delimiter) into `buf`.
    fn recv_line<'b>(
        &mut self,
        prefix: &[u8],
        buf: &'b mut [u8],
    ) -> Result<&'b [u8], InternalError> {
        self.expect(prefix)?;

        let deadline = Instant::now() + self.timeout();
        let mut len = 0;
        while let Some(c) = self.read_byte_before(deadline) {
            if c == b'\r' || c == b'\n' {
                trace!("Received line {:?}", LossyStr(&buf[..len]));
                return Ok(&buf[..len]);
            }
            *buf.get_mut(len).ok_or(InternalError::Overflow)? = c;
            len += 1;
        }

        Err(InternalError::Timeout)
    }

    /// Temporarily replace the active timeout. The previous value is
    /// restored when the returned scope is dropped.
    fn with_timeout(&mut self, timeout: Duration) -> TimeoutScope<'_, Self>
    where
        Self: Sized,
    {
        TimeoutScope::new(self, timeout)
    }
}

/// Guard holding a transport with a temporarily changed timeout.
pub struct TimeoutScope<'a, T: AtTransport> {
    transport: &'a mut T,
    restore: Duration,
}

impl<'a, T: AtTransport> TimeoutScope<'a, T> {
    pub fn new(transport: &'a mut T, timeout: Duration) -> Self {
        let restore = transport.timeout();
        transport.set_timeout(timeout);
        Self { transport, restore }
    }
}

impl<T: AtTransport> Deref for TimeoutScope<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: AtTransport> DerefMut for TimeoutScope<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: AtTransport> Drop for TimeoutScope<'_, T> {
    fn drop(&mut self) {
        self.transport.set_timeout(self.restore);
    }
}

/// [`AtTransport`] over a serial port implementing the [`embedded_io`]
/// traits. Reads poll [`ReadReady`] so that a byte wait never blocks past its
/// timeout.
pub struct SerialTransport<S> {
    serial: S,
    timeout: Duration,
}

impl<S> SerialTransport<S>
where
    S: Read + ReadReady + Write,
{
    pub fn new(serial: S) -> Self {
        Self {
            serial,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Give back the underlying serial port.
    pub fn release(self) -> S {
        self.serial
    }
}

impl<S> AtTransport for SerialTransport<S>
where
    S: Read + ReadReady + Write,
{
    fn send(&mut self, line: &[u8]) -> Result<(), InternalError> {
        self.serial
            .write_all(line)
            .and_then(|_| self.serial.write_all(LINE_TERM))
            .and_then(|_| self.serial.flush())
            .map_err(|_| {
                error!("Serial write error");
                InternalError::Write
            })
    }

    fn read_byte(&mut self, timeout: Duration) -> Option<u8> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.serial.read_ready() {
                Ok(true) => {
                    let mut byte = [0; 1];
                    match self.serial.read(&mut byte) {
                        Ok(1) => return Some(byte[0]),
                        Ok(_) => {}
                        Err(_) => {
                            error!("Serial read error");
                            return None;
                        }
                    }
                }
                Ok(false) => {}
                Err(_) => {
                    error!("Serial read error");
                    return None;
                }
            }

            if Instant::now() >= deadline {
                return None;
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn flush(&mut self) {
        let mut discarded = 0;
        let mut buf = [0; 32];

        while let Ok(true) = self.serial.read_ready() {
            match self.serial.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => discarded += n,
            }
        }

        if discarded > 0 {
            debug!("Flushed {} stale bytes", discarded);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::{Chunk, MockTransport};

    /// In-memory serial port for exercising `SerialTransport`.
    struct Loopback {
        rx: std::collections::VecDeque<u8>,
        tx: std::vec::Vec<u8>,
    }

    impl embedded_io::ErrorType for Loopback {
        type Error = core::convert::Infallible;
    }

    impl Read for Loopback {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.rx.len());
            for b in buf.iter_mut().take(n) {
                *b = self.rx.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl ReadReady for Loopback {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.rx.is_empty())
        }
    }

    impl Write for Loopback {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn loopback(rx: &[u8]) -> SerialTransport<Loopback> {
        SerialTransport::new(Loopback {
            rx: rx.iter().copied().collect(),
            tx: std::vec::Vec::new(),
        })
    }

    #[test]
    fn serial_send_appends_delimiter() {
        let mut transport = loopback(b"");
        transport.send(b"AT+CSQ").unwrap();
        assert_eq!(transport.release().tx, b"AT+CSQ\r\n");
    }

    #[test]
    fn serial_expect_and_recv_line() {
        let mut transport = loopback(b"\r\n+CSQ: 17,99\r\n\r\nOK\r\n");
        let mut buf = [0; 16];
        assert_eq!(transport.recv_line(b"+CSQ:", &mut buf), Ok(&b" 17,99"[..]));
        assert_eq!(transport.expect(b"OK"), Ok(()));
        assert_eq!(transport.read_byte(Duration::from_millis(1)), Some(b'\r'));
    }

    #[test]
    fn serial_flush_discards_pending_input() {
        let mut transport = loopback(b"garbage\r\nOK\r\n");
        transport.flush();
        assert_eq!(transport.read_byte(Duration::from_millis(1)), None);
    }

    #[test]
    fn expect_only_matches_at_line_start() {
        let mut transport = MockTransport::new().with_input(b"NOK\r\nBOOK\r\nOK\r\n");
        assert_eq!(transport.expect(b"OK"), Ok(()));
        assert_eq!(transport.remaining_input(), b"\r\n");
    }

    #[test]
    fn expect_leaves_rest_of_line() {
        let mut transport = MockTransport::new().with_input(b"+UCOAPCD: 2.05,\"x\",0\r\n");
        assert_eq!(transport.expect(b"+UCOAPCD:"), Ok(()));
        assert_eq!(transport.remaining_input(), b" 2.05,\"x\",0\r\n");
    }

    #[test]
    fn expect_times_out_on_silence() {
        let mut transport = MockTransport::new()
            .with_chunks(&[Chunk::Text(b"ERROR\r\n"), Chunk::Gap(Duration::from_secs(5))]);
        assert_eq!(transport.expect(b"OK"), Err(InternalError::Timeout));
    }

    #[test]
    fn recv_line_overflow() {
        let mut transport = MockTransport::new().with_input(b"+CEREG: 0,1,\"0001\"\r\n");
        let mut buf = [0; 4];
        assert_eq!(
            transport.recv_line(b"+CEREG:", &mut buf),
            Err(InternalError::Overflow)
        );
    }

    #[test]
    fn timeout_scope_restores() {
        let mut transport = MockTransport::new();
        transport.set_timeout(Duration::from_millis(500));
        {
            let scoped = transport.with_timeout(Duration::from_secs(10));
            assert_eq!(scoped.timeout(), Duration::from_secs(10));
        }
        assert_eq!(transport.timeout(), Duration::from_millis(500));
    }
}
