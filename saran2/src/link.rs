use core::fmt::Write as _;
use core::ops::{Deref, DerefMut};

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::{Mutex, MutexGuard},
};
use heapless::String;

use crate::{
    command::{AtCmd, MAX_COMMAND_LEN},
    helpers::LossyStr,
    AtTransport, Error, InternalError,
};

/// Positive acknowledgement closing a successful exchange.
pub const OK: &[u8] = b"OK";

/// Exclusive owner of the serial link.
///
/// Every exchange with the modem goes through a [`Transaction`], and at most
/// one transaction exists at a time. Callers on other execution contexts
/// block in [`transaction`](Self::transaction) until the current one is
/// dropped. There is no fairness among waiters.
pub struct Link<M: RawMutex, T> {
    transport: Mutex<M, T>,
}

impl<M: RawMutex, T: AtTransport> Link<M, T> {
    pub const fn new(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
        }
    }

    /// Block until the link is free and open a transaction on it.
    pub fn transaction(&self) -> Transaction<'_, M, T> {
        let guard = embassy_futures::block_on(self.transport.lock());
        trace!("Transaction opened");
        Transaction { guard }
    }

    /// Give back the transport.
    pub fn into_inner(self) -> T {
        self.transport.into_inner()
    }
}

/// One command/response exchange holding the link. Dropping it releases
/// the link.
pub struct Transaction<'a, M: RawMutex, T> {
    guard: MutexGuard<'a, M, T>,
}

impl<M: RawMutex, T: AtTransport> Transaction<'_, M, T> {
    /// Discard stale input, then render and send `cmd`.
    pub fn send<C: AtCmd>(&mut self, cmd: &C) -> Result<(), InternalError> {
        let mut line: String<MAX_COMMAND_LEN> = String::new();
        write!(line, "{}", cmd).map_err(|_| InternalError::Overflow)?;

        if line.len() < 50 {
            debug!("Sending command: {:?}", LossyStr(line.as_bytes()));
        } else {
            debug!("Sending command with long payload ({} bytes)", line.len());
        }

        self.guard.flush();
        self.guard.send(line.as_bytes())
    }

    /// Send `cmd` and wait for `OK`.
    pub fn command<C: AtCmd>(&mut self, cmd: &C) -> Result<(), Error> {
        self.send(cmd)
            .and_then(|_| self.guard.expect(OK))
            .map_err(|e| {
                warn!("Command not acknowledged: {:?}", e);
                cmd.failure()
            })
    }

    /// Send `cmd`, capture the rest of the first reply line starting with
    /// `prefix` into `buf`, and wait for `OK`.
    pub fn query<'b, C: AtCmd>(
        &mut self,
        cmd: &C,
        prefix: &[u8],
        buf: &'b mut [u8],
    ) -> Result<&'b [u8], Error> {
        self.send(cmd)
            .and_then(|_| self.guard.recv_line(prefix, buf))
            .and_then(|line| self.guard.expect(OK).map(|_| line))
            .map_err(|e| {
                warn!("Query failed: {:?}", e);
                cmd.failure()
            })
    }
}

impl<M: RawMutex, T> Deref for Transaction<'_, M, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<M: RawMutex, T> DerefMut for Transaction<'_, M, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<M: RawMutex, T> Drop for Transaction<'_, M, T> {
    fn drop(&mut self) {
        trace!("Transaction closed");
    }
}
