use crate::{AtTransport, Config, Error};

/// Line prefix of the CoAP reply following an accepted request.
pub const COAP_RESPONSE_TOKEN: &[u8] = b"+UCOAPCD:";

/// Bytes between the closing payload quote and the trailing status digit.
const STATUS_OFFSET: u8 = 2;

/// Longest accepted status code, in characters.
const CODE_MAX_LEN: usize = 8;

/// Decoded `+UCOAPCD` reply. The payload itself is in the caller's buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoapResponse {
    /// Response code with the class/detail dot removed, `2.05` becomes 205.
    pub code: u16,
    /// Number of payload bytes written to the buffer.
    pub len: usize,
    /// Trailing status digit after the payload.
    pub status: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    AwaitOpenQuote,
    Payload,
    /// Bytes left to skip after the closing quote.
    Trailer(u8),
    Done,
    Invalid,
}

/// Extracts `"<payload>",<digit>` into a caller buffer.
///
/// Only bytes strictly between the quotes are written, and never beyond the
/// end of the buffer.
pub struct PayloadScanner<'b> {
    buf: &'b mut [u8],
    len: usize,
    overflow: bool,
    status: u8,
    state: State,
}

impl<'b> PayloadScanner<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self {
            buf,
            len: 0,
            overflow: false,
            status: 0,
            state: State::AwaitOpenQuote,
        }
    }

    /// Feed one byte. Returns `true` once no more input is wanted.
    pub fn feed(&mut self, byte: u8) -> bool {
        self.state = match self.state {
            State::AwaitOpenQuote if byte == b'"' => State::Payload,
            State::AwaitOpenQuote => State::AwaitOpenQuote,
            State::Payload if byte == b'"' => State::Trailer(STATUS_OFFSET - 1),
            State::Payload => {
                match self.buf.get_mut(self.len) {
                    Some(slot) => {
                        *slot = byte;
                        self.len += 1;
                    }
                    None => self.overflow = true,
                }
                State::Payload
            }
            State::Trailer(0) if byte.is_ascii_digit() => {
                self.status = byte - b'0';
                State::Done
            }
            State::Trailer(0) => State::Invalid,
            State::Trailer(skip) => State::Trailer(skip - 1),
            done @ (State::Done | State::Invalid) => done,
        };

        matches!(self.state, State::Done | State::Invalid)
    }

    /// Payload length and trailing digit, if the reply was complete.
    pub fn finish(self) -> Result<(usize, u8), Error> {
        match self.state {
            State::Done if self.overflow => {
                warn!("CoAP payload exceeds buffer of {} bytes", self.buf.len());
                Err(Error::BufferTooSmall)
            }
            State::Done => Ok((self.len, self.status)),
            state => {
                warn!("Incomplete CoAP payload ({} bytes)", self.len);
                trace!("Payload scanner stopped in {:?}", state);
                Err(Error::FailParseResponse)
            }
        }
    }
}

/// Read the status code following the `+UCOAPCD:` token, up to its `,` or
/// line break.
fn read_code<T: AtTransport>(transport: &mut T, config: &Config) -> Result<u16, Error> {
    let mut code: u16 = 0;
    let mut digits = 0;

    for _ in 0..CODE_MAX_LEN {
        match transport.read_byte(config.scan_duration()) {
            Some(b' ') if digits == 0 => {}
            Some(b'.') if digits > 0 => {}
            Some(c) if c.is_ascii_digit() => {
                code = code
                    .checked_mul(10)
                    .and_then(|code| code.checked_add(u16::from(c - b'0')))
                    .ok_or(Error::FailParseResponse)?;
                digits += 1;
            }
            Some(b',' | b'\r' | b'\n') if digits > 0 => return Ok(code),
            _ => break,
        }
    }

    warn!("Malformed CoAP response code");
    Err(Error::FailParseResponse)
}

/// Read a CoAP reply after the request was acknowledged.
///
/// Waits up to the CoAP timeout for the status token, then scans the quoted
/// payload into `buf`. `buf` is left untouched when no status token arrives.
pub fn read_coap_response<T: AtTransport>(
    transport: &mut T,
    config: &Config,
    buf: &mut [u8],
) -> Result<CoapResponse, Error> {
    transport
        .with_timeout(config.coap_duration())
        .expect(COAP_RESPONSE_TOKEN)
        .map_err(|_| {
            warn!("No CoAP response token");
            Error::FailParseResponse
        })?;

    let code = read_code(transport, config)?;

    let mut scanner = PayloadScanner::new(buf);
    super::pump(
        transport,
        config.coap_scan_limit,
        config.scan_duration(),
        |byte| scanner.feed(byte),
    );
    let (len, status) = scanner.finish()?;

    debug!("CoAP response {} with {} payload bytes, status {}", code, len, status);
    Ok(CoapResponse { code, len, status })
}
