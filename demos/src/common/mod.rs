//! Host serial port adapted to the `embedded-io` traits used by
//! [`saran2::SerialTransport`].

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use serialport::SerialPort;

pub struct HostSerial {
    port: Box<dyn SerialPort>,
}

impl HostSerial {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl ErrorType for HostSerial {
    type Error = ErrorKind;
}

impl Read for HostSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match std::io::Read::read(&mut self.port, buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(_) => Err(ErrorKind::Other),
        }
    }
}

impl ReadReady for HostSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        self.port
            .bytes_to_read()
            .map(|n| n > 0)
            .map_err(|_| ErrorKind::Other)
    }
}

impl Write for HostSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.port, buf).map_err(|_| ErrorKind::Other)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.port).map_err(|_| ErrorKind::Other)
    }
}
