use std::{process::exit, time::Duration};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use saran2::{Config, SaraN2, SerialTransport, COAP_PAYLOAD_MAX};
use saran2_demos::common::HostSerial;

const BAUD_RATE: u32 = 9600;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let device = args.next().unwrap_or_else(|| String::from("/dev/ttyUSB0"));
    let server = args.next().unwrap_or_else(|| String::from("192.0.2.10"));

    let port = serialport::new(&device, BAUD_RATE)
        .timeout(Duration::from_millis(100))
        .open()
        .unwrap_or_else(|e| {
            log::error!("Failed to open serial port '{}': {}", device, e);
            exit(1)
        });

    let modem: SaraN2<CriticalSectionRawMutex, _> = SaraN2::new(
        SerialTransport::new(HostSerial::new(port)),
        Config::default(),
    );

    if let Err(e) = modem.at() {
        log::error!("Modem not responding: {}", e);
        exit(1);
    }

    match modem.registration_status() {
        Ok(status) => log::info!("Registration: {:?}", status.state),
        Err(e) => log::warn!("{}", e),
    }

    match modem.signal_quality() {
        Ok(csq) => log::info!("RSSI: {:?} dBm", csq.rssi_dbm()),
        Err(e) => log::warn!("{}", e),
    }

    match modem.statistics() {
        Ok(stats) => log::info!("{:#?}", stats),
        Err(e) => log::warn!("{}", e),
    }

    let ip = server.parse().unwrap_or_else(|_| {
        log::error!("Invalid server address '{}'", server);
        exit(1)
    });

    let setup = modem
        .set_coap_destination(ip, 5683)
        .and_then(|_| modem.set_coap_uri(&format!("coap://{}:5683/.well-known/core", server)))
        .and_then(|_| modem.pdu_header_add_path())
        .and_then(|_| modem.select_coap_interface());
    if let Err(e) = setup {
        log::error!("CoAP setup failed: {}", e);
        exit(1);
    }

    let mut buf = [0; COAP_PAYLOAD_MAX];
    match modem.coap_get(&mut buf) {
        Ok(response) => log::info!(
            "{} {:?}",
            response.code,
            String::from_utf8_lossy(&buf[..response.len])
        ),
        Err(e) => log::error!("CoAP GET failed: {}", e),
    }
}
