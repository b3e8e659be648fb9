use core::{
    net::IpAddr,
    sync::atomic::{AtomicBool, Ordering},
};

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::{
    command::{
        coap::{
            ContentFormat, CoapRequest, PduOption, ProfileAction, ProfileCommand, ProfileId,
            ProfileValidity, SelectCoapInterface, SetDestination, SetPduHeader,
            SetProfileValidity, SetUri,
        },
        network::{
            ConfigFunction, ConfigValue, GetConnectionStatus, GetRegistrationStatus,
            GetSignalQuality, GetStatistics, SetAttach, SetConfig, SetRadio, SetRegistration,
        },
        psm::{GetPsm, PsmMode, PsmTimer, SetPsm, SetPsmTimers},
        At, AtCmd,
    },
    reboot::RebootSequence,
    response::{ConnectionStatus, PsmSettings, RegistrationStatus, Reply, SignalQuality},
    scanner::{read_coap_response, read_statistics, CoapResponse, UeStatistics},
    AtTransport, Config, Error, Link, OK,
};

/// Longest status reply line kept, after its label.
const REPLY_LINE_MAX: usize = 64;

/// Driver for a SARA-N2 module on one serial link.
///
/// All operations take `&self` and may be called from several execution
/// contexts; each one holds the link for exactly one command/response
/// exchange and blocks until that exchange has completed or timed out.
pub struct SaraN2<M: RawMutex, T: AtTransport> {
    link: Link<M, T>,
    config: Config,
    coap_selected: AtomicBool,
}

impl<M: RawMutex, T: AtTransport> SaraN2<M, T> {
    pub fn new(mut transport: T, config: Config) -> Self {
        transport.set_timeout(config.command_duration());
        Self {
            link: Link::new(transport),
            config,
            coap_selected: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give back the transport.
    pub fn release(self) -> T {
        self.link.into_inner()
    }

    fn command<C: AtCmd>(&self, cmd: &C) -> Result<(), Error> {
        self.link.transaction().command(cmd)
    }

    fn query<R: Reply, C: AtCmd>(&self, cmd: &C) -> Result<R, Error> {
        let mut buf = [0; REPLY_LINE_MAX];
        let mut tx = self.link.transaction();
        let line = tx.query(cmd, R::PREFIX, &mut buf)?;
        R::parse(line).map_err(|_| cmd.failure())
    }

    /// Check that the module answers.
    pub fn at(&self) -> Result<(), Error> {
        self.command(&At)
    }

    fn profile(&self, action: ProfileAction, index: u8) -> Result<(), Error> {
        let profile = ProfileId::new(index, self.config.profile_count)?;
        self.command(&ProfileCommand { action, profile })
    }

    /// Make stored profile `index` the active CoAP profile.
    pub fn select_profile(&self, index: u8) -> Result<(), Error> {
        self.profile(ProfileAction::Select, index)
    }

    /// Restore stored profile `index` into the active configuration.
    pub fn load_profile(&self, index: u8) -> Result<(), Error> {
        self.profile(ProfileAction::Load, index)
    }

    /// Store the active configuration as profile `index`.
    pub fn save_profile(&self, index: u8) -> Result<(), Error> {
        self.profile(ProfileAction::Save, index)
    }

    /// Mark the active profile valid (1) or invalid (0).
    pub fn set_profile_validity(&self, flag: u8) -> Result<(), Error> {
        let validity = ProfileValidity::try_from(flag)?;
        self.command(&SetProfileValidity(validity))
    }

    pub fn set_coap_destination(&self, ip: IpAddr, port: u16) -> Result<(), Error> {
        self.command(&SetDestination { ip, port })
    }

    /// Set the request URI. It travels as a quoted AT string parameter, so it
    /// is text, and its length limit of [`URI_MAX`](crate::URI_MAX) is
    /// counted in bytes.
    pub fn set_coap_uri(&self, uri: &str) -> Result<(), Error> {
        self.command(&SetUri::new(uri)?)
    }

    /// Add or remove a CoAP option in the PDU header of later requests.
    pub fn set_pdu_header(&self, option: PduOption, present: bool) -> Result<(), Error> {
        self.command(&SetPduHeader { option, present })
    }

    pub fn pdu_header_add_host(&self) -> Result<(), Error> {
        self.set_pdu_header(PduOption::UriHost, true)
    }

    pub fn pdu_header_remove_host(&self) -> Result<(), Error> {
        self.set_pdu_header(PduOption::UriHost, false)
    }

    pub fn pdu_header_add_port(&self) -> Result<(), Error> {
        self.set_pdu_header(PduOption::UriPort, true)
    }

    pub fn pdu_header_remove_port(&self) -> Result<(), Error> {
        self.set_pdu_header(PduOption::UriPort, false)
    }

    pub fn pdu_header_add_path(&self) -> Result<(), Error> {
        self.set_pdu_header(PduOption::UriPath, true)
    }

    pub fn pdu_header_remove_path(&self) -> Result<(), Error> {
        self.set_pdu_header(PduOption::UriPath, false)
    }

    pub fn pdu_header_add_query(&self) -> Result<(), Error> {
        self.set_pdu_header(PduOption::UriQuery, true)
    }

    pub fn pdu_header_remove_query(&self) -> Result<(), Error> {
        self.set_pdu_header(PduOption::UriQuery, false)
    }

    /// Switch the module to the CoAP AT command interface. Required before
    /// any CoAP request, and again after a reboot.
    pub fn select_coap_interface(&self) -> Result<(), Error> {
        self.command(&SelectCoapInterface)?;
        self.coap_selected.store(true, Ordering::Release);
        Ok(())
    }

    fn coap_request(&self, request: &CoapRequest, buf: &mut [u8]) -> Result<CoapResponse, Error> {
        if !self.coap_selected.load(Ordering::Acquire) {
            warn!("CoAP {:?} before interface selection", request.method());
            return Err(Error::CoapInterfaceNotSelected);
        }

        let mut tx = self.link.transaction();
        tx.command(request)?;
        read_coap_response(&mut *tx, &self.config, buf)
    }

    /// GET the configured URI, writing the response payload into `buf`.
    pub fn coap_get(&self, buf: &mut [u8]) -> Result<CoapResponse, Error> {
        self.coap_request(&CoapRequest::get(), buf)
    }

    pub fn coap_delete(&self, buf: &mut [u8]) -> Result<CoapResponse, Error> {
        self.coap_request(&CoapRequest::delete(), buf)
    }

    pub fn coap_put(
        &self,
        payload: &str,
        format: ContentFormat,
        buf: &mut [u8],
    ) -> Result<CoapResponse, Error> {
        self.coap_request(&CoapRequest::put(payload, format)?, buf)
    }

    pub fn coap_post(
        &self,
        payload: &str,
        format: ContentFormat,
        buf: &mut [u8],
    ) -> Result<CoapResponse, Error> {
        self.coap_request(&CoapRequest::post(payload, format)?, buf)
    }

    /// Restart the module and wait until it is ready again.
    ///
    /// Holds the link for the whole sequence. The CoAP interface has to be
    /// selected again afterwards.
    pub fn reboot(&self) -> Result<(), Error> {
        let mut tx = self.link.transaction();
        RebootSequence::new().run(&mut tx, &self.config)?;
        self.coap_selected.store(false, Ordering::Release);
        Ok(())
    }

    pub fn enable_psm(&self) -> Result<(), Error> {
        self.command(&SetPsm(PsmMode::Enabled))
    }

    pub fn disable_psm(&self) -> Result<(), Error> {
        self.command(&SetPsm(PsmMode::Disabled))
    }

    pub fn psm_settings(&self) -> Result<PsmSettings, Error> {
        self.query(&GetPsm)
    }

    /// Requested periodic TAU timer
    pub fn t3412(&self) -> Result<PsmTimer, Error> {
        self.psm_settings().map(|s| s.t3412)
    }

    /// Requested active time
    pub fn t3324(&self) -> Result<PsmTimer, Error> {
        self.psm_settings().map(|s| s.t3324)
    }

    /// Read the current settings and submit them with one timer replaced,
    /// in a single transaction.
    fn update_timers(&self, update: impl FnOnce(&mut PsmSettings)) -> Result<(), Error> {
        let mut buf = [0; REPLY_LINE_MAX];
        let mut tx = self.link.transaction();

        let mut settings = tx
            .query(&GetPsm, PsmSettings::PREFIX, &mut buf)
            .and_then(|line| PsmSettings::parse(line).map_err(|_| Error::FailGetPsm))
            .map_err(|_| Error::FailSetTimer)?;
        update(&mut settings);

        tx.command(&SetPsmTimers {
            mode: settings.mode,
            t3412: settings.t3412,
            t3324: settings.t3324,
        })
    }

    pub fn set_t3412(&self, timer: PsmTimer) -> Result<(), Error> {
        self.update_timers(|s| s.t3412 = timer)
    }

    pub fn set_t3324(&self, timer: PsmTimer) -> Result<(), Error> {
        self.update_timers(|s| s.t3324 = timer)
    }

    pub fn registration_status(&self) -> Result<RegistrationStatus, Error> {
        self.query(&GetRegistrationStatus)
    }

    pub fn connection_status(&self) -> Result<ConnectionStatus, Error> {
        self.query(&GetConnectionStatus)
    }

    pub fn set_config(&self, function: ConfigFunction, value: ConfigValue) -> Result<(), Error> {
        self.command(&SetConfig { function, value })
    }

    pub fn attach(&self) -> Result<(), Error> {
        self.command(&SetAttach(true))
    }

    pub fn detach(&self) -> Result<(), Error> {
        self.command(&SetAttach(false))
    }

    pub fn register(&self) -> Result<(), Error> {
        self.command(&SetRegistration(true))
    }

    pub fn deregister(&self) -> Result<(), Error> {
        self.command(&SetRegistration(false))
    }

    pub fn radio_on(&self) -> Result<(), Error> {
        self.command(&SetRadio(true))
    }

    pub fn radio_off(&self) -> Result<(), Error> {
        self.command(&SetRadio(false))
    }

    /// Radio statistics from `AT+NUESTATS`.
    ///
    /// The dump's closing `OK` is consumed before the link is released.
    pub fn statistics(&self) -> Result<UeStatistics, Error> {
        let mut tx = self.link.transaction();
        tx.send(&GetStatistics).map_err(|_| Error::FailStatistics)?;
        let stats = read_statistics(&mut *tx, &self.config)?;
        tx.expect(OK).map_err(|e| {
            warn!("Statistics not acknowledged: {:?}", e);
            Error::FailStatistics
        })?;
        Ok(stats)
    }

    pub fn signal_quality(&self) -> Result<SignalQuality, Error> {
        self.query(&GetSignalQuality)
    }
}
