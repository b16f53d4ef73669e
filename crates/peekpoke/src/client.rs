//! The PeekPoke client and its atomic operations.
//!
//! Every method here maps to exactly one protocol transaction. Arguments are
//! validated before anything is sent, and nothing is retried.

use std::fmt;
use std::time::Instant;

use peekpoke_metrics::{metric_defs, DeviceLabels};
use peekpoke_protocol::{
    hub, scalar, ByteOrder, Command, DeviceInfo, MemoryAccess, ProtocolConfig, ProtocolError,
    RangeError, Response, ResponseError, SerialTimings, HEADER_SIZE, MIN_PAYLOAD_EXEC_SIZE,
    TOKEN_SIZE,
};
use tracing::{debug, trace, warn};

use crate::config::{check_address, ClientConfig};
use crate::error::{Error, Result};
use crate::transport::Transport;

// ============================================================================
// Device Handle
// ============================================================================

/// Routing key for every transaction: Crow address and port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    address: u8,
    port: u8,
}

impl DeviceHandle {
    /// Create a handle. The address must be 1..=31.
    pub fn new(address: u8, port: u8) -> std::result::Result<Self, RangeError> {
        check_address(address)?;
        Ok(DeviceHandle { address, port })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub(crate) fn labels(&self) -> DeviceLabels {
        DeviceLabels::new(self.address, self.port)
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// One command and the bytes that came back for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Where the command was sent.
    pub device: DeviceHandle,
    /// The command code.
    pub code: u8,
    /// Encoded command bytes.
    pub command: Vec<u8>,
    /// Raw response bytes.
    pub response: Vec<u8>,
    /// Exact response payload size required, if fixed.
    pub expected_payload: Option<usize>,
}

impl Transaction {
    fn new(device: DeviceHandle, protocol: &ProtocolConfig, command: &Command) -> Self {
        Transaction {
            device,
            code: command.code(protocol),
            command: command.encode(protocol),
            response: Vec::new(),
            expected_payload: command.expected_payload_size(),
        }
    }

    /// Validate the response against the command.
    pub fn parse(&self, protocol: &ProtocolConfig) -> std::result::Result<Response, ResponseError> {
        Response::decode(&self.response, protocol, self.code, self.expected_payload)
    }
}

// ============================================================================
// Info Cache
// ============================================================================

/// Last info response, tagged with the device it came from.
#[derive(Debug, Default)]
struct InfoCache {
    entry: Option<(DeviceHandle, DeviceInfo)>,
}

impl InfoCache {
    fn get(&self, device: DeviceHandle) -> Option<&DeviceInfo> {
        match &self.entry {
            Some((key, info)) if *key == device => Some(info),
            _ => None,
        }
    }

    fn store(&mut self, device: DeviceHandle, info: DeviceInfo) {
        self.entry = Some((device, info));
    }

    fn invalidate(&mut self) {
        self.entry = None;
    }
}

// ============================================================================
// Options
// ============================================================================

/// How the token is interpreted as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenOptions {
    pub byte_order: ByteOrder,
    pub signed: bool,
}

// ============================================================================
// Client
// ============================================================================

/// A PeekPoke client bound to one device on a transport.
///
/// The client owns its transport, so two transactions can never interleave
/// through it. Use [`into_transport`](Self::into_transport) to get it back.
///
/// While a client targets an address, the transport uses PropCR byte order
/// for it. The order that was in effect before is put back when the client
/// moves to another address or gives up the transport.
pub struct PeekPoke<T: Transport> {
    pub(crate) transport: T,
    pub(crate) config: ClientConfig,
    pub(crate) device: DeviceHandle,
    info_cache: InfoCache,
    pub(crate) last_good_baudrate: Option<u32>,
    /// Byte order the transport used for the current address before we took it.
    prev_propcr_order: Option<bool>,
}

impl<T: Transport> PeekPoke<T> {
    /// Create a client. The configuration is validated first.
    pub fn new(mut transport: T, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let device = DeviceHandle::new(config.address, config.port)?;
        let prev_propcr_order = select_propcr_order(&mut transport, device.address)?;
        debug!(device = %device, "created PeekPoke client");
        Ok(PeekPoke {
            transport,
            config,
            device,
            info_cache: InfoCache::default(),
            last_good_baudrate: None,
            prev_propcr_order,
        })
    }

    /// Give back the transport, with the byte order for the current address
    /// restored.
    pub fn into_transport(mut self) -> T {
        let address = self.device.address;
        if let Err(e) = self.transport.set_propcr_order(address, self.prev_propcr_order) {
            warn!(device = %self.device, "failed to restore byte order: {}", e);
        }
        self.transport
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn protocol(&self) -> &ProtocolConfig {
        &self.config.protocol
    }

    pub fn device(&self) -> DeviceHandle {
        self.device
    }

    pub fn address(&self) -> u8 {
        self.device.address
    }

    pub fn port(&self) -> u8 {
        self.device.port
    }

    /// Target another device.
    ///
    /// Invalidates the info cache and forgets the last good baud rate, since
    /// the transport tracks baud rates per address. The old address gets its
    /// previous byte order back.
    pub fn set_address(&mut self, address: u8) -> Result<()> {
        check_address(address)?;
        self.transport
            .set_propcr_order(self.device.address, self.prev_propcr_order)?;
        self.prev_propcr_order = select_propcr_order(&mut self.transport, address)?;
        self.info_cache.invalidate();
        self.last_good_baudrate = None;
        self.device.address = address;
        self.config.address = address;
        debug!(device = %self.device, "address changed");
        Ok(())
    }

    /// Target another port on the same device. Invalidates the info cache.
    pub fn set_port(&mut self, port: u8) {
        self.info_cache.invalidate();
        self.device.port = port;
        self.config.port = port;
        debug!(device = %self.device, "port changed");
    }

    /// The baud rate of the most recent successful transaction, if any.
    pub fn last_good_baudrate(&self) -> Option<u32> {
        self.last_good_baudrate
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Send a command and collect the raw response.
    fn exchange(&mut self, command: &Command, response_expected: bool) -> Result<Transaction> {
        let mut txn = Transaction::new(self.device, &self.config.protocol, command);
        trace!(
            device = %self.device,
            command = command.name(),
            bytes = txn.command.len(),
            "sending command"
        );

        match self.transport.send_command(
            self.device.address,
            self.device.port,
            &txn.command,
            response_expected,
        ) {
            Ok(response) => txn.response = response,
            Err(e) => {
                warn!(device = %self.device, command = command.name(), "transport error: {}", e);
                self.record_failure(command.name(), "transport");
                return Err(e.into());
            }
        }

        // The link carried a full exchange at this rate.
        self.last_good_baudrate = Some(self.transport.baudrate(self.device.address));
        Ok(txn)
    }

    /// Send a command and validate its response.
    pub(crate) fn transact(&mut self, command: Command) -> Result<Response> {
        let started = Instant::now();
        let txn = self.exchange(&command, true)?;
        match txn.parse(&self.config.protocol) {
            Ok(response) => {
                let elapsed = started.elapsed();
                debug!(
                    device = %txn.device,
                    command = command.name(),
                    payload = response.payload.len(),
                    elapsed_us = elapsed.as_micros() as u64,
                    "transaction complete"
                );
                let labels = self.device.labels().with(&[("command", command.name().to_string())]);
                metrics::counter!(metric_defs::TRANSACTIONS.name, &labels[..]).increment(1);
                metrics::histogram!(metric_defs::TRANSACTION_DURATION.name, &labels[..])
                    .record(elapsed.as_secs_f64());
                Ok(response)
            }
            Err(e) => {
                let err = Error::from(e);
                warn!(device = %txn.device, command = command.name(), "{}", err);
                self.record_failure(command.name(), err.kind());
                Err(err)
            }
        }
    }

    fn record_failure(&self, command: &'static str, reason: &'static str) {
        let labels = self.device.labels().with(&[
            ("command", command.to_string()),
            ("reason", reason.to_string()),
        ]);
        metrics::counter!(metric_defs::TRANSACTION_FAILURES.name, &labels[..]).increment(1);
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Query the device info. Always asks the device and refreshes the cache.
    pub fn get_info(&mut self) -> Result<DeviceInfo> {
        let device = self.device;
        let response = self.transact(Command::GetInfo)?;
        let info = DeviceInfo::decode(&response.payload).map_err(|e| match e {
            // Report sizes in frame bytes, like the header checks do.
            ProtocolError::TooShort { expected, actual } => ProtocolError::TooShort {
                expected: expected + HEADER_SIZE,
                actual: actual + HEADER_SIZE,
            },
            other => other,
        })?;
        debug!(device = %device, info = %info, "device info");
        self.info_cache.store(device, info.clone());
        Ok(info)
    }

    /// The device info, from cache when it is for the current device.
    pub fn get_info_cached(&mut self) -> Result<DeviceInfo> {
        if let Some(info) = self.info_cache.get(self.device) {
            return Ok(info.clone());
        }
        self.get_info()
    }

    /// The device's `par` pointer.
    pub fn get_par(&mut self) -> Result<u16> {
        Ok(self.get_info_cached()?.par)
    }

    /// The device's instance identifier, if it reports one.
    pub fn get_identifier(&mut self) -> Result<Option<u32>> {
        Ok(self.get_info_cached()?.details.map(|d| d.identifier))
    }

    /// Whether the device reports command `code` as available.
    ///
    /// Devices that don't report a command mask are assumed to accept
    /// everything.
    pub fn is_command_available(&mut self, code: u8) -> Result<bool> {
        Ok(self
            .get_info_cached()?
            .details
            .map_or(true, |d| d.is_available(code)))
    }

    /// Use the atomic limits the device reports instead of the configured ones.
    ///
    /// Returns false, changing nothing, if the device doesn't report limits.
    pub fn adopt_device_limits(&mut self) -> Result<bool> {
        let Some(details) = self.get_info_cached()?.details else {
            return Ok(false);
        };
        if details.max_atomic_read == 0 || details.max_atomic_write == 0 {
            return Ok(false);
        }
        self.config.protocol.max_atomic_read = details.max_atomic_read as usize;
        self.config.protocol.max_atomic_write = details.max_atomic_write as usize;
        debug!(
            device = %self.device,
            max_atomic_read = details.max_atomic_read,
            max_atomic_write = details.max_atomic_write,
            "adopted device limits"
        );
        Ok(true)
    }

    // ========================================================================
    // Hub Memory
    // ========================================================================

    /// Read up to `max_atomic_read` bytes in one transaction.
    pub fn atomic_read_bytes(&mut self, address: u32, count: usize) -> Result<Vec<u8>> {
        let address = hub::normalize(address)?;
        hub::check_atomic_span(address, count, self.config.protocol.max_atomic_read)?;
        self.check_restricted(MemoryAccess::Read, address, count)?;
        let response = self.transact(Command::ReadHub {
            address,
            count: count as u16,
        })?;
        self.record_bytes(metric_defs::BYTES_READ.name, response.payload.len());
        Ok(response.payload)
    }

    /// Write up to `max_atomic_write` bytes in one transaction.
    pub fn atomic_write_bytes(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let address = hub::normalize(address)?;
        hub::check_atomic_span(address, data.len(), self.config.protocol.max_atomic_write)?;
        self.check_restricted(MemoryAccess::Write, address, data.len())?;
        self.transact(Command::WriteHub {
            address,
            data: data.to_vec(),
        })?;
        self.record_bytes(metric_defs::BYTES_WRITTEN.name, data.len());
        Ok(())
    }

    /// Read a NUL-terminated string in one transaction.
    ///
    /// Returns the bytes up to and including the first NUL, or exactly
    /// `max_count` bytes if there is no NUL within them.
    pub fn atomic_read_str(&mut self, address: u32, max_count: usize) -> Result<Vec<u8>> {
        let address = hub::normalize(address)?;
        hub::check_atomic_span(address, max_count, self.config.protocol.max_atomic_read)?;
        self.check_restricted(MemoryAccess::Read, address, max_count)?;
        let response = self.transact(Command::ReadHubStr {
            address,
            max_count: max_count as u16,
        })?;

        let payload = response.payload;
        let terminated = payload.contains(&0);
        if payload.len() > max_count || (!terminated && payload.len() != max_count) {
            return Err(ProtocolError::SizeMismatch {
                expected: HEADER_SIZE + max_count,
                actual: HEADER_SIZE + payload.len(),
            }
            .into());
        }
        self.record_bytes(metric_defs::BYTES_READ.name, payload.len());
        Ok(payload)
    }

    /// With `check_restricted_ranges`, reject spans outside the device's
    /// reported ranges. The first check of a device costs an info request.
    pub(crate) fn check_restricted(
        &mut self,
        access: MemoryAccess,
        address: u16,
        count: usize,
    ) -> Result<()> {
        if !self.config.check_restricted_ranges || count == 0 {
            return Ok(());
        }
        if let Some(details) = self.get_info_cached()?.details {
            if let Err(e) = details.check_access(access, address, count) {
                warn!(device = %self.device, "{}", e);
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn record_bytes(&self, metric: &'static str, count: usize) {
        let labels = self.device.labels().to_labels();
        metrics::counter!(metric, &labels[..]).increment(count as u64);
    }

    // ========================================================================
    // Serial Timings
    // ========================================================================

    pub fn get_serial_timings(&mut self) -> Result<SerialTimings> {
        let response = self.transact(Command::GetSerialTimings)?;
        Ok(SerialTimings::decode(&response.payload)?)
    }

    /// Replace the device's serial timings.
    ///
    /// The device answers at the old rate and then switches. Use
    /// [`switch_baudrate`](Self::switch_baudrate) to keep the host in step.
    pub fn set_serial_timings(&mut self, timings: &SerialTimings) -> Result<()> {
        self.transact(Command::SetSerialTimings { timings: *timings })?;
        Ok(())
    }

    // ========================================================================
    // Token
    // ========================================================================

    pub fn get_token_bytes(&mut self) -> Result<[u8; TOKEN_SIZE]> {
        let response = self.transact(Command::GetToken)?;
        Ok(token_from_payload(&response.payload))
    }

    /// Replace the token, returning the previous value.
    ///
    /// Fewer than four bytes are accepted only with `use_padding`, in which
    /// case the tail is filled with zeros.
    pub fn set_token_bytes(&mut self, bytes: &[u8], use_padding: bool) -> Result<[u8; TOKEN_SIZE]> {
        let min = if use_padding { 0 } else { TOKEN_SIZE };
        RangeError::check("token length", bytes.len() as i128, min as i128, TOKEN_SIZE as i128)?;
        let mut token = [0u8; TOKEN_SIZE];
        token[..bytes.len()].copy_from_slice(bytes);
        let response = self.transact(Command::SetToken { token })?;
        Ok(token_from_payload(&response.payload))
    }

    /// The token as an integer.
    pub fn get_token(&mut self, opts: TokenOptions) -> Result<i128> {
        let bytes = self.get_token_bytes()?;
        Ok(scalar::decode_int(&bytes, opts.byte_order, opts.signed)?)
    }

    /// Replace the token with an integer, returning the previous value
    /// interpreted with the same options.
    pub fn set_token(&mut self, value: i128, opts: TokenOptions) -> Result<i128> {
        let bytes = scalar::encode_int(value, TOKEN_SIZE, opts.byte_order, opts.signed)?;
        let previous = self.set_token_bytes(&bytes, false)?;
        Ok(scalar::decode_int(&previous, opts.byte_order, opts.signed)?)
    }

    // ========================================================================
    // Payload Execution
    // ========================================================================

    /// Load `code` into a free cog and run it.
    ///
    /// The response, if one is expected, is whatever the payload sends and is
    /// returned without validation.
    pub fn execute_payload(&mut self, code: &[u8], response_expected: bool) -> Result<Option<Vec<u8>>> {
        RangeError::check(
            "payload length",
            code.len() as i128,
            MIN_PAYLOAD_EXEC_SIZE as i128,
            self.config.protocol.max_payload_exec as i128,
        )?;
        let command = Command::ExecutePayload { code: code.to_vec() };
        let txn = self.exchange(&command, response_expected)?;
        debug!(device = %txn.device, bytes = code.len(), "payload executed");
        let labels = self.device.labels().with(&[("command", command.name().to_string())]);
        metrics::counter!(metric_defs::TRANSACTIONS.name, &labels[..]).increment(1);
        Ok(response_expected.then_some(txn.response))
    }
}

/// Switch `address` to PropCR byte order, returning the order it had.
fn select_propcr_order<T: Transport>(transport: &mut T, address: u8) -> Result<Option<bool>> {
    let previous = transport.propcr_order(address);
    transport.set_propcr_order(address, Some(true))?;
    trace!(address, previous = ?previous, "selected PropCR byte order");
    Ok(previous)
}

fn token_from_payload(payload: &[u8]) -> [u8; TOKEN_SIZE] {
    let mut token = [0u8; TOKEN_SIZE];
    token.copy_from_slice(&payload[..TOKEN_SIZE]);
    token
}
