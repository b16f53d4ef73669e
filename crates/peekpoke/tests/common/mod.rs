//! A simulated PeekPoke device for integration tests.
//!
//! The device keeps a 64 KiB hub, a token, serial timings and an info block,
//! and answers commands the way the firmware does. Its serial timings are
//! compared against the host's baud rate, so a host that changes rate without
//! telling the device stops getting answers. Likewise it only answers a host
//! using PropCR byte order for its address, and rejects memory accesses
//! outside the ranges its info block reports.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use peekpoke::protocol::timing::derive_timings;
use peekpoke::protocol::{
    DeviceDetails, DeviceInfo, DeviceStatus, MemoryAccess, ProtocolConfig, Response, SerialTimings,
    HEADER_SIZE, HUB_SIZE, MIN_TWO_BIT_PERIOD, SERIAL_TIMINGS_SIZE, TOKEN_SIZE,
};
use peekpoke::{ClientConfig, PeekPoke, Transport, TransportError};

pub const CLKFREQ: u64 = 80_000_000;
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEVICE_ADDRESS: u8 = 1;
pub const DEVICE_PORT: u8 = 112;
pub const PAR: u16 = 0x1f00;
pub const IDENTIFIER: u32 = 0x2018_0425;

/// Every command enabled.
pub const ALL_COMMANDS: u16 = 0x01ff;

pub struct SimDevice {
    pub hub: Vec<u8>,
    pub token: [u8; TOKEN_SIZE],
    pub timings: SerialTimings,
    pub reset_timings: SerialTimings,
    pub info: DeviceInfo,
    /// Bit `n` set means command code `n` is answered.
    pub enabled: u16,
    pub protocol: ProtocolConfig,
    pub address: u8,
    pub port: u8,
    /// Host-side baud rate per Crow address.
    pub baudrates: HashMap<u8, u32>,
    /// Host-side PropCR byte order per Crow address; absent means default.
    pub propcr_orders: HashMap<u8, bool>,
    /// Every payload the host sent, in order.
    pub sent: Vec<Vec<u8>>,
    /// Raw frames returned instead of the simulated answer, one per command.
    pub scripted: VecDeque<Vec<u8>>,
    /// Fail the next exchange in the transport.
    pub fail_next: bool,
    /// Response sent back by an executed payload.
    pub payload_response: Vec<u8>,
    pub executed: Vec<Vec<u8>>,
    pub breaks: Vec<Duration>,
    /// Event log of baud rate changes and timing updates, for ordering checks.
    pub events: Vec<String>,
}

impl SimDevice {
    pub fn new() -> Self {
        let timings = derive_timings(CLKFREQ, DEFAULT_BAUDRATE, 400, MIN_TWO_BIT_PERIOD)
            .expect("default timings");
        let protocol = ProtocolConfig::default();
        let mut hub = vec![0u8; HUB_SIZE];
        hub[0..4].copy_from_slice(&(CLKFREQ as u32).to_le_bytes());
        SimDevice {
            hub,
            token: [0; TOKEN_SIZE],
            timings,
            reset_timings: timings,
            info: DeviceInfo {
                layout_id: [0x50, 0x50, 0x00, 0x02],
                par: PAR,
                details: Some(DeviceDetails {
                    available_commands: ALL_COMMANDS,
                    max_atomic_read: protocol.max_atomic_read as u16,
                    max_atomic_write: protocol.max_atomic_write as u16,
                    identifier: IDENTIFIER,
                    min_read_address: 0,
                    max_read_address: 0xffff,
                    min_write_address: 0,
                    max_write_address: 0xffff,
                    serial_timings_format: 0,
                    protocol_version: 2,
                }),
            },
            enabled: ALL_COMMANDS,
            protocol,
            address: DEVICE_ADDRESS,
            port: DEVICE_PORT,
            baudrates: HashMap::new(),
            propcr_orders: HashMap::new(),
            sent: Vec::new(),
            scripted: VecDeque::new(),
            fail_next: false,
            payload_response: Vec::new(),
            executed: Vec::new(),
            breaks: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Hub address and count of every read or write command sent so far.
    pub fn memory_commands(&self) -> Vec<(u8, u16, u16)> {
        self.sent
            .iter()
            .filter(|p| p.len() >= 8 && (1..=3).contains(&p[3]))
            .map(|p| (p[3], u16::from_le_bytes([p[4], p[5]]), u16::from_le_bytes([p[6], p[7]])))
            .collect()
    }

    fn host_baudrate(&self, address: u8) -> u32 {
        self.baudrates.get(&address).copied().unwrap_or(DEFAULT_BAUDRATE)
    }

    /// Whether the device's bit timing matches the host within 2%.
    fn in_sync(&self, address: u8) -> bool {
        let device_period = (self.timings.bit_period_0 + self.timings.bit_period_1) as i64;
        let host_period = (2 * CLKFREQ / self.host_baudrate(address) as u64) as i64;
        (device_period - host_period).abs() * 50 <= device_period
    }

    /// Whether the info block allows `count` bytes at `address`.
    fn allowed(&self, access: MemoryAccess, address: usize, count: usize) -> bool {
        match &self.info.details {
            Some(details) => details.check_access(access, address as u16, count).is_ok(),
            None => true,
        }
    }

    fn ok(&self, code: u8, payload: &[u8]) -> Vec<u8> {
        Response::encode_ok(&self.protocol, code, payload)
    }

    fn status(&self, code: u8, status: DeviceStatus) -> Vec<u8> {
        Response::encode_status(&self.protocol, code, status)
    }

    fn span(args: &[u8]) -> Option<(usize, usize)> {
        if args.len() < 4 {
            return None;
        }
        let address = u16::from_le_bytes([args[0], args[1]]) as usize;
        let count = u16::from_le_bytes([args[2], args[3]]) as usize;
        Some((address, count))
    }

    fn answer(&mut self, code: u8, args: &[u8], response_expected: bool) -> Vec<u8> {
        if code >= 16 || self.enabled & (1 << code) == 0 {
            return self.status(code, DeviceStatus::CommandUnavailable);
        }
        let codes = self.protocol.codes;
        let malformed = DeviceStatus::MalformedParameters;

        if code == codes.get_info {
            let payload = self.info.encode();
            self.ok(code, &payload)
        } else if code == codes.read_hub {
            match Self::span(args) {
                Some((_, count)) if count > self.protocol.max_atomic_read => {
                    self.status(code, DeviceStatus::ResponseTooLarge)
                }
                Some((address, count))
                    if args.len() == 4
                        && address + count <= HUB_SIZE
                        && self.allowed(MemoryAccess::Read, address, count) =>
                {
                    let data = self.hub[address..address + count].to_vec();
                    self.ok(code, &data)
                }
                _ => self.status(code, malformed),
            }
        } else if code == codes.write_hub {
            match Self::span(args) {
                Some((address, count))
                    if args.len() == 4 + count
                        && count <= self.protocol.max_atomic_write
                        && address + count <= HUB_SIZE
                        && self.allowed(MemoryAccess::Write, address, count) =>
                {
                    self.hub[address..address + count].copy_from_slice(&args[4..]);
                    self.ok(code, &[])
                }
                _ => self.status(code, malformed),
            }
        } else if code == codes.read_hub_str {
            match Self::span(args) {
                Some((_, count)) if count > self.protocol.max_atomic_read => {
                    self.status(code, DeviceStatus::ResponseTooLarge)
                }
                Some((address, count))
                    if args.len() == 4
                        && address + count <= HUB_SIZE
                        && self.allowed(MemoryAccess::Read, address, count) =>
                {
                    let region = &self.hub[address..address + count];
                    let end = region.iter().position(|&b| b == 0).map_or(count, |nul| nul + 1);
                    let data = region[..end].to_vec();
                    self.ok(code, &data)
                }
                _ => self.status(code, malformed),
            }
        } else if code == codes.get_serial_timings {
            let payload = self.timings.encode();
            self.ok(code, &payload)
        } else if code == codes.set_serial_timings {
            if args.len() != SERIAL_TIMINGS_SIZE {
                return self.status(code, malformed);
            }
            // The device acknowledges at the old rate, then switches.
            let response = self.ok(code, &[]);
            self.timings = SerialTimings::decode(args).expect("28 bytes");
            self.events.push(format!(
                "device timings {}",
                self.timings.bit_period_0 + self.timings.bit_period_1
            ));
            response
        } else if code == codes.get_token {
            let token = self.token;
            self.ok(code, &token)
        } else if code == codes.set_token {
            if args.len() != TOKEN_SIZE {
                return self.status(code, malformed);
            }
            let previous = self.token;
            self.token.copy_from_slice(args);
            self.ok(code, &previous)
        } else if code == codes.execute_payload {
            self.executed.push(args.to_vec());
            if response_expected {
                self.payload_response.clone()
            } else {
                Vec::new()
            }
        } else {
            self.status(code, DeviceStatus::CommandUnavailable)
        }
    }
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SimDevice {
    fn send_command(
        &mut self,
        address: u8,
        port: u8,
        payload: &[u8],
        response_expected: bool,
    ) -> Result<Vec<u8>, TransportError> {
        self.sent.push(payload.to_vec());

        if self.fail_next {
            self.fail_next = false;
            return Err(TransportError::Other("injected failure".to_string()));
        }
        let propcr = self.propcr_order(address) == Some(true);
        if address != self.address || !self.in_sync(address) || !propcr {
            return Err(TransportError::NoResponse { address });
        }
        if port != self.port {
            return Err(TransportError::CommandNotAvailable { port });
        }
        if let Some(frame) = self.scripted.pop_front() {
            return Ok(frame);
        }
        if payload.len() < HEADER_SIZE || payload[..3] != self.protocol.identifier {
            return Err(TransportError::NoResponse { address });
        }

        let response = self.answer(payload[3], &payload[HEADER_SIZE..], response_expected);
        Ok(if response_expected { response } else { Vec::new() })
    }

    fn baudrate(&self, address: u8) -> u32 {
        self.host_baudrate(address)
    }

    fn set_baudrate(&mut self, address: u8, baudrate: u32) -> Result<(), TransportError> {
        self.events.push(format!("host baudrate {}", baudrate));
        self.baudrates.insert(address, baudrate);
        Ok(())
    }

    fn send_break(&mut self, duration: Duration) -> Result<(), TransportError> {
        self.breaks.push(duration);
        let low_cycles = duration.as_millis() as u64 * CLKFREQ / 1000;
        let needed = self.timings.break_multiple as u64 * self.timings.recovery_time as u64;
        if low_cycles >= needed {
            self.timings = self.reset_timings;
            self.events.push("device reset timings".to_string());
        }
        Ok(())
    }

    fn propcr_order(&self, address: u8) -> Option<bool> {
        self.propcr_orders.get(&address).copied()
    }

    fn set_propcr_order(&mut self, address: u8, order: Option<bool>) -> Result<(), TransportError> {
        match order {
            Some(order) => self.propcr_orders.insert(address, order),
            None => self.propcr_orders.remove(&address),
        };
        Ok(())
    }
}

/// A client for the simulated device with the default configuration.
pub fn client(sim: &mut SimDevice) -> PeekPoke<&mut SimDevice> {
    PeekPoke::new(sim, ClientConfig::default()).expect("default config is valid")
}
