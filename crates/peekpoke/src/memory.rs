//! Hub memory operations of any size.
//!
//! Requests are split into atomic transactions with [`hub::chunks`], sent in
//! address order, and the results concatenated. A request may run past 65535
//! and continue at 0, but no single transaction does.
//!
//! Integer and string operations can instead ask for a single transaction
//! with `atomic`. Such a request must fit the atomic limit and may not wrap.

use peekpoke_protocol::{
    hub, scalar, text, Alignment, ByteOrder, MemoryAccess, RangeError, TextEncoding, HUB_SIZE,
};
use tracing::debug;

use crate::client::PeekPoke;
use crate::error::Result;
use crate::transport::Transport;

/// How integers are laid out in hub memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntOptions {
    pub byte_order: ByteOrder,
    pub signed: bool,
    pub alignment: Alignment,
    /// Use exactly one transaction or fail.
    pub atomic: bool,
}

impl IntOptions {
    pub fn signed() -> Self {
        IntOptions {
            signed: true,
            ..Default::default()
        }
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }
}

/// How strings are stored in hub memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrOptions {
    /// The string ends at a NUL byte.
    pub nul_terminated: bool,
    /// Cut strings that don't fit instead of failing.
    pub truncate: bool,
    pub encoding: TextEncoding,
    /// Use exactly one transaction or fail.
    pub atomic: bool,
}

impl Default for StrOptions {
    fn default() -> Self {
        StrOptions {
            nul_terminated: true,
            truncate: false,
            encoding: TextEncoding::Latin1,
            atomic: false,
        }
    }
}

impl StrOptions {
    /// A fixed-size field with no terminator.
    pub fn unterminated() -> Self {
        StrOptions {
            nul_terminated: false,
            ..Default::default()
        }
    }

    pub fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }
}

fn check_total(what: &str, count: usize) -> std::result::Result<(), RangeError> {
    RangeError::check(what, count as i128, 0, HUB_SIZE as i128)
}

impl<T: Transport> PeekPoke<T> {
    // ========================================================================
    // Bytes
    // ========================================================================

    /// Read `count` bytes (at most 65536).
    pub fn read_bytes(&mut self, address: u32, count: usize) -> Result<Vec<u8>> {
        let address = hub::normalize(address)?;
        check_total("count", count)?;
        self.check_restricted(MemoryAccess::Read, address, count)?;

        let max = self.config.protocol.max_atomic_read;
        let mut data = Vec::with_capacity(count);
        for (chunk_address, chunk_count) in hub::chunks(address, count, max) {
            data.extend(self.atomic_read_bytes(chunk_address as u32, chunk_count)?);
        }
        Ok(data)
    }

    /// Write `data` (at most 65536 bytes).
    pub fn write_bytes(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let address = hub::normalize(address)?;
        check_total("data length", data.len())?;
        self.check_restricted(MemoryAccess::Write, address, data.len())?;

        let max = self.config.protocol.max_atomic_write;
        let mut offset = 0;
        for (chunk_address, chunk_count) in hub::chunks(address, data.len(), max) {
            self.atomic_write_bytes(chunk_address as u32, &data[offset..offset + chunk_count])?;
            offset += chunk_count;
        }
        Ok(())
    }

    /// Fill `count` bytes with `pattern`, repeated and cut to length.
    pub fn fill_bytes(&mut self, address: u32, count: usize, pattern: &[u8]) -> Result<()> {
        hub::normalize(address)?;
        check_total("count", count)?;
        if pattern.is_empty() {
            return Err(RangeError::new("pattern length", 0, 1, usize::MAX as i128).into());
        }

        let data: Vec<u8> = pattern.iter().copied().cycle().take(count).collect();
        self.write_bytes(address, &data)
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// Read a string of at most `max_bytes` bytes.
    ///
    /// A terminated string stops at the first NUL, which is not included. An
    /// unterminated string is exactly `max_bytes` bytes.
    pub fn read_str(&mut self, address: u32, max_bytes: usize, opts: StrOptions) -> Result<String> {
        let address = hub::normalize(address)?;
        check_total("max_bytes", max_bytes)?;

        let bytes = match (opts.nul_terminated, opts.atomic) {
            (true, false) => self.read_terminated(address, max_bytes)?,
            (true, true) => {
                let mut bytes = self.atomic_read_str(address as u32, max_bytes)?;
                if let Some(nul) = bytes.iter().position(|&b| b == 0) {
                    bytes.truncate(nul);
                }
                bytes
            }
            (false, false) => self.read_bytes(address as u32, max_bytes)?,
            (false, true) => self.atomic_read_bytes(address as u32, max_bytes)?,
        };
        Ok(text::decode_text(&bytes, opts.encoding)?)
    }

    fn read_terminated(&mut self, address: u16, max_bytes: usize) -> Result<Vec<u8>> {
        self.check_restricted(MemoryAccess::Read, address, max_bytes)?;
        let max = self.config.protocol.max_atomic_read;
        let mut data = Vec::new();
        for (chunk_address, chunk_count) in hub::chunks(address, max_bytes, max) {
            let chunk = self.atomic_read_str(chunk_address as u32, chunk_count)?;
            if let Some(nul) = chunk.iter().position(|&b| b == 0) {
                data.extend_from_slice(&chunk[..nul]);
                return Ok(data);
            }
            data.extend(chunk);
        }
        Ok(data)
    }

    /// Write a string into a field of `max_bytes` bytes.
    ///
    /// With `nul_terminated`, one NUL is appended and counts toward
    /// `max_bytes`. A string that doesn't fit fails unless `truncate` is set.
    pub fn write_str(&mut self, address: u32, max_bytes: usize, s: &str, opts: StrOptions) -> Result<()> {
        hub::normalize(address)?;
        check_total("max_bytes", max_bytes)?;

        let mut bytes = text::encode_text(s, opts.encoding)?;
        let capacity = if opts.nul_terminated {
            if max_bytes == 0 {
                return Err(RangeError::new("max_bytes", 0, 1, HUB_SIZE as i128).into());
            }
            max_bytes - 1
        } else {
            max_bytes
        };

        if bytes.len() > capacity {
            if !opts.truncate {
                return Err(RangeError::new(
                    "encoded string length",
                    bytes.len() as i128,
                    0,
                    capacity as i128,
                )
                .into());
            }
            debug!(length = bytes.len(), capacity, "truncating string");
            bytes.truncate(capacity);
        }
        if opts.nul_terminated {
            bytes.push(0);
        }
        if opts.atomic {
            self.atomic_write_bytes(address, &bytes)
        } else {
            self.write_bytes(address, &bytes)
        }
    }

    // ========================================================================
    // Integers
    // ========================================================================

    /// Read one integer of `width` bytes (1, 2, 4 or 8).
    pub fn read_int(&mut self, address: u32, width: usize, opts: IntOptions) -> Result<i128> {
        let values = self.read_ints(address, width, 1, opts)?;
        Ok(values[0])
    }

    /// Write one integer of `width` bytes (1, 2, 4 or 8).
    pub fn write_int(&mut self, address: u32, width: usize, value: i128, opts: IntOptions) -> Result<()> {
        self.write_ints(address, width, &[value], opts)
    }

    /// Read `count` consecutive integers of `width` bytes.
    pub fn read_ints(&mut self, address: u32, width: usize, count: usize, opts: IntOptions) -> Result<Vec<i128>> {
        let start = self.check_int_span(address, width, count, opts.alignment)?;
        let bytes = if opts.atomic {
            self.atomic_read_bytes(start as u32, width * count)?
        } else {
            self.read_bytes(start as u32, width * count)?
        };
        let values = bytes
            .chunks_exact(width)
            .map(|b| scalar::decode_int(b, opts.byte_order, opts.signed))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(values)
    }

    /// Write `values` as consecutive integers of `width` bytes.
    pub fn write_ints(&mut self, address: u32, width: usize, values: &[i128], opts: IntOptions) -> Result<()> {
        let start = self.check_int_span(address, width, values.len(), opts.alignment)?;
        let mut bytes = Vec::with_capacity(width * values.len());
        for &value in values {
            bytes.extend(scalar::encode_int(value, width, opts.byte_order, opts.signed)?);
        }
        if opts.atomic {
            self.atomic_write_bytes(start as u32, &bytes)
        } else {
            self.write_bytes(start as u32, &bytes)
        }
    }

    /// Validate width, total size and alignment of every element.
    fn check_int_span(&self, address: u32, width: usize, count: usize, alignment: Alignment) -> Result<u16> {
        let address = hub::normalize(address)?;
        scalar::check_width(width)?;
        RangeError::check("count", count as i128, 0, (HUB_SIZE / width) as i128)?;
        for index in 0..count {
            hub::check_alignment(hub::wrap_add(address, index * width), width, alignment)?;
        }
        Ok(address)
    }
}
