//! Bit cursors over octet buffers. Bits are written and read MSB first, the order
//! used by every PER encoding in this crate.

use super::PerError;

enum Storage<'a> {
    Borrowed(&'a mut [u8]),
    Owned(Vec<u8>),
}

/// Write cursor. Either fills a caller-owned slice (fixed capacity) or grows an
/// internal buffer.
pub struct BitWriter<'a> {
    storage: Storage<'a>,
    pos: usize,
}

impl<'a> BitWriter<'a> {
    /// Writer over a caller-owned buffer. Writing past its end fails with `OutOfSpace`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            storage: Storage::Borrowed(buf),
            pos: 0,
        }
    }
}

impl BitWriter<'static> {
    /// Writer that owns a growable buffer.
    pub fn growable() -> Self {
        Self {
            storage: Storage::Owned(Vec::new()),
            pos: 0,
        }
    }
}

impl BitWriter<'_> {
    pub fn bits_written(&self) -> usize {
        self.pos
    }

    pub fn bytes_written(&self) -> usize {
        self.pos.div_ceil(8)
    }

    /// Bits that can still be written; `None` for a growable writer.
    pub fn remaining(&self) -> Option<usize> {
        match &self.storage {
            Storage::Borrowed(b) => Some(b.len().saturating_mul(8).saturating_sub(self.pos)),
            Storage::Owned(_) => None,
        }
    }

    fn reserve(&mut self, n: usize) -> Result<(), PerError> {
        let needed = (self.pos + n).div_ceil(8);
        match &mut self.storage {
            Storage::Borrowed(b) => {
                if needed > b.len() {
                    return Err(PerError::OutOfSpace {
                        needed: n,
                        available: b.len().saturating_mul(8).saturating_sub(self.pos),
                    });
                }
            }
            Storage::Owned(v) => {
                if v.len() < needed {
                    v.resize(needed, 0);
                }
            }
        }
        Ok(())
    }

    fn buf_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Borrowed(b) => b,
            Storage::Owned(v) => v.as_mut_slice(),
        }
    }

    /// Append the low `n` bits of `value` (n <= 64), most significant first.
    pub fn write_bits(&mut self, value: u64, n: u32) -> Result<(), PerError> {
        if n > 64 {
            return Err(PerError::ConstraintViolation(format!(
                "cannot write {n} bits in one call"
            )));
        }
        if n == 0 {
            return Ok(());
        }
        self.reserve(n as usize)?;
        let mut pos = self.pos;
        let mut left = n;
        let buf = self.buf_mut();
        while left > 0 {
            let offset = (pos % 8) as u32;
            let room = 8 - offset;
            let take = room.min(left);
            let chunk = ((value >> (left - take)) & ((1u64 << take) - 1)) as u8;
            let shift = room - take;
            let mask = (((1u16 << take) - 1) as u8) << shift;
            let byte = &mut buf[pos / 8];
            *byte = (*byte & !mask) | (chunk << shift);
            left -= take;
            pos += take as usize;
        }
        self.pos = pos;
        Ok(())
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), PerError> {
        self.write_bits(u64::from(bit), 1)
    }

    /// Append whole octets at the current (possibly unaligned) position.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), PerError> {
        self.reserve(bytes.len().saturating_mul(8))?;
        for &b in bytes {
            self.write_bits(u64::from(b), 8)?;
        }
        Ok(())
    }

    /// Pad with zero bits up to the next octet boundary.
    pub fn align_byte(&mut self) -> Result<(), PerError> {
        let pad = (8 - self.pos % 8) % 8;
        self.write_bits(0, pad as u32)
    }

    /// Octets touched so far; the last one is zero-padded when the writer owns its
    /// buffer.
    pub fn as_bytes(&self) -> &[u8] {
        let n = self.bytes_written();
        match &self.storage {
            Storage::Borrowed(b) => &b[..n],
            Storage::Owned(v) => &v[..n],
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let n = self.bytes_written();
        match self.storage {
            Storage::Borrowed(b) => b[..n].to_vec(),
            Storage::Owned(mut v) => {
                v.truncate(n);
                v
            }
        }
    }
}

/// Read cursor over a caller-owned buffer, bounded by a bit length.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            end: buf.len().saturating_mul(8),
        }
    }

    /// Reader limited to the first `bits` bits of `buf`.
    pub fn with_bit_len(buf: &'a [u8], bits: usize) -> Self {
        Self {
            buf,
            pos: 0,
            end: bits.min(buf.len().saturating_mul(8)),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    fn check(&self, needed: usize) -> Result<(), PerError> {
        if needed > self.remaining() {
            return Err(PerError::OutOfData {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Read the next `n` bits (n <= 64) as an unsigned value.
    pub fn read_bits(&mut self, n: u32) -> Result<u64, PerError> {
        if n > 64 {
            return Err(PerError::ConstraintViolation(format!(
                "cannot read {n} bits in one call"
            )));
        }
        self.check(n as usize)?;
        let mut value = 0u64;
        let mut left = n;
        while left > 0 {
            let offset = (self.pos % 8) as u32;
            let room = 8 - offset;
            let take = room.min(left);
            let byte = u64::from(self.buf[self.pos / 8]);
            let chunk = (byte >> (room - take)) & ((1u64 << take) - 1);
            value = (value << take) | chunk;
            left -= take;
            self.pos += take as usize;
        }
        Ok(value)
    }

    pub fn read_bit(&mut self) -> Result<bool, PerError> {
        Ok(self.read_bits(1)? == 1)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, PerError> {
        self.check(n.saturating_mul(8))?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read_bits(8)? as u8);
        }
        Ok(out)
    }

    pub fn skip_bits(&mut self, n: usize) -> Result<(), PerError> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    /// Skip to the next octet boundary.
    pub fn align_byte(&mut self) -> Result<(), PerError> {
        let pad = (8 - self.pos % 8) % 8;
        self.skip_bits(pad)
    }
}
