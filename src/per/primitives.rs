//! Primitive PER codecs: whole numbers, enumerations, bit and octet strings,
//! length determinants and normally-small numbers (X.691 clauses 10-16).
//!
//! The free functions are shared by the typed records and the schema-driven codec;
//! the wrapper types carry their constraints as const generics.

use std::fmt;
use std::ops::Range;

use bitvec::prelude::{BitSlice, BitVec, Msb0};
use byteorder::{BigEndian, ByteOrder};
use serde::{Serialize, Serializer};

use super::{BitReader, BitWriter, DecodeError, EncodeError, Pack, PerError, Unpack};

/// Lengths at or above this use the general (unconstrained) form.
pub const CONSTRAINED_LENGTH_LIMIT: u64 = 65536;
/// One length fragment block.
pub const FRAGMENT_UNIT: usize = 16384;

pub type Bits = BitVec<u8, Msb0>;

// ---------------------------------------------------------------------------
// Whole numbers
// ---------------------------------------------------------------------------

/// Bits needed for a value in `0..=span`.
pub fn range_width(span: u64) -> u32 {
    64 - span.leading_zeros()
}

/// Bits used by a constrained whole number in `lb..=ub`.
pub fn constrained_width(lb: i64, ub: i64) -> u32 {
    range_width((i128::from(ub) - i128::from(lb)).max(0) as u64)
}

pub fn encode_constrained_whole_number(
    w: &mut BitWriter<'_>,
    value: i64,
    lb: i64,
    ub: i64,
) -> Result<(), EncodeError> {
    if value < lb || value > ub {
        return Err(PerError::ConstraintViolation(format!(
            "{value} not in {lb}..={ub}"
        )));
    }
    let offset = (i128::from(value) - i128::from(lb)) as u64;
    w.write_bits(offset, constrained_width(lb, ub))
}

pub fn decode_constrained_whole_number(
    r: &mut BitReader<'_>,
    lb: i64,
    ub: i64,
) -> Result<i64, DecodeError> {
    let raw = r.read_bits(constrained_width(lb, ub))?;
    let value = i128::from(lb) + i128::from(raw);
    if value > i128::from(ub) {
        return Err(PerError::ConstraintViolation(format!(
            "{value} not in {lb}..={ub}"
        )));
    }
    Ok(value as i64)
}

fn write_octets_with_length(w: &mut BitWriter<'_>, octets: &[u8]) -> Result<(), EncodeError> {
    write_general_length(w, octets.len())?;
    w.write_bytes(octets)
}

fn read_integer_octets(r: &mut BitReader<'_>) -> Result<Vec<u8>, DecodeError> {
    let (len, more) = read_general_length(r)?;
    if more || !(1..=8).contains(&len) {
        return Err(PerError::ConstraintViolation(format!(
            "integer of {len} octets is not supported"
        )));
    }
    r.read_bytes(len)
}

/// Semi-constrained whole number `lb..MAX`: octet count, then the minimal
/// non-negative binary integer of `value - lb`.
pub fn encode_semi_constrained_whole_number(
    w: &mut BitWriter<'_>,
    value: i64,
    lb: i64,
) -> Result<(), EncodeError> {
    if value < lb {
        return Err(PerError::ConstraintViolation(format!(
            "{value} below lower bound {lb}"
        )));
    }
    let offset = (i128::from(value) - i128::from(lb)) as u64;
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, offset);
    let skip = (offset.leading_zeros() / 8).min(7) as usize;
    write_octets_with_length(w, &buf[skip..])
}

pub fn decode_semi_constrained_whole_number(
    r: &mut BitReader<'_>,
    lb: i64,
) -> Result<i64, DecodeError> {
    let octets = read_integer_octets(r)?;
    let mut buf = [0u8; 8];
    buf[8 - octets.len()..].copy_from_slice(&octets);
    let offset = BigEndian::read_u64(&buf);
    let value = i128::from(lb) + i128::from(offset);
    i64::try_from(value)
        .map_err(|_| PerError::ConstraintViolation(format!("{value} does not fit in 64 bits")))
}

/// Unconstrained whole number: octet count, then minimal two's-complement octets.
pub fn encode_unconstrained_whole_number(
    w: &mut BitWriter<'_>,
    value: i64,
) -> Result<(), EncodeError> {
    let len = (1..=8usize)
        .find(|n| {
            let shift = 64 - 8 * *n as u32;
            shift == 0 || (value << shift) >> shift == value
        })
        .unwrap_or(8);
    let mut buf = [0u8; 8];
    BigEndian::write_i64(&mut buf, value);
    write_octets_with_length(w, &buf[8 - len..])
}

pub fn decode_unconstrained_whole_number(r: &mut BitReader<'_>) -> Result<i64, DecodeError> {
    let octets = read_integer_octets(r)?;
    let fill = if octets[0] & 0x80 != 0 { 0xff } else { 0x00 };
    let mut buf = [fill; 8];
    buf[8 - octets.len()..].copy_from_slice(&octets);
    Ok(BigEndian::read_i64(&buf))
}

/// Extensible constrained integer `(lb..ub, ...)`.
pub fn encode_extensible_whole_number(
    w: &mut BitWriter<'_>,
    value: i64,
    lb: i64,
    ub: i64,
) -> Result<(), EncodeError> {
    if (lb..=ub).contains(&value) {
        w.write_bit(false)?;
        encode_constrained_whole_number(w, value, lb, ub)
    } else {
        w.write_bit(true)?;
        encode_unconstrained_whole_number(w, value)
    }
}

pub fn decode_extensible_whole_number(
    r: &mut BitReader<'_>,
    lb: i64,
    ub: i64,
) -> Result<i64, DecodeError> {
    if r.read_bit()? {
        decode_unconstrained_whole_number(r)
    } else {
        decode_constrained_whole_number(r, lb, ub)
    }
}

/// Normally-small non-negative whole number (X.691 11.6).
pub fn encode_normally_small(w: &mut BitWriter<'_>, n: u64) -> Result<(), EncodeError> {
    if n < 64 {
        w.write_bit(false)?;
        w.write_bits(n, 6)
    } else {
        w.write_bit(true)?;
        let value = i64::try_from(n)
            .map_err(|_| PerError::ConstraintViolation(format!("{n} is too large")))?;
        encode_semi_constrained_whole_number(w, value, 0)
    }
}

pub fn decode_normally_small(r: &mut BitReader<'_>) -> Result<u64, DecodeError> {
    if r.read_bit()? {
        Ok(decode_semi_constrained_whole_number(r, 0)? as u64)
    } else {
        r.read_bits(6)
    }
}

/// Normally-small length (X.691 11.9.3.4), used for the extension addition bitmap.
pub fn encode_normally_small_length(w: &mut BitWriter<'_>, n: usize) -> Result<(), EncodeError> {
    if n == 0 {
        return Err(PerError::ConstraintViolation(
            "normally small length must be at least 1".into(),
        ));
    }
    if n <= 64 {
        w.write_bit(false)?;
        w.write_bits(n as u64 - 1, 6)
    } else {
        w.write_bit(true)?;
        write_general_length(w, n)
    }
}

pub fn decode_normally_small_length(r: &mut BitReader<'_>) -> Result<usize, DecodeError> {
    if r.read_bit()? {
        let (n, more) = read_general_length(r)?;
        if more {
            return Err(PerError::ConstraintViolation(
                "fragmented extension bitmap".into(),
            ));
        }
        Ok(n)
    } else {
        Ok(r.read_bits(6)? as usize + 1)
    }
}

// ---------------------------------------------------------------------------
// Length determinants
// ---------------------------------------------------------------------------

/// Effective size constraint of a string or SEQUENCE OF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeConstraint {
    pub lb: u64,
    pub ub: Option<u64>,
    pub extensible: bool,
}

impl SizeConstraint {
    pub const fn fixed(n: u64) -> Self {
        Self {
            lb: n,
            ub: Some(n),
            extensible: false,
        }
    }

    pub const fn range(lb: u64, ub: u64) -> Self {
        Self {
            lb,
            ub: Some(ub),
            extensible: false,
        }
    }

    pub const fn at_least(lb: u64) -> Self {
        Self {
            lb,
            ub: None,
            extensible: false,
        }
    }

    pub const fn unbounded() -> Self {
        Self::at_least(0)
    }

    /// Const-generic bounds where `usize::MAX` stands for "no upper bound".
    pub const fn from_generic(lb: usize, ub: usize) -> Self {
        Self {
            lb: lb as u64,
            ub: if ub == usize::MAX { None } else { Some(ub as u64) },
            extensible: false,
        }
    }

    pub const fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }

    pub fn contains(&self, n: u64) -> bool {
        n >= self.lb && self.ub.map_or(true, |ub| n <= ub)
    }
}

impl fmt::Display for SizeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ub {
            Some(ub) => write!(f, "SIZE({}..{})", self.lb, ub)?,
            None => write!(f, "SIZE({}..MAX)", self.lb)?,
        }
        if self.extensible {
            write!(f, ", ...")?;
        }
        Ok(())
    }
}

/// General length determinant below the fragmentation threshold.
fn write_general_length(w: &mut BitWriter<'_>, n: usize) -> Result<(), EncodeError> {
    if n < 128 {
        w.write_bits(n as u64, 8)
    } else if n < FRAGMENT_UNIT {
        w.write_bits(0b10 << 14 | n as u64, 16)
    } else {
        Err(PerError::ConstraintViolation(format!(
            "length {n} needs fragmentation"
        )))
    }
}

/// Returns the length and whether more fragments follow.
fn read_general_length(r: &mut BitReader<'_>) -> Result<(usize, bool), DecodeError> {
    if !r.read_bit()? {
        return Ok((r.read_bits(7)? as usize, false));
    }
    if !r.read_bit()? {
        return Ok((r.read_bits(14)? as usize, false));
    }
    let blocks = r.read_bits(6)?;
    if !(1..=4).contains(&blocks) {
        return Err(PerError::ConstraintViolation(format!(
            "invalid fragment multiplier {blocks}"
        )));
    }
    Ok((blocks as usize * FRAGMENT_UNIT, true))
}

fn encode_fragmented<E, F>(w: &mut BitWriter<'_>, count: usize, write_items: &mut F) -> Result<(), E>
where
    E: From<PerError>,
    F: FnMut(&mut BitWriter<'_>, Range<usize>) -> Result<(), E>,
{
    let mut done = 0;
    loop {
        let rest = count - done;
        if rest < FRAGMENT_UNIT {
            write_general_length(w, rest)?;
            return write_items(w, done..count);
        }
        let blocks = (rest / FRAGMENT_UNIT).min(4);
        w.write_bits(0b11, 2)?;
        w.write_bits(blocks as u64, 6)?;
        let len = blocks * FRAGMENT_UNIT;
        write_items(w, done..done + len)?;
        done += len;
    }
}

fn decode_fragmented<E, F>(
    r: &mut BitReader<'_>,
    max: Option<u64>,
    read_items: &mut F,
) -> Result<usize, E>
where
    E: From<PerError>,
    F: FnMut(&mut BitReader<'_>, usize) -> Result<(), E>,
{
    let mut total = 0usize;
    loop {
        let (len, more) = read_general_length(r)?;
        let next = total
            .checked_add(len)
            .ok_or_else(|| PerError::ConstraintViolation("length overflow".into()))?;
        if let Some(max) = max {
            if next as u64 > max {
                return Err(PerError::ConstraintViolation(format!(
                    "length {next} exceeds upper bound {max}"
                ))
                .into());
            }
        }
        read_items(r, len)?;
        total = next;
        if !more {
            return Ok(total);
        }
    }
}

fn check_bounds(size: SizeConstraint) -> Result<(), PerError> {
    match size.ub {
        Some(ub) if ub < size.lb => Err(PerError::ConstraintViolation(format!(
            "empty size range {size}"
        ))),
        _ => Ok(()),
    }
}

/// Encode a length determinant for `count` items followed by the items themselves.
/// `write_items` is called once per fragment with the item range it must emit.
pub fn encode_with_length<E, F>(
    w: &mut BitWriter<'_>,
    count: usize,
    size: SizeConstraint,
    mut write_items: F,
) -> Result<(), E>
where
    E: From<PerError>,
    F: FnMut(&mut BitWriter<'_>, Range<usize>) -> Result<(), E>,
{
    check_bounds(size)?;
    let n = count as u64;
    let in_root = size.contains(n);
    if size.extensible {
        w.write_bit(!in_root)?;
        if !in_root {
            return encode_fragmented(w, count, &mut write_items);
        }
    } else if !in_root {
        return Err(PerError::ConstraintViolation(format!(
            "size {count} outside {size}"
        ))
        .into());
    }
    match size.ub {
        Some(ub) if ub < CONSTRAINED_LENGTH_LIMIT => {
            w.write_bits(n - size.lb, range_width(ub - size.lb))?;
            write_items(w, 0..count)
        }
        _ => encode_fragmented(w, count, &mut write_items),
    }
}

/// Decode a length determinant and its items. `read_items` is called once per
/// fragment with the number of items to read; the total is range-checked before the
/// items of each fragment are read.
pub fn decode_with_length<E, F>(
    r: &mut BitReader<'_>,
    size: SizeConstraint,
    mut read_items: F,
) -> Result<usize, E>
where
    E: From<PerError>,
    F: FnMut(&mut BitReader<'_>, usize) -> Result<(), E>,
{
    check_bounds(size)?;
    if size.extensible && r.read_bit()? {
        return decode_fragmented(r, None, &mut read_items);
    }
    match size.ub {
        Some(ub) if ub < CONSTRAINED_LENGTH_LIMIT => {
            let offset = r.read_bits(range_width(ub - size.lb))?;
            let n = size.lb + offset;
            if n > ub {
                return Err(PerError::ConstraintViolation(format!(
                    "size {n} outside {size}"
                ))
                .into());
            }
            read_items(r, n as usize)?;
            Ok(n as usize)
        }
        ub => {
            let n = decode_fragmented(r, ub, &mut read_items)?;
            if (n as u64) < size.lb {
                return Err(PerError::ConstraintViolation(format!(
                    "size {n} outside {size}"
                ))
                .into());
            }
            Ok(n)
        }
    }
}

// ---------------------------------------------------------------------------
// Bit and octet strings
// ---------------------------------------------------------------------------

fn write_bit_slice(w: &mut BitWriter<'_>, bits: &BitSlice<u8, Msb0>) -> Result<(), EncodeError> {
    for chunk in bits.chunks(64) {
        let value = chunk
            .iter()
            .by_vals()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit));
        w.write_bits(value, chunk.len() as u32)?;
    }
    Ok(())
}

fn read_bits_into(r: &mut BitReader<'_>, out: &mut Bits, n: usize) -> Result<(), DecodeError> {
    if n > r.remaining() {
        return Err(PerError::OutOfData {
            needed: n,
            available: r.remaining(),
        });
    }
    out.reserve(n);
    let mut left = n;
    while left > 0 {
        let take = left.min(64);
        let value = r.read_bits(take as u32)?;
        for i in (0..take).rev() {
            out.push((value >> i) & 1 == 1);
        }
        left -= take;
    }
    Ok(())
}

pub fn encode_bit_string(
    w: &mut BitWriter<'_>,
    bits: &BitSlice<u8, Msb0>,
    size: SizeConstraint,
) -> Result<(), EncodeError> {
    encode_with_length(w, bits.len(), size, |w, range| write_bit_slice(w, &bits[range]))
}

pub fn decode_bit_string(r: &mut BitReader<'_>, size: SizeConstraint) -> Result<Bits, DecodeError> {
    let mut bits = Bits::new();
    decode_with_length(r, size, |r, n| read_bits_into(r, &mut bits, n))?;
    Ok(bits)
}

pub fn encode_octet_string(
    w: &mut BitWriter<'_>,
    octets: &[u8],
    size: SizeConstraint,
) -> Result<(), EncodeError> {
    encode_with_length(w, octets.len(), size, |w, range| w.write_bytes(&octets[range]))
}

pub fn decode_octet_string(
    r: &mut BitReader<'_>,
    size: SizeConstraint,
) -> Result<Vec<u8>, DecodeError> {
    let mut octets = Vec::new();
    decode_with_length(r, size, |r, n| -> Result<(), DecodeError> {
        octets.extend_from_slice(&r.read_bytes(n)?);
        Ok(())
    })?;
    Ok(octets)
}

/// Serialize bits as a `'0'`/`'1'` string.
pub fn serialize_bits<S: Serializer>(bits: &Bits, s: S) -> Result<S::Ok, S::Error> {
    let text: String = bits.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect();
    s.serialize_str(&text)
}

/// Serialize octets as lowercase hex.
pub fn serialize_hex<S: Serializer>(octets: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(octets))
}

/// BIT STRING (SIZE(N)).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedBitString<const N: usize>(Bits);

impl<const N: usize> FixedBitString<N> {
    pub fn new(bits: Bits) -> Result<Self, PerError> {
        if bits.len() != N {
            return Err(PerError::ConstraintViolation(format!(
                "bit string of {} bits, expected {N}",
                bits.len()
            )));
        }
        Ok(Self(bits))
    }

    pub fn zeroed() -> Self {
        Self(Bits::repeat(false, N))
    }

    /// Low `N` bits of `value`, most significant first (N <= 64).
    pub fn from_u64(value: u64) -> Self {
        let mut bits = Bits::with_capacity(N);
        for i in (0..N).rev() {
            bits.push(i < 64 && (value >> i) & 1 == 1);
        }
        Self(bits)
    }

    /// The bits as an integer; bits above 64 are dropped.
    pub fn to_u64(&self) -> u64 {
        self.0
            .iter()
            .by_vals()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit))
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.0
    }
}

impl<const N: usize> Default for FixedBitString<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> Serialize for FixedBitString<N> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        serialize_bits(&self.0, s)
    }
}

impl<const N: usize> Pack for FixedBitString<N> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        encode_bit_string(w, &self.0, SizeConstraint::fixed(N as u64))
    }
}

impl<const N: usize> Unpack for FixedBitString<N> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        decode_bit_string(r, SizeConstraint::fixed(N as u64)).map(Self)
    }
}

/// BIT STRING (SIZE(LB..UB)); `UB = usize::MAX` means no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString<const LB: usize = 0, const UB: usize = { usize::MAX }>(Bits);

impl<const LB: usize, const UB: usize> BitString<LB, UB> {
    pub const SIZE: SizeConstraint = SizeConstraint::from_generic(LB, UB);

    pub fn new(bits: Bits) -> Result<Self, PerError> {
        if !Self::SIZE.contains(bits.len() as u64) {
            return Err(PerError::ConstraintViolation(format!(
                "bit string of {} bits outside {}",
                bits.len(),
                Self::SIZE
            )));
        }
        Ok(Self(bits))
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const LB: usize, const UB: usize> Default for BitString<LB, UB> {
    fn default() -> Self {
        Self(Bits::repeat(false, LB))
    }
}

impl<const LB: usize, const UB: usize> Serialize for BitString<LB, UB> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        serialize_bits(&self.0, s)
    }
}

impl<const LB: usize, const UB: usize> Pack for BitString<LB, UB> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        encode_bit_string(w, &self.0, Self::SIZE)
    }
}

impl<const LB: usize, const UB: usize> Unpack for BitString<LB, UB> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        decode_bit_string(r, Self::SIZE).map(Self)
    }
}

/// OCTET STRING (SIZE(N)).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedOctetString<const N: usize>(Vec<u8>);

impl<const N: usize> FixedOctetString<N> {
    pub fn new(octets: Vec<u8>) -> Result<Self, PerError> {
        if octets.len() != N {
            return Err(PerError::ConstraintViolation(format!(
                "octet string of {} octets, expected {N}",
                octets.len()
            )));
        }
        Ok(Self(octets))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> Default for FixedOctetString<N> {
    fn default() -> Self {
        Self(vec![0; N])
    }
}

impl<const N: usize> Serialize for FixedOctetString<N> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        serialize_hex(&self.0, s)
    }
}

impl<const N: usize> Pack for FixedOctetString<N> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        encode_octet_string(w, &self.0, SizeConstraint::fixed(N as u64))
    }
}

impl<const N: usize> Unpack for FixedOctetString<N> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        decode_octet_string(r, SizeConstraint::fixed(N as u64)).map(Self)
    }
}

/// OCTET STRING (SIZE(LB..UB)); `UB = usize::MAX` means no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OctetString<const LB: usize = 0, const UB: usize = { usize::MAX }>(Vec<u8>);

impl<const LB: usize, const UB: usize> OctetString<LB, UB> {
    pub const SIZE: SizeConstraint = SizeConstraint::from_generic(LB, UB);

    pub fn new(octets: Vec<u8>) -> Result<Self, PerError> {
        if !Self::SIZE.contains(octets.len() as u64) {
            return Err(PerError::ConstraintViolation(format!(
                "octet string of {} octets outside {}",
                octets.len(),
                Self::SIZE
            )));
        }
        Ok(Self(octets))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl<const LB: usize, const UB: usize> Default for OctetString<LB, UB> {
    fn default() -> Self {
        Self(vec![0; LB])
    }
}

impl<const LB: usize, const UB: usize> Serialize for OctetString<LB, UB> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        serialize_hex(&self.0, s)
    }
}

impl<const LB: usize, const UB: usize> Pack for OctetString<LB, UB> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        encode_octet_string(w, &self.0, Self::SIZE)
    }
}

impl<const LB: usize, const UB: usize> Unpack for OctetString<LB, UB> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        decode_octet_string(r, Self::SIZE).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Integer wrappers
// ---------------------------------------------------------------------------

/// INTEGER (LB..UB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ConstrainedInt<const LB: i64, const UB: i64>(i64);

impl<const LB: i64, const UB: i64> ConstrainedInt<LB, UB> {
    pub const MIN: Self = Self(LB);
    pub const MAX: Self = Self(UB);

    pub fn new(value: i64) -> Result<Self, PerError> {
        if !(LB..=UB).contains(&value) {
            return Err(PerError::ConstraintViolation(format!(
                "{value} not in {LB}..={UB}"
            )));
        }
        Ok(Self(value))
    }

    /// Constructor for literals; out-of-range values fail const evaluation.
    pub const fn new_const(value: i64) -> Self {
        assert!(value >= LB && value <= UB, "value outside constraint");
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    pub fn width() -> u32 {
        constrained_width(LB, UB)
    }
}

impl<const LB: i64, const UB: i64> Default for ConstrainedInt<LB, UB> {
    fn default() -> Self {
        Self(LB)
    }
}

impl<const LB: i64, const UB: i64> TryFrom<i64> for ConstrainedInt<LB, UB> {
    type Error = PerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<const LB: i64, const UB: i64> Pack for ConstrainedInt<LB, UB> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        encode_constrained_whole_number(w, self.0, LB, UB)
    }
}

impl<const LB: i64, const UB: i64> Unpack for ConstrainedInt<LB, UB> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        decode_constrained_whole_number(r, LB, UB).map(Self)
    }
}

/// INTEGER (LB..UB, ...): any value; values outside the root travel unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ExtensibleInt<const LB: i64, const UB: i64>(pub i64);

impl<const LB: i64, const UB: i64> ExtensibleInt<LB, UB> {
    pub fn in_root(self) -> bool {
        (LB..=UB).contains(&self.0)
    }
}

impl<const LB: i64, const UB: i64> Default for ExtensibleInt<LB, UB> {
    fn default() -> Self {
        Self(LB)
    }
}

impl<const LB: i64, const UB: i64> Pack for ExtensibleInt<LB, UB> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        encode_extensible_whole_number(w, self.0, LB, UB)
    }
}

impl<const LB: i64, const UB: i64> Unpack for ExtensibleInt<LB, UB> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        decode_extensible_whole_number(r, LB, UB).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Enumerations and choice indexes
// ---------------------------------------------------------------------------

/// Index of an enumeration value or choice alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminant {
    Root(u64),
    Extension(u64),
}

/// Shared by ENUMERATED and CHOICE: optional extension bit, then a constrained index
/// over the root or a normally-small extension index.
pub fn encode_discriminant(
    w: &mut BitWriter<'_>,
    d: Discriminant,
    root_count: u64,
    extensible: bool,
) -> Result<(), EncodeError> {
    match d {
        Discriminant::Root(i) => {
            if i >= root_count {
                return Err(PerError::ConstraintViolation(format!(
                    "index {i} outside root of {root_count}"
                )));
            }
            if extensible {
                w.write_bit(false)?;
            }
            w.write_bits(i, range_width(root_count.saturating_sub(1)))
        }
        Discriminant::Extension(i) => {
            if !extensible {
                return Err(PerError::ConstraintViolation(
                    "extension index on a non-extensible type".into(),
                ));
            }
            w.write_bit(true)?;
            encode_normally_small(w, i)
        }
    }
}

pub fn decode_discriminant(
    r: &mut BitReader<'_>,
    root_count: u64,
    extensible: bool,
    type_name: &'static str,
) -> Result<Discriminant, DecodeError> {
    if extensible && r.read_bit()? {
        return Ok(Discriminant::Extension(decode_normally_small(r)?));
    }
    let index = r.read_bits(range_width(root_count.saturating_sub(1)))?;
    if index >= root_count {
        return Err(PerError::UnknownDiscriminant { type_name, index });
    }
    Ok(Discriminant::Root(index))
}

/// An ENUMERATED type: root values in declaration order plus extension values.
pub trait PerEnum: Copy + PartialEq + 'static {
    const NAME: &'static str;
    const ROOT: &'static [Self];
    const EXTENSIONS: &'static [Self] = &[];
    const EXTENSIBLE: bool = false;

    fn discriminant(self) -> Option<Discriminant> {
        if let Some(i) = Self::ROOT.iter().position(|v| *v == self) {
            return Some(Discriminant::Root(i as u64));
        }
        Self::EXTENSIONS
            .iter()
            .position(|v| *v == self)
            .map(|i| Discriminant::Extension(i as u64))
    }
}

pub fn encode_enumerated<E: PerEnum>(w: &mut BitWriter<'_>, value: E) -> Result<(), EncodeError> {
    let d = value.discriminant().ok_or_else(|| {
        PerError::ConstraintViolation(format!("value not declared in {}", E::NAME))
    })?;
    encode_discriminant(w, d, E::ROOT.len() as u64, E::EXTENSIBLE)
}

/// Decode a plain enumeration. An extension index not known to `E` yields
/// `UnrecognizedExtension`; use [`Enumerated`] to keep it instead.
pub fn decode_enumerated<E: PerEnum>(r: &mut BitReader<'_>) -> Result<E, DecodeError> {
    match decode_discriminant(r, E::ROOT.len() as u64, E::EXTENSIBLE, E::NAME)? {
        Discriminant::Root(i) => E::ROOT
            .get(i as usize)
            .copied()
            .ok_or(PerError::UnknownDiscriminant {
                type_name: E::NAME,
                index: i,
            }),
        Discriminant::Extension(i) => E::EXTENSIONS.get(i as usize).copied().ok_or(
            PerError::UnrecognizedExtension {
                type_name: E::NAME,
                index: i,
            },
        ),
    }
}

/// Value of an extensible enumeration, keeping extension indexes this build does
/// not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Enumerated<E> {
    Known(E),
    UnknownExtension(u64),
}

impl<E: PerEnum> Enumerated<E> {
    pub fn get(&self) -> Option<E> {
        match self {
            Self::Known(v) => Some(*v),
            Self::UnknownExtension(_) => None,
        }
    }

    pub fn known(&self) -> Result<E, PerError> {
        match self {
            Self::Known(v) => Ok(*v),
            Self::UnknownExtension(index) => Err(PerError::UnrecognizedExtension {
                type_name: E::NAME,
                index: *index,
            }),
        }
    }
}

impl<E: Default> Default for Enumerated<E> {
    fn default() -> Self {
        Self::Known(E::default())
    }
}

impl<E> From<E> for Enumerated<E> {
    fn from(v: E) -> Self {
        Self::Known(v)
    }
}

impl<E: PerEnum> Pack for Enumerated<E> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Known(v) => encode_enumerated(w, *v),
            Self::UnknownExtension(i) => {
                encode_discriminant(w, Discriminant::Extension(*i), E::ROOT.len() as u64, E::EXTENSIBLE)
            }
        }
    }
}

impl<E: PerEnum> Unpack for Enumerated<E> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        match decode_discriminant(r, E::ROOT.len() as u64, E::EXTENSIBLE, E::NAME)? {
            Discriminant::Root(i) => E::ROOT
                .get(i as usize)
                .map(|v| Self::Known(*v))
                .ok_or(PerError::UnknownDiscriminant {
                    type_name: E::NAME,
                    index: i,
                }),
            Discriminant::Extension(i) => match E::EXTENSIONS.get(i as usize) {
                Some(v) => Ok(Self::Known(*v)),
                None => {
                    log::debug!("{}: keeping unknown extension value {i}", E::NAME);
                    Ok(Self::UnknownExtension(i))
                }
            },
        }
    }
}

/// `Pack`/`Unpack` through [`encode_enumerated`]/[`decode_enumerated`].
macro_rules! impl_enum_codec {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::per::Pack for $t {
                fn pack(
                    &self,
                    w: &mut $crate::per::BitWriter<'_>,
                ) -> Result<(), $crate::per::EncodeError> {
                    $crate::per::primitives::encode_enumerated(w, *self)
                }
            }

            impl $crate::per::Unpack for $t {
                fn unpack(
                    r: &mut $crate::per::BitReader<'_>,
                ) -> Result<Self, $crate::per::DecodeError> {
                    $crate::per::primitives::decode_enumerated(r)
                }
            }
        )+
    };
}
pub(crate) use impl_enum_codec;

/// Declares an ENUMERATED type. The first value is the `Default`. A `...` marker makes
/// it extensible; the values after it are extension values, and the type is carried
/// in records as `Enumerated<T>`.
macro_rules! per_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($asn:literal) { $first:ident $(, $rest:ident)* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
        $vis enum $name {
            #[default]
            $first,
            $($rest),*
        }

        impl $crate::per::PerEnum for $name {
            const NAME: &'static str = $asn;
            const ROOT: &'static [Self] = &[Self::$first $(, Self::$rest)*];
        }

        $crate::per::impl_enum_codec!($name);
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($asn:literal) {
            $first:ident $(, $rest:ident)*, ... $(, $ext:ident)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
        $vis enum $name {
            #[default]
            $first,
            $($rest,)*
            $($ext),*
        }

        impl $crate::per::PerEnum for $name {
            const NAME: &'static str = $asn;
            const ROOT: &'static [Self] = &[Self::$first $(, Self::$rest)*];
            const EXTENSIONS: &'static [Self] = &[$(Self::$ext),*];
            const EXTENSIBLE: bool = true;
        }
    };
}
pub(crate) use per_enum;

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_of<F>(f: F) -> (Vec<u8>, usize)
    where
        F: FnOnce(&mut BitWriter<'_>) -> Result<(), EncodeError>,
    {
        let mut w = BitWriter::growable();
        f(&mut w).unwrap();
        let n = w.bits_written();
        (w.into_bytes(), n)
    }

    #[test]
    fn constrained_width_is_minimal() {
        assert_eq!(constrained_width(0, 0), 0);
        assert_eq!(constrained_width(0, 1), 1);
        assert_eq!(constrained_width(0, 7), 3);
        assert_eq!(constrained_width(0, 8), 4);
        assert_eq!(constrained_width(-202, -60), 8);
        assert_eq!(constrained_width(0, 274), 9);
        assert_eq!(constrained_width(0, 65535), 16);
        assert_eq!(constrained_width(i64::MIN, i64::MAX), 64);
    }

    #[test]
    fn constrained_rejects_out_of_range() {
        let mut w = BitWriter::growable();
        assert!(encode_constrained_whole_number(&mut w, 8, 0, 7).is_err());
        // 0..5 uses 3 bits; 0b111 decodes to 7
        let data = [0b1110_0000u8];
        let mut r = BitReader::new(&data);
        assert!(matches!(
            decode_constrained_whole_number(&mut r, 0, 5),
            Err(PerError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn unconstrained_minimal_octets() {
        assert_eq!(bits_of(|w| encode_unconstrained_whole_number(w, 0)).0, vec![0x01, 0x00]);
        assert_eq!(bits_of(|w| encode_unconstrained_whole_number(w, -1)).0, vec![0x01, 0xff]);
        assert_eq!(
            bits_of(|w| encode_unconstrained_whole_number(w, 128)).0,
            vec![0x02, 0x00, 0x80]
        );
        assert_eq!(
            bits_of(|w| encode_unconstrained_whole_number(w, -129)).0,
            vec![0x02, 0xff, 0x7f]
        );
        for v in [0, 1, -1, 127, 128, -128, -129, i64::MAX, i64::MIN] {
            let (bytes, _) = bits_of(|w| encode_unconstrained_whole_number(w, v));
            let mut r = BitReader::new(&bytes);
            assert_eq!(decode_unconstrained_whole_number(&mut r).unwrap(), v);
        }
    }

    #[test]
    fn semi_constrained_offsets_from_lower_bound() {
        assert_eq!(bits_of(|w| encode_semi_constrained_whole_number(w, 5, 5)).0, vec![0x01, 0x00]);
        assert_eq!(
            bits_of(|w| encode_semi_constrained_whole_number(w, 300, 0)).0,
            vec![0x02, 0x01, 0x2c]
        );
        let (bytes, _) = bits_of(|w| encode_semi_constrained_whole_number(w, i64::MAX, -1));
        let mut r = BitReader::new(&bytes);
        assert!(decode_semi_constrained_whole_number(&mut r, -1).is_ok());
        let mut w = BitWriter::growable();
        assert!(encode_semi_constrained_whole_number(&mut w, 4, 5).is_err());
    }

    #[test]
    fn normally_small_forms() {
        assert_eq!(bits_of(|w| encode_normally_small(w, 5)), (vec![0b0000_1010], 7));
        let (bytes, n) = bits_of(|w| encode_normally_small(w, 64));
        assert_eq!(n, 1 + 8 + 8);
        let mut r = BitReader::new(&bytes);
        assert_eq!(decode_normally_small(&mut r).unwrap(), 64);
        assert_eq!(bits_of(|w| encode_normally_small_length(w, 1)), (vec![0], 7));
        assert_eq!(bits_of(|w| encode_normally_small_length(w, 64)), (vec![0b0111_1110], 7));
        let mut w = BitWriter::growable();
        assert!(encode_normally_small_length(&mut w, 0).is_err());
    }

    #[test]
    fn general_length_forms() {
        let (bytes, _) = bits_of(|w| encode_octet_string(w, &[0xaa; 127], SizeConstraint::unbounded()));
        assert_eq!(bytes[0], 127);
        let (bytes, _) = bits_of(|w| encode_octet_string(w, &[0xaa; 128], SizeConstraint::unbounded()));
        assert_eq!(&bytes[..2], &[0x80, 0x80]);
        let (bytes, _) = bits_of(|w| encode_octet_string(w, &[0xaa; 16383], SizeConstraint::unbounded()));
        assert_eq!(&bytes[..2], &[0xbf, 0xff]);
    }

    #[test]
    fn fragmented_octet_string() {
        let data: Vec<u8> = (0..16384u32).map(|i| i as u8).collect();
        let (bytes, n) = bits_of(|w| encode_octet_string(w, &data, SizeConstraint::unbounded()));
        // one 16K fragment, then an empty final length
        assert_eq!(bytes[0], 0xc1);
        assert_eq!(bytes[16385], 0x00);
        assert_eq!(n, 8 * (16384 + 2));
        let mut r = BitReader::new(&bytes);
        assert_eq!(decode_octet_string(&mut r, SizeConstraint::unbounded()).unwrap(), data);

        let data = vec![0x5a; 4 * 16384 + 16384 + 3];
        let (bytes, _) = bits_of(|w| encode_octet_string(w, &data, SizeConstraint::unbounded()));
        assert_eq!(bytes[0], 0xc4);
        assert_eq!(bytes[1 + 4 * 16384], 0xc1);
        assert_eq!(bytes[2 + 5 * 16384], 0x03);
        let mut r = BitReader::new(&bytes);
        assert_eq!(decode_octet_string(&mut r, SizeConstraint::unbounded()).unwrap(), data);
    }

    #[test]
    fn fragmented_length_checked_against_bounds() {
        let data = vec![0u8; 5 * 16384];
        let (bytes, _) = bits_of(|w| encode_octet_string(w, &data, SizeConstraint::unbounded()));
        let mut r = BitReader::new(&bytes);
        let mut read = 0;
        let res = decode_with_length(&mut r, SizeConstraint::range(0, 70000), |r, n| {
            read += n;
            r.skip_bits(n * 8)
        });
        assert!(matches!(res, Err(PerError::ConstraintViolation(_))));
        assert_eq!(read, 4 * 16384);
        let mut r = BitReader::new(&bytes);
        assert!(decode_octet_string(&mut r, SizeConstraint::range(100_000, 200_000)).is_err());
    }

    #[test]
    fn constrained_length_rejected_before_items() {
        // SIZE(1..3) takes 2 bits, 0b11 would mean 4 items
        let data = [0b1100_0000u8];
        let mut r = BitReader::new(&data);
        let mut called = false;
        let res = decode_with_length::<PerError, _>(&mut r, SizeConstraint::range(1, 3), |_, _| {
            called = true;
            Ok(())
        });
        assert!(res.is_err());
        assert!(!called);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut w = BitWriter::growable();
        assert!(encode_octet_string(&mut w, &[1], SizeConstraint::range(3, 1)).is_err());
        let mut r = BitReader::new(&[0xff]);
        assert!(decode_octet_string(&mut r, SizeConstraint::range(3, 1)).is_err());
    }

    #[test]
    fn bit_string_sizes() {
        let bits = FixedBitString::<39>::from_u64(0x7f_0000_0001);
        let (bytes, n) = bits_of(|w| bits.pack(w));
        assert_eq!(n, 39);
        let mut r = BitReader::new(&bytes);
        assert_eq!(FixedBitString::<39>::unpack(&mut r).unwrap(), bits);
        assert_eq!(bits.to_u64(), 0x7f_0000_0001);

        let short: BitString<1, 8> = BitString::new(Bits::repeat(true, 3)).unwrap();
        assert_eq!(bits_of(|w| short.pack(w)), (vec![0b0101_1100], 6));
        assert!(BitString::<1, 8>::new(Bits::new()).is_err());
        assert!(FixedBitString::<4>::new(Bits::repeat(false, 5)).is_err());
    }

    #[test]
    fn extensible_integer_branches() {
        let root = ExtensibleInt::<0, 15>(3);
        assert_eq!(bits_of(|w| root.pack(w)), (vec![0b0001_1000], 5));
        let ext = ExtensibleInt::<0, 15>(300);
        let (bytes, n) = bits_of(|w| ext.pack(w));
        assert_eq!(n, 1 + 8 + 16);
        let mut r = BitReader::new(&bytes);
        assert_eq!(ExtensibleInt::<0, 15>::unpack(&mut r).unwrap(), ext);
    }

    #[test]
    fn discriminant_out_of_root() {
        // root of 3 uses 2 bits; index 3 is invalid
        let data = [0b1100_0000u8];
        let mut r = BitReader::new(&data);
        assert_eq!(
            decode_discriminant(&mut r, 3, false, "T"),
            Err(PerError::UnknownDiscriminant {
                type_name: "T",
                index: 3
            })
        );
    }
}
