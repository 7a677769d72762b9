//! Unaligned PER (ITU-T X.691, UNALIGNED variant) codec engine.
//!
//! Records implement [`Pack`] and [`Unpack`] against the bit cursors in [`bits`]; the
//! building blocks for integers, enumerations, strings, lengths, sequences and choices
//! live in the submodules. The entry points below wrap a record into a complete PDU.

pub mod bits;
pub mod choice;
pub mod containers;
pub mod primitives;
pub mod sequence;

pub use bits::{BitReader, BitWriter};
pub use choice::{ExtGroup, SetupRelease, UnknownAlternative};
pub use containers::{DynSeq, SeqOf, ZeroWidthGuard};
pub use primitives::{
    BitString, ConstrainedInt, Discriminant, Enumerated, ExtensibleInt, FixedBitString,
    FixedOctetString, OctetString, PerEnum, SizeConstraint,
};
pub use sequence::{ExtensionReader, ExtensionsWriter, Preamble};

pub(crate) use primitives::{impl_enum_codec, per_enum};

/// Failure of an encode or decode step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PerError {
    #[error("Out of space: {needed} bits needed, {available} available")]
    OutOfSpace { needed: usize, available: usize },
    #[error("Out of data: {needed} bits needed, {available} remaining")]
    OutOfData { needed: usize, available: usize },
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Unknown discriminant {index} for {type_name}")]
    UnknownDiscriminant { type_name: &'static str, index: u64 },
    #[error("Unrecognized extension {index} of {type_name}")]
    UnrecognizedExtension { type_name: &'static str, index: u64 },
}

pub type EncodeError = PerError;
pub type DecodeError = PerError;

/// Serialize into a bit cursor.
pub trait Pack {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError>;
}

/// Deserialize from a bit cursor.
pub trait Unpack: Sized {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError>;
}

impl Pack for bool {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        w.write_bit(*self)
    }
}

impl Unpack for bool {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        r.read_bit()
    }
}

/// NULL: no bits.
impl Pack for () {
    fn pack(&self, _w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Ok(())
    }
}

impl Unpack for () {
    fn unpack(_r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl<T: Pack + ?Sized> Pack for Box<T> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        (**self).pack(w)
    }
}

impl<T: Unpack> Unpack for Box<T> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        T::unpack(r).map(Box::new)
    }
}

/// Encode `record` into `dst`. Returns the number of bits written; the unused bits of
/// the last touched octet are zeroed.
pub fn pack<T: Pack + ?Sized>(record: &T, dst: &mut [u8]) -> Result<usize, EncodeError> {
    let mut w = BitWriter::new(dst);
    record.pack(&mut w)?;
    let bits = w.bits_written();
    w.align_byte()?;
    Ok(bits)
}

/// Decode a `T` from the start of `bytes`. Returns the record and the number of bits
/// consumed. Trailing bits are left untouched.
pub fn unpack<T: Unpack>(bytes: &[u8]) -> Result<(T, usize), DecodeError> {
    let mut r = BitReader::new(bytes);
    match T::unpack(&mut r) {
        Ok(v) => Ok((v, r.position())),
        Err(e) => {
            log::trace!(
                "unpack {} failed at bit {}: {e}",
                std::any::type_name::<T>(),
                r.position()
            );
            Err(e)
        }
    }
}

/// Encode a complete PDU: padded to whole octets, at least one octet long.
pub fn encode_to_vec<T: Pack + ?Sized>(record: &T) -> Result<Vec<u8>, EncodeError> {
    let mut w = BitWriter::growable();
    record.pack(&mut w)?;
    let mut bytes = w.into_bytes();
    if bytes.is_empty() {
        bytes.push(0);
    }
    Ok(bytes)
}

/// Decode a complete PDU.
pub fn decode<T: Unpack>(bytes: &[u8]) -> Result<T, DecodeError> {
    unpack(bytes).map(|(v, _)| v)
}

/// Encode into a growable writer and return the octets together with the exact bit
/// length. Used by tests and the dynamic codec to compare encodings bit for bit.
pub fn encode_bits<T: Pack + ?Sized>(record: &T) -> Result<(Vec<u8>, usize), EncodeError> {
    let mut w = BitWriter::growable();
    record.pack(&mut w)?;
    let bits = w.bits_written();
    Ok((w.into_bytes(), bits))
}
