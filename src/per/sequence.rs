//! SEQUENCE framework: extension bit and presence bitmap ([`Preamble`]), extension
//! additions carried as open types ([`ExtensionsWriter`], [`ExtensionReader`]).
//!
//! Wire order of an extensible SEQUENCE:
//!
//! | part                | bits                                        |
//! |---------------------|---------------------------------------------|
//! | extension bit       | 1 if extensible; set iff an addition is present |
//! | presence bitmap     | 1 per OPTIONAL / DEFAULT root field          |
//! | root fields         | in declaration order                        |
//! | addition count      | normally-small length (only if ext bit set) |
//! | addition bitmap     | 1 per known addition                        |
//! | additions           | each present one as an open type            |

use super::choice::ExtGroup;
use super::primitives::{
    decode_normally_small_length, decode_octet_string, encode_normally_small_length,
    encode_octet_string, SizeConstraint,
};
use super::{BitReader, BitWriter, DecodeError, EncodeError, Pack, PerError, Unpack};

/// Encode an open type: the value is encoded on its own, padded to whole octets
/// (at least one) and written behind a general length.
pub fn encode_open_type<E, F>(w: &mut BitWriter<'_>, f: F) -> Result<(), E>
where
    E: From<PerError>,
    F: FnOnce(&mut BitWriter<'_>) -> Result<(), E>,
{
    let mut inner = BitWriter::growable();
    f(&mut inner)?;
    let mut octets = inner.into_bytes();
    if octets.is_empty() {
        octets.push(0);
    }
    write_open_type_octets(w, &octets).map_err(E::from)
}

/// Write octets that already hold an open-type encoding.
pub fn write_open_type_octets(w: &mut BitWriter<'_>, octets: &[u8]) -> Result<(), EncodeError> {
    encode_octet_string(w, octets, SizeConstraint::unbounded())
}

pub fn read_open_type_octets(r: &mut BitReader<'_>) -> Result<Vec<u8>, DecodeError> {
    decode_octet_string(r, SizeConstraint::unbounded())
}

/// Decode an open type with `f`; bits `f` leaves unread are padding.
pub fn decode_open_type<T, E, F>(r: &mut BitReader<'_>, f: F) -> Result<T, E>
where
    E: From<PerError>,
    F: FnOnce(&mut BitReader<'_>) -> Result<T, E>,
{
    let octets = read_open_type_octets(r)?;
    let mut inner = BitReader::new(&octets);
    f(&mut inner)
}

/// Extension bit and presence bitmap of a SEQUENCE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preamble {
    extensible: bool,
    extended: bool,
    present: Vec<bool>,
}

impl Preamble {
    pub fn new(extensible: bool) -> Self {
        Self {
            extensible,
            ..Self::default()
        }
    }

    /// Set the extension bit.
    pub fn extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Append the presence bit of the next OPTIONAL or DEFAULT field.
    pub fn optional(mut self, present: bool) -> Self {
        self.present.push(present);
        self
    }

    pub fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        if self.extensible {
            w.write_bit(self.extended)?;
        } else if self.extended {
            return Err(PerError::ConstraintViolation(
                "extension bit on a non-extensible sequence".into(),
            ));
        }
        self.present.iter().try_for_each(|&p| w.write_bit(p))
    }

    pub fn unpack(r: &mut BitReader<'_>, extensible: bool, optionals: usize) -> Result<Self, DecodeError> {
        let extended = extensible && r.read_bit()?;
        let present = (0..optionals)
            .map(|_| r.read_bit())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            extensible,
            extended,
            present,
        })
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn is_present(&self, i: usize) -> bool {
        self.present.get(i).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.present.len() + usize::from(self.extensible)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pack the value of a present OPTIONAL field.
pub fn pack_optional<T: Pack>(w: &mut BitWriter<'_>, field: &Option<T>) -> Result<(), EncodeError> {
    match field {
        Some(v) => v.pack(w),
        None => Ok(()),
    }
}

pub fn unpack_optional<T: Unpack>(r: &mut BitReader<'_>, present: bool) -> Result<Option<T>, DecodeError> {
    if present {
        T::unpack(r).map(Some)
    } else {
        Ok(None)
    }
}

/// Pack a DEFAULT field unless it equals its default. The matching presence bit is
/// `field != default`.
pub fn pack_default<T: Pack + PartialEq>(w: &mut BitWriter<'_>, field: &T, default: &T) -> Result<(), EncodeError> {
    if field != default {
        field.pack(w)?;
    }
    Ok(())
}

pub fn unpack_default<T: Unpack>(r: &mut BitReader<'_>, present: bool, default: T) -> Result<T, DecodeError> {
    if present {
        T::unpack(r)
    } else {
        Ok(default)
    }
}

/// Collects the extension additions of a SEQUENCE in declaration order.
#[derive(Default)]
pub struct ExtensionsWriter<'a> {
    additions: Vec<Option<&'a dyn Pack>>,
}

impl<'a> ExtensionsWriter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single extension addition (a component outside any `[[ ]]` group).
    pub fn addition(mut self, item: Option<&'a dyn Pack>) -> Self {
        self.additions.push(item);
        self
    }

    /// A `[[ ]]` group whose members are all OPTIONAL, so that `T::default()` is
    /// the group with every member absent. Such a group is sent as absent.
    pub fn group<T: Pack + Default + PartialEq>(self, group: &'a ExtGroup<T>) -> Self {
        let group = group.as_deref().filter(|g| **g != T::default());
        self.addition(group.map(|g| g as &dyn Pack))
    }

    /// Value of the extension bit.
    pub fn is_present(&self) -> bool {
        self.additions.iter().any(Option::is_some)
    }

    /// Write count, bitmap and the present additions. Call only when
    /// [`is_present`](Self::is_present), after the root fields.
    pub fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        encode_normally_small_length(w, self.additions.len())?;
        for a in &self.additions {
            w.write_bit(a.is_some())?;
        }
        for a in self.additions.iter().flatten() {
            encode_open_type(w, |w| a.pack(w))?;
        }
        Ok(())
    }
}

/// Reads the additions of a SEQUENCE whose extension bit was set.
#[derive(Debug)]
pub struct ExtensionReader {
    present: Vec<bool>,
    next: usize,
}

impl ExtensionReader {
    pub fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let count = decode_normally_small_length(r)?;
        if count > r.remaining() {
            return Err(PerError::OutOfData {
                needed: count,
                available: r.remaining(),
            });
        }
        let present = (0..count)
            .map(|_| r.read_bit())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { present, next: 0 })
    }

    /// Number of additions announced by the sender.
    pub fn count(&self) -> usize {
        self.present.len()
    }

    /// Decode the next known addition with `f`, if the sender included it.
    pub fn next_with<T, E, F>(&mut self, r: &mut BitReader<'_>, f: F) -> Result<Option<T>, E>
    where
        E: From<PerError>,
        F: FnOnce(&mut BitReader<'_>) -> Result<T, E>,
    {
        let idx = self.next;
        self.next += 1;
        if self.present.get(idx).copied().unwrap_or(false) {
            decode_open_type(r, f).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn next<T: Unpack>(&mut self, r: &mut BitReader<'_>) -> Result<Option<T>, DecodeError> {
        self.next_with(r, T::unpack)
    }

    /// Counterpart of [`ExtensionsWriter::group`]: a group received with every
    /// member absent reads as `None`.
    pub fn group<T: Unpack + Default + PartialEq>(
        &mut self,
        r: &mut BitReader<'_>,
    ) -> Result<ExtGroup<T>, DecodeError> {
        let group = self.next_with(r, T::unpack)?;
        Ok(group.filter(|g| *g != T::default()).map(Box::new))
    }

    /// Skip the additions this build does not know.
    pub fn finish(self, r: &mut BitReader<'_>, type_name: &str) -> Result<(), DecodeError> {
        for (idx, _) in self.present.iter().enumerate().skip(self.next).filter(|(_, p)| **p) {
            let octets = read_open_type_octets(r)?;
            log::debug!(
                "{type_name}: skipping unknown extension addition {idx} ({} octets)",
                octets.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_open_type_takes_one_octet() {
        let mut w = BitWriter::growable();
        encode_open_type::<PerError, _>(&mut w, |_| Ok(())).unwrap();
        assert_eq!(w.into_bytes(), vec![0x01, 0x00]);
    }

    #[test]
    fn preamble_layout() {
        let mut w = BitWriter::growable();
        Preamble::new(true)
            .extended(false)
            .optional(true)
            .optional(false)
            .pack(&mut w)
            .unwrap();
        assert_eq!(w.bits_written(), 3);
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![0b0100_0000]);
        let mut r = BitReader::new(&bytes);
        let p = Preamble::unpack(&mut r, true, 2).unwrap();
        assert!(!p.is_extended());
        assert!(p.is_present(0));
        assert!(!p.is_present(1));
        assert!(!p.is_present(7));
    }

    #[test]
    fn extension_bit_needs_extensible_sequence() {
        let mut w = BitWriter::growable();
        assert!(Preamble::new(false).extended(true).pack(&mut w).is_err());
    }
}
