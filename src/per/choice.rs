//! CHOICE support: discriminant helpers, unknown extension alternatives,
//! `SetupRelease<T>` and extension groups.

use serde::Serialize;

use super::primitives::{decode_discriminant, encode_discriminant, serialize_hex, Discriminant};
use super::sequence::{encode_open_type, read_open_type_octets, write_open_type_octets};
use super::{BitReader, BitWriter, DecodeError, EncodeError, Pack, PerError, Unpack};

/// An extension addition group: present or absent, owned.
pub type ExtGroup<T> = Option<Box<T>>;

/// Write the index of root alternative `index`.
pub fn pack_root_alternative(
    w: &mut BitWriter<'_>,
    index: u64,
    root_count: u64,
    extensible: bool,
) -> Result<(), EncodeError> {
    encode_discriminant(w, Discriminant::Root(index), root_count, extensible)
}

/// Write extension alternative `index` followed by its value as an open type.
pub fn pack_extension_alternative<T: Pack + ?Sized>(
    w: &mut BitWriter<'_>,
    index: u64,
    root_count: u64,
    value: &T,
) -> Result<(), EncodeError> {
    encode_discriminant(w, Discriminant::Extension(index), root_count, true)?;
    encode_open_type(w, |w| value.pack(w))
}

pub fn unpack_discriminant(
    r: &mut BitReader<'_>,
    root_count: u64,
    extensible: bool,
    type_name: &'static str,
) -> Result<Discriminant, DecodeError> {
    decode_discriminant(r, root_count, extensible, type_name)
}

/// Extension alternative of a CHOICE this build does not know, kept as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnknownAlternative {
    pub index: u64,
    #[serde(serialize_with = "serialize_hex")]
    pub encoding: Vec<u8>,
}

impl UnknownAlternative {
    /// Read the open type that follows extension index `index`.
    pub fn unpack(r: &mut BitReader<'_>, index: u64, type_name: &str) -> Result<Self, DecodeError> {
        let encoding = read_open_type_octets(r)?;
        log::debug!(
            "{type_name}: keeping unknown alternative {index} ({} octets)",
            encoding.len()
        );
        Ok(Self { index, encoding })
    }

    /// Write discriminant and octets back unchanged.
    pub fn pack(&self, w: &mut BitWriter<'_>, root_count: u64) -> Result<(), EncodeError> {
        encode_discriminant(w, Discriminant::Extension(self.index), root_count, true)?;
        write_open_type_octets(w, &self.encoding)
    }

    pub fn unrecognized(&self, type_name: &'static str) -> PerError {
        PerError::UnrecognizedExtension {
            type_name,
            index: self.index,
        }
    }
}

/// `SetupRelease { T } ::= CHOICE { release NULL, setup T }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SetupRelease<T> {
    Release,
    Setup(T),
}

impl<T> SetupRelease<T> {
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }

    pub fn is_release(&self) -> bool {
        matches!(self, Self::Release)
    }

    pub fn as_setup(&self) -> Option<&T> {
        match self {
            Self::Setup(v) => Some(v),
            Self::Release => None,
        }
    }

    pub fn as_setup_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Setup(v) => Some(v),
            Self::Release => None,
        }
    }

    /// Select `setup` with `value`; the previous payload is dropped.
    pub fn set_setup(&mut self, value: T) {
        *self = Self::Setup(value);
    }

    pub fn set_release(&mut self) {
        *self = Self::Release;
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Setup(v) => Some(v),
            Self::Release => None,
        }
    }
}

impl<T> Default for SetupRelease<T> {
    fn default() -> Self {
        Self::Release
    }
}

impl<T> From<Option<T>> for SetupRelease<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Release, Self::Setup)
    }
}

impl<T: Pack> Pack for SetupRelease<T> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Release => pack_root_alternative(w, 0, 2, false),
            Self::Setup(v) => {
                pack_root_alternative(w, 1, 2, false)?;
                v.pack(w)
            }
        }
    }
}

impl<T: Unpack> Unpack for SetupRelease<T> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        match unpack_discriminant(r, 2, false, "SetupRelease")? {
            Discriminant::Root(0) => Ok(Self::Release),
            _ => T::unpack(r).map(Self::Setup),
        }
    }
}
