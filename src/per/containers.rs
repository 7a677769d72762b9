//! SEQUENCE OF containers: `SeqOf` with a compile-time size range and `DynSeq` with
//! only a lower bound. Both are Vec-backed and check their bounds on construction,
//! encode and decode.

use std::ops::Deref;

use serde::Serialize;

use super::primitives::{decode_with_length, encode_with_length, SizeConstraint};
use super::{BitReader, BitWriter, DecodeError, EncodeError, Pack, PerError, Unpack};

fn pack_items<T: Pack>(w: &mut BitWriter<'_>, items: &[T], size: SizeConstraint) -> Result<(), EncodeError> {
    encode_with_length(w, items.len(), size, |w, range| {
        items[range].iter().try_for_each(|item| item.pack(w))
    })
}

fn unpack_items<T: Unpack>(r: &mut BitReader<'_>, size: SizeConstraint) -> Result<Vec<T>, DecodeError> {
    let mut items = Vec::new();
    let mut guard = ZeroWidthGuard::default();
    decode_with_length(r, size, |r, n| -> Result<(), DecodeError> {
        // capped by what the input could still hold
        items.reserve(n.min(r.remaining()));
        for _ in 0..n {
            let start = r.position();
            items.push(T::unpack(r)?);
            guard.check(r, start)?;
        }
        Ok(())
    })?;
    Ok(items)
}

/// Counts list elements that consumed no input (NULL, single-value types).
///
/// A fragmented length header of one octet announces 64K such elements, so a
/// list may hold at most one of them per bit of the whole input.
#[derive(Debug, Default)]
pub struct ZeroWidthGuard {
    count: usize,
}

impl ZeroWidthGuard {
    /// Call after decoding an element that started at bit `start`.
    pub fn check(&mut self, r: &BitReader<'_>, start: usize) -> Result<(), PerError> {
        if r.position() != start {
            return Ok(());
        }
        self.count += 1;
        let limit = r.position() + r.remaining();
        if self.count > limit {
            return Err(PerError::ConstraintViolation(format!(
                "more than {limit} zero-width elements in {limit} bits of input"
            )));
        }
        Ok(())
    }
}

/// SEQUENCE (SIZE(LB..UB)) OF T.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SeqOf<T, const LB: usize, const UB: usize>(Vec<T>);

impl<T, const LB: usize, const UB: usize> SeqOf<T, LB, UB> {
    pub const SIZE: SizeConstraint = SizeConstraint::range(LB as u64, UB as u64);

    /// Empty list; fill it before packing when `LB > 0`. [`Default`] instead
    /// holds `LB` default elements.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Result<Self, PerError> {
        if !Self::SIZE.contains(items.len() as u64) {
            return Err(PerError::ConstraintViolation(format!(
                "{} elements outside {}",
                items.len(),
                Self::SIZE
            )));
        }
        Ok(Self(items))
    }

    pub fn push(&mut self, item: T) -> Result<(), PerError> {
        if self.0.len() >= UB {
            return Err(PerError::ConstraintViolation(format!(
                "list already holds {UB} elements"
            )));
        }
        self.0.push(item);
        Ok(())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T: Default + Clone, const LB: usize, const UB: usize> Default for SeqOf<T, LB, UB> {
    fn default() -> Self {
        Self(vec![T::default(); LB])
    }
}

impl<T, const LB: usize, const UB: usize> Deref for SeqOf<T, LB, UB> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T, const LB: usize, const UB: usize> TryFrom<Vec<T>> for SeqOf<T, LB, UB> {
    type Error = PerError;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        Self::from_vec(items)
    }
}

impl<T: Pack, const LB: usize, const UB: usize> Pack for SeqOf<T, LB, UB> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        pack_items(w, &self.0, Self::SIZE)
    }
}

impl<T: Unpack, const LB: usize, const UB: usize> Unpack for SeqOf<T, LB, UB> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        unpack_items(r, Self::SIZE).map(Self)
    }
}

/// SEQUENCE (SIZE(LB..MAX)) OF T, or a plain SEQUENCE OF T when `LB = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DynSeq<T, const LB: usize = 0>(Vec<T>);

impl<T, const LB: usize> DynSeq<T, LB> {
    pub const SIZE: SizeConstraint = SizeConstraint::at_least(LB as u64);

    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Result<Self, PerError> {
        if items.len() < LB {
            return Err(PerError::ConstraintViolation(format!(
                "{} elements outside {}",
                items.len(),
                Self::SIZE
            )));
        }
        Ok(Self(items))
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T: Default + Clone, const LB: usize> Default for DynSeq<T, LB> {
    fn default() -> Self {
        Self(vec![T::default(); LB])
    }
}

impl<T, const LB: usize> Deref for DynSeq<T, LB> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T, const LB: usize> FromIterator<T> for DynSeq<T, LB> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: Pack, const LB: usize> Pack for DynSeq<T, LB> {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        pack_items(w, &self.0, Self::SIZE)
    }
}

impl<T: Unpack, const LB: usize> Unpack for DynSeq<T, LB> {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        unpack_items(r, Self::SIZE).map(Self)
    }
}
