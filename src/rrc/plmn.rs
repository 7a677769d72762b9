use serde::Serialize;

use crate::per::sequence::{pack_optional, unpack_optional};
use crate::per::{
    BitReader, BitWriter, ConstrainedInt, DecodeError, EncodeError, Pack, PerError, Preamble, SeqOf,
    Unpack,
};

pub type MccMncDigit = ConstrainedInt<0, 9>;
pub type Mcc = SeqOf<MccMncDigit, 3, 3>;
pub type Mnc = SeqOf<MccMncDigit, 2, 3>;

/// PLMN-Identity. `mcc` is absent when it equals the MCC of the preceding entry
/// in a list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PlmnIdentity {
    pub mcc: Option<Mcc>,
    pub mnc: Mnc,
}

impl PlmnIdentity {
    /// Build from decimal digits, e.g. `("001", "01")`.
    pub fn from_digits(mcc: Option<&str>, mnc: &str) -> Result<Self, PerError> {
        fn digits<const LB: usize, const UB: usize>(
            s: &str,
        ) -> Result<SeqOf<MccMncDigit, LB, UB>, PerError> {
            let values = s
                .chars()
                .map(|c| {
                    let d = c.to_digit(10).ok_or_else(|| {
                        PerError::ConstraintViolation(format!("'{c}' is not a digit"))
                    })?;
                    MccMncDigit::new(i64::from(d))
                })
                .collect::<Result<Vec<_>, _>>()?;
            SeqOf::from_vec(values)
        }
        Ok(Self {
            mcc: mcc.map(digits::<3, 3>).transpose()?,
            mnc: digits::<2, 3>(mnc)?,
        })
    }
}

impl Pack for PlmnIdentity {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false).optional(self.mcc.is_some()).pack(w)?;
        pack_optional(w, &self.mcc)?;
        self.mnc.pack(w)
    }
}

impl Unpack for PlmnIdentity {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 1)?;
        Ok(Self {
            mcc: unpack_optional(r, pre.is_present(0))?,
            mnc: Mnc::unpack(r)?,
        })
    }
}
