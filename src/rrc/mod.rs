//! NR RRC information elements (3GPP TS 38.331), written against the [`crate::per`]
//! engine. Field order, optionality and extension groups follow the ASN.1 exactly;
//! any change here changes the wire format.

pub mod bwp;
pub mod pdcch;
pub mod plmn;
pub mod rach;
pub mod ul_ccch;

pub use bwp::{Bwp, BwpUplinkCommon, PucchConfigCommon, PuschConfigCommon};
pub use pdcch::ControlResourceSet;
pub use plmn::PlmnIdentity;
pub use rach::{RaPrioritization, RachConfigCommon, RachConfigGeneric};
pub use ul_ccch::UlCcchMessage;

use crate::per::{per_enum, ConstrainedInt};

per_enum! {
    pub enum SubcarrierSpacing ("SubcarrierSpacing") {
        KHz15, KHz30, KHz60, KHz120, KHz240, Spare3, Spare2, Spare1
    }
}

per_enum! {
    /// `ENUMERATED {enabled}`; takes no bits on the wire.
    pub enum Enabled ("ENUMERATED {enabled}") { Enabled }
}

pub type RsrpRange = ConstrainedInt<0, 127>;
pub type PhysCellId = ConstrainedInt<0, 1007>;
pub type RntiValue = ConstrainedInt<0, 65535>;
