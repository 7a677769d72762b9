//! BWP, BWP-UplinkCommon and the common PUSCH/PUCCH configuration it carries.
//!
//! The Rel-16+ extension groups of these IEs are not modelled; a decoder built from
//! this module skips them by length.

use serde::Serialize;

use super::rach::RachConfigCommon;
use super::{Enabled, SubcarrierSpacing};
use crate::per::sequence::{pack_optional, unpack_optional};
use crate::per::{
    per_enum, BitReader, BitWriter, ConstrainedInt, DecodeError, EncodeError, ExtensionReader,
    Pack, Preamble, SeqOf, SetupRelease, Unpack,
};

/// Maximum number of PUSCH time-domain allocations (`maxNrofUL-Allocations`).
pub const MAX_NROF_UL_ALLOCATIONS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Bwp {
    pub location_and_bandwidth: ConstrainedInt<0, 37949>,
    pub subcarrier_spacing: SubcarrierSpacing,
    pub cyclic_prefix: Option<CyclicPrefix>,
}

per_enum! {
    pub enum CyclicPrefix ("BWP.cyclicPrefix") { Extended }
}

impl Pack for Bwp {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false)
            .optional(self.cyclic_prefix.is_some())
            .pack(w)?;
        self.location_and_bandwidth.pack(w)?;
        self.subcarrier_spacing.pack(w)?;
        pack_optional(w, &self.cyclic_prefix)
    }
}

impl Unpack for Bwp {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 1)?;
        Ok(Self {
            location_and_bandwidth: Unpack::unpack(r)?,
            subcarrier_spacing: Unpack::unpack(r)?,
            cyclic_prefix: unpack_optional(r, pre.is_present(0))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BwpUplinkCommon {
    pub generic_parameters: Bwp,
    pub rach_config_common: Option<SetupRelease<RachConfigCommon>>,
    pub pusch_config_common: Option<SetupRelease<PuschConfigCommon>>,
    pub pucch_config_common: Option<SetupRelease<PucchConfigCommon>>,
}

impl Pack for BwpUplinkCommon {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(true)
            .optional(self.rach_config_common.is_some())
            .optional(self.pusch_config_common.is_some())
            .optional(self.pucch_config_common.is_some())
            .pack(w)?;
        self.generic_parameters.pack(w)?;
        pack_optional(w, &self.rach_config_common)?;
        pack_optional(w, &self.pusch_config_common)?;
        pack_optional(w, &self.pucch_config_common)
    }
}

impl Unpack for BwpUplinkCommon {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, true, 3)?;
        let out = Self {
            generic_parameters: Unpack::unpack(r)?,
            rach_config_common: unpack_optional(r, pre.is_present(0))?,
            pusch_config_common: unpack_optional(r, pre.is_present(1))?,
            pucch_config_common: unpack_optional(r, pre.is_present(2))?,
        };
        if pre.is_extended() {
            ExtensionReader::unpack(r)?.finish(r, "BWP-UplinkCommon")?;
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// PUSCH-ConfigCommon
// ---------------------------------------------------------------------------

pub type PuschTimeDomainResourceAllocationList =
    SeqOf<PuschTimeDomainResourceAllocation, 1, MAX_NROF_UL_ALLOCATIONS>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PuschConfigCommon {
    pub group_hopping_enabled_transform_precoding: Option<Enabled>,
    pub pusch_time_domain_allocation_list: Option<PuschTimeDomainResourceAllocationList>,
    pub msg3_delta_preamble: Option<ConstrainedInt<-1, 6>>,
    pub p0_nominal_with_grant: Option<ConstrainedInt<-202, 24>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PuschTimeDomainResourceAllocation {
    pub k2: Option<ConstrainedInt<0, 32>>,
    pub mapping_type: MappingType,
    pub start_symbol_and_length: ConstrainedInt<0, 127>,
}

per_enum! {
    pub enum MappingType ("PUSCH-TimeDomainResourceAllocation.mappingType") { TypeA, TypeB }
}

impl Pack for PuschConfigCommon {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(true)
            .optional(self.group_hopping_enabled_transform_precoding.is_some())
            .optional(self.pusch_time_domain_allocation_list.is_some())
            .optional(self.msg3_delta_preamble.is_some())
            .optional(self.p0_nominal_with_grant.is_some())
            .pack(w)?;
        pack_optional(w, &self.group_hopping_enabled_transform_precoding)?;
        pack_optional(w, &self.pusch_time_domain_allocation_list)?;
        pack_optional(w, &self.msg3_delta_preamble)?;
        pack_optional(w, &self.p0_nominal_with_grant)
    }
}

impl Unpack for PuschConfigCommon {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, true, 4)?;
        let out = Self {
            group_hopping_enabled_transform_precoding: unpack_optional(r, pre.is_present(0))?,
            pusch_time_domain_allocation_list: unpack_optional(r, pre.is_present(1))?,
            msg3_delta_preamble: unpack_optional(r, pre.is_present(2))?,
            p0_nominal_with_grant: unpack_optional(r, pre.is_present(3))?,
        };
        if pre.is_extended() {
            ExtensionReader::unpack(r)?.finish(r, "PUSCH-ConfigCommon")?;
        }
        Ok(out)
    }
}

impl Pack for PuschTimeDomainResourceAllocation {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false).optional(self.k2.is_some()).pack(w)?;
        pack_optional(w, &self.k2)?;
        self.mapping_type.pack(w)?;
        self.start_symbol_and_length.pack(w)
    }
}

impl Unpack for PuschTimeDomainResourceAllocation {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 1)?;
        Ok(Self {
            k2: unpack_optional(r, pre.is_present(0))?,
            mapping_type: Unpack::unpack(r)?,
            start_symbol_and_length: Unpack::unpack(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// PUCCH-ConfigCommon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PucchConfigCommon {
    pub pucch_resource_common: Option<ConstrainedInt<0, 15>>,
    pub pucch_group_hopping: PucchGroupHopping,
    pub hopping_id: Option<ConstrainedInt<0, 1023>>,
    pub p0_nominal: Option<ConstrainedInt<-202, 24>>,
}

per_enum! {
    pub enum PucchGroupHopping ("PUCCH-ConfigCommon.pucch-GroupHopping") { Neither, Enable, Disable }
}

impl Pack for PucchConfigCommon {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(true)
            .optional(self.pucch_resource_common.is_some())
            .optional(self.hopping_id.is_some())
            .optional(self.p0_nominal.is_some())
            .pack(w)?;
        pack_optional(w, &self.pucch_resource_common)?;
        self.pucch_group_hopping.pack(w)?;
        pack_optional(w, &self.hopping_id)?;
        pack_optional(w, &self.p0_nominal)
    }
}

impl Unpack for PucchConfigCommon {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, true, 3)?;
        let out = Self {
            pucch_resource_common: unpack_optional(r, pre.is_present(0))?,
            pucch_group_hopping: Unpack::unpack(r)?,
            hopping_id: unpack_optional(r, pre.is_present(1))?,
            p0_nominal: unpack_optional(r, pre.is_present(2))?,
        };
        if pre.is_extended() {
            ExtensionReader::unpack(r)?.finish(r, "PUCCH-ConfigCommon")?;
        }
        Ok(out)
    }
}
