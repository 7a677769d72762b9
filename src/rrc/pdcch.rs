//! ControlResourceSet.

use serde::Serialize;

use super::Enabled;
use crate::per::choice::{pack_root_alternative, unpack_discriminant};
use crate::per::sequence::{pack_optional, unpack_optional};
use crate::per::{
    per_enum, BitReader, BitWriter, ConstrainedInt, DecodeError, Discriminant, EncodeError,
    ExtGroup, ExtensionReader, ExtensionsWriter, FixedBitString, Pack, Preamble, SeqOf, Unpack,
};

pub const MAX_NROF_TCI_STATES_PDCCH: usize = 64;

pub type ControlResourceSetId = ConstrainedInt<0, 11>;
pub type TciStateId = ConstrainedInt<0, 127>;
pub type TciStateIdList = SeqOf<TciStateId, 1, MAX_NROF_TCI_STATES_PDCCH>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ControlResourceSet {
    pub control_resource_set_id: ControlResourceSetId,
    /// One bit per group of 6 RBs.
    pub frequency_domain_resources: FixedBitString<45>,
    pub duration: ConstrainedInt<1, 3>,
    pub cce_reg_mapping_type: CceRegMappingType,
    pub precoder_granularity: PrecoderGranularity,
    pub tci_states_pdcch_to_add_list: Option<TciStateIdList>,
    pub tci_states_pdcch_to_release_list: Option<TciStateIdList>,
    pub tci_present_in_dci: Option<Enabled>,
    pub pdcch_dmrs_scrambling_id: Option<ConstrainedInt<0, 65535>>,
    pub ext1: ExtGroup<ControlResourceSetExt1>,
    pub ext2: ExtGroup<ControlResourceSetExt2>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CceRegMappingType {
    Interleaved(Interleaved),
    NonInterleaved,
}

impl Default for CceRegMappingType {
    fn default() -> Self {
        Self::Interleaved(Interleaved::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Interleaved {
    pub reg_bundle_size: RegBundleSize,
    pub interleaver_size: InterleaverSize,
    pub shift_index: Option<ConstrainedInt<0, 274>>,
}

per_enum! {
    pub enum RegBundleSize ("reg-BundleSize") { N2, N3, N6 }
}

per_enum! {
    pub enum InterleaverSize ("interleaverSize") { N2, N3, N6 }
}

per_enum! {
    pub enum PrecoderGranularity ("precoderGranularity") { SameAsRegBundle, AllContiguousRbs }
}

/// Rel-16 additions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ControlResourceSetExt1 {
    pub rb_offset_r16: Option<ConstrainedInt<0, 5>>,
    pub tci_present_dci_1_2_r16: Option<ConstrainedInt<1, 3>>,
    pub coreset_pool_index_r16: Option<ConstrainedInt<0, 1>>,
    pub control_resource_set_id_v1610: Option<ConstrainedInt<12, 15>>,
}

/// Rel-17 additions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ControlResourceSetExt2 {
    pub follow_unified_tci_state_r17: Option<Enabled>,
}

impl Pack for ControlResourceSet {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        let ext = ExtensionsWriter::new().group(&self.ext1).group(&self.ext2);
        Preamble::new(true)
            .extended(ext.is_present())
            .optional(self.tci_states_pdcch_to_add_list.is_some())
            .optional(self.tci_states_pdcch_to_release_list.is_some())
            .optional(self.tci_present_in_dci.is_some())
            .optional(self.pdcch_dmrs_scrambling_id.is_some())
            .pack(w)?;
        self.control_resource_set_id.pack(w)?;
        self.frequency_domain_resources.pack(w)?;
        self.duration.pack(w)?;
        self.cce_reg_mapping_type.pack(w)?;
        self.precoder_granularity.pack(w)?;
        pack_optional(w, &self.tci_states_pdcch_to_add_list)?;
        pack_optional(w, &self.tci_states_pdcch_to_release_list)?;
        pack_optional(w, &self.tci_present_in_dci)?;
        pack_optional(w, &self.pdcch_dmrs_scrambling_id)?;
        if ext.is_present() {
            ext.pack(w)?;
        }
        Ok(())
    }
}

impl Unpack for ControlResourceSet {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, true, 4)?;
        let mut out = Self {
            control_resource_set_id: Unpack::unpack(r)?,
            frequency_domain_resources: Unpack::unpack(r)?,
            duration: Unpack::unpack(r)?,
            cce_reg_mapping_type: Unpack::unpack(r)?,
            precoder_granularity: Unpack::unpack(r)?,
            tci_states_pdcch_to_add_list: unpack_optional(r, pre.is_present(0))?,
            tci_states_pdcch_to_release_list: unpack_optional(r, pre.is_present(1))?,
            tci_present_in_dci: unpack_optional(r, pre.is_present(2))?,
            pdcch_dmrs_scrambling_id: unpack_optional(r, pre.is_present(3))?,
            ext1: None,
            ext2: None,
        };
        if pre.is_extended() {
            let mut ext = ExtensionReader::unpack(r)?;
            out.ext1 = ext.group(r)?;
            out.ext2 = ext.group(r)?;
            ext.finish(r, "ControlResourceSet")?;
        }
        Ok(out)
    }
}

impl Pack for CceRegMappingType {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Interleaved(v) => {
                pack_root_alternative(w, 0, 2, false)?;
                v.pack(w)
            }
            Self::NonInterleaved => pack_root_alternative(w, 1, 2, false),
        }
    }
}

impl Unpack for CceRegMappingType {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(match unpack_discriminant(r, 2, false, "cce-REG-MappingType")? {
            Discriminant::Root(0) => Self::Interleaved(Unpack::unpack(r)?),
            _ => Self::NonInterleaved,
        })
    }
}

impl Pack for Interleaved {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false)
            .optional(self.shift_index.is_some())
            .pack(w)?;
        self.reg_bundle_size.pack(w)?;
        self.interleaver_size.pack(w)?;
        pack_optional(w, &self.shift_index)
    }
}

impl Unpack for Interleaved {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 1)?;
        Ok(Self {
            reg_bundle_size: Unpack::unpack(r)?,
            interleaver_size: Unpack::unpack(r)?,
            shift_index: unpack_optional(r, pre.is_present(0))?,
        })
    }
}

impl Pack for ControlResourceSetExt1 {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false)
            .optional(self.rb_offset_r16.is_some())
            .optional(self.tci_present_dci_1_2_r16.is_some())
            .optional(self.coreset_pool_index_r16.is_some())
            .optional(self.control_resource_set_id_v1610.is_some())
            .pack(w)?;
        pack_optional(w, &self.rb_offset_r16)?;
        pack_optional(w, &self.tci_present_dci_1_2_r16)?;
        pack_optional(w, &self.coreset_pool_index_r16)?;
        pack_optional(w, &self.control_resource_set_id_v1610)
    }
}

impl Unpack for ControlResourceSetExt1 {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 4)?;
        Ok(Self {
            rb_offset_r16: unpack_optional(r, pre.is_present(0))?,
            tci_present_dci_1_2_r16: unpack_optional(r, pre.is_present(1))?,
            coreset_pool_index_r16: unpack_optional(r, pre.is_present(2))?,
            control_resource_set_id_v1610: unpack_optional(r, pre.is_present(3))?,
        })
    }
}

impl Pack for ControlResourceSetExt2 {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false)
            .optional(self.follow_unified_tci_state_r17.is_some())
            .pack(w)?;
        pack_optional(w, &self.follow_unified_tci_state_r17)
    }
}

impl Unpack for ControlResourceSetExt2 {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 1)?;
        Ok(Self {
            follow_unified_tci_state_r17: unpack_optional(r, pre.is_present(0))?,
        })
    }
}
