//! RACH-ConfigGeneric, RACH-ConfigCommon and RA-Prioritization.

use serde::Serialize;

use super::{Enabled, RsrpRange, SubcarrierSpacing};
use crate::per::choice::{pack_root_alternative, unpack_discriminant};
use crate::per::sequence::{pack_optional, unpack_optional};
use crate::per::{
    per_enum, BitReader, BitWriter, ConstrainedInt, DecodeError, Discriminant, EncodeError,
    ExtGroup, ExtensionReader, ExtensionsWriter, FixedBitString, Pack, Preamble, Unpack,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RachConfigGeneric {
    pub prach_configuration_index: ConstrainedInt<0, 255>,
    pub msg1_fdm: Msg1Fdm,
    pub msg1_frequency_start: ConstrainedInt<0, 274>,
    pub zero_correlation_zone_config: ConstrainedInt<0, 15>,
    pub preamble_received_target_power: ConstrainedInt<-202, -60>,
    pub preamble_trans_max: PreambleTransMax,
    pub power_ramping_step: PowerRampingStep,
    pub ra_response_window: RaResponseWindow,
    pub ext1: ExtGroup<RachConfigGenericExt1>,
    pub ext2: ExtGroup<RachConfigGenericExt2>,
}

per_enum! {
    pub enum Msg1Fdm ("RACH-ConfigGeneric.msg1-FDM") { One, Two, Four, Eight }
}

per_enum! {
    pub enum PreambleTransMax ("RACH-ConfigGeneric.preambleTransMax") {
        N3, N4, N5, N6, N7, N8, N10, N20, N50, N100, N200
    }
}

per_enum! {
    pub enum PowerRampingStep ("RACH-ConfigGeneric.powerRampingStep") { Db0, Db2, Db4, Db6 }
}

per_enum! {
    pub enum RaResponseWindow ("RACH-ConfigGeneric.ra-ResponseWindow") {
        Sl1, Sl2, Sl4, Sl8, Sl10, Sl20, Sl40, Sl80
    }
}

/// Rel-16 IAB additions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RachConfigGenericExt1 {
    pub prach_configuration_period_scaling_iab_r16: Option<PrachConfigurationPeriodScalingIab>,
    pub prach_configuration_frame_offset_iab_r16: Option<ConstrainedInt<0, 63>>,
    pub prach_configuration_s_offset_iab_r16: Option<ConstrainedInt<0, 39>>,
    pub ra_response_window_v1610: Option<RaResponseWindowV1610>,
    pub prach_configuration_index_v1610: Option<ConstrainedInt<256, 262>>,
}

per_enum! {
    pub enum PrachConfigurationPeriodScalingIab ("prach-ConfigurationPeriodScaling-IAB-r16") {
        Scf1, Scf2, Scf4, Scf8, Scf16, Scf32, Scf64
    }
}

per_enum! {
    pub enum RaResponseWindowV1610 ("ra-ResponseWindow-v1610") { Sl60, Sl160 }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RachConfigGenericExt2 {
    pub ra_response_window_v1700: Option<RaResponseWindowV1700>,
}

per_enum! {
    pub enum RaResponseWindowV1700 ("ra-ResponseWindow-v1700") {
        Sl240, Sl320, Sl640, Sl960, Sl1280, Sl1920, Sl2560
    }
}

impl Pack for RachConfigGeneric {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        let ext = ExtensionsWriter::new().group(&self.ext1).group(&self.ext2);
        Preamble::new(true).extended(ext.is_present()).pack(w)?;
        self.prach_configuration_index.pack(w)?;
        self.msg1_fdm.pack(w)?;
        self.msg1_frequency_start.pack(w)?;
        self.zero_correlation_zone_config.pack(w)?;
        self.preamble_received_target_power.pack(w)?;
        self.preamble_trans_max.pack(w)?;
        self.power_ramping_step.pack(w)?;
        self.ra_response_window.pack(w)?;
        if ext.is_present() {
            ext.pack(w)?;
        }
        Ok(())
    }
}

impl Unpack for RachConfigGeneric {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, true, 0)?;
        let mut out = Self {
            prach_configuration_index: Unpack::unpack(r)?,
            msg1_fdm: Unpack::unpack(r)?,
            msg1_frequency_start: Unpack::unpack(r)?,
            zero_correlation_zone_config: Unpack::unpack(r)?,
            preamble_received_target_power: Unpack::unpack(r)?,
            preamble_trans_max: Unpack::unpack(r)?,
            power_ramping_step: Unpack::unpack(r)?,
            ra_response_window: Unpack::unpack(r)?,
            ext1: None,
            ext2: None,
        };
        if pre.is_extended() {
            let mut ext = ExtensionReader::unpack(r)?;
            out.ext1 = ext.group(r)?;
            out.ext2 = ext.group(r)?;
            ext.finish(r, "RACH-ConfigGeneric")?;
        }
        Ok(out)
    }
}

impl Pack for RachConfigGenericExt1 {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false)
            .optional(self.prach_configuration_period_scaling_iab_r16.is_some())
            .optional(self.prach_configuration_frame_offset_iab_r16.is_some())
            .optional(self.prach_configuration_s_offset_iab_r16.is_some())
            .optional(self.ra_response_window_v1610.is_some())
            .optional(self.prach_configuration_index_v1610.is_some())
            .pack(w)?;
        pack_optional(w, &self.prach_configuration_period_scaling_iab_r16)?;
        pack_optional(w, &self.prach_configuration_frame_offset_iab_r16)?;
        pack_optional(w, &self.prach_configuration_s_offset_iab_r16)?;
        pack_optional(w, &self.ra_response_window_v1610)?;
        pack_optional(w, &self.prach_configuration_index_v1610)
    }
}

impl Unpack for RachConfigGenericExt1 {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 5)?;
        Ok(Self {
            prach_configuration_period_scaling_iab_r16: unpack_optional(r, pre.is_present(0))?,
            prach_configuration_frame_offset_iab_r16: unpack_optional(r, pre.is_present(1))?,
            prach_configuration_s_offset_iab_r16: unpack_optional(r, pre.is_present(2))?,
            ra_response_window_v1610: unpack_optional(r, pre.is_present(3))?,
            prach_configuration_index_v1610: unpack_optional(r, pre.is_present(4))?,
        })
    }
}

impl Pack for RachConfigGenericExt2 {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false)
            .optional(self.ra_response_window_v1700.is_some())
            .pack(w)?;
        pack_optional(w, &self.ra_response_window_v1700)
    }
}

impl Unpack for RachConfigGenericExt2 {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 1)?;
        Ok(Self {
            ra_response_window_v1700: unpack_optional(r, pre.is_present(0))?,
        })
    }
}

// ---------------------------------------------------------------------------
// RACH-ConfigCommon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RachConfigCommon {
    pub rach_config_generic: RachConfigGeneric,
    pub total_number_of_ra_preambles: Option<ConstrainedInt<1, 63>>,
    pub ssb_per_rach_occasion_and_cb_preambles_per_ssb: Option<SsbPerRachOccasionAndCbPreamblesPerSsb>,
    pub group_b_configured: Option<GroupBConfigured>,
    pub ra_contention_resolution_timer: RaContentionResolutionTimer,
    pub rsrp_threshold_ssb: Option<RsrpRange>,
    pub rsrp_threshold_ssb_sul: Option<RsrpRange>,
    pub prach_root_sequence_index: PrachRootSequenceIndex,
    pub msg1_subcarrier_spacing: Option<SubcarrierSpacing>,
    pub restricted_set_config: RestrictedSetConfig,
    pub msg3_transform_precoder: Option<Enabled>,
    pub ext1: ExtGroup<RachConfigCommonExt1>,
}

per_enum! {
    pub enum CbPreamblesPerSsb16 ("CB-PreamblesPerSSB") {
        N4, N8, N12, N16, N20, N24, N28, N32, N36, N40, N44, N48, N52, N56, N60, N64
    }
}

per_enum! {
    pub enum CbPreamblesPerSsb8 ("CB-PreamblesPerSSB.two") { N4, N8, N12, N16, N20, N24, N28, N32 }
}

/// `ssb-perRACH-OccasionAndCB-PreamblesPerSSB`: SSBs per RACH occasion and the
/// contention-based preambles per SSB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SsbPerRachOccasionAndCbPreamblesPerSsb {
    OneEighth(CbPreamblesPerSsb16),
    OneFourth(CbPreamblesPerSsb16),
    OneHalf(CbPreamblesPerSsb16),
    One(CbPreamblesPerSsb16),
    Two(CbPreamblesPerSsb8),
    Four(ConstrainedInt<1, 16>),
    Eight(ConstrainedInt<1, 8>),
    Sixteen(ConstrainedInt<1, 4>),
}

impl Default for SsbPerRachOccasionAndCbPreamblesPerSsb {
    fn default() -> Self {
        Self::OneEighth(CbPreamblesPerSsb16::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GroupBConfigured {
    pub ra_msg3_size_group_a: RaMsg3SizeGroupA,
    pub message_power_offset_group_b: MessagePowerOffsetGroupB,
    pub number_of_ra_preambles_group_a: ConstrainedInt<1, 64>,
}

per_enum! {
    pub enum RaMsg3SizeGroupA ("ra-Msg3SizeGroupA") {
        B56, B144, B208, B256, B282, B480, B640, B800, B1000, B72, Spare6, Spare5, Spare4,
        Spare3, Spare2, Spare1
    }
}

per_enum! {
    pub enum MessagePowerOffsetGroupB ("messagePowerOffsetGroupB") {
        MinusInfinity, Db0, Db5, Db8, Db10, Db12, Db15, Db18
    }
}

per_enum! {
    pub enum RaContentionResolutionTimer ("ra-ContentionResolutionTimer") {
        Sf8, Sf16, Sf24, Sf32, Sf40, Sf48, Sf56, Sf64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PrachRootSequenceIndex {
    L839(ConstrainedInt<0, 837>),
    L139(ConstrainedInt<0, 137>),
}

impl Default for PrachRootSequenceIndex {
    fn default() -> Self {
        Self::L839(ConstrainedInt::default())
    }
}

per_enum! {
    pub enum RestrictedSetConfig ("restrictedSetConfig") {
        UnrestrictedSet, RestrictedSetTypeA, RestrictedSetTypeB
    }
}

/// Rel-16 additions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RachConfigCommonExt1 {
    pub ra_prioritization_for_access_identity_r16: Option<RaPrioritizationForAccessIdentity>,
    pub prach_root_sequence_index_r16: Option<PrachRootSequenceIndexR16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RaPrioritizationForAccessIdentity {
    pub ra_prioritization_r16: RaPrioritization,
    /// Bit 0 for Access Identity 1, bit 1 for Access Identity 2.
    pub ra_prioritization_for_ai_r16: FixedBitString<2>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PrachRootSequenceIndexR16 {
    L571(ConstrainedInt<0, 569>),
    L1151(ConstrainedInt<0, 1149>),
}

impl Pack for RachConfigCommon {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        let ext = ExtensionsWriter::new().group(&self.ext1);
        Preamble::new(true)
            .extended(ext.is_present())
            .optional(self.total_number_of_ra_preambles.is_some())
            .optional(self.ssb_per_rach_occasion_and_cb_preambles_per_ssb.is_some())
            .optional(self.group_b_configured.is_some())
            .optional(self.rsrp_threshold_ssb.is_some())
            .optional(self.rsrp_threshold_ssb_sul.is_some())
            .optional(self.msg1_subcarrier_spacing.is_some())
            .optional(self.msg3_transform_precoder.is_some())
            .pack(w)?;
        self.rach_config_generic.pack(w)?;
        pack_optional(w, &self.total_number_of_ra_preambles)?;
        pack_optional(w, &self.ssb_per_rach_occasion_and_cb_preambles_per_ssb)?;
        pack_optional(w, &self.group_b_configured)?;
        self.ra_contention_resolution_timer.pack(w)?;
        pack_optional(w, &self.rsrp_threshold_ssb)?;
        pack_optional(w, &self.rsrp_threshold_ssb_sul)?;
        self.prach_root_sequence_index.pack(w)?;
        pack_optional(w, &self.msg1_subcarrier_spacing)?;
        self.restricted_set_config.pack(w)?;
        pack_optional(w, &self.msg3_transform_precoder)?;
        if ext.is_present() {
            ext.pack(w)?;
        }
        Ok(())
    }
}

impl Unpack for RachConfigCommon {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, true, 7)?;
        let mut out = Self {
            rach_config_generic: Unpack::unpack(r)?,
            total_number_of_ra_preambles: unpack_optional(r, pre.is_present(0))?,
            ssb_per_rach_occasion_and_cb_preambles_per_ssb: unpack_optional(r, pre.is_present(1))?,
            group_b_configured: unpack_optional(r, pre.is_present(2))?,
            ra_contention_resolution_timer: Unpack::unpack(r)?,
            rsrp_threshold_ssb: unpack_optional(r, pre.is_present(3))?,
            rsrp_threshold_ssb_sul: unpack_optional(r, pre.is_present(4))?,
            prach_root_sequence_index: Unpack::unpack(r)?,
            msg1_subcarrier_spacing: unpack_optional(r, pre.is_present(5))?,
            restricted_set_config: Unpack::unpack(r)?,
            msg3_transform_precoder: unpack_optional(r, pre.is_present(6))?,
            ext1: None,
        };
        if pre.is_extended() {
            let mut ext = ExtensionReader::unpack(r)?;
            out.ext1 = ext.group(r)?;
            ext.finish(r, "RACH-ConfigCommon")?;
        }
        Ok(out)
    }
}

impl Pack for SsbPerRachOccasionAndCbPreamblesPerSsb {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        let (index, payload): (u64, &dyn Pack) = match self {
            Self::OneEighth(v) => (0, v),
            Self::OneFourth(v) => (1, v),
            Self::OneHalf(v) => (2, v),
            Self::One(v) => (3, v),
            Self::Two(v) => (4, v),
            Self::Four(v) => (5, v),
            Self::Eight(v) => (6, v),
            Self::Sixteen(v) => (7, v),
        };
        pack_root_alternative(w, index, 8, false)?;
        payload.pack(w)
    }
}

impl Unpack for SsbPerRachOccasionAndCbPreamblesPerSsb {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let type_name = "ssb-perRACH-OccasionAndCB-PreamblesPerSSB";
        Ok(match unpack_discriminant(r, 8, false, type_name)? {
            Discriminant::Root(0) => Self::OneEighth(Unpack::unpack(r)?),
            Discriminant::Root(1) => Self::OneFourth(Unpack::unpack(r)?),
            Discriminant::Root(2) => Self::OneHalf(Unpack::unpack(r)?),
            Discriminant::Root(3) => Self::One(Unpack::unpack(r)?),
            Discriminant::Root(4) => Self::Two(Unpack::unpack(r)?),
            Discriminant::Root(5) => Self::Four(Unpack::unpack(r)?),
            Discriminant::Root(6) => Self::Eight(Unpack::unpack(r)?),
            _ => Self::Sixteen(Unpack::unpack(r)?),
        })
    }
}

impl Pack for GroupBConfigured {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.ra_msg3_size_group_a.pack(w)?;
        self.message_power_offset_group_b.pack(w)?;
        self.number_of_ra_preambles_group_a.pack(w)
    }
}

impl Unpack for GroupBConfigured {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ra_msg3_size_group_a: Unpack::unpack(r)?,
            message_power_offset_group_b: Unpack::unpack(r)?,
            number_of_ra_preambles_group_a: Unpack::unpack(r)?,
        })
    }
}

impl Pack for PrachRootSequenceIndex {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::L839(v) => {
                pack_root_alternative(w, 0, 2, false)?;
                v.pack(w)
            }
            Self::L139(v) => {
                pack_root_alternative(w, 1, 2, false)?;
                v.pack(w)
            }
        }
    }
}

impl Unpack for PrachRootSequenceIndex {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(match unpack_discriminant(r, 2, false, "prach-RootSequenceIndex")? {
            Discriminant::Root(0) => Self::L839(Unpack::unpack(r)?),
            _ => Self::L139(Unpack::unpack(r)?),
        })
    }
}

impl Pack for RachConfigCommonExt1 {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false)
            .optional(self.ra_prioritization_for_access_identity_r16.is_some())
            .optional(self.prach_root_sequence_index_r16.is_some())
            .pack(w)?;
        pack_optional(w, &self.ra_prioritization_for_access_identity_r16)?;
        pack_optional(w, &self.prach_root_sequence_index_r16)
    }
}

impl Unpack for RachConfigCommonExt1 {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 2)?;
        Ok(Self {
            ra_prioritization_for_access_identity_r16: unpack_optional(r, pre.is_present(0))?,
            prach_root_sequence_index_r16: unpack_optional(r, pre.is_present(1))?,
        })
    }
}

impl Pack for RaPrioritizationForAccessIdentity {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.ra_prioritization_r16.pack(w)?;
        self.ra_prioritization_for_ai_r16.pack(w)
    }
}

impl Unpack for RaPrioritizationForAccessIdentity {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ra_prioritization_r16: Unpack::unpack(r)?,
            ra_prioritization_for_ai_r16: Unpack::unpack(r)?,
        })
    }
}

impl Pack for PrachRootSequenceIndexR16 {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::L571(v) => {
                pack_root_alternative(w, 0, 2, false)?;
                v.pack(w)
            }
            Self::L1151(v) => {
                pack_root_alternative(w, 1, 2, false)?;
                v.pack(w)
            }
        }
    }
}

impl Unpack for PrachRootSequenceIndexR16 {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(match unpack_discriminant(r, 2, false, "prach-RootSequenceIndex-r16")? {
            Discriminant::Root(0) => Self::L571(Unpack::unpack(r)?),
            _ => Self::L1151(Unpack::unpack(r)?),
        })
    }
}

// ---------------------------------------------------------------------------
// RA-Prioritization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RaPrioritization {
    pub power_ramping_step_high_priority: PowerRampingStep,
    pub scaling_factor_bi: Option<ScalingFactorBi>,
}

per_enum! {
    pub enum ScalingFactorBi ("scalingFactorBI") { Zero, Dot25, Dot5, Dot75 }
}

impl Pack for RaPrioritization {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(true)
            .optional(self.scaling_factor_bi.is_some())
            .pack(w)?;
        self.power_ramping_step_high_priority.pack(w)?;
        pack_optional(w, &self.scaling_factor_bi)
    }
}

impl Unpack for RaPrioritization {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, true, 1)?;
        let out = Self {
            power_ramping_step_high_priority: Unpack::unpack(r)?,
            scaling_factor_bi: unpack_optional(r, pre.is_present(0))?,
        };
        if pre.is_extended() {
            ExtensionReader::unpack(r)?.finish(r, "RA-Prioritization")?;
        }
        Ok(out)
    }
}
