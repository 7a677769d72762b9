//! Sample records shared by the integration tests.

#![allow(dead_code)]

use rrc_uper::per::{ConstrainedInt, FixedBitString, SeqOf, SetupRelease};
use rrc_uper::rrc::bwp::{MappingType, PucchGroupHopping, PuschTimeDomainResourceAllocation};
use rrc_uper::rrc::pdcch::{
    CceRegMappingType, ControlResourceSetExt1, ControlResourceSetExt2, Interleaved,
    InterleaverSize, PrecoderGranularity, RegBundleSize,
};
use rrc_uper::rrc::rach::{
    CbPreamblesPerSsb16, GroupBConfigured, MessagePowerOffsetGroupB, Msg1Fdm, PowerRampingStep,
    PrachRootSequenceIndex, PrachRootSequenceIndexR16, PreambleTransMax, RaContentionResolutionTimer,
    RaMsg3SizeGroupA, RaPrioritizationForAccessIdentity, RaResponseWindow, RachConfigCommonExt1,
    RachConfigGenericExt2, RaResponseWindowV1700, RestrictedSetConfig, ScalingFactorBi,
    SsbPerRachOccasionAndCbPreamblesPerSsb,
};
use rrc_uper::rrc::ul_ccch::{
    EstablishmentCause, InitialUeIdentity, ReestabUeIdentity, ReestablishmentCause,
    RrcReestablishmentRequest, RrcReestablishmentRequestIes, RrcResumeRequest, RrcResumeRequestIes,
    RrcSetupRequest, RrcSetupRequestIes, RrcSystemInfoRequest,
    RrcSystemInfoRequestCriticalExtensions, RrcSystemInfoRequestIes, ResumeCause,
    UlCcchMessageType, UlCcchMessageTypeC1,
};
use rrc_uper::rrc::{
    Bwp, BwpUplinkCommon, ControlResourceSet, PucchConfigCommon, PuschConfigCommon,
    RaPrioritization, RachConfigCommon, RachConfigGeneric, SubcarrierSpacing, UlCcchMessage,
};

/// RRCSetupRequest from a UE with a random identity; encodes to `1dec89d05766`.
pub const SETUP_REQUEST_PDU: [u8; 6] = [0x1d, 0xec, 0x89, 0xd0, 0x57, 0x66];

pub fn c1(msg: UlCcchMessageTypeC1) -> UlCcchMessage {
    UlCcchMessage {
        message: UlCcchMessageType::C1(msg),
    }
}

pub fn setup_request() -> UlCcchMessage {
    c1(UlCcchMessageTypeC1::RrcSetupRequest(RrcSetupRequest {
        rrc_setup_request: RrcSetupRequestIes {
            ue_identity: InitialUeIdentity::RandomValue(FixedBitString::from_u64(0x6f644e82bb)),
            establishment_cause: EstablishmentCause::MoSignalling,
            spare: FixedBitString::zeroed(),
        },
    }))
}

pub fn resume_request() -> UlCcchMessage {
    c1(UlCcchMessageTypeC1::RrcResumeRequest(RrcResumeRequest {
        rrc_resume_request: RrcResumeRequestIes {
            resume_identity: FixedBitString::from_u64(0x123456),
            resume_mac_i: FixedBitString::from_u64(0xbeef),
            resume_cause: ResumeCause::RnaUpdate,
            spare: FixedBitString::zeroed(),
        },
    }))
}

pub fn reestablishment_request() -> UlCcchMessage {
    c1(UlCcchMessageTypeC1::RrcReestablishmentRequest(
        RrcReestablishmentRequest {
            rrc_reestablishment_request: RrcReestablishmentRequestIes {
                ue_identity: ReestabUeIdentity {
                    c_rnti: ConstrainedInt::new_const(0x4601),
                    phys_cell_id: ConstrainedInt::new_const(500),
                    short_mac_i: FixedBitString::from_u64(0x1234),
                },
                reestablishment_cause: ReestablishmentCause::HandoverFailure,
                spare: FixedBitString::zeroed(),
            },
        },
    ))
}

pub fn system_info_request() -> UlCcchMessage {
    c1(UlCcchMessageTypeC1::RrcSystemInfoRequest(RrcSystemInfoRequest {
        critical_extensions: RrcSystemInfoRequestCriticalExtensions::RrcSystemInfoRequest(
            RrcSystemInfoRequestIes {
                requested_si_list: FixedBitString::from_u64(0x8000_0001),
                spare: FixedBitString::zeroed(),
            },
        ),
    }))
}

/// Root fields only; encodes to `08000f5c6680` (41 bits).
pub fn rach_generic() -> RachConfigGeneric {
    RachConfigGeneric {
        prach_configuration_index: ConstrainedInt::new_const(16),
        msg1_fdm: Msg1Fdm::One,
        msg1_frequency_start: ConstrainedInt::new_const(0),
        zero_correlation_zone_config: ConstrainedInt::new_const(15),
        preamble_received_target_power: ConstrainedInt::new_const(-110),
        preamble_trans_max: PreambleTransMax::N10,
        power_ramping_step: PowerRampingStep::Db2,
        ra_response_window: RaResponseWindow::Sl20,
        ext1: None,
        ext2: None,
    }
}

/// [`rach_generic`] with the Rel-17 group; encodes to `88000f5c6681406800` (66 bits).
pub fn rach_generic_rel17() -> RachConfigGeneric {
    RachConfigGeneric {
        ext2: Some(Box::new(RachConfigGenericExt2 {
            ra_response_window_v1700: Some(RaResponseWindowV1700::Sl640),
        })),
        ..rach_generic()
    }
}

pub fn rach_common() -> RachConfigCommon {
    RachConfigCommon {
        rach_config_generic: rach_generic_rel17(),
        total_number_of_ra_preambles: Some(ConstrainedInt::new_const(63)),
        ssb_per_rach_occasion_and_cb_preambles_per_ssb: Some(
            SsbPerRachOccasionAndCbPreamblesPerSsb::One(CbPreamblesPerSsb16::N64),
        ),
        group_b_configured: Some(GroupBConfigured {
            ra_msg3_size_group_a: RaMsg3SizeGroupA::B144,
            message_power_offset_group_b: MessagePowerOffsetGroupB::Db10,
            number_of_ra_preambles_group_a: ConstrainedInt::new_const(32),
        }),
        ra_contention_resolution_timer: RaContentionResolutionTimer::Sf64,
        rsrp_threshold_ssb: Some(ConstrainedInt::new_const(20)),
        rsrp_threshold_ssb_sul: None,
        prach_root_sequence_index: PrachRootSequenceIndex::L139(ConstrainedInt::new_const(1)),
        msg1_subcarrier_spacing: Some(SubcarrierSpacing::KHz30),
        restricted_set_config: RestrictedSetConfig::UnrestrictedSet,
        msg3_transform_precoder: None,
        ext1: Some(Box::new(RachConfigCommonExt1 {
            ra_prioritization_for_access_identity_r16: Some(RaPrioritizationForAccessIdentity {
                ra_prioritization_r16: ra_prioritization(),
                ra_prioritization_for_ai_r16: FixedBitString::from_u64(0b10),
            }),
            prach_root_sequence_index_r16: Some(PrachRootSequenceIndexR16::L1151(
                ConstrainedInt::new_const(1000),
            )),
        })),
    }
}

/// Encodes to `68` (6 bits).
pub fn ra_prioritization() -> RaPrioritization {
    RaPrioritization {
        power_ramping_step_high_priority: PowerRampingStep::Db4,
        scaling_factor_bi: Some(ScalingFactorBi::Dot5),
    }
}

pub fn bwp_uplink_common() -> BwpUplinkCommon {
    BwpUplinkCommon {
        generic_parameters: Bwp {
            location_and_bandwidth: ConstrainedInt::new_const(28875),
            subcarrier_spacing: SubcarrierSpacing::KHz30,
            cyclic_prefix: None,
        },
        rach_config_common: Some(SetupRelease::Setup(rach_common())),
        pusch_config_common: Some(SetupRelease::Setup(PuschConfigCommon {
            group_hopping_enabled_transform_precoding: None,
            pusch_time_domain_allocation_list: Some(
                SeqOf::from_vec(vec![
                    PuschTimeDomainResourceAllocation {
                        k2: Some(ConstrainedInt::new_const(6)),
                        mapping_type: MappingType::TypeA,
                        start_symbol_and_length: ConstrainedInt::new_const(27),
                    },
                    PuschTimeDomainResourceAllocation {
                        k2: None,
                        mapping_type: MappingType::TypeB,
                        start_symbol_and_length: ConstrainedInt::new_const(41),
                    },
                ])
                .expect("two allocations"),
            ),
            msg3_delta_preamble: Some(ConstrainedInt::new_const(-1)),
            p0_nominal_with_grant: Some(ConstrainedInt::new_const(-90)),
        })),
        pucch_config_common: Some(SetupRelease::Setup(pucch_config_common())),
    }
}

pub fn pucch_config_common() -> PucchConfigCommon {
    PucchConfigCommon {
        pucch_resource_common: Some(ConstrainedInt::new_const(11)),
        pucch_group_hopping: PucchGroupHopping::Neither,
        hopping_id: None,
        p0_nominal: Some(ConstrainedInt::new_const(-90)),
    }
}

pub fn control_resource_set() -> ControlResourceSet {
    ControlResourceSet {
        control_resource_set_id: ConstrainedInt::new_const(1),
        frequency_domain_resources: FixedBitString::from_u64(0x1fe0_0000_0000),
        duration: ConstrainedInt::new_const(2),
        cce_reg_mapping_type: CceRegMappingType::Interleaved(Interleaved {
            reg_bundle_size: RegBundleSize::N6,
            interleaver_size: InterleaverSize::N2,
            shift_index: Some(ConstrainedInt::new_const(7)),
        }),
        precoder_granularity: PrecoderGranularity::SameAsRegBundle,
        tci_states_pdcch_to_add_list: Some(
            SeqOf::from_vec(vec![ConstrainedInt::new_const(0), ConstrainedInt::new_const(3)])
                .expect("two states"),
        ),
        tci_states_pdcch_to_release_list: None,
        tci_present_in_dci: Some(rrc_uper::rrc::Enabled::Enabled),
        pdcch_dmrs_scrambling_id: None,
        ext1: Some(Box::new(ControlResourceSetExt1 {
            rb_offset_r16: Some(ConstrainedInt::new_const(5)),
            tci_present_dci_1_2_r16: None,
            coreset_pool_index_r16: Some(ConstrainedInt::new_const(1)),
            control_resource_set_id_v1610: None,
        })),
        ext2: Some(Box::new(ControlResourceSetExt2 {
            follow_unified_tci_state_r17: Some(rrc_uper::rrc::Enabled::Enabled),
        })),
    }
}
