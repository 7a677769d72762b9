//! UL-CCCH-Message and the four connection requests it carries.

use serde::Serialize;

use super::{PhysCellId, RntiValue};
use crate::per::choice::{pack_root_alternative, unpack_discriminant};
use crate::per::{
    per_enum, BitReader, BitWriter, DecodeError, Discriminant, EncodeError, FixedBitString, Pack,
    Unpack,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UlCcchMessage {
    pub message: UlCcchMessageType,
}

impl Pack for UlCcchMessage {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.message.pack(w)
    }
}

impl Unpack for UlCcchMessage {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            message: UlCcchMessageType::unpack(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UlCcchMessageType {
    C1(UlCcchMessageTypeC1),
    /// `messageClassExtension SEQUENCE {}`
    MessageClassExtension,
}

impl Default for UlCcchMessageType {
    fn default() -> Self {
        Self::C1(UlCcchMessageTypeC1::default())
    }
}

impl Pack for UlCcchMessageType {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::C1(v) => {
                pack_root_alternative(w, 0, 2, false)?;
                v.pack(w)
            }
            Self::MessageClassExtension => pack_root_alternative(w, 1, 2, false),
        }
    }
}

impl Unpack for UlCcchMessageType {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        match unpack_discriminant(r, 2, false, "UL-CCCH-MessageType")? {
            Discriminant::Root(0) => UlCcchMessageTypeC1::unpack(r).map(Self::C1),
            _ => Ok(Self::MessageClassExtension),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UlCcchMessageTypeC1 {
    RrcSetupRequest(RrcSetupRequest),
    RrcResumeRequest(RrcResumeRequest),
    RrcReestablishmentRequest(RrcReestablishmentRequest),
    RrcSystemInfoRequest(RrcSystemInfoRequest),
}

impl Default for UlCcchMessageTypeC1 {
    fn default() -> Self {
        Self::RrcSetupRequest(RrcSetupRequest::default())
    }
}

impl Pack for UlCcchMessageTypeC1 {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::RrcSetupRequest(v) => {
                pack_root_alternative(w, 0, 4, false)?;
                v.pack(w)
            }
            Self::RrcResumeRequest(v) => {
                pack_root_alternative(w, 1, 4, false)?;
                v.pack(w)
            }
            Self::RrcReestablishmentRequest(v) => {
                pack_root_alternative(w, 2, 4, false)?;
                v.pack(w)
            }
            Self::RrcSystemInfoRequest(v) => {
                pack_root_alternative(w, 3, 4, false)?;
                v.pack(w)
            }
        }
    }
}

impl Unpack for UlCcchMessageTypeC1 {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(match unpack_discriminant(r, 4, false, "UL-CCCH-MessageType.c1")? {
            Discriminant::Root(0) => Self::RrcSetupRequest(Unpack::unpack(r)?),
            Discriminant::Root(1) => Self::RrcResumeRequest(Unpack::unpack(r)?),
            Discriminant::Root(2) => Self::RrcReestablishmentRequest(Unpack::unpack(r)?),
            _ => Self::RrcSystemInfoRequest(Unpack::unpack(r)?),
        })
    }
}

// ---------------------------------------------------------------------------
// RRCSetupRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RrcSetupRequest {
    pub rrc_setup_request: RrcSetupRequestIes,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RrcSetupRequestIes {
    pub ue_identity: InitialUeIdentity,
    pub establishment_cause: EstablishmentCause,
    pub spare: FixedBitString<1>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InitialUeIdentity {
    Ng5gSTmsiPart1(FixedBitString<39>),
    RandomValue(FixedBitString<39>),
}

impl Default for InitialUeIdentity {
    fn default() -> Self {
        Self::Ng5gSTmsiPart1(FixedBitString::default())
    }
}

per_enum! {
    pub enum EstablishmentCause ("EstablishmentCause") {
        Emergency, HighPriorityAccess, MtAccess, MoSignalling, MoData, MoVoiceCall,
        MoVideoCall, MoSms, MpsPriorityAccess, McsPriorityAccess, Spare6, Spare5, Spare4,
        Spare3, Spare2, Spare1
    }
}

impl Pack for RrcSetupRequest {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.rrc_setup_request.pack(w)
    }
}

impl Unpack for RrcSetupRequest {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            rrc_setup_request: Unpack::unpack(r)?,
        })
    }
}

impl Pack for RrcSetupRequestIes {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.ue_identity.pack(w)?;
        self.establishment_cause.pack(w)?;
        self.spare.pack(w)
    }
}

impl Unpack for RrcSetupRequestIes {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ue_identity: Unpack::unpack(r)?,
            establishment_cause: Unpack::unpack(r)?,
            spare: Unpack::unpack(r)?,
        })
    }
}

impl Pack for InitialUeIdentity {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Ng5gSTmsiPart1(v) => {
                pack_root_alternative(w, 0, 2, false)?;
                v.pack(w)
            }
            Self::RandomValue(v) => {
                pack_root_alternative(w, 1, 2, false)?;
                v.pack(w)
            }
        }
    }
}

impl Unpack for InitialUeIdentity {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(match unpack_discriminant(r, 2, false, "InitialUE-Identity")? {
            Discriminant::Root(0) => Self::Ng5gSTmsiPart1(Unpack::unpack(r)?),
            _ => Self::RandomValue(Unpack::unpack(r)?),
        })
    }
}

// ---------------------------------------------------------------------------
// RRCResumeRequest
// ---------------------------------------------------------------------------

pub type ShortIRntiValue = FixedBitString<24>;
pub type ShortMacI = FixedBitString<16>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RrcResumeRequest {
    pub rrc_resume_request: RrcResumeRequestIes,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RrcResumeRequestIes {
    pub resume_identity: ShortIRntiValue,
    pub resume_mac_i: FixedBitString<16>,
    pub resume_cause: ResumeCause,
    pub spare: FixedBitString<1>,
}

per_enum! {
    pub enum ResumeCause ("ResumeCause") {
        Emergency, HighPriorityAccess, MtAccess, MoSignalling, MoData, MoVoiceCall,
        MoVideoCall, MoSms, RnaUpdate, MpsPriorityAccess, McsPriorityAccess, Spare1, Spare2,
        Spare3, Spare4, Spare5
    }
}

impl Pack for RrcResumeRequest {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.rrc_resume_request.pack(w)
    }
}

impl Unpack for RrcResumeRequest {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            rrc_resume_request: Unpack::unpack(r)?,
        })
    }
}

impl Pack for RrcResumeRequestIes {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.resume_identity.pack(w)?;
        self.resume_mac_i.pack(w)?;
        self.resume_cause.pack(w)?;
        self.spare.pack(w)
    }
}

impl Unpack for RrcResumeRequestIes {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            resume_identity: Unpack::unpack(r)?,
            resume_mac_i: Unpack::unpack(r)?,
            resume_cause: Unpack::unpack(r)?,
            spare: Unpack::unpack(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// RRCReestablishmentRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RrcReestablishmentRequest {
    pub rrc_reestablishment_request: RrcReestablishmentRequestIes,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RrcReestablishmentRequestIes {
    pub ue_identity: ReestabUeIdentity,
    pub reestablishment_cause: ReestablishmentCause,
    pub spare: FixedBitString<1>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReestabUeIdentity {
    pub c_rnti: RntiValue,
    pub phys_cell_id: PhysCellId,
    pub short_mac_i: ShortMacI,
}

per_enum! {
    pub enum ReestablishmentCause ("ReestablishmentCause") {
        ReconfigurationFailure, HandoverFailure, OtherFailure, Spare1
    }
}

impl Pack for RrcReestablishmentRequest {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.rrc_reestablishment_request.pack(w)
    }
}

impl Unpack for RrcReestablishmentRequest {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            rrc_reestablishment_request: Unpack::unpack(r)?,
        })
    }
}

impl Pack for RrcReestablishmentRequestIes {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.ue_identity.pack(w)?;
        self.reestablishment_cause.pack(w)?;
        self.spare.pack(w)
    }
}

impl Unpack for RrcReestablishmentRequestIes {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ue_identity: Unpack::unpack(r)?,
            reestablishment_cause: Unpack::unpack(r)?,
            spare: Unpack::unpack(r)?,
        })
    }
}

impl Pack for ReestabUeIdentity {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.c_rnti.pack(w)?;
        self.phys_cell_id.pack(w)?;
        self.short_mac_i.pack(w)
    }
}

impl Unpack for ReestabUeIdentity {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            c_rnti: Unpack::unpack(r)?,
            phys_cell_id: Unpack::unpack(r)?,
            short_mac_i: Unpack::unpack(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// RRCSystemInfoRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RrcSystemInfoRequest {
    pub critical_extensions: RrcSystemInfoRequestCriticalExtensions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RrcSystemInfoRequestCriticalExtensions {
    RrcSystemInfoRequest(RrcSystemInfoRequestIes),
    /// `criticalExtensionsFuture SEQUENCE {}`
    CriticalExtensionsFuture,
}

impl Default for RrcSystemInfoRequestCriticalExtensions {
    fn default() -> Self {
        Self::RrcSystemInfoRequest(RrcSystemInfoRequestIes::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RrcSystemInfoRequestIes {
    /// Bit `n` requests SI message `n`.
    pub requested_si_list: FixedBitString<32>,
    pub spare: FixedBitString<12>,
}

impl Pack for RrcSystemInfoRequest {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.critical_extensions.pack(w)
    }
}

impl Unpack for RrcSystemInfoRequest {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            critical_extensions: Unpack::unpack(r)?,
        })
    }
}

impl Pack for RrcSystemInfoRequestCriticalExtensions {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::RrcSystemInfoRequest(v) => {
                pack_root_alternative(w, 0, 2, false)?;
                v.pack(w)
            }
            Self::CriticalExtensionsFuture => pack_root_alternative(w, 1, 2, false),
        }
    }
}

impl Unpack for RrcSystemInfoRequestCriticalExtensions {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(
            match unpack_discriminant(r, 2, false, "RRCSystemInfoRequest.criticalExtensions")? {
                Discriminant::Root(0) => Self::RrcSystemInfoRequest(Unpack::unpack(r)?),
                _ => Self::CriticalExtensionsFuture,
            },
        )
    }
}

impl Pack for RrcSystemInfoRequestIes {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        self.requested_si_list.pack(w)?;
        self.spare.pack(w)
    }
}

impl Unpack for RrcSystemInfoRequestIes {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            requested_si_list: Unpack::unpack(r)?,
            spare: Unpack::unpack(r)?,
        })
    }
}
