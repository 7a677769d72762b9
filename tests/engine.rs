//! # UPER engine: typed building blocks end to end
//!
//! | Case | Input | Expected |
//! |------|-------|----------|
//! | constrained width | `INTEGER (lb..ub)` | `ceil(log2(ub - lb + 1))` bits, 0 for a single value |
//! | sequence preamble | ext, 2 OPTIONAL, a = 5, b absent | `0 \| 1 0 \| 1 0 1` = `0x54`, 6 bits |
//! | DEFAULT field | a = 4 (default 3), b = TRUE | `1 100 1` = `0xc8`; a = 3 is not sent |
//! | extensible integer | `INTEGER (0..7, ...)` = 100 | `1` + length `0x01` + `0x64` |
//! | extensible enum | known extension / unknown index 5 | `0x80` / kept as `UnknownExtension(5)` |
//! | SEQUENCE OF bound | length 6 for `SIZE (0..5)` | `ConstraintViolation` |
//! | empty PDU | NULL | one zero octet |
//! | fixed buffer | 48-bit PDU into 2 octets | `OutOfSpace` |

use rrc_uper::per::sequence::{pack_default, pack_optional, unpack_default, unpack_optional};
use rrc_uper::per::{
    encode_bits, BitReader, BitWriter, ConstrainedInt, DecodeError, EncodeError, Enumerated,
    ExtensibleInt, ExtensionReader, Pack, PerEnum, Preamble, SeqOf, Unpack,
};
use rrc_uper::rrc::ul_ccch::{InitialUeIdentity, UlCcchMessageType};
use rrc_uper::rrc::UlCcchMessage;
use rrc_uper::{decode, encode_to_vec, pack, unpack, PerError};

/// `SEQUENCE { a INTEGER (0..7) OPTIONAL, b BOOLEAN OPTIONAL, ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
struct TwoOptionals {
    a: Option<ConstrainedInt<0, 7>>,
    b: Option<bool>,
}

impl Pack for TwoOptionals {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(true)
            .optional(self.a.is_some())
            .optional(self.b.is_some())
            .pack(w)?;
        pack_optional(w, &self.a)?;
        pack_optional(w, &self.b)
    }
}

impl Unpack for TwoOptionals {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, true, 2)?;
        let out = Self {
            a: unpack_optional(r, pre.is_present(0))?,
            b: unpack_optional(r, pre.is_present(1))?,
        };
        if pre.is_extended() {
            ExtensionReader::unpack(r)?.finish(r, "TwoOptionals")?;
        }
        Ok(out)
    }
}

/// `SEQUENCE { a INTEGER (0..7) DEFAULT 3, b BOOLEAN }`
#[derive(Debug, Clone, PartialEq, Eq)]
struct WithDefault {
    a: ConstrainedInt<0, 7>,
    b: bool,
}

const A_DEFAULT: ConstrainedInt<0, 7> = ConstrainedInt::new_const(3);

impl Pack for WithDefault {
    fn pack(&self, w: &mut BitWriter<'_>) -> Result<(), EncodeError> {
        Preamble::new(false).optional(self.a != A_DEFAULT).pack(w)?;
        pack_default(w, &self.a, &A_DEFAULT)?;
        self.b.pack(w)
    }
}

impl Unpack for WithDefault {
    fn unpack(r: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let pre = Preamble::unpack(r, false, 1)?;
        Ok(Self {
            a: unpack_default(r, pre.is_present(0), A_DEFAULT)?,
            b: Unpack::unpack(r)?,
        })
    }
}

/// `ENUMERATED { red, green, ..., blue }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Green,
    Blue,
}

impl PerEnum for Color {
    const NAME: &'static str = "Color";
    const ROOT: &'static [Self] = &[Color::Red, Color::Green];
    const EXTENSIONS: &'static [Self] = &[Color::Blue];
    const EXTENSIBLE: bool = true;
}

fn setup_request() -> UlCcchMessage {
    use rrc_uper::per::FixedBitString;
    use rrc_uper::rrc::ul_ccch::{
        EstablishmentCause, RrcSetupRequest, RrcSetupRequestIes, UlCcchMessageTypeC1,
    };
    UlCcchMessage {
        message: UlCcchMessageType::C1(UlCcchMessageTypeC1::RrcSetupRequest(RrcSetupRequest {
            rrc_setup_request: RrcSetupRequestIes {
                ue_identity: InitialUeIdentity::RandomValue(FixedBitString::from_u64(0x6f644e82bb)),
                establishment_cause: EstablishmentCause::MoSignalling,
                spare: FixedBitString::zeroed(),
            },
        })),
    }
}

#[test]
fn constrained_widths() {
    assert_eq!(ConstrainedInt::<0, 0>::width(), 0);
    assert_eq!(ConstrainedInt::<0, 1>::width(), 1);
    assert_eq!(ConstrainedInt::<0, 255>::width(), 8);
    assert_eq!(ConstrainedInt::<0, 256>::width(), 9);
    assert_eq!(ConstrainedInt::<-202, -60>::width(), 8);
    assert_eq!(ConstrainedInt::<0, 37949>::width(), 16);
}

#[test]
fn constrained_int_rejects_out_of_range() {
    assert!(matches!(
        ConstrainedInt::<1, 63>::new(0),
        Err(PerError::ConstraintViolation(_))
    ));
    assert_eq!(ConstrainedInt::<1, 63>::new(63).expect("in range").value(), 63);
}

#[test]
fn preamble_bits_precede_root_fields() {
    let v = TwoOptionals {
        a: Some(ConstrainedInt::new_const(5)),
        b: None,
    };
    let (bytes, bits) = encode_bits(&v).expect("encode");
    assert_eq!(bits, 6);
    assert_eq!(bytes, vec![0x54]);
    assert_eq!(decode::<TwoOptionals>(&bytes).expect("decode"), v);
}

#[test]
fn default_field_sent_only_when_different() {
    let other = WithDefault {
        a: ConstrainedInt::new_const(4),
        b: true,
    };
    let (bytes, bits) = encode_bits(&other).expect("encode");
    assert_eq!((bytes.clone(), bits), (vec![0xc8], 5));
    assert_eq!(decode::<WithDefault>(&bytes).expect("decode"), other);

    let default = WithDefault { a: A_DEFAULT, b: true };
    let (bytes, bits) = encode_bits(&default).expect("encode");
    assert_eq!((bytes.clone(), bits), (vec![0x40], 2));
    assert_eq!(decode::<WithDefault>(&bytes).expect("decode").a.value(), 3);
}

#[test]
fn sequence_with_unknown_additions_skips_them() {
    // ext=1, no optionals, then 1 addition present: an open type of 2 octets
    let bytes = [0x80, 0x20, 0x5b, 0xd5, 0xa0];
    let (v, bits) = unpack::<TwoOptionals>(&bytes).expect("decode");
    assert_eq!(v, TwoOptionals { a: None, b: None });
    // 3 preamble bits, 7 count bits, 1 bitmap bit, 8 length bits, 16 content bits
    assert_eq!(bits, 35);
}

#[test]
fn extensible_integer_inside_and_outside_root() {
    let inside = encode_to_vec(&ExtensibleInt::<0, 7>(5)).expect("encode");
    assert_eq!(inside, vec![0b0101_0000]);

    let outside = encode_to_vec(&ExtensibleInt::<0, 7>(100)).expect("encode");
    assert_eq!(outside, vec![0x80, 0xb2, 0x00]);
    let (back, bits) = unpack::<ExtensibleInt<0, 7>>(&outside).expect("decode");
    assert_eq!(back.0, 100);
    assert!(!back.in_root());
    assert_eq!(bits, 17);
}

#[test]
fn extensible_enum_known_and_unknown_extension() {
    let blue = encode_to_vec(&Enumerated::Known(Color::Blue)).expect("encode");
    assert_eq!(blue, vec![0x80]);
    assert_eq!(
        decode::<Enumerated<Color>>(&blue).expect("decode"),
        Enumerated::Known(Color::Blue)
    );

    let green = encode_to_vec(&Enumerated::Known(Color::Green)).expect("encode");
    assert_eq!(green, vec![0b0100_0000]);

    // extension bit, then normally small index 5
    let unknown = decode::<Enumerated<Color>>(&[0x85]).expect("decode");
    assert_eq!(unknown, Enumerated::UnknownExtension(5));
    assert_eq!(unknown.get(), None);
    assert!(matches!(
        unknown.known(),
        Err(PerError::UnrecognizedExtension { index: 5, .. })
    ));
    // kept values encode back to the same octet
    assert_eq!(encode_to_vec(&unknown).expect("encode"), vec![0x85]);
}

#[test]
fn sequence_of_length_outside_size_constraint() {
    // 3-bit length field holding 6 for SIZE (0..5)
    let err = decode::<SeqOf<ConstrainedInt<0, 1>, 0, 5>>(&[0b1100_0000]).unwrap_err();
    assert!(matches!(err, PerError::ConstraintViolation(_)));

    let too_long = SeqOf::<ConstrainedInt<0, 1>, 0, 5>::from_vec(vec![ConstrainedInt::default(); 6]);
    assert!(too_long.is_err());

    // SIZE (0..5) at its upper bound: 3-bit length 5, five 1-bit items
    let full = SeqOf::<ConstrainedInt<0, 1>, 0, 5>::from_vec(vec![ConstrainedInt::new_const(1); 5])
        .expect("five items");
    let (bytes, bits) = encode_bits(&full).expect("encode");
    assert_eq!(bits, 8);
    assert_eq!(bytes, vec![0b1011_1111]);
    assert_eq!(decode::<SeqOf<ConstrainedInt<0, 1>, 0, 5>>(&bytes).expect("decode"), full);
}

#[test]
fn empty_encoding_is_one_octet() {
    assert_eq!(encode_to_vec(&()).expect("encode"), vec![0x00]);
    let ext = UlCcchMessage {
        message: UlCcchMessageType::MessageClassExtension,
    };
    assert_eq!(encode_to_vec(&ext).expect("encode"), vec![0x80]);
}

#[test]
fn pack_into_fixed_buffer() {
    let msg = setup_request();
    let mut small = [0u8; 2];
    assert!(matches!(pack(&msg, &mut small), Err(PerError::OutOfSpace { .. })));

    let mut exact = [0xffu8; 6];
    assert_eq!(pack(&msg, &mut exact).expect("pack"), 48);
    assert_eq!(exact, [0x1d, 0xec, 0x89, 0xd0, 0x57, 0x66]);
}

#[test]
fn truncated_input_is_out_of_data() {
    let err = decode::<UlCcchMessage>(&[0x1d, 0xec]).unwrap_err();
    assert!(matches!(err, PerError::OutOfData { .. }));
}

#[test]
fn bit_count_of_setup_request() {
    let (bytes, bits) = encode_bits(&setup_request()).expect("encode");
    assert_eq!(bits, 48);
    assert_eq!(bytes.len(), 6);
}
