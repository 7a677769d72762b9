//! UPER decoder fuzz target: arbitrary octets as every typed top-level record and
//! through the schema-driven codec. Decoding must not panic, and a successful typed
//! decode must re-encode.
//! Build with: cargo fuzz run unpack_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
use rrc_uper::per::{encode_to_vec, unpack, Pack, Unpack};

#[cfg(fuzzing)]
fn typed<T: Pack + Unpack>(data: &[u8]) {
    if let Ok((v, _)) = unpack::<T>(data) {
        if let Err(e) = encode_to_vec(&v) {
            panic!("decoded value does not re-encode: {e}");
        }
    }
}

#[cfg(fuzzing)]
fn codec() -> &'static rrc_uper::Codec {
    static CODEC: std::sync::OnceLock<rrc_uper::Codec> = std::sync::OnceLock::new();
    CODEC.get_or_init(|| {
        let module = rrc_uper::parse(include_str!("../../asn/nr-rrc-subset.asn"))
            .expect("bundled schema parses");
        rrc_uper::Codec::new(rrc_uper::ResolvedModule::resolve(module).expect("bundled schema resolves"))
    })
}

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use rrc_uper::rrc::*;
    typed::<UlCcchMessage>(data);
    typed::<PlmnIdentity>(data);
    typed::<RachConfigCommon>(data);
    typed::<BwpUplinkCommon>(data);
    typed::<ControlResourceSet>(data);
    for name in ["UL-CCCH-Message", "BWP-UplinkCommon", "ControlResourceSet"] {
        let _ = codec().decode(name, data);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run unpack_fuzz");
}
