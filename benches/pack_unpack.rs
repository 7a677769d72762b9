//! Benchmark: typed pack/unpack of UL-CCCH and BWP-UplinkCommon records against the
//! schema-driven codec decoding (and re-encoding) the same octets.
//! pack writes into a caller buffer; encode_to_vec grows its own.

#[path = "../tests/common/mod.rs"]
mod common;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rrc_uper::per::{encode_to_vec, pack, unpack};
use rrc_uper::rrc::{BwpUplinkCommon, ControlResourceSet, UlCcchMessage};
use rrc_uper::{parse, Codec, ResolvedModule};

fn nr_codec() -> Codec {
    let module = parse(include_str!("../asn/nr-rrc-subset.asn")).expect("parse schema");
    Codec::new(ResolvedModule::resolve(module).expect("resolve schema"))
}

fn bench_typed(c: &mut Criterion) {
    let msg = common::setup_request();
    let mut buf = [0u8; 16];
    c.bench_function("pack_setup_request", |b| {
        b.iter(|| pack(black_box(&msg), &mut buf).expect("pack"))
    });
    c.bench_function("unpack_setup_request", |b| {
        b.iter(|| unpack::<UlCcchMessage>(black_box(&common::SETUP_REQUEST_PDU)).expect("unpack"))
    });

    let bwp = common::bwp_uplink_common();
    let bwp_bytes = encode_to_vec(&bwp).expect("encode");
    c.bench_function("encode_bwp_uplink_common", |b| {
        b.iter(|| encode_to_vec(black_box(&bwp)).expect("encode"))
    });
    c.bench_function("unpack_bwp_uplink_common", |b| {
        b.iter(|| unpack::<BwpUplinkCommon>(black_box(&bwp_bytes)).expect("unpack"))
    });

    let coreset_bytes = encode_to_vec(&common::control_resource_set()).expect("encode");
    c.bench_function("unpack_control_resource_set", |b| {
        b.iter(|| unpack::<ControlResourceSet>(black_box(&coreset_bytes)).expect("unpack"))
    });
}

fn bench_dynamic(c: &mut Criterion) {
    let codec = nr_codec();
    c.bench_function("codec_decode_setup_request", |b| {
        b.iter(|| {
            codec
                .decode(black_box("UL-CCCH-Message"), black_box(&common::SETUP_REQUEST_PDU))
                .expect("decode")
        })
    });

    let bwp_bytes = encode_to_vec(&common::bwp_uplink_common()).expect("encode");
    c.bench_function("codec_decode_bwp_uplink_common", |b| {
        b.iter(|| {
            codec
                .decode(black_box("BWP-UplinkCommon"), black_box(&bwp_bytes))
                .expect("decode")
        })
    });
    c.bench_function("codec_decode_encode_bwp_uplink_common", |b| {
        b.iter(|| {
            let v = codec
                .decode("BWP-UplinkCommon", black_box(&bwp_bytes))
                .expect("decode");
            codec.encode("BWP-UplinkCommon", &v).expect("encode")
        })
    });
}

criterion_group!(benches, bench_typed, bench_dynamic);
criterion_main!(benches);
