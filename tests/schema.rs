//! Schema tests: parsing the ASN.1 subset, resolving references, and rejecting
//! what the codec cannot express.

use std::io::Write;

use rrc_uper::ast::{Addition, Bound, Constraint, DefaultValue, Presence, Type};
use rrc_uper::{parse, parse_file, Codec, CodecError, ResolvedModule, SchemaError, Value};

const NR_SUBSET: &str = include_str!("../asn/nr-rrc-subset.asn");

const SMALL_MODULE: &str = r#"
Small DEFINITIONS AUTOMATIC TAGS ::=
BEGIN

maxItems INTEGER ::= 4

-- a comment on its own line
Item ::= SEQUENCE {
    id      INTEGER (0..maxItems),      -- trailing comment
    kind    ENUMERATED {a, b, ..., c},
    flag    BOOLEAN DEFAULT TRUE,
    mode    ENUMERATED {slow, fast} DEFAULT fast,
    data    OCTET STRING (SIZE (1..8)) OPTIONAL,
    ...
}

Items ::= SEQUENCE (SIZE (1..maxItems)) OF Item

Pick ::= CHOICE {
    none    NULL,
    one     Item,
    ...,
    many    Items
}

END
"#;

fn resolve(src: &str) -> ResolvedModule {
    ResolvedModule::resolve(parse(src).expect("parse")).expect("resolve")
}

#[test]
fn parses_module_header_and_values() {
    let module = parse(SMALL_MODULE).expect("parse");
    assert_eq!(module.name.as_deref(), Some("Small"));
    assert_eq!(module.values.len(), 1);
    assert_eq!(module.values[0].name, "maxItems");
    assert_eq!(module.values[0].value, 4);
    let names: Vec<_> = module.assignments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Item", "Items", "Pick"]);
}

#[test]
fn parses_component_presence_and_constraints() {
    let resolved = resolve(SMALL_MODULE);
    let item = resolved.get_type("Item").expect("Item");
    let Type::Sequence(seq) = &item.ty else {
        panic!("Item is {:?}", item.ty);
    };
    assert!(seq.extensible);
    assert!(seq.additions.is_empty());
    assert_eq!(seq.root.len(), 5);

    assert_eq!(
        seq.root[0].ty,
        Type::Integer(Some(Constraint {
            lb: Bound::Value(0),
            ub: Bound::Ref("maxItems".into()),
            extensible: false,
        }))
    );
    let Type::Enumerated(kind) = &seq.root[1].ty else {
        panic!("kind is {:?}", seq.root[1].ty);
    };
    assert_eq!(kind.root, ["a", "b"]);
    assert!(kind.extensible);
    assert_eq!(kind.extensions, ["c"]);

    assert_eq!(seq.root[2].presence, Presence::Default(DefaultValue::Bool(true)));
    assert_eq!(seq.root[3].presence, Presence::Default(DefaultValue::Ident("fast".into())));
    assert_eq!(seq.root[4].presence, Presence::Optional);
    assert_eq!(resolved.get_value("maxItems"), Some(4));
}

#[test]
fn parses_choice_extensions() {
    let resolved = resolve(SMALL_MODULE);
    let Type::Choice(pick) = &resolved.get_type("Pick").expect("Pick").ty else {
        panic!("Pick is not a CHOICE");
    };
    assert_eq!(pick.root.len(), 2);
    assert!(pick.extensible);
    assert_eq!(pick.extensions.len(), 1);
    assert_eq!(pick.extensions[0].name, "many");
}

#[test]
fn parses_nr_subset() {
    let resolved = resolve(NR_SUBSET);
    for name in [
        "UL-CCCH-Message",
        "RRCSetupRequest-IEs",
        "PLMN-Identity",
        "RACH-ConfigGeneric",
        "RACH-ConfigCommon",
        "BWP-UplinkCommon",
        "ControlResourceSet",
        "SetupRelease",
    ] {
        assert!(resolved.get_type(name).is_some(), "{name} missing");
    }
    assert_eq!(resolved.get_value("maxSI-Message"), Some(32));
    assert_eq!(
        resolved.get_type("SetupRelease").expect("SetupRelease").params,
        ["ElementTypeParam"]
    );

    let Type::Sequence(rach) = &resolved.get_type("RACH-ConfigGeneric").expect("rach").ty else {
        panic!("RACH-ConfigGeneric is not a SEQUENCE");
    };
    assert_eq!(rach.root.len(), 8);
    assert_eq!(rach.additions.len(), 2);
    assert!(matches!(&rach.additions[0], Addition::Group(cs) if cs.len() == 5));
    assert!(matches!(&rach.additions[1], Addition::Group(cs) if cs.len() == 1));
}

#[test]
fn negative_bounds() {
    let module = parse("P ::= INTEGER (-202..-60)").expect("parse");
    assert_eq!(
        module.assignments[0].ty,
        Type::Integer(Some(Constraint {
            lb: Bound::Value(-202),
            ub: Bound::Value(-60),
            extensible: false,
        }))
    );
}

#[test]
fn min_max_and_extensible_constraints() {
    let module = parse(
        "A ::= INTEGER (0..MAX)\nB ::= INTEGER (MIN..MAX)\nC ::= BIT STRING (SIZE (1..8, ...))",
    )
    .expect("parse");
    assert!(matches!(
        &module.assignments[0].ty,
        Type::Integer(Some(Constraint { ub: Bound::Max, .. }))
    ));
    assert!(matches!(
        &module.assignments[1].ty,
        Type::Integer(Some(Constraint { lb: Bound::Min, .. }))
    ));
    assert!(matches!(
        &module.assignments[2].ty,
        Type::BitString(Some(Constraint { extensible: true, .. }))
    ));
}

#[test]
fn syntax_error_is_reported() {
    let err = parse("T ::= SEQUENCE { a INTEGER (0..7) ").unwrap_err();
    assert!(matches!(err, SchemaError::Parse(_)), "{err}");
    let err = parse("T ::= INTEGR").map(|m| ResolvedModule::resolve(m));
    // an unknown keyword parses as a reference and fails to resolve
    assert!(matches!(err, Ok(Err(SchemaError::Unresolved { .. }))));
}

#[test]
fn duplicate_definition_rejected() {
    let err = ResolvedModule::resolve(parse("A ::= BOOLEAN\nA ::= NULL").expect("parse")).unwrap_err();
    assert!(matches!(err, SchemaError::Duplicate(ref n) if n == "A"), "{err}");

    let err =
        ResolvedModule::resolve(parse("n INTEGER ::= 1\nn INTEGER ::= 2").expect("parse")).unwrap_err();
    assert!(matches!(err, SchemaError::Duplicate(_)), "{err}");
}

#[test]
fn unresolved_reference_names_its_context() {
    let err = ResolvedModule::resolve(parse("T ::= SEQUENCE { a Missing }").expect("parse"))
        .unwrap_err();
    match err {
        SchemaError::Unresolved { name, context } => {
            assert_eq!(name, "Missing");
            assert_eq!(context, "T.a");
        }
        other => panic!("unexpected {other}"),
    }

    let err = ResolvedModule::resolve(parse("T ::= INTEGER (0..maxX)").expect("parse")).unwrap_err();
    assert!(matches!(err, SchemaError::Unresolved { ref name, .. } if name == "maxX"));
}

#[test]
fn parameter_count_checked() {
    let src = "SR { P } ::= CHOICE { release NULL, setup P }\nT ::= SR";
    let err = ResolvedModule::resolve(parse(src).expect("parse")).unwrap_err();
    assert!(matches!(err, SchemaError::Invalid(_)), "{err}");
}

#[test]
fn malformed_extension_markers_rejected() {
    for src in [
        "E ::= ENUMERATED { a, ..., b, ... }",
        "E ::= ENUMERATED { ... }",
        "S ::= SEQUENCE { a BOOLEAN, ..., b BOOLEAN, ..., c BOOLEAN }",
        "S ::= SEQUENCE { [[ a BOOLEAN ]] }",
        "S ::= SEQUENCE { a BOOLEAN, ..., ..., ... }",
        "C ::= CHOICE { ..., a BOOLEAN }",
    ] {
        assert!(matches!(parse(src), Err(SchemaError::Parse(_))), "{src} accepted");
    }
}

#[test]
fn parse_file_reads_module() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(SMALL_MODULE.as_bytes()).expect("write");
    let module = parse_file(file.path()).expect("parse_file");
    assert_eq!(module.assignments.len(), 3);
}

#[test]
fn parse_file_missing_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = parse_file(dir.path().join("absent.asn")).unwrap_err();
    assert!(matches!(err, SchemaError::Io(_)), "{err}");
}

#[test]
fn codec_rejects_unknown_and_parameterized_types() {
    let codec = Codec::new(resolve(NR_SUBSET));
    assert!(matches!(
        codec.decode("NoSuchType", &[0]),
        Err(CodecError::UnknownType(_))
    ));
    assert!(matches!(
        codec.encode("SetupRelease", &Value::choice("release", Value::Null)),
        Err(CodecError::Validation(_))
    ));
}

#[test]
fn codec_reports_empty_integer_range() {
    let codec = Codec::new(resolve("T ::= INTEGER (5..1)"));
    assert!(matches!(
        codec.encode("T", &Value::Int(3)),
        Err(CodecError::Validation(_))
    ));
}

#[test]
fn codec_reports_value_shape_mismatch() {
    let codec = Codec::new(resolve(SMALL_MODULE));
    let err = codec.encode("Items", &Value::Int(1)).unwrap_err();
    assert!(err.to_string().contains("SEQUENCE OF"), "{err}");
    let bad_item = Value::SequenceOf(vec![Value::sequence([
        ("id", Value::Int(9)),
        ("kind", Value::enumerated("a")),
    ])]);
    // 9 is outside 0..maxItems
    assert!(matches!(codec.encode("Items", &bad_item), Err(CodecError::Per(_))));
}
