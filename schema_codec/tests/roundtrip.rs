//! End-to-end scenarios against a live `Serializer`.

use num_bigint::BigInt;
use schema_codec::{Decimal, Instant, MemStore, Record, Serializer};

#[derive(Record, Default, Debug, PartialEq)]
struct Trivial {
    content: String,
}

#[test]
fn s1_trivial_roundtrip_and_growth() {
    let _ = tracing_subscriber::fmt::try_init();
    let ser = Serializer::new(MemStore::new());

    let small = Trivial { content: "small".to_string() };
    let small_bytes = ser.serialize(&small).unwrap();
    let decoded: Trivial = ser.deserialize(&small_bytes).unwrap();
    assert_eq!(decoded, small);

    let bigger = Trivial { content: "something larger".to_string() };
    let bigger_bytes = ser.serialize(&bigger).unwrap();
    assert!(bigger_bytes.len() > small_bytes.len());
}

#[derive(Record, Default, Debug, PartialEq)]
struct Nested {
    tag: i32,
}

#[derive(Record, Default, Debug, PartialEq)]
struct Kitchen {
    a_bool: bool,
    a_i8: i8,
    a_i16: i16,
    a_i32: i32,
    a_i64: i64,
    a_f32: f32,
    a_f64: f64,
    boxed_i32: Option<i32>,
    bools: [bool; 2],
    i8s: [i8; 3],
    text: String,
    stamp: Instant,
    amount: Decimal,
    inner: Nested,
}

#[test]
fn s2_all_defaults_roundtrip() {
    let ser = Serializer::new(MemStore::new());
    let value = Kitchen {
        boxed_i32: Some(0),
        inner: Nested { tag: 0 },
        ..Default::default()
    };
    let bytes = ser.serialize(&value).unwrap();
    let decoded: Kitchen = ser.deserialize(&bytes).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(decoded.boxed_i32, Some(0));
}

#[test]
fn s3_extremes_roundtrip() {
    let ser = Serializer::new(MemStore::new());
    let value = Kitchen {
        a_bool: true,
        a_i8: i8::MIN,
        a_i16: i16::MAX,
        a_i32: i32::MIN,
        a_i64: i64::MAX,
        a_f32: f32::MIN_POSITIVE,
        a_f64: f64::MAX,
        boxed_i32: Some(i32::MAX),
        bools: [false, true],
        i8s: [-1, 0, 1],
        text: (0u8..=127u8)
            .map(|b| b as char)
            .filter(|c| c.is_ascii_punctuation())
            .collect(),
        stamp: Instant::from_millis(1_700_000_000_000),
        amount: Decimal::new(BigInt::from(42387293948234i64), 0),
        inner: Nested { tag: -1 },
    };
    let bytes = ser.serialize(&value).unwrap();
    let decoded: Kitchen = ser.deserialize(&bytes).unwrap();
    assert_eq!(decoded, value);
}

mod v1 {
    use schema_codec::Record;

    #[derive(Record, Default, Debug, PartialEq)]
    pub struct Widget {
        pub a: i32,
        pub b: String,
    }
}

mod v2 {
    use schema_codec::Record;

    #[derive(Record, Default, Debug, PartialEq)]
    pub struct Widget {
        pub b: String,
        pub c: i32,
    }
}

#[test]
fn s4_evolution_tolerant_rename_and_append() {
    let ser_v1 = Serializer::new(MemStore::new());
    let written = v1::Widget { a: 7, b: "x".to_string() };
    let bytes = ser_v1.serialize(&written).unwrap();

    // Simulate a later process that opens the same store with the new
    // struct shape: `a` is gone, `c` is new.
    let ser_v2 = Serializer::from_registry(ser_v1.into_registry());
    let decoded: v2::Widget = ser_v2.deserialize(&bytes).unwrap();
    assert_eq!(decoded.b, "x");
    assert_eq!(decoded.c, 0);
}

#[derive(Record, Default, Debug, PartialEq, Clone)]
struct Leaf {
    value: i32,
}

#[derive(Record, Default, Debug, PartialEq)]
struct TwoLeaves {
    first: Leaf,
    second: Leaf,
}

#[test]
fn s5_shared_nested_type_no_aliasing() {
    let ser = Serializer::new(MemStore::new());
    let value = TwoLeaves { first: Leaf { value: 1 }, second: Leaf { value: 2 } };
    let bytes = ser.serialize(&value).unwrap();
    let decoded: TwoLeaves = ser.deserialize(&bytes).unwrap();
    assert_eq!(decoded.first.value, 1);
    assert_eq!(decoded.second.value, 2);
}

#[derive(Record, Default, Debug, PartialEq)]
struct Nullable {
    name: Option<String>,
    count: Option<i32>,
}

#[test]
fn s6_null_string_and_boxed_i32_roundtrip() {
    let ser = Serializer::new(MemStore::new());
    let value = Nullable { name: None, count: None };
    let bytes = ser.serialize(&value).unwrap();
    let decoded: Nullable = ser.deserialize(&bytes).unwrap();
    assert_eq!(decoded, value);

    let present = Nullable { name: Some("present".to_string()), count: Some(5) };
    let bytes = ser.serialize(&present).unwrap();
    let decoded: Nullable = ser.deserialize(&bytes).unwrap();
    assert_eq!(decoded, present);
}

#[test]
fn schema_stable_across_repeated_describes() {
    let registry = schema_codec::SchemaRegistry::new(MemStore::new());
    let (meta_a, id_a) = registry.resolve_for_write::<Trivial>().unwrap();
    let (meta_b, id_b) = registry.resolve_for_write::<Trivial>().unwrap();
    assert_eq!(meta_a.key(), meta_b.key());
    assert_eq!(id_a, id_b);
}

#[test]
fn reverse_mapping_consistency() {
    let registry = schema_codec::SchemaRegistry::new(MemStore::new());
    let (meta, id) = registry.resolve_for_write::<Kitchen>().unwrap();
    let recovered = registry.resolve_for_read(id).unwrap();
    assert_eq!(recovered.key(), meta.key());
}

#[test]
fn deterministic_output_for_fixed_input() {
    let ser_a = Serializer::new(MemStore::new());
    let ser_b = Serializer::new(MemStore::new());
    let value = Trivial { content: "deterministic".to_string() };
    assert_eq!(ser_a.serialize(&value).unwrap(), ser_b.serialize(&value).unwrap());
}
