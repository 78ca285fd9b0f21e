// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Structural round trips over every supported shape, on both formats.

#![allow(clippy::float_cmp)]

mod common;

use common::{assert_roundtrip, decode, encode, roundtrip, BACKENDS};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use strata::binary::BinaryWriter;
use strata::json::{JsonReader, JsonWriter};
use strata::{json, Config, Reflect, Registry};

#[derive(Reflect, Default, Debug, Clone, Copy, PartialEq)]
enum Level {
    #[default]
    Low,
    Mid,
    #[strata(rename = "HIGH")]
    High,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[strata(default)]
struct Inner {
    id: u32,
    label: String,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[strata(default)]
struct Everything {
    flag: bool,
    small: i8,
    letter: char,
    short: i16,
    int: i32,
    long: i64,
    byte: u8,
    word: u16,
    dword: u32,
    qword: u64,
    size: usize,
    offset: isize,
    ratio: f32,
    precise: f64,
    maybe: Option<i32>,
    maybe_not: Option<String>,
    text: String,
    level: Level,
    fixed: [u16; 3],
    names: Vec<String>,
    queue: VecDeque<i64>,
    ordered: BTreeSet<u32>,
    lookup: BTreeMap<String, f64>,
    by_id: BTreeMap<u32, String>,
    hashed: HashMap<String, Vec<u8>>,
    nested: Inner,
    boxed: Box<Inner>,
    shared: Arc<String>,
    opt_obj: Option<Inner>,
    slice: Box<[i32]>,
    grid: Vec<Vec<i32>>,
    levels: [Level; 2],
}

fn sample() -> Everything {
    let mut hashed = HashMap::new();
    hashed.insert("bytes".to_string(), vec![0, 127, 255]);
    hashed.insert("empty".to_string(), Vec::new());
    Everything {
        flag: true,
        small: -128,
        letter: 'λ',
        short: i16::MIN,
        int: -123_456,
        long: i64::MAX,
        byte: 255,
        word: u16::MAX,
        dword: u32::MAX,
        qword: u64::MAX,
        size: 4096,
        offset: -17,
        ratio: 0.25,
        precise: -1234.5678,
        maybe: Some(-1),
        maybe_not: None,
        text: "quote \" backslash \\ newline \n tab \t".into(),
        level: Level::High,
        fixed: [1, 2, 3],
        names: vec!["a".into(), String::new(), "c".into()],
        queue: VecDeque::from(vec![3, 2, 1]),
        ordered: [9, 4, 7].into_iter().collect(),
        lookup: [("pi".to_string(), 3.14159), ("e".to_string(), 2.71828)]
            .into_iter()
            .collect(),
        by_id: [(1, "one".to_string()), (20, "twenty".to_string())]
            .into_iter()
            .collect(),
        hashed,
        nested: Inner {
            id: 7,
            label: "nested".into(),
        },
        boxed: Box::new(Inner {
            id: 8,
            label: "boxed".into(),
        }),
        shared: Arc::new("shared".into()),
        opt_obj: Some(Inner::default()),
        slice: vec![5, -5].into_boxed_slice(),
        grid: vec![vec![1, 2], vec![], vec![3]],
        levels: [Level::Mid, Level::Low],
    }
}

#[test]
fn test_every_shape_roundtrips() {
    let registry = Registry::default();
    assert_roundtrip(&registry, &sample());
    assert_roundtrip(&registry, &Everything::default());
}

#[test]
fn test_top_level_leaves_roundtrip() {
    let registry = Registry::default();
    assert_roundtrip(&registry, &true);
    assert_roundtrip(&registry, &'x');
    assert_roundtrip(&registry, &i64::MIN);
    assert_roundtrip(&registry, &u64::MAX);
    assert_roundtrip(&registry, &f64::MIN_POSITIVE);
    assert_roundtrip(&registry, &String::from("plain"));
    assert_roundtrip(&registry, &Some(Level::Mid));
    assert_roundtrip(&registry, &None::<Inner>);
    assert_roundtrip(&registry, &vec![Some(1u8), None, Some(3)]);
}

#[test]
fn test_enum_uses_declared_names() {
    let registry = Registry::default();
    assert_eq!(
        json::to_string(&registry, &[Level::Low, Level::High]).unwrap(),
        r#"["Low","HIGH"]"#
    );
}

#[derive(Reflect, Debug, PartialEq)]
struct Record {
    name: Option<String>,
    count: i32,
}

#[test]
fn test_record_with_null_string() {
    let registry = Registry::default();
    let record = Record {
        name: None,
        count: 42,
    };
    assert_eq!(
        json::to_string(&registry, &record).unwrap(),
        r#"{"name":null,"count":42}"#
    );
    assert_roundtrip(&registry, &record);
}

#[test]
fn test_non_string_keys_roundtrip_in_any_order() {
    let registry = Registry::default();
    let map: HashMap<i64, String> = (-5..5).map(|k| (k * 1000, format!("v{k}"))).collect();
    assert_roundtrip(&registry, &map);

    let reordered = r#"[{"value":"b","key":2},{"key":1,"value":"a"}]"#;
    let decoded: HashMap<i64, String> = json::from_str(&registry, reordered).unwrap();
    let expected: HashMap<i64, String> = [(1, "a".to_string()), (2, "b".to_string())]
        .into_iter()
        .collect();
    assert_eq!(decoded, expected);
}

#[derive(Reflect, Debug, PartialEq)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

#[derive(Reflect, Default, Debug, PartialEq)]
#[strata(default)]
struct Tree {
    name: String,
    children: Vec<Tree>,
}

fn chain(depth: i32) -> Node {
    (1..depth).rev().fold(
        Node {
            value: depth,
            next: None,
        },
        |next, value| Node {
            value,
            next: Some(Box::new(next)),
        },
    )
}

#[test]
fn test_recursive_chain_roundtrips() {
    let registry = Registry::default();
    for depth in [1, 3, 16] {
        assert_roundtrip(&registry, &chain(depth));
    }
    assert_eq!(
        json::to_string(&registry, &chain(3)).unwrap(),
        r#"{"value":1,"next":{"value":2,"next":{"value":3,"next":null}}}"#
    );
}

#[test]
fn test_recursive_tree_roundtrips() {
    let registry = Registry::default();
    let leaf = |name: &str| Tree {
        name: name.into(),
        children: Vec::new(),
    };
    let tree = Tree {
        name: "root".into(),
        children: vec![
            Tree {
                name: "left".into(),
                children: vec![leaf("a"), leaf("b")],
            },
            leaf("right"),
        ],
    };
    assert_roundtrip(&registry, &tree);
}

#[test]
fn test_encoding_respects_reader_depth_limit() {
    let registry = Registry::default();
    let too_deep = chain(strata::json::DEFAULT_MAX_DEPTH as i32 + 1);
    let err = json::to_string(&registry, &too_deep).unwrap_err();
    assert!(err.is_validation(), "{err}");
    let err = strata::binary::to_vec(&registry, &too_deep).unwrap_err();
    assert!(err.is_validation(), "{err}");

    let mut writer = JsonWriter::new(Vec::new()).with_max_depth(8);
    registry.encode(&chain(8), &mut writer).unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    let mut reader = JsonReader::new(&text).with_max_depth(8);
    assert_eq!(registry.decode::<Node>(&mut reader).unwrap(), chain(8));

    let mut writer = BinaryWriter::new(Vec::new()).with_max_depth(8);
    let err = registry.encode(&chain(9), &mut writer).unwrap_err();
    assert!(err.is_validation(), "{err}");
}

#[derive(Reflect, Default, Debug, PartialEq)]
#[strata(default)]
struct Person {
    name: String,
    age: u8,
}

#[derive(Reflect, Default, Debug, PartialEq)]
#[strata(default, name = "PersonV2")]
struct PersonV2 {
    name: String,
    history: Vec<BTreeMap<String, Option<Vec<i32>>>>,
    age: u8,
}

#[test]
fn test_unknown_field_policy_on_both_formats() {
    let strict = Registry::default();
    let lenient = Registry::new(Config::default().with_fail_on_unrecognised_fields(false)).unwrap();
    let mut entry = BTreeMap::new();
    entry.insert("k".to_string(), Some(vec![1, 2, 3]));
    entry.insert("n".to_string(), None);
    let newer = PersonV2 {
        name: "ada".into(),
        history: vec![entry, BTreeMap::new()],
        age: 36,
    };
    let expected = Person {
        name: "ada".into(),
        age: 36,
    };

    for backend in BACKENDS {
        let bytes = encode(backend, &strict, &newer).unwrap();
        let err = decode::<Person>(backend, &strict, &bytes).unwrap_err();
        assert!(err.is_validation(), "{backend:?}: {err}");
        let decoded: Person = decode(backend, &lenient, &bytes).unwrap();
        assert_eq!(decoded, expected, "{backend:?}");
    }
}

#[derive(Reflect, Default, Debug, PartialEq)]
#[strata(default)]
struct Vehicle {
    name: String,
    wheels: u8,
}

#[derive(Reflect, Default, Debug, PartialEq)]
#[strata(default)]
struct Truck {
    name: String,
    payload: f64,
    #[strata(base)]
    vehicle: Vehicle,
}

#[test]
fn test_shadowed_member_keeps_both_values() {
    let registry = Registry::default();
    let truck = Truck {
        name: "own".into(),
        payload: 12.5,
        vehicle: Vehicle {
            name: "inherited".into(),
            wheels: 6,
        },
    };
    assert_eq!(
        json::to_string(&registry, &truck).unwrap(),
        r#"{"name":"own","payload":12.5,"Vehicle.name":"inherited","wheels":6}"#
    );
    for backend in BACKENDS {
        let back = roundtrip(backend, &registry, &truck).unwrap();
        assert_eq!(back.name, "own");
        assert_eq!(back.vehicle.name, "inherited");
        assert_eq!(back, truck);
    }
}

#[test]
fn test_trailing_input_is_malformed() {
    let registry = Registry::default();
    let err = json::from_str::<i32>(&registry, "1 2").unwrap_err();
    assert!(matches!(err, strata::Error::Malformed { .. }), "{err}");

    let mut bytes = strata::binary::to_vec(&registry, &1i32).unwrap();
    bytes.push(0);
    let err = strata::binary::from_slice::<i32>(&registry, &bytes).unwrap_err();
    assert!(matches!(err, strata::Error::Malformed { .. }), "{err}");
}

fn random_string(rng: &mut fastrand::Rng) -> String {
    let len = rng.usize(0..12);
    (0..len).map(|_| rng.char('a'..='z')).collect()
}

fn random_inner(rng: &mut fastrand::Rng) -> Inner {
    Inner {
        id: rng.u32(..),
        label: random_string(rng),
    }
}

#[test]
fn test_randomized_roundtrips() {
    let registry = Registry::default();
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for _ in 0..200 {
        let mut value = Everything {
            flag: rng.bool(),
            small: rng.i8(..),
            letter: rng.char(..),
            short: rng.i16(..),
            int: rng.i32(..),
            long: rng.i64(..),
            byte: rng.u8(..),
            word: rng.u16(..),
            dword: rng.u32(..),
            qword: rng.u64(..),
            size: rng.usize(..),
            offset: rng.isize(..),
            ratio: rng.f32(),
            precise: rng.f64() * 1e6 - 5e5,
            maybe: rng.bool().then(|| rng.i32(..)),
            maybe_not: rng.bool().then(|| random_string(&mut rng)),
            text: random_string(&mut rng),
            level: [Level::Low, Level::Mid, Level::High][rng.usize(0..3)],
            fixed: [rng.u16(..), rng.u16(..), rng.u16(..)],
            nested: random_inner(&mut rng),
            boxed: Box::new(random_inner(&mut rng)),
            opt_obj: rng.bool().then(|| random_inner(&mut rng)),
            ..Everything::default()
        };
        for _ in 0..rng.usize(0..5) {
            value.names.push(random_string(&mut rng));
            value.ordered.insert(rng.u32(..));
            value.by_id.insert(rng.u32(..), random_string(&mut rng));
            value.lookup.insert(random_string(&mut rng), rng.f64());
        }
        assert_roundtrip(&registry, &value);
    }
}
