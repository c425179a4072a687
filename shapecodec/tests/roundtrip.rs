use {
    shapecodec::{
        marshal, unmarshal, unmarshal_value, CodecCache, Complex32, Complex64, Config, Decoder,
        Encoder, Error, ReadError, Reflect, UnsupportedType,
    },
    std::{
        collections::{BTreeMap, BTreeSet, HashMap, VecDeque},
        fmt::Debug,
        rc::Rc,
        sync::{mpsc, Arc},
        thread,
    },
};

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub number: u16,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u8,
    pub home: Address,
    pub previous: Vec<Address>,
    pub tags: BTreeSet<String>,
    pub scores: BTreeMap<String, i32>,
    pub nickname: Option<String>,
}

#[derive(Reflect, Default, Debug, PartialEq)]
pub struct Node {
    pub value: i64,
    pub next: Option<Box<Node>>,
}

#[derive(Reflect, Default, Debug, PartialEq)]
pub struct Pointers {
    pub boxed: Box<u32>,
    pub shared: Arc<String>,
    pub local: Rc<Vec<u8>>,
    pub maybe: Option<Box<i8>>,
}

#[derive(Reflect, Default, Debug)]
pub struct WithChannel {
    pub id: u32,
    pub tx: Option<mpsc::Sender<u8>>,
}

#[derive(Reflect, Default, Debug)]
pub struct HiddenChannel {
    pub id: u32,
    #[allow(dead_code)]
    tx: Option<mpsc::Sender<u8>>,
}

#[derive(Reflect, Default, Debug, PartialEq)]
pub struct Wide {
    pub big: u128,
    pub signed: i128,
    pub letter: char,
    pub single: Complex32,
    pub double: Complex64,
}

fn roundtrip<T: Reflect + PartialEq + Debug>(value: &T) {
    let bytes = marshal(value).unwrap();
    let decoded: T = unmarshal_value(&bytes).unwrap();
    assert_eq!(&decoded, value);
}

fn chain(len: usize) -> Node {
    let mut node = Node::default();
    for value in 0..len as i64 {
        node = Node {
            value,
            next: Some(Box::new(node)),
        };
    }
    node
}

fn person() -> Person {
    Person {
        name: "Ada".into(),
        age: 36,
        home: Address {
            street: "Main".into(),
            number: 12,
        },
        previous: vec![
            Address {
                street: "Elm".into(),
                number: 300,
            },
            Address::default(),
        ],
        tags: ["math", "engines"].into_iter().map(String::from).collect(),
        scores: [("a".to_string(), -3), ("b".to_string(), 70_000)]
            .into_iter()
            .collect(),
        nickname: None,
    }
}

#[test]
fn nested_structs_and_collections() {
    roundtrip(&person());
    roundtrip(&vec![person(), Person::default()]);
    roundtrip(&Person::default());
}

#[test]
fn empty_collections_encode_as_zero_length() {
    assert_eq!(marshal(&Vec::<u64>::new()).unwrap(), [0x00]);
    assert_eq!(marshal(&HashMap::<u8, u8>::new()).unwrap(), [0x00]);
    assert_eq!(marshal(&String::new()).unwrap(), [0x00]);
    roundtrip(&VecDeque::<Address>::new());
}

#[test]
fn sequence_of_bytes_is_length_prefixed() {
    assert_eq!(marshal(&vec![1u8, 2, 3]).unwrap(), [0x03, 1, 2, 3]);
    roundtrip(&vec![vec![0xffu8; 200], vec![]]);
}

#[test]
fn absent_option_consumes_one_byte() {
    let bytes = [0x00u8, 0x07];
    let mut decoder = Decoder::new(&bytes[..]);
    let mut value = Some(5u32);
    decoder.decode(&mut value).unwrap();
    assert_eq!(value, None);
    assert_eq!(decoder.read_byte().unwrap(), 0x07);
}

#[test]
fn present_option_is_flagged() {
    assert_eq!(marshal(&Some(1u32)).unwrap(), [0x01, 0x01]);
    assert_eq!(marshal(&None::<u32>).unwrap(), [0x00]);
}

#[test]
fn pointers_roundtrip() {
    roundtrip(&Pointers {
        boxed: Box::new(9),
        shared: Arc::new("shared".into()),
        local: Rc::new(vec![1, 2, 3]),
        maybe: Some(Box::new(-4)),
    });
    roundtrip(&Pointers::default());
}

#[test]
fn shared_pointer_with_other_owners_is_replaced() {
    let original = Arc::new(String::from("keep"));
    let mut target = Pointers {
        shared: Arc::clone(&original),
        ..Pointers::default()
    };
    let source = Pointers {
        shared: Arc::new("new".into()),
        ..Pointers::default()
    };
    unmarshal(&marshal(&source).unwrap(), &mut target).unwrap();
    assert_eq!(*target.shared, "new");
    assert_eq!(*original, "keep");
}

#[test]
fn linked_list_through_option_box() {
    roundtrip(&chain(0));
    roundtrip(&chain(50));
}

#[test]
fn floats_are_bit_exact() {
    for value in [
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        -0.0,
        0.0,
        core::f64::consts::PI,
        f64::MIN_POSITIVE,
    ] {
        let decoded: f64 = unmarshal_value(&marshal(&value).unwrap()).unwrap();
        assert_eq!(decoded.to_bits(), value.to_bits());
    }
    for value in [f32::NAN, -0.0f32, f32::MAX, core::f32::consts::E] {
        let decoded: f32 = unmarshal_value(&marshal(&value).unwrap()).unwrap();
        assert_eq!(decoded.to_bits(), value.to_bits());
    }
}

#[test]
fn wide_scalars_roundtrip() {
    roundtrip(&Wide {
        big: u128::MAX,
        signed: i128::MIN,
        letter: '\u{1F980}',
        single: Complex32::new(1.5, -2.0),
        double: Complex64::new(f64::MAX, f64::MIN_POSITIVE),
    });
    roundtrip(&Wide::default());
}

#[test]
fn signed_integers_use_zigzag() {
    assert_eq!(marshal(&-1i32).unwrap(), [0x01]);
    assert_eq!(marshal(&1i32).unwrap(), [0x02]);
    assert_eq!(marshal(&-64i64).unwrap(), [0x7f]);
    assert_eq!(marshal(&64i64).unwrap(), [0x80, 0x01]);
}

#[test]
fn narrowing_overflow_is_rejected() {
    let bytes = marshal(&300u64).unwrap();
    let err = unmarshal_value::<u8>(&bytes).unwrap_err();
    assert!(matches!(err, Error::Read(ReadError::IntegerOverflow("u8"))));
}

#[test]
fn invalid_bool_and_char_are_rejected() {
    assert!(matches!(
        unmarshal_value::<bool>(&[0x02]),
        Err(Error::Read(ReadError::InvalidBoolEncoding(2)))
    ));
    let surrogate = marshal(&0xD800u32).unwrap();
    assert!(matches!(
        unmarshal_value::<char>(&surrogate),
        Err(Error::Read(ReadError::InvalidChar(0xD800)))
    ));
}

#[test]
fn invalid_utf8_is_rejected() {
    let err = unmarshal_value::<String>(&[0x02, 0xc3, 0x28]).unwrap_err();
    assert!(matches!(err, Error::Read(ReadError::InvalidUtf8Encoding(_))));
}

#[test]
fn truncated_input_errors() {
    let bytes = marshal(&person()).unwrap();
    for cut in 0..bytes.len() {
        let mut target = Person::default();
        assert!(unmarshal(&bytes[..cut], &mut target).is_err(), "cut at {cut}");
    }
}

#[test]
fn opaque_fields_are_rejected() {
    let value = WithChannel::default();
    let err = marshal(&value).unwrap_err();
    assert!(matches!(
        err,
        Error::Unsupported(UnsupportedType::Opaque(_))
    ));
    assert!(!CodecCache::global().contains::<WithChannel>());
}

#[test]
fn private_opaque_fields_are_ignored() {
    let value = HiddenChannel {
        id: 3,
        tx: Some(mpsc::channel().0),
    };
    assert_eq!(marshal(&value).unwrap(), [0x03]);
}

#[test]
fn depth_limit_applies_to_decoding() {
    let config = Config::new().with_max_depth(8);
    let deep = chain(20);

    // Encoding has no depth limit.
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(&deep).unwrap();
    let bytes = encoder.into_inner();

    let mut decoder = Decoder::new(&bytes[..]).with_config(config);
    let mut target = Node::default();
    let err = decoder.decode(&mut target).unwrap_err();
    assert!(matches!(err, Error::Read(ReadError::DepthLimitExceeded(8))));

    let shallow = chain(4);
    let bytes = marshal(&shallow).unwrap();
    let mut decoder = Decoder::new(&bytes[..]).with_config(config);
    let mut target = Node::default();
    decoder.decode(&mut target).unwrap();
    assert_eq!(target, shallow);
}

#[test]
fn long_chains_roundtrip_with_default_config() {
    // Every level recurses through several codec frames; give the walk room.
    thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(|| {
            let long = chain(1000);
            let bytes = marshal(&long).unwrap();
            let decoded: Node = unmarshal_value(&bytes).unwrap();
            assert_eq!(decoded, long);
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn preallocation_limit_rejects_huge_lengths() {
    // A claimed length of 2^20 elements with no payload behind it.
    let bytes = [0x80u8, 0x80, 0x40];
    let config = Config::new().with_preallocation_size_limit(1024);
    let mut decoder = Decoder::new(&bytes[..]).with_config(config);
    let mut target = Vec::<u64>::new();
    let err = decoder.decode(&mut target).unwrap_err();
    assert!(matches!(
        err,
        Error::Read(ReadError::PreallocationSizeLimit { limit: 1024, .. })
    ));
}

#[test]
fn decoding_overwrites_previous_contents() {
    let mut target = person();
    target.previous.extend(std::iter::repeat(Address::default()).take(10));
    let source = Person {
        previous: vec![Address {
            street: "One".into(),
            number: 1,
        }],
        ..Person::default()
    };
    unmarshal(&marshal(&source).unwrap(), &mut target).unwrap();
    assert_eq!(target, source);
}

#[test]
fn concurrent_scans_share_one_codec() {
    let cache = CodecCache::new();
    let codecs: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| cache.scan::<Person>().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for codec in &codecs[1..] {
        assert!(Arc::ptr_eq(&codecs[0], codec));
    }
    let populated = cache.len();
    cache.scan::<Person>().unwrap();
    assert_eq!(cache.len(), populated);
}

#[test]
fn concurrent_marshal_matches_sequential() {
    let expected = marshal(&person()).unwrap();
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..32 {
                    let bytes = marshal(&person()).unwrap();
                    assert_eq!(bytes, expected);
                    let decoded: Person = unmarshal_value(&bytes).unwrap();
                    assert_eq!(decoded, person());
                }
            });
        }
    });
}
