#![no_main]

use {
    libfuzzer_sys::fuzz_target,
    shapecodec::{unmarshal, Config, Decoder, Reflect},
    std::collections::{BTreeMap, HashMap},
};

include!("types.rs");

// Arbitrary input must never panic, and anything that decodes must re-encode.
fuzz_target!(|data: &[u8]| {
    let mut tree = Tree::default();
    if unmarshal(data, &mut tree).is_ok() {
        let bytes = shapecodec::marshal(&tree).unwrap();
        let mut again = Tree::default();
        unmarshal(&bytes, &mut again).unwrap();
    }

    let config = Config::new()
        .with_max_depth(16)
        .with_preallocation_size_limit(1 << 16);
    let mut decoder = Decoder::new(data).with_config(config);
    let mut map = HashMap::<String, Vec<i64>>::new();
    let _ = decoder.decode(&mut map);
    let mut leaves = Vec::<Leaf>::new();
    let _ = decoder.decode(&mut leaves);
});
