#![no_main]

use {
    libfuzzer_sys::fuzz_target,
    shapecodec::{marshal, unmarshal, unmarshal_value, Reflect},
    std::collections::BTreeMap,
};

include!("types.rs");

fn leaf(data: &[u8]) -> Leaf {
    let word = |i: usize| data.get(i).copied().unwrap_or_default();
    Leaf {
        id: u32::from_le_bytes([word(0), word(1), word(2), word(3)]),
        name: String::from_utf8_lossy(data).into_owned(),
        weight: f64::from_bits(u64::from_le_bytes(
            core::array::from_fn(|i| word(i + 4)),
        )),
        flag: word(12) & 1 == 1,
    }
}

// Bytes produced by marshal always decode, and re-encoding reproduces them.
fuzz_target!(|data: &[u8]| {
    let mut tree = Tree {
        leaf: leaf(data),
        raw: data.to_vec(),
        ..Tree::default()
    };
    for (i, chunk) in data.chunks(7).enumerate() {
        let key = i16::from_le_bytes([chunk[0], chunk.len() as u8]);
        let value = (chunk.len() % 2 == 0).then(|| Box::new(leaf(chunk)));
        tree.index.insert(key, value);
        if i % 3 == 0 {
            tree.children.push(Tree {
                leaf: leaf(chunk),
                ..Tree::default()
            });
        }
    }
    tree.wide = (
        u128::from(tree.leaf.id) << 100,
        -i128::from(tree.leaf.id),
        char::from_u32(tree.leaf.id).unwrap_or('?'),
    );

    let bytes = marshal(&tree).unwrap();
    let decoded: Tree = unmarshal_value(&bytes).unwrap();
    assert_eq!(marshal(&decoded).unwrap(), bytes);
    assert_eq!(decoded.raw, tree.raw);
    assert_eq!(decoded.index.len(), tree.index.len());

    let mut reused = Tree::default();
    unmarshal(&bytes, &mut reused).unwrap();
    assert_eq!(marshal(&reused).unwrap(), bytes);
});
