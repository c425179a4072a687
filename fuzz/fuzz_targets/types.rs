#[derive(Reflect, Default, Debug, PartialEq)]
pub struct Leaf {
    pub id: u32,
    pub name: String,
    pub weight: f64,
    pub flag: bool,
}

#[derive(Reflect, Default, Debug, PartialEq)]
pub struct Tree {
    pub leaf: Leaf,
    pub children: Vec<Tree>,
    pub index: BTreeMap<i16, Option<Box<Leaf>>>,
    pub raw: Vec<u8>,
    pub wide: (u128, i128, char),
}
