use quickcheck::{Arbitrary, Gen};

/// A random formula over `A`, `B` and `C`, already in the form the formatter prints.
#[derive(Clone, Debug)]
pub struct Formula(pub String);

fn generate(g: &mut Gen, depth: usize) -> String {
    if depth == 0 || u8::arbitrary(g) % 4 == 0 {
        let name = g.choose(&["A", "B", "C"]).copied().unwrap_or("A");
        return name.to_owned();
    }
    match u8::arbitrary(g) % 4 {
        0 => format!("!{}", generate(g, depth - 1)),
        1 => format!("({} & {})", generate(g, depth - 1), generate(g, depth - 1)),
        2 => format!("({} | {})", generate(g, depth - 1), generate(g, depth - 1)),
        _ => format!("({} -> {})", generate(g, depth - 1), generate(g, depth - 1)),
    }
}

impl Arbitrary for Formula {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = 1 + usize::arbitrary(g) % 4;
        Formula(generate(g, depth))
    }
}
