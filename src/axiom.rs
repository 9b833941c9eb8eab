use crate::expression::{
    Cell, Expression,
    Operator::{And, Implies, Or},
};
use std::{borrow::Borrow, fmt};

/// One of the ten axiom schemes, numbered from 1:
///
/// 1. `A -> (B -> A)`
/// 2. `(A -> B) -> ((A -> (B -> C)) -> (A -> C))`
/// 3. `A -> (B -> (A & B))`
/// 4. `(A & B) -> A`
/// 5. `(A & B) -> B`
/// 6. `A -> (A | B)`
/// 7. `B -> (A | B)`
/// 8. `(A -> C) -> ((B -> C) -> ((A | B) -> C))`
/// 9. `(A -> B) -> ((A -> !B) -> !A)`
/// 10. `!!A -> A`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scheme(u8);

impl Scheme {
    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Matcher = for<'a> fn(Expression<&'a [Cell]>) -> Option<bool>;

const MATCHERS: [Matcher; 10] = [
    scheme_1, scheme_2, scheme_3, scheme_4, scheme_5, scheme_6, scheme_7, scheme_8, scheme_9,
    scheme_10,
];

fn scheme_1(e: Expression<&[Cell]>) -> Option<bool> {
    let (a, rest) = e.split(Implies)?;
    let (_, a2) = rest.split(Implies)?;
    Some(a == a2)
}

fn scheme_2(e: Expression<&[Cell]>) -> Option<bool> {
    let (ab, rest) = e.split(Implies)?;
    let (a, b) = ab.split(Implies)?;
    let (abc, ac) = rest.split(Implies)?;
    let (a2, bc) = abc.split(Implies)?;
    let (b2, c) = bc.split(Implies)?;
    let (a3, c2) = ac.split(Implies)?;
    Some(a == a2 && a == a3 && b == b2 && c == c2)
}

fn scheme_3(e: Expression<&[Cell]>) -> Option<bool> {
    let (a, rest) = e.split(Implies)?;
    let (b, conjunction) = rest.split(Implies)?;
    let (a2, b2) = conjunction.split(And)?;
    Some(a == a2 && b == b2)
}

fn scheme_4(e: Expression<&[Cell]>) -> Option<bool> {
    let (conjunction, a2) = e.split(Implies)?;
    let (a, _) = conjunction.split(And)?;
    Some(a == a2)
}

fn scheme_5(e: Expression<&[Cell]>) -> Option<bool> {
    let (conjunction, b2) = e.split(Implies)?;
    let (_, b) = conjunction.split(And)?;
    Some(b == b2)
}

fn scheme_6(e: Expression<&[Cell]>) -> Option<bool> {
    let (a, disjunction) = e.split(Implies)?;
    let (a2, _) = disjunction.split(Or)?;
    Some(a == a2)
}

fn scheme_7(e: Expression<&[Cell]>) -> Option<bool> {
    let (b, disjunction) = e.split(Implies)?;
    let (_, b2) = disjunction.split(Or)?;
    Some(b == b2)
}

fn scheme_8(e: Expression<&[Cell]>) -> Option<bool> {
    let (ac, rest) = e.split(Implies)?;
    let (a, c) = ac.split(Implies)?;
    let (bc, rest) = rest.split(Implies)?;
    let (b, c2) = bc.split(Implies)?;
    let (disjunction, c3) = rest.split(Implies)?;
    let (a2, b2) = disjunction.split(Or)?;
    Some(a == a2 && b == b2 && c == c2 && c == c3)
}

fn scheme_9(e: Expression<&[Cell]>) -> Option<bool> {
    let (ab, rest) = e.split(Implies)?;
    let (a, b) = ab.split(Implies)?;
    let (anb, na) = rest.split(Implies)?;
    let (a2, nb) = anb.split(Implies)?;
    let b2 = nb.operand()?;
    let a3 = na.operand()?;
    Some(a == a2 && a == a3 && b == b2)
}

fn scheme_10(e: Expression<&[Cell]>) -> Option<bool> {
    let (nna, a2) = e.split(Implies)?;
    let na = nna.operand()?;
    let a = na.operand()?;
    Some(a == a2)
}

/// Returns the first scheme (in numeric order) the expression is an instance of.
///
/// # Example
/// ```
/// use attoprop::{axiom::match_scheme, Formatter};
///
/// let mut fmt = Formatter::new();
/// let e = fmt.parse_expression("A & B -> A").unwrap();
/// assert_eq!(match_scheme(&e).map(|s| s.number()), Some(4));
///
/// let e = fmt.parse_expression("A -> A").unwrap();
/// assert_eq!(match_scheme(&e), None);
/// ```
pub fn match_scheme<T: Borrow<[Cell]>>(expr: &Expression<T>) -> Option<Scheme> {
    let e = expr.to_slice();
    MATCHERS
        .iter()
        .position(|matcher| matcher(e).unwrap_or(false))
        .map(|i| Scheme(i as u8 + 1))
}

pub fn is_axiom<T: Borrow<[Cell]>>(expr: &Expression<T>) -> bool {
    match_scheme(expr).is_some()
}
