use crate::types::*;
use rustc_hash::FxHasher;
use std::{borrow::Borrow, cell::RefCell, hash::Hasher};

const HASH_BASE: Hash = 64_603_473;

thread_local! {
    static POWERS: RefCell<Vec<Hash>> = RefCell::new(vec![1]);
}

/// Returns `HASH_BASE` to the given power (wrapping), growing the per-thread cache as needed.
fn power(exponent: usize) -> Hash {
    POWERS.with(|powers| {
        let mut powers = powers.borrow_mut();
        while powers.len() <= exponent {
            let next = powers[powers.len() - 1].wrapping_mul(HASH_BASE);
            powers.push(next);
        }
        powers[exponent]
    })
}

/// Hashes a variable name or operator symbol. This is the hash of a single variable and the
/// starting value for the hash of an operator node.
///
/// # Example
/// ```
/// use attoprop::expression::seed;
///
/// assert_eq!(seed("A"), seed("A"));
/// assert_ne!(seed("A"), seed("B"));
/// ```
pub fn seed(text: &str) -> Hash {
    let mut hasher = FxHasher::default();
    hasher.write(text.as_bytes());
    hasher.finish()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    Not,
    And,
    Or,
    Implies,
}

impl Operator {
    pub fn arity(self) -> usize {
        match self {
            Operator::Not => 1,
            _ => 2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Not => "!",
            Operator::And => "&",
            Operator::Or => "|",
            Operator::Implies => "->",
        }
    }

    fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Operator::Not => !left,
            Operator::And => left && right,
            Operator::Or => left || right,
            Operator::Implies => !left || right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Variable(VarId),
    Operator(Operator),
}

/// One node of a prefix-encoded [`Expression`] together with the size and hash of the subtree
/// rooted at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    symbol: Symbol,
    size: u32,
    hash: Hash,
}

impl Cell {
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }
}

/// A propositional formula stored as its nodes in prefix order.
///
/// The first cell is the root. A binary operator is followed by its left operand and then its
/// right operand, a negation by its single operand. Because every cell knows the size of its
/// subtree, any subexpression is a contiguous slice and can be borrowed without copying.
///
/// Two expressions are considered equal if their root hashes are equal. The hash of a node is
/// `seed(op) + Σ hash(child) · P^position(child)` where the first child sits at position 1 and
/// each following child one subtree size further, so it only depends on the subtree itself and
/// not on where it occurs.
///
/// # Example
/// ```
/// use attoprop::{Formatter, Operator};
///
/// let mut fmt = Formatter::new();
/// let e = fmt.parse_expression("A -> (B -> A)").unwrap();
/// let (a, rest) = e.split(Operator::Implies).unwrap();
/// let (_, a2) = rest.split(Operator::Implies).unwrap();
/// assert_eq!(a, a2);
/// assert_eq!(e.size(), 5);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Expression<T: Borrow<[Cell]>> {
    cells: T,
}

pub type OwnedExpression = Expression<Box<[Cell]>>;

impl<T: Borrow<[Cell]>, S: Borrow<[Cell]>> PartialEq<Expression<S>> for Expression<T> {
    fn eq(&self, other: &Expression<S>) -> bool {
        self.hash() == other.hash()
    }
}

impl<T: Borrow<[Cell]>> Eq for Expression<T> {}

impl<T: Borrow<[Cell]>> Expression<T> {
    pub fn cells(&self) -> &[Cell] {
        self.cells.borrow()
    }

    fn root(&self) -> &Cell {
        &self.cells()[0]
    }

    pub fn symbol(&self) -> Symbol {
        self.root().symbol
    }

    pub fn hash(&self) -> Hash {
        self.root().hash
    }

    /// Number of nodes in this expression
    pub fn size(&self) -> usize {
        self.root().size()
    }

    pub fn variable(&self) -> Option<VarId> {
        match self.symbol() {
            Symbol::Variable(id) => Some(id),
            Symbol::Operator(_) => None,
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.symbol() {
            Symbol::Variable(_) => None,
            Symbol::Operator(op) => Some(op),
        }
    }

    pub fn to_slice(&self) -> Expression<&[Cell]> {
        Expression {
            cells: self.cells.borrow(),
        }
    }

    pub fn to_owned_expression(&self) -> OwnedExpression {
        Expression {
            cells: Box::from(self.cells()),
        }
    }

    /// Returns the subexpression beginning at the given index.
    ///
    /// # Panics
    /// This method panics if start_index is not in the range `0..self.size()`
    ///
    /// # Example
    /// ```
    /// use attoprop::Formatter;
    ///
    /// let mut fmt = Formatter::new();
    /// let e = fmt.parse_expression("(A & B) -> !A").unwrap();
    /// let mut s = String::new();
    /// fmt.format_expression(&mut s, &e.subexpression(1));
    /// assert_eq!(s, "(A & B)");
    /// assert_eq!(e.subexpression(4).size(), 2);
    /// ```
    pub fn subexpression(&self, start_index: usize) -> Expression<&[Cell]> {
        let cells = self.cells();
        Expression {
            cells: &cells[start_index..start_index + cells[start_index].size()],
        }
    }

    /// If this expression is a negation, returns its operand.
    pub fn operand(&self) -> Option<Expression<&[Cell]>> {
        match self.symbol() {
            Symbol::Operator(Operator::Not) => Some(self.subexpression(1)),
            _ => None,
        }
    }

    /// If the root of this expression is the binary operator `op`, returns its left and right
    /// operands.
    pub fn split(&self, op: Operator) -> Option<(Expression<&[Cell]>, Expression<&[Cell]>)> {
        if op.arity() != 2 || self.symbol() != Symbol::Operator(op) {
            return None;
        }
        let left = self.subexpression(1);
        let right = self.subexpression(1 + left.size());
        Some((left, right))
    }

    /// Iterates over all variable occurrences from left to right. Each item is the one-cell
    /// expression of that variable.
    pub fn variables<'a>(&'a self) -> impl Iterator<Item = Expression<&'a [Cell]>> + 'a {
        let cells = self.cells();
        (0..cells.len())
            .filter(move |&i| matches!(cells[i].symbol, Symbol::Variable(_)))
            .map(move |i| Expression {
                cells: &cells[i..=i],
            })
    }

    /// Evaluates this expression with the given truth value for each variable.
    ///
    /// # Example
    /// ```
    /// use attoprop::Formatter;
    ///
    /// let mut fmt = Formatter::new();
    /// let e = fmt.parse_expression("A -> B").unwrap();
    /// let b = fmt.variable_id("B").unwrap();
    /// assert!(e.evaluate(&|v| v == b));
    /// assert!(!e.evaluate(&|v| v != b));
    /// ```
    pub fn evaluate<F: Fn(VarId) -> bool>(&self, value: &F) -> bool {
        match self.symbol() {
            Symbol::Variable(id) => value(id),
            Symbol::Operator(Operator::Not) => !self.subexpression(1).evaluate(value),
            Symbol::Operator(op) => {
                let left = self.subexpression(1);
                let right = self.subexpression(1 + left.size());
                op.apply(left.evaluate(value), right.evaluate(value))
            }
        }
    }
}

impl Expression<Box<[Cell]>> {
    pub fn new_variable(id: VarId, seed: Hash) -> Self {
        Expression {
            cells: Box::new([Cell {
                symbol: Symbol::Variable(id),
                size: 1,
                hash: seed,
            }]),
        }
    }

    /// Builds the expression `op` applied to `operands`.
    ///
    /// # Panics
    /// This method panics if the number of operands does not match the arity of `op`.
    pub fn new_operator(op: Operator, operands: &[&[Cell]]) -> Self {
        assert_eq!(op.arity(), operands.len(), "wrong number of operands");
        let mut hash = seed(op.symbol());
        let mut position = 1;
        for operand in operands {
            hash = hash.wrapping_add(operand[0].hash.wrapping_mul(power(position)));
            position += operand.len();
        }
        let mut cells = Vec::with_capacity(position);
        cells.push(Cell {
            symbol: Symbol::Operator(op),
            size: position as u32,
            hash,
        });
        for operand in operands {
            cells.extend_from_slice(operand);
        }
        Expression {
            cells: cells.into_boxed_slice(),
        }
    }
}

pub fn not<T: Borrow<[Cell]>>(operand: &Expression<T>) -> OwnedExpression {
    OwnedExpression::new_operator(Operator::Not, &[operand.cells()])
}

pub fn and<L: Borrow<[Cell]>, R: Borrow<[Cell]>>(
    left: &Expression<L>,
    right: &Expression<R>,
) -> OwnedExpression {
    OwnedExpression::new_operator(Operator::And, &[left.cells(), right.cells()])
}

pub fn or<L: Borrow<[Cell]>, R: Borrow<[Cell]>>(
    left: &Expression<L>,
    right: &Expression<R>,
) -> OwnedExpression {
    OwnedExpression::new_operator(Operator::Or, &[left.cells(), right.cells()])
}

pub fn implies<L: Borrow<[Cell]>, R: Borrow<[Cell]>>(
    left: &Expression<L>,
    right: &Expression<R>,
) -> OwnedExpression {
    OwnedExpression::new_operator(Operator::Implies, &[left.cells(), right.cells()])
}
