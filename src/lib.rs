//! `attoprop` decides for a propositional formula which literals have to be assumed to make it
//! provable in a Hilbert-style calculus, and then writes out that proof line by line.
//!
//! # Main data structures
//!
//! ## Expressions
//! A [`Expression`] is a formula built from variables, `!`, `&`, `|` and `->`. It is stored as
//! a flat list of cells in prefix order, where every cell caches the size and a structural hash
//! of its subtree. Subexpressions are borrowed slices of that list and two expressions are
//! compared by their hashes only, so equality is a constant time operation.
//!
//! ## Hypothesis sets
//! A [`HypothesisSet`] fixes some variables of a formula to true (`V`) or false (`!V`). The
//! formula is valid under a set if it is true for every assignment of the remaining variables.
//! [`find_minimal_hypotheses`] looks for a smallest such set, and for the negated formula if the
//! formula itself has none.
//!
//! ## Proofs
//! A [`Proof`] is a list of formulas where every line is a hypothesis, an instance of one of ten
//! axiom schemes (see [`axiom::Scheme`]) or follows from two earlier lines by modus ponens.
//! [`prove`] synthesizes such a proof for a formula from its minimal hypothesis set. Whenever no
//! direct derivation exists it splits on a variable, proves both cases and removes the temporary
//! assumption with the deduction theorem ([`eliminate`]).
//!
//! [`annotate`] checks any proof and tags every line with its justification. This is used to
//! print proofs and to verify the synthesized ones.
//!
//! ```
//! use attoprop::{prove, Formatter, Strategy, Variables};
//!
//! let mut fmt = Formatter::new();
//! let formula = fmt.parse_expression("A -> B").unwrap();
//! let variables = Variables::collect(&formula).unwrap();
//! let proof = prove(&formula, &variables, Strategy::Mixed)
//!     .unwrap()
//!     .annotate()
//!     .unwrap();
//!
//! let mut s = String::new();
//! fmt.format_sequent(&mut s, &proof.sequent);
//! assert_eq!(s, "!A |- (A -> B)");
//! ```

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod axiom;
mod deduction;
pub mod error;
pub mod expression;
mod formatter;
mod hypotheses;
mod proof;
mod synthesis;
#[cfg(test)]
mod testing;
mod types;
mod verify;

pub use deduction::eliminate;
pub use expression::{Expression, Operator, OwnedExpression};
pub use formatter::Formatter;
pub use hypotheses::{find_minimal_hypotheses, Found, HypothesisSet, Polarity, Strategy, Variables};
pub use proof::Proof;
pub use synthesis::{prove, synthesize, Synthesis};
pub use types::*;
pub use verify::{annotate, AnnotatedProof, Justification, Sequent, Step};
