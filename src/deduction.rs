use crate::{
    axiom::is_axiom,
    expression::{Cell, Expression, Operator},
    hypotheses::HypothesisSet,
    proof::Proof,
    types::*,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// Turns a proof that uses `alpha` as an extra hypothesis into a proof of `alpha -> c` for every
/// line `c`, using only the literals of `hypotheses` (deduction theorem).
///
/// Every line of `proof` must be `alpha`, an axiom, a literal of `hypotheses` or follow by modus
/// ponens from earlier lines.
///
/// # Panics
/// This function panics if a line has none of these justifications.
///
/// # Example
/// ```
/// use attoprop::{annotate, eliminate, Formatter, HypothesisSet, Proof, Variables};
///
/// let mut fmt = Formatter::new();
/// let sequent = fmt.parse_sequent("|- A -> (B -> A)").unwrap();
/// let a = fmt.parse_expression("A").unwrap();
/// let b = fmt.parse_expression("B").unwrap();
/// let variables = Variables::collect(&sequent.conclusion).unwrap();
///
/// // A |- B -> A
/// let mut proof = Proof::new();
/// proof.push(a.clone());
/// proof.weaken(a.to_slice(), b.to_slice());
///
/// let discharged = eliminate(&proof, a.to_slice(), &HypothesisSet::empty(&variables));
/// assert!(annotate(sequent, discharged.into_lines()).is_ok());
/// ```
pub fn eliminate(proof: &Proof, alpha: Expression<&[Cell]>, hypotheses: &HypothesisSet) -> Proof {
    let lines = proof.lines();
    let mut out = Proof::new();
    let mut proven: FxHashSet<Hash> = FxHashSet::default();
    let mut by_consequent: FxHashMap<Hash, Vec<usize>> = FxHashMap::default();

    for (i, line) in lines.iter().enumerate() {
        let line = line.to_slice();
        if line == alpha {
            out.self_implication(alpha);
        } else if is_axiom(&line) || hypotheses.admits(&line) {
            out.push(line.to_owned_expression());
            out.weaken(line, alpha);
        } else {
            let antecedent = by_consequent
                .get(&line.hash())
                .into_iter()
                .flatten()
                .map(|&j| lines[j].subexpression(1))
                .find(|x| proven.contains(&x.hash()))
                .unwrap_or_else(|| panic!("line {} has no modus ponens premises", i + 1));
            out.distribute(alpha, antecedent, line);
        }
        proven.insert(line.hash());
        if let Some((_, consequent)) = line.split(Operator::Implies) {
            by_consequent.entry(consequent.hash()).or_default().push(i);
        }
    }
    trace!(before = lines.len(), after = out.len(), "discharged hypothesis");
    out
}
