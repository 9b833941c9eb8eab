use crate::{
    error::SynthesisError,
    expression::{not, Cell, Expression, OwnedExpression},
    types::*,
};
use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use tracing::{debug, trace};

/// The distinct variables of a formula in order of first appearance. A variable's position in
/// this list is its bit index in truth assignments and hypothesis masks.
#[derive(Debug, Clone)]
pub struct Variables {
    leaves: Vec<OwnedExpression>,
    positions: FxHashMap<VarId, usize>,
}

impl Variables {
    /// # Errors
    /// * TooManyVariables - if the formula has more than [`MAX_VARIABLES`] distinct variables
    pub fn collect<T: Borrow<[Cell]>>(expr: &Expression<T>) -> Result<Self, SynthesisError> {
        let mut leaves = Vec::new();
        let mut positions = FxHashMap::default();
        for leaf in expr.variables() {
            if let Some(id) = leaf.variable() {
                positions.entry(id).or_insert_with(|| {
                    leaves.push(leaf.to_owned_expression());
                    leaves.len() - 1
                });
            }
        }
        if leaves.len() > MAX_VARIABLES {
            return Err(SynthesisError::TooManyVariables(leaves.len()));
        }
        Ok(Variables { leaves, positions })
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn position(&self, id: VarId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// The one-cell expression of the variable at `position`
    pub fn expression(&self, position: usize) -> Expression<&[Cell]> {
        self.leaves[position].to_slice()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Asserted,
    Negated,
}

impl Polarity {
    /// The truth value the variable is fixed to
    pub fn value(self) -> bool {
        self == Polarity::Asserted
    }
}

/// A set of literals `V` or `!V` over the variables of a formula, at most one per variable.
///
/// # Example
/// ```
/// use attoprop::{Formatter, HypothesisSet, Polarity, Variables};
///
/// let mut fmt = Formatter::new();
/// let e = fmt.parse_expression("A | B").unwrap();
/// let variables = Variables::collect(&e).unwrap();
///
/// let empty = HypothesisSet::empty(&variables);
/// assert!(!empty.is_valid(&e));
/// assert!(empty.with(1, Polarity::Asserted).is_valid(&e));
/// assert!(!empty.with(0, Polarity::Negated).is_valid(&e));
/// ```
#[derive(Debug, Clone)]
pub struct HypothesisSet<'v> {
    variables: &'v Variables,
    polarities: Vec<Option<Polarity>>,
}

impl<'v> HypothesisSet<'v> {
    pub fn empty(variables: &'v Variables) -> Self {
        HypothesisSet {
            variables,
            polarities: vec![None; variables.len()],
        }
    }

    /// Builds the set containing the variables whose bit is set in `subset`. The `j`-th chosen
    /// variable (from the lowest bit) is negated if bit `j` of `negated` is set.
    fn from_masks(variables: &'v Variables, subset: u64, negated: u64) -> Self {
        let mut set = Self::empty(variables);
        let mut j = 0;
        for position in 0..variables.len() {
            if (subset >> position) & 1 == 1 {
                set.polarities[position] = Some(if (negated >> j) & 1 == 1 {
                    Polarity::Negated
                } else {
                    Polarity::Asserted
                });
                j += 1;
            }
        }
        set
    }

    pub fn variables(&self) -> &'v Variables {
        self.variables
    }

    /// Returns a copy of this set where the variable at `position` has the given polarity.
    pub fn with(&self, position: usize, polarity: Polarity) -> Self {
        let mut set = self.clone();
        set.polarities[position] = Some(polarity);
        set
    }

    pub fn polarity(&self, position: usize) -> Option<Polarity> {
        self.polarities[position]
    }

    pub fn polarity_of(&self, id: VarId) -> Option<Polarity> {
        self.variables.position(id).and_then(|p| self.polarities[p])
    }

    /// Number of literals in this set
    pub fn len(&self) -> usize {
        self.polarities.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `line` is one of the literals of this set
    pub fn admits<T: Borrow<[Cell]>>(&self, line: &Expression<T>) -> bool {
        let (id, polarity) = match line.operand() {
            Some(operand) => (operand.variable(), Polarity::Negated),
            None => (line.variable(), Polarity::Asserted),
        };
        id.and_then(|id| self.polarity_of(id)) == Some(polarity)
    }

    /// The literals of this set in variable order
    pub fn literals(&self) -> Vec<OwnedExpression> {
        self.polarities
            .iter()
            .enumerate()
            .filter_map(|(position, polarity)| {
                let leaf = self.variables.expression(position);
                match polarity {
                    Some(Polarity::Asserted) => Some(leaf.to_owned_expression()),
                    Some(Polarity::Negated) => Some(not(&leaf)),
                    None => None,
                }
            })
            .collect()
    }

    /// Position of the first variable of `formula` (in variable order) this set leaves open
    pub fn first_free_in<T: Borrow<[Cell]>>(&self, formula: &Expression<T>) -> Option<usize> {
        formula
            .variables()
            .filter_map(|leaf| leaf.variable().and_then(|id| self.variables.position(id)))
            .filter(|&position| self.polarities[position].is_none())
            .min()
    }

    /// Whether `formula` is true under every assignment that agrees with this set.
    ///
    /// Only the open variables that occur in `formula` are enumerated and the enumeration stops
    /// at the first falsifying assignment.
    ///
    /// # Panics
    /// This method panics if `formula` contains a variable that is not part of this set's
    /// variable list.
    pub fn is_valid<T: Borrow<[Cell]>>(&self, formula: &Expression<T>) -> bool {
        let mut fixed = 0u64;
        for (position, polarity) in self.polarities.iter().enumerate() {
            if *polarity == Some(Polarity::Asserted) {
                fixed |= 1 << position;
            }
        }
        let mut open = Vec::new();
        for leaf in formula.variables() {
            let position = leaf
                .variable()
                .and_then(|id| self.variables.position(id))
                .expect("variable outside the hypothesis set's variable list");
            if self.polarities[position].is_none() && !open.contains(&position) {
                open.push(position);
            }
        }
        (0..1u64 << open.len()).all(|completion| {
            let mut bits = fixed;
            for (j, &position) in open.iter().enumerate() {
                if (completion >> j) & 1 == 1 {
                    bits |= 1 << position;
                }
            }
            formula.evaluate(&|id| match self.variables.position(id) {
                Some(position) => (bits >> position) & 1 == 1,
                None => false,
            })
        })
    }
}

/// How polarities are assigned to the variables of a candidate subset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Every subset is tried with every polarity assignment, on the formula and then on its
    /// negation.
    #[default]
    Mixed,
    /// Subsets of the formula are tried with all variables asserted, subsets of the negated
    /// formula with all variables negated.
    Uniform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Polarities {
    Mixed,
    AllAsserted,
    AllNegated,
}

/// A minimal hypothesis set and whether it makes the negated formula valid instead of the
/// formula itself
#[derive(Debug, Clone)]
pub struct Found<'v> {
    pub hypotheses: HypothesisSet<'v>,
    pub negated: bool,
}

/// Subsets of `0..n` with `k` elements as bit masks in ascending numeric order
fn subsets(n: usize, k: usize) -> impl Iterator<Item = u64> {
    let limit = 1u64 << n;
    let first = (1u64 << k) - 1;
    std::iter::successors(Some(first), |&mask| {
        if mask == 0 {
            return None;
        }
        let lowest = mask & mask.wrapping_neg();
        let ripple = mask + lowest;
        Some((((ripple ^ mask) >> 2) / lowest) | ripple)
    })
    .take_while(move |&mask| mask < limit)
}

fn search<'v, T: Borrow<[Cell]>>(
    formula: &Expression<T>,
    variables: &'v Variables,
    polarities: Polarities,
) -> Option<HypothesisSet<'v>> {
    let n = variables.len();
    for k in 0..=n {
        for subset in subsets(n, k) {
            let assignments = match polarities {
                Polarities::Mixed => 0..1u64 << k,
                Polarities::AllAsserted => 0..1,
                Polarities::AllNegated => (1u64 << k) - 1..1u64 << k,
            };
            for negated in assignments {
                let set = HypothesisSet::from_masks(variables, subset, negated);
                trace!(subset, negated, "trying hypothesis set");
                if set.is_valid(formula) {
                    debug!(size = k, subset, negated, "found minimal hypothesis set");
                    return Some(set);
                }
            }
        }
    }
    None
}

/// Finds a smallest hypothesis set under which `formula` is valid. If there is none, the same
/// search is repeated for the negation of `formula`.
///
/// Candidates are tried by increasing size, then by ascending subset mask, then by ascending
/// polarity mask, so the first valid set is minimal.
///
/// # Example
/// ```
/// use attoprop::{find_minimal_hypotheses, Formatter, Polarity, Strategy, Variables};
///
/// let mut fmt = Formatter::new();
/// let e = fmt.parse_expression("A -> B").unwrap();
/// let variables = Variables::collect(&e).unwrap();
///
/// let found = find_minimal_hypotheses(&e, &variables, Strategy::Mixed).unwrap();
/// assert!(!found.negated);
/// assert_eq!(found.hypotheses.len(), 1);
/// assert_eq!(found.hypotheses.polarity(0), Some(Polarity::Negated));
///
/// let found = find_minimal_hypotheses(&e, &variables, Strategy::Uniform).unwrap();
/// assert_eq!(found.hypotheses.polarity(1), Some(Polarity::Asserted));
/// ```
pub fn find_minimal_hypotheses<'v, T: Borrow<[Cell]>>(
    formula: &Expression<T>,
    variables: &'v Variables,
    strategy: Strategy,
) -> Option<Found<'v>> {
    let (direct, negated) = match strategy {
        Strategy::Mixed => (Polarities::Mixed, Polarities::Mixed),
        Strategy::Uniform => (Polarities::AllAsserted, Polarities::AllNegated),
    };
    if let Some(hypotheses) = search(formula, variables, direct) {
        return Some(Found {
            hypotheses,
            negated: false,
        });
    }
    debug!("no hypothesis set for the formula, trying its negation");
    search(&not(formula), variables, negated).map(|hypotheses| Found {
        hypotheses,
        negated: true,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{formatter::Formatter, testing::Formula};

    fn all_sets(variables: &Variables) -> Vec<HypothesisSet<'_>> {
        let mut sets = vec![HypothesisSet::empty(variables)];
        for position in 0..variables.len() {
            let mut next = Vec::new();
            for set in sets {
                next.push(set.with(position, Polarity::Asserted));
                next.push(set.with(position, Polarity::Negated));
                next.push(set);
            }
            sets = next;
        }
        sets
    }

    fn minimum<T: Borrow<[Cell]>>(formula: &Expression<T>, variables: &Variables) -> Option<usize> {
        all_sets(variables)
            .iter()
            .filter(|set| set.is_valid(formula))
            .map(|set| set.len())
            .min()
    }

    #[test]
    fn subsets_in_order() {
        assert_eq!(subsets(3, 0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(subsets(3, 1).collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(subsets(4, 2).collect::<Vec<_>>(), vec![3, 5, 6, 9, 10, 12]);
        assert_eq!(subsets(3, 3).collect::<Vec<_>>(), vec![7]);
        assert_eq!(subsets(0, 0).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn variables_in_order_of_appearance() {
        let mut fmt = Formatter::new();
        fmt.parse_expression("C").unwrap();
        let e = fmt.parse_expression("(B -> C) & !B | A").unwrap();
        let variables = Variables::collect(&e).unwrap();
        assert_eq!(variables.len(), 3);
        let names: Vec<_> = (0..3)
            .map(|p| fmt.name(variables.expression(p).variable().unwrap()).to_owned())
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn too_many_variables() {
        let mut fmt = Formatter::new();
        let input: Vec<_> = (0..=MAX_VARIABLES).map(|i| format!("V{}", i)).collect();
        let e = fmt.parse_expression(&input.join(" & ")).unwrap();
        assert_eq!(
            Variables::collect(&e).unwrap_err(),
            SynthesisError::TooManyVariables(MAX_VARIABLES + 1)
        );
    }

    #[test]
    fn tautology_needs_nothing() {
        let mut fmt = Formatter::new();
        let e = fmt.parse_expression("A -> A").unwrap();
        let variables = Variables::collect(&e).unwrap();
        let found = find_minimal_hypotheses(&e, &variables, Strategy::Mixed).unwrap();
        assert!(!found.negated);
        assert!(found.hypotheses.is_empty());
    }

    #[test]
    fn implication_needs_one_literal() {
        let mut fmt = Formatter::new();
        let e = fmt.parse_expression("A -> B").unwrap();
        let variables = Variables::collect(&e).unwrap();
        assert!(!HypothesisSet::empty(&variables).is_valid(&e));
        let found = find_minimal_hypotheses(&e, &variables, Strategy::Mixed).unwrap();
        assert!(found.hypotheses.is_valid(&e));
        assert_eq!(found.hypotheses.len(), 1);
        assert_eq!(minimum(&e, &variables), Some(1));
    }

    #[test]
    fn contradiction_uses_negation() {
        let mut fmt = Formatter::new();
        let e = fmt.parse_expression("A & !A").unwrap();
        let variables = Variables::collect(&e).unwrap();
        let found = find_minimal_hypotheses(&e, &variables, Strategy::Mixed).unwrap();
        assert!(found.negated);
        assert!(found.hypotheses.is_empty());
    }

    #[test]
    fn uniform_polarities() {
        let mut fmt = Formatter::new();
        let e = fmt.parse_expression("!A").unwrap();
        let variables = Variables::collect(&e).unwrap();
        assert!(find_minimal_hypotheses(&e, &variables, Strategy::Uniform).is_none());
        let found = find_minimal_hypotheses(&e, &variables, Strategy::Mixed).unwrap();
        assert_eq!(found.hypotheses.polarity(0), Some(Polarity::Negated));

        let e = fmt.parse_expression("!A & B").unwrap();
        let variables = Variables::collect(&e).unwrap();
        let found = find_minimal_hypotheses(&e, &variables, Strategy::Uniform).unwrap();
        assert!(found.negated);
        assert_eq!(found.hypotheses.len(), 1);
        assert_eq!(found.hypotheses.polarity(1), Some(Polarity::Negated));

        let found = find_minimal_hypotheses(&e, &variables, Strategy::Mixed).unwrap();
        assert!(!found.negated);
        assert_eq!(found.hypotheses.len(), 2);
        assert_eq!(found.hypotheses.polarity(0), Some(Polarity::Negated));
        assert_eq!(found.hypotheses.polarity(1), Some(Polarity::Asserted));
    }

    #[test]
    fn literals_and_admits() {
        let mut fmt = Formatter::new();
        let e = fmt.parse_expression("A | B | C").unwrap();
        let variables = Variables::collect(&e).unwrap();
        let set = HypothesisSet::empty(&variables)
            .with(2, Polarity::Asserted)
            .with(0, Polarity::Negated);
        let literals: Vec<_> = set
            .literals()
            .iter()
            .map(|l| fmt.expression_to_string(l))
            .collect();
        assert_eq!(literals, vec!["!A", "C"]);
        for (input, admitted) in [("!A", true), ("A", false), ("C", true), ("!C", false), ("B", false), ("!!A", false)] {
            let line = fmt.parse_expression(input).unwrap();
            assert_eq!(set.admits(&line), admitted, "{}", input);
        }
        assert_eq!(set.first_free_in(&e), Some(1));
        let c = fmt.parse_expression("C & !A").unwrap();
        assert_eq!(set.first_free_in(&c), None);
    }

    quickcheck! {
        fn found_sets_are_valid_and_minimal(f: Formula) -> bool {
            let mut fmt = Formatter::new();
            let e = fmt.parse_expression(&f.0).unwrap();
            let variables = Variables::collect(&e).unwrap();
            let found = match find_minimal_hypotheses(&e, &variables, Strategy::Mixed) {
                Some(found) => found,
                None => return false,
            };
            let target = if found.negated { not(&e) } else { e.clone() };
            let best = minimum(&target, &variables);
            found.hypotheses.is_valid(&target)
                && best == Some(found.hypotheses.len())
                && (found.negated == minimum(&e, &variables).is_none())
        }
    }
}
