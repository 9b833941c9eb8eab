use crate::{
    axiom::{match_scheme, Scheme},
    error::ProofError,
    expression::{Operator, OwnedExpression},
    types::*,
};
use rustc_hash::FxHashMap;
use std::{collections::hash_map::Entry, fmt};
use tracing::debug;

/// Hypotheses and the conclusion a proof should derive from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequent {
    pub hypotheses: Vec<OwnedExpression>,
    pub conclusion: OwnedExpression,
}

/// Why a line of a proof holds. Indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Hypothesis(usize),
    Axiom(Scheme),
    /// From the lines `X -> Y` and `X`
    ModusPonens { implication: usize, antecedent: usize },
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Justification::Hypothesis(i) => write!(f, "Hypothesis {}", i),
            Justification::Axiom(scheme) => write!(f, "Ax. sch. {}", scheme),
            Justification::ModusPonens {
                implication,
                antecedent,
            } => write!(f, "M.P. {}, {}", implication, antecedent),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Step {
    pub expression: OwnedExpression,
    pub justification: Justification,
}

/// A proof where every line carries its justification
#[derive(Debug, Clone)]
pub struct AnnotatedProof {
    pub sequent: Sequent,
    pub steps: Vec<Step>,
    /// 0-based index of the conclusion's smallest derivation
    conclusion_line: usize,
}

/// Justifies every line of `lines` as a hypothesis of `sequent`, an axiom or a modus ponens
/// step from earlier lines, in this order of preference.
///
/// Among several modus ponens candidates the pair with the smallest combined derivation is
/// used, where a hypothesis or axiom counts as one line and a modus ponens step as one line plus
/// the derivations of both premises.
///
/// # Errors
/// * Empty - if there are no lines
/// * Unjustified - for the first line that cannot be justified
/// * ConclusionMismatch - if the last line is not the conclusion of `sequent`
///
/// # Example
/// ```
/// use attoprop::{annotate, Formatter, Justification};
///
/// let mut fmt = Formatter::new();
/// let sequent = fmt.parse_sequent("A, A -> B |- B").unwrap();
/// let lines = vec![
///     fmt.parse_expression("A").unwrap(),
///     fmt.parse_expression("A -> B").unwrap(),
///     fmt.parse_expression("B").unwrap(),
/// ];
/// let proof = annotate(sequent, lines).unwrap();
/// assert_eq!(
///     proof.steps[2].justification,
///     Justification::ModusPonens { implication: 2, antecedent: 1 }
/// );
/// ```
pub fn annotate(
    sequent: Sequent,
    lines: Vec<OwnedExpression>,
) -> Result<AnnotatedProof, ProofError> {
    let mut hypotheses: FxHashMap<Hash, usize> = FxHashMap::default();
    for (i, hypothesis) in sequent.hypotheses.iter().enumerate() {
        hypotheses.entry(hypothesis.hash()).or_insert(i + 1);
    }
    let mut best: FxHashMap<Hash, usize> = FxHashMap::default();
    let mut implications: FxHashMap<Hash, Vec<usize>> = FxHashMap::default();
    let mut sizes: Vec<u64> = Vec::with_capacity(lines.len());
    let mut steps: Vec<Step> = Vec::with_capacity(lines.len());

    for (i, line) in lines.into_iter().enumerate() {
        let (justification, size) = if let Some(&h) = hypotheses.get(&line.hash()) {
            (Justification::Hypothesis(h), 1)
        } else if let Some(scheme) = match_scheme(&line) {
            (Justification::Axiom(scheme), 1)
        } else {
            let mut found: Option<(usize, usize, u64)> = None;
            for &j in implications.get(&line.hash()).into_iter().flatten() {
                let antecedent = steps[j].expression.subexpression(1).hash();
                if let Some(&k) = best.get(&antecedent) {
                    let size = sizes[j].saturating_add(sizes[k]).saturating_add(1);
                    if found.map_or(true, |(_, _, s)| size < s) {
                        found = Some((j, k, size));
                    }
                }
            }
            match found {
                Some((j, k, size)) => (
                    Justification::ModusPonens {
                        implication: j + 1,
                        antecedent: k + 1,
                    },
                    size,
                ),
                None => {
                    debug!(line = i + 1, "unjustified line");
                    return Err(ProofError::Unjustified(i + 1));
                }
            }
        };
        match best.entry(line.hash()) {
            Entry::Occupied(mut e) => {
                if size < sizes[*e.get()] {
                    e.insert(i);
                }
            }
            Entry::Vacant(e) => {
                e.insert(i);
            }
        }
        if let Some((_, consequent)) = line.split(Operator::Implies) {
            implications.entry(consequent.hash()).or_default().push(i);
        }
        sizes.push(size);
        steps.push(Step {
            expression: line,
            justification,
        });
    }

    match steps.last() {
        None => Err(ProofError::Empty),
        Some(last) if last.expression != sequent.conclusion => Err(ProofError::ConclusionMismatch),
        Some(_) => {
            let conclusion_line = best[&sequent.conclusion.hash()];
            debug!(lines = steps.len(), "proof is correct");
            Ok(AnnotatedProof {
                sequent,
                steps,
                conclusion_line,
            })
        }
    }
}

impl AnnotatedProof {
    /// Keeps only the lines the smallest derivation of the conclusion depends on, renumbering
    /// the modus ponens references.
    ///
    /// # Example
    /// ```
    /// use attoprop::{annotate, Formatter};
    ///
    /// let mut fmt = Formatter::new();
    /// let sequent = fmt.parse_sequent("A, B |- A").unwrap();
    /// let lines = ["B", "A -> (B -> A)", "A", "B -> A", "A"]
    ///     .iter()
    ///     .map(|l| fmt.parse_expression(l).unwrap())
    ///     .collect();
    /// let proof = annotate(sequent, lines).unwrap().minimize();
    /// assert_eq!(proof.steps.len(), 1);
    /// ```
    pub fn minimize(&self) -> AnnotatedProof {
        let mut needed = vec![false; self.steps.len()];
        let mut stack = vec![self.conclusion_line];
        while let Some(i) = stack.pop() {
            if needed[i] {
                continue;
            }
            needed[i] = true;
            if let Justification::ModusPonens {
                implication,
                antecedent,
            } = self.steps[i].justification
            {
                stack.push(implication - 1);
                stack.push(antecedent - 1);
            }
        }

        let mut renumbered = vec![0; self.steps.len()];
        let mut steps = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            if !needed[i] {
                continue;
            }
            renumbered[i] = steps.len() + 1;
            let justification = match step.justification {
                Justification::ModusPonens {
                    implication,
                    antecedent,
                } => Justification::ModusPonens {
                    implication: renumbered[implication - 1],
                    antecedent: renumbered[antecedent - 1],
                },
                j => j,
            };
            steps.push(Step {
                expression: step.expression.clone(),
                justification,
            });
        }
        debug!(
            before = self.steps.len(),
            after = steps.len(),
            "minimized proof"
        );
        let conclusion_line = steps.len() - 1;
        AnnotatedProof {
            sequent: self.sequent.clone(),
            steps,
            conclusion_line,
        }
    }
}
