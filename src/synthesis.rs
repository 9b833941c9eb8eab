use crate::{
    axiom::is_axiom,
    deduction::eliminate,
    error::{ProofError, SynthesisError},
    expression::{not, Cell, Expression, Operator, OwnedExpression, Symbol},
    hypotheses::{find_minimal_hypotheses, HypothesisSet, Polarity, Strategy, Variables},
    proof::Proof,
    types::VarId,
    verify::{annotate, AnnotatedProof, Sequent},
};
use std::borrow::Borrow;
use tracing::{debug, info};

/// A synthesized proof of a formula, or of its negation, from a minimal hypothesis set
#[derive(Debug, Clone)]
pub struct Synthesis<'v> {
    pub hypotheses: HypothesisSet<'v>,
    /// Whether `conclusion` is the negation of the input formula
    pub negated: bool,
    pub conclusion: OwnedExpression,
    pub proof: Proof,
}

impl<'v> Synthesis<'v> {
    pub fn sequent(&self) -> Sequent {
        Sequent {
            hypotheses: self.hypotheses.literals(),
            conclusion: self.conclusion.clone(),
        }
    }

    /// Justifies every line of the synthesized proof.
    pub fn annotate(self) -> Result<AnnotatedProof, ProofError> {
        let sequent = self.sequent();
        annotate(sequent, self.proof.into_lines())
    }
}

/// Finds a minimal hypothesis set for `formula` (or its negation) and synthesizes a proof from
/// it.
///
/// # Errors
/// * NoHypotheses - if neither `formula` nor its negation is valid under any hypothesis set
///
/// # Example
/// ```
/// use attoprop::{prove, Formatter, Strategy, Variables};
///
/// let mut fmt = Formatter::new();
/// let e = fmt.parse_expression("A & B -> A").unwrap();
/// let variables = Variables::collect(&e).unwrap();
/// let synthesis = prove(&e, &variables, Strategy::Mixed).unwrap();
/// assert!(synthesis.hypotheses.is_empty());
/// assert_eq!(synthesis.proof.len(), 1);
///
/// let proof = synthesis.annotate().unwrap();
/// let mut s = String::new();
/// fmt.format_proof(&mut s, &proof);
/// assert_eq!(s, "|- ((A & B) -> A)\n[1. Ax. sch. 4] ((A & B) -> A)\n");
/// ```
pub fn prove<'v, T: Borrow<[Cell]>>(
    formula: &Expression<T>,
    variables: &'v Variables,
    strategy: Strategy,
) -> Result<Synthesis<'v>, SynthesisError> {
    let found =
        find_minimal_hypotheses(formula, variables, strategy).ok_or(SynthesisError::NoHypotheses)?;
    info!(
        hypotheses = found.hypotheses.len(),
        negated = found.negated,
        "found minimal hypotheses"
    );
    let conclusion = if found.negated {
        not(formula)
    } else {
        formula.to_owned_expression()
    };
    let proof = synthesize(conclusion.to_slice(), &found.hypotheses);
    info!(lines = proof.len(), "synthesized proof");
    Ok(Synthesis {
        hypotheses: found.hypotheses,
        negated: found.negated,
        conclusion,
        proof,
    })
}

/// Builds a proof of `formula` from the literals of `hypotheses`.
///
/// # Panics
/// This function panics if `formula` is not valid under `hypotheses`. Debug builds check this
/// up front, release builds fail once a step cannot be justified.
pub fn synthesize(formula: Expression<&[Cell]>, hypotheses: &HypothesisSet) -> Proof {
    let mut out = Proof::new();
    prove_into(&mut out, formula, hypotheses);
    out
}

fn require(hypotheses: &HypothesisSet, formula: Expression<&[Cell]>) {
    if !hypotheses.is_valid(&formula) {
        panic!("subformula is not valid under the hypotheses");
    }
}

fn require_literal(hypotheses: &HypothesisSet, id: VarId, polarity: Polarity) {
    if hypotheses.polarity_of(id) != Some(polarity) {
        panic!("literal is not among the hypotheses");
    }
}

fn prove_into(out: &mut Proof, f: Expression<&[Cell]>, h: &HypothesisSet) {
    debug_assert!(h.is_valid(&f), "formula is not valid under the hypotheses");
    if is_axiom(&f) {
        out.push(f.to_owned_expression());
        return;
    }
    let op = match f.symbol() {
        Symbol::Variable(id) => {
            require_literal(h, id, Polarity::Asserted);
            out.push(f.to_owned_expression());
            return;
        }
        Symbol::Operator(Operator::Not) => {
            prove_negation(out, f, f.subexpression(1), h);
            return;
        }
        Symbol::Operator(op) => op,
    };
    let a = f.subexpression(1);
    let b = f.subexpression(1 + a.size());
    match op {
        Operator::And => {
            prove_into(out, a, h);
            prove_into(out, b, h);
            out.conjunction(a, b);
        }
        Operator::Or => {
            if h.is_valid(&a) {
                prove_into(out, a, h);
                out.disjunction_left(a, b);
            } else if h.is_valid(&b) {
                prove_into(out, b, h);
                out.disjunction_right(a, b);
            } else {
                case_split(out, f, h);
            }
        }
        Operator::Implies => {
            let na = not(&a);
            let nb = not(&b);
            if a == b {
                out.self_implication(a);
            } else if h.is_valid(&b) {
                prove_into(out, b, h);
                out.weaken(b, a);
            } else if h.is_valid(&na) && h.is_valid(&nb) {
                prove_into(out, na.to_slice(), h);
                prove_into(out, nb.to_slice(), h);
                out.implication_from_negation(a, b);
            } else {
                case_split(out, f, h);
            }
        }
        Operator::Not => unreachable!(),
    }
}

/// Proves `f`, which is the negation of `inner`.
fn prove_negation(
    out: &mut Proof,
    f: Expression<&[Cell]>,
    inner: Expression<&[Cell]>,
    h: &HypothesisSet,
) {
    let op = match inner.symbol() {
        Symbol::Variable(id) => {
            require_literal(h, id, Polarity::Negated);
            out.push(f.to_owned_expression());
            return;
        }
        Symbol::Operator(Operator::Not) => {
            let a = inner.subexpression(1);
            prove_into(out, a, h);
            out.double_negation(a);
            return;
        }
        Symbol::Operator(op) => op,
    };
    let a = inner.subexpression(1);
    let b = inner.subexpression(1 + a.size());
    let na = not(&a);
    let nb = not(&b);
    match op {
        Operator::And => {
            if h.is_valid(&na) {
                prove_into(out, na.to_slice(), h);
                out.negated_conjunction_left(a, b);
            } else if h.is_valid(&nb) {
                prove_into(out, nb.to_slice(), h);
                out.negated_conjunction_right(a, b);
            } else {
                case_split(out, f, h);
            }
        }
        Operator::Or => {
            require(h, na.to_slice());
            require(h, nb.to_slice());
            prove_into(out, na.to_slice(), h);
            prove_into(out, nb.to_slice(), h);
            out.negated_disjunction(a, b);
        }
        Operator::Implies => {
            require(h, a);
            require(h, nb.to_slice());
            prove_into(out, a, h);
            prove_into(out, nb.to_slice(), h);
            out.negated_implication(a, b);
        }
        Operator::Not => unreachable!(),
    }
}

/// Proves `f` once assuming and once refuting its first open variable, discharges that
/// assumption from both proofs and combines them by excluded middle.
fn case_split(out: &mut Proof, f: Expression<&[Cell]>, h: &HypothesisSet) {
    let position = h
        .first_free_in(&f)
        .unwrap_or_else(|| panic!("no open variable left to split on"));
    let variable = h.variables().expression(position);
    let negation = not(&variable);
    debug!(position, "splitting cases");

    let asserted = synthesize(f, &h.with(position, Polarity::Asserted));
    let negated = synthesize(f, &h.with(position, Polarity::Negated));
    out.append(eliminate(&asserted, variable, h));
    out.append(eliminate(&negated, negation.to_slice(), h));
    out.case_analysis(variable, f);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{axiom::Scheme, formatter::Formatter, testing::Formula, verify::Justification};

    fn synthesize_text(input: &str, strategy: Strategy) -> (Formatter, Result<AnnotatedProof, SynthesisError>) {
        let mut fmt = Formatter::new();
        let e = fmt.parse_expression(input).unwrap();
        let variables = Variables::collect(&e).unwrap();
        let result = prove(&e, &variables, strategy).map(|s| s.annotate().unwrap());
        (fmt, result)
    }

    #[test]
    fn self_implication_uses_first_schemes() {
        let (_, proof) = synthesize_text("A -> A", Strategy::Mixed);
        let proof = proof.unwrap();
        assert!(proof.sequent.hypotheses.is_empty());
        assert_eq!(proof.steps.len(), 5);
        for step in proof.steps.iter() {
            if let Justification::Axiom(scheme) = step.justification {
                assert!(scheme.number() <= 2);
            }
        }
    }

    #[test]
    fn axiom_is_single_line() {
        let (_, proof) = synthesize_text("A & B -> A", Strategy::Mixed);
        let proof = proof.unwrap();
        assert_eq!(proof.steps.len(), 1);
        assert!(matches!(
            proof.steps[0].justification,
            Justification::Axiom(s) if s.number() == 4
        ));
    }

    #[test]
    fn excluded_middle_splits_cases() {
        let (fmt, proof) = synthesize_text("A | !A", Strategy::Mixed);
        let proof = proof.unwrap();
        assert!(proof.sequent.hypotheses.is_empty());
        let n = proof.steps.len();
        assert_eq!(
            fmt.expression_to_string(&proof.steps[n - 4].expression),
            "((A -> (A | !A)) -> ((!A -> (A | !A)) -> ((A | !A) -> (A | !A))))"
        );
        assert_eq!(
            fmt.expression_to_string(&proof.steps[n - 1].expression),
            "(A | !A)"
        );
        let schemes: Vec<Scheme> = proof
            .steps
            .iter()
            .filter_map(|s| match s.justification {
                Justification::Axiom(scheme) => Some(scheme),
                _ => None,
            })
            .collect();
        assert!(schemes.iter().any(|s| s.number() == 10));
    }

    #[test]
    fn hypotheses_in_header() {
        let (fmt, proof) = synthesize_text("A -> B", Strategy::Mixed);
        let proof = proof.unwrap();
        let mut s = String::new();
        fmt.format_sequent(&mut s, &proof.sequent);
        assert_eq!(s, "!A |- (A -> B)");

        let (fmt, proof) = synthesize_text("A -> B", Strategy::Uniform);
        let proof = proof.unwrap();
        let mut s = String::new();
        fmt.format_sequent(&mut s, &proof.sequent);
        assert_eq!(s, "B |- (A -> B)");
        assert_eq!(proof.steps.len(), 3);
    }

    #[test]
    fn contradiction_proves_negation() {
        let (fmt, proof) = synthesize_text("A & !A", Strategy::Mixed);
        let proof = proof.unwrap();
        let mut s = String::new();
        fmt.format_sequent(&mut s, &proof.sequent);
        assert_eq!(s, "|- !(A & !A)");
    }

    #[test]
    fn no_hypotheses() {
        let (_, proof) = synthesize_text("!A", Strategy::Uniform);
        assert_eq!(proof.unwrap_err(), SynthesisError::NoHypotheses);
    }

    #[test]
    fn nested_connectives() {
        let (_, proof) = synthesize_text("!(A -> B) | (C & !!A) | !(B | C)", Strategy::Mixed);
        proof.unwrap();
        let (_, proof) = synthesize_text("(A -> B) -> (!B -> !A)", Strategy::Mixed);
        proof.unwrap();
    }

    #[test]
    #[should_panic]
    fn invalid_formula() {
        let mut fmt = Formatter::new();
        let e = fmt.parse_expression("A").unwrap();
        let variables = Variables::collect(&e).unwrap();
        synthesize(e.to_slice(), &HypothesisSet::empty(&variables));
    }

    quickcheck! {
        fn synthesized_proofs_check(f: Formula) -> bool {
            let mut fmt = Formatter::new();
            let e = fmt.parse_expression(&f.0).unwrap();
            let variables = Variables::collect(&e).unwrap();
            let synthesis = match prove(&e, &variables, Strategy::Mixed) {
                Ok(synthesis) => synthesis,
                Err(_) => return false,
            };
            let conclusion = synthesis.conclusion.clone();
            match synthesis.annotate() {
                Ok(proof) => proof.steps.last().map(|s| s.expression == conclusion) == Some(true),
                Err(_) => false,
            }
        }

        fn uniform_proofs_check(f: Formula) -> bool {
            let mut fmt = Formatter::new();
            let e = fmt.parse_expression(&f.0).unwrap();
            let variables = Variables::collect(&e).unwrap();
            match prove(&e, &variables, Strategy::Uniform) {
                Ok(synthesis) => synthesis.annotate().is_ok(),
                Err(e) => e == SynthesisError::NoHypotheses,
            }
        }
    }
}
