use crate::expression::{and, implies, not, or, Cell, Expression, OwnedExpression};

/// An ordered list of formulas where every line is an axiom, a hypothesis or follows from two
/// earlier lines by modus ponens.
///
/// Besides [`push`](#method.push) the methods of this struct append fixed derivations. Each one
/// lists the lines it needs to be present already and adds lines that are axioms or follow from
/// those by modus ponens, ending with the derived formula.
///
/// # Example
/// ```
/// use attoprop::{annotate, Formatter, Proof};
///
/// let mut fmt = Formatter::new();
/// let sequent = fmt.parse_sequent("|- B -> B").unwrap();
/// let b = fmt.parse_expression("B").unwrap();
///
/// let mut proof = Proof::new();
/// proof.self_implication(b.to_slice());
/// assert_eq!(proof.len(), 5);
/// assert!(annotate(sequent, proof.into_lines()).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Proof {
    lines: Vec<OwnedExpression>,
}

impl Proof {
    pub fn new() -> Self {
        Proof { lines: Vec::new() }
    }

    pub fn lines(&self) -> &[OwnedExpression] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<OwnedExpression> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn conclusion(&self) -> Option<Expression<&[Cell]>> {
        self.lines.last().map(|line| line.to_slice())
    }

    pub fn push(&mut self, line: OwnedExpression) {
        self.lines.push(line);
    }

    pub fn append(&mut self, other: Proof) {
        self.lines.extend(other.lines);
    }

    /// `⊢ a -> a`
    pub fn self_implication(&mut self, a: Expression<&[Cell]>) {
        let aa = implies(&a, &a);
        let a_aa = implies(&a, &aa);
        let a_aa_a = implies(&a, &implies(&aa, &a));
        let step = implies(&a_aa_a, &aa);
        self.push(a_aa.clone());
        self.push(implies(&a_aa, &step));
        self.push(step);
        self.push(a_aa_a);
        self.push(aa);
    }

    /// `x ⊢ a -> x`
    pub fn weaken(&mut self, x: Expression<&[Cell]>, a: Expression<&[Cell]>) {
        let ax = implies(&a, &x);
        self.push(implies(&x, &ax));
        self.push(ax);
    }

    /// `a -> x, a -> (x -> y) ⊢ a -> y`
    pub fn distribute(
        &mut self,
        a: Expression<&[Cell]>,
        x: Expression<&[Cell]>,
        y: Expression<&[Cell]>,
    ) {
        let ax = implies(&a, &x);
        let axy = implies(&a, &implies(&x, &y));
        let ay = implies(&a, &y);
        let step = implies(&axy, &ay);
        self.push(implies(&ax, &step));
        self.push(step);
        self.push(ay);
    }

    /// `a -> b, b -> c ⊢ a -> c`
    pub fn syllogism(
        &mut self,
        a: Expression<&[Cell]>,
        b: Expression<&[Cell]>,
        c: Expression<&[Cell]>,
    ) {
        self.weaken(implies(&b, &c).to_slice(), a);
        self.distribute(a, b, c);
    }

    /// `a -> b ⊢ !b -> !a`
    pub fn contrapose(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        let na = not(&a);
        let nb = not(&b);
        let a_nb = implies(&a, &nb);
        let step = implies(&a_nb, &na);
        self.push(implies(&implies(&a, &b), &step));
        self.push(step.clone());
        self.push(implies(&nb, &a_nb));
        self.weaken(step.to_slice(), nb.to_slice());
        self.distribute(nb.to_slice(), a_nb.to_slice(), na.to_slice());
    }

    /// `a, b ⊢ a & b`
    pub fn conjunction(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        let ab = and(&a, &b);
        let b_ab = implies(&b, &ab);
        self.push(implies(&a, &b_ab));
        self.push(b_ab);
        self.push(ab);
    }

    /// `a ⊢ a | b`
    pub fn disjunction_left(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        let ab = or(&a, &b);
        self.push(implies(&a, &ab));
        self.push(ab);
    }

    /// `b ⊢ a | b`
    pub fn disjunction_right(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        let ab = or(&a, &b);
        self.push(implies(&b, &ab));
        self.push(ab);
    }

    /// `a ⊢ !!a`
    pub fn double_negation(&mut self, a: Expression<&[Cell]>) {
        let na = not(&a);
        let na_na = implies(&na, &na);
        let step = implies(&na_na, &not(&na));
        self.weaken(a, na.to_slice());
        self.push(implies(&implies(&na, &a), &step));
        self.push(step);
        self.self_implication(na.to_slice());
        self.push(not(&na));
    }

    /// `!a ⊢ a -> b`
    pub fn implication_from_negation(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        let na = not(&a);
        let nb = not(&b);
        let nnb = not(&nb);
        let nb_a = implies(&nb, &a);
        let nb_na = implies(&nb, &na);
        let step = implies(&nb_na, &nnb);
        let contradiction = implies(&nb_a, &step);

        self.push(implies(&a, &nb_a));
        self.weaken(na.to_slice(), nb.to_slice());
        self.weaken(nb_na.to_slice(), a);
        self.push(contradiction.clone());
        self.weaken(contradiction.to_slice(), a);
        self.distribute(a, nb_a.to_slice(), step.to_slice());
        self.distribute(a, nb_na.to_slice(), nnb.to_slice());
        let elimination = implies(&nnb, &b);
        self.push(elimination.clone());
        self.weaken(elimination.to_slice(), a);
        self.distribute(a, nnb.to_slice(), b);
    }

    /// `(a & b) -> c, !c ⊢ !(a & b)` where `(a & b) -> c` is the axiom for `c = a` or `c = b`
    fn refute_conjunction(&mut self, ab: Expression<&[Cell]>, c: Expression<&[Cell]>) {
        let nc = not(&c);
        let ab_nc = implies(&ab, &nc);
        let step = implies(&ab_nc, &not(&ab));
        let ab_c = implies(&ab, &c);
        self.push(ab_c.clone());
        self.push(implies(&ab_c, &step));
        self.push(step);
        self.weaken(nc.to_slice(), ab);
        self.push(not(&ab));
    }

    /// `!a ⊢ !(a & b)`
    pub fn negated_conjunction_left(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        self.refute_conjunction(and(&a, &b).to_slice(), a);
    }

    /// `!b ⊢ !(a & b)`
    pub fn negated_conjunction_right(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        self.refute_conjunction(and(&a, &b).to_slice(), b);
    }

    /// `!a, !b ⊢ !(a | b)`
    pub fn negated_disjunction(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        let ab = or(&a, &b);
        let aa = implies(&a, &a);
        let ba = implies(&b, &a);
        let ab_a = implies(&ab, &a);
        let ab_na = implies(&ab, &not(&a));
        let cases = implies(&ba, &ab_a);
        let step = implies(&ab_na, &not(&ab));

        self.self_implication(a);
        self.implication_from_negation(b, a);
        self.push(implies(&aa, &cases));
        self.push(cases);
        self.push(ab_a.clone());
        self.push(implies(&ab_a, &step));
        self.push(step);
        self.weaken(not(&a).to_slice(), ab.to_slice());
        self.push(not(&ab));
    }

    /// `a, !b ⊢ !(a -> b)`
    pub fn negated_implication(&mut self, a: Expression<&[Cell]>, b: Expression<&[Cell]>) {
        let ab = implies(&a, &b);
        let nb = not(&b);
        let ab_b = implies(&ab, &b);
        let ab_nb = implies(&ab, &nb);
        let step = implies(&ab_nb, &not(&ab));

        self.weaken(a, ab.to_slice());
        self.self_implication(ab.to_slice());
        self.distribute(ab.to_slice(), a, b);
        self.push(implies(&ab_b, &step));
        self.push(step);
        self.weaken(nb.to_slice(), ab.to_slice());
        self.push(not(&ab));
    }

    /// `⊢ a | !a`
    pub fn excluded_middle(&mut self, a: Expression<&[Cell]>) {
        let na = not(&a);
        let d = or(&a, &na);
        let nd = not(&d);
        let nnd = not(&nd);
        let step = implies(&implies(&nd, &not(&na)), &nnd);

        self.push(implies(&a, &d));
        self.contrapose(a, d.to_slice());
        self.push(implies(&na, &d));
        self.contrapose(na.to_slice(), d.to_slice());
        self.push(implies(&implies(&nd, &na), &step));
        self.push(step);
        self.push(nnd.clone());
        self.push(implies(&nnd, &d));
        self.push(d);
    }

    /// `a -> f, !a -> f ⊢ f`
    pub fn case_analysis(&mut self, a: Expression<&[Cell]>, f: Expression<&[Cell]>) {
        let na = not(&a);
        let d = or(&a, &na);
        let d_f = implies(&d, &f);
        let negated_case = implies(&implies(&na, &f), &d_f);

        self.excluded_middle(a);
        self.push(implies(&implies(&a, &f), &negated_case));
        self.push(negated_case);
        self.push(d_f);
        self.push(f.to_owned_expression());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{formatter::Formatter, verify::annotate};

    /// Parses `sequent`, starts a proof with its hypotheses, lets `build` extend it with the
    /// given formulas and checks the result.
    fn derives(sequent: &str, formulas: &[&str], build: impl FnOnce(&mut Proof, &[Expression<&[Cell]>])) {
        let mut fmt = Formatter::new();
        let sequent = fmt.parse_sequent(sequent).unwrap();
        let formulas: Vec<_> = formulas
            .iter()
            .map(|f| fmt.parse_expression(f).unwrap())
            .collect();
        let slices: Vec<_> = formulas.iter().map(|f| f.to_slice()).collect();
        let mut proof = Proof::new();
        for hypothesis in sequent.hypotheses.iter() {
            proof.push(hypothesis.clone());
        }
        build(&mut proof, &slices);
        let mut text = String::new();
        for line in proof.lines() {
            fmt.format_expression(&mut text, line);
            text.push('\n');
        }
        if let Err(e) = annotate(sequent, proof.into_lines()) {
            panic!("{}\n{}", e, text);
        }
    }

    #[test]
    fn self_implication() {
        derives("|- (P | Q) -> (P | Q)", &["P | Q"], |p, f| p.self_implication(f[0]));
    }

    #[test]
    fn weaken() {
        derives("!P |- Q & R -> !P", &["!P", "Q & R"], |p, f| p.weaken(f[0], f[1]));
    }

    #[test]
    fn distribute() {
        derives(
            "A -> X, A -> (X -> Y) |- A -> Y",
            &["A", "X", "Y"],
            |p, f| p.distribute(f[0], f[1], f[2]),
        );
    }

    #[test]
    fn syllogism() {
        derives(
            "!A -> B, B -> C | D |- !A -> C | D",
            &["!A", "B", "C | D"],
            |p, f| p.syllogism(f[0], f[1], f[2]),
        );
    }

    #[test]
    fn contrapose() {
        derives("P -> Q & R |- !(Q & R) -> !P", &["P", "Q & R"], |p, f| {
            p.contrapose(f[0], f[1])
        });
    }

    #[test]
    fn conjunction() {
        derives("P -> Q, !R |- (P -> Q) & !R", &["P -> Q", "!R"], |p, f| {
            p.conjunction(f[0], f[1])
        });
    }

    #[test]
    fn disjunctions() {
        derives("!P |- !P | (Q -> R)", &["!P", "Q -> R"], |p, f| {
            p.disjunction_left(f[0], f[1])
        });
        derives("!P |- (Q -> R) | !P", &["Q -> R", "!P"], |p, f| {
            p.disjunction_right(f[0], f[1])
        });
    }

    #[test]
    fn double_negation() {
        derives("P & Q |- !!(P & Q)", &["P & Q"], |p, f| p.double_negation(f[0]));
    }

    #[test]
    fn implication_from_negation() {
        derives("!(P | Q) |- (P | Q) -> !R", &["P | Q", "!R"], |p, f| {
            p.implication_from_negation(f[0], f[1])
        });
    }

    #[test]
    fn negated_conjunctions() {
        derives("!P |- !(P & (Q -> R))", &["P", "Q -> R"], |p, f| {
            p.negated_conjunction_left(f[0], f[1])
        });
        derives("!(Q -> R) |- !(P & (Q -> R))", &["P", "Q -> R"], |p, f| {
            p.negated_conjunction_right(f[0], f[1])
        });
    }

    #[test]
    fn negated_disjunction() {
        derives("!P, !!Q |- !(P | !Q)", &["P", "!Q"], |p, f| {
            p.negated_disjunction(f[0], f[1])
        });
    }

    #[test]
    fn negated_implication() {
        derives("P | Q, !R |- !((P | Q) -> R)", &["P | Q", "R"], |p, f| {
            p.negated_implication(f[0], f[1])
        });
    }

    #[test]
    fn excluded_middle() {
        derives("|- (P -> Q) | !(P -> Q)", &["P -> Q"], |p, f| p.excluded_middle(f[0]));
    }

    #[test]
    fn case_analysis() {
        derives("P -> R, !P -> R |- R", &["P", "R"], |p, f| p.case_analysis(f[0], f[1]));
    }
}
