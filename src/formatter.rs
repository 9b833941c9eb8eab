use nom::{
    bytes::complete::{tag, take_while},
    character::complete::{char, multispace0, satisfy},
    combinator::{not, recognize},
    error::{context, VerboseError, VerboseErrorKind},
    sequence::{pair, preceded, terminated},
    IResult,
};
use rustc_hash::FxHashMap;

use crate::{
    error::ParseError,
    expression::{implies, not as negate, seed, Cell, Expression, Operator, OwnedExpression, Symbol},
    types::*,
    verify::{AnnotatedProof, Sequent, Step},
};
use std::borrow::Borrow;

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Parses and prints formulas, interning variable names as [`VarId`]s.
///
/// Grammar from lowest to highest precedence: implication (right associative), disjunction
/// (left associative), conjunction (left associative), prefix negation and atoms (a variable or
/// a parenthesized formula). A variable is an uppercase letter followed by uppercase letters,
/// digits or apostrophes. Printing puts every binary operation in parentheses.
///
/// ```
/// use attoprop::Formatter;
///
/// let mut fmt = Formatter::new();
/// let e = fmt.parse_expression("A -> B -> !C & D | E").unwrap();
///
/// let mut s = String::new();
/// fmt.format_expression(&mut s, &e);
/// assert_eq!(s, "(A -> (B -> ((!C & D) | E)))");
/// assert_eq!(fmt.parse_expression(&s).unwrap(), e);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Formatter {
    names: Vec<String>,
    ids: FxHashMap<String, VarId>,
}

fn token<'a>(symbol: &'static str) -> impl FnMut(&'a str) -> ParseResult<'a, &'a str> {
    preceded(multispace0, tag(symbol))
}

/// `|` that is not the start of a turnstile `|-`
fn disjunction_token<'a>(input: &'a str) -> ParseResult<'a, &'a str> {
    preceded(multispace0, terminated(tag("|"), not(char('-'))))(input)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '\''
}

fn column(input: &str, rest: &str) -> usize {
    input[..input.len() - rest.len()].chars().count() + 1
}

fn parse_error(input: &str, error: nom::Err<VerboseError<&str>>) -> ParseError {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let rest = e.errors.first().map(|(rest, _)| *rest).unwrap_or("");
            let expected = e
                .errors
                .iter()
                .find_map(|(_, kind)| match kind {
                    VerboseErrorKind::Context(c) => Some(*c),
                    _ => None,
                })
                .unwrap_or("formula");
            ParseError::Expected {
                column: column(input, rest),
                expected,
            }
        }
        nom::Err::Incomplete(_) => ParseError::Expected {
            column: input.chars().count() + 1,
            expected: "formula",
        },
    }
}

fn finish(input: &str, rest: &str) -> Result<(), ParseError> {
    let rest = rest.trim_start();
    match rest.chars().next() {
        None => Ok(()),
        Some(found) => Err(ParseError::Unexpected {
            column: column(input, rest),
            found,
        }),
    }
}

impl Formatter {
    pub fn new() -> Self {
        Formatter {
            names: Vec::new(),
            ids: FxHashMap::default(),
        }
    }

    /// Returns the id of a variable name that was already parsed.
    pub fn variable_id(&self, name: &str) -> Option<VarId> {
        self.ids.get(name).copied()
    }

    /// # Panics
    /// This method panics if `id` was not produced by this formatter.
    pub fn name(&self, id: VarId) -> &str {
        &self.names[id as usize]
    }

    /// Returns the one-cell expression for the variable `name`, interning it if it is new.
    pub fn variable(&mut self, name: &str) -> OwnedExpression {
        let id = match self.ids.get(name) {
            Some(&id) => id,
            None => {
                let id = self.names.len() as VarId;
                self.names.push(name.to_owned());
                self.ids.insert(name.to_owned(), id);
                id
            }
        };
        OwnedExpression::new_variable(id, seed(name))
    }

    /// Parses a whole line as a single formula. Surrounding whitespace is ignored, anything else
    /// left over is an error.
    ///
    /// # Example
    /// ```
    /// use attoprop::{Formatter, error::ParseError};
    ///
    /// let mut fmt = Formatter::new();
    /// assert_eq!(
    ///     fmt.parse_expression("A &"),
    ///     Err(ParseError::Expected { column: 4, expected: "variable, `!` or `(`" })
    /// );
    /// assert_eq!(
    ///     fmt.parse_expression("A) "),
    ///     Err(ParseError::Unexpected { column: 2, found: ')' })
    /// );
    /// ```
    pub fn parse_expression(&mut self, input: &str) -> Result<OwnedExpression, ParseError> {
        let (rest, expr) = self
            .implication(input)
            .map_err(|e| parse_error(input, e))?;
        finish(input, rest)?;
        Ok(expr)
    }

    /// Parses a line of the form `H1, H2, ... |- C`. The list of hypotheses may be empty.
    ///
    /// # Example
    /// ```
    /// use attoprop::Formatter;
    ///
    /// let mut fmt = Formatter::new();
    /// let sequent = fmt.parse_sequent("A, A -> B |- B").unwrap();
    /// assert_eq!(sequent.hypotheses.len(), 2);
    /// assert_eq!(sequent.conclusion, fmt.parse_expression("B").unwrap());
    ///
    /// let sequent = fmt.parse_sequent("|- A | !A").unwrap();
    /// assert!(sequent.hypotheses.is_empty());
    /// ```
    pub fn parse_sequent(&mut self, input: &str) -> Result<Sequent, ParseError> {
        let mut hypotheses = Vec::new();
        let mut rest = input;
        if token("|-")(rest).is_err() {
            loop {
                let (r, hypothesis) = self.implication(rest).map_err(|e| parse_error(input, e))?;
                hypotheses.push(hypothesis);
                rest = r;
                match token(",")(rest) {
                    Ok((r, _)) => rest = r,
                    Err(_) => break,
                }
            }
        }
        let (rest, _) = context("`,` or `|-`", token("|-"))(rest)
            .map_err(|e| parse_error(input, e))?;
        let (rest, conclusion) = self.implication(rest).map_err(|e| parse_error(input, e))?;
        finish(input, rest)?;
        Ok(Sequent {
            hypotheses,
            conclusion,
        })
    }

    fn implication<'a>(&mut self, input: &'a str) -> ParseResult<'a, OwnedExpression> {
        let (input, left) = self.disjunction(input)?;
        match token("->")(input) {
            Ok((input, _)) => {
                let (input, right) = self.implication(input)?;
                Ok((input, implies(&left, &right)))
            }
            Err(nom::Err::Error(_)) => Ok((input, left)),
            Err(e) => Err(e),
        }
    }

    fn disjunction<'a>(&mut self, input: &'a str) -> ParseResult<'a, OwnedExpression> {
        self.left_associative(input, Operator::Or, disjunction_token, Self::conjunction)
    }

    fn conjunction<'a>(&mut self, input: &'a str) -> ParseResult<'a, OwnedExpression> {
        self.left_associative(input, Operator::And, token("&"), Self::negation)
    }

    fn left_associative<'a>(
        &mut self,
        input: &'a str,
        op: Operator,
        mut separator: impl FnMut(&'a str) -> ParseResult<'a, &'a str>,
        operand: fn(&mut Self, &'a str) -> ParseResult<'a, OwnedExpression>,
    ) -> ParseResult<'a, OwnedExpression> {
        let (mut input, mut acc) = operand(self, input)?;
        loop {
            match separator(input) {
                Ok((rest, _)) => {
                    let (rest, right) = operand(self, rest)?;
                    acc = OwnedExpression::new_operator(op, &[acc.cells(), right.cells()]);
                    input = rest;
                }
                Err(nom::Err::Error(_)) => return Ok((input, acc)),
                Err(e) => return Err(e),
            }
        }
    }

    fn negation<'a>(&mut self, input: &'a str) -> ParseResult<'a, OwnedExpression> {
        if let Ok((input, _)) = token("!")(input) {
            let (input, operand) = self.negation(input)?;
            return Ok((input, negate(&operand)));
        }
        if let Ok((input, _)) = token("(")(input) {
            let (input, inner) = self.implication(input)?;
            let (input, _) = context("`)`", token(")"))(input)?;
            return Ok((input, inner));
        }
        let (input, name) = context(
            "variable, `!` or `(`",
            preceded(
                multispace0,
                recognize(pair(
                    satisfy(|c| c.is_ascii_uppercase()),
                    take_while(is_name_char),
                )),
            ),
        )(input)?;
        Ok((input, self.variable(name)))
    }

    pub fn format_expression<T: Borrow<[Cell]>>(&self, s: &mut String, expr: &Expression<T>) {
        match expr.symbol() {
            Symbol::Variable(id) => s.push_str(self.name(id)),
            Symbol::Operator(Operator::Not) => {
                s.push('!');
                self.format_expression(s, &expr.subexpression(1));
            }
            Symbol::Operator(op) => {
                let left = expr.subexpression(1);
                let right = expr.subexpression(1 + left.size());
                s.push('(');
                self.format_expression(s, &left);
                s.push(' ');
                s.push_str(op.symbol());
                s.push(' ');
                self.format_expression(s, &right);
                s.push(')');
            }
        }
    }

    pub fn expression_to_string<T: Borrow<[Cell]>>(&self, expr: &Expression<T>) -> String {
        let mut s = String::new();
        self.format_expression(&mut s, expr);
        s
    }

    /// Formats a sequent as `H1, H2 |- C`, or `|- C` without hypotheses.
    pub fn format_sequent(&self, s: &mut String, sequent: &Sequent) {
        for (i, hypothesis) in sequent.hypotheses.iter().enumerate() {
            if i > 0 {
                s.push_str(", ");
            }
            self.format_expression(s, hypothesis);
        }
        if !sequent.hypotheses.is_empty() {
            s.push(' ');
        }
        s.push_str("|- ");
        self.format_expression(s, &sequent.conclusion);
    }

    /// Formats a line as `[n. <justification>] <formula>`, `n` being the 1-based line number.
    pub fn format_step(&self, s: &mut String, number: usize, step: &Step) {
        s.push('[');
        s.push_str(&number.to_string());
        s.push_str(". ");
        s.push_str(&step.justification.to_string());
        s.push_str("] ");
        self.format_expression(s, &step.expression);
    }

    /// Formats the sequent followed by every line of the proof, one per line.
    pub fn format_proof(&self, s: &mut String, proof: &AnnotatedProof) {
        self.format_sequent(s, &proof.sequent);
        s.push('\n');
        for (i, step) in proof.steps.iter().enumerate() {
            self.format_step(s, i + 1, step);
            s.push('\n');
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::Formula;

    fn show(fmt: &mut Formatter, input: &str) -> String {
        let e = fmt.parse_expression(input).unwrap();
        fmt.expression_to_string(&e)
    }

    #[test]
    fn precedence() {
        let mut fmt = Formatter::new();
        assert_eq!(show(&mut fmt, "A & B | C"), "((A & B) | C)");
        assert_eq!(show(&mut fmt, "A | B & C"), "(A | (B & C))");
        assert_eq!(show(&mut fmt, "!A & B"), "(!A & B)");
        assert_eq!(show(&mut fmt, "!(A & B)"), "!(A & B)");
        assert_eq!(show(&mut fmt, "A | B -> C"), "((A | B) -> C)");
    }

    #[test]
    fn associativity() {
        let mut fmt = Formatter::new();
        assert_eq!(show(&mut fmt, "A -> B -> C"), "(A -> (B -> C))");
        assert_eq!(show(&mut fmt, "A & B & C"), "((A & B) & C)");
        assert_eq!(show(&mut fmt, "A | B | C"), "((A | B) | C)");
        assert_eq!(show(&mut fmt, "!!A"), "!!A");
    }

    #[test]
    fn names_and_whitespace() {
        let mut fmt = Formatter::new();
        assert_eq!(show(&mut fmt, " \tP1'->Q'' \r\n"), "(P1' -> Q'')");
        assert_eq!(show(&mut fmt, "((AB))"), "AB");
        assert_eq!(fmt.variable_id("P1'"), Some(0));
        assert_eq!(fmt.variable_id("AB"), Some(2));
        assert_eq!(fmt.variable_id("C"), None);
        assert_eq!(fmt.name(1), "Q''");
    }

    #[test]
    fn same_name_same_expression() {
        let mut fmt = Formatter::new();
        let a = fmt.parse_expression("A").unwrap();
        let e = fmt.parse_expression("A -> A").unwrap();
        let (l, r) = e.split(Operator::Implies).unwrap();
        assert_eq!(l, a);
        assert_eq!(r, a);
        assert_eq!(l.cells(), a.cells());
    }

    #[test]
    fn syntax_errors() {
        let mut fmt = Formatter::new();
        assert_eq!(
            fmt.parse_expression("A&"),
            Err(ParseError::Expected {
                column: 3,
                expected: "variable, `!` or `(`"
            })
        );
        assert_eq!(
            fmt.parse_expression("(A | B"),
            Err(ParseError::Expected {
                column: 7,
                expected: "`)`"
            })
        );
        assert_eq!(
            fmt.parse_expression("A $ B"),
            Err(ParseError::Unexpected {
                column: 3,
                found: '$'
            })
        );
        assert_eq!(
            fmt.parse_expression("a"),
            Err(ParseError::Expected {
                column: 1,
                expected: "variable, `!` or `(`"
            })
        );
        assert!(fmt.parse_expression("").is_err());
        assert!(fmt.parse_expression("A -> ").is_err());
        assert!(fmt.parse_expression("A B").is_err());
        assert!(fmt.parse_expression("()").is_err());
    }

    #[test]
    fn sequents() {
        let mut fmt = Formatter::new();
        let sequent = fmt.parse_sequent("A | B, !A |- B").unwrap();
        let mut s = String::new();
        fmt.format_sequent(&mut s, &sequent);
        assert_eq!(s, "(A | B), !A |- B");

        let sequent = fmt.parse_sequent("  |- A -> A").unwrap();
        let mut s = String::new();
        fmt.format_sequent(&mut s, &sequent);
        assert_eq!(s, "|- (A -> A)");

        assert_eq!(
            fmt.parse_sequent("A B |- C"),
            Err(ParseError::Expected {
                column: 3,
                expected: "`,` or `|-`"
            })
        );
        assert!(fmt.parse_sequent("A |- ").is_err());
        assert!(fmt.parse_sequent("A |- B C").is_err());
    }

    quickcheck! {
        fn printed_form_parses_back(f: Formula) -> bool {
            let mut fmt = Formatter::new();
            let e = fmt.parse_expression(&f.0).unwrap();
            let printed = fmt.expression_to_string(&e);
            let e2 = fmt.parse_expression(&printed).unwrap();
            printed == f.0 && e2 == e && e2.cells() == e.cells()
        }
    }
}
