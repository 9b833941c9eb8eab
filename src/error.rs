use thiserror::Error;

/// A error which is produced when text is not a well-formed formula or sequent
///
/// Columns are 1-based character offsets into the parsed line.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("syntax error at column {column}: expected {expected}")]
    Expected {
        column: usize,
        expected: &'static str,
    },
    #[error("syntax error at column {column}: unexpected {found:?}")]
    Unexpected { column: usize, found: char },
}

impl ParseError {
    pub fn column(&self) -> usize {
        match self {
            ParseError::Expected { column, .. } | ParseError::Unexpected { column, .. } => *column,
        }
    }
}

/// A error which is produced when checking a proof that does not prove its sequent
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ProofError {
    #[error("proof is empty")]
    Empty,
    /// The 1-based number of the first line that is neither a hypothesis, an axiom nor follows
    /// by modus ponens
    #[error("line {0} is not justified")]
    Unjustified(usize),
    #[error("last line does not match the conclusion")]
    ConclusionMismatch,
}

/// A error which is produced when no proof can be synthesized for a formula
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SynthesisError {
    #[error("formula has {0} distinct variables, at most {max} are supported", max = crate::types::MAX_VARIABLES)]
    TooManyVariables(usize),
    #[error("no set of hypotheses makes the formula or its negation valid")]
    NoHypotheses,
}
