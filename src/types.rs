/// Type alias for the structural fingerprint of an expression (see
/// [`Expression`][crate::Expression])
pub type Hash = u64;

/// Type alias for an interned variable name (see [`Formatter`][crate::Formatter])
pub type VarId = u32;

/// Most distinct variables a formula may contain before the hypothesis search refuses it
pub const MAX_VARIABLES: usize = 32;
