//! Emission targets.
//!
//! One module per target language. TypeScript is the only target today; the
//! shape/group/registry model it renders is target-neutral.

pub mod typescript;
