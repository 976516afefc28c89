//! Composed scoring engines.
//!
//! Each engine combines the lexical analyzer, risk classifier and
//! recommendation rules into a domain-specific report:
//! - [`TestCaseEngine`]: test strategy for a feature description
//! - [`QnaEngine`]: advisory answer for a domain question
//! - [`PmEngine`]: project feasibility forecast
//!
//! Engines are pure: they never touch the store.

mod pm;
mod qna;
mod testcase;

pub use pm::*;
pub use qna::*;
pub use testcase::*;
