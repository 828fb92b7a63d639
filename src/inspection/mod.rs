//! Per-item inspection state machine.
//!
//! Every item starts `pending`; a reviewer moves it to `pass` or `fail` and
//! may flip between the two any number of times.

mod judgment;
mod session;
#[cfg(test)]
mod tests;

pub use judgment::{Outcome, SimilarityJudgment};
pub use session::{Draft, InspectionSession, SavedItem, SavedSession, resume};
