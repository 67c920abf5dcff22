//! Convenience re-exports of the crate's traits.

pub use crate::attack::{Checker, Verdict};
pub use crate::sink::Sink;
pub use crate::source::Source;
