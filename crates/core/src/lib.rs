// crates/core/src/lib.rs
pub mod events;
pub mod intent;
pub mod records;
pub mod result;
pub mod rules;

pub use events::*;
pub use intent::*;
pub use records::*;
pub use result::*;
pub use rules::{Predicate, Rule, RuleTable};
