//! Command model, loading, recognition, and dispatch
//!
//! The dispatch pipeline: declarative documents load into an immutable
//! registry with a derived alias index, utterances are fuzzy-matched
//! against that index, and the winning command executes through one
//! polymorphic contract.

mod dispatcher;
mod loader;
mod model;
mod recognizer;
mod registry;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use loader::Loader;
pub use model::{Command, Variant};
pub use recognizer::{Recognition, Recognizer};
pub use registry::{AliasIndex, CommandRegistry};
