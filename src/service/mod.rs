//! Domain logic on top of the store: forest assembly, snapshot
//! merge/export and batch reordering. Handlers stay thin; anything
//! with rules of its own lives here.

pub mod forest;
pub mod import;
pub mod ordering;

pub use forest::{GroupNode, assemble};
