pub mod error;
pub mod graph;
pub mod types;

pub use error::{AdventureError, ErrorKind};
pub use graph::*;
pub use types::*;
