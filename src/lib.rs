pub mod edges;
pub mod error;
pub mod extrude;
pub mod grid;
pub mod ingest;
pub mod math;
pub mod mesh;

pub use error::{MassingError, Result};
