pub mod classifier;
pub mod error;
pub mod protocol;
pub mod selection;
pub mod workspace;

pub use error::TetherError;
