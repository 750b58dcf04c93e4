pub mod error;
pub mod serde;
pub mod types;

pub use error::{LogError, Result};
