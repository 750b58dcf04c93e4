mod event_reader;
mod event_writer;
mod frame;
pub mod fs_utils;
mod header;

pub use event_reader::*;
pub use event_writer::*;
pub use frame::*;
pub use header::*;

pub use evlog_types::{LogError, Result};
