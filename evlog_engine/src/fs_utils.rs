mod functions;
mod session_dir;

pub use functions::*;
pub use session_dir::*;
