mod array;
mod element_type;
mod event;
mod nd_array;
mod value;

#[cfg(feature = "ndarray")]
mod ndarray_ext;

pub use array::*;
pub use element_type::*;
pub use event::*;
pub use nd_array::*;
pub use value::*;
