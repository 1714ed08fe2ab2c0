//! Export of results to interchange formats.

mod stl;

pub use stl::to_stl_ascii;

#[cfg(feature = "stl-io")]
pub use stl::to_stl_binary;
