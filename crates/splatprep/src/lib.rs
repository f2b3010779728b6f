#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use splatprep_3d as k3d;

#[doc(inline)]
pub use splatprep_render as render;

#[doc(inline)]
pub use splatprep_export as export;
