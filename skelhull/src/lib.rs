//! Convex collider decomposition for skinned meshes.
//!
//! A skinned mesh is split into one convex part per anchor bone; every part is rigidly bound
//! to its bone so the colliders follow the animated skeleton. Scene import, rendering and
//! the external static-mesh decomposer live outside this crate.

#![forbid(unsafe_code)]

mod builder;
mod decompose;
mod error;
mod export;
mod geometry;
mod model;
mod params;
mod runtime;

#[cfg(feature = "json")]
pub mod json;

pub use builder::*;
pub use decompose::*;
pub use error::*;
pub use export::*;
pub use geometry::*;
pub use model::*;
pub use params::*;
pub use runtime::*;

#[cfg(test)]
mod test_support;




#[cfg(test)]
mod export_tests;
