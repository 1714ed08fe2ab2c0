//! **Minkowski sums of triangulated solids**, computed by convex decomposition
//! with a decomposition-free exact fallback.
//!
//! A sum request takes two [operands](minkowski::Operand), each either an
//! [`IndexedMesh`] or a boundary-representation [`BrepSolid`](brep::BrepSolid),
//! and runs:
//!
//! 1. **extraction**: face triangulations are placed, oriented and flattened
//!    into a [`TriangleStream`](indexed::TriangleStream);
//! 2. **welding**: corners are merged into an indexed mesh (exact equality by
//!    default), dropping triangles that collapse;
//! 3. **classification**: a local edge test decides whether an operand is
//!    (weakly) convex;
//! 4. **decomposition**: non-convex operands are split into convex parts;
//! 5. **combination**: every pair of parts is summed as the hull of its
//!    vertex sums;
//! 6. **assembly**: the partial sums are unioned on a [BSP](mesh::bsp) tree.
//!
//! Any kernel failure in steps 4–6 reruns the request once on an exact
//! algorithm; see [`Minkowski::sum`].
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): binary `.stl` export
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for the part-pair loop and the union reduction

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod brep;
pub mod errors;
pub mod float_types;
pub mod indexed;
pub mod io;
pub mod mesh;
pub mod minkowski;
pub mod traits;
pub mod triangulated;

#[cfg(any(
    all(feature = "f64", feature = "f32"),
    not(any(feature = "f64", feature = "f32"))
))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::MinkowskiError;
pub use indexed::IndexedMesh;
pub use mesh::Mesh;
pub use minkowski::{Minkowski, MinkowskiConfig, Operand, Outcome, SumPath, SumStats};
pub use traits::CSGOps;
