//! Minkowski sums of triangulated solids.
//!
//! The fast path turns each operand into an [`IndexedMesh`], splits non-convex
//! operands into convex parts, sums every pair of parts as the hull of their
//! vertex sums and unions the partial sums. Any kernel failure on the way
//! (decomposition, hull, union, malformed mesh) hands the original operands
//! to an [`ExactMinkowski`] implementation once; its answer, good or bad, is
//! final.
//!
//! ```text
//! Start → Decompose(A) → Decompose(B) → Combine → Assemble → Done
//!   any kernel error ───────────────────────────→ FallbackExact → Done
//! ```

use crate::brep::{BrepSolid, extract_triangles};
use crate::errors::MinkowskiError;
use crate::indexed::{Dedup, IndexedMesh, VertexMerge, deduplicate, is_weakly_convex};
use crate::mesh::Mesh;
use std::fmt::Debug;
use std::ops::AddAssign;

pub mod assemble;
pub mod combine;
pub mod config;
pub mod decompose;
pub mod fallback;
pub mod hull;
pub mod traits;

pub use assemble::{BspKernel, assemble};
pub use combine::{Combined, combine};
pub use config::{Deadline, MinkowskiConfig};
pub use decompose::{ReflexCutDecomposer, VhacdDecomposer, check_parts};
pub use fallback::TrianglePairMinkowski;
pub use hull::{ChullHull, strict_points};
pub use traits::{BooleanKernel, ConvexDecomposer, ConvexHull, ExactMinkowski};

/// One side of a Minkowski sum.
#[derive(Debug, Clone)]
pub enum Operand<S: Clone + Send + Sync + Debug> {
    /// Already a mesh; used as is.
    Indexed(IndexedMesh),
    /// A native solid; its face triangulations are extracted and welded first.
    Solid(BrepSolid<S>),
}

impl<S: Clone + Send + Sync + Debug> Operand<S> {
    /// Indexed form of the operand plus any triangles dropped while welding.
    pub fn to_indexed(&self, merge: VertexMerge) -> Dedup {
        match self {
            Operand::Indexed(mesh) => Dedup {
                mesh: mesh.clone(),
                diagnostics: Vec::new(),
            },
            Operand::Solid(solid) => deduplicate(&extract_triangles(solid), merge),
        }
    }

    pub fn metadata(&self) -> Option<S> {
        match self {
            Operand::Indexed(_) => None,
            Operand::Solid(solid) => solid.metadata.clone(),
        }
    }
}

impl<S: Clone + Send + Sync + Debug> From<IndexedMesh> for Operand<S> {
    fn from(mesh: IndexedMesh) -> Self {
        Operand::Indexed(mesh)
    }
}

impl<S: Clone + Send + Sync + Debug> From<BrepSolid<S>> for Operand<S> {
    fn from(solid: BrepSolid<S>) -> Self {
        Operand::Solid(solid)
    }
}

impl<S: Clone + Send + Sync + Debug> From<Mesh<S>> for Operand<S> {
    fn from(mesh: Mesh<S>) -> Self {
        Operand::Solid(BrepSolid::from_mesh(&mesh))
    }
}

/// Which algorithm produced an [`Outcome`].
#[derive(Debug, Clone, PartialEq)]
pub enum SumPath {
    /// Convex decomposition and pairwise hulls.
    Decomposed,
    /// The exact fallback, after the fast path failed with `cause`.
    Exact { cause: MinkowskiError },
}

/// Per-stage counters. For [`Minkowski::sum_all`] they are totals over every
/// step of the fold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SumStats {
    pub parts_a: usize,
    pub parts_b: usize,
    pub pairs: usize,
    pub skipped_pairs: usize,
    pub dropped_triangles: usize,
    /// Partial sums handed to the assembler.
    pub result_parts: usize,
}

impl AddAssign for SumStats {
    fn add_assign(&mut self, rhs: Self) {
        self.parts_a += rhs.parts_a;
        self.parts_b += rhs.parts_b;
        self.pairs += rhs.pairs;
        self.skipped_pairs += rhs.skipped_pairs;
        self.dropped_triangles += rhs.dropped_triangles;
        self.result_parts += rhs.result_parts;
    }
}

/// A computed sum. `solid` may be empty.
#[derive(Debug, Clone)]
pub struct Outcome<S: Clone + Send + Sync + Debug> {
    pub solid: Mesh<S>,
    pub path: SumPath,
    pub stats: SumStats,
    /// [`MinkowskiError::DegenerateTriangle`] and
    /// [`MinkowskiError::EmptyHullInput`] conditions met on the way.
    pub diagnostics: Vec<MinkowskiError>,
}

impl<S: Clone + Send + Sync + Debug> Outcome<S> {
    pub const fn fell_back(&self) -> bool {
        matches!(self.path, SumPath::Exact { .. })
    }
}

/// Minkowski sum controller: a configuration plus the four capabilities the
/// pipeline delegates to.
pub struct Minkowski<S: Clone + Send + Sync + Debug> {
    pub config: MinkowskiConfig,
    decomposer: Box<dyn ConvexDecomposer>,
    hull: Box<dyn ConvexHull>,
    kernel: Box<dyn BooleanKernel<S>>,
    exact: Box<dyn ExactMinkowski<S>>,
}

impl<S: Clone + Send + Sync + Debug + 'static> Default for Minkowski<S> {
    fn default() -> Self {
        Minkowski::new(MinkowskiConfig::default())
    }
}

impl<S: Clone + Send + Sync + Debug> Debug for Minkowski<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Minkowski")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: Clone + Send + Sync + Debug + 'static> Minkowski<S> {
    /// Controller with the shipped capabilities: reflex-edge cuts, QuickHull,
    /// the BSP union and the triangle-pair exact sum.
    pub fn new(config: MinkowskiConfig) -> Self {
        Minkowski {
            config,
            decomposer: Box::new(ReflexCutDecomposer::default()),
            hull: Box::new(ChullHull::default()),
            kernel: Box::new(BspKernel),
            exact: Box::new(TrianglePairMinkowski::default()),
        }
    }
}

impl<S: Clone + Send + Sync + Debug> Minkowski<S> {
    pub fn with_decomposer(mut self, decomposer: impl ConvexDecomposer + 'static) -> Self {
        self.decomposer = Box::new(decomposer);
        self
    }

    pub fn with_hull(mut self, hull: impl ConvexHull + 'static) -> Self {
        self.hull = Box::new(hull);
        self
    }

    pub fn with_kernel(mut self, kernel: impl BooleanKernel<S> + 'static) -> Self {
        self.kernel = Box::new(kernel);
        self
    }

    pub fn with_exact(mut self, exact: impl ExactMinkowski<S> + 'static) -> Self {
        self.exact = Box::new(exact);
        self
    }

    /// `a ⊕ b`.
    ///
    /// Returns the fast-path result when every stage succeeds. A kernel
    /// failure (see [`MinkowskiError::triggers_fallback`]) runs the exact
    /// capability once; if that fails too, the result is
    /// [`MinkowskiError::Fallback`] carrying both errors. Running out of the
    /// configured time budget is returned as is unless
    /// [`MinkowskiConfig::fallback_on_deadline`] is set.
    pub fn sum(&self, a: &Operand<S>, b: &Operand<S>) -> Result<Outcome<S>, MinkowskiError> {
        let clock = self.config.start_clock();
        let mut stats = SumStats::default();
        let mut diagnostics = Vec::new();

        match self.fast_path(a, b, &clock, &mut stats, &mut diagnostics) {
            Ok(solid) => Ok(Outcome {
                solid,
                path: SumPath::Decomposed,
                stats,
                diagnostics,
            }),
            Err(cause) if self.falls_back_on(&cause) => {
                tracing::warn!(error = %cause, "fast minkowski path failed, running exact fallback");
                match self.exact.minkowski(a, b) {
                    Ok(solid) => Ok(Outcome {
                        solid,
                        path: SumPath::Exact { cause },
                        stats,
                        diagnostics,
                    }),
                    Err(source) => Err(MinkowskiError::Fallback {
                        cause: Box::new(cause),
                        source: Box::new(source),
                    }),
                }
            },
            Err(e) => Err(e),
        }
    }

    /// `((c0 ⊕ c1) ⊕ c2) ⊕ …`.
    ///
    /// Each intermediate solid re-enters the next step as an operand. Once a
    /// step falls back, its exact result seeds the rest of the fold, which
    /// then stays on the exact path.
    pub fn sum_all(&self, operands: &[Operand<S>]) -> Result<Outcome<S>, MinkowskiError> {
        let [first, second, rest @ ..] = operands else {
            return Err(MinkowskiError::TooFewOperands(operands.len()));
        };

        let mut acc = self.sum(first, second)?;
        if let SumPath::Exact { cause } = acc.path {
            return self.exact_fold(acc.solid, rest, cause, acc.stats, acc.diagnostics);
        }

        for (step, operand) in rest.iter().enumerate() {
            let lhs = Operand::from(acc.solid);
            let next = self.sum(&lhs, operand)?;
            let mut diagnostics = acc.diagnostics;
            diagnostics.extend(next.diagnostics);
            let mut stats = acc.stats;
            stats += next.stats;

            if let SumPath::Exact { cause } = next.path {
                tracing::warn!(
                    step = step + 2,
                    "n-ary minkowski fell back, finishing the fold exactly"
                );
                return self.exact_fold(next.solid, &rest[step + 1..], cause, stats, diagnostics);
            }

            acc = Outcome {
                solid: next.solid,
                path: SumPath::Decomposed,
                stats,
                diagnostics,
            };
        }
        Ok(acc)
    }

    /// Fold `remaining` onto `seed` with the exact capability alone.
    fn exact_fold(
        &self,
        seed: Mesh<S>,
        remaining: &[Operand<S>],
        cause: MinkowskiError,
        stats: SumStats,
        diagnostics: Vec<MinkowskiError>,
    ) -> Result<Outcome<S>, MinkowskiError> {
        let mut solid = seed;
        for operand in remaining {
            solid = self
                .exact
                .minkowski(&Operand::from(solid), operand)
                .map_err(|source| MinkowskiError::Fallback {
                    cause: Box::new(cause.clone()),
                    source: Box::new(source),
                })?;
        }

        Ok(Outcome {
            solid,
            path: SumPath::Exact { cause },
            stats,
            diagnostics,
        })
    }

    fn falls_back_on(&self, error: &MinkowskiError) -> bool {
        error.triggers_fallback()
            || (self.config.fallback_on_deadline && *error == MinkowskiError::DeadlineExceeded)
    }

    fn fast_path(
        &self,
        a: &Operand<S>,
        b: &Operand<S>,
        clock: &Deadline,
        stats: &mut SumStats,
        diagnostics: &mut Vec<MinkowskiError>,
    ) -> Result<Mesh<S>, MinkowskiError> {
        let mesh_a = a.to_indexed(self.config.vertex_merge);
        let mesh_b = b.to_indexed(self.config.vertex_merge);
        stats.dropped_triangles = mesh_a.dropped() + mesh_b.dropped();
        diagnostics.extend(mesh_a.diagnostics);
        diagnostics.extend(mesh_b.diagnostics);
        clock.check()?;

        let parts_a = self.convex_parts(mesh_a.mesh, "a")?;
        clock.check()?;
        let parts_b = self.convex_parts(mesh_b.mesh, "b")?;
        clock.check()?;
        stats.parts_a = parts_a.len();
        stats.parts_b = parts_b.len();

        let combined = combine(&parts_a, &parts_b, self.hull.as_ref(), &self.config, clock)?;
        stats.pairs = combined.pairs;
        stats.skipped_pairs = combined.skipped.len();
        stats.result_parts = combined.parts.len();
        diagnostics.extend(combined.skipped);
        clock.check()?;

        assemble(&combined.parts, self.kernel.as_ref(), a.metadata())
    }

    /// A weakly convex operand is its own single part.
    fn convex_parts(&self, mesh: IndexedMesh, side: &str) -> Result<Vec<IndexedMesh>, MinkowskiError> {
        if is_weakly_convex(&mesh, self.config.convexity_tolerance) {
            tracing::debug!(side, faces = mesh.faces().len(), "operand is convex");
            return Ok(vec![mesh]);
        }
        let parts = self.decomposer.decompose(&mesh)?;
        tracing::debug!(side, parts = parts.len(), "operand decomposed");
        Ok(parts)
    }
}
