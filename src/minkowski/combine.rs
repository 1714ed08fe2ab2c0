//! Pairwise Minkowski sums of convex parts.
//!
//! For convex `P` and `Q`, `P ⊕ Q` is the convex hull of all vertex sums
//! `p + q`. Every pair of parts (one from each operand) yields one convex
//! partial sum; their union is the sum of the operands.

use crate::errors::MinkowskiError;
use crate::indexed::IndexedMesh;
use crate::minkowski::config::{Deadline, MinkowskiConfig};
use crate::minkowski::hull::strict_points;
use crate::minkowski::traits::ConvexHull;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result part list plus the pairs that were skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct Combined {
    /// One convex hull per non-degenerate pair, in pair order (`a` major).
    pub parts: Vec<IndexedMesh>,
    /// [`MinkowskiError::EmptyHullInput`] for every skipped pair.
    pub skipped: Vec<MinkowskiError>,
    /// Pairs examined, `parts_a.len() * parts_b.len()`.
    pub pairs: usize,
}

enum PairSum {
    Part(IndexedMesh),
    Skipped(MinkowskiError),
}

/// Combine every part of `A` with every part of `B`.
///
/// Per pair: build the `|A|·|B|` vertex-sum cloud; skip the pair when it has
/// three points or fewer; otherwise hull it, keep only the strictly extreme
/// hull vertices and hull those again. When fewer than four strict points
/// survive, the first hull is used as is. A hull failure aborts the whole
/// combination.
pub fn combine(
    parts_a: &[IndexedMesh],
    parts_b: &[IndexedMesh],
    hull: &dyn ConvexHull,
    config: &MinkowskiConfig,
    deadline: &Deadline,
) -> Result<Combined, MinkowskiError> {
    let pairs: Vec<(usize, usize)> = (0..parts_a.len())
        .flat_map(|i| (0..parts_b.len()).map(move |j| (i, j)))
        .collect();

    if pairs.len() > config.max_pairs {
        tracing::warn!(
            pairs = pairs.len(),
            max_pairs = config.max_pairs,
            parts_a = parts_a.len(),
            parts_b = parts_b.len(),
            "part pair count exceeds the configured limit; this may be slow"
        );
    }

    let run = |&(i, j): &(usize, usize)| -> Result<PairSum, MinkowskiError> {
        deadline.check()?;
        combine_pair(&parts_a[i], &parts_b[j], (i, j), hull)
    };

    #[cfg(feature = "parallel")]
    let sums: Vec<Result<PairSum, MinkowskiError>> = if config.parallel {
        pairs.par_iter().map(run).collect()
    } else {
        pairs.iter().map(run).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let sums: Vec<Result<PairSum, MinkowskiError>> = pairs.iter().map(run).collect();

    let mut combined = Combined {
        pairs: pairs.len(),
        ..Combined::default()
    };
    for sum in sums {
        match sum? {
            PairSum::Part(part) => combined.parts.push(part),
            PairSum::Skipped(diagnostic) => combined.skipped.push(diagnostic),
        }
    }

    tracing::debug!(
        pairs = combined.pairs,
        parts = combined.parts.len(),
        skipped = combined.skipped.len(),
        "combined convex part pairs"
    );
    Ok(combined)
}

fn combine_pair(
    a: &IndexedMesh,
    b: &IndexedMesh,
    pair: (usize, usize),
    hull: &dyn ConvexHull,
) -> Result<PairSum, MinkowskiError> {
    let cloud: Vec<_> = a
        .vertices()
        .iter()
        .flat_map(|pa| b.vertices().iter().map(move |pb| pa + pb.coords))
        .collect();

    if cloud.len() <= 3 {
        tracing::debug!(?pair, points = cloud.len(), "skipping pair with too few points");
        return Ok(PairSum::Skipped(MinkowskiError::EmptyHullInput {
            pair,
            points: cloud.len(),
        }));
    }

    let initial = hull.hull(&cloud)?;
    let strict = strict_points(&initial);
    if strict.len() < 4 {
        return Ok(PairSum::Part(initial));
    }
    if strict.len() == initial.vertices().len() {
        return Ok(PairSum::Part(initial));
    }
    Ok(PairSum::Part(hull.hull(&strict)?))
}
