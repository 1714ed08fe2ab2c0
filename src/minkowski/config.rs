//! Tunables for a Minkowski computation.

use crate::errors::MinkowskiError;
use crate::float_types::{CONVEXITY_TOLERANCE, Real};
use crate::indexed::VertexMerge;
use std::time::{Duration, Instant};

/// Per-request configuration. Every field has a `with_*` setter.
#[derive(Debug, Clone, PartialEq)]
pub struct MinkowskiConfig {
    /// How operand triangle corners are welded. Exact by default.
    pub vertex_merge: VertexMerge,
    /// Squared plane distance a neighbouring apex may poke out before an edge
    /// counts as reflex.
    pub convexity_tolerance: Real,
    /// Part pairs above this count log a warning; they are still processed.
    pub max_pairs: usize,
    /// Process part pairs on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
    /// Time budget for the decomposition path.
    pub deadline: Option<Duration>,
    /// Whether running out of time hands over to the exact path instead of
    /// returning [`MinkowskiError::DeadlineExceeded`].
    pub fallback_on_deadline: bool,
}

impl Default for MinkowskiConfig {
    fn default() -> Self {
        MinkowskiConfig {
            vertex_merge: VertexMerge::Exact,
            convexity_tolerance: CONVEXITY_TOLERANCE,
            max_pairs: 4096,
            parallel: cfg!(feature = "parallel"),
            deadline: None,
            fallback_on_deadline: false,
        }
    }
}

impl MinkowskiConfig {
    pub fn with_vertex_merge(mut self, vertex_merge: VertexMerge) -> Self {
        self.vertex_merge = vertex_merge;
        self
    }

    pub fn with_convexity_tolerance(mut self, squared: Real) -> Self {
        self.convexity_tolerance = squared;
        self
    }

    pub fn with_max_pairs(mut self, max_pairs: usize) -> Self {
        self.max_pairs = max_pairs;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_fallback_on_deadline(mut self, fallback: bool) -> Self {
        self.fallback_on_deadline = fallback;
        self
    }

    pub(crate) fn start_clock(&self) -> Deadline {
        Deadline {
            started: Instant::now(),
            budget: self.deadline,
        }
    }
}

/// Cooperative time check, polled between stages and between pairs.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn unlimited() -> Self {
        Deadline {
            started: Instant::now(),
            budget: None,
        }
    }

    pub fn check(&self) -> Result<(), MinkowskiError> {
        match self.budget {
            Some(budget) if self.started.elapsed() > budget => Err(MinkowskiError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
