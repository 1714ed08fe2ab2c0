//! Errors raised while preparing operands and computing Minkowski sums

/// Every condition the Minkowski pipeline can report.
///
/// Two of the variants are *diagnostics*: [`MinkowskiError::DegenerateTriangle`] and
/// [`MinkowskiError::EmptyHullInput`] are collected alongside a successful result and
/// never abort a computation. The kernel failures (decomposition, hull, union and
/// invalid meshes produced mid-pipeline) abort the fast path and hand control to the
/// exact fallback; see [`MinkowskiError::triggers_fallback`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MinkowskiError {
    /// (DegenerateTriangle) A triangle collapsed onto repeated vertex indices and was dropped
    #[error("(DegenerateTriangle) triangle {triangle} collapsed to indices {indices:?}")]
    DegenerateTriangle { triangle: usize, indices: [usize; 3] },

    /// (EmptyHullInput) A part pair produced too few points to span a volume
    #[error("(EmptyHullInput) pair {pair:?} produced only {points} point(s)")]
    EmptyHullInput { pair: (usize, usize), points: usize },

    /// (Decomposition) The convex decomposer could not split a non-convex mesh
    #[error("(Decomposition) convex decomposition failed: {0}")]
    Decomposition(String),

    /// (Hull) The convex hull capability rejected a point cloud
    #[error("(Hull) convex hull failed: {0}")]
    Hull(String),

    /// (Union) The boolean kernel failed to union the partial sums
    #[error("(Union) boolean union failed: {0}")]
    Union(String),

    /// (InvalidIndexedMesh) An index is out of range or a face repeats an index
    #[error("(InvalidIndexedMesh) {0}")]
    InvalidIndexedMesh(String),

    /// (MalformedTriangleStream) A flat coordinate buffer is not a whole number of triangles
    #[error("(MalformedTriangleStream) {len} coordinates is not a multiple of 9")]
    MalformedTriangleStream { len: usize },

    /// (InvalidTriangulation) A face triangulation references a missing node
    #[error("(InvalidTriangulation) {0}")]
    InvalidTriangulation(String),

    /// (TooFewOperands) An n-ary sum needs at least two operands
    #[error("(TooFewOperands) minkowski sum needs at least 2 operands, got {0}")]
    TooFewOperands(usize),

    /// (DeadlineExceeded) The configured time budget ran out on the fast path
    #[error("(DeadlineExceeded) fast path exceeded its time budget")]
    DeadlineExceeded,

    /// (Fallback) The exact fallback failed after the fast path had already failed
    #[error("(Fallback) exact fallback failed after `{cause}`: {source}")]
    Fallback {
        cause: Box<MinkowskiError>,
        #[source]
        source: Box<MinkowskiError>,
    },
}

impl MinkowskiError {
    /// Whether this error, raised on the fast path, hands over to the exact fallback.
    pub const fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            MinkowskiError::Decomposition(_)
                | MinkowskiError::Hull(_)
                | MinkowskiError::Union(_)
                | MinkowskiError::InvalidIndexedMesh(_)
        )
    }

    pub(crate) fn decomposition(msg: impl Into<String>) -> Self {
        MinkowskiError::Decomposition(msg.into())
    }

    pub(crate) fn hull(msg: impl Into<String>) -> Self {
        MinkowskiError::Hull(msg.into())
    }

    pub(crate) fn union(msg: impl Into<String>) -> Self {
        MinkowskiError::Union(msg.into())
    }

    pub(crate) fn invalid_mesh(msg: impl Into<String>) -> Self {
        MinkowskiError::InvalidIndexedMesh(msg.into())
    }
}
