use crate::math::{Matrix4, Vector3};

/// One per-instance translation; `dz` is always 0 in this design.
pub type InstanceOffset = Vector3;

/// A uniform grid of instances centered on the origin.
#[derive(Debug, Clone, Copy)]
pub struct GridSpec {
    /// Number of grid rows.
    pub rows: usize,
    /// Number of grid columns.
    pub cols: usize,
    /// Spacing between rows.
    pub spacing_x: f64,
    /// Spacing between columns.
    pub spacing_y: f64,
}

/// Computes per-instance offsets for a grid of copies of one base
/// solid/edge-set pair.
///
/// The offset sequence is the single source of truth for instance order:
/// the renderer must feed the same index into the solid's transform array
/// and the edge set's offset array, or the two visual layers diverge.
pub struct BuildGrid {
    spec: GridSpec,
}

impl BuildGrid {
    /// Creates a new `BuildGrid` operation.
    #[must_use]
    pub fn new(spec: GridSpec) -> Self {
        Self { spec }
    }

    /// Executes the grid construction, returning exactly `rows * cols`
    /// offsets: outer loop over the row index, inner over the column
    /// index, both ranging symmetrically about zero.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    pub fn execute(&self) -> Vec<InstanceOffset> {
        let rows = self.spec.rows as i64;
        let cols = self.spec.cols as i64;
        let mut offsets = Vec::with_capacity(self.spec.rows * self.spec.cols);
        for r in 0..rows {
            let i = r - rows / 2;
            for c in 0..cols {
                let j = c - cols / 2;
                offsets.push(Vector3::new(
                    j as f64 * self.spec.spacing_y,
                    i as f64 * self.spec.spacing_x,
                    0.0,
                ));
            }
        }
        offsets
    }

    /// Maps centered grid indices back to the position in the offset
    /// sequence: `(i + rows / 2) * cols + (j + cols / 2)`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn linear_index(&self, i: i64, j: i64) -> usize {
        let rows = self.spec.rows as i64;
        let cols = self.spec.cols as i64;
        ((i + rows / 2) * cols + (j + cols / 2)) as usize
    }

    /// The same offsets as homogeneous translation matrices, for renderers
    /// that take per-instance transforms rather than raw offset vectors.
    #[must_use]
    pub fn transforms(&self) -> Vec<Matrix4> {
        self.execute().iter().map(Matrix4::new_translation).collect()
    }
}
