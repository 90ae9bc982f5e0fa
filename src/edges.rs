use std::collections::BTreeMap;

use crate::mesh::{EdgeSet, SolidMesh};

/// Default crease angle in degrees. Wide enough to swallow floating-point
/// noise between coplanar triangles, far below any real feature angle.
pub const DEFAULT_CREASE_ANGLE_DEG: f64 = 1.0;

/// Derives the visible wireframe of a solid.
///
/// A mesh edge becomes a wireframe segment when it borders exactly one
/// face (boundary) or two faces whose normals differ by more than the
/// crease angle. Coplanar pairs — cap interiors, the two triangles of one
/// side-wall quad — are suppressed.
pub struct ExtractEdges {
    crease_angle_deg: f64,
}

impl ExtractEdges {
    /// Creates a new `ExtractEdges` operation with the given crease angle
    /// in degrees.
    #[must_use]
    pub fn new(crease_angle_deg: f64) -> Self {
        Self { crease_angle_deg }
    }

    /// Executes the extraction, returning the wireframe segments.
    ///
    /// Deterministic and side-effect-free: the same solid always yields
    /// the same segment set, in the same order.
    #[must_use]
    pub fn execute(&self, solid: &SolidMesh) -> EdgeSet {
        let threshold = self.crease_angle_deg.to_radians().cos();

        // Undirected edge -> adjacent faces. BTreeMap keeps the output
        // order stable across runs.
        let mut adjacency: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::new();
        for (face, tri) in solid.indices.iter().enumerate() {
            for i in 0..3 {
                let a = tri[i];
                let b = tri[(i + 1) % 3];
                let key = if a < b { (a, b) } else { (b, a) };
                adjacency.entry(key).or_default().push(face);
            }
        }

        let mut segments = Vec::new();
        for ((a, b), faces) in &adjacency {
            if is_feature_edge(solid, faces, threshold) {
                segments.push([
                    solid.vertices[*a as usize],
                    solid.vertices[*b as usize],
                ]);
            }
        }
        EdgeSet { segments }
    }
}

impl Default for ExtractEdges {
    fn default() -> Self {
        Self::new(DEFAULT_CREASE_ANGLE_DEG)
    }
}

fn is_feature_edge(solid: &SolidMesh, faces: &[usize], threshold: f64) -> bool {
    match faces {
        // Boundary edges stay visible.
        [_] => true,
        [first, second] => match (solid.face_normal(*first), solid.face_normal(*second)) {
            (Some(n0), Some(n1)) => n0.dot(&n1) < threshold,
            // A degenerate neighbor cannot vouch for coplanarity.
            _ => true,
        },
        // Non-manifold edges stay visible as well.
        _ => true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::extrude::{Extrude, ExtrudeSpec};
    use crate::math::{Point2, Point3, Polygon, TOLERANCE};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn unit_square_solid() -> SolidMesh {
        let square = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        Extrude::new(vec![square], ExtrudeSpec::default())
            .execute()
            .unwrap()
    }

    // ── Wireframe of a cube ────────────────────────────────────

    #[test]
    fn unit_cube_has_12_wireframe_segments() {
        let solid = unit_square_solid();
        let edges = ExtractEdges::default().execute(&solid);
        // 4 bottom + 4 top + 4 vertical; cap and wall-quad diagonals
        // suppressed.
        assert_eq!(edges.len(), 12);
    }

    #[test]
    fn cube_segments_are_axis_aligned_unit_edges() {
        let solid = unit_square_solid();
        let edges = ExtractEdges::default().execute(&solid);
        for seg in &edges.segments {
            let d = seg[1] - seg[0];
            assert!((d.norm() - 1.0).abs() < TOLERANCE, "segment {seg:?}");
            let axis_components = [d.x, d.y, d.z]
                .iter()
                .filter(|c| c.abs() > TOLERANCE)
                .count();
            assert_eq!(axis_components, 1, "segment {seg:?} is not axis-aligned");
        }
    }

    // ── Determinism ────────────────────────────────────────────

    #[test]
    fn extraction_is_deterministic() {
        let solid = unit_square_solid();
        let first = ExtractEdges::default().execute(&solid);
        let second = ExtractEdges::default().execute(&solid);
        assert_eq!(first.canonical_segments(), second.canonical_segments());
    }

    // ── Crease angle ───────────────────────────────────────────

    #[test]
    fn wide_crease_angle_suppresses_shallow_wall_joints() {
        // Regular hexagon: adjacent walls meet at 60° between normals.
        let hexagon: Polygon = (0..6)
            .map(|k| {
                let angle = std::f64::consts::TAU * f64::from(k) / 6.0;
                p(angle.cos(), angle.sin())
            })
            .collect();
        let solid = Extrude::new(vec![hexagon], ExtrudeSpec::default())
            .execute()
            .unwrap();

        let sharp = ExtractEdges::default().execute(&solid);
        assert_eq!(sharp.len(), 18); // 6 bottom + 6 top + 6 vertical

        let blunt = ExtractEdges::new(61.0).execute(&solid);
        assert_eq!(blunt.len(), 12); // vertical joints fall below the crease
    }

    // ── Boundary edges ─────────────────────────────────────────

    #[test]
    fn open_mesh_keeps_boundary_edges() {
        let lone_triangle = SolidMesh {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            indices: vec![[0, 1, 2]],
        };
        let edges = ExtractEdges::default().execute(&lone_triangle);
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn empty_solid_yields_no_edges() {
        let edges = ExtractEdges::default().execute(&SolidMesh::default());
        assert!(edges.is_empty());
    }
}
