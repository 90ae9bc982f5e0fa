use std::cmp::Ordering;

use crate::math::{Point3, Vector3, TOLERANCE};

/// A triangulated solid produced by extrusion.
///
/// Immutable once built: when inputs change the mesh is regenerated, never
/// patched in place, so a consumer holding a reference can never observe a
/// half-updated shape.
#[derive(Debug, Clone, Default)]
pub struct SolidMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl SolidMesh {
    /// Number of vertices in the mesh.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles in the mesh.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Unit normal of a triangle, or `None` if the triangle is degenerate.
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Option<Vector3> {
        let tri = self.indices.get(face)?;
        let a = self.vertices[tri[0] as usize];
        let b = self.vertices[tri[1] as usize];
        let c = self.vertices[tri[2] as usize];
        let normal = (b - a).cross(&(c - a));
        let len = normal.norm();
        if len < TOLERANCE {
            return None;
        }
        Some(normal / len)
    }

    /// Appends another mesh, rebasing its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &SolidMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|tri| [tri[0] + base, tri[1] + base, tri[2] + base]),
        );
    }
}

/// The wireframe line segments derived from a [`SolidMesh`].
///
/// Segment order is not significant; use [`EdgeSet::canonical_segments`]
/// for order-independent comparison.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    /// One line segment per feature edge of the source solid.
    pub segments: Vec<[Point3; 2]>,
}

impl EdgeSet {
    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if no segments were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments with endpoints ordered and the list sorted, so two edge
    /// sets can be compared as sets.
    #[must_use]
    pub fn canonical_segments(&self) -> Vec<[Point3; 2]> {
        let mut canonical: Vec<[Point3; 2]> = self
            .segments
            .iter()
            .map(|seg| {
                if cmp_points(&seg[0], &seg[1]) == Ordering::Greater {
                    [seg[1], seg[0]]
                } else {
                    [seg[0], seg[1]]
                }
            })
            .collect();
        canonical.sort_by(|a, b| cmp_points(&a[0], &b[0]).then(cmp_points(&a[1], &b[1])));
        canonical
    }
}

fn cmp_points(a: &Point3, b: &Point3) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.z.total_cmp(&b.z))
}
