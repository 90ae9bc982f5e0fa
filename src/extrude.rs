use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::FixedFaceHandle;
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{ExtrudeError, Result};
use crate::math::polygon_2d::{cleaned_ring, signed_area};
use crate::math::{Point2, Point3, Polygon, TOLERANCE};
use crate::mesh::SolidMesh;

/// Settings for a straight extrusion along +Z.
#[derive(Debug, Clone, Copy)]
pub struct ExtrudeSpec {
    /// Extrusion depth; the solid spans z = 0 to z = depth.
    pub depth: f64,
    /// Carried for fidelity with the upstream settings object; bevels are
    /// not generated in this design.
    pub bevel: bool,
}

impl Default for ExtrudeSpec {
    fn default() -> Self {
        Self {
            depth: 1.0,
            bevel: false,
        }
    }
}

/// Extrudes one or more closed 2D contours into a compound solid.
///
/// Each contour is triangulated and extruded independently, then the
/// results are concatenated into one mesh — overlapping contours are not
/// unioned. Self-intersecting contours are a known limitation:
/// triangulation quality for them is undefined.
pub struct Extrude {
    polygons: Vec<Polygon>,
    spec: ExtrudeSpec,
}

impl Extrude {
    /// Creates a new `Extrude` operation.
    #[must_use]
    pub fn new(polygons: Vec<Polygon>, spec: ExtrudeSpec) -> Self {
        Self { polygons, spec }
    }

    /// Executes the extrusion, returning the compound solid.
    ///
    /// # Errors
    ///
    /// Returns [`ExtrudeError::InvalidDepth`] if the depth is not a
    /// positive finite number, and [`ExtrudeError::DegeneratePolygon`] if
    /// no contours are given or any contour has fewer than 3 distinct
    /// points or zero signed area.
    pub fn execute(&self) -> Result<SolidMesh> {
        if !(self.spec.depth.is_finite() && self.spec.depth > 0.0) {
            return Err(ExtrudeError::InvalidDepth(self.spec.depth).into());
        }
        if self.polygons.is_empty() {
            return Err(ExtrudeError::DegeneratePolygon("no contours given".into()).into());
        }

        let mut solid = SolidMesh::default();
        for (index, polygon) in self.polygons.iter().enumerate() {
            let prism = extrude_contour(index, polygon, self.spec.depth)?;
            solid.merge(&prism);
        }
        tracing::debug!(
            contours = self.polygons.len(),
            vertices = solid.vertex_count(),
            faces = solid.face_count(),
            "extrusion complete"
        );
        Ok(solid)
    }
}

/// Cap triangulation of one contour. Triangle entries index ring positions
/// `0..n` first, then Steiner vertices `n..`.
struct CapTriangulation {
    triangles: Vec<[usize; 3]>,
    steiner: Vec<Point2>,
}

/// Extrudes a single contour into a closed prism.
///
/// Vertex layout: bottom ring, top ring, then bottom/top pairs for any
/// Steiner vertices. Caps and walls share the ring vertices, so edge
/// adjacency between them is exact.
#[allow(clippy::cast_possible_truncation)]
fn extrude_contour(index: usize, polygon: &[Point2], depth: f64) -> Result<SolidMesh> {
    let mut ring = cleaned_ring(polygon);
    if ring.len() < 3 {
        return Err(ExtrudeError::DegeneratePolygon(format!(
            "contour {index} has fewer than 3 distinct points"
        ))
        .into());
    }
    let area = signed_area(&ring);
    if area.abs() < TOLERANCE {
        return Err(ExtrudeError::DegeneratePolygon(format!(
            "contour {index} has zero signed area"
        ))
        .into());
    }
    // Normalize to CCW so caps and walls wind outward.
    if area < 0.0 {
        ring.reverse();
    }

    let n = ring.len();
    let cap = triangulate_ring(&ring)?;

    let mut mesh = SolidMesh::default();
    mesh.vertices.reserve(2 * (n + cap.steiner.len()));
    for p in &ring {
        mesh.vertices.push(Point3::new(p.x, p.y, 0.0));
    }
    for p in &ring {
        mesh.vertices.push(Point3::new(p.x, p.y, depth));
    }
    for p in &cap.steiner {
        mesh.vertices.push(Point3::new(p.x, p.y, 0.0));
        mesh.vertices.push(Point3::new(p.x, p.y, depth));
    }

    // Ring slot k sits at k (bottom) and n + k (top); Steiner slot s >= n
    // sits at the appended pair (2s, 2s + 1).
    let bottom = |slot: usize| -> u32 {
        let vertex = if slot < n { slot } else { 2 * slot };
        vertex as u32
    };
    let top = |slot: usize| -> u32 {
        let vertex = if slot < n { n + slot } else { 2 * slot + 1 };
        vertex as u32
    };

    mesh.indices.reserve(2 * cap.triangles.len() + 2 * n);
    for tri in &cap.triangles {
        // Bottom cap faces -Z: reversed winding. Top cap keeps the CCW
        // triangulation winding and faces +Z.
        mesh.indices
            .push([bottom(tri[0]), bottom(tri[2]), bottom(tri[1])]);
        mesh.indices.push([top(tri[0]), top(tri[1]), top(tri[2])]);
    }
    for k in 0..n {
        let k1 = (k + 1) % n;
        // One quad per ring edge, outward for a CCW ring.
        mesh.indices.push([bottom(k), bottom(k1), top(k1)]);
        mesh.indices.push([bottom(k), top(k1), top(k)]);
    }

    Ok(mesh)
}

/// Triangulates the interior of a CCW ring using CDT.
fn triangulate_ring(ring: &[Point2]) -> Result<CapTriangulation> {
    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();

    let mut slot_of_handle: HashMap<usize, usize> = HashMap::new();
    let mut handles = Vec::with_capacity(ring.len());
    for (slot, p) in ring.iter().enumerate() {
        let handle = cdt.insert(SpadePoint2::new(p.x, p.y)).map_err(
            |e: InsertionError| ExtrudeError::TriangulationFailed(format!("CDT insert: {e}")),
        )?;
        slot_of_handle.entry(handle.index()).or_insert(slot);
        handles.push(handle);
    }
    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    let interior = interior_faces(&cdt);

    let mut steiner = Vec::new();
    let mut triangles = Vec::with_capacity(interior.len());
    for face in cdt.inner_faces() {
        if !interior.contains(&face.fix().index()) {
            continue;
        }
        let mut tri = [0usize; 3];
        for (i, vertex) in face.vertices().iter().enumerate() {
            let handle_index = vertex.fix().index();
            tri[i] = if let Some(&slot) = slot_of_handle.get(&handle_index) {
                slot
            } else {
                // Intersecting constraints introduce vertices beyond the ring.
                let position = vertex.position();
                let slot = ring.len() + steiner.len();
                slot_of_handle.insert(handle_index, slot);
                steiner.push(Point2::new(position.x, position.y));
                slot
            };
        }
        triangles.push(tri);
    }

    Ok(CapTriangulation { triangles, steiner })
}

/// Classifies which inner faces of the CDT are inside the ring using
/// flood-fill from the outer face. Each constraint edge crossed increments
/// the depth; odd depth = interior.
fn interior_faces(cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_of: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, u32)> = VecDeque::new();

    let outer = cdt.outer_face().fix();

    // Seed with inner faces adjacent to the outer face.
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let face_index = inner.fix().index();
            if depth_of.contains_key(&face_index) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_of.insert(face_index, depth);
            if depth % 2 == 1 {
                interior.insert(face_index);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face, depth)) = queue.pop_front() {
        for edge in cdt.face(face).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let face_index = neighbor.fix().index();
            if depth_of.contains_key(&face_index) {
                continue;
            }
            let next = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_of.insert(face_index, next);
            if next % 2 == 1 {
                interior.insert(face_index);
            }
            queue.push_back((neighbor.fix(), next));
        }
    }

    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MassingError;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn unit_square() -> Polygon {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]
    }

    fn depth(d: f64) -> ExtrudeSpec {
        ExtrudeSpec {
            depth: d,
            ..ExtrudeSpec::default()
        }
    }

    // ── Counts ─────────────────────────────────────────────────

    #[test]
    fn unit_square_counts() {
        let solid = Extrude::new(vec![unit_square()], depth(1.0))
            .execute()
            .unwrap();
        // 2N vertices, 2 caps of (N - 2) triangles each, 2N wall triangles.
        assert_eq!(solid.vertex_count(), 8);
        assert_eq!(solid.face_count(), 12);
    }

    #[test]
    fn triangle_prism_counts() {
        let tri = vec![p(0.0, 0.0), p(3.0, 0.0), p(1.5, 2.0)];
        let solid = Extrude::new(vec![tri], depth(3.0)).execute().unwrap();
        assert_eq!(solid.vertex_count(), 6);
        assert_eq!(solid.face_count(), 8); // 2 caps + 6 walls
    }

    #[test]
    fn l_shape_counts() {
        let l = vec![
            p(0.0, 0.0),
            p(4.0, 0.0),
            p(4.0, 2.0),
            p(2.0, 2.0),
            p(2.0, 4.0),
            p(0.0, 4.0),
        ];
        let solid = Extrude::new(vec![l], depth(3.0)).execute().unwrap();
        assert_eq!(solid.vertex_count(), 12);
        // 2 caps of 4 triangles each + 12 wall triangles.
        assert_eq!(solid.face_count(), 20);
    }

    #[test]
    fn compound_solid_concatenates_contours() {
        let far_square = vec![p(10.0, 10.0), p(11.0, 10.0), p(11.0, 11.0), p(10.0, 11.0)];
        let solid = Extrude::new(vec![unit_square(), far_square], depth(1.0))
            .execute()
            .unwrap();
        assert_eq!(solid.vertex_count(), 16);
        assert_eq!(solid.face_count(), 24);
    }

    #[test]
    fn closing_point_is_dropped() {
        let mut square = unit_square();
        square.push(p(0.0, 0.0));
        let solid = Extrude::new(vec![square], depth(1.0)).execute().unwrap();
        assert_eq!(solid.vertex_count(), 8);
    }

    // ── Orientation ────────────────────────────────────────────

    #[test]
    fn caps_face_outward() {
        let solid = Extrude::new(vec![unit_square()], depth(2.0))
            .execute()
            .unwrap();
        for face in 0..solid.face_count() {
            let tri = solid.indices[face];
            let centroid = (solid.vertices[tri[0] as usize].coords
                + solid.vertices[tri[1] as usize].coords
                + solid.vertices[tri[2] as usize].coords)
                / 3.0;
            let to_face = centroid - Point3::new(0.5, 0.5, 1.0).coords;
            let normal = solid.face_normal(face).unwrap();
            assert!(
                normal.dot(&to_face) > 0.0,
                "face {face} normal {normal:?} points inward"
            );
        }
    }

    #[test]
    fn cw_input_matches_ccw_input() {
        let ccw = Extrude::new(vec![unit_square()], depth(1.0))
            .execute()
            .unwrap();
        let cw: Polygon = unit_square().into_iter().rev().collect();
        let from_cw = Extrude::new(vec![cw], depth(1.0)).execute().unwrap();
        assert_eq!(ccw.vertex_count(), from_cw.vertex_count());
        assert_eq!(ccw.face_count(), from_cw.face_count());
    }

    // ── Error cases ────────────────────────────────────────────

    #[test]
    fn empty_input_is_degenerate() {
        let result = Extrude::new(vec![], depth(1.0)).execute();
        assert!(matches!(
            result,
            Err(MassingError::Extrude(ExtrudeError::DegeneratePolygon(_)))
        ));
    }

    #[test]
    fn two_points_are_degenerate() {
        let result = Extrude::new(vec![vec![p(0.0, 0.0), p(1.0, 0.0)]], depth(1.0)).execute();
        assert!(matches!(
            result,
            Err(MassingError::Extrude(ExtrudeError::DegeneratePolygon(_)))
        ));
    }

    #[test]
    fn repeated_point_is_degenerate() {
        let dup = vec![p(1.0, 1.0), p(1.0, 1.0), p(1.0, 1.0), p(1.0, 1.0)];
        let result = Extrude::new(vec![dup], depth(1.0)).execute();
        assert!(matches!(
            result,
            Err(MassingError::Extrude(ExtrudeError::DegeneratePolygon(_)))
        ));
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let flat = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)];
        let result = Extrude::new(vec![flat], depth(1.0)).execute();
        assert!(matches!(
            result,
            Err(MassingError::Extrude(ExtrudeError::DegeneratePolygon(_)))
        ));
    }

    #[test]
    fn zero_depth_is_invalid() {
        let result = Extrude::new(vec![unit_square()], depth(0.0)).execute();
        assert!(matches!(
            result,
            Err(MassingError::Extrude(ExtrudeError::InvalidDepth(_)))
        ));
    }

    #[test]
    fn negative_depth_is_invalid() {
        let result = Extrude::new(vec![unit_square()], depth(-2.0)).execute();
        assert!(matches!(
            result,
            Err(MassingError::Extrude(ExtrudeError::InvalidDepth(_)))
        ));
    }

    #[test]
    fn one_bad_contour_fails_the_whole_extrusion() {
        let result = Extrude::new(
            vec![unit_square(), vec![p(0.0, 0.0), p(1.0, 0.0)]],
            depth(1.0),
        )
        .execute();
        assert!(result.is_err());
    }
}
