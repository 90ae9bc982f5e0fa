use super::{Point2, TOLERANCE};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Removes consecutive duplicate points, and a trailing point that repeats
/// the first, so the ring is minimal and implicitly closed.
#[must_use]
pub fn cleaned_ring(points: &[Point2]) -> Vec<Point2> {
    let mut ring: Vec<Point2> = Vec::with_capacity(points.len());
    for &pt in points {
        if ring.last().map_or(true, |last| !coincident(*last, pt)) {
            ring.push(pt);
        }
    }
    while ring.len() > 1 && coincident(ring[0], ring[ring.len() - 1]) {
        ring.pop();
    }
    ring
}

fn coincident(a: Point2, b: Point2) -> bool {
    (a - b).norm_squared() < TOLERANCE * TOLERANCE
}
