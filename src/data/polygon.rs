//! Closed polygons in plot coordinates and the point-in-polygon predicate.
//!
//! Containment is **boundary inclusive**: a point lying exactly on an edge or
//! on a vertex is inside. Points strictly off the boundary are classified with
//! the even-odd ray casting rule, so self-intersecting freehand polygons
//! behave the way a filled outline looks on screen. A point with a non-finite
//! coordinate is never inside, and neither is anything tested against a
//! polygon with fewer than three vertices.

/// A closed polygon. The closing edge from the last vertex back to the first
/// is implicit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    vertices: Vec<[f64; 2]>,
}

impl Polygon {
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    /// At least three vertices; anything less encloses no area.
    pub fn is_closed_region(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Axis-aligned bounding box `(min, max)`, or `None` for an empty polygon.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (
                [lo[0].min(v[0]), lo[1].min(v[1])],
                [hi[0].max(v[0]), hi[1].max(v[1])],
            )
        }))
    }

    pub fn contains(&self, point: [f64; 2]) -> bool {
        if !self.is_closed_region() || !point[0].is_finite() || !point[1].is_finite() {
            return false;
        }
        if let Some((lo, hi)) = self.bounds() {
            if point[0] < lo[0] || point[0] > hi[0] || point[1] < lo[1] || point[1] > hi[1] {
                return false;
            }
        }
        if self.edges().any(|(a, b)| on_segment(point, a, b)) {
            return true;
        }
        self.ray_cast(point)
    }

    /// Indices of every point in `points` that [`contains`](Self::contains)
    /// accepts, in ascending order.
    pub fn contained_indices(&self, points: &[[f64; 2]]) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.contains(**p))
            .map(|(i, _)| i)
            .collect()
    }

    /// Edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    fn ray_cast(&self, p: [f64; 2]) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a[1] > p[1]) != (b[1] > p[1]) {
                let x_cross = a[0] + (p[1] - a[1]) * (b[0] - a[0]) / (b[1] - a[1]);
                if p[0] < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

impl From<Vec<[f64; 2]>> for Polygon {
    fn from(v: Vec<[f64; 2]>) -> Self {
        Polygon::new(v)
    }
}

impl From<&[(f64, f64)]> for Polygon {
    fn from(v: &[(f64, f64)]) -> Self {
        Polygon::new(v.iter().map(|&(x, y)| [x, y]).collect())
    }
}

/// Exact test for `p` lying on the closed segment `a`-`b`.
fn on_segment(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> bool {
    let cross = (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
    if cross != 0.0 {
        return false;
    }
    p[0] >= a[0].min(b[0]) && p[0] <= a[0].max(b[0]) && p[1] >= a[1].min(b[1]) && p[1] <= a[1].max(b[1])
}
