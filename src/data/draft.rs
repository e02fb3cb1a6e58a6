//! Polygon under construction, before the user closes it.

use super::polygon::Polygon;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonDraft {
    vertices: Vec<[f64; 2]>,
}

impl PolygonDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn first(&self) -> Option<[f64; 2]> {
        self.vertices.first().copied()
    }

    pub fn push(&mut self, p: [f64; 2]) {
        self.vertices.push(p);
    }

    /// Move one vertex. Returns `false` if `index` is out of range.
    pub fn move_vertex(&mut self, index: usize, to: [f64; 2]) -> bool {
        match self.vertices.get_mut(index) {
            Some(v) => {
                *v = to;
                true
            }
            None => false,
        }
    }

    /// Shift every vertex by `delta`.
    pub fn translate(&mut self, delta: [f64; 2]) {
        for v in &mut self.vertices {
            v[0] += delta[0];
            v[1] += delta[1];
        }
    }

    /// Index of the vertex closest to `p` under `distance`, if it is within
    /// `max_distance`. The metric is supplied by the caller so that grab
    /// radii can be measured in screen pixels rather than plot units.
    pub fn nearest_vertex<F>(&self, p: [f64; 2], max_distance: f64, distance: F) -> Option<usize>
    where
        F: Fn([f64; 2], [f64; 2]) -> f64,
    {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (i, distance(*v, p)))
            .filter(|(_, d)| *d <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Close the draft, leaving it empty.
    pub fn take_polygon(&mut self) -> Polygon {
        Polygon::new(std::mem::take(&mut self.vertices))
    }
}
