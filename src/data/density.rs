//! Kernel density contours of the control population.
//!
//! The density is a Gaussian product-kernel KDE with Scott's rule bandwidth
//! per axis, evaluated on a regular grid. Contour levels are iso-proportions:
//! level `p` is drawn where a fraction `p` of the probability mass lies in
//! regions of lower density, so `0.05` hugs the outskirts and `0.95` the core.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityGridSpec {
    pub nx: usize,
    pub ny: usize,
    /// Padding around the data extent, in bandwidths.
    pub cut: f64,
}

impl Default for DensityGridSpec {
    fn default() -> Self {
        Self {
            nx: 100,
            ny: 100,
            cut: 3.0,
        }
    }
}

/// Density sampled on a regular grid. `values[j * nx + i]` is the density at
/// `(xs[i], ys[j])`.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<f64>,
}

/// One contour level as a soup of line segments.
#[derive(Debug, Clone)]
pub struct ContourLevel {
    /// Requested iso-proportion.
    pub proportion: f64,
    /// Density threshold the proportion maps to.
    pub threshold: f64,
    pub segments: Vec<[[f64; 2]; 2]>,
}

impl DensityGrid {
    /// Estimate the density of `samples`. Returns `None` with fewer than two
    /// finite samples or zero spread along either axis.
    pub fn estimate(samples: &[[f64; 2]], spec: DensityGridSpec) -> Option<Self> {
        let pts: Vec<[f64; 2]> = samples
            .iter()
            .copied()
            .filter(|p| p[0].is_finite() && p[1].is_finite())
            .collect();
        let n = pts.len();
        if n < 2 || spec.nx < 2 || spec.ny < 2 {
            return None;
        }

        // Scott's factor for two dimensions: n^(-1/6).
        let factor = (n as f64).powf(-1.0 / 6.0);
        let hx = std_dev(pts.iter().map(|p| p[0]), n) * factor;
        let hy = std_dev(pts.iter().map(|p| p[1]), n) * factor;
        if !(hx > 0.0 && hy > 0.0) {
            return None;
        }

        let (min_x, max_x) = min_max(pts.iter().map(|p| p[0]));
        let (min_y, max_y) = min_max(pts.iter().map(|p| p[1]));
        let xs = linspace(min_x - spec.cut * hx, max_x + spec.cut * hx, spec.nx);
        let ys = linspace(min_y - spec.cut * hy, max_y + spec.cut * hy, spec.ny);

        let norm = 1.0 / (2.0 * std::f64::consts::PI * hx * hy * n as f64);
        let mut values = vec![0.0; spec.nx * spec.ny];
        for (j, &y) in ys.iter().enumerate() {
            for (i, &x) in xs.iter().enumerate() {
                let sum: f64 = pts
                    .iter()
                    .map(|p| {
                        let dx = (x - p[0]) / hx;
                        let dy = (y - p[1]) / hy;
                        (-0.5 * (dx * dx + dy * dy)).exp()
                    })
                    .sum();
                values[j * spec.nx + i] = sum * norm;
            }
        }
        Some(Self { xs, ys, values })
    }

    pub fn nx(&self) -> usize {
        self.xs.len()
    }

    pub fn ny(&self) -> usize {
        self.ys.len()
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.nx() + i]
    }

    /// Density threshold such that `proportion` of the grid mass lies in
    /// cells with lower density.
    pub fn iso_proportion_threshold(&self, proportion: f64) -> f64 {
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let total: f64 = sorted.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        let target = proportion.clamp(0.0, 1.0) * total;
        let mut acc = 0.0;
        for v in &sorted {
            acc += v;
            if acc >= target {
                return *v;
            }
        }
        sorted.last().copied().unwrap_or(0.0)
    }

    /// Contour segments at every requested iso-proportion.
    pub fn contours(&self, proportions: &[f64]) -> Vec<ContourLevel> {
        proportions
            .iter()
            .map(|&p| {
                let threshold = self.iso_proportion_threshold(p);
                ContourLevel {
                    proportion: p,
                    threshold,
                    segments: self.marching_squares(threshold),
                }
            })
            .collect()
    }

    /// Marching squares with linear interpolation along cell edges. Saddle
    /// cells are resolved by the cell-centre average.
    pub fn marching_squares(&self, level: f64) -> Vec<[[f64; 2]; 2]> {
        let mut segments = Vec::new();
        for j in 0..self.ny().saturating_sub(1) {
            for i in 0..self.nx().saturating_sub(1) {
                // Corners counter-clockwise from bottom-left.
                let corners = [
                    ([self.xs[i], self.ys[j]], self.at(i, j)),
                    ([self.xs[i + 1], self.ys[j]], self.at(i + 1, j)),
                    ([self.xs[i + 1], self.ys[j + 1]], self.at(i + 1, j + 1)),
                    ([self.xs[i], self.ys[j + 1]], self.at(i, j + 1)),
                ];
                let case = corners
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (k, (_, v))| acc | (((*v >= level) as u8) << k));
                if case == 0 || case == 15 {
                    continue;
                }
                let edge = |a: usize, b: usize| -> [f64; 2] {
                    let (pa, va) = corners[a];
                    let (pb, vb) = corners[b];
                    let t = if vb != va { (level - va) / (vb - va) } else { 0.5 };
                    [pa[0] + t * (pb[0] - pa[0]), pa[1] + t * (pb[1] - pa[1])]
                };
                // Edges: 0 bottom (0-1), 1 right (1-2), 2 top (2-3), 3 left (3-0).
                let e = [edge(0, 1), edge(1, 2), edge(2, 3), edge(3, 0)];
                let centre_high = corners.iter().map(|(_, v)| v).sum::<f64>() / 4.0 >= level;
                let pairs: &[(usize, usize)] = match case {
                    1 | 14 => &[(3, 0)],
                    2 | 13 => &[(0, 1)],
                    3 | 12 => &[(3, 1)],
                    4 | 11 => &[(1, 2)],
                    6 | 9 => &[(0, 2)],
                    7 | 8 => &[(2, 3)],
                    5 if centre_high => &[(3, 2), (0, 1)],
                    5 => &[(3, 0), (1, 2)],
                    10 if centre_high => &[(3, 0), (1, 2)],
                    10 => &[(0, 1), (2, 3)],
                    _ => &[],
                };
                segments.extend(pairs.iter().map(|&(a, b)| [e[a], e[b]]));
            }
        }
        segments
    }
}

fn std_dev(values: impl Iterator<Item = f64> + Clone, n: usize) -> f64 {
    let mean = values.clone().sum::<f64>() / n as f64;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    var.sqrt()
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|k| start + step * k as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud() -> Vec<[f64; 2]> {
        let mut pts = Vec::new();
        for i in 0..20 {
            for j in 0..20 {
                pts.push([i as f64 * 0.1, j as f64 * 0.1]);
            }
        }
        pts
    }

    #[test]
    fn too_few_samples_give_no_grid() {
        assert!(DensityGrid::estimate(&[[0.0, 0.0]], DensityGridSpec::default()).is_none());
        assert!(DensityGrid::estimate(&[[1.0, 1.0], [1.0, 1.0]], DensityGridSpec::default()).is_none());
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut pts = cloud();
        pts.push([f64::NAN, 1.0]);
        pts.push([0.5, f64::NEG_INFINITY]);
        let grid = DensityGrid::estimate(&pts, DensityGridSpec { nx: 20, ny: 20, cut: 3.0 }).unwrap();
        assert!(grid.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn grid_integrates_to_about_one() {
        let spec = DensityGridSpec { nx: 60, ny: 60, cut: 3.0 };
        let grid = DensityGrid::estimate(&cloud(), spec).unwrap();
        let dx = grid.xs[1] - grid.xs[0];
        let dy = grid.ys[1] - grid.ys[0];
        let mass: f64 = grid.values.iter().sum::<f64>() * dx * dy;
        assert!((mass - 1.0).abs() < 0.05, "mass was {mass}");
    }

    #[test]
    fn higher_proportion_gives_higher_threshold() {
        let grid = DensityGrid::estimate(&cloud(), DensityGridSpec { nx: 40, ny: 40, cut: 3.0 }).unwrap();
        let lo = grid.iso_proportion_threshold(0.1);
        let hi = grid.iso_proportion_threshold(0.75);
        assert!(hi > lo);
    }

    #[test]
    fn contours_produce_segments_inside_grid() {
        let grid = DensityGrid::estimate(&cloud(), DensityGridSpec { nx: 40, ny: 40, cut: 3.0 }).unwrap();
        let levels = grid.contours(&[0.1, 0.5]);
        assert_eq!(levels.len(), 2);
        let (x0, x1) = (grid.xs[0], *grid.xs.last().unwrap());
        for level in &levels {
            assert!(!level.segments.is_empty());
            for seg in &level.segments {
                for p in seg {
                    assert!(p[0] >= x0 - 1e-9 && p[0] <= x1 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn single_peak_crossing_is_found() {
        let grid = DensityGrid {
            xs: vec![0.0, 1.0, 2.0],
            ys: vec![0.0, 1.0, 2.0],
            values: vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        };
        let segs = grid.marching_squares(0.5);
        // One segment in each of the four cells around the peak.
        assert_eq!(segs.len(), 4);
    }
}
