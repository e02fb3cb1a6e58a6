//! Immutable snapshot of the points shown in one classification round.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Colours supplied to [`PointSet::new`]: one colour for every point, or a
/// sequence aligned with the coordinates.
#[derive(Debug, Clone)]
pub enum PointColors {
    Uniform(Rgba),
    PerPoint(Vec<Rgba>),
}

impl From<Rgba> for PointColors {
    fn from(c: Rgba) -> Self {
        PointColors::Uniform(c)
    }
}

impl From<Vec<Rgba>> for PointColors {
    fn from(v: Vec<Rgba>) -> Self {
        PointColors::PerPoint(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    coordinates: Vec<[f64; 2]>,
    base_colors: Vec<Rgba>,
}

impl PointSet {
    /// Build a point set. A single colour (or a one-element sequence) is
    /// broadcast to every point; any other sequence length must equal the
    /// number of coordinates.
    pub fn new(coordinates: Vec<[f64; 2]>, colors: impl Into<PointColors>) -> Result<Self> {
        let n = coordinates.len();
        let base_colors = match colors.into() {
            PointColors::Uniform(c) => vec![c; n],
            PointColors::PerPoint(v) if v.len() == n => v,
            PointColors::PerPoint(v) if v.len() == 1 => vec![v[0]; n],
            PointColors::PerPoint(v) => {
                return Err(Error::InvalidInput {
                    points: n,
                    colors: v.len(),
                })
            }
        };
        Ok(Self {
            coordinates,
            base_colors,
        })
    }

    pub fn coordinates(&self) -> &[[f64; 2]] {
        &self.coordinates
    }

    pub fn base_colors(&self) -> &[Rgba] {
        &self.base_colors
    }

    pub fn count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}
