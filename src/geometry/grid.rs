//! Binned lookup structures: one content entry per bin, bins resolved per
//! axis with binary search.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::search::upper_bound;

/// Behaviour of an axis for values outside its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisBounds {
    /// Values outside the edges have no bin.
    Open,
    /// Values outside the edges fall into the first or last bin.
    Closed,
    /// The axis is periodic (e.g. an azimuthal angle).
    Circular,
}

/// Bin edge layout of an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Binning {
    /// `bins` equidistant bins between `min` and `max`.
    Regular { min: f64, max: f64, bins: usize },
    /// Explicit, strictly increasing edges.
    Irregular { edges: Vec<f64> },
}

/// One grid axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    bounds: AxisBounds,
    binning: Binning,
}

impl Axis {
    /// Creates an axis with `bins` equidistant bins.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no bins or the range is empty.
    pub fn regular(bounds: AxisBounds, min: f64, max: f64, bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(GeometryError::InvalidAxis("axis needs at least one bin").into());
        }
        if !(min < max) || !min.is_finite() || !max.is_finite() {
            return Err(GeometryError::InvalidAxis("axis range must be finite and non-empty").into());
        }
        Ok(Self {
            bounds,
            binning: Binning::Regular { min, max, bins },
        })
    }

    /// Creates an axis from explicit bin edges.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than two edges or the edges are
    /// not strictly increasing.
    pub fn irregular(bounds: AxisBounds, edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(GeometryError::InvalidAxis("axis needs at least two edges").into());
        }
        if edges.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(GeometryError::InvalidAxis("edges must be strictly increasing").into());
        }
        Ok(Self {
            bounds,
            binning: Binning::Irregular { edges },
        })
    }

    #[must_use]
    pub fn bounds(&self) -> AxisBounds {
        self.bounds
    }

    #[must_use]
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// Number of bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        match &self.binning {
            Binning::Regular { bins, .. } => *bins,
            Binning::Irregular { edges } => edges.len() - 1,
        }
    }

    /// Lower and upper edge of the axis.
    #[must_use]
    pub fn span(&self) -> (f64, f64) {
        match &self.binning {
            Binning::Regular { min, max, .. } => (*min, *max),
            Binning::Irregular { edges } => (edges[0], edges[edges.len() - 1]),
        }
    }

    /// Unbounded bin position of `value`: `-1` below, `bins()` above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    fn raw_bin(&self, value: f64) -> isize {
        let n = self.bins() as isize;
        let (lo, hi) = self.span();
        if value < lo {
            return -1;
        }
        // The upper edge belongs to the last bin.
        if value == hi {
            return n - 1;
        }
        if value > hi {
            return n;
        }
        match &self.binning {
            Binning::Regular { min, max, bins } => {
                let width = (max - min) / *bins as f64;
                (((value - min) / width).floor() as isize).clamp(0, n - 1)
            }
            Binning::Irregular { edges } => upper_bound(edges, &value) as isize - 1,
        }
    }

    fn wrap(&self, value: f64) -> f64 {
        let (lo, hi) = self.span();
        lo + (value - lo).rem_euclid(hi - lo)
    }

    /// Bin containing `value`, following the axis bounds behaviour.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn bin(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let n = self.bins() as isize;
        let raw = match self.bounds {
            AxisBounds::Circular => self.raw_bin(self.wrap(value)).clamp(0, n - 1),
            AxisBounds::Closed => self.raw_bin(value).clamp(0, n - 1),
            AxisBounds::Open => self.raw_bin(value),
        };
        (0..n).contains(&raw).then_some(raw as usize)
    }

    /// Nearest bin to `value`, regardless of the bounds behaviour.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn nearest_bin(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let n = self.bins() as isize;
        let v = if self.bounds == AxisBounds::Circular {
            self.wrap(value)
        } else {
            value
        };
        Some(self.raw_bin(v).clamp(0, n - 1) as usize)
    }

    /// Bins within `radius` of `center` as `(start, count)`; circular axes
    /// wrap around, all others are cut at the edges.
    fn window(&self, center: usize, radius: usize) -> (usize, usize, bool) {
        let n = self.bins();
        if self.bounds == AxisBounds::Circular {
            if 2 * radius + 1 >= n {
                (0, n, false)
            } else {
                ((center + n - radius) % n, 2 * radius + 1, true)
            }
        } else {
            let lo = center.saturating_sub(radius);
            let hi = (center + radius).min(n - 1);
            (lo, hi - lo + 1, false)
        }
    }
}

/// A `D`-dimensional grid holding exactly one entry per bin.
///
/// Bins are stored with the first axis running fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T, const D: usize> {
    axes: [Axis; D],
    bins: Vec<T>,
}

impl<T, const D: usize> Grid<T, D> {
    /// # Errors
    ///
    /// Returns an error if the number of entries does not match the axes.
    pub fn new(axes: [Axis; D], bins: Vec<T>) -> Result<Self> {
        let expected = axes.iter().map(Axis::bins).product::<usize>();
        if bins.len() != expected {
            return Err(GeometryError::BinCountMismatch {
                expected,
                actual: bins.len(),
            }
            .into());
        }
        Ok(Self { axes, bins })
    }

    /// Creates a grid with every bin set to a clone of `value`.
    #[must_use]
    pub fn filled(axes: [Axis; D], value: T) -> Self
    where
        T: Clone,
    {
        let n = axes.iter().map(Axis::bins).product::<usize>();
        Self {
            axes,
            bins: vec![value; n],
        }
    }

    #[must_use]
    pub fn axes(&self) -> &[Axis; D] {
        &self.axes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Flat index of a multi-dimensional bin index.
    #[must_use]
    pub fn global_index(&self, bin: &[usize; D]) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for (axis, &b) in self.axes.iter().zip(bin) {
            index += b * stride;
            stride *= axis.bins();
        }
        index
    }

    /// Multi-dimensional bin of a point, `None` if any coordinate has no bin.
    #[must_use]
    pub fn bin_of(&self, point: &[f64; D]) -> Option<[usize; D]> {
        let mut bin = [0; D];
        for ((b, axis), &v) in bin.iter_mut().zip(&self.axes).zip(point) {
            *b = axis.bin(v)?;
        }
        Some(bin)
    }

    /// Entry of the bin that contains `point`.
    #[must_use]
    pub fn search(&self, point: &[f64; D]) -> Option<&T> {
        let bin = self.bin_of(point)?;
        self.bins.get(self.global_index(&bin))
    }

    #[must_use]
    pub fn at(&self, bin: &[usize; D]) -> Option<&T> {
        self.bins.get(self.global_index(bin))
    }

    pub fn at_mut(&mut self, bin: &[usize; D]) -> Option<&mut T> {
        let index = self.global_index(bin);
        self.bins.get_mut(index)
    }

    /// Visits every bin within `radius` bins (per axis) of the bin nearest to
    /// `point`. Each bin is visited once.
    pub fn visit_neighborhood(&self, point: &[f64; D], radius: &[usize; D], mut visit: impl FnMut(&T)) {
        let mut windows = [(0, 0, false); D];
        for (a, axis) in self.axes.iter().enumerate() {
            let Some(center) = axis.nearest_bin(point[a]) else {
                return;
            };
            windows[a] = axis.window(center, radius[a]);
        }

        let mut offset = [0usize; D];
        loop {
            let mut bin = [0usize; D];
            for a in 0..D {
                let (start, _, wraps) = windows[a];
                bin[a] = if wraps {
                    (start + offset[a]) % self.axes[a].bins()
                } else {
                    start + offset[a]
                };
            }
            if let Some(entry) = self.at(&bin) {
                visit(entry);
            }

            // Odometer increment over the window offsets.
            let mut a = 0;
            loop {
                if a == D {
                    return;
                }
                offset[a] += 1;
                if offset[a] < windows[a].1 {
                    break;
                }
                offset[a] = 0;
                a += 1;
            }
        }
    }
}
