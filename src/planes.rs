//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a window on the real plane fitted around a cloud of points.
//!
//! The window is found by the aspect normalizer: take the extent of
//! each coordinate series, grow the narrower axis until the window has
//! the same aspect ratio as the image, then inflate both axes by a
//! margin so the outermost points don't sit on the frame.
use itertools::{Itertools, MinMaxResult};

/// Stand-in for the range of an axis that doesn't move.  A constant
/// coordinate would otherwise put a zero in a denominator.
pub const RANGE_EPSILON: f64 = 1e-12;

/// The margin applied when nobody asks for a different one.
pub const DEFAULT_MARGIN: f64 = 1.1;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the column, row of a cell in an integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The lower bound and extent of one axis of a window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisRange {
    /// Smallest value on the axis.
    pub min: f64,
    /// Extent of the axis; never zero.
    pub range: f64,
}

impl AxisRange {
    /// Builds a range, flooring a zero (or negative) extent to
    /// `RANGE_EPSILON`.
    pub fn new(min: f64, range: f64) -> Self {
        AxisRange {
            min,
            range: if range > 0.0 { range } else { RANGE_EPSILON },
        }
    }

    /// The tightest range around a series of values.
    pub fn of(values: &[f64]) -> Self {
        match values.iter().minmax() {
            MinMaxResult::NoElements => AxisRange::new(0.0, 0.0),
            MinMaxResult::OneElement(v) => AxisRange::new(*v, 0.0),
            MinMaxResult::MinMax(lo, hi) => AxisRange::new(*lo, hi - lo),
        }
    }

    /// Center of the range.
    pub fn mid(&self) -> f64 {
        self.min + self.range / 2.0
    }

    /// Where `value` falls in the range, 0.0 at the bottom and 1.0 at
    /// the top.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.range
    }

    /// Maps a value onto one of `resolution` cells, using
    /// `floor((value - min) / range * (resolution - 1))`.  Values that
    /// land outside the cells (or aren't numbers) map to nothing.
    #[inline]
    pub fn index(&self, value: f64, resolution: usize) -> Option<usize> {
        let cell = (self.normalize(value) * (resolution as f64 - 1.0)).floor();
        if cell >= 0.0 && cell < resolution as f64 {
            Some(cell as usize)
        } else {
            None
        }
    }
}

/// An aspect-corrected, margin-expanded window around two coordinate
/// series.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Window {
    /// Horizontal axis.
    pub x: AxisRange,
    /// Vertical axis.
    pub y: AxisRange,
}

impl Window {
    /// Fits a window around `xs` and `ys` whose width/height matches
    /// `width`/`height`, then grows both axes by `margin` about the
    /// center.
    pub fn fit(xs: &[f64], ys: &[f64], width: usize, height: usize, margin: f64) -> Self {
        let x = AxisRange::of(xs);
        let y = AxisRange::of(ys);
        let (xmid, ymid) = (x.mid(), y.mid());
        let target = width as f64 / height as f64;

        let (mut xrng, mut yrng) = (x.range, y.range);
        if xrng / yrng < target {
            xrng = target * yrng;
        } else {
            yrng = xrng / target;
        }
        xrng *= margin;
        yrng *= margin;

        Window {
            x: AxisRange::new(xmid - xrng / 2.0, xrng),
            y: AxisRange::new(ymid - yrng / 2.0, yrng),
        }
    }

    /// A window given directly by its corners.
    pub fn from_corners(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Window {
            x: AxisRange::new(xmin, xmax - xmin),
            y: AxisRange::new(ymin, ymax - ymin),
        }
    }

    /// Width over height.
    pub fn aspect(&self) -> f64 {
        self.x.range / self.y.range
    }
}

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a window on the real plane.  Maps points from one to the other.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The right-lower hand corner of the integral cartesian plane.
    /// The left-upper is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The window on the real plane.
    pub window: Window,
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane and the
    /// window it covers.
    pub fn new(width: usize, height: usize, window: Window) -> PlaneMapper {
        PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            window,
        }
    }

    /// Fits a window around the two series and maps it onto a
    /// `width` x `height` plane.
    pub fn fit(xs: &[f64], ys: &[f64], width: usize, height: usize, margin: f64) -> PlaneMapper {
        PlaneMapper::new(width, height, Window::fit(xs, ys, width, height, margin))
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a point on the real plane, find the cell of the integral
    /// plane it falls in, if it falls in one at all.
    #[inline]
    pub fn point_to_pixel(&self, x: f64, y: f64) -> Option<Pixel> {
        let column = self.window.x.index(x, self.integral_plane.0)?;
        let row = self.window.y.index(y, self.integral_plane.1)?;
        Some(Pixel(column, row))
    }

    /// Given a pixel on the integral plane, the point on the real plane
    /// at its corner.  The inverse of `point_to_pixel` on cell corners.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> (f64, f64) {
        let step = |axis: &AxisRange, cells: usize| axis.range / (cells.max(2) as f64 - 1.0);
        (
            self.window.x.min + pixel.0 as f64 * step(&self.window.x, self.integral_plane.0),
            self.window.y.min + pixel.1 as f64 * step(&self.window.y, self.integral_plane.1),
        )
    }

    /// The linear offset from the root of a row-major buffer of the cell
    /// a point falls in.
    #[inline]
    pub fn point_to_offset(&self, x: f64, y: f64) -> Option<usize> {
        self.point_to_pixel(x, y)
            .map(|Pixel(column, row)| row * self.integral_plane.0 + column)
    }
}
