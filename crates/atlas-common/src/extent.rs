//! Geographic extent types and operations.

use serde::{Deserialize, Serialize};

/// A geographic extent in degrees: `(west, east, south, north)`.
///
/// Two flavors share this type: the *native* extent of a raster (derived
/// from its geotransform, used for correct pixel placement) and the *view*
/// extent a panel is cropped to. Both are plain lon/lat rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Extent {
    /// Create a new extent from edge coordinates.
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    /// Derive the extent of a raster from its affine geotransform.
    ///
    /// `origin` is the geographic position of the top-left corner of the
    /// top-left pixel; `pixel_size` is `(x_size, y_size)` with `y_size`
    /// given as a positive magnitude (north-up rasters).
    pub fn from_geotransform(
        origin: (f64, f64),
        pixel_size: (f64, f64),
        width: usize,
        height: usize,
    ) -> Self {
        let (origin_x, origin_y) = origin;
        let (sx, sy) = pixel_size;
        Self {
            west: origin_x,
            east: origin_x + sx * width as f64,
            south: origin_y - sy * height as f64,
            north: origin_y,
        }
    }

    /// Width of the extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Check if a point is contained within this extent.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Check if this extent intersects another.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }

    /// Return the same area with `west <= east` and `south <= north`.
    ///
    /// Figure definitions sometimes give the zoom window with the axes
    /// reversed (top-to-bottom latitude order); panel math requires the
    /// canonical orientation.
    pub fn normalized(&self) -> Extent {
        Extent {
            west: self.west.min(self.east),
            east: self.west.max(self.east),
            south: self.south.min(self.north),
            north: self.south.max(self.north),
        }
    }

    /// Map a geographic point to fractional pixel coordinates within a
    /// `width_px` x `height_px` viewport covering this extent.
    ///
    /// The y axis is flipped: north edge maps to row 0.
    pub fn to_pixel(&self, lon: f64, lat: f64, width_px: f64, height_px: f64) -> (f64, f64) {
        let x = (lon - self.west) / self.width() * width_px;
        let y = (self.north - lat) / self.height() * height_px;
        (x, y)
    }
}
