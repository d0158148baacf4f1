//! Minimal ESRI shapefile reader for road and boundary overlays.
//!
//! Reads the `.shp` geometry file (Null, Point, PolyLine and Polygon
//! records) and, when a `.dbf` sidecar is present next to it, attaches the
//! per-record attribute values. Geometries are returned in file order in
//! geographic coordinates.
//!
//! The mixed endianness below follows the shapefile specification: file
//! header counts are big-endian, record contents little-endian.

mod error;

pub use error::{ShapefileError, ShapefileResult};

use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const SHP_FILE_CODE: i32 = 9994;
const SHP_HEADER_LEN: usize = 100;

const SHAPE_NULL: i32 = 0;
const SHAPE_POINT: i32 = 1;
const SHAPE_POLYLINE: i32 = 3;
const SHAPE_POLYGON: i32 = 5;

/// A 2D point in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A decoded shapefile geometry.
///
/// PolyLine parts and Polygon rings are kept separate so that multi-part
/// roads and island polygons draw correctly.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Null,
    Point(Point),
    PolyLine(Vec<Vec<Point>>),
    Polygon(Vec<Vec<Point>>),
}

/// One shapefile record: geometry plus its .dbf attributes (empty when no
/// sidecar exists).
#[derive(Debug, Clone)]
pub struct ShapeRecord {
    pub record_number: i32,
    pub geometry: Geometry,
    pub attributes: HashMap<String, String>,
}

/// A fully loaded shapefile.
#[derive(Debug, Clone)]
pub struct Shapefile {
    /// Bounding box from the file header: (xmin, ymin, xmax, ymax).
    pub bbox: (f64, f64, f64, f64),
    records: Vec<ShapeRecord>,
}

impl Shapefile {
    /// Read a shapefile from disk, attaching .dbf attributes when present.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ShapefileResult<Self> {
        let path = path.as_ref();
        let shp = std::fs::read(path)?;
        let mut shapefile = Self::from_shp_bytes(&shp)?;

        let dbf_path = path.with_extension("dbf");
        if dbf_path.exists() {
            let dbf = std::fs::read(&dbf_path)?;
            let rows = parse_dbf(&dbf)?;
            if rows.len() != shapefile.records.len() {
                return Err(ShapefileError::InvalidFormat(format!(
                    "{} .dbf rows for {} .shp records",
                    rows.len(),
                    shapefile.records.len()
                )));
            }
            for (record, row) in shapefile.records.iter_mut().zip(rows) {
                record.attributes = row;
            }
        }

        debug!(
            path = %path.display(),
            records = shapefile.records.len(),
            "loaded shapefile"
        );
        Ok(shapefile)
    }

    /// Decode the geometry file alone.
    pub fn from_shp_bytes(data: &[u8]) -> ShapefileResult<Self> {
        if data.len() < SHP_HEADER_LEN {
            return Err(ShapefileError::InvalidFormat(
                "not enough data for shapefile header".to_string(),
            ));
        }

        let file_code = i32_be(data, 0)?;
        if file_code != SHP_FILE_CODE {
            return Err(ShapefileError::InvalidFormat(format!(
                "bad file code {}",
                file_code
            )));
        }
        // File length is in 16-bit words, header included.
        let file_len = i32_be(data, 24)? as usize * 2;
        if file_len > data.len() {
            return Err(ShapefileError::InvalidFormat(format!(
                "header declares {} bytes, file holds {}",
                file_len,
                data.len()
            )));
        }

        let bbox = (
            f64_le(data, 36)?,
            f64_le(data, 44)?,
            f64_le(data, 52)?,
            f64_le(data, 60)?,
        );

        let mut records = Vec::new();
        let mut offset = SHP_HEADER_LEN;
        while offset + 8 <= file_len {
            let record_number = i32_be(data, offset)?;
            let content_len = i32_be(data, offset + 4)? as usize * 2;
            let content_start = offset + 8;
            if content_start + content_len > data.len() {
                return Err(ShapefileError::InvalidFormat(format!(
                    "record {} runs past end of file",
                    record_number
                )));
            }

            let content = &data[content_start..content_start + content_len];
            let geometry = parse_geometry(content)?;
            records.push(ShapeRecord {
                record_number,
                geometry,
                attributes: HashMap::new(),
            });

            offset = content_start + content_len;
        }

        Ok(Self { bbox, records })
    }

    /// Records in file order.
    pub fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    /// Geometries in file order, attributes dropped.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.records.iter().map(|r| &r.geometry)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_geometry(content: &[u8]) -> ShapefileResult<Geometry> {
    let shape_type = i32_le(content, 0)?;
    match shape_type {
        SHAPE_NULL => Ok(Geometry::Null),
        SHAPE_POINT => {
            let x = f64_le(content, 4)?;
            let y = f64_le(content, 12)?;
            Ok(Geometry::Point(Point { x, y }))
        }
        SHAPE_POLYLINE | SHAPE_POLYGON => {
            // Layout: type(4) box(32) num_parts(4) num_points(4) parts points
            let num_parts = i32_le(content, 36)? as usize;
            let num_points = i32_le(content, 40)? as usize;
            let parts_start = 44;
            let points_start = parts_start + num_parts * 4;

            let mut part_offsets = Vec::with_capacity(num_parts);
            for i in 0..num_parts {
                let idx = i32_le(content, parts_start + i * 4)? as usize;
                if idx > num_points {
                    return Err(ShapefileError::InvalidFormat(format!(
                        "part offset {} beyond {} points",
                        idx, num_points
                    )));
                }
                part_offsets.push(idx);
            }

            let mut points = Vec::with_capacity(num_points);
            for i in 0..num_points {
                let at = points_start + i * 16;
                points.push(Point {
                    x: f64_le(content, at)?,
                    y: f64_le(content, at + 8)?,
                });
            }

            let mut parts = Vec::with_capacity(num_parts);
            for (i, &start) in part_offsets.iter().enumerate() {
                let end = part_offsets.get(i + 1).copied().unwrap_or(num_points);
                if start > end {
                    return Err(ShapefileError::InvalidFormat(
                        "unordered part offsets".to_string(),
                    ));
                }
                parts.push(points[start..end].to_vec());
            }

            if shape_type == SHAPE_POLYLINE {
                Ok(Geometry::PolyLine(parts))
            } else {
                Ok(Geometry::Polygon(parts))
            }
        }
        other => Err(ShapefileError::UnsupportedShapeType(other)),
    }
}

/// Parse a dBASE III .dbf sidecar into one attribute map per record.
fn parse_dbf(data: &[u8]) -> ShapefileResult<Vec<HashMap<String, String>>> {
    if data.len() < 32 {
        return Err(ShapefileError::InvalidFormat(
            "not enough data for .dbf header".to_string(),
        ));
    }
    let record_count = u32_le(data, 4)? as usize;
    let header_size = u16_le(data, 8)? as usize;
    let record_size = u16_le(data, 10)? as usize;

    // Field descriptors: 32 bytes each, terminated by 0x0D.
    let mut fields = Vec::new();
    let mut at = 32;
    while at + 32 <= header_size && data.get(at) != Some(&0x0D) {
        let desc = &data[at..at + 32];
        let name_end = desc[..11].iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&desc[..name_end]).into_owned();
        let length = desc[16] as usize;
        fields.push((name, length));
        at += 32;
    }

    let mut rows = Vec::with_capacity(record_count);
    for rec in 0..record_count {
        let start = header_size + rec * record_size;
        if start + record_size > data.len() {
            return Err(ShapefileError::InvalidFormat(format!(
                ".dbf record {} runs past end of file",
                rec
            )));
        }
        // First byte is the deletion flag; field values follow fixed-width.
        let mut row = HashMap::with_capacity(fields.len());
        let mut field_at = start + 1;
        for (name, length) in &fields {
            let raw = &data[field_at..field_at + length];
            let value = String::from_utf8_lossy(raw).trim().to_string();
            row.insert(name.clone(), value);
            field_at += length;
        }
        rows.push(row);
    }
    Ok(rows)
}

fn i32_be(data: &[u8], at: usize) -> ShapefileResult<i32> {
    let b = bytes_at(data, at, 4)?;
    Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn i32_le(data: &[u8], at: usize) -> ShapefileResult<i32> {
    let b = bytes_at(data, at, 4)?;
    Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn u32_le(data: &[u8], at: usize) -> ShapefileResult<u32> {
    let b = bytes_at(data, at, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn u16_le(data: &[u8], at: usize) -> ShapefileResult<u16> {
    let b = bytes_at(data, at, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn f64_le(data: &[u8], at: usize) -> ShapefileResult<f64> {
    let b = bytes_at(data, at, 8)?;
    Ok(f64::from_le_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ]))
}

fn bytes_at(data: &[u8], at: usize, len: usize) -> ShapefileResult<&[u8]> {
    data.get(at..at + len).ok_or_else(|| {
        ShapefileError::InvalidFormat(format!(
            "read of {} bytes at offset {} past end ({} bytes)",
            len,
            at,
            data.len()
        ))
    })
}
