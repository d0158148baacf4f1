//! Minimal GeoTIFF reader for single-band hazard and population rasters.
//!
//! Reads strip-organized, single-sample GeoTIFFs (uncompressed or
//! deflate-compressed) and exposes the pixel values as `f32` together with
//! the affine geotransform from the `ModelPixelScale` and `ModelTiepoint`
//! tags. Values equal to the `GDAL_NODATA` sentinel are returned as NaN.
//!
//! This is not a general TIFF implementation: tiled layouts, multi-sample
//! images and predictors are rejected with an explicit error.

mod error;

pub use error::{GeoTiffError, GeoTiffResult};

use std::io::Read;
use std::path::Path;
use tracing::debug;

// TIFF tag numbers used by this reader.
const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_COMPRESSION: u16 = 259;
const TAG_STRIP_OFFSETS: u16 = 273;
const TAG_SAMPLES_PER_PIXEL: u16 = 277;
const TAG_ROWS_PER_STRIP: u16 = 278;
const TAG_STRIP_BYTE_COUNTS: u16 = 279;
const TAG_PREDICTOR: u16 = 317;
const TAG_TILE_WIDTH: u16 = 322;
const TAG_SAMPLE_FORMAT: u16 = 339;
const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
const TAG_MODEL_TIEPOINT: u16 = 33922;
const TAG_GDAL_NODATA: u16 = 42113;

const COMPRESSION_NONE: u64 = 1;
const COMPRESSION_DEFLATE: u64 = 8;
const COMPRESSION_DEFLATE_OLD: u64 = 32946;

const SAMPLE_FORMAT_UNSIGNED: u64 = 1;
const SAMPLE_FORMAT_SIGNED: u64 = 2;
const SAMPLE_FORMAT_FLOAT: u64 = 3;

/// Affine georeferencing of a north-up raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geotransform {
    /// Geographic x of the top-left corner of the top-left pixel.
    pub origin_x: f64,
    /// Geographic y of the top-left corner of the top-left pixel.
    pub origin_y: f64,
    /// Pixel width in geographic units.
    pub pixel_x: f64,
    /// Pixel height in geographic units (positive magnitude).
    pub pixel_y: f64,
}

/// A decoded single-band GeoTIFF.
#[derive(Debug, Clone)]
pub struct GeoTiff {
    pub width: usize,
    pub height: usize,
    /// Row-major samples, top row first. Nodata cells are NaN.
    pub samples: Vec<f32>,
    pub geotransform: Geotransform,
    /// Nodata sentinel declared by the file, if any.
    pub nodata: Option<f32>,
}

impl GeoTiff {
    /// Read and decode a GeoTIFF from disk.
    ///
    /// Loading is idempotent and side-effect free: reading the same file
    /// twice yields identical samples and extent.
    pub fn from_path<P: AsRef<Path>>(path: P) -> GeoTiffResult<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Decode a GeoTIFF from an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> GeoTiffResult<Self> {
        let reader = TiffReader::new(data)?;
        let entries = reader.read_ifd()?;

        if find_entry(&entries, TAG_TILE_WIDTH).is_some() {
            return Err(GeoTiffError::Unsupported("tiled layout".to_string()));
        }

        let width = require_single(&reader, &entries, TAG_IMAGE_WIDTH, "ImageWidth")? as usize;
        let height = require_single(&reader, &entries, TAG_IMAGE_LENGTH, "ImageLength")? as usize;
        if width == 0 || height == 0 {
            return Err(GeoTiffError::InvalidFormat(format!(
                "degenerate dimensions {}x{}",
                width, height
            )));
        }

        let samples_per_pixel =
            single_or(&reader, &entries, TAG_SAMPLES_PER_PIXEL, 1)?;
        if samples_per_pixel != 1 {
            return Err(GeoTiffError::Unsupported(format!(
                "{} samples per pixel (single-band only)",
                samples_per_pixel
            )));
        }

        let predictor = single_or(&reader, &entries, TAG_PREDICTOR, 1)?;
        if predictor != 1 {
            return Err(GeoTiffError::Unsupported(format!(
                "predictor {}",
                predictor
            )));
        }

        let bits = single_or(&reader, &entries, TAG_BITS_PER_SAMPLE, 1)?;
        let format = single_or(&reader, &entries, TAG_SAMPLE_FORMAT, SAMPLE_FORMAT_UNSIGNED)?;
        let compression = single_or(&reader, &entries, TAG_COMPRESSION, COMPRESSION_NONE)?;

        let strip_offsets = require_values(&reader, &entries, TAG_STRIP_OFFSETS, "StripOffsets")?;
        let strip_byte_counts =
            require_values(&reader, &entries, TAG_STRIP_BYTE_COUNTS, "StripByteCounts")?;
        if strip_offsets.len() != strip_byte_counts.len() {
            return Err(GeoTiffError::InvalidFormat(format!(
                "{} strip offsets vs {} byte counts",
                strip_offsets.len(),
                strip_byte_counts.len()
            )));
        }
        let rows_per_strip =
            single_or(&reader, &entries, TAG_ROWS_PER_STRIP, height as u64)? as usize;

        let nodata = read_nodata(&reader, &entries)?;
        let geotransform = read_geotransform(&reader, &entries)?;

        let mut samples = Vec::with_capacity(width * height);
        for (strip_idx, (&offset, &count)) in
            strip_offsets.iter().zip(strip_byte_counts.iter()).enumerate()
        {
            let raw = reader.slice(offset as usize, count as usize)?;
            let decoded = decompress_strip(raw, compression)?;

            let strip_start_row = strip_idx * rows_per_strip;
            let strip_rows = rows_per_strip.min(height - strip_start_row.min(height));
            let expected = strip_rows * width * (bits as usize / 8);
            if decoded.len() < expected {
                return Err(GeoTiffError::InvalidFormat(format!(
                    "strip {} holds {} bytes, expected {}",
                    strip_idx,
                    decoded.len(),
                    expected
                )));
            }

            decode_samples(&decoded[..expected], bits, format, reader.little_endian, &mut samples)?;
        }

        if samples.len() != width * height {
            return Err(GeoTiffError::InvalidFormat(format!(
                "decoded {} samples for {}x{} raster",
                samples.len(),
                width,
                height
            )));
        }

        if let Some(nd) = nodata {
            for v in samples.iter_mut() {
                if *v == nd {
                    *v = f32::NAN;
                }
            }
        }

        debug!(width, height, ?nodata, "decoded GeoTIFF");

        Ok(Self {
            width,
            height,
            samples,
            geotransform,
            nodata,
        })
    }

    /// Geographic extent as `(west, east, south, north)`.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        let g = &self.geotransform;
        let west = g.origin_x;
        let north = g.origin_y;
        (
            west,
            west + g.pixel_x * self.width as f64,
            north - g.pixel_y * self.height as f64,
            north,
        )
    }
}

/// One IFD entry: tag, field type, count, and the raw value-or-offset word.
#[derive(Debug, Clone, Copy)]
struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    value_offset: usize,
    inline: bool,
}

/// Byte-order-aware cursor over the raw TIFF bytes.
struct TiffReader<'a> {
    data: &'a [u8],
    little_endian: bool,
    ifd_offset: usize,
}

impl<'a> TiffReader<'a> {
    fn new(data: &'a [u8]) -> GeoTiffResult<Self> {
        if data.len() < 8 {
            return Err(GeoTiffError::InvalidFormat(
                "not enough data for TIFF header".to_string(),
            ));
        }
        let little_endian = match &data[0..2] {
            b"II" => true,
            b"MM" => false,
            _ => {
                return Err(GeoTiffError::InvalidFormat(
                    "invalid TIFF byte-order mark".to_string(),
                ))
            }
        };
        let mut reader = Self {
            data,
            little_endian,
            ifd_offset: 0,
        };
        let magic = reader.u16_at(2)?;
        if magic != 42 {
            return Err(GeoTiffError::InvalidFormat(format!(
                "bad TIFF magic {}",
                magic
            )));
        }
        reader.ifd_offset = reader.u32_at(4)? as usize;
        Ok(reader)
    }

    fn slice(&self, offset: usize, len: usize) -> GeoTiffResult<&'a [u8]> {
        self.data
            .get(offset..offset + len)
            .ok_or_else(|| GeoTiffError::InvalidFormat(format!(
                "read of {} bytes at offset {} past end of file ({} bytes)",
                len,
                offset,
                self.data.len()
            )))
    }

    fn u16_at(&self, offset: usize) -> GeoTiffResult<u16> {
        let b = self.slice(offset, 2)?;
        Ok(if self.little_endian {
            u16::from_le_bytes([b[0], b[1]])
        } else {
            u16::from_be_bytes([b[0], b[1]])
        })
    }

    fn u32_at(&self, offset: usize) -> GeoTiffResult<u32> {
        let b = self.slice(offset, 4)?;
        Ok(if self.little_endian {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        })
    }

    fn f64_at(&self, offset: usize) -> GeoTiffResult<f64> {
        let b = self.slice(offset, 8)?;
        let bytes = [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]];
        Ok(if self.little_endian {
            f64::from_le_bytes(bytes)
        } else {
            f64::from_be_bytes(bytes)
        })
    }

    /// Parse the first IFD's entry table.
    fn read_ifd(&self) -> GeoTiffResult<Vec<IfdEntry>> {
        let count = self.u16_at(self.ifd_offset)? as usize;
        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            let base = self.ifd_offset + 2 + i * 12;
            let tag = self.u16_at(base)?;
            let field_type = self.u16_at(base + 2)?;
            let value_count = self.u32_at(base + 4)?;

            let elem_size = field_type_size(field_type);
            let total = elem_size * value_count as usize;
            let inline = total <= 4 && elem_size > 0;
            let value_offset = if inline {
                base + 8
            } else {
                self.u32_at(base + 8)? as usize
            };

            entries.push(IfdEntry {
                tag,
                field_type,
                count: value_count,
                value_offset,
                inline,
            });
        }
        Ok(entries)
    }

    /// Read an entry's values widened to u64 (BYTE/SHORT/LONG fields).
    fn integer_values(&self, entry: &IfdEntry) -> GeoTiffResult<Vec<u64>> {
        let elem = field_type_size(entry.field_type);
        let mut values = Vec::with_capacity(entry.count as usize);
        for i in 0..entry.count as usize {
            let at = entry.value_offset + i * elem;
            let v = match entry.field_type {
                1 => self.slice(at, 1)?[0] as u64, // BYTE
                3 => self.u16_at(at)? as u64,      // SHORT
                4 => self.u32_at(at)? as u64,      // LONG
                other => {
                    return Err(GeoTiffError::InvalidFormat(format!(
                        "tag {} has non-integer field type {}",
                        entry.tag, other
                    )))
                }
            };
            values.push(v);
        }
        Ok(values)
    }

    /// Read an entry's values as f64 (DOUBLE fields).
    fn double_values(&self, entry: &IfdEntry) -> GeoTiffResult<Vec<f64>> {
        if entry.field_type != 12 {
            return Err(GeoTiffError::InvalidFormat(format!(
                "tag {} has field type {}, expected DOUBLE",
                entry.tag, entry.field_type
            )));
        }
        let mut values = Vec::with_capacity(entry.count as usize);
        for i in 0..entry.count as usize {
            values.push(self.f64_at(entry.value_offset + i * 8)?);
        }
        Ok(values)
    }

    /// Read an ASCII entry, trimming the NUL terminator.
    fn ascii_value(&self, entry: &IfdEntry) -> GeoTiffResult<String> {
        let raw = self.slice(entry.value_offset, entry.count as usize)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }
}

fn field_type_size(field_type: u16) -> usize {
    match field_type {
        1 | 2 | 6 | 7 => 1, // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,         // SHORT, SSHORT
        4 | 9 | 11 => 4,    // LONG, SLONG, FLOAT
        5 | 10 | 12 => 8,   // RATIONAL, SRATIONAL, DOUBLE
        _ => 0,
    }
}

fn find_entry<'e>(entries: &'e [IfdEntry], tag: u16) -> Option<&'e IfdEntry> {
    entries.iter().find(|e| e.tag == tag)
}

fn require_single(
    reader: &TiffReader<'_>,
    entries: &[IfdEntry],
    tag: u16,
    name: &'static str,
) -> GeoTiffResult<u64> {
    let entry = find_entry(entries, tag).ok_or(GeoTiffError::MissingTag(name))?;
    let values = reader.integer_values(entry)?;
    values
        .first()
        .copied()
        .ok_or(GeoTiffError::MissingTag(name))
}

fn single_or(
    reader: &TiffReader<'_>,
    entries: &[IfdEntry],
    tag: u16,
    default: u64,
) -> GeoTiffResult<u64> {
    match find_entry(entries, tag) {
        Some(entry) => Ok(reader.integer_values(entry)?.first().copied().unwrap_or(default)),
        None => Ok(default),
    }
}

fn require_values(
    reader: &TiffReader<'_>,
    entries: &[IfdEntry],
    tag: u16,
    name: &'static str,
) -> GeoTiffResult<Vec<u64>> {
    let entry = find_entry(entries, tag).ok_or(GeoTiffError::MissingTag(name))?;
    reader.integer_values(entry)
}

fn read_nodata(reader: &TiffReader<'_>, entries: &[IfdEntry]) -> GeoTiffResult<Option<f32>> {
    let Some(entry) = find_entry(entries, TAG_GDAL_NODATA) else {
        return Ok(None);
    };
    let text = reader.ascii_value(entry)?;
    match text.trim().parse::<f32>() {
        Ok(v) => Ok(Some(v)),
        Err(_) => {
            // GDAL writes "nan" for float nodata; anything unparseable is
            // treated the same way since NaN cells are already invalid.
            Ok(None)
        }
    }
}

fn read_geotransform(
    reader: &TiffReader<'_>,
    entries: &[IfdEntry],
) -> GeoTiffResult<Geotransform> {
    let scale_entry =
        find_entry(entries, TAG_MODEL_PIXEL_SCALE).ok_or(GeoTiffError::MissingTag("ModelPixelScale"))?;
    let tiepoint_entry =
        find_entry(entries, TAG_MODEL_TIEPOINT).ok_or(GeoTiffError::MissingTag("ModelTiepoint"))?;

    let scale = reader.double_values(scale_entry)?;
    let tiepoint = reader.double_values(tiepoint_entry)?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(GeoTiffError::InvalidFormat(
            "short ModelPixelScale/ModelTiepoint".to_string(),
        ));
    }

    let (pixel_x, pixel_y) = (scale[0], scale[1].abs());
    if pixel_x <= 0.0 || pixel_y <= 0.0 {
        return Err(GeoTiffError::InvalidFormat(format!(
            "non-positive pixel scale ({}, {})",
            scale[0], scale[1]
        )));
    }

    // Tiepoint maps raster point (i, j) to geographic (x, y); shift back to
    // the top-left corner of pixel (0, 0).
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    Ok(Geotransform {
        origin_x: x - i * pixel_x,
        origin_y: y + j * pixel_y,
        pixel_x,
        pixel_y,
    })
}

fn decompress_strip(raw: &[u8], compression: u64) -> GeoTiffResult<Vec<u8>> {
    match compression {
        COMPRESSION_NONE => Ok(raw.to_vec()),
        COMPRESSION_DEFLATE | COMPRESSION_DEFLATE_OLD => {
            let mut decoder = flate2::read::ZlibDecoder::new(raw);
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|e| GeoTiffError::Decompression(e.to_string()))?;
            Ok(out)
        }
        other => Err(GeoTiffError::Unsupported(format!(
            "compression scheme {}",
            other
        ))),
    }
}

/// Decode raw strip bytes into f32 samples, appending to `out`.
fn decode_samples(
    bytes: &[u8],
    bits: u64,
    format: u64,
    little_endian: bool,
    out: &mut Vec<f32>,
) -> GeoTiffResult<()> {
    match (format, bits) {
        (SAMPLE_FORMAT_FLOAT, 32) => {
            for chunk in bytes.chunks_exact(4) {
                let b = [chunk[0], chunk[1], chunk[2], chunk[3]];
                out.push(if little_endian {
                    f32::from_le_bytes(b)
                } else {
                    f32::from_be_bytes(b)
                });
            }
        }
        (SAMPLE_FORMAT_FLOAT, 64) => {
            for chunk in bytes.chunks_exact(8) {
                let b = [
                    chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
                ];
                let v = if little_endian {
                    f64::from_le_bytes(b)
                } else {
                    f64::from_be_bytes(b)
                };
                out.push(v as f32);
            }
        }
        (SAMPLE_FORMAT_UNSIGNED, 8) => {
            out.extend(bytes.iter().map(|&b| b as f32));
        }
        (SAMPLE_FORMAT_UNSIGNED, 16) => {
            for chunk in bytes.chunks_exact(2) {
                let v = if little_endian {
                    u16::from_le_bytes([chunk[0], chunk[1]])
                } else {
                    u16::from_be_bytes([chunk[0], chunk[1]])
                };
                out.push(v as f32);
            }
        }
        (SAMPLE_FORMAT_SIGNED, 16) => {
            for chunk in bytes.chunks_exact(2) {
                let v = if little_endian {
                    i16::from_le_bytes([chunk[0], chunk[1]])
                } else {
                    i16::from_be_bytes([chunk[0], chunk[1]])
                };
                out.push(v as f32);
            }
        }
        (f, b) => {
            return Err(GeoTiffError::Unsupported(format!(
                "sample format {} with {} bits",
                f, b
            )))
        }
    }
    Ok(())
}
