//! GeoTIFF test data builder.
//!
//! Creates minimal synthetic GeoTIFF files for testing the parser. The
//! generated files have a valid header, a single IFD and strip-organized
//! float32 data.

use std::io::Write;

/// Build a minimal little-endian, single-band float32 GeoTIFF.
pub struct GeoTiffBuilder {
    width: u32,
    height: u32,
    values: Vec<f32>,
    pixel_scale: (f64, f64),
    /// Geographic position of the top-left corner.
    origin: (f64, f64),
    nodata: Option<f32>,
    deflate: bool,
    rows_per_strip: u32,
}

impl GeoTiffBuilder {
    /// Defaults resembling a coastal flood-depth tile.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; (width * height) as usize],
            pixel_scale: (0.01, 0.01),
            origin: (37.8, -6.7),
            nodata: None,
            deflate: false,
            rows_per_strip: height,
        }
    }

    pub fn with_values(mut self, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), (self.width * self.height) as usize);
        self.values = values;
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }

    pub fn with_pixel_scale(mut self, sx: f64, sy: f64) -> Self {
        self.pixel_scale = (sx, sy);
        self
    }

    pub fn with_nodata(mut self, nodata: f32) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_deflate(mut self) -> Self {
        self.deflate = true;
        self
    }

    pub fn with_rows_per_strip(mut self, rows: u32) -> Self {
        self.rows_per_strip = rows;
        self
    }

    /// Serialize to TIFF bytes.
    pub fn build(&self) -> Vec<u8> {
        // Encode strips first so their offsets/byte counts are known when
        // the IFD is written.
        let strips: Vec<Vec<u8>> = self
            .values
            .chunks((self.rows_per_strip * self.width) as usize)
            .map(|chunk| {
                let raw: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
                if self.deflate {
                    let mut enc = flate2::write::ZlibEncoder::new(
                        Vec::new(),
                        flate2::Compression::default(),
                    );
                    enc.write_all(&raw).unwrap();
                    enc.finish().unwrap()
                } else {
                    raw
                }
            })
            .collect();

        let mut strip_offsets = Vec::new();
        let mut strip_counts = Vec::new();
        let mut cursor = 8u32; // header size
        for strip in &strips {
            strip_offsets.push(cursor);
            strip_counts.push(strip.len() as u32);
            cursor += strip.len() as u32;
        }
        if cursor % 2 == 1 {
            cursor += 1; // IFD must sit on a word boundary
        }
        let ifd_offset = cursor;

        let nodata_text = self.nodata.map(|v| {
            let mut s = format!("{}", v).into_bytes();
            s.push(0);
            s
        });

        let multi_strip = strips.len() > 1;
        let mut num_entries = 12u16;
        if self.nodata.is_some() {
            num_entries += 1;
        }

        let ifd_len = 2 + num_entries as u32 * 12 + 4;
        let mut aux_offset = ifd_offset + ifd_len;

        // Out-of-line value areas, laid out after the IFD.
        let strip_offsets_at = if multi_strip {
            let at = aux_offset;
            aux_offset += strip_offsets.len() as u32 * 4;
            Some(at)
        } else {
            None
        };
        let strip_counts_at = if multi_strip {
            let at = aux_offset;
            aux_offset += strip_counts.len() as u32 * 4;
            Some(at)
        } else {
            None
        };
        let pixel_scale_at = aux_offset;
        aux_offset += 3 * 8;
        let tiepoint_at = aux_offset;
        aux_offset += 6 * 8;
        let nodata_at = aux_offset;

        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&ifd_offset.to_le_bytes());
        for strip in &strips {
            out.extend_from_slice(strip);
        }
        while out.len() < ifd_offset as usize {
            out.push(0);
        }

        out.extend_from_slice(&num_entries.to_le_bytes());
        write_entry_long(&mut out, 256, self.width);
        write_entry_long(&mut out, 257, self.height);
        write_entry_short(&mut out, 258, 32); // BitsPerSample
        write_entry_short(&mut out, 259, 1); // Compression placeholder, fixed below
        write_entry_short(&mut out, 262, 1); // PhotometricInterpretation
        match strip_offsets_at {
            Some(at) => write_entry_long_array(&mut out, 273, strip_offsets.len() as u32, at),
            None => write_entry_long(&mut out, 273, strip_offsets[0]),
        }
        write_entry_short(&mut out, 277, 1); // SamplesPerPixel
        write_entry_long(&mut out, 278, self.rows_per_strip);
        match strip_counts_at {
            Some(at) => write_entry_long_array(&mut out, 279, strip_counts.len() as u32, at),
            None => write_entry_long(&mut out, 279, strip_counts[0]),
        }
        write_entry_short(&mut out, 339, 3); // SampleFormat: float
        write_entry_doubles(&mut out, 33550, 3, pixel_scale_at);
        write_entry_doubles(&mut out, 33922, 6, tiepoint_at);
        if let Some(text) = &nodata_text {
            write_entry_ascii(&mut out, 42113, text.len() as u32, nodata_at);
        }
        out.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

        // Fix the compression entry now that the flag is known.
        let compression: u16 = if self.deflate { 8 } else { 1 };
        let comp_entry_at = ifd_offset as usize + 2 + 3 * 12 + 8;
        out[comp_entry_at..comp_entry_at + 2].copy_from_slice(&compression.to_le_bytes());

        if let Some(at) = strip_offsets_at {
            assert_eq!(out.len(), at as usize);
            for v in &strip_offsets {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        if let Some(at) = strip_counts_at {
            assert_eq!(out.len(), at as usize);
            for v in &strip_counts {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }

        assert_eq!(out.len(), pixel_scale_at as usize);
        for v in [self.pixel_scale.0, self.pixel_scale.1, 0.0] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(out.len(), tiepoint_at as usize);
        for v in [0.0, 0.0, 0.0, self.origin.0, self.origin.1, 0.0] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        if let Some(text) = &nodata_text {
            out.extend_from_slice(text);
        }

        out
    }
}

fn write_entry_short(out: &mut Vec<u8>, tag: u16, value: u16) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&3u16.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
    out.extend_from_slice(&[0, 0]);
}

fn write_entry_long(out: &mut Vec<u8>, tag: u16, value: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}

fn write_entry_long_array(out: &mut Vec<u8>, tag: u16, count: u32, offset: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&offset.to_le_bytes());
}

fn write_entry_doubles(out: &mut Vec<u8>, tag: u16, count: u32, offset: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&12u16.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&offset.to_le_bytes());
}

fn write_entry_ascii(out: &mut Vec<u8>, tag: u16, count: u32, offset: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&offset.to_le_bytes());
}
