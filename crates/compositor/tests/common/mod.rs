//! Test fixtures: minimal on-disk GeoTIFF rasters for pipeline tests.

use std::path::Path;

/// Write a single-strip, uncompressed float32 GeoTIFF with the given
/// values and a 0.1-degree grid anchored at `origin` (top-left corner).
pub fn write_geotiff(path: &Path, width: u32, height: u32, values: &[f32], origin: (f64, f64)) {
    assert_eq!(values.len(), (width * height) as usize);

    let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let mut ifd_offset = 8 + data.len();
    if ifd_offset % 2 == 1 {
        ifd_offset += 1;
    }

    let num_entries: u16 = 12;
    let aux = ifd_offset + 2 + num_entries as usize * 12 + 4;
    let pixel_scale_at = aux;
    let tiepoint_at = aux + 3 * 8;

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&(ifd_offset as u32).to_le_bytes());
    out.extend_from_slice(&data);
    while out.len() < ifd_offset {
        out.push(0);
    }

    out.extend_from_slice(&num_entries.to_le_bytes());
    entry(&mut out, 256, 4, 1, width); // ImageWidth
    entry(&mut out, 257, 4, 1, height); // ImageLength
    entry_short(&mut out, 258, 32); // BitsPerSample
    entry_short(&mut out, 259, 1); // Compression: none
    entry_short(&mut out, 262, 1); // PhotometricInterpretation
    entry(&mut out, 273, 4, 1, 8); // StripOffsets: data starts after header
    entry_short(&mut out, 277, 1); // SamplesPerPixel
    entry(&mut out, 278, 4, 1, height); // RowsPerStrip
    entry(&mut out, 279, 4, 1, data.len() as u32); // StripByteCounts
    entry_short(&mut out, 339, 3); // SampleFormat: float
    entry(&mut out, 33550, 12, 3, pixel_scale_at as u32); // ModelPixelScale
    entry(&mut out, 33922, 12, 6, tiepoint_at as u32); // ModelTiepoint
    out.extend_from_slice(&0u32.to_le_bytes());

    for v in [0.1f64, 0.1, 0.0] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in [0.0, 0.0, 0.0, origin.0, origin.1, 0.0] {
        out.extend_from_slice(&v.to_le_bytes());
    }

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, out).unwrap();
}

fn entry(out: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&field_type.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}

fn entry_short(out: &mut Vec<u8>, tag: u16, value: u16) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&3u16.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
    out.extend_from_slice(&[0, 0]);
}
