//! Shapefile test data builder.
//!
//! Serializes minimal valid .shp (and optionally .dbf) files for testing
//! the parser.

/// Shapes accepted by the builder.
pub enum Shape {
    Point(f64, f64),
    PolyLine(Vec<Vec<(f64, f64)>>),
    Polygon(Vec<Vec<(f64, f64)>>),
}

pub struct ShapefileBuilder {
    shapes: Vec<Shape>,
    bbox: (f64, f64, f64, f64),
}

impl ShapefileBuilder {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            bbox: (0.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn with_bbox(mut self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        self.bbox = (xmin, ymin, xmax, ymax);
        self
    }

    pub fn add(mut self, shape: Shape) -> Self {
        self.shapes.push(shape);
        self
    }

    /// Serialize to .shp bytes.
    pub fn build_shp(&self) -> Vec<u8> {
        let mut records = Vec::new();
        for (i, shape) in self.shapes.iter().enumerate() {
            let content = encode_shape(shape);
            records.extend_from_slice(&(i as i32 + 1).to_be_bytes());
            records.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
            records.extend_from_slice(&content);
        }

        let file_len_words = ((100 + records.len()) / 2) as i32;
        let mut out = Vec::with_capacity(100 + records.len());
        out.extend_from_slice(&9994i32.to_be_bytes());
        out.extend_from_slice(&[0u8; 20]); // unused
        out.extend_from_slice(&file_len_words.to_be_bytes());
        out.extend_from_slice(&1000i32.to_le_bytes()); // version
        let first_type = self.shapes.first().map(shape_type).unwrap_or(0);
        out.extend_from_slice(&first_type.to_le_bytes());
        for v in [self.bbox.0, self.bbox.1, self.bbox.2, self.bbox.3] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&[0u8; 32]); // z/m ranges
        out.extend_from_slice(&records);
        out
    }

    /// Serialize a .dbf sidecar with a single character field per record.
    pub fn build_dbf(&self, field_name: &str, values: &[&str]) -> Vec<u8> {
        assert_eq!(values.len(), self.shapes.len());
        let field_len = 16usize;
        let header_size = 32 + 32 + 1; // header + one descriptor + terminator
        let record_size = 1 + field_len;

        let mut out = Vec::new();
        out.push(0x03); // dBASE III
        out.extend_from_slice(&[0, 0, 0]); // last update date
        out.extend_from_slice(&(values.len() as u32).to_le_bytes());
        out.extend_from_slice(&(header_size as u16).to_le_bytes());
        out.extend_from_slice(&(record_size as u16).to_le_bytes());
        out.extend_from_slice(&[0u8; 20]); // reserved

        let mut descriptor = [0u8; 32];
        let name_bytes = field_name.as_bytes();
        descriptor[..name_bytes.len().min(10)]
            .copy_from_slice(&name_bytes[..name_bytes.len().min(10)]);
        descriptor[11] = b'C';
        descriptor[16] = field_len as u8;
        out.extend_from_slice(&descriptor);
        out.push(0x0D);

        for value in values {
            out.push(b' '); // not deleted
            let mut field = vec![b' '; field_len];
            let v = value.as_bytes();
            field[..v.len().min(field_len)].copy_from_slice(&v[..v.len().min(field_len)]);
            out.extend_from_slice(&field);
        }
        out.push(0x1A); // EOF marker
        out
    }
}

fn shape_type(shape: &Shape) -> i32 {
    match shape {
        Shape::Point(..) => 1,
        Shape::PolyLine(..) => 3,
        Shape::Polygon(..) => 5,
    }
}

fn encode_shape(shape: &Shape) -> Vec<u8> {
    let mut out = Vec::new();
    match shape {
        Shape::Point(x, y) => {
            out.extend_from_slice(&1i32.to_le_bytes());
            out.extend_from_slice(&x.to_le_bytes());
            out.extend_from_slice(&y.to_le_bytes());
        }
        Shape::PolyLine(parts) | Shape::Polygon(parts) => {
            out.extend_from_slice(&shape_type(shape).to_le_bytes());

            let all: Vec<(f64, f64)> = parts.iter().flatten().copied().collect();
            let xmin = all.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
            let ymin = all.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
            let xmax = all.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
            let ymax = all.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
            for v in [xmin, ymin, xmax, ymax] {
                out.extend_from_slice(&v.to_le_bytes());
            }

            out.extend_from_slice(&(parts.len() as i32).to_le_bytes());
            out.extend_from_slice(&(all.len() as i32).to_le_bytes());
            let mut start = 0i32;
            for part in parts {
                out.extend_from_slice(&start.to_le_bytes());
                start += part.len() as i32;
            }
            for (x, y) in &all {
                out.extend_from_slice(&x.to_le_bytes());
                out.extend_from_slice(&y.to_le_bytes());
            }
        }
    }
    out
}
