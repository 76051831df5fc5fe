//! fixed-width big-endian canvas layout used by suspend/resume files.
//!
//! no header, no length prefix: the shape is implied by the settings.
//!
//! ```text
//! coordinate  8 bytes   x: i32 BE, y: i32 BE
//! polygon     4 + 8*E   R G B A, then E coordinates
//! canvas      P * (4 + 8*E)
//! ```
//!
//! the bit view is the byte view expanded MSB-first, 8 bits per byte.

use std::sync::Arc;

use crate::dna::{Canvas, Coordinate, Polygon, Shape};
use crate::environment::Environment;
use crate::error::{EvolveError, Result};

const COORDINATE_BYTES: usize = 8;
const COLOR_BYTES: usize = 4;

#[inline]
fn put_coordinate(c: Coordinate, out: &mut Vec<u8>) {
    out.extend_from_slice(&c.x.to_be_bytes());
    out.extend_from_slice(&c.y.to_be_bytes());
}

fn put_polygon(p: &Polygon, out: &mut Vec<u8>) {
    out.extend_from_slice(&p.rgba());
    for &c in &p.coordinates {
        put_coordinate(c, out);
    }
}

#[inline]
fn read_i32(bytes: &[u8]) -> i32 {
    i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// caller guarantees `bytes.len() == 4 + 8 * edges`
fn read_polygon(bytes: &[u8]) -> Polygon {
    let coordinates = bytes[COLOR_BYTES..]
        .chunks_exact(COORDINATE_BYTES)
        .map(|c| Coordinate::new(read_i32(&c[..4]), read_i32(&c[4..])))
        .collect();
    Polygon::new([bytes[0], bytes[1], bytes[2], bytes[3]], coordinates)
}

impl Canvas {
    pub fn as_bytes(&self) -> Vec<u8> {
        profiling::scope!("Canvas::as_bytes");
        let mut out = Vec::with_capacity(self.environment().settings().canvas_bytes());
        for shape in self.shapes() {
            let Shape::Polygon(polygon) = shape;
            put_polygon(polygon, &mut out);
        }
        out
    }

    pub fn as_bits(&self) -> Vec<bool> {
        bytes_to_bits(&self.as_bytes())
    }
}

/// decode exactly one canvas; the length must equal `settings.canvas_bytes()`
pub fn canvas_from_bytes(bytes: &[u8], env: &Arc<Environment>) -> Result<Canvas> {
    let expected = env.settings().canvas_bytes();
    if bytes.len() != expected {
        return Err(EvolveError::Format { expected, actual: bytes.len(), unit: "bytes" });
    }
    Ok(decode_unchecked(bytes, env))
}

/// decode back-to-back canvases; the length must be a whole multiple of one canvas
pub fn canvases_from_bytes(bytes: &[u8], env: &Arc<Environment>) -> Result<Vec<Canvas>> {
    profiling::scope!("canvases_from_bytes");
    let per_canvas = env.settings().canvas_bytes();
    if bytes.len() % per_canvas != 0 {
        let whole = bytes.len() / per_canvas + 1;
        return Err(EvolveError::Format { expected: whole * per_canvas, actual: bytes.len(), unit: "bytes" });
    }
    Ok(bytes.chunks_exact(per_canvas).map(|chunk| decode_unchecked(chunk, env)).collect())
}

fn decode_unchecked(bytes: &[u8], env: &Arc<Environment>) -> Canvas {
    let shapes = bytes
        .chunks_exact(env.settings().polygon_bytes())
        .map(|chunk| Shape::from(read_polygon(chunk)))
        .collect();
    Canvas::assemble(Arc::clone(env), shapes)
}

/// MSB-first expansion, 8 bits per byte
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &b in bytes {
        for shift in (0..8).rev() {
            bits.push((b >> shift) & 1 == 1);
        }
    }
    bits
}

/// MSB-first collapse; the bit count must be a multiple of 8
pub fn bits_to_bytes(bits: &[bool]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(EvolveError::Format { expected: (bits.len() / 8 + 1) * 8, actual: bits.len(), unit: "bits" });
    }
    Ok(bits
        .chunks_exact(8)
        .map(|byte| byte.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect())
}

/// decoding entry point for raw suspend data
pub trait AsCanvas {
    fn as_canvas(&self, env: &Arc<Environment>) -> Result<Canvas>;
}

impl AsCanvas for [u8] {
    fn as_canvas(&self, env: &Arc<Environment>) -> Result<Canvas> {
        canvas_from_bytes(self, env)
    }
}

impl AsCanvas for [bool] {
    fn as_canvas(&self, env: &Arc<Environment>) -> Result<Canvas> {
        let expected = env.settings().canvas_bytes() * 8;
        if self.len() != expected {
            return Err(EvolveError::Format { expected, actual: self.len(), unit: "bits" });
        }
        canvas_from_bytes(&bits_to_bytes(self)?, env)
    }
}

/// `"FF 0A"`
pub fn to_byte_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ")
}

/// `"11111111 00001010"`, a space between every 8 bits
pub fn to_bit_string(bits: &[bool]) -> String {
    let mut s = String::with_capacity(bits.len() + bits.len() / 8);
    for (i, &bit) in bits.iter().enumerate() {
        if i != 0 && i % 8 == 0 {
            s.push(' ');
        }
        s.push(if bit { '1' } else { '0' });
    }
    s
}
