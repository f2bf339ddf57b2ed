//! Stream builders used by the decoder tests.
//!
//! Nothing here compresses: the LZO1X and Format80 encoders only emit literal
//! runs, which is enough to produce valid packs of any size.

use super::format5::{VARIANT_FORMAT80, VARIANT_LZO};

pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i16_le(&mut self, v: i16) {
        self.write_u16_le(v as u16);
    }

    /// One 11-byte IsoMapPack5 cell record
    pub fn write_cell(&mut self, rx: u16, ry: u16, tile: i16, subtile: u8, z: u8) {
        self.write_u16_le(rx);
        self.write_u16_le(ry);
        self.write_i16_le(tile);
        self.write_i16_le(0);
        self.write_u8(subtile);
        self.write_u8(z);
        self.write_u8(0);
    }

    /// Format5 chunk header followed by its payload
    pub fn write_chunk(&mut self, payload: &[u8], decoded_len: usize) {
        self.write_u16_le(payload.len() as u16);
        self.write_u16_le(decoded_len as u16);
        self.write_bytes(payload);
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// LZO1X stream made only of one literal run plus the end marker.
pub fn lzo_literals(data: &[u8]) -> Vec<u8> {
    let mut w = BinaryWriter::new();
    match data.len() {
        0 => {}
        n @ 1..=238 => w.write_u8((n + 17) as u8),
        n => {
            w.write_u8(0);
            let mut rem = n - 18;
            while rem > 255 {
                w.write_u8(0);
                rem -= 255;
            }
            w.write_u8(rem as u8);
        }
    }
    w.write_bytes(data);
    w.write_bytes(&[0x11, 0x00, 0x00]);
    w.into_vec()
}

/// Format80 stream made of literal commands plus the end command.
pub fn format80_literals(data: &[u8]) -> Vec<u8> {
    let mut w = BinaryWriter::new();
    for run in data.chunks(63) {
        w.write_u8(0x80 | run.len() as u8);
        w.write_bytes(run);
    }
    w.write_u8(0x80);
    w.into_vec()
}

/// Split `data` into Format5 chunks encoded for `variant`.
pub fn format5_pack(data: &[u8], variant: u32) -> Vec<u8> {
    let mut w = BinaryWriter::new();
    for chunk in data.chunks(8192) {
        let payload = match variant {
            VARIANT_FORMAT80 => format80_literals(chunk),
            VARIANT_LZO => lzo_literals(chunk),
            other => panic!("no test encoder for variant {other}"),
        };
        w.write_chunk(&payload, chunk.len());
    }
    w.into_vec()
}
