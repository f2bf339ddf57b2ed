//! Format80 (LCW) chunk decoder.
//!
//! Commands, by first byte:
//! - `0x80`: end of stream
//! - `10nnnnnn`: copy `n` literal bytes
//! - `0cccpppp pppppppp`: copy `c + 3` bytes starting `p` bytes back
//! - `11cccccc pppp`: copy `c + 3` bytes from absolute output position `p`
//! - `0xFE count value`: repeat `value` `count` times
//! - `0xFF count pos`: copy `count` bytes from absolute output position `pos`

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// Decode one Format80 payload into `dst`, returning the number of bytes written.
pub fn decode_into(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let mut input = Cursor::new(src);
    let mut out = Output { dst, pos: 0 };

    loop {
        let cmd = input.read_u8()?;
        match cmd {
            0x80 => return Ok(out.pos),
            0xFE => {
                let count = input.read_u16::<LittleEndian>()? as usize;
                let value = input.read_u8()?;
                out.fill(value, count)?;
            }
            0xFF => {
                let count = input.read_u16::<LittleEndian>()? as usize;
                let from = input.read_u16::<LittleEndian>()? as usize;
                out.copy_absolute(from, count)?;
            }
            c if c & 0xC0 == 0xC0 => {
                let count = (c & 0x3F) as usize + 3;
                let from = input.read_u16::<LittleEndian>()? as usize;
                out.copy_absolute(from, count)?;
            }
            c if c & 0x80 != 0 => {
                let count = (c & 0x3F) as usize;
                let start = input.position() as usize;
                let literals = src.get(start..start + count).ok_or_else(|| {
                    Error::CorruptStream(format!("format80 literal run of {count} past end of input"))
                })?;
                input.set_position((start + count) as u64);
                out.write(literals)?;
            }
            c => {
                let count = ((c & 0x70) >> 4) as usize + 3;
                let back = (((c & 0x0F) as usize) << 8) | input.read_u8()? as usize;
                out.copy_relative(back, count)?;
            }
        }
    }
}

struct Output<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl Output<'_> {
    fn reserve(&self, count: usize) -> Result<()> {
        if self.pos + count > self.dst.len() {
            return Err(Error::CorruptStream(format!(
                "format80 output overrun at {} (+{count}, capacity {})",
                self.pos,
                self.dst.len()
            )));
        }
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.dst[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    fn fill(&mut self, value: u8, count: usize) -> Result<()> {
        self.reserve(count)?;
        self.dst[self.pos..self.pos + count].fill(value);
        self.pos += count;
        Ok(())
    }

    fn copy_relative(&mut self, back: usize, count: usize) -> Result<()> {
        if back == 0 || back > self.pos {
            return Err(Error::CorruptStream(format!(
                "format80 back-reference {back} at output {}",
                self.pos
            )));
        }
        self.copy_absolute(self.pos - back, count)
    }

    // Byte-wise: source and destination may overlap.
    fn copy_absolute(&mut self, from: usize, count: usize) -> Result<()> {
        if from >= self.pos && count > 0 {
            return Err(Error::CorruptStream(format!(
                "format80 copy from {from} beyond output {}",
                self.pos
            )));
        }
        self.reserve(count)?;
        for i in 0..count {
            self.dst[self.pos + i] = self.dst[from + i];
        }
        self.pos += count;
        Ok(())
    }
}
