use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use super::format80;
use crate::error::{Error, Result};

/// LZO1X payloads (IsoMapPack5)
pub const VARIANT_LZO: u32 = 5;
/// Format80 payloads (OverlayPack, OverlayDataPack)
pub const VARIANT_FORMAT80: u32 = 80;

/// Decompresses a pack blob into a caller-sized buffer.
pub trait PackCodec {
    /// Decode `src` into `dst`. `variant` selects the payload codec; `None`
    /// means the codec's default. Returns the number of bytes written.
    fn decode(&self, src: &[u8], dst: &mut [u8], variant: Option<u32>) -> Result<usize>;
}

/// Chunked pack codec used by map files: each chunk is
/// `u16 compressed size`, `u16 decompressed size`, payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format5;

impl PackCodec for Format5 {
    fn decode(&self, src: &[u8], dst: &mut [u8], variant: Option<u32>) -> Result<usize> {
        let variant = variant.unwrap_or(VARIANT_LZO);
        if variant != VARIANT_LZO && variant != VARIANT_FORMAT80 {
            return Err(Error::CorruptStream(format!("unknown codec variant {variant}")));
        }

        let mut input = Cursor::new(src);
        let mut written = 0usize;
        let mut chunks = 0usize;

        // A zero-sized header or a stream too short for another header ends the pack.
        while src.len() - input.position() as usize >= 4 {
            let size_in = input.read_u16::<LittleEndian>()? as usize;
            let size_out = input.read_u16::<LittleEndian>()? as usize;
            if size_in == 0 || size_out == 0 {
                break;
            }
            if written + size_out > dst.len() {
                return Err(Error::CorruptStream(format!(
                    "chunk {chunks} needs {size_out} bytes at offset {written}, buffer holds {}",
                    dst.len()
                )));
            }

            let start = input.position() as usize;
            let payload = src.get(start..start + size_in).ok_or_else(|| {
                Error::CorruptStream(format!("chunk {chunks} payload of {size_in} bytes past end of pack"))
            })?;
            input.set_position((start + size_in) as u64);

            let out = &mut dst[written..written + size_out];
            let n = match variant {
                VARIANT_FORMAT80 => format80::decode_into(payload, out)?,
                _ => lzo_into(payload, out)?,
            };
            if n != size_out {
                return Err(Error::size_mismatch("pack chunk", size_out, n));
            }

            written += n;
            chunks += 1;
        }

        debug!(variant, chunks, written, "decoded pack");
        Ok(written)
    }
}

fn lzo_into(payload: &[u8], out: &mut [u8]) -> Result<usize> {
    let decoded = lzokay_native::decompress_all(payload, Some(out.len()))
        .map_err(|e| Error::CorruptStream(format!("lzo: {e:?}")))?;
    if decoded.len() > out.len() {
        return Err(Error::size_mismatch("lzo chunk", out.len(), decoded.len()));
    }
    out[..decoded.len()].copy_from_slice(&decoded);
    Ok(decoded.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::writer::{format5_pack, format80_literals, BinaryWriter};

    #[test]
    fn test_multi_chunk_lzo() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 253) as u8).collect();
        let pack = format5_pack(&data, VARIANT_LZO);

        let mut dst = vec![0u8; data.len() + 4];
        let n = Format5.decode(&pack, &mut dst, None).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(&dst[..n], &data[..]);
    }

    #[test]
    fn test_format80_variant() {
        let data = vec![0xFFu8; 1000];
        let pack = format5_pack(&data, VARIANT_FORMAT80);

        let mut dst = vec![0u8; 1000];
        let n = Format5.decode(&pack, &mut dst, Some(VARIANT_FORMAT80)).unwrap();
        assert_eq!(n, 1000);
        assert!(dst.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_zero_header_terminates() {
        let mut w = BinaryWriter::new();
        w.write_chunk(&format80_literals(b"abc"), 3);
        w.write_u16_le(0);
        w.write_u16_le(0);
        w.write_chunk(&format80_literals(b"ignored"), 7);

        let mut dst = vec![0u8; 16];
        let n = Format5.decode(&w.into_vec(), &mut dst, Some(VARIANT_FORMAT80)).unwrap();
        assert_eq!(&dst[..n], b"abc");
    }

    #[test]
    fn test_announced_size_mismatch() {
        let mut w = BinaryWriter::new();
        w.write_chunk(&format80_literals(b"abc"), 5);

        let mut dst = vec![0u8; 16];
        let err = Format5.decode(&w.into_vec(), &mut dst, Some(VARIANT_FORMAT80)).unwrap_err();
        assert!(matches!(err, Error::CorruptStream(_)), "{err}");
    }

    #[test]
    fn test_destination_too_small() {
        let pack = format5_pack(&[1u8; 64], VARIANT_LZO);
        let mut dst = vec![0u8; 32];
        let err = Format5.decode(&pack, &mut dst, None).unwrap_err();
        assert!(matches!(err, Error::CorruptStream(_)));
    }

    #[test]
    fn test_truncated_payload() {
        let mut pack = format5_pack(b"some terrain bytes", VARIANT_LZO);
        pack.truncate(pack.len() - 5);
        let mut dst = vec![0u8; 64];
        let err = Format5.decode(&pack, &mut dst, None).unwrap_err();
        assert!(matches!(err, Error::CorruptStream(_)), "{err}");
    }

    #[test]
    fn test_lzo_back_reference() {
        // four literals, then a 4-byte match four bytes back, then the end marker
        let payload = [21, b'a', b'b', b'c', b'd', 0x6C, 0x00, 0x11, 0x00, 0x00];
        let mut w = BinaryWriter::new();
        w.write_chunk(&payload, 8);

        let mut dst = vec![0u8; 8];
        let n = Format5.decode(&w.into_vec(), &mut dst, None).unwrap();
        assert_eq!(&dst[..n], b"abcdabcd");
    }

    #[test]
    fn test_garbage_lzo_is_corrupt() {
        let mut w = BinaryWriter::new();
        // literal run far longer than the payload
        w.write_chunk(&[0x7C, 0x10, 0x11, 0x00, 0x00], 16);
        let mut dst = vec![0u8; 16];
        let err = Format5.decode(&w.into_vec(), &mut dst, None).unwrap_err();
        assert!(matches!(err, Error::CorruptStream(_)), "{err}");
    }

    #[test]
    fn test_unknown_variant() {
        let mut dst = vec![0u8; 4];
        assert!(Format5.decode(&[], &mut dst, Some(3)).is_err());
    }
}
