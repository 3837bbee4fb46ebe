use crate::{read_root, NbtError, NbtResult, NbtValue, RootMode};
use flate2::read::GzDecoder;
use prospector_types::ByteCursor;
use std::io::Read as _;

/// Something that can inflate a compressed NBT blob.
pub trait Decompressor {
    fn decompress(&self, data: &[u8]) -> std::io::Result<Vec<u8>>;
}

/// Gzip, the wrapping used by level.dat-style NBT files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gzip;

impl Decompressor for Gzip {
    fn decompress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}

/// Decompress `data` and read a root tag from the result.
pub fn read_compressed_root(
    data: &[u8],
    mode: RootMode,
    decompressor: &dyn Decompressor,
) -> NbtResult<NbtValue> {
    let raw = decompressor.decompress(data).map_err(NbtError::Decompress)?;
    let mut cur = ByteCursor::new(&raw);
    read_root(&mut cur, mode)
}
