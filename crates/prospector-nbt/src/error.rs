use prospector_types::Truncated;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NbtError {
    #[error("Unknown NBT tag id {0}")]
    UnknownTag(u8),
    #[error("NBT truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("Root tag must be a compound, got tag id {0}")]
    InvalidRoot(u8),
    #[error("Negative length {0}")]
    NegativeLength(i32),
    #[error("End tag is not a value")]
    UnexpectedEnd,
    #[error("List mixes tag id {expected} with tag id {found}")]
    HeterogeneousList { expected: u8, found: u8 },
    #[error("String is not valid modified UTF-8")]
    InvalidString,
    #[error("String too long: {0} bytes")]
    StringTooLong(usize),
    #[error("Array too long: {0} elements")]
    ArrayTooLong(usize),
    #[error("Nesting deeper than {0} levels")]
    TooDeep(usize),
    #[error("Decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
}

impl From<Truncated> for NbtError {
    fn from(t: Truncated) -> Self {
        NbtError::Truncated {
            needed: t.needed,
            available: t.available,
        }
    }
}

pub type NbtResult<T> = Result<T, NbtError>;
