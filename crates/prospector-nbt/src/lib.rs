mod compression;
mod decode;
mod error;
mod nbt;

pub use compression::*;
pub use decode::*;
pub use error::*;
pub use nbt::*;
