mod cursor;
mod types;

pub use cursor::*;
pub use types::*;
