mod codec;
mod error;
mod io;
mod nbt;

pub use codec::*;
pub use error::*;
pub use io::*;
pub use nbt::*;
