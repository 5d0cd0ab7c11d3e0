pub mod buffer;
pub mod codec;

pub use buffer::*;
pub use codec::*;
