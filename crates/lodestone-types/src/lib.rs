mod types;
mod version;

pub use types::*;
pub use version::*;
