mod adapter;

pub use adapter::*;
