pub mod adapter;
pub mod block;
pub mod connection;
pub mod error;
pub mod legacy;
pub mod packets;
pub mod slot;
pub mod state;
pub mod version;

pub use adapter::*;
pub use block::*;
pub use connection::{ChannelSink, OutgoingPacket, PacketSink, PlayerSession};
pub use error::*;
pub use legacy::*;
pub use packets::*;
pub use slot::*;
pub use state::*;
pub use version::*;
