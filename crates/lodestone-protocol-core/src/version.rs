use crate::{
    BlockData, BlockRegistry, InternalPacket, LegacyBlockRegistry, LegacyPair,
    PacketLegacyAdapter, ProtocolError, ProtocolResult,
};
use lodestone_types::ProtocolVersion;
use tracing::debug;

/// The protocol release a connection speaks, and what follows from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionContext {
    version: ProtocolVersion,
    registry: LegacyBlockRegistry,
}

impl VersionContext {
    pub fn new(protocol: i32) -> ProtocolResult<Self> {
        let version = ProtocolVersion::from_protocol(protocol)
            .ok_or(ProtocolError::UnsupportedProtocolVersion(protocol))?;
        Ok(Self::for_version(version))
    }

    pub fn for_version(version: ProtocolVersion) -> Self {
        debug!(version = %version, protocol = version.protocol(), "Version context");
        Self {
            version,
            registry: LegacyBlockRegistry::for_version(version),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn protocol(&self) -> i32 {
        self.version.protocol()
    }

    /// Blocks known to this release.
    pub fn registry(&self) -> &LegacyBlockRegistry {
        &self.registry
    }

    pub fn legacy_adapter<P: LegacyPair>(&self) -> PacketLegacyAdapter<P> {
        PacketLegacyAdapter::for_version(self.version)
    }

    /// Reject values this release cannot put on the wire: blocks added by later
    /// releases and client statuses it does not send.
    pub fn check_packet(&self, packet: &InternalPacket) -> ProtocolResult<()> {
        match packet {
            InternalPacket::InClientStatus(p) if !p.status.is_supported_by(self.version) => {
                Err(ProtocolError::InvalidEnumValue {
                    kind: "client status",
                    value: p.status.id(),
                })
            }
            InternalPacket::OutBlockChange(p) => self.check_block(p.block),
            InternalPacket::OutMultiBlockChange(p) => p
                .records
                .iter()
                .try_for_each(|record| self.check_block(record.block())),
            _ => Ok(()),
        }
    }

    fn check_block(&self, block: BlockData) -> ProtocolResult<()> {
        if self.registry.contains(block.block_type()) {
            Ok(())
        } else {
            Err(ProtocolError::UnknownBlockType(block.block_type()))
        }
    }
}
