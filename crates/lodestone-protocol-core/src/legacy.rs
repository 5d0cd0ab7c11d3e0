use crate::packets::{decode, encode_into, Packet};
use crate::{
    PacketInBlockPlace, PacketInBlockPlaceLegacy, PacketInKeepAlive, PacketInKeepAliveLegacy,
    PacketOutKeepAlive, PacketOutKeepAliveLegacy, ProtocolError, ProtocolResult,
};
use lodestone_buffer::PacketBuffer;
use lodestone_types::ProtocolVersion;
use std::fmt;
use std::marker::PhantomData;

/// Two wire layouts of one logical packet, and the rule for picking between them.
pub trait LegacyPair {
    type Modern: Packet;
    type Legacy: Packet;

    const NAME: &'static str;

    fn is_legacy(version: ProtocolVersion) -> bool;
}

/// A packet read through a [`PacketLegacyAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Adapted<M, L> {
    Modern(M),
    Legacy(L),
}

impl<M, L> Adapted<M, L> {
    pub fn is_legacy(&self) -> bool {
        matches!(self, Adapted::Legacy(_))
    }

    pub fn modern(&self) -> Option<&M> {
        match self {
            Adapted::Modern(m) => Some(m),
            Adapted::Legacy(_) => None,
        }
    }

    pub fn legacy(&self) -> Option<&L> {
        match self {
            Adapted::Modern(_) => None,
            Adapted::Legacy(l) => Some(l),
        }
    }
}

/// Reads and writes whichever layout of `P` the given release uses.
/// The choice is made once, at construction.
pub struct PacketLegacyAdapter<P: LegacyPair> {
    version: ProtocolVersion,
    legacy: bool,
    _pair: PhantomData<fn() -> P>,
}

impl<P: LegacyPair> PacketLegacyAdapter<P> {
    /// Fails for protocol numbers outside 1.8 through 1.12.2.
    pub fn new(protocol: i32) -> ProtocolResult<Self> {
        let version = ProtocolVersion::from_protocol(protocol)
            .ok_or(ProtocolError::UnsupportedProtocolVersion(protocol))?;
        Ok(Self::for_version(version))
    }

    pub fn for_version(version: ProtocolVersion) -> Self {
        Self {
            version,
            legacy: P::is_legacy(version),
            _pair: PhantomData,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    pub fn name(&self) -> &'static str {
        P::NAME
    }

    pub fn read(&self, buf: &mut PacketBuffer) -> ProtocolResult<Adapted<P::Modern, P::Legacy>> {
        if self.legacy {
            decode::<P::Legacy>(buf).map(Adapted::Legacy)
        } else {
            decode::<P::Modern>(buf).map(Adapted::Modern)
        }
    }

    /// Fails with [`ProtocolError::InactiveVariant`] if `packet` is not the active layout.
    pub fn write(
        &self,
        packet: &Adapted<P::Modern, P::Legacy>,
        buf: &mut PacketBuffer,
    ) -> ProtocolResult<()> {
        match (self.legacy, packet) {
            (false, Adapted::Modern(p)) => encode_into(p, buf),
            (true, Adapted::Legacy(p)) => encode_into(p, buf),
            _ => Err(ProtocolError::InactiveVariant {
                packet: P::NAME,
                active: if self.legacy { "legacy" } else { "modern" },
            }),
        }
    }
}

impl<P: LegacyPair> Clone for PacketLegacyAdapter<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: LegacyPair> Copy for PacketLegacyAdapter<P> {}

impl<P: LegacyPair> fmt::Debug for PacketLegacyAdapter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketLegacyAdapter")
            .field("name", &P::NAME)
            .field("version", &self.version)
            .field("legacy", &self.legacy)
            .finish()
    }
}

/// Use item (1.9+) versus block placement with held item (1.8).
#[derive(Debug, Clone, Copy)]
pub struct BlockPlacePair;

impl LegacyPair for BlockPlacePair {
    type Modern = PacketInBlockPlace;
    type Legacy = PacketInBlockPlaceLegacy;

    const NAME: &'static str = "PacketPlayInBlockPlace";

    fn is_legacy(version: ProtocolVersion) -> bool {
        !version.is_combat_or_later()
    }
}

/// Long keep alive ids arrived in 1.12.2.
#[derive(Debug, Clone, Copy)]
pub struct InKeepAlivePair;

impl LegacyPair for InKeepAlivePair {
    type Modern = PacketInKeepAlive;
    type Legacy = PacketInKeepAliveLegacy;

    const NAME: &'static str = "PacketPlayInKeepAlive";

    fn is_legacy(version: ProtocolVersion) -> bool {
        version < ProtocolVersion::V1_12_2
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OutKeepAlivePair;

impl LegacyPair for OutKeepAlivePair {
    type Modern = PacketOutKeepAlive;
    type Legacy = PacketOutKeepAliveLegacy;

    const NAME: &'static str = "PacketPlayOutKeepAlive";

    fn is_legacy(version: ProtocolVersion) -> bool {
        version < ProtocolVersion::V1_12_2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_types::{BlockPos, Hand};

    #[test]
    fn test_block_place_selection() {
        let old = PacketLegacyAdapter::<BlockPlacePair>::new(47).unwrap();
        assert!(old.is_legacy());
        assert_eq!(old.name(), "PacketPlayInBlockPlace");
        for version in &ProtocolVersion::ALL[1..] {
            assert!(!PacketLegacyAdapter::<BlockPlacePair>::for_version(*version).is_legacy());
        }
    }

    #[test]
    fn test_keep_alive_selection() {
        for version in ProtocolVersion::ALL {
            let adapter = PacketLegacyAdapter::<InKeepAlivePair>::for_version(version);
            assert_eq!(adapter.is_legacy(), version != ProtocolVersion::V1_12_2);
            let adapter = PacketLegacyAdapter::<OutKeepAlivePair>::for_version(version);
            assert_eq!(adapter.is_legacy(), version != ProtocolVersion::V1_12_2);
        }
        assert!(PacketLegacyAdapter::<InKeepAlivePair>::new(338).unwrap().is_legacy());
        assert!(!PacketLegacyAdapter::<InKeepAlivePair>::new(340).unwrap().is_legacy());
    }

    #[test]
    fn test_unsupported_protocol() {
        for protocol in [0, 46, 341, 393, -1] {
            assert!(matches!(
                PacketLegacyAdapter::<BlockPlacePair>::new(protocol),
                Err(ProtocolError::UnsupportedProtocolVersion(p)) if p == protocol
            ));
        }
    }

    #[test]
    fn test_read_dispatches_to_active_variant() {
        let modern = PacketLegacyAdapter::<BlockPlacePair>::for_version(ProtocolVersion::V1_12_2);
        let mut buf = PacketBuffer::from(vec![0x01]);
        let packet = modern.read(&mut buf).unwrap();
        assert_eq!(
            packet.modern(),
            Some(&PacketInBlockPlace { hand: Hand::Off })
        );

        let legacy = PacketLegacyAdapter::<BlockPlacePair>::for_version(ProtocolVersion::V1_8);
        let placed = PacketInBlockPlaceLegacy {
            position: BlockPos::new(1, 2, 3),
            direction: 4,
            item: None,
            cursor_x: 8,
            cursor_y: 0,
            cursor_z: 4,
        };
        let mut buf = PacketBuffer::new();
        legacy
            .write(&Adapted::Legacy(placed.clone()), &mut buf)
            .unwrap();
        let back = legacy.read(&mut buf).unwrap();
        assert!(back.is_legacy());
        assert_eq!(back.legacy(), Some(&placed));
    }

    #[test]
    fn test_write_inactive_variant() {
        let adapter = PacketLegacyAdapter::<OutKeepAlivePair>::for_version(ProtocolVersion::V1_8);
        let mut buf = PacketBuffer::new();
        let err = adapter
            .write(&Adapted::Modern(PacketOutKeepAlive { id: 1 }), &mut buf)
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InactiveVariant {
                packet: "PacketPlayOutKeepAlive",
                active: "legacy"
            }
        ));
        assert!(buf.is_empty());

        adapter
            .write(&Adapted::Legacy(PacketOutKeepAliveLegacy { id: 1 }), &mut buf)
            .unwrap();
        assert_eq!(buf.to_vec(), vec![0x01]);
    }

    #[test]
    fn test_same_bytes_differ_by_version() {
        let bytes = vec![0, 0, 0, 0, 0, 0, 0, 42];
        let modern = PacketLegacyAdapter::<InKeepAlivePair>::new(340).unwrap();
        let legacy = PacketLegacyAdapter::<InKeepAlivePair>::new(335).unwrap();

        let mut buf = PacketBuffer::from(bytes.clone());
        assert_eq!(
            modern.read(&mut buf).unwrap(),
            Adapted::Modern(PacketInKeepAlive { id: 42 })
        );

        let mut buf = PacketBuffer::from(bytes);
        assert_eq!(
            legacy.read(&mut buf).unwrap(),
            Adapted::Legacy(PacketInKeepAliveLegacy { id: 0 })
        );
        assert_eq!(buf.remaining(), 7);
    }
}
