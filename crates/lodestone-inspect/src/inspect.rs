use crate::config::InspectConfig;
use anyhow::{bail, Context};
use lodestone_buffer::PacketBuffer;
use lodestone_nbt::{from_bytes, from_gzip_bytes, is_gzip, NamedTag};
use lodestone_protocol_core::{Direction, InternalPacket, ProtocolAdapter, VersionContext};
use lodestone_protocol_v1_12::V1_12Adapter;
use lodestone_protocol_v1_8::V1_8Adapter;
use lodestone_types::ProtocolVersion;
use std::fmt::Write;

/// Only 1.8 and 1.12.2 carry a packet id table.
pub fn adapter_for(version: ProtocolVersion) -> anyhow::Result<Box<dyn ProtocolAdapter>> {
    let context = VersionContext::for_version(version);
    match context.protocol() {
        47 => Ok(Box::new(V1_8Adapter::new())),
        340 => Ok(Box::new(V1_12Adapter::new())),
        protocol => bail!(
            "no packet id table for {} (protocol {})",
            version.name(),
            protocol
        ),
    }
}

/// Decode one packet body and render it for display.
pub fn describe_packet(
    adapter: &dyn ProtocolAdapter,
    direction: Direction,
    id: i32,
    payload: &[u8],
) -> anyhow::Result<String> {
    let mut buf = PacketBuffer::from(payload);
    let packet = adapter
        .decode_packet(direction, id, &mut buf)
        .with_context(|| format!("failed to decode {} packet 0x{:02X}", direction, id))?;

    let mut out = String::new();
    match &packet {
        InternalPacket::Unknown { data, .. } => {
            writeln!(out, "unknown {} packet 0x{:02X}, {} bytes", direction, id, data.len())?;
            writeln!(out, "{}", hex(data))?;
        }
        other => {
            writeln!(out, "{} ({}, 0x{:02X})", other.name(), direction, id)?;
            writeln!(out, "{:#?}", other)?;
        }
    }
    if buf.has_remaining() {
        writeln!(out, "{} trailing bytes: {}", buf.remaining(), hex(buf.unread()))?;
    }
    Ok(out)
}

pub fn read_nbt(bytes: &[u8], config: &InspectConfig) -> anyhow::Result<NamedTag> {
    let format = config.nbt_format();
    let tag = if is_gzip(bytes) {
        if !config.gzip {
            bail!("file is gzip compressed and gzip input is disabled");
        }
        from_gzip_bytes(bytes, format)?
    } else {
        from_bytes(bytes, format)?
    };
    Ok(tag)
}

pub fn describe_nbt(tag: &NamedTag) -> String {
    format!("{} {:?}: {}", tag.tag_type(), tag.name, tag.value)
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
