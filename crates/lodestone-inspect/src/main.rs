mod config;
mod inspect;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::InspectConfig;
use lodestone_protocol_core::Direction;
use lodestone_types::ProtocolVersion;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lodestone-inspect",
    about = "Decode 1.8 - 1.12.2 packet bodies and NBT files"
)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "config/inspect.toml")]
    config: PathBuf,

    /// Protocol number or release name, overrides the config file
    #[arg(short, long)]
    protocol: Option<ProtocolVersion>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a packet body (without its id) read from a file
    Packet {
        #[arg(short, long, value_enum)]
        direction: DirectionArg,

        /// Packet id in hex, e.g. 0x05
        #[arg(long, value_parser = parse_hex_id)]
        id: i32,

        payload: PathBuf,
    },
    /// Print an NBT file
    Nbt { file: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    In,
    Out,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::In => Direction::Inbound,
            DirectionArg::Out => Direction::Outbound,
        }
    }
}

fn parse_hex_id(s: &str) -> Result<i32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    i32::from_str_radix(digits, 16).map_err(|e| format!("invalid packet id {s:?}: {e}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = InspectConfig::load(&args.config)?;
    if let Some(protocol) = args.protocol {
        config.protocol = protocol;
    }

    match args.command {
        Command::Packet {
            direction,
            id,
            payload,
        } => {
            info!(
                "Decoding {} with protocol {} ({})",
                payload.display(),
                config.protocol.protocol(),
                config.protocol.name()
            );
            let adapter = inspect::adapter_for(config.protocol)?;
            let bytes = std::fs::read(&payload)
                .with_context(|| format!("failed to read {}", payload.display()))?;
            print!(
                "{}",
                inspect::describe_packet(adapter.as_ref(), direction.into(), id, &bytes)?
            );
        }
        Command::Nbt { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let tag = inspect::read_nbt(&bytes, &config)?;
            println!("{}", inspect::describe_nbt(&tag));
        }
    }

    Ok(())
}
