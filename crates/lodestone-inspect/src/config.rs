use lodestone_nbt::{LengthPrefix, NbtFormat};
use lodestone_types::ProtocolVersion;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    #[serde(default = "default_protocol")]
    pub protocol: ProtocolVersion,
    #[serde(default = "default_nbt_strings")]
    pub nbt_strings: LengthPrefix,
    #[serde(default = "default_nbt_lists")]
    pub nbt_lists: LengthPrefix,
    #[serde(default = "default_gzip")]
    pub gzip: bool,
}

fn default_protocol() -> ProtocolVersion {
    ProtocolVersion::V1_12_2
}
fn default_nbt_strings() -> LengthPrefix {
    LengthPrefix::U16
}
fn default_nbt_lists() -> LengthPrefix {
    LengthPrefix::I32
}
fn default_gzip() -> bool {
    true
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            nbt_strings: default_nbt_strings(),
            nbt_lists: default_nbt_lists(),
            gzip: default_gzip(),
        }
    }
}

impl InspectConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: InspectConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn nbt_format(&self) -> NbtFormat {
        NbtFormat::new(self.nbt_strings, self.nbt_lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: InspectConfig = toml::from_str("").unwrap();
        assert_eq!(config.protocol, ProtocolVersion::V1_12_2);
        assert_eq!(config.nbt_format(), NbtFormat::JAVA);
        assert!(config.gzip);
    }

    #[test]
    fn test_parse_all_fields() {
        let config: InspectConfig = toml::from_str(
            r#"
            protocol = 47
            nbt_strings = "varint"
            nbt_lists = "varint"
            gzip = false
            "#,
        )
        .unwrap();
        assert_eq!(config.protocol, ProtocolVersion::V1_8);
        assert_eq!(config.nbt_format(), NbtFormat::VARINT);
        assert!(!config.gzip);
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        assert!(toml::from_str::<InspectConfig>("protocol = 393").is_err());
        assert!(toml::from_str::<InspectConfig>("nbt_lists = \"u8\"").is_err());
    }

    #[test]
    fn test_load_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inspect.toml");
        let config = InspectConfig::load(&path).unwrap();
        assert_eq!(config.protocol, ProtocolVersion::V1_12_2);

        std::fs::write(&path, "protocol = 110\n").unwrap();
        let config = InspectConfig::load(&path).unwrap();
        assert_eq!(config.protocol, ProtocolVersion::V1_9_4);
        assert_eq!(config.nbt_lists, LengthPrefix::I32);
    }
}
