//! Loader configuration

use serde::{Deserialize, Serialize};

/// Default block size for checksumming a stream
pub const DEFAULT_STREAM_BLOCK_SIZE: usize = 16 * 1024;

/// Knobs for [`Loader`](crate::Loader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Chunk size used when reading a stream, both for the checksum pass and
    /// for the buffered section walk.
    /// Default: 16 KiB
    pub stream_block_size: usize,

    /// Attach LINE sections to their code units. When false they are skipped
    /// like unknown sections.
    /// Default: true
    pub load_debug_info: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            stream_block_size: DEFAULT_STREAM_BLOCK_SIZE,
            load_debug_info: true,
        }
    }
}

impl LoaderConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that ignores debug line sections.
    pub fn without_debug_info() -> Self {
        Self {
            load_debug_info: false,
            ..Default::default()
        }
    }

    /// Set the stream block size (clamped to at least one byte).
    pub fn with_stream_block_size(mut self, size: usize) -> Self {
        self.stream_block_size = size.max(1);
        self
    }

    /// Enable or disable debug line loading.
    pub fn with_debug_info(mut self, enabled: bool) -> Self {
        self.load_debug_info = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::new();
        assert_eq!(config.stream_block_size, 16384);
        assert!(config.load_debug_info);
        assert!(!LoaderConfig::without_debug_info().load_debug_info);
    }

    #[test]
    fn test_builders() {
        let config = LoaderConfig::new()
            .with_stream_block_size(0)
            .with_debug_info(false);
        assert_eq!(config.stream_block_size, 1);
        assert!(!config.load_debug_info);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LoaderConfig = serde_json::from_str(r#"{"load_debug_info": false}"#).unwrap();
        assert_eq!(config.stream_block_size, DEFAULT_STREAM_BLOCK_SIZE);
        assert!(!config.load_debug_info);

        let json = serde_json::to_string(&LoaderConfig::default()).unwrap();
        assert_eq!(
            serde_json::from_str::<LoaderConfig>(&json).unwrap(),
            LoaderConfig::default()
        );
    }
}
