use std::path::PathBuf;

/// Values the host supplies alongside every block.
///
/// Track and channel are read once, when the renderer is prepared. The
/// library and tuning paths are accepted for hosts that carry them but have
/// no effect on the bundled backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInputs {
    pub enabled: bool,
    pub track: u16,
    pub channel: u8,
    pub library_path: Option<PathBuf>,
    pub tuning_path: Option<PathBuf>,
}

impl Default for BlockInputs {
    fn default() -> Self {
        Self {
            enabled: true,
            track: 0,
            channel: 0,
            library_path: None,
            tuning_path: None,
        }
    }
}

impl BlockInputs {
    pub fn for_track(track: u16) -> Self {
        Self {
            track,
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
