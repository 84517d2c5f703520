//! Durability mode configuration
//!
//! Controls log sync behavior (Sync, Buffered).

/// Durability mode for log appends
///
/// # Modes
///
/// | Mode | fsync | Data Loss Window |
/// |------|-------|-----------------|
/// | Sync | Every record | Zero |
/// | Buffered | Never (OS decides) | Records not yet written back by the OS (power loss only) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// Write, flush and fsync every record before returning (the default)
    ///
    /// Use when an operation must never be acknowledged before its intent is
    /// on disk.
    #[default]
    Sync,

    /// Hand every record to the OS without fsync
    ///
    /// Lower latency. A process crash loses nothing; records still in the OS
    /// page cache may be lost on power failure.
    Buffered,
}

impl DurabilityMode {
    /// Check if every append must be fsynced before returning
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Sync)
    }

    /// Config-file name of this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            DurabilityMode::Sync => "sync",
            DurabilityMode::Buffered => "buffered",
        }
    }

    /// Parse a config-file name
    ///
    /// `"async"` is accepted as an alias of `"buffered"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sync" => Some(DurabilityMode::Sync),
            "buffered" | "async" => Some(DurabilityMode::Buffered),
            _ => None,
        }
    }

    /// Human-readable description of the mode
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::Sync => "Sync (fsync every record, safest)",
            DurabilityMode::Buffered => "Buffered (OS flush, may lose recent records on power loss)",
        }
    }
}
