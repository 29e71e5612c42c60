//! Zone configuration.

use std::error::Error;
use std::fmt;

use crate::block::{HEADER_SIZE, MEM_ALIGN, MIN_FRAGMENT};

// ── ZoneConfig ─────────────────────────────────────────────────────

/// Configuration for a [`Zone`](crate::Zone).
///
/// The region is allocated once at construction and never resized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneConfig {
    /// Total region size in bytes, headers and sentinel included.
    /// Must be a multiple of 8. Default: 6 MiB.
    pub size: usize,
    /// Overwrite freed payloads with zeroes.
    pub zero_on_free: bool,
    /// On every free, scan level-lifetime blocks for words pointing into
    /// the freed extent and report each one.
    pub scan_on_free: bool,
    /// A free block is split only when the leftover tail exceeds this many
    /// bytes. Default: 64.
    pub min_fragment: u32,
}

impl ZoneConfig {
    /// Default region size in MiB.
    pub const DEFAULT_SIZE_MB: usize = 6;

    /// Smallest accepted region: the sentinel plus room for a few blocks.
    pub const MIN_SIZE: usize = 16 * HEADER_SIZE;

    /// Largest accepted region; block links are 32-bit offsets.
    pub const MAX_SIZE: usize = (u32::MAX as usize) & !(MEM_ALIGN - 1);

    /// A config for a region of `size` bytes with debug toggles off.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            zero_on_free: false,
            scan_on_free: false,
            min_fragment: MIN_FRAGMENT,
        }
    }

    /// A config for a region of `mb` MiB.
    pub fn with_megabytes(mb: usize) -> Self {
        Self::new(mb.saturating_mul(1024 * 1024))
    }

    /// Parse zone options from command-line style arguments.
    ///
    /// Recognises `-mb <n>`, `-zonezero` and `-zonescan`; every other
    /// argument is ignored.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-mb" => {
                    let value = args.next().ok_or(ConfigError::MissingValue { flag: "-mb" })?;
                    let value = value.as_ref();
                    let mb: usize = value.parse().map_err(|_| ConfigError::BadValue {
                        flag: "-mb",
                        value: value.to_string(),
                    })?;
                    config.size = mb.saturating_mul(1024 * 1024);
                }
                "-zonezero" => config.zero_on_free = true,
                "-zonescan" => config.scan_on_free = true,
                _ => {}
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Check structural constraints on the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < Self::MIN_SIZE {
            return Err(ConfigError::TooSmall {
                size: self.size,
                min: Self::MIN_SIZE,
            });
        }
        if self.size > Self::MAX_SIZE {
            return Err(ConfigError::TooLarge {
                size: self.size,
                max: Self::MAX_SIZE,
            });
        }
        if self.size % MEM_ALIGN != 0 {
            return Err(ConfigError::Misaligned { size: self.size });
        }
        if self.min_fragment as usize >= self.size {
            return Err(ConfigError::FragmentTooLarge {
                min_fragment: self.min_fragment,
            });
        }
        Ok(())
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self::with_megabytes(Self::DEFAULT_SIZE_MB)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`ZoneConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Region smaller than [`ZoneConfig::MIN_SIZE`].
    TooSmall {
        /// Requested size.
        size: usize,
        /// Minimum size.
        min: usize,
    },
    /// Region larger than 32-bit offsets can address.
    TooLarge {
        /// Requested size.
        size: usize,
        /// Maximum size.
        max: usize,
    },
    /// Region size is not a multiple of the block alignment.
    Misaligned {
        /// Requested size.
        size: usize,
    },
    /// `min_fragment` is not smaller than the region.
    FragmentTooLarge {
        /// Requested fragment threshold.
        min_fragment: u32,
    },
    /// A flag expecting a value was last on the command line.
    MissingValue {
        /// The flag.
        flag: &'static str,
    },
    /// A flag value failed to parse.
    BadValue {
        /// The flag.
        flag: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { size, min } => {
                write!(f, "zone size {size} is below the minimum of {min} bytes")
            }
            Self::TooLarge { size, max } => {
                write!(f, "zone size {size} exceeds the maximum of {max} bytes")
            }
            Self::Misaligned { size } => {
                write!(f, "zone size {size} is not a multiple of {MEM_ALIGN}")
            }
            Self::FragmentTooLarge { min_fragment } => {
                write!(f, "min_fragment {min_fragment} is not smaller than the zone")
            }
            Self::MissingValue { flag } => write!(f, "{flag} requires a value"),
            Self::BadValue { flag, value } => write!(f, "invalid value for {flag}: {value:?}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_six_megabytes_and_valid() {
        let config = ZoneConfig::default();
        assert_eq!(config.size, 6 * 1024 * 1024);
        assert!(!config.zero_on_free);
        assert!(!config.scan_on_free);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_tiny_region() {
        let err = ZoneConfig::new(64).validate().unwrap_err();
        assert!(matches!(err, ConfigError::TooSmall { size: 64, .. }));
    }

    #[test]
    fn validate_rejects_misaligned_region() {
        let err = ZoneConfig::new(4097).validate().unwrap_err();
        assert_eq!(err, ConfigError::Misaligned { size: 4097 });
    }

    #[test]
    fn from_args_reads_flags() {
        let config = ZoneConfig::from_args(["game", "-mb", "2", "-zonezero", "-zonescan"]).unwrap();
        assert_eq!(config.size, 2 * 1024 * 1024);
        assert!(config.zero_on_free);
        assert!(config.scan_on_free);
    }

    #[test]
    fn from_args_rejects_bad_megabytes() {
        let err = ZoneConfig::from_args(["-mb", "lots"]).unwrap_err();
        assert!(matches!(err, ConfigError::BadValue { flag: "-mb", .. }));
        let err = ZoneConfig::from_args(["-mb"]).unwrap_err();
        assert_eq!(err, ConfigError::MissingValue { flag: "-mb" });
    }
}
