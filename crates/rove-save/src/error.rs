//! Error types for saving and loading.

use std::fmt;
use std::io;

/// Errors from reading or writing a saved game.
///
/// Any error while loading leaves the level in an unspecified state; the
/// caller must discard it.
#[derive(Debug)]
pub enum SaveError {
    /// An I/O error other than a short read.
    Io(io::Error),
    /// The stream ended in the middle of a record.
    UnexpectedEof,
    /// A record class byte is not known in this section.
    UnknownClass {
        /// Which section was being read.
        section: &'static str,
        /// The unrecognised class byte.
        class: u8,
    },
    /// A sector index is out of range for the loaded level.
    BadSector {
        /// The index found in the stream.
        index: i32,
    },
    /// An enumerated field holds a value with no meaning.
    BadEnum {
        /// Name of the field.
        field: &'static str,
        /// The value found in the stream.
        value: i32,
    },
    /// The header version string does not match this build.
    BadVersion {
        /// The version string found in the stream.
        found: String,
    },
    /// The stream does not end with the end-of-save marker.
    MissingEof {
        /// The byte found where the marker was expected.
        found: u8,
    },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof => write!(f, "save stream truncated"),
            Self::UnknownClass { section, class } => {
                write!(f, "unknown {section} class {class}")
            }
            Self::BadSector { index } => write!(f, "sector index {index} out of range"),
            Self::BadEnum { field, value } => write!(f, "invalid {field} value {value}"),
            Self::BadVersion { found } => write!(f, "bad savegame version {found:?}"),
            Self::MissingEof { found } => {
                write!(f, "bad savegame: expected end marker, found {found:#04x}")
            }
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SaveError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(e)
        }
    }
}
