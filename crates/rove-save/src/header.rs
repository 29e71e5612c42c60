//! Save header and end marker.

use std::io::{Read, Write};

use crate::error::SaveError;
use crate::stream::{SaveReader, SaveWriter};

/// Bytes reserved for the description.
pub const SAVESTRINGSIZE: usize = 24;

/// Bytes reserved for the version string.
pub const VERSIONSIZE: usize = 16;

/// Player slots recorded in the header.
pub const MAXPLAYERS: usize = 4;

/// Byte that ends every save.
pub const SAVEGAME_EOF: u8 = 0x1d;

/// Version string written by this build.
pub const SAVE_VERSION: &str = "rove save 1";

/// Identification block at the start of a save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveHeader {
    /// Player-visible description; truncated to [`SAVESTRINGSIZE`] bytes.
    pub description: String,
    /// Skill level.
    pub skill: u8,
    /// Episode number.
    pub episode: u8,
    /// Map number.
    pub map: u8,
    /// Which player slots are occupied.
    pub players_in_game: [bool; MAXPLAYERS],
    /// Level time in tics; stored in 24 bits.
    pub level_time: u32,
}

fn fixed_field<const N: usize>(s: &str) -> [u8; N] {
    let mut buf = [0u8; N];
    let n = s.len().min(N);
    buf[..n].copy_from_slice(&s.as_bytes()[..n]);
    buf
}

fn from_fixed_field(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

impl SaveHeader {
    /// Write the header.
    pub fn write<W: Write>(&self, w: &mut SaveWriter<W>) -> Result<(), SaveError> {
        w.write_bytes(&fixed_field::<SAVESTRINGSIZE>(&self.description))?;
        w.write_bytes(&fixed_field::<VERSIONSIZE>(SAVE_VERSION))?;
        w.write_u8(self.skill)?;
        w.write_u8(self.episode)?;
        w.write_u8(self.map)?;
        for &present in &self.players_in_game {
            w.write_u8(u8::from(present))?;
        }
        let t = self.level_time;
        w.write_bytes(&[(t >> 16) as u8, (t >> 8) as u8, t as u8])
    }

    /// Read and validate a header.
    pub fn read<R: Read>(r: &mut SaveReader<R>) -> Result<Self, SaveError> {
        let mut description = [0u8; SAVESTRINGSIZE];
        r.read_bytes(&mut description)?;
        let mut version = [0u8; VERSIONSIZE];
        r.read_bytes(&mut version)?;
        if version != fixed_field::<VERSIONSIZE>(SAVE_VERSION) {
            return Err(SaveError::BadVersion {
                found: from_fixed_field(&version),
            });
        }
        let skill = r.read_u8()?;
        let episode = r.read_u8()?;
        let map = r.read_u8()?;
        let mut players_in_game = [false; MAXPLAYERS];
        for slot in &mut players_in_game {
            *slot = r.read_u8()? != 0;
        }
        let mut time = [0u8; 3];
        r.read_bytes(&mut time)?;
        let level_time = (u32::from(time[0]) << 16) | (u32::from(time[1]) << 8) | u32::from(time[2]);
        Ok(Self {
            description: from_fixed_field(&description),
            skill,
            episode,
            map,
            players_in_game,
            level_time,
        })
    }
}

/// Write the end-of-save marker.
pub fn write_eof<W: Write>(w: &mut SaveWriter<W>) -> Result<(), SaveError> {
    w.write_u8(SAVEGAME_EOF)
}

/// Read and check the end-of-save marker.
pub fn read_eof<R: Read>(r: &mut SaveReader<R>) -> Result<(), SaveError> {
    match r.read_u8()? {
        SAVEGAME_EOF => Ok(()),
        found => Err(SaveError::MissingEof { found }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_and_round_trip() {
        let h = SaveHeader {
            description: "before the crusher".into(),
            skill: 3,
            episode: 1,
            map: 7,
            players_in_game: [true, false, false, false],
            level_time: 0x012345,
        };
        let mut w = SaveWriter::new(Vec::new());
        h.write(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), SAVESTRINGSIZE + VERSIONSIZE + 3 + MAXPLAYERS + 3);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x01, 0x23, 0x45]);

        let back = SaveHeader::read(&mut SaveReader::new(bytes.as_slice())).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let h = SaveHeader {
            description: "x".repeat(40),
            ..SaveHeader::default()
        };
        let mut w = SaveWriter::new(Vec::new());
        h.write(&mut w).unwrap();
        let back = SaveHeader::read(&mut SaveReader::new(w.into_inner().as_slice())).unwrap();
        assert_eq!(back.description.len(), SAVESTRINGSIZE);
    }

    #[test]
    fn foreign_version_is_rejected() {
        let mut bytes = vec![0u8; SAVESTRINGSIZE];
        bytes.extend_from_slice(&fixed_field::<VERSIONSIZE>("version 109"));
        bytes.extend_from_slice(&[0; 10]);
        let err = SaveHeader::read(&mut SaveReader::new(bytes.as_slice())).unwrap_err();
        assert!(matches!(err, SaveError::BadVersion { found } if found == "version 109"));
    }

    #[test]
    fn eof_marker_is_checked() {
        assert!(read_eof(&mut SaveReader::new(&[SAVEGAME_EOF][..])).is_ok());
        assert!(matches!(
            read_eof(&mut SaveReader::new(&[0u8][..])),
            Err(SaveError::MissingEof { found: 0 })
        ));
    }
}
