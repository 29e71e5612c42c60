//! Little-endian primitive codec with record padding.
//!
//! Both ends count the bytes that pass through them so records can be
//! padded to a 4-byte boundary measured from the start of the stream.

use std::io::{Read, Write};

use crate::error::SaveError;

fn padding(pos: u64) -> usize {
    ((4 - (pos & 3)) & 3) as usize
}

/// Writes save primitives to any `Write` sink.
pub struct SaveWriter<W: Write> {
    inner: W,
    pos: u64,
}

impl<W: Write> SaveWriter<W> {
    /// Wrap `inner`; positions count from here.
    pub fn new(inner: W) -> Self {
        Self { inner, pos: 0 }
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SaveError> {
        self.inner.write_all(bytes)?;
        self.pos += bytes.len() as u64;
        Ok(())
    }

    /// Write one byte.
    pub fn write_u8(&mut self, v: u8) -> Result<(), SaveError> {
        self.write_bytes(&[v])
    }

    /// Write a little-endian i16.
    pub fn write_i16(&mut self, v: i16) -> Result<(), SaveError> {
        self.write_bytes(&v.to_le_bytes())
    }

    /// Write a little-endian i32.
    pub fn write_i32(&mut self, v: i32) -> Result<(), SaveError> {
        self.write_bytes(&v.to_le_bytes())
    }

    /// Write a little-endian u32.
    pub fn write_u32(&mut self, v: u32) -> Result<(), SaveError> {
        self.write_bytes(&v.to_le_bytes())
    }

    /// Write a boolean as a 32-bit `0` or `1`.
    pub fn write_bool(&mut self, v: bool) -> Result<(), SaveError> {
        self.write_i32(i32::from(v))
    }

    /// Write zero bytes up to the next 4-byte boundary.
    pub fn pad(&mut self) -> Result<(), SaveError> {
        let n = padding(self.pos);
        self.write_bytes(&[0; 3][..n])
    }

    /// Flush the sink.
    pub fn flush(&mut self) -> Result<(), SaveError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Reads save primitives from any `Read` source.
pub struct SaveReader<R: Read> {
    inner: R,
    pos: u64,
}

impl<R: Read> SaveReader<R> {
    /// Wrap `inner`; positions count from here.
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Bytes read so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Fill `buf` exactly.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), SaveError> {
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SaveError> {
        let mut buf = [0u8; N];
        self.read_bytes(&mut buf)?;
        Ok(buf)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8, SaveError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian i16.
    pub fn read_i16(&mut self) -> Result<i16, SaveError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian i32.
    pub fn read_i32(&mut self) -> Result<i32, SaveError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32, SaveError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a 32-bit boolean; any non-zero value is `true`.
    pub fn read_bool(&mut self) -> Result<bool, SaveError> {
        Ok(self.read_i32()? != 0)
    }

    /// Skip bytes up to the next 4-byte boundary.
    pub fn skip_pad(&mut self) -> Result<(), SaveError> {
        let mut buf = [0u8; 3];
        let n = padding(self.pos);
        self.read_bytes(&mut buf[..n])
    }
}
