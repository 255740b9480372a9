use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Sequential big-endian reader over an in-memory class file.
///
/// Every read checks the remaining length first, so a failed read leaves the
/// cursor where it was.
pub struct Reader<'a> {
    r: Cursor<&'a [u8]>,
    base: u64,
}
impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    /// A reader over a slice that starts `base` bytes into the class file, so
    /// reported positions stay relative to the whole file.
    pub fn with_base(buf: &'a [u8], base: u64) -> Self {
        Self {
            r: Cursor::new(buf),
            base,
        }
    }

    pub fn position(&self) -> u64 {
        self.base + self.r.position()
    }

    pub fn remaining(&self) -> usize {
        let len = self.r.get_ref().len() as u64;
        len.saturating_sub(self.r.position()) as usize
    }

    /// Splits off the next `len` bytes, or fewer if the input ends first, as a
    /// reader of their own and moves past them.
    pub fn sub_reader(&mut self, len: usize) -> Reader<'a> {
        let buf: &'a [u8] = *self.r.get_ref();
        let start = self.r.position() as usize;
        let end = start + len.min(self.remaining());
        self.r.set_position(end as u64);

        Reader::with_base(&buf[start..end], self.base + start as u64)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.r.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.r.read_u16::<Endian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.r.read_u32::<Endian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.r.read_i32::<Endian>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        Ok(self.r.read_i64::<Endian>()?)
    }

    pub fn read_u16_vec(&mut self, count: usize) -> Result<Vec<u16>> {
        self.ensure(count * 2)?;
        let mut values = vec![0u16; count];
        self.r.read_u16_into::<Endian>(&mut values)?;
        Ok(values)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure(count)?;
        let mut bytes = vec![0u8; count];
        self.r.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(ClassFileError::TruncatedInput {
                offset: self.position(),
                needed,
                remaining,
            });
        }

        Ok(())
    }
}
