//! A `VarInt` is a non-negative integer of up to 63 bits written as a sequence of 7 bit groups, most significant group
//! first. Every byte except the last one has its high bit set. Zero is written as a single zero byte and
//! `i64::MAX` takes exactly nine bytes.

use crate::error::VarIntError;
use std::convert::TryFrom;
use std::io::Write;

const CONTINUATION: u8 = 0x80;
const GROUP: u8 = 0x7f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VarInt(u64);

impl VarInt {

    pub const MAX: u64 = i64::MAX as u64;

    /// The maximum number of bytes an encoded `VarInt` occupies
    pub const MAX_SIZE: usize = 9;

    pub fn new(value: u64) -> Result<Self, VarIntError> {
        if value > Self::MAX {
            Err(VarIntError::Range(value as i128))
        } else {
            Ok(VarInt(value))
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the number of bytes needed to encode this value
    pub fn size(&self) -> usize {
        let bits = 64 - self.0.leading_zeros() as usize;
        std::cmp::max(1, (bits + 6) / 7)
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut buf = [0u8; Self::MAX_SIZE];
        let len = self.fill(&mut buf);
        buf[..len].to_vec()
    }

    /// Adds `delta` in place. Returns `true` if the encoded size changed, which tells the caller that storage holding
    /// the encoded form has to be resized.
    pub fn add(&mut self, delta: i64) -> Result<bool, VarIntError> {
        let before = self.size();
        let next = self.0 as i128 + delta as i128;
        if next < 0 || next > Self::MAX as i128 {
            return Err(VarIntError::Range(next));
        }
        self.0 = next as u64;
        Ok(self.size() != before)
    }

    /// Returns the number of written bytes
    pub fn encode<W: Write>(&self, w: &mut W) -> std::io::Result<usize> {
        let mut buf = [0u8; Self::MAX_SIZE];
        let len = self.fill(&mut buf);
        w.write_all(&buf[..len])?;
        Ok(len)
    }

    /// Returns the decoded value and the number of consumed bytes
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<(Self, usize), VarIntError> {
        let buf = buf.as_ref();
        let mut value = 0u64;
        for (i, b) in buf.iter().enumerate() {
            if i == Self::MAX_SIZE {
                return Err(VarIntError::TooLong);
            }
            if i == 0 && *b == CONTINUATION {
                return Err(VarIntError::NonCanonical);
            }
            value = (value << 7) | (b & GROUP) as u64;
            if b & CONTINUATION == 0 {
                return Ok((VarInt(value), i + 1));
            }
        }
        if buf.len() >= Self::MAX_SIZE {
            Err(VarIntError::TooLong)
        } else {
            Err(VarIntError::Eof)
        }
    }

    #[inline]
    fn fill(&self, buf: &mut [u8; Self::MAX_SIZE]) -> usize {
        let size = self.size();
        for (i, b) in buf.iter_mut().take(size).enumerate() {
            let shift = 7 * (size - 1 - i);
            *b = ((self.0 >> shift) as u8 & GROUP) | if i + 1 < size { CONTINUATION } else { 0 };
        }
        size
    }

}

impl TryFrom<u64> for VarInt {
    type Error = VarIntError;

    fn try_from(v: u64) -> Result<Self, Self::Error> {
        VarInt::new(v)
    }
}

impl TryFrom<i64> for VarInt {
    type Error = VarIntError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        u64::try_from(v).map_err(|_| VarIntError::Range(v as i128)).and_then(VarInt::new)
    }
}

impl TryFrom<usize> for VarInt {
    type Error = VarIntError;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        u64::try_from(v).map_err(|_| VarIntError::Range(v as i128)).and_then(VarInt::new)
    }
}

impl From<u32> for VarInt {
    fn from(v: u32) -> Self {
        VarInt(v as u64)
    }
}

impl From<VarInt> for u64 {
    fn from(v: VarInt) -> u64 {
        v.0
    }
}

impl std::fmt::Display for VarInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
