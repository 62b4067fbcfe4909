//! Bit strings.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use bytes::{Bytes, BytesMut};
use crate::encode::{PrimitiveContent, Target};
use crate::error::Error;
use crate::tag::Tag;


//------------ BitString -----------------------------------------------------

/// A bit string value.
///
/// Bit strings are a sequence of bits. Unlike octet strings, they do not
/// need to contain a multiple of eight bits.
///
/// There are two types of methods for accessing the data in a bit string.
/// Methods starting with `bit` operate on the individual bits while those
/// prefixed with `octet` access entire octets and ignore the fact that there
/// may be unused bits in the final octet.
///
/// # Encoding
///
/// When encoded as a primitive value, the first octet of the content
/// contains the number of unused bits in the last octet and the following
/// octets contain the bits with the first bit in the most significant bit
/// of the octet. The unused bits must be zero.
///
/// In the constructed BER encoding, the bit string is represented as a
/// sequence of bit strings which in turn may either be constructed or
/// primitive encodings. The only limitation in this nesting is that only
/// the last primitively encoded bit string may have a non-zero number of
/// unused bits. With DER, only the primitive form is allowed. Decoding the
/// constructed form is done by the decoder which then assembles the value
/// via [`from_chunks`][Self::from_chunks].
///
/// A value of this type always has its unused bits cleared.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct BitString {
    /// The number of unused bits in the last byte.
    unused: u8,

    /// The bytes of the bit string.
    bits: Bytes,
}

impl BitString {
    /// Creates a new bit string from the unused bit count and octets.
    ///
    /// Returns an error if `unused` is larger than 7, if it is non-zero for
    /// an empty bit string, or if the unused bits aren’t all zero.
    pub fn new(unused: u8, bits: Bytes) -> Result<Self, Error> {
        if unused > 7 {
            return Err(Error::decode("invalid number of unused bits"))
        }
        match bits.last() {
            None if unused != 0 => {
                Err(Error::decode("invalid number of unused bits"))
            }
            Some(&last) if last & ((1u8 << unused) - 1) != 0 => {
                Err(Error::decode("non-zero padding bits"))
            }
            _ => Ok(BitString { unused, bits })
        }
    }

    /// Creates a bit string of the given number of bits.
    ///
    /// The data is truncated or extended with zero octets to the octets
    /// required to hold `bit_len` bits and the unused bits are cleared.
    pub fn from_bits(bit_len: usize, data: &[u8]) -> Self {
        let octet_len = bit_len.div_ceil(8);
        let mut bits = BytesMut::zeroed(octet_len);
        let copy = octet_len.min(data.len());
        bits[..copy].copy_from_slice(&data[..copy]);
        let unused = (octet_len * 8 - bit_len) as u8;
        if let Some(last) = bits.last_mut() {
            *last &= !((1u8 << unused) - 1);
        }
        BitString { unused, bits: bits.freeze() }
    }

    /// Creates a bit string with the given bits set.
    ///
    /// The bit string is as long as needed to hold the highest set bit.
    /// This is the canonical form of a bit string with named bits where
    /// trailing zero bits are not significant.
    pub fn from_set_bits(set: impl IntoIterator<Item = usize>) -> Self {
        let set: Vec<_> = set.into_iter().collect();
        let bit_len = set.iter().max().map(|max| max + 1).unwrap_or(0);
        let mut data = vec![0u8; bit_len.div_ceil(8)];
        for bit in set {
            data[bit >> 3] |= 0x80 >> (bit & 7);
        }
        Self::from_bits(bit_len, &data)
    }

    /// Assembles a bit string from the primitive chunks of a constructed
    /// encoding.
    ///
    /// Each item is the unused bit count and the octets of one chunk. All
    /// chunks but the last one must have zero unused bits and there must be
    /// at least one chunk.
    pub fn from_chunks(chunks: &[(u8, Bytes)]) -> Result<Self, Error> {
        let Some(((unused, _), head)) = chunks.split_last() else {
            return Err(Error::decode("no chunks"))
        };
        if head.iter().any(|(unused, _)| *unused != 0) {
            return Err(Error::decode("not multiple of 8 bits"))
        }
        let mut bits = BytesMut::new();
        for (_, octets) in chunks {
            bits.extend_from_slice(octets)
        }
        Self::new(*unused, bits.freeze())
    }

    /// Returns the value of the given bit.
    ///
    /// Bits beyond the end of the bit string are `false`.
    pub fn bit(&self, bit: usize) -> bool {
        if bit >= self.bit_len() {
            return false
        }
        self.bits[bit >> 3] & (0x80 >> (bit & 7)) != 0
    }

    /// Returns an iterator over the indexes of all set bits.
    pub fn set_bits(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bit_len()).filter(|&bit| self.bit(bit))
    }

    /// Returns the bit string with all trailing zero bits removed.
    pub fn trim_trailing_zeros(&self) -> Self {
        Self::from_set_bits(self.set_bits())
    }

    /// Returns the number of bits in the bit string.
    pub fn bit_len(&self) -> usize {
        (self.bits.len() << 3) - (self.unused as usize)
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the number of octets in the bit string.
    pub fn octet_len(&self) -> usize {
        self.bits.len()
    }

    /// Returns an iterator over the octets in the bit string.
    pub fn octets(&self) -> BitStringIter {
        BitStringIter(self.bits.iter())
    }

    /// Returns a slice of the octets in the bit string.
    pub fn octet_slice(&self) -> &[u8] {
        self.bits.as_ref()
    }

    /// Returns a bytes value of the octets of the bit string.
    pub fn octet_bytes(&self) -> Bytes {
        self.bits.clone()
    }
}

/// # Decoding and Encoding
///
impl BitString {
    /// Parses the content octets of a primitive bit string value.
    pub fn decode_content(content: Bytes) -> Result<Self, Error> {
        let Some(&unused) = content.first() else {
            return Err(Error::decode("zero length BIT STRING content"))
        };
        Self::new(unused, content.slice(1..))
    }
}


//--- PrimitiveContent

impl PrimitiveContent for &'_ BitString {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(self) -> usize {
        self.bits.len() + 1
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(&[self.unused])?;
        target.write_all(self.bits.as_ref())
    }
}


//--- Display

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} bits", self.bit_len())?;
        if self.bit_len() > 0 {
            write!(f, " ")?;
            for octet in self.octets() {
                write!(f, "{:02x}", octet)?;
            }
        }
        Ok(())
    }
}


//------------ BitStringIter -------------------------------------------------

/// An iterator over the octets in the bit string.
#[derive(Clone, Debug)]
pub struct BitStringIter<'a>(::std::slice::Iter<'a, u8>);

impl<'a> Iterator for BitStringIter<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.0.next().cloned()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::Values;

    #[test]
    fn twelve_bits() {
        let bits = BitString::from_bits(12, b"\x81\xFF");
        assert_eq!(bits.bit_len(), 12);
        assert_eq!(bits.unused(), 4);
        assert_eq!(bits.octet_slice(), b"\x81\xF0");
        assert_eq!(bits.encode().to_vec(), b"\x03\x03\x04\x81\xf0");
        assert!(bits.bit(0));
        assert!(!bits.bit(1));
        assert!(bits.bit(7));
        assert!(bits.bit(11));
        assert!(!bits.bit(12));
    }

    #[test]
    fn empty() {
        let bits = BitString::from_bits(0, b"");
        assert_eq!(bits.encode().to_vec(), b"\x03\x01\x00");
        assert_eq!(
            BitString::decode_content(Bytes::from_static(b"\x00")).unwrap(),
            bits
        );
    }

    #[test]
    fn decode_failures() {
        assert!(BitString::decode_content(Bytes::new()).is_err());
        assert_eq!(
            BitString::decode_content(
                Bytes::from_static(b"\x08\x00")
            ).unwrap_err().msg(),
            "invalid number of unused bits"
        );
        assert_eq!(
            BitString::decode_content(
                Bytes::from_static(b"\x01")
            ).unwrap_err().msg(),
            "invalid number of unused bits"
        );
        assert_eq!(
            BitString::decode_content(
                Bytes::from_static(b"\x04\x81\xf8")
            ).unwrap_err().msg(),
            "non-zero padding bits"
        );
    }

    #[test]
    fn set_bits() {
        let bits = BitString::from_set_bits([0, 9]);
        assert_eq!(bits.bit_len(), 10);
        assert_eq!(bits.octet_slice(), b"\x80\x40");
        assert_eq!(bits.set_bits().collect::<Vec<_>>(), vec![0, 9]);
        let long = BitString::from_bits(16, b"\x80\x40");
        assert_eq!(long.trim_trailing_zeros(), bits);
        assert_eq!(BitString::from_set_bits([]).bit_len(), 0);
    }

    #[test]
    fn chunks() {
        let bits = BitString::from_chunks(&[
            (0, Bytes::from_static(b"\x81")),
            (4, Bytes::from_static(b"\xf0")),
        ]).unwrap();
        assert_eq!(bits, BitString::from_bits(12, b"\x81\xf0"));
        assert_eq!(
            BitString::from_chunks(&[
                (4, Bytes::from_static(b"\xf0")),
                (0, Bytes::from_static(b"\x81")),
            ]).unwrap_err().msg(),
            "not multiple of 8 bits"
        );
        assert_eq!(
            BitString::from_chunks(&[]).unwrap_err().msg(),
            "no chunks"
        );
    }
}
