//! The length octets.
//!
//! This is a private module. Its public items are re-exported by the parent.

use crate::decode::SliceSource;
use crate::encode::Target;
use crate::error::Error;


//------------ Length -------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length value can either be definite, meaning it provides the actual
/// number of content octets in the value, or indefinite, in which case the
/// content is delimited by a special end-of-contents marker.
///
/// # Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the length octets is one octet long and the remaining bits of this
/// first octet provide the definite length. Thus, if the first octet is
/// less than 128, it provides the definite length already.
///
/// If the most significant bit is set, the remaining bits of the first
/// octet specify the number of octets that follow to encode the actual
/// length. If they specify that there are zero more octets, i.e., the
/// value of the first octet is 128, the length is indefinite. Otherwise,
/// those following octets give the big-endian encoding of the definite
/// length of the content octets. The value 0xFF for the first octet is
/// reserved.
///
/// A definite length must always be encoded in the minimum number of
/// octets. This is enforced when decoding, even for BER. Whether an
/// indefinite length is acceptable depends on the decode context and is
/// left to the caller.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Length {
    /// A definite length of the given number of octets.
    Definite(usize),

    /// An indefinite length.
    Indefinite,
}

impl Length {
    /// The length of the length octets of the largest supported length.
    const MAX_OCTETS: usize = usize::BITS as usize / 8;

    /// Returns the length if it is definite.
    pub fn definite(self) -> Option<usize> {
        match self {
            Length::Definite(len) => Some(len),
            Length::Indefinite => None,
        }
    }

    /// Returns whether the length is indefinite.
    pub fn is_indefinite(self) -> bool {
        matches!(self, Length::Indefinite)
    }

    /// Takes a length from the beginning of a source.
    pub fn take_from(source: &mut SliceSource) -> Result<Self, Error> {
        let start = source.pos();
        let first = source.take_u8()?;
        if first & 0x80 == 0 {
            return Ok(Length::Definite(usize::from(first)))
        }
        if first == 0x80 {
            return Ok(Length::Indefinite)
        }
        if first == 0xFF {
            return Err(Error::decode("reserved length octet").at(start))
        }
        let count = usize::from(first & 0x7F);
        let octets = source.take(count).map_err(|err| err.at(start))?;
        if octets[0] == 0 {
            return Err(
                Error::decode("leading zero octets in length").at(start)
            )
        }
        if count > Self::MAX_OCTETS {
            return Err(Error::decode("too big length").at(start))
        }
        let len = octets.iter().fold(0usize, |len, &octet| {
            len << 8 | usize::from(octet)
        });
        if len < 0x80 {
            return Err(
                Error::decode("long form instead of short one").at(start)
            )
        }
        Ok(Length::Definite(len))
    }

    /// Decodes the length at the start of a bytes slice.
    ///
    /// Returns the length and the remaining data.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), Error> {
        let mut source = SliceSource::new(data);
        let len = Self::take_from(&mut source)?;
        Ok((len, source.remaining()))
    }

    /// Returns the length of the encoded representation of the value.
    pub fn encoded_len(self) -> usize {
        match self {
            Length::Definite(len) if len > 0x7F => {
                1 + Self::octet_count(len)
            }
            _ => 1
        }
    }

    /// Appends the encoded length to the end of `target`.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        match self {
            Length::Indefinite => target.push(0x80),
            Length::Definite(len) if len > 0x7F => {
                let count = Self::octet_count(len);
                target.push(0x80 | count as u8);
                target.extend_from_slice(
                    &len.to_be_bytes()[Self::MAX_OCTETS - count..]
                );
            }
            Length::Definite(len) => target.push(len as u8),
        }
    }

    /// Returns the encoded length.
    pub fn encode(self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.encoded_len());
        self.append_encoded(&mut res);
        res
    }

    /// Writes the encoded length to a target.
    pub fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(&self.encode())
    }

    /// Returns the number of octets needed for the long form of `len`.
    fn octet_count(len: usize) -> usize {
        Self::MAX_OCTETS - (len.leading_zeros() / 8) as usize
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    fn take_from(src: &[u8]) -> Result<Option<usize>, Error> {
        let (res, tail) = Length::decode(src)?;
        assert!(tail.is_empty(), "trailing data for {:?}", src);
        Ok(res.definite())
    }

    #[test]
    fn good_lengths() {
        assert_eq!(take_from(b"\x00").unwrap(), Some(0x00));
        assert_eq!(take_from(b"\x12").unwrap(), Some(0x12));
        assert_eq!(take_from(b"\x7f").unwrap(), Some(0x7f));
        assert_eq!(take_from(b"\x80").unwrap(), None);
        assert_eq!(take_from(b"\x81\x80").unwrap(), Some(0x80));
        assert_eq!(take_from(b"\x81\xF0").unwrap(), Some(0xF0));
        assert_eq!(take_from(b"\x82\xF0\x0E").unwrap(), Some(0xF00E));
        assert_eq!(take_from(b"\x82\x01\x00").unwrap(), Some(0x100));
    }

    #[test]
    fn non_minimal_lengths() {
        for src in [
            b"\x81\x00".as_ref(), b"\x81\x7f", b"\x82\x00\x00",
            b"\x82\x00\x0E", b"\x82\x00\x80",
        ] {
            let err = take_from(src).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decode, "{:?}", src);
        }
        assert_eq!(
            take_from(b"\x81\x7f").unwrap_err().msg(),
            "long form instead of short one"
        );
        assert_eq!(
            take_from(b"\xFF").unwrap_err().msg(),
            "reserved length octet"
        );
    }

    #[test]
    fn short_data() {
        assert_eq!(
            take_from(b"").unwrap_err().kind(), ErrorKind::NotEnoughData
        );
        let err = take_from(b"\x83\x01\x00").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEnoughData);
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn too_big() {
        let mut data = vec![0x80 | (Length::MAX_OCTETS as u8 + 1)];
        data.extend(std::iter::repeat(0xFF).take(Length::MAX_OCTETS + 1));
        assert_eq!(take_from(&data).unwrap_err().msg(), "too big length");
    }

    #[test]
    fn encode() {
        fn step(l: Length, res: &[u8]) {
            assert_eq!(l.encode().as_slice(), res, "encode failed for {l:?}");
            assert_eq!(l.encoded_len(), res.len());
            let mut vec = Vec::new();
            l.write_encoded(&mut vec).unwrap();
            assert_eq!(vec.as_slice(), res, "write failed for {l:?}");
        }

        step(Length::Indefinite, b"\x80");
        step(Length::Definite(0), b"\x00");
        step(Length::Definite(0x12), b"\x12");
        step(Length::Definite(0x7f), b"\x7f");
        step(Length::Definite(0x80), b"\x81\x80");
        step(Length::Definite(0xdead), b"\x82\xde\xad");
        step(Length::Definite(0x01_0000), b"\x83\x01\x00\x00");
    }

    #[test]
    fn round_trip() {
        for len in [0, 1, 127, 128, 255, 256, 65535, 65536, usize::MAX] {
            let encoded = Length::Definite(len).encode();
            assert_eq!(take_from(&encoded).unwrap(), Some(len));
        }
    }
}
