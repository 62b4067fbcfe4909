//! Encoding and decoding of INTEGER content.
//!
//! Integers are of arbitrary precision and kept as [`BigInt`]s. Both
//! INTEGER and ENUMERATED values use the content handled here.

use num_bigint::BigInt;
use num_traits::Signed;
use crate::encode::{PrimitiveContent, Target};
use crate::error::Error;
use crate::tag::Tag;


/// Decodes the content octets of an INTEGER.
///
/// The content must not be empty and must be minimal, i.e., the first nine
/// bits must not all be the same. This is checked for BER, too.
pub fn decode_content(content: &[u8]) -> Result<BigInt, Error> {
    check_head(content)?;
    Ok(BigInt::from_signed_bytes_be(content))
}

/// Checks that the content is not empty and that its head is minimal.
fn check_head(content: &[u8]) -> Result<(), Error> {
    match (content.first(), content.get(1).map(|x| x & 0x80 != 0)) {
        (None, _) => Err(Error::decode("zero length INTEGER content")),
        (Some(0), Some(false)) | (Some(0xFF), Some(true)) => {
            Err(Error::decode("non normalized INTEGER"))
        }
        _ => Ok(())
    }
}

/// Returns the minimal two’s complement content octets of an integer.
pub fn encode_content(value: &BigInt) -> Vec<u8> {
    value.to_signed_bytes_be()
}


//--- PrimitiveContent

impl PrimitiveContent for &'_ BigInt {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(self) -> usize {
        // The sign bit needs an extra bit unless the value is a negative
        // power of two.
        let bits = if self.is_negative() {
            (-self - 1u8).bits()
        }
        else {
            self.bits()
        };
        (bits / 8 + 1) as usize
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(&encode_content(self))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::Values;
    use crate::error::ErrorKind;

    fn int(v: i64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn encode_scenarios() {
        assert_eq!(int(10).encode().to_vec(), b"\x02\x01\x0a");
        assert_eq!(int(128).encode().to_vec(), b"\x02\x02\x00\x80");
        assert_eq!(int(-129).encode().to_vec(), b"\x02\x02\xff\x7f");
        assert_eq!(int(0).encode().to_vec(), b"\x02\x01\x00");
    }

    #[test]
    fn encoded_len_matches_content() {
        for v in [
            0, 1, -1, 127, 128, -128, -129, 255, 256, -256, -257,
            32767, 32768, -32768, -32769, i64::MAX, i64::MIN,
        ] {
            let v = int(v);
            assert_eq!(
                (&v).encoded_len(), encode_content(&v).len(), "{}", v
            );
        }
    }

    #[test]
    fn decode_good() {
        assert_eq!(decode_content(b"\x00").unwrap(), int(0));
        assert_eq!(decode_content(b"\x7f").unwrap(), int(127));
        assert_eq!(decode_content(b"\x00\x80").unwrap(), int(128));
        assert_eq!(decode_content(b"\xff\x7f").unwrap(), int(-129));
        assert_eq!(decode_content(b"\x80").unwrap(), int(-128));
        assert_eq!(
            decode_content(
                b"\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00"
            ).unwrap(),
            BigInt::from(1u8) << 72
        );
    }

    #[test]
    fn decode_bad() {
        assert_eq!(
            decode_content(b"").unwrap_err().kind(), ErrorKind::Decode
        );
        assert!(decode_content(b"\x00\x7f").is_err());
        assert!(decode_content(b"\xff\x80").is_err());
        assert!(decode_content(b"\x00\x00\x80").is_err());
    }
}
