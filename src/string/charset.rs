//! Character sets of the restricted character string types.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::error::Error;
use crate::tag::Tag;


//------------ CharSet -------------------------------------------------------

/// The character set of a character string type.
///
/// Character strings are encoded just like an OCTET STRING with a
/// different tag. The character set determines the natural tag of the type
/// and which octet sequences are acceptable as its content.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CharSet {
    /// NumericString: digits and space.
    Numeric,

    /// PrintableString: letters, digits, space, and `'()+,-./:=?`.
    Printable,

    /// IA5String: all of ASCII.
    Ia5,

    /// VisibleString: printable ASCII including space.
    Visible,

    /// UTF8String: UTF-8 encoded Unicode.
    Utf8,

    /// BMPString: UCS-2 encoded as big-endian UTF-16.
    Bmp,

    /// UniversalString: UCS-4 encoded as big-endian UTF-32.
    Universal,

    /// TeletexString, content unchecked.
    Teletex,

    /// VideotexString, content unchecked.
    Videotex,

    /// GraphicString, content unchecked.
    Graphic,

    /// GeneralString, content unchecked.
    General,
}

impl CharSet {
    /// Returns the natural tag of strings of this character set.
    pub fn tag(self) -> Tag {
        match self {
            CharSet::Numeric => Tag::NUMERIC_STRING,
            CharSet::Printable => Tag::PRINTABLE_STRING,
            CharSet::Ia5 => Tag::IA5_STRING,
            CharSet::Visible => Tag::VISIBLE_STRING,
            CharSet::Utf8 => Tag::UTF8_STRING,
            CharSet::Bmp => Tag::BMP_STRING,
            CharSet::Universal => Tag::UNIVERSAL_STRING,
            CharSet::Teletex => Tag::TELETEX_STRING,
            CharSet::Videotex => Tag::VIDEOTEX_STRING,
            CharSet::Graphic => Tag::GRAPHIC_STRING,
            CharSet::General => Tag::GENERAL_STRING,
        }
    }

    /// Returns the ASN.1 name of the string type.
    pub fn name(self) -> &'static str {
        match self {
            CharSet::Numeric => "NumericString",
            CharSet::Printable => "PrintableString",
            CharSet::Ia5 => "IA5String",
            CharSet::Visible => "VisibleString",
            CharSet::Utf8 => "UTF8String",
            CharSet::Bmp => "BMPString",
            CharSet::Universal => "UniversalString",
            CharSet::Teletex => "TeletexString",
            CharSet::Videotex => "VideotexString",
            CharSet::Graphic => "GraphicString",
            CharSet::General => "GeneralString",
        }
    }

    /// Checks whether a sequence of octets is a valid string.
    pub fn check_slice(self, slice: &[u8]) -> Result<(), CharSetError> {
        self.decode_slice(slice).map(|_| ())
    }

    /// Decodes the octets of a string into a Rust string.
    ///
    /// The unchecked character sets are decoded as Latin-1.
    pub fn decode_slice(self, slice: &[u8]) -> Result<String, CharSetError> {
        let ascii = |check: fn(u8) -> bool| -> Result<String, CharSetError> {
            if slice.iter().all(|&ch| check(ch)) {
                // All checks only allow ASCII characters.
                Ok(slice.iter().map(|&ch| char::from(ch)).collect())
            }
            else {
                Err(CharSetError(self))
            }
        };
        match self {
            CharSet::Numeric => ascii(|ch| ch == b' ' || ch.is_ascii_digit()),
            CharSet::Printable => ascii(is_printable),
            CharSet::Ia5 => ascii(|ch| ch.is_ascii()),
            CharSet::Visible => ascii(|ch| (0x20..0x7F).contains(&ch)),
            CharSet::Utf8 => {
                std::str::from_utf8(slice).map(Into::into).map_err(|_| {
                    CharSetError(self)
                })
            }
            CharSet::Bmp => {
                if slice.len() % 2 != 0 {
                    return Err(CharSetError(self))
                }
                char::decode_utf16(
                    slice.chunks_exact(2).map(|ch| {
                        u16::from_be_bytes([ch[0], ch[1]])
                    })
                ).collect::<Result<String, _>>().map_err(|_| {
                    CharSetError(self)
                })
            }
            CharSet::Universal => {
                if slice.len() % 4 != 0 {
                    return Err(CharSetError(self))
                }
                slice.chunks_exact(4).map(|ch| {
                    char::from_u32(
                        u32::from_be_bytes([ch[0], ch[1], ch[2], ch[3]])
                    ).ok_or(CharSetError(self))
                }).collect()
            }
            CharSet::Teletex | CharSet::Videotex | CharSet::Graphic
            | CharSet::General => {
                Ok(slice.iter().map(|&ch| char::from(ch)).collect())
            }
        }
    }

    /// Converts a Rust string into the octets of the string type.
    pub fn encode_str(self, s: &str) -> Result<Vec<u8>, CharSetError> {
        match self {
            CharSet::Utf8 => Ok(s.as_bytes().into()),
            CharSet::Bmp => {
                let mut res = Vec::with_capacity(s.len() * 2);
                for unit in s.encode_utf16() {
                    res.extend_from_slice(&unit.to_be_bytes())
                }
                Ok(res)
            }
            CharSet::Universal => {
                Ok(
                    s.chars().flat_map(|ch| u32::from(ch).to_be_bytes())
                        .collect()
                )
            }
            CharSet::Teletex | CharSet::Videotex | CharSet::Graphic
            | CharSet::General => {
                s.chars().map(|ch| {
                    u8::try_from(u32::from(ch)).map_err(|_| {
                        CharSetError(self)
                    })
                }).collect()
            }
            _ => {
                self.check_slice(s.as_bytes())?;
                Ok(s.as_bytes().into())
            }
        }
    }
}

fn is_printable(ch: u8) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/'
            | b':' | b'=' | b'?'
        )
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


//------------ CharSetError --------------------------------------------------

/// An error happened when converting between character sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid characters for {0}")]
pub struct CharSetError(CharSet);

impl CharSetError {
    /// Returns the character set the octets were invalid for.
    pub fn charset(self) -> CharSet {
        self.0
    }
}

impl From<CharSetError> for Error {
    fn from(err: CharSetError) -> Self {
        Error::decode(err.to_string())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn numeric() {
        assert!(CharSet::Numeric.check_slice(b"0123 456789").is_ok());
        assert!(CharSet::Numeric.check_slice(b"12a").is_err());
        assert!(CharSet::Numeric.check_slice(b"").is_ok());
    }

    #[test]
    fn printable() {
        assert!(
            CharSet::Printable.check_slice(b"Hello, World (1+2=3)?").is_ok()
        );
        assert!(CharSet::Printable.check_slice(b"a@b").is_err());
        assert!(CharSet::Printable.check_slice(b"a*b").is_err());
    }

    #[test]
    fn ascii_variants() {
        assert!(CharSet::Ia5.check_slice(b"a@b\x00\x7f").is_ok());
        assert!(CharSet::Ia5.check_slice(b"\x80").is_err());
        assert!(CharSet::Visible.check_slice(b"a@b ~").is_ok());
        assert!(CharSet::Visible.check_slice(b"\x7f").is_err());
        assert!(CharSet::Visible.check_slice(b"\n").is_err());
    }

    #[test]
    fn unicode() {
        assert_eq!(
            CharSet::Utf8.decode_slice("привет".as_bytes()).unwrap(),
            "привет"
        );
        assert!(CharSet::Utf8.check_slice(b"\xff").is_err());

        let bmp = CharSet::Bmp.encode_str("aä").unwrap();
        assert_eq!(bmp, b"\x00a\x00\xe4");
        assert_eq!(CharSet::Bmp.decode_slice(&bmp).unwrap(), "aä");
        assert!(CharSet::Bmp.check_slice(b"\x00a\x00").is_err());
        assert!(CharSet::Bmp.check_slice(b"\xd8\x00").is_err());

        let universal = CharSet::Universal.encode_str("a€").unwrap();
        assert_eq!(universal, b"\x00\x00\x00a\x00\x00\x20\xac");
        assert_eq!(
            CharSet::Universal.decode_slice(&universal).unwrap(), "a€"
        );
        assert!(CharSet::Universal.check_slice(b"\x00\x11\x00\x00").is_err());
        assert!(CharSet::Universal.check_slice(b"\x00\x00a").is_err());
    }

    #[test]
    fn encode_checks() {
        assert!(CharSet::Numeric.encode_str("12x").is_err());
        assert_eq!(CharSet::Teletex.encode_str("ä").unwrap(), b"\xe4");
        assert!(CharSet::Teletex.encode_str("€").is_err());
        assert_eq!(
            Error::from(CharSetError(CharSet::Numeric)).msg(),
            "invalid characters for NumericString"
        );
    }
}
