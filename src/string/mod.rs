//! Support for the string types.
//!
//! There are two types of strings for binary data. OCTET STRINGs contain
//! an unrestricted sequence of octets and are kept as plain `Bytes` values
//! while [`BitString`]s contain a sequence of bits that does not need to
//! be of a length divisible by eight.
//!
//! In addition, there are a number of so-called restricted character
//! strings that each contain a sequence of characters according to a
//! pre-defined character set. They are all encoded like an OCTET STRING
//! and differ only in their tag and the octets they accept. The
//! [`CharSet`] enum lists the supported types and provides the checks
//! and conversions for each of them.

//--- Re-exports

pub use self::bit::{BitString, BitStringIter};
pub use self::charset::{CharSet, CharSetError};

//--- Private modules

mod bit;
mod charset;
