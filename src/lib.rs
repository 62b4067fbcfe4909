//! Schema-driven encoding and decoding of DER and BER.
//!
//! This crate decodes and encodes ASN.1 values without generated code.
//! Instead, the structure of the data is described at runtime by a
//! [`Schema`]. Decoding data with a schema results in a tree of [`Value`]s
//! that can be inspected, modified, and encoded again as DER.
//!
//! Schemas are built from constructor functions for each ASN.1 type and
//! refined through builder methods for tags, defaults, bounds, and names:
//!
//! ```
//! use derschema::{DecodeContext, Field, Schema, Tag};
//!
//! let schema = Schema::sequence(vec![
//!     Field::new("version", Schema::integer()
//!         .explicit(Tag::ctx(0))
//!         .default(0.into()).unwrap()
//!     ),
//!     Field::new("serial", Schema::integer()),
//! ]);
//! let value = schema.decode_all(
//!     b"\x30\x03\x02\x01\x2a", &DecodeContext::new()
//! ).unwrap();
//! assert!(value.get("version").unwrap().is_none());
//! assert_eq!(
//!     value.get("serial").unwrap().unwrap().as_integer(),
//!     Some(&42.into())
//! );
//! assert_eq!(value.encode().unwrap(), b"\x30\x03\x02\x01\x2a");
//! ```
//!
//! By default, decoding accepts DER only. A [`DecodeContext`] relaxes
//! this to BER and adds further decoding options as well as defined-by
//! rules that decode the content of ANY and OCTET STRING values with a
//! schema selected by another value in the tree.
//!
//! Every decoded value keeps where it was found in the data, both as
//! offsets and as a [`DecodePath`]. [`pprint`] renders this information
//! for a whole tree.
//!
//! The lower layers of the codec are available as well: [`Tag`] and
//! [`Length`] for the identifier and length octets, [`Oid`] and
//! [`BitString`] for two of the primitive types, and the [`encode`]
//! module for producing encoded data from values.

//--- Re-exports

pub use self::decode::{
    DecodeContext, DecodePath, DefinesByPath, PathPattern, PathSegment
};
pub use self::error::{Error, ErrorKind};
pub use self::length::Length;
pub use self::oid::Oid;
pub use self::pprint::{pprint, OidNames};
pub use self::schema::{Bounds, Define, Field, Kind, Schema};
pub use self::string::{BitString, CharSet};
pub use self::tag::{Class, Tag};
pub use self::value::{Chosen, Data, DecodeInfo, Defined, ExplInfo, Value};


//--- Public modules

#[macro_use] pub mod debug;

pub mod decode;
pub mod encode;
pub mod schema;
pub mod string;
pub mod value;

pub mod int;
pub mod oid;
pub mod time;


//--- Private modules

mod error;
mod length;
mod pprint;
mod tag;
