//! Encoding data in DER.
//!
//! This modules provides means to encode data in DER.
//!
//! Encoding is done using helper types called _encoders_ that represent the
//! structure of the encoding. These types implement the trait [`Values`].
//! The main encoder is [`Value`][crate::Value] itself: a ready value tree
//! knows how to write its canonical encoding to anything implementing
//! [`Target`].
//!
//! The trait [`PrimitiveContent`] helps with producing encoders for types
//! that use the primitive encoding. Through this trait the types can declare
//! how their content is encoded and receive an automatic encoder type based
//! on that.
//!
//! The [`raw`] module contains functions for building arbitrary BER
//! encodings, including indefinite length and constructed forms of
//! primitive types that DER forbids. These are mostly useful for producing
//! test data.

pub use self::primitive::{PrimitiveContent, Primitive};
pub use self::target::{IoTarget, Target, infallible};
pub use self::values::{
    Values,
    total_indefinite_len, total_len, write_end_of_contents, write_header,
    write_indefinite_header,
};

pub mod raw;
mod primitive;
mod target;
mod values;
