//! Decoding BER and DER encoded data.
//!
//! Decoding is driven by a [`Schema`]: the schema is used to decode data
//! via [`Schema::decode`] and friends, resulting in a
//! [`Value`][crate::Value] tree. How strictly the data is checked is
//! determined by a [`DecodeContext`]. By default, only DER is accepted.
//!
//! Every decoded value knows its location both as an offset into the data
//! and as a [`DecodePath`], the names and indexes leading from the root of
//! the tree to the value. Errors report the same location for the value
//! that failed to decode.
//!
//! After the tree has been decoded, defined-by rules are applied. These
//! decode the content of ANY, OCTET STRING, or BIT STRING values using a
//! schema selected by the data of another value. The rules are either
//! attached to schemas via [`Schema::defines`] or supplied through the
//! [`DecodeContext`] as [`DefinesByPath`] rules addressing their source
//! values through a [`PathPattern`].

pub use self::context::{DecodeContext, DefinesByPath};
pub use self::header::{Content, Header};
pub use self::path::{DecodePath, PathPattern, PathSegment, PatternSegment};
pub use self::source::SliceSource;

use crate::error::Error;
use crate::schema::Schema;
use crate::value::Value;
use self::value::Decoder;

mod context;
mod defines;
mod header;
mod path;
mod source;
mod value;



/// Decodes a value and applies all defined-by rules.
pub(crate) fn decode_root<'a>(
    schema: &Schema,
    data: &'a [u8],
    offset: usize,
    path: &DecodePath,
    ctx: &DecodeContext,
) -> Result<(Value, &'a [u8]), Error> {
    let mut source = SliceSource::with_offset(data, offset);
    let mut value = Decoder::new(ctx, path.clone()).decode_value(
        schema, &mut source
    )?;
    defines::resolve(&mut value, path, ctx)?;
    Ok((value, source.remaining()))
}
