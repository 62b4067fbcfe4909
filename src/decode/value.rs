//! Decoding values according to a schema.
//!
//! This is a private module. The decoder is used by
//! [`Schema::decode`][crate::Schema::decode] and friends.

use bytes::Bytes;
use log::debug;
use crate::error::{Error, ErrorKind};
use crate::int;
use crate::oid::Oid;
use crate::schema::{Bounds, Field, Kind, Schema};
use crate::string::BitString;
use crate::tag::Tag;
use crate::time;
use crate::value::{Chosen, Data, DecodeInfo, ExplInfo, Value};
use super::context::DecodeContext;
use super::header::{Content, Header, MAX_NESTING, skip_value};
use super::path::{DecodePath, PathSegment};
use super::source::SliceSource;


//------------ Decoder -------------------------------------------------------

/// Decodes values while keeping track of the decode path.
pub(crate) struct Decoder<'c> {
    ctx: &'c DecodeContext,
    path: DecodePath,
}

impl<'c> Decoder<'c> {
    pub fn new(ctx: &'c DecodeContext, path: DecodePath) -> Self {
        Decoder { ctx, path }
    }

    /// Decodes a value of `schema` from the beginning of `source`.
    ///
    /// Errors are given the offset of the value and the current path
    /// unless they already carry more precise ones.
    pub fn decode_value(
        &mut self, schema: &Schema, source: &mut SliceSource
    ) -> Result<Value, Error> {
        let start = source.pos();
        self.decode_explicit(schema, source).map_err(|err| {
            err.at(start).in_path(&self.path)
        })
    }

    /// Runs `op` with `segment` appended to the path.
    fn in_segment<T>(
        &mut self,
        segment: PathSegment,
        op: impl FnOnce(&mut Self) -> Result<T, Error>
    ) -> Result<T, Error> {
        self.path.push(segment);
        let res = op(self);
        self.path.pop();
        res
    }

    fn decode_explicit(
        &mut self, schema: &Schema, source: &mut SliceSource
    ) -> Result<Value, Error> {
        let expl = match schema.expl() {
            Some(expl) => expl,
            None => return self.decode_implicit(schema, source),
        };
        let (tag, constructed) = Header::peek(source)?;
        if tag != expl {
            return Err(Error::tag_mismatch(
                format!("expected {}, found {}", expl, tag)
            ).at(source.pos()))
        }
        if !constructed {
            return Err(Error::decode(
                "primitive encoding of explicit tag"
            ).at(source.pos()))
        }
        let header = Header::take_from(source, self.ctx.bered)?;
        let mut content = header.content(source)?;
        let mut value = self.decode_implicit(schema, content.source())?;
        if !content.at_end() {
            if self.ctx.allow_expl_oob && !content.is_indefinite() {
                debug!(
                    "skipping data after explicitly tagged value \
                     at offset {}",
                    content.pos()
                );
                content.skip_rest();
            }
            else {
                return Err(Error::decode(
                    "explicit tag out-of-bound, longer than data"
                ).at(content.pos()))
            }
        }
        let vlen = content.finish(source)?;
        if let Some(info) = value.info_mut() {
            info.expl = Some(ExplInfo {
                tlen: header.tlen,
                llen: header.llen,
                vlen,
                lenindef: header.length.is_indefinite(),
            });
        }
        Ok(value)
    }

    fn decode_implicit(
        &mut self, schema: &Schema, source: &mut SliceSource
    ) -> Result<Value, Error> {
        match schema.kind() {
            Kind::Choice(alts) => self.decode_choice(schema, alts, source),
            Kind::Any => self.decode_any(schema, source),
            _ => {
                let (tag, _) = Header::peek(source)?;
                if schema.tag() != Some(tag) {
                    return Err(Error::tag_mismatch(format!(
                        "expected {}, found {}", schema.type_name(), tag
                    )).at(source.pos()))
                }
                let header = Header::take_from(source, self.ctx.bered)?;
                self.decode_tagged(schema, header, source)
            }
        }
    }

    fn decode_choice(
        &mut self, schema: &Schema, alts: &[Field], source: &mut SliceSource
    ) -> Result<Value, Error> {
        let start = source.pos();
        let (tag, _) = Header::peek(source)?;
        let (index, alt) = alts.iter().enumerate().find(|(_, alt)| {
            alt.schema().can_start_with(tag)
        }).ok_or_else(|| {
            Error::tag_mismatch(format!(
                "no alternative of {} for {}", schema.type_name(), tag
            )).at(start)
        })?;
        let value = self.in_segment(PathSegment::name(alt.name()), |this| {
            this.decode_value(alt.schema(), source)
        })?;
        let info = DecodeInfo {
            offset: start,
            vlen: source.pos() - start,
            .. Default::default()
        };
        Ok(Value::decoded(
            schema.clone(),
            Data::Choice(Box::new(Chosen { index, value })),
            info
        ))
    }

    fn decode_any(
        &mut self, schema: &Schema, source: &mut SliceSource
    ) -> Result<Value, Error> {
        let start = source.pos();
        let header = Header::take_from(&mut { *source }, self.ctx.bered)?;
        let mut ahead = *source;
        skip_value(&mut ahead, self.ctx.bered)?;
        let raw = source.take(ahead.pos() - start)?;
        let lenindef = header.length.is_indefinite();
        let info = DecodeInfo {
            offset: start,
            tlen: header.tlen,
            llen: header.llen,
            vlen: raw.len() - header.tlen - header.llen
                - if lenindef { 2 } else { 0 },
            lenindef,
            .. Default::default()
        };
        Ok(Value::decoded(
            schema.clone(), Data::Any(Bytes::copy_from_slice(raw)), info
        ))
    }

    fn decode_tagged<'s>(
        &mut self,
        schema: &Schema,
        header: Header,
        source: &mut SliceSource<'s>,
    ) -> Result<Value, Error> {
        let mut content = header.content(source)?;
        let mut info = DecodeInfo {
            offset: header.offset,
            tlen: header.tlen,
            llen: header.llen,
            lenindef: header.length.is_indefinite(),
            .. Default::default()
        };
        let start = content.start();
        let data = self.decode_data(
            schema, &header, &mut content, &mut info
        ).map_err(|err| err.at(start))?;
        info.vlen = content.finish(source)?;
        Ok(Value::decoded(schema.clone(), data, info))
    }

    fn decode_data(
        &mut self,
        schema: &Schema,
        header: &Header,
        content: &mut Content,
        info: &mut DecodeInfo,
    ) -> Result<Data, Error> {
        match schema.kind() {
            Kind::Boolean => {
                let octets = primitive(header, content)?;
                if octets.len() != 1 {
                    return Err(Error::new(
                        ErrorKind::InvalidLength,
                        "BOOLEAN content must be one octet"
                    ))
                }
                match octets[0] {
                    0 => Ok(Data::Boolean(false)),
                    0xFF => Ok(Data::Boolean(true)),
                    _ if self.ctx.bered => {
                        debug!(
                            "non-canonical BOOLEAN value at offset {}",
                            content.start()
                        );
                        info.ber_encoded = true;
                        Ok(Data::Boolean(true))
                    }
                    _ => Err(Error::decode("unacceptable BOOLEAN value"))
                }
            }
            Kind::Integer { bounds, .. } => {
                let value = int::decode_content(primitive(header, content)?)?;
                if let Some(bounds) = bounds {
                    bounds.check(&value)?;
                }
                Ok(Data::Integer(value))
            }
            Kind::Enumerated { .. } => {
                let value = int::decode_content(primitive(header, content)?)?;
                if schema.value_name(&value).is_none() {
                    return Err(Error::decode(
                        format!("unknown ENUMERATED value {}", value)
                    ))
                }
                Ok(Data::Integer(value))
            }
            Kind::Null => {
                if !primitive(header, content)?.is_empty() {
                    return Err(Error::new(
                        ErrorKind::InvalidLength,
                        "NULL content must be empty"
                    ))
                }
                Ok(Data::Null)
            }
            Kind::Oid => {
                Oid::decode_content(primitive(header, content)?).map(Data::Oid)
            }
            Kind::UtcTime => {
                let time = time::decode_utc_time(primitive(header, content)?)?;
                info.ber_encoded |= time.ber_encoded;
                Ok(Data::Time(time.time))
            }
            Kind::GeneralizedTime => {
                let time = time::decode_generalized_time(
                    primitive(header, content)?, self.ctx.bered
                )?;
                info.ber_encoded |= time.ber_encoded;
                Ok(Data::Time(time.time))
            }
            Kind::BitString { named } => {
                let bits = self.bit_string(header, content, info)?;
                if named.is_empty() {
                    return Ok(Data::BitString(bits))
                }
                let trimmed = bits.trim_trailing_zeros();
                if trimmed != bits {
                    if !self.ctx.bered {
                        return Err(Error::decode(
                            "trailing zero bits in named BIT STRING"
                        ))
                    }
                    debug!(
                        "trailing zero bits in named BIT STRING at offset {}",
                        info.offset
                    );
                    info.ber_encoded = true;
                }
                Ok(Data::BitString(trimmed))
            }
            Kind::OctetString { bounds } => {
                let octets = self.octets(header, content, info)?;
                if let Some(bounds) = bounds {
                    bounds.check(&octets.len())?;
                }
                Ok(Data::Octets(octets))
            }
            Kind::String { charset, bounds } => {
                let octets = self.octets(header, content, info)?;
                charset.check_slice(&octets)?;
                if let Some(bounds) = bounds {
                    bounds.check(&octets.len())?;
                }
                Ok(Data::Octets(octets))
            }
            Kind::Sequence(fields) => {
                constructed(header)?;
                self.decode_sequence(fields, content, info)
            }
            Kind::Set(fields) => {
                constructed(header)?;
                self.decode_set(fields, content, info)
            }
            Kind::SequenceOf { item, bounds } => {
                constructed(header)?;
                self.decode_items(item, bounds.as_ref(), false, content, info)
            }
            Kind::SetOf { item, bounds } => {
                constructed(header)?;
                self.decode_items(item, bounds.as_ref(), true, content, info)
            }
            Kind::Choice(_) | Kind::Any => {
                Err(Error::decode("untagged type with tag"))
            }
        }
    }

    /// Accepts the constructed encoding of a string type if BER is allowed.
    fn accept_constructed(&self, info: &mut DecodeInfo) -> Result<(), Error> {
        if !self.ctx.bered {
            return Err(Error::decode("unallowed BER constructed encoding"))
        }
        debug!("constructed string at offset {}", info.offset);
        info.ber_encoded = true;
        Ok(())
    }

    /// Returns the bits of a BIT STRING in either form.
    fn bit_string(
        &mut self, header: &Header, content: &mut Content,
        info: &mut DecodeInfo,
    ) -> Result<BitString, Error> {
        if !header.constructed {
            return BitString::decode_content(
                Bytes::copy_from_slice(content.take_all())
            )
        }
        self.accept_constructed(info)?;
        let mut chunks = Vec::new();
        self.collect_chunks(Tag::BIT_STRING, content, &mut chunks, 0)?;
        let chunks = chunks.into_iter().map(|chunk| {
            match chunk.split_first() {
                Some((&unused, bits)) => {
                    Ok((unused, Bytes::copy_from_slice(bits)))
                }
                None => Err(Error::decode("zero length BIT STRING chunk"))
            }
        }).collect::<Result<Vec<_>, _>>()?;
        BitString::from_chunks(&chunks)
    }

    /// Returns the octets of an OCTET STRING or character string.
    fn octets(
        &mut self, header: &Header, content: &mut Content,
        info: &mut DecodeInfo,
    ) -> Result<Bytes, Error> {
        if !header.constructed {
            return Ok(Bytes::copy_from_slice(content.take_all()))
        }
        self.accept_constructed(info)?;
        let mut chunks = Vec::new();
        self.collect_chunks(Tag::OCTET_STRING, content, &mut chunks, 0)?;
        Ok(Bytes::from(chunks.concat()))
    }

    /// Collects the content of the primitive chunks of a constructed string.
    ///
    /// Chunks may themselves be constructed, up to a nesting depth of
    /// [`MAX_NESTING`].
    fn collect_chunks<'s>(
        &mut self,
        tag: Tag,
        content: &mut Content<'s>,
        chunks: &mut Vec<&'s [u8]>,
        depth: usize,
    ) -> Result<(), Error> {
        let indefinite = content.is_indefinite();
        while !content.at_end() {
            let source = content.source();
            let offset = source.pos();
            let header = Header::take_from(source, self.ctx.bered)?;
            if header.constructed && depth >= MAX_NESTING {
                return Err(Error::decode("too deeply nested").at(offset))
            }
            if header.tag != tag {
                return Err(Error::tag_mismatch(format!(
                    "expected {} chunk, found {}", tag, header.tag
                )).at(offset))
            }
            let mut chunk = header.content(source).map_err(|err| {
                if indefinite {
                    err
                }
                else {
                    Error::decode("chunk out of bounds").at(offset)
                }
            })?;
            if header.constructed {
                self.collect_chunks(tag, &mut chunk, chunks, depth + 1)?;
            }
            else {
                chunks.push(chunk.take_all());
            }
            chunk.finish(source)?;
        }
        Ok(())
    }

    fn decode_sequence(
        &mut self,
        fields: &[Field],
        content: &mut Content,
        info: &mut DecodeInfo,
    ) -> Result<Data, Error> {
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            if content.at_end() {
                if field.schema().is_optional() {
                    values.push(None);
                    continue
                }
                return Err(Error::not_enough_data().at(content.pos()).in_path(
                    &self.path.join(PathSegment::name(field.name()))
                ))
            }
            let start = content.pos();
            let depth = self.path.len() + 1;
            let res = self.in_segment(PathSegment::name(field.name()), |this| {
                this.decode_value(field.schema(), content.source())
            });
            let value = match res {
                Ok(value) => value,
                Err(err) if is_absent(&err, field, start, depth) => {
                    values.push(None);
                    continue
                }
                Err(err) => return Err(err)
            };
            values.push(self.check_default(field, value, info)?);
        }
        Ok(Data::Fields(values))
    }

    fn decode_set(
        &mut self,
        fields: &[Field],
        content: &mut Content,
        info: &mut DecodeInfo,
    ) -> Result<Data, Error> {
        let mut values = vec![None; fields.len()];
        let mut seen = vec![false; fields.len()];
        let mut prev: Option<&[u8]> = None;
        while !content.at_end() {
            let offset = content.pos();
            let (tag, _) = Header::peek(content.source())?;
            let idx = fields.iter().position(|field| {
                field.schema().can_start_with(tag)
            }).ok_or_else(|| {
                Error::tag_mismatch(
                    format!("unexpected {} in SET", tag)
                ).at(offset)
            })?;
            let field = &fields[idx];
            if seen[idx] {
                return Err(Error::decode(
                    format!("duplicate field '{}'", field.name())
                ).at(offset))
            }
            seen[idx] = true;
            let before = content.source().remaining();
            let value = self.in_segment(PathSegment::name(field.name()), |this| {
                this.decode_value(field.schema(), content.source())
            })?;
            let raw = &before[..content.pos() - offset];
            if let Some(prev) = prev {
                if prev >= raw {
                    self.accept_unordered("SET", offset, info)?;
                }
            }
            prev = Some(raw);
            values[idx] = self.check_default(field, value, info)?;
        }
        for (field, seen) in fields.iter().zip(&seen) {
            if !seen && !field.schema().is_optional() {
                return Err(Error::decode(
                    format!("missing required field '{}'", field.name())
                ).at(content.pos()))
            }
        }
        Ok(Data::Fields(values))
    }

    fn decode_items(
        &mut self,
        item: &Schema,
        bounds: Option<&Bounds<usize>>,
        ordered: bool,
        content: &mut Content,
        info: &mut DecodeInfo,
    ) -> Result<Data, Error> {
        let mut items = Vec::new();
        let mut prev: Option<&[u8]> = None;
        while !content.at_end() {
            let offset = content.pos();
            let before = content.source().remaining();
            let value = self.in_segment(PathSegment::Index(items.len()), |this| {
                this.decode_value(item, content.source())
            })?;
            if ordered {
                let raw = &before[..content.pos() - offset];
                if let Some(prev) = prev {
                    if prev > raw {
                        self.accept_unordered("SET OF", offset, info)?;
                    }
                }
                prev = Some(raw);
            }
            items.push(value);
        }
        if let Some(bounds) = bounds {
            bounds.check(&items.len())?;
        }
        Ok(Data::Items(items))
    }

    /// Checks whether a field value is equal to the field’s default.
    ///
    /// Returns the value to keep for the field.
    fn check_default(
        &self, field: &Field, value: Value, info: &mut DecodeInfo
    ) -> Result<Option<Value>, Error> {
        match field.schema().default_data() {
            Some(default) if value.data() == Some(default) => {
                let offset = value.info().map(|info| info.expl_offset());
                if !self.ctx.default_values_allowed() {
                    let err = Error::decode(
                        format!("DEFAULT value met for '{}'", field.name())
                    ).in_path(
                        &self.path.join(PathSegment::name(field.name()))
                    );
                    return Err(match offset {
                        Some(offset) => err.at(offset),
                        None => err
                    })
                }
                debug!(
                    "explicitly encoded DEFAULT value for '{}' at {}",
                    field.name(), self.path
                );
                info.ber_encoded = true;
                Ok(None)
            }
            _ => Ok(Some(value))
        }
    }

    fn accept_unordered(
        &self, what: &str, offset: usize, info: &mut DecodeInfo
    ) -> Result<(), Error> {
        if !self.ctx.unordered_set_allowed() {
            return Err(Error::decode(format!("unordered {}", what)).at(offset))
        }
        debug!("unordered {} value at offset {}", what, offset);
        info.ber_encoded = true;
        Ok(())
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns the content of a value that must be primitive.
fn primitive<'s>(
    header: &Header, content: &mut Content<'s>
) -> Result<&'s [u8], Error> {
    if header.constructed {
        return Err(Error::decode("constructed encoding of primitive type"))
    }
    Ok(content.take_all())
}

fn constructed(header: &Header) -> Result<(), Error> {
    if header.constructed {
        Ok(())
    }
    else {
        Err(Error::decode("primitive encoding of constructed type"))
    }
}

/// Returns whether a decoding error means an optional field is absent.
///
/// This is the case if the first tag of the field didn’t match. Tag
/// mismatches deeper down are errors.
fn is_absent(err: &Error, field: &Field, start: usize, depth: usize) -> bool {
    err.kind() == ErrorKind::TagMismatch
        && field.schema().is_optional()
        && err.offset() == Some(start)
        && err.path().map(|path| path.len()) == Some(depth)
}
