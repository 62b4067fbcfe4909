//! Pretty printing of value trees.
//!
//! [`pprint`] renders a value and all its descendants, one row per value.
//! Each row shows where the value was found in the decoded data, its
//! location in the tree, its type, and its data. Rows of values decoded
//! through a defined-by rule follow those of the value that held them.
//!
//! There is no built-in registry of object identifier names. Names are
//! supplied by the caller through [`OidNames`].

use std::collections::HashMap;
use std::fmt::Write;
use crate::decode::PathSegment;
use crate::oid::Oid;
use crate::schema::Kind;
use crate::value::{Data, Value};


//------------ OidNames ------------------------------------------------------

/// Names for object identifiers used when printing.
#[derive(Clone, Debug, Default)]
pub struct OidNames(HashMap<Oid, String>);

impl OidNames {
    /// Creates an empty set of names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name for an object identifier.
    pub fn with(mut self, oid: Oid, name: &str) -> Self {
        self.insert(oid, name);
        self
    }

    /// Adds a name for an object identifier.
    pub fn insert(&mut self, oid: Oid, name: &str) {
        self.0.insert(oid, name.into());
    }

    /// Returns the name of an object identifier.
    pub fn get(&self, oid: &Oid) -> Option<&str> {
        self.0.get(oid).map(String::as_str)
    }
}

impl FromIterator<(Oid, String)> for OidNames {
    fn from_iter<T: IntoIterator<Item = (Oid, String)>>(iter: T) -> Self {
        OidNames(iter.into_iter().collect())
    }
}


//------------ pprint --------------------------------------------------------

/// Renders a value tree.
///
/// Every row starts with the offset of the value and the lengths of its
/// identifier, length, and content octets if the value was decoded.
/// Values deviating from DER are marked with `BER`, indefinite lengths
/// with `LENINDEF` and, for explicit tags, `EXPLLENINDEF`.
pub fn pprint(value: &Value, names: &OidNames) -> String {
    let mut res = String::new();
    write_row(&mut res, value, None, 0, names);
    res
}

fn write_row(
    target: &mut String,
    value: &Value,
    segment: Option<&PathSegment>,
    depth: usize,
    names: &OidNames,
) {
    match value.info() {
        Some(info) => {
            let _ = write!(
                target, "{:>6} [{},{},{:>4}] ",
                info.expl_offset(), info.tlen, info.llen, info.vlen
            );
        }
        None => {
            let _ = write!(target, "{:>6} {:>10} ", "-", "");
        }
    }
    for _ in 0..depth {
        target.push_str(". ");
    }
    if let Some(segment) = segment {
        let _ = write!(target, "{}: ", segment);
    }
    let _ = write!(target, "{}", value.schema());
    if let Some(data) = describe(value, names) {
        let _ = write!(target, " {}", data);
    }
    if let Some(info) = value.info() {
        if info.ber_encoded {
            target.push_str(" BER");
        }
        if info.lenindef {
            target.push_str(" LENINDEF");
        }
        if info.expl.map(|expl| expl.lenindef).unwrap_or(false) {
            target.push_str(" EXPLLENINDEF");
        }
    }
    target.push('\n');
    for (segment, child) in value.children() {
        write_row(target, child, Some(&segment), depth + 1, names);
    }
}

/// Returns the printable form of a value’s data.
///
/// Returns `None` for containers whose content is printed as rows of
/// their own.
fn describe(value: &Value, names: &OidNames) -> Option<String> {
    let data = match value.data() {
        Some(data) => data,
        None => return Some("unset".into()),
    };
    match (value.schema().kind(), data) {
        (_, Data::Oid(oid)) => {
            Some(match names.get(oid) {
                Some(name) => format!("{} ({})", oid, name),
                None => oid.to_string(),
            })
        }
        (_, Data::Integer(int)) => {
            Some(match value.as_name() {
                Some(name) => format!("{} ({})", int, name),
                None => int.to_string(),
            })
        }
        (_, Data::BitString(bits)) => {
            let named = value.bit_names();
            if named.is_empty() {
                Some(bits.to_string())
            }
            else {
                Some(format!("{} [{}]", bits, named.join(", ")))
            }
        }
        (Kind::String { .. }, Data::Octets(_)) => {
            value.as_str().map(|text| format!("{:?}", text))
        }
        (_, Data::Choice(_) | Data::Fields(_) | Data::Items(_)) => None,
        (_, data) => Some(data.to_string()),
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::DecodeContext;
    use crate::schema::{Field, Schema};

    #[test]
    fn rows() {
        let schema = Schema::sequence(vec![
            Field::new("algorithm", Schema::object_identifier()),
            Field::new("name", Schema::ia5_string()),
            Field::new("list", Schema::sequence_of(
                Schema::enumerated(&[("a", 1), ("b", 2)])
            )),
        ]);
        let data = b"\x30\x80\x06\x02\x2a\x03\x16\x02hi\
                     \x30\x03\x0a\x01\x02\x00\x00";
        let value = schema.decode_all(data, &DecodeContext::ber()).unwrap();
        let names = OidNames::new().with("1.2.3".parse().unwrap(), "test");
        let printed = pprint(&value, &names);
        let rows: Vec<_> = printed.lines().collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], "     0 [1,1,  13] SEQUENCE LENINDEF");
        assert_eq!(
            rows[1],
            "     2 [1,1,   2] . algorithm: OBJECT IDENTIFIER 1.2.3 (test)"
        );
        assert_eq!(rows[2], "     6 [1,1,   2] . name: IA5String \"hi\"");
        assert_eq!(rows[3], "    10 [1,1,   3] . list: SEQUENCE OF");
        assert_eq!(rows[4], "    12 [1,1,   1] . . 0: ENUMERATED 2 (b)");
    }

    #[test]
    fn unset() {
        let schema = Schema::sequence(vec![
            Field::new("flag", Schema::boolean()),
        ]);
        let mut value = schema.empty();
        assert_eq!(pprint(&value, &OidNames::new()), "     -            SEQUENCE\n");
        value.set("flag", true).unwrap();
        let printed = pprint(&value, &OidNames::new());
        assert!(printed.ends_with(". flag: BOOLEAN TRUE\n"));
    }
}
