//! Defined-by rules declared by schemas.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use crate::decode::PathPattern;
use crate::value::Data;
use super::Schema;


//------------ Define --------------------------------------------------------

/// A rule selecting the schema of another value.
///
/// When a value whose schema carries the rule has been decoded, its data
/// is looked up in `table`. If there is a matching entry, the value found
/// at `target` relative to the path of the value is decoded again using
/// the schema from the entry. The target needs to be an ANY, an OCTET
/// STRING, or a BIT STRING. The result is available via
/// [`Value::defined`][crate::Value::defined] of the target.
#[derive(Clone, Debug)]
pub struct Define {
    /// The path of the target value relative to the source value.
    target: PathPattern,

    /// The schemas to use for each source value.
    table: Vec<(Data, Schema)>,
}

impl Define {
    /// Creates a new rule.
    pub fn new(
        target: impl Into<PathPattern>,
        table: impl IntoIterator<Item = (Data, Schema)>,
    ) -> Self {
        Define {
            target: target.into(),
            table: table.into_iter().collect(),
        }
    }

    /// Returns the pattern for the target value.
    pub fn target(&self) -> &PathPattern {
        &self.target
    }

    /// Returns the schema selected by the given source data.
    pub fn lookup(&self, data: &Data) -> Option<&Schema> {
        self.table.iter().find_map(|(key, schema)| {
            (key == data).then_some(schema)
        })
    }
}
