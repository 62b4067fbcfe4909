//! Applying defined-by rules to a decoded tree.
//!
//! Some values carry content whose type is determined by another value,
//! typically an object identifier next to an ANY or OCTET STRING. Once a
//! tree has been decoded structurally, the rules declared by the schemas
//! of its values and the rules supplied through the decode context are
//! used to decode such content. The result is attached to the value that
//! held the content.
//!
//! Rules are applied until no more can be applied. This allows values
//! decoded through a rule to be the source of further rules.

use bytes::Bytes;
use log::trace;
use crate::error::Error;
use crate::schema::{Define, Kind, Schema};
use crate::value::{Data, Defined, Value};
use super::context::{DecodeContext, DefinesByPath};
use super::path::{DecodePath, PathSegment, PatternSegment};
use super::source::SliceSource;
use super::value::Decoder;


//------------ resolve -------------------------------------------------------

/// Applies all defined-by rules to a decoded value.
///
/// The value is located at `root` which is the decode path of the value.
/// First, the rules declared by schemas are applied. Then each rule of the
/// context is applied in order, each time followed by the rules declared
/// by the schemas of any newly decoded values.
pub(crate) fn resolve(
    value: &mut Value, root: &DecodePath, ctx: &DecodeContext
) -> Result<(), Error> {
    resolve_declared(value, root, ctx)?;
    for rule in &ctx.defines_by_path {
        let actions = plan_by_path(value, root, rule);
        apply(value, root, ctx, actions)?;
        resolve_declared(value, root, ctx)?;
    }
    Ok(())
}

/// Applies the rules declared by schemas until nothing changes.
fn resolve_declared(
    value: &mut Value, root: &DecodePath, ctx: &DecodeContext
) -> Result<(), Error> {
    loop {
        let mut actions = Vec::new();
        {
            let tree: &Value = value;
            walk(tree, &mut root.clone(), &mut |source, path| {
                for define in source.schema().defines_rules() {
                    plan(tree, root, source, path, define, &mut actions);
                }
            });
        }
        if actions.is_empty() {
            return Ok(())
        }
        apply(value, root, ctx, actions)?;
    }
}

/// Collects the actions for a rule of the decode context.
fn plan_by_path(
    tree: &Value, root: &DecodePath, rule: &DefinesByPath
) -> Vec<Action> {
    let mut actions = Vec::new();
    walk(tree, &mut root.clone(), &mut |source, path| {
        let matched = path.strip_prefix(root).map(|rel| {
            rule.source.matches(rel)
        }).unwrap_or(false);
        if matched {
            for define in &rule.defines {
                plan(tree, root, source, path, define, &mut actions);
            }
        }
    });
    actions
}


//------------ Action --------------------------------------------------------

/// The decoding of one target value.
struct Action {
    /// The path of the target relative to the root.
    target: Vec<PathSegment>,

    /// The data of the source value.
    by: Data,

    /// The schema to decode the target’s content with.
    schema: Schema,
}

/// Adds the actions for applying `define` with `source` as the source.
fn plan(
    tree: &Value,
    root: &DecodePath,
    source: &Value,
    path: &DecodePath,
    define: &Define,
    actions: &mut Vec<Action>,
) {
    let Some(data) = source.data() else { return };
    let Some(schema) = define.lookup(data) else {
        trace!("no schema defined by {} at {}", data, path);
        return
    };
    let Some(pattern) = define.target().resolve(root, path) else {
        trace!("defined-by target outside of tree at {}", path);
        return
    };
    let mut targets = Vec::new();
    expand(tree, &pattern, &mut Vec::new(), &mut targets);
    if targets.is_empty() {
        trace!("no defined-by target found for {}", path);
    }
    for target in targets {
        let Some(value) = tree.lookup(&target) else { continue };
        if value.defined().is_some() {
            continue
        }
        if definable_content(value).is_none() {
            trace!(
                "defined-by target {} of {} has no usable content",
                DecodePath::from(target), path
            );
            continue
        }
        actions.push(Action {
            target,
            by: data.clone(),
            schema: schema.clone(),
        })
    }
}

/// Decodes the targets of the actions.
///
/// A target that has been defined already keeps its first definition.
fn apply(
    tree: &mut Value,
    root: &DecodePath,
    ctx: &DecodeContext,
    actions: Vec<Action>,
) -> Result<(), Error> {
    for action in actions {
        let Some(target) = tree.lookup_mut(&action.target) else { continue };
        if target.defined().is_some() {
            continue
        }
        let Some((content, offset)) = definable_content(target) else {
            continue
        };
        let mut path = root.clone();
        for segment in action.target {
            path.push(segment)
        }
        path.push(PathSegment::DefinedBy(action.by.clone()));
        let mut source = SliceSource::with_offset(&content, offset);
        let value = Decoder::new(ctx, path.clone()).decode_value(
            &action.schema, &mut source
        )?;
        if !source.is_empty() {
            return Err(Error::decode(
                "remaining data after defined value"
            ).at(source.pos()).in_path(&path))
        }
        trace!("decoded {} as {}", path, action.schema.type_name());
        target.set_defined(Defined::new(action.by, value));
    }
    Ok(())
}


//------------ Helper Functions ----------------------------------------------

/// Calls `op` for `value` and all its descendants.
fn walk<'a>(
    value: &'a Value,
    path: &mut DecodePath,
    op: &mut impl FnMut(&'a Value, &DecodePath),
) {
    op(value, path);
    for (segment, child) in value.children() {
        path.push(segment);
        walk(child, path, op);
        path.pop();
    }
}

/// Expands a resolved pattern into the paths of all existing values.
fn expand(
    value: &Value,
    pattern: &[PatternSegment],
    path: &mut Vec<PathSegment>,
    res: &mut Vec<Vec<PathSegment>>,
) {
    let Some((head, tail)) = pattern.split_first() else {
        res.push(path.clone());
        return
    };
    let segments = match head {
        PatternSegment::Name(name) => vec![PathSegment::Name(name.clone())],
        PatternSegment::Index(idx) => vec![PathSegment::Index(*idx)],
        PatternSegment::DefinedBy(data) => {
            vec![PathSegment::DefinedBy(data.clone())]
        }
        PatternSegment::Any => {
            (0..value.items().len()).map(PathSegment::Index).collect()
        }
        PatternSegment::Up | PatternSegment::Root => return,
    };
    for segment in segments {
        if let Some(child) = value.child(&segment) {
            path.push(segment);
            expand(child, tail, path, res);
            path.pop();
        }
    }
}

/// Returns the octets a defined value is decoded from and their offset.
///
/// These are the complete encoding of an ANY, the content of an OCTET
/// STRING, and the content of a BIT STRING without unused bits.
fn definable_content(value: &Value) -> Option<(Bytes, usize)> {
    let info = value.info();
    let content_offset = info.map(|info| info.content_offset()).unwrap_or(0);
    match (value.schema().kind(), value.data()?) {
        (Kind::Any, Data::Any(raw)) => {
            Some((raw.clone(), info.map(|info| info.offset).unwrap_or(0)))
        }
        (Kind::OctetString { .. }, Data::Octets(octets)) => {
            Some((octets.clone(), content_offset))
        }
        (Kind::BitString { .. }, Data::BitString(bits)) => {
            if bits.unused() != 0 {
                return None
            }
            Some((bits.octet_bytes(), content_offset + 1))
        }
        _ => None
    }
}
