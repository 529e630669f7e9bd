use std::collections::BTreeMap;

use crate::descriptor::TypeDescriptor;
use crate::driver::BindContext;
use crate::errors::FailureKind;
use crate::key::{ElementPath, child_key, parent_prefix, strip_parent};
use crate::registry::Binder;
use crate::value::Value;

/// Binds `Vec<T>` from index-addressed keys.
///
/// - Scalar elements are addressed as `name.<index>`.
/// - Record elements are addressed as `name.<index>.<field>`: every key with at least one
///   segment after the index re-enters the struct binder under `name.<index>`.
///
/// The result is as long as the largest index plus one; indices without a key hold the
/// element's zero value. Placement only depends on the indices, never on the order in
/// which keys are scanned.
///
/// A segment that is not a valid index aborts the whole sequence: the field is left
/// empty and the failure is recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceBinder;

impl Binder for SequenceBinder {
    fn bind(&self, cx: &mut BindContext<'_>, key: &str, ty: &TypeDescriptor) -> Value {
        let Some(element) = ty.element() else {
            return Value::Zero;
        };
        let indices = match collect_indices(cx, key, element.is_record()) {
            Ok(indices) => indices,
            Err(kind) => {
                cx.fail(key, kind);
                return Value::Zero;
            }
        };
        let mut elements = BTreeMap::new();
        for (index, segment) in indices {
            let value = cx.bind(&child_key(key, segment), &element);
            elements.insert(index, value);
        }
        Value::Seq(assemble(elements))
    }
}

/// Map every index found under `key` to the raw segment that spelled it.
///
/// With `records` set, only keys that carry a sub-path after the index are considered.
/// Later keys overwrite earlier ones when they spell the same index differently
/// (e.g. `s.1` and `s.01`).
fn collect_indices<'a>(
    cx: &BindContext<'a>,
    key: &str,
    records: bool,
) -> Result<BTreeMap<usize, &'a str>, FailureKind> {
    let params = cx.params();
    let max = cx.config().max_sequence_len;
    let prefix = parent_prefix(key);
    let mut indices = BTreeMap::new();
    for candidate in params.keys_with_prefix(&prefix) {
        let Some(rest) = strip_parent(candidate, key) else {
            continue;
        };
        let path = ElementPath::parse(rest);
        if records && path.subpath.is_none() {
            continue;
        }
        let Some(index) = path.index else {
            return Err(FailureKind::InvalidIndex {
                segment: path.segment.to_owned(),
            });
        };
        if index >= max {
            return Err(FailureKind::IndexOutOfRange { index, max });
        }
        indices.insert(index, path.segment);
    }
    Ok(indices)
}

fn assemble(elements: BTreeMap<usize, Value>) -> Vec<Value> {
    let len = elements.keys().next_back().map_or(0, |max| max + 1);
    let mut sequence: Vec<Value> = std::iter::repeat_with(|| Value::Zero).take(len).collect();
    for (index, value) in elements {
        sequence[index] = value;
    }
    sequence
}
