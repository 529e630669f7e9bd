use std::any::TypeId;
use std::collections::HashSet;

use crate::descriptor::{Embedding, FieldDescriptor, TypeDescriptor};
use crate::driver::BindContext;
use crate::errors::FailureKind;
use crate::key::{child_key, next_segment, parent_prefix, strip_parent};
use crate::registry::Binder;
use crate::value::{RecordValue, Value};

/// Binds a nested record from the keys under `name.`.
///
/// The first segment after `name.` is the wire name of a field, either of the record
/// itself or of one of its embedded records. Each field is bound at most once, from the
/// composite key `name.<field>`: later keys that resolve to the same field are ignored.
/// Keys that don't resolve to a bindable field are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructBinder;

impl Binder for StructBinder {
    fn bind(&self, cx: &mut BindContext<'_>, key: &str, ty: &TypeDescriptor) -> Value {
        let fields = ty.fields();
        let params = cx.params();
        let prefix = parent_prefix(key);

        let mut record = RecordValue::new(fields.len());
        let mut seen = HashSet::new();
        let mut bound = HashSet::new();
        for candidate in params.keys_with_prefix(&prefix) {
            let Some(rest) = strip_parent(candidate, key) else {
                continue;
            };
            let segment = next_segment(rest);
            if !seen.insert(segment) {
                continue;
            }
            let Some(path) = resolve_field(ty, segment) else {
                cx.fail(
                    candidate,
                    FailureKind::UnknownField {
                        segment: segment.to_owned(),
                    },
                );
                continue;
            };
            if !bound.insert(path.clone()) {
                continue;
            }
            let Some(field) = field_at(fields, &path) else {
                continue;
            };
            let value = cx.bind(&child_key(key, segment), &field.ty());
            record.set_path(&path, value, fields);
        }
        Value::Record(record)
    }
}

/// Find the field addressed by `segment`, returning the field indices that lead to it.
///
/// Direct fields shadow the fields of embedded records, which are searched in
/// declaration order. Embedded records are entered at most once along a path, so
/// self-referential embeddings terminate.
fn resolve_field(ty: &TypeDescriptor, segment: &str) -> Option<Vec<usize>> {
    let mut chain = vec![ty.id()];
    let mut path = resolve_in(ty.fields(), segment, &mut chain)?;
    path.reverse();
    Some(path)
}

/// Same as [`resolve_field`], but the returned path is reversed.
fn resolve_in(
    fields: &'static [FieldDescriptor],
    segment: &str,
    chain: &mut Vec<TypeId>,
) -> Option<Vec<usize>> {
    let direct = fields.iter().position(|field| {
        field.embedding() == Embedding::None && field.wire_name() == Some(segment)
    });
    if let Some(index) = direct {
        return Some(vec![index]);
    }
    for (index, field) in fields.iter().enumerate() {
        if !field.is_embedded() || !field.is_settable() {
            continue;
        }
        let inner = field.ty();
        if chain.contains(&inner.id()) {
            continue;
        }
        chain.push(inner.id());
        let found = resolve_in(inner.fields(), segment, chain);
        chain.pop();
        if let Some(mut path) = found {
            path.push(index);
            return Some(path);
        }
    }
    None
}

fn field_at(fields: &'static [FieldDescriptor], path: &[usize]) -> Option<FieldDescriptor> {
    let (last, parents) = path.split_last()?;
    let mut fields = fields;
    for index in parents {
        fields = fields.get(*index)?.ty().fields();
    }
    fields.get(*last).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bindable, Record, RecordMut, Shape, VisitedSet, record};

    #[derive(Debug, Default, PartialEq)]
    struct Base {
        id: String,
    }

    impl Record for Base {
        const FIELDS: &'static [FieldDescriptor] =
            &[FieldDescriptor::new("id", <String as Bindable>::descriptor)];
    }

    impl Bindable for Base {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<Self>(Shape::Record(Self::FIELDS))
        }

        fn from_value(value: Value) -> Option<Self> {
            record::from_record_value(value)
        }
    }

    impl RecordMut for Base {
        fn fields(&self) -> &'static [FieldDescriptor] {
            Self::FIELDS
        }

        fn type_name(&self) -> &'static str {
            "Base"
        }

        fn assign(&mut self, index: usize, value: Value) -> bool {
            match index {
                0 => record::assign(&mut self.id, value),
                _ => false,
            }
        }

        fn embedded<'a>(
            &'a mut self,
            _index: usize,
            _visited: &mut VisitedSet,
        ) -> Option<&'a mut dyn RecordMut> {
            None
        }
    }

    struct Item;

    const ITEM_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("base", <Base as Bindable>::descriptor).embed(Embedding::Inline),
        FieldDescriptor::new("Name", <String as Bindable>::descriptor).rename("name"),
        FieldDescriptor::new("id", <String as Bindable>::descriptor).skip(),
    ];

    fn item() -> TypeDescriptor {
        TypeDescriptor::of::<Item>(Shape::Record(ITEM_FIELDS))
    }

    #[test]
    fn direct_fields_are_resolved_by_wire_name() {
        let item = item();
        assert_eq!(resolve_field(&item, "name"), Some(vec![1]));
        assert_eq!(resolve_field(&item, "Name"), None);
    }

    #[test]
    fn embedded_fields_are_flattened_unless_shadowed() {
        let item = item();
        // `Item::id` is skipped, so `id` resolves to `Item::base::id`.
        assert_eq!(resolve_field(&item, "id"), Some(vec![0, 0]));
        assert_eq!(resolve_field(&item, "base"), None);
    }

    #[test]
    fn field_paths_lead_to_the_nested_descriptor() {
        let field = field_at(ITEM_FIELDS, &[0, 0]).unwrap();
        assert_eq!(field.name(), "id");
        assert!(field_at(ITEM_FIELDS, &[]).is_none());
        assert!(field_at(ITEM_FIELDS, &[7]).is_none());
    }
}
