//! Records: types with named fields.
//!
//! The traits in this module are implemented by `#[derive(Bind)]`.
//! The free functions are the building blocks used by the generated code.
use std::any::TypeId;
use std::collections::HashSet;

use crate::bindable::Bindable;
use crate::descriptor::FieldDescriptor;
use crate::value::Value;

/// A record type, with a static table of field descriptors.
pub trait Record: Bindable + RecordMut + Default {
    const FIELDS: &'static [FieldDescriptor];
}

/// In-place access to the fields of a record.
///
/// This trait is dyn-compatible: the top-level driver walks `&mut dyn RecordMut`,
/// descending into embedded records without knowing their concrete type.
pub trait RecordMut {
    /// The descriptors of this record's fields.
    fn fields(&self) -> &'static [FieldDescriptor];

    /// The fully qualified name of the record type.
    fn type_name(&self) -> &'static str;

    /// Assign `value` to the field at `index`.
    ///
    /// Returns `false`, leaving the field untouched, if the value is not convertible
    /// into the field's type.
    fn assign(&mut self, index: usize, value: Value) -> bool;

    /// The embedded record stored at `index`.
    ///
    /// Embedded pointers are allocated if they are `None`. `None` is returned if the
    /// field is not embedded or if its target is already on the current descent path.
    fn embedded<'a>(
        &'a mut self,
        index: usize,
        visited: &mut VisitedSet,
    ) -> Option<&'a mut dyn RecordMut>;
}

/// Identity markers for the embedded pointer targets on the current descent path.
///
/// An existing target is identified by its address. A target that has to be allocated
/// has no address yet: it is identified by its type, therefore an embedded pointer type
/// is allocated at most once along any chain of embedded fields. This bounds the
/// recursion on self-referential embedded types such as
/// `struct Node { next: Option<Box<Node>> }`, while sibling fields of the same pointer
/// type are each entered.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<Identity>,
    path: Vec<Identity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Identity {
    Address(usize),
    Type(TypeId),
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Returns `true` if `identity` is not on the current path yet.
    fn enter(&mut self, identity: Identity) -> bool {
        if !self.seen.insert(identity) {
            return false;
        }
        self.path.push(identity);
        true
    }

    /// The number of markers on the current path.
    pub(crate) fn depth(&self) -> usize {
        self.path.len()
    }

    /// Leave every target entered after the path was `depth` markers long.
    pub(crate) fn rewind(&mut self, depth: usize) {
        if depth >= self.path.len() {
            return;
        }
        for identity in self.path.drain(depth..) {
            self.seen.remove(&identity);
        }
    }
}

/// Convert `value` and store it in `slot`.
pub fn assign<T: Bindable>(slot: &mut T, value: Value) -> bool {
    match T::from_value(value) {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

/// Convert `value` and store it in an embedded pointer.
pub fn assign_boxed<T: Bindable>(slot: &mut Option<Box<T>>, value: Value) -> bool {
    if value.is_zero() {
        *slot = None;
        return true;
    }
    match T::from_value(value) {
        Some(v) => {
            *slot = Some(Box::new(v));
            true
        }
        None => false,
    }
}

/// Descend into an embedded pointer, allocating its target if needed.
pub fn descend_pointer<'a, T: Record>(
    slot: &'a mut Option<Box<T>>,
    visited: &mut VisitedSet,
) -> Option<&'a mut dyn RecordMut> {
    let identity = match slot.as_deref() {
        Some(target) => Identity::Address(target as *const T as usize),
        None => Identity::Type(TypeId::of::<T>()),
    };
    if !visited.enter(identity) {
        return None;
    }
    let target: &'a mut dyn RecordMut = &mut **slot.get_or_insert_with(Box::default);
    Some(target)
}

/// Build a record out of the fields collected by the struct binder.
pub fn from_record_value<T: Record>(value: Value) -> Option<T> {
    match value {
        Value::Zero => Some(T::default()),
        Value::Record(fields) if fields.len() == T::FIELDS.len() => {
            let mut record = T::default();
            for (index, value) in fields.into_slots() {
                if !value.is_zero() {
                    record.assign(index, value);
                }
            }
            Some(record)
        }
        _ => None,
    }
}
