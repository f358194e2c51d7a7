//! Fixed-capacity arrays of object references.
//!
//! Arrays are GC objects but not guest values; lists use them as backing
//! storage. Slots hold nullable references so that a fresh array is valid
//! before the list fills it.

use std::cell::Cell;

use crate::object::{ArrayData, ObjKind, ObjRef};

fn data(this: &ObjRef) -> &ArrayData {
    match this.kind() {
        ObjKind::Array(data) => data,
        _ => panic!("not an array"),
    }
}

/// Create an array with all slots empty. May trigger garbage collection.
pub fn create(size: usize) -> ObjRef {
    let slots = (0..size)
        .map(|_| Cell::new(None))
        .collect::<Vec<_>>()
        .into_boxed_slice();
    ObjRef::alloc(ObjKind::Array(ArrayData { slots }))
}

/// Create an array of `new_size` slots, copying from `source`.
///
/// Extra slots stay empty; excess source slots are not copied. May trigger
/// garbage collection; `source` must be rooted or reachable.
pub fn copy(source: ObjRef, new_size: usize) -> ObjRef {
    let array = create(new_size);
    let copied = size(&source).min(new_size);
    for i in 0..copied {
        set(&array, i, get(&source, i));
    }
    array
}

/// Capacity of the array.
pub fn size(this: &ObjRef) -> usize {
    data(this).slots.len()
}

/// Read one slot.
pub fn get(this: &ObjRef, index: usize) -> Option<ObjRef> {
    data(this).slots[index].get()
}

/// Write one slot.
pub fn set(this: &ObjRef, index: usize, value: Option<ObjRef>) {
    data(this).slots[index].set(value);
}
