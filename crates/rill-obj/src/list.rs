//! The `list` type: growable sequences of object references.
//!
//! A list owns a reference to a backing array object; `len` counts the
//! filled prefix. Appending past the capacity allocates a new backing array
//! of `2 * capacity + 1` slots and copies.

use std::cell::Cell;

use crate::array;
use crate::boolean;
use crate::error::RuntimeError;
use crate::object::{ListData, ObjKind, ObjRef};
use crate::ops;

fn data(this: &ObjRef) -> &ListData {
    match this.kind() {
        ObjKind::List(data) => data,
        _ => panic!("not a list"),
    }
}

/// Create an empty list with the given capacity (must be positive).
///
/// May trigger garbage collection.
pub fn create(initial_capacity: usize) -> ObjRef {
    assert!(initial_capacity > 0);
    let items = array::create(initial_capacity);
    let _items_guard = items.rooted();
    ObjRef::alloc(ObjKind::List(ListData {
        len: Cell::new(0),
        items: Cell::new(items),
    }))
}

/// Number of items in the list.
pub fn length(this: ObjRef) -> usize {
    data(&this).len.get()
}

/// Capacity of the current backing array.
pub fn capacity(this: ObjRef) -> usize {
    array::size(&data(&this).items.get())
}

/// Append an item.
///
/// May trigger garbage collection; the list and the item must be rooted or
/// otherwise reachable.
pub fn append(this: ObjRef, item: ObjRef) {
    let list = data(&this);
    let len = list.len.get();
    if len == array::size(&list.items.get()) {
        let new_capacity = array::size(&list.items.get()) * 2 + 1;
        // The old array stays reachable through the list while the copy
        // allocates.
        let grown = array::copy(list.items.get(), new_capacity);
        list.items.set(grown);
    }
    array::set(&list.items.get(), len, Some(item));
    list.len.set(len + 1);
}

/// Read the item at a checked index.
pub fn get(this: ObjRef, index: usize) -> ObjRef {
    debug_assert!(index < length(this));
    array::get(&data(&this).items.get(), index).expect("list slot below len is filled")
}

/// Replace the item at a checked index.
pub fn set(this: ObjRef, index: usize, value: ObjRef) {
    debug_assert!(index < length(this));
    array::set(&data(&this).items.get(), index, Some(value));
}

/// `as_bool` for `list`: non-empty is true.
pub(crate) fn as_bool(this: ObjRef) -> ObjRef {
    boolean::wrap(length(this) > 0)
}

/// `get_element` for `list`.
pub(crate) fn get_element(this: ObjRef, index: ObjRef) -> Result<ObjRef, RuntimeError> {
    let i = ops::check_index(index, length(this) as i64)?;
    Ok(get(this, i as usize))
}

/// `set_element` for `list`.
pub(crate) fn set_element(this: ObjRef, index: ObjRef, value: ObjRef) -> Result<(), RuntimeError> {
    let i = ops::check_index(index, length(this) as i64)?;
    set(this, i as usize, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int;

    #[test]
    fn test_empty_list() {
        let list = create(4);
        assert_eq!(length(list), 0);
        assert_eq!(capacity(list), 4);
        assert!(!as_bool(list).bool_value());
    }

    #[test]
    fn test_append_preserves_order() {
        let list = create(1);
        let _guard = list.rooted();
        for v in 0..20 {
            let item = int::create(1000 + v);
            let _item_guard = item.rooted();
            append(list, item);
        }
        assert_eq!(length(list), 20);
        for v in 0..20 {
            assert_eq!(get(list, v as usize).int_value(), 1000 + v);
        }
    }

    #[test]
    fn test_capacity_growth_sequence() {
        let list = create(1);
        let _guard = list.rooted();
        let mut capacities = vec![capacity(list)];
        for v in 0..8 {
            append(list, int::create(v));
            if capacity(list) != *capacities.last().unwrap() {
                capacities.push(capacity(list));
            }
        }
        // 1 -> 3 -> 7 -> 15
        assert_eq!(capacities, vec![1, 3, 7, 15]);
    }

    #[test]
    fn test_append_length_law() {
        let list = create(2);
        let _guard = list.rooted();
        for i in 0..10 {
            let before = length(list);
            append(list, int::create(i));
            assert_eq!(length(list), before + 1);
        }
    }

    #[test]
    fn test_set_replaces() {
        let list = create(2);
        let _guard = list.rooted();
        append(list, int::create(10));
        append(list, int::create(20));
        set(list, 1, int::create(99));
        assert_eq!(get(list, 0).int_value(), 10);
        assert_eq!(get(list, 1).int_value(), 99);
    }

    #[test]
    fn test_elements_survive_collection() {
        let list = create(1);
        let _guard = list.rooted();
        for v in 0..10 {
            let item = int::create(5000 + v);
            let _item_guard = item.rooted();
            append(list, item);
        }
        rgc::collect();
        for v in 0..10 {
            assert_eq!(get(list, v as usize).int_value(), 5000 + v);
        }
    }

    #[test]
    fn test_get_element_and_set_element() {
        let list = create(2);
        let _guard = list.rooted();
        append(list, int::create(300));
        append(list, int::create(400));
        let e = get_element(list, int::create(-1)).unwrap();
        assert_eq!(e.int_value(), 400);
        set_element(list, int::create(0), int::create(500)).unwrap();
        assert_eq!(get(list, 0).int_value(), 500);
        assert_eq!(
            get_element(list, int::create(2)),
            Err(RuntimeError::IndexOutOfRange)
        );
    }
}
