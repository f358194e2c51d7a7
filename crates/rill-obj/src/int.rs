//! The `int` type: 64-bit signed integers with a small-value cache.
//!
//! Values in `[-1, 255]` are pinned singletons, so frequent small integers
//! cost no allocation and compare pointer-equal. Overflow behavior of
//! arithmetic is inherited from the host integer type; this may change if
//! the language ever grows arbitrary precision.

use crate::boolean;
use crate::object::{ObjKind, ObjRef};

/// Smallest cached value.
pub const CACHE_MIN: i64 = -1;
/// Largest cached value.
pub const CACHE_MAX: i64 = 255;

thread_local! {
    static CACHE: Vec<ObjRef> = (CACHE_MIN..=CACHE_MAX)
        .map(|v| ObjRef::alloc_pinned(ObjKind::Int(v)))
        .collect();
}

/// Create an `int` object. May trigger garbage collection for values
/// outside the cached range.
pub fn create(value: i64) -> ObjRef {
    if (CACHE_MIN..=CACHE_MAX).contains(&value) {
        return CACHE.with(|cache| cache[(value - CACHE_MIN) as usize]);
    }
    ObjRef::alloc(ObjKind::Int(value))
}

/// `as_bool` for `int`: zero is false, everything else true.
pub(crate) fn as_bool(this: ObjRef) -> ObjRef {
    boolean::wrap(this.int_value() != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_values_are_interned() {
        for v in [CACHE_MIN, 0, 1, 100, CACHE_MAX] {
            assert_eq!(create(v), create(v), "value {v} must be interned");
            assert_eq!(create(v).int_value(), v);
        }
    }

    #[test]
    fn test_uncached_values_are_distinct_objects() {
        let a = create(256);
        let _guard = a.rooted();
        let b = create(256);
        assert_ne!(a, b);
        assert_eq!(a.int_value(), b.int_value());
    }

    #[test]
    fn test_cache_not_on_heap_list() {
        let before = rgc::stats().objects_count;
        let _ = create(0);
        let _ = create(255);
        let _ = create(-1);
        assert_eq!(rgc::stats().objects_count, before);
    }

    #[test]
    fn test_cached_values_survive_collection() {
        let a = create(7);
        rgc::collect();
        assert_eq!(a.int_value(), 7);
        assert_eq!(create(7), a);
    }

    #[test]
    fn test_as_bool() {
        assert!(!as_bool(create(0)).bool_value());
        assert!(as_bool(create(1)).bool_value());
        assert!(as_bool(create(-5)).bool_value());
    }
}
