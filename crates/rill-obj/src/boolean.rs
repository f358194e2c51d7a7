//! The `bool` type: two pinned instances.

use crate::object::{ObjKind, ObjRef};

struct Singletons {
    true_obj: ObjRef,
    false_obj: ObjRef,
}

thread_local! {
    static SINGLETONS: Singletons = Singletons {
        true_obj: ObjRef::alloc_pinned(ObjKind::Bool(true)),
        false_obj: ObjRef::alloc_pinned(ObjKind::Bool(false)),
    };
}

/// The `true` object.
pub fn true_obj() -> ObjRef {
    SINGLETONS.with(|s| s.true_obj)
}

/// The `false` object.
pub fn false_obj() -> ObjRef {
    SINGLETONS.with(|s| s.false_obj)
}

/// Convert a host boolean to the corresponding singleton.
#[inline]
pub fn wrap(value: bool) -> ObjRef {
    if value {
        true_obj()
    } else {
        false_obj()
    }
}

/// `as_bool` for `bool`: the value itself.
pub(crate) fn as_bool(this: ObjRef) -> ObjRef {
    debug_assert!(this.is_bool());
    this
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons_are_interned() {
        assert_eq!(true_obj(), true_obj());
        assert_eq!(false_obj(), false_obj());
        assert_ne!(true_obj(), false_obj());
        assert_eq!(wrap(true), true_obj());
        assert_eq!(wrap(false), false_obj());
    }

    #[test]
    fn test_singletons_survive_collection() {
        let t = true_obj();
        rgc::collect();
        assert!(t.bool_value());
        assert_eq!(true_obj(), t);
    }

    #[test]
    fn test_as_bool_returns_self() {
        assert_eq!(as_bool(true_obj()), true_obj());
        assert_eq!(as_bool(false_obj()), false_obj());
    }
}
