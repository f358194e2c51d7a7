//! Type records and type objects.
//!
//! A [`TypeInfo`] describes one type: its name and the operations its
//! instances support. Slots are optional; the generic operations in
//! [`ops`](crate::ops) raise an error naming the type when a slot is
//! absent.
//!
//! Each guest-visible type also exists as a pinned `type` *object*, so that
//! values have a type that is itself a value. The type of a type object is
//! the type object for `type`, which is its own type.

use crate::boolean;
use crate::error::RuntimeError;
use crate::object::{ObjKind, ObjRef};
use crate::{int, list, str as strobj};

/// Description of one type: name plus optional operation slots.
pub struct TypeInfo {
    /// Type name, used in error messages
    pub name: &'static str,
    /// Truth-value conversion; must return a `bool` object
    pub as_bool: Option<fn(ObjRef) -> ObjRef>,
    /// Subscript read
    pub get_element: Option<fn(ObjRef, ObjRef) -> Result<ObjRef, RuntimeError>>,
    /// Subscript write
    pub set_element: Option<fn(ObjRef, ObjRef, ObjRef) -> Result<(), RuntimeError>>,
}

fn type_as_bool(_this: ObjRef) -> ObjRef {
    boolean::wrap(true)
}

pub static INT: TypeInfo = TypeInfo {
    name: "int",
    as_bool: Some(int::as_bool),
    get_element: None,
    set_element: None,
};

pub static BOOL: TypeInfo = TypeInfo {
    name: "bool",
    as_bool: Some(boolean::as_bool),
    get_element: None,
    set_element: None,
};

pub static STR: TypeInfo = TypeInfo {
    name: "str",
    as_bool: Some(strobj::as_bool),
    get_element: Some(strobj::get_element),
    set_element: None,
};

pub static LIST: TypeInfo = TypeInfo {
    name: "list",
    as_bool: Some(list::as_bool),
    get_element: Some(list::get_element),
    set_element: Some(list::set_element),
};

pub static TYPE: TypeInfo = TypeInfo {
    name: "type",
    as_bool: Some(type_as_bool),
    get_element: None,
    set_element: None,
};

// Internal object kinds. Their records exist so that every object has a
// type name; none of their instances ever reaches a guest operation.

pub static ARRAY: TypeInfo = TypeInfo {
    name: "array",
    as_bool: None,
    get_element: None,
    set_element: None,
};

pub static ENV: TypeInfo = TypeInfo {
    name: "environment",
    as_bool: None,
    get_element: None,
    set_element: None,
};

pub static ENV_CELL: TypeInfo = TypeInfo {
    name: "binding",
    as_bool: None,
    get_element: None,
    set_element: None,
};

/// The type record for a given payload.
pub fn type_info_of(kind: &ObjKind) -> &'static TypeInfo {
    match kind {
        ObjKind::Int(_) => &INT,
        ObjKind::Bool(_) => &BOOL,
        ObjKind::Str(_) => &STR,
        ObjKind::List(_) => &LIST,
        ObjKind::Type(_) => &TYPE,
        ObjKind::Array(_) => &ARRAY,
        ObjKind::Env(_) => &ENV,
        ObjKind::EnvCell(_) => &ENV_CELL,
    }
}

struct TypeObjects {
    int_type: ObjRef,
    bool_type: ObjRef,
    str_type: ObjRef,
    list_type: ObjRef,
    type_type: ObjRef,
}

thread_local! {
    static TYPE_OBJECTS: TypeObjects = TypeObjects {
        int_type: ObjRef::alloc_pinned(ObjKind::Type(&INT)),
        bool_type: ObjRef::alloc_pinned(ObjKind::Type(&BOOL)),
        str_type: ObjRef::alloc_pinned(ObjKind::Type(&STR)),
        list_type: ObjRef::alloc_pinned(ObjKind::Type(&LIST)),
        type_type: ObjRef::alloc_pinned(ObjKind::Type(&TYPE)),
    };
}

/// The type object of a guest value.
///
/// # Panics
///
/// Panics for internal objects (arrays, environments, bindings), which are
/// not guest values and have no type object.
pub fn type_of(obj: ObjRef) -> ObjRef {
    TYPE_OBJECTS.with(|t| match obj.kind() {
        ObjKind::Int(_) => t.int_type,
        ObjKind::Bool(_) => t.bool_type,
        ObjKind::Str(_) => t.str_type,
        ObjKind::List(_) => t.list_type,
        ObjKind::Type(_) => t.type_type,
        ObjKind::Array(_) | ObjKind::Env(_) | ObjKind::EnvCell(_) => {
            panic!("internal object has no type object")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_of_type_is_itself() {
        let int_type = type_of(int::create(5));
        let type_type = type_of(int_type);
        assert!(type_type.is_type());
        assert_eq!(type_of(type_type), type_type);
    }

    #[test]
    fn test_type_objects_are_interned() {
        assert_eq!(type_of(int::create(1)), type_of(int::create(2)));
    }

    #[test]
    fn test_type_object_is_truthy() {
        let t = type_of(boolean::wrap(true));
        let b = crate::ops::as_bool(t).unwrap();
        assert!(b.bool_value());
    }

    #[test]
    fn test_type_names_via_records() {
        assert_eq!(INT.name, "int");
        assert_eq!(TYPE.name, "type");
        assert!(INT.get_element.is_none());
        assert!(LIST.set_element.is_some());
        assert!(STR.set_element.is_none());
    }
}
