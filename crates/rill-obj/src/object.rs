//! Object representation and handles.
//!
//! An [`Object`] is one tagged heap value. Handles ([`ObjRef`]) are thin
//! copyable pointers; equality between handles is pointer identity, which
//! the interning of small integers, booleans and type objects turns into
//! value identity for those types.

use std::cell::Cell;
use std::ops::Deref;
use std::ptr::NonNull;

use rgc::{GcBox, Rooted, Trace};

use crate::types::{self, TypeInfo};

/// A single heap value.
pub struct Object {
    kind: ObjKind,
}

/// The concrete kind of a value, together with its payload.
pub enum ObjKind {
    /// 64-bit signed integer
    Int(i64),
    /// Boolean; only two pinned instances exist
    Bool(bool),
    /// Immutable string (ASCII assumed)
    Str(Box<str>),
    /// Mutable list, backed by a separate array object
    List(ListData),
    /// Backing storage for a list; not guest-visible
    Array(ArrayData),
    /// A type object
    Type(&'static TypeInfo),
    /// Variable environment; not guest-visible
    Env(EnvData),
    /// One binding in an environment; not guest-visible
    EnvCell(EnvCellData),
}

/// Payload of a `list` object. `len <= capacity` always holds; `items`
/// points at an `Array` object whose slots below `len` are filled.
pub struct ListData {
    pub(crate) len: Cell<usize>,
    pub(crate) items: Cell<ObjRef>,
}

/// Payload of an array object: fixed-capacity nullable object slots.
pub struct ArrayData {
    pub(crate) slots: Box<[Cell<Option<ObjRef>>]>,
}

/// Payload of an environment object: head of the binding list.
pub struct EnvData {
    pub(crate) first: Cell<Option<ObjRef>>,
}

/// Payload of one environment binding. The name is an owned copy of the
/// identifier text, so the environment does not borrow the source buffer.
pub struct EnvCellData {
    pub(crate) name: Box<str>,
    pub(crate) value: Cell<ObjRef>,
    pub(crate) next: Cell<Option<ObjRef>>,
}

impl Object {
    pub(crate) fn new(kind: ObjKind) -> Object {
        Object { kind }
    }

    /// The kind tag and payload.
    #[inline]
    pub fn kind(&self) -> &ObjKind {
        &self.kind
    }

    /// The type record describing this value.
    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        types::type_info_of(&self.kind)
    }

    /// Name of this value's type, as used in error messages.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_info().name
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self.kind, ObjKind::Int(_))
    }

    /// The integer payload.
    ///
    /// # Panics
    ///
    /// Panics if the value is not an `int`.
    #[inline]
    pub fn int_value(&self) -> i64 {
        match self.kind {
            ObjKind::Int(v) => v,
            _ => panic!("not an int"),
        }
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self.kind, ObjKind::Bool(_))
    }

    /// The boolean payload.
    ///
    /// # Panics
    ///
    /// Panics if the value is not a `bool`.
    #[inline]
    pub fn bool_value(&self) -> bool {
        match self.kind {
            ObjKind::Bool(v) => v,
            _ => panic!("not a bool"),
        }
    }

    #[inline]
    pub fn is_str(&self) -> bool {
        matches!(self.kind, ObjKind::Str(_))
    }

    /// The string payload.
    ///
    /// # Panics
    ///
    /// Panics if the value is not a `str`.
    #[inline]
    pub fn str_value(&self) -> &str {
        match &self.kind {
            ObjKind::Str(s) => s,
            _ => panic!("not a str"),
        }
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self.kind, ObjKind::List(_))
    }

    #[inline]
    pub fn is_type(&self) -> bool {
        matches!(self.kind, ObjKind::Type(_))
    }
}

impl Trace for Object {
    fn trace(&self) {
        match &self.kind {
            ObjKind::List(list) => list.items.get().visit(),
            ObjKind::Array(array) => {
                for slot in array.slots.iter() {
                    if let Some(item) = slot.get() {
                        item.visit();
                    }
                }
            }
            ObjKind::Env(env) => {
                if let Some(first) = env.first.get() {
                    first.visit();
                }
            }
            ObjKind::EnvCell(cell) => {
                cell.value.get().visit();
                if let Some(next) = cell.next.get() {
                    next.visit();
                }
            }
            ObjKind::Int(_) | ObjKind::Bool(_) | ObjKind::Str(_) | ObjKind::Type(_) => {}
        }
    }
}

/// Copyable handle to a heap value.
///
/// Equality is pointer identity. A handle is valid while its object is
/// reachable (rooted, stored in a reachable object, or interned); the
/// evaluator's rooting discipline is what upholds this.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ObjRef(NonNull<GcBox<Object>>);

impl ObjRef {
    /// Allocate a collectable object.
    pub(crate) fn alloc(kind: ObjKind) -> ObjRef {
        ObjRef(rgc::alloc(Object::new(kind)))
    }

    /// Allocate a pinned singleton.
    pub(crate) fn alloc_pinned(kind: ObjKind) -> ObjRef {
        ObjRef(rgc::alloc_pinned(Object::new(kind)))
    }

    /// Root this object for the returned guard's lifetime.
    #[inline]
    pub fn rooted(self) -> Rooted {
        Rooted::new(self.0)
    }

    /// Report this object to the collector's mark phase.
    #[inline]
    pub fn visit(self) {
        rgc::visit(self.0);
    }
}

impl Deref for ObjRef {
    type Target = Object;

    #[inline]
    fn deref(&self) -> &Object {
        // Valid by the reachability contract documented on the type.
        unsafe { self.0.as_ref() }.data()
    }
}
