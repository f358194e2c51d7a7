//! Variable environments.
//!
//! An environment is a GC-managed linked list of binding cells, so that
//! bound values stay alive exactly as long as the environment is reachable.
//! Lookup is linear; the language has a single flat scope and programs bind
//! a handful of names.

use std::cell::Cell;

use crate::object::{EnvCellData, EnvData, ObjKind, ObjRef};

fn env_data(this: &ObjRef) -> &EnvData {
    match this.kind() {
        ObjKind::Env(data) => data,
        _ => panic!("not an environment"),
    }
}

/// Create an empty environment. May trigger garbage collection.
pub fn create() -> ObjRef {
    ObjRef::alloc(ObjKind::Env(EnvData {
        first: Cell::new(None),
    }))
}

fn find_cell(this: ObjRef, name: &str) -> Option<ObjRef> {
    let mut cur = env_data(&this).first.get();
    while let Some(cell) = cur {
        match cell.kind() {
            ObjKind::EnvCell(data) => {
                if &*data.name == name {
                    return Some(cell);
                }
                cur = data.next.get();
            }
            _ => unreachable!("environment list holds only binding cells"),
        }
    }
    None
}

/// Bind `name` to `value`, replacing any existing binding.
///
/// May trigger garbage collection; the environment and the value must be
/// rooted or otherwise reachable.
pub fn define(this: ObjRef, name: &str, value: ObjRef) {
    if let Some(cell) = find_cell(this, name) {
        match cell.kind() {
            ObjKind::EnvCell(data) => data.value.set(value),
            _ => unreachable!(),
        }
        return;
    }
    let cell = ObjRef::alloc(ObjKind::EnvCell(EnvCellData {
        name: name.into(),
        value: Cell::new(value),
        next: Cell::new(env_data(&this).first.get()),
    }));
    env_data(&this).first.set(Some(cell));
}

/// Look up a binding.
pub fn lookup(this: ObjRef, name: &str) -> Option<ObjRef> {
    find_cell(this, name).map(|cell| match cell.kind() {
        ObjKind::EnvCell(data) => data.value.get(),
        _ => unreachable!(),
    })
}
