//! rgc - mark-and-sweep garbage collection for the rill runtime.
//!
//! The collector keeps a singly linked list of every live allocation and a
//! bounded stack of roots. When the number of objects reaches a growth
//! threshold, a collection runs: the mark phase performs a depth-first
//! search from the roots, the sweep phase walks the heap list and frees
//! everything unmarked. If the survivors still occupy at least 87.5% of the
//! threshold afterwards, the threshold doubles.
//!
//! Objects participate by implementing [`Trace`]: the mark phase calls
//! `trace`, which must call [`visit`] for every object reference the value
//! holds. Values without outgoing references implement `trace` as a no-op.
//!
//! # The rooting protocol
//!
//! Every allocation may trigger a collection. An object that is not yet
//! stored in a reachable location *must* be rooted before the next
//! allocating call, or it will be swept while still in use. Rooting and
//! unrooting follow a strict LIFO discipline; [`Rooted`] expresses it as a
//! scope guard, so an early return cannot unbalance the stack:
//!
//! ```
//! use rgc::{Rooted, Trace};
//!
//! struct Leaf(u32);
//! impl Trace for Leaf {
//!     fn trace(&self) {}
//! }
//!
//! let obj = rgc::alloc(Leaf(7));
//! let _guard = Rooted::new(obj);
//! // further allocations cannot free `obj` here
//! ```
//!
//! The collector state is per thread; the interpreter is single-threaded
//! and only one instance runs per process. Dereferencing a handle to an
//! object that was neither rooted nor reachable at the last collection is
//! undefined behavior - the protocol above is what makes handles valid.

pub mod config;

pub use config::GcConfig;

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

/// Trait of every garbage-collected value.
///
/// `trace` must call [`visit`] on each object reference held by the value,
/// and nothing else. It must not allocate, root or unroot.
pub trait Trace {
    fn trace(&self);
}

/// Header shared by all GC allocations.
///
/// The original design folded the mark bit into the low bit of the `next`
/// pointer; here the flags are explicit fields, which costs a word and
/// removes the alignment obligation.
struct GcHeader {
    /// Next object in the heap list, `None` for the tail and for pinned
    /// objects, which are never linked.
    next: Cell<Option<NonNull<GcBox<dyn Trace>>>>,
    /// Mark flag, meaningful only during a collection cycle.
    marked: Cell<bool>,
    /// Pinned objects are immortal: never linked, never swept, skipped by
    /// the mark phase.
    pinned: bool,
}

/// A garbage-collected allocation: header plus value.
#[repr(C)]
pub struct GcBox<T: ?Sized + Trace> {
    header: GcHeader,
    data: T,
}

impl<T: ?Sized + Trace> GcBox<T> {
    /// The stored value.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }
}

/// Internal state of the collector.
struct GcState {
    head: Option<NonNull<GcBox<dyn Trace>>>,
    objects_count: usize,
    threshold: usize,
    roots: Vec<NonNull<GcBox<dyn Trace>>>,
    max_roots: usize,
    cycles: u64,
    total_freed: u64,
}

impl GcState {
    fn new(config: GcConfig) -> GcState {
        GcState {
            head: None,
            objects_count: 0,
            threshold: config.initial_threshold,
            roots: Vec::with_capacity(config.max_roots),
            max_roots: config.max_roots,
            cycles: 0,
            total_freed: 0,
        }
    }
}

impl Drop for GcState {
    fn drop(&mut self) {
        // Free everything still on the heap list; roots no longer matter.
        let mut cur = self.head.take();
        while let Some(ptr) = cur {
            unsafe {
                cur = ptr.as_ref().header.next.get();
                drop(Box::from_raw(ptr.as_ptr()));
            }
        }
    }
}

thread_local! {
    static GC: RefCell<GcState> = RefCell::new(GcState::new(GcConfig::default()));
}

/// Point-in-time collector statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Objects currently on the heap list (pinned objects excluded)
    pub objects_count: usize,
    /// Current collection threshold
    pub threshold: usize,
    /// Current depth of the root stack
    pub roots_count: usize,
    /// Completed collection cycles
    pub cycles: u64,
    /// Objects freed over the lifetime of the collector
    pub total_freed: u64,
}

/// Replace the collector configuration.
///
/// Intended for process startup and tests; must be called before the first
/// allocation.
pub fn configure(config: GcConfig) {
    GC.with(|gc| {
        let mut state = gc.borrow_mut();
        assert!(
            state.objects_count == 0 && state.head.is_none(),
            "collector already in use"
        );
        *state = GcState::new(config);
    });
}

/// Allocate a garbage-collected value.
///
/// Runs a collection first when the object count has reached the threshold.
/// The returned handle is unrooted; see the module docs for the protocol.
pub fn alloc<T: Trace + 'static>(data: T) -> NonNull<GcBox<T>> {
    GC.with(|gc| {
        let mut state = gc.borrow_mut();
        if state.objects_count >= state.threshold {
            collect_impl(&mut state);
        }
        let boxed = Box::new(GcBox {
            header: GcHeader {
                next: Cell::new(state.head),
                marked: Cell::new(false),
                pinned: false,
            },
            data,
        });
        let ptr = NonNull::from(Box::leak(boxed));
        let erased: NonNull<GcBox<dyn Trace>> = ptr;
        state.head = Some(erased);
        state.objects_count += 1;
        ptr
    })
}

/// Allocate an immortal singleton.
///
/// The object is never linked into the heap list, never counted against the
/// threshold and never swept. Used for the interned values of the runtime.
pub fn alloc_pinned<T: Trace + 'static>(data: T) -> NonNull<GcBox<T>> {
    NonNull::from(Box::leak(Box::new(GcBox {
        header: GcHeader {
            next: Cell::new(None),
            marked: Cell::new(false),
            pinned: true,
        },
        data,
    })))
}

/// Push an object onto the root stack.
///
/// Prefer [`Rooted`], which cannot forget the matching [`unroot`].
///
/// # Panics
///
/// Panics when the root stack is full.
pub fn root<T: Trace + 'static>(ptr: NonNull<GcBox<T>>) {
    root_erased(ptr);
}

/// Pop an object from the root stack.
///
/// The object must be the most recently rooted one; it is passed only so
/// that this can be checked.
pub fn unroot<T: Trace + 'static>(ptr: NonNull<GcBox<T>>) {
    unroot_erased(ptr);
}

/// Marks an object and everything reachable from it.
///
/// No-op for pinned objects; they hold no outgoing references.
pub fn visit<T: ?Sized + Trace>(ptr: NonNull<GcBox<T>>) {
    let gcbox = unsafe { ptr.as_ref() };
    if gcbox.header.pinned {
        return;
    }
    if !gcbox.header.marked.get() {
        gcbox.header.marked.set(true);
        gcbox.data.trace();
    }
}

/// Run a collection cycle explicitly.
///
/// Collections normally trigger on allocation; an explicit call frees
/// memory as soon as a large structure becomes unreachable, and is used by
/// the tests.
pub fn collect() {
    GC.with(|gc| collect_impl(&mut gc.borrow_mut()));
}

fn collect_impl(state: &mut GcState) {
    // Mark phase: depth-first from every root. Tracing touches only object
    // headers, never the collector state.
    for &r in state.roots.iter() {
        visit(r);
    }

    // Sweep phase: unlink and free everything unmarked, clear the mark on
    // the survivors.
    let mut freed: usize = 0;
    let mut prev: Option<NonNull<GcBox<dyn Trace>>> = None;
    let mut cur = state.head;
    while let Some(ptr) = cur {
        let header = unsafe { &ptr.as_ref().header };
        let next = header.next.get();
        if header.marked.get() {
            header.marked.set(false);
            prev = Some(ptr);
        } else {
            match prev {
                Some(p) => unsafe { p.as_ref().header.next.set(next) },
                None => state.head = next,
            }
            unsafe { drop(Box::from_raw(ptr.as_ptr())) };
            freed += 1;
        }
        cur = next;
    }
    state.objects_count -= freed;
    state.total_freed += freed as u64;
    state.cycles += 1;

    // Double the threshold while the survivors stay within 1/8 of it.
    if state.objects_count >= state.threshold - state.threshold / 8 {
        state.threshold = state
            .threshold
            .checked_mul(2)
            .expect("collection threshold overflow");
    }

    log::debug!(
        "gc: freed {} objects, {} remaining, threshold {}",
        freed,
        state.objects_count,
        state.threshold
    );
}

/// Current collector statistics.
pub fn stats() -> GcStats {
    GC.with(|gc| {
        let state = gc.borrow();
        GcStats {
            objects_count: state.objects_count,
            threshold: state.threshold,
            roots_count: state.roots.len(),
            cycles: state.cycles,
            total_freed: state.total_freed,
        }
    })
}

/// Scope guard pairing a root with its unroot.
///
/// Guards dropped in reverse declaration order satisfy the LIFO discipline
/// automatically.
pub struct Rooted {
    ptr: NonNull<GcBox<dyn Trace>>,
}

impl Rooted {
    /// Root an object for the lifetime of the guard.
    pub fn new<T: Trace + 'static>(ptr: NonNull<GcBox<T>>) -> Rooted {
        let erased: NonNull<GcBox<dyn Trace>> = ptr;
        root_erased(erased);
        Rooted { ptr: erased }
    }
}

impl Drop for Rooted {
    fn drop(&mut self) {
        unroot_erased(self.ptr);
    }
}

fn root_erased(ptr: NonNull<GcBox<dyn Trace>>) {
    GC.with(|gc| {
        let mut state = gc.borrow_mut();
        if state.roots.len() >= state.max_roots {
            panic!("too many GC roots");
        }
        state.roots.push(ptr);
    });
}

fn unroot_erased(ptr: NonNull<GcBox<dyn Trace>>) {
    GC.with(|gc| {
        let mut state = gc.borrow_mut();
        let top = state.roots.pop().expect("unroot on empty root stack");
        // Fat pointers may carry distinct vtable copies; the address is the
        // identity.
        assert_eq!(
            top.as_ptr() as *mut u8 as usize,
            ptr.as_ptr() as *mut u8 as usize,
            "unroot out of LIFO order"
        );
    });
}
