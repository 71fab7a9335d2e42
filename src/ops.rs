//! Operation tables and invokers synthesized per stored callable type.
//!
//! A [`SmallFn`](crate::SmallFn) never learns the concrete type of what it
//! holds. At construction it records an invoker and an [`Ops`] value, both
//! closed over that type, and from then on only goes through them.
//!
//! # Safety Invariant
//!
//! The functions reachable from an [`Ops`] or an [`Entry`] must have been
//! instantiated with the callable type and configuration that placed the
//! value currently in the cell. Only `SmallFn::new` pairs them, and every
//! move, copy or swap transfers cell, entry and ops together.

use core::any::TypeId;
use core::mem;
use core::ptr::{self, NonNull};

use alloc::boxed::Box;

use crate::cell::{self, Placement};
use crate::config::{Config, Conversion, Duplicate, Flag, Identify, Receiver};
use crate::signature::{Callable, Signature};

/// Type-erased invoker: receives the cell and the argument tuple.
pub(crate) type Invoker<S> =
    unsafe fn(NonNull<u8>, <S as Signature>::Args) -> <S as Signature>::Output;

type DestroyFn = unsafe fn(NonNull<u8>);

/// Lifecycle operations for one callable type under one configuration.
pub(crate) struct OpTable {
    placement: Placement,
    /// Drops the value and releases its box, if any.
    destroy: DestroyFn,
    /// Relocates the value from the first cell into the second, leaving a
    /// husk behind.
    relocate: unsafe fn(NonNull<u8>, NonNull<u8>),
    /// Clones the value from the first cell into the second.
    duplicate: unsafe fn(NonNull<u8>, NonNull<u8>),
    /// Address of the value.
    address: unsafe fn(NonNull<u8>) -> NonNull<()>,
    type_id: fn() -> TypeId,
}

impl OpTable {
    pub(crate) const fn new<F, C: Config>() -> &'static Self
    where
        C::Copyable: Duplicate<F>,
        C::Introspection: Identify<F>,
    {
        const {
            &Self {
                placement: cell::placement::<F, C>(),
                destroy: destroy::<F, C>,
                relocate: relocate::<F, C>,
                duplicate: duplicate::<F, C>,
                address: address::<F, C>,
                type_id: <C::Introspection as Identify<F>>::type_id,
            }
        }
    }
}

/// What the container knows about the value it holds.
#[derive(Clone, Copy)]
pub(crate) enum Ops {
    /// Empty or moved from.
    Vacant,
    /// A bare function pointer sits in the entry; nothing to manage.
    FnPointer,
    /// Destructor-only configurations: no table, no tag dispatch.
    Destructor(DestroyFn, Placement),
    Table(&'static OpTable),
}

impl Ops {
    pub(crate) fn synthesize<F, C: Config>() -> Self
    where
        C::Copyable: Duplicate<F>,
        C::Introspection: Identify<F>,
    {
        if const { crate::Configuration::of::<C>().has_operation_table() } {
            Ops::Table(OpTable::new::<F, C>())
        } else {
            Ops::Destructor(destroy::<F, C>, cell::placement::<F, C>())
        }
    }

    pub(crate) fn placement(&self) -> Option<Placement> {
        match self {
            Ops::Vacant => None,
            Ops::FnPointer => Some(Placement::FnPointer),
            Ops::Destructor(_, placement) => Some(*placement),
            Ops::Table(table) => Some(table.placement),
        }
    }

    /// # Safety
    ///
    /// `cell` must hold the value these operations were synthesized for. The
    /// value is gone afterwards.
    pub(crate) unsafe fn destroy(&self, cell: NonNull<u8>) {
        match self {
            Ops::Vacant | Ops::FnPointer => {}
            Ops::Destructor(destroy, _) => (*destroy)(cell),
            Ops::Table(table) => (table.destroy)(cell),
        }
    }

    /// # Safety
    ///
    /// `src` must hold the value these operations were synthesized for and
    /// `dst` must be vacant. `src` must not be destroyed afterwards.
    pub(crate) unsafe fn relocate(&self, src: NonNull<u8>, dst: NonNull<u8>) {
        match self {
            Ops::Vacant | Ops::FnPointer => {}
            Ops::Destructor(..) => unreachable!("relocated a value without an operation table"),
            Ops::Table(table) => (table.relocate)(src, dst),
        }
    }

    /// # Safety
    ///
    /// `src` must hold the value these operations were synthesized for and
    /// `dst` must be vacant.
    pub(crate) unsafe fn duplicate(&self, src: NonNull<u8>, dst: NonNull<u8>) {
        match self {
            Ops::Vacant | Ops::FnPointer => {}
            Ops::Destructor(..) => unreachable!("duplicated a value without an operation table"),
            Ops::Table(table) => (table.duplicate)(src, dst),
        }
    }

    /// # Safety
    ///
    /// `cell` must hold the value these operations were synthesized for.
    pub(crate) unsafe fn address(&self, cell: NonNull<u8>) -> Option<NonNull<()>> {
        match self {
            Ops::Table(table) => Some((table.address)(cell)),
            _ => None,
        }
    }

    /// Type of a table-bearing value.
    pub(crate) fn type_id(&self) -> Option<TypeId> {
        match self {
            Ops::Table(table) => Some((table.type_id)()),
            _ => None,
        }
    }
}

/// Invoker slot: either a synthesized invoker or a bare function pointer.
///
/// [`Ops::FnPointer`] tells which one is live.
pub(crate) union Entry<S: Signature> {
    erased: Invoker<S>,
    plain: S::Plain,
}

impl<S: Signature> Clone for Entry<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Signature> Copy for Entry<S> {}

impl<S: Signature> Entry<S> {
    pub(crate) fn erased(invoker: Invoker<S>) -> Self {
        Entry { erased: invoker }
    }

    pub(crate) fn plain(f: S::Plain) -> Self {
        Entry { plain: f }
    }

    /// Entry of an empty container.
    pub(crate) fn vacant() -> Self {
        Entry {
            erased: vacant::<S>,
        }
    }

    /// # Safety
    ///
    /// `ops` must be the operations recorded with this entry and `cell` the
    /// cell they manage.
    #[inline]
    pub(crate) unsafe fn invoke<C: Config>(self, ops: Ops, cell: NonNull<u8>, args: S::Args) -> S::Output {
        if C::FnPtrFastPath::ENABLED && matches!(ops, Ops::FnPointer) {
            S::call_plain(self.plain, args)
        } else {
            (self.erased)(cell, args)
        }
    }

    /// # Safety
    ///
    /// The entry must have been created by [`Entry::plain`].
    pub(crate) unsafe fn as_plain(&self) -> &S::Plain {
        &self.plain
    }

    /// # Safety
    ///
    /// The entry must have been created by [`Entry::plain`].
    pub(crate) unsafe fn as_plain_mut(&mut self) -> &mut S::Plain {
        &mut self.plain
    }
}

/// Aborts the process if dropped while a panic unwinds past it.
struct NoUnwind {
    armed: bool,
}

impl NoUnwind {
    fn arm(armed: bool) -> Self {
        NoUnwind { armed }
    }

    fn disarm(self) {
        mem::forget(self);
    }
}

impl Drop for NoUnwind {
    fn drop(&mut self) {
        // Panicking while unwinding aborts.
        if self.armed {
            panic!("panic escaped a callable of a non-unwinding SmallFn");
        }
    }
}

/// Invoker of an empty container.
unsafe fn vacant<S: Signature>(_cell: NonNull<u8>, _args: S::Args) -> S::Output {
    panic!("called an empty or moved-from SmallFn")
}

/// Invoker synthesized for callable type `F`.
pub(crate) unsafe fn invoke<F, S, C>(cell: NonNull<u8>, args: S::Args) -> S::Output
where
    S: Signature,
    C: Config,
    F: Callable<S::Args>,
    C::ConstInvocable: Receiver<F, S::Args>,
    C::ReturnConversion: Conversion<F::Output, S::Output>,
{
    let guard = NoUnwind::arm(C::NOTHROW_INVOKE);
    let out = <C::ConstInvocable as Receiver<F, S::Args>>::invoke(cell::resolve::<F, C>(cell), args);
    let out = <C::ReturnConversion as Conversion<F::Output, S::Output>>::convert(out);
    guard.disarm();
    out
}

unsafe fn destroy<F, C: Config>(cell: NonNull<u8>) {
    let value = cell::resolve::<F, C>(cell);
    if cell::is_inline::<F, C>() {
        ptr::drop_in_place(value.as_ptr());
    } else {
        drop(Box::from_raw(value.as_ptr()));
    }
}

unsafe fn relocate<F, C: Config>(src: NonNull<u8>, dst: NonNull<u8>) {
    if cell::is_inline::<F, C>() {
        ptr::copy_nonoverlapping(src.cast::<F>().as_ptr(), dst.cast::<F>().as_ptr(), 1);
    } else {
        // Ownership of the box moves; nothing is allocated.
        let slot = src.cast::<*mut F>().as_ptr();
        dst.cast::<*mut F>().as_ptr().write(slot.read());
        slot.write(ptr::null_mut());
    }
}

unsafe fn duplicate<F, C: Config>(src: NonNull<u8>, dst: NonNull<u8>)
where
    C::Copyable: Duplicate<F>,
{
    let guard = NoUnwind::arm(C::NOTHROW_COPY);
    let copy = <C::Copyable as Duplicate<F>>::duplicate(cell::resolve::<F, C>(src).as_ref());
    guard.disarm();
    cell::emplace::<F, C>(dst, copy);
}

unsafe fn address<F, C: Config>(cell: NonNull<u8>) -> NonNull<()> {
    cell::resolve::<F, C>(cell).cast()
}
