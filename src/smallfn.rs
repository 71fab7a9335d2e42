use core::any::TypeId;
use core::fmt;
use core::marker::PhantomData;
use core::mem;

use crate::cell::{self, Placement, RawCell};
use crate::config::{Config, Conversion, DefaultConfig, Duplicate, EmptyCheck, Identify, Receiver, Yes};
use crate::ops::{self, Entry, Ops};
use crate::signature::{Callable, Signature};
use crate::Configuration;

/// A type-erased callable stored inline or on the heap depending on its size.
///
/// `S` is the call signature, written as a function pointer type such as
/// `fn(u32) -> bool`. `C` selects the [configuration](crate::config): inline
/// space, which operations the container supports, and how calls on an
/// empty container behave. `'a` bounds whatever the callable borrows.
///
/// # Example
///
/// ```
/// use smallfn::SmallFn;
///
/// let base = 40u64;
/// let mut f: SmallFn<fn(u32) -> u64> = SmallFn::new(move |x: u32| base + u64::from(x));
///
/// assert_eq!(f.call_mut(2), 42);
/// assert!(!f.is_heap());
/// ```
pub struct SmallFn<'a, S: Signature, C: Config = DefaultConfig> {
    cell: RawCell<C::Space>,
    call: Entry<S>,
    ops: Ops,
    _phantom: PhantomData<(&'a (), *mut ())>,
}

impl<'a, S: Signature, C: Config> SmallFn<'a, S, C> {
    /// Settings of this container type.
    pub const CONFIGURATION: Configuration = Configuration::of::<C>();

    /// Absorbs a callable, placing it inline when it is eligible and boxing
    /// it otherwise.
    ///
    /// Fails to compile when the callable does not satisfy the
    /// configuration: it must be [`Clone`] for copyable configurations,
    /// [`Fn`] when read-only invocation is required, `'static` when
    /// introspection is enabled, and inline-eligible when heap fallback is
    /// disabled.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::space::S1;
    /// use smallfn::{DefaultConfig, Placement, SmallFn};
    ///
    /// let small: SmallFn<fn() -> usize, DefaultConfig<S1>> = SmallFn::new(|| 1usize);
    /// let words = [1usize, 2, 3];
    /// let large: SmallFn<fn() -> usize, DefaultConfig<S1>> =
    ///     SmallFn::new(move || words.iter().sum::<usize>());
    ///
    /// assert_eq!(small.placement(), Some(Placement::Inline));
    /// assert_eq!(large.placement(), Some(Placement::Heap));
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Callable<S::Args> + 'a,
        C::ConstInvocable: Receiver<F, S::Args>,
        C::ReturnConversion: Conversion<F::Output, S::Output>,
        C::Copyable: Duplicate<F>,
        C::Introspection: Identify<F>,
    {
        let placement = const {
            match Configuration::of::<C>().placement(mem::size_of::<F>(), mem::align_of::<F>()) {
                Ok(placement) => placement,
                Err(err) => panic!("{}", err.message()),
            }
        };
        if placement == Placement::Heap {
            trace!(
                size = mem::size_of::<F>(),
                align = mem::align_of::<F>(),
                capacity = Configuration::of::<C>().inline_capacity,
                "callable placed on the heap"
            );
        }

        let mut cell = RawCell::vacant();
        unsafe { cell::emplace::<F, C>(cell.as_erased(), f) };

        SmallFn {
            cell,
            call: Entry::erased(ops::invoke::<F, S, C>),
            ops: Ops::synthesize::<F, C>(),
            _phantom: PhantomData,
        }
    }

    fn vacant() -> Self {
        SmallFn {
            cell: RawCell::vacant(),
            call: Entry::vacant(),
            ops: Ops::Vacant,
            _phantom: PhantomData,
        }
    }

    /// Whether the container holds nothing, because it was created empty or
    /// its value was moved out.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self.ops, Ops::Vacant)
    }

    /// Where the held value lives, `None` when empty.
    #[inline]
    pub fn placement(&self) -> Option<Placement> {
        self.ops.placement()
    }

    /// Whether the held value was boxed.
    #[inline]
    pub fn is_heap(&self) -> bool {
        self.placement() == Some(Placement::Heap)
    }

    /// Whether a callable of type `F` would be placed inline in this
    /// container type.
    ///
    /// ```
    /// use smallfn::space::S2;
    /// use smallfn::{DefaultConfig, SmallFn};
    ///
    /// type Handler = SmallFn<'static, fn(), DefaultConfig<S2>>;
    ///
    /// assert!(Handler::is_inline_eligible::<[usize; 2]>());
    /// assert!(!Handler::is_inline_eligible::<[usize; 3]>());
    /// ```
    pub const fn is_inline_eligible<F>() -> bool {
        cell::is_inline::<F, C>()
    }

    pub(crate) fn dispatch_mut(&mut self, args: S::Args) -> <C::CheckEmpty as EmptyCheck>::Output<S::Output> {
        let (call, ops, cell) = (self.call, self.ops, self.cell.as_erased());
        <C::CheckEmpty as EmptyCheck>::guard(!self.is_empty(), || unsafe {
            call.invoke::<C>(ops, cell, args)
        })
    }

    /// Only reachable when the configuration restricts callables to `Fn`.
    pub(crate) fn dispatch_ref(&self, args: S::Args) -> <C::CheckEmpty as EmptyCheck>::Output<S::Output> {
        let (call, ops, cell) = (self.call, self.ops, self.cell.as_erased_ref());
        <C::CheckEmpty as EmptyCheck>::guard(!self.is_empty(), || unsafe {
            call.invoke::<C>(ops, cell, args)
        })
    }

    /// Destroys the held value, if any, leaving the container empty.
    fn reset(&mut self) {
        let ops = mem::replace(&mut self.ops, Ops::Vacant);
        self.call = Entry::vacant();
        unsafe { ops.destroy(self.cell.as_erased()) };
    }
}

impl<'a, S: Signature, C: Config<FnPtrFastPath = Yes>> SmallFn<'a, S, C> {
    /// Stores a bare function pointer without synthesizing any operations.
    ///
    /// Calls go straight to the pointer; moving and copying the container
    /// copy the pointer.
    ///
    /// ```
    /// use smallfn::{Placement, SmallFn};
    ///
    /// fn square(x: i64) -> i64 {
    ///     x * x
    /// }
    ///
    /// let mut f = SmallFn::<fn(i64) -> i64>::from_fn(square);
    /// assert_eq!(f.placement(), Some(Placement::FnPointer));
    /// assert_eq!(f.call_mut(-3), 9);
    /// ```
    pub fn from_fn(f: S::Plain) -> Self {
        SmallFn {
            cell: RawCell::vacant(),
            call: Entry::plain(f),
            ops: Ops::FnPointer,
            _phantom: PhantomData,
        }
    }
}

impl<'a, S: Signature, C: Config<CanBeEmpty = Yes>> SmallFn<'a, S, C> {
    /// Creates a container holding nothing.
    pub fn empty() -> Self {
        Self::vacant()
    }
}

impl<'a, S: Signature, C: Config<CanBeEmpty = Yes>> Default for SmallFn<'a, S, C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, S: Signature, C: Config<Movable = Yes>> SmallFn<'a, S, C> {
    /// Moves the held value into a new container, leaving this one
    /// moved-from.
    ///
    /// A boxed value changes owner without being reallocated.
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let mut a: SmallFn<fn() -> u8> = SmallFn::new(|| 7u8);
    /// let mut b = a.take();
    ///
    /// assert!(a.is_empty());
    /// assert_eq!(b.call_mut(), 7);
    /// ```
    pub fn take(&mut self) -> Self {
        let mut out = Self::vacant();
        out.move_from(self);
        out
    }

    /// Destroys the held value, then moves the value of `other` in, leaving
    /// `other` moved-from.
    pub fn move_from(&mut self, other: &mut Self) {
        self.reset();
        unsafe { other.ops.relocate(other.cell.as_erased(), self.cell.as_erased()) };
        self.call = mem::replace(&mut other.call, Entry::vacant());
        self.ops = mem::replace(&mut other.ops, Ops::Vacant);
    }

    /// Exchanges the held values of two containers.
    pub fn swap(&mut self, other: &mut Self) {
        let mut scratch = RawCell::<C::Space>::vacant();
        unsafe {
            self.ops.relocate(self.cell.as_erased(), scratch.as_erased());
            other.ops.relocate(other.cell.as_erased(), self.cell.as_erased());
            self.ops.relocate(scratch.as_erased(), other.cell.as_erased());
        }
        mem::swap(&mut self.call, &mut other.call);
        mem::swap(&mut self.ops, &mut other.ops);
    }
}

impl<'a, S: Signature, C: Config<Copyable = Yes>> Clone for SmallFn<'a, S, C> {
    /// Duplicates the held value; a boxed value gets a box of its own.
    fn clone(&self) -> Self {
        let mut out = Self::vacant();
        unsafe { self.ops.duplicate(self.cell.as_erased_ref(), out.cell.as_erased()) };
        out.call = self.call;
        out.ops = self.ops;
        out
    }

    fn clone_from(&mut self, source: &Self) {
        self.reset();
        unsafe { source.ops.duplicate(source.cell.as_erased_ref(), self.cell.as_erased()) };
        self.call = source.call;
        self.ops = source.ops;
    }
}

impl<'a, S, C> SmallFn<'a, S, C>
where
    S: Signature,
    S::Plain: 'static,
    C: Config<Introspection = Yes>,
{
    /// Type of the held value, `None` when empty.
    ///
    /// A function pointer stored by [`from_fn`](SmallFn::from_fn) reports
    /// the signature's function pointer type.
    pub fn target_type(&self) -> Option<TypeId> {
        match self.ops {
            Ops::FnPointer => Some(TypeId::of::<S::Plain>()),
            ops => ops.type_id(),
        }
    }

    /// Whether the held value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.target_type() == Some(TypeId::of::<T>())
    }

    /// The held value, if it is a `T`.
    ///
    /// ```
    /// use smallfn::{Checked, SmallFn};
    ///
    /// #[derive(Clone)]
    /// struct Scale(u32);
    ///
    /// impl Scale {
    ///     fn apply(&self, x: u32) -> u32 {
    ///         self.0 * x
    ///     }
    /// }
    ///
    /// let scale = Scale(3);
    /// let f: SmallFn<fn(u32) -> u32, Checked> = SmallFn::new(move |x: u32| scale.apply(x));
    ///
    /// assert!(f.target::<Scale>().is_none());
    /// assert!(f.target_type().is_some());
    /// ```
    pub fn target<T: 'static>(&self) -> Option<&T> {
        if !self.is::<T>() {
            return None;
        }
        match self.ops {
            Ops::FnPointer => {
                let plain: *const S::Plain = unsafe { self.call.as_plain() };
                Some(unsafe { &*plain.cast::<T>() })
            }
            ops => {
                let addr = unsafe { ops.address(self.cell.as_erased_ref()) }?;
                Some(unsafe { addr.cast::<T>().as_ref() })
            }
        }
    }

    /// The held value, mutably, if it is a `T`.
    pub fn target_mut<T: 'static>(&mut self) -> Option<&mut T> {
        if !self.is::<T>() {
            return None;
        }
        match self.ops {
            Ops::FnPointer => {
                let plain: *mut S::Plain = unsafe { self.call.as_plain_mut() };
                Some(unsafe { &mut *plain.cast::<T>() })
            }
            ops => {
                let addr = unsafe { ops.address(self.cell.as_erased()) }?;
                Some(unsafe { addr.cast::<T>().as_mut() })
            }
        }
    }
}

impl<'a, S: Signature, C: Config> Drop for SmallFn<'a, S, C> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<'a, S: Signature, C: Config> fmt::Debug for SmallFn<'a, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SmallFn")
            .field("placement", &self.placement())
            .finish()
    }
}
