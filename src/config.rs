//! Configuration of a [`SmallFn`](crate::SmallFn) type.
//!
//! Every structural trade-off of the container is chosen once, by the type
//! implementing [`Config`]. Capabilities that add or remove API surface are
//! flag types ([`Yes`] / [`No`]) so that, for instance, a non-copyable
//! configuration has no `Clone` impl at all. Capabilities that only select a
//! code path are associated constants.
//!
//! # Example
//!
//! ```
//! use smallfn::config::{Config, No, Yes};
//! use smallfn::space::S2;
//! use smallfn::{Configuration, SmallFn};
//!
//! /// Copyable, checked, 16 bytes of inline space on 64-bit targets.
//! struct Small;
//!
//! impl Config for Small {
//!     type Space = S2;
//!     type ReturnConversion = Yes;
//!     type ConstInvocable = No;
//!     type CanBeEmpty = Yes;
//!     type CheckEmpty = Yes;
//!     type Copyable = Yes;
//!     type Movable = Yes;
//!     type Introspection = No;
//!     type FnPtrFastPath = Yes;
//! }
//!
//! const SMALL: Configuration = Configuration::of::<Small>();
//! assert!(SMALL.check_empty);
//! assert_eq!(SMALL.inline_capacity, 2 * core::mem::size_of::<usize>());
//!
//! let mut f: SmallFn<fn(u8) -> u32, Small> = SmallFn::empty();
//! assert!(f.call_mut(1).is_err());
//! f = SmallFn::new(|x: u8| x);
//! assert_eq!(f.call_mut(7), Ok(7));
//! ```

use core::any::TypeId;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

use crate::cell::{self, Placement};
use crate::error::{ConfigurationError, EmptyCallError};
use crate::signature::{Callable, CallableRef};
use crate::space::MaxAligned;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Yes {}
    impl Sealed for super::No {}
}

/// A type-level boolean.
pub trait Flag: sealed::Sealed + 'static {
    /// Value of the flag.
    const ENABLED: bool;
}

/// The capability is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Yes;

/// The capability is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct No;

impl Flag for Yes {
    const ENABLED: bool = true;
}

impl Flag for No {
    const ENABLED: bool = false;
}

/// Compile-time configuration of a [`SmallFn`](crate::SmallFn).
///
/// Two configurations are unrelated types even when their settings agree.
pub trait Config: 'static {
    /// Shape of the inline buffer, see [`space`](crate::space).
    type Space;
    /// The callable may return any type convertible into the signature's
    /// return type via [`Into`].
    ///
    /// Only lossless conversions qualify: a callable returning `u8` fits a
    /// `fn() -> u32` signature, one returning `u32` does not fit
    /// `fn() -> u8`.
    type ReturnConversion: Flag;
    /// The callable must be [`Fn`] and the container gains a `call(&self, ..)`
    /// entry point.
    type ConstInvocable: Flag;
    /// The container can be created empty (`empty()` and [`Default`]).
    type CanBeEmpty: Flag;
    /// Calls check for emptiness and return `Result<R, EmptyCallError>`.
    type CheckEmpty: EmptyCheck;
    /// The container implements [`Clone`] and requires `Clone` callables.
    type Copyable: Flag;
    /// The container offers `take`, `move_from` and `swap`.
    type Movable: Flag;
    /// The container offers `target_type` and `target`; callables must be
    /// `'static`.
    type Introspection: Flag;
    /// Bare function pointers can be stored without an operation table
    /// through `from_fn`.
    type FnPtrFastPath: Flag;

    /// Callables that are not inline-eligible are boxed. When `false` such
    /// callables are rejected at compile time.
    const ALLOW_HEAP: bool = true;
    /// A panic escaping the callable aborts the process instead of unwinding
    /// through the container.
    const NOTHROW_INVOKE: bool = false;
    /// Only callables whose relocation never unwinds are placed inline.
    const NOTHROW_RELOCATE: bool = true;
    /// A panic escaping `Clone::clone` of the callable aborts the process.
    const NOTHROW_COPY: bool = false;
}

/// Plain value view of a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Configuration {
    /// Inline buffer size in bytes.
    pub inline_capacity: usize,
    /// Inline buffer alignment in bytes.
    pub alignment: usize,
    /// See [`Config::ReturnConversion`].
    pub allow_return_type_conversion: bool,
    /// See [`Config::NOTHROW_INVOKE`].
    pub require_nothrow_invoke: bool,
    /// See [`Config::ConstInvocable`].
    pub require_const_invocable: bool,
    /// See [`Config::NOTHROW_RELOCATE`].
    pub require_nothrow_relocate: bool,
    /// See [`Config::NOTHROW_COPY`].
    pub require_nothrow_copy: bool,
    /// See [`Config::ALLOW_HEAP`].
    pub allow_heap_fallback: bool,
    /// See [`Config::CanBeEmpty`].
    pub can_be_empty: bool,
    /// See [`Config::CheckEmpty`].
    pub check_empty: bool,
    /// See [`Config::Copyable`].
    pub copyable: bool,
    /// See [`Config::Movable`].
    pub movable: bool,
    /// See [`Config::Introspection`].
    pub introspection: bool,
    /// See [`Config::FnPtrFastPath`].
    pub optimize_for_fn_pointers: bool,
}

impl Configuration {
    /// Reads the settings of `C`.
    pub const fn of<C: Config>() -> Configuration {
        Configuration {
            inline_capacity: mem::size_of::<C::Space>(),
            alignment: mem::align_of::<C::Space>(),
            allow_return_type_conversion: C::ReturnConversion::ENABLED,
            require_nothrow_invoke: C::NOTHROW_INVOKE,
            require_const_invocable: C::ConstInvocable::ENABLED,
            require_nothrow_relocate: C::NOTHROW_RELOCATE,
            require_nothrow_copy: C::NOTHROW_COPY,
            allow_heap_fallback: C::ALLOW_HEAP,
            can_be_empty: C::CanBeEmpty::ENABLED,
            check_empty: C::CheckEmpty::ENABLED,
            copyable: C::Copyable::ENABLED,
            movable: C::Movable::ENABLED,
            introspection: C::Introspection::ENABLED,
            optimize_for_fn_pointers: C::FnPtrFastPath::ENABLED,
        }
    }

    /// Whether a container can hold nothing: created empty, or moved from.
    pub const fn has_empty_state(&self) -> bool {
        self.can_be_empty || self.movable
    }

    /// Whether stored values get a full operation table rather than a bare
    /// destructor.
    pub const fn has_operation_table(&self) -> bool {
        self.movable || self.copyable || self.introspection
    }

    /// The placement-eligibility rule.
    ///
    /// A value is placed inline iff it fits the buffer, its alignment divides
    /// the buffer's, and, if required, its relocation never unwinds.
    pub const fn is_inline_eligible(
        &self,
        size: usize,
        align: usize,
        relocation_infallible: bool,
    ) -> bool {
        size <= self.inline_capacity
            && align != 0
            && align <= self.alignment
            && self.alignment % align == 0
            && (!self.require_nothrow_relocate || relocation_infallible)
    }

    /// Where a value of the given layout would be stored, or why it cannot be.
    ///
    /// ```
    /// use smallfn::config::Inplace;
    /// use smallfn::space::S2;
    /// use smallfn::{Configuration, ConfigurationError, Placement};
    ///
    /// let inplace = Configuration::of::<Inplace<S2>>();
    /// let word = core::mem::size_of::<usize>();
    ///
    /// assert_eq!(inplace.placement(word, word), Ok(Placement::Inline));
    /// assert!(matches!(
    ///     inplace.placement(3 * word, word),
    ///     Err(ConfigurationError::TooLarge { .. })
    /// ));
    /// ```
    pub const fn placement(&self, size: usize, align: usize) -> Result<Placement, ConfigurationError> {
        if self.is_inline_eligible(size, align, cell::RELOCATION_NEVER_UNWINDS) {
            Ok(Placement::Inline)
        } else if self.allow_heap_fallback {
            Ok(Placement::Heap)
        } else if size > self.inline_capacity {
            Err(ConfigurationError::TooLarge {
                size,
                capacity: self.inline_capacity,
            })
        } else {
            Err(ConfigurationError::Misaligned {
                align,
                alignment: self.alignment,
            })
        }
    }
}

/// Result shape of a call, selected by [`Config::CheckEmpty`].
pub trait EmptyCheck: Flag {
    /// What a call returns for a signature returning `R`.
    type Output<R>;

    #[doc(hidden)]
    fn guard<R>(holding: bool, call: impl FnOnce() -> R) -> Self::Output<R>;
}

impl EmptyCheck for Yes {
    type Output<R> = Result<R, EmptyCallError>;

    #[inline]
    fn guard<R>(holding: bool, call: impl FnOnce() -> R) -> Result<R, EmptyCallError> {
        if holding {
            Ok(call())
        } else {
            trace!("rejected call on an empty SmallFn");
            Err(EmptyCallError)
        }
    }
}

impl EmptyCheck for No {
    type Output<R> = R;

    #[inline]
    fn guard<R>(_holding: bool, call: impl FnOnce() -> R) -> R {
        call()
    }
}

/// How a stored callable is invoked, selected by [`Config::ConstInvocable`].
pub trait Receiver<F: Callable<Args>, Args>: Flag {
    #[doc(hidden)]
    unsafe fn invoke(f: NonNull<F>, args: Args) -> F::Output;
}

impl<F: CallableRef<Args>, Args> Receiver<F, Args> for Yes {
    #[inline]
    unsafe fn invoke(f: NonNull<F>, args: Args) -> F::Output {
        f.as_ref().call_ref(args)
    }
}

impl<F: Callable<Args>, Args> Receiver<F, Args> for No {
    #[inline]
    unsafe fn invoke(mut f: NonNull<F>, args: Args) -> F::Output {
        f.as_mut().call_mut(args)
    }
}

/// Maps the callable's output `O` to the signature's return type `R`,
/// selected by [`Config::ReturnConversion`].
pub trait Conversion<O, R>: Flag {
    #[doc(hidden)]
    fn convert(out: O) -> R;
}

impl<O: Into<R>, R> Conversion<O, R> for Yes {
    #[inline]
    fn convert(out: O) -> R {
        out.into()
    }
}

impl<R> Conversion<R, R> for No {
    #[inline]
    fn convert(out: R) -> R {
        out
    }
}

/// Duplication of a stored callable, selected by [`Config::Copyable`].
pub trait Duplicate<F>: Flag {
    #[doc(hidden)]
    fn duplicate(value: &F) -> F;
}

impl<F: Clone> Duplicate<F> for Yes {
    #[inline]
    fn duplicate(value: &F) -> F {
        value.clone()
    }
}

impl<F> Duplicate<F> for No {
    fn duplicate(_value: &F) -> F {
        unreachable!("duplicated a callable under a non-copyable configuration")
    }
}

/// Type identity of a stored callable, selected by [`Config::Introspection`].
pub trait Identify<F>: Flag {
    #[doc(hidden)]
    fn type_id() -> TypeId;
}

impl<F: 'static> Identify<F> for Yes {
    #[inline]
    fn type_id() -> TypeId {
        TypeId::of::<F>()
    }
}

impl<F> Identify<F> for No {
    fn type_id() -> TypeId {
        unreachable!("queried the type of a callable under a configuration without introspection")
    }
}

/// The general-purpose configuration.
///
/// Copyable and movable, never empty unless moved from, unchecked calls,
/// heap fallback, return type conversion and the function pointer fast path.
/// The default space is 32 bytes aligned to 16.
pub struct DefaultConfig<Space = MaxAligned<32>>(PhantomData<Space>);

impl<Space: 'static> Config for DefaultConfig<Space> {
    type Space = Space;
    type ReturnConversion = Yes;
    type ConstInvocable = No;
    type CanBeEmpty = No;
    type CheckEmpty = No;
    type Copyable = Yes;
    type Movable = Yes;
    type Introspection = No;
    type FnPtrFastPath = Yes;
}

/// Move-only container that may be empty, with 48 bytes of inline space by
/// default.
pub struct MoveOnly<Space = MaxAligned<48>>(PhantomData<Space>);

impl<Space: 'static> Config for MoveOnly<Space> {
    type Space = Space;
    type ReturnConversion = Yes;
    type ConstInvocable = No;
    type CanBeEmpty = Yes;
    type CheckEmpty = No;
    type Copyable = No;
    type Movable = Yes;
    type Introspection = No;
    type FnPtrFastPath = Yes;
}

/// Behaves like a classic polymorphic function wrapper: copyable, movable,
/// may be empty, calls are checked and the stored type can be queried.
///
/// Introspection requires `'static` callables.
pub struct Checked<Space = MaxAligned<32>>(PhantomData<Space>);

impl<Space: 'static> Config for Checked<Space> {
    type Space = Space;
    type ReturnConversion = Yes;
    type ConstInvocable = No;
    type CanBeEmpty = Yes;
    type CheckEmpty = Yes;
    type Copyable = Yes;
    type Movable = Yes;
    type Introspection = Yes;
    type FnPtrFastPath = Yes;
}

/// Never allocates, never moves, never copies.
///
/// Only a destructor is recorded for the stored callable. Callables that are
/// not inline-eligible fail to compile.
pub struct Inplace<Space = MaxAligned<32>>(PhantomData<Space>);

impl<Space: 'static> Config for Inplace<Space> {
    type Space = Space;
    type ReturnConversion = Yes;
    type ConstInvocable = No;
    type CanBeEmpty = No;
    type CheckEmpty = No;
    type Copyable = No;
    type Movable = No;
    type Introspection = No;
    type FnPtrFastPath = No;

    const ALLOW_HEAP: bool = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::*;

    #[test]
    fn test_presets() {
        let default = Configuration::of::<DefaultConfig>();
        assert_eq!(default.inline_capacity, 32);
        assert_eq!(default.alignment, 16);
        assert!(default.copyable && default.movable && default.allow_heap_fallback);
        assert!(!default.can_be_empty && !default.check_empty);
        assert!(default.require_nothrow_relocate);
        assert!(default.has_operation_table());

        let move_only = Configuration::of::<MoveOnly>();
        assert_eq!(move_only.inline_capacity, 48);
        assert!(move_only.can_be_empty && !move_only.copyable);

        let inplace = Configuration::of::<Inplace>();
        assert!(!inplace.allow_heap_fallback);
        assert!(!inplace.has_operation_table());
        assert!(!inplace.has_empty_state());
    }

    #[test]
    fn test_eligibility_rule() {
        let cfg = Configuration::of::<DefaultConfig<MaxAligned<16>>>();

        assert!(cfg.is_inline_eligible(16, 8, true));
        assert!(cfg.is_inline_eligible(0, 1, true));
        assert!(!cfg.is_inline_eligible(17, 1, true));
        assert!(!cfg.is_inline_eligible(8, 32, true));
        assert!(!cfg.is_inline_eligible(8, 8, false));
        assert!(!cfg.is_inline_eligible(8, 0, true));

        let relaxed = Configuration {
            require_nothrow_relocate: false,
            ..cfg
        };
        assert!(relaxed.is_inline_eligible(8, 8, false));
    }

    #[test]
    fn test_placement() {
        let word = mem::size_of::<usize>();
        let heap = Configuration::of::<DefaultConfig<S1>>();
        assert_eq!(heap.placement(word, word), Ok(Placement::Inline));
        assert_eq!(heap.placement(2 * word, word), Ok(Placement::Heap));

        let inplace = Configuration::of::<Inplace<S1>>();
        assert_eq!(
            inplace.placement(2 * word, word),
            Err(ConfigurationError::TooLarge {
                size: 2 * word,
                capacity: word
            })
        );
        assert_eq!(
            inplace.placement(word, 64),
            Err(ConfigurationError::Misaligned {
                align: 64,
                alignment: mem::align_of::<usize>()
            })
        );
    }

    #[test]
    fn test_zero_capacity() {
        let cfg = Configuration::of::<MoveOnly<MaxAligned<0>>>();
        assert_eq!(cfg.inline_capacity, 0);
        assert_eq!(cfg.placement(0, 1), Ok(Placement::Inline));
        assert_eq!(cfg.placement(1, 1), Ok(Placement::Heap));
    }
}
