//! # SmallFn: Type-Erased Callables with Inline Storage
//!
//! [`SmallFn`] is a polymorphic function wrapper, like `Box<dyn FnMut>`, that stores small
//! callables inside the container and only falls back to a heap allocation when the callable
//! does not fit.
//!
//! ## Core Concept
//!
//! A closure's size is known at compile time. When it fits the container's inline buffer, and
//! its alignment divides the buffer's, it is constructed right there; otherwise it is boxed and
//! the buffer holds the pointer. Either way the container records a per-type invoker and a small
//! table of lifecycle operations, and never has to discover the stored type again.
//!
//! Every trade-off (inline capacity, copyability, movability, empty state, checked calls,
//! read-only invocation, introspection, heap fallback) is fixed by a [configuration](config)
//! type. Capabilities a configuration leaves out do not exist on the container type at all.
//!
//! ## Quick Start
//!
//! ```rust
//! use smallfn::space::S2;
//! use smallfn::{DefaultConfig, SmallFn};
//!
//! let offset = 10i32;
//! let mut add: SmallFn<fn(i32) -> i32, DefaultConfig<S2>> = SmallFn::new(move |x: i32| x + offset);
//! assert_eq!(add.call_mut(5), 15);
//! assert!(!add.is_heap());
//!
//! // Too large for two words: boxed.
//! let table = [1i32, 2, 3, 4, 5, 6];
//! let mut lookup: SmallFn<fn(usize) -> i32, DefaultConfig<S2>> =
//!     SmallFn::new(move |i: usize| table[i]);
//! assert_eq!(lookup.call_mut(3), 4);
//! assert!(lookup.is_heap());
//!
//! // Copies are independent.
//! let mut copy = add.clone();
//! assert_eq!(copy.call_mut(1), 11);
//! ```
//!
//! ## Configuration
//!
//! ### Presets
//!
//! - [`DefaultConfig`]: copyable, movable, heap fallback, 32 bytes inline.
//! - [`MoveOnly`]: movable, may be empty, 48 bytes inline.
//! - [`Checked`]: copyable, may be empty, calls return `Result`, the stored type can be queried.
//! - [`Inplace`]: never allocates, never moves, never copies.
//!
//! ### Checked Calls
//!
//! ```rust
//! use smallfn::{Checked, EmptyCallError, SmallFn};
//!
//! let mut f: SmallFn<fn(u8) -> u8, Checked> = SmallFn::default();
//! assert_eq!(f.call_mut(1), Err(EmptyCallError));
//!
//! f = SmallFn::new(|x: u8| x * 2);
//! assert_eq!(f.call_mut(4), Ok(8));
//!
//! let mut g = f.take();
//! assert_eq!(f.call_mut(4), Err(EmptyCallError));
//! assert_eq!(g.call_mut(4), Ok(8));
//! ```
//!
//! ### Rejected at Compile Time
//!
//! A copyable configuration only accepts [`Clone`] callables:
//!
//! ```compile_fail
//! use smallfn::SmallFn;
//!
//! struct Token;
//!
//! let token = Token;
//! let f: SmallFn<fn()> = SmallFn::new(move || {
//!     let _held = &token;
//! });
//! ```
//!
//! A configuration without heap fallback only accepts callables that fit inline. The check runs
//! when `SmallFn::new` is instantiated for the callable type, so `cargo check` lets it through
//! and `cargo build` reports it:
//!
//! ```compile_fail
//! use smallfn::space::S1;
//! use smallfn::{Inplace, SmallFn};
//!
//! let big = [0u64; 4];
//! let f: SmallFn<fn() -> u64, Inplace<S1>> = SmallFn::new(move || big[0]);
//! ```
//!
//! The same holds for a callable that fits by size but is aligned more strictly than the
//! buffer:
//!
//! ```compile_fail
//! use smallfn::space::MaxAligned;
//! use smallfn::{Inplace, SmallFn};
//!
//! #[repr(align(32))]
//! struct Wide(u8);
//!
//! let wide = Wide(1);
//! let f: SmallFn<fn() -> u8, Inplace<MaxAligned<64>>> = SmallFn::new(move || {
//!     let wide = &wide;
//!     wide.0
//! });
//! ```
//!
//! A move-only container cannot be cloned:
//!
//! ```compile_fail
//! use smallfn::{MoveOnly, SmallFn};
//!
//! let f: SmallFn<fn(), MoveOnly> = SmallFn::new(|| {});
//! let g: SmallFn<fn(), MoveOnly> = f.clone();
//! ```
//!
//! ### Feature Flags
//!
//! - **`std`** (enabled by default)
//!   - Links to the standard library
//!   - Disable for `#![no_std]` environments: `default-features = false`
//!
//! - **`tracing`** (optional)
//!   - Emits `trace` events when a callable is boxed and when a checked call hits an empty
//!     container
//!
//! ## Limitations
//!
//! Signatures are written as function pointer types with up to six arguments. Signatures whose
//! arguments carry higher-ranked lifetimes, such as `for<'x> fn(&'x str)`, are not supported;
//! name the lifetime instead (`fn(&'static str)`).

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

extern crate alloc;

macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($tt)*);
    };
}

mod cell;
pub mod config;
mod error;
mod ops;
pub mod signature;
mod smallfn;
pub mod space;

pub use crate::cell::Placement;
pub use crate::config::{Checked, Config, Configuration, DefaultConfig, Inplace, MoveOnly};
pub use crate::error::{ConfigurationError, EmptyCallError};
pub use crate::signature::Signature;
pub use crate::smallfn::SmallFn;
