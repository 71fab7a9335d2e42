//! Call signatures.
//!
//! A [`SmallFn`](crate::SmallFn) is parameterized by a function pointer type
//! such as `fn(u32, &'static str) -> bool`, which fixes the argument and
//! return types of every call. Signatures with up to six arguments are
//! supported.

use crate::config::{Config, EmptyCheck, Yes};
use crate::SmallFn;

/// A call signature, implemented for `fn(A1, .., An) -> R`.
pub trait Signature {
    /// The arguments as a tuple.
    type Args;
    /// The return type.
    type Output;
    /// The bare function pointer type, stored directly by the function
    /// pointer fast path.
    type Plain: Copy;

    /// Calls a bare function pointer with a tuple of arguments.
    fn call_plain(f: Self::Plain, args: Self::Args) -> Self::Output;
}

/// Callables invocable through `&mut self` with an argument tuple.
///
/// Implemented for every [`FnMut`] closure and function.
pub trait Callable<Args> {
    /// What the callable returns.
    type Output;

    /// Calls the callable.
    fn call_mut(&mut self, args: Args) -> Self::Output;
}

/// Callables invocable through `&self`, i.e. [`Fn`].
pub trait CallableRef<Args>: Callable<Args> {
    /// Calls the callable.
    fn call_ref(&self, args: Args) -> Self::Output;
}

macro_rules! signature {
    ($($arg:ident: $ty:ident),*) => {
        impl<R, $($ty),*> Signature for fn($($ty),*) -> R {
            type Args = ($($ty,)*);
            type Output = R;
            type Plain = fn($($ty),*) -> R;

            #[inline]
            fn call_plain(f: Self::Plain, ($($arg,)*): Self::Args) -> R {
                f($($arg),*)
            }
        }

        impl<F, O, $($ty),*> Callable<($($ty,)*)> for F
        where
            F: FnMut($($ty),*) -> O,
        {
            type Output = O;

            #[inline]
            fn call_mut(&mut self, ($($arg,)*): ($($ty,)*)) -> O {
                self($($arg),*)
            }
        }

        impl<F, O, $($ty),*> CallableRef<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> O,
        {
            #[inline]
            fn call_ref(&self, ($($arg,)*): ($($ty,)*)) -> O {
                self($($arg),*)
            }
        }

        impl<'a, R, $($ty,)* C: Config> SmallFn<'a, fn($($ty),*) -> R, C> {
            /// Calls the stored callable.
            ///
            /// Returns `Err(EmptyCallError)` on an empty container when the
            /// configuration checks emptiness, and panics otherwise.
            #[inline]
            pub fn call_mut(&mut self, $($arg: $ty),*) -> <C::CheckEmpty as EmptyCheck>::Output<R> {
                self.dispatch_mut(($($arg,)*))
            }
        }

        impl<'a, R, $($ty,)* C: Config<ConstInvocable = Yes>> SmallFn<'a, fn($($ty),*) -> R, C> {
            /// Calls the stored callable through a shared reference.
            ///
            /// Available when the configuration requires read-only
            /// invocation, which restricts stored callables to [`Fn`].
            #[inline]
            pub fn call(&self, $($arg: $ty),*) -> <C::CheckEmpty as EmptyCheck>::Output<R> {
                self.dispatch_ref(($($arg,)*))
            }
        }
    };
}

signature!();
signature!(a1: A1);
signature!(a1: A1, a2: A2);
signature!(a1: A1, a2: A2, a3: A3);
signature!(a1: A1, a2: A2, a3: A3, a4: A4);
signature!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
signature!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);

#[cfg(test)]
mod tests {
    use super::*;

    fn double(x: u32) -> u32 {
        x * 2
    }

    #[test]
    fn test_call_plain() {
        assert_eq!(<fn(u32) -> u32 as Signature>::call_plain(double, (21,)), 42);
        assert_eq!(<fn() -> u8 as Signature>::call_plain(|| 3, ()), 3);
    }

    #[test]
    fn test_callable_tuples() {
        let mut total = 0;
        let mut add = |a: i32, b: i32, c: i32| {
            total += a + b + c;
            total
        };
        assert_eq!(Callable::call_mut(&mut add, (1, 2, 3)), 6);
        assert_eq!(Callable::call_mut(&mut add, (1, 1, 1)), 9);

        let concat = |a: &str, b: &str| format!("{}{}", a, b);
        assert_eq!(CallableRef::call_ref(&concat, ("ab", "cd")), "abcd");
    }
}
