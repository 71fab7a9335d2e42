//! Error types.

use thiserror::Error;

/// Returned by a checked call on a [`SmallFn`](crate::SmallFn) that holds
/// nothing, either because it was created empty or because its value was
/// moved out.
///
/// Only configurations with `CheckEmpty = Yes` report this error. Without the
/// check, calling an empty container panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("function called, but no callable has been set or it was moved from")]
pub struct EmptyCallError;

/// A configuration cannot hold a given callable type.
///
/// `SmallFn::new` turns this into a compile-time error, so it is only ever
/// observed as a value through [`Configuration::placement`].
///
/// [`Configuration::placement`]: crate::Configuration::placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The callable is larger than the inline buffer and heap fallback is
    /// disabled.
    #[error("callable of {size} bytes does not fit the {capacity}-byte inline buffer and heap fallback is disabled")]
    TooLarge {
        /// Size of the callable.
        size: usize,
        /// Inline capacity of the configuration.
        capacity: usize,
    },

    /// The callable's alignment is incompatible with the inline buffer and
    /// heap fallback is disabled.
    #[error("callable aligned to {align} bytes cannot be placed in a buffer aligned to {alignment} bytes and heap fallback is disabled")]
    Misaligned {
        /// Alignment of the callable.
        align: usize,
        /// Alignment of the inline buffer.
        alignment: usize,
    },
}

impl ConfigurationError {
    /// Static description, usable where formatting is not, e.g. in `const`
    /// panics.
    pub const fn message(&self) -> &'static str {
        match self {
            ConfigurationError::TooLarge { .. } => {
                "the callable does not fit the inline buffer and heap fallback is disabled"
            }
            ConfigurationError::Misaligned { .. } => {
                "the callable's alignment does not fit the inline buffer and heap fallback is disabled"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(
            EmptyCallError.to_string(),
            "function called, but no callable has been set or it was moved from"
        );

        let err = ConfigurationError::TooLarge { size: 100, capacity: 16 };
        assert_eq!(
            err.to_string(),
            "callable of 100 bytes does not fit the 16-byte inline buffer and heap fallback is disabled"
        );

        let err = ConfigurationError::Misaligned { align: 32, alignment: 16 };
        assert!(err.to_string().contains("aligned to 32 bytes"));
        assert!(err.message().contains("alignment"));
    }
}
