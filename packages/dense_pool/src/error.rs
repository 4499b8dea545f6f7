use thiserror::Error;

/// Errors that can occur when building a pool.
///
/// Running out of capacity at runtime is not an error: requests on an exhausted pool return
/// `None` so that callers can treat exhaustion as an ordinary outcome.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A callback that the pool cannot operate without was not provided to the builder.
    #[error("the '{callback}' callback must be set before building the pool")]
    MissingCallback {
        /// Name of the builder method that sets the missing callback.
        callback: &'static str,
    },

    /// The maximum capacity of a bounded pool was set below its initial capacity.
    #[error("max capacity {max_capacity} is less than the initial capacity {capacity}")]
    MaxCapacityBelowInitial {
        /// The initial capacity requested from the builder.
        capacity: usize,

        /// The maximum capacity requested from the builder.
        max_capacity: usize,
    },
}

/// A specialized `Result` type for pool construction, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug, std::error::Error);

    #[test]
    fn missing_callback_names_the_callback() {
        let error = Error::MissingCallback {
            callback: "factory",
        };

        assert_eq!(
            error.to_string(),
            "the 'factory' callback must be set before building the pool"
        );
    }

    #[test]
    fn max_capacity_below_initial_reports_both_values() {
        let error = Error::MaxCapacityBelowInitial {
            capacity: 10,
            max_capacity: 4,
        };

        let message = error.to_string();
        assert!(message.contains("10"));
        assert!(message.contains('4'));

        let result: Result<()> = Err(error);
        assert!(result.is_err());
    }
}
