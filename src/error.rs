use thiserror::Error;

/// Errors produced by the fitting, cross-validation, and tuning core.
///
/// `InvalidArgument` and `IllegalState` indicate caller bugs and propagate
/// immediately. `InvalidParameter` marks a value outside its prior's support;
/// during tuning the objective maps this condition to a NaN sentinel instead
/// of failing the run. `OptimizationFailure` means the optimizer exhausted
/// its budget without ever reaching a valid point and is always surfaced.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Size mismatches, empty inputs, malformed groupings.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was invoked in a state that cannot support it.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A parameter value lies outside its prior's support.
    #[error("parameter `{name}` = {value} violates its prior")]
    InvalidParameter { name: String, value: f64 },

    /// The optimizer never found a valid point within its budget.
    #[error("optimization failed: {0}")]
    OptimizationFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_parameter() {
        let err = Error::InvalidParameter {
            name: "noise_variance".to_string(),
            value: -1.0,
        };
        let text = err.to_string();
        assert!(text.contains("noise_variance"));
        assert!(text.contains("-1"));
    }
}
