// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// How a single attempt ended.
///
/// Every call of the producer is classified into one of these variants before the
/// invoker decides whether to stop or try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    /// The producer resolved and the payload passed the validity check.
    Success(T),

    /// The producer resolved but the payload failed the validity check.
    InvalidResult(T),

    /// The producer failed.
    TransportError(E),
}

impl<T, E> AttemptOutcome<T, E> {
    /// Classifies the result of one producer call.
    pub fn classify(result: Result<T, E>, is_valid: impl FnOnce(&T) -> bool) -> Self {
        match result {
            Ok(payload) if is_valid(&payload) => Self::Success(payload),
            Ok(payload) => Self::InvalidResult(payload),
            Err(error) => Self::TransportError(error),
        }
    }

    /// Short `snake_case` label used in telemetry.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::InvalidResult(_) => "invalid_result",
            Self::TransportError(_) => "transport_error",
        }
    }

    /// Returns true for [`AttemptOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The payload, if the producer resolved.
    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Success(payload) | Self::InvalidResult(payload) => Some(payload),
            Self::TransportError(_) => None,
        }
    }

    /// The error, if the producer failed.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::TransportError(error) => Some(error),
            Self::Success(_) | Self::InvalidResult(_) => None,
        }
    }
}

/// The terminal result of an invocation.
///
/// Callers only ever see this value, never the intermediate attempts. The two
/// exhausted variants are kept apart so that "the service answered but the answer is
/// unusable" can be reported differently from "the service could not be reached".
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T, E> {
    /// The first payload that passed the validity check.
    Success(T),

    /// Every attempt was used and the final one returned an invalid payload.
    ExhaustedInvalid(T),

    /// The final attempt failed. Errors from earlier attempts are discarded.
    ExhaustedError(E),
}

impl<T, E> Outcome<T, E> {
    /// Returns true for [`Outcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the valid payload, dropping any failure.
    #[must_use]
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::ExhaustedInvalid(_) | Self::ExhaustedError(_) => None,
        }
    }

    /// Maps the payload of either payload-carrying variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Success(payload) => Outcome::Success(f(payload)),
            Self::ExhaustedInvalid(payload) => Outcome::ExhaustedInvalid(f(payload)),
            Self::ExhaustedError(error) => Outcome::ExhaustedError(error),
        }
    }

    /// Maps the error of [`Outcome::ExhaustedError`].
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Self::Success(payload) => Outcome::Success(payload),
            Self::ExhaustedInvalid(payload) => Outcome::ExhaustedInvalid(payload),
            Self::ExhaustedError(error) => Outcome::ExhaustedError(f(error)),
        }
    }

    /// Converts into a `Result`, folding both exhausted variants into [`Exhausted`].
    ///
    /// # Errors
    ///
    /// Returns [`Exhausted`] when the invocation did not produce a valid payload.
    pub fn into_result(self) -> Result<T, Exhausted<T, E>> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::ExhaustedInvalid(payload) => Err(Exhausted::Invalid(payload)),
            Self::ExhaustedError(error) => Err(Exhausted::Error(error)),
        }
    }
}

impl<T, E> From<AttemptOutcome<T, E>> for Outcome<T, E> {
    fn from(outcome: AttemptOutcome<T, E>) -> Self {
        match outcome {
            AttemptOutcome::Success(payload) => Self::Success(payload),
            AttemptOutcome::InvalidResult(payload) => Self::ExhaustedInvalid(payload),
            AttemptOutcome::TransportError(error) => Self::ExhaustedError(error),
        }
    }
}

/// The failure half of [`Outcome::into_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exhausted<T, E> {
    /// The last payload, which failed the validity check.
    Invalid(T),

    /// The error raised by the last attempt.
    Error(E),
}

impl<T, E: std::fmt::Display> std::fmt::Display for Exhausted<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(_) => write!(f, "all attempts returned an invalid result"),
            Self::Error(error) => write!(f, "all attempts failed, last error: {error}"),
        }
    }
}

impl<T: std::fmt::Debug, E: std::error::Error + 'static> std::error::Error for Exhausted<T, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(_) => None,
            Self::Error(error) => Some(error),
        }
    }
}
