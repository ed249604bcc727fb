use thiserror::Error;

/// The error type for every fallible operation in `fibre_di`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IocError {
  /// No provider for the token exists anywhere in the container's ancestor chain.
  #[error("Token not registered: {token}")]
  UnregisteredToken { token: String },

  /// A constructor parameter of an injectable has neither an explicit token
  /// nor an inferable type.
  #[error("Missing token for constructor parameter {index} of {class}. Declare it with `inject`.")]
  MissingDependencyToken { class: String, index: usize },

  /// The stored value does not have the type the token promises. This happens
  /// when tokens of different types are defined from the same description.
  #[error("Token '{token}' does not hold a value of type {expected}")]
  TypeMismatch {
    token: String,
    expected: &'static str,
  },
}

/// A specialized `Result` type for `fibre_di` operations.
pub type Result<T, E = IocError> = std::result::Result<T, E>;
