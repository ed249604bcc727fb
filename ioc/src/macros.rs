//! Public macros for ergonomic token resolution.

/// Resolves a token, panicking if it cannot be resolved.
///
/// Use it where a missing dependency is a programming error. With a single
/// argument it resolves from the root container; with two it resolves from
/// the given container. For a non-panicking version, call `resolve` directly.
///
/// # Panics
///
/// Panics with the underlying [`IocError`](crate::IocError) if the token is
/// not registered anywhere in the chain or holds a value of another type.
///
/// # Examples
///
/// ```
/// use fibre_di::{register_value, resolve, Container, Token};
///
/// let greeting = Token::<String>::new("docs.macro.greeting");
/// register_value(&greeting, String::from("hello"));
/// assert_eq!(*resolve!(&greeting), "hello");
///
/// let scope = Container::new();
/// scope.register_value(&greeting, String::from("hi"));
/// assert_eq!(*resolve!(scope, &greeting), "hi");
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for resolving from the root container: resolve!(&TOKEN)
  ($token:expr) => {
    $crate::root_container()
      .resolve($token)
      .unwrap_or_else(|err| panic!("Failed to resolve required service: {}", err))
  };

  // Arm for resolving from a given container: resolve!(container, &TOKEN)
  ($container:expr, $token:expr) => {
    $container
      .resolve($token)
      .unwrap_or_else(|err| panic!("Failed to resolve required service: {}", err))
  };
}
