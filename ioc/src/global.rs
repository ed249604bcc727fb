//! The root container instance and the free functions that forward to it.

use crate::container::Container;
use crate::error::Result;
use crate::token::{Token, TokenKey};
use once_cell::sync::Lazy;
use std::sync::Arc;

// The one and only root container. The token space it relies on is itself
// lazily created, so both exist before any registrar can run.
static ROOT_CONTAINER: Lazy<Container> = Lazy::new(Container::new);

/// Provides a reference to the root container.
///
/// Bootstrap applies every plugin registrar to this container, and all the
/// free functions of this crate forward to it.
///
/// # Examples
///
/// ```
/// use fibre_di::{define_token, root_container};
///
/// let greeting = define_token::<String>("docs.greeting");
/// root_container().register_value(&greeting, String::from("Hello from root!"));
/// assert!(root_container().is_registered(&greeting));
/// ```
pub fn root_container() -> &'static Container {
  &ROOT_CONTAINER
}

pub fn define_token<T: ?Sized>(description: &str) -> Token<T> {
  root_container().define_token(description)
}

pub fn register_value<T: Send + Sync + 'static>(token: &Token<T>, value: T) {
  root_container().register_value(token, value);
}

pub fn register_singleton<T: Send + Sync + 'static>(
  token: &Token<T>,
  factory: impl Fn() -> T + Send + Sync + 'static,
) {
  root_container().register_singleton(token, factory);
}

pub fn register_factory<T: Send + Sync + 'static>(
  token: &Token<T>,
  factory: impl Fn() -> T + Send + Sync + 'static,
) {
  root_container().register_factory(token, factory);
}

/// Resolves `token` from the root container.
pub fn resolve<T: ?Sized + Send + Sync + 'static>(token: &Token<T>) -> Result<Arc<T>> {
  root_container().resolve(token)
}

pub fn is_registered<T: ?Sized>(token: &Token<T>) -> bool {
  root_container().is_registered(token)
}

/// Clears the root container's whole registry.
pub fn reset() {
  root_container().reset();
}

pub fn reset_tokens<I>(tokens: I)
where
  I: IntoIterator,
  I::Item: Into<TokenKey>,
{
  root_container().reset_tokens(tokens);
}

/// Creates a child scope of the root container.
pub fn create_scope() -> Container {
  root_container().create_scope()
}

pub fn override_value<T: Send + Sync + 'static>(token: &Token<T>, value: T) {
  root_container().override_value(token, value);
}

pub fn override_singleton<T: Send + Sync + 'static>(
  token: &Token<T>,
  factory: impl Fn() -> T + Send + Sync + 'static,
) {
  root_container().override_singleton(token, factory);
}

pub fn override_factory<T: Send + Sync + 'static>(
  token: &Token<T>,
  factory: impl Fn() -> T + Send + Sync + 'static,
) {
  root_container().override_factory(token, factory);
}
