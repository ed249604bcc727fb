//! The main `Container` struct and its associated methods.

use crate::core::{downcast, erase, Instance, Provider, ProviderSpec};
use crate::error::{IocError, Result};
use crate::token::{Token, TokenKey};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A hierarchical Inversion of Control (IoC) container.
///
/// A container maps tokens to providers and may have a parent. Resolution
/// looks at the local registry first and then walks up the ancestor chain,
/// so a scope created with [`Container::create_scope`] can shadow any
/// token without touching its parent.
///
/// `Container` is a cheap handle: clones share the same registry.
#[derive(Clone, Default)]
pub struct Container {
  inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
  registry: DashMap<TokenKey, Arc<Provider>>,
  parent: Option<Container>,
}

impl Container {
  /// Creates a new, empty container with no parent.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the interned token for `description`. Equal descriptions give
  /// equal tokens across all containers.
  pub fn define_token<T: ?Sized>(&self, description: &str) -> Token<T> {
    Token::new(description)
  }

  // --- PRIVATE HELPERS ---

  pub(crate) fn insert_provider(&self, key: TokenKey, provider: Provider) {
    debug!(token = %key, kind = provider.kind(), "registering provider");
    self.inner.registry.insert(key, Arc::new(provider));
  }

  pub(crate) fn resolve_key(&self, key: TokenKey) -> Result<Instance> {
    let mut current = self;
    loop {
      // Clone the provider out so no map guard is held while a factory runs.
      let provider = current.inner.registry.get(&key).map(|entry| Arc::clone(entry.value()));
      if let Some(provider) = provider {
        trace!(token = %key, kind = provider.kind(), "resolving token");
        return provider.produce(current);
      }
      match &current.inner.parent {
        Some(parent) => {
          trace!(token = %key, "delegating to parent container");
          current = parent;
        }
        None => break,
      }
    }

    debug!(token = %key, "token not registered");
    Err(IocError::UnregisteredToken {
      token: key.description().to_owned(),
    })
  }

  // --- Registration ---

  /// Registers a constant value. Resolution returns the same value every time.
  pub fn register_value<T: Send + Sync + 'static>(&self, token: &Token<T>, value: T) {
    self.insert_provider(token.key(), Provider::Value(erase(Arc::new(value))));
  }

  /// Registers a factory that runs once per container; its result is cached
  /// in this container only.
  pub fn register_singleton<T: Send + Sync + 'static>(
    &self,
    token: &Token<T>,
    factory: impl Fn() -> T + Send + Sync + 'static,
  ) {
    self.insert_provider(
      token.key(),
      Provider::singleton(Box::new(move |_| Ok(erase(Arc::new(factory()))))),
    );
  }

  /// Registers a factory that runs on every resolution.
  pub fn register_factory<T: Send + Sync + 'static>(
    &self,
    token: &Token<T>,
    factory: impl Fn() -> T + Send + Sync + 'static,
  ) {
    self.insert_provider(
      token.key(),
      Provider::Factory(Box::new(move |_| Ok(erase(Arc::new(factory()))))),
    );
  }

  /// Registers a singleton trait object.
  pub fn register_singleton_trait<I: ?Sized + Send + Sync + 'static>(
    &self,
    token: &Token<I>,
    factory: impl Fn() -> Arc<I> + Send + Sync + 'static,
  ) {
    self.insert_provider(
      token.key(),
      Provider::singleton(Box::new(move |_| Ok(erase(factory())))),
    );
  }

  // --- Overrides ---

  /// Replaces the local provider for `token`. Behaves exactly like the
  /// `register_*` family; the name only documents intent.
  pub fn override_provider<T: ?Sized + Send + Sync + 'static>(
    &self,
    token: &Token<T>,
    spec: ProviderSpec<T>,
  ) {
    self.insert_provider(token.key(), Provider::from(spec));
  }

  pub fn override_value<T: Send + Sync + 'static>(&self, token: &Token<T>, value: T) {
    self.override_provider(token, ProviderSpec::value(value));
  }

  pub fn override_singleton<T: Send + Sync + 'static>(
    &self,
    token: &Token<T>,
    factory: impl Fn() -> T + Send + Sync + 'static,
  ) {
    self.override_provider(token, ProviderSpec::singleton(factory));
  }

  pub fn override_factory<T: Send + Sync + 'static>(
    &self,
    token: &Token<T>,
    factory: impl Fn() -> T + Send + Sync + 'static,
  ) {
    self.override_provider(token, ProviderSpec::factory(factory));
  }

  // --- Resolution ---

  /// Returns `true` if this container or any ancestor has a provider for
  /// `token`. Never constructs anything.
  pub fn is_registered<T: ?Sized>(&self, token: &Token<T>) -> bool {
    let key = token.key();
    let mut current = Some(self);
    while let Some(container) = current {
      if container.inner.registry.contains_key(&key) {
        return true;
      }
      current = container.inner.parent.as_ref();
    }
    false
  }

  /// Resolves `token`, walking up the ancestor chain until a provider is found.
  ///
  /// # Errors
  ///
  /// Returns [`IocError::UnregisteredToken`] if no container in the chain has
  /// a provider for `token`.
  pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
    let key = token.key();
    let instance = self.resolve_key(key)?;
    downcast::<T>(key, &instance)
  }

  // --- Housekeeping ---

  /// Removes every local provider. The parent is untouched.
  pub fn reset(&self) {
    debug!(removed = self.inner.registry.len(), "resetting container");
    self.inner.registry.clear();
  }

  /// Removes the local providers of the given tokens only. Ancestor
  /// providers for those tokens become reachable again.
  pub fn reset_tokens<I>(&self, tokens: I)
  where
    I: IntoIterator,
    I::Item: Into<TokenKey>,
  {
    for key in tokens.into_iter().map(Into::into) {
      if self.inner.registry.remove(&key).is_some() {
        debug!(token = %key, "removed provider");
      }
    }
  }

  /// Creates an empty child container whose parent is `self`.
  pub fn create_scope(&self) -> Container {
    debug!("creating scope");
    Container {
      inner: Arc::new(Inner {
        registry: DashMap::new(),
        parent: Some(self.clone()),
      }),
    }
  }

  pub fn parent(&self) -> Option<&Container> {
    self.inner.parent.as_ref()
  }

  /// Number of providers registered locally.
  pub fn len(&self) -> usize {
    self.inner.registry.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.registry.is_empty()
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("providers", &self.inner.registry.len())
      .field("has_parent", &self.inner.parent.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[test]
  fn value_singleton_and_factory_lifetimes() {
    let c = Container::new();
    let a: Token<&str> = c.define_token("unit.a");
    let b: Token<usize> = c.define_token("unit.b");
    let d: Token<usize> = c.define_token("unit.c");

    c.register_value(&a, "x");
    assert_eq!(*c.resolve(&a).unwrap(), "x");

    let counter = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&counter);
    c.register_singleton(&b, move || count.fetch_add(1, Ordering::SeqCst) + 1);
    assert_eq!(*c.resolve(&b).unwrap(), 1);
    assert_eq!(*c.resolve(&b).unwrap(), 1);

    let counter = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&counter);
    c.register_factory(&d, move || count.fetch_add(1, Ordering::SeqCst) + 1);
    assert_eq!(*c.resolve(&d).unwrap(), 1);
    assert_eq!(*c.resolve(&d).unwrap(), 2);
  }

  #[test]
  fn singleton_cache_is_per_container() {
    let parent = Container::new();
    let child = parent.create_scope();
    let token: Token<usize> = Token::new("unit.per_container");
    let calls = Arc::new(AtomicUsize::new(0));

    for container in [&parent, &child] {
      let calls = Arc::clone(&calls);
      container.register_singleton(&token, move || calls.fetch_add(1, Ordering::SeqCst));
    }

    let from_parent = parent.resolve(&token).unwrap();
    let from_child = child.resolve(&token).unwrap();
    assert!(!Arc::ptr_eq(&from_parent, &from_child));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn unregistered_token_names_the_token() {
    let c = Container::new();
    let token: Token<u8> = Token::new("unit.missing");
    assert_eq!(
      c.resolve(&token).unwrap_err(),
      IocError::UnregisteredToken {
        token: "unit.missing".to_string()
      }
    );
  }

  #[test]
  fn mismatched_type_is_reported() {
    let c = Container::new();
    let as_u8: Token<u8> = Token::new("unit.mismatch");
    let as_string: Token<String> = Token::new("unit.mismatch");
    c.register_value(&as_u8, 7);

    match c.resolve(&as_string) {
      Err(IocError::TypeMismatch { token, .. }) => assert_eq!(token, "unit.mismatch"),
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  fn factory_may_register_into_its_own_container() {
    let c = Container::new();
    let outer: Token<u32> = Token::new("unit.reentrant.outer");
    let inner: Token<u32> = Token::new("unit.reentrant.inner");

    let handle = c.clone();
    c.register_factory(&outer, move || {
      handle.register_value(&inner, 5);
      *handle.resolve(&inner).unwrap() + 1
    });

    assert_eq!(*c.resolve(&outer).unwrap(), 6);
    assert_eq!(c.len(), 2);
  }
}
