//! Core provider types shared by every container.

use crate::container::Container;
use crate::error::{IocError, Result};
use crate::token::TokenKey;
use once_cell::sync::OnceCell;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

// Every stored value is an `Arc<T>` behind an `Any`, so unsized `T` works too.
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

// Factories receive the container that owns the registration.
pub(crate) type FactoryFn = Box<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

pub(crate) enum Provider {
  Value(Instance),
  Singleton {
    cell: OnceCell<Instance>,
    factory: FactoryFn,
  },
  Factory(FactoryFn),
}

impl Provider {
  pub(crate) fn singleton(factory: FactoryFn) -> Self {
    Provider::Singleton {
      cell: OnceCell::new(),
      factory,
    }
  }

  /// Produces the provider's value. `owner` is the container whose registry
  /// holds this provider.
  pub(crate) fn produce(&self, owner: &Container) -> Result<Instance> {
    match self {
      Provider::Value(instance) => Ok(Arc::clone(instance)),
      Provider::Singleton { cell, factory } => cell.get_or_try_init(|| factory(owner)).cloned(),
      Provider::Factory(factory) => factory(owner),
    }
  }

  pub(crate) fn kind(&self) -> &'static str {
    match self {
      Provider::Value(_) => "value",
      Provider::Singleton { .. } => "singleton",
      Provider::Factory(_) => "factory",
    }
  }
}

impl fmt::Debug for Provider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Provider::Singleton { cell, .. } => f
        .debug_struct("Singleton")
        .field("initialized", &cell.get().is_some())
        .finish(),
      other => f.write_str(other.kind()),
    }
  }
}

pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
  Arc::new(value)
}

pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(
  key: TokenKey,
  instance: &Instance,
) -> Result<Arc<T>> {
  instance
    .downcast_ref::<Arc<T>>()
    .cloned()
    .ok_or_else(|| IocError::TypeMismatch {
      token: key.description().to_owned(),
      expected: type_name::<T>(),
    })
}

/// A typed description of how to produce the value for a token.
///
/// This is the public face of a provider, used by
/// [`Container::override_provider`]. The variant is fixed once registered; a
/// different lifetime needs a new registration.
pub enum ProviderSpec<T: ?Sized> {
  /// Resolution always returns this value.
  Value(Arc<T>),
  /// The factory runs at most once per container; the result is cached there.
  Singleton(Box<dyn Fn() -> Arc<T> + Send + Sync>),
  /// The factory runs on every resolution.
  Factory(Box<dyn Fn() -> Arc<T> + Send + Sync>),
}

impl<T: Send + Sync + 'static> ProviderSpec<T> {
  pub fn value(value: T) -> Self {
    ProviderSpec::Value(Arc::new(value))
  }

  pub fn singleton(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
    ProviderSpec::Singleton(Box::new(move || Arc::new(factory())))
  }

  pub fn factory(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
    ProviderSpec::Factory(Box::new(move || Arc::new(factory())))
  }
}

impl<T: ?Sized + Send + Sync + 'static> From<ProviderSpec<T>> for Provider {
  fn from(spec: ProviderSpec<T>) -> Self {
    match spec {
      ProviderSpec::Value(value) => Provider::Value(erase(value)),
      ProviderSpec::Singleton(factory) => Provider::singleton(Box::new(move |_| Ok(erase(factory())))),
      ProviderSpec::Factory(factory) => Provider::Factory(Box::new(move |_| Ok(erase(factory())))),
    }
  }
}

impl<T: ?Sized> fmt::Debug for ProviderSpec<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self {
      ProviderSpec::Value(_) => "Value",
      ProviderSpec::Singleton(_) => "Singleton",
      ProviderSpec::Factory(_) => "Factory",
    };
    f.write_str(kind)
  }
}
