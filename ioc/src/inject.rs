//! Constructor and property injection.
//!
//! [`Injectable`] registers a type's constructor as a factory whose
//! parameters are resolved from the container. Each parameter's token is
//! either declared explicitly with [`Injectable::inject`] or inferred from the
//! parameter's type name by a [`TypeOracle`]. Registration fails right away
//! when neither source knows a parameter's token.
//!
//! [`Injected`] is a field that resolves its token from the root container
//! every time it is read.

use crate::container::Container;
use crate::core::{downcast, erase, FactoryFn, Instance, Provider};
use crate::error::{IocError, Result};
use crate::global::root_container;
use crate::token::{Token, TokenKey};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// How long a constructed instance lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifetime {
  /// Constructed once per container and cached.
  #[default]
  Singleton,
  /// Constructed on every resolution.
  Transient,
}

/// Supplies constructor parameter types when they are not declared explicitly.
pub trait TypeOracle: Send + Sync {
  /// Returns the type names of `class`'s constructor parameters by position,
  /// or `None` if the class is unknown. A `None` entry marks a parameter
  /// whose type cannot be inferred.
  fn parameter_types(&self, class: &str) -> Option<Vec<Option<String>>>;
}

/// A [`TypeOracle`] backed by a fixed table.
#[derive(Debug, Default, Clone)]
pub struct StaticTypeOracle {
  classes: HashMap<String, Vec<Option<String>>>,
}

impl StaticTypeOracle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_class<I, S>(mut self, class: impl Into<String>, params: I) -> Self
  where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
  {
    let params = params.into_iter().map(|p| p.map(Into::into)).collect();
    self.classes.insert(class.into(), params);
    self
  }
}

impl TypeOracle for StaticTypeOracle {
  fn parameter_types(&self, class: &str) -> Option<Vec<Option<String>>> {
    self.classes.get(class).cloned()
  }
}

static TYPE_ORACLE: Lazy<RwLock<Option<Arc<dyn TypeOracle>>>> = Lazy::new(|| RwLock::new(None));

/// Installs the process-wide type oracle consulted by every [`Injectable`]
/// that has no oracle of its own.
pub fn install_type_oracle(oracle: impl TypeOracle + 'static) {
  *TYPE_ORACLE.write() = Some(Arc::new(oracle));
}

pub fn clear_type_oracle() {
  *TYPE_ORACLE.write() = None;
}

fn installed_type_oracle() -> Option<Arc<dyn TypeOracle>> {
  TYPE_ORACLE.read().clone()
}

// `my_app::services::UserRepository` -> `UserRepository`
fn short_type_name<T: ?Sized>() -> &'static str {
  let full = type_name::<T>();
  let head = full.split('<').next().unwrap_or(full);
  match head.rfind("::") {
    Some(pos) => &full[pos + 2..],
    None => full,
  }
}

/// Registers a constructor with its dependencies.
///
/// The token defaults to the class name, which itself defaults to the last
/// path segment of `T`'s type name. The lifetime defaults to
/// [`Lifetime::Singleton`] and the container to the root container.
///
/// # Examples
///
/// ```
/// use fibre_di::{Container, Injectable, Token};
///
/// struct Api;
/// struct Repository {
///   api: std::sync::Arc<Api>,
/// }
///
/// let container = Container::new();
/// let api = Token::<Api>::new("Users.Api");
/// container.register_value(&api, Api);
///
/// let repository = Injectable::<Repository>::new()
///   .container(&container)
///   .inject(0, &api)
///   .register(|args| Ok(Repository { api: args.next_arg()? }))
///   .unwrap();
///
/// assert!(container.resolve(&repository).is_ok());
/// ```
pub struct Injectable<T> {
  class: String,
  token: Option<TokenKey>,
  lifetime: Lifetime,
  container: Option<Container>,
  explicit: Vec<Option<TokenKey>>,
  arity: usize,
  oracle: Option<Arc<dyn TypeOracle>>,
  _type: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Default for Injectable<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Send + Sync + 'static> Injectable<T> {
  pub fn new() -> Self {
    Self {
      class: short_type_name::<T>().to_owned(),
      token: None,
      lifetime: Lifetime::default(),
      container: None,
      explicit: Vec::new(),
      arity: 0,
      oracle: None,
      _type: PhantomData,
    }
  }

  /// Overrides the class name used for the default token, for oracle
  /// lookups and in diagnostics.
  pub fn class_name(mut self, name: impl Into<String>) -> Self {
    self.class = name.into();
    self
  }

  pub fn token(mut self, token: &Token<T>) -> Self {
    self.token = Some(token.key());
    self
  }

  pub fn token_named(mut self, description: &str) -> Self {
    self.token = Some(TokenKey::intern(description));
    self
  }

  pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
    self.lifetime = lifetime;
    self
  }

  pub fn container(mut self, container: &Container) -> Self {
    self.container = Some(container.clone());
    self
  }

  /// Declares how many parameters the constructor takes. Parameters beyond
  /// the explicit and inferred ones must then be resolvable too.
  pub fn arity(mut self, arity: usize) -> Self {
    self.arity = arity;
    self
  }

  /// Declares the token of the constructor parameter at `index`.
  pub fn inject<U: ?Sized>(mut self, index: usize, token: &Token<U>) -> Self {
    if self.explicit.len() <= index {
      self.explicit.resize(index + 1, None);
    }
    self.explicit[index] = Some(token.key());
    self
  }

  pub fn inject_named(self, index: usize, description: &str) -> Self {
    self.inject(index, &Token::<()>::new(description))
  }

  /// Uses `oracle` instead of the process-wide one.
  pub fn oracle(mut self, oracle: Arc<dyn TypeOracle>) -> Self {
    self.oracle = Some(oracle);
    self
  }

  /// Computes the token of every constructor parameter, in order.
  ///
  /// # Errors
  ///
  /// [`IocError::MissingDependencyToken`] for the first parameter that has
  /// neither an explicit token nor an inferable type.
  pub fn dependency_tokens(&self) -> Result<Vec<TokenKey>> {
    let inferred = self
      .oracle
      .clone()
      .or_else(installed_type_oracle)
      .and_then(|oracle| oracle.parameter_types(&self.class))
      .unwrap_or_default();

    let count = self.arity.max(self.explicit.len()).max(inferred.len());
    (0..count)
      .map(|index| {
        if let Some(Some(key)) = self.explicit.get(index) {
          return Ok(*key);
        }
        match inferred.get(index) {
          Some(Some(name)) if !name.is_empty() => Ok(TokenKey::intern(name)),
          _ => Err(IocError::MissingDependencyToken {
            class: self.class.clone(),
            index,
          }),
        }
      })
      .collect()
  }

  /// Registers the constructor and returns the token it was registered under.
  ///
  /// `construct` receives the resolved dependencies in parameter order.
  /// They are resolved from the target container each time the factory runs.
  pub fn register<F>(self, construct: F) -> Result<Token<T>>
  where
    F: Fn(&mut ResolvedArgs) -> Result<T> + Send + Sync + 'static,
  {
    let dependencies = self.dependency_tokens()?;
    let container = self.container.unwrap_or_else(|| root_container().clone());
    let token = self.token.unwrap_or_else(|| TokenKey::intern(&self.class));
    debug!(
      class = %self.class,
      token = %token,
      lifetime = ?self.lifetime,
      dependencies = dependencies.len(),
      "registering injectable"
    );

    let class: Arc<str> = Arc::from(self.class);
    let factory: FactoryFn = Box::new(move |owner: &Container| {
      let args = dependencies
        .iter()
        .map(|&key| owner.resolve_key(key).map(|instance| (key, instance)))
        .collect::<Result<Vec<_>>>()?;
      let mut args = ResolvedArgs {
        class: Arc::clone(&class),
        args,
        cursor: 0,
      };
      Ok(erase(Arc::new(construct(&mut args)?)))
    });

    let provider = match self.lifetime {
      Lifetime::Singleton => Provider::singleton(factory),
      Lifetime::Transient => Provider::Factory(factory),
    };
    container.insert_provider(token, provider);
    Ok(Token::from_key(token))
  }
}

impl<T> fmt::Debug for Injectable<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Injectable")
      .field("class", &self.class)
      .field("token", &self.token)
      .field("lifetime", &self.lifetime)
      .field("explicit", &self.explicit)
      .field("arity", &self.arity)
      .finish()
  }
}

/// The resolved constructor arguments handed to an [`Injectable`]'s
/// constructor closure.
pub struct ResolvedArgs {
  class: Arc<str>,
  args: Vec<(TokenKey, Instance)>,
  cursor: usize,
}

impl ResolvedArgs {
  pub fn len(&self) -> usize {
    self.args.len()
  }

  pub fn is_empty(&self) -> bool {
    self.args.is_empty()
  }

  /// The argument at `index`.
  pub fn get<U: ?Sized + Send + Sync + 'static>(&self, index: usize) -> Result<Arc<U>> {
    let (key, instance) = self
      .args
      .get(index)
      .ok_or_else(|| IocError::MissingDependencyToken {
        class: self.class.to_string(),
        index,
      })?;
    downcast::<U>(*key, instance)
  }

  /// The next argument in parameter order.
  pub fn next_arg<U: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<U>> {
    let index = self.cursor;
    self.cursor += 1;
    self.get(index)
  }
}

impl fmt::Debug for ResolvedArgs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResolvedArgs")
      .field("class", &self.class)
      .field("tokens", &self.args.iter().map(|(key, _)| key).collect::<Vec<_>>())
      .field("cursor", &self.cursor)
      .finish()
  }
}

/// A field that resolves its token from the root container on every read.
pub struct Injected<T: ?Sized> {
  token: Token<T>,
}

impl<T: ?Sized + Send + Sync + 'static> Injected<T> {
  pub fn new(token: Token<T>) -> Self {
    Self { token }
  }

  /// Uses the token described by `property`, typically the field's name.
  pub fn named(property: &str) -> Self {
    Self::new(Token::new(property))
  }

  pub fn token(&self) -> Token<T> {
    self.token
  }

  /// Resolves the token. Nothing is cached between reads.
  pub fn get(&self) -> Result<Arc<T>> {
    root_container().resolve(&self.token)
  }
}

impl<T: ?Sized> Clone for Injected<T> {
  fn clone(&self) -> Self {
    Self { token: self.token }
  }
}

impl<T: ?Sized> fmt::Debug for Injected<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Injected").field(&self.token).finish()
  }
}
