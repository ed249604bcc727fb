//! Interned tokens used as registry keys.
//!
//! A token is derived from a description string. Two tokens defined from the
//! same description are equal, no matter which module or container defined
//! them, so independently written modules only need to agree on the string.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// The process-wide token space. Created on first use, never torn down.
static TOKEN_SPACE: Lazy<TokenSpace> = Lazy::new(TokenSpace::default);

#[derive(Default)]
struct TokenSpace {
  ids: DashMap<Box<str>, TokenKey>,
  next_id: AtomicU32,
}

impl TokenSpace {
  fn intern(&self, description: &str) -> TokenKey {
    if let Some(key) = self.ids.get(description) {
      return *key;
    }

    // Only the thread that inserts leaks the description, once per distinct
    // string. A racing thread's owned key is simply dropped.
    *self.ids.entry(Box::from(description)).or_insert_with(|| TokenKey {
      id: self.next_id.fetch_add(1, Ordering::Relaxed),
      description: Box::leak(Box::from(description)),
    })
  }
}

/// The type-erased identity of a token.
///
/// Equality and hashing use the interned id only.
#[derive(Clone, Copy)]
pub struct TokenKey {
  id: u32,
  description: &'static str,
}

impl TokenKey {
  /// Interns `description` and returns its key.
  pub fn intern(description: &str) -> Self {
    TOKEN_SPACE.intern(description)
  }

  /// The description this key was interned from.
  pub fn description(&self) -> &'static str {
    self.description
  }
}

impl PartialEq for TokenKey {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TokenKey {}

impl Hash for TokenKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TokenKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TokenKey({}, {:?})", self.id, self.description)
  }
}

impl fmt::Display for TokenKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.description)
  }
}

/// A typed registry key.
///
/// The type parameter only guides the compiler: it has no runtime
/// representation and does not take part in equality.
///
/// # Examples
///
/// ```
/// use fibre_di::Token;
///
/// let a: Token<String> = Token::new("Users.Api");
/// let b: Token<String> = Token::new("Users.Api");
/// assert_eq!(a, b);
/// ```
pub struct Token<T: ?Sized> {
  key: TokenKey,
  _type: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized> Token<T> {
  /// Returns the interned token for `description`.
  pub fn new(description: &str) -> Self {
    Self::from_key(TokenKey::intern(description))
  }

  pub(crate) fn from_key(key: TokenKey) -> Self {
    Self {
      key,
      _type: PhantomData,
    }
  }

  pub fn key(&self) -> TokenKey {
    self.key
  }

  pub fn description(&self) -> &'static str {
    self.key.description
  }
}

impl<T: ?Sized> Clone for Token<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T: ?Sized> Copy for Token<T> {}

impl<T: ?Sized, U: ?Sized> PartialEq<Token<U>> for Token<T> {
  fn eq(&self, other: &Token<U>) -> bool {
    self.key == other.key
  }
}

impl<T: ?Sized> Eq for Token<T> {}

impl<T: ?Sized> Hash for Token<T> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.key.hash(state);
  }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Token").field(&self.key.description).finish()
  }
}

impl<T: ?Sized> fmt::Display for Token<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.key, f)
  }
}

impl<T: ?Sized> From<Token<T>> for TokenKey {
  fn from(token: Token<T>) -> Self {
    token.key
  }
}

impl<T: ?Sized> From<&Token<T>> for TokenKey {
  fn from(token: &Token<T>) -> Self {
    token.key
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_description_interns_to_same_key() {
    let a = TokenKey::intern("token.same");
    let b = TokenKey::intern("token.same");
    assert_eq!(a, b);
    assert_eq!(a.description(), "token.same");
  }

  #[test]
  fn different_descriptions_differ() {
    assert_ne!(TokenKey::intern("token.left"), TokenKey::intern("token.right"));
  }

  #[test]
  fn type_parameter_does_not_affect_equality() {
    let a: Token<u32> = Token::new("token.erased");
    let b: Token<String> = Token::new("token.erased");
    assert!(a == b);
    assert_eq!(TokenKey::from(a), TokenKey::from(&b));
  }

  #[test]
  fn concurrent_interning_agrees() {
    let keys: Vec<TokenKey> = std::thread::scope(|s| {
      let handles: Vec<_> = (0..8)
        .map(|_| s.spawn(|| TokenKey::intern("token.concurrent")))
        .collect();
      handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(keys.windows(2).all(|w| w[0] == w[1]));
    let entries = TOKEN_SPACE
      .ids
      .iter()
      .filter(|entry| &**entry.key() == "token.concurrent")
      .count();
    assert_eq!(entries, 1);
  }
}
