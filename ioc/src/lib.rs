//! # Fibre DI
//!
//! A hierarchical, token-keyed dependency injection container for Rust.
//!
//! Values are registered under interned [`Token`]s and resolved on demand.
//! Containers form a tree: a scope created from a container sees everything
//! its ancestors provide and can shadow any token locally without touching
//! them.
//!
//! ## Core Concepts
//!
//! - **Token**: a typed key interned from a description string. Equal
//!   descriptions give equal tokens, so modules only need to share the string.
//! - **Provider**: how a token's value is produced. A constant value, a
//!   singleton factory (run once per container and cached) or a plain factory
//!   (run on every resolution).
//! - **Root container**: a process-wide container, reachable via
//!   [`root_container`] and the free functions of this crate.
//! - **Plugins**: registrars queued with [`register_ioc_plugin`] and applied
//!   once to the root container by [`bootstrap_ioc`].
//! - **Injection**: [`Injectable`] registers a constructor whose parameters are
//!   resolved from the container, [`Injected`] resolves a field on every read.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_di::{bootstrap_ioc, define_token, register_ioc_plugin, resolve, Token};
//!
//! struct UserApi {
//!   base_url: String,
//! }
//!
//! // Any module can queue its registrations.
//! register_ioc_plugin(|container| {
//!   let api: Token<UserApi> = container.define_token("Users.Api");
//!   container.register_singleton(&api, || UserApi {
//!     base_url: "https://example.com/users".to_string(),
//!   });
//!   Ok(())
//! });
//!
//! // The application applies them once at startup.
//! bootstrap_ioc().unwrap();
//!
//! // Elsewhere, only the description needs to be shared.
//! let api = resolve(&define_token::<UserApi>("Users.Api")).unwrap();
//! assert_eq!(api.base_url, "https://example.com/users");
//! ```

mod bootstrap;
mod container;
mod core;
mod error;
mod global;
mod inject;
mod macros;
mod plugins;
mod token;

#[cfg(any(test, feature = "test-util"))]
pub use bootstrap::reset_bootstrap;
pub use bootstrap::{bootstrap_ioc, is_bootstrapped};
pub use container::Container;
pub use crate::core::ProviderSpec;
pub use error::{IocError, Result};
pub use global::{
  create_scope, define_token, is_registered, override_factory, override_singleton,
  override_value, register_factory, register_singleton, register_value, reset, reset_tokens,
  resolve, root_container,
};
pub use inject::{
  clear_type_oracle, install_type_oracle, Injectable, Injected, Lifetime, ResolvedArgs,
  StaticTypeOracle, TypeOracle,
};
#[cfg(any(test, feature = "test-util"))]
pub use plugins::clear_ioc_plugins;
pub use plugins::{get_ioc_plugins, register_ioc_plugin, Registrar};
pub use token::{Token, TokenKey};
