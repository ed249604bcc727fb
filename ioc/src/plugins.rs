//! The plugin registry: registration callbacks queued for bootstrap.
//!
//! Modules queue a registrar whenever they are initialized; [`crate::bootstrap_ioc`]
//! later applies all of them to the root container, in the order they were
//! queued. The same registrar may be queued more than once and then runs
//! more than once.

use crate::container::Container;
use crate::error::Result;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// A callback that performs registrations against a container.
pub type Registrar = Arc<dyn Fn(&Container) -> Result<()> + Send + Sync>;

static REGISTRARS: Lazy<Mutex<Vec<Registrar>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Appends `registrar` to the plugin list. Never deduplicates.
///
/// # Examples
///
/// ```
/// use fibre_di::{register_ioc_plugin, Token};
///
/// register_ioc_plugin(|container| {
///   container.register_value(&Token::<u32>::new("docs.answer"), 42);
///   Ok(())
/// });
/// ```
pub fn register_ioc_plugin<F>(registrar: F)
where
  F: Fn(&Container) -> Result<()> + Send + Sync + 'static,
{
  let mut registrars = REGISTRARS.lock();
  registrars.push(Arc::new(registrar));
  debug!(pending = registrars.len(), "queued ioc plugin");
}

/// Returns a snapshot of the plugin list. Changing the returned vector never
/// affects the registry.
pub fn get_ioc_plugins() -> Vec<Registrar> {
  REGISTRARS.lock().clone()
}

/// Empties the plugin list. Only for isolating test cases.
#[cfg(any(test, feature = "test-util"))]
pub fn clear_ioc_plugins() {
  REGISTRARS.lock().clear();
}
