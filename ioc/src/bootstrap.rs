//! One-shot application of queued plugins to the root container.

use crate::error::Result;
use crate::global::root_container;
use crate::plugins::get_ioc_plugins;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

// Latched to `true` after the first successful bootstrap.
static BOOTSTRAPPED: AtomicBool = AtomicBool::new(false);

// Held while registrars run, so concurrent first calls are serialized.
static BOOTSTRAP_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Applies every queued registrar to the root container, in queue order.
///
/// Only the first successful call does anything. Registrars queued after
/// that are never applied by this function.
///
/// A failing registrar stops the run and its error is returned as is.
/// Registrations already performed stay in place and the latch stays open,
/// so the next call runs every registrar again.
///
/// Calling this from inside a registrar deadlocks.
pub fn bootstrap_ioc() -> Result<()> {
  let _running = BOOTSTRAP_LOCK.lock();
  if BOOTSTRAPPED.load(Ordering::Acquire) {
    debug!("ioc already bootstrapped");
    return Ok(());
  }

  let registrars = get_ioc_plugins();
  debug!(registrars = registrars.len(), "bootstrapping ioc");
  for registrar in &registrars {
    registrar(root_container())?;
  }

  BOOTSTRAPPED.store(true, Ordering::Release);
  Ok(())
}

/// Whether [`bootstrap_ioc`] has completed successfully. Registrars see
/// `false` while bootstrap is still running.
pub fn is_bootstrapped() -> bool {
  BOOTSTRAPPED.load(Ordering::Acquire)
}

/// Reopens the bootstrap latch. Only for isolating test cases.
#[cfg(any(test, feature = "test-util"))]
pub fn reset_bootstrap() {
  let _running = BOOTSTRAP_LOCK.lock();
  BOOTSTRAPPED.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::IocError;
  use crate::global::{register_value, resolve};
  use crate::plugins::{clear_ioc_plugins, register_ioc_plugin};
  use crate::token::Token;
  use serial_test::serial;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  fn fresh() {
    clear_ioc_plugins();
    reset_bootstrap();
  }

  #[test]
  #[serial]
  fn second_call_is_a_no_op() {
    fresh();
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    register_ioc_plugin(move |_| {
      counted.fetch_add(1, Ordering::SeqCst);
      Ok(())
    });

    bootstrap_ioc().unwrap();
    bootstrap_ioc().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(is_bootstrapped());
  }

  #[test]
  #[serial]
  fn registrars_see_bootstrap_still_open() {
    fresh();
    let seen = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&seen);
    register_ioc_plugin(move |_| {
      if !is_bootstrapped() {
        observed.fetch_add(1, Ordering::SeqCst);
      }
      Ok(())
    });

    bootstrap_ioc().unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert!(is_bootstrapped());
  }

  #[test]
  #[serial]
  fn registrars_run_in_queue_order() {
    fresh();
    let token: Token<&str> = Token::new("bootstrap.order");
    register_ioc_plugin(move |c| {
      c.register_value(&token, "first");
      Ok(())
    });
    register_ioc_plugin(move |c| {
      c.override_value(&token, "second");
      Ok(())
    });

    bootstrap_ioc().unwrap();
    assert_eq!(*resolve(&token).unwrap(), "second");
  }

  #[test]
  #[serial]
  fn late_registrars_are_ignored() {
    fresh();
    bootstrap_ioc().unwrap();

    let token: Token<u32> = Token::new("bootstrap.late");
    register_ioc_plugin(move |c| {
      c.register_value(&token, 1);
      Ok(())
    });
    bootstrap_ioc().unwrap();
    assert!(resolve(&token).is_err());
  }

  #[test]
  #[serial]
  fn failing_registrar_keeps_prior_work_and_latch_open() {
    fresh();
    let done: Token<u32> = Token::new("bootstrap.partial.done");
    let never: Token<u32> = Token::new("bootstrap.partial.never");
    let missing: Token<u32> = Token::new("bootstrap.partial.missing");

    register_ioc_plugin(move |c| {
      c.register_value(&done, 1);
      Ok(())
    });
    register_ioc_plugin(move |c| c.resolve(&missing).map(|_| ()));
    register_ioc_plugin(move |c| {
      c.register_value(&never, 2);
      Ok(())
    });

    let err = bootstrap_ioc().unwrap_err();
    assert!(matches!(err, IocError::UnregisteredToken { .. }));
    assert!(!is_bootstrapped());
    assert_eq!(*resolve(&done).unwrap(), 1);
    assert!(resolve(&never).is_err());

    register_value(&missing, 0);
    bootstrap_ioc().unwrap();
    assert_eq!(*resolve(&never).unwrap(), 2);
  }
}
