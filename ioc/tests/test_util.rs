//! Exercises the test-only hooks exposed by the `test-util` feature.

use fibre_di::{
  bootstrap_ioc, clear_ioc_plugins, define_token, get_ioc_plugins, is_bootstrapped,
  register_ioc_plugin, reset_bootstrap, reset_tokens, resolve,
};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fresh() {
  clear_ioc_plugins();
  reset_bootstrap();
}

#[test]
#[serial]
fn test_reset_bootstrap_reopens_the_latch() {
  fresh();
  static RUNS: AtomicUsize = AtomicUsize::new(0);
  register_ioc_plugin(|_| {
    RUNS.fetch_add(1, Ordering::SeqCst);
    Ok(())
  });

  bootstrap_ioc().unwrap();
  reset_bootstrap();
  assert!(!is_bootstrapped());
  bootstrap_ioc().unwrap();

  assert_eq!(RUNS.load(Ordering::SeqCst), 2);
}

#[test]
#[serial]
fn test_clear_isolates_cases() {
  fresh();
  let token = define_token::<&str>("test_util.isolated");
  register_ioc_plugin(move |c| {
    c.register_value(&token, "first case");
    Ok(())
  });
  bootstrap_ioc().unwrap();
  assert_eq!(*resolve(&token).unwrap(), "first case");
  reset_tokens([token]);

  fresh();
  assert!(get_ioc_plugins().is_empty());
  bootstrap_ioc().unwrap();
  assert!(resolve(&token).is_err());
}
