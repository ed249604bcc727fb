//! Bootstrap is a one-shot latch over process-wide state, so this binary
//! holds a single test that runs against a pristine process.

use fibre_di::{
  bootstrap_ioc, define_token, get_ioc_plugins, is_bootstrapped, register_ioc_plugin, resolve,
  Injectable, Injected,
};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

struct UserApi {
  base_url: String,
}

struct UserRepository {
  api: Arc<UserApi>,
}

#[test]
fn test_plugins_apply_once_and_late_plugins_are_ignored() {
  static RUNS: AtomicUsize = AtomicUsize::new(0);
  let answer = define_token::<u32>("bootstrap.answer");
  let late = define_token::<u32>("bootstrap.late");

  // Independently written modules queue their registrations.
  register_ioc_plugin(move |c| {
    RUNS.fetch_add(1, Ordering::SeqCst);
    c.register_value(&answer, 42);
    Ok(())
  });
  register_ioc_plugin(|c| {
    c.register_singleton(&c.define_token("Users.Api"), || UserApi {
      base_url: "https://example.com/users".to_string(),
    });
    Ok(())
  });
  register_ioc_plugin(|c| {
    Injectable::<UserRepository>::new()
      .container(c)
      .token_named("Users.Repository")
      .inject_named(0, "Users.Api")
      .register(|args| Ok(UserRepository { api: args.next_arg()? }))?;
    Ok(())
  });
  assert_eq!(get_ioc_plugins().len(), 3);
  assert!(!is_bootstrapped());

  bootstrap_ioc().unwrap();
  bootstrap_ioc().unwrap();

  assert!(is_bootstrapped());
  assert_eq!(RUNS.load(Ordering::SeqCst), 1);
  assert_eq!(*resolve(&answer).unwrap(), 42);

  let repository: Injected<UserRepository> = Injected::named("Users.Repository");
  assert_eq!(repository.get().unwrap().api.base_url, "https://example.com/users");

  // Queued after bootstrap: never applied by the latch.
  register_ioc_plugin(move |c| {
    c.register_value(&late, 1);
    Ok(())
  });
  bootstrap_ioc().unwrap();
  assert!(resolve(&late).is_err());
  assert_eq!(get_ioc_plugins().len(), 4);
}
