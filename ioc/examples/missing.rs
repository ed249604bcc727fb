use fibre_di::{define_token, resolve, IocError};
use std::panic;

struct UnregisteredService;

fn main() {
  let token = define_token::<UnregisteredService>("examples.unregistered");

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a token that was never registered...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(&token);
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible `resolve()` function ---
  println!("\nNow, attempting to resolve using the fallible `resolve()` function...");

  match resolve(&token) {
    Ok(_) => panic!("Should not have found the service!"),
    Err(IocError::UnregisteredToken { token }) => {
      println!("Correctly received an error for the missing token '{}'.", token)
    }
    Err(other) => panic!("Unexpected error: {}", other),
  }
}
