use fibre_di::{define_token, register_value, resolve, Container, Token};

// A function that runs against whichever container it is handed. In tests it
// gets a scope with overrides; in production the root container.
fn process_data(container: &Container, source: &Token<String>) -> String {
  let data = container.resolve(source).expect("Data not found in container");
  format!("Processed: {}", data.to_uppercase())
}

fn main() {
  let source = define_token::<String>("examples.data_source");
  register_value(&source, "production data".to_string());

  // --- Test Scenario with a Scope ---
  println!("--- Running with an overriding scope ---");
  let test_scope = fibre_di::create_scope();
  test_scope.override_value(&source, "test data".to_string());

  let result = process_data(&test_scope, &source);
  println!("Result: {}", result);
  assert_eq!(result, "Processed: TEST DATA");

  // --- Verify Isolation ---
  // The override lives in the scope only; the root still has its own value.
  assert_eq!(*resolve(&source).unwrap(), "production data");
  println!("\nVerified that the scope override did not leak into the root container.");

  // Removing the override makes the root's value visible again.
  test_scope.reset_tokens([source]);
  assert_eq!(process_data(&test_scope, &source), "Processed: PRODUCTION DATA");
  println!("After reset, the scope falls back to the root container.");
}
