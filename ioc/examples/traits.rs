use fibre_di::{bootstrap_ioc, define_token, register_ioc_plugin, resolve, Injectable};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    // ... logic to generate report ...
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  // --- Registration ---
  // Each module queues its own registrar; neither needs the other's code,
  // only the shared token description.
  register_ioc_plugin(|c| {
    c.register_singleton_trait(&c.define_token::<dyn Logger>("Logger"), || {
      Arc::new(ConsoleLogger)
    });
    Ok(())
  });

  register_ioc_plugin(|c| {
    // The constructor *receives* its logger. This is the "inversion of control".
    Injectable::<ReportService>::new()
      .container(c)
      .inject_named(0, "Logger")
      .register(|args| Ok(ReportService { logger: args.next_arg::<dyn Logger>()? }))?;
    Ok(())
  });

  bootstrap_ioc().expect("registrars failed");

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = resolve(&define_token::<ReportService>("ReportService")).unwrap();

  println!("Using the service...");
  report_service.generate_report();
}
