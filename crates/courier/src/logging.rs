//! Tracing subscriber setup for the command-line host.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(verbose: bool) -> &'static str {
  if verbose {
    "courier=debug,warn"
  } else {
    "courier=warn"
  }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `verbose`.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_directives_follow_verbosity() {
    assert!(default_directives(true).contains("courier=debug"));
    assert_eq!(default_directives(false), "courier=warn");
  }

  #[test]
  fn test_init_twice_is_harmless() {
    init(false);
    init(true);
    tracing::warn!("logging still works after a second init");
  }
}
