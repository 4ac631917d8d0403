//! Diagnostic output
//!
//! The library only emits `tracing` events. Hosts that want them on stderr
//! call [`init`]; the level comes from `ANSIBLE_LOADER_LOG` (an `EnvFilter`
//! directive, default `warn`).

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "ANSIBLE_LOADER_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

static INSTALLED: OnceCell<bool> = OnceCell::new();

fn filter_from(directive: Option<&str>) -> EnvFilter {
    directive
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install a stderr subscriber once per process.
///
/// Returns `false` when another global subscriber was already set by the
/// host; the loader's events then go to that one.
pub fn init() -> bool {
    *INSTALLED.get_or_init(|| {
        let directive = std::env::var(ENV_LOG).ok();
        tracing_subscriber::fmt()
            .with_env_filter(filter_from(directive.as_deref()))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_from(None).to_string(), "warn");
        assert_eq!(filter_from(Some("  ")).to_string(), "warn");
        assert_eq!(filter_from(Some("debug")).to_string(), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init();
        assert_eq!(init(), first);
    }
}
