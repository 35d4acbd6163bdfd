//! Tracing subscriber setup.
//!
//! Filtering follows `RUST_LOG` when it is set. Otherwise only warnings are
//! shown, unless `DEBUG` mentions `httpbackoff`, which turns on debug output
//! for this crate (retry notices included).

use tracing_subscriber::EnvFilter;

/// Directive used when neither variable asks for anything.
const DEFAULT_DIRECTIVES: &str = "warn";

/// Install a global `fmt` subscriber. Does nothing if one is already set.
pub fn init_tracing() {
    let directives = filter_directives(
        std::env::var("RUST_LOG").ok().as_deref(),
        std::env::var("DEBUG").ok().as_deref(),
    );

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_target(true)
        .try_init();
}

/// Filter directives for the given `RUST_LOG` and `DEBUG` values.
pub fn filter_directives(rust_log: Option<&str>, debug: Option<&str>) -> String {
    let mut directives = match rust_log.map(str::trim) {
        Some(filter) if !filter.is_empty() => filter.to_string(),
        _ => DEFAULT_DIRECTIVES.to_string(),
    };

    if debug.is_some_and(|value| value.contains("httpbackoff")) {
        directives.push_str(",httpbackoff=debug");
    }

    directives
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, "warn")]
    #[case(Some("info"), None, "info")]
    #[case(Some("  "), None, "warn")]
    #[case(None, Some("httpbackoff"), "warn,httpbackoff=debug")]
    #[case(None, Some("hyper,httpbackoff"), "warn,httpbackoff=debug")]
    #[case(Some("reqwest=trace"), Some("httpbackoff"), "reqwest=trace,httpbackoff=debug")]
    #[case(None, Some("hyper"), "warn")]
    fn test_filter_directives(
        #[case] rust_log: Option<&str>,
        #[case] debug: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(filter_directives(rust_log, debug), expected);
    }

    #[test]
    fn test_directives_parse() {
        let directives = filter_directives(Some("info"), Some("httpbackoff"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }
}
