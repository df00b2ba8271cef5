// tests/logging_filter.rs

use runhub::cli::LogLevel;
use runhub::logging::resolve_filter;

#[test]
fn cli_flag_wins_over_environment() {
    let filter = resolve_filter(Some(LogLevel::Warn), Some("debug"), Some("trace"));
    assert_eq!(filter.to_string(), "warn");
}

#[test]
fn runhub_log_takes_full_directives() {
    let filter = resolve_filter(None, Some("runhub=debug,warn"), Some("trace"));
    let rendered = filter.to_string();

    assert!(rendered.contains("runhub=debug"), "{rendered}");
    assert!(rendered.contains("warn"), "{rendered}");
    assert!(!rendered.contains("trace"), "{rendered}");
}

#[test]
fn rust_log_is_used_when_runhub_log_is_unset_or_blank() {
    assert_eq!(resolve_filter(None, None, Some("debug")).to_string(), "debug");
    assert_eq!(resolve_filter(None, Some("  "), Some("debug")).to_string(), "debug");
}

#[test]
fn defaults_to_info() {
    assert_eq!(resolve_filter(None, None, None).to_string(), "info");
}
