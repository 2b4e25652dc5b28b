use super::*;

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_kala_env() {
    unsafe {
        std::env::remove_var("KALA_API_BASE_URL");
        std::env::remove_var("KALA_TRANSLATE_BASE_URL");
        std::env::remove_var("KALA_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("KALA_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("KALA_CALL_DEADLINE_SECS");
        std::env::remove_var("KALA_STATUS_TTL_SECS");
        std::env::remove_var("KALA_PREFS_PATH");
        std::env::remove_var("KALA_HISTORY_LIMIT");
    }
}

#[test]
fn from_env_uses_defaults() {
    unsafe { clear_kala_env() };

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.translate_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.timeouts, Timeouts::default());
    assert_eq!(cfg.status_ttl, Duration::from_secs(DEFAULT_STATUS_TTL_SECS));
    assert_eq!(cfg.prefs_path, PathBuf::from(DEFAULT_PREFS_PATH));
    assert_eq!(cfg.history_limit, DEFAULT_HISTORY_LIMIT);
}

#[test]
fn from_env_parses_overrides() {
    unsafe {
        clear_kala_env();
        std::env::set_var("KALA_API_BASE_URL", "http://localhost:8080/");
        std::env::set_var("KALA_REQUEST_TIMEOUT_SECS", "12");
        std::env::set_var("KALA_CONNECT_TIMEOUT_SECS", "3");
        std::env::set_var("KALA_CALL_DEADLINE_SECS", "20");
        std::env::set_var("KALA_HISTORY_LIMIT", "5");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.api_base_url, "http://localhost:8080");
    // Translate endpoint follows the API base unless overridden.
    assert_eq!(cfg.translate_base_url, "http://localhost:8080");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 12, connect_secs: 3, deadline_secs: 20 });
    assert_eq!(cfg.history_limit, 5);

    unsafe { clear_kala_env() };
}

#[test]
fn from_env_bad_number_falls_back() {
    unsafe {
        clear_kala_env();
        std::env::set_var("KALA_STATUS_TTL_SECS", "soon");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.status_ttl, Duration::from_secs(DEFAULT_STATUS_TTL_SECS));

    unsafe { clear_kala_env() };
}

#[test]
fn from_env_rejects_non_http_url() {
    unsafe {
        clear_kala_env();
        std::env::set_var("KALA_TRANSLATE_BASE_URL", "ftp://example.test");
    }

    let err = AppConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("KALA_TRANSLATE_BASE_URL"));

    unsafe { clear_kala_env() };
}

#[test]
fn with_base_url_trims_trailing_slash() {
    let cfg = AppConfig::with_base_url("http://127.0.0.1:9000/");
    assert_eq!(cfg.api_base_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.translate_base_url, "http://127.0.0.1:9000");
}
