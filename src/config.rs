/// Application-level constants
pub const APP_NAME: &str = "Cylscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dev builds log the pipeline stages; release builds log runs only.
pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}

/// `EnvFilter` directive used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if is_dev() {
        "cylscan=debug,cylscan_lib=debug"
    } else {
        "cylscan=info,cylscan_lib=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_cylscan() {
        assert_eq!(APP_NAME, "Cylscan");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().contains("cylscan_lib="));
    }
}
