//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// When false every operator call takes the generic path.
    pub specializations_enabled: bool,

    /// Run the generic path next to every specialization hit and fail the
    /// call if the two results differ.
    pub verify_specializations: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            specializations_enabled: true,
            verify_specializations: false,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `QUERYKIT_SPECIALIZATIONS`: enable registered fast paths (`true`/`false`)
    /// - `QUERYKIT_VERIFY_SPECIALIZATIONS`: cross-check fast paths against the generic path
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("QUERYKIT_SPECIALIZATIONS") {
            if let Some(v) = parse_flag(&s) {
                cfg.specializations_enabled = v;
            }
        }

        if let Ok(s) = std::env::var("QUERYKIT_VERIFY_SPECIALIZATIONS") {
            if let Some(v) = parse_flag(&s) {
                cfg.verify_specializations = v;
            }
        }

        cfg
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn default_enables_fast_paths_without_verification() {
        let cfg = EngineConfig::default();
        assert!(cfg.specializations_enabled);
        assert!(!cfg.verify_specializations);
    }
}
