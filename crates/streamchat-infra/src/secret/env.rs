//! Environment variable credential provider.
//!
//! Reads the API key from the configured variable (`API_KEY` by default),
//! falling back to `GEMINI_API_KEY`. Values are wrapped in
//! [`SecretString`] as soon as they are read.

use secrecy::SecretString;

/// Variable checked when the configured one is unset or empty.
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Read-only credential lookup over the process environment.
pub struct EnvCredentialProvider {
    primary: String,
}

impl EnvCredentialProvider {
    /// Look the key up under `primary`, then [`FALLBACK_API_KEY_ENV`].
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
        }
    }

    /// Names checked, in priority order.
    pub fn candidates(&self) -> Vec<&str> {
        if self.primary == FALLBACK_API_KEY_ENV {
            vec![FALLBACK_API_KEY_ENV]
        } else {
            vec![self.primary.as_str(), FALLBACK_API_KEY_ENV]
        }
    }

    /// Resolve the API key. Blank values count as unset.
    pub fn resolve(&self) -> Option<SecretString> {
        for name in self.candidates() {
            match std::env::var(name) {
                Ok(val) if !val.trim().is_empty() => {
                    tracing::debug!(source = name, "API key resolved from environment");
                    return Some(SecretString::from(val));
                }
                // Missing, blank, or not valid Unicode: try the next name.
                _ => continue,
            }
        }
        tracing::debug!(candidates = ?self.candidates(), "no API key in environment");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_resolve_primary() {
        // SAFETY: variable names are unique to this test.
        unsafe { std::env::set_var("STREAMCHAT_TEST_KEY_1", "key-123") };

        let provider = EnvCredentialProvider::new("STREAMCHAT_TEST_KEY_1");
        let key = provider.resolve().unwrap();
        assert_eq!(key.expose_secret(), "key-123");

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("STREAMCHAT_TEST_KEY_1") };
    }

    #[test]
    fn test_blank_primary_counts_as_unset() {
        // SAFETY: variable names are unique to this test.
        unsafe { std::env::set_var("STREAMCHAT_TEST_KEY_2", "   ") };

        let provider = EnvCredentialProvider::new("STREAMCHAT_TEST_KEY_2");
        // Result depends on GEMINI_API_KEY in the environment, never the blank value.
        if let Some(key) = provider.resolve() {
            assert_ne!(key.expose_secret().trim(), "");
        }

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("STREAMCHAT_TEST_KEY_2") };
    }

    #[test]
    fn test_candidates_order() {
        let provider = EnvCredentialProvider::new("API_KEY");
        assert_eq!(provider.candidates(), vec!["API_KEY", "GEMINI_API_KEY"]);

        let provider = EnvCredentialProvider::new(FALLBACK_API_KEY_ENV);
        assert_eq!(provider.candidates(), vec!["GEMINI_API_KEY"]);
    }
}
