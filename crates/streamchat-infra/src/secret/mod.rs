//! Credential resolution.
//!
//! - `env`: Environment variable provider for the Gemini API key

pub mod env;

pub use env::EnvCredentialProvider;
