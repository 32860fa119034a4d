//! Provider selection from configuration.

use std::sync::Arc;
use std::time::Duration;

use codeloop_config::AppConfig;
use codeloop_core::error::ProviderError;
use codeloop_core::provider::Provider;
use tracing::debug;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the completion client described by `config`.
///
/// Local endpoints (localhost / 127.0.0.1) may run without an API key;
/// anything else requires one.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = match (&config.api_key, is_local(&config.base_url)) {
        (Some(key), _) => key.clone(),
        (None, true) => "local".to_string(),
        (None, false) => {
            return Err(ProviderError::NotConfigured(format!(
                "no API key configured for {}",
                config.base_url
            )));
        }
    };

    debug!(provider = %config.provider, base_url = %config.base_url, "Building provider");

    let provider = OpenAiCompatProvider::with_timeout(
        &config.provider,
        &config.base_url,
        api_key,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(Arc::new(provider))
}

fn is_local(base_url: &str) -> bool {
    base_url.contains("://localhost") || base_url.contains("://127.0.0.1")
}
