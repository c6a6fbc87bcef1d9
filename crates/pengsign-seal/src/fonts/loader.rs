//! Remote font fetching with fallback chains
//!
//! Each font slot has an ordered list of source URLs tried in sequence; a
//! non-2xx response, transport error, or timeout moves on to the next
//! source, and an exhausted chain leaves the slot empty. The pipeline never
//! fails because of fonts — rendering degrades to the built-ins instead.

use std::time::Duration;

use tokio::sync::OnceCell;

use super::FontLibrary;

/// Source URLs and fetch bounds for the three remote font slots.
#[derive(Debug, Clone)]
pub struct FontConfig {
    /// Body sans for plain typed signatures.
    pub body_urls: Vec<String>,
    /// Semi-decorative cursive face.
    pub cursive_urls: Vec<String>,
    /// Fully decorative script face.
    pub script_urls: Vec<String>,
    /// Per-request timeout; a hung CDN must not block document delivery.
    pub timeout: Duration,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            body_urls: vec![
                "https://fonts.gstatic.com/s/roboto/v30/KFOmCnqEu92Fr1Mu4mxP.ttf".to_string(),
                "https://fonts.gstatic.com/s/roboto/v30/KFOmCnqEu92Fr1Mu4mxK.ttf".to_string(),
            ],
            cursive_urls: vec![
                "https://fonts.gstatic.com/s/satisfy/v17/rP2Hp2yn6lkG50LoOZSCHBeHFl0.ttf"
                    .to_string(),
                "https://fonts.gstatic.com/s/dancingscript/v25/If2cXTr6YS-zF4S-kcSWSVi_sxjsohD9F50Ruu7BMSo3Sup8.ttf"
                    .to_string(),
            ],
            script_urls: vec![
                "https://fonts.gstatic.com/s/greatvibes/v16/RWmMoKWR9v4ksMfaWd_JN-XCg6UKDXlq.ttf"
                    .to_string(),
                "https://fonts.gstatic.com/s/allura/v13/9jAnDAe7B1mYvnNRRgT4HQis.ttf".to_string(),
            ],
            timeout: Duration::from_secs(5),
        }
    }
}

static GLOBAL_FONTS: OnceCell<FontLibrary> = OnceCell::const_new();

impl FontLibrary {
    /// Fetch all configured font slots. Never fails; slots whose chains are
    /// exhausted stay empty.
    pub async fn fetch(config: &FontConfig) -> FontLibrary {
        let client = match reqwest::Client::builder().timeout(config.timeout).build() {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!("could not build font HTTP client: {}; using built-ins", err);
                return FontLibrary::builtin_only();
            }
        };

        let body = fetch_first(&client, "body", &config.body_urls).await;
        let cursive = fetch_first(&client, "cursive", &config.cursive_urls).await;
        let script = fetch_first(&client, "script", &config.script_urls).await;

        tracing::info!(
            "font fetch complete: body={}, cursive={}, script={}",
            body.is_some(),
            cursive.is_some(),
            script.is_some()
        );

        FontLibrary::from_bytes(body, cursive, script)
    }

    /// Process-wide font library, fetched once on first use with the default
    /// configuration and shared by reference afterwards.
    pub async fn global() -> &'static FontLibrary {
        GLOBAL_FONTS
            .get_or_init(|| async { FontLibrary::fetch(&FontConfig::default()).await })
            .await
    }
}

/// Try each URL in order, returning the first successful body.
async fn fetch_first(client: &reqwest::Client, label: &str, urls: &[String]) -> Option<Vec<u8>> {
    for url in urls {
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.bytes().await {
                Ok(bytes) => {
                    tracing::debug!("fetched {} font from {} ({} bytes)", label, url, bytes.len());
                    return Some(bytes.to_vec());
                }
                Err(err) => {
                    tracing::warn!("reading {} font body from {} failed: {}", label, url, err);
                }
            },
            Ok(response) => {
                tracing::warn!(
                    "{} font source {} returned status {}",
                    label,
                    url,
                    response.status()
                );
            }
            Err(err) => {
                tracing::warn!("fetching {} font from {} failed: {}", label, url, err);
            }
        }
    }
    tracing::warn!("all {} font sources failed; falling back to built-ins", label);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exhausted_chains_produce_builtin_only_library() {
        // Unroutable sources: the loader must degrade, not error.
        let config = FontConfig {
            body_urls: vec!["http://127.0.0.1:1/roboto.ttf".to_string()],
            cursive_urls: vec![],
            script_urls: vec!["http://127.0.0.1:1/vibes.ttf".to_string()],
            timeout: Duration::from_millis(200),
        };
        let library = FontLibrary::fetch(&config).await;
        assert!(library.body().is_none());
        assert!(library.cursive().is_none());
        assert!(library.script().is_none());
    }

    #[tokio::test]
    async fn empty_config_is_fine() {
        let config = FontConfig {
            body_urls: vec![],
            cursive_urls: vec![],
            script_urls: vec![],
            timeout: Duration::from_millis(200),
        };
        let library = FontLibrary::fetch(&config).await;
        assert!(library.body().is_none());
    }
}
