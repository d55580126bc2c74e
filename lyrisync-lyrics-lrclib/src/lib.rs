use async_trait::async_trait;
use lyrisync_core::{CoreError, FetchedLyrics, LyricsProvider, LyricsQuery, LyricsResult};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use std::fmt::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "lyrisync::lyrics::lrclib";

const LRCLIB_API_URL: &str = "https://lrclib.net/api";

/// Default timeout for HTTP requests (10 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default number of retry attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

/// LRCLIB.net lyrics provider
pub struct LrclibProvider {
    client: ClientWithMiddleware,
    base_url: String,
}

impl LrclibProvider {
    /// Create a new LRCLIB provider with default 10-second timeout and 3 retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, CoreError> {
        Self::with_base_url(LRCLIB_API_URL)
    }

    /// Create a provider talking to an LRCLIB-compatible API at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, CoreError> {
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("lyrisync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Wrap with retry middleware (exponential backoff)
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(DEFAULT_MAX_RETRIES);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL of the exact-match lookup for a query
    fn get_url(&self, query: &LyricsQuery) -> String {
        let mut url = format!(
            "{}/get?artist_name={}&track_name={}",
            self.base_url,
            urlencoding::encode(&query.artist_name),
            urlencoding::encode(&query.track_name)
        );

        if let Some(duration) = query.duration_secs {
            let _ = write!(url, "&duration={duration}");
        }

        url
    }

    fn parse_response(result: LrclibResponse) -> FetchedLyrics {
        let provider_id = result.id.to_string();

        if result.instrumental {
            debug!(target: LOG_TARGET, "Track is instrumental (lrclib id: {})", result.id);
            return FetchedLyrics {
                result: LyricsResult::Instrumental,
                provider_id,
            };
        }

        // Prefer synced lyrics
        if let Some(synced) = result.synced_lyrics.filter(|s| !s.trim().is_empty()) {
            debug!(target: LOG_TARGET, "Got synced lyrics (lrclib id: {})", result.id);
            return FetchedLyrics {
                result: LyricsResult::Synced(synced),
                provider_id,
            };
        }

        if let Some(plain) = result.plain_lyrics.filter(|s| !s.trim().is_empty()) {
            debug!(target: LOG_TARGET, "Got plain lyrics only (lrclib id: {})", result.id);
            return FetchedLyrics {
                result: LyricsResult::Unsynced(plain),
                provider_id,
            };
        }

        FetchedLyrics {
            result: LyricsResult::NotFound,
            provider_id,
        }
    }
}

/// Response from LRCLIB API
/// Note: API returns additional fields (trackName, albumName, duration) that we
/// don't use; serde ignores unknown fields by default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LrclibResponse {
    id: i64,
    #[serde(default)]
    instrumental: bool,
    plain_lyrics: Option<String>,
    synced_lyrics: Option<String>,
}

#[async_trait]
impl LyricsProvider for LrclibProvider {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    async fn fetch(&self, query: &LyricsQuery) -> Result<FetchedLyrics, CoreError> {
        let url = self.get_url(query);
        info!(target: LOG_TARGET, "LRCLIB GET (exact match): {}", url);

        let response = self.client.get(&url).send().await?;
        debug!(target: LOG_TARGET, "LRCLIB response status: {}", response.status());

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            info!(
                target: LOG_TARGET,
                "LRCLIB has no lyrics for {} - {}", query.artist_name, query.track_name
            );
            return Ok(FetchedLyrics::not_found());
        }

        if !response.status().is_success() {
            warn!(target: LOG_TARGET, "LRCLIB returned status: {}", response.status());
            return Err(CoreError::LyricsProviderFailed {
                provider: self.name().to_string(),
                reason: format!("LRCLIB returned status: {}", response.status()),
            });
        }

        let result: LrclibResponse = response.json().await?;
        info!(target: LOG_TARGET, "LRCLIB found match with id: {}", result.id);
        Ok(Self::parse_response(result))
    }
}
