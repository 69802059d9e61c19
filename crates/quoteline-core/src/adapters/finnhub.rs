use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::data_source::{QuoteSource, SearchRequest, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::throttling::RateBudget;
use crate::{CompanyProfile, QuoteSnapshot, Symbol, SymbolMatch};

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
const TOKEN_HEADER: &str = "X-Finnhub-Token";
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Finnhub REST adapter for company profiles, quotes and symbol lookup.
///
/// Calls are paced by a client-side [`RateBudget`]: when the budget is spent
/// the next call waits for a free slot instead of failing.
#[derive(Clone)]
pub struct FinnhubAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    rate_budget: RateBudget,
    timeout: Duration,
}

impl FinnhubAdapter {
    /// Adapter using the reqwest transport and the given API token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), api_key)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_BASE_URL),
            rate_budget: RateBudget::per_minute(DEFAULT_REQUESTS_PER_MINUTE),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_rate_budget(mut self, rate_budget: RateBudget) -> Self {
        self.rate_budget = rate_budget;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn pace(&self) {
        if let Err(wait) = self.rate_budget.try_acquire() {
            tracing::debug!(
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "finnhub request budget spent; waiting for a slot"
            );
            self.rate_budget.acquire().await;
        }
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
    {
        self.pace().await;

        let request = query
            .iter()
            .fold(
                HttpRequest::get(format!("{}{path}", self.base_url)),
                |request, (name, value)| request.query(name, value),
            )
            .header(TOKEN_HEADER, &self.api_key)
            .timeout(self.timeout);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SourceError::unavailable(format!("finnhub {path}: {error}")))?;

        match response.status {
            429 => Err(SourceError::rate_limited(format!(
                "finnhub {path} answered 429"
            ))),
            _ if !response.is_success() => Err(SourceError::unavailable(format!(
                "finnhub {path} answered {}",
                response.status
            ))),
            _ => serde_json::from_str(&response.body).map_err(|error| {
                SourceError::internal(format!("finnhub {path} sent an unreadable body: {error}"))
            }),
        }
    }
}

impl std::fmt::Debug for FinnhubAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinnhubAdapter")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl QuoteSource for FinnhubAdapter {
    fn name(&self) -> &'static str {
        "finnhub"
    }

    fn fetch_profile<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, CompanyProfile> {
        Box::pin(async move {
            let payload: Option<FinnhubProfile> = self
                .get_json("/stock/profile2", &[("symbol", symbol.as_str())])
                .await?;
            Ok(payload.unwrap_or_default().into())
        })
    }

    fn fetch_quote<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, QuoteSnapshot> {
        Box::pin(async move {
            let payload: Option<FinnhubQuote> = self
                .get_json("/quote", &[("symbol", symbol.as_str())])
                .await?;
            Ok(payload.unwrap_or_default().into())
        })
    }

    fn search<'a>(&'a self, request: &'a SearchRequest) -> SourceFuture<'a, Vec<SymbolMatch>> {
        Box::pin(async move {
            let payload: Option<FinnhubSearch> = self
                .get_json("/search", &[("q", request.query.as_str())])
                .await?;
            Ok(payload
                .unwrap_or_default()
                .result
                .into_iter()
                .take(request.limit)
                .map(SymbolMatch::from)
                .collect())
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct FinnhubProfile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(rename = "finnhubIndustry", default)]
    industry: Option<String>,
}

impl From<FinnhubProfile> for CompanyProfile {
    fn from(payload: FinnhubProfile) -> Self {
        Self {
            name: payload.name,
            currency: payload.currency,
            exchange: payload.exchange,
            industry: payload.industry,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FinnhubQuote {
    #[serde(rename = "c", default)]
    current: Option<f64>,
    #[serde(rename = "h", default)]
    high: Option<f64>,
    #[serde(rename = "l", default)]
    low: Option<f64>,
    #[serde(rename = "o", default)]
    open: Option<f64>,
    #[serde(rename = "pc", default)]
    previous_close: Option<f64>,
    #[serde(rename = "t", default)]
    timestamp: Option<i64>,
}

impl From<FinnhubQuote> for QuoteSnapshot {
    fn from(payload: FinnhubQuote) -> Self {
        Self {
            current: payload.current,
            high: payload.high,
            low: payload.low,
            open: payload.open,
            previous_close: payload.previous_close,
            timestamp: payload.timestamp,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FinnhubSearch {
    #[serde(default)]
    result: Vec<FinnhubSearchHit>,
}

#[derive(Debug, Deserialize)]
struct FinnhubSearchHit {
    symbol: String,
    #[serde(rename = "displaySymbol", default)]
    display_symbol: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    kind: String,
}

impl From<FinnhubSearchHit> for SymbolMatch {
    fn from(hit: FinnhubSearchHit) -> Self {
        Self {
            symbol: hit.symbol,
            display_symbol: hit.display_symbol,
            description: hit.description,
            kind: hit.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Instant;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};

    #[derive(Debug)]
    struct ScriptedHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(HttpResponse {
                    status,
                    body: body.to_owned(),
                }),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: HttpError) -> Arc<Self> {
            Arc::new(Self {
                response: Err(error),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[tokio::test]
    async fn quote_request_targets_quote_endpoint_with_token_header() {
        let client = ScriptedHttpClient::replying(
            200,
            r#"{"c":189.5,"d":1.2,"dp":0.6,"h":190.1,"l":187.0,"o":188.0,"pc":188.3,"t":1700000000}"#,
        );
        let adapter = FinnhubAdapter::with_http_client(client.clone(), "secret")
            .with_base_url("https://finnhub.test/api/v1/");

        let quote = adapter.fetch_quote(&symbol("aapl")).await.expect("quote");
        assert_eq!(quote.current, Some(189.5));
        assert_eq!(quote.previous_close, Some(188.3));
        assert_eq!(quote.timestamp, Some(1_700_000_000));

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].full_url(),
            "https://finnhub.test/api/v1/quote?symbol=AAPL"
        );
        assert_eq!(
            requests[0].headers.get("x-finnhub-token").map(String::as_str),
            Some("secret")
        );
    }

    #[tokio::test]
    async fn profile_maps_industry_and_encodes_symbol() {
        let client = ScriptedHttpClient::replying(
            200,
            r#"{"name":"Berkshire Hathaway","currency":"USD","exchange":"NYSE","finnhubIndustry":"Financial Services","ipo":"1980-03-17"}"#,
        );
        let adapter = FinnhubAdapter::with_http_client(client.clone(), "secret");

        let profile = adapter.fetch_profile(&symbol("brk.b")).await.expect("profile");
        assert_eq!(profile.name.as_deref(), Some("Berkshire Hathaway"));
        assert_eq!(profile.industry.as_deref(), Some("Financial Services"));
        assert_eq!(
            client.recorded_requests()[0].full_url(),
            "https://finnhub.io/api/v1/stock/profile2?symbol=BRK.B"
        );
    }

    #[tokio::test]
    async fn empty_or_null_profile_is_all_nulls() {
        for body in ["{}", "null"] {
            let adapter =
                FinnhubAdapter::with_http_client(ScriptedHttpClient::replying(200, body), "k");
            let profile = adapter.fetch_profile(&symbol("ZZZZ")).await.expect("profile");
            assert_eq!(profile, CompanyProfile::default());
        }
    }

    #[tokio::test]
    async fn quote_without_timestamp_decodes_to_none() {
        let adapter =
            FinnhubAdapter::with_http_client(ScriptedHttpClient::replying(200, r#"{"c":1.0}"#), "k");
        let quote = adapter.fetch_quote(&symbol("AAPL")).await.expect("quote");
        assert_eq!(quote.current, Some(1.0));
        assert_eq!(quote.timestamp, None);
    }

    #[tokio::test]
    async fn search_maps_hits_and_honours_the_limit() {
        let client = ScriptedHttpClient::replying(
            200,
            r#"{"count":3,"result":[
                {"description":"APPLE INC","displaySymbol":"AAPL","symbol":"AAPL","type":"Common Stock"},
                {"description":"APPLE INC","displaySymbol":"AAPL.SW","symbol":"AAPL.SW","type":"Common Stock"},
                {"description":"APPLE INC","displaySymbol":"APC.DE","symbol":"APC.DE","type":"Common Stock"}
            ]}"#,
        );
        let adapter = FinnhubAdapter::with_http_client(client.clone(), "k");
        let request = SearchRequest::new("apple inc", 2).expect("request");

        let hits = adapter.search(&request).await.expect("search");

        assert_eq!(
            hits,
            vec![
                SymbolMatch {
                    symbol: String::from("AAPL"),
                    display_symbol: String::from("AAPL"),
                    description: String::from("APPLE INC"),
                    kind: String::from("Common Stock"),
                },
                SymbolMatch {
                    symbol: String::from("AAPL.SW"),
                    display_symbol: String::from("AAPL.SW"),
                    description: String::from("APPLE INC"),
                    kind: String::from("Common Stock"),
                },
            ]
        );
        assert_eq!(
            client.recorded_requests()[0].full_url(),
            "https://finnhub.io/api/v1/search?q=apple%20inc"
        );
    }

    #[tokio::test]
    async fn search_without_hits_is_empty() {
        let adapter = FinnhubAdapter::with_http_client(
            ScriptedHttpClient::replying(200, r#"{"count":0,"result":[]}"#),
            "k",
        );
        let request = SearchRequest::new("zzzz", 10).expect("request");
        assert!(adapter.search(&request).await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn upstream_errors_are_classified() {
        let cases = [
            (ScriptedHttpClient::replying(429, "{}"), SourceErrorKind::RateLimited),
            (ScriptedHttpClient::replying(503, ""), SourceErrorKind::Unavailable),
            (ScriptedHttpClient::replying(200, "<html>"), SourceErrorKind::Internal),
            (
                ScriptedHttpClient::failing(HttpError::Connect(String::from("connection reset"))),
                SourceErrorKind::Unavailable,
            ),
        ];

        for (client, expected) in cases {
            let adapter = FinnhubAdapter::with_http_client(client, "k");
            let error = adapter
                .fetch_quote(&symbol("AAPL"))
                .await
                .expect_err("request should fail");
            assert_eq!(error.kind(), expected, "{error}");
        }
    }

    #[tokio::test]
    async fn spent_budget_delays_the_next_call_instead_of_failing_it() {
        let client = ScriptedHttpClient::replying(200, "{}");
        let adapter = FinnhubAdapter::with_http_client(client.clone(), "k")
            .with_rate_budget(RateBudget::new(Duration::from_millis(200), 1));

        let started = Instant::now();
        adapter.fetch_profile(&symbol("AAPL")).await.expect("first call fits");
        adapter
            .fetch_profile(&symbol("AAPL"))
            .await
            .expect("second call waits for a slot");

        assert_eq!(client.recorded_requests().len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
