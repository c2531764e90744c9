//! Summaries fetcher for the WakaTime-compatible API
//!
//! Retrieves per-day total and per-language seconds, either for one date
//! or for an inclusive range of dates in a single request.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{CodetallyError, FetchedDay, LanguageSeconds, Result};

/// Default API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://wakatime.com/api/v1";

/// HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source of per-day summaries
#[cfg_attr(test, mockall::automock)]
pub trait SummarySource {
    /// Fetch exactly one date. The returned date is the one the remote
    /// echoes back, falling back to `date`.
    fn fetch_single_day(&self, date: NaiveDate) -> Result<FetchedDay>;

    /// Fetch an inclusive date range, keyed by each record's own date.
    fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, FetchedDay>>;
}

/// `/users/current/summaries` response (minimal fields)
#[derive(Debug, Default, Deserialize)]
struct SummariesResponse {
    #[serde(default)]
    data: Option<Vec<DayPayload>>,
}

#[derive(Debug, Default, Deserialize)]
struct DayPayload {
    #[serde(default)]
    grand_total: Option<GrandTotal>,
    /// Some proxies flatten the day total onto the record itself
    #[serde(default)]
    total_seconds: Option<f64>,
    #[serde(default)]
    languages: Option<Vec<LanguagePayload>>,
    #[serde(default)]
    range: Option<RangePayload>,
}

#[derive(Debug, Default, Deserialize)]
struct GrandTotal {
    #[serde(default)]
    total_seconds: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LanguagePayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    total_seconds: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RangePayload {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    start: Option<String>,
}

impl DayPayload {
    /// Date reported by the record's range metadata
    fn resolved_date(&self) -> Option<NaiveDate> {
        let range = self.range.as_ref()?;
        range
            .date
            .as_deref()
            .and_then(parse_date_prefix)
            .or_else(|| range.start.as_deref().and_then(parse_date_prefix))
    }

    fn into_fetched(self, date: NaiveDate) -> FetchedDay {
        let total = self
            .grand_total
            .and_then(|g| g.total_seconds)
            .or(self.total_seconds)
            .unwrap_or(0.0)
            .max(0.0);

        let languages = self
            .languages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|lang| {
                let name = lang.name.filter(|n| !n.is_empty())?;
                Some(LanguageSeconds::new(name, lang.total_seconds.unwrap_or(0.0)))
            })
            .collect();

        FetchedDay {
            date,
            total_seconds: total.round() as u64,
            languages,
        }
    }
}

/// Accepts `2024-01-10` as well as `2024-01-10T00:00:00Z`
fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

fn parse_summaries(body: &mut [u8]) -> Result<SummariesResponse> {
    simd_json::from_slice(body).map_err(|e| CodetallyError::Parse(e.to_string()))
}

/// Blocking HTTP client for the summaries endpoint
pub struct WakaTimeClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl WakaTimeClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("codetally/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CodetallyError::Transport(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Request URL without the credential
    pub fn summaries_url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/users/current/summaries?start={}&end={}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )
    }

    fn get_summaries(&self, start: NaiveDate, end: NaiveDate) -> Result<SummariesResponse> {
        let url = self.summaries_url(start, end);
        debug!(%url, "requesting summaries");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .map_err(|e| CodetallyError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CodetallyError::from_status(status.as_u16(), &body));
        }

        let mut body = response
            .bytes()
            .map_err(|e| CodetallyError::Transport(e.without_url().to_string()))?
            .to_vec();
        parse_summaries(&mut body)
    }
}

impl SummarySource for WakaTimeClient {
    fn fetch_single_day(&self, date: NaiveDate) -> Result<FetchedDay> {
        let response = self.get_summaries(date, date)?;
        single_day_from_response(response, date)
    }

    fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, FetchedDay>> {
        let response = self.get_summaries(start, end)?;
        Ok(range_from_response(response))
    }
}

fn single_day_from_response(response: SummariesResponse, requested: NaiveDate) -> Result<FetchedDay> {
    let payload = response
        .data
        .and_then(|data| data.into_iter().next())
        .ok_or(CodetallyError::NoData(requested))?;

    let date = payload.resolved_date().unwrap_or(requested);
    if date != requested {
        debug!(%requested, resolved = %date, "remote resolved a different date");
    }
    Ok(payload.into_fetched(date))
}

fn range_from_response(response: SummariesResponse) -> BTreeMap<NaiveDate, FetchedDay> {
    let mut days = BTreeMap::new();
    for payload in response.data.unwrap_or_default() {
        match payload.resolved_date() {
            Some(date) => {
                days.insert(date, payload.into_fetched(date));
            }
            None => warn!("skipping summary record without a resolvable date"),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(json: &str) -> SummariesResponse {
        let mut bytes = json.as_bytes().to_vec();
        parse_summaries(&mut bytes).unwrap()
    }

    const SINGLE_DAY: &str = r#"{
        "data": [{
            "grand_total": {"total_seconds": 5400.4, "text": "1 hr 30 mins"},
            "languages": [
                {"name": "Rust", "total_seconds": 3600.0, "percent": 66.67, "text": "1 hr"},
                {"name": "Go", "total_seconds": 1800.4, "percent": 33.33, "text": "30 mins"}
            ],
            "range": {"date": "2024-01-10", "start": "2024-01-10T00:00:00Z", "end": "2024-01-10T23:59:59Z"}
        }],
        "start": "2024-01-10T00:00:00Z",
        "end": "2024-01-10T23:59:59Z"
    }"#;

    #[test]
    fn test_single_day_parses_totals_and_languages() {
        let day = single_day_from_response(parse(SINGLE_DAY), date(2024, 1, 10)).unwrap();

        assert_eq!(day.date, date(2024, 1, 10));
        assert_eq!(day.total_seconds, 5400);
        assert_eq!(day.languages.len(), 2);
        assert_eq!(day.languages[0], LanguageSeconds::new("Rust", 3600.0));
        assert_eq!(day.languages[1].name, "Go");
    }

    #[test]
    fn test_single_day_prefers_echoed_date() {
        // Requested the 11th, server resolved its own timezone to the 10th
        let day = single_day_from_response(parse(SINGLE_DAY), date(2024, 1, 11)).unwrap();
        assert_eq!(day.date, date(2024, 1, 10));
    }

    #[test]
    fn test_single_day_falls_back_to_requested_date() {
        let json = r#"{"data": [{"grand_total": {"total_seconds": 60}, "languages": []}]}"#;
        let day = single_day_from_response(parse(json), date(2024, 1, 11)).unwrap();
        assert_eq!(day.date, date(2024, 1, 11));
        assert_eq!(day.total_seconds, 60);
    }

    #[test]
    fn test_single_day_without_data_is_fatal() {
        for json in [r#"{"data": []}"#, r#"{"data": null}"#, r#"{}"#] {
            let err = single_day_from_response(parse(json), date(2024, 1, 11)).unwrap_err();
            assert!(matches!(err, CodetallyError::NoData(_)), "json: {}", json);
        }
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let json = r#"{"data": [{"range": {"date": "2024-01-10"}, "languages": null}]}"#;
        let day = single_day_from_response(parse(json), date(2024, 1, 10)).unwrap();
        assert_eq!(day.total_seconds, 0);
        assert!(day.languages.is_empty());
    }

    #[test]
    fn test_flat_total_seconds_is_accepted() {
        let json = r#"{"data": [{"total_seconds": 120, "range": {"date": "2024-01-10"}}]}"#;
        let day = single_day_from_response(parse(json), date(2024, 1, 10)).unwrap();
        assert_eq!(day.total_seconds, 120);
    }

    #[test]
    fn test_nameless_languages_are_dropped() {
        let json = r#"{"data": [{"languages": [{"total_seconds": 10}, {"name": "", "total_seconds": 5}, {"name": "Go"}]}]}"#;
        let day = single_day_from_response(parse(json), date(2024, 1, 10)).unwrap();
        assert_eq!(day.languages, vec![LanguageSeconds::new("Go", 0.0)]);
    }

    #[test]
    fn test_range_keys_by_record_date_and_skips_unresolvable() {
        let json = r#"{"data": [
            {"grand_total": {"total_seconds": 100}, "range": {"date": "2024-01-08"}},
            {"grand_total": {"total_seconds": 200}, "range": {"start": "2024-01-09T00:00:00-05:00"}},
            {"grand_total": {"total_seconds": 300}, "range": {"text": "Yesterday"}},
            {"grand_total": {"total_seconds": 400}}
        ]}"#;

        let days = range_from_response(parse(json));

        assert_eq!(days.len(), 2);
        assert_eq!(days[&date(2024, 1, 8)].total_seconds, 100);
        assert_eq!(days[&date(2024, 1, 9)].total_seconds, 200);
    }

    #[test]
    fn test_range_with_no_data_is_empty() {
        assert!(range_from_response(parse(r#"{"data": []}"#)).is_empty());
    }

    #[test]
    fn test_invalid_body_is_parse_error() {
        let mut bytes = b"<html>oops</html>".to_vec();
        assert!(matches!(
            parse_summaries(&mut bytes),
            Err(CodetallyError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_date_prefix() {
        assert_eq!(parse_date_prefix("2024-01-10"), Some(date(2024, 1, 10)));
        assert_eq!(
            parse_date_prefix("2024-01-10T05:00:00Z"),
            Some(date(2024, 1, 10))
        );
        assert_eq!(parse_date_prefix("Today"), None);
        assert_eq!(parse_date_prefix(""), None);
    }

    #[test]
    fn test_summaries_url_excludes_credential() {
        let client = WakaTimeClient::new(
            "https://example.test/api/v1/",
            "secret-key",
            Duration::from_secs(1),
        )
        .unwrap();

        let url = client.summaries_url(date(2024, 1, 4), date(2024, 1, 10));

        assert_eq!(
            url,
            "https://example.test/api/v1/users/current/summaries?start=2024-01-04&end=2024-01-10"
        );
        assert!(!url.contains("secret-key"));
    }

    #[test]
    #[ignore] // Network required
    fn test_bad_credential_is_auth_error() {
        let client = WakaTimeClient::new(
            DEFAULT_API_BASE_URL,
            "waka_00000000-0000-0000-0000-000000000000",
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .unwrap();
        let err = client.fetch_single_day(date(2024, 1, 10)).unwrap_err();
        assert!(matches!(err, CodetallyError::Auth(_)));
    }
}
