use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};

/// Status and raw body of one address search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub status: u16,
    pub body: String,
}

/// Source of address-search responses.
///
/// An `Err` means the request never produced a response (DNS, connect,
/// body read); any HTTP status is returned as `Ok`.
#[allow(async_fn_in_trait)]
pub trait AddressLookup {
    async fn lookup(&self, address: &str) -> Result<LookupResponse>;
}

/// HTTP client for the city's AIS search endpoint.
#[derive(Debug, Clone)]
pub struct AisClient {
    client: Client,
    base: String,
}

impl AisClient {
    pub fn new(client: Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
        }
    }

    /// The address is appended as-is; URL parsing does whatever escaping it does.
    pub fn search_url(&self, address: &str) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), address)
    }
}

impl AddressLookup for AisClient {
    async fn lookup(&self, address: &str) -> Result<LookupResponse> {
        let url = self.search_url(address);
        trace!(%url, "AIS search");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        Ok(LookupResponse { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct AisSearch {
    #[serde(default)]
    search_type: Option<String>,
    /// Kept loose so a malformed later feature cannot spoil the first one.
    #[serde(default)]
    features: Vec<serde_json::Value>,
}

/// Pull the OPA account number out of a search response, or `""` when
/// the response does not lead with an addressed parcel.
pub fn opa_account_from_response(resp: &LookupResponse) -> String {
    if resp.status != 200 {
        debug!(status = resp.status, "AIS non-200");
        return String::new();
    }
    let search: AisSearch = match serde_json::from_str(&resp.body) {
        Ok(s) => s,
        Err(e) => {
            debug!(error = %e, "AIS body is not a search result");
            return String::new();
        }
    };
    if search.search_type.as_deref() != Some("address") {
        return String::new();
    }
    search
        .features
        .first()
        .and_then(|f| f.pointer("/properties/opa_account_num"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(body: &str) -> LookupResponse {
        LookupResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_first_feature_wins() {
        let resp = ok(r#"{"search_type":"address","features":[
            {"properties":{"opa_account_num":"883309050","street_address":"1234 MARKET ST"}},
            {"properties":{"opa_account_num":"000000001"}}]}"#);
        assert_eq!(opa_account_from_response(&resp), "883309050");
    }

    #[test]
    fn test_malformed_later_feature_is_ignored() {
        let resp = ok(r#"{"search_type":"address","features":[
            {"properties":{"opa_account_num":"883309050"}},
            {"properties":{"opa_account_num":12345}},
            "not even an object"]}"#);
        assert_eq!(opa_account_from_response(&resp), "883309050");
    }

    #[test]
    fn test_non_string_first_account_is_empty() {
        let resp = ok(r#"{"search_type":"address","features":[{"properties":{"opa_account_num":42}}]}"#);
        assert_eq!(opa_account_from_response(&resp), "");
        let resp = ok(r#"{"search_type":"address","features":[{"geometry":{}}]}"#);
        assert_eq!(opa_account_from_response(&resp), "");
    }

    #[test]
    fn test_non_200_ignores_body() {
        let resp = LookupResponse {
            status: 404,
            body: r#"{"search_type":"address","features":[{"properties":{"opa_account_num":"1"}}]}"#
                .to_string(),
        };
        assert_eq!(opa_account_from_response(&resp), "");
    }

    #[test]
    fn test_other_search_type() {
        let resp = ok(
            r#"{"search_type":"intersection","features":[{"properties":{"opa_account_num":"1"}}]}"#,
        );
        assert_eq!(opa_account_from_response(&resp), "");
    }

    #[test]
    fn test_no_features_or_bad_shape() {
        assert_eq!(
            opa_account_from_response(&ok(r#"{"search_type":"address","features":[]}"#)),
            ""
        );
        assert_eq!(
            opa_account_from_response(&ok(
                r#"{"search_type":"address","features":[{"properties":{"opa_account_num":null}}]}"#
            )),
            ""
        );
        assert_eq!(opa_account_from_response(&ok("<html>502</html>")), "");
        assert_eq!(opa_account_from_response(&ok("")), "");
    }

    #[test]
    fn test_search_url_is_raw() {
        let ais = AisClient::new(Client::new(), "https://api.phila.gov/ais/v1/search/");
        assert_eq!(
            ais.search_url("1234 Market St"),
            "https://api.phila.gov/ais/v1/search/1234 Market St"
        );
    }
}
