// src/fetch/carto.rs

use reqwest::{Client, RequestBuilder};

use crate::config::Config;

/// SQL literal quoting for the Carto `q` parameter.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Current-period 311 tickets owned by the configured agency.
pub fn service_requests_query(cfg: &Config) -> String {
    format!(
        "SELECT * FROM public_cases_fc \
         WHERE requested_datetime >= {} AND requested_datetime < {} \
         AND agency_responsible = {}",
        quote(&cfg.period_start),
        quote(&cfg.period_end),
        quote(&cfg.agency),
    )
}

/// Violations recorded on or after the start of the period.
pub fn violations_query(cfg: &Config) -> String {
    format!(
        "SELECT {} FROM violations WHERE violationdate >= {}",
        cfg.violation_columns.join(", "),
        quote(&cfg.period_start),
    )
}

/// GET `<endpoint>?format=csv[&skipfields=..]&q=<sql>`.
pub fn csv_request(
    client: &Client,
    cfg: &Config,
    query: &str,
    skip_fields: Option<&str>,
) -> RequestBuilder {
    let mut params = vec![("format", "csv")];
    if let Some(skip) = skip_fields {
        params.push(("skipfields", skip));
    }
    params.push(("q", query));
    client.get(&cfg.carto_endpoint).query(&params)
}
