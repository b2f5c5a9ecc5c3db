//! Page-range detection from the document's detail page.
//!
//! Kramerius exposes the valid page range of a document only as two numeric
//! form fields embedded in the human-readable detail page. When the caller
//! does not supply both bounds explicitly, this stage fetches that page and
//! scrapes the `value` attributes tied to the two fixed field ids.
//!
//! The server's claimed values are trusted as given; no cross-check against
//! the actual document is performed. A missing field is fatal, since there
//! is no other source for the bound.

use crate::config::DocumentRef;
use crate::error::KrameriusError;
use crate::pipeline::plan::PageRange;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Form-field id carrying the first valid page number.
pub const START_FIELD: &str = "ext_ontheflypdf_formStartInput";

/// Form-field id carrying the last valid page number.
pub const END_FIELD: &str = "ext_ontheflypdf_formEndInput";

/// Matches `value="N"` followed by `id="<field>"` within one tag, with
/// either quote style. The markup puts the value attribute first, so one
/// pattern per field is enough.
fn field_value_regex(field_id: &str) -> Regex {
    Regex::new(&format!(
        r#"value=['"]([0-9]+)['"][^>]+id=['"]{field_id}['"]"#
    ))
    .unwrap()
}

static RE_START: Lazy<Regex> = Lazy::new(|| field_value_regex(START_FIELD));
static RE_END: Lazy<Regex> = Lazy::new(|| field_value_regex(END_FIELD));

/// Fetch the detail page for `doc` and extract its valid page range.
pub async fn detect_range(
    client: &reqwest::Client,
    doc: &DocumentRef,
) -> Result<PageRange, KrameriusError> {
    let url = doc.detail_url();
    debug!("Fetching detail page: {}", url);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| KrameriusError::DetailRequestFailed {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(KrameriusError::DetailRequestFailed {
            reason: format!("HTTP {}", response.status()),
            url,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| KrameriusError::DetailRequestFailed {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    let start = extract_field(&body, &RE_START, START_FIELD, &url)?;
    let end = extract_field(&body, &RE_END, END_FIELD, &url)?;
    debug!("Detected page range {}-{}", start, end);

    PageRange::new(start, end)
}

/// Pull one numeric field value out of the detail-page markup.
fn extract_field(
    body: &str,
    re: &Regex,
    field: &'static str,
    url: &str,
) -> Result<u32, KrameriusError> {
    let captures = re
        .captures(body)
        .ok_or_else(|| KrameriusError::PageRangeNotFound {
            url: url.to_string(),
            field,
        })?;
    captures[1]
        .parse()
        .map_err(|_| KrameriusError::Internal(format!("page number in field '{field}' overflows")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// A trimmed-down detail page in the shape Kramerius actually serves.
    fn detail_fixture(start: u32, end: u32) -> String {
        format!(
            r#"<html><body>
            <form name="ontheflypdf_form">
            <input type="text" value="{start}" name="start" id="{START_FIELD}" />
            <input type="text" value="{end}" name="end" id="{END_FIELD}" />
            </form>
            </body></html>"#
        )
    }

    #[test]
    fn fixture_fields_are_extracted() {
        let body = detail_fixture(12, 47);
        assert_eq!(
            extract_field(&body, &RE_START, START_FIELD, "u").unwrap(),
            12
        );
        assert_eq!(extract_field(&body, &RE_END, END_FIELD, "u").unwrap(), 47);
    }

    #[test]
    fn single_quoted_attributes_match_too() {
        let body = format!("<input value='3' id='{START_FIELD}'/>");
        assert_eq!(extract_field(&body, &RE_START, START_FIELD, "u").unwrap(), 3);
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let body = format!("<input value=\"3\" id=\"{START_FIELD}\"/>");
        let err = extract_field(&body, &RE_END, END_FIELD, "u").unwrap_err();
        assert!(matches!(
            err,
            KrameriusError::PageRangeNotFound { field, .. } if field == END_FIELD
        ));
    }

    #[test]
    fn end_field_does_not_match_the_start_pattern() {
        let body = format!("<input value=\"9\" id=\"{END_FIELD}\"/>");
        assert!(extract_field(&body, &RE_START, START_FIELD, "u").is_err());
    }

    #[tokio::test]
    async fn detects_range_from_served_detail_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/kramerius/MShowMonograph.do"))
            .and(query_param("id", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_fixture(12, 47)))
            .mount(&server)
            .await;

        let doc = DocumentRef::new("100", format!("{}/kramerius/", server.uri()));
        let client = reqwest::Client::new();
        let range = detect_range(&client, &doc).await.unwrap();
        assert_eq!(range, PageRange::new(12, 47).unwrap());
    }

    #[tokio::test]
    async fn non_success_status_is_a_detail_request_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let doc = DocumentRef::new("100", format!("{}/kramerius/", server.uri()));
        let client = reqwest::Client::new();
        let err = detect_range(&client, &doc).await.unwrap_err();
        assert!(matches!(
            err,
            KrameriusError::DetailRequestFailed { reason, .. } if reason.contains("503")
        ));
    }

    #[tokio::test]
    async fn page_without_fields_is_a_pattern_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>no form here</html>"))
            .mount(&server)
            .await;

        let doc = DocumentRef::new("100", format!("{}/kramerius/", server.uri()));
        let client = reqwest::Client::new();
        let err = detect_range(&client, &doc).await.unwrap_err();
        assert!(matches!(
            err,
            KrameriusError::PageRangeNotFound { field, .. } if field == START_FIELD
        ));
    }
}
