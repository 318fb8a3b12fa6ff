// HTTP plumbing for the Canvas REST API: authenticated GET requests and page walking.
use crate::error::{CanvasError, CanvasResult};
use crate::CanvasCredentials;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, LINK};
use serde_json::Value;

/// Number of items requested per page on every listing call.
pub const PER_PAGE: usize = 100;

lazy_static! {
    // Canvas advertises the following page as `<url>; rel="next"` inside the Link header.
    static ref NEXT_LINK: Regex = Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).unwrap();
}

/// Sends a single authenticated GET request.
///
/// The bearer token from `canvas_info` is attached to the request and `params` are
/// appended as query parameters. Any non-success status is turned into the matching
/// `CanvasError` variant; there is no retry.
pub fn send_get(
    client: &Client,
    canvas_info: &CanvasCredentials,
    url: &str,
    params: &[(String, String)],
) -> CanvasResult<Response> {
    let response = client
        .get(url)
        .bearer_auth(&canvas_info.token_canvas)
        .query(params)
        .send()?;

    if response.status().is_success() {
        Ok(response)
    } else {
        Err(CanvasError::from_status(response.status().as_u16(), url))
    }
}

/// Fetches a single JSON object.
pub fn fetch_json(
    client: &Client,
    canvas_info: &CanvasCredentials,
    url: &str,
) -> CanvasResult<Value> {
    let response = send_get(client, canvas_info, url, &[])?;
    let text = response.text()?;
    Ok(serde_json::from_str(&text)?)
}

/// Fetches every page of a listing endpoint and returns the concatenated items.
///
/// The `Link` header is followed while it advertises a `rel="next"` page. Servers that
/// send no Link header are walked with an explicit `page` counter until a page comes
/// back shorter than `PER_PAGE`.
///
/// Arguments:
/// - `client`: HTTP client for executing requests.
/// - `canvas_info`: Canvas credentials (base URL and token).
/// - `url`: Full URL of the listing endpoint.
/// - `params`: Extra query parameters (filters, `include[]`), sent on the first request.
pub fn fetch_all_pages(
    client: &Client,
    canvas_info: &CanvasCredentials,
    url: &str,
    params: Vec<(String, String)>,
) -> CanvasResult<Vec<Value>> {
    let mut all_items = Vec::new();
    let mut page = 1;
    let mut next: Option<String> = None;

    loop {
        let response = match &next {
            // The next link already carries every query parameter.
            Some(link) => send_get(client, canvas_info, link, &[])?,
            None => {
                let mut page_params = params.clone();
                page_params.push(("page".to_string(), page.to_string()));
                page_params.push(("per_page".to_string(), PER_PAGE.to_string()));
                send_get(client, canvas_info, url, &page_params)?
            }
        };

        let next_link = next_page_link(response.headers());
        let text = response.text()?;
        let items: Vec<Value> = serde_json::from_str(&text)?;
        let count = items.len();
        all_items.extend(items);

        match next_link {
            Some(link) if count > 0 => next = Some(link),
            Some(_) => break,
            None if next.is_some() || count < PER_PAGE => break,
            None => page += 1,
        }
    }

    log::debug!("{} items fetched from {}", all_items.len(), url);
    Ok(all_items)
}

fn next_page_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| NEXT_LINK.captures(value).map(|caps| caps[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_next_link_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://c.example/api/v1/courses?page=1&per_page=100>; rel=\"current\",\
                 <https://c.example/api/v1/courses?page=2&per_page=100>; rel=\"next\",\
                 <https://c.example/api/v1/courses?page=1&per_page=100>; rel=\"first\"",
            ),
        );
        assert_eq!(
            next_page_link(&headers).as_deref(),
            Some("https://c.example/api/v1/courses?page=2&per_page=100")
        );
    }

    #[test]
    fn test_last_page_has_no_next_link() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://c.example/api/v1/courses?page=2>; rel=\"current\",\
                 <https://c.example/api/v1/courses?page=1>; rel=\"first\"",
            ),
        );
        assert_eq!(next_page_link(&headers), None);
        assert_eq!(next_page_link(&HeaderMap::new()), None);
    }

    #[test]
    fn test_fetch_all_pages_follows_link_header() {
        let mut server = mockito::Server::new();
        let credentials = CanvasCredentials::new(&server.url(), "token");
        let next = format!("{}/api/v1/items?page=2&per_page=100", server.url());

        let first = server
            .mock("GET", "/api/v1/items")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .match_header("authorization", "Bearer token")
            .with_header("content-type", "application/json")
            .with_header("link", &format!("<{}>; rel=\"next\"", next))
            .with_body(r#"[{"id": 1}, {"id": 2}]"#)
            .create();
        let second = server
            .mock("GET", "/api/v1/items")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 3}]"#)
            .create();

        let items = fetch_all_pages(
            &Client::new(),
            &credentials,
            &credentials.endpoint("/items"),
            Vec::new(),
        )
        .unwrap();

        first.assert();
        second.assert();
        let ids: Vec<u64> = items.iter().filter_map(|i| i["id"].as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_short_page_without_link_ends_listing() {
        let mut server = mockito::Server::new();
        let credentials = CanvasCredentials::new(&server.url(), "token");
        let only = server
            .mock("GET", "/api/v1/items")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
            ]))
            .with_body(r#"[{"id": 7}]"#)
            .expect(1)
            .create();

        let items = fetch_all_pages(
            &Client::new(),
            &credentials,
            &credentials.endpoint("/items"),
            Vec::new(),
        )
        .unwrap();

        only.assert();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_error_status_is_classified() {
        let mut server = mockito::Server::new();
        let credentials = CanvasCredentials::new(&server.url(), "token");
        let _m = server
            .mock("GET", "/api/v1/items")
            .match_query(Matcher::Any)
            .with_status(403)
            .create();

        let err = fetch_all_pages(
            &Client::new(),
            &credentials,
            &credentials.endpoint("/items"),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CanvasError::Forbidden { .. }));
    }
}
