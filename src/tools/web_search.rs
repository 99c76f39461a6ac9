//! Web search tool backed by the DuckDuckGo HTML endpoint.
//!
//! Fetches the lightweight HTML results page and extracts title, url, and
//! snippet per result. Network and parse faults degrade to an
//! `{"error": ...}` payload fed back into the conversation.

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

fn default_max_results() -> usize {
    5
}

/// Arguments for the web search tool.
#[derive(Debug, Deserialize)]
struct SearchArgs {
    /// Search query.
    query: String,
    /// Maximum number of results to return.
    #[serde(default = "default_max_results")]
    max_results: usize,
}

/// One extracted search result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Run a web search and return a JSON payload of results.
pub async fn run(http_client: &Client, args: &Value) -> String {
    let args: SearchArgs = match serde_json::from_value(args.clone()) {
        Ok(args) => args,
        Err(e) => return json!({"error": format!("Invalid arguments: {}", e)}).to_string(),
    };

    tracing::debug!(query = %args.query, "Searching the web");

    let response = match http_client
        .get(SEARCH_ENDPOINT)
        .query(&[("q", args.query.as_str())])
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return json!({"error": format!("Search failed: {}", e)}).to_string(),
    };

    if !response.status().is_success() {
        return json!({
            "error": format!("Search failed: status {}", response.status().as_u16())
        })
        .to_string();
    }

    let html = match response.text().await {
        Ok(html) => html,
        Err(e) => return json!({"error": format!("Search failed: {}", e)}).to_string(),
    };

    let results = parse_results(&html, args.max_results);
    json!({"results": results}).to_string()
}

/// Extract up to `max_results` results from a DuckDuckGo HTML results page.
pub(crate) fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    static LINK: OnceLock<Regex> = OnceLock::new();
    static SNIPPET: OnceLock<Regex> = OnceLock::new();

    let link = LINK.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
            .expect("result link pattern is valid")
    });
    let snippet = SNIPPET.get_or_init(|| {
        Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</a>"#)
            .expect("snippet pattern is valid")
    });

    let link_matches: Vec<regex::Captures> = link.captures_iter(html).collect();

    link_matches
        .iter()
        .enumerate()
        .take(max_results)
        .map(|(index, caps)| {
            // A result's snippet sits between its link and the next one, so
            // a snippetless result never steals the following result's text.
            let region_start = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let region_end = link_matches
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(html.len());
            let snippet_text = snippet
                .captures(&html[region_start..region_end])
                .and_then(|caps| caps.get(1))
                .map(|m| clean_fragment(m.as_str()))
                .unwrap_or_default();

            SearchResult {
                title: clean_fragment(caps.get(2).map(|m| m.as_str()).unwrap_or("")),
                url: clean_fragment(caps.get(1).map(|m| m.as_str()).unwrap_or("")),
                snippet: snippet_text,
            }
        })
        .collect()
}

/// Strip markup and decode the entities DuckDuckGo emits in result text.
fn clean_fragment(fragment: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

    let text = tag.replace_all(fragment, "");
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}
