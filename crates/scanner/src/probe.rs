//! HTML GUI port probing.
//!
//! A process earns a dashboard tile only if its port actually serves a
//! browsable page. The probe fetches `http://localhost:{port}/` and
//! applies [`looks_like_html`]; the classifier is a pure function so the
//! truth table is testable without a listener.

use std::collections::HashMap;

use futures::future::join_all;

/// Decide whether a response represents a usable HTML GUI.
///
/// All three must hold:
/// 1. HTTP status is 200.
/// 2. Content-Type indicates `text/html`.
/// 3. The body contains actual HTML structure (`<!doctype html` or `<html`).
pub fn looks_like_html(status: u16, content_type: Option<&str>, body: &str) -> bool {
    if status != 200 {
        return false;
    }

    let is_html_type = content_type
        .map(|ct| ct.to_lowercase().contains("text/html"))
        .unwrap_or(false);
    if !is_html_type {
        return false;
    }

    let body = body.to_lowercase();
    body.contains("<!doctype html") || body.contains("<html")
}

/// Probe a local port for an HTML GUI. Connection errors count as "no".
pub async fn probe_is_html(client: &reqwest::Client, port: u16) -> bool {
    let url = format!("http://localhost:{port}/");

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(_) => return false,
    };

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let body = match response.text().await {
        Ok(b) => b,
        Err(_) => return false,
    };

    looks_like_html(status, content_type.as_deref(), &body)
}

/// Probe multiple ports concurrently.
pub async fn probe_ports(client: &reqwest::Client, ports: &[u16]) -> HashMap<u16, bool> {
    let checks = ports.iter().map(|&port| async move {
        let is_html = probe_is_html(client, port).await;
        (port, is_html)
    });
    join_all(checks).await.into_iter().collect()
}

/// Maximum homepage excerpt length fed into summary prompts.
const HOMEPAGE_EXCERPT_LEN: usize = 5000;

/// Fetch the homepage of a local app, truncated for prompt context.
///
/// Best-effort: any failure yields `None`.
pub async fn fetch_homepage(client: &reqwest::Client, port: u16) -> Option<String> {
    let url = format!("http://localhost:{port}/");
    let response = client.get(&url).send().await.ok()?;
    if response.status().as_u16() != 200 {
        return None;
    }
    let mut body = response.text().await.ok()?;
    if body.len() > HOMEPAGE_EXCERPT_LEN {
        // Truncate on a char boundary.
        let mut end = HOMEPAGE_EXCERPT_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    Some(body)
}
