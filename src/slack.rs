use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::errors::ReporterError;
use crate::types::TableMessage;

const SLACK_API_BASE: &str = "https://slack.com/api";
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Slack Web API client posting through chat.postMessage with bot token
/// auth. Every send is retried once before the error is surfaced.
pub struct SlackClient {
    http: reqwest::Client,
    token: String,
    channel: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackClient {
    pub fn new(token: &str, channel: &str) -> Self {
        Self::with_base_url(token, channel, SLACK_API_BASE)
    }

    /// Point the client at a different API base; used by tests to talk to a
    /// local mock server.
    pub fn with_base_url(token: &str, channel: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.to_string(),
            channel: channel.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn send_message(&self, text: &str) -> Result<(), ReporterError> {
        match self.post_message(text).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!("slack delivery failed, retrying once: {}", err);
                tokio::time::sleep(RETRY_DELAY).await;
                self.post_message(text).await
            }
        }
    }

    /// Render the table as a fenced markdown pipe table, append the footnote
    /// after a blank line and deliver it as a single message.
    pub async fn send_table_message(&self, table: &TableMessage) -> Result<(), ReporterError> {
        let rendered = render_markdown_table(&table.headers, &table.rows);
        let mut message = format!("```\n{}\n```", rendered);
        if let Some(footnote) = &table.footnote {
            message.push_str("\n\n");
            message.push_str(footnote);
        }
        self.send_message(&message).await
    }

    async fn post_message(&self, text: &str) -> Result<(), ReporterError> {
        let res = self
            .http
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "channel": self.channel,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| ReporterError::Delivery(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ReporterError::Delivery(format!(
                "slack returned {}: {}",
                status, body
            )));
        }
        // Slack reports API-level failures inside a 200 body.
        let body: PostMessageResponse = res
            .json()
            .await
            .map_err(|e| ReporterError::Delivery(format!("invalid slack response: {}", e)))?;
        if !body.ok {
            return Err(ReporterError::Delivery(
                body.error.unwrap_or_else(|| "unknown slack error".to_string()),
            ));
        }
        Ok(())
    }
}

/// Pipe-delimited markdown table with padded, left-aligned columns.
pub fn render_markdown_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers, &widths));
    let separator: Vec<String> = widths.iter().map(|w| format!(":{}", "-".repeat(*w))).collect();
    lines.push(format!("|{}|", separator.join("|")));
    for row in rows {
        lines.push(format_row(row, &widths));
    }
    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
        .collect();
    format!("|{}|", padded.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_markdown_table() {
        let headers = strings(&["Metric", "CPU"]);
        let rows = vec![strings(&["Capacity", "4000 m"]), strings(&["Usage", "500 m"])];

        let rendered = render_markdown_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| Metric   | CPU    |");
        assert_eq!(lines[1], "|:--------|:------|");
        assert_eq!(lines[2], "| Capacity | 4000 m |");
        assert_eq!(lines[3], "| Usage    | 500 m  |");
    }

    #[tokio::test]
    async fn test_send_message_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat.postMessage")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await;

        let client = SlackClient::with_base_url("xoxb-test", "C012345", &server.url());
        client.send_message("hello").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_message_retries_once_then_surfaces_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat.postMessage")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":false,"error":"channel_not_found"}"#)
            .expect(2)
            .create_async()
            .await;

        let client = SlackClient::with_base_url("xoxb-test", "C012345", &server.url());
        let err = client.send_message("hello").await.unwrap_err();
        assert!(err.to_string().contains("channel_not_found"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_message_http_error_is_delivery_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat.postMessage")
            .with_status(503)
            .with_body("service unavailable")
            .expect(2)
            .create_async()
            .await;

        let client = SlackClient::with_base_url("xoxb-test", "C012345", &server.url());
        let err = client.send_message("hello").await.unwrap_err();
        assert!(matches!(err, ReporterError::Delivery(_)));
    }

    #[tokio::test]
    async fn test_send_table_message_wraps_in_code_fence() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat.postMessage")
            .match_body(mockito::Matcher::Regex("Number of nodes - 2".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await;

        let table = TableMessage {
            headers: strings(&["Metric", "CPU"]),
            rows: vec![strings(&["Capacity", "4000 m"])],
            footnote: Some("Number of nodes - 2".to_string()),
        };

        let client = SlackClient::with_base_url("xoxb-test", "C012345", &server.url());
        client.send_table_message(&table).await.unwrap();
        mock.assert_async().await;
    }
}
