//! Access log format module
//!
//! Supported formats:
//! - `simple` (request id, method, url, duration and status)
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json`
//! - Custom patterns with `$variables`

use chrono::Local;
use serde_json::json;

/// One finished request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub request_id: u64,
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    /// Request target, query string included
    pub url: String,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Entry stamped with the current local time
    pub fn new(request_id: u64, remote_addr: String, method: String, url: String) -> Self {
        Self {
            request_id,
            remote_addr,
            time: Local::now(),
            method,
            url,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "simple" => self.format_simple(),
            "combined" => self.format_combined(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn seconds(&self) -> f64 {
        self.request_time_us as f64 / 1_000_000.0
    }

    /// `[id] METHOD url | done in: 0.002 | status: 200`
    fn format_simple(&self) -> String {
        format!(
            "[{}] {} {} | done in: {:.3} | status: {}",
            self.request_id,
            self.method,
            self.url,
            self.seconds(),
            self.status,
        )
    }

    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        json!({
            "request_id": self.request_id,
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "url": self.url,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    fn request_line(&self) -> String {
        format!("{} {} HTTP/{}", self.method, self.url, self.http_version)
    }

    /// Substitute `$remote_addr`, `$time_local`, `$time_iso8601`, `$request`,
    /// `$request_method`, `$request_uri`, `$request_id`, `$request_time`,
    /// `$status`, `$body_bytes_sent`, `$http_referer`, `$http_user_agent`
    fn format_custom(&self, pattern: &str) -> String {
        // Longer variables first: $request_* before $request
        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace(
                "$time_local",
                &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            )
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{:.3}", self.seconds()))
            .replace("$request_method", &self.method)
            .replace("$request_uri", &self.url)
            .replace("$request_id", &self.request_id.to_string())
            .replace("$request", &self.request_line())
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
            .replace("$http_referer", self.referer.as_deref().unwrap_or("-"))
            .replace("$http_user_agent", self.user_agent.as_deref().unwrap_or("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            42,
            "192.168.1.1".to_string(),
            "GET".to_string(),
            "/api/query?page=1".to_string(),
        );
        entry.status = 200;
        entry.body_bytes = 1234;
        entry.referer = Some("https://example.com".to_string());
        entry.user_agent = Some("Mozilla/5.0".to_string());
        entry.request_time_us = 1500;
        entry
    }

    #[test]
    fn test_format_simple() {
        let log = create_test_entry().format("simple");
        assert_eq!(log, "[42] GET /api/query?page=1 | done in: 0.002 | status: 200");
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format("combined");
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"GET /api/query?page=1 HTTP/1.1\" 200 1234"));
        assert!(log.ends_with("\"https://example.com\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format("common");
        assert!(log.contains("\"GET /api/query?page=1 HTTP/1.1\" 200 1234"));
        assert!(!log.contains("https://example.com"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["request_id"], 42);
        assert_eq!(value["method"], "GET");
        assert_eq!(value["status"], 200);
        assert_eq!(value["referer"], "https://example.com");
    }

    #[test]
    fn test_format_custom() {
        let log = create_test_entry()
            .format("$request_id $request_method $request_uri -> $status in $request_time");
        assert_eq!(log, "42 GET /api/query?page=1 -> 200 in 0.002");
    }
}
