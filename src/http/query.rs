//! Query string module
//!
//! Splits a request target into path and query and decodes the query.

use std::collections::HashMap;

/// Split `path?query` once at the first `?`
///
/// The path portion is returned untouched.
///
/// # Examples
/// ```
/// use treeroute::http::query::split_target;
/// assert_eq!(split_target("/api/query?a=1"), ("/api/query", Some("a=1")));
/// assert_eq!(split_target("/api"), ("/api", None));
/// ```
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Decode a urlencoded query into a map. The last value wins on duplicate keys.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_only_at_first_question_mark() {
        assert_eq!(split_target("/a?b=1?c=2"), ("/a", Some("b=1?c=2")));
        assert_eq!(split_target("/a?"), ("/a", Some("")));
    }

    #[test]
    fn test_path_is_not_decoded() {
        assert_eq!(split_target("/echo/hello%20world+x").0, "/echo/hello%20world+x");
    }

    #[test]
    fn test_parse_query_decodes_values() {
        let query = parse_query("name=hello+world&greeting=hi%21");
        assert_eq!(query.get("name").map(String::as_str), Some("hello world"));
        assert_eq!(query.get("greeting").map(String::as_str), Some("hi!"));
    }

    #[test]
    fn test_parse_query_last_value_wins() {
        let query = parse_query("a=1&a=2&b=3");
        assert_eq!(query.len(), 2);
        assert_eq!(query["a"], "2");
    }

    #[test]
    fn test_parse_empty_query() {
        assert!(parse_query("").is_empty());
    }
}
