//! Default and authorization headers.
//!
//! Caller-supplied headers always win: a default is only added when the
//! caller did not already set a header of the same name (compared
//! case-insensitively).

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";

pub type Headers = Vec<(String, String)>;

/// Ensure `Content-Type: application/json` unless the caller set one.
pub fn with_default_headers(init: Headers) -> Headers {
    merge(vec![(CONTENT_TYPE.to_string(), "application/json".to_string())], init)
}

/// `with_default_headers` plus `Authorization: Bearer {token}` unless the
/// caller set one.
pub fn with_auth_headers(token: &str, init: Headers) -> Headers {
    with_default_headers(merge(
        vec![(AUTHORIZATION.to_string(), format!("Bearer {token}"))],
        init,
    ))
}

/// Overlay `overrides` onto `defaults`. An override replaces the default of
/// the same name in place; new names are appended in order.
fn merge(mut defaults: Headers, overrides: Headers) -> Headers {
    for (key, value) in overrides {
        match defaults.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(existing) => *existing = (key, value),
            None => defaults.push((key, value)),
        }
    }
    defaults
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn default_content_type_is_added() {
        let headers = with_default_headers(Vec::new());
        assert_eq!(headers, vec![pair("Content-Type", "application/json")]);
    }

    #[test]
    fn caller_content_type_wins() {
        let headers = with_default_headers(vec![pair("content-type", "text/plain")]);
        assert_eq!(headers, vec![pair("content-type", "text/plain")]);
    }

    #[test]
    fn auth_headers_are_added() {
        let headers = with_auth_headers("t", Vec::new());
        assert_eq!(
            headers,
            vec![
                pair("Content-Type", "application/json"),
                pair("Authorization", "Bearer t"),
            ]
        );
    }

    #[test]
    fn caller_authorization_wins() {
        let headers = with_auth_headers("t", vec![pair("Authorization", "custom")]);
        assert_eq!(
            headers,
            vec![
                pair("Content-Type", "application/json"),
                pair("Authorization", "custom"),
            ]
        );
    }

    #[test]
    fn unrelated_caller_headers_are_kept() {
        let headers = with_auth_headers("t", vec![pair("X-Request-Id", "42")]);
        assert_eq!(headers.len(), 3);
        assert_eq!(headers[2], pair("X-Request-Id", "42"));
    }
}
