use crate::toy::DEFAULT_HTTP_VERSION;

/// Prefix of an explicit version token, compared case-insensitively.
const VERSION_PREFIX: &str = "HTTP/";

/// `METHOD url... [VERSION]`, e.g. `POST http://{{host}}/create HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub url: String,
    pub version: String,
}

impl RequestLine {
    /// Parse a request line. Returns `None` when there are fewer than two tokens
    /// or the second token is not an `http` URL.
    pub fn parse(input: &str) -> Option<RequestLine> {
        let tokens: Vec<&str> = input.split(' ').filter(|t| !t.is_empty()).collect();
        if tokens.len() < 2 || !tokens[1].starts_with("http") {
            return None;
        }

        let method = tokens[0].to_string();
        if tokens.len() == 2 {
            return Some(RequestLine {
                method,
                url: tokens[1].to_string(),
                version: DEFAULT_HTTP_VERSION.to_string(),
            });
        }

        let last = tokens[tokens.len() - 1];
        let (url_tokens, version) = if is_version(last) {
            (&tokens[1..tokens.len() - 1], last.to_uppercase())
        } else {
            (&tokens[1..], DEFAULT_HTTP_VERSION.to_string())
        };

        Some(RequestLine {
            method,
            url: url_tokens.join(" ").trim().to_string(),
            version,
        })
    }
}

fn is_version(token: &str) -> bool {
    token
        .get(..VERSION_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(VERSION_PREFIX))
}
