use indexmap::IndexMap;
use rstest::rstest;

use toys::extract::{RequestLine, extract};
use toys::{Parser, Toy};

fn toys_of(source: &str) -> IndexMap<String, Toy> {
    let document = Parser::default().parse_text(source);
    extract(&document.nodes).toys
}

fn single(source: &str) -> Toy {
    let toys = toys_of(source);
    assert_eq!(toys.len(), 1, "expected one request, got {:?}", toys.keys());
    toys.into_values().next().unwrap_or_default()
}

fn map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

const GET_USER: &str = r#"
## Get User

### url
> GET http://host/api/user HTTP/1.1

### param
```json
{"id":"1"}
```
"#;

#[test]
fn get_user_document() {
    let toy = single(GET_USER);
    assert_eq!(toy.name, "Get User");
    assert_eq!(toy.method, "GET");
    assert_eq!(toy.url, "http://host/api/user");
    assert_eq!(toy.http_version, "HTTP/1.1");
    assert_eq!(toy.param, map(&[("id", "1")]));
    assert!(toy.header.is_empty());
    assert!(toy.path_segments.is_empty());
    assert_eq!(toy.body, "");
}

#[test]
fn all_fields() {
    let toy = single(
        r#"
# Users

## Create

### url
> POST http://{{host}}/users HTTP/2

### header
```json
{"Content-Type": "application/json", "X-Trace": "{{$uuid}}"}
```

### pathVar
```json
["v1", 42]
```

### param
```json
{"dry": true, "limit": 10, "q": "x"}
```

### body
```json
{"name": "{{name}}"}
```
"#,
    );

    assert_eq!(toy.name, "Users@Create");
    assert_eq!(toy.method, "POST");
    assert_eq!(toy.url, "http://{{host}}/users");
    assert_eq!(toy.http_version, "HTTP/2");
    assert_eq!(
        toy.header,
        map(&[("Content-Type", "application/json"), ("X-Trace", "{{$uuid}}")])
    );
    assert_eq!(toy.path_segments, vec!["v1", "42"]);
    assert_eq!(toy.param, map(&[("dry", "true"), ("limit", "10"), ("q", "x")]));
    assert_eq!(toy.body, r#"{"name": "{{name}}"}"#);
}

#[test]
fn headings_without_children_are_not_requests() {
    assert!(toys_of("## Empty\n## Also empty").is_empty());
    assert!(toys_of("# Only a title\n\nsome text").is_empty());
}

#[test]
fn request_group_with_only_prose_has_default_fields() {
    let toy = single("## Notes\n\njust text");
    assert_eq!(toy, Toy::named("Notes"));
}

#[test]
fn several_requests_keep_document_order() {
    let toys = toys_of(
        "# Api\n## First\n### url\n> GET http://a\n## Second\n### url\n> DELETE http://b",
    );
    let names: Vec<&str> = toys.keys().map(|s| s.as_str()).collect();
    assert_eq!(names, vec!["Api@First", "Api@Second"]);
    assert_eq!(toys["Api@Second"].method, "DELETE");
}

#[test]
fn body_with_other_language_is_empty() {
    let toy = single("## R\n### body\n```xml\n<a/>\n```");
    assert_eq!(toy.body, "");
}

#[test]
fn url_needs_a_blockquote() {
    let toy = single("## R\n### url\n```json\n\"GET http://a\"\n```");
    assert_eq!(toy.url, "");
    assert_eq!(toy.method, "");
}

#[test]
fn field_heading_matches_by_containment() {
    let toy = single("## R\n### request url\n> GET http://a\n### Query param\n```json\n{\"a\":\"b\"}\n```");
    assert_eq!(toy.url, "http://a");
    assert_eq!(toy.param, map(&[("a", "b")]));
}

#[test]
fn keyword_match_is_case_sensitive() {
    let toy = single("## R\n### URL\n> GET http://a");
    assert_eq!(toy.url, "");
}

#[test]
fn invalid_json_keeps_default_and_warns() {
    let document = Parser::default().parse_text("## R\n### header\n```json\n{not json}\n```");
    let extraction = extract(&document.nodes);
    assert!(extraction.toys["R"].header.is_empty());
    assert_eq!(extraction.diagnostics.len(), 1);
    assert_eq!(extraction.diagnostics[0].line, 3);
}

#[test]
fn header_values_must_be_strings() {
    let document = Parser::default().parse_text("## R\n### header\n```json\n{\"a\": 1}\n```");
    let extraction = extract(&document.nodes);
    assert!(extraction.toys["R"].header.is_empty());
    assert_eq!(extraction.diagnostics.len(), 1);
}

#[test]
fn empty_json_block_is_silently_default() {
    let document = Parser::default().parse_text("## R\n### param\n```json\n```");
    let extraction = extract(&document.nodes);
    assert!(extraction.toys["R"].param.is_empty());
    assert!(extraction.diagnostics.is_empty());
}

#[test]
fn bad_request_line_warns() {
    let document = Parser::default().parse_text("## R\n### url\n> GET");
    let extraction = extract(&document.nodes);
    assert_eq!(extraction.toys["R"].method, "");
    assert_eq!(extraction.diagnostics.len(), 1);
    assert_eq!(extraction.diagnostics[0].line, 3);
}

#[test]
fn repeated_field_last_wins() {
    let toy = single("## R\n### url\n> GET http://a\n### url\n> PUT http://b");
    assert_eq!(toy.method, "PUT");
    assert_eq!(toy.url, "http://b");
}

#[test]
fn duplicate_request_names_replace_with_warning() {
    let document =
        Parser::default().parse_text("## R\n### url\n> GET http://a\n## R\n### url\n> GET http://b");
    let extraction = extract(&document.nodes);
    assert_eq!(extraction.toys.len(), 1);
    assert_eq!(extraction.toys["R"].url, "http://b");
    assert_eq!(extraction.diagnostics.len(), 1);
    assert_eq!(extraction.diagnostics[0].line, 4);
}

#[test]
fn only_the_first_child_of_a_field_group_is_used() {
    let toy = single("## R\n### url\n> GET http://a\n\nprose\n\n> POST http://b");
    assert_eq!(toy.method, "GET");
}

#[test]
fn map_round_trips_through_json() {
    let toy = single(GET_USER);
    let json = serde_json::to_string(&toy.param).unwrap();
    let decoded: std::collections::HashMap<String, String> = serde_json::from_str(&json).unwrap();
    let original: std::collections::HashMap<String, String> = toy.param.clone().into_iter().collect();
    assert_eq!(decoded, original);
}

// ---------------------------------------------------------------------------
// Request line
// ---------------------------------------------------------------------------

#[rstest]
#[case("POST http://host/api HTTP/2", "POST", "http://host/api", "HTTP/2")]
#[case("GET http://host/api/user HTTP/1.1", "GET", "http://host/api/user", "HTTP/1.1")]
#[case("GET http://host", "GET", "http://host", "HTTP/1.1")]
#[case("GET   http://host   http/1.0", "GET", "http://host", "HTTP/1.0")]
#[case("GET http://host/a b c", "GET", "http://host/a b c", "HTTP/1.1")]
#[case("GET https://host/a b HTTP/2", "GET", "https://host/a b", "HTTP/2")]
#[case("DQL http://db select", "DQL", "http://db select", "HTTP/1.1")]
fn request_line_parses(
    #[case] input: &str,
    #[case] method: &str,
    #[case] url: &str,
    #[case] version: &str,
) {
    let line = RequestLine::parse(input).unwrap();
    assert_eq!(line.method, method);
    assert_eq!(line.url, url);
    assert_eq!(line.version, version);
}

#[rstest]
#[case("")]
#[case("GET")]
#[case("GET ftp://host")]
#[case("GET /relative HTTP/1.1")]
fn request_line_rejects(#[case] input: &str) {
    assert_eq!(RequestLine::parse(input), None);
}
