//! Request header parsing.

use axum::http::header::{
    CONTENT_TYPE, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, LINK,
};
use axum::http::{HeaderMap, HeaderName};
use chrono::{DateTime, Utc};
use pod_store::{StoreError, StoreResult};
use pod_types::vocab::{http, rdf, shape};
use pod_types::{Conditions, RepresentationMetadata};

pub const SLUG: HeaderName = HeaderName::from_static("slug");

/// A parsed `Link` header entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub target: String,
    /// Relation types, split on whitespace.
    pub rels: Vec<String>,
}

/// Metadata a client supplies with a request body.
///
/// Reads `Content-Type` (without parameters), `Slug`, and the `Link`
/// relations `type`, `hasShape` and `supportsShapes`.
pub fn parse_request_metadata(headers: &HeaderMap) -> StoreResult<RepresentationMetadata> {
    let mut metadata = RepresentationMetadata::new();

    if let Some(content_type) = content_type(headers)? {
        metadata.set_content_type(content_type);
    }

    if let Some(slug) = headers.get(&SLUG) {
        let slug = header_str(&SLUG, slug)?;
        if !slug.trim().is_empty() {
            metadata.set(http::SLUG, slug.trim());
        }
    }

    for value in headers.get_all(LINK) {
        for link in parse_links(header_str(&LINK, value)?)? {
            for rel in &link.rels {
                let predicate = match rel.as_str() {
                    "type" => rdf::TYPE,
                    shape::HAS_SHAPE => shape::HAS_SHAPE,
                    shape::SUPPORTS_SHAPES => shape::SUPPORTS_SHAPES,
                    _ => continue,
                };
                metadata.add(predicate, link.target.as_str());
            }
        }
    }

    Ok(metadata)
}

/// The request media type, lowercased and without parameters.
pub fn content_type(headers: &HeaderMap) -> StoreResult<Option<String>> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(None);
    };
    let value = header_str(&CONTENT_TYPE, value)?;
    let essence = value.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        return Ok(None);
    }
    Ok(Some(essence.to_ascii_lowercase()))
}

/// Whether `content_type` matches one of `accepted`.
///
/// A request without a media type is always accepted, as is any type when
/// the list holds `*/*`. `type/*` ranges match on the main type.
pub fn is_accepted(accepted: &[String], content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let main = content_type.split('/').next().unwrap_or_default();
    accepted.iter().any(|range| {
        let range = range.trim().to_ascii_lowercase();
        range == "*/*"
            || range == content_type
            || range
                .strip_suffix("/*")
                .is_some_and(|range_main| range_main == main)
    })
}

/// Preconditions from `If-*` headers; `None` when there are none.
///
/// Dates that do not parse are ignored.
pub fn parse_conditions(headers: &HeaderMap) -> Option<Conditions> {
    let conditions = Conditions {
        if_match: entity_tags(headers, IF_MATCH),
        if_none_match: entity_tags(headers, IF_NONE_MATCH),
        if_modified_since: http_date(headers, IF_MODIFIED_SINCE),
        if_unmodified_since: http_date(headers, IF_UNMODIFIED_SINCE),
    };
    (!conditions.is_empty()).then_some(conditions)
}

fn entity_tags(headers: &HeaderMap, name: HeaderName) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

fn http_date(headers: &HeaderMap, name: HeaderName) -> Option<DateTime<Utc>> {
    let value = headers.get(name)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

fn header_str<'a>(
    name: &HeaderName,
    value: &'a axum::http::HeaderValue,
) -> StoreResult<&'a str> {
    value
        .to_str()
        .map_err(|e| StoreError::bad_request_with(format!("Invalid {name} header"), e))
}

/// Parse a `Link` header value: `<target>; rel="a b", <other>; rel=c`.
pub fn parse_links(value: &str) -> StoreResult<Vec<Link>> {
    let invalid = || StoreError::bad_request(format!("Invalid Link header: {value}"));
    let mut links = Vec::new();
    let mut rest = value.trim_start();

    while !rest.is_empty() {
        let after_open = rest.strip_prefix('<').ok_or_else(invalid)?;
        let close = after_open.find('>').ok_or_else(invalid)?;
        let target = after_open[..close].trim().to_string();
        rest = &after_open[close + 1..];

        // Parameters run until the next comma outside quotes.
        let mut in_quotes = false;
        let end = rest
            .char_indices()
            .find(|&(_, c)| {
                if c == '"' {
                    in_quotes = !in_quotes;
                }
                c == ',' && !in_quotes
            })
            .map_or(rest.len(), |(i, _)| i);
        let params = &rest[..end];
        rest = rest[end..].trim_start_matches(',').trim_start();

        let mut rels = Vec::new();
        for param in params.split(';') {
            let Some((key, val)) = param.split_once('=') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("rel") {
                rels.extend(
                    val.trim()
                        .trim_matches('"')
                        .split_whitespace()
                        .map(String::from),
                );
            }
        }
        links.push(Link { target, rels });
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pod_types::vocab::ldp;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn parses_links() {
        let links = parse_links(
            r#"<http://www.w3.org/ns/ldp#BasicContainer>; rel="type", <https://s.example/a,b>; rel=next"#,
        )
        .unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target, ldp::BASIC_CONTAINER);
        assert_eq!(links[0].rels, ["type"]);
        assert_eq!(links[1].target, "https://s.example/a,b");
        assert_eq!(links[1].rels, ["next"]);
    }

    #[test]
    fn rejects_malformed_links() {
        let err = parse_links("no-brackets; rel=type").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn request_metadata_from_headers() {
        let map = headers(&[
            ("content-type", "Text/Turtle; charset=utf-8"),
            ("slug", "note"),
            (
                "link",
                r#"<https://shapes.example/note>; rel="http://shapetrees.org/#hasShape""#,
            ),
            ("link", r#"<http://www.w3.org/ns/ldp#Resource>; rel="type""#),
        ]);
        let meta = parse_request_metadata(&map).unwrap();
        assert_eq!(meta.content_type(), Some("text/turtle"));
        assert_eq!(meta.get(http::SLUG).unwrap().value, "note");
        assert_eq!(
            meta.get(shape::HAS_SHAPE).unwrap().value,
            "https://shapes.example/note"
        );
        assert!(meta.has_type(ldp::RESOURCE));
    }

    #[test]
    fn container_slug_is_kept() {
        let meta = parse_request_metadata(&headers(&[("slug", "notes/")])).unwrap();
        assert!(meta.is_new_container());
    }

    #[test]
    fn accepted_media_types() {
        let accepted = vec!["text/turtle".to_string(), "image/*".to_string()];
        assert!(is_accepted(&accepted, Some("text/turtle")));
        assert!(is_accepted(&accepted, Some("image/png")));
        assert!(is_accepted(&accepted, None));
        assert!(!is_accepted(&accepted, Some("text/plain")));
        assert!(is_accepted(&["*/*".to_string()], Some("text/plain")));
        assert!(!is_accepted(&[], Some("text/plain")));
    }

    #[test]
    fn conditions_from_headers() {
        let map = headers(&[
            ("if-match", r#""a", "b""#),
            ("if-modified-since", "Sun, 06 Nov 1994 08:49:37 GMT"),
            ("if-unmodified-since", "not a date"),
        ]);
        let conditions = parse_conditions(&map).unwrap();
        assert_eq!(conditions.if_match, [r#""a""#, r#""b""#]);
        assert!(conditions.if_none_match.is_empty());
        assert_eq!(
            conditions.if_modified_since.unwrap().to_rfc3339(),
            "1994-11-06T08:49:37+00:00"
        );
        assert!(conditions.if_unmodified_since.is_none());
    }

    #[test]
    fn no_conditions() {
        assert!(parse_conditions(&HeaderMap::new()).is_none());
    }
}
