//! Parameter parsing: URL parameter bags into predicates and controls.
//!
//! Input is either decoded `(key, value)` pairs or a raw URL-encoded
//! query string. Duplicate keys keep the last occurrence, matching URL
//! parameter bag semantics. `$`-prefixed keys route to the control set;
//! everything else becomes a filter predicate, with `from`/`to` on the
//! same target paired into one range.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::path::Path;
use crate::store::Key;

use super::controls::{parse_nat, Controls, JoinMode, OutputFormat};
use super::errors::{ParamError, ParamResult};
use super::predicate::Predicate;

/// The outcome of parameter parsing.
#[derive(Debug, Clone, Default)]
pub struct ParsedQuery {
    /// Normalized predicates, ordered by target.
    pub predicates: Vec<Predicate>,
    /// The control set.
    pub controls: Controls,
}

impl ParsedQuery {
    /// A query with no filter predicates short-circuits to an empty result.
    pub fn is_null_query(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Parses decoded parameter pairs. Later duplicates win.
pub fn parse_pairs<I, K, V>(pairs: I) -> ParamResult<ParsedQuery>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    // BTreeMap gives last-wins duplicates and a deterministic walk order.
    let mut bag: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in pairs {
        bag.insert(key.into(), value.into());
    }

    let mut controls = Controls::default();
    let mut predicates: Vec<Predicate> = Vec::new();
    let mut ranges: BTreeMap<String, (Option<Key>, Option<Key>)> = BTreeMap::new();

    for (key, value) in &bag {
        if let Some(control) = key.strip_prefix('$') {
            route_control(&mut controls, control, value)?;
            continue;
        }

        let (target, op_name) = match key.split_once('$') {
            Some((target, op)) => (target, op),
            None => (key.as_str(), "value"),
        };
        // An empty op can only come from a trailing '$'.
        if !is_valid_path(target) || op_name.is_empty() {
            return Err(ParamError::MalformedKey(key.clone()));
        }

        match op_name {
            "value" => predicates.push(Predicate::eq(target, value.as_str())),
            "prefix" => {
                if value.is_empty() {
                    return Err(ParamError::EmptyPrefix(target.to_string()));
                }
                predicates.push(Predicate::prefix(target, value.as_str()));
            }
            "from" => {
                ranges.entry(target.to_string()).or_default().0 =
                    Some(Key::from(value.as_str()));
            }
            "to" => {
                ranges.entry(target.to_string()).or_default().1 =
                    Some(Key::from(value.as_str()));
            }
            other => {
                return Err(ParamError::UnknownOperator {
                    target: target.to_string(),
                    op: other.to_string(),
                })
            }
        }
    }

    for (target, (lo, hi)) in ranges {
        predicates.push(Predicate::range(target, lo, hi));
    }
    // Stable: same-target predicates keep their relative order.
    predicates.sort_by(|a, b| a.target.cmp(&b.target));

    controls.validate()?;
    debug!(
        predicates = predicates.len(),
        join = controls.join.as_str(),
        format = controls.format.as_str(),
        "parsed query parameters"
    );
    Ok(ParsedQuery {
        predicates,
        controls,
    })
}

/// Parses a URL-encoded query string, e.g. `?category=sales&$limit=10`.
pub fn parse_query_string(raw: &str) -> ParamResult<ParsedQuery> {
    parse_pairs(decode_query_string(raw)?)
}

/// Decodes a query string into ordered pairs.
///
/// `+` decodes to space; empty segments are skipped; a segment without
/// `=` becomes a key with an empty value.
pub fn decode_query_string(raw: &str) -> ParamResult<Vec<(String, String)>> {
    let raw = raw.trim_start_matches('?');
    let mut pairs = Vec::new();
    for segment in raw.split('&') {
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.split_once('=') {
            Some((k, v)) => (k, v),
            None => (segment, ""),
        };
        pairs.push((decode_component(key)?, decode_component(value)?));
    }
    Ok(pairs)
}

fn decode_component(raw: &str) -> ParamResult<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| ParamError::InvalidEncoding(raw.to_string()))
}

fn route_control(controls: &mut Controls, name: &str, value: &str) -> ParamResult<()> {
    match name {
        "join" => controls.join = JoinMode::parse(value)?,
        "from" => controls.from = Some(parse_nat("$from", value)?),
        "to" => controls.to = Some(parse_nat("$to", value)?),
        "limit" => controls.limit = Some(parse_nat("$limit", value)?),
        "format" => controls.format = OutputFormat::parse(value)?,
        "orderBy" => {
            if value.is_empty() {
                return Err(ParamError::MalformedKey("$orderBy".to_string()));
            }
            controls.order_by = Some(Path::new(value));
        }
        _ => return Err(ParamError::MalformedKey(format!("${}", name))),
    }
    Ok(())
}

fn is_valid_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut bytes = segment.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PredicateOp;

    #[test]
    fn test_bare_key_is_equality() {
        let parsed = parse_pairs(vec![("category", "sales")]).unwrap();
        assert_eq!(parsed.predicates, vec![Predicate::eq("category", "sales")]);
    }

    #[test]
    fn test_operator_suffixes() {
        let parsed = parse_pairs(vec![("name$prefix", "Dur")]).unwrap();
        assert_eq!(parsed.predicates, vec![Predicate::prefix("name", "Dur")]);

        let parsed = parse_pairs(vec![("name$value", "Durian")]).unwrap();
        assert_eq!(parsed.predicates, vec![Predicate::eq("name", "Durian")]);
    }

    #[test]
    fn test_from_to_pairing() {
        let parsed = parse_pairs(vec![("a$from", "x"), ("a$to", "y")]).unwrap();
        assert_eq!(
            parsed.predicates,
            vec![Predicate::range(
                "a",
                Some(Key::from("x")),
                Some(Key::from("y"))
            )]
        );

        // Pairing is order-independent.
        let flipped = parse_pairs(vec![("a$to", "y"), ("a$from", "x")]).unwrap();
        assert_eq!(flipped.predicates, parsed.predicates);
    }

    #[test]
    fn test_half_open_ranges() {
        let parsed = parse_pairs(vec![("a$from", "x")]).unwrap();
        assert_eq!(
            parsed.predicates,
            vec![Predicate::range("a", Some(Key::from("x")), None)]
        );

        let parsed = parse_pairs(vec![("a$to", "y")]).unwrap();
        assert_eq!(
            parsed.predicates,
            vec![Predicate::range("a", None, Some(Key::from("y")))]
        );
    }

    #[test]
    fn test_pairing_is_per_target() {
        let parsed = parse_pairs(vec![("a$from", "1"), ("b$to", "2")]).unwrap();
        assert_eq!(parsed.predicates.len(), 2);
        assert_eq!(
            parsed.predicates[0],
            Predicate::range("a", Some(Key::from("1")), None)
        );
        assert_eq!(
            parsed.predicates[1],
            Predicate::range("b", None, Some(Key::from("2")))
        );
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let parsed = parse_pairs(vec![("category", "a"), ("category", "b")]).unwrap();
        assert_eq!(parsed.predicates, vec![Predicate::eq("category", "b")]);
    }

    #[test]
    fn test_controls_routed() {
        let parsed = parse_pairs(vec![
            ("$join", "or"),
            ("$from", "20"),
            ("$to", "30"),
            ("$limit", "10"),
            ("$format", "keys"),
            ("$orderBy", "value.title"),
        ])
        .unwrap();
        assert!(parsed.is_null_query());
        assert_eq!(parsed.controls.join, JoinMode::Or);
        assert_eq!(parsed.controls.from, Some(20));
        assert_eq!(parsed.controls.to, Some(30));
        assert_eq!(parsed.controls.limit, Some(10));
        assert_eq!(parsed.controls.format, OutputFormat::Keys);
        assert_eq!(
            parsed.controls.order_by.as_ref().map(|p| p.as_str()),
            Some("value.title")
        );
    }

    #[test]
    fn test_unknown_control_rejected() {
        let err = parse_pairs(vec![("$explain", "1")]).unwrap_err();
        assert_eq!(err, ParamError::MalformedKey("$explain".into()));
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = parse_pairs(vec![("name$contains", "x")]).unwrap_err();
        assert_eq!(
            err,
            ParamError::UnknownOperator {
                target: "name".into(),
                op: "contains".into()
            }
        );
    }

    #[test]
    fn test_bad_join_rejected() {
        let err = parse_pairs(vec![("$join", "xor")]).unwrap_err();
        assert_eq!(err, ParamError::InvalidJoin("xor".into()));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let err = parse_pairs(vec![("name$prefix", "")]).unwrap_err();
        assert_eq!(err, ParamError::EmptyPrefix("name".into()));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let err = parse_pairs(vec![("$from", "5"), ("$to", "2")]).unwrap_err();
        assert_eq!(err, ParamError::WindowInverted { from: 5, to: 2 });
    }

    #[test]
    fn test_malformed_target_rejected() {
        assert!(parse_pairs(vec![("9lives", "x")]).is_err());
        assert!(parse_pairs(vec![("a..b", "x")]).is_err());
        assert!(parse_pairs(vec![("", "x")]).is_err());
        assert!(parse_pairs(vec![("name$", "x")]).is_err());
    }

    #[test]
    fn test_dotted_target_with_operator() {
        let parsed = parse_pairs(vec![("value.title$prefix", "aa")]).unwrap();
        assert_eq!(
            parsed.predicates,
            vec![Predicate::prefix("value.title", "aa")]
        );
    }

    #[test]
    fn test_query_string_decoding() {
        let parsed =
            parse_query_string("?category=sales&name$prefix=Dur&$from=20&$limit=10").unwrap();
        assert_eq!(parsed.predicates.len(), 2);
        assert_eq!(parsed.controls.from, Some(20));
        assert_eq!(parsed.controls.limit, Some(10));
    }

    #[test]
    fn test_query_string_percent_and_plus() {
        let pairs = decode_query_string("name=Dur%C3%A9e+Ltd&x=a%24b").unwrap();
        assert_eq!(pairs[0], ("name".to_string(), "Durée Ltd".to_string()));
        assert_eq!(pairs[1], ("x".to_string(), "a$b".to_string()));
    }

    #[test]
    fn test_query_string_duplicates_last_wins() {
        let parsed = parse_query_string("a=1&a=2").unwrap();
        assert_eq!(parsed.predicates, vec![Predicate::eq("a", "2")]);
    }

    #[test]
    fn test_empty_query_string_is_null_query() {
        let parsed = parse_query_string("").unwrap();
        assert!(parsed.is_null_query());

        let parsed = parse_query_string("?").unwrap();
        assert!(parsed.is_null_query());
    }

    #[test]
    fn test_same_target_value_collision_keeps_both() {
        // Distinct keys, same target: two independent cursors.
        let parsed = parse_pairs(vec![("a", "1"), ("a$value", "2")]).unwrap();
        assert_eq!(parsed.predicates.len(), 2);
        assert!(parsed
            .predicates
            .iter()
            .all(|p| p.target == "a" && matches!(p.op, PredicateOp::Equal(_))));
    }
}
