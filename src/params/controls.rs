//! Control parameters.
//!
//! `$`-prefixed parameters steer execution rather than filter records:
//! join mode, the paging window, the output format and the sort path.

use crate::path::Path;

use super::errors::{ParamError, ParamResult};

/// How multiple predicates combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinMode {
    /// Intersection of all predicate streams.
    #[default]
    And,
    /// Union of all predicate streams.
    Or,
}

impl JoinMode {
    /// Parses a `$join` value. Anything but `and`/`or` fails loudly.
    pub fn parse(value: &str) -> ParamResult<Self> {
        match value {
            "and" => Ok(JoinMode::And),
            "or" => Ok(JoinMode::Or),
            other => Err(ParamError::InvalidJoin(other.to_string())),
        }
    }

    /// The wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinMode::And => "and",
            JoinMode::Or => "or",
        }
    }
}

/// The requested output shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Matching records, in join order.
    #[default]
    Records,
    /// Primary keys only.
    Keys,
    /// Map from primary-key string form to record.
    Lookup,
}

impl OutputFormat {
    /// Parses a `$format` value.
    pub fn parse(value: &str) -> ParamResult<Self> {
        match value {
            "records" => Ok(OutputFormat::Records),
            "keys" => Ok(OutputFormat::Keys),
            "lookup" => Ok(OutputFormat::Lookup),
            other => Err(ParamError::InvalidFormat(other.to_string())),
        }
    }

    /// The wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Records => "records",
            OutputFormat::Keys => "keys",
            OutputFormat::Lookup => "lookup",
        }
    }
}

/// The full control set of one query.
#[derive(Debug, Clone, Default)]
pub struct Controls {
    /// Join mode, `and` unless overridden.
    pub join: JoinMode,
    /// Skip this many matches before emitting.
    pub from: Option<u64>,
    /// Stop once the match counter passes this offset.
    ///
    /// `$to` is counted against emitted matches, not used as a key-range
    /// bound: with `$from=a` and `$to=b` the result covers match offsets
    /// `a..=b`.
    pub to: Option<u64>,
    /// Hard cap on the result length.
    pub limit: Option<u64>,
    /// Output shape, `records` unless overridden.
    pub format: OutputFormat,
    /// Re-sort the result by the value at this record path.
    pub order_by: Option<Path>,
}

impl Controls {
    /// Cross-field validation, once all controls are routed.
    pub fn validate(&self) -> ParamResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                return Err(ParamError::WindowInverted { from, to });
            }
        }
        Ok(())
    }
}

/// Parses a non-negative integer control value.
pub(super) fn parse_nat(control: &'static str, value: &str) -> ParamResult<u64> {
    // `u64::from_str` accepts a leading '+', which the wire grammar does not.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParamError::InvalidNumber {
            control,
            value: value.to_string(),
        });
    }
    value.parse().map_err(|_| ParamError::InvalidNumber {
        control,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_parse() {
        assert_eq!(JoinMode::parse("and").unwrap(), JoinMode::And);
        assert_eq!(JoinMode::parse("or").unwrap(), JoinMode::Or);
        assert_eq!(
            JoinMode::parse("xor").unwrap_err(),
            ParamError::InvalidJoin("xor".into())
        );
        // No silent default for the empty string either.
        assert!(JoinMode::parse("").is_err());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("records").unwrap(), OutputFormat::Records);
        assert_eq!(OutputFormat::parse("keys").unwrap(), OutputFormat::Keys);
        assert_eq!(OutputFormat::parse("lookup").unwrap(), OutputFormat::Lookup);
        assert!(OutputFormat::parse("rows").is_err());
    }

    #[test]
    fn test_defaults() {
        let controls = Controls::default();
        assert_eq!(controls.join, JoinMode::And);
        assert_eq!(controls.format, OutputFormat::Records);
        assert!(controls.from.is_none());
        assert!(controls.order_by.is_none());
    }

    #[test]
    fn test_parse_nat() {
        assert_eq!(parse_nat("$limit", "0").unwrap(), 0);
        assert_eq!(parse_nat("$limit", "42").unwrap(), 42);
        assert!(parse_nat("$limit", "-1").is_err());
        assert!(parse_nat("$limit", "+1").is_err());
        assert!(parse_nat("$limit", "abc").is_err());
        assert!(parse_nat("$limit", "").is_err());
    }

    #[test]
    fn test_window_validation() {
        let controls = Controls {
            from: Some(5),
            to: Some(2),
            ..Default::default()
        };
        assert_eq!(
            controls.validate().unwrap_err(),
            ParamError::WindowInverted { from: 5, to: 2 }
        );

        let controls = Controls {
            from: Some(2),
            to: Some(5),
            ..Default::default()
        };
        assert!(controls.validate().is_ok());
    }
}
