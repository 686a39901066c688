//! Mini-languages accepted by the operators: field paths, order specs,
//! join specs, placements, and column lists.
//!
//! Grammar:
//! - field path: `.` or `name(.name)*`
//! - order spec: `field [asc|desc] (, field [asc|desc])*`
//! - join spec:  `leftField = rightField`
//! - placement:  `left | right | inner | outer`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPath {
    /// `.`: the element itself.
    Whole,
    /// One or more names, each resolved with promoted-field lookup.
    Named(Vec<String>),
}

impl FieldPath {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "." {
            return Ok(FieldPath::Whole);
        }
        if s.is_empty() {
            return Err(Error::Config("empty field path".into()));
        }
        let segments = s
            .split('.')
            .map(|seg| {
                let seg = seg.trim();
                if seg.is_empty() {
                    Err(Error::Config(format!("malformed field path '{}'", s)))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FieldPath::Named(segments))
    }

    pub fn is_whole(&self) -> bool {
        matches!(self, FieldPath::Whole)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Whole => f.write_str("."),
            FieldPath::Named(segments) => f.write_str(&segments.join(".")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKey {
    pub path: FieldPath,
    pub ascending: bool,
}

/// Sort keys in priority order (first clause is the primary key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub keys: Vec<OrderKey>,
}

impl OrderSpec {
    pub fn parse(s: &str) -> Result<Self> {
        let mut keys = Vec::new();
        for clause in s.split(',') {
            let words: Vec<&str> = clause.split_whitespace().collect();
            let (name, ascending) = match words.as_slice() {
                [name] => (*name, true),
                [name, dir] => match dir.to_ascii_lowercase().as_str() {
                    "asc" => (*name, true),
                    "desc" => (*name, false),
                    other => {
                        return Err(Error::Config(format!(
                            "unknown sort direction '{}' in '{}'",
                            other, s
                        )))
                    }
                },
                [] => return Err(Error::Config(format!("empty sort clause in '{}'", s))),
                _ => {
                    return Err(Error::Config(format!(
                        "malformed sort clause '{}'",
                        clause.trim()
                    )))
                }
            };
            keys.push(OrderKey {
                path: FieldPath::parse(name)?,
                ascending,
            });
        }
        Ok(Self { keys })
    }

    /// Single ascending key; the join engine orders its right side with this.
    pub fn ascending(path: FieldPath) -> Self {
        Self {
            keys: vec![OrderKey {
                path,
                ascending: true,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub left: FieldPath,
    pub right: FieldPath,
}

impl JoinSpec {
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('=').collect();
        if parts.len() != 2 {
            return Err(Error::Config(format!(
                "join spec '{}' must have exactly one '='",
                s
            )));
        }
        Ok(Self {
            left: FieldPath::parse(parts[0])?,
            right: FieldPath::parse(parts[1])?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Left,
    Right,
    Inner,
    Outer,
}

impl Placement {
    pub fn keeps_unmatched_left(self) -> bool {
        matches!(self, Placement::Left | Placement::Outer)
    }

    pub fn keeps_unmatched_right(self) -> bool {
        matches!(self, Placement::Right | Placement::Outer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Left => "left",
            Placement::Right => "right",
            Placement::Inner => "inner",
            Placement::Outer => "outer",
        }
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Placement::Left),
            "right" => Ok(Placement::Right),
            "inner" => Ok(Placement::Inner),
            "outer" => Ok(Placement::Outer),
            _ => Err(Error::Config(format!("invalid join placement [{}]", s.trim()))),
        }
    }
}

/// Comma-separated concrete field names (used by distinct). `.` is rejected.
pub fn parse_columns(s: &str) -> Result<Vec<FieldPath>> {
    let mut out = Vec::new();
    for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let path = FieldPath::parse(name)?;
        if path.is_whole() {
            return Err(Error::Config(format!(
                "column list '{}' must name concrete fields, not '.'",
                s
            )));
        }
        out.push(path);
    }
    if out.is_empty() {
        return Err(Error::Config(format!("column list '{}' is empty", s)));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_spec_defaults_to_ascending() {
        let spec = OrderSpec::parse(" Age desc ,Name,  . ASC").expect("parse");
        assert_eq!(
            spec.keys,
            vec![
                OrderKey {
                    path: FieldPath::Named(vec!["Age".into()]),
                    ascending: false
                },
                OrderKey {
                    path: FieldPath::Named(vec!["Name".into()]),
                    ascending: true
                },
                OrderKey {
                    path: FieldPath::Whole,
                    ascending: true
                },
            ]
        );
    }

    #[test]
    fn order_spec_rejects_garbage() {
        assert!(OrderSpec::parse("Age sideways").is_err());
        assert!(OrderSpec::parse("Age,,Name").is_err());
        assert!(OrderSpec::parse("Age asc extra").is_err());
        assert!(OrderSpec::parse("").is_err());
    }

    #[test]
    fn field_path_segments() {
        assert_eq!(
            FieldPath::parse(" Address.City ").expect("parse"),
            FieldPath::Named(vec!["Address".into(), "City".into()])
        );
        assert!(FieldPath::parse("Address.").is_err());
        assert_eq!(FieldPath::parse(".").expect("parse").to_string(), ".");
    }

    #[test]
    fn join_spec_requires_single_equals() {
        let spec = JoinSpec::parse(" UserId = ClientId ").expect("parse");
        assert_eq!(spec.left, FieldPath::Named(vec!["UserId".into()]));
        assert_eq!(spec.right, FieldPath::Named(vec!["ClientId".into()]));
        assert!(JoinSpec::parse("UserId").is_err());
        assert!(JoinSpec::parse("a = b = c").is_err());
        assert!(JoinSpec::parse(" = b").is_err());
    }

    #[test]
    fn placement_is_case_insensitive() {
        assert_eq!(" LEFT ".parse::<Placement>().unwrap(), Placement::Left);
        assert_eq!("Outer".parse::<Placement>().unwrap(), Placement::Outer);
        assert!("cross".parse::<Placement>().is_err());
        assert!(Placement::Outer.keeps_unmatched_left());
        assert!(Placement::Outer.keeps_unmatched_right());
        assert!(!Placement::Inner.keeps_unmatched_left());
        assert!(!Placement::Left.keeps_unmatched_right());
    }

    #[test]
    fn columns_reject_whole_element() {
        assert_eq!(parse_columns("A, B").expect("parse").len(), 2);
        assert!(parse_columns(".").is_err());
        assert!(parse_columns(" , ").is_err());
    }
}
