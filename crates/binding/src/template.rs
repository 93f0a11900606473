//! URL path templates with `{object.field}` placeholders.
//!
//! A template is parsed once when its route table is built. Resolving it
//! against a call's arguments either substitutes every placeholder or fails;
//! there are no defaults.

use std::collections::BTreeMap;

use crate::{ArgumentError, ConfigurationError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed path template such as `/channels/{channel.id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses `raw`, rejecting empty templates, templates that do not start
    /// with `/`, unbalanced braces, and empty or malformed placeholder names.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidTemplate {
            template: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("template is empty"));
        }
        if !raw.starts_with('/') {
            return Err(invalid("template must start with '/'"));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid("nested '{' in placeholder")),
                            _ => name.push(c),
                        }
                    }
                    if !closed {
                        return Err(invalid("unclosed placeholder"));
                    }
                    if name.is_empty() {
                        return Err(invalid("empty placeholder"));
                    }
                    if name.chars().any(|c| c == '/' || c.is_whitespace()) {
                        return Err(invalid("placeholder names cannot contain '/' or whitespace"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => return Err(invalid("unmatched '}'")),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in left-to-right order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder, left to right.
    ///
    /// A named argument keyed by the placeholder's name wins; otherwise the
    /// next positional argument is consumed. Positional arguments left over
    /// once every placeholder is filled are an error.
    ///
    /// Values are percent-encoded, so `/`, `?` and `#` stay inside the
    /// placeholder's segment. Empty, `.` and `..` values are rejected.
    pub fn resolve(
        &self,
        positional: &[String],
        named: &BTreeMap<String, String>,
    ) -> Result<String, ArgumentError> {
        let mut remaining = positional.iter();
        let mut path = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Placeholder(name) => {
                    let value = named
                        .get(name)
                        .or_else(|| remaining.next())
                        .ok_or_else(|| ArgumentError::MissingPathParameter {
                            placeholder: name.clone(),
                            template: self.raw.clone(),
                        })?;
                    if matches!(value.as_str(), "" | "." | "..") {
                        return Err(ArgumentError::InvalidPathParameter {
                            placeholder: name.clone(),
                            template: self.raw.clone(),
                            value: value.clone(),
                        });
                    }
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }

        let unused = remaining.count();
        if unused > 0 {
            return Err(ArgumentError::TooManyArguments {
                template: self.raw.clone(),
                unused,
            });
        }
        Ok(path)
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn params(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn resolves_positional_placeholders_left_to_right() {
        let t = PathTemplate::parse("/channels/{channel.id}/pins/{message.id}").unwrap();
        assert_eq!(
            t.placeholders().collect::<Vec<_>>(),
            ["channel.id", "message.id"]
        );
        let path = t.resolve(&params(&["10", "20"]), &BTreeMap::new()).unwrap();
        assert_eq!(path, "/channels/10/pins/20");
    }

    #[test]
    fn named_arguments_take_precedence() {
        let t = PathTemplate::parse("/channels/{channel.id}/messages/{message.id}").unwrap();
        let named = BTreeMap::from([("channel.id".to_string(), "7".to_string())]);
        let path = t.resolve(&params(&["99"]), &named).unwrap();
        assert_eq!(path, "/channels/7/messages/99");
    }

    #[test]
    fn placeholder_in_the_middle_of_a_segment() {
        let t = PathTemplate::parse("/a/{x}/b").unwrap();
        assert_eq!(t.resolve(&params(&["42"]), &BTreeMap::new()).unwrap(), "/a/42/b");
    }

    #[test]
    fn missing_argument_is_an_error() {
        let t = PathTemplate::parse("/channels/{channel.id}/messages/{message.id}").unwrap();
        let err = t.resolve(&params(&["1"]), &BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::MissingPathParameter {
                placeholder: "message.id".into(),
                template: "/channels/{channel.id}/messages/{message.id}".into(),
            }
        );
    }

    #[test]
    fn leftover_arguments_are_an_error() {
        let t = PathTemplate::parse("/getMe").unwrap();
        let err = t.resolve(&params(&["x", "y"]), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ArgumentError::TooManyArguments { unused: 2, .. }));
    }

    #[test]
    fn values_cannot_leave_their_segment() {
        let t = PathTemplate::parse("/channels/{channel.id}/messages/{message.id}").unwrap();
        let path = t
            .resolve(&params(&["../../users/@me", "1?x=#y"]), &BTreeMap::new())
            .unwrap();
        assert_eq!(
            path,
            "/channels/..%2F..%2Fusers%2F%40me/messages/1%3Fx%3D%23y"
        );

        for value in ["..", ".", ""] {
            let err = t.resolve(&params(&[value, "1"]), &BTreeMap::new()).unwrap_err();
            assert_eq!(
                err,
                ArgumentError::InvalidPathParameter {
                    placeholder: "channel.id".into(),
                    template: t.as_str().into(),
                    value: value.into(),
                }
            );
        }
    }

    #[test]
    fn malformed_templates_are_rejected() {
        for raw in ["", "channels", "/a/{x", "/a/{}/b", "/a/x}", "/a/{x{y}}", "/a/{x y}"] {
            assert!(
                matches!(
                    PathTemplate::parse(raw),
                    Err(ConfigurationError::InvalidTemplate { .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }
}
