// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! From raw lines to a [`Calendar`].
//!
//! ```text
//! Raw Lines → Unfold → Scan → Tree Builder → Typed Properties → Calendar
//! ```

use crate::calendar::Calendar;
use crate::component::Component;
use crate::config::CalendarConfig;
use crate::keyword::{KW_DATE, KW_VALUE, KW_VCALENDAR};
use crate::parameter::Parameters;
use crate::property::{PropertyError, PropertyName};
use crate::syntax::{ContentLine, RawComponent, build_tree, scan_line, unfold};
use crate::value::{Value, ValueError, ValueKind, parse_value, parse_values};

/// Parse an iCalendar object from raw lines.
///
/// Lines may still be folded and may end in `\r`. Every parsed component is
/// added through [`Calendar::add_component`], so it gains a UID and DTSTAMP
/// when it lacks them.
///
/// # Errors
///
/// Returns the first [`ParseError`] found, carrying its logical line number.
///
/// # Examples
///
/// ```
/// # use calforge_ical::{CalendarConfig, parse};
/// let lines = [
///     "BEGIN:VCALENDAR",
///     "BEGIN:VEVENT",
///     "SUMMARY:Test Event",
///     "END:VEVENT",
///     "END:VCALENDAR",
/// ];
/// let calendar = parse(lines, CalendarConfig::default()).unwrap();
/// assert_eq!(calendar.len(), 1);
/// ```
///
/// Malformed input reports where it went wrong:
///
/// ```
/// # use calforge_ical::{CalendarConfig, ParseError, parse};
/// let lines = ["BEGIN:VCALENDAR", "BEGIN:VEVENT", "END:VCALENDAR", "END:VEVENT"];
/// let err = parse(lines, CalendarConfig::default()).unwrap_err();
/// assert_eq!(err.line(), 4);
/// ```
#[tracing::instrument(skip_all)]
pub fn parse<I, S>(lines: I, config: CalendarConfig) -> Result<Calendar, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let logical = unfold(lines);
    let content = logical
        .iter()
        .map(scan_line)
        .collect::<Result<Vec<_>, _>>()?;
    let raw = build_tree(content)?;

    let allow_empty = config.allow_empty;
    let mut calendar = Calendar::new(config);
    for line in &raw.properties {
        let name = resolve_name(line, KW_VCALENDAR, Calendar::declares)?;
        let (values, params) = parse_property(&name, line)?;
        calendar
            .set_property(name, values, params)
            .map_err(|source| ParseError::Property {
                line: line.line,
                source,
            })?;
    }

    let mut properties = raw.properties.len();
    for raw_component in raw.components {
        let component = build_component(raw_component, allow_empty, &mut properties)?;
        calendar.add_component(component);
    }

    tracing::debug!(
        lines = logical.len(),
        components = calendar.len(),
        properties,
        "parsed calendar"
    );
    Ok(calendar)
}

/// Parse an iCalendar object held in one string.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_str(src: &str, config: CalendarConfig) -> Result<Calendar, ParseError> {
    parse(src.lines(), config)
}

fn build_component(
    raw: RawComponent<'_>,
    allow_empty: bool,
    properties: &mut usize,
) -> Result<Component, ParseError> {
    let kind = raw.kind;
    let mut component = Component::new(kind).with_allow_empty(allow_empty);
    for line in &raw.properties {
        let name = resolve_name(line, kind.as_ref(), |n| kind.declares(n))?;
        let (values, params) = parse_property(&name, line)?;
        component
            .set_property(name, values, params)
            .map_err(|source| ParseError::Property {
                line: line.line,
                source,
            })?;
    }
    *properties += raw.properties.len();

    for child in raw.children {
        let (line, child_kind) = (child.line, child.kind);
        let child = build_component(child, allow_empty, properties)?;
        component
            .add_component(child)
            .map_err(|_| ParseError::IllegalNesting {
                line,
                child: child_kind.to_string(),
                parent: kind.to_string(),
            })?;
    }
    Ok(component)
}

fn resolve_name(
    line: &ContentLine<'_>,
    component: &str,
    declared: impl Fn(&PropertyName) -> bool,
) -> Result<PropertyName, ParseError> {
    let unknown = || ParseError::UnknownProperty {
        line: line.line,
        name: line.name.to_ascii_uppercase(),
        component: component.to_owned(),
    };
    let name: PropertyName = line.name.parse().map_err(|_| unknown())?;
    if declared(&name) {
        Ok(name)
    } else {
        Err(unknown())
    }
}

/// Typed values and normalized parameters of one content line.
fn parse_property(
    name: &PropertyName,
    line: &ContentLine<'_>,
) -> Result<(Vec<Value>, Parameters), ParseError> {
    let mut params = Parameters::new();
    for param in &line.parameters {
        params.set(param.name, param.values.iter().map(|v| v.value));
    }

    if line.value.is_empty() {
        return Ok((Vec::new(), params));
    }

    // An unknown or unacceptable VALUE falls back to the property default
    let explicit = params
        .value(KW_VALUE)
        .and_then(|v| v.parse::<ValueKind>().ok())
        .filter(|&k| name.accepts(k));
    let kind = explicit.unwrap_or_else(|| name.default_kind());

    let values = match parse_typed(name, kind, line.value) {
        // A bare date where a date-time is expected reads as a DATE value
        Err(error)
            if explicit.is_none()
                && kind == ValueKind::DateTime
                && name.accepts(ValueKind::Date) =>
        {
            match parse_typed(name, ValueKind::Date, line.value) {
                Ok(dates) => {
                    params.set(KW_VALUE, [KW_DATE]);
                    Ok(dates)
                }
                Err(_) => Err(error),
            }
        }
        result => result,
    }
    .map_err(|source| ParseError::InvalidValue {
        line: line.line,
        source,
    })?;
    Ok((values, params))
}

fn parse_typed(
    name: &PropertyName,
    kind: ValueKind,
    src: &str,
) -> Result<Vec<Value>, ValueError> {
    let multi = name.is_list()
        || matches!(
            kind,
            ValueKind::Date | ValueKind::DateTime | ValueKind::Period
        );
    if multi {
        parse_values(kind, src)
    } else {
        parse_value(kind, src).map(|v| vec![v])
    }
}

/// Errors that can occur during parsing.
///
/// Every variant carries the 1-based logical line number.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Fewer than three logical lines
    #[error("line {line}: a calendar needs at least three lines")]
    TooShort {
        /// Line number
        line: usize,
    },

    /// The first line is not `BEGIN:VCALENDAR`
    #[error("line {line}: expected BEGIN:VCALENDAR")]
    MissingBegin {
        /// Line number
        line: usize,
    },

    /// The last line is not `END:VCALENDAR`
    #[error("line {line}: expected END:VCALENDAR")]
    MissingEnd {
        /// Line number
        line: usize,
    },

    /// An END that closes a different component than the open one
    #[error("line {line}: END:{found} does not close BEGIN:{expected}")]
    MismatchedEnd {
        /// Line number
        line: usize,
        /// Name of the open component
        expected: String,
        /// Name found after END
        found: String,
    },

    /// An END with no open component
    #[error("line {line}: END:{name} without a matching BEGIN")]
    UnmatchedEnd {
        /// Line number
        line: usize,
        /// Name found after END
        name: String,
    },

    /// A BEGIN naming no known component
    #[error("line {line}: unknown component {name}")]
    UnknownComponent {
        /// Line number
        line: usize,
        /// Name found after BEGIN
        name: String,
    },

    /// A component nested where it is not allowed
    #[error("line {line}: {child} cannot be nested in {parent}")]
    IllegalNesting {
        /// Line number
        line: usize,
        /// The nested component
        child: String,
        /// The enclosing component
        parent: String,
    },

    /// A line that is not `name *(";" param) ":" value`
    #[error("line {line}: malformed content line: {reason}")]
    MalformedLine {
        /// Line number
        line: usize,
        /// What is missing or wrong
        reason: String,
    },

    /// A property the enclosing component does not declare
    #[error("line {line}: property {name} is not allowed in {component}")]
    UnknownProperty {
        /// Line number
        line: usize,
        /// Property name, upper case
        name: String,
        /// Enclosing component
        component: String,
    },

    /// A value that does not match its kind
    #[error("line {line}: {source}")]
    InvalidValue {
        /// Line number
        line: usize,
        /// The value error
        source: ValueError,
    },

    /// A property rejected by the component
    #[error("line {line}: {source}")]
    Property {
        /// Line number
        line: usize,
        /// The property error
        source: PropertyError,
    },
}

impl ParseError {
    /// The 1-based logical line the error refers to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::TooShort { line }
            | Self::MissingBegin { line }
            | Self::MissingEnd { line }
            | Self::MismatchedEnd { line, .. }
            | Self::UnmatchedEnd { line, .. }
            | Self::UnknownComponent { line, .. }
            | Self::IllegalNesting { line, .. }
            | Self::MalformedLine { line, .. }
            | Self::UnknownProperty { line, .. }
            | Self::InvalidValue { line, .. }
            | Self::Property { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ComponentSelector;
    use crate::component::ComponentKind;

    use super::*;

    fn parse_src(src: &str) -> Result<Calendar, ParseError> {
        parse_str(src, CalendarConfig::default())
    }

    #[test]
    fn parses_typed_properties() {
        let src = "\
BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Example//EN
BEGIN:VEVENT
UID:1@example.com
DTSTART;VALUE=DATE:20240105
CATEGORIES:WORK,Team\\, B
SUMMARY:Plan\\; review
PRIORITY:5
END:VEVENT
END:VCALENDAR";
        let calendar = parse_src(src).unwrap();
        let event = calendar.get_component(&ComponentSelector::Index(1)).unwrap();
        assert_eq!(event.kind(), ComponentKind::VEvent);
        assert_eq!(event.uid(), Some("1@example.com"));
        assert_eq!(event.summary(), Some("Plan; review"));
        assert!(event.dtstart().unwrap().is_date());

        let categories = event.get_property(&PropertyName::Categories, None).unwrap();
        let texts: Vec<_> = categories.values.iter().filter_map(Value::as_text).collect();
        assert_eq!(texts, ["WORK", "Team, B"]);

        let priority = event.get_property(&PropertyName::Priority, None).unwrap();
        assert_eq!(priority.value().and_then(Value::as_integer), Some(5));
    }

    #[test]
    fn unknown_value_parameter_falls_back() {
        let src = "\
BEGIN:VCALENDAR
BEGIN:VEVENT
DTSTART;VALUE=SOMETHING:20240105T100000Z
END:VEVENT
END:VCALENDAR";
        let calendar = parse_src(src).unwrap();
        let event = calendar.get_component(&ComponentSelector::Index(1)).unwrap();
        let dtstart = event.get_property(&PropertyName::DtStart, None).unwrap();
        assert!(matches!(dtstart.value(), Some(Value::DateTime(_))));
        assert_eq!(dtstart.parameters.value(KW_VALUE), None);
    }

    #[test]
    fn reports_line_numbers() {
        #[rustfmt::skip]
        let cases: [(&str, usize, fn(&ParseError) -> bool); 4] = [
            ("BEGIN:VCALENDAR\nBEGIN:VEVENT\nDTSTART:tomorrow\nEND:VEVENT\nEND:VCALENDAR",
                3, |e| matches!(e, ParseError::InvalidValue { .. })),
            ("BEGIN:VCALENDAR\nBEGIN:VEVENT\nTZOFFSETTO:+0100\nEND:VEVENT\nEND:VCALENDAR",
                3, |e| matches!(e, ParseError::UnknownProperty { .. })),
            ("BEGIN:VCALENDAR\nBEGIN:VTODO\nFOO:bar\nEND:VTODO\nEND:VCALENDAR",
                3, |e| matches!(e, ParseError::UnknownProperty { .. })),
            ("BEGIN:VCALENDAR\nSUMMARY:x\nBEGIN:VEVENT\nEND:VEVENT\nEND:VCALENDAR",
                2, |e| matches!(e, ParseError::UnknownProperty { .. })),
        ];
        for (src, line, check) in cases {
            let err = parse_src(src).unwrap_err();
            assert!(check(&err), "{src:?}: {err:?}");
            assert_eq!(err.line(), line, "{src:?}");
        }
    }

    #[test]
    fn empty_values_follow_config() {
        let src = "\
BEGIN:VCALENDAR
BEGIN:VEVENT
LOCATION:
END:VEVENT
END:VCALENDAR";
        let calendar = parse_src(src).unwrap();
        let event = calendar.get_component(&ComponentSelector::Index(1)).unwrap();
        let location = event.get_property(&PropertyName::Location, None).unwrap();
        assert!(location.is_empty());

        let strict = CalendarConfig::default().allow_empty(false);
        let err = parse_str(src, strict).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Property {
                line: 3,
                source: PropertyError::EmptyValue { .. }
            }
        ));
    }
}
