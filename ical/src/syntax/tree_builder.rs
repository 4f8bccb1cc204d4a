// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tree builder for constructing component hierarchy from content lines.
//!
//! # Algorithm
//!
//! The tree builder uses a stack-based algorithm:
//! 1. On BEGIN:X, push a new component onto the stack
//! 2. On property, add to the current component (top of stack)
//! 3. On END:X, pop from stack and add to parent component

use crate::component::ComponentKind;
use crate::keyword::{KW_BEGIN, KW_END, KW_VCALENDAR};
use crate::parser::ParseError;
use crate::syntax::scanner::ContentLine;

/// Kinds accepted directly inside VCALENDAR.
const TOP_LEVEL: &[ComponentKind] = &[
    ComponentKind::VEvent,
    ComponentKind::VTodo,
    ComponentKind::VJournal,
    ComponentKind::VFreeBusy,
    ComponentKind::VTimeZone,
    ComponentKind::VAlarm,
];

/// The VCALENDAR object: calendar properties and top-level components.
#[derive(Debug, Clone, Default)]
pub struct RawCalendar<'src> {
    /// Calendar-level properties in original order
    pub properties: Vec<ContentLine<'src>>,
    /// Top-level components
    pub components: Vec<RawComponent<'src>>,
}

/// A component with its unresolved properties.
#[derive(Debug, Clone)]
pub struct RawComponent<'src> {
    /// Component kind
    pub kind: ComponentKind,
    /// Line of the BEGIN marker
    pub line: usize,
    /// Properties in original order
    pub properties: Vec<ContentLine<'src>>,
    /// Nested child components
    pub children: Vec<RawComponent<'src>>,
}

/// Build the component tree of one VCALENDAR object.
///
/// # Errors
///
/// Returns the first nesting error: fewer than three lines, a missing
/// `BEGIN:VCALENDAR` or `END:VCALENDAR`, an unknown component name, a
/// component nested where it is not allowed, or an END that does not match
/// the open BEGIN.
pub fn build_tree(lines: Vec<ContentLine<'_>>) -> Result<RawCalendar<'_>, ParseError> {
    if lines.len() < 3 {
        return Err(ParseError::TooShort { line: lines.len() });
    }

    let mut lines = lines.into_iter();
    match lines.next() {
        Some(first) if is_marker(&first, KW_BEGIN, KW_VCALENDAR) => {}
        _ => return Err(ParseError::MissingBegin { line: 1 }),
    }
    let last = match lines.next_back() {
        Some(last) if is_marker(&last, KW_END, KW_VCALENDAR) => last,
        Some(last) => return Err(ParseError::MissingEnd { line: last.line }),
        None => return Err(ParseError::MissingEnd { line: 1 }),
    };

    let mut calendar = RawCalendar::default();
    let mut stack: Vec<RawComponent<'_>> = Vec::new();

    for line in lines {
        if line.name.eq_ignore_ascii_case(KW_BEGIN) {
            let name = line.value.trim();
            let kind = begin_kind(name, stack.last(), line.line)?;
            stack.push(RawComponent {
                kind,
                line: line.line,
                properties: Vec::new(),
                children: Vec::new(),
            });
        } else if line.name.eq_ignore_ascii_case(KW_END) {
            let name = line.value.trim();
            let Some(component) = stack.pop() else {
                return Err(ParseError::UnmatchedEnd {
                    line: line.line,
                    name: name.to_owned(),
                });
            };
            if !component.kind.as_ref().eq_ignore_ascii_case(name) {
                return Err(ParseError::MismatchedEnd {
                    line: line.line,
                    expected: component.kind.to_string(),
                    found: name.to_owned(),
                });
            }
            match stack.last_mut() {
                Some(parent) => parent.children.push(component),
                None => calendar.components.push(component),
            }
        } else {
            match stack.last_mut() {
                Some(current) => current.properties.push(line),
                None => calendar.properties.push(line),
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::MismatchedEnd {
            line: last.line,
            expected: open.kind.to_string(),
            found: KW_VCALENDAR.to_owned(),
        });
    }
    Ok(calendar)
}

fn is_marker(line: &ContentLine<'_>, marker: &str, name: &str) -> bool {
    line.name.eq_ignore_ascii_case(marker) && line.value.trim().eq_ignore_ascii_case(name)
}

fn begin_kind(
    name: &str,
    parent: Option<&RawComponent<'_>>,
    line: usize,
) -> Result<ComponentKind, ParseError> {
    let parent_name = || parent.map_or(KW_VCALENDAR.to_owned(), |p| p.kind.to_string());
    if name.eq_ignore_ascii_case(KW_VCALENDAR) {
        return Err(ParseError::IllegalNesting {
            line,
            child: KW_VCALENDAR.to_owned(),
            parent: parent_name(),
        });
    }

    let kind: ComponentKind = name.parse().map_err(|_| ParseError::UnknownComponent {
        line,
        name: name.to_owned(),
    })?;
    let allowed = match parent {
        Some(parent) => parent.kind.sub_components().contains(&kind),
        None => TOP_LEVEL.contains(&kind),
    };
    if allowed {
        Ok(kind)
    } else {
        Err(ParseError::IllegalNesting {
            line,
            child: kind.to_string(),
            parent: parent_name(),
        })
    }
}
