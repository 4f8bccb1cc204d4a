// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Component formatting for iCalendar components.
//!
//! Properties are written in the fixed order of their component kind,
//! followed by extension properties in insertion order, then subcomponents.

use std::io::{self, Write};

use crate::calendar::Calendar;
use crate::component::Component;
use crate::formatter::Formatter;
use crate::formatter::property::{write_properties, write_property};
use crate::keyword::{KW_BEGIN, KW_END, KW_VCALENDAR};
use crate::property::PropertyName;

/// Format a calendar: its own properties, then every component.
pub fn write_calendar<W: Write>(f: &mut Formatter<W>, calendar: &Calendar) -> io::Result<()> {
    with_block(f, KW_VCALENDAR, |f| {
        for (name, property) in calendar.output_properties() {
            write_property(f, &name, &property)?;
        }
        for component in calendar.stored() {
            write_component(f, component)?;
        }
        Ok(())
    })
}

/// Format one component and its subcomponents.
pub fn write_component<W: Write>(f: &mut Formatter<W>, component: &Component) -> io::Result<()> {
    let kind = component.kind();
    with_block(f, kind.as_ref(), |f| {
        for name in kind.properties() {
            write_properties(f, name, component.get_properties(name))?;
        }

        // X-properties
        for (name, property) in component.properties().iter() {
            if matches!(name, PropertyName::Extension(_)) {
                write_property(f, name, property)?;
            }
        }

        for sub in component.components() {
            write_component(f, sub)?;
        }
        Ok(())
    })
}

fn with_block<W: Write, F: FnOnce(&mut Formatter<W>) -> io::Result<()>>(
    f: &mut Formatter<W>,
    name: &str,
    write_content: F,
) -> io::Result<()> {
    write!(f, "{KW_BEGIN}:{name}")?;
    f.writeln()?;

    write_content(f)?;

    write!(f, "{KW_END}:{name}")?;
    f.writeln()
}
