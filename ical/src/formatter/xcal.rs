// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! xCal, the XML rendition of a calendar.
//!
//! Calendar properties become attributes of the `vcalendar` element. Every
//! component is an element named after its kind in lower case, and every
//! property an element holding its rendered value, with its parameters as
//! attributes. Lines are never folded.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::calendar::Calendar;
use crate::component::Component;
use crate::config::Newline;
use crate::formatter::value::format_value;
use crate::property::{Property, PropertyName};

const VCALENDAR: &str = "vcalendar";

/// Write a calendar as xCal.
pub fn write_xcal<W: Write>(w: W, calendar: &Calendar, newline: Newline) -> io::Result<()> {
    let mut writer = XCalWriter::new(w, newline);
    writer.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut vcalendar = BytesStart::new(VCALENDAR);
    for (name, property) in calendar.output_properties() {
        let value = render_values(&property);
        vcalendar.push_attribute((tag_name(&name).as_str(), value.as_str()));
    }
    writer.event(Event::Start(vcalendar))?;

    for component in calendar.stored() {
        writer.component(component)?;
    }
    writer.event(Event::End(BytesEnd::new(VCALENDAR)))
}

/// One element per line, each line ended by the configured terminator.
struct XCalWriter<W: Write> {
    inner: Writer<W>,
    newline: Newline,
}

impl<W: Write> XCalWriter<W> {
    fn new(w: W, newline: Newline) -> Self {
        Self {
            inner: Writer::new(w),
            newline,
        }
    }

    fn event(&mut self, event: Event<'_>) -> io::Result<()> {
        self.inner.write_event(event)?;
        self.end_line()
    }

    fn end_line(&mut self) -> io::Result<()> {
        self.inner.get_mut().write_all(self.newline.as_bytes())
    }

    fn component(&mut self, component: &Component) -> io::Result<()> {
        let kind = component.kind();
        let tag = kind.as_ref().to_ascii_lowercase();
        self.event(Event::Start(BytesStart::new(tag.as_str())))?;

        for name in kind.properties() {
            for property in component.get_properties(name) {
                self.property(name, property)?;
            }
        }
        for (name, property) in component.properties().iter() {
            if matches!(name, PropertyName::Extension(_)) {
                self.property(name, property)?;
            }
        }
        for sub in component.components() {
            self.component(sub)?;
        }

        self.event(Event::End(BytesEnd::new(tag)))
    }

    fn property(&mut self, name: &PropertyName, property: &Property) -> io::Result<()> {
        let tag = tag_name(name);
        let mut start = BytesStart::new(tag.as_str());
        for param in &property.parameters {
            let key = param.name.to_ascii_lowercase();
            let value = param.values.join(",");
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if property.is_empty() {
            return self.event(Event::Empty(start));
        }

        let value = render_values(property);
        self.inner.write_event(Event::Start(start))?;
        self.inner.write_event(Event::Text(BytesText::new(&value)))?;
        self.event(Event::End(BytesEnd::new(tag)))
    }
}

fn tag_name(name: &PropertyName) -> String {
    name.as_str().to_ascii_lowercase()
}

fn render_values(property: &Property) -> String {
    property
        .values
        .iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(",")
}
