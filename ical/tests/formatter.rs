// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the iCalendar formatter.

use calforge_ical::{
    Calendar, CalendarConfig, Component, ComponentKind, FormatOptions, Newline, OutputFormat,
    PropertyName, format, format_component, formatter::FoldingStyle, parse_str,
};

const SIMPLE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp.//Cal Client 1.0//EN\r\n\
BEGIN:VEVENT\r\n\
UID:12345@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART:20250110T140000Z\r\n\
DTEND:20250110T150000Z\r\n\
SUMMARY:Test Event\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

fn long_event() -> Component {
    let mut event = Component::new(ComponentKind::VEvent);
    event.set_text(PropertyName::Uid, "long@example.com").unwrap();
    event
        .set_text(
            PropertyName::Description,
            "Zürich, Genève; Köln and 東京 ".repeat(12).trim_end(),
        )
        .unwrap();
    event
}

#[test]
fn test_format_simple_event() {
    let calendar = parse_str(SIMPLE, CalendarConfig::default()).unwrap();
    let formatted = format(&calendar).unwrap();

    assert!(formatted.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(formatted.contains("VERSION:2.0\r\n"));
    assert!(formatted.contains("PRODID:-//Example Corp.//Cal Client 1.0//EN\r\n"));
    assert!(formatted.contains("CALSCALE:GREGORIAN\r\n"));
    assert!(formatted.contains("UID:12345@example.com\r\n"));
    assert!(formatted.contains("SUMMARY:Test Event\r\n"));
    assert!(formatted.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
}

#[test]
fn test_every_physical_line_fits() {
    let mut calendar = Calendar::new(CalendarConfig::default());
    calendar.add_component(long_event());
    let formatted = format(&calendar).unwrap();

    let lines: Vec<&str> = formatted.split("\r\n").collect();
    assert!(lines.iter().any(|l| l.starts_with(' ')), "nothing was folded");
    for line in &lines {
        assert!(line.len() <= 75, "{line:?} is {} octets", line.len());
    }

    // unfolding restores the logical lines
    let unfolded = formatted.replace("\r\n ", "");
    let reparsed = parse_str(&unfolded, CalendarConfig::default()).unwrap();
    assert_eq!(format(&reparsed).unwrap(), formatted);
}

#[test]
fn test_config_controls_output() {
    let config = CalendarConfig::default()
        .unique_id("example.com")
        .language("en")
        .newline(Newline::Lf)
        .folding(None);
    let mut calendar = Calendar::new(config);
    calendar.add_component(long_event());
    let formatted = format(&calendar).unwrap();

    assert!(!formatted.contains('\r'));
    assert!(formatted.contains(&format!(
        "PRODID:-//example.com//NONSGML calforge {}//EN\n",
        env!("CARGO_PKG_VERSION")
    )));
    assert!(formatted.lines().any(|l| l.len() > 75));
}

#[test]
fn test_format_options_write() {
    let calendar = parse_str(SIMPLE, CalendarConfig::default()).unwrap();
    let options = FormatOptions::default()
        .folding(Some(20))
        .folding_style(FoldingStyle::Tab);

    let mut out = Vec::new();
    options.write(&calendar, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\r\n\t"));
    assert_eq!(text.replace("\r\n\t", ""), format(&calendar).unwrap());
}

#[test]
fn test_format_component() {
    let mut alarm = Component::new(ComponentKind::VAlarm);
    alarm.set_text(PropertyName::Action, "DISPLAY").unwrap();
    alarm.set_text(PropertyName::Description, "Wake up").unwrap();

    let text = format_component(&alarm, FormatOptions::default()).unwrap();
    assert_eq!(
        text,
        "BEGIN:VALARM\r\nACTION:DISPLAY\r\nDESCRIPTION:Wake up\r\nEND:VALARM\r\n"
    );
}

#[test]
fn test_xcal_output() {
    let config = CalendarConfig::default().format(OutputFormat::XCal);
    let calendar = parse_str(SIMPLE, config).unwrap();
    let xml = format(&calendar).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<vcalendar"));
    assert!(xml.contains(" version=\"2.0\""));
    assert!(xml.contains("<vevent>\r\n"));
    assert!(xml.contains("<uid>12345@example.com</uid>\r\n"));
    assert!(xml.contains("<dtstart>20250110T140000Z</dtstart>\r\n"));
    assert!(xml.ends_with("</vevent>\r\n</vcalendar>\r\n"));
}
