// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property formatting for iCalendar content lines.
//!
//! A property is written as `NAME;PARAM=...:value[,value...]`. The
//! allow-empty placeholder is written as `NAME:` with nothing after the colon.

use std::io::{self, Write};

use crate::formatter::Formatter;
use crate::formatter::parameter::write_parameters;
use crate::formatter::value::write_value;
use crate::property::{Property, PropertyName};

/// Format one property as a complete content line.
pub fn write_property<W: Write>(
    f: &mut Formatter<W>,
    name: &PropertyName,
    property: &Property,
) -> io::Result<()> {
    write!(f, "{name}")?;
    write_parameters(f, &property.parameters)?;
    write!(f, ":")?;
    for (i, value) in property.values.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write_value(f, value)?;
    }
    f.writeln()
}

/// Format every instance of a property, in order.
pub fn write_properties<W: Write>(
    f: &mut Formatter<W>,
    name: &PropertyName,
    properties: &[Property],
) -> io::Result<()> {
    for property in properties {
        write_property(f, name, property)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::formatter::FormatOptions;
    use crate::parameter::Parameters;
    use crate::value::{Value, ValueDate};

    use super::*;

    fn render(name: &PropertyName, property: &Property) -> String {
        let mut buffer = Vec::new();
        let mut f = Formatter::new(&mut buffer, FormatOptions::default());
        write_property(&mut f, name, property).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn writes_content_line() {
        let property = Property::new(Value::Text("Team, weekly; sync".to_owned()))
            .with_parameters(Parameters::new().with("LANGUAGE", "en"));
        assert_eq!(
            render(&PropertyName::Summary, &property),
            "SUMMARY;LANGUAGE=en:Team\\, weekly\\; sync\r\n"
        );
    }

    #[test]
    fn writes_list_values() {
        let property = Property {
            values: vec![
                Value::Date(ValueDate::new(2024, 1, 1).unwrap()),
                Value::Date(ValueDate::new(2024, 1, 8).unwrap()),
            ],
            parameters: Parameters::new().with("VALUE", "DATE"),
        };
        assert_eq!(
            render(&PropertyName::ExDate, &property),
            "EXDATE;VALUE=DATE:20240101,20240108\r\n"
        );
    }

    #[test]
    fn writes_empty_placeholder() {
        let property = Property::default();
        assert_eq!(render(&PropertyName::Description, &property), "DESCRIPTION:\r\n");
    }
}
