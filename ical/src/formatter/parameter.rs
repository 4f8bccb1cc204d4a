// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parameter formatting for iCalendar parameters.
//!
//! Each parameter is written with a semicolon prefix: `;NAME=v1,v2`.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::parameter::{Parameter, Parameters};

/// Format all parameters, each prefixed with a semicolon.
pub fn write_parameters<W: Write>(w: &mut W, parameters: &Parameters) -> io::Result<()> {
    for param in parameters.iter() {
        write_parameter(w, param)?;
    }
    Ok(())
}

/// Format a single parameter (with semicolon prefix).
fn write_parameter<W: Write>(w: &mut W, param: &Parameter) -> io::Result<()> {
    write!(w, ";{}=", param.name)?;
    for (i, value) in param.values.iter().enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        write!(w, "{}", quote_if_needed(value))?;
    }
    Ok(())
}

/// Quote a parameter value if it contains special characters.
///
/// A double quote cannot appear inside a quoted string, so it is replaced
/// by a single quote.
pub(crate) fn quote_if_needed(value: &str) -> Cow<'_, str> {
    let value: Cow<'_, str> = if value.contains('"') {
        Cow::Owned(value.replace('"', "'"))
    } else {
        Cow::Borrowed(value)
    };
    if value.contains([':', ';', ',']) {
        Cow::Owned(format!("\"{value}\""))
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(parameters: &Parameters) -> String {
        let mut buf = Vec::new();
        write_parameters(&mut buf, parameters).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_and_quotes_parameters() {
        let params = Parameters::new()
            .with("TZID", "Europe/Berlin")
            .with("CN", "Doe, John")
            .with("DIR", "ldap://example.com:6666/o=ABC");
        assert_eq!(
            render(&params),
            r#";TZID=Europe/Berlin;CN="Doe, John";DIR="ldap://example.com:6666/o=ABC""#
        );
    }

    #[test]
    fn writes_multiple_values() {
        let mut params = Parameters::new();
        params.set("DELEGATED-TO", ["mailto:a@x", "mailto:b@x"]);
        assert_eq!(render(&params), r#";DELEGATED-TO="mailto:a@x","mailto:b@x""#);
    }

    #[test]
    fn replaces_inner_double_quotes() {
        assert_eq!(quote_if_needed(r#"say "hi""#), "say 'hi'");
        assert_eq!(quote_if_needed(r#"a"b;c"#), r#""a'b;c""#);
        assert_eq!(quote_if_needed("plain"), "plain");
    }
}
