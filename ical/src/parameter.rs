// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property parameters, RFC 2445 Section 4.2.
//!
//! Parameters are kept as an ordered list of name/values pairs. Names are
//! normalized to upper case, surrounding quotes are stripped, and the value
//! of `VALUE` is upper-cased. Parameters that merely restate the RFC default
//! for their property are dropped, so callers never observe them on
//! read-back.

use crate::keyword::{
    KW_BOOLEAN_FALSE, KW_CUTYPE, KW_CUTYPE_INDIVIDUAL, KW_FBTYPE, KW_FBTYPE_BUSY, KW_PARTSTAT,
    KW_PARTSTAT_NEEDS_ACTION, KW_RELATED, KW_RELATED_START, KW_RELTYPE, KW_RELTYPE_PARENT,
    KW_ROLE, KW_ROLE_REQ_PARTICIPANT, KW_RSVP, KW_VALUE,
};
use crate::property::PropertyName;

/// A single parameter with one or more values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Upper-case parameter name
    pub name: String,
    /// Unquoted values, in order
    pub values: Vec<String>,
}

impl Parameter {
    /// First value of the parameter.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Ordered parameter set attached to a property instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<Parameter>);

impl Parameters {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace a parameter, normalizing name and values.
    pub fn set<N, V, S>(&mut self, name: N, values: V)
    where
        N: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.as_ref().trim().to_ascii_uppercase();
        let values = values
            .into_iter()
            .map(|v| {
                let v = strip_quotes(v.as_ref());
                if name == KW_VALUE {
                    v.to_ascii_uppercase()
                } else {
                    v.to_owned()
                }
            })
            .collect();

        match self.0.iter_mut().find(|p| p.name == name) {
            Some(param) => param.values = values,
            None => self.0.push(Parameter { name, values }),
        }
    }

    /// Builder form of [`Parameters::set`].
    #[must_use]
    pub fn with<N: AsRef<str>, S: AsRef<str>>(mut self, name: N, value: S) -> Self {
        self.set(name, [value]);
        self
    }

    /// Look up a parameter by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// First value of the named parameter.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Parameter::value)
    }

    /// Remove a parameter, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        let pos = self.0.iter().position(|p| p.name.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(pos))
    }

    /// Iterate parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop every parameter that restates the default for `property`.
    pub(crate) fn suppress_defaults(&mut self, property: &PropertyName) {
        let default_kind = property.default_kind();
        self.0.retain(|p| {
            let value = p.value().unwrap_or_default();
            if p.name == KW_VALUE {
                return !value.eq_ignore_ascii_case(default_kind.as_ref());
            }
            if p.values.len() != 1 {
                return true;
            }
            !is_default(property, &p.name, value)
        });
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// RFC default values that are implied when the parameter is absent.
fn is_default(property: &PropertyName, name: &str, value: &str) -> bool {
    let default = match (property, name) {
        (PropertyName::Attendee, KW_CUTYPE) => KW_CUTYPE_INDIVIDUAL,
        (PropertyName::Attendee, KW_PARTSTAT) => KW_PARTSTAT_NEEDS_ACTION,
        (PropertyName::Attendee, KW_ROLE) => KW_ROLE_REQ_PARTICIPANT,
        (PropertyName::Attendee, KW_RSVP) => KW_BOOLEAN_FALSE,
        (PropertyName::RelatedTo, KW_RELTYPE) => KW_RELTYPE_PARENT,
        (PropertyName::FreeBusy, KW_FBTYPE) => KW_FBTYPE_BUSY,
        (PropertyName::Trigger, KW_RELATED) => KW_RELATED_START,
        _ => return false,
    };
    value.eq_ignore_ascii_case(default)
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_names_and_values() {
        let mut params = Parameters::new();
        params.set("cn", ["\"John Smith\""]);
        params.set("value", ["date"]);
        params.set("x-custom", ["MiXeD"]);

        assert_eq!(params.value("CN"), Some("John Smith"));
        assert_eq!(params.value("VALUE"), Some("DATE"));
        assert_eq!(params.value("X-CUSTOM"), Some("MiXeD"));
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["CN", "VALUE", "X-CUSTOM"]);
    }

    #[test]
    fn replaces_existing_parameter() {
        let mut params = Parameters::new().with("ROLE", "CHAIR");
        params.set("role", ["OPT-PARTICIPANT"]);
        assert_eq!(params.len(), 1);
        assert_eq!(params.value("ROLE"), Some("OPT-PARTICIPANT"));
        assert!(params.remove("Role").is_some());
        assert!(params.is_empty());
        assert!(params.remove("ROLE").is_none());
    }

    #[test]
    fn suppresses_attendee_defaults() {
        let mut params = Parameters::new()
            .with("CUTYPE", "INDIVIDUAL")
            .with("PARTSTAT", "needs-action")
            .with("ROLE", "REQ-PARTICIPANT")
            .with("RSVP", "FALSE")
            .with("CN", "Jane");
        params.suppress_defaults(&PropertyName::Attendee);
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["CN"]);

        let mut params = Parameters::new().with("ROLE", "CHAIR").with("RSVP", "TRUE");
        params.suppress_defaults(&PropertyName::Attendee);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn suppresses_defaults_per_property() {
        let mut params = Parameters::new().with("RELTYPE", "PARENT");
        params.suppress_defaults(&PropertyName::RelatedTo);
        assert!(params.is_empty());

        // ROLE only has a default on ATTENDEE
        let mut params = Parameters::new().with("ROLE", "REQ-PARTICIPANT");
        params.suppress_defaults(&PropertyName::Organizer);
        assert_eq!(params.len(), 1);

        let mut params = Parameters::new().with("VALUE", "DATE-TIME");
        params.suppress_defaults(&PropertyName::DtStart);
        assert!(params.is_empty());

        let mut params = Parameters::new().with("VALUE", "DATE");
        params.suppress_defaults(&PropertyName::DtStart);
        assert_eq!(params.value("VALUE"), Some("DATE"));
    }
}
