// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property names, property instances and the per-component property store.
//!
//! Every RFC 2445 property is a variant of the closed [`PropertyName`] enum,
//! which fixes its multiplicity and the value kinds it accepts. Experimental
//! `X-` properties are carried as [`PropertyName::Extension`].

use std::fmt;
use std::str::FromStr;

use crate::keyword::{
    KW_ACTION, KW_ATTACH, KW_ATTENDEE, KW_CALSCALE, KW_CATEGORIES, KW_CLASS, KW_COMMENT,
    KW_COMPLETED, KW_CONTACT, KW_CREATED, KW_DESCRIPTION, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_DUE,
    KW_DURATION, KW_EXDATE, KW_EXRULE, KW_FREEBUSY, KW_GEO, KW_LAST_MODIFIED, KW_LOCATION,
    KW_METHOD, KW_ORGANIZER, KW_PERCENT_COMPLETE, KW_PRIORITY, KW_PRODID, KW_RDATE,
    KW_RECURRENCE_ID, KW_RELATED_TO, KW_REPEAT, KW_REQUEST_STATUS, KW_RESOURCES, KW_RRULE,
    KW_SEQUENCE, KW_STATUS, KW_SUMMARY, KW_TRANSP, KW_TRIGGER, KW_TZID, KW_TZNAME,
    KW_TZOFFSETFROM, KW_TZOFFSETTO, KW_TZURL, KW_UID, KW_URL, KW_VERSION, KW_X_PREFIX,
};
use crate::parameter::Parameters;
use crate::value::{Value, ValueError, ValueKind};

/// How many instances of a property a component may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// Exactly one instance; setting replaces it
    Single,
    /// An ordered list of instances, each addressable by a 1-based index
    Repeatable,
}

/// Macro to define `PropertyName` with its multiplicity and value kinds.
///
/// Usage: `property_name!(Variant => KW, Multiplicity, is_list => &[default, alternates...], ...)`
macro_rules! property_name {
    (
        $(
            $(#[$attr:meta])*
            $variant:ident => $kw:ident, $mult:ident, $list:literal => $kinds:expr $(,)?
        )*
    ) => {
        /// Name of an iCalendar property.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        #[expect(missing_docs)]
        pub enum PropertyName {
            $(
                $(#[$attr])*
                $variant,
            )*
            /// Experimental `X-` property, stored upper-case
            Extension(String),
        }

        impl PropertyName {
            /// Canonical upper-case name.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $kw,)*
                    Self::Extension(name) => name,
                }
            }

            /// Whether one or many instances are allowed.
            #[must_use]
            pub const fn multiplicity(&self) -> Multiplicity {
                match self {
                    $(Self::$variant => Multiplicity::$mult,)*
                    Self::Extension(_) => Multiplicity::Repeatable,
                }
            }

            /// Whether one instance carries a comma-separated list of values.
            #[must_use]
            pub const fn is_list(&self) -> bool {
                match self {
                    $(Self::$variant => $list,)*
                    Self::Extension(_) => false,
                }
            }

            /// Accepted value kinds, the implicit default first.
            #[must_use]
            pub const fn value_kinds(&self) -> &'static [ValueKind] {
                match self {
                    $(Self::$variant => $kinds,)*
                    Self::Extension(_) => &[ValueKind::Text],
                }
            }

            fn from_known(upper: &str) -> Option<Self> {
                match upper {
                    $($kw => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }

        #[cfg(test)]
        const NAMES: &[PropertyName] = &[
            $(PropertyName::$variant,)*
        ];
    };
}

property_name! {
    // 4.7 Calendar Properties
    CalScale        => KW_CALSCALE,         Single,     false => &[ValueKind::Text],
    Method          => KW_METHOD,           Single,     false => &[ValueKind::Text],
    ProdId          => KW_PRODID,           Single,     false => &[ValueKind::Text],
    Version         => KW_VERSION,          Single,     false => &[ValueKind::Text],
    // 4.8.1 Descriptive
    Attach          => KW_ATTACH,           Repeatable, false => &[ValueKind::Uri, ValueKind::Binary],
    Categories      => KW_CATEGORIES,       Repeatable, true  => &[ValueKind::Text],
    Class           => KW_CLASS,            Single,     false => &[ValueKind::Text],
    Comment         => KW_COMMENT,          Repeatable, false => &[ValueKind::Text],
    Description     => KW_DESCRIPTION,      Single,     false => &[ValueKind::Text],
    Geo             => KW_GEO,              Single,     false => &[ValueKind::Geo],
    Location        => KW_LOCATION,         Single,     false => &[ValueKind::Text],
    PercentComplete => KW_PERCENT_COMPLETE, Single,     false => &[ValueKind::Integer],
    Priority        => KW_PRIORITY,         Single,     false => &[ValueKind::Integer],
    Resources       => KW_RESOURCES,        Repeatable, true  => &[ValueKind::Text],
    Status          => KW_STATUS,           Single,     false => &[ValueKind::Text],
    Summary         => KW_SUMMARY,          Single,     false => &[ValueKind::Text],
    // 4.8.2 Date and Time
    Completed       => KW_COMPLETED,        Single,     false => &[ValueKind::DateTime],
    DtEnd           => KW_DTEND,            Single,     false => &[ValueKind::DateTime, ValueKind::Date],
    Due             => KW_DUE,              Single,     false => &[ValueKind::DateTime, ValueKind::Date],
    DtStart         => KW_DTSTART,          Single,     false => &[ValueKind::DateTime, ValueKind::Date],
    Duration        => KW_DURATION,         Single,     false => &[ValueKind::Duration],
    FreeBusy        => KW_FREEBUSY,         Repeatable, true  => &[ValueKind::Period],
    Transp          => KW_TRANSP,           Single,     false => &[ValueKind::Text],
    // 4.8.3 Time Zone
    TzId            => KW_TZID,             Single,     false => &[ValueKind::Text],
    TzName          => KW_TZNAME,           Repeatable, false => &[ValueKind::Text],
    TzOffsetFrom    => KW_TZOFFSETFROM,     Single,     false => &[ValueKind::UtcOffset],
    TzOffsetTo      => KW_TZOFFSETTO,       Single,     false => &[ValueKind::UtcOffset],
    TzUrl           => KW_TZURL,            Single,     false => &[ValueKind::Uri],
    // 4.8.4 Relationship
    Attendee        => KW_ATTENDEE,         Repeatable, false => &[ValueKind::CalAddress],
    Contact         => KW_CONTACT,          Repeatable, false => &[ValueKind::Text],
    Organizer       => KW_ORGANIZER,        Single,     false => &[ValueKind::CalAddress],
    RecurrenceId    => KW_RECURRENCE_ID,    Single,     false => &[ValueKind::DateTime, ValueKind::Date],
    RelatedTo       => KW_RELATED_TO,       Repeatable, false => &[ValueKind::Text],
    Url             => KW_URL,              Single,     false => &[ValueKind::Uri],
    Uid             => KW_UID,              Single,     false => &[ValueKind::Text],
    // 4.8.5 Recurrence
    ExDate          => KW_EXDATE,           Repeatable, true  => &[ValueKind::DateTime, ValueKind::Date],
    ExRule          => KW_EXRULE,           Repeatable, false => &[ValueKind::Recur],
    RDate           => KW_RDATE,            Repeatable, true  => &[ValueKind::DateTime, ValueKind::Date, ValueKind::Period],
    RRule           => KW_RRULE,            Repeatable, false => &[ValueKind::Recur],
    // 4.8.6 Alarm
    Action          => KW_ACTION,           Single,     false => &[ValueKind::Text],
    Repeat          => KW_REPEAT,           Single,     false => &[ValueKind::Integer],
    Trigger         => KW_TRIGGER,          Single,     false => &[ValueKind::Duration, ValueKind::DateTime],
    // 4.8.7 Change Management
    Created         => KW_CREATED,          Single,     false => &[ValueKind::DateTime],
    DtStamp         => KW_DTSTAMP,          Single,     false => &[ValueKind::DateTime],
    LastModified    => KW_LAST_MODIFIED,    Single,     false => &[ValueKind::DateTime],
    Sequence        => KW_SEQUENCE,         Single,     false => &[ValueKind::Integer],
    // 4.8.8 Miscellaneous
    RequestStatus   => KW_REQUEST_STATUS,   Repeatable, false => &[ValueKind::RequestStatus],
}

impl PropertyName {
    /// The kind assumed when no `VALUE` parameter is present.
    #[must_use]
    pub fn default_kind(&self) -> ValueKind {
        self.value_kinds().first().copied().unwrap_or(ValueKind::Text)
    }

    /// Whether a value of `kind` may be stored under this name.
    ///
    /// URI and CAL-ADDRESS share one representation and are interchangeable.
    /// Extension properties accept anything.
    #[must_use]
    pub fn accepts(&self, kind: ValueKind) -> bool {
        if matches!(self, Self::Extension(_)) {
            return true;
        }
        let normalize = |k: ValueKind| match k {
            ValueKind::CalAddress => ValueKind::Uri,
            k => k,
        };
        self.value_kinds()
            .iter()
            .any(|&k| normalize(k) == normalize(kind))
    }

    /// Build an extension name, which must carry the `X-` prefix.
    #[must_use]
    pub fn extension(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        (upper.len() > KW_X_PREFIX.len() && upper.starts_with(KW_X_PREFIX))
            .then_some(Self::Extension(upper))
    }
}

impl FromStr for PropertyName {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::from_known(&upper)
            .or_else(|| Self::extension(&upper))
            .ok_or(PropertyError::Unknown { name: upper })
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when mutating properties.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    /// Not an RFC 2445 property and not an `X-` extension
    #[error("unknown property name '{name}'")]
    Unknown {
        /// The offending name
        name: String,
    },

    /// The property is not declared for the component kind
    #[error("property {property} is not allowed in {component}")]
    Undeclared {
        /// Property name
        property: String,
        /// Component name, `VCALENDAR` for calendar properties
        component: String,
    },

    /// An empty value was set while empty values are disallowed
    #[error("property {property} requires a value")]
    EmptyValue {
        /// Property name
        property: String,
    },

    /// The value kind is not accepted by the property
    #[error("property {property} does not accept {kind} values")]
    WrongKind {
        /// Property name
        property: String,
        /// The rejected kind
        kind: ValueKind,
    },

    /// A 1-based index outside the stored instances
    #[error("property {property} has no instance {index}")]
    IndexOutOfRange {
        /// Property name
        property: String,
        /// The requested 1-based index
        index: usize,
    },

    /// Value conversion failed
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// One property instance: its values and parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Property {
    /// Values, in order. Empty is the allow-empty placeholder.
    pub values: Vec<Value>,
    /// Parameters, defaults already suppressed
    pub parameters: Parameters,
}

impl Property {
    /// Property holding a single value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            values: vec![value],
            parameters: Parameters::new(),
        }
    }

    /// Attach parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// First value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.values.first()
    }

    /// Whether this is the allow-empty placeholder.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Properties of one component, keyed by name in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore(Vec<(PropertyName, Vec<Property>)>);

impl PropertyStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    fn slot(&self, name: &PropertyName) -> Option<&Vec<Property>> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The instance at the 1-based `index`, or the first one.
    #[must_use]
    pub fn get(&self, name: &PropertyName, index: Option<usize>) -> Option<&Property> {
        let list = self.slot(name)?;
        match index {
            None => list.first(),
            Some(0) => None,
            Some(i) => list.get(i - 1),
        }
    }

    /// All instances of a property.
    #[must_use]
    pub fn get_all(&self, name: &PropertyName) -> &[Property] {
        self.slot(name).map_or(&[], Vec::as_slice)
    }

    /// Store an instance.
    ///
    /// A single-valued property is replaced. A repeatable one is appended
    /// without an index, and with a 1-based index the instance there is
    /// replaced, or the slot right after the last is filled.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::IndexOutOfRange`] for index 0 or an index
    /// more than one past the last instance.
    pub fn set(
        &mut self,
        name: PropertyName,
        property: Property,
        index: Option<usize>,
    ) -> Result<(), PropertyError> {
        let out_of_range = |name: &PropertyName, index| PropertyError::IndexOutOfRange {
            property: name.to_string(),
            index,
        };

        let pos = self.0.iter().position(|(n, _)| *n == name);
        let Some(pos) = pos else {
            return match index {
                None | Some(1) => {
                    self.0.push((name, vec![property]));
                    Ok(())
                }
                Some(i) => Err(out_of_range(&name, i)),
            };
        };

        let multiplicity = name.multiplicity();
        let Some((_, list)) = self.0.get_mut(pos) else {
            return Err(out_of_range(&name, index.unwrap_or(1)));
        };
        match (multiplicity, index) {
            (Multiplicity::Single, None | Some(1)) => *list = vec![property],
            (Multiplicity::Repeatable, None) => list.push(property),
            (Multiplicity::Repeatable, Some(i)) if i >= 1 && i <= list.len() => {
                if let Some(slot) = list.get_mut(i - 1) {
                    *slot = property;
                }
            }
            (Multiplicity::Repeatable, Some(i)) if i >= 1 && i == list.len() + 1 => {
                list.push(property);
            }
            (_, Some(i)) => return Err(out_of_range(&name, i)),
        }
        Ok(())
    }

    /// Remove the instance at the 1-based `index`, or the first one.
    ///
    /// Returns `false` when nothing was removed.
    pub fn delete(&mut self, name: &PropertyName, index: Option<usize>) -> bool {
        let Some(pos) = self.0.iter().position(|(n, _)| n == name) else {
            return false;
        };
        let Some((_, list)) = self.0.get_mut(pos) else {
            return false;
        };
        let i = match index {
            None => 0,
            Some(0) => return false,
            Some(i) => i - 1,
        };
        if i >= list.len() {
            return false;
        }
        list.remove(i);
        if list.is_empty() {
            self.0.remove(pos);
        }
        true
    }

    /// Remove every instance of a property.
    pub fn clear(&mut self, name: &PropertyName) {
        self.0.retain(|(n, _)| n != name);
    }

    /// Iterate every instance in insertion order of the names.
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyName, &Property)> {
        self.0
            .iter()
            .flat_map(|(name, list)| list.iter().map(move |p| (name, p)))
    }

    /// Stored names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &PropertyName> {
        self.0.iter().map(|(name, _)| name)
    }

    /// Number of stored instances across all names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().map(|(_, list)| list.len()).sum()
    }

    /// Whether no property is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Property {
        Property::new(Value::Text(s.to_owned()))
    }

    #[test]
    fn every_name_round_trips() {
        for name in NAMES {
            let parsed: PropertyName = name.as_str().parse().unwrap();
            assert_eq!(&parsed, name);
            assert!(!name.value_kinds().is_empty(), "{name} has no value kinds");
        }
    }

    #[test]
    fn parses_names() {
        assert_eq!("dtstart".parse::<PropertyName>(), Ok(PropertyName::DtStart));
        assert_eq!(
            "x-wr-calname".parse::<PropertyName>(),
            Ok(PropertyName::Extension("X-WR-CALNAME".to_owned()))
        );
        assert!(matches!(
            "FOO".parse::<PropertyName>(),
            Err(PropertyError::Unknown { name }) if name == "FOO"
        ));
        assert!("X-".parse::<PropertyName>().is_err());
    }

    #[test]
    fn kinds_and_multiplicity() {
        assert_eq!(PropertyName::DtStart.default_kind(), ValueKind::DateTime);
        assert!(PropertyName::DtStart.accepts(ValueKind::Date));
        assert!(!PropertyName::DtStart.accepts(ValueKind::Text));
        assert!(PropertyName::Attendee.accepts(ValueKind::Uri));
        assert!(PropertyName::RDate.accepts(ValueKind::Period));
        assert!(PropertyName::Extension("X-A".to_owned()).accepts(ValueKind::Integer));

        assert_eq!(PropertyName::Uid.multiplicity(), Multiplicity::Single);
        assert_eq!(PropertyName::Attendee.multiplicity(), Multiplicity::Repeatable);
        assert!(PropertyName::Categories.is_list());
        assert!(!PropertyName::Comment.is_list());
    }

    #[test]
    fn single_valued_set_replaces() {
        let mut store = PropertyStore::new();
        store.set(PropertyName::Summary, text("a"), None).unwrap();
        store.set(PropertyName::Summary, text("b"), None).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&PropertyName::Summary, None), Some(&text("b")));
    }

    #[test]
    fn repeatable_set_appends_and_replaces() {
        let mut store = PropertyStore::new();
        let name = PropertyName::Comment;
        store.set(name.clone(), text("one"), None).unwrap();
        store.set(name.clone(), text("two"), None).unwrap();
        store.set(name.clone(), text("TWO"), Some(2)).unwrap();
        store.set(name.clone(), text("three"), Some(3)).unwrap();

        let all: Vec<_> = store
            .get_all(&name)
            .iter()
            .filter_map(|p| p.value().and_then(Value::as_text))
            .collect();
        assert_eq!(all, ["one", "TWO", "three"]);
        assert_eq!(store.get(&name, Some(2)), Some(&text("TWO")));
        assert_eq!(store.get(&name, Some(4)), None);
        assert_eq!(store.get(&name, Some(0)), None);

        let err = store.set(name, text("x"), Some(9)).unwrap_err();
        assert!(matches!(err, PropertyError::IndexOutOfRange { index: 9, .. }));
    }

    #[test]
    fn delete_removes_indexed_or_first() {
        let mut store = PropertyStore::new();
        let name = PropertyName::Comment;
        for s in ["a", "b", "c"] {
            store.set(name.clone(), text(s), None).unwrap();
        }
        assert!(store.delete(&name, Some(2)));
        assert!(store.delete(&name, None));
        assert_eq!(store.get_all(&name), &[text("c")]);
        assert!(!store.delete(&name, Some(5)));
        assert!(store.delete(&name, None));
        assert!(store.is_empty());
        assert!(!store.delete(&name, None));
    }

    #[test]
    fn iterates_in_insertion_order() {
        let mut store = PropertyStore::new();
        store.set(PropertyName::Summary, text("s"), None).unwrap();
        store.set(PropertyName::Comment, text("c1"), None).unwrap();
        store.set(PropertyName::Uid, text("u"), None).unwrap();
        store.set(PropertyName::Comment, text("c2"), None).unwrap();

        let names: Vec<_> = store.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["SUMMARY", "COMMENT", "COMMENT", "UID"]);
    }
}
