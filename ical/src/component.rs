// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar components, RFC 2445 Section 4.6.

use crate::keyword::KW_VALUE;
use crate::parameter::Parameters;
use crate::property::{Property, PropertyError, PropertyName, PropertyStore};
use crate::value::{
    DateInput, DateOrDateTime, Value, ValueDateTime, ValueDuration, ValueKind,
    ValueRecurrenceRule, Zone,
};

use crate::property::PropertyName as P;

#[rustfmt::skip]
const VEVENT_PROPERTIES: &[PropertyName] = &[
    P::Uid, P::DtStamp, P::Attach, P::Attendee, P::Categories, P::Comment, P::Contact,
    P::Class, P::Created, P::Description, P::DtStart, P::DtEnd, P::Duration, P::ExDate,
    P::ExRule, P::Geo, P::LastModified, P::Location, P::Organizer, P::Priority, P::RDate,
    P::RRule, P::RelatedTo, P::RequestStatus, P::RecurrenceId, P::Resources, P::Sequence,
    P::Status, P::Summary, P::Transp, P::Url,
];

#[rustfmt::skip]
const VTODO_PROPERTIES: &[PropertyName] = &[
    P::Uid, P::DtStamp, P::Attach, P::Attendee, P::Categories, P::Class, P::Comment,
    P::Completed, P::Contact, P::Created, P::Description, P::DtStart, P::Due, P::Duration,
    P::ExDate, P::ExRule, P::Geo, P::LastModified, P::Location, P::Organizer,
    P::PercentComplete, P::Priority, P::RDate, P::RRule, P::RelatedTo, P::RequestStatus,
    P::RecurrenceId, P::Resources, P::Sequence, P::Status, P::Summary, P::Url,
];

#[rustfmt::skip]
const VJOURNAL_PROPERTIES: &[PropertyName] = &[
    P::Uid, P::DtStamp, P::Attach, P::Attendee, P::Categories, P::Class, P::Comment,
    P::Contact, P::Created, P::Description, P::DtStart, P::ExDate, P::ExRule,
    P::LastModified, P::Organizer, P::RDate, P::RRule, P::RelatedTo, P::RequestStatus,
    P::RecurrenceId, P::Sequence, P::Status, P::Summary, P::Url,
];

#[rustfmt::skip]
const VFREEBUSY_PROPERTIES: &[PropertyName] = &[
    P::Uid, P::DtStamp, P::Attendee, P::Comment, P::Contact, P::DtEnd, P::DtStart,
    P::Duration, P::FreeBusy, P::Organizer, P::RequestStatus, P::Url,
];

#[rustfmt::skip]
const VALARM_PROPERTIES: &[PropertyName] = &[
    P::Action, P::Attach, P::Attendee, P::Description, P::Duration, P::Repeat, P::Summary,
    P::Trigger,
];

const VTIMEZONE_PROPERTIES: &[PropertyName] = &[P::TzId, P::LastModified, P::TzUrl];

#[rustfmt::skip]
const OBSERVANCE_PROPERTIES: &[PropertyName] = &[
    P::DtStart, P::TzOffsetTo, P::TzOffsetFrom, P::Comment, P::RDate, P::RRule, P::TzName,
];

/// Kind of a calendar component.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ComponentKind {
    /// Event
    VEvent,
    /// To-do
    VTodo,
    /// Journal entry
    VJournal,
    /// Free/busy information
    VFreeBusy,
    /// Alarm, nested in events and to-dos
    VAlarm,
    /// Time zone definition
    VTimeZone,
    /// Standard-time observance, nested in a time zone
    Standard,
    /// Daylight-saving observance, nested in a time zone
    Daylight,
}

impl ComponentKind {
    /// Declared properties, in output order.
    #[must_use]
    pub const fn properties(self) -> &'static [PropertyName] {
        match self {
            Self::VEvent => VEVENT_PROPERTIES,
            Self::VTodo => VTODO_PROPERTIES,
            Self::VJournal => VJOURNAL_PROPERTIES,
            Self::VFreeBusy => VFREEBUSY_PROPERTIES,
            Self::VAlarm => VALARM_PROPERTIES,
            Self::VTimeZone => VTIMEZONE_PROPERTIES,
            Self::Standard | Self::Daylight => OBSERVANCE_PROPERTIES,
        }
    }

    /// Kinds that may be nested directly inside this one.
    #[must_use]
    pub const fn sub_components(self) -> &'static [ComponentKind] {
        match self {
            Self::VEvent | Self::VTodo => &[Self::VAlarm],
            Self::VTimeZone => &[Self::Standard, Self::Daylight],
            _ => &[],
        }
    }

    /// Whether `name` may be set on this kind. Extensions are legal everywhere.
    #[must_use]
    pub fn declares(self, name: &PropertyName) -> bool {
        matches!(name, PropertyName::Extension(_)) || self.properties().contains(name)
    }

    /// Whether UID and DTSTAMP are generated for this kind.
    #[must_use]
    pub const fn has_identity(self) -> bool {
        !matches!(
            self,
            Self::VAlarm | Self::VTimeZone | Self::Standard | Self::Daylight
        )
    }
}

/// Addresses one component in an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSelector {
    /// 1-based position in the list
    Index(usize),
    /// 1-based ordinal among components of one kind
    Kind(ComponentKind, usize),
    /// Component whose UID matches
    Uid(String),
}

impl ComponentSelector {
    /// Build a selector from one or two loose arguments.
    ///
    /// All digits selects by position. A short word without `@` selects by
    /// kind, with `ordinal` as the 1-based ordinal (default 1). Anything else
    /// is taken as a UID. Returns `None` for a short word that names no kind.
    #[must_use]
    pub fn parse(arg: &str, ordinal: Option<usize>) -> Option<Self> {
        let arg = arg.trim();
        if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
            return arg.parse().ok().map(Self::Index);
        }
        if arg.len() <= 9 && !arg.contains('@') {
            let kind = arg.parse().ok()?;
            return Some(Self::Kind(kind, ordinal.unwrap_or(1)));
        }
        Some(Self::Uid(arg.to_owned()))
    }

    /// Position of the first match in `list`.
    pub(crate) fn position(&self, list: &[Component]) -> Option<usize> {
        match self {
            Self::Index(0) | Self::Kind(_, 0) => None,
            Self::Index(i) => (*i <= list.len()).then(|| i - 1),
            Self::Kind(kind, ordinal) => list
                .iter()
                .enumerate()
                .filter(|(_, c)| c.kind == *kind)
                .nth(ordinal - 1)
                .map(|(i, _)| i),
            Self::Uid(uid) => list.iter().position(|c| c.uid() == Some(uid.as_str())),
        }
    }
}

impl From<usize> for ComponentSelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<ComponentKind> for ComponentSelector {
    fn from(kind: ComponentKind) -> Self {
        Self::Kind(kind, 1)
    }
}

/// Errors raised when nesting components.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// The child kind may not be nested in the parent kind
    #[error("component {child} is not allowed in {parent}")]
    IllegalNesting {
        /// Kind of the rejected component
        child: ComponentKind,
        /// Kind of the container
        parent: ComponentKind,
    },
}

/// A calendar component with its properties and nested components.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    kind: ComponentKind,
    properties: PropertyStore,
    components: Vec<Component>,
    allow_empty: bool,
}

impl Component {
    /// Create an empty component. Empty values are allowed.
    #[must_use]
    pub const fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            properties: PropertyStore::new(),
            components: Vec::new(),
            allow_empty: true,
        }
    }

    /// Whether empty values are stored as placeholders or rejected.
    #[must_use]
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// Kind of this component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Property storage.
    #[must_use]
    pub const fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    /// Set a property, replacing a single-valued one or appending a
    /// repeatable one.
    ///
    /// # Errors
    ///
    /// Fails when the property is undeclared for this kind, a value has a kind
    /// the property does not accept, or the value is empty while empty values
    /// are disallowed. The component is left untouched on failure.
    pub fn set_property(
        &mut self,
        name: PropertyName,
        values: Vec<Value>,
        params: Parameters,
    ) -> Result<(), PropertyError> {
        self.set_property_at(name, values, params, None)
    }

    /// Like [`Component::set_property`], addressing a 1-based instance of a
    /// repeatable property.
    ///
    /// # Errors
    ///
    /// As [`Component::set_property`], plus [`PropertyError::IndexOutOfRange`].
    pub fn set_property_at(
        &mut self,
        name: PropertyName,
        values: Vec<Value>,
        mut params: Parameters,
        index: Option<usize>,
    ) -> Result<(), PropertyError> {
        if !self.kind.declares(&name) {
            return Err(PropertyError::Undeclared {
                property: name.to_string(),
                component: self.kind.to_string(),
            });
        }

        let empty = values
            .iter()
            .all(|v| matches!(v, Value::Text(s) if s.is_empty()));
        let values = if empty {
            if !self.allow_empty {
                return Err(PropertyError::EmptyValue {
                    property: name.to_string(),
                });
            }
            Vec::new()
        } else {
            values
        };

        if let Some(kind) = values.first().map(Value::kind) {
            if let Some(bad) = values.iter().map(Value::kind).find(|&k| !name.accepts(k)) {
                return Err(PropertyError::WrongKind {
                    property: name.to_string(),
                    kind: bad,
                });
            }
            if !matches!(name, PropertyName::Extension(_)) {
                let kind: &'static str = explicit_kind(&name, kind).into();
                params.set(KW_VALUE, [kind]);
            }
        }
        params.suppress_defaults(&name);

        let property = Property { values, parameters: params };
        self.properties.set(name, property, index)
    }

    /// Set a text property.
    ///
    /// # Errors
    ///
    /// See [`Component::set_property`].
    pub fn set_text(&mut self, name: PropertyName, text: &str) -> Result<(), PropertyError> {
        self.set_property(name, vec![Value::Text(text.to_owned())], Parameters::new())
    }

    /// Set a date or date-time property from any supported input shape.
    ///
    /// # Errors
    ///
    /// Fails when the input cannot be normalized, or see
    /// [`Component::set_property`].
    pub fn set_date(
        &mut self,
        name: PropertyName,
        input: DateInput<'_>,
        params: Parameters,
    ) -> Result<(), PropertyError> {
        let (value, params) = input.normalize(params)?;
        self.set_property(name, vec![value], params)
    }

    /// Set DURATION.
    ///
    /// # Errors
    ///
    /// See [`Component::set_property`].
    pub fn set_duration(&mut self, duration: ValueDuration) -> Result<(), PropertyError> {
        let value = Value::Duration(duration);
        self.set_property(PropertyName::Duration, vec![value], Parameters::new())
    }

    /// Append an RRULE.
    ///
    /// # Errors
    ///
    /// See [`Component::set_property`].
    pub fn set_rrule(&mut self, rule: ValueRecurrenceRule) -> Result<(), PropertyError> {
        let value = Value::Recur(rule);
        self.set_property(PropertyName::RRule, vec![value], Parameters::new())
    }

    /// The instance at the 1-based `index`, or the first one.
    #[must_use]
    pub fn get_property(&self, name: &PropertyName, index: Option<usize>) -> Option<&Property> {
        self.properties.get(name, index)
    }

    /// All instances of a property.
    #[must_use]
    pub fn get_properties(&self, name: &PropertyName) -> &[Property] {
        self.properties.get_all(name)
    }

    /// Remove the instance at the 1-based `index`, or the first one.
    pub fn delete_property(&mut self, name: &PropertyName, index: Option<usize>) -> bool {
        self.properties.delete(name, index)
    }

    /// Nested components.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Nest a component.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::IllegalNesting`] when the kind may not be
    /// nested here.
    pub fn add_component(&mut self, component: Component) -> Result<(), ComponentError> {
        self.check_nesting(component.kind)?;
        self.components.push(component);
        Ok(())
    }

    /// A copy of the selected nested component.
    #[must_use]
    pub fn get_component(&self, selector: &ComponentSelector) -> Option<Component> {
        let i = selector.position(&self.components)?;
        self.components.get(i).cloned()
    }

    /// Replace the selected nested component, or append when none matches.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::IllegalNesting`] when the kind may not be
    /// nested here.
    pub fn set_component(
        &mut self,
        selector: &ComponentSelector,
        component: Component,
    ) -> Result<(), ComponentError> {
        self.check_nesting(component.kind)?;
        match selector
            .position(&self.components)
            .and_then(|i| self.components.get_mut(i))
        {
            Some(slot) => *slot = component,
            None => self.components.push(component),
        }
        Ok(())
    }

    /// Remove the selected nested component.
    pub fn delete_component(&mut self, selector: &ComponentSelector) -> bool {
        match selector.position(&self.components) {
            Some(i) => {
                self.components.remove(i);
                true
            }
            None => false,
        }
    }

    fn check_nesting(&self, child: ComponentKind) -> Result<(), ComponentError> {
        if self.kind.sub_components().contains(&child) {
            Ok(())
        } else {
            Err(ComponentError::IllegalNesting {
                child,
                parent: self.kind,
            })
        }
    }

    fn first_value(&self, name: &PropertyName) -> Option<&Value> {
        self.properties.get(name, None).and_then(Property::value)
    }

    /// UID text.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.first_value(&PropertyName::Uid).and_then(Value::as_text)
    }

    /// SUMMARY text.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.first_value(&PropertyName::Summary)
            .and_then(Value::as_text)
    }

    /// DTSTART value.
    #[must_use]
    pub fn dtstart(&self) -> Option<DateOrDateTime> {
        self.first_value(&PropertyName::DtStart)
            .and_then(Value::as_date_or_date_time)
    }

    /// DTEND value.
    #[must_use]
    pub fn dtend(&self) -> Option<DateOrDateTime> {
        self.first_value(&PropertyName::DtEnd)
            .and_then(Value::as_date_or_date_time)
    }

    /// DUE value.
    #[must_use]
    pub fn due(&self) -> Option<DateOrDateTime> {
        self.first_value(&PropertyName::Due)
            .and_then(Value::as_date_or_date_time)
    }

    /// DURATION value.
    #[must_use]
    pub fn duration(&self) -> Option<&ValueDuration> {
        self.first_value(&PropertyName::Duration)
            .and_then(Value::as_duration)
    }

    /// Every RRULE.
    pub fn rrules(&self) -> impl Iterator<Item = &ValueRecurrenceRule> {
        self.all_values(&PropertyName::RRule)
            .filter_map(Value::as_recur)
    }

    /// Every EXRULE.
    pub fn exrules(&self) -> impl Iterator<Item = &ValueRecurrenceRule> {
        self.all_values(&PropertyName::ExRule)
            .filter_map(Value::as_recur)
    }

    /// Every RDATE value: dates, date-times or periods.
    pub fn rdates(&self) -> impl Iterator<Item = &Value> {
        self.all_values(&PropertyName::RDate)
    }

    /// Every EXDATE value.
    pub fn exdates(&self) -> impl Iterator<Item = DateOrDateTime> {
        self.all_values(&PropertyName::ExDate)
            .filter_map(Value::as_date_or_date_time)
    }

    fn all_values(&self, name: &PropertyName) -> impl Iterator<Item = &Value> {
        self.properties
            .get_all(name)
            .iter()
            .flat_map(|p| p.values.iter())
    }

    /// DTSTART plus DURATION.
    #[must_use]
    pub fn end_from_duration(&self) -> Option<jiff::civil::DateTime> {
        let start = self.dtstart()?;
        let duration = self.duration()?;
        Some(duration.add_to(start.civil_date_time()))
    }

    /// Generate DTSTAMP and UID when absent.
    ///
    /// Alarms and time zones never carry them and are left alone.
    pub fn ensure_identity(&mut self, unique_id: &str, now: jiff::Timestamp) {
        if !self.kind.has_identity() {
            return;
        }

        if self.properties.get(&PropertyName::DtStamp, None).is_none() {
            let civil = jiff::tz::Offset::UTC.to_datetime(now);
            let stamp = ValueDateTime::from_civil(civil, Some(Zone::Utc));
            let property = Property::new(Value::DateTime(stamp));
            if let Err(error) = self.properties.set(PropertyName::DtStamp, property, None) {
                tracing::warn!(%error, "cannot set generated DTSTAMP");
            }
        }

        if self.uid().is_none() {
            let uid = format!(
                "{}-{}@{unique_id}",
                now.strftime("%Y%m%dT%H%M%SZ"),
                uuid::Uuid::new_v4().simple()
            );
            tracing::trace!(uid, "generated component UID");
            let property = Property::new(Value::Text(uid));
            if let Err(error) = self.properties.set(PropertyName::Uid, property, None) {
                tracing::warn!(%error, "cannot set generated UID");
            }
        }
    }
}

/// The `VALUE` parameter to record for a value of `kind`.
fn explicit_kind(name: &PropertyName, kind: ValueKind) -> ValueKind {
    match (name.default_kind(), kind) {
        (ValueKind::CalAddress, ValueKind::Uri) => ValueKind::CalAddress,
        _ => kind,
    }
}
