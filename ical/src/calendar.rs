// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The calendar container.
//!
//! A [`Calendar`] owns its top-level components and the calendar-scope
//! properties. Components are copied in and out: a component obtained from
//! the calendar is an independent value, and changes to it reach the
//! calendar only when it is stored again.

mod select;

use std::borrow::Cow;

use jiff::civil;

use crate::component::{Component, ComponentKind, ComponentSelector};
use crate::config::CalendarConfig;
use crate::keyword::{
    KW_CALSCALE_GREGORIAN, KW_VCALENDAR, KW_VERSION_2_0, KW_X_CURRENT_DTEND, KW_X_CURRENT_DTSTART,
    KW_X_CURRENT_DUE,
};
use crate::parameter::Parameters;
use crate::property::{Property, PropertyError, PropertyName, PropertyStore};
use crate::value::{DateInput, Value};

pub use crate::calendar::select::{SelectQuery, Selection};

/// An iCalendar object: calendar properties plus an ordered list of
/// components.
#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    config: CalendarConfig,
    properties: PropertyStore,
    components: Vec<Component>,
    cursor: usize,
}

impl Calendar {
    /// Create an empty calendar.
    #[must_use]
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            config,
            properties: PropertyStore::new(),
            components: Vec::new(),
            cursor: 0,
        }
    }

    /// The configuration the calendar was built with.
    #[must_use]
    pub const fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Whether `name` is a calendar-scope property.
    #[must_use]
    pub fn declares(name: &PropertyName) -> bool {
        matches!(
            name,
            PropertyName::CalScale
                | PropertyName::Method
                | PropertyName::ProdId
                | PropertyName::Version
                | PropertyName::Extension(_)
        )
    }

    /// Set a calendar property.
    ///
    /// # Errors
    ///
    /// Fails for a component-level property, a value the property does not
    /// accept, or an empty value while empty values are disallowed.
    pub fn set_property(
        &mut self,
        name: PropertyName,
        values: Vec<Value>,
        parameters: Parameters,
    ) -> Result<(), PropertyError> {
        if !Self::declares(&name) {
            return Err(PropertyError::Undeclared {
                property: name.to_string(),
                component: KW_VCALENDAR.to_owned(),
            });
        }

        let empty = values
            .iter()
            .all(|v| matches!(v, Value::Text(s) if s.is_empty()));
        let values = match empty {
            true if !self.config.allow_empty => {
                return Err(PropertyError::EmptyValue {
                    property: name.to_string(),
                });
            }
            true => Vec::new(),
            false => values,
        };
        if let Some(bad) = values.iter().map(Value::kind).find(|&k| !name.accepts(k)) {
            return Err(PropertyError::WrongKind {
                property: name.to_string(),
                kind: bad,
            });
        }

        let property = Property { values, parameters };
        self.properties.set(name, property, None)
    }

    /// Set a calendar property from text.
    ///
    /// # Errors
    ///
    /// See [`Calendar::set_property`].
    pub fn set_text(&mut self, name: PropertyName, text: &str) -> Result<(), PropertyError> {
        self.set_property(name, vec![Value::Text(text.to_owned())], Parameters::new())
    }

    /// A stored calendar property.
    #[must_use]
    pub fn get_property(&self, name: &PropertyName) -> Option<&Property> {
        self.properties.get(name, None)
    }

    /// Remove a calendar property. Returns `false` when it was not set.
    pub fn delete_property(&mut self, name: &PropertyName) -> bool {
        self.properties.delete(name, None)
    }

    fn text(&self, name: &PropertyName) -> Option<&str> {
        self.get_property(name)
            .and_then(Property::value)
            .and_then(Value::as_text)
    }

    /// CALSCALE, `GREGORIAN` unless set.
    #[must_use]
    pub fn calscale(&self) -> &str {
        self.text(&PropertyName::CalScale)
            .unwrap_or(KW_CALSCALE_GREGORIAN)
    }

    /// VERSION, `2.0` unless set.
    #[must_use]
    pub fn version(&self) -> &str {
        self.text(&PropertyName::Version).unwrap_or(KW_VERSION_2_0)
    }

    /// METHOD, if set.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.text(&PropertyName::Method)
    }

    /// PRODID, derived from the configuration unless set.
    #[must_use]
    pub fn prodid(&self) -> Cow<'_, str> {
        match self.text(&PropertyName::ProdId) {
            Some(prodid) => Cow::Borrowed(prodid),
            None => Cow::Owned(format!(
                "-//{}//NONSGML calforge {}//{}",
                self.config.unique_id,
                env!("CARGO_PKG_VERSION"),
                self.config
                    .language
                    .as_deref()
                    .unwrap_or_default()
                    .to_ascii_uppercase()
            )),
        }
    }

    /// Calendar properties in output order: VERSION, PRODID, CALSCALE,
    /// METHOD, then extensions in insertion order. Defaults are filled in.
    pub(crate) fn output_properties(&self) -> Vec<(PropertyName, Property)> {
        let stored_or = |name: PropertyName, fallback: &str| {
            let property = self
                .get_property(&name)
                .cloned()
                .unwrap_or_else(|| Property::new(Value::Text(fallback.to_owned())));
            (name, property)
        };

        let mut out = vec![
            stored_or(PropertyName::Version, KW_VERSION_2_0),
            stored_or(PropertyName::ProdId, &self.prodid()),
            stored_or(PropertyName::CalScale, KW_CALSCALE_GREGORIAN),
        ];
        if let Some(method) = self.get_property(&PropertyName::Method) {
            out.push((PropertyName::Method, method.clone()));
        }
        out.extend(
            self.properties
                .iter()
                .filter(|(name, _)| matches!(name, PropertyName::Extension(_)))
                .map(|(name, property)| (name.clone(), property.clone())),
        );
        out
    }

    /// Stored components, for the formatters.
    pub(crate) fn stored(&self) -> &[Component] {
        &self.components
    }

    /// Store a copy of `component`, generating its UID and DTSTAMP if absent.
    pub fn add_component(&mut self, mut component: Component) {
        component.ensure_identity(&self.config.unique_id, jiff::Timestamp::now());
        self.components.push(component);
    }

    /// A copy of the selected component.
    #[must_use]
    pub fn get_component(&self, selector: &ComponentSelector) -> Option<Component> {
        let i = selector.position(&self.components)?;
        self.components.get(i).cloned()
    }

    /// A copy of the next component in order, advancing the internal cursor.
    /// Returns `None` once past the last one, then starts over.
    pub fn next_component(&mut self) -> Option<Component> {
        match self.components.get(self.cursor) {
            Some(component) => {
                self.cursor += 1;
                Some(component.clone())
            }
            None => {
                self.cursor = 0;
                None
            }
        }
    }

    /// Replace the selected component, or append when none matches.
    pub fn set_component(&mut self, selector: &ComponentSelector, mut component: Component) {
        component.ensure_identity(&self.config.unique_id, jiff::Timestamp::now());
        match selector
            .position(&self.components)
            .and_then(|i| self.components.get_mut(i))
        {
            Some(slot) => *slot = component,
            None => self.components.push(component),
        }
    }

    /// Remove the selected component. Returns `false` when none matches.
    pub fn delete_component(&mut self, selector: &ComponentSelector) -> bool {
        match selector.position(&self.components) {
            Some(i) => {
                self.components.remove(i);
                if self.cursor > i {
                    self.cursor -= 1;
                }
                true
            }
            None => false,
        }
    }

    /// Copies of every component, in order.
    pub fn components(&self) -> impl Iterator<Item = Component> + '_ {
        self.components.iter().cloned()
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the calendar holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Sort components: time zones first, then by start, end, creation and
    /// UID. Occurrence dates set by a selection take precedence over the
    /// stored ones.
    pub fn sort(&mut self) {
        self.components.sort_by_cached_key(SortKey::of);
        self.cursor = 0;
    }
}

/// Ordering key of one component.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    not_timezone: bool,
    start: Option<civil::DateTime>,
    end: Option<civil::DateTime>,
    created: Option<civil::DateTime>,
    uid: Option<String>,
}

impl SortKey {
    fn of(component: &Component) -> Self {
        let start = current(component, KW_X_CURRENT_DTSTART)
            .or_else(|| component.dtstart().map(|d| d.civil_date_time()));
        let end = current(component, KW_X_CURRENT_DTEND)
            .or_else(|| component.dtend().map(|d| d.civil_date_time()))
            .or_else(|| current(component, KW_X_CURRENT_DUE))
            .or_else(|| component.due().map(|d| d.civil_date_time()))
            .or_else(|| component.end_from_duration());
        let created = date_time_of(component, &PropertyName::Created)
            .or_else(|| date_time_of(component, &PropertyName::DtStamp));

        Self {
            not_timezone: component.kind() != ComponentKind::VTimeZone,
            start,
            end,
            created,
            uid: component.uid().map(str::to_owned),
        }
    }
}

fn date_time_of(component: &Component, name: &PropertyName) -> Option<civil::DateTime> {
    component
        .get_property(name, None)
        .and_then(Property::value)
        .and_then(Value::as_date_or_date_time)
        .map(|d| d.civil_date_time())
}

/// An `X-CURRENT-*` occurrence date, stored as `YYYY-MM-DD[ HH:MM:SS][ zone]`.
fn current(component: &Component, name: &str) -> Option<civil::DateTime> {
    let name = PropertyName::extension(name)?;
    let text = component
        .get_property(&name, None)
        .and_then(Property::value)
        .and_then(Value::as_text)?;
    let (value, _) = DateInput::Text(text).normalize(Parameters::new()).ok()?;
    value.as_date_or_date_time().map(|d| d.civil_date_time())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(uid: &str, start: &str) -> Component {
        let mut event = Component::new(ComponentKind::VEvent);
        event.set_text(PropertyName::Uid, uid).unwrap();
        event
            .set_date(PropertyName::DtStart, DateInput::Text(start), Parameters::new())
            .unwrap();
        event
    }

    #[test]
    fn calendar_property_defaults() {
        let calendar = Calendar::new(CalendarConfig::default().unique_id("example.com").language("en"));
        assert_eq!(calendar.version(), "2.0");
        assert_eq!(calendar.calscale(), "GREGORIAN");
        assert_eq!(calendar.method(), None);
        assert_eq!(
            calendar.prodid(),
            format!("-//example.com//NONSGML calforge {}//EN", env!("CARGO_PKG_VERSION"))
        );

        let names: Vec<_> = calendar
            .output_properties()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            [PropertyName::Version, PropertyName::ProdId, PropertyName::CalScale]
        );
    }

    #[test]
    fn rejects_component_properties() {
        let mut calendar = Calendar::new(CalendarConfig::default());
        let err = calendar.set_text(PropertyName::Summary, "x").unwrap_err();
        assert!(matches!(err, PropertyError::Undeclared { component, .. } if component == "VCALENDAR"));

        calendar.set_text(PropertyName::Method, "PUBLISH").unwrap();
        calendar
            .set_text(PropertyName::Extension("X-WR-CALNAME".to_owned()), "Team")
            .unwrap();
        assert_eq!(calendar.method(), Some("PUBLISH"));
        assert_eq!(calendar.output_properties().len(), 5);
    }

    #[test]
    fn empty_values_follow_config() {
        let mut strict = Calendar::new(CalendarConfig::default().allow_empty(false));
        assert!(matches!(
            strict.set_text(PropertyName::Method, ""),
            Err(PropertyError::EmptyValue { .. })
        ));

        let mut lenient = Calendar::new(CalendarConfig::default());
        lenient.set_text(PropertyName::Method, "").unwrap();
        assert!(lenient.get_property(&PropertyName::Method).unwrap().is_empty());
    }

    #[test]
    fn components_are_copied() {
        let mut calendar = Calendar::new(CalendarConfig::default());
        calendar.add_component(event("a@x", "2024-01-01"));

        let mut fetched = calendar.get_component(&ComponentSelector::Index(1)).unwrap();
        fetched.set_text(PropertyName::Summary, "changed").unwrap();
        assert_eq!(calendar.get_component(&ComponentSelector::Index(1)).unwrap().summary(), None);

        let selector = ComponentSelector::Uid("a@x".to_owned());
        calendar.set_component(&selector, fetched);
        assert_eq!(
            calendar.get_component(&selector).unwrap().summary(),
            Some("changed")
        );
        assert_eq!(calendar.len(), 1);
    }

    #[test]
    fn adding_generates_identity() {
        let mut calendar = Calendar::new(CalendarConfig::default().unique_id("host"));
        calendar.add_component(Component::new(ComponentKind::VTodo));
        let todo = calendar.get_component(&ComponentKind::VTodo.into()).unwrap();
        assert!(todo.uid().unwrap().ends_with("@host"));
        assert!(todo.get_property(&PropertyName::DtStamp, None).is_some());
    }

    #[test]
    fn cursor_walks_and_restarts() {
        let mut calendar = Calendar::new(CalendarConfig::default());
        calendar.add_component(event("a", "2024-01-01"));
        calendar.add_component(event("b", "2024-01-02"));

        let uids: Vec<_> = std::iter::from_fn(|| calendar.next_component())
            .map(|c| c.uid().unwrap().to_owned())
            .collect();
        assert_eq!(uids, ["a", "b"]);
        assert_eq!(calendar.next_component().unwrap().uid(), Some("a"));
    }

    #[test]
    fn delete_by_selector() {
        let mut calendar = Calendar::new(CalendarConfig::default());
        calendar.add_component(event("a", "2024-01-01"));
        calendar.add_component(Component::new(ComponentKind::VTodo));
        calendar.add_component(event("b", "2024-01-02"));

        assert!(calendar.delete_component(&ComponentSelector::Kind(ComponentKind::VEvent, 2)));
        assert!(!calendar.delete_component(&ComponentSelector::Uid("b".to_owned())));
        assert!(!calendar.delete_component(&ComponentSelector::Index(5)));
        assert_eq!(calendar.len(), 2);
    }

    #[test]
    fn sorts_time_zones_first_then_by_start() {
        let mut calendar = Calendar::new(CalendarConfig::default());
        calendar.add_component(event("late", "2024-03-01 09:00:00"));
        calendar.add_component(event("early", "2024-01-01 09:00:00"));
        let mut zone = Component::new(ComponentKind::VTimeZone);
        zone.set_text(PropertyName::TzId, "Europe/Berlin").unwrap();
        calendar.add_component(zone);

        let mut occurrence = event("moved", "2024-05-01 09:00:00");
        occurrence
            .set_text(
                PropertyName::Extension(KW_X_CURRENT_DTSTART.to_owned()),
                "2024-02-01 09:00:00",
            )
            .unwrap();
        calendar.add_component(occurrence);

        calendar.sort();
        let kinds: Vec<_> = calendar.components().map(|c| c.kind()).collect();
        assert_eq!(kinds.first(), Some(&ComponentKind::VTimeZone));
        let uids: Vec<_> = calendar
            .components()
            .skip(1)
            .map(|c| c.uid().unwrap().to_owned())
            .collect();
        assert_eq!(uids, ["early", "moved", "late"]);
    }
}
