//! Query shaping for list endpoints: filter, then search, then order.
//!
//! Shaping works on an already-fetched collection and never touches the
//! store. Each resource declares a [`ListShape`] naming which fields may be
//! filtered, searched and ordered on; anything else in the query string is
//! ignored.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::error::FieldErrors;
use crate::types::Timestamp;

pub const SEARCH_PARAM: &str = "search";
pub const ORDERING_PARAM: &str = "ordering";

/// A field value as seen by the shaper. Variants order as listed, so a
/// `Null` sorts before any value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Null,
    Int(i64),
    Text(String),
    Time(Timestamp),
}

impl FieldValue {
    fn searchable_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(s) => Some(Cow::Borrowed(s)),
            FieldValue::Int(n) => Some(Cow::Owned(n.to_string())),
            FieldValue::Null | FieldValue::Time(_) => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(n.into())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<Timestamp> for FieldValue {
    fn from(t: Timestamp) -> Self {
        FieldValue::Time(t)
    }
}

/// Named field access for shaping. Related fields use `relation__field`
/// names (e.g. `author__name`).
pub trait Fields {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// How a filter parameter's raw text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Integer,
}

/// Declared query capabilities of a resource.
#[derive(Debug, Clone, Copy)]
pub struct ListShape {
    pub filters: &'static [(&'static str, FilterKind)],
    pub search: &'static [&'static str],
    pub ordering: &'static [&'static str],
    /// Used when the request names no valid ordering field. May carry a
    /// leading `-`.
    pub default_ordering: &'static str,
}

/// Recognized list query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: Vec<(String, String)>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl ListQuery {
    /// Split raw query-string pairs into search, ordering and filter terms.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                SEARCH_PARAM => query.search = Some(value),
                ORDERING_PARAM => query.ordering = Some(value),
                _ => query.filters.push((key, value)),
            }
        }
        query
    }
}

#[derive(Debug)]
enum Target {
    Text(String),
    Int(i64),
}

impl ListShape {
    /// Produce the shaped view of `items`.
    ///
    /// Fails only when a declared integer filter receives a non-integer
    /// value.
    pub fn apply<T: Fields>(
        &self,
        items: Vec<T>,
        query: &ListQuery,
    ) -> Result<Vec<T>, FieldErrors> {
        let filters = self.filter_targets(query)?;

        let mut items: Vec<T> = items
            .into_iter()
            .filter(|item| filters.iter().all(|(name, target)| matches_exact(item, name, target)))
            .collect();

        if let Some(needle) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let needle = needle.to_lowercase();
            items.retain(|item| self.matches_search(item, &needle));
        }

        Ok(self.order(items, query.ordering.as_deref()))
    }

    fn filter_targets<'q>(
        &self,
        query: &'q ListQuery,
    ) -> Result<Vec<(&'q str, Target)>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut targets = Vec::new();

        for (name, raw) in &query.filters {
            let Some((_, kind)) = self
                .filters
                .iter()
                .find(|(declared, _)| *declared == name.as_str())
            else {
                continue;
            };
            match kind {
                FilterKind::Text => targets.push((name.as_str(), Target::Text(raw.clone()))),
                FilterKind::Integer => match raw.trim().parse::<i64>() {
                    Ok(n) => targets.push((name.as_str(), Target::Int(n))),
                    Err(_) => errors.add(name.as_str(), "Enter a whole number."),
                },
            }
        }

        errors.into_result(targets)
    }

    fn matches_search<T: Fields>(&self, item: &T, needle: &str) -> bool {
        self.search.iter().any(|name| {
            item.field(name)
                .as_ref()
                .and_then(FieldValue::searchable_text)
                .is_some_and(|text| text.to_lowercase().contains(needle))
        })
    }

    fn order<T: Fields>(&self, items: Vec<T>, requested: Option<&str>) -> Vec<T> {
        let mut keys = self.ordering_keys(requested.unwrap_or_default());
        if keys.is_empty() {
            keys = self.ordering_keys_unchecked(self.default_ordering);
        }
        if keys.is_empty() {
            return items;
        }

        let mut decorated: Vec<(Vec<FieldValue>, T)> = items
            .into_iter()
            .map(|item| {
                let values = keys
                    .iter()
                    .map(|(name, _)| item.field(name).unwrap_or(FieldValue::Null))
                    .collect();
                (values, item)
            })
            .collect();

        // sort_by is stable: ties keep store iteration order.
        decorated.sort_by(|(a, _), (b, _)| {
            keys.iter()
                .zip(a.iter().zip(b.iter()))
                .map(|((_, descending), (x, y))| if *descending { y.cmp(x) } else { x.cmp(y) })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        decorated.into_iter().map(|(_, item)| item).collect()
    }

    fn ordering_keys<'a>(&self, spec: &'a str) -> Vec<(&'a str, bool)> {
        parse_ordering(spec)
            .filter(|(name, _)| self.ordering.iter().any(|declared| declared == name))
            .collect()
    }

    fn ordering_keys_unchecked<'a>(&self, spec: &'a str) -> Vec<(&'a str, bool)> {
        parse_ordering(spec).collect()
    }
}

/// `"-year,title"` → `[("year", true), ("title", false)]`.
fn parse_ordering(spec: &str) -> impl Iterator<Item = (&str, bool)> {
    spec.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| match term.strip_prefix('-') {
            Some(name) => (name, true),
            None => (term, false),
        })
}

fn matches_exact<T: Fields>(item: &T, name: &str, target: &Target) -> bool {
    match (item.field(name), target) {
        (Some(FieldValue::Int(n)), Target::Int(want)) => n == *want,
        (Some(FieldValue::Text(s)), Target::Text(want)) => s == *want,
        (Some(FieldValue::Int(n)), Target::Text(want)) => n.to_string() == *want,
        _ => false,
    }
}
