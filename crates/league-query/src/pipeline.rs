//! The generic filter, search, sort evaluation.
//!
//! Every list view supplies three things for its item type:
//!
//! - a filter ([`Filter`]), a conjunction of [`Selection`] clauses;
//! - search projections ([`Searchable`]), the strings a term is matched
//!   against;
//! - a sort key ([`SortKey`]) chosen from a fixed enumeration.
//!
//! [`evaluate`] runs the stages in that order on its own copy of the
//! input. The sort is stable and descending order reverses the
//! comparator, so equal keys keep their filtered order in both directions.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::locale::DateLocale;

// ---------------------------------------------------------------------------
// Filter clauses
// ---------------------------------------------------------------------------

/// One filter clause over a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Selection<T> {
    /// No restriction.
    #[default]
    All,
    /// The field must equal this value.
    Only(T),
    /// The field must equal one of these values.
    AnyOf(Vec<T>),
}

impl<T: PartialEq> Selection<T> {
    /// Whether `value` passes this clause.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
            Self::AnyOf(wanted) => wanted.contains(value),
        }
    }

    /// Whether an optional value passes. A missing value only passes
    /// [`Selection::All`].
    pub fn admits_opt(&self, value: Option<&T>) -> bool {
        value.map_or_else(|| matches!(self, Self::All), |value| self.admits(value))
    }

    /// Whether any of `values` passes.
    pub fn admits_any<'a>(&self, values: impl IntoIterator<Item = Option<&'a T>>) -> bool
    where
        T: 'a,
    {
        matches!(self, Self::All) || values.into_iter().flatten().any(|v| self.admits(v))
    }
}

/// Decides whether an item survives the filter stage.
pub trait Filter<T> {
    /// Whether `item` satisfies every clause.
    fn admits(&self, item: &T) -> bool;
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// An item the search stage can match against.
pub trait Searchable {
    /// The derived strings a search term is compared with.
    fn projections(&self, locale: DateLocale) -> Vec<String>;

    /// Whether any projection contains `needle`, which must already be
    /// lowercased and non-empty.
    fn matches_term(&self, needle: &str, locale: DateLocale) -> bool {
        self.projections(locale)
            .iter()
            .any(|p| p.to_lowercase().contains(needle))
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smaller keys first.
    #[default]
    Ascending,
    /// Larger keys first.
    Descending,
}

impl SortOrder {
    /// Apply this direction to an ascending comparison.
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// A sort key for items of type `T`.
pub trait SortKey<T>: Copy {
    /// Ascending comparison of `a` and `b` under this key.
    fn compare(self, a: &T, b: &T) -> Ordering;
}

/// Compare two strings case-insensitively.
pub fn compare_folded(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

// ---------------------------------------------------------------------------
// Query and evaluation
// ---------------------------------------------------------------------------

/// The parameter tuple of one list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query<F, K> {
    /// Filter clauses, combined with AND.
    pub filter: F,
    /// Free-text search term. Blank (after trimming) matches everything.
    pub search: String,
    /// Sort key. `None` keeps the filtered order.
    pub sort: Option<K>,
    /// Sort direction.
    pub order: SortOrder,
}

impl<F: Default, K> Default for Query<F, K> {
    fn default() -> Self {
        Self {
            filter: F::default(),
            search: String::new(),
            sort: None,
            order: SortOrder::default(),
        }
    }
}

impl<F: Default, K> Query<F, K> {
    /// A query with no filter or search, sorted by `key`.
    pub fn sorted(key: K, order: SortOrder) -> Self {
        Self {
            filter: F::default(),
            search: String::new(),
            sort: Some(key),
            order,
        }
    }
}

impl<F, K> Query<F, K> {
    /// Replace the filter.
    #[must_use]
    pub fn with_filter(mut self, filter: F) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the search term.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

/// Run filter, search and sort over `items` and return the result.
///
/// The input is never modified. The same input and query always give the
/// same output, and evaluating an output again with the same query gives
/// it back unchanged.
pub fn evaluate<T, F, K>(items: &[T], query: &Query<F, K>, locale: DateLocale) -> Vec<T>
where
    T: Clone + Searchable,
    F: Filter<T>,
    K: SortKey<T>,
{
    // Trimming only decides whether the term is blank; surrounding spaces
    // are part of the match.
    let blank = query.search.trim().is_empty();
    let needle = query.search.to_lowercase();

    let mut out: Vec<T> = items
        .iter()
        .filter(|item| query.filter.admits(item))
        .filter(|item| blank || item.matches_term(&needle, locale))
        .cloned()
        .collect();

    if let Some(key) = query.sort {
        // `sort_by` is stable.
        out.sort_by(|a, b| query.order.apply(key.compare(a, b)));
    }

    tracing::trace!(
        input = items.len(),
        output = out.len(),
        search = %needle,
        "Query evaluated"
    );
    out
}
