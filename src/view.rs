//! Display projection of the assignment list for one reader and search text.

use crate::library::{Assignment, ReaderId};

/// What the recent list is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    /// `None` shows every reader's files.
    pub reader: Option<ReaderId>,
    /// Case-insensitive file-name filter, matched as typed; blank means no filter.
    pub search: String,
    /// Maximum number of rows.
    pub limit: usize,
}

impl ViewQuery {
    pub fn new(reader: Option<ReaderId>, limit: usize) -> Self {
        Self {
            reader,
            search: String::new(),
            limit,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

/// Derive the rows to display.
///
/// Keeps assignments pinned to the selected reader plus unassigned ones when
/// that reader is the default, applies the search filter, orders by
/// `last_opened` descending (ties keep store order) and truncates to `limit`.
pub fn filter_assignments<'a>(
    assignments: &'a [Assignment],
    query: &ViewQuery,
    default_reader: Option<&ReaderId>,
) -> Vec<&'a Assignment> {
    let needle = (!query.search.trim().is_empty()).then(|| query.search.to_lowercase());
    let mut rows: Vec<&Assignment> = assignments
        .iter()
        .filter(|entry| matches_reader(entry, query.reader.as_ref(), default_reader))
        .filter(|entry| {
            needle
                .as_ref()
                .is_none_or(|needle| entry.file_name().to_lowercase().contains(needle.as_str()))
        })
        .collect();
    rows.sort_by(|a, b| b.last_opened.cmp(&a.last_opened));
    rows.truncate(query.limit);
    rows
}

fn matches_reader(
    entry: &Assignment,
    selected: Option<&ReaderId>,
    default_reader: Option<&ReaderId>,
) -> bool {
    let Some(selected) = selected else {
        return true;
    };
    match &entry.reader_id {
        Some(reader_id) => reader_id == selected,
        None => default_reader == Some(selected),
    }
}
