//! Searchable, sortable, paged table state.
//!
//! Every dashboard screen holds one [`TableView`]. The rows it displays are a
//! pure function of its state (records, search text, sort key), computed by
//! [`render`] on each draw. Nothing here mutates the backing records.

use std::cmp::Ordering;

use serde_json::Value;

use crate::api::types::Record;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Placeholder shown when no row survives the search.
pub const EMPTY_PLACEHOLDER: &str = "No records found";

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Header indicator.
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// The active sort: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    /// Sort ascending by `field`.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }
}

/// Compute the displayed rows for the given state.
///
/// Keeps records whose field values contain `search` (case-insensitive),
/// then orders them by `sort` if set. Without a sort key the insertion order
/// is preserved. The sort is stable, so tied rows keep their relative order.
pub fn render<'a>(records: &'a [Record], search: &str, sort: Option<&SortKey>) -> Vec<&'a Record> {
    let needle = search.to_lowercase();
    let mut rows: Vec<&Record> = records
        .iter()
        .filter(|record| matches_search(record, &needle))
        .collect();

    if let Some(key) = sort {
        rows.sort_by(|a, b| {
            key.direction
                .apply(compare_values(a.get(&key.field), b.get(&key.field)))
        });
    }

    rows
}

/// Check whether a record matches an already-lowercased search needle.
///
/// The haystack is every field value joined with a single space.
pub fn matches_search(record: &Record, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let haystack = record
        .values()
        .map(value_text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    haystack.contains(needle)
}

/// Render a field value as display text.
///
/// Null renders as an empty string.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Compare two optional field values.
///
/// Strings compare lexicographically, numbers numerically. Values of
/// different kinds order by `missing/null < bool < number < string < other`.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (rank_a, rank_b) = (kind_rank(a), kind_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) if rank_a == 4 => x.to_string().cmp(&y.to_string()),
        _ => Ordering::Equal,
    }
}

fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    }
}

/// The current page of a [`TableView`], computed in one pass.
#[derive(Debug)]
pub struct PageSlice<'a> {
    /// Rows on this page, in display order.
    pub rows: Vec<&'a Record>,
    /// Rows that survive the search across all pages.
    pub total: usize,
    /// Footer text, e.g. `Page 1 of 3`.
    pub label: String,
}

/// State for one table screen.
#[derive(Debug, Clone)]
pub struct TableView {
    /// The full, unfiltered list as fetched.
    records: Vec<Record>,
    /// Columns to display. Derived from the first record when empty.
    columns: Vec<String>,
    /// Current search text.
    search: String,
    /// Current sort, if any.
    sort: Option<SortKey>,
    /// Zero-based page index.
    page: usize,
    /// Rows per page.
    page_size: usize,
    /// Selected row within the current page.
    selected: usize,
}

impl TableView {
    /// Create an empty table view.
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            columns: Vec::new(),
            search: String::new(),
            sort: None,
            page: 0,
            page_size: page_size.max(1),
            selected: 0,
        }
    }

    /// Set the displayed columns.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the backing records.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.page = 0;
        self.selected = 0;
    }

    /// The backing records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Columns to display.
    pub fn columns(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        self.records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The current search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Replace the search text.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.reset_position();
    }

    /// Append a character to the search text.
    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.reset_position();
    }

    /// Remove the last character from the search text.
    pub fn pop_search_char(&mut self) -> Option<char> {
        let popped = self.search.pop();
        if popped.is_some() {
            self.reset_position();
        }
        popped
    }

    /// The current sort key.
    pub fn sort(&self) -> Option<&SortKey> {
        self.sort.as_ref()
    }

    /// Sort by `field`.
    ///
    /// Selecting the current sort field flips the direction; selecting a new
    /// field sorts ascending.
    pub fn toggle_sort(&mut self, field: &str) {
        self.sort = match self.sort.take() {
            Some(key) if key.field == field => Some(SortKey {
                field: key.field,
                direction: key.direction.flipped(),
            }),
            _ => Some(SortKey::ascending(field)),
        };
        self.reset_position();
    }

    /// Sort by the column at `index`, if it exists.
    pub fn toggle_sort_column(&mut self, index: usize) {
        if let Some(field) = self.columns().get(index) {
            let field = field.clone();
            self.toggle_sort(&field);
        }
    }

    /// Remove the sort, restoring insertion order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.reset_position();
    }

    /// All rows that survive the search, in display order.
    pub fn visible(&self) -> Vec<&Record> {
        render(&self.records, &self.search, self.sort.as_ref())
    }

    /// Whether the search left nothing to show.
    pub fn is_empty(&self) -> bool {
        self.visible().is_empty()
    }

    /// Number of pages. Always at least one.
    pub fn page_count(&self) -> usize {
        self.pages_for(self.visible().len())
    }

    fn pages_for(&self, len: usize) -> usize {
        ((len + self.page_size - 1) / self.page_size).max(1)
    }

    /// One-based current page.
    pub fn page(&self) -> usize {
        self.page + 1
    }

    /// Filter and sort once, then cut out the current page.
    pub fn current_page(&self) -> PageSlice<'_> {
        let visible = self.visible();
        let total = visible.len();
        let label = format!("Page {} of {}", self.page(), self.pages_for(total));
        let rows = visible
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect();
        PageSlice { rows, total, label }
    }

    /// The rows on the current page.
    pub fn page_rows(&self) -> Vec<&Record> {
        self.current_page().rows
    }

    /// Move to the next page. Returns false on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            self.selected = 0;
            true
        } else {
            false
        }
    }

    /// Move to the previous page. Returns false on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            self.selected = 0;
            true
        } else {
            false
        }
    }

    /// Selected row index within the page.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Move the selection down, wrapping within the page.
    pub fn select_next(&mut self) {
        let len = self.page_rows().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the selection up, wrapping within the page.
    pub fn select_prev(&mut self) {
        let len = self.page_rows().len();
        if len > 0 {
            self.selected = if self.selected == 0 {
                len - 1
            } else {
                self.selected - 1
            };
        }
    }

    /// The selected record, if any.
    pub fn selected_record(&self) -> Option<&Record> {
        self.page_rows().get(self.selected).copied()
    }

    fn reset_position(&mut self) {
        self.page = 0;
        self.selected = 0;
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn people() -> Vec<Record> {
        vec![
            record(json!({ "name": "Ana", "age": 30 })),
            record(json!({ "name": "Bo", "age": 20 })),
        ]
    }

    fn names(rows: &[&Record]) -> Vec<String> {
        rows.iter()
            .map(|r| value_text(r.get("name").unwrap_or(&Value::Null)))
            .collect()
    }

    #[test]
    fn test_sort_by_age_then_toggle() {
        let mut view = TableView::default();
        view.set_records(people());

        view.toggle_sort("age");
        assert_eq!(names(&view.visible()), vec!["Bo", "Ana"]);

        view.toggle_sort("age");
        assert_eq!(view.sort().unwrap().direction, SortDirection::Descending);
        assert_eq!(names(&view.visible()), vec!["Ana", "Bo"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let records = people();
        let rows = render(&records, "an", None);
        assert_eq!(names(&rows), vec!["Ana"]);

        let rows = render(&records, "AN", None);
        assert_eq!(names(&rows), vec!["Ana"]);
    }

    #[test]
    fn test_search_matches_numbers() {
        let records = people();
        let rows = render(&records, "20", None);
        assert_eq!(names(&rows), vec!["Bo"]);
    }

    #[test]
    fn test_search_does_not_straddle_fields() {
        let row = record(json!({ "name": "Ana", "age": 30 }));
        assert!(!matches_search(&row, "ana30"));
        assert!(matches_search(&row, "ana 30"));
    }

    #[test]
    fn test_empty_search_matches_all() {
        let records = people();
        assert_eq!(render(&records, "", None).len(), 2);
    }

    #[test]
    fn test_no_sort_preserves_insertion_order() {
        let records = vec![
            record(json!({ "name": "Zed" })),
            record(json!({ "name": "Ana" })),
            record(json!({ "name": "Mo" })),
        ];
        assert_eq!(names(&render(&records, "", None)), vec!["Zed", "Ana", "Mo"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = vec![
            record(json!({ "name": "Ana", "club": "Lions" })),
            record(json!({ "name": "Bo", "club": "Tigers" })),
            record(json!({ "name": "Lena", "club": null })),
        ];
        let once: Vec<Record> = render(&records, "li", None).into_iter().cloned().collect();
        let twice: Vec<Record> = render(&once, "li", None).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_descending_is_exact_reverse_without_ties() {
        let records = vec![
            record(json!({ "name": "Cleo", "score": 7 })),
            record(json!({ "name": "Ana", "score": 3 })),
            record(json!({ "name": "Bo", "score": 11 })),
            record(json!({ "name": "Dan", "score": 1.5 })),
        ];
        let asc = render(&records, "", Some(&SortKey::ascending("score")));
        let descending = SortKey {
            field: "score".to_string(),
            direction: SortDirection::Descending,
        };
        let mut desc = render(&records, "", Some(&descending));
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_numbers_sort_numerically() {
        let records = vec![
            record(json!({ "n": 10 })),
            record(json!({ "n": 9 })),
            record(json!({ "n": 100 })),
        ];
        let rows = render(&records, "", Some(&SortKey::ascending("n")));
        let values: Vec<String> = rows.iter().map(|r| value_text(&r["n"])).collect();
        assert_eq!(values, vec!["9", "10", "100"]);
    }

    #[test]
    fn test_strings_sort_lexicographically() {
        let records = vec![
            record(json!({ "n": "10" })),
            record(json!({ "n": "9" })),
            record(json!({ "n": "100" })),
        ];
        let rows = render(&records, "", Some(&SortKey::ascending("n")));
        let values: Vec<String> = rows.iter().map(|r| value_text(&r["n"])).collect();
        assert_eq!(values, vec!["10", "100", "9"]);
    }

    #[test]
    fn test_missing_and_null_sort_first() {
        let records = vec![
            record(json!({ "name": "Ana", "club": "Lions" })),
            record(json!({ "name": "Bo" })),
            record(json!({ "name": "Cleo", "club": null })),
        ];
        let rows = render(&records, "", Some(&SortKey::ascending("club")));
        assert_eq!(names(&rows), vec!["Bo", "Cleo", "Ana"]);
    }

    #[test]
    fn test_new_column_resets_to_ascending() {
        let mut view = TableView::default();
        view.set_records(people());
        view.toggle_sort("age");
        view.toggle_sort("age");
        assert_eq!(view.sort().unwrap().direction, SortDirection::Descending);

        view.toggle_sort("name");
        assert_eq!(view.sort(), Some(&SortKey::ascending("name")));
    }

    #[test]
    fn test_no_match_shows_placeholder_state() {
        let mut view = TableView::default();
        view.set_records(people());
        view.set_search("zzz");
        assert!(view.is_empty());
        assert!(view.page_rows().is_empty());
        assert_eq!(view.current_page().label, "Page 1 of 1");
        assert!(view.selected_record().is_none());
    }

    #[test]
    fn test_render_does_not_mutate_records() {
        let mut view = TableView::default();
        view.set_records(people());
        view.toggle_sort("age");
        view.set_search("bo");
        let _ = view.visible();
        assert_eq!(view.records(), people().as_slice());
    }

    #[test]
    fn test_pagination() {
        let records: Vec<Record> = (0..7).map(|i| record(json!({ "n": i }))).collect();
        let mut view = TableView::new(3);
        view.set_records(records);

        assert_eq!(view.current_page().label, "Page 1 of 3");
        assert_eq!(view.page_rows().len(), 3);
        assert!(view.next_page());
        assert!(view.next_page());
        assert_eq!(view.page_rows().len(), 1);
        assert!(!view.next_page());
        assert_eq!(view.current_page().label, "Page 3 of 3");
        assert!(view.prev_page());
        assert_eq!(view.page(), 2);
    }

    #[test]
    fn test_current_page_agrees_with_accessors() {
        let records: Vec<Record> = (0..7).map(|i| record(json!({ "n": i }))).collect();
        let mut view = TableView::new(3);
        view.set_records(records);
        view.toggle_sort("n");
        view.toggle_sort("n");
        view.next_page();

        let page = view.current_page();
        assert_eq!(page.total, 7);
        assert_eq!(page.label, "Page 2 of 3");
        let numbers: Vec<String> = page.rows.iter().map(|r| value_text(&r["n"])).collect();
        assert_eq!(numbers, vec!["3", "2", "1"]);
        assert_eq!(page.rows, view.page_rows());

        view.set_search("zzz");
        let page = view.current_page();
        assert_eq!((page.total, page.rows.len()), (0, 0));
        assert_eq!(page.label, "Page 1 of 1");
    }

    #[test]
    fn test_search_resets_page() {
        let records: Vec<Record> = (0..7).map(|i| record(json!({ "n": i }))).collect();
        let mut view = TableView::new(3);
        view.set_records(records);
        view.next_page();
        view.push_search_char('1');
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_selection_wraps() {
        let mut view = TableView::default();
        view.set_records(people());
        view.select_prev();
        assert_eq!(view.selected(), 1);
        view.select_next();
        assert_eq!(view.selected(), 0);
        assert_eq!(value_text(&view.selected_record().unwrap()["name"]), "Ana");
    }

    #[test]
    fn test_columns_default_to_first_record_keys() {
        let mut view = TableView::default();
        view.set_records(people());
        assert_eq!(view.columns(), vec!["name", "age"]);

        let view = TableView::default().with_columns(["age"]);
        assert_eq!(view.columns(), vec!["age"]);
    }

    #[test]
    fn test_toggle_sort_column_by_index() {
        let mut view = TableView::default().with_columns(["name", "age"]);
        view.set_records(people());
        view.toggle_sort_column(1);
        assert_eq!(view.sort(), Some(&SortKey::ascending("age")));
        view.toggle_sort_column(9);
        assert_eq!(view.sort(), Some(&SortKey::ascending("age")));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!("x")), "x");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!(2.5)), "2.5");
    }
}
