use unicode_normalization::UnicodeNormalization;

use super::metadata::MetadataRecord;

/// Fixed page size of the admin list view.
pub const PAGE_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Active,
    Inactive,
}

impl ListMode {
    pub fn flipped(self) -> Self {
        match self {
            ListMode::Active => ListMode::Inactive,
            ListMode::Inactive => ListMode::Active,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, ListMode::Active)
    }
}

/// In-memory list state for the current mode: the full fetched set, the
/// derived filtered list (always sorted ascending by id) and the 1-based
/// current page over it.
#[derive(Debug, Clone)]
pub struct MetadataListing {
    mode: ListMode,
    records: Vec<MetadataRecord>,
    filtered: Vec<MetadataRecord>,
    title_filter: String,
    date_filter: String,
    current_page: usize,
}

impl Default for MetadataListing {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataListing {
    pub fn new() -> Self {
        Self {
            mode: ListMode::Active,
            records: Vec::new(),
            filtered: Vec::new(),
            title_filter: String::new(),
            date_filter: String::new(),
            current_page: 1,
        }
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn filtered(&self) -> &[MetadataRecord] {
        &self.filtered
    }

    pub fn title_filter(&self) -> &str {
        &self.title_filter
    }

    pub fn date_filter(&self) -> &str {
        &self.date_filter
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn find(&self, id: i64) -> Option<&MetadataRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Replaces the held set after a fetch. Filters are cleared on every
    /// reload; the page survives only for post-mutation refreshes.
    pub fn reload(&mut self, records: Vec<MetadataRecord>, preserve_page: bool) {
        self.title_filter.clear();
        self.date_filter.clear();
        self.records = records;
        if !preserve_page {
            self.current_page = 1;
        }
        self.derive();
    }

    /// Flips the active/inactive view and resets filters and page. The
    /// caller is expected to refetch afterwards.
    pub fn flip_mode(&mut self) -> ListMode {
        self.mode = self.mode.flipped();
        self.title_filter.clear();
        self.date_filter.clear();
        self.current_page = 1;
        self.derive();
        self.mode
    }

    /// Filter changes re-derive in place; the current page is deliberately
    /// left alone, so a shrinking result set can render an empty page.
    pub fn set_title_filter(&mut self, filter: impl Into<String>) {
        self.title_filter = filter.into();
        self.derive();
    }

    pub fn set_date_filter(&mut self, filter: impl Into<String>) {
        self.date_filter = filter.into();
        self.derive();
    }

    pub fn clear_filters(&mut self) {
        self.title_filter.clear();
        self.date_filter.clear();
        self.derive();
    }

    /// Direct page set, unclamped. An out-of-range page yields an empty
    /// slice from [`visible_page`](Self::visible_page).
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page;
    }

    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE)
    }

    pub fn visible_page(&self) -> &[MetadataRecord] {
        let start = self.current_page.saturating_sub(1).saturating_mul(PAGE_SIZE);
        if start >= self.filtered.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        &self.filtered[start..end]
    }

    /// Reconciles one server-echoed record into the held set: replaced in
    /// place while it still belongs to the current mode, dropped once its
    /// active flag says otherwise.
    pub fn apply_mutation(&mut self, record: MetadataRecord) {
        let belongs = record.is_active() == self.mode.is_active();
        if let Some(index) = self.records.iter().position(|held| held.id == record.id) {
            if belongs {
                self.records[index] = record;
            } else {
                self.records.remove(index);
            }
        } else if belongs {
            self.records.push(record);
        }
        self.derive();
    }

    pub fn remove(&mut self, id: i64) {
        self.records.retain(|record| record.id != id);
        self.derive();
    }

    fn derive(&mut self) {
        let title_needle = normalize_text(&self.title_filter);
        let mut filtered: Vec<MetadataRecord> = self
            .records
            .iter()
            .filter(|record| {
                title_needle.is_empty() || normalize_text(&record.title).contains(&title_needle)
            })
            .filter(|record| self.matches_date(record))
            .cloned()
            .collect();
        filtered.sort_by_key(|record| record.id);
        self.filtered = filtered;
    }

    fn matches_date(&self, record: &MetadataRecord) -> bool {
        if self.date_filter.is_empty() {
            return true;
        }
        record
            .publication_date
            .as_deref()
            .is_some_and(|date| date.contains(&self.date_filter))
    }
}

/// Lowercases, decomposes (NFD), then strips combining marks and the
/// literal punctuation `. , : -` so that title matching is case- and
/// diacritic-insensitive.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|ch| !matches!(ch, '\u{0300}'..='\u{036f}' | '.' | ',' | ':' | '-'))
        .collect()
}
