use std::collections::BTreeSet;
use std::sync::Arc;

use crate::data::filter::{apply_filters, FilterConfig};
use crate::data::group::{group_rows, pin_options, Group, Pin, ViewMode};
use crate::data::model::{Field, MetadataTable};

// ---------------------------------------------------------------------------
// Browser state
// ---------------------------------------------------------------------------

/// Everything a comparison view needs, independent of how it is rendered.
#[derive(Debug, Clone)]
pub struct BrowserState {
    /// Loaded table, shared with the cache that produced it.
    pub table: Arc<MetadataTable>,

    /// Search text and facet selections.
    pub filters: FilterConfig,

    /// Rows passing the current filters (cached).
    pub visible: MetadataTable,

    /// Whether a sample or a method is held fixed.
    pub view_mode: ViewMode,

    /// Attribute varied across groups.
    pub group_by: Field,

    /// Chosen pin value; `None` means the first available option.
    pub pin_value: Option<String>,
}

impl BrowserState {
    /// Start with every facet fully selected.
    pub fn new(table: Arc<MetadataTable>) -> Self {
        let filters = FilterConfig::all_selected(&table);
        let visible = (*table).clone();
        Self {
            table,
            filters,
            visible,
            view_mode: ViewMode::default(),
            group_by: Field::Method,
            pin_value: None,
        }
    }

    /// Recompute `visible` after a filter change.
    pub fn refilter(&mut self) {
        self.visible = apply_filters(&self.table, &self.filters);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = search.into();
        self.refilter();
    }

    /// Toggle a single value in a facet's selection.
    pub fn toggle_filter_value(&mut self, field: Field, value: &str) {
        let selected = self.filters.selections.entry(field).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Restrict a facet to exactly `values`.
    pub fn select_only<I, S>(&mut self, field: Field, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .selections
            .insert(field, values.into_iter().map(Into::into).collect());
        self.refilter();
    }

    /// Select all values in a facet.
    pub fn select_all(&mut self, field: Field) {
        self.filters
            .selections
            .insert(field, self.table.unique_values(field));
        self.refilter();
    }

    /// Deselect all values in a facet.
    pub fn select_none(&mut self, field: Field) {
        self.filters.selections.insert(field, BTreeSet::new());
        self.refilter();
    }

    /// Pin values offered for the current view mode, from the visible rows.
    pub fn pin_options(&self) -> Vec<String> {
        pin_options(&self.visible, self.view_mode)
    }

    /// The pin in effect: the chosen value, or the first option.
    pub fn current_pin(&self) -> Option<Pin> {
        let value = match &self.pin_value {
            Some(v) => v.clone(),
            None => self.pin_options().into_iter().next()?,
        };
        Some(Pin::new(self.view_mode, value))
    }

    /// Groups for the current pin over the visible rows.
    pub fn groups(&self) -> Vec<Group> {
        match self.current_pin() {
            Some(pin) => group_rows(&self.visible, &pin, self.group_by),
            None => Vec::new(),
        }
    }
}
