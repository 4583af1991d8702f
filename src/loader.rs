// Incremental disclosure over the full photo id sequence. The grid only
// materializes a prefix of the ids ("the visible window") and grows it a
// page at a time as the user scrolls toward the end.

use crate::config::LoaderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// No ids known (before the first fetch, or after an empty/failed one).
    #[default]
    Empty,
    /// Id fetch in flight.
    Loading,
    /// Some ids visible, more remain.
    Partial,
    /// Every id is visible.
    Complete,
}

pub struct LoaderWindow {
    ids: Vec<String>,
    visible_count: usize,
    columns: usize,
    page_size: usize,
    page_rows: usize,
    near_end_px: f32,
    phase: LoadPhase,
}

impl LoaderWindow {
    pub fn new(config: &LoaderConfig) -> Self {
        let page_rows = config.page_rows();
        Self {
            ids: Vec::new(),
            visible_count: 0,
            columns: 1,
            page_size: page_rows,
            page_rows,
            near_end_px: config.near_end_px(),
            phase: LoadPhase::Empty,
        }
    }

    pub fn begin_fetch(&mut self) {
        self.phase = LoadPhase::Loading;
    }

    /// Install the fetched id sequence and show the first page.
    pub fn reset(&mut self, all_ids: Vec<String>) {
        self.ids = all_ids;
        self.visible_count = self.page_size.min(self.ids.len());
        self.update_phase();
    }

    /// A failed id fetch is an empty gallery, not an error state.
    pub fn fetch_failed(&mut self) {
        self.ids.clear();
        self.visible_count = 0;
        self.phase = LoadPhase::Empty;
    }

    /// Responsive layout changed its column count. The window is reset to a
    /// single fresh page, not grown additively, so decreasing the column
    /// count shrinks the visible window and Complete can move back to
    /// Partial.
    pub fn on_columns_change(&mut self, columns: usize) {
        self.columns = columns.max(1);
        self.page_size = self.columns * self.page_rows;
        self.visible_count = self.page_size.min(self.ids.len());
        if self.phase != LoadPhase::Loading {
            self.update_phase();
        }
    }

    fn grow(&mut self) -> bool {
        if self.phase != LoadPhase::Partial {
            return false;
        }
        self.visible_count = (self.visible_count + self.page_size).min(self.ids.len());
        self.update_phase();
        true
    }

    /// The scroll position came within `near_end_px` of the scrollable
    /// extent; disclose one more page. Returns whether the window grew.
    pub fn on_scroll_near_end(&mut self) -> bool {
        self.grow()
    }

    /// The laid-out content is shorter than the container, so no scroll
    /// event will ever fire. Grows one page so disclosure cannot stall on
    /// tall viewports or tiny galleries.
    pub fn on_content_underfilled(&mut self) -> bool {
        self.grow()
    }

    /// Proximity heuristic: within `near_end_px` units of the bottom of the
    /// scrollable extent.
    pub fn near_end(&self, scroll_top: f32, client_height: f32, content_height: f32) -> bool {
        content_height - (scroll_top + client_height) <= self.near_end_px
    }

    fn update_phase(&mut self) {
        self.phase = if self.ids.is_empty() {
            LoadPhase::Empty
        } else if self.visible_count < self.ids.len() {
            LoadPhase::Partial
        } else {
            LoadPhase::Complete
        };
    }

    pub fn visible_ids(&self) -> &[String] {
        &self.ids[..self.visible_count]
    }

    pub fn all_ids(&self) -> &[String] {
        &self.ids
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_complete(&self) -> bool {
        self.phase == LoadPhase::Complete
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }
}
