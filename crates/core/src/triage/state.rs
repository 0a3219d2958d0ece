//! Foreground UI state.

use std::time::{Duration, Instant};

use octotriage_domain::constants::UPDATE_PROBE_INTERVAL_MS;
use octotriage_domain::{
    FacetAggregates, Notification, PinnedSearch, SidebarItem, StructuralFilter, ViewCounts,
    ViewFilter,
};

use super::sidebar::build_sidebar;
use crate::query::{parse, FilterPipeline};
use crate::sync::SyncPhase;

/// What the sidebar currently filters by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarSelection {
    Structural(StructuralFilter),
    /// A pinned search, resolved locally over the inbox.
    Pinned { name: String, raw_query: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    List,
    Sidebar,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: ViewFilter,
    /// Rows of the loaded view, before sidebar and search filtering.
    pub notifications: Vec<Notification>,
    pub counts: ViewCounts,
    pub facets: FacetAggregates,
    pub pinned: Vec<PinnedSearch>,
    /// Index into [`AppState::visible`].
    pub selected_index: usize,
    pub search_mode: bool,
    pub search_query: String,
    pub sidebar_selection: Option<SidebarSelection>,
    pub focus: Focus,
    /// Index into [`AppState::sidebar_items`].
    pub sidebar_index: usize,
    pub loading: bool,
    pub syncing: bool,
    pub sync_phase: SyncPhase,
    pub error: Option<String>,
    pub show_help: bool,
    pub probe_interval: Duration,
    pub last_probe: Option<Instant>,
    pub quit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Duration::from_millis(UPDATE_PROBE_INTERVAL_MS))
    }
}

impl AppState {
    pub fn new(probe_interval: Duration) -> Self {
        Self {
            view: ViewFilter::Inbox,
            notifications: Vec::new(),
            counts: ViewCounts::default(),
            facets: FacetAggregates::default(),
            pinned: Vec::new(),
            selected_index: 0,
            search_mode: false,
            search_query: String::new(),
            sidebar_selection: None,
            focus: Focus::List,
            sidebar_index: 0,
            loading: false,
            syncing: false,
            sync_phase: SyncPhase::Idle,
            error: None,
            show_help: false,
            probe_interval,
            last_probe: None,
            quit: false,
        }
    }

    /// View the store should load. Pinned searches resolve over the inbox.
    pub fn load_target(&self) -> ViewFilter {
        match self.sidebar_selection {
            Some(SidebarSelection::Pinned { .. }) => ViewFilter::Inbox,
            _ => self.view,
        }
    }

    pub fn structural_filter(&self) -> Option<&StructuralFilter> {
        match &self.sidebar_selection {
            Some(SidebarSelection::Structural(filter)) => Some(filter),
            _ => None,
        }
    }

    /// Loaded rows after the sidebar selection and the search query.
    pub fn visible(&self) -> Vec<&Notification> {
        let pinned = match &self.sidebar_selection {
            Some(SidebarSelection::Pinned { raw_query, .. }) => Some(parse(raw_query)),
            _ => None,
        };
        let search =
            (!self.search_query.trim().is_empty()).then(|| parse(&self.search_query));

        let selection = FilterPipeline::new(self.structural_filter(), pinned.as_ref());
        let refine = FilterPipeline::new(None, search.as_ref());
        self.notifications
            .iter()
            .filter(|n| selection.matches(n) && refine.matches(n))
            .collect()
    }

    pub fn selected(&self) -> Option<&Notification> {
        self.visible().get(self.selected_index).copied()
    }

    pub fn sidebar_items(&self) -> Vec<SidebarItem> {
        build_sidebar(&self.counts, &self.pinned, &self.facets)
    }

    pub fn has_sidebar_content(&self) -> bool {
        !self.facets.is_empty() || !self.pinned.is_empty()
    }

    /// Keep the list selection inside the visible rows.
    pub fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    /// Status line suffix shown next to the title.
    pub const fn activity_label(&self) -> Option<&'static str> {
        if self.syncing {
            Some("syncing…")
        } else if self.loading {
            Some("loading…")
        } else {
            None
        }
    }
}
