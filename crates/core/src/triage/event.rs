//! Reducer inputs and outputs.

use std::time::Instant;

use octotriage_domain::{
    FacetAggregates, Notification, NotificationId, NotificationPatch, ViewCounts, ViewFilter,
};

use crate::sync::{ActionPlan, ResyncOptions, TaskOutcome};

/// Store contents for one view, as loaded by [`Command::LoadView`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub view: ViewFilter,
    pub notifications: Vec<Notification>,
    pub counts: ViewCounts,
    pub facets: FacetAggregates,
}

/// Everything the state machine reacts to: user intents, frame ticks and
/// results of executed commands.
#[derive(Debug, Clone)]
pub enum Event {
    // Navigation
    MoveDown,
    MoveUp,
    JumpFirst,
    JumpLast,
    NextTab,
    PrevTab,
    ToggleFocus,
    FocusSidebar,
    FocusList,
    /// Enter/`o`: activate the sidebar row or open the selected notification.
    Activate,
    SetView(ViewFilter),
    SelectId(NotificationId),
    SelectPinned(String),

    // Search
    EnterSearch,
    SearchInput(char),
    SearchBackspace,
    SubmitSearch,
    SetQuery(String),

    ToggleHelp,
    Escape,
    Quit,

    // Actions on the selection
    ToggleStar,
    ToggleArchive,
    ArchiveAll,
    UnarchiveAll,
    Mute,
    Open,
    MarkRead,

    // Sync
    Refresh,
    SyncWithGithub,

    // Lifecycle and command results
    Startup,
    StaleChecked(bool),
    Idle { at: Instant },
    CountsProbed(ViewCounts),
    Loaded(ViewSnapshot),
    /// A view load failed; the rows on screen stay as they were.
    LoadFailed(String),
    TaskCompleted(TaskOutcome),
    LocalError(String),
}

/// Side effects requested by the reducer, run by the executor in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadView(ViewFilter),
    CheckStale,
    ProbeCounts,
    /// Write an action's patches to the store, then send its remote mutation
    /// in the background. A failed local write undoes the rows already
    /// patched and sends nothing.
    Apply(ActionPlan),
    /// Undo a failed action's patches.
    Rollback { action: &'static str, patches: Vec<(NotificationId, NotificationPatch)> },
    Resync(ResyncOptions),
    OpenUrl(String),
}
