//! Pure state transitions.

use octotriage_domain::{Notification, SidebarItem, ViewFilter};

use super::event::{Command, Event, ViewSnapshot};
use super::sidebar::{edge_selectable, step_selectable};
use super::state::{AppState, Focus, SidebarSelection};
use crate::sync::{ActionPlan, ResyncOptions, SyncPhase, TaskOutcome};

/// Apply `event` to `state`, returning the next state and the side effects
/// to run. Never performs I/O.
pub fn reduce(mut state: AppState, event: Event) -> (AppState, Vec<Command>) {
    let commands = match event {
        Event::MoveDown => move_selection(&mut state, 1),
        Event::MoveUp => move_selection(&mut state, -1),
        Event::JumpFirst => jump(&mut state, false),
        Event::JumpLast => jump(&mut state, true),
        Event::NextTab => switch_tab(&mut state, 1),
        Event::PrevTab => switch_tab(&mut state, -1),
        Event::ToggleFocus => toggle_focus(&mut state),
        Event::FocusSidebar => {
            if !state.search_mode && state.has_sidebar_content() {
                state.focus = Focus::Sidebar;
            }
            Vec::new()
        }
        Event::FocusList => {
            state.focus = Focus::List;
            Vec::new()
        }
        Event::Activate => match state.focus {
            Focus::Sidebar => activate_sidebar(&mut state),
            Focus::List => open_selected(&state),
        },
        Event::SetView(view) => {
            state.view = view;
            state.sidebar_selection = None;
            state.search_query.clear();
            state.selected_index = 0;
            state.loading = true;
            vec![Command::LoadView(view)]
        }
        Event::SelectId(id) => {
            let position = state.visible().iter().position(|n| n.id == id);
            match position {
                Some(index) => state.selected_index = index,
                None => state.error = Some(format!("notification {id} is not in the current view")),
            }
            Vec::new()
        }
        Event::SelectPinned(name) => select_pinned(&mut state, &name),

        Event::EnterSearch => {
            if !state.search_mode {
                state.search_mode = true;
                state.search_query.clear();
                state.focus = Focus::List;
            }
            Vec::new()
        }
        Event::SearchInput(ch) => {
            if state.search_mode {
                state.search_query.push(ch);
                state.selected_index = 0;
            }
            Vec::new()
        }
        Event::SearchBackspace => {
            if state.search_mode && state.search_query.pop().is_some() {
                state.selected_index = 0;
            }
            Vec::new()
        }
        Event::SubmitSearch => {
            state.search_mode = false;
            state.clamp_selection();
            Vec::new()
        }
        Event::SetQuery(query) => {
            state.search_query = query;
            state.search_mode = false;
            state.selected_index = 0;
            Vec::new()
        }

        Event::ToggleHelp => {
            state.show_help = !state.show_help;
            Vec::new()
        }
        Event::Escape => escape(&mut state),
        Event::Quit => {
            state.quit = true;
            Vec::new()
        }

        Event::ToggleStar => act_on_selected(&state, ActionPlan::toggle_star),
        Event::ToggleArchive => act_on_selected(&state, ActionPlan::toggle_archive),
        Event::Mute => act_on_selected(&state, ActionPlan::mute),
        Event::MarkRead => act_on_selected(&state, ActionPlan::mark_read),
        Event::ArchiveAll => {
            let plan = ActionPlan::archive_all(state.visible());
            plan.map(|plan| optimistic(&state, plan)).unwrap_or_default()
        }
        Event::UnarchiveAll => {
            let plan = ActionPlan::unarchive_all(state.visible());
            plan.map(|plan| optimistic(&state, plan)).unwrap_or_default()
        }
        Event::Open => open_selected(&state),

        Event::Refresh => start_resync(&mut state, ResyncOptions::refresh()),
        Event::SyncWithGithub => start_resync(&mut state, ResyncOptions::with_github()),

        Event::Startup => {
            state.loading = true;
            vec![Command::LoadView(state.load_target()), Command::CheckStale]
        }
        Event::StaleChecked(stale) => {
            if stale {
                start_resync(&mut state, ResyncOptions::refresh())
            } else {
                Vec::new()
            }
        }
        Event::Idle { at } => {
            let due = state
                .last_probe
                .map_or(true, |last| at.saturating_duration_since(last) >= state.probe_interval);
            if state.loading || state.syncing || !due {
                Vec::new()
            } else {
                state.last_probe = Some(at);
                vec![Command::ProbeCounts]
            }
        }
        Event::CountsProbed(counts) => {
            if counts == state.counts {
                Vec::new()
            } else {
                vec![Command::LoadView(state.load_target())]
            }
        }
        Event::Loaded(snapshot) => {
            apply_snapshot(&mut state, snapshot);
            Vec::new()
        }
        Event::TaskCompleted(outcome) => task_completed(&mut state, outcome),
        Event::LoadFailed(message) => {
            state.loading = false;
            state.error = Some(message);
            Vec::new()
        }
        Event::LocalError(message) => {
            state.error = Some(message);
            Vec::new()
        }
    };
    (state, commands)
}

fn move_selection(state: &mut AppState, delta: isize) -> Vec<Command> {
    match state.focus {
        Focus::Sidebar => {
            let items = state.sidebar_items();
            state.sidebar_index = step_selectable(&items, state.sidebar_index, delta);
        }
        Focus::List => {
            let len = state.visible().len();
            if len > 0 {
                state.selected_index = if delta < 0 {
                    state.selected_index.saturating_sub(delta.unsigned_abs())
                } else {
                    state.selected_index.saturating_add(delta.unsigned_abs()).min(len - 1)
                };
            }
        }
    }
    Vec::new()
}

fn jump(state: &mut AppState, last: bool) -> Vec<Command> {
    match state.focus {
        Focus::Sidebar => state.sidebar_index = edge_selectable(&state.sidebar_items(), last),
        Focus::List => {
            state.selected_index = if last { state.visible().len().saturating_sub(1) } else { 0 };
        }
    }
    Vec::new()
}

fn switch_tab(state: &mut AppState, delta: isize) -> Vec<Command> {
    if state.search_mode {
        return Vec::new();
    }
    state.view = state.view.cycle(delta);
    if matches!(state.sidebar_selection, Some(SidebarSelection::Pinned { .. })) {
        state.sidebar_selection = None;
    }
    state.search_query.clear();
    state.selected_index = 0;
    state.loading = true;
    vec![Command::LoadView(state.load_target())]
}

fn toggle_focus(state: &mut AppState) -> Vec<Command> {
    if state.search_mode {
        return Vec::new();
    }
    if !state.has_sidebar_content() {
        return switch_tab(state, 1);
    }
    state.focus = match state.focus {
        Focus::List => Focus::Sidebar,
        Focus::Sidebar => Focus::List,
    };
    Vec::new()
}

fn activate_sidebar(state: &mut AppState) -> Vec<Command> {
    let items = state.sidebar_items();
    let Some(item) = items.get(state.sidebar_index) else {
        return Vec::new();
    };

    match item {
        SidebarItem::Header { .. } | SidebarItem::Separator => Vec::new(),
        SidebarItem::Tab { view, .. } => {
            state.view = *view;
            state.sidebar_selection = None;
            state.search_query.clear();
            state.focus = Focus::List;
            state.selected_index = 0;
            state.loading = true;
            vec![Command::LoadView(*view)]
        }
        SidebarItem::Pinned { name, raw_query, .. } => {
            let previous = state.load_target();
            state.sidebar_selection =
                Some(SidebarSelection::Pinned { name: name.clone(), raw_query: raw_query.clone() });
            state.focus = Focus::List;
            state.selected_index = 0;
            reload_if_target_changed(state, previous)
        }
        other => {
            let previous = state.load_target();
            let selection = other.structural_filter().map(SidebarSelection::Structural);
            // Activating the active filter clears it.
            state.sidebar_selection =
                if state.sidebar_selection == selection { None } else { selection };
            state.focus = Focus::List;
            state.selected_index = 0;
            reload_if_target_changed(state, previous)
        }
    }
}

fn select_pinned(state: &mut AppState, name: &str) -> Vec<Command> {
    let Some(search) = state.pinned.iter().find(|search| search.name.eq_ignore_ascii_case(name))
    else {
        state.error = Some(format!("no pinned search named '{name}'"));
        return Vec::new();
    };
    let previous = state.load_target();
    state.sidebar_selection = Some(SidebarSelection::Pinned {
        name: search.name.clone(),
        raw_query: search.raw_query.clone(),
    });
    state.selected_index = 0;
    reload_if_target_changed(state, previous)
}

fn reload_if_target_changed(state: &mut AppState, previous: ViewFilter) -> Vec<Command> {
    let target = state.load_target();
    if target == previous {
        Vec::new()
    } else {
        state.loading = true;
        vec![Command::LoadView(target)]
    }
}

fn escape(state: &mut AppState) -> Vec<Command> {
    if state.show_help {
        state.show_help = false;
    } else if state.search_mode {
        state.search_mode = false;
        state.search_query.clear();
        state.selected_index = 0;
    } else if state.sidebar_selection.is_some() {
        let previous = state.load_target();
        state.sidebar_selection = None;
        state.selected_index = 0;
        return reload_if_target_changed(state, previous);
    } else if state.focus == Focus::Sidebar {
        state.focus = Focus::List;
    } else if state.error.is_some() {
        state.error = None;
    }
    Vec::new()
}

fn act_on_selected(
    state: &AppState,
    plan_for: fn(&Notification) -> ActionPlan,
) -> Vec<Command> {
    state.selected().map(|n| optimistic(state, plan_for(n))).unwrap_or_default()
}

/// Patch the store and start the remote confirmation, then refresh.
fn optimistic(state: &AppState, plan: ActionPlan) -> Vec<Command> {
    vec![Command::Apply(plan), Command::LoadView(state.load_target())]
}

fn open_selected(state: &AppState) -> Vec<Command> {
    let Some(notification) = state.selected() else {
        return Vec::new();
    };
    let Some(url) = notification.web_url.clone() else {
        return Vec::new();
    };
    let mut commands = vec![Command::OpenUrl(url)];
    commands.extend(optimistic(state, ActionPlan::mark_read(notification)));
    commands
}

fn start_resync(state: &mut AppState, options: ResyncOptions) -> Vec<Command> {
    if state.search_mode {
        return Vec::new();
    }
    state.error = None;
    if options.trigger_remote {
        state.syncing = true;
    } else {
        state.loading = true;
    }
    vec![Command::Resync(options)]
}

fn apply_snapshot(state: &mut AppState, snapshot: ViewSnapshot) {
    state.counts = snapshot.counts;
    state.facets = snapshot.facets;
    // A load for a view the user already left only refreshes the badges.
    if snapshot.view == state.load_target() {
        state.notifications = snapshot.notifications;
        state.loading = false;
        state.clamp_selection();
    }
}

fn task_completed(state: &mut AppState, outcome: TaskOutcome) -> Vec<Command> {
    match outcome {
        TaskOutcome::Action { result: Ok(()), .. } => Vec::new(),
        TaskOutcome::Action { plan, result: Err(err) } => {
            let action = plan.remote.name();
            state.error = Some(format!("{action} failed: {}", err.user_message()));
            vec![
                Command::Rollback { action, patches: plan.rollback },
                Command::LoadView(state.load_target()),
            ]
        }
        TaskOutcome::Phase(phase) => {
            state.syncing = matches!(phase, SyncPhase::Triggering | SyncPhase::Polling { .. });
            state.loading =
                matches!(phase, SyncPhase::Fetching { .. } | SyncPhase::Replacing { .. });
            if let SyncPhase::Error(message) = &phase {
                state.error = Some(message.clone());
            }
            state.sync_phase = phase;
            Vec::new()
        }
        TaskOutcome::Resync(Ok(outcome)) => {
            state.syncing = false;
            state.sync_phase = SyncPhase::Idle;
            if let Some(pinned) = outcome.pinned_searches {
                state.pinned = pinned;
            }
            state.facets = outcome.facets;
            state.loading = true;
            vec![Command::LoadView(state.load_target())]
        }
        TaskOutcome::Resync(Err(err)) => {
            state.syncing = false;
            state.loading = false;
            state.sync_phase = SyncPhase::Idle;
            state.error = Some(err.user_message());
            Vec::new()
        }
    }
}
