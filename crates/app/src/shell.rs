//! Line-driven foreground loop.
//!
//! Each stdin line is one intent. Between intents the loop keeps ticking
//! frames so background completions and the idle probe land even while the
//! user is idle; the screen is reprinted only when what it shows changed.

use std::io::Write;
use std::time::Duration;

use octotriage_common::time::Clock;
use octotriage_core::triage::Focus;
use octotriage_core::{AppState, Event, Runtime};
use octotriage_domain::{NotificationId, Result, TriageError, ViewFilter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::utils::render::{format_header, render_list, render_sidebar};

const FRAME_INTERVAL: Duration = Duration::from_millis(250);

const HELP: &str = "\
j/k        move down/up            g/G   first/last
tab        sidebar (or next tab)   btab  previous tab
[ ]        previous/next tab       h/l   focus sidebar/list
o or enter open (or apply sidebar row)
s          toggle star             e     toggle archive
m          mute                    x     mark read
A/U        archive/unarchive all visible
r          refresh from Octobox    R     sync with GitHub
/text      search                  /     clear search
#ID        select notification     p NAME  pinned search
v VIEW     inbox|starred|archived|all
esc        back                    ?     help    q  quit";

/// Map one input line to reducer events.
pub fn parse_intent(line: &str) -> std::result::Result<Vec<Event>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(query) = line.strip_prefix('/') {
        return Ok(vec![Event::SetQuery(query.trim().to_string())]);
    }
    if let Some(id) = line.strip_prefix('#') {
        let id: NotificationId =
            id.trim().parse().map_err(|_| format!("'{}' is not a notification id", id.trim()))?;
        return Ok(vec![Event::SelectId(id)]);
    }
    if let Some(name) = line.strip_prefix("p ") {
        return Ok(vec![Event::SelectPinned(name.trim().to_string())]);
    }
    if let Some(view) = line.strip_prefix("v ") {
        let view: ViewFilter = view.trim().parse().map_err(|err: TriageError| err.user_message())?;
        return Ok(vec![Event::SetView(view)]);
    }

    let event = match line.trim() {
        "j" => Event::MoveDown,
        "k" => Event::MoveUp,
        "g" => Event::JumpFirst,
        "G" => Event::JumpLast,
        "tab" | "\t" => Event::ToggleFocus,
        "btab" => Event::PrevTab,
        "]" => Event::NextTab,
        "[" => Event::PrevTab,
        "h" => Event::FocusSidebar,
        "l" => Event::FocusList,
        "" | "o" => Event::Activate,
        "s" => Event::ToggleStar,
        "e" => Event::ToggleArchive,
        "m" => Event::Mute,
        "x" => Event::MarkRead,
        "A" => Event::ArchiveAll,
        "U" => Event::UnarchiveAll,
        "r" => Event::Refresh,
        "R" => Event::SyncWithGithub,
        "?" => Event::ToggleHelp,
        "esc" => Event::Escape,
        "q" => Event::Quit,
        other => return Err(format!("unknown command '{other}' (? for help)")),
    };
    Ok(vec![event])
}

/// What the screen shows, minus ages, to decide whether to reprint.
#[derive(Debug, PartialEq, Eq)]
struct Screen {
    header: String,
    rows: Vec<(NotificationId, bool, bool, bool)>,
    selected: usize,
    focus_sidebar: bool,
    sidebar_index: usize,
    help: bool,
}

impl Screen {
    fn capture(state: &AppState) -> Self {
        Self {
            header: format_header(state),
            rows: state.visible().iter().map(|n| (n.id, n.unread, n.starred, n.archived)).collect(),
            selected: state.selected_index,
            focus_sidebar: state.focus == Focus::Sidebar,
            sidebar_index: state.sidebar_index,
            help: state.show_help,
        }
    }
}

fn io_error(err: std::io::Error) -> TriageError {
    TriageError::Internal(format!("terminal I/O failed: {err}"))
}

fn draw<W: Write>(out: &mut W, ctx: &AppContext, state: &AppState) -> Result<()> {
    if state.show_help {
        writeln!(out, "{HELP}").map_err(io_error)?;
    }
    if state.focus == Focus::Sidebar {
        render_sidebar(out, &state.sidebar_items(), Some(state.sidebar_index))
            .map_err(io_error)?;
    }
    render_list(out, state, ctx.clock.utc_now()).map_err(io_error)?;
    out.flush().map_err(io_error)
}

/// Run the interactive loop until `q`, end of input or cancellation. Waits
/// for in-flight background work before returning.
pub async fn run_shell<R, W>(
    ctx: &AppContext,
    input: R,
    out: &mut W,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut runtime: Runtime = ctx.runtime(ctx.initial_state());
    runtime.dispatch(Event::Startup).await;
    draw(out, ctx, runtime.state())?;
    let mut shown = Screen::capture(runtime.state());

    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                info!("shell cancelled");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.map_err(io_error)? else {
                    debug!("end of input");
                    break;
                };
                match parse_intent(&line) {
                    Ok(events) => {
                        for event in events {
                            runtime.dispatch(event).await;
                        }
                    }
                    Err(message) => {
                        writeln!(out, "{message}").map_err(io_error)?;
                        continue;
                    }
                }
                runtime.frame().await;
                if runtime.state().quit {
                    break;
                }
                draw(out, ctx, runtime.state())?;
                shown = Screen::capture(runtime.state());
            }
            _ = ticker.tick() => {
                runtime.frame().await;
                let current = Screen::capture(runtime.state());
                if current != shown {
                    draw(out, ctx, runtime.state())?;
                    shown = current;
                }
            }
        }
    }

    if runtime.in_flight() > 0 {
        info!(in_flight = runtime.in_flight(), "waiting for background tasks");
        runtime.settle().await;
        if let Some(error) = &runtime.state().error {
            writeln!(out, "! {error}").map_err(io_error)?;
        }
    }
    Ok(())
}
