//! Plain-text rendering of the triage state for the terminal.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use octotriage_core::AppState;
use octotriage_domain::{FacetAggregates, Notification, PinnedSearch, SidebarItem};

/// One list row: selection marker, id, unread dot, reason, type, repo,
/// title, status and age.
pub fn format_row(notification: &Notification, now: DateTime<Utc>, selected: bool) -> String {
    let marker = if selected { '>' } else { ' ' };
    let unread = if notification.unread { '\u{2022}' } else { ' ' };
    let status = notification.display_status();
    let mut line = format!(
        "{marker} {id:>8} {unread} {icon} {kind} {repo}  {title}",
        id = notification.id,
        icon = notification.reason_icon(),
        kind = notification.type_label(),
        repo = notification.display_ref(),
        title = notification.title().unwrap_or("(no title)"),
    );
    if !status.is_empty() {
        line.push_str("  ");
        line.push_str(&status);
    }
    line.push_str("  ");
    line.push_str(&notification.age(now));
    line
}

/// Header line: view, visible count, activity and the last error.
pub fn format_header(state: &AppState) -> String {
    let mut header = format!("{} ({})", state.view.label(), state.visible().len());
    if let Some(activity) = state.activity_label() {
        header.push_str("  ");
        header.push_str(activity);
    }
    if state.search_mode {
        header.push_str(&format!("  /{}", state.search_query));
    } else if !state.search_query.is_empty() {
        header.push_str(&format!("  [{}]", state.search_query));
    }
    if let Some(error) = &state.error {
        header.push_str("  ! ");
        header.push_str(error);
    }
    header
}

pub fn render_list<W: Write>(out: &mut W, state: &AppState, now: DateTime<Utc>) -> io::Result<()> {
    writeln!(out, "{}", format_header(state))?;
    let visible = state.visible();
    if visible.is_empty() {
        writeln!(out, "  (nothing here)")?;
    }
    for (index, notification) in visible.iter().enumerate() {
        writeln!(out, "{}", format_row(notification, now, index == state.selected_index))?;
    }
    Ok(())
}

/// Sidebar rows, with `>` on the row at `selected` when the sidebar has focus.
pub fn render_sidebar<W: Write>(
    out: &mut W,
    items: &[SidebarItem],
    selected: Option<usize>,
) -> io::Result<()> {
    for (index, item) in items.iter().enumerate() {
        let marker = if selected == Some(index) { ">" } else { " " };
        match item {
            SidebarItem::Separator => writeln!(out)?,
            SidebarItem::Header { label } => writeln!(out, "{marker}{label}")?,
            other => {
                let indent = if other.is_indented() { "    " } else { "  " };
                match other.count() {
                    Some(count) => writeln!(out, "{marker}{indent}{} ({count})", other.label())?,
                    None => writeln!(out, "{marker}{indent}{}", other.label())?,
                }
            }
        }
    }
    Ok(())
}

pub fn render_facet_totals<W: Write>(out: &mut W, facets: &FacetAggregates) -> io::Result<()> {
    writeln!(
        out,
        "unread {} / read {}  humans {} / bots {}",
        facets.unread, facets.read, facets.humans, facets.bots
    )
}

pub fn render_pinned<W: Write>(out: &mut W, searches: &[PinnedSearch]) -> io::Result<()> {
    if searches.is_empty() {
        writeln!(out, "no pinned searches")?;
    }
    for search in searches {
        match search.remote_count {
            Some(count) => writeln!(out, "{} ({count})  {}", search.name, search.raw_query)?,
            None => writeln!(out, "{}  {}", search.name, search.raw_query)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample(now: DateTime<Utc>) -> Notification {
        let mut n = Notification::new(42, now);
        n.unread = true;
        n.starred = true;
        n.reason = Some("mention".into());
        n.subject.title = Some("Fix the flaky test".into());
        n.subject.subject_type = Some("PullRequest".into());
        n.repo.full_name = Some("octo/app".into());
        n.updated_at = Some(now - chrono::Duration::hours(3));
        n
    }

    #[test]
    fn row_shows_flags_and_age() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid time");
        let row = format_row(&sample(now), now, true);
        assert!(row.starts_with(">       42 \u{2022}"), "{row}");
        assert!(row.contains("octo/app  Fix the flaky test"));
        assert!(row.contains('\u{2605}'));
        assert!(row.ends_with("3h"));
    }

    #[test]
    fn header_carries_the_error() {
        let mut state = AppState::default();
        state.error = Some("star failed: boom".into());
        assert_eq!(format_header(&state), "Inbox (0)  ! star failed: boom");
    }

    #[test]
    fn sidebar_indents_repositories() {
        let items = vec![
            SidebarItem::header("Repositories"),
            SidebarItem::Owner { owner: "octo".into(), count: 2 },
            SidebarItem::Repo { full_name: "octo/app".into(), short_name: "app".into(), count: 2 },
        ];
        let mut out = Vec::new();
        render_sidebar(&mut out, &items, Some(2)).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, " Repositories\n   octo (2)\n>    app (2)\n");
    }
}
