//! Sidebar construction from counts, pinned searches and facets.

use octotriage_domain::{
    FacetAggregates, PinnedSearch, SidebarItem, ViewCounts, ViewFilter, SUBJECT_STATES,
};

/// Build the sidebar rows in display order.
///
/// Tabs and pinned searches always appear. The facet sections follow only
/// when the facets are non-empty, and each section is skipped when it has
/// nothing to show.
pub fn build_sidebar(
    counts: &ViewCounts,
    pinned: &[PinnedSearch],
    facets: &FacetAggregates,
) -> Vec<SidebarItem> {
    let mut items: Vec<SidebarItem> = ViewFilter::TABS
        .iter()
        .map(|&view| SidebarItem::Tab { view, count: counts.get(view) })
        .collect();
    items.push(SidebarItem::Separator);

    if !pinned.is_empty() {
        items.push(SidebarItem::header("Pinned"));
        items.extend(pinned.iter().map(|search| SidebarItem::Pinned {
            name: search.name.clone(),
            raw_query: search.raw_query.clone(),
            count: search.remote_count.unwrap_or(0),
        }));
    }

    if facets.is_empty() {
        return items;
    }

    if facets.unread > 0 {
        items.push(SidebarItem::Unread { unread: true, count: facets.unread });
    }
    if facets.read > 0 {
        items.push(SidebarItem::Unread { unread: false, count: facets.read });
    }
    if facets.bots > 0 {
        items.push(SidebarItem::Bot { bot: true, count: facets.bots });
    }
    if facets.humans > 0 {
        items.push(SidebarItem::Bot { bot: false, count: facets.humans });
    }

    if !facets.states.is_empty() {
        items.push(SidebarItem::header("Status"));
        for state in SUBJECT_STATES {
            let count = facets.state_count(state);
            if count > 0 {
                items.push(SidebarItem::State { state: state.to_string(), count });
            }
        }
    }

    if !facets.subject_types.is_empty() {
        items.push(SidebarItem::header("Type"));
        items.extend(facets.subject_types.iter().map(|facet| SidebarItem::SubjectType {
            name: facet.value.clone(),
            count: facet.count,
        }));
    }

    if !facets.reasons.is_empty() {
        items.push(SidebarItem::header("Reason"));
        items.extend(
            facets
                .reasons
                .iter()
                .map(|facet| SidebarItem::Reason { reason: facet.value.clone(), count: facet.count }),
        );
    }

    if !facets.owners.is_empty() {
        items.push(SidebarItem::header("Owners"));
        for owner in &facets.owners {
            items.push(SidebarItem::Owner { owner: owner.value.clone(), count: owner.count });
            let Some(repos) = facets.repos_by_owner.get(&owner.value) else {
                continue;
            };
            let mut short_names = repos.clone();
            short_names.sort();
            for short_name in short_names {
                let full_name = format!("{}/{short_name}", owner.value);
                let count = facets.repo_count(&full_name);
                items.push(SidebarItem::Repo { full_name, short_name, count });
            }
        }
    }

    items
}

/// Index of the next selectable row `delta` steps away, skipping headers and
/// separators. Stays put when nothing selectable lies in that direction.
pub fn step_selectable(items: &[SidebarItem], current: usize, delta: isize) -> usize {
    let mut index = current;
    loop {
        let next = if delta < 0 { index.checked_sub(1) } else { index.checked_add(1) };
        match next {
            Some(next) if next < items.len() => {
                index = next;
                if items[index].is_selectable() {
                    return index;
                }
            }
            _ => return current,
        }
    }
}

/// First selectable row at or after the start (or at or before the end).
pub fn edge_selectable(items: &[SidebarItem], last: bool) -> usize {
    let position = if last {
        items.iter().rposition(SidebarItem::is_selectable)
    } else {
        items.iter().position(SidebarItem::is_selectable)
    };
    position.unwrap_or(0)
}
