//! Filter pipeline.
//!
//! Stages, all conjunctive and each a no-op when it has nothing to check:
//! 1. structural (sidebar) filter
//! 2. free text against [`Notification::search_text`]
//! 3. inclusion sets (`repo`, `owner`/`org`/`user`, `type`, `reason`, `state`)
//! 4. exclusion sets (the `-` prefixed keys)
//! 5. booleans (`unread`, `starred`, `archived`, `bot`, `muted`)
//! 6. `inbox`
//!
//! The pipeline is pure and preserves input order.

use octotriage_domain::{Notification, StructuralFilter, SubjectType};

use super::parser::Query;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldSets {
    repo: Vec<String>,
    owner: Vec<String>,
    subject_type: Vec<String>,
    reason: Vec<String>,
    state: Vec<String>,
}

impl FieldSets {
    fn from_query(query: &Query, prefix: &str) -> Self {
        let key = |name: &str| format!("{prefix}{name}");
        let owner = ["owner", "org", "user"]
            .iter()
            .map(|name| query.values(&key(name)))
            .find(|values| !values.is_empty())
            .unwrap_or_default();

        Self {
            repo: lowered(query.values(&key("repo"))),
            owner: lowered(owner),
            subject_type: query
                .values(&key("type"))
                .iter()
                .map(|value| {
                    SubjectType::from_alias(value)
                        .map_or_else(|| value.to_lowercase(), |kind| kind.as_str().to_lowercase())
                })
                .collect(),
            reason: query.values(&key("reason")).iter().map(|value| normalize_reason(value)).collect(),
            state: lowered(query.values(&key("state"))),
        }
    }

    fn is_empty(&self) -> bool {
        self.repo.is_empty()
            && self.owner.is_empty()
            && self.subject_type.is_empty()
            && self.reason.is_empty()
            && self.state.is_empty()
    }

    /// For each non-empty set, whether the record's field is in it.
    fn hits(&self, n: &Notification) -> [Option<bool>; 5] {
        [
            member(&self.repo, n.repo_full_name().map(str::to_lowercase)),
            member(&self.owner, n.owner().map(str::to_lowercase)),
            member(&self.subject_type, n.subject_type().map(str::to_lowercase)),
            member(&self.reason, n.reason.as_deref().map(normalize_reason)),
            member(&self.state, n.subject_state().map(str::to_lowercase)),
        ]
    }

    fn includes(&self, n: &Notification) -> bool {
        self.hits(n).into_iter().all(|hit| hit.unwrap_or(true))
    }

    fn excludes(&self, n: &Notification) -> bool {
        self.hits(n).into_iter().any(|hit| hit.unwrap_or(false))
    }
}

fn member(set: &[String], field: Option<String>) -> Option<bool> {
    if set.is_empty() {
        return None;
    }
    Some(field.is_some_and(|field| set.iter().any(|value| *value == field)))
}

fn lowered(values: &[String]) -> Vec<String> {
    values.iter().map(|value| value.to_lowercase()).collect()
}

fn normalize_reason(value: &str) -> String {
    value.to_lowercase().replace(' ', "_")
}

/// Resolved boolean operators. `None` means "do not filter".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    unread: Option<bool>,
    starred: Option<bool>,
    archived: Option<bool>,
    bot: Option<bool>,
    muted: Option<bool>,
    inbox: Option<bool>,
    require_pull_request: bool,
    require_issue: bool,
}

impl Flags {
    fn from_query(query: &Query) -> Self {
        let is_values = lowered(query.values("is"));
        let has = |name: &str| is_values.iter().any(|value| value == name);
        let direct = |key: &str| query.values(key).first().map(|value| value.eq_ignore_ascii_case("true"));

        // `is:` shortcuts win over the direct boolean keys.
        let unread = if has("read") {
            Some(false)
        } else if has("unread") {
            Some(true)
        } else {
            direct("unread")
        };
        let bot = if has("human") {
            Some(false)
        } else if has("bot") {
            Some(true)
        } else {
            direct("bot")
        };
        let shortcut = |name: &str| if has(name) { Some(true) } else { direct(name) };

        Self {
            unread,
            starred: shortcut("starred"),
            archived: shortcut("archived"),
            bot,
            muted: shortcut("muted"),
            inbox: direct("inbox"),
            require_pull_request: has("pr") || has("pullrequest"),
            require_issue: has("issue"),
        }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn matches(&self, n: &Notification) -> bool {
        let expect = |wanted: Option<bool>, actual: bool| wanted.map_or(true, |wanted| wanted == actual);

        if self.require_pull_request && n.subject_type() != Some(SubjectType::PullRequest.as_str()) {
            return false;
        }
        if self.require_issue && n.subject_type() != Some(SubjectType::Issue.as_str()) {
            return false;
        }

        expect(self.unread, n.unread)
            && expect(self.starred, n.starred)
            && expect(self.archived, n.archived)
            && expect(self.muted, n.muted)
            && (self.bot.is_none() || expect(self.bot, n.is_bot()))
            && expect(self.inbox, n.in_inbox())
    }
}

/// A structural filter and a query compiled into one predicate.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    structural: Option<StructuralFilter>,
    free_text: Option<String>,
    include: FieldSets,
    exclude: FieldSets,
    flags: Flags,
}

impl FilterPipeline {
    pub fn new(structural: Option<&StructuralFilter>, query: Option<&Query>) -> Self {
        let Some(query) = query else {
            return Self { structural: structural.cloned(), ..Self::default() };
        };

        let free_text = Some(query.free_text().to_lowercase()).filter(|text| !text.is_empty());

        Self {
            structural: structural.cloned(),
            free_text,
            include: FieldSets::from_query(query, ""),
            exclude: FieldSets::from_query(query, "-"),
            flags: Flags::from_query(query),
        }
    }

    /// True when every stage is a no-op.
    pub fn is_identity(&self) -> bool {
        self.structural.is_none()
            && self.free_text.is_none()
            && self.include.is_empty()
            && self.exclude.is_empty()
            && self.flags.is_empty()
    }

    pub fn matches(&self, n: &Notification) -> bool {
        if let Some(structural) = &self.structural {
            if !structural.matches(n) {
                return false;
            }
        }
        if let Some(needle) = &self.free_text {
            if !n.search_text().to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        self.include.includes(n) && !self.exclude.excludes(n) && self.flags.matches(n)
    }

    /// Keep the matching records, in input order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a Notification>
    where
        I: IntoIterator<Item = &'a Notification>,
    {
        if self.is_identity() {
            return records.into_iter().collect();
        }
        records.into_iter().filter(|n| self.matches(n)).collect()
    }
}

/// Run a structural filter and/or query over `records`.
pub fn apply<'a>(
    records: &'a [Notification],
    structural: Option<&StructuralFilter>,
    query: Option<&Query>,
) -> Vec<&'a Notification> {
    FilterPipeline::new(structural, query).apply(records)
}
