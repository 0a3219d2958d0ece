//! Optimistic actions: a local patch, its rollback, and the remote call that
//! confirms it.

use octotriage_domain::{Notification, NotificationId, NotificationPatch, Result};

use super::ports::RemoteService;

/// Remote half of an optimistic action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteMutation {
    /// The server toggles the star.
    Star(NotificationId),
    Archive(Vec<NotificationId>),
    Unarchive(Vec<NotificationId>),
    Mute(Vec<NotificationId>),
    MarkRead(Vec<NotificationId>),
}

impl RemoteMutation {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Star(_) => "star",
            Self::Archive(_) => "archive",
            Self::Unarchive(_) => "unarchive",
            Self::Mute(_) => "mute",
            Self::MarkRead(_) => "mark_read",
        }
    }

    pub fn ids(&self) -> Vec<NotificationId> {
        match self {
            Self::Star(id) => vec![*id],
            Self::Archive(ids) | Self::Unarchive(ids) | Self::Mute(ids) | Self::MarkRead(ids) => {
                ids.clone()
            }
        }
    }

    /// Send the mutation once. Never retried.
    pub async fn execute(&self, remote: &dyn RemoteService) -> Result<()> {
        match self {
            Self::Star(id) => remote.star(*id).await,
            Self::Archive(ids) => remote.archive(ids).await,
            Self::Unarchive(ids) => remote.unarchive(ids).await,
            Self::Mute(ids) => remote.mute(ids).await,
            Self::MarkRead(ids) => remote.mark_read(ids).await,
        }
    }
}

/// Everything needed to apply an action optimistically and undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    pub patches: Vec<(NotificationId, NotificationPatch)>,
    /// Restores each touched field to its pre-action value.
    pub rollback: Vec<(NotificationId, NotificationPatch)>,
    pub remote: RemoteMutation,
}

impl ActionPlan {
    fn single(target: &Notification, patch: NotificationPatch, remote: RemoteMutation) -> Self {
        Self {
            patches: vec![(target.id, patch)],
            rollback: vec![(target.id, patch.inverse_for(target))],
            remote,
        }
    }

    fn bulk<'a, I>(
        rows: I,
        patch: NotificationPatch,
        remote: fn(Vec<NotificationId>) -> RemoteMutation,
    ) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Notification>,
    {
        let mut patches = Vec::new();
        let mut rollback = Vec::new();
        for row in rows {
            patches.push((row.id, patch));
            rollback.push((row.id, patch.inverse_for(row)));
        }
        if patches.is_empty() {
            return None;
        }
        let ids = patches.iter().map(|(id, _)| *id).collect();
        Some(Self { patches, rollback, remote: remote(ids) })
    }

    pub fn toggle_star(target: &Notification) -> Self {
        Self::single(
            target,
            NotificationPatch::default().starred(!target.starred),
            RemoteMutation::Star(target.id),
        )
    }

    pub fn toggle_archive(target: &Notification) -> Self {
        let remote = if target.archived {
            RemoteMutation::Unarchive(vec![target.id])
        } else {
            RemoteMutation::Archive(vec![target.id])
        };
        Self::single(target, NotificationPatch::default().archived(!target.archived), remote)
    }

    /// Archive every row. `None` when there are no rows.
    pub fn archive_all<'a, I>(rows: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Notification>,
    {
        Self::bulk(rows, NotificationPatch::default().archived(true), RemoteMutation::Archive)
    }

    pub fn unarchive_all<'a, I>(rows: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Notification>,
    {
        Self::bulk(rows, NotificationPatch::default().archived(false), RemoteMutation::Unarchive)
    }

    /// Muting also archives.
    pub fn mute(target: &Notification) -> Self {
        Self::single(
            target,
            NotificationPatch::default().muted(true).archived(true),
            RemoteMutation::Mute(vec![target.id]),
        )
    }

    pub fn mark_read(target: &Notification) -> Self {
        Self::single(
            target,
            NotificationPatch::default().unread(false),
            RemoteMutation::MarkRead(vec![target.id]),
        )
    }
}
