//! SQLite-backed notification store.
//!
//! Implements the `NotificationStore` port on the shared pool provided by
//! [`DbManager`]. Every call checks a connection out inside
//! `spawn_blocking`, so the async runtime never waits on SQLite.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use octotriage_common::time::{Clock, SystemClock};
use octotriage_core::NotificationStore;
use octotriage_domain::constants::NOTIFICATIONS_RESOURCE;
use octotriage_domain::{
    is_bot_author, sort_facets, FacetAggregates, FacetCount, Notification, NotificationId,
    NotificationPatch, Repository, Result as DomainResult, Subject, SyncStatus, TriageError,
    ViewCounts, ViewFilter,
};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::conversions::to_domain;

const COLUMNS: &str = "id, github_id, reason, unread, archived, starred, muted, url, web_url, \
     subject_title, subject_url, subject_type, subject_state, subject_author, \
     repo_id, repo_name, repo_owner, repo_url, created_at, updated_at, last_read_at, fetched_at";

const INSERT_SQL: &str = "INSERT INTO notifications (id, github_id, reason, unread, archived, \
     starred, muted, url, web_url, subject_title, subject_url, subject_type, subject_state, \
     subject_author, repo_id, repo_name, repo_owner, repo_url, created_at, updated_at, \
     last_read_at, fetched_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, \
     ?19, ?20, ?21, ?22)";

const UPSERT_SUFFIX: &str = " ON CONFLICT(id) DO UPDATE SET github_id = excluded.github_id, \
     reason = excluded.reason, unread = excluded.unread, archived = excluded.archived, \
     starred = excluded.starred, muted = excluded.muted, url = excluded.url, \
     web_url = excluded.web_url, subject_title = excluded.subject_title, \
     subject_url = excluded.subject_url, subject_type = excluded.subject_type, \
     subject_state = excluded.subject_state, subject_author = excluded.subject_author, \
     repo_id = excluded.repo_id, repo_name = excluded.repo_name, \
     repo_owner = excluded.repo_owner, repo_url = excluded.repo_url, \
     created_at = excluded.created_at, updated_at = excluded.updated_at, \
     last_read_at = excluded.last_read_at, fetched_at = excluded.fetched_at";

const INBOX_PREDICATE: &str = "archived = 0 AND muted = 0";

/// Notification store on the local cache database.
pub struct SqliteNotificationStore {
    db: Arc<DbManager>,
    clock: Arc<dyn Clock>,
}

impl SqliteNotificationStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db, clock: Arc::new(SystemClock) }
    }

    /// Use `clock` for `fetched_at` and sync stamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run `work` on a pooled connection off the async runtime.
    async fn blocking<T, F>(&self, work: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, DateTime<Utc>) -> DomainResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let now = self.clock.utc_now();
        task::spawn_blocking(move || -> DomainResult<T> {
            let mut conn = db.get_connection()?;
            work(&mut *conn, now)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn replace_all(&self, records: &[Notification]) -> DomainResult<()> {
        let records = records.to_vec();
        self.blocking(move |conn, now| {
            let tx = conn.transaction().map_err(to_domain)?;
            tx.execute("DELETE FROM notifications", []).map_err(to_domain)?;
            {
                let mut stmt = tx.prepare(INSERT_SQL).map_err(to_domain)?;
                for record in &records {
                    stmt.execute(params_from_iter(record_params(record, now).iter()))
                        .map_err(to_domain)?;
                }
            }
            stamp_sync(&tx, NOTIFICATIONS_RESOURCE, now, None)?;
            tx.commit().map_err(to_domain)?;
            debug!(count = records.len(), "store.replace_all");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, records: &[Notification]) -> DomainResult<()> {
        let records = records.to_vec();
        self.blocking(move |conn, now| {
            let tx = conn.transaction().map_err(to_domain)?;
            {
                let sql = format!("{INSERT_SQL}{UPSERT_SUFFIX}");
                let mut stmt = tx.prepare(&sql).map_err(to_domain)?;
                for record in &records {
                    stmt.execute(params_from_iter(record_params(record, now).iter()))
                        .map_err(to_domain)?;
                }
            }
            tx.commit().map_err(to_domain)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn patch(&self, id: NotificationId, patch: NotificationPatch) -> DomainResult<bool> {
        self.blocking(move |conn, now| {
            let mut assignments = vec!["fetched_at = ?"];
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();
            for (column, value) in [
                ("unread = ?", patch.unread),
                ("archived = ?", patch.archived),
                ("starred = ?", patch.starred),
                ("muted = ?", patch.muted),
            ] {
                if let Some(value) = value {
                    assignments.push(column);
                    values.push(Box::new(value));
                }
            }

            let sql =
                format!("UPDATE notifications SET {} WHERE id = ?", assignments.join(", "));
            let fetched_at = format_timestamp(now);
            let mut bound: Vec<&dyn ToSql> = Vec::with_capacity(values.len() + 2);
            bound.push(&fetched_at);
            bound.extend(values.iter().map(|value| value.as_ref()));
            bound.push(&id);

            let changed = conn.execute(&sql, &bound[..]).map_err(to_domain)?;
            debug!(notification_id = id, changed, "store.patch");
            Ok(changed > 0)
        })
        .await
    }

    async fn get(&self, id: NotificationId) -> DomainResult<Option<Notification>> {
        self.blocking(move |conn, _| {
            let sql = format!("SELECT {COLUMNS} FROM notifications WHERE id = ?1");
            conn.query_row(&sql, params![id], map_notification_row)
                .optional()
                .map_err(to_domain)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn load_view(&self, view: ViewFilter) -> DomainResult<Vec<Notification>> {
        self.blocking(move |conn, _| {
            let sql = format!(
                "SELECT {COLUMNS} FROM notifications WHERE {} \
                 ORDER BY updated_at DESC NULLS LAST, id DESC",
                view_predicate(view)
            );
            let mut stmt = conn.prepare(&sql).map_err(to_domain)?;
            let rows = stmt.query_map([], map_notification_row).map_err(to_domain)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(to_domain)
        })
        .await
    }

    async fn counts(&self) -> DomainResult<ViewCounts> {
        self.blocking(move |conn, _| {
            let sql = format!(
                "SELECT \
                   COALESCE(SUM(CASE WHEN {INBOX_PREDICATE} THEN 1 ELSE 0 END), 0), \
                   COALESCE(SUM(starred), 0), \
                   COALESCE(SUM(archived), 0) \
                 FROM notifications"
            );
            conn.query_row(&sql, [], |row| {
                Ok(ViewCounts {
                    inbox: count_column(row, 0)?,
                    starred: count_column(row, 1)?,
                    archived: count_column(row, 2)?,
                })
            })
            .map_err(to_domain)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn facets(&self) -> DomainResult<FacetAggregates> {
        self.blocking(move |conn, _| compute_facets(conn)).await
    }

    async fn is_stale(&self, resource: &str, ttl: Duration) -> DomainResult<bool> {
        let Some(status) = self.last_sync(resource).await? else {
            return Ok(true);
        };
        let age = self.clock.utc_now() - status.last_sync;
        Ok(age.to_std().map_or(false, |age| age > ttl))
    }

    async fn mark_synced(&self, resource: &str, error: Option<&str>) -> DomainResult<()> {
        let resource = resource.to_string();
        let error = error.map(str::to_string);
        self.blocking(move |conn, now| stamp_sync(conn, &resource, now, error.as_deref())).await
    }

    async fn last_sync(&self, resource: &str) -> DomainResult<Option<SyncStatus>> {
        let resource = resource.to_string();
        self.blocking(move |conn, _| {
            conn.query_row(
                "SELECT resource, last_sync, error FROM sync_status WHERE resource = ?1",
                params![resource],
                |row| {
                    Ok(SyncStatus {
                        resource: row.get(0)?,
                        last_sync: required_timestamp(row, 1)?,
                        error: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(to_domain)
        })
        .await
    }
}

const fn view_predicate(view: ViewFilter) -> &'static str {
    match view {
        ViewFilter::Inbox => INBOX_PREDICATE,
        ViewFilter::Starred => "starred = 1",
        ViewFilter::Archived => "archived = 1",
        ViewFilter::All => "1 = 1",
    }
}

fn stamp_sync(
    conn: &Connection,
    resource: &str,
    now: DateTime<Utc>,
    error: Option<&str>,
) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO sync_status (resource, last_sync, error) VALUES (?1, ?2, ?3) \
         ON CONFLICT(resource) DO UPDATE SET last_sync = excluded.last_sync, error = excluded.error",
        params![resource, format_timestamp(now), error],
    )
    .map_err(to_domain)?;
    Ok(())
}

fn compute_facets(conn: &Connection) -> DomainResult<FacetAggregates> {
    let (unread, total): (u64, u64) = conn
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(unread), 0), COUNT(*) FROM notifications WHERE {INBOX_PREDICATE}"
            ),
            [],
            |row| Ok((count_column(row, 0)?, count_column(row, 1)?)),
        )
        .map_err(to_domain)?;

    let bots = grouped(conn, "subject_author")?
        .into_iter()
        .filter(|facet| is_bot_author(Some(&facet.value)))
        .map(|facet| facet.count)
        .sum::<u64>();

    let mut repos_by_owner: BTreeMap<String, Vec<String>> = BTreeMap::new();
    {
        let sql = format!(
            "SELECT DISTINCT repo_owner, repo_name FROM notifications \
             WHERE {INBOX_PREDICATE} AND repo_owner IS NOT NULL AND repo_name IS NOT NULL"
        );
        let mut stmt = conn.prepare(&sql).map_err(to_domain)?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(to_domain)?;
        for pair in pairs {
            let (owner, full_name) = pair.map_err(to_domain)?;
            let short =
                full_name.split_once('/').map_or(full_name.as_str(), |(_, name)| name).to_string();
            let repos = repos_by_owner.entry(owner).or_default();
            if !repos.contains(&short) {
                repos.push(short);
            }
        }
    }
    repos_by_owner.values_mut().for_each(|repos| repos.sort());

    Ok(FacetAggregates {
        owners: grouped(conn, "repo_owner")?,
        repos: grouped(conn, "repo_name")?,
        repos_by_owner,
        subject_types: grouped(conn, "subject_type")?,
        reasons: grouped(conn, "reason")?,
        states: grouped(conn, "subject_state")?,
        unread,
        read: total - unread,
        bots,
        humans: total - bots,
    })
}

/// Inbox counts grouped by `column`, skipping missing values.
fn grouped(conn: &Connection, column: &str) -> DomainResult<Vec<FacetCount>> {
    let sql = format!(
        "SELECT {column}, COUNT(*) FROM notifications \
         WHERE {INBOX_PREDICATE} AND {column} IS NOT NULL GROUP BY {column}"
    );
    let mut stmt = conn.prepare(&sql).map_err(to_domain)?;
    let rows = stmt
        .query_map([], |row| Ok(FacetCount::new(row.get::<_, String>(0)?, count_column(row, 1)?)))
        .map_err(to_domain)?;
    let mut facets = rows.collect::<Result<Vec<_>, _>>().map_err(to_domain)?;
    sort_facets(&mut facets);
    Ok(facets)
}

/// Insert parameters for `record`. `fetched_at` is always the write time.
fn record_params(record: &Notification, now: DateTime<Utc>) -> Vec<Box<dyn ToSql>> {
    vec![
        Box::new(record.id),
        Box::new(record.github_id.clone()),
        Box::new(record.reason.clone()),
        Box::new(record.unread),
        Box::new(record.archived),
        Box::new(record.starred),
        Box::new(record.muted),
        Box::new(record.url.clone()),
        Box::new(record.web_url.clone()),
        Box::new(record.subject.title.clone()),
        Box::new(record.subject.url.clone()),
        Box::new(record.subject.subject_type.clone()),
        Box::new(record.subject.state.clone()),
        Box::new(record.subject.author.clone()),
        Box::new(record.repo.id),
        Box::new(record.repo.full_name.clone()),
        Box::new(record.repo.owner.clone()),
        Box::new(record.repo.url.clone()),
        Box::new(record.created_at.map(format_timestamp)),
        Box::new(record.updated_at.map(format_timestamp)),
        Box::new(record.last_read_at.map(format_timestamp)),
        Box::new(format_timestamp(now)),
    ]
}

fn map_notification_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        github_id: row.get(1)?,
        reason: row.get(2)?,
        unread: row.get(3)?,
        archived: row.get(4)?,
        starred: row.get(5)?,
        muted: row.get(6)?,
        url: row.get(7)?,
        web_url: row.get(8)?,
        subject: Subject {
            title: row.get(9)?,
            url: row.get(10)?,
            subject_type: row.get(11)?,
            state: row.get(12)?,
            author: row.get(13)?,
        },
        repo: Repository {
            id: row.get(14)?,
            full_name: row.get(15)?,
            owner: row.get(16)?,
            url: row.get(17)?,
        },
        created_at: optional_timestamp(row, 18)?,
        updated_at: optional_timestamp(row, 19)?,
        last_read_at: optional_timestamp(row, 20)?,
        fetched_at: required_timestamp(row, 21)?,
    })
}

/// Fixed-width UTC so lexical order in SQLite matches time order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn optional_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw
        .and_then(|value| DateTime::parse_from_rfc3339(&value).ok())
        .map(|ts| ts.with_timezone(&Utc)))
}

fn required_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn count_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(err)))
}

fn map_join_error(err: task::JoinError) -> TriageError {
    if err.is_cancelled() {
        TriageError::Internal("blocking task cancelled".into())
    } else {
        TriageError::Internal(format!("blocking task failed: {err}"))
    }
}
