//! Channel history boundary and time-window presets.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use huddle_core::{ChannelId, Message, UserId};
use serde::{Deserialize, Serialize};

/// Failure to fetch channel history.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// The channel does not exist or is not visible to the bot.
    #[error("channel not found: {0}")]
    ChannelNotFound(ChannelId),
    /// The platform call failed.
    #[error("history unavailable: {0}")]
    Unavailable(String),
}

/// Source of channel messages, implemented by the chat-platform adapter.
///
/// Implementations return messages newest first, exclude the bot's own
/// messages and, when `since` is given, drop anything older.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch the history of `channel`.
    async fn fetch(
        &self,
        channel: &ChannelId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>, HistoryError>;
}

/// Named look-back windows offered when summarizing "since" a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SincePreset {
    /// Midnight UTC seven days ago.
    Last7Days,
    /// Midnight UTC fourteen days ago.
    Last14Days,
    /// Midnight UTC thirty days ago.
    Last30Days,
    /// Monday 00:00 UTC of the current week.
    ThisWeek,
    /// Monday 00:00 UTC of the previous week.
    LastWeek,
    /// The first of the current month.
    ThisMonth,
    /// The first of the previous month.
    LastMonth,
}

impl SincePreset {
    /// Every preset in display order.
    pub const ALL: [Self; 7] = [
        Self::Last7Days,
        Self::Last14Days,
        Self::Last30Days,
        Self::ThisWeek,
        Self::LastWeek,
        Self::ThisMonth,
        Self::LastMonth,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Last7Days => "Last 7 days",
            Self::Last14Days => "Last 14 days",
            Self::Last30Days => "Last 30 days",
            Self::ThisWeek => "This week",
            Self::LastWeek => "Last week",
            Self::ThisMonth => "This month",
            Self::LastMonth => "Last month",
        }
    }

    /// Stable id, matching the serialized form.
    pub fn id(self) -> &'static str {
        match self {
            Self::Last7Days => "last7_days",
            Self::Last14Days => "last14_days",
            Self::Last30Days => "last30_days",
            Self::ThisWeek => "this_week",
            Self::LastWeek => "last_week",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
        }
    }

    /// Oldest instant included by this preset, relative to `now`.
    pub fn oldest(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
        let first_of_month = first_of(today);
        let date = match self {
            Self::Last7Days => today - Days::new(7),
            Self::Last14Days => today - Days::new(14),
            Self::Last30Days => today - Days::new(30),
            Self::ThisWeek => monday,
            Self::LastWeek => monday - Days::new(7),
            Self::ThisMonth => first_of_month,
            Self::LastMonth => first_of(first_of_month - Days::new(1)),
        };
        date.and_time(NaiveTime::MIN).and_utc()
    }
}

fn first_of(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

impl fmt::Display for SincePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A preset name that matched nothing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset: {0}")]
pub struct UnknownPreset(pub String);

impl FromStr for SincePreset {
    type Err = UnknownPreset;

    /// Accepts either the label (`"Last 7 days"`) or the snake-case id
    /// (`"last7_days"`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.label().to_lowercase() == wanted || p.id() == wanted)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

/// In-memory [`HistorySource`] for tests and local runs.
#[derive(Default)]
pub struct InMemoryHistory {
    bot_id: Option<UserId>,
    channels: HashMap<ChannelId, Result<Vec<Message>, HistoryError>>,
    fetches: AtomicUsize,
}

impl InMemoryHistory {
    /// Empty history; every channel is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude messages authored by `bot_id`.
    #[must_use]
    pub fn with_bot_id(mut self, bot_id: impl Into<UserId>) -> Self {
        self.bot_id = Some(bot_id.into());
        self
    }

    /// Register messages for `channel`, in any order.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<ChannelId>, messages: Vec<Message>) -> Self {
        let _ = self.channels.insert(channel.into(), Ok(messages));
        self
    }

    /// Make fetches of `channel` fail.
    #[must_use]
    pub fn with_error(mut self, channel: impl Into<ChannelId>, error: HistoryError) -> Self {
        let _ = self.channels.insert(channel.into(), Err(error));
        self
    }

    /// Number of `fetch` calls so far.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HistorySource for InMemoryHistory {
    async fn fetch(
        &self,
        channel: &ChannelId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>, HistoryError> {
        let _ = self.fetches.fetch_add(1, Ordering::Relaxed);
        let stored = self
            .channels
            .get(channel)
            .ok_or_else(|| HistoryError::ChannelNotFound(channel.clone()))?
            .clone()?;

        let mut messages: Vec<Message> = stored
            .into_iter()
            .filter(|m| self.bot_id.as_ref() != Some(&m.author_id))
            .filter(|m| since.is_none_or(|oldest| m.timestamp >= oldest))
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(messages)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
