//! Schedule view over posts.

use serde::{Deserialize, Serialize};

use crate::{Post, PostId};

const TITLE_PREVIEW_CHARS: usize = 30;

/// One entry of `GET /calendar/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: PostId,
    pub title: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, rename = "extendedProps")]
    pub extended_props: CalendarEventProps,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

impl CalendarEvent {
    /// Build the event the calendar endpoint would have produced for `post`.
    ///
    /// Returns `None` for posts without a schedule.
    #[must_use]
    pub fn from_post(post: &Post) -> Option<Self> {
        if !post.is_scheduled() {
            return None;
        }
        let start = post.scheduled_for.clone()?;
        let platform = post.platform.as_deref().unwrap_or("post");
        let preview: String = post.content.chars().take(TITLE_PREVIEW_CHARS).collect();

        Some(Self {
            id: post.id,
            title: format!("{} Post: {preview}...", capitalize(platform)),
            start,
            status: post.status.clone(),
            extended_props: CalendarEventProps {
                platform: post.platform.clone(),
                full_content: Some(post.content.clone()),
            },
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Which request produced a [`Schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// `GET /calendar/events` answered.
    Calendar,
    /// The calendar endpoint failed; events were derived from `GET /posts/`.
    PostsFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub source: ScheduleSource,
    pub events: Vec<CalendarEvent>,
}
