//! Schedule lookup with a posts-derived fallback.

use std::sync::Arc;

use studioflow_types::{CalendarEvent, Post, Schedule, ScheduleSource};
use tracing::warn;

use crate::dispatch::{Dispatch, fetch_json};
use crate::error::DispatchError;
use crate::posts::POSTS_PATH;
use crate::request::RequestDescriptor;

pub const CALENDAR_EVENTS_PATH: &str = "/calendar/events";

#[derive(Clone)]
pub struct CalendarClient {
    dispatcher: Arc<dyn Dispatch>,
}

impl CalendarClient {
    pub(crate) fn new(dispatcher: Arc<dyn Dispatch>) -> Self {
        Self { dispatcher }
    }

    /// Scheduled content, from the calendar endpoint when it answers.
    ///
    /// Any failure of `GET /calendar/events` other than a rejected credential
    /// triggers one `GET /posts/`; its scheduled posts are converted into events.
    /// A rejected credential, or a failure of that second request, is returned as-is.
    pub async fn schedule(&self) -> Result<Schedule, DispatchError> {
        let primary = fetch_json::<Vec<CalendarEvent>>(
            self.dispatcher.as_ref(),
            RequestDescriptor::get(CALENDAR_EVENTS_PATH),
        )
        .await;

        match primary {
            Ok(events) => Ok(Schedule {
                source: ScheduleSource::Calendar,
                events,
            }),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(kind = ?e.kind(), "Calendar endpoint failed, deriving schedule from posts: {e}");
                let posts: Vec<Post> =
                    fetch_json(self.dispatcher.as_ref(), RequestDescriptor::get(POSTS_PATH)).await?;
                Ok(Schedule {
                    source: ScheduleSource::PostsFallback,
                    events: posts.iter().filter_map(CalendarEvent::from_post).collect(),
                })
            }
        }
    }
}
