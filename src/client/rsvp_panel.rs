//! State behind the RSVP section of an event page

use super::{ApiClient, ClientError};
use crate::entities::{RsvpCounts, RsvpResponse};
use futures_util::future::try_join;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Transient message shown after a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

/// What the RSVP section of one event shows to the current viewer.
///
/// Organizers see the aggregate counts and no RSVP buttons, everybody else
/// who is signed in sees the buttons and no counts.
#[derive(Debug, Clone)]
pub struct RsvpPanel {
    event_id: Uuid,
    viewer_id: Option<Uuid>,
    user_response: Option<RsvpResponse>,
    counts: RsvpCounts,
    capacity: Option<u32>,
    is_owner: bool,
    submitting: bool,
    notice: Option<Notice>,
}

impl RsvpPanel {
    pub fn new(event_id: Uuid) -> Self {
        Self {
            event_id,
            viewer_id: None,
            user_response: None,
            counts: RsvpCounts::default(),
            capacity: None,
            is_owner: false,
            submitting: false,
            notice: None,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn user_response(&self) -> Option<RsvpResponse> {
        self.user_response
    }

    pub fn counts(&self) -> RsvpCounts {
        self.counts
    }

    /// Attendee limit of the event, `None` when unlimited. Informational only.
    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Signed in and not the organizer. Capacity never disables the buttons.
    pub fn can_rsvp(&self) -> bool {
        self.viewer_id.is_some() && !self.is_owner
    }

    pub fn show_counts(&self) -> bool {
        self.is_owner && !self.counts.is_empty()
    }

    /// (Re)loads viewer, ownership, own answer and, for the organizer, counts.
    ///
    /// Ownership is recomputed on every call, so a change of organizer shows
    /// up on the next load. Non-organizers always end with zero counts. A
    /// failed load leaves the panel empty with the error as the notice.
    #[instrument(skip(self, api), fields(event_id = %self.event_id))]
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), ClientError> {
        self.clear();
        if !api.is_authenticated() {
            debug!("Anonymous viewer");
            return Ok(());
        }

        if let Err(e) = self.fetch(api).await {
            self.clear();
            self.notice = Some(Notice {
                message: format!("Error: {}", e),
                is_error: true,
            });
            return Err(e);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.viewer_id = None;
        self.is_owner = false;
        self.user_response = None;
        self.counts = RsvpCounts::default();
        self.capacity = None;
    }

    async fn fetch(&mut self, api: &ApiClient) -> Result<(), ClientError> {
        let (me, event) = try_join(api.me(), api.get_event(&self.event_id)).await?;
        self.viewer_id = Some(me.id);
        self.is_owner = event.is_owned_by(&me.id);
        self.capacity = event.capacity();

        // own answer only once the viewer is known
        self.user_response = api.my_rsvp(&self.event_id).await?.map(|r| r.response);

        if self.is_owner {
            self.refresh_counts(api).await?;
        }
        Ok(())
    }

    /// Organizer only
    pub async fn refresh_counts(&mut self, api: &ApiClient) -> Result<(), ClientError> {
        let rsvps = api.event_rsvps(&self.event_id).await?;
        self.counts = rsvps.counts;
        Ok(())
    }

    /// Sends `response`, overwriting any previous answer of the viewer.
    ///
    /// On failure the previous selection stays and the error is kept as the
    /// notice; nothing is retried.
    #[instrument(skip(self, api), fields(event_id = %self.event_id))]
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        response: RsvpResponse,
    ) -> Result<(), ClientError> {
        self.submitting = true;
        let result = api.submit_rsvp(&self.event_id, response).await;
        self.submitting = false;

        match result {
            Ok(rsvp) => {
                self.user_response = Some(rsvp.response);
                self.notice = Some(Notice {
                    message: format!("Your response has been saved: {}", capitalize(response.as_str())),
                    is_error: false,
                });
                if self.is_owner {
                    self.refresh_counts(api).await?;
                }
                Ok(())
            }
            Err(e) => {
                self.notice = Some(Notice {
                    message: format!("Error: {}", e),
                    is_error: true,
                });
                Err(e)
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
