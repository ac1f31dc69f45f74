//! Typed wrappers around the REST endpoints, one method per route

use super::ClientError;
use crate::dtos::{
    CreateEventDTO, CreateUserDTO, DataResponse, DateRangeQuery, EventDTO, EventFilterQuery,
    EventRsvpsResponse, HealthResponse, MessageResponse, PageQuery, PaginatedResponse,
    RsvpDTO, RsvpFilterQuery, RsvpListResponse, RsvpLookupResponse, RsvpRequestDTO,
    RsvpSubmitResponse, SearchQuery, UpdateEventDTO, UpdateUserDTO, UserDTO, UserEventsResponse,
};
use crate::entities::{EventType, RsvpResponse};
use chrono::{NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    details: Option<String>,
}

/// Client for one EventHub backend, optionally acting as one user
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Same backend, authenticated with the identity-provider `token`
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL followed by `segments`, each percent-encoded as a single
    /// path segment. For caller-supplied values such as emails.
    fn segment_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends `request` and decodes a 2xx JSON body; anything else becomes
    /// [`ClientError::Api`] carrying the server's `error` message.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let (message, details) = match response.json::<ErrorBody>().await {
            Ok(body) => (body.error, body.details),
            Err(_) => (
                status.canonical_reason().unwrap_or("Request failed").to_string(),
                None,
            ),
        };
        warn!(%status, %message, "API request failed");
        Err(ClientError::Api {
            status,
            message,
            details,
        })
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(self.http.get(self.url("/"))).await
    }

    // ---- events ----

    pub async fn list_events(
        &self,
        page: &PageQuery,
        filter: &EventFilterQuery,
    ) -> Result<PaginatedResponse<EventDTO>, ClientError> {
        let request = self.http.get(self.url("/api/events")).query(page).query(filter);
        self.send(request).await
    }

    pub async fn public_events(
        &self,
        page: &PageQuery,
        event_type: Option<EventType>,
    ) -> Result<PaginatedResponse<EventDTO>, ClientError> {
        let filter = EventFilterQuery {
            event_type: event_type.map(|t| t.to_string()),
            ..Default::default()
        };
        let request = self
            .http
            .get(self.url("/api/events/public"))
            .query(page)
            .query(&filter);
        self.send(request).await
    }

    pub async fn upcoming_events(
        &self,
        page: &PageQuery,
        filter: &EventFilterQuery,
    ) -> Result<PaginatedResponse<EventDTO>, ClientError> {
        let request = self
            .http
            .get(self.url("/api/events/upcoming"))
            .query(page)
            .query(filter);
        self.send(request).await
    }

    pub async fn search_events(
        &self,
        term: &str,
        page: &PageQuery,
    ) -> Result<PaginatedResponse<EventDTO>, ClientError> {
        let search = SearchQuery {
            q: Some(term.to_string()),
        };
        let request = self
            .http
            .get(self.url("/api/events/search"))
            .query(page)
            .query(&search);
        self.send(request).await
    }

    pub async fn events_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: &PageQuery,
    ) -> Result<PaginatedResponse<EventDTO>, ClientError> {
        let range = DateRangeQuery {
            start_date: Some(start.format("%Y-%m-%d").to_string()),
            end_date: Some(end.format("%Y-%m-%d").to_string()),
        };
        let request = self
            .http
            .get(self.url("/api/events/date-range"))
            .query(page)
            .query(&range);
        self.send(request).await
    }

    pub async fn get_event(&self, event_id: &Uuid) -> Result<EventDTO, ClientError> {
        let response: DataResponse<EventDTO> = self
            .send(self.http.get(self.url(&format!("/api/events/{}", event_id))))
            .await?;
        Ok(response.data)
    }

    /// Checks the form locally with the same rules the server applies, then submits it
    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create_event(&self, form: &CreateEventDTO) -> Result<EventDTO, ClientError> {
        // the owner is assigned by the server; nil only satisfies the signature
        form.clone().prepare(Uuid::nil(), Utc::now())?;
        debug!("Event form passed local validation");

        let response: DataResponse<EventDTO> = self
            .send(self.http.post(self.url("/api/events")).json(form))
            .await?;
        Ok(response.data)
    }

    pub async fn update_event(
        &self,
        event_id: &Uuid,
        changes: &UpdateEventDTO,
    ) -> Result<EventDTO, ClientError> {
        changes.validate()?;
        let response: DataResponse<EventDTO> = self
            .send(
                self.http
                    .put(self.url(&format!("/api/events/{}", event_id)))
                    .json(changes),
            )
            .await?;
        Ok(response.data)
    }

    pub async fn delete_event(&self, event_id: &Uuid) -> Result<String, ClientError> {
        let response: MessageResponse = self
            .send(self.http.delete(self.url(&format!("/api/events/{}", event_id))))
            .await?;
        Ok(response.message)
    }

    pub async fn user_events(
        &self,
        user_id: &Uuid,
        page: &PageQuery,
    ) -> Result<PaginatedResponse<EventDTO>, ClientError> {
        let request = self
            .http
            .get(self.url(&format!("/api/users/{}/events", user_id)))
            .query(page);
        self.send(request).await
    }

    pub async fn my_events(&self, page: &PageQuery) -> Result<UserEventsResponse, ClientError> {
        self.send(self.http.get(self.url("/api/user/events")).query(page))
            .await
    }

    // ---- rsvps ----

    pub async fn submit_rsvp(
        &self,
        event_id: &Uuid,
        response: RsvpResponse,
    ) -> Result<RsvpDTO, ClientError> {
        let body = RsvpRequestDTO::new(response);
        let submitted: RsvpSubmitResponse = self
            .send(
                self.http
                    .post(self.url(&format!("/api/events/{}/rsvp", event_id)))
                    .json(&body),
            )
            .await?;
        Ok(submitted.rsvp)
    }

    pub async fn my_rsvp(&self, event_id: &Uuid) -> Result<Option<RsvpDTO>, ClientError> {
        let lookup: RsvpLookupResponse = self
            .send(self.http.get(self.url(&format!("/api/events/{}/rsvp", event_id))))
            .await?;
        Ok(lookup.rsvp)
    }

    /// Organizer only; other callers get a 403 [`ClientError::Api`]
    pub async fn event_rsvps(&self, event_id: &Uuid) -> Result<EventRsvpsResponse, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/events/{}/rsvps", event_id))))
            .await
    }

    pub async fn my_rsvps(
        &self,
        response: Option<RsvpResponse>,
    ) -> Result<Vec<RsvpDTO>, ClientError> {
        let filter = RsvpFilterQuery {
            response: response.map(|r| r.to_string()),
        };
        let list: RsvpListResponse = self
            .send(self.http.get(self.url("/api/user/rsvps")).query(&filter))
            .await?;
        Ok(list.rsvps)
    }

    // ---- users ----

    pub async fn me(&self) -> Result<UserDTO, ClientError> {
        let response: DataResponse<UserDTO> =
            self.send(self.http.get(self.url("/api/user/me"))).await?;
        Ok(response.data)
    }

    pub async fn list_users(
        &self,
        page: &PageQuery,
    ) -> Result<PaginatedResponse<UserDTO>, ClientError> {
        self.send(self.http.get(self.url("/api/users")).query(page))
            .await
    }

    pub async fn get_user(&self, user_id: &Uuid) -> Result<UserDTO, ClientError> {
        let response: DataResponse<UserDTO> = self
            .send(self.http.get(self.url(&format!("/api/users/{}", user_id))))
            .await?;
        Ok(response.data)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<UserDTO, ClientError> {
        let url = self.segment_url(&["api", "users", "email", email])?;
        let response: DataResponse<UserDTO> = self.send(self.http.get(url)).await?;
        Ok(response.data)
    }

    pub async fn create_user(&self, user: &CreateUserDTO) -> Result<UserDTO, ClientError> {
        user.validate()?;
        let response: DataResponse<UserDTO> = self
            .send(self.http.post(self.url("/api/users")).json(user))
            .await?;
        Ok(response.data)
    }

    pub async fn update_user(
        &self,
        user_id: &Uuid,
        changes: &UpdateUserDTO,
    ) -> Result<UserDTO, ClientError> {
        changes.validate()?;
        let response: DataResponse<UserDTO> = self
            .send(
                self.http
                    .put(self.url(&format!("/api/users/{}", user_id)))
                    .json(changes),
            )
            .await?;
        Ok(response.data)
    }

    pub async fn delete_user(&self, user_id: &Uuid) -> Result<String, ClientError> {
        let response: MessageResponse = self
            .send(self.http.delete(self.url(&format!("/api/users/{}", user_id))))
            .await?;
        Ok(response.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_encoded_as_one_segment() {
        let api = ApiClient::new("http://localhost:3000/");
        let url = api
            .segment_url(&["api", "users", "email", "a#b/c?d@x.com"])
            .unwrap();
        assert_eq!(url.path(), "/api/users/email/a%23b%2Fc%3Fd@x.com");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn unparsable_base_url_is_reported() {
        let api = ApiClient::new("not a url");
        let err = api.segment_url(&["api"]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
        assert_eq!(err.status(), None);
    }
}
