use log::{debug, trace};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::data::Role;
use crate::model::{
    DriverProfile,
    LocationLog,
    MaintenanceLog,
    Mission,
    NewLocationLog,
    NewMaintenanceLog,
    NewNotification,
    Notification,
    NotificationKind,
    NotificationStatus,
    UserRecord,
    Vehicle,
};
use crate::resource_api::ResourceApiError;
use crate::session::AccessTokenSource;


const VEHICLES: &str = "vehicles";
const MISSIONS: &str = "missions";
const DRIVER_PROFILES: &str = "driver_profiles";
const MAINTENANCE_LOGS: &str = "maintenance_logs";
const NOTIFICATIONS: &str = "notifications";
const LOCATION_LOGS: &str = "location_logs";

const NOTIFICATION_PAGE: u64 = 50;

/// Options for item reads: projection, ordering, page size and a filter,
/// passed through to the backend's query parameters.
#[derive(Clone, Debug, Default)]
pub struct Query {
    fields: Vec<String>,
    sort: Vec<String>,
    limit: Option<u64>,
    filter: Option<Value>,
}

impl Query {
    pub fn new() -> Query {
        Query::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sort keys in backend syntax; a `-` prefix means descending.
    pub fn sort<I, S>(mut self, sort: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = sort.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: u64) -> Query {
        self.limit = Some(limit);
        self
    }

    /// Filter in the backend's JSON operator syntax, e.g.
    /// `{"user_id": {"_eq": "<id>"}}`.
    pub fn filter(mut self, filter: Value) -> Query {
        self.filter = Some(filter);
        self
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.fields.is_empty() {
            params.push(("fields", self.fields.join(",")));
        }
        if !self.sort.is_empty() {
            params.push(("sort", self.sort.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(filter) = &self.filter {
            params.push(("filter", filter.to_string()));
        }
        params
    }
}

/// Client for the bearer-authenticated resource endpoints. Domain data is
/// never cached here; the bearer token comes from the session manager
/// through the [`AccessTokenSource`] hook on every request.
pub struct ResourceClient<S: AccessTokenSource> {
    http: Client,
    base_url: String,
    tokens: S,
}

impl<S: AccessTokenSource> ResourceClient<S> {
    pub fn new(http: Client, base_url: &str, tokens: S) -> ResourceClient<S> {
        ResourceClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, ResourceApiError> {
        self.tokens
            .access_token()
            .ok_or(ResourceApiError::NotSignedIn)
    }

    pub async fn list_items<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<T>, ResourceApiError> {
        let token = self.bearer()?;
        debug!("listing {collection}");
        let response = self.http
            .get(self.endpoint(&format!("/items/{collection}")))
            .query(&query.to_params())
            .bearer_auth(token)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn get_item<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<T, ResourceApiError> {
        let token = self.bearer()?;
        debug!("reading {collection}/{id}");
        let response = self.http
            .get(self.endpoint(&format!("/items/{collection}/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn create_item<T, B>(
        &self,
        collection: &str,
        item: &B,
    ) -> Result<T, ResourceApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let token = self.bearer()?;
        debug!("creating an item in {collection}");
        let response = self.http
            .post(self.endpoint(&format!("/items/{collection}")))
            .bearer_auth(token)
            .json(item)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update_item<T, B>(
        &self,
        collection: &str,
        id: Uuid,
        patch: &B,
    ) -> Result<T, ResourceApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let token = self.bearer()?;
        debug!("updating {collection}/{id}");
        let response = self.http
            .patch(self.endpoint(&format!("/items/{collection}/{id}")))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_item(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<(), ResourceApiError> {
        let token = self.bearer()?;
        debug!("deleting {collection}/{id}");
        let response = self.http
            .delete(self.endpoint(&format!("/items/{collection}/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message =
                error_message(&response.text().await.unwrap_or_default());
            return Err(ResourceApiError::Status { status, message });
        }
        Ok(())
    }

    // vehicles

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ResourceApiError> {
        self.list_items(VEHICLES, &Query::new()).await
    }

    pub async fn create_vehicle<B: Serialize + Sync>(
        &self,
        vehicle: &B,
    ) -> Result<Vehicle, ResourceApiError> {
        self.create_item(VEHICLES, vehicle).await
    }

    pub async fn update_vehicle<B: Serialize + Sync>(
        &self,
        id: Uuid,
        patch: &B,
    ) -> Result<Vehicle, ResourceApiError> {
        self.update_item(VEHICLES, id, patch).await
    }

    pub async fn delete_vehicle(&self, id: Uuid) -> Result<(), ResourceApiError> {
        self.delete_item(VEHICLES, id).await
    }

    // missions

    /// Mission board order: newest start time first.
    pub async fn list_missions(&self) -> Result<Vec<Mission>, ResourceApiError> {
        self.list_items(MISSIONS, &Query::new().sort(["-start_time"])).await
    }

    pub async fn create_mission<B: Serialize + Sync>(
        &self,
        mission: &B,
    ) -> Result<Mission, ResourceApiError> {
        self.create_item(MISSIONS, mission).await
    }

    pub async fn update_mission<B: Serialize + Sync>(
        &self,
        id: Uuid,
        patch: &B,
    ) -> Result<Mission, ResourceApiError> {
        self.update_item(MISSIONS, id, patch).await
    }

    // driver profiles

    pub async fn list_driver_profiles(
        &self,
    ) -> Result<Vec<DriverProfile>, ResourceApiError> {
        self.list_items(DRIVER_PROFILES, &Query::new()).await
    }

    pub async fn driver_profile_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<DriverProfile>, ResourceApiError> {
        let query = Query::new()
            .filter(json!({ "user_id": { "_eq": user_id } }))
            .limit(1);
        let profiles: Vec<DriverProfile> =
            self.list_items(DRIVER_PROFILES, &query).await?;
        Ok(profiles.into_iter().next())
    }

    pub async fn create_driver_profile<B: Serialize + Sync>(
        &self,
        profile: &B,
    ) -> Result<DriverProfile, ResourceApiError> {
        self.create_item(DRIVER_PROFILES, profile).await
    }

    pub async fn update_driver_profile<B: Serialize + Sync>(
        &self,
        id: Uuid,
        patch: &B,
    ) -> Result<DriverProfile, ResourceApiError> {
        self.update_item(DRIVER_PROFILES, id, patch).await
    }

    // maintenance

    pub async fn list_maintenance_logs(
        &self,
        vehicle_id: Option<Uuid>,
    ) -> Result<Vec<MaintenanceLog>, ResourceApiError> {
        let mut query = Query::new().sort(["-reported_date"]);
        if let Some(vehicle_id) = vehicle_id {
            query = query.filter(json!({ "vehicle_id": { "_eq": vehicle_id } }));
        }
        self.list_items(MAINTENANCE_LOGS, &query).await
    }

    pub async fn report_maintenance(
        &self,
        vehicle_id: Uuid,
        issue: &str,
        reported_by: Option<Uuid>,
    ) -> Result<MaintenanceLog, ResourceApiError> {
        let draft = NewMaintenanceLog {
            vehicle_id,
            issue_reported: issue.to_string(),
            reported_date: OffsetDateTime::now_utc(),
            reported_by,
        };
        self.create_item(MAINTENANCE_LOGS, &draft).await
    }

    // notifications

    pub async fn list_notifications(
        &self,
        recipient_id: Option<Uuid>,
    ) -> Result<Vec<Notification>, ResourceApiError> {
        let mut query = Query::new()
            .sort(["-timestamp"])
            .limit(NOTIFICATION_PAGE);
        if let Some(recipient_id) = recipient_id {
            query =
                query.filter(json!({ "recipient_id": { "_eq": recipient_id } }));
        }
        self.list_items(NOTIFICATIONS, &query).await
    }

    /// New notifications always go out as `Delivered` with a client-side
    /// timestamp; the recipient flips them to `Read`.
    pub async fn send_notification(
        &self,
        sender_id: Option<Uuid>,
        recipient_id: Option<Uuid>,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification, ResourceApiError> {
        let draft = NewNotification {
            sender_id,
            recipient_id,
            kind,
            message: message.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            status: NotificationStatus::Delivered,
        };
        self.create_item(NOTIFICATIONS, &draft).await
    }

    pub async fn mark_notification_read(
        &self,
        id: Uuid,
    ) -> Result<Notification, ResourceApiError> {
        self.update_item(NOTIFICATIONS, id, &json!({ "status": "Read" }))
            .await
    }

    // location logs

    pub async fn submit_location(
        &self,
        sample: &NewLocationLog,
    ) -> Result<LocationLog, ResourceApiError> {
        self.create_item(LOCATION_LOGS, sample).await
    }

    pub async fn recent_locations(
        &self,
        limit: u64,
    ) -> Result<Vec<LocationLog>, ResourceApiError> {
        let query = Query::new().sort(["-timestamp"]).limit(limit);
        self.list_items(LOCATION_LOGS, &query).await
    }

    // system users

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, ResourceApiError> {
        let token = self.bearer()?;
        debug!("listing users");
        let response = self.http
            .get(self.endpoint("/users"))
            .query(&[("fields", "*,role.name")])
            .bearer_auth(token)
            .send()
            .await?;
        decode(response).await
    }

    /// Users whose role resolves to the driver class. The role relation may
    /// come back unexpanded, so the filtering happens client-side.
    pub async fn list_drivers(
        &self,
    ) -> Result<Vec<UserRecord>, ResourceApiError> {
        Ok(only_drivers(self.list_users().await?))
    }
}

fn only_drivers(users: Vec<UserRecord>) -> Vec<UserRecord> {
    users
        .into_iter()
        .filter(|user| {
            user.role_name()
                .and_then(Role::from_name)
                .is_some_and(|role| role.is_driver_class())
        })
        .collect()
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ResourceApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = error_message(&response.text().await.unwrap_or_default());
        return Err(ResourceApiError::Status { status, message });
    }
    let body = response.text().await?;
    trace!("resource response: {body}");
    parse_envelope(&body)
}

fn parse_envelope<T: DeserializeOwned>(
    body: &str,
) -> Result<T, ResourceApiError> {
    #[derive(serde::Deserialize)]
    struct Envelope<T> {
        data: T,
    }

    let envelope: Envelope<T> = serde_json::from_str(body)?;
    Ok(envelope.data)
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("errors")?
        .get(0)?
        .get("message")?
        .as_str()
        .map(str::to_owned)
}
