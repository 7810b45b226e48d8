use super::segment;
use crate::common::ApiResult;
use crate::http::{ApiClient, ApiRequest};
use serde_json::Value;

/// Profile and notification endpoints for the signed-in user.
pub struct UserApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> ApiResult<Value> {
        self.client.get_json("/auth/profile/").await
    }

    pub async fn update_profile(&self, changes: &Value) -> ApiResult<Value> {
        self.client.patch_json("/auth/profile/", changes).await
    }

    pub async fn notifications(&self) -> ApiResult<Value> {
        self.client.get_json("/notifications/list/").await
    }

    pub async fn mark_notification_read(&self, id: &str) -> ApiResult<Value> {
        self.client
            .send_json(ApiRequest::post(format!(
                "/notifications/list/{}/mark_as_read/",
                segment(id)
            )))
            .await
    }

    pub async fn unread_count(&self) -> ApiResult<Value> {
        self.client
            .get_json("/notifications/list/unread_count/")
            .await
    }
}
