use super::segment;
use crate::common::ApiResult;
use crate::http::{ApiClient, ApiRequest};
use serde::Serialize;
use serde_json::{Value, json};

/// Optional filters for the admin activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub admin_id: Option<String>,
    pub action: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize)]
struct FilingStatusUpdate<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filing_reference_number: Option<&'a str>,
}

/// Back-office endpoints available to staff accounts.
pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self) -> ApiResult<Value> {
        self.client.get_json("/admin/dashboard/").await
    }

    pub async fn filing_report(&self) -> ApiResult<Value> {
        self.client.get_json("/admin/dashboard/filing_report/").await
    }

    pub async fn payment_report(&self) -> ApiResult<Value> {
        self.client
            .get_json("/admin/dashboard/payment_report/")
            .await
    }

    pub async fn search_users(&self, search_type: &str, search_value: &str) -> ApiResult<Value> {
        self.client
            .post_json(
                "/admin/search/search/",
                &json!({ "search_type": search_type, "search_value": search_value }),
            )
            .await
    }

    pub async fn update_filing_status(
        &self,
        filing_id: &str,
        status: &str,
        reference: Option<&str>,
    ) -> ApiResult<Value> {
        let body = FilingStatusUpdate {
            status,
            filing_reference_number: reference,
        };
        self.client
            .post_json(
                &format!("/admin/filing/{}/update_status/", segment(filing_id)),
                &body,
            )
            .await
    }

    pub async fn lock_filing(&self, filing_id: &str, reason: &str) -> ApiResult<Value> {
        self.client
            .post_json(
                &format!("/admin/filing/{}/lock/", segment(filing_id)),
                &json!({ "reason": reason }),
            )
            .await
    }

    pub async fn unlock_filing(&self, filing_id: &str) -> ApiResult<Value> {
        self.client
            .send_json(ApiRequest::post(format!(
                "/admin/filing/{}/unlock/",
                segment(filing_id)
            )))
            .await
    }

    pub async fn trigger_reminder(&self, filing_id: &str) -> ApiResult<Value> {
        self.client
            .send_json(ApiRequest::post(format!(
                "/admin/filing/{}/trigger_reminder/",
                segment(filing_id)
            )))
            .await
    }

    pub async fn collection_summary(&self) -> ApiResult<Value> {
        self.client
            .get_json("/admin/payments/collection_summary/")
            .await
    }

    pub async fn record_manual_payment(
        &self,
        invoice_id: &str,
        amount: f64,
        method: &str,
        reference: &str,
    ) -> ApiResult<Value> {
        self.client
            .post_json(
                &format!(
                    "/admin/payments/{}/record_manual_payment/",
                    segment(invoice_id)
                ),
                &json!({ "amount": amount, "method": method, "reference": reference }),
            )
            .await
    }

    pub async fn activity_logs(&self, filter: &ActivityFilter) -> ApiResult<Value> {
        let request = ApiRequest::get("/admin/activity/")
            .with_query("admin_id", filter.admin_id.as_deref())
            .with_query("action", filter.action.as_deref())
            .with_query("start_date", filter.start_date.as_deref())
            .with_query("end_date", filter.end_date.as_deref());
        self.client.send_json(request).await
    }
}
