use super::segment;
use crate::common::ApiResult;
use crate::http::{ApiClient, ApiRequest};
use serde::Serialize;
use serde_json::{Value, json};

/// Payment gateway used to collect an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentGateway {
    #[default]
    Razorpay,
    Paytm,
    Stripe,
}

#[derive(Serialize)]
struct PaymentInitiation<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proforma_id: Option<&'a str>,
    gateway: PaymentGateway,
}

/// Invoice, proforma and payment endpoints.
pub struct InvoiceApi<'a> {
    client: &'a ApiClient,
}

impl<'a> InvoiceApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn invoices(&self, status: Option<&str>) -> ApiResult<Value> {
        self.client
            .send_json(ApiRequest::get("/invoices/invoices/").with_query("status", status))
            .await
    }

    pub async fn invoice(&self, id: &str) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/invoices/invoices/{}/", segment(id)))
            .await
    }

    pub async fn proforma_invoices(&self, status: Option<&str>) -> ApiResult<Value> {
        self.client
            .send_json(ApiRequest::get("/invoices/proforma/").with_query("status", status))
            .await
    }

    pub async fn generate_proforma(&self, filing_id: &str, invoice_count: u32) -> ApiResult<Value> {
        self.client
            .post_json(
                "/invoices/proforma/generate/",
                &json!({ "filing_id": filing_id, "invoice_count": invoice_count }),
            )
            .await
    }

    pub async fn convert_proforma(&self, id: &str) -> ApiResult<Value> {
        self.client
            .send_json(ApiRequest::post(format!(
                "/invoices/proforma/{}/convert_to_invoice/",
                segment(id)
            )))
            .await
    }

    /// Starts a payment for either an invoice or a proforma invoice.
    pub async fn initiate_payment(
        &self,
        invoice_id: Option<&str>,
        proforma_id: Option<&str>,
        gateway: PaymentGateway,
    ) -> ApiResult<Value> {
        let body = PaymentInitiation {
            invoice_id,
            proforma_id,
            gateway,
        };
        self.client
            .post_json("/invoices/payments/initiate/", &body)
            .await
    }

    pub async fn payment_history(&self) -> ApiResult<Value> {
        self.client.get_json("/invoices/payments/history/").await
    }
}
