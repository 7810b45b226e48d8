use super::segment;
use crate::common::ApiResult;
use crate::http::{ApiClient, ApiRequest};
use serde::Serialize;
use serde_json::{Value, json};

/// Optional filters for listing GST filings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingFilter {
    pub filing_type: Option<String>,
    pub status: Option<String>,
    pub financial_year: Option<String>,
}

/// Details of a filing to create.
#[derive(Debug, Clone, Serialize)]
pub struct NewFiling {
    pub filing_type: String,
    pub financial_year: String,
    pub month: u8,
    pub year: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nil_filing: Option<bool>,
}

/// GST return filing endpoints.
pub struct GstFilingApi<'a> {
    client: &'a ApiClient,
}

impl<'a> GstFilingApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn filings(&self, filter: &FilingFilter) -> ApiResult<Value> {
        let request = ApiRequest::get("/gst/filings/")
            .with_query("filing_type", filter.filing_type.as_deref())
            .with_query("status", filter.status.as_deref())
            .with_query("financial_year", filter.financial_year.as_deref());
        self.client.send_json(request).await
    }

    pub async fn filing(&self, id: &str) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/gst/filings/{}/", segment(id)))
            .await
    }

    pub async fn create_filing(&self, filing: &NewFiling) -> ApiResult<Value> {
        self.client.post_json("/gst/filings/", filing).await
    }

    /// Uploads an invoice spreadsheet as the multipart field `file`.
    pub async fn upload_invoices(
        &self,
        filing_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<Value> {
        let request = ApiRequest::post(format!(
            "/gst/filings/{}/upload_invoices/",
            segment(filing_id)
        ))
        .with_file("file", file_name, bytes);
        self.client.send_json(request).await
    }

    pub async fn submit_declaration(&self, filing_id: &str, declaration: &str) -> ApiResult<Value> {
        self.client
            .post_json(
                &format!("/gst/filings/{}/declare/", segment(filing_id)),
                &json!({ "declaration_statement": declaration }),
            )
            .await
    }

    pub async fn mark_nil_return(&self, filing_id: &str, declaration: &str) -> ApiResult<Value> {
        self.client
            .post_json(
                &format!("/gst/filings/{}/mark_nil/", segment(filing_id)),
                &json!({ "declaration_statement": declaration }),
            )
            .await
    }

    pub async fn filing_summary(&self, filing_id: &str) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/gst/filings/{}/summary/", segment(filing_id)))
            .await
    }

    pub async fn download_template(&self, kind: &str, financial_year: &str) -> ApiResult<Value> {
        let request = ApiRequest::get("/gst/filings/templates/")
            .with_query("type", Some(kind))
            .with_query("financial_year", Some(financial_year));
        self.client.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filing_omits_unset_nil_flag() {
        let filing = NewFiling {
            filing_type: "GSTR3B".to_string(),
            financial_year: "2024-25".to_string(),
            month: 4,
            year: 2024,
            nil_filing: None,
        };
        assert_eq!(
            serde_json::to_value(&filing).unwrap(),
            json!({
                "filing_type": "GSTR3B",
                "financial_year": "2024-25",
                "month": 4,
                "year": 2024
            })
        );
    }
}
