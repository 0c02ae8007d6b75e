use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::core::articles::{PipelineError, RowStore, SheetRef};
use crate::infra::google::auth::ServiceAccountAuth;

/// Google Sheets v4 values client. It deliberately exposes only the range
/// read and range write the core layer needs.
pub struct SheetsClient {
    client: Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsClient {
    pub fn new(auth: Arc<ServiceAccountAuth>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
        }
    }

    /// Extracts the spreadsheet ID from a Google Sheets URL, or accepts a
    /// bare ID.
    pub fn extract_sheet_id(url_or_id: &str) -> Result<SheetRef, PipelineError> {
        if let Some(start) = url_or_id.find("/d/") {
            let after = &url_or_id[start + 3..];
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(after.len());
            let id = &after[..end];
            if !id.is_empty() {
                return Ok(SheetRef(id.to_string()));
            }
        } else if !url_or_id.is_empty()
            && !url_or_id.contains('/')
            && !url_or_id.contains(' ')
        {
            return Ok(SheetRef(url_or_id.to_string()));
        }

        Err(PipelineError::InvalidReference {
            kind: "sheet",
            value: url_or_id.to_string(),
        })
    }

    async fn bearer_token(&self) -> Result<String, PipelineError> {
        self.auth
            .get_access_token()
            .await
            .map_err(|e| PipelineError::RowStore(e.to_string()))
    }
}

#[async_trait]
impl RowStore for SheetsClient {
    async fn get_range(
        &self,
        sheet: &SheetRef,
        range: &str,
    ) -> Result<Vec<Vec<String>>, PipelineError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/{}/values/{}", self.base_url, sheet.0, range);

        tracing::debug!(sheet = %sheet.0, range, "Reading sheet range");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| PipelineError::RowStore(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::RowStore(format!(
                "Sheets API returned {} reading {}: {}",
                status, range, text
            )));
        }

        let value_range: ValueRange = response
            .json()
            .await
            .map_err(|e| PipelineError::RowStore(e.to_string()))?;
        Ok(value_range.values)
    }

    async fn set_range(
        &self,
        sheet: &SheetRef,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), PipelineError> {
        let token = self.bearer_token().await?;
        let url = format!(
            "{}/{}/values/{}?valueInputOption=RAW",
            self.base_url, sheet.0, range
        );

        tracing::debug!(sheet = %sheet.0, range, rows = rows.len(), "Writing sheet range");

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "values": rows }))
            .send()
            .await
            .map_err(|e| PipelineError::RowStore(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::RowStore(format!(
                "Sheets API returned {} writing {}: {}",
                status, range, text
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_sheet_id_from_url() {
        let url = "https://docs.google.com/spreadsheets/d/1abcDEF_23-xyz/edit#gid=0";
        assert_eq!(
            SheetsClient::extract_sheet_id(url).unwrap(),
            SheetRef("1abcDEF_23-xyz".to_string())
        );
    }

    #[test]
    fn accepts_a_bare_id() {
        assert_eq!(
            SheetsClient::extract_sheet_id("1abcDEF").unwrap(),
            SheetRef("1abcDEF".to_string())
        );
    }

    #[test]
    fn rejects_urls_without_an_id() {
        let err = SheetsClient::extract_sheet_id("https://docs.google.com/spreadsheets/d/")
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidReference { kind: "sheet", .. }
        ));
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(SheetsClient::extract_sheet_id("not a sheet url").is_err());
        assert!(SheetsClient::extract_sheet_id("").is_err());
    }

    #[test]
    fn value_range_defaults_to_empty_when_values_missing() {
        // The API omits "values" entirely for an empty range.
        let parsed: ValueRange = serde_json::from_str(r#"{"range":"Sheet1!2:501"}"#).unwrap();
        assert!(parsed.values.is_empty());
    }
}
