use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{
    common::{ThaliStoreConfig, entities::app_errors::CoreError},
    thali_recognition::{
        ports::ThaliStore,
        value_objects::{SaveThaliRequest, SaveThaliResponse},
    },
};

/// Posts reviewed plates as JSON to the persistence backend. Failed saves are
/// reported to the caller and never retried here.
#[derive(Debug, Clone)]
pub struct HttpThaliStore {
    save_url: String,
    client: Client,
}

/// Acknowledgement body. Backends that answer with an empty body or with
/// unrelated JSON are treated as having stored every item.
#[derive(Debug, Default, Deserialize)]
struct StoreAck {
    success: Option<bool>,
    saved_items: Option<usize>,
    error: Option<String>,
}

impl HttpThaliStore {
    pub fn new(config: &ThaliStoreConfig) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                error!("failed to build thali store HTTP client: {}", e);
                CoreError::InternalServerError
            })?;

        Ok(Self {
            save_url: config.save_url.clone(),
            client,
        })
    }
}

impl ThaliStore for HttpThaliStore {
    async fn save(&self, request: SaveThaliRequest) -> Result<SaveThaliResponse, CoreError> {
        let sent_items = request.items.len();

        let response = self
            .client
            .post(&self.save_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("thali store request failed: {}", e);
                CoreError::ExternalServiceError(format!("thali store unreachable: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            error!("thali store error: {} - {}", status, body);
            return Err(CoreError::ExternalServiceError(format!(
                "thali store returned error: {} - {}",
                status, body
            )));
        }

        let saved = read_ack(&body, sent_items)?;
        info!(
            recognition_id = %request.recognition_data.recognition_id,
            saved_items = saved.saved_items,
            "thali stored"
        );

        Ok(saved)
    }
}

fn read_ack(body: &str, sent_items: usize) -> Result<SaveThaliResponse, CoreError> {
    let ack: StoreAck = if body.trim().is_empty() {
        StoreAck::default()
    } else {
        serde_json::from_str(body).unwrap_or_default()
    };

    if ack.success == Some(false) {
        return Err(CoreError::ExternalServiceError(
            ack.error
                .unwrap_or_else(|| "thali store rejected the save".to_string()),
        ));
    }

    Ok(SaveThaliResponse {
        success: true,
        saved_items: ack.saved_items.unwrap_or(sent_items),
    })
}
