use crate::{
    domain::common::{ThaliscanConfig, entities::app_errors::CoreError, services::Service},
    infrastructure::{
        llm::{GeminiLLMClient, LlmItemDetector},
        thali_store::HttpThaliStore,
    },
};

pub type ThaliscanService = Service<LlmItemDetector<GeminiLLMClient>, HttpThaliStore>;

pub async fn create_service(config: ThaliscanConfig) -> Result<ThaliscanService, CoreError> {
    let llm = GeminiLLMClient::new(&config.llm)?;
    let thali_store = HttpThaliStore::new(&config.store)?;

    Ok(Service::new(LlmItemDetector::new(llm), thali_store))
}
