use std::sync::Arc;

use thaliscan_core::application::ThaliscanService;

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: ThaliscanService,
}

impl AppState {
    pub fn new(args: Arc<Args>, service: ThaliscanService) -> Self {
        Self { args, service }
    }
}
