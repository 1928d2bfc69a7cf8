// Application state for HTTP handlers
use crate::application::device_service::DeviceService;

#[derive(Clone)]
pub struct AppState {
    pub device_service: DeviceService,
    pub api_key: String,
}
