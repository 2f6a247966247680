// Application state for HTTP handlers
use crate::application::admin_service::AdminService;
use crate::application::dashboard_service::DashboardService;
use crate::application::industry_service::IndustryService;

#[derive(Clone)]
pub struct AppState {
    pub industry_service: IndustryService,
    pub dashboard_service: DashboardService,
    pub admin_service: AdminService,
}
