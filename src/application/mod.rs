// Application layer - Use cases over the monitoring backend
pub mod admin_service;
pub mod dashboard_service;
pub mod industry_service;
pub mod monitoring_api;
pub mod reconciler;
pub mod session;
