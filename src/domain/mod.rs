// Domain layer - Readings, limits and the compliance rules applied to them
pub mod admin;
pub mod compliance;
pub mod dashboard;
pub mod history;
pub mod industry;
pub mod pollutant;
pub mod reading;
