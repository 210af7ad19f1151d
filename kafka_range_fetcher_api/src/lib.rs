pub mod app_config;
pub mod error;
pub mod fetch_api;
pub mod startup;
mod time_util;
