use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

use crate::analytics::buckets::WeekStart;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    // Upstream HR API
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub page_size: u32,

    // Local cache
    pub dashboard_cache_ttl: u64,
    pub worklog_cache_ttl: u64,
    pub cache_dir: Option<PathBuf>,

    pub week_starts_on: WeekStart,

    // Rate limiting
    pub rate_dashboard_per_min: u32,
    pub rate_list_per_min: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            api_base_url: env::var("HRM_API_URL").expect("HRM_API_URL must be set"),
            api_token: env::var("HRM_API_TOKEN").ok().filter(|t| !t.is_empty()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("REQUEST_TIMEOUT_SECS must be a number"),
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .expect("PAGE_SIZE must be a number"),

            dashboard_cache_ttl: env::var("DASHBOARD_CACHE_TTL")
                .unwrap_or_else(|_| "300".to_string()) // default 5 min
                .parse()
                .expect("DASHBOARD_CACHE_TTL must be a number"),
            worklog_cache_ttl: env::var("WORKLOG_CACHE_TTL")
                .unwrap_or_else(|_| "30".to_string()) // default 30 sec
                .parse()
                .expect("WORKLOG_CACHE_TTL must be a number"),
            cache_dir: env::var("CACHE_DIR").ok().map(PathBuf::from),

            week_starts_on: env::var("WEEK_STARTS_ON")
                .unwrap_or_else(|_| "sunday".to_string())
                .parse()
                .expect("WEEK_STARTS_ON must be sunday or monday"),

            rate_dashboard_per_min: env::var("RATE_DASHBOARD_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("RATE_DASHBOARD_PER_MIN must be a number"),
            rate_list_per_min: env::var("RATE_LIST_PER_MIN")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .expect("RATE_LIST_PER_MIN must be a number"),
        }
    }
}
