//! Configuration Module
//!
//! Configuration loading for the venue stream service.

mod settings;

pub use settings::{
    ConfigError, Credentials, DEFAULT_YELP_BASE_URL, MAX_SEARCH_LIMIT, ObserverSettings,
    ServerSettings, VenueStreamConfig, YelpSettings,
};
