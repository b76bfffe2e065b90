pub mod api;
pub mod carousel;
pub mod compare;
pub mod config;
pub mod dates;
pub mod fetch_pool;
pub mod heatmap;
pub mod http_client;
pub mod match_center;
pub mod model;
pub mod persist;
pub mod players;
pub mod provider;
pub mod schema;
pub mod situations;
pub mod standings;
pub mod state;
pub mod stats;
