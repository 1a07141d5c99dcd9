pub mod cart;
pub mod catalog;
pub mod config;
pub mod embed;
pub mod feed_parse;
pub mod headlines;
pub mod http_client;
pub mod persist;
pub mod provider;
pub mod render;
pub mod state;
pub mod storage;
