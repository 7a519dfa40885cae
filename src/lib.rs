pub mod aggregate;
pub mod cfbd;
pub mod cli;
pub mod conference;
pub mod config;
pub mod factors;
pub mod fixture_provider;
pub mod http_cache;
pub mod http_client;
pub mod pipeline;
pub mod report;
pub mod schedule;
pub mod team_tables;
