pub mod access;
pub mod app;
pub mod auth;
pub mod catches;
pub mod collection;
pub mod comments;
pub mod config;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod likes;
pub mod pagination;
pub mod patch;
pub mod profile;
pub mod session;
pub mod spots;
pub mod state;
pub mod storage;
pub mod uploads;
