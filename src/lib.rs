//! ytrack - a client for the Yandex Tracker API
//!
//! The [`api`] module is the library proper: [`api::TrackerClient`] maps each
//! call onto one Tracker REST v2 endpoint. The remaining modules back the
//! `ytrack` command-line tool.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
