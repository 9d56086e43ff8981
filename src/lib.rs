//! phishshield - background coordination core for the PhishShield extension
//!
//! This crate provides the long-lived broker that mediates between
//! short-lived extension contexts (content scripts, popup, options page)
//! and the remote analysis service, along with the local stores, status
//! presentation, and scheduled maintenance that support it.

pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod storage;

pub use services::Broker;
