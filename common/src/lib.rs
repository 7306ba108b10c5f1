//! # pingmap common
//!
//! Shared domain types for the subnet sweeper:
//!
//! * **[`network`]**: CIDR parsing and address enumeration.
//! * **[`status`]**: per-address scan states and the status table.
//! * **[`error`]**: the error taxonomy surfaced by the scan engine.
//! * **[`config`]**: presentation flags and scan defaults.

pub mod config;
pub mod error;
pub mod network;
pub mod status;
