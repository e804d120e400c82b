//! Memberdesk - Membership subscriptions and administrative audit rollback
//!
//! This crate drives organization subscriptions through their lifecycle from
//! signed payment gateway events, keeps an append-only audit log of
//! administrative mutations with one-step rollback, and records every
//! notification it sends.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
