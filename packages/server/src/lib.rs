//! Real-time chat presence and broadcast server.
//!
//! A single shared chat room: clients connect over WebSocket, join with a
//! username, exchange messages and receive presence updates and recent history.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
