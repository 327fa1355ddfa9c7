//! External delivery channels for audit alerts.

pub mod webhook;
