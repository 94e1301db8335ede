//! Integration tests for the relay
//!
//! This module contains integration tests that verify the complete
//! request/response flow through the relay against a mock webhook.

mod health;
mod timeout;
