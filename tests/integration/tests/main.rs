//! End-to-End Integration Tests
//!
//! These tests drive a real `CasSession` against a mock CAS server bound
//! to an ephemeral port.

mod common;
mod validation;
