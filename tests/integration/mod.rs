//! Integration test suite for maestro.
//!
//! These tests drive the public API end to end: the runner against stub and
//! mock-HTTP providers, the store on real files, and the page's update loop
//! with its commands executed against a temporary store.
//!
//! # Test Categories
//!
//! - `run_e2e`: Runner behavior as seen through the run log and result
//! - `provider_http`: Full runs over HTTP against a mock provider
//! - `store_persistence`: Store file format and concurrency-free semantics
//! - `session_flow`: Select / save / delete / clear / execute cycles
//!
//! # CI Compatibility
//!
//! No test makes a real API call or reads credentials from the environment.

mod fixtures;

mod run_e2e;
mod session_flow;
mod store_persistence;
