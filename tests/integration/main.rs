//! Integration tests for Waymark
//!
//! These tests drive both harvest phases end to end against fake browser
//! drivers and wiremock servers, writing into temporary directories.

mod common;
mod enumerate_tests;
mod fetch_tests;
mod resume_tests;
