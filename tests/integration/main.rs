//! Integration tests for Vacancy Watch
//!
//! These tests use wiremock to stand in for the listings site and the
//! Telegram Bot API, and drive full cycles end-to-end against temporary
//! storage directories.

mod common;
mod cycle_tests;
mod notify_tests;
