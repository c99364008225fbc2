//! Contract tests for the js_bridge component
//!
//! These tests exercise the public API end to end against a real engine.

mod context_tests;
