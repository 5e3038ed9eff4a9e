//! Tests for the packpoint-engine crate.

mod helpers;
