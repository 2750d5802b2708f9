//! Integration tests - the public wrangling API end to end
//!
//! These tests drive descriptors, joins and binders together through the crate's public surface.

mod join_property_tests;
