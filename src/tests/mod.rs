//! Test suites for the block editor
//!
//! Scenario suites drive single trees through the pointer-level API;
//! serialization and hit-test suites check the format and geometry
//! contracts; property tests grow random programs through a workspace.

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod property_tests;
