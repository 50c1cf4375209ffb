// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uanode Integration Tests
//!
//! Shared fixtures and helpers for the integration suites.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p uanode-tests
//!
//! cargo test -p uanode-tests --test integration_space
//! cargo test -p uanode-tests --test integration_config
//! cargo test -p uanode-tests --test integration_robotics
//! ```
//!
//! ## Test Categories
//!
//! ### Address Space (`integration_space.rs`)
//! - Mandatory/optional materialization and slot order
//! - Child replacement and the `CHILDREN` change bit
//! - Defaults decoding, idempotent initialization and rollback
//!
//! ### Configuration (`integration_config.rs`)
//! - Model descriptions from files and strings
//! - Namespace merging across descriptions
//! - Host configuration and environment overrides
//!
//! ### Robotics (`integration_robotics.rs`)
//! - Motion device scenario and typed views
//! - Enumeration decoding
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use uanode_tests::prelude::*;
//!
//! #[test]
//! fn test_something() {
//!     let mut space = CellModel::space();
//!     let cell = space.instantiate(&CELL_TYPE, "1:Cell").unwrap();
//!     space.assert_children(cell, &["Temperature", "Sensors"]);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::builders::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
}
