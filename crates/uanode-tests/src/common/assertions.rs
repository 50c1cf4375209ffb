// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Assertion helpers with failure messages that name the node involved.

use uanode_core::{AddressSpace, ChangeMask, NodeHandle, NodeState, Variant};

// =============================================================================
// Address Space Assertions
// =============================================================================

/// Assertion extensions for [`AddressSpace`].
pub trait SpaceAssertions {
    /// Returns the browse names of the materialized children, in order.
    fn child_names(&self, handle: NodeHandle) -> Vec<String>;

    /// Assert the materialized children, by browse name, in order.
    fn assert_children(&self, handle: NodeHandle, expected: &[&str]);

    /// Assert the pending change mask.
    fn assert_mask(&self, handle: NodeHandle, expected: ChangeMask);

    /// Assert the value of a child variable.
    fn assert_child_value(&self, handle: NodeHandle, name: &str, expected: &Variant);

    /// Assert that a node and its whole materialized subtree are initialized.
    fn assert_initialized_tree(&self, handle: NodeHandle);
}

impl SpaceAssertions for AddressSpace {
    fn child_names(&self, handle: NodeHandle) -> Vec<String> {
        self.children(handle)
            .expect("node exists")
            .into_iter()
            .map(|child| self.browse_name(child).expect("child exists").name.clone())
            .collect()
    }

    fn assert_children(&self, handle: NodeHandle, expected: &[&str]) {
        let actual = self.child_names(handle);
        assert_eq!(
            actual, expected,
            "Unexpected children of {} ({})",
            handle,
            self.browse_name(handle).expect("node exists")
        );
    }

    fn assert_mask(&self, handle: NodeHandle, expected: ChangeMask) {
        let actual = self.change_mask(handle).expect("node exists");
        assert_eq!(
            actual, expected,
            "Expected change mask {:?} on {}, got {:?}",
            expected, handle, actual
        );
    }

    fn assert_child_value(&self, handle: NodeHandle, name: &str, expected: &Variant) {
        let child = self
            .child(handle, name)
            .expect("node exists")
            .unwrap_or_else(|| panic!("{} has no materialized child {}", handle, name));
        let actual = self.value(child).expect("child exists");
        assert_eq!(actual, expected, "Unexpected value of {}/{}", handle, name);
    }

    fn assert_initialized_tree(&self, handle: NodeHandle) {
        for node in self.collect_subtree(handle).expect("node exists") {
            assert_eq!(
                self.state(node).expect("node exists"),
                NodeState::Initialized,
                "{} ({}) is not initialized",
                node,
                self.browse_name(node).expect("node exists")
            );
        }
    }
}
