// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Decoders and listeners that record how the engine drives them.

use std::sync::atomic::{AtomicUsize, Ordering};

use uanode_core::{
    AttributeOverrides, Base64JsonDecoder, ChangeListener, ChangeMask, DefaultsDecoder,
    EncodedDefaults, ModelError, ModelResult, NodeHandle, NodeInstance, QualifiedName,
};

// =============================================================================
// Counting Decoder
// =============================================================================

/// A [`Base64JsonDecoder`] that counts calls and can be told to fail.
#[derive(Debug, Default)]
pub struct CountingDecoder {
    inner: Base64JsonDecoder,
    calls: AtomicUsize,
    fail_after: Option<usize>,
}

impl CountingDecoder {
    /// Creates a decoder that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder whose calls fail once `successes` calls succeeded.
    pub fn failing_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::default()
        }
    }

    /// Returns the number of decode calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resets the call counter.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

impl DefaultsDecoder for CountingDecoder {
    fn decode(&self, defaults: &EncodedDefaults) -> ModelResult<AttributeOverrides> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if matches!(self.fail_after, Some(limit) if call >= limit) {
            return Err(ModelError::malformed_defaults(format!("injected failure on call {}", call)));
        }
        self.inner.decode(defaults)
    }
}

// =============================================================================
// Recording Listener
// =============================================================================

/// A change listener that keeps every notification.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Vec<(NodeHandle, QualifiedName, ChangeMask)>,
}

impl RecordingListener {
    /// Creates an empty listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded notifications in delivery order.
    pub fn events(&self) -> &[(NodeHandle, QualifiedName, ChangeMask)] {
        &self.events
    }

    /// Returns the mask reported for a node, if any.
    pub fn mask_of(&self, handle: NodeHandle) -> Option<ChangeMask> {
        self.events
            .iter()
            .find(|(h, _, _)| *h == handle)
            .map(|(_, _, mask)| *mask)
    }

    /// Returns the browse names of nodes reported with `flag`.
    pub fn names_with(&self, flag: ChangeMask) -> Vec<String> {
        self.events
            .iter()
            .filter(|(_, _, mask)| mask.contains(flag))
            .map(|(_, name, _)| name.name.clone())
            .collect()
    }

    /// Returns `true` if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops recorded notifications.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ChangeListener for RecordingListener {
    fn on_change(&mut self, handle: NodeHandle, node: &NodeInstance, mask: ChangeMask) {
        self.events.push((handle, node.browse_name().clone(), mask));
    }
}
