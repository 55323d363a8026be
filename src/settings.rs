// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tracking of `SETTINGS_HEADER_TABLE_SIZE` changes.
//!
//! A SETTINGS change takes effect on the local tables immediately, but the
//! peer only learns about it through dynamic-table size-update directives at
//! the start of the next header block. The tracker records every pending
//! value so the encoder can emit all of them in order, which also covers the
//! case where an intermediate value was smaller than the final one.

/// Records pending `SETTINGS_HEADER_TABLE_SIZE` values and the bound the
/// decoder enforces on incoming size-update directives.
pub(crate) struct SettingsTracker {
    applied_max: usize,
    last_settings_max: usize,
    received: bool,
    pending_updates: Vec<usize>,
    must_emit_update: bool,
}

impl SettingsTracker {
    /// Creates a tracker for a codec whose tables start at `initial_max`.
    /// No SETTINGS value has been received yet.
    pub(crate) fn new(initial_max: usize) -> Self {
        Self {
            applied_max: initial_max,
            last_settings_max: 0,
            received: false,
            pending_updates: Vec::new(),
            must_emit_update: false,
        }
    }

    /// Records a received `SETTINGS_HEADER_TABLE_SIZE` value. The value is
    /// applied locally right away and queued for emission before the next
    /// header block.
    pub(crate) fn notify(&mut self, new_max: usize) {
        self.received = true;
        self.last_settings_max = new_max;
        self.applied_max = new_max;
        self.pending_updates.push(new_max);
        self.must_emit_update = true;
    }

    /// Checks whether size-update directives still have to be emitted.
    pub(crate) fn must_emit_update(&self) -> bool {
        self.must_emit_update
    }

    /// Takes all pending size-update values, in the order they arrived, and
    /// clears the emission flag.
    pub(crate) fn take_pending(&mut self) -> Vec<usize> {
        self.must_emit_update = false;
        std::mem::take(&mut self.pending_updates)
    }

    /// Checks whether the decoder may accept a size-update directive for
    /// `max_size`. Before the first SETTINGS exchange any value is accepted;
    /// afterwards the directive must not exceed the last SETTINGS value.
    pub(crate) fn accepts(&self, max_size: usize) -> bool {
        !self.received || max_size <= self.last_settings_max
    }

    /// Records the capacity a size-update directive put into effect.
    pub(crate) fn apply(&mut self, max_size: usize) {
        self.applied_max = max_size;
    }

    pub(crate) fn applied_max(&self) -> usize {
        self.applied_max
    }
}

#[cfg(test)]
mod ut_settings {
    use super::SettingsTracker;

    /// UT test cases for `SettingsTracker`.
    ///
    /// # Brief
    /// 1. Creates a `SettingsTracker` and notifies two SETTINGS values.
    /// 2. Checks the pending queue, the emission flag and the acceptance
    ///    bound.
    #[test]
    fn ut_settings_tracker() {
        let mut tracker = SettingsTracker::new(4096);
        assert!(!tracker.must_emit_update());
        assert_eq!(tracker.applied_max(), 4096);
        // No SETTINGS received yet: everything is accepted.
        assert!(tracker.accepts(65536));

        tracker.notify(100);
        tracker.notify(200);
        assert!(tracker.must_emit_update());
        assert_eq!(tracker.applied_max(), 200);
        assert!(tracker.accepts(200));
        assert!(tracker.accepts(150));
        assert!(!tracker.accepts(201));

        assert_eq!(tracker.take_pending(), [100, 200]);
        assert!(!tracker.must_emit_update());
        assert!(tracker.take_pending().is_empty());

        tracker.apply(150);
        assert_eq!(tracker.applied_max(), 150);
    }
}
