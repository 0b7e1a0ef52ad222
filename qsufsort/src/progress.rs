// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

/// A best-effort sink for progress reporting during a suffix sort.
///
/// All operations have no-op defaults, so an implementation only overrides
/// what it renders. The sorter never blocks on any of them; an
/// implementation that does slow work here slows the sort down.
pub trait Progress {
    /// Names the phase the sorter is currently in, e.g. `Suffix sorting
    /// (8-order)`.
    fn set_label(&self, _label: &str) {}

    /// Reports completion of the current phase as a fraction in `[0, 1]`.
    fn on_progress(&self, _fraction: f64) {}

    /// Emits a diagnostic message.
    fn debug(&self, _message: &str) {}
}

/// A [`Progress`] that discards everything.
pub struct NopProgress;

impl Progress for NopProgress {}

/// A [`Progress`] that forwards labels and diagnostics to the [`log`] crate
/// facade and drops progress fractions.
pub struct LogProgress;

impl Progress for LogProgress {
    fn set_label(&self, label: &str) {
        log::debug!("{label}");
    }

    fn debug(&self, message: &str) {
        log::debug!("{message}");
    }
}
