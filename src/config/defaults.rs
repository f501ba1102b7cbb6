//! Shared limits for CLI validation.

/// Characters rejected in device names handed to the audio backend.
pub(super) const FORBIDDEN_DEVICE_CHARS: &[char] = &['`', '$', ';', '|', '&', '<', '>'];

/// Longest accepted device name.
pub(super) const MAX_DEVICE_NAME_CHARS: usize = 256;
