//! Load-cell wire protocol: ASCII decimal readings, one per line, flowing
//! sensor -> controller; advisory tare commands flowing back. No acks.

/// Sent in a burst right after the controller accepts a sensor connection.
pub const TARE_COMMAND: &[u8] = b"TARE";

/// Sent once for a user-requested re-tare.
pub const TARE_LINE: &[u8] = b"TARE\n";
