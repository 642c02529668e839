//! Structured logging conventions for the engine.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! embedding program's job (the `jotz` CLI does it from `JOTZ_LOG`).
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Store corruption detected, a write was aborted |
//! | WARN  | Rejected writes (capacity, validation) |
//! | INFO  | Engine open, committed mutations |
//! | DEBUG | Per-operation detail: ids allocated, size deltas, counts |
//! | TRACE | Per-record iteration during scans |
//!
//! Every committed write runs inside an [`op_span`], so events carry the
//! operation name without repeating it.

use tracing::Span;

/// Target of every event the engine emits. Filter with `jotzapp=debug`.
pub const TARGET: &str = "jotzapp";

/// Span wrapping one logical write operation. The `op` field names it, e.g.
/// `"append_patch"` or `"rename_tag"`.
pub fn op_span(op: &'static str) -> Span {
    tracing::info_span!(target: TARGET, "write", op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_span_can_be_entered_without_subscriber() {
        let span = op_span("create");
        let _entered = span.enter();
        tracing::debug!(target: TARGET, note_id = "00000001", "inside span");
    }
}
