/// Per-record disposition produced by the handler.
///
/// The queue layer translates this into its native acknowledgment
/// scheme: `Ok` and `DropPermanently` both consume the record, while
/// `RetryLater` leaves it eligible for redelivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Record fully processed.
    Ok,
    /// Poison record. Consuming it without retry is the only sane
    /// option: it will never parse differently on redelivery.
    DropPermanently,
    /// Transient failure in a notification step. The record should be
    /// redelivered by the queue.
    RetryLater(String),
}
