//! Escalation gate.
//!
//! Decides when the cumulative drowsy-event count warrants an out-of-band
//! emergency notification. Throttled so a persistently drowsy driver does not
//! generate unbounded SOS traffic: with the default base of 10 and period of
//! 5 it fires on the 11th, 16th, 21st, … event.

/// Pure function of the cumulative count; evaluated once per `BecameDrowsy`
/// transition, never per frame.
///
/// `period` must be non-zero; `Config::validate` rejects zero at startup.
pub fn should_escalate(count: u64, base: u64, period: u64) -> bool {
    count > base && (count - base - 1) % period == 0
}
