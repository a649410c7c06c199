//! Order execution port trait.

use crate::domain::signal::TradeIntent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected { reason: String },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }
}

/// Port for handing trade intents to an execution venue.
///
/// Fills are not reported here; realized P&L reaches the account through
/// `SharedAccount::apply_pnl`.
pub trait ExecutionPort {
    fn submit(&self, intent: &TradeIntent) -> SubmitOutcome;
}
