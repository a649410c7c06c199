//! Account balance, drawdown halt and position sizing.

use std::sync::{Arc, Mutex, MutexGuard};

/// Risk parameters for an account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    pub initial_balance: f64,
    /// Percent of balance committed per trade (0.5 = 0.5%).
    pub risk_per_trade: f64,
    /// Fractional loss from the initial balance that halts trading.
    /// `None` disables the halt.
    pub max_drawdown: Option<f64>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            initial_balance: 10_000.0,
            risk_per_trade: 0.5,
            max_drawdown: Some(0.1),
        }
    }
}

/// Mutable account state for a single run.
///
/// The halted state is never stored; it is recomputed from the balance on
/// every query.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    balance: f64,
    initial_balance: f64,
    risk_per_trade: f64,
    max_drawdown: Option<f64>,
}

impl AccountState {
    pub fn new(config: RiskConfig) -> Self {
        AccountState {
            balance: config.initial_balance,
            initial_balance: config.initial_balance,
            risk_per_trade: config.risk_per_trade,
            max_drawdown: config.max_drawdown,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// balance * risk_per_trade / 100, never negative.
    pub fn position_size(&self) -> f64 {
        (self.balance * self.risk_per_trade / 100.0).max(0.0)
    }

    /// initial_balance * (1 - max_drawdown), if a drawdown limit is set.
    pub fn halt_threshold(&self) -> Option<f64> {
        self.max_drawdown.map(|dd| self.initial_balance * (1.0 - dd))
    }

    pub fn is_halted(&self) -> bool {
        self.halt_threshold().is_some_and(|threshold| self.balance < threshold)
    }

    /// Add realized profit or loss. The balance may go negative.
    pub fn apply_pnl(&mut self, amount: f64) {
        self.balance += amount;
    }
}

/// Cloneable handle to an account shared between the bar loop and fill
/// callbacks. All access goes through one mutex.
#[derive(Debug, Clone)]
pub struct SharedAccount {
    inner: Arc<Mutex<AccountState>>,
}

impl SharedAccount {
    pub fn new(state: AccountState) -> Self {
        SharedAccount {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AccountState> {
        // Poisoned state is still a whole f64 balance.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn balance(&self) -> f64 {
        self.lock().balance()
    }

    pub fn position_size(&self) -> f64 {
        self.lock().position_size()
    }

    pub fn halt_threshold(&self) -> Option<f64> {
        self.lock().halt_threshold()
    }

    pub fn is_halted(&self) -> bool {
        self.lock().is_halted()
    }

    pub fn apply_pnl(&self, amount: f64) {
        self.lock().apply_pnl(amount);
    }

    pub fn snapshot(&self) -> AccountState {
        self.lock().clone()
    }
}

impl From<AccountState> for SharedAccount {
    fn from(state: AccountState) -> Self {
        SharedAccount::new(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn account() -> AccountState {
        AccountState::new(RiskConfig {
            initial_balance: 10_000.0,
            risk_per_trade: 0.5,
            max_drawdown: Some(0.1),
        })
    }

    #[test]
    fn new_account_starts_at_initial_balance() {
        let acc = account();
        assert_eq!(acc.balance(), 10_000.0);
        assert_eq!(acc.initial_balance(), 10_000.0);
        assert!(!acc.is_halted());
    }

    #[test]
    fn position_size_is_percent_of_balance() {
        assert_relative_eq!(account().position_size(), 50.0);
    }

    #[test]
    fn position_size_zero_balance() {
        let mut acc = account();
        acc.apply_pnl(-10_000.0);
        assert_eq!(acc.position_size(), 0.0);
    }

    #[test]
    fn position_size_never_negative() {
        let mut acc = account();
        acc.apply_pnl(-15_000.0);
        assert_eq!(acc.position_size(), 0.0);
    }

    #[test]
    fn halted_below_threshold() {
        let mut acc = account();
        acc.apply_pnl(-1_001.0);
        assert_eq!(acc.balance(), 8_999.0);
        assert!(acc.is_halted());
    }

    #[test]
    fn not_halted_above_threshold() {
        let mut acc = account();
        acc.apply_pnl(-999.0);
        assert_eq!(acc.balance(), 9_001.0);
        assert!(!acc.is_halted());
    }

    #[test]
    fn halt_recomputed_after_recovery() {
        let mut acc = account();
        acc.apply_pnl(-2_000.0);
        assert!(acc.is_halted());
        acc.apply_pnl(2_000.0);
        assert!(!acc.is_halted());
    }

    #[test]
    fn threshold_value() {
        assert_relative_eq!(account().halt_threshold().unwrap(), 9_000.0);
    }

    #[test]
    fn no_drawdown_limit_never_halts() {
        let mut acc = AccountState::new(RiskConfig {
            max_drawdown: None,
            ..RiskConfig::default()
        });
        acc.apply_pnl(-50_000.0);
        assert!(acc.balance() < 0.0);
        assert!(!acc.is_halted());
        assert_eq!(acc.halt_threshold(), None);
    }

    #[test]
    fn shared_account_applies_pnl_across_threads() {
        let shared = SharedAccount::new(account());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let handle = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        handle.apply_pnl(-1.0);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(shared.balance(), 9_600.0);
        assert!(!shared.is_halted());
    }

    #[test]
    fn shared_snapshot_is_detached() {
        let shared = SharedAccount::from(account());
        let snap = shared.snapshot();
        shared.apply_pnl(100.0);
        assert_eq!(snap.balance(), 10_000.0);
        assert_eq!(shared.balance(), 10_100.0);
    }
}
