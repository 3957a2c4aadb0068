//! Fault injection capability.
//!
//! The reference behavior drew a hidden random number to knock out a host.
//! Here the decision is an injected capability so planning and control stay
//! deterministic and testable: callers choose between never failing (the
//! default), a seeded pseudo-random draw, or their own rule.

use std::sync::Mutex;

/// Decides whether a simulated host fault hits a target, and which member
/// of an active set goes down.
pub trait FaultInjector: Send + Sync {
    /// Whether the given target is declared down.
    fn should_fail(&self, target: &str) -> bool;

    /// Pick the victim out of an active set. The reference rule takes the
    /// first element; override for anything else.
    fn select_victim<'a>(&self, active: &'a [String]) -> Option<&'a str> {
        active.first().map(String::as_str)
    }
}

/// Injector that never declares a fault. The default everywhere.
pub struct NeverFail;

impl FaultInjector for NeverFail {
    fn should_fail(&self, _target: &str) -> bool {
        false
    }
}

/// Probability the reference simulator used for its host-down draw.
pub const DEFAULT_FAULT_PROBABILITY: f64 = 0.25;

/// Seeded pseudo-random injector for demo runs. The same seed always
/// produces the same sequence of decisions.
pub struct SeededFaultInjector {
    probability: f64,
    rng: Mutex<fastrand::Rng>,
}

impl SeededFaultInjector {
    pub fn new(seed: u64, probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    pub fn with_default_probability(seed: u64) -> Self {
        Self::new(seed, DEFAULT_FAULT_PROBABILITY)
    }
}

impl FaultInjector for SeededFaultInjector {
    fn should_fail(&self, _target: &str) -> bool {
        if self.probability >= 1.0 {
            return true;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.f64() < self.probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_fail_never_fails() {
        let injector = NeverFail;
        assert!(!injector.should_fail("vnf-node-01"));
    }

    #[test]
    fn test_forced_probability_always_fails() {
        let injector = SeededFaultInjector::new(7, 1.0);
        assert!(injector.should_fail("vnf-node-01"));
        assert!(injector.should_fail("vnf-node-02"));
    }

    #[test]
    fn test_zero_probability_never_fails() {
        let injector = SeededFaultInjector::new(7, 0.0);
        for _ in 0..32 {
            assert!(!injector.should_fail("vnf-node-01"));
        }
    }

    #[test]
    fn test_same_seed_reproduces_decisions() {
        let a = SeededFaultInjector::with_default_probability(42);
        let b = SeededFaultInjector::with_default_probability(42);
        let draws_a: Vec<bool> = (0..16).map(|_| a.should_fail("n")).collect();
        let draws_b: Vec<bool> = (0..16).map(|_| b.should_fail("n")).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_victim_selection_takes_first_active() {
        let injector = NeverFail;
        let active = vec!["vnf-node-02".to_string(), "vnf-node-05".to_string()];
        assert_eq!(injector.select_victim(&active), Some("vnf-node-02"));
        assert_eq!(injector.select_victim(&[]), None);
    }
}
