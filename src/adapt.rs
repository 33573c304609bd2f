//! The policy-adaptation rule (C5): a gradient step of the policy toward a
//! best rollout, with snapshot semantics — every per-step gradient is
//! computed against the *input* policy, never against values this very call
//! has already written. See crate docs for why that distinction matters.

use crate::constants::DEFAULT_ALPHA;
use crate::policy::Policy;
use crate::rollout::{LegalMoveCodes, Rollout};

/// Computes the adapted policy `π'` from base policy `π`, best rollout `r`
/// and its legal codes `L`, with learning rate `alpha`.
///
/// For each step `s`, `Z_s = Σ_{c ∈ L[s]} exp(π(c))`, and:
///
/// ```text
/// π'(c) = π(c) + alpha * (1{c == r.move(s)} - exp(π(c)) / Z_s)   for c ∈ L[s]
/// π'(c) = π(c)                                                    otherwise
/// ```
///
/// Implemented by accumulating deltas for every touched code against a
/// snapshot of `π`, then applying them all at once — so `Z_s` for a later
/// step is never computed from an already-updated logit.
pub fn adapt(base: &Policy, rollout: &Rollout, legal_codes: &LegalMoveCodes, alpha: f64) -> Policy {
    let mut deltas: std::collections::HashMap<u32, f64> = std::collections::HashMap::new();

    for step in 0..rollout.length() {
        let played = rollout.mv(step);
        let codes = legal_codes.at(step);

        let max_logit = codes
            .iter()
            .map(|&c| base.prob(c))
            .fold(f64::NEG_INFINITY, f64::max);
        let z: f64 = codes.iter().map(|&c| (base.prob(c) - max_logit).exp()).sum();

        *deltas.entry(played).or_insert(0.0) += alpha;
        for &c in codes {
            let p = (base.prob(c) - max_logit).exp() / z;
            *deltas.entry(c).or_insert(0.0) -= alpha * p;
        }
    }

    let mut adapted = base.clone();
    for (code, delta) in deltas {
        adapted.update(code, delta);
    }
    adapted
}

/// [`adapt`] with the default learning rate.
pub fn adapt_default(base: &Policy, rollout: &Rollout, legal_codes: &LegalMoveCodes) -> Policy {
    adapt(base, rollout, legal_codes, DEFAULT_ALPHA)
}
