//! The playout engine (C4): one randomized simulation drawn from a policy,
//! recording the rollout and the legal-move codes seen at each step.

use crate::board::Board;
use crate::error::{NrpaError, NrpaResult};
use crate::policy::Policy;
use crate::rollout::{LegalMoveCodes, Rollout};

/// Runs one playout from `B::default()` under the (read-only) policy `π`.
///
/// At each non-terminal step, legal moves are drawn from the board, weighted
/// by `exp(logit)` and sampled with a single uniform draw over the prefix
/// sums (ties resolve to the lower index, i.e. an inclusive prefix sum
/// comparison). Per-step logits are recentered by subtracting the step's
/// maximum before exponentiating, which leaves the sampling distribution and
/// the adaptation gradient unchanged (see crate docs) while keeping `exp`
/// finite.
pub fn playout<B: Board>(policy: &Policy, rng: &mut fastrand::Rng) -> NrpaResult<(Rollout, LegalMoveCodes)> {
    let mut board = B::default();
    let mut rollout = Rollout::with_capacity(B::max_legal_moves());
    let mut legal_codes = LegalMoveCodes::with_capacity(B::max_legal_moves());
    let mut moves = Vec::with_capacity(B::max_legal_moves());

    while !board.terminal() {
        let step = board.length();
        let n = board.legal_moves(&mut moves);
        if n == 0 {
            return Err(NrpaError::BoardContractViolation(format!(
                "board reported zero legal moves at step {step} while non-terminal"
            )));
        }

        let codes: Vec<_> = moves.iter().map(|&m| board.code(m)).collect();

        let max_logit = codes
            .iter()
            .map(|&c| policy.prob(c))
            .fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = codes
            .iter()
            .map(|&c| (policy.prob(c) - max_logit).exp())
            .collect();
        let sum: f64 = weights.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(NrpaError::NumericOverflow { step });
        }

        let draw = rng.f64() * sum;
        let mut acc = 0.0;
        let mut chosen = n - 1;
        for (i, &w) in weights.iter().enumerate() {
            acc += w;
            if acc >= draw {
                chosen = i;
                break;
            }
        }

        legal_codes.push_step(codes.clone());
        rollout.add_move(codes[chosen]);
        board.play(moves[chosen]);
    }

    rollout.set_score(board.score());
    Ok((rollout, legal_codes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::LineWalk;

    #[test]
    fn empty_policy_playout_is_legal_and_consistent() {
        let mut rng = fastrand::Rng::with_seed(1);
        let policy = Policy::new();
        let (rollout, legal) = playout::<LineWalk<4>>(&policy, &mut rng).unwrap();
        assert_eq!(rollout.length(), legal.steps());
        for step in 0..rollout.length() {
            assert!(legal.at(step).contains(&rollout.mv(step)));
        }
        assert!(rollout.score() >= 0.0 && rollout.score() <= 4.0);
    }

    #[test]
    fn empirical_mean_near_half_branching_with_uniform_policy() {
        let mut rng = fastrand::Rng::with_seed(7);
        let policy = Policy::new();
        let mut total = 0.0;
        const TRIALS: u32 = 10_000;
        for _ in 0..TRIALS {
            let (rollout, _) = playout::<LineWalk<4>>(&policy, &mut rng).unwrap();
            total += rollout.score();
        }
        let mean = total / f64::from(TRIALS);
        assert!((mean - 2.0).abs() < 0.2, "mean was {mean}");
    }

    #[test]
    fn biased_policy_favours_plus_moves() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut policy = Policy::new();
        policy.set(1, 5.0); // code 1 is LineWalkMove::Plus
        let (rollout, _) = playout::<LineWalk<4>>(&policy, &mut rng).unwrap();
        assert_eq!(rollout.score(), 4.0);
    }
}
