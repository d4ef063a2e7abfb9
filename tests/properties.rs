//! Property-based tests for state sampling and environment transitions.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use virochess::molecular::{Feature, MolecularState};
use virochess::rl::{EnvConfig, HivEnvironment};

fn assert_in_range(state: &MolecularState) -> Result<(), TestCaseError> {
    for feature in Feature::ALL {
        if let Some((min, max)) = feature.range() {
            let v = state.value(feature);
            prop_assert!(
                (min..=max).contains(&v),
                "{} = {} outside [{}, {}]",
                feature.key(),
                v,
                min,
                max
            );
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn random_states_stay_in_range(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..20 {
            let state = MolecularState::random(&mut rng);
            prop_assert_eq!(state.len(), Feature::COUNT);
            prop_assert!(!state.validate().has_range_violation());
            assert_in_range(&state)?;
        }
    }

    #[test]
    fn steps_keep_features_clipped(
        seed in any::<u64>(),
        actions in prop::collection::vec(0usize..3, 50),
    ) {
        let mut env = HivEnvironment::new(EnvConfig::default(), seed);
        env.reset();
        for action in actions {
            let result = env.step_index(action).unwrap();
            assert_in_range(&result.state)?;
            if result.done {
                break;
            }
        }
    }

    #[test]
    fn seeded_runs_replay_exactly(
        seed in any::<u64>(),
        actions in prop::collection::vec(0usize..3, 1..30),
    ) {
        let run = |seed: u64| {
            let mut env = HivEnvironment::new(EnvConfig::default(), seed);
            env.reset();
            let mut out = Vec::new();
            for &a in &actions {
                let Ok(r) = env.step_index(a) else { break };
                out.push((r.reward.to_bits(), r.state.clone(), r.done));
                if r.done {
                    break;
                }
            }
            out
        };
        prop_assert_eq!(run(seed), run(seed));
    }

    #[test]
    fn shortage_is_idempotent(seed in any::<u64>(), atp in 1.0f64..2.5) {
        let mut env = HivEnvironment::new(EnvConfig::default(), seed);
        let mut state = env.reset();
        state.set(Feature::AtpLevel, atp);
        env.set_state(state.clone());
        // knight_jump costs 4 units, always above `atp`.
        let result = env.step("knight_jump").unwrap();
        prop_assert!(!result.info.action_success);
        prop_assert_eq!(env.state(), &state);
    }
}

/// 10,000 seeded episodes of 50 random actions each; every state seen stays
/// inside the registered ranges.
#[test]
fn ten_thousand_sequences_stay_clipped() {
    let mut actions = StdRng::seed_from_u64(0xC4E55);
    for seed in 0..10_000u64 {
        let mut env = HivEnvironment::new(EnvConfig::default(), seed);
        env.reset();
        for _ in 0..50 {
            let result = env.step_index(actions.gen_range(0..3)).unwrap();
            assert!(
                !result.state.validate().has_range_violation(),
                "seed {} step {}: {:?}",
                seed,
                result.info.step_count,
                result.info.violations
            );
            if result.done {
                break;
            }
        }
    }
}
