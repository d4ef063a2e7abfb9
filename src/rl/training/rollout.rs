//! Episode collection with any [`ActorCritic`].

use rand::RngCore;

use super::buffer::{RolloutBuffer, Transition};
use crate::rl::environment::HivEnvironment;
use crate::rl::error::EnvError;
use crate::rl::observation::ObservationBuilder;
use crate::rl::policy::ActorCritic;

/// Runs one episode from a fresh reset, storing every step in `buffer`.
///
/// Returns the episode's cumulative reward.
pub fn collect_episode(
    env: &mut HivEnvironment,
    policy: &mut dyn ActorCritic,
    buffer: &mut RolloutBuffer,
    rng: &mut dyn RngCore,
) -> Result<f64, EnvError> {
    let mut state = env.reset();
    loop {
        let state_vector = ObservationBuilder::build(&state);
        let value = policy.evaluate(&state_vector).value;
        let (action, log_prob) = policy.act(&state_vector, rng);
        let result = env.step_index(action)?;

        buffer.push(Transition {
            state_vector,
            action,
            reward: result.reward,
            log_prob,
            value,
            done: result.done,
        });

        if result.done {
            return Ok(env.cumulative_reward);
        }
        state = result.state;
    }
}
