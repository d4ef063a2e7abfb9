//! Generalized Advantage Estimation.

/// Computes GAE-λ advantages and the matching returns.
///
/// A `done` flag cuts both the bootstrap and the advantage trace, so several
/// episodes can share one buffer. The step after the last stored one is
/// bootstrapped with value `0`.
///
/// # Arguments
///
/// * `rewards` - Per-step rewards
/// * `values` - Per-step value estimates
/// * `dones` - Per-step episode termination flags
/// * `gamma` - Discount factor
/// * `gae_lambda` - GAE λ parameter (0 = TD(0), 1 = Monte Carlo)
///
/// Returns `(advantages, returns)` with `returns[t] = advantages[t] + values[t]`.
///
/// # Panics
///
/// If the three slices differ in length.
pub fn compute_gae(
    rewards: &[f64],
    values: &[f64],
    dones: &[bool],
    gamma: f64,
    gae_lambda: f64,
) -> (Vec<f64>, Vec<f64>) {
    let n = rewards.len();
    assert_eq!(values.len(), n, "one value estimate per reward");
    assert_eq!(dones.len(), n, "one done flag per reward");
    let mut advantages = vec![0.0; n];
    let mut running = 0.0;

    for t in (0..n).rev() {
        let live = if dones[t] { 0.0 } else { 1.0 };
        let bootstrap = if t + 1 < n { values[t + 1] } else { 0.0 };
        let td_error = rewards[t] + gamma * bootstrap * live - values[t];
        running = td_error + gamma * gae_lambda * live * running;
        advantages[t] = running;
    }

    let returns = advantages
        .iter()
        .zip(values)
        .map(|(adv, v)| adv + v)
        .collect();
    (advantages, returns)
}
