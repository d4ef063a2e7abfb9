//! Molecular chess environment.
//!
//! One call to [`HivEnvironment::step`] runs a full transition:
//! lookup → energy check → success draw → primary effect → side effects →
//! energy deduction → termination check → reward.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::config::EnvConfig;
use super::error::EnvError;
use super::observation::ObservationBuilder;
use super::reward::RewardComputer;
use super::types::{StepOutcome, TerminationCause, TransitionMetrics};
use crate::molecular::{Feature, MolecularState};
use crate::rules::{ChessMove, RuleTable, TransitionRule};

/// Diagnostics reported alongside every step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Action identifier that was attempted.
    pub action: String,
    pub action_success: bool,
    /// Steps taken in this episode, including this one.
    pub step_count: u32,
    /// Validity of the resulting state.
    pub state_valid: bool,
    pub violations: Vec<String>,
    pub metrics: TransitionMetrics,
    pub termination: Option<TerminationCause>,
}

impl StepInfo {
    pub fn outcome(&self) -> StepOutcome {
        self.metrics.outcome
    }

    /// Shortfall when the action could not be paid for.
    pub fn energy_shortage(&self) -> Option<f64> {
        self.metrics.energy_shortage
    }
}

/// Result of a single environment step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub state: MolecularState,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// Single-agent environment over a [`MolecularState`].
///
/// Each instance owns its state, step counter and seeded random source, so a
/// fixed seed and action sequence always replays the same trajectory.
///
/// # Lifecycle
///
/// 1. Create with [`HivEnvironment::new`] (samples an initial state).
/// 2. Call [`HivEnvironment::reset`] to start an episode.
/// 3. Call [`HivEnvironment::step`] until `done`.
/// 4. Further steps return [`EnvError::EpisodeTerminated`] until the next reset.
#[derive(Debug)]
pub struct HivEnvironment {
    /// Episode and reward configuration.
    pub config: EnvConfig,
    rules: RuleTable,
    state: MolecularState,
    step_count: u32,
    termination: Option<TerminationCause>,
    rng: StdRng,
    /// Sum of rewards since the last reset.
    pub cumulative_reward: f64,
}

impl HivEnvironment {
    /// Creates an environment with the standard rule table.
    ///
    /// # Arguments
    ///
    /// * `config` - Episode and reward configuration
    /// * `seed` - Random seed for reproducible episodes
    pub fn new(config: EnvConfig, seed: u64) -> Self {
        Self::with_rules(config, RuleTable::standard(), seed)
    }

    /// Creates an environment with a custom rule table.
    pub fn with_rules(config: EnvConfig, rules: RuleTable, seed: u64) -> Self {
        Self::from_rng(config, rules, StdRng::seed_from_u64(seed))
    }

    /// Creates an environment seeded from OS entropy.
    pub fn from_entropy(config: EnvConfig) -> Self {
        Self::from_rng(config, RuleTable::standard(), StdRng::from_entropy())
    }

    fn from_rng(config: EnvConfig, rules: RuleTable, mut rng: StdRng) -> Self {
        let state = MolecularState::random(&mut rng);
        Self {
            config,
            rules,
            state,
            step_count: 0,
            termination: None,
            rng,
            cumulative_reward: 0.0,
        }
    }

    /// Starts a new episode from a freshly sampled state.
    pub fn reset(&mut self) -> MolecularState {
        self.state = MolecularState::random(&mut self.rng);
        self.step_count = 0;
        self.termination = None;
        self.cumulative_reward = 0.0;
        info!(
            atp = self.state.value(Feature::AtpLevel),
            cd4 = self.state.value(Feature::Cd4Density),
            "episode reset"
        );
        self.state.clone()
    }

    /// Attempts `action` and advances the episode by one step.
    ///
    /// # Errors
    ///
    /// * [`EnvError::UnknownAction`] if the rule table has no such action.
    /// * [`EnvError::EpisodeTerminated`] if the episode already ended.
    ///
    /// In both cases the stored state is left untouched.
    pub fn step(&mut self, action: &str) -> Result<StepResult, EnvError> {
        if self.termination.is_some() {
            warn!(action, step_count = self.step_count, "step after termination");
            return Err(EnvError::EpisodeTerminated {
                step_count: self.step_count,
            });
        }
        let rule = self
            .rules
            .get(action)
            .ok_or_else(|| EnvError::UnknownAction(action.to_string()))?;

        let (next, metrics) = apply_transition(
            rule,
            &self.state,
            self.config.atp_conversion,
            &mut self.rng,
        );

        self.step_count += 1;
        let termination = self.check_termination(&next);
        let reward = RewardComputer::compute(&next, &metrics, &self.config.reward);
        let validation = next.validate();

        debug!(
            action,
            outcome = %metrics.outcome,
            reward,
            step = self.step_count,
            "step"
        );
        if let Some(cause) = termination {
            info!(step = self.step_count, %cause, "episode terminated");
        }

        self.state = next.clone();
        self.termination = termination;
        self.cumulative_reward += reward;

        Ok(StepResult {
            state: next,
            reward,
            done: termination.is_some(),
            info: StepInfo {
                action: action.to_string(),
                action_success: metrics.outcome.is_success(),
                step_count: self.step_count,
                state_valid: validation.is_valid(),
                violations: validation.messages(),
                metrics,
                termination,
            },
        })
    }

    /// Steps with a chess move from the standard vocabulary.
    pub fn step_move(&mut self, mv: ChessMove) -> Result<StepResult, EnvError> {
        self.step(mv.action_id())
    }

    /// Steps with the action at policy index `index`.
    pub fn step_index(&mut self, index: usize) -> Result<StepResult, EnvError> {
        let action = self
            .rules
            .action_at(index)
            .ok_or_else(|| EnvError::UnknownAction(format!("#{}", index)))?
            .to_string();
        self.step(&action)
    }

    fn check_termination(&self, state: &MolecularState) -> Option<TerminationCause> {
        if self.step_count >= self.config.max_steps {
            return Some(TerminationCause::StepBudget);
        }
        let below = |feature: Feature| {
            feature
                .critical_threshold()
                .is_some_and(|t| state.value(feature) < t)
        };
        if below(Feature::AtpLevel) {
            return Some(TerminationCause::AtpDepleted);
        }
        if below(Feature::Cd4Density) {
            return Some(TerminationCause::Cd4Depleted);
        }
        None
    }

    pub fn state(&self) -> &MolecularState {
        &self.state
    }

    /// Replaces the held state without touching the step counter.
    pub fn set_state(&mut self, state: MolecularState) {
        self.state = state;
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn is_done(&self) -> bool {
        self.termination.is_some()
    }

    pub fn termination(&self) -> Option<TerminationCause> {
        self.termination
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Number of actions a policy can choose from.
    pub fn action_dim(&self) -> usize {
        self.rules.len()
    }

    /// The current state as a policy input vector.
    pub fn observation(&self) -> Vec<f64> {
        ObservationBuilder::build(&self.state)
    }

    /// Prints the current state to stdout.
    pub fn render(&self) {
        println!("\nCurrent Molecular State:");
        print!("{}", self.state);
    }
}

/// Computes the successor of `current` under `rule`.
///
/// The caller's state is never mutated; failures return an unchanged copy
/// and spend no energy.
fn apply_transition<R: Rng + ?Sized>(
    rule: &TransitionRule,
    current: &MolecularState,
    atp_conversion: f64,
    rng: &mut R,
) -> (MolecularState, TransitionMetrics) {
    let required_energy = rule.required_energy(atp_conversion);
    let atp = current.value(Feature::AtpLevel);
    let membrane = current.value(Feature::MembraneFluidity);

    let mut metrics = TransitionMetrics {
        outcome: StepOutcome::EnergyShortage,
        required_energy,
        base_probability: rule.probability,
        adjusted_probability: None,
        membrane_influence: membrane,
        atp_influence: atp,
        energy_shortage: None,
    };

    if atp < required_energy {
        metrics.energy_shortage = Some(required_energy - atp);
        return (current.clone(), metrics);
    }

    let adjusted = rule.adjusted_probability(current);
    metrics.adjusted_probability = Some(adjusted);
    if rng.gen::<f64>() >= adjusted {
        metrics.outcome = StepOutcome::Failed;
        return (current.clone(), metrics);
    }

    let mut next = current.clone();
    rule.apply_primary(&mut next);
    for effect in &rule.side_effects {
        if rng.gen::<f64>() < effect.probability {
            let value = next.value(effect.target) + effect.scaled_magnitude(&next);
            next.set_clamped(effect.target, value);
        }
    }
    let remaining = next.value(Feature::AtpLevel) - required_energy;
    next.set_clamped(Feature::AtpLevel, remaining);

    metrics.outcome = StepOutcome::Success;
    (next, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Confidence, SideEffect};

    fn rich_state() -> MolecularState {
        MolecularState::from_values([
            (Feature::Cd4Density, 600.0),
            (Feature::MembraneFluidity, 1.0),
            (Feature::AtpLevel, 10.0),
            (Feature::ViralLoad, 1000.0),
            (Feature::InterferonResponse, 100.0),
            (Feature::EnvProteinState, 0.5),
            (Feature::AntibodySpecificity, 0.5),
            (Feature::MemoryCellStatus, 0.5),
            (Feature::DrugResistance, 0.1),
        ])
    }

    fn certain_rule() -> TransitionRule {
        TransitionRule {
            action: "sure_thing".into(),
            molecular_action: String::new(),
            target: Feature::EnvProteinState,
            magnitude: 0.2,
            probability: 1.0,
            time_scale: 0.1,
            energy_cost: 1.0e6,
            side_effects: vec![
                SideEffect::new(Feature::MembraneFluidity, -0.1, 1.0),
                SideEffect::new(Feature::AntibodySpecificity, -0.1, 0.0),
            ],
            source: String::new(),
            confidence: Confidence::Estimated,
        }
    }

    #[test]
    fn reset_zeroes_step_count() {
        let mut env = HivEnvironment::new(EnvConfig::default(), 42);
        env.set_state(rich_state());
        env.step("knight_jump").unwrap();
        assert_eq!(env.step_count(), 1);
        let state = env.reset();
        assert_eq!(env.step_count(), 0);
        assert_eq!(&state, env.state());
        assert_eq!(state.len(), Feature::COUNT);
    }

    #[test]
    fn certain_success_applies_all_effects() {
        let rules = RuleTable::new(vec![certain_rule()]).unwrap();
        let mut env = HivEnvironment::with_rules(EnvConfig::default(), rules, 1);
        env.set_state(rich_state());
        let result = env.step("sure_thing").unwrap();
        assert!(result.info.action_success);
        let s = &result.state;
        assert!((s.value(Feature::EnvProteinState) - 0.7).abs() < 1e-12);
        // -0.1 scaled by 1 + 0.1 * (10 - 5)
        assert!((s.value(Feature::MembraneFluidity) - 0.85).abs() < 1e-12);
        // probability 0 side effect never fires
        assert_eq!(s.value(Feature::AntibodySpecificity), 0.5);
        assert!((s.value(Feature::AtpLevel) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn energy_shortage_leaves_state_untouched() {
        let mut env = HivEnvironment::new(EnvConfig::default(), 7);
        let mut state = rich_state();
        state.set(Feature::AtpLevel, 3.0);
        env.set_state(state.clone());
        let result = env.step("bishop_move").unwrap();
        assert!(!result.info.action_success);
        assert_eq!(result.info.outcome(), StepOutcome::EnergyShortage);
        assert!((result.info.energy_shortage().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(result.reward, -5.0);
        assert_eq!(env.state(), &state);
        assert!(!result.done);
    }

    #[test]
    fn unknown_action_is_an_error() {
        let mut env = HivEnvironment::new(EnvConfig::default(), 3);
        let before = env.state().clone();
        let err = env.step("rook_slide").unwrap_err();
        assert_eq!(err, EnvError::UnknownAction("rook_slide".to_string()));
        assert_eq!(env.state(), &before);
        assert_eq!(env.step_count(), 0);
    }

    #[test]
    fn step_index_out_of_range() {
        let mut env = HivEnvironment::new(EnvConfig::default(), 3);
        assert_eq!(
            env.step_index(9).unwrap_err(),
            EnvError::UnknownAction("#9".to_string())
        );
    }

    #[test]
    fn terminates_at_step_budget() {
        let config = EnvConfig {
            max_steps: 3,
            ..EnvConfig::default()
        };
        let mut env = HivEnvironment::new(config, 11);
        let mut state = rich_state();
        // Too poor for any action but above the critical floor.
        state.set(Feature::AtpLevel, 2.2);
        env.set_state(state);
        for t in 0..3 {
            let result = env.step("bishop_move").unwrap();
            assert_eq!(result.done, t == 2);
        }
        assert_eq!(env.termination(), Some(TerminationCause::StepBudget));
    }

    #[test]
    fn step_after_termination_is_rejected() {
        let mut env = HivEnvironment::new(EnvConfig::default(), 5);
        let mut state = rich_state();
        state.set(Feature::Cd4Density, 150.0);
        env.set_state(state);
        let result = env.step("knight_jump").unwrap();
        assert!(result.done);
        assert_eq!(result.info.termination, Some(TerminationCause::Cd4Depleted));
        let before = env.state().clone();
        assert_eq!(
            env.step("knight_jump").unwrap_err(),
            EnvError::EpisodeTerminated { step_count: 1 }
        );
        assert_eq!(env.state(), &before);
        env.reset();
        assert!(!env.is_done());
    }

    #[test]
    fn cumulative_reward_tracks_steps() {
        let mut env = HivEnvironment::new(EnvConfig::default(), 21);
        env.set_state(rich_state());
        let a = env.step_move(ChessMove::KnightJump).unwrap().reward;
        let b = env.step_move(ChessMove::KnightJump).unwrap().reward;
        assert!((env.cumulative_reward - (a + b)).abs() < 1e-12);
    }

    #[test]
    fn observation_has_feature_dim() {
        let env = HivEnvironment::new(EnvConfig::default(), 2);
        assert_eq!(env.observation().len(), env.config.observation_dim());
        assert_eq!(env.action_dim(), 3);
    }
}
