//! Residual policy/value network using tch-rs (PyTorch bindings).
//!
//! This module is only available with the `rl-nn` feature.

use tch::{nn, nn::Module, Device, Kind, Tensor};

use super::policy::{ActorCritic, PolicyOutput};

/// Layer sizes for [`ResidualPolicyNetwork`].
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Width of the shared trunk.
    pub hidden_dim: i64,
    /// Number of residual blocks in the trunk.
    pub n_blocks: usize,
    /// Width of the hidden layer in each head.
    pub head_dim: i64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_dim: 512,
            n_blocks: 10,
            head_dim: 128,
        }
    }
}

/// `h + W2 · relu(norm(W1 · h))`
#[derive(Debug)]
struct ResidualBlock {
    fc1: nn::Linear,
    norm: nn::LayerNorm,
    fc2: nn::Linear,
}

impl ResidualBlock {
    fn new(p: nn::Path, dim: i64) -> Self {
        Self {
            fc1: nn::linear(&p / "fc1", dim, dim, Default::default()),
            norm: nn::layer_norm(&p / "norm", vec![dim], Default::default()),
            fc2: nn::linear(&p / "fc2", dim, dim, Default::default()),
        }
    }

    fn forward(&self, h: &Tensor) -> Tensor {
        let inner = self.fc2.forward(&self.norm.forward(&self.fc1.forward(h)).relu());
        h + inner
    }
}

/// Shared residual trunk with a softmax policy head and a tanh value head.
///
/// Architecture: `state_dim → hidden → N × residual(hidden) → {policy, value}`.
pub struct ResidualPolicyNetwork {
    vs: nn::VarStore,
    input: nn::Linear,
    blocks: Vec<ResidualBlock>,
    policy_hidden: nn::Linear,
    policy_out: nn::Linear,
    value_hidden: nn::Linear,
    value_out: nn::Linear,
    action_dim: usize,
}

impl ResidualPolicyNetwork {
    /// Creates a freshly initialised network.
    ///
    /// # Arguments
    ///
    /// * `state_dim` - Observation vector length
    /// * `action_dim` - Number of actions in the rule table
    /// * `config` - Layer sizes
    /// * `device` - Compute device
    pub fn new(state_dim: usize, action_dim: usize, config: &NetworkConfig, device: Device) -> Self {
        let vs = nn::VarStore::new(device);
        let root = vs.root();
        let h = config.hidden_dim;
        let input = nn::linear(&root / "input", state_dim as i64, h, Default::default());
        let blocks = (0..config.n_blocks)
            .map(|i| ResidualBlock::new(&root / format!("block{}", i), h))
            .collect();
        let policy_hidden = nn::linear(&root / "pi1", h, config.head_dim, Default::default());
        let policy_out = nn::linear(
            &root / "pi2",
            config.head_dim,
            action_dim as i64,
            Default::default(),
        );
        let value_hidden = nn::linear(&root / "v1", h, config.head_dim, Default::default());
        let value_out = nn::linear(&root / "v2", config.head_dim, 1, Default::default());

        Self {
            vs,
            input,
            blocks,
            policy_hidden,
            policy_out,
            value_hidden,
            value_out,
            action_dim,
        }
    }

    /// Forward pass: returns `(log_probs [B, A], values [B])`.
    pub fn forward(&self, states: &Tensor) -> (Tensor, Tensor) {
        let mut h = self.input.forward(states).relu();
        for block in &self.blocks {
            h = block.forward(&h);
        }
        let logits = self
            .policy_out
            .forward(&self.policy_hidden.forward(&h).relu());
        let values = self
            .value_out
            .forward(&self.value_hidden.forward(&h).relu())
            .tanh()
            .squeeze_dim(-1);
        (logits.log_softmax(-1, Kind::Float), values)
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn device(&self) -> Device {
        self.vs.device()
    }

    pub fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    pub fn var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.vs
    }
}

impl ActorCritic for ResidualPolicyNetwork {
    fn evaluate(&mut self, state_vector: &[f64]) -> PolicyOutput {
        let input = Tensor::from_slice(state_vector)
            .to_kind(Kind::Float)
            .to_device(self.device())
            .unsqueeze(0);
        let (log_probs, values) = tch::no_grad(|| self.forward(&input));
        let probs = log_probs.exp().squeeze_dim(0).to_kind(Kind::Double);
        let probabilities = Vec::<f64>::try_from(&probs).unwrap_or_default();
        PolicyOutput {
            probabilities,
            value: values.double_value(&[0]),
        }
    }

    fn name(&self) -> &str {
        "residual_network"
    }
}
