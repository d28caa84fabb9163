//! Tabular environment driven by a transition table.
use crate::state_obs;
use anyhow::{anyhow, Result};
use gym_bridge_core::{Act, Env, Space, Step, TransitionTable};
use log::info;
use ndarray::ArrayD;

/// A discrete MDP whose dynamics are given by a [`TransitionTable`].
///
/// At every step the next state is sampled from the outcomes of the current
/// `(state, action)` pair according to their probabilities. Observations are
/// one-element arrays holding the state index.
pub struct DiscreteEnv {
    table: TransitionTable,

    /// Initial state distribution.
    isd: Vec<f64>,

    act_space: Space,
    obs_space: Space,
    state: usize,
    last_action: Option<i64>,
    rng: fastrand::Rng,

    /// Time limit, the episode is truncated after this number of steps.
    max_steps: Option<usize>,
    count_steps: usize,

    /// Row-major description of the grid, used for rendering.
    desc: Option<Vec<String>>,
}

impl DiscreteEnv {
    /// Builds an environment from its dynamics and initial state distribution.
    pub fn new(table: TransitionTable, isd: Vec<f64>, seed: u64) -> Result<Self> {
        if isd.len() != table.n_states() {
            return Err(anyhow!(
                "Initial state distribution has {} entries for {} states",
                isd.len(),
                table.n_states()
            ));
        }
        let act_space = Space::Discrete {
            n: table.n_actions(),
        };
        let obs_space = Space::Discrete {
            n: table.n_states(),
        };
        Ok(Self {
            table,
            isd,
            act_space,
            obs_space,
            state: 0,
            last_action: None,
            rng: fastrand::Rng::with_seed(seed),
            max_steps: None,
            count_steps: 0,
            desc: None,
        })
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the grid description used by [`Env::render`].
    pub fn desc(mut self, desc: Vec<String>) -> Self {
        self.desc = Some(desc);
        self
    }

    /// Current state.
    pub fn state(&self) -> usize {
        self.state
    }

    /// Samples an index from a categorical distribution.
    fn sample(&self, probs: impl Iterator<Item = f64>) -> Option<usize> {
        let r = self.rng.f64();
        let mut acc = 0.0;
        let mut last = None;
        for (i, p) in probs.enumerate() {
            acc += p;
            last = Some(i);
            if r < acc {
                return Some(i);
            }
        }
        // Rounding may leave `acc` slightly below one.
        last
    }

    fn render_grid(&self, desc: &[String]) -> String {
        let ncol = desc.first().map(|row| row.chars().count()).unwrap_or(1);
        let mut out = String::new();
        if let Some(a) = self.last_action {
            let name = ["Left", "Down", "Right", "Up"].get(a as usize).unwrap_or(&"?");
            out.push_str(&format!("  ({})\n", name));
        }
        for (r, row) in desc.iter().enumerate() {
            for (c, cell) in row.chars().enumerate() {
                if r * ncol + c == self.state {
                    out.push_str(&format!("\x1b[41m{}\x1b[0m", cell));
                } else {
                    out.push(cell);
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Env for DiscreteEnv {
    fn action_space(&self) -> &Space {
        &self.act_space
    }

    fn observation_space(&self) -> &Space {
        &self.obs_space
    }

    fn seed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    fn reset(&mut self) -> Result<ArrayD<f32>> {
        self.state = self
            .sample(self.isd.iter().copied())
            .ok_or_else(|| anyhow!("Empty initial state distribution"))?;
        self.last_action = None;
        self.count_steps = 0;
        Ok(state_obs(self.state))
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        self.act_space.check(act)?;
        let a = match act {
            Act::Discrete(a) => *a,
            Act::Continuous(_) => {
                return Err(anyhow!("Tabular environment expects a discrete action"))
            }
        };
        let outcomes = self
            .table
            .get(self.state, a as usize)
            .ok_or_else(|| anyhow!("No transition for state {}", self.state))?;
        let ix = self
            .sample(outcomes.iter().map(|t| t.probability))
            .ok_or_else(|| anyhow!("No outcome for state {} and action {}", self.state, a))?;
        let t = outcomes[ix];

        self.state = t.next_state;
        self.last_action = Some(a);
        self.count_steps += 1;
        let is_truncated = match self.max_steps {
            Some(max_steps) => self.count_steps >= max_steps,
            None => false,
        };

        Ok(Step::new(
            state_obs(t.next_state),
            t.reward as f32,
            t.done,
            is_truncated,
        ))
    }

    fn render(&mut self) -> Result<()> {
        match self.desc.as_ref() {
            Some(desc) => info!("\n{}", self.render_grid(desc)),
            None => info!("state = {}", self.state),
        }
        Ok(())
    }

    fn transitions(&self) -> Option<&TransitionTable> {
        Some(&self.table)
    }
}
