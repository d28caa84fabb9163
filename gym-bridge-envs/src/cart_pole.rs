//! Cart-pole balancing.
use anyhow::Result;
use gym_bridge_core::{Act, Env, Space, Step};
use log::info;
use ndarray::{Array1, ArrayD};
use std::f32::consts::PI;

const GRAVITY: f32 = 9.8;
const MASS_CART: f32 = 1.0;
const MASS_POLE: f32 = 0.1;
const TOTAL_MASS: f32 = MASS_CART + MASS_POLE;
const HALF_LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = MASS_POLE * HALF_LENGTH;
const FORCE_MAG: f32 = 10.0;
const TAU: f32 = 0.02;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * PI / 360.0;
const X_THRESHOLD: f32 = 2.4;
const MAX_STEPS: usize = 500;

/// `CartPole-v1`: keep a pole upright by pushing a cart left (`0`) or right (`1`).
///
/// The observation is `(x, x_dot, theta, theta_dot)`. Every step gives a reward
/// of `1`; the episode terminates when the pole falls past 12 degrees or the cart
/// leaves `[-2.4, 2.4]`, and is truncated after 500 steps.
pub struct CartPole {
    act_space: Space,
    obs_space: Space,
    state: [f32; 4],
    count_steps: usize,
    rng: fastrand::Rng,
}

impl CartPole {
    /// Constructs the environment.
    pub fn new(seed: u64) -> Self {
        let high = vec![X_THRESHOLD * 2.0, f32::MAX, THETA_THRESHOLD * 2.0, f32::MAX];
        Self {
            act_space: Space::Discrete { n: 2 },
            obs_space: Space::Box {
                low: high.iter().map(|h| -h).collect(),
                high,
                shape: vec![4],
            },
            state: [0.0; 4],
            count_steps: 0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn obs(&self) -> ArrayD<f32> {
        Array1::from(self.state.to_vec()).into_dyn()
    }
}

impl Env for CartPole {
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
        for x in self.state.iter_mut() {
            *x = self.rng.f32() * 0.1 - 0.05;
        }
        self.count_steps = 0;
        Ok(self.obs())
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        self.act_space.check(act)?;
        let force = match act {
            Act::Discrete(1) => FORCE_MAG,
            _ => -FORCE_MAG,
        };

        let [x, x_dot, theta, theta_dot] = self.state;
        let (sin, cos) = theta.sin_cos();
        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin - cos * temp)
            / (HALF_LENGTH * (4.0 / 3.0 - MASS_POLE * cos * cos / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos / TOTAL_MASS;

        self.state = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        self.count_steps += 1;

        let [x, _, theta, _] = self.state;
        let is_terminated = x.abs() > X_THRESHOLD || theta.abs() > THETA_THRESHOLD;
        let is_truncated = !is_terminated && self.count_steps >= MAX_STEPS;
        Ok(Step::new(self.obs(), 1.0, is_terminated, is_truncated))
    }

    fn render(&mut self) -> Result<()> {
        let [x, _, theta, _] = self.state;
        let width = 41usize;
        let pos = ((x + X_THRESHOLD) / (2.0 * X_THRESHOLD) * (width - 1) as f32)
            .round()
            .max(0.0)
            .min((width - 1) as f32) as usize;
        let mut track = vec!['-'; width];
        track[pos] = '#';
        info!(
            "{} theta = {:+.3}",
            track.into_iter().collect::<String>(),
            theta
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_reset_is_near_upright() -> Result<()> {
        let mut env = CartPole::new(42);
        let obs = env.reset()?;
        assert_eq!(obs.shape(), &[4]);
        assert!(obs.iter().all(|x| x.abs() <= 0.05));
        Ok(())
    }

    #[test]
    fn test_pushing_one_way_terminates() -> Result<()> {
        let mut env = CartPole::new(0);
        env.reset()?;
        let mut steps = 0;
        loop {
            let step = env.step(&Act::Discrete(1))?;
            steps += 1;
            assert_eq!(step.reward, 1.0);
            if step.is_done() {
                assert!(step.is_terminated);
                break;
            }
        }
        assert!(steps < 100);
        Ok(())
    }

    #[test]
    fn test_seed_reproducible() -> Result<()> {
        let (mut a, mut b) = (CartPole::new(7), CartPole::new(7));
        assert_eq!(a.reset()?, b.reset()?);
        Ok(())
    }

    #[test]
    fn test_rejects_continuous_action() {
        let mut env = CartPole::new(0);
        let act = Act::Continuous(ArrayD::zeros(IxDyn(&[1])));
        assert!(env.step(&act).is_err());
    }
}
