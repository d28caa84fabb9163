//! Inverted pendulum swing-up.
use anyhow::{anyhow, Result};
use gym_bridge_core::{Act, Env, Space, Step};
use log::info;
use ndarray::{Array1, ArrayD};
use std::f32::consts::PI;

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;
const MAX_STEPS: usize = 200;

/// `Pendulum-v1`: swing a pendulum up and keep it upright.
///
/// The observation is `(cos theta, sin theta, theta_dot)` and the action a torque
/// in `[-2, 2]`. The reward is
/// `-(theta^2 + 0.1 * theta_dot^2 + 0.001 * torque^2)` with `theta` normalized
/// to `[-pi, pi)`. Episodes never terminate and are truncated after 200 steps.
pub struct Pendulum {
    act_space: Space,
    obs_space: Space,
    theta: f32,
    theta_dot: f32,
    count_steps: usize,
    rng: fastrand::Rng,
}

fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

impl Pendulum {
    /// Constructs the environment.
    pub fn new(seed: u64) -> Self {
        Self {
            act_space: Space::uniform_box(&[1], -MAX_TORQUE, MAX_TORQUE),
            obs_space: Space::Box {
                low: vec![-1.0, -1.0, -MAX_SPEED],
                high: vec![1.0, 1.0, MAX_SPEED],
                shape: vec![3],
            },
            theta: 0.0,
            theta_dot: 0.0,
            count_steps: 0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn obs(&self) -> ArrayD<f32> {
        Array1::from(vec![self.theta.cos(), self.theta.sin(), self.theta_dot]).into_dyn()
    }
}

impl Env for Pendulum {
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
        self.theta = (self.rng.f32() * 2.0 - 1.0) * PI;
        self.theta_dot = self.rng.f32() * 2.0 - 1.0;
        self.count_steps = 0;
        Ok(self.obs())
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        self.act_space.check(act)?;
        let u = match act {
            Act::Continuous(a) => a.iter().next().copied().unwrap_or(0.0),
            Act::Discrete(a) => return Err(anyhow!("Pendulum expects a torque, got {}", a)),
        };
        let u = u.max(-MAX_TORQUE).min(MAX_TORQUE);

        let (th, thdot) = (self.theta, self.theta_dot);
        let cost = angle_normalize(th).powi(2) + 0.1 * thdot.powi(2) + 0.001 * u.powi(2);

        let thdot = thdot + (3.0 * G / (2.0 * L) * th.sin() + 3.0 / (M * L * L) * u) * DT;
        let thdot = thdot.max(-MAX_SPEED).min(MAX_SPEED);
        self.theta = th + thdot * DT;
        self.theta_dot = thdot;
        self.count_steps += 1;

        Ok(Step::new(
            self.obs(),
            -cost,
            false,
            self.count_steps >= MAX_STEPS,
        ))
    }

    fn render(&mut self) -> Result<()> {
        info!(
            "theta = {:+.3}, theta_dot = {:+.3}",
            angle_normalize(self.theta),
            self.theta_dot
        );
        Ok(())
    }
}
