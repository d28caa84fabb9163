use anyhow::Result;
use gym_bridge_core::{
    Act, Env, EnvError, EnvRegistry, RewardNormalizer, Space, Step, VecAct, VecEnv,
};
use ndarray::{arr1, ArrayD, IxDyn};
use test_log::test;

/// Counts its steps; the episode ends after `horizon` steps.
struct Counter {
    act_space: Space,
    obs_space: Space,
    horizon: usize,
    t: usize,
    offset: f32,
}

impl Counter {
    fn new(seed: u64) -> Self {
        Self {
            act_space: Space::Discrete { n: 3 },
            obs_space: Space::uniform_box(&[2], 0.0, 100.0),
            horizon: 2,
            t: 0,
            offset: seed as f32,
        }
    }

    fn obs(&self) -> ArrayD<f32> {
        ArrayD::from_shape_vec(IxDyn(&[2]), vec![self.t as f32, self.offset]).unwrap()
    }
}

impl Env for Counter {
    fn action_space(&self) -> &Space {
        &self.act_space
    }

    fn observation_space(&self) -> &Space {
        &self.obs_space
    }

    fn seed(&mut self, seed: u64) {
        self.offset = seed as f32;
    }

    fn reset(&mut self) -> Result<ArrayD<f32>> {
        self.t = 0;
        Ok(self.obs())
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        let a = match act {
            Act::Discrete(a) => *a as f32,
            Act::Continuous(_) => unreachable!(),
        };
        self.t += 1;
        Ok(Step::new(self.obs(), a, self.t >= self.horizon, false))
    }
}

fn registry() -> EnvRegistry {
    EnvRegistry::new().register("Counter-v0", |seed| {
        Ok(Box::new(Counter::new(seed)) as Box<dyn Env>)
    })
}

#[test]
fn test_build_seeds_instances() -> Result<()> {
    let mut env = VecEnv::build(&registry(), "Counter-v0", 10, 3)?;
    assert_eq!(env.count(), 3);
    let obs = env.reset()?;
    assert_eq!(obs.shape(), &[3, 2]);
    assert_eq!(obs[[0, 1]], 10.0);
    assert_eq!(obs[[2, 1]], 12.0);
    Ok(())
}

#[test]
fn test_unknown_env() {
    let err = VecEnv::build(&registry(), "Nope-v0", 0, 1).unwrap_err();
    assert_eq!(
        err.downcast_ref::<EnvError>(),
        Some(&EnvError::UnknownEnv("Nope-v0".to_string()))
    );
}

#[test]
fn test_empty_vec_env() {
    assert_eq!(VecEnv::new(vec![]).unwrap_err(), EnvError::EmptyVecEnv);
}

#[test]
fn test_step_and_auto_reset() -> Result<()> {
    let mut env = VecEnv::build(&registry(), "Counter-v0", 0, 2)?;
    env.reset()?;

    let step = env.step(&VecAct::Discrete(arr1(&[1, 2])))?;
    assert_eq!(step.obs.shape(), &[2, 2]);
    assert_eq!(step.obs[[0, 0]], 1.0);
    assert_eq!(step.reward, arr1(&[1.0f32, 2.0]));
    assert_eq!(step.is_done, arr1(&[false, false]));
    assert_eq!(step.info.reward, step.reward);

    // Second step ends the episodes; observations come from the new episodes.
    let step = env.step(&VecAct::Discrete(arr1(&[0, 0])))?;
    assert_eq!(step.is_done, arr1(&[true, true]));
    assert_eq!(step.obs[[0, 0]], 0.0);
    assert_eq!(step.obs[[1, 0]], 0.0);
    Ok(())
}

#[test]
fn test_step_rejects_bad_batches() -> Result<()> {
    let mut env = VecEnv::build(&registry(), "Counter-v0", 0, 2)?;
    env.reset()?;

    let err = env.step(&VecAct::Discrete(arr1(&[1]))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EnvError>(),
        Some(EnvError::ActionShape { .. })
    ));

    let err = env.step(&VecAct::Discrete(arr1(&[1, 3]))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EnvError>(),
        Some(EnvError::InvalidAction { .. })
    ));

    let act = VecAct::Continuous(ArrayD::zeros(IxDyn(&[2, 1])));
    assert!(env.step(&act).is_err());
    Ok(())
}

#[test]
fn test_normalized_reward_keeps_raw_reward() -> Result<()> {
    let mut env = VecEnv::build(&registry(), "Counter-v0", 0, 2)?
        .with_reward_normalizer(RewardNormalizer::new(0.99));
    env.reset()?;
    let step = env.step(&VecAct::Discrete(arr1(&[2, 2])))?;
    assert_eq!(step.info.reward, arr1(&[2.0f32, 2.0]));
    assert_ne!(step.reward, step.info.reward);
    assert_eq!(step.reward.len(), 2);
    Ok(())
}

#[test]
fn test_no_transition_table_by_default() -> Result<()> {
    let env = VecEnv::build(&registry(), "Counter-v0", 0, 1)?;
    assert!(env.transitions().is_none());
    assert_eq!(env.action_space(), &Space::Discrete { n: 3 });
    Ok(())
}
