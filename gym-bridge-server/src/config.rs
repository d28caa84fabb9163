//! Configuration of [`Server`](crate::Server) and [`Session`](crate::Session).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Duration,
};

/// Configuration of [`Session`](crate::Session).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed of the first instance. Instance `i` is seeded with `seed + i`.
    pub seed: u64,

    /// Normalizes rewards by the running standard deviation of the discounted return.
    pub normalize_reward: bool,

    /// Discount factor used by reward normalization.
    pub gamma: f32,

    /// Largest `num_envs` accepted by `make`.
    pub max_num_envs: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            normalize_reward: false,
            gamma: 0.99,
            max_num_envs: 1024,
        }
    }
}

impl SessionConfig {
    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Enables or disables reward normalization.
    pub fn normalize_reward(mut self, v: bool) -> Self {
        self.normalize_reward = v;
        self
    }

    /// Sets the discount factor of reward normalization.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the largest number of instances a `make` may request.
    pub fn max_num_envs(mut self, v: usize) -> Self {
        self.max_num_envs = v;
        self
    }
}

/// Configuration of [`Server`](crate::Server).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// ZeroMQ endpoint the server binds to.
    pub address: String,

    /// Receive timeout in milliseconds, the interval between interruption checks.
    pub poll_interval_ms: u64,

    /// Configuration of the environment session.
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "tcp://*:10201".to_string(),
            poll_interval_ms: 100,
            session: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Sets the endpoint.
    pub fn address(mut self, v: impl Into<String>) -> Self {
        self.address = v.into();
        self
    }

    /// Sets the receive timeout in milliseconds.
    pub fn poll_interval_ms(mut self, v: u64) -> Self {
        self.poll_interval_ms = v;
        self
    }

    /// Sets the session configuration.
    pub fn session(mut self, v: SessionConfig) -> Self {
        self.session = v;
        self
    }

    /// Receive timeout.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Constructs [`ServerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ServerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
