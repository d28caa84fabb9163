//! Construction of environments by name.
use super::Env;
use crate::EnvError;
use anyhow::Result;
use std::collections::BTreeMap;

/// Builds an environment instance from a random seed.
pub type EnvBuilder = Box<dyn Fn(u64) -> Result<Box<dyn Env>> + Send + Sync>;

/// Maps environment names (e.g. `"CartPole-v1"`) to their constructors.
#[derive(Default)]
pub struct EnvRegistry {
    builders: BTreeMap<String, EnvBuilder>,
}

impl EnvRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor, replacing the one previously registered under `name`.
    pub fn register<F>(mut self, name: impl Into<String>, builder: F) -> Self
    where
        F: Fn(u64) -> Result<Box<dyn Env>> + Send + Sync + 'static,
    {
        self.builders.insert(name.into(), Box::new(builder));
        self
    }

    /// Returns `true` if a constructor is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(|k| k.as_str())
    }

    /// Builds the environment registered under `name`.
    pub fn build(&self, name: &str, seed: u64) -> Result<Box<dyn Env>> {
        match self.builders.get(name) {
            Some(builder) => builder(seed),
            None => Err(EnvError::UnknownEnv(name.to_string()).into()),
        }
    }
}

impl std::fmt::Debug for EnvRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.builders.keys()).finish()
    }
}
