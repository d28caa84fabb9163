//! Reward normalization.
use ndarray::Array1;

/// Scales rewards by the running standard deviation of the discounted return.
///
/// Each instance accumulates `ret = gamma * ret + reward`; the statistics of all
/// returns seen so far give `std`, and the emitted reward is
/// `clamp(reward / sqrt(var + epsilon), -clip, clip)`. The return of an instance
/// is zeroed when its episode ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardNormalizer {
    gamma: f32,
    epsilon: f32,
    clip: f32,
    returns: Vec<f32>,
    stats: RunningMeanStd,
}

impl Default for RewardNormalizer {
    fn default() -> Self {
        Self::new(0.99)
    }
}

impl RewardNormalizer {
    /// Normalizer with discount factor `gamma`, `epsilon = 1e-8` and `clip = 10`.
    pub fn new(gamma: f32) -> Self {
        Self {
            gamma,
            epsilon: 1e-8,
            clip: 10.0,
            returns: vec![],
            stats: RunningMeanStd::default(),
        }
    }

    /// Sets the bound of the normalized rewards.
    pub fn clip(mut self, v: f32) -> Self {
        self.clip = v;
        self
    }

    /// Sets the constant added to the variance.
    pub fn epsilon(mut self, v: f32) -> Self {
        self.epsilon = v;
        self
    }

    /// Clears the accumulated returns. The running statistics are kept.
    pub fn reset(&mut self) {
        self.returns.iter_mut().for_each(|r| *r = 0.0);
    }

    /// Normalizes a batch of rewards.
    pub fn normalize(&mut self, reward: &Array1<f32>, is_done: &Array1<bool>) -> Array1<f32> {
        if self.returns.len() != reward.len() {
            self.returns = vec![0.0; reward.len()];
        }
        for (ret, r) in self.returns.iter_mut().zip(reward.iter()) {
            *ret = *ret * self.gamma + *r;
        }
        self.stats.update(&self.returns);

        let std = (self.stats.var as f32 + self.epsilon).sqrt();
        let clip = self.clip;
        let out = reward.mapv(|r| (r / std).max(-clip).min(clip));

        for (ret, done) in self.returns.iter_mut().zip(is_done.iter()) {
            if *done {
                *ret = 0.0;
            }
        }
        out
    }
}

/// Running mean and variance, merged batch by batch.
#[derive(Debug, Clone, PartialEq)]
struct RunningMeanStd {
    mean: f64,
    var: f64,
    count: f64,
}

impl Default for RunningMeanStd {
    fn default() -> Self {
        Self {
            mean: 0.0,
            var: 1.0,
            count: 1e-4,
        }
    }
}

impl RunningMeanStd {
    fn update(&mut self, xs: &[f32]) {
        if xs.is_empty() {
            return;
        }
        let n = xs.len() as f64;
        let batch_mean = xs.iter().map(|x| *x as f64).sum::<f64>() / n;
        let batch_var = xs
            .iter()
            .map(|x| (*x as f64 - batch_mean).powi(2))
            .sum::<f64>()
            / n;

        let delta = batch_mean - self.mean;
        let total = self.count + n;
        let m2 = self.var * self.count + batch_var * n + delta * delta * self.count * n / total;
        self.mean += delta * n / total;
        self.var = m2 / total;
        self.count = total;
    }
}
