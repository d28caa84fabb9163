//! Frozen lake.
use crate::{grid_world::inc, DiscreteEnv};
use anyhow::{anyhow, Result};
use gym_bridge_core::{Transition, TransitionTable};

/// The standard 4x4 map: `S` start, `F` frozen, `H` hole, `G` goal.
pub const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

/// `FrozenLake-v1` on the given map.
///
/// Reaching `G` gives a reward of `1`; holes and the goal end the episode.
/// On a slippery lake the agent moves in the intended direction or in one of
/// the two perpendicular ones, each with probability `1/3`. Actions are
/// `0: left, 1: down, 2: right, 3: up`. Episodes are truncated after 100 steps.
pub fn frozen_lake(map: &[&str], is_slippery: bool, seed: u64) -> Result<DiscreteEnv> {
    let desc: Vec<Vec<u8>> = map.iter().map(|row| row.as_bytes().to_vec()).collect();
    let nrow = desc.len();
    let ncol = desc.first().map(|row| row.len()).unwrap_or(0);
    if nrow == 0 || ncol == 0 || desc.iter().any(|row| row.len() != ncol) {
        return Err(anyhow!("Frozen lake map must be a non-empty rectangle"));
    }
    let n_states = nrow * ncol;
    let letter = |s: usize| desc[s / ncol][s % ncol];

    let mut table = TransitionTable::new(n_states, 4);
    for s in 0..n_states {
        for a in 0..4 {
            if matches!(letter(s), b'G' | b'H') {
                table.push(s, a, Transition::new(1.0, s, 0.0, true));
                continue;
            }
            let moves = if is_slippery {
                vec![(a + 3) % 4, a, (a + 1) % 4]
            } else {
                vec![a]
            };
            let p = 1.0 / moves.len() as f64;
            for b in moves {
                let (row, col) = inc(s / ncol, s % ncol, b, nrow, ncol);
                let next = row * ncol + col;
                let reward = if letter(next) == b'G' { 1.0 } else { 0.0 };
                let done = matches!(letter(next), b'G' | b'H');
                table.push(s, a, Transition::new(p, next, reward, done));
            }
        }
    }

    let n_start = (0..n_states).filter(|s| letter(*s) == b'S').count();
    if n_start == 0 {
        return Err(anyhow!("Frozen lake map has no start cell"));
    }
    let isd = (0..n_states)
        .map(|s| if letter(s) == b'S' { 1.0 / n_start as f64 } else { 0.0 })
        .collect();

    Ok(DiscreteEnv::new(table, isd, seed)?
        .max_steps(Some(100))
        .desc(map.iter().map(|row| row.to_string()).collect()))
}

#[cfg(test)]
mod test {
    use super::*;
    use gym_bridge_core::{Act, Env, Space};

    #[test]
    fn test_spaces() -> Result<()> {
        let env = frozen_lake(&MAP_4X4, true, 0)?;
        assert_eq!(env.action_space(), &Space::Discrete { n: 4 });
        assert_eq!(env.observation_space(), &Space::Discrete { n: 16 });
        Ok(())
    }

    #[test]
    fn test_slippery_table() -> Result<()> {
        let env = frozen_lake(&MAP_4X4, true, 0)?;
        let table = env.transitions().unwrap();

        // Moving down from the start: slips left (stays), goes down, or slips right.
        let outcomes = table.get(0, 1).unwrap();
        assert_eq!(outcomes.len(), 3);
        let next: Vec<usize> = outcomes.iter().map(|t| t.next_state).collect();
        assert_eq!(next, vec![0, 4, 1]);
        assert!(outcomes.iter().all(|t| (t.probability - 1.0 / 3.0).abs() < 1e-12));

        // Right from state 14 may reach the goal.
        let outcomes = table.get(14, 2).unwrap();
        assert!(outcomes.iter().any(|t| t.next_state == 15 && t.reward == 1.0 && t.done));

        // Holes are absorbing.
        assert_eq!(table.get(5, 0).unwrap(), &[Transition::new(1.0, 5, 0.0, true)]);
        Ok(())
    }

    #[test]
    fn test_deterministic_lake() -> Result<()> {
        let mut env = frozen_lake(&MAP_4X4, false, 0)?;
        env.reset()?;
        for a in [2, 2, 1, 1, 1] {
            assert!(!env.step(&Act::Discrete(a))?.is_done());
        }
        let step = env.step(&Act::Discrete(2))?;
        assert_eq!(step.reward, 1.0);
        assert!(step.is_terminated);
        Ok(())
    }

    #[test]
    fn test_bad_map() {
        assert!(frozen_lake(&["SF", "F"], true, 0).is_err());
        assert!(frozen_lake(&["FF", "FG"], true, 0).is_err());
    }
}
