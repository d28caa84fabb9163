//! Deterministic grid world.
use crate::DiscreteEnv;
use anyhow::Result;
use gym_bridge_core::{Transition, TransitionTable};

const NROW: usize = 4;
const NCOL: usize = 4;
const GOAL: usize = NROW * NCOL - 1;

/// Moves one cell in direction `a` (left, down, right, up), staying put at walls.
pub(crate) fn inc(row: usize, col: usize, a: usize, nrow: usize, ncol: usize) -> (usize, usize) {
    match a {
        0 => (row, col.saturating_sub(1)),
        1 => ((row + 1).min(nrow - 1), col),
        2 => (row, (col + 1).min(ncol - 1)),
        _ => (row.saturating_sub(1), col),
    }
}

/// `GridWorld-v0`: a deterministic 4x4 grid.
///
/// Episodes start in the top-left corner and end in the bottom-right one.
/// Every move costs `-1` except the one reaching the goal, which gives `0`.
/// Actions are `0: left, 1: down, 2: right, 3: up`.
pub fn grid_world(seed: u64) -> Result<DiscreteEnv> {
    let mut table = TransitionTable::new(NROW * NCOL, 4);
    for s in 0..NROW * NCOL {
        for a in 0..4 {
            let t = if s == GOAL {
                Transition::new(1.0, s, 0.0, true)
            } else {
                let (row, col) = inc(s / NCOL, s % NCOL, a, NROW, NCOL);
                let next = row * NCOL + col;
                let reward = if next == GOAL { 0.0 } else { -1.0 };
                Transition::new(1.0, next, reward, next == GOAL)
            };
            table.push(s, a, t);
        }
    }

    let mut isd = vec![0.0; NROW * NCOL];
    isd[0] = 1.0;

    let desc = vec!["SFFF", "FFFF", "FFFF", "FFFG"];
    Ok(DiscreteEnv::new(table, isd, seed)?
        .max_steps(Some(100))
        .desc(desc.into_iter().map(String::from).collect()))
}

#[cfg(test)]
mod test {
    use super::*;
    use gym_bridge_core::{Act, Env};

    #[test]
    fn test_shortest_path() -> Result<()> {
        let mut env = grid_world(0)?;
        env.reset()?;
        let mut total = 0.0;
        for a in [2, 2, 2, 1, 1] {
            let step = env.step(&Act::Discrete(a))?;
            assert!(!step.is_done());
            total += step.reward;
        }
        let step = env.step(&Act::Discrete(1))?;
        assert!(step.is_terminated);
        assert_eq!(step.reward, 0.0);
        assert_eq!(total, -5.0);
        Ok(())
    }

    #[test]
    fn test_walls() {
        assert_eq!(inc(0, 0, 0, 4, 4), (0, 0));
        assert_eq!(inc(0, 0, 3, 4, 4), (0, 0));
        assert_eq!(inc(3, 3, 1, 4, 4), (3, 3));
        assert_eq!(inc(3, 3, 2, 4, 4), (3, 3));
    }

    #[test]
    fn test_table() -> Result<()> {
        let env = grid_world(0)?;
        let table = env.transitions().unwrap();
        assert_eq!(table.n_states(), 16);
        assert_eq!(table.n_actions(), 4);
        assert_eq!(table.get(14, 2).unwrap(), &[Transition::new(1.0, 15, 0.0, true)]);
        assert_eq!(table.get(0, 1).unwrap(), &[Transition::new(1.0, 4, -1.0, false)]);
        Ok(())
    }
}
