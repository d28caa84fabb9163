//! Action and observation space descriptors.
use crate::{Act, EnvError};

/// Capability tag of a space.
///
/// Batches of actions are handled differently depending on this tag: discrete
/// actions are scalar indices, continuous actions are arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    /// A finite set of integer indices.
    Discrete,

    /// A box in `R^n`.
    Continuous,
}

/// Describes the set of valid actions or observations of an environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Space {
    /// The integers `0..n`.
    Discrete {
        /// Number of elements.
        n: usize,
    },

    /// A box with element-wise bounds. `low` and `high` are flattened in
    /// row-major order and have `shape.iter().product()` elements.
    Box {
        /// Lower bounds.
        low: Vec<f32>,
        /// Upper bounds.
        high: Vec<f32>,
        /// Shape of a single element.
        shape: Vec<usize>,
    },
}

impl Space {
    /// Box with the same bounds on every element.
    pub fn uniform_box(shape: &[usize], low: f32, high: f32) -> Self {
        let len = shape.iter().product();
        Space::Box {
            low: vec![low; len],
            high: vec![high; len],
            shape: shape.to_vec(),
        }
    }

    /// Capability tag of the space.
    pub fn kind(&self) -> SpaceKind {
        match self {
            Space::Discrete { .. } => SpaceKind::Discrete,
            Space::Box { .. } => SpaceKind::Continuous,
        }
    }

    /// Name of the space type reported to clients.
    pub fn type_name(&self) -> &'static str {
        match self {
            Space::Discrete { .. } => "Discrete",
            Space::Box { .. } => "Box",
        }
    }

    /// Native shape of a single element. Discrete elements are scalars.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Space::Discrete { .. } => vec![],
            Space::Box { shape, .. } => shape.clone(),
        }
    }

    /// Number of elements for discrete spaces, number of scalar components for boxes.
    pub fn size(&self) -> usize {
        match self {
            Space::Discrete { n } => *n,
            Space::Box { shape, .. } => shape.iter().product(),
        }
    }

    /// Checks that `act` belongs to this space.
    ///
    /// Continuous actions are only checked for their shape; out-of-bounds values
    /// are left to the environment, which clips them.
    pub fn check(&self, act: &Act) -> Result<(), EnvError> {
        match (self, act) {
            (Space::Discrete { n }, Act::Discrete(a)) => {
                if *a < 0 || *a as usize >= *n {
                    return Err(EnvError::InvalidAction {
                        act: format!("{:?}", act),
                        reason: format!("out of range 0..{}", n),
                    });
                }
                Ok(())
            }
            (Space::Box { shape, .. }, Act::Continuous(a)) => {
                if a.shape() != shape.as_slice() {
                    return Err(EnvError::InvalidAction {
                        act: format!("{:?}", act),
                        reason: format!("shape {:?} differs from {:?}", a.shape(), shape),
                    });
                }
                Ok(())
            }
            _ => Err(EnvError::InvalidAction {
                act: format!("{:?}", act),
                reason: format!("not a member of a {} space", self.type_name()),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn test_discrete_descriptor() {
        let space = Space::Discrete { n: 4 };
        assert_eq!(space.kind(), SpaceKind::Discrete);
        assert_eq!(space.type_name(), "Discrete");
        assert!(space.shape().is_empty());
        assert_eq!(space.size(), 4);
    }

    #[test]
    fn test_box_descriptor() {
        let space = Space::uniform_box(&[2, 3], -1.0, 1.0);
        assert_eq!(space.kind(), SpaceKind::Continuous);
        assert_eq!(space.type_name(), "Box");
        assert_eq!(space.shape(), vec![2, 3]);
        assert_eq!(space.size(), 6);
    }

    #[test]
    fn test_check() {
        let space = Space::Discrete { n: 2 };
        assert!(space.check(&Act::Discrete(1)).is_ok());
        assert!(space.check(&Act::Discrete(2)).is_err());
        assert!(space.check(&Act::Discrete(-1)).is_err());

        let space = Space::uniform_box(&[1], -2.0, 2.0);
        let a = ArrayD::<f32>::zeros(IxDyn(&[1]));
        assert!(space.check(&Act::Continuous(a)).is_ok());
        let a = ArrayD::<f32>::zeros(IxDyn(&[2]));
        assert!(space.check(&Act::Continuous(a)).is_err());
        assert!(space.check(&Act::Discrete(0)).is_err());
    }
}
