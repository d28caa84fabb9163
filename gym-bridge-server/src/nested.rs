//! Conversion between arrays and nested sequences.
//!
//! Arrays never go to the wire directly. They are materialized as nested
//! sequences first, so that a `[2, 3]` array is encoded as a list of two lists
//! of three numbers, as any MessagePack client expects.
use crate::ServerError;
use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension, IxDyn};
use serde::{Deserialize, Serialize, Serializer};

/// A scalar or an arbitrarily nested list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested<T> {
    /// A leaf value.
    Scalar(T),

    /// A list of nested values.
    List(Vec<Nested<T>>),
}

impl<T: Clone> Nested<T> {
    /// Materializes an array as nested lists, one level per axis.
    pub fn from_array<S, D>(a: &ArrayBase<S, D>) -> Self
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        Self::from_view(a.view().into_dyn())
    }

    fn from_view(a: ArrayViewD<T>) -> Self {
        if a.ndim() == 0 {
            return match a.iter().next() {
                Some(x) => Nested::Scalar(x.clone()),
                None => Nested::List(vec![]),
            };
        }
        Nested::List(a.outer_iter().map(Self::from_view).collect())
    }

    /// Shape implied by the first element at every depth.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = vec![];
        let mut cur = self;
        while let Nested::List(items) = cur {
            shape.push(items.len());
            match items.first() {
                Some(first) => cur = first,
                None => break,
            }
        }
        shape
    }

    /// Converts to an array, failing on ragged lists.
    pub fn into_array(self) -> Result<ArrayD<T>, ServerError> {
        let shape = self.shape();
        let mut data = Vec::with_capacity(shape.iter().product());
        self.flatten(&shape, &mut data)?;
        ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| ServerError::InvalidParam(e.to_string()))
    }

    fn flatten(self, shape: &[usize], out: &mut Vec<T>) -> Result<(), ServerError> {
        match (self, shape.split_first()) {
            (Nested::Scalar(x), None) => {
                out.push(x);
                Ok(())
            }
            (Nested::List(items), Some((n, rest))) if items.len() == *n => {
                for item in items {
                    item.flatten(rest, out)?;
                }
                Ok(())
            }
            _ => Err(ServerError::InvalidParam(
                "nested sequence is not rectangular".to_string(),
            )),
        }
    }
}

/// Serializes an array as nested lists, for use with `#[serde(serialize_with)]`.
pub fn serialize<S, A, D, Ser>(a: &ArrayBase<S, D>, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
where
    S: Data<Elem = A>,
    A: Clone + Serialize,
    D: Dimension,
    Ser: Serializer,
{
    Nested::from_array(a).serialize(serializer)
}
