//! Wire messages.
//!
//! Requests are MessagePack maps `{method: string, param: map}`. Responses are
//! flat MessagePack maps with string keys, one layout per method:
//!
//! | method     | keys                                                                |
//! |------------|---------------------------------------------------------------------|
//! | `info`     | `action_space_type`, `action_space_shape`, `observation_space_type`, `observation_space_shape`, `observation_space_size` |
//! | `make`     | `result`                                                            |
//! | `reset`    | `observation`                                                       |
//! | `step`     | `observation`, `reward`, `done`, `real_reward`                      |
//! | `dynamics` | `probability`, `next_state`, `reward`, `done`                       |
//!
//! Failed requests are answered with `{error: string}`.
use crate::{nested, Nested, ServerError};
use ndarray::{Array2, ArrayD};
use serde::{de::DeserializeOwned, Deserialize, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Methods of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Describe the spaces of the active environment.
    Info,
    /// Create the active environment.
    Make,
    /// Reset all instances.
    Reset,
    /// Step all instances.
    Step,
    /// Query the transition table.
    Dynamics,
}

impl Method {
    /// Name of the method on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Info => "info",
            Method::Make => "make",
            Method::Reset => "reset",
            Method::Step => "step",
            Method::Dynamics => "dynamics",
        }
    }
}

impl FromStr for Method {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Method::Info),
            "make" => Ok(Method::Make),
            "reset" => Ok(Method::Reset),
            "step" => Ok(Method::Step),
            "dynamics" => Ok(Method::Dynamics),
            _ => Err(ServerError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of `make`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeParam {
    /// Name of the environment.
    pub env_name: String,

    /// Number of parallel instances.
    pub num_envs: usize,
}

/// Parameters of `step`.
///
/// Single-environment discrete clients send a scalar `action` instead of
/// `actions`; it stands for `actions = [[action]]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepParam {
    /// One action per instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Nested<f64>>,

    /// Scalar action of a single discrete instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<i64>,

    /// Render after stepping.
    #[serde(default)]
    pub render: bool,
}

impl StepParam {
    /// Parameters with one action per instance.
    pub fn new(actions: Nested<f64>) -> Self {
        Self {
            actions: Some(actions),
            ..Self::default()
        }
    }

    /// Sets the render flag.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }

    /// The action batch as an array.
    pub fn actions(self) -> Result<ArrayD<f64>, ServerError> {
        match (self.actions, self.action) {
            (Some(actions), _) => actions.into_array(),
            (None, Some(a)) => Ok(ArrayD::from_elem(ndarray::IxDyn(&[1, 1]), a as f64)),
            (None, None) => Err(ServerError::InvalidParam(
                "missing field `actions`".to_string(),
            )),
        }
    }
}

/// Parameters of `dynamics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsParam {
    /// State of the query.
    pub state: usize,

    /// Action of the query.
    pub action: usize,
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `info`.
    Info,
    /// `make`.
    Make(MakeParam),
    /// `reset`.
    Reset,
    /// `step`.
    Step(StepParam),
    /// `dynamics`.
    Dynamics(DynamicsParam),
}

#[derive(Deserialize)]
struct Header {
    method: String,
}

#[derive(Deserialize)]
struct Envelope<P> {
    param: P,
}

#[derive(Serialize)]
struct OutEnvelope<'a, P> {
    method: &'static str,
    param: &'a P,
}

/// Empty parameter map.
#[derive(Serialize)]
struct NoParam {}

fn decode_param<P: DeserializeOwned>(bytes: &[u8]) -> Result<P, ServerError> {
    let envelope: Envelope<P> = rmp_serde::from_slice(bytes)?;
    Ok(envelope.param)
}

impl Request {
    /// Method of the request.
    pub fn method(&self) -> Method {
        match self {
            Request::Info => Method::Info,
            Request::Make(_) => Method::Make,
            Request::Reset => Method::Reset,
            Request::Step(_) => Method::Step,
            Request::Dynamics(_) => Method::Dynamics,
        }
    }

    /// Decodes a request. Unknown fields in `param` are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, ServerError> {
        let header: Header = rmp_serde::from_slice(bytes)?;
        Ok(match header.method.parse()? {
            Method::Info => Request::Info,
            Method::Make => Request::Make(decode_param(bytes)?),
            Method::Reset => Request::Reset,
            Method::Step => Request::Step(decode_param(bytes)?),
            Method::Dynamics => Request::Dynamics(decode_param(bytes)?),
        })
    }

    /// Encodes the request, as a client would.
    pub fn encode(&self) -> Result<Vec<u8>, ServerError> {
        let method = self.method().as_str();
        let bytes = match self {
            Request::Info | Request::Reset => {
                rmp_serde::to_vec_named(&OutEnvelope { method, param: &NoParam {} })?
            }
            Request::Make(p) => rmp_serde::to_vec_named(&OutEnvelope { method, param: p })?,
            Request::Step(p) => rmp_serde::to_vec_named(&OutEnvelope { method, param: p })?,
            Request::Dynamics(p) => rmp_serde::to_vec_named(&OutEnvelope { method, param: p })?,
        };
        Ok(bytes)
    }
}

/// Response to `info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoMessage {
    /// `"Discrete"` or `"Box"`.
    pub action_space_type: String,

    /// `[n]` for discrete action spaces, the native shape otherwise.
    pub action_space_shape: Vec<usize>,

    /// `"Discrete"` or `"Box"`.
    pub observation_space_type: String,

    /// Native shape of an observation.
    pub observation_space_shape: Vec<usize>,

    /// Number of states for discrete observation spaces, number of components otherwise.
    pub observation_space_size: usize,
}

/// Response to `dynamics`, one element per outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicsMessage {
    /// Probabilities of the outcomes.
    pub probability: Vec<f64>,

    /// Next states.
    pub next_state: Vec<usize>,

    /// Rewards.
    pub reward: Vec<f64>,

    /// Episode ends.
    pub done: Vec<bool>,
}

/// Response to `make`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MakeMessage {
    result: String,
}

impl Default for MakeMessage {
    fn default() -> Self {
        Self {
            result: "OK".to_string(),
        }
    }
}

/// One component of a multi-part observation.
#[derive(Debug, Clone, PartialEq)]
pub enum ObsPart {
    /// An array, encoded as nested lists.
    Array(ArrayD<f32>),
    /// Passed through as is.
    Int(i64),
    /// Passed through as is.
    Float(f64),
    /// Passed through as is.
    Bool(bool),
    /// Passed through as is.
    Text(String),
}

impl Serialize for ObsPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ObsPart::Array(a) => nested::serialize(a, serializer),
            ObsPart::Int(v) => serializer.serialize_i64(*v),
            ObsPart::Float(v) => serializer.serialize_f64(*v),
            ObsPart::Bool(v) => serializer.serialize_bool(*v),
            ObsPart::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// Observation carried by a [`ResetMessage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Stacked observations of all instances.
    Array(ArrayD<f32>),

    /// Observation made of several heterogeneous components.
    Parts(Vec<ObsPart>),
}

impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Observation::Array(a) => nested::serialize(a, serializer),
            Observation::Parts(parts) => parts.serialize(serializer),
        }
    }
}

impl From<ArrayD<f32>> for Observation {
    fn from(a: ArrayD<f32>) -> Self {
        Observation::Array(a)
    }
}

impl From<Vec<ObsPart>> for Observation {
    fn from(parts: Vec<ObsPart>) -> Self {
        Observation::Parts(parts)
    }
}

/// Response to `reset`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetMessage {
    /// Initial observations.
    pub observation: Observation,
}

impl ResetMessage {
    /// Constructs a [`ResetMessage`].
    pub fn new(observation: impl Into<Observation>) -> Self {
        Self {
            observation: observation.into(),
        }
    }
}

/// Response to `step`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepMessage {
    /// Stacked observations, leading axis `count`.
    #[serde(serialize_with = "nested::serialize")]
    pub observation: ArrayD<f32>,

    /// Rewards, `[count, 1]`.
    #[serde(serialize_with = "nested::serialize")]
    pub reward: Array2<f32>,

    /// Episode ends, `[count, 1]`.
    #[serde(serialize_with = "nested::serialize")]
    pub done: Array2<bool>,

    /// Rewards before normalization, `[count, 1]`.
    #[serde(serialize_with = "nested::serialize")]
    pub real_reward: Array2<f32>,
}

/// Response to a failed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    /// What went wrong.
    pub error: String,
}

/// A response of the server, one variant per method.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Result of `info`.
    Info(InfoMessage),
    /// Result of `dynamics`.
    Dynamics(DynamicsMessage),
    /// Result of `make`.
    Make(MakeMessage),
    /// Result of `reset`.
    Reset(ResetMessage),
    /// Result of `step`.
    Step(StepMessage),
    /// A request failed.
    Error(ErrorMessage),
}

impl Response {
    /// Error response.
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(ErrorMessage {
            error: message.into(),
        })
    }

    /// Encodes the response as a MessagePack map.
    pub fn encode(&self) -> Result<Vec<u8>, ServerError> {
        let bytes = match self {
            Response::Info(m) => rmp_serde::to_vec_named(m)?,
            Response::Dynamics(m) => rmp_serde::to_vec_named(m)?,
            Response::Make(m) => rmp_serde::to_vec_named(m)?,
            Response::Reset(m) => rmp_serde::to_vec_named(m)?,
            Response::Step(m) => rmp_serde::to_vec_named(m)?,
            Response::Error(m) => rmp_serde::to_vec_named(m)?,
        };
        Ok(bytes)
    }
}
