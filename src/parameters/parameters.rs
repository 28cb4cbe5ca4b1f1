use std::collections::BTreeMap;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Error deserializing parameters")]
    Deserialize(#[from] toml::de::Error),

    #[error("Parameter toml does not have the right structure (error in '{0}')")]
    BadToml(String),

    #[error("Element '{path}' not found")]
    NotFound { path: String },

    #[error("Cannot cast parameter '{path}' to {dtype}")]
    BadCast { path: String, dtype: String },

    #[error("Element '{path}' is not a parameter")]
    NotAParameter { path: String },

    #[error("Element '{path}' is not a map")]
    NotAMap { path: String },
}

/// A typed leaf: `{ val = ..., type = "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ParameterValue {
    #[serde(rename = "int")]
    Int { val: i64 },
    #[serde(rename = "float")]
    Float { val: f64 },
    /// `[x, y]` in the frame of whatever reads it.
    #[serde(rename = "point")]
    Point { val: [f64; 2] },

    #[serde(rename = "int[]")]
    IntArray { val: Vec<i64> },
    #[serde(rename = "float[]")]
    FloatArray { val: Vec<f64> },
    #[serde(rename = "point[]")]
    PointArray { val: Vec<[f64; 2]> },
}

impl ParameterValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Int { .. } => "int",
            Self::Float { .. } => "float",
            Self::Point { .. } => "point",
            Self::IntArray { .. } => "int[]",
            Self::FloatArray { .. } => "float[]",
            Self::PointArray { .. } => "point[]",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    path: String,
    value: ParameterValue,
}

impl Parameter {
    pub fn path(&self) -> &str {
        &self.path
    }

    fn bad_cast(&self, dtype: &str) -> Error {
        Error::BadCast {
            path: self.path.clone(),
            dtype: format!("{dtype} (found {})", self.value.type_name()),
        }
    }

    pub fn value_int(&self) -> Result<i64, Error> {
        match self.value {
            ParameterValue::Int { val } => Ok(val),
            _ => Err(self.bad_cast("int")),
        }
    }

    /// Integer parameters are accepted where a float is expected.
    pub fn value_float(&self) -> Result<f64, Error> {
        match self.value {
            ParameterValue::Float { val } => Ok(val),
            ParameterValue::Int { val } => Ok(val as f64),
            _ => Err(self.bad_cast("float")),
        }
    }

    pub fn value_point(&self) -> Result<Point2<f64>, Error> {
        match self.value {
            ParameterValue::Point { val: [x, y] } => Ok(Point2::new(x, y)),
            _ => Err(self.bad_cast("point")),
        }
    }

    pub fn value_int_arr(&self) -> Result<&[i64], Error> {
        match &self.value {
            ParameterValue::IntArray { val } => Ok(val),
            _ => Err(self.bad_cast("int[]")),
        }
    }

    pub fn value_float_arr(&self) -> Result<&[f64], Error> {
        match &self.value {
            ParameterValue::FloatArray { val } => Ok(val),
            _ => Err(self.bad_cast("float[]")),
        }
    }

    pub fn value_point_arr(&self) -> Result<Vec<Point2<f64>>, Error> {
        match &self.value {
            ParameterValue::PointArray { val } => {
                Ok(val.iter().map(|&[x, y]| Point2::new(x, y)).collect())
            }
            _ => Err(self.bad_cast("point[]")),
        }
    }
}

/// A section of a parameter file. Paths are dotted and relative to the
/// section, e.g. `bodies.tube.radius`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterMap {
    path: String,
    map: BTreeMap<String, ParameterTree>,
}

impl ParameterMap {
    pub fn get(&self, rel_path: &str) -> Result<&ParameterTree, Error> {
        let not_found = || Error::NotFound {
            path: append_path(&self.path, rel_path),
        };

        rel_path
            .split('.')
            .try_fold(None::<&ParameterTree>, |elem, part| {
                let map = match elem {
                    None => self,
                    Some(ParameterTree::Node(m)) => m,
                    Some(ParameterTree::Leaf(_)) => return None,
                };
                map.map.get(part).map(Some)
            })
            .flatten()
            .ok_or_else(not_found)
    }

    /// Whether `rel_path` resolves to anything, leaf or map.
    pub fn has(&self, rel_path: &str) -> bool {
        self.get(rel_path).is_ok()
    }

    pub fn get_param(&self, rel_path: &str) -> Result<&Parameter, Error> {
        match self.get(rel_path)? {
            ParameterTree::Leaf(p) => Ok(p),
            ParameterTree::Node(m) => Err(Error::NotAParameter {
                path: m.path.clone(),
            }),
        }
    }

    pub fn get_map(&self, rel_path: &str) -> Result<&ParameterMap, Error> {
        match self.get(rel_path)? {
            ParameterTree::Node(m) => Ok(m),
            ParameterTree::Leaf(p) => Err(Error::NotAMap {
                path: p.path.clone(),
            }),
        }
    }

    pub fn get_f64(&self, rel_path: &str) -> Result<f64, Error> {
        self.get_param(rel_path)?.value_float()
    }

    /// Child maps in key order, skipping leaves.
    pub fn maps(&self) -> impl Iterator<Item = (&String, &ParameterMap)> {
        self.map.iter().filter_map(|(k, v)| match v {
            ParameterTree::Node(m) => Some((k, m)),
            ParameterTree::Leaf(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterTree {
    Node(ParameterMap),
    Leaf(Parameter),
}

pub fn parse_string(toml_str: &str) -> Result<ParameterMap, Error> {
    let table = toml::from_str::<Table>(toml_str)?;

    parse_section(table, String::new())
}

/// Every table is either a typed leaf or a section of further tables. Bare
/// values are rejected.
fn parse_section(table: Table, root: String) -> Result<ParameterMap, Error> {
    let map = table
        .into_iter()
        .map(|(key, val)| {
            let path = append_path(&root, &key);
            let Value::Table(val) = val else {
                return Err(Error::BadToml(root.clone()));
            };

            let tree = match val.clone().try_into::<ParameterValue>() {
                Ok(value) => ParameterTree::Leaf(Parameter { path, value }),
                Err(_) => ParameterTree::Node(parse_section(val, path)?),
            };
            Ok((key, tree))
        })
        .collect::<Result<BTreeMap<_, _>, Error>>()?;

    Ok(ParameterMap { path: root, map })
}

fn append_path(root: &str, key: &str) -> String {
    format!("{root}.{key}")
}
