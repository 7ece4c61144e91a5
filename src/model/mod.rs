//! Pre-trained models stored as `<id>.jmodel` files.
//!
//! A model file is JSON holding a linear model over a list of molecular
//! descriptors, optionally standardized first. Classifiers pass the linear
//! term through a logistic function to get the probability of the active
//! class. Models may also carry an applicability domain, either a bounding
//! box over the (scaled) descriptors or a leverage threshold.

use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde::Deserialize;

use crate::{
    error::Error,
    matrix::Matrix,
    mol::{descriptors::Descriptor, Molecule},
    schema::{ModelKind, Value},
    Result,
};

pub mod meta;

const MODEL_FILE: &str = "jmodel";

/// the path of the model file for `id` under `dir`
pub fn model_path(dir: impl AsRef<Path>, id: &str) -> PathBuf {
    dir.as_ref().join(format!("{id}.{MODEL_FILE}"))
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

fn default_threshold() -> f64 {
    0.5
}

fn default_labels() -> [i64; 2] {
    [0, 1]
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    Regression,
    Classification {
        /// the minimum probability of the active class needed to predict it
        #[serde(default = "default_threshold")]
        threshold: f64,

        /// [inactive, active]
        #[serde(default = "default_labels")]
        labels: [i64; 2],
    },
}

/// The region of descriptor space a model's predictions can be trusted in
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Domain {
    BoundingBox {
        lower: Vec<f64>,
        upper: Vec<f64>,
    },
    Leverage {
        /// (XᵀX)⁻¹ of the scaled training descriptors
        inverse_gram: Matrix<f64>,

        /// the warning leverage h*, conventionally 3(p + 1)/n
        threshold: f64,
    },
}

impl Domain {
    pub fn contains(&self, x: &[f64]) -> bool {
        match self {
            Domain::BoundingBox { lower, upper } => x
                .iter()
                .zip(lower.iter().zip(upper))
                .all(|(v, (lo, hi))| lo <= v && v <= hi),
            Domain::Leverage {
                inverse_gram,
                threshold,
            } => inverse_gram.quadratic_form(x) <= *threshold,
        }
    }
}

/// The outputs of one model invocation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub value: Value,

    /// [P(inactive), P(active)], only for classifiers
    pub probability: Option<[f64; 2]>,

    /// whether the molecule lies inside the applicability domain, only for
    /// models that have one
    pub in_domain: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Model {
    descriptors: Vec<Descriptor>,

    #[serde(default)]
    scaler: Option<Scaler>,

    coefficients: Vec<f64>,

    #[serde(default)]
    intercept: f64,

    task: Task,

    #[serde(default)]
    domain: Option<Domain>,
}

impl Model {
    /// load and validate the model at `path`. a missing file is reported as
    /// an [Error::Io] with [std::io::ErrorKind::NotFound]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        trace!("loading model from {}", path.display());
        let s = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let model: Self =
            serde_json::from_str(&s).map_err(|source| Error::Json {
                path: path.to_owned(),
                source,
            })?;
        model.validate().map_err(|reason| Error::InvalidModel {
            path: path.to_owned(),
            reason,
        })?;
        debug!(
            "loaded {} model over {} descriptors",
            model.kind().label(),
            model.descriptors.len()
        );
        if let Some(Domain::Leverage { inverse_gram, .. }) = &model.domain {
            trace!("leverage domain with (XᵀX)⁻¹:\n{inverse_gram}");
        }
        Ok(model)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let n = self.descriptors.len();
        if n == 0 {
            return Err("no descriptors".to_owned());
        }
        if let Some(d) = self.descriptors.iter().find(|d| !d.is_valid()) {
            return Err(format!("invalid descriptor {d:?}"));
        }
        if self.coefficients.len() != n {
            return Err(format!(
                "{} coefficients for {n} descriptors",
                self.coefficients.len()
            ));
        }
        if let Some(Scaler { mean, scale }) = &self.scaler {
            if mean.len() != n || scale.len() != n {
                return Err(format!("scaler does not have {n} entries"));
            }
            if scale.iter().any(|&s| s == 0.0) {
                return Err("scaler has a zero scale".to_owned());
            }
        }
        if let Task::Classification { threshold, .. } = self.task {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(format!("threshold {threshold} is not in [0, 1]"));
            }
        }
        match &self.domain {
            Some(Domain::BoundingBox { lower, upper })
                if lower.len() != n || upper.len() != n =>
            {
                Err(format!("bounding box does not have {n} entries"))
            }
            Some(Domain::Leverage { inverse_gram, .. })
                if !inverse_gram.is_square(n) =>
            {
                Err(format!(
                    "inverse Gram matrix has shape {:?}, expected {n}x{n}",
                    inverse_gram.shape()
                ))
            }
            _ => Ok(()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        ModelKind::new(
            matches!(self.task, Task::Classification { .. }),
            self.domain.is_some(),
        )
    }

    /// the scaled descriptor vector of `mol`
    fn features(&self, mol: &Molecule) -> Vec<f64> {
        let raw = self.descriptors.iter().map(|d| d.compute(mol));
        match &self.scaler {
            Some(Scaler { mean, scale }) => raw
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            None => raw.collect(),
        }
    }

    pub fn predict(&self, mol: &Molecule) -> Prediction {
        let x = self.features(mol);
        let linear = self.intercept
            + self
                .coefficients
                .iter()
                .zip(&x)
                .map(|(c, x)| c * x)
                .sum::<f64>();

        let (value, probability) = match self.task {
            Task::Regression => (Value::Float(linear), None),
            Task::Classification { threshold, labels } => {
                let active = 1.0 / (1.0 + (-linear).exp());
                let label = if active >= threshold {
                    labels[1]
                } else {
                    labels[0]
                };
                (Value::Int(label), Some([1.0 - active, active]))
            }
        };

        Prediction {
            value,
            probability,
            in_domain: self.domain.as_ref().map(|d| d.contains(&x)),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn model(json: &str) -> Model {
        let m: Model = serde_json::from_str(json).unwrap();
        m.validate().unwrap();
        m
    }

    fn mol(smiles: &str) -> Molecule {
        Molecule::from_smiles(smiles).unwrap()
    }

    #[test]
    fn regression() {
        let m = model(
            r#"{
                "descriptors": ["heavy_atoms"],
                "coefficients": [0.5],
                "intercept": 1.0,
                "task": {"type": "regression"}
            }"#,
        );
        assert_eq!(m.kind(), ModelKind::Regression);
        let p = m.predict(&mol("CCO"));
        assert_eq!(p.value, Value::Float(2.5));
        assert_eq!(p.probability, None);
        assert_eq!(p.in_domain, None);
    }

    #[test]
    fn classification_with_bounding_box() {
        let m = model(
            r#"{
                "descriptors": ["heavy_atoms", {"element_count": "O"}],
                "scaler": {"mean": [5.0, 1.0], "scale": [2.0, 1.0]},
                "coefficients": [1.0, 0.0],
                "task": {"type": "classification", "labels": [-1, 1]},
                "domain": {
                    "method": "bounding_box",
                    "lower": [-2.0, -1.0],
                    "upper": [2.0, 3.0]
                }
            }"#,
        );
        assert_eq!(m.kind(), ModelKind::ClassificationWithDoa);

        // 5 heavy atoms scale to 0, so p = 0.5 and the threshold is met
        let p = m.predict(&mol("CCCCO"));
        assert_eq!(p.value, Value::Int(1));
        let [inactive, active] = p.probability.unwrap();
        assert_abs_diff_eq!(inactive, 0.5);
        assert_abs_diff_eq!(active, 0.5);
        assert_eq!(p.in_domain, Some(true));

        // 13 heavy atoms scale to 4, outside the box
        let p = m.predict(&mol("CC(=O)Oc1ccccc1C(=O)O"));
        assert_eq!(p.value, Value::Int(1));
        assert!(p.probability.unwrap()[1] > 0.98);
        assert_eq!(p.in_domain, Some(false));

        let p = m.predict(&mol("C"));
        assert_eq!(p.value, Value::Int(-1));
    }

    #[test]
    fn leverage_domain() {
        let m = model(
            r#"{
                "descriptors": ["heavy_atoms", "rings"],
                "coefficients": [0.1, 0.2],
                "task": {"type": "regression"},
                "domain": {
                    "method": "leverage",
                    "inverse_gram": [[0.01, 0.0], [0.0, 0.1]],
                    "threshold": 1.0
                }
            }"#,
        );
        assert_eq!(m.kind(), ModelKind::RegressionWithDoa);
        // h = 0.01 * 36 + 0.1 * 1 = 0.46
        assert_eq!(m.predict(&mol("c1ccccc1")).in_domain, Some(true));
        // h = 0.01 * 144 = 1.44
        assert_eq!(m.predict(&mol("CCCCCCCCCCCC")).in_domain, Some(false));
    }

    #[test]
    fn invalid_models() {
        let cases = [
            r#"{"descriptors": [], "coefficients": [],
                "task": {"type": "regression"}}"#,
            r#"{"descriptors": ["rings"], "coefficients": [1.0, 2.0],
                "task": {"type": "regression"}}"#,
            r#"{"descriptors": [{"element_count": "Qq"}],
                "coefficients": [1.0], "task": {"type": "regression"}}"#,
            r#"{"descriptors": ["rings"], "coefficients": [1.0],
                "scaler": {"mean": [0.0], "scale": [0.0]},
                "task": {"type": "regression"}}"#,
            r#"{"descriptors": ["rings"], "coefficients": [1.0],
                "task": {"type": "classification", "threshold": 2.0}}"#,
            r#"{"descriptors": ["rings"], "coefficients": [1.0],
                "task": {"type": "regression"},
                "domain": {"method": "leverage",
                           "inverse_gram": [[1.0, 0.0]], "threshold": 1.0}}"#,
        ];
        for case in cases {
            let m: Model = serde_json::from_str(case).unwrap();
            assert!(m.validate().is_err(), "{case}");
        }
    }

    #[test]
    fn missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Model::load(model_path(dir.path(), "nope")).unwrap_err();
        assert!(err.is_not_found());
    }
}
