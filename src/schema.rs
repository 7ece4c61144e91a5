//! Output columns for a model's predictions.
//!
//! Every row of a run carries the same calculated columns, so the names
//! derived here from the [ModelKind] and the values derived from each
//! [Prediction] must line up one-to-one: the prediction first, then the
//! inactive/active probabilities for classifiers, then the applicability
//! domain flag last.

use std::fmt::Display;

use crate::{error::Error, model::Prediction, Result};

/// What a model reports beyond its bare prediction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Regression,
    Classification,
    RegressionWithDoa,
    ClassificationWithDoa,
}

impl ModelKind {
    pub fn new(classification: bool, doa: bool) -> Self {
        match (classification, doa) {
            (false, false) => Self::Regression,
            (true, false) => Self::Classification,
            (false, true) => Self::RegressionWithDoa,
            (true, true) => Self::ClassificationWithDoa,
        }
    }

    /// the kind whose output shape `prediction` has
    pub fn of(prediction: &Prediction) -> Self {
        Self::new(
            prediction.probability.is_some(),
            prediction.in_domain.is_some(),
        )
    }

    pub fn is_classification(&self) -> bool {
        matches!(self, Self::Classification | Self::ClassificationWithDoa)
    }

    pub fn has_doa(&self) -> bool {
        matches!(self, Self::RegressionWithDoa | Self::ClassificationWithDoa)
    }

    /// "classification" or "regression"
    pub fn label(&self) -> &'static str {
        if self.is_classification() {
            "classification"
        } else {
            "regression"
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Regression => "regression",
            Self::Classification => "classification",
            Self::RegressionWithDoa => "regression with DOA",
            Self::ClassificationWithDoa => "classification with DOA",
        }
    }

    pub fn num_fields(&self) -> usize {
        1 + 2 * self.is_classification() as usize + self.has_doa() as usize
    }
}

/// A single calculated output value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
        }
    }
}

/// the names of the calculated fields for a model of `kind`, each prefixed
/// with `prefix`
pub fn field_names(kind: ModelKind, prefix: &str) -> Vec<String> {
    let mut names = vec![format!("{prefix}_Prediction")];
    if kind.is_classification() {
        names.push(format!("{prefix}_Inactive"));
        names.push(format!("{prefix}_Active"));
    }
    if kind.has_doa() {
        names.push(format!("{prefix}_DOA"));
    }
    names
}

/// the calculated values of `prediction`, in the order of [field_names] for
/// `ModelKind::of(prediction)`
pub fn values(prediction: &Prediction) -> Vec<Value> {
    let mut values = vec![prediction.value];
    if let Some([inactive, active]) = prediction.probability {
        values.push(Value::Float(inactive));
        values.push(Value::Float(active));
    }
    if let Some(in_domain) = prediction.in_domain {
        values.push(Value::Bool(in_domain));
    }
    values
}

/// The calculated columns of one run, fixed by the kind of its model
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    kind: ModelKind,
    names: Vec<String>,
}

impl Schema {
    pub fn new(kind: ModelKind, prefix: &str) -> Self {
        Self {
            kind,
            names: field_names(kind, prefix),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    /// the values of `prediction` for a row under `self`. a prediction of a
    /// different shape would shift the columns, so it is rejected
    pub fn values(&self, prediction: &Prediction) -> Result<Vec<Value>> {
        if ModelKind::of(prediction) != self.kind {
            return Err(Error::Misaligned {
                expected: self.kind.description(),
            });
        }
        Ok(values(prediction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(probability: bool, doa: bool) -> Prediction {
        Prediction {
            value: if probability {
                Value::Int(1)
            } else {
                Value::Float(2.5)
            },
            probability: probability.then_some([0.25, 0.75]),
            in_domain: doa.then_some(false),
        }
    }

    #[test]
    fn regression() {
        let schema = Schema::new(ModelKind::Regression, "LogS");
        assert_eq!(schema.field_names(), ["LogS_Prediction"]);
        let got = schema.values(&prediction(false, false)).unwrap();
        assert_eq!(got, vec![Value::Float(2.5)]);
    }

    #[test]
    fn classification() {
        let schema = Schema::new(ModelKind::Classification, "Tox");
        assert_eq!(
            schema.field_names(),
            ["Tox_Prediction", "Tox_Inactive", "Tox_Active"]
        );
        let got = schema.values(&prediction(true, false)).unwrap();
        assert_eq!(
            got,
            vec![Value::Int(1), Value::Float(0.25), Value::Float(0.75)]
        );
    }

    #[test]
    fn doa_is_last() {
        for classification in [false, true] {
            let kind = ModelKind::new(classification, true);
            let names = field_names(kind, "M");
            assert_eq!(names.last().map(String::as_str), Some("M_DOA"));
            let vals = values(&prediction(classification, true));
            assert_eq!(vals.last(), Some(&Value::Bool(false)));
            assert_eq!(names.len(), vals.len());
            assert_eq!(names.len(), kind.num_fields());
        }
    }

    #[test]
    fn names_and_values_align() {
        for classification in [false, true] {
            for doa in [false, true] {
                let p = prediction(classification, doa);
                let kind = ModelKind::of(&p);
                assert_eq!(kind, ModelKind::new(classification, doa));
                assert_eq!(field_names(kind, "x").len(), values(&p).len());
            }
        }
    }

    #[test]
    fn misaligned_prediction() {
        let schema = Schema::new(ModelKind::ClassificationWithDoa, "M");
        let err = schema.values(&prediction(true, false)).unwrap_err();
        assert!(matches!(
            err,
            Error::Misaligned {
                expected: "classification with DOA"
            }
        ));
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(Value::Int(0).to_string(), "0");
        assert_eq!(Value::Float(-1.25).to_string(), "-1.25");
        assert_eq!(ModelKind::RegressionWithDoa.label(), "regression");
    }
}
