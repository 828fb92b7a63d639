use serde::{Deserialize, Serialize};

use crate::criteria::VerdictThresholds;
use crate::model::DataType;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

/// Labeled sessions need both a pass rate and a label mismatch rate within
/// bounds to pass; a good pass rate alone only reaches `warn`.
pub fn session_verdict(
    data_type: DataType,
    pass_rate: f64,
    label_mismatch_rate: Option<f64>,
    thresholds: &VerdictThresholds,
) -> Verdict {
    let labels_ok = match (data_type, label_mismatch_rate) {
        (DataType::Labeled, Some(rate)) => rate <= thresholds.label_mismatch_max,
        (DataType::Labeled, None) => false,
        (DataType::Preprocessed, _) => true,
    };

    if pass_rate >= thresholds.pass_rate_pass && labels_ok {
        Verdict::Pass
    } else if pass_rate >= thresholds.pass_rate_warn {
        Verdict::Warn
    } else {
        Verdict::Fail
    }
}
