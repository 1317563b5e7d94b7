//! Dataset identifier grammars.
//!
//! A result file's stem encodes the qubit count and dataset type of the
//! benchmark it was measured on. Two naming conventions exist in the
//! historical data; the caller picks one explicitly.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Dataset type implied by a legacy Voqc complete ECC set.
const LEGACY_DATASET_TYPE: &str = "eccs";

/// Naming convention used to decode dataset identifiers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetGrammar {
    /// `<qubits>_<gates>-<type>`, e.g. `12_345-random`
    #[default]
    QubitsGatesType,
    /// `Voqc_<n>_<qubits>_complete_ECC_set`
    LegacyVoqc,
}

impl fmt::Display for DatasetGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetGrammar::QubitsGatesType => write!(f, "qubits-gates-type"),
            DatasetGrammar::LegacyVoqc => write!(f, "legacy-voqc"),
        }
    }
}

/// Identifier that did not match the active grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarWarning {
    pub identifier: String,
    pub grammar: DatasetGrammar,
}

impl fmt::Display for GrammarWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not extract number of qubits from dataset name '{}' ({} grammar)",
            self.identifier, self.grammar
        )
    }
}

/// Dimensions derived from one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub n_qubits: String,
    pub dataset_type: String,
    /// Set when the identifier did not match; both values are then the raw identifier.
    pub warning: Option<GrammarWarning>,
}

impl Extraction {
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

fn qubits_gates_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]+)_([0-9]+)-(.+)$").expect("valid regex literal"))
}

fn legacy_voqc_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Voqc_([0-9]+)_([0-9]+)_complete_ECC_set").expect("valid regex literal")
    })
}

impl DatasetGrammar {
    /// Derive qubit count and dataset type from `identifier`.
    ///
    /// Never fails: an identifier outside the grammar comes back verbatim
    /// in both fields, with a warning attached.
    pub fn extract(&self, identifier: &str) -> Extraction {
        let parsed = match self {
            DatasetGrammar::QubitsGatesType => {
                qubits_gates_type_regex().captures(identifier).map(|caps| {
                    (caps[1].to_string(), caps[3].to_string())
                })
            }
            DatasetGrammar::LegacyVoqc => legacy_voqc_regex()
                .captures(identifier)
                .map(|caps| (caps[2].to_string(), LEGACY_DATASET_TYPE.to_string())),
        };

        match parsed {
            Some((n_qubits, dataset_type)) => Extraction {
                n_qubits,
                dataset_type,
                warning: None,
            },
            None => Extraction {
                n_qubits: identifier.to_string(),
                dataset_type: identifier.to_string(),
                warning: Some(GrammarWarning {
                    identifier: identifier.to_string(),
                    grammar: *self,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_qubits_gates_type() {
        let e = DatasetGrammar::QubitsGatesType.extract("12_345-random");
        assert_eq!(e.n_qubits, "12");
        assert_eq!(e.dataset_type, "random");
        assert!(e.warning.is_none());
    }

    #[test]
    fn test_type_may_contain_separators() {
        let e = DatasetGrammar::QubitsGatesType.extract("3_6-eccs-v2_small");
        assert_eq!(e.n_qubits, "3");
        assert_eq!(e.dataset_type, "eccs-v2_small");
    }

    #[test]
    fn test_legacy_voqc() {
        let e = DatasetGrammar::LegacyVoqc.extract("Voqc_7_12_complete_ECC_set");
        assert_eq!(e.n_qubits, "12");
        assert_eq!(e.dataset_type, "eccs");
        assert!(!e.is_fallback());
    }

    #[test]
    fn test_grammars_do_not_cross_match() {
        assert!(DatasetGrammar::LegacyVoqc.extract("2_6-eccs").is_fallback());
        assert!(DatasetGrammar::QubitsGatesType
            .extract("Voqc_7_12_complete_ECC_set")
            .is_fallback());
    }

    #[test]
    fn test_fallback_returns_identifier() {
        for id in ["", "random", "12-random", "12_-x", "a_1-x", "12_345-"] {
            let e = DatasetGrammar::QubitsGatesType.extract(id);
            assert_eq!(e.n_qubits, id);
            assert_eq!(e.dataset_type, id);
            let warning = e.warning.expect("fallback carries a warning");
            assert_eq!(warning.identifier, id);
            assert!(warning.to_string().contains("qubits-gates-type"));
        }
    }

    proptest! {
        #[test]
        fn prop_identifier_round_trip(q in 0u32..10_000, g in 0u32..100_000, t in "[a-z][a-z0-9_-]{0,12}") {
            let id = format!("{}_{}-{}", q, g, t);
            let e = DatasetGrammar::QubitsGatesType.extract(&id);
            prop_assert_eq!(e.n_qubits, q.to_string());
            prop_assert_eq!(e.dataset_type, t);
            prop_assert!(e.warning.is_none());
        }

        #[test]
        fn prop_extraction_is_total(s in ".*") {
            for grammar in [DatasetGrammar::QubitsGatesType, DatasetGrammar::LegacyVoqc] {
                let e = grammar.extract(&s);
                if e.is_fallback() {
                    prop_assert_eq!(&e.n_qubits, &s);
                    prop_assert_eq!(&e.dataset_type, &s);
                }
            }
        }
    }
}
