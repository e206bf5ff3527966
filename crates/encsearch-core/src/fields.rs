//! Central field/operator descriptor table and query construction.
//!
//! Every searchable field is described exactly once here: the encrypted
//! store path it maps to and the operators the encrypted schema indexes it
//! for, with their length bounds. All endpoints and the benchmark runner go
//! through [`build_query`]; there is deliberately no second copy of this
//! mapping anywhere in the workspace.

use crate::error::Error;
use crate::model::{SearchField, SearchOperator};

/// Length bounds for one (field, operator) pairing.
#[derive(Debug, Clone, Copy)]
pub struct OperatorSpec {
    pub operator: SearchOperator,
    pub min_len: usize,
    pub max_len: usize,
}

impl OperatorSpec {
    const fn new(operator: SearchOperator, min_len: usize, max_len: usize) -> Self {
        Self {
            operator,
            min_len,
            max_len,
        }
    }
}

/// Descriptor for one searchable field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: SearchField,
    /// Property path in the encrypted document store.
    pub store_path: &'static str,
    /// Operators the encrypted schema indexes this field for.
    pub operators: &'static [OperatorSpec],
}

// Bounds mirror the encrypted schema: prefix-indexed email allows query
// strings of 3..=60 chars, substring-indexed name 2..=10. Equality-indexed
// fields accept any non-empty value up to the stored max length.
static FIELD_SPECS: [FieldSpec; 5] = [
    FieldSpec {
        field: SearchField::Email,
        store_path: "searchable_email",
        operators: &[
            OperatorSpec::new(SearchOperator::Equality, 1, 100),
            OperatorSpec::new(SearchOperator::Prefix, 3, 60),
        ],
    },
    FieldSpec {
        field: SearchField::Name,
        store_path: "searchable_name",
        operators: &[
            OperatorSpec::new(SearchOperator::Equality, 1, 60),
            OperatorSpec::new(SearchOperator::Substring, 2, 10),
        ],
    },
    FieldSpec {
        field: SearchField::Phone,
        store_path: "searchable_phone",
        operators: &[OperatorSpec::new(SearchOperator::Equality, 1, 30)],
    },
    FieldSpec {
        field: SearchField::Category,
        store_path: "metadata.category",
        operators: &[OperatorSpec::new(SearchOperator::Equality, 1, 50)],
    },
    FieldSpec {
        field: SearchField::Status,
        store_path: "metadata.status",
        operators: &[OperatorSpec::new(SearchOperator::Equality, 1, 50)],
    },
];

/// Look up the descriptor for a field.
pub fn field_spec(field: SearchField) -> &'static FieldSpec {
    match field {
        SearchField::Email => &FIELD_SPECS[0],
        SearchField::Name => &FIELD_SPECS[1],
        SearchField::Phone => &FIELD_SPECS[2],
        SearchField::Category => &FIELD_SPECS[3],
        SearchField::Status => &FIELD_SPECS[4],
    }
}

/// Backend-agnostic query fragment produced by the mapper.
///
/// The primary store translates this into its native predicate form; prefix,
/// suffix and substring predicates are case- and diacritic-insensitive per
/// the encrypted index configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendQuery {
    /// Exact field-value match.
    Equality {
        path: &'static str,
        value: String,
    },
    /// Field starts with the given prefix.
    StartsWith {
        path: &'static str,
        prefix: String,
    },
    /// Field ends with the given suffix.
    EndsWith {
        path: &'static str,
        suffix: String,
    },
    /// Field contains the given substring.
    Contains {
        path: &'static str,
        substring: String,
    },
}

impl BackendQuery {
    /// The encrypted-store property path this query targets.
    pub fn path(&self) -> &'static str {
        match self {
            BackendQuery::Equality { path, .. }
            | BackendQuery::StartsWith { path, .. }
            | BackendQuery::EndsWith { path, .. }
            | BackendQuery::Contains { path, .. } => path,
        }
    }
}

/// Build the backend query for a (field, operator, value) triple.
///
/// Rejects unsupported field/operator pairs and values outside the
/// operator's length bounds before any backend is contacted.
pub fn build_query(
    field: SearchField,
    operator: SearchOperator,
    value: &str,
) -> Result<BackendQuery, Error> {
    let spec = field_spec(field);
    let op_spec = spec
        .operators
        .iter()
        .find(|op| op.operator == operator)
        .ok_or(Error::UnsupportedOperator { field, operator })?;

    let len = value.chars().count();
    if len < op_spec.min_len || len > op_spec.max_len {
        return Err(Error::ValueLength {
            operator,
            len,
            min: op_spec.min_len,
            max: op_spec.max_len,
        });
    }

    let query = match operator {
        SearchOperator::Equality => BackendQuery::Equality {
            path: spec.store_path,
            value: value.to_string(),
        },
        SearchOperator::Prefix => BackendQuery::StartsWith {
            path: spec.store_path,
            prefix: value.to_string(),
        },
        SearchOperator::Suffix => BackendQuery::EndsWith {
            path: spec.store_path,
            suffix: value.to_string(),
        },
        SearchOperator::Substring => BackendQuery::Contains {
            path: spec.store_path,
            substring: value.to_string(),
        },
    };
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_prefix_differs_from_email_equality() {
        let prefix = build_query(SearchField::Email, SearchOperator::Prefix, "john").unwrap();
        let equality = build_query(SearchField::Email, SearchOperator::Equality, "john").unwrap();
        assert!(matches!(prefix, BackendQuery::StartsWith { .. }));
        assert!(matches!(equality, BackendQuery::Equality { .. }));
        assert_ne!(prefix, equality);
        assert_eq!(prefix.path(), "searchable_email");
    }

    #[test]
    fn phone_substring_is_a_configuration_error() {
        let err = build_query(SearchField::Phone, SearchOperator::Substring, "55").unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(err, Error::UnsupportedOperator { .. }));
    }

    #[test]
    fn suffix_is_not_enabled_for_any_field() {
        for field in SearchField::ALL {
            let err = build_query(field, SearchOperator::Suffix, "example.com").unwrap_err();
            assert!(matches!(err, Error::UnsupportedOperator { .. }));
        }
    }

    #[test]
    fn substring_length_bounds_are_enforced() {
        let too_short = build_query(SearchField::Name, SearchOperator::Substring, "a");
        assert!(matches!(too_short, Err(Error::ValueLength { .. })));

        let too_long =
            build_query(SearchField::Name, SearchOperator::Substring, "abcdefghijk");
        assert!(matches!(too_long, Err(Error::ValueLength { .. })));

        let ok = build_query(SearchField::Name, SearchOperator::Substring, "mit");
        assert!(matches!(ok, Ok(BackendQuery::Contains { .. })));
    }

    #[test]
    fn every_field_resolves_to_its_own_descriptor() {
        for field in SearchField::ALL {
            assert_eq!(field_spec(field).field, field);
        }
    }

    #[test]
    fn metadata_fields_map_to_nested_paths() {
        let query =
            build_query(SearchField::Category, SearchOperator::Equality, "retail").unwrap();
        assert_eq!(query.path(), "metadata.category");
    }
}
