//! Property tests for the column-contract validator

use equivalence_validator::{
    ColumnContractValidator, EQUIVALENCE_TABLE_COLUMNS, SheetCollection, Table, ValidationOutcome,
};
use proptest::prelude::*;

mod common;

/// Column names that never collide with the required ones
fn extra_columns() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 0..5)
}

/// A sheet made of a random subset of the required columns plus noise
fn partial_sheet() -> impl Strategy<Value = Vec<String>> {
    (prop::sample::subsequence(EQUIVALENCE_TABLE_COLUMNS.to_vec(), 0..6), extra_columns()).prop_map(
        |(required, extra)| {
            required
                .into_iter()
                .map(str::to_string)
                .chain(extra)
                .collect()
        },
    )
}

fn collection(tables: Vec<Vec<String>>) -> SheetCollection {
    tables
        .into_iter()
        .enumerate()
        .map(|(index, headers)| (format!("Aba {index}"), Table::from_headers(headers)))
        .collect()
}

proptest! {
    #[test]
    fn test_valid_whenever_one_sheet_has_every_column(
        before in prop::collection::vec(partial_sheet(), 0..4),
        after in prop::collection::vec(partial_sheet(), 0..4),
        extra in extra_columns(),
    ) {
        let mut full: Vec<String> = EQUIVALENCE_TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
        full.extend(extra);
        let mut tables = before;
        tables.push(full);
        tables.extend(after);

        let result = ColumnContractValidator::for_upload().validate(&collection(tables));

        prop_assert!(result.is_valid);
    }

    #[test]
    fn test_invalid_message_names_every_required_column(
        tables in prop::collection::vec(partial_sheet(), 1..5),
    ) {
        let sheets = collection(tables);
        let any_complete = sheets
            .iter()
            .any(|(_, table)| EQUIVALENCE_TABLE_COLUMNS.iter().all(|c| table.columns().contains(c)));
        prop_assume!(!any_complete);

        let result = ColumnContractValidator::for_upload().validate(&sheets);

        prop_assert!(!result.is_valid);
        let is_missing_columns = matches!(result.outcome, ValidationOutcome::MissingColumns { .. });
        prop_assert!(is_missing_columns);
        for column in EQUIVALENCE_TABLE_COLUMNS {
            prop_assert!(result.message.contains(column));
        }
    }

    #[test]
    fn test_verdict_does_not_depend_on_sheet_order(
        tables in prop::collection::vec(partial_sheet(), 1..5),
    ) {
        let mut reversed = tables.clone();
        reversed.reverse();
        let validator = ColumnContractValidator::for_in_memory();

        let forward = validator.validate(&collection(tables));
        let backward = validator.validate(&collection(reversed));

        prop_assert_eq!(forward.is_valid, backward.is_valid);
        prop_assert_eq!(forward.message, backward.message);
    }

    #[test]
    fn test_validation_is_idempotent(
        tables in prop::collection::vec(partial_sheet(), 0..5),
    ) {
        let sheets = collection(tables);
        let validator = ColumnContractValidator::for_upload();

        prop_assert_eq!(validator.validate(&sheets), validator.validate(&sheets));
    }
}

#[test]
fn test_empty_collection_has_its_own_message() {
    let validator = ColumnContractValidator::for_upload();

    let empty = validator.validate(&SheetCollection::new());
    let no_match = validator.validate(&common::sheets(vec![(
        "Aba",
        common::equivalence_table_without("Nomes Origem"),
    )]));

    assert_eq!(empty.outcome, ValidationOutcome::EmptyWorkbook);
    assert_ne!(empty.message, no_match.message);
}
