//! Sheet extraction tests

use serde_json::{Value, json};
use sheetql::config::ExtractConfig;
use sheetql::extract::{SheetExtractor, SkipReason};
use sheetql::models::{Column, RawSheet, Relationship, Schema, Table};
use sheetql::validation::{IssueCategory, validate};

fn sheet(name: &str, rows: Vec<Vec<Value>>) -> RawSheet {
    RawSheet::new(name, rows)
}

fn schema() -> Schema {
    let character = Table::new(
        "Character",
        vec![
            Column::new("id", "int").primary_key(),
            Column::new("name", "varchar"),
        ],
    );
    let skill = Table::new(
        "Skill",
        vec![
            Column::new("id", "int").primary_key(),
            Column::new("character_id", "int").foreign_key(),
        ],
    );
    let rel = Relationship::many_to_one(skill.id, "character_id", character.id, "id");
    Schema::new(vec![character, skill], vec![rel], vec![])
}

fn workbook() -> Vec<RawSheet> {
    vec![
        sheet(
            "Character",
            vec![
                vec![json!("Party roster"), json!(null)],
                vec![json!("ID"), json!("Name")],
                vec![json!(1), json!("Ayla")],
                vec![json!(2.0), json!(" Brin ")],
            ],
        ),
        sheet(
            "Skill",
            vec![
                vec![json!("id"), json!("character_id")],
                vec![json!(10), json!(1)],
                vec![json!(null), json!(null)],
                vec![json!(11), json!(99)],
            ],
        ),
        sheet("Readme", vec![vec![json!("about")], vec![json!("text")]]),
        sheet("Empty", vec![vec![json!("only")]]),
    ]
}

mod workbook_tests {
    use super::*;

    #[test]
    fn test_workbook_report() {
        let schema = schema();
        let report = SheetExtractor::default()
            .with_schema(&schema)
            .extract_workbook(&workbook());

        assert_eq!(report.summary(), "2 loaded, 2 skipped");
        assert_eq!(report.skipped[0].name, "Readme");
        assert_eq!(report.skipped[0].reason, SkipReason::DefinitionSheet);
        assert_eq!(report.skipped[1].reason, SkipReason::TooFewRows);

        let character = &report.tables["Character"];
        assert_eq!(character.header_row, 1);
        assert_eq!(character.headers, vec!["ID", "Name"]);
        assert_eq!(character.rows[1]["ID"], "2");
        assert_eq!(character.rows[1]["Name"], "Brin");
    }

    #[test]
    fn test_custom_skip_list() {
        let config = ExtractConfig::builder().skip_sheets(["skill"]).build();
        let report = SheetExtractor::new(config).extract_workbook(&workbook());
        assert!(report.tables.contains_key("Readme"));
        assert!(!report.tables.contains_key("Skill"));
    }

    #[test]
    fn test_header_scan_depth() {
        let rows = vec![
            vec![json!(1), json!(2)],
            vec![json!(3), json!(4)],
            vec![json!("id"), json!("name")],
            vec![json!(5), json!("x")],
        ];
        let shallow = SheetExtractor::new(ExtractConfig::builder().header_scan_rows(2).build());
        let table = shallow.extract(&sheet("Numbers", rows.clone())).unwrap();
        assert_eq!(table.header_row, 0);

        let table = SheetExtractor::default().extract(&sheet("Numbers", rows)).unwrap();
        assert_eq!(table.header_row, 2);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_report_serializes() {
        let report = SheetExtractor::default().extract_workbook(&workbook());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"][0]["reason"], "definition-sheet");
        assert_eq!(json["tables"]["Skill"]["rowCount"], 2);
    }
}

mod pipeline_tests {
    use super::*;

    #[test]
    fn test_extracted_rows_report_sheet_positions() {
        let schema = schema();
        let report = SheetExtractor::default()
            .with_schema(&schema)
            .extract_workbook(&workbook());
        let result = validate(&schema, &report.tables);

        let broken: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.category == IssueCategory::Referential)
            .collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].value.as_deref(), Some("99"));
        assert_eq!(broken[0].row, Some(4));
    }

    #[cfg(feature = "duckdb-backend")]
    #[test]
    fn test_extracted_tables_are_queryable() {
        let schema = schema();
        let report = SheetExtractor::default()
            .with_schema(&schema)
            .extract_workbook(&workbook());
        let result = sheetql::QueryExecutor::duckdb().query_data(
            Some(&schema),
            &report.tables,
            "SELECT c.name, s.id FROM skill s JOIN character c ON c.id = s.character_id",
        );
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.row_count, 1);
        assert_eq!(result.rows[0]["name"], json!("Ayla"));
    }
}
