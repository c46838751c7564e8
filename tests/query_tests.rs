//! Query executor tests against the embedded engine

#![cfg(feature = "duckdb-backend")]

use serde_json::Value;
use sheetql::models::{Column, EnumType, Relationship, Schema, Table, TableData, TableDataMap};
use sheetql::query::{QueryExecutor, QueryResult};

fn schema() -> Schema {
    let character = Table::new(
        "Character",
        vec![
            Column::new("id", "int").primary_key(),
            Column::new("name", "varchar").not_null(),
            Column::new("status", "Status"),
        ],
    )
    .with_group("core");
    let skill = Table::new(
        "Skill",
        vec![
            Column::new("id", "int").primary_key(),
            Column::new("character_id", "int").foreign_key(),
        ],
    );
    let index = Table::new("Index", vec![Column::new("id", "int").primary_key()]);
    let rel = Relationship::many_to_one(skill.id, "character_id", character.id, "id");
    Schema::new(
        vec![character, skill, index],
        vec![rel],
        vec![EnumType::new("Status", ["active", "retired"])],
    )
}

fn data() -> TableDataMap {
    let mut data = TableDataMap::new();
    data.insert(
        "Character".to_string(),
        TableData::from_values(
            "Character",
            ["id", "name", "level"],
            [["1", "Ayla", "3"], ["2", "Brin", "1"], ["3", "Cato", "5"]],
        ),
    );
    data.insert(
        "Index".to_string(),
        TableData::from_values("Index", ["id", "note"], [["1", "Index"], ["2", "first"]]),
    );
    data
}

fn run(sql: &str) -> QueryResult {
    QueryExecutor::duckdb().query_data(Some(&schema()), &data(), sql)
}

mod data_query_tests {
    use super::*;

    #[test]
    fn test_table_name_case_variants_are_equivalent() {
        let expected = run("SELECT name FROM Character ORDER BY id");
        assert!(expected.is_ok(), "{:?}", expected.error);
        assert_eq!(expected.row_count, 3);
        for sql in [
            "SELECT name FROM character ORDER BY id",
            "SELECT name FROM CHARACTER ORDER BY id",
        ] {
            let result = run(sql);
            assert_eq!(result.rows, expected.rows, "{sql}");
        }
    }

    #[test]
    fn test_reserved_table_quoting_variants_are_equivalent() {
        let expected = run("SELECT id FROM _tbl_index ORDER BY id");
        assert!(expected.is_ok(), "{:?}", expected.error);
        assert_eq!(expected.row_count, 2);
        for sql in [
            "SELECT id FROM Index ORDER BY id",
            "SELECT id FROM \"Index\" ORDER BY id",
            "SELECT id FROM `Index` ORDER BY id",
            "SELECT id FROM [Index] ORDER BY id",
        ] {
            let result = run(sql);
            assert!(result.is_ok(), "{sql}: {:?}", result.error);
            assert_eq!(result.rows, expected.rows, "{sql}");
        }
    }

    #[test]
    fn test_engine_keyword_table_names_are_aliased() {
        let mut data = TableDataMap::new();
        for name in ["Pivot", "Show", "Array", "Qualify"] {
            data.insert(
                name.to_string(),
                TableData::from_values(name, ["id"], [["1"]]),
            );
        }
        for name in ["Pivot", "Show", "Array", "Qualify"] {
            let sql = format!("SELECT id FROM {name}");
            let result = QueryExecutor::duckdb().query_data(None, &data, &sql);
            assert!(result.is_ok(), "{sql}: {:?}", result.error);
            assert_eq!(result.rows[0]["id"], Value::from(1), "{sql}");
        }
    }

    #[test]
    fn test_literal_reserved_name_is_not_rewritten() {
        let result = run("SELECT id FROM Index WHERE note = 'Index'");
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.row_count, 1);
        assert_eq!(result.rows[0]["id"], Value::from(1));
    }

    #[test]
    fn test_reserved_name_error_carries_hint() {
        let result = run("SELECT Index.id FROM Index");
        let error = result.error.expect("qualified reserved name should fail");
        assert!(error.contains("_tbl_index"), "{error}");
    }

    #[test]
    fn test_numeric_columns_compare_as_numbers() {
        let result = run("SELECT name FROM character WHERE level > 2 ORDER BY level");
        assert!(result.is_ok(), "{:?}", result.error);
        let names: Vec<&Value> = result.rows.iter().map(|r| &r["name"]).collect();
        assert_eq!(names, vec![&Value::from("Ayla"), &Value::from("Cato")]);
    }

    #[test]
    fn test_non_ascii_alias_is_dropped() {
        let result = run("SELECT name AS 名前 FROM character WHERE id = 1");
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.columns, vec!["name"]);
    }

    #[test]
    fn test_marked_identifier() {
        let mut data = TableDataMap::new();
        data.insert(
            "orders".to_string(),
            TableData::from_values("orders", ["#id", "total"], [["7", "9.5"]]),
        );
        let result = QueryExecutor::duckdb().query_data(None, &data, "SELECT #id, total FROM orders");
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.rows[0]["#id"], Value::from(7));
        assert_eq!(result.rows[0]["total"], Value::from(9.5));
    }

    #[test]
    fn test_tables_without_schema_use_source_keys() {
        let result = QueryExecutor::duckdb().query_data(None, &data(), "SELECT count(*) AS n FROM character");
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.rows[0]["n"], Value::from(3));
    }

    #[test]
    fn test_write_statements_rejected() {
        let result = run("DELETE FROM character");
        assert!(result.error.is_some());
        let result = run("SELECT count(*) AS n FROM character");
        assert_eq!(result.rows[0]["n"], Value::from(3));
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(run("  ").error.as_deref(), Some("Empty query"));
    }
}

mod multi_statement_tests {
    use super::*;

    #[test]
    fn test_two_statements_give_two_results() {
        let result = run("SELECT 1; SELECT 2");
        assert!(result.is_ok(), "{:?}", result.error);
        let multi = result.multi_results.as_ref().expect("multi results");
        assert_eq!(multi.len(), 2);
        assert_eq!(result.row_count, multi.iter().map(|m| m.row_count).sum::<usize>());
        assert_eq!(result.row_count, 2);
    }

    #[test]
    fn test_failing_statement_is_isolated() {
        let result = run("SELECT name FROM character WHERE id = 1; SELEC oops; SELECT id FROM Index");
        assert!(result.is_ok());
        let multi = result.multi_results.unwrap();
        assert_eq!(multi.len(), 3);
        assert!(multi[0].is_ok());
        assert!(multi[1].error.is_some());
        assert_eq!(multi[2].row_count, 2);
        assert_eq!(multi[0].table.as_deref(), Some("character"));
        assert_eq!(multi[2].table.as_deref(), Some("Index"));
        assert_eq!(result.row_count, 3);
    }

    #[test]
    fn test_semicolon_in_literal() {
        let result = run("SELECT id FROM character WHERE name = 'a;b'; SELECT 2");
        assert_eq!(result.multi_results.map(|m| m.len()), Some(2));
    }
}

mod metadata_query_tests {
    use super::*;

    fn meta(sql: &str) -> QueryResult {
        QueryExecutor::duckdb().query_metadata(&schema(), sql)
    }

    #[test]
    fn test_tables_table() {
        let result = meta("SELECT name, column_count, pk_count, fk_count FROM tables ORDER BY name");
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.row_count, 3);
        let character = &result.rows[0];
        assert_eq!(character["name"], Value::from("Character"));
        assert_eq!(character["column_count"], Value::from(3));
        assert_eq!(result.rows[2]["fk_count"], Value::from(1));
    }

    #[test]
    fn test_columns_table_flags() {
        let result = meta(
            "SELECT column_name FROM columns WHERE table_name = 'Character' AND is_not_null = 1",
        );
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0]["column_name"], Value::from("name"));
    }

    #[test]
    fn test_refs_and_enums_tables() {
        let result = meta("SELECT from_table, to_table, relationship FROM refs");
        assert_eq!(result.rows[0]["from_table"], Value::from("Skill"));
        assert_eq!(result.rows[0]["relationship"], Value::from("many-to-one"));

        let result = meta("SELECT value FROM enums WHERE enum_name = 'Status' ORDER BY value");
        assert_eq!(result.row_count, 2);
    }

    #[test]
    fn test_join_across_metadata_tables() {
        let result = meta(
            "SELECT t.group_name, count(*) AS n FROM tables t JOIN columns c ON c.table_name = t.name \
             WHERE t.name = 'Character' GROUP BY t.group_name",
        );
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.rows[0]["group_name"], Value::from("core"));
        assert_eq!(result.rows[0]["n"], Value::from(3));
    }

    #[test]
    fn test_data_tables_not_visible_in_metadata_mode() {
        assert!(meta("SELECT * FROM character").error.is_some());
    }
}
