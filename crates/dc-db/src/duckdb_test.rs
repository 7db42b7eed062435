use super::*;

fn t(name: &str) -> TableRef {
    TableRef::parse(name).unwrap()
}

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
    db.test_connection().await.unwrap();
}

#[tokio::test]
async fn test_query_typed_values() {
    let db = DuckDbBackend::in_memory().unwrap();
    let result = db
        .query(
            "SELECT 1 AS i, 2.5::DOUBLE AS f, 'x' AS s, NULL AS n, TRUE AS b, \
             DATE '2024-01-31' AS d, TIMESTAMP '2024-01-31 10:11:12' AS ts, \
             12.50::DECIMAL(10,2) AS dec",
        )
        .await
        .unwrap();

    assert_eq!(
        result.columns,
        vec!["i", "f", "s", "n", "b", "d", "ts", "dec"]
    );
    let row = &result.rows[0];
    assert_eq!(row[0], Cell::Int(1));
    assert_eq!(row[1], Cell::Float(2.5));
    assert_eq!(row[2], Cell::Str("x".to_string()));
    assert_eq!(row[3], Cell::Na);
    assert_eq!(row[4], Cell::Bool(true));
    let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    assert_eq!(row[5], Cell::Date(day));
    assert_eq!(row[6], Cell::DateTime(day.and_hms_opt(10, 11, 12).unwrap()));
    assert_eq!(row[7], Cell::Float(12.5));
}

#[tokio::test]
async fn test_query_empty_result_keeps_columns() {
    let db = DuckDbBackend::in_memory().unwrap();
    let result = db.query("SELECT 1 AS a WHERE 0 = 1").await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.columns, vec!["a"]);
}

#[tokio::test]
async fn test_query_syntax_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.query("SELEC 1").await.unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));
}

#[tokio::test]
async fn test_missing_table_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.query("SELECT * FROM does_not_exist").await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[tokio::test]
async fn test_execute_batch_and_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t1 (id INT); CREATE SCHEMA s; CREATE TABLE s.t2 (id INT);")
        .await
        .unwrap();

    assert!(db.relation_exists(&t("t1")).await.unwrap());
    assert!(db.relation_exists(&t("s.t2")).await.unwrap());
    assert!(!db.relation_exists(&t("s.t1")).await.unwrap());
}

#[tokio::test]
async fn test_table_info_with_primary_key() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, code VARCHAR, created DATE, price DOUBLE)",
    )
    .await
    .unwrap();

    let info = db.table_info(&t("items")).await.unwrap();
    assert!(info.exists);
    assert_eq!(info.column_names(), vec!["id", "code", "created", "price"]);
    assert_eq!(info.primary_keys, vec!["id"]);

    let ci = info.column_info();
    assert!(ci.string_columns.contains("code"));
    assert!(ci.date_columns.contains("created"));
    assert!(ci.other_columns.contains("price"));
}

#[tokio::test]
async fn test_table_info_missing() {
    let db = DuckDbBackend::in_memory().unwrap();
    let info = db.table_info(&t("nothing_here")).await.unwrap();
    assert!(!info.exists);
    assert!(info.columns.is_empty());
}

#[tokio::test]
async fn test_insert_rows_typed() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE t (id BIGINT, name VARCHAR, d DATE, ts TIMESTAMP)")
        .await
        .unwrap();

    let day = NaiveDate::from_ymd_opt(2020, 5, 17).unwrap();
    let columns = vec![
        "id".to_string(),
        "name".to_string(),
        "d".to_string(),
        "ts".to_string(),
    ];
    let rows = vec![
        vec![
            Cell::Int(1),
            Cell::Str("007".to_string()),
            Cell::Date(day),
            Cell::DateTime(day.and_hms_opt(1, 2, 3).unwrap()),
        ],
        vec![Cell::Int(2), Cell::Na, Cell::Na, Cell::Na],
    ];
    let inserted = db.insert_rows(&t("t"), &columns, &rows).await.unwrap();
    assert_eq!(inserted, 2);

    let back = db.query("SELECT * FROM t ORDER BY id").await.unwrap();
    assert_eq!(back.rows, rows);
}

#[tokio::test]
async fn test_insert_rows_shape_mismatch() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE t (a INT, b INT)").await.unwrap();
    let err = db
        .insert_rows(
            &t("t"),
            &["a".to_string(), "b".to_string()],
            &[vec![Cell::Int(1)]],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::RowShape { expected: 2, .. }));
}

#[tokio::test]
async fn test_upsert_rows_overwrites_on_key() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE u (id INTEGER PRIMARY KEY, v VARCHAR); INSERT INTO u VALUES (1, 'old'), (2, 'keep');",
    )
    .await
    .unwrap();

    let columns = vec!["id".to_string(), "v".to_string()];
    let rows = vec![
        vec![Cell::Int(1), Cell::Str("new".to_string())],
        vec![Cell::Int(3), Cell::Str("added".to_string())],
    ];
    db.upsert_rows(&t("u"), &columns, &["id".to_string()], &rows)
        .await
        .unwrap();

    let back = db.query("SELECT id, v FROM u ORDER BY id").await.unwrap();
    assert_eq!(
        back.rows,
        vec![
            vec![Cell::Int(1), Cell::Str("new".to_string())],
            vec![Cell::Int(2), Cell::Str("keep".to_string())],
            vec![Cell::Int(3), Cell::Str("added".to_string())],
        ]
    );
}

#[tokio::test]
async fn test_drop_if_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE to_drop AS SELECT 1 AS id")
        .await
        .unwrap();
    assert!(db.relation_exists(&t("to_drop")).await.unwrap());

    db.drop_if_exists(&t("to_drop")).await.unwrap();
    assert!(!db.relation_exists(&t("to_drop")).await.unwrap());
}

#[tokio::test]
async fn test_drop_if_exists_view_and_missing() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE VIEW v AS SELECT 1 AS id").await.unwrap();
    db.drop_if_exists(&t("v")).await.unwrap();
    assert!(!db.relation_exists(&t("v")).await.unwrap());
    db.drop_if_exists(&t("never_created")).await.unwrap();
}

#[tokio::test]
async fn test_drop_if_exists_reports_blocked_drop() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE parent (id INTEGER PRIMARY KEY); \
         CREATE TABLE child (pid INTEGER REFERENCES parent(id));",
    )
    .await
    .unwrap();

    assert!(db.drop_if_exists(&t("parent")).await.is_err());
    assert!(db.relation_exists(&t("parent")).await.unwrap());
}

#[tokio::test]
async fn test_create_schema_if_not_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_schema_if_not_exists("staging").await.unwrap();
    db.execute("CREATE TABLE staging.x (id INT)").await.unwrap();
    assert!(db.relation_exists(&t("staging.x")).await.unwrap());
    db.create_schema_if_not_exists("staging").await.unwrap();
}

#[tokio::test]
async fn test_worker_connection_shares_database() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE shared AS SELECT 42 AS answer")
        .await
        .unwrap();

    let worker = db.worker_connection().unwrap();
    let rows = worker.query("SELECT answer FROM shared").await.unwrap();
    assert_eq!(rows.rows, vec![vec![Cell::Int(42)]]);
}

#[tokio::test]
async fn test_file_backed_database() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("test.duckdb");
    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        db.execute("CREATE TABLE p AS SELECT 1 AS id").await.unwrap();
    }
    let db = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    assert!(db.relation_exists(&t("p")).await.unwrap());
}

#[test]
fn test_insert_sql_upsert_clause() {
    let sql = insert_sql(
        &t("u"),
        &["id".to_string(), "v".to_string()],
        Some(&["id".to_string()]),
    );
    assert_eq!(
        sql,
        r#"INSERT INTO "u" ("id", "v") VALUES (?, ?) ON CONFLICT ("id") DO UPDATE SET "v" = EXCLUDED."v""#
    );
}

#[test]
fn test_insert_sql_keys_only() {
    let sql = insert_sql(&t("u"), &["id".to_string()], Some(&["id".to_string()]));
    assert!(sql.ends_with(r#"ON CONFLICT ("id") DO NOTHING"#));
}

#[test]
fn test_value_cell_date_roundtrip() {
    let day = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
    assert_eq!(value_to_cell(cell_to_value(&Cell::Date(day))), Cell::Date(day));
    let ts = day.and_hms_micro_opt(23, 59, 59, 500).unwrap();
    assert_eq!(
        value_to_cell(cell_to_value(&Cell::DateTime(ts))),
        Cell::DateTime(ts)
    );
}
