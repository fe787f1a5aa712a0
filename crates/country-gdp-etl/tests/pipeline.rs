use country_gdp_etl::config::EtlConfig;
use country_gdp_etl::storage::SqliteStore;
use country_gdp_etl::{run_pipeline, EtlError, RecordingProgress, Value};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GDP_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>GDP by Country</title></head>
<body>
  <h1>GDP by Country</h1>
  <table class="datatable">
    <thead>
      <tr>
        <th>#</th>
        <th>Country</th>
        <th>GDP
            (nominal, 2024)</th>
        <th>GDP
            (abbrev.)</th>
        <th>GDP Growth</th>
        <th>Population (2024)</th>
      </tr>
    </thead>
    <tbody>
      <tr><td>1</td><td>United States</td><td>$29,184,890,000,000</td><td>$29.185 trillion</td><td>2.80%</td><td>343,477,335</td></tr>
      <tr><td>2</td><td>China</td><td>$18,748,005,000,000</td><td>$18.748 trillion</td><td>4.98%</td><td>1,417,492,000</td></tr>
      <tr><td>3</td><td>Tuvalu</td><td>N/A</td><td>N/A</td><td>N/A</td><td>9,646</td></tr>
    </tbody>
  </table>
  <table><tr><th>Other</th></tr><tr><td>ignored</td></tr></table>
</body>
</html>"#;

async fn serve(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gdp/gdp-by-country/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;
    server
}

fn config(server: &MockServer, db_path: &Path) -> EtlConfig {
    EtlConfig {
        url: format!("{}/gdp/gdp-by-country/", server.uri()),
        db_path: db_path.to_path_buf(),
        timeout: Duration::from_secs(5),
        ..EtlConfig::default()
    }
}

#[tokio::test]
async fn test_full_run_writes_country_gdp() {
    let server = serve(GDP_PAGE).await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gdp_data.db");
    let sink = RecordingProgress::new();

    let summary = run_pipeline(&config(&server, &db_path), &sink).await.unwrap();
    assert_eq!(summary.rows_extracted, 3);
    assert_eq!(summary.rows_written, 3);

    let table = SqliteStore::open(&db_path)
        .unwrap()
        .read_table("country_gdp")
        .unwrap();
    assert_eq!(
        table.column_names(),
        vec![
            "#",
            "Country",
            "GDP_USD_2024",
            "GDP (abbrev.)",
            "GDP Growth",
            "Population (2024)",
        ]
    );
    assert_eq!(summary.columns, table.column_names());
    assert_eq!(
        table.column("GDP_USD_2024").unwrap().values,
        vec![
            Value::Real(29_184_890_000_000.0),
            Value::Real(18_748_005_000_000.0),
            Value::Null,
        ]
    );
    assert_eq!(
        table.column("Population (2024)").unwrap().values,
        vec![
            Value::Integer(343_477_335),
            Value::Integer(1_417_492_000),
            Value::Integer(9_646),
        ]
    );
    assert_eq!(
        table.column("GDP (abbrev.)").unwrap().values[2],
        Value::Null
    );

    let messages = sink.messages();
    assert_eq!(messages.first().unwrap(), &format!("Extracting data from {}/gdp/gdp-by-country/", server.uri()));
    assert!(messages.contains(&"Extraction complete: 3 rows retrieved".to_string()));
    assert!(messages.contains(&"Transform step complete".to_string()));
    assert!(messages.contains(&"Load complete".to_string()));
    assert_eq!(messages.last().unwrap(), "ETL pipeline finished successfully");
}

#[tokio::test]
async fn test_second_run_replaces_first() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gdp_data.db");

    let first = serve(GDP_PAGE).await;
    run_pipeline(&config(&first, &db_path), &RecordingProgress::new())
        .await
        .unwrap();

    let smaller = GDP_PAGE
        .replace("<tr><td>2</td><td>China</td><td>$18,748,005,000,000</td><td>$18.748 trillion</td><td>4.98%</td><td>1,417,492,000</td></tr>", "")
        .replace("<tr><td>3</td><td>Tuvalu</td><td>N/A</td><td>N/A</td><td>N/A</td><td>9,646</td></tr>", "");
    let second = serve(&smaller).await;
    let summary = run_pipeline(&config(&second, &db_path), &RecordingProgress::new())
        .await
        .unwrap();
    assert_eq!(summary.rows_written, 1);

    let table = SqliteStore::open(&db_path)
        .unwrap()
        .read_table("country_gdp")
        .unwrap();
    assert_eq!(table.row_count(), 1);
}

#[tokio::test]
async fn test_page_without_gdp_column_leaves_no_table() {
    let server = serve("<table><tr><th>Country</th><th>Capital</th></tr><tr><td>Chad</td><td>N'Djamena</td></tr></table>").await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gdp_data.db");

    let err = run_pipeline(&config(&server, &db_path), &RecordingProgress::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EtlError::Schema { .. }));
    assert!(!db_path.exists());
}

#[tokio::test]
async fn test_missing_page_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = run_pipeline(
        &config(&server, &dir.path().join("gdp_data.db")),
        &RecordingProgress::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EtlError::Network { .. }));
}
