use snapkit_core::db::open_db_in_memory;
use snapkit_core::model::confdb_schema::RuleAccess;
use snapkit_core::{ConfdbSchema, ConfdbSchemaStore, SqliteConfdbSchemaStore, StoreError};

const SCHEMAS_YAML: &str = r#"
- account-id: acct-1
  authority-id: acct-1
  name: network
  revision: 1
  timestamp: "2024-04-01T10:00:00Z"
  views:
    wifi-setup:
      rules:
        - request: ssid
          storage: wifi.ssid
          access: read-write
  body: '{"storage": {"schema": {"wifi": "any"}}}'
  sign-key-sha3-384: key-1
- account-id: acct-1
  name: network
  revision: 2
  timestamp: "2024-05-01T10:00:00Z"
  summary: Network settings
  views:
    wifi-setup:
      rules:
        - request: ssid
          storage: wifi.ssid
- account-id: acct-2
  name: audio
  timestamp: "2024-03-01T10:00:00Z"
  views:
    volume:
      rules:
        - storage: audio.volume
          content:
            - request: level
              storage: level
"#;

fn imported() -> Vec<ConfdbSchema> {
    serde_yaml::from_str(SCHEMAS_YAML).unwrap()
}

#[test]
fn inserted_schemas_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfdbSchemaStore::new(&conn);
    let schemas = imported();
    for schema in &schemas {
        store.insert_confdb_schema(schema).unwrap();
    }

    let loaded = store.get_confdb_schemas(None).unwrap();

    assert_eq!(loaded, vec![schemas[2].clone(), schemas[1].clone(), schemas[0].clone()]);
    assert_eq!(loaded[0].revision, 0);
    assert_eq!(
        loaded[2].views["wifi-setup"].rules[0].access,
        Some(RuleAccess::ReadWrite)
    );
    assert_eq!(loaded[2].revision_date(), "2024-04-01");
}

#[test]
fn name_filter_returns_newest_revision_first() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfdbSchemaStore::new(&conn);
    for schema in imported() {
        store.insert_confdb_schema(&schema).unwrap();
    }

    let network = store.get_confdb_schemas(Some("network")).unwrap();
    let revisions: Vec<u32> = network.iter().map(|schema| schema.revision).collect();

    assert_eq!(revisions, vec![2, 1]);
    assert!(store.get_confdb_schemas(Some("absent")).unwrap().is_empty());
}

#[test]
fn reinserting_same_revision_replaces_it() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfdbSchemaStore::new(&conn);
    let mut schema = imported().remove(0);
    store.insert_confdb_schema(&schema).unwrap();

    schema.summary = Some("updated".to_string());
    store.insert_confdb_schema(&schema).unwrap();

    let loaded = store.get_confdb_schemas(Some("network")).unwrap();
    assert_eq!(loaded, vec![schema]);
}

#[test]
fn corrupt_views_are_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO confdb_schemas (account_id, name, revision, timestamp, views_json)
         VALUES ('acct-1', 'broken', 0, '2024-01-01T00:00:00Z', 'not json');",
        [],
    )
    .unwrap();

    let err = SqliteConfdbSchemaStore::new(&conn)
        .get_confdb_schemas(None)
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidData(ref message) if message.contains("broken")));
}
