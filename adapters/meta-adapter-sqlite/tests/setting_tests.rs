//! Settings storage tests

use coursepub_meta_adapter_sqlite::MetaAdapterSqlite;
use coursepub_types::meta_adapter::MetaAdapter;
use serde_json::json;
use tempfile::TempDir;

async fn create_test_adapter() -> (MetaAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");
	(adapter, temp_dir)
}

#[tokio::test]
async fn test_setting_lifecycle() {
	let (adapter, _temp) = create_test_adapter().await;

	assert_eq!(adapter.read_setting("MAX_UPLOAD_SIZE").await.unwrap(), None);

	adapter.update_setting("MAX_UPLOAD_SIZE", Some(json!(1000))).await.unwrap();
	assert_eq!(adapter.read_setting("MAX_UPLOAD_SIZE").await.unwrap(), Some(json!(1000)));

	adapter.update_setting("MAX_UPLOAD_SIZE", Some(json!(2000))).await.unwrap();
	assert_eq!(adapter.read_setting("MAX_UPLOAD_SIZE").await.unwrap(), Some(json!(2000)));

	adapter.update_setting("MAX_UPLOAD_SIZE", None).await.unwrap();
	assert_eq!(adapter.read_setting("MAX_UPLOAD_SIZE").await.unwrap(), None);
}

#[tokio::test]
async fn test_list_settings_by_prefix() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter.update_setting("course.max_size", Some(json!(5))).await.unwrap();
	adapter.update_setting("course.public", Some(json!(true))).await.unwrap();
	adapter.update_setting("site.name", Some(json!("coursepub"))).await.unwrap();

	let all = adapter.list_settings(None).await.unwrap();
	assert_eq!(all.len(), 3);

	let course = adapter.list_settings(Some("course.")).await.unwrap();
	assert_eq!(course.len(), 2);
	assert_eq!(course.get("course.public"), Some(&json!(true)));
	assert!(!course.contains_key("site.name"));
}

#[tokio::test]
async fn test_settings_survive_reopen() {
	let temp_dir = TempDir::new().unwrap();
	{
		let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.unwrap();
		adapter.update_setting("site.name", Some(json!({"a": [1, 2]}))).await.unwrap();
	}
	let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.unwrap();
	assert_eq!(adapter.read_setting("site.name").await.unwrap(), Some(json!({"a": [1, 2]})));
}

// vim: ts=4
