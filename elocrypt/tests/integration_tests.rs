//! Integration tests for elocrypt read, write and export paths.

use elocrypt::prelude::*;
use elocrypt_derive::Encryptable;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::thread;

#[derive(Encryptable)]
#[allow(dead_code)]
struct User {
    name: String,
    #[encrypted]
    secret: String,
    #[encrypted(rename = "ssn")]
    social_security_number: String,
    #[encrypted]
    r#type: String,
}

fn crypt_with_key(key: &EncryptionKey) -> FieldCrypt<AeadCipher> {
    FieldCrypt::new(AeadCipher::new(key.clone(), CipherMode::default()))
}

fn test_crypt() -> FieldCrypt<AeadCipher> {
    crypt_with_key(&EncryptionKey::generate())
}

#[test]
fn test_derived_field_config() {
    assert_eq!(User::ENCRYPTED_FIELDS, &["secret", "ssn", "type"]);

    let config = FieldConfig::of::<User>();
    assert!(is_encryptable("secret", &config));
    assert!(is_encryptable("ssn", &config));
    assert!(is_encryptable("type", &config));
    assert!(!is_encryptable("name", &config));
    assert!(!is_encryptable("social_security_number", &config));
}

#[test]
fn test_worked_example() {
    let crypt = test_crypt();
    let config = FieldConfig::of::<User>();

    let stored = crypt.on_field_set("secret", json!("hello"), &config);
    let stored_str = stored.as_str().expect("stored value is a string");
    assert!(stored_str.starts_with("__ELOCRYPT__:"));
    assert!(stored_str.len() > TAG.len());
    assert_eq!(crypt.on_field_get("secret", stored, &config), json!("hello"));

    let stored = crypt.on_field_set("notconfigured", json!("hello"), &config);
    assert_eq!(stored, json!("hello"));
    assert_eq!(crypt.on_field_get("notconfigured", stored, &config), json!("hello"));
}

#[test]
fn test_end_to_end_with_key_file_settings() {
    let key = EncryptionKey::generate();
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create key file");
    writeln!(file, "{}", key.to_base64()).expect("Failed to write key");

    let environment = config::Environment::with_prefix("ELOCRYPT").source(Some(
        [("ELOCRYPT_CIPHER".to_string(), "aes-256-gcm".to_string())].into_iter().collect(),
    ));
    let settings = Settings::from_environment(environment)
        .expect("Failed to load settings")
        .with_key_file(file.path());
    let crypt = FieldCrypt::new(settings.build_cipher().expect("Failed to build cipher"));
    let config = FieldConfig::new(["email"]);

    let stored = crypt.on_field_set("email", json!("alice@example.com"), &config);
    assert!(is_tagged(&stored));

    // Same key loaded independently decrypts
    let reader = FieldCrypt::new(AeadCipher::new(key, CipherMode::Aes256Gcm));
    assert_eq!(reader.on_field_get("email", stored, &config), json!("alice@example.com"));
}

#[test]
fn test_bad_key_returns_tagged_value_and_is_observed() {
    let writer = test_crypt();
    let counter = Arc::new(FailureCounter::new());
    let reader = test_crypt().with_observer(counter.clone());
    let config = FieldConfig::new(["secret"]);

    let stored = writer.on_field_set("secret", json!("hello"), &config);
    let outcome = reader.decrypt_field("secret", stored.clone(), &config);

    assert!(outcome.is_fallback());
    assert!(matches!(outcome.error(), Some(Error::AuthenticationFailed)));
    assert_eq!(outcome.into_value(), stored);
    assert_eq!(counter.decrypt_failures(), 1);
}

#[test]
fn test_algorithm_mismatch_falls_back() {
    let key = EncryptionKey::generate();
    let writer = crypt_with_key(&key);
    let reader = FieldCrypt::new(AeadCipher::new(key, CipherMode::Aes256Gcm));
    let config = FieldConfig::new(["secret"]);

    let stored = writer.on_field_set("secret", json!("hello"), &config);
    let outcome = reader.decrypt_field("secret", stored.clone(), &config);
    assert!(matches!(outcome.error(), Some(Error::AlgorithmMismatch { .. })));
    assert_eq!(outcome.into_value(), stored);
}

#[test]
fn test_mixed_legacy_record_export() {
    let crypt = test_crypt();
    let config = FieldConfig::of::<User>();

    let mut stored = Record::new();
    stored.insert("name".into(), json!("Alice"));
    stored.insert("secret".into(), crypt.on_field_set("secret", json!("s3cret"), &config));
    stored.insert("ssn".into(), json!("123-45-6789"));
    stored.insert("type".into(), Value::Null);

    let exposed = crypt.on_fields_export(&stored, &config);
    assert_eq!(
        Value::Object(exposed),
        json!({ "name": "Alice", "secret": "s3cret", "ssn": "123-45-6789", "type": null })
    );
}

#[test]
fn test_concurrent_use() {
    let crypt = test_crypt();
    let config = Arc::new(FieldConfig::new(["secret"]));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let crypt = crypt.clone();
            let config = Arc::clone(&config);
            thread::spawn(move || {
                for j in 0..50 {
                    let value = json!(format!("value-{i}-{j}"));
                    let stored = crypt.on_field_set("secret", value.clone(), &config);
                    assert!(is_tagged(&stored));
                    assert_eq!(crypt.on_field_get("secret", stored, &config), value);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }
}

#[test]
fn test_record_decorator_with_derived_config() {
    let crypt = test_crypt();
    let mut user = EncryptedRecord::new(Record::new(), FieldConfig::of::<User>(), crypt);

    user.set("name", json!("Alice"));
    user.set("ssn", json!("123-45-6789"));

    assert_eq!(user.raw()["name"], json!("Alice"));
    assert!(is_tagged(&user.raw()["ssn"]));
    assert_eq!(
        Value::Object(user.to_exposed()),
        json!({ "name": "Alice", "ssn": "123-45-6789" })
    );
}

fn field_name() -> impl Strategy<Value = String> {
    prop_oneof![Just("secret".to_string()), "[a-z_]{1,12}"]
}

proptest! {
    #[test]
    fn prop_unconfigured_fields_are_identity(field in "[a-z_]{1,12}", value in ".*") {
        prop_assume!(field != "secret");
        let crypt = test_crypt();
        let config = FieldConfig::new(["secret"]);

        let set = crypt.on_field_set(&field, json!(value.clone()), &config);
        prop_assert_eq!(&set, &json!(value.clone()));
        let tagged = json!(format!("{TAG}{value}"));
        prop_assert_eq!(crypt.on_field_get(&field, tagged.clone(), &config), tagged);
    }

    #[test]
    fn prop_round_trip(field in field_name(), value in ".*") {
        prop_assume!(!value.starts_with(TAG));
        let crypt = test_crypt();
        let config = FieldConfig::new([field.clone()]);

        let stored = crypt.on_field_set(&field, json!(value.clone()), &config);
        prop_assert!(is_tagged(&stored));
        prop_assert_eq!(crypt.on_field_get(&field, stored, &config), json!(value));
    }

    #[test]
    fn prop_write_is_idempotent(value in ".*") {
        let crypt = test_crypt();
        let config = FieldConfig::new(["secret"]);

        let once = crypt.on_field_set("secret", json!(value), &config);
        let twice = crypt.on_field_set("secret", once.clone(), &config);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_legacy_values_pass_through(value in ".*") {
        prop_assume!(!value.starts_with(TAG));
        let crypt = test_crypt();
        let config = FieldConfig::new(["secret"]);

        prop_assert_eq!(crypt.on_field_get("secret", json!(value.clone()), &config), json!(value));
    }

    #[test]
    fn prop_export_matches_single_reads(
        entries in proptest::collection::vec((field_name(), ".{0,16}", any::<bool>()), 0..8)
    ) {
        let crypt = test_crypt();
        let config = FieldConfig::new(["secret", "b"]);

        let mut stored = Record::new();
        for (field, value, encrypt) in entries {
            let value = if encrypt {
                crypt.on_field_set(&field, json!(value), &config)
            } else {
                json!(value)
            };
            stored.insert(field, value);
        }

        let exposed = crypt.on_fields_export(&stored, &config);
        let stored_keys: Vec<&String> = stored.keys().collect();
        let exposed_keys: Vec<&String> = exposed.keys().collect();
        prop_assert_eq!(stored_keys, exposed_keys);
        for (field, value) in &stored {
            prop_assert_eq!(&exposed[field], &crypt.on_field_get(field, value.clone(), &config));
        }
    }
}
