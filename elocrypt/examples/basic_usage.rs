//! Basic usage example for `elocrypt`.

use elocrypt::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("elocrypt Basic Usage Example");
    println!("============================\n");

    // A real deployment reads ELOCRYPT_KEY through Settings::from_env()
    let key = EncryptionKey::generate();
    let cipher = AeadCipher::new(key, CipherMode::default());
    let failures = Arc::new(FailureCounter::new());
    let crypt = FieldCrypt::new(cipher).with_observer(failures.clone());
    println!("✓ FieldCrypt created with {}\n", crypt.cipher().mode());

    let config = FieldConfig::new(["email", "ssn"]);
    println!("Encrypted fields: {config}\n");

    // Host store that already holds a legacy plaintext value
    let mut store = Record::new();
    store.insert("ssn".into(), json!("123-45-6789"));

    let mut user = EncryptedRecord::new(store, config, crypt);
    user.set("name", json!("Alice"));
    user.set("email", json!("alice@example.com"));

    println!("Stored:");
    println!("{}\n", serde_json::to_string_pretty(user.raw())?);

    println!("Exposed:");
    println!("{}\n", serde_json::to_string_pretty(&user.to_exposed())?);

    assert_eq!(user.get("email"), Some(json!("alice@example.com")));
    assert_eq!(user.get("ssn"), Some(json!("123-45-6789")));
    println!("✓ Round-trip verification successful");
    println!(
        "✓ Fallbacks: {} encrypt, {} decrypt",
        failures.encrypt_failures(),
        failures.decrypt_failures()
    );

    Ok(())
}
