use std::env;
use std::fs;
use std::io;
use std::path::Path;
use toml::Value;

// Generates `app_metadata.rs`, included by `libs::data_storage`, with one
// `APP_METADATA_<KEY>` constant per entry.
fn render_metadata(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("#[allow(unused)]\npub const APP_METADATA_{}: &str = {:?};\n", key.to_uppercase(), value))
        .collect()
}

fn package_metadata(manifest: &str) -> Vec<(String, String)> {
    let Ok(manifest) = toml::from_str::<Value>(manifest) else {
        return Vec::new();
    };

    manifest
        .get("package")
        .and_then(|package| package.get("metadata"))
        .and_then(Value::as_table)
        .map(|table| {
            table
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=Cargo.toml");

    let mut entries = vec![
        ("NAME".to_string(), env::var("CARGO_PKG_NAME").unwrap_or_else(|_| "keytally".to_string())),
        ("VERSION".to_string(), env::var("CARGO_PKG_VERSION").unwrap_or_default()),
    ];
    entries.extend(package_metadata(&fs::read_to_string("Cargo.toml")?));

    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    fs::write(Path::new(&out_dir).join("app_metadata.rs"), render_metadata(&entries))
}
