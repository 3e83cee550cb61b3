use std::io::Write;

use tempfile::NamedTempFile;

/// Minimal valid configuration pointing at a local database.
pub const MINIMAL: &str = r#"
[database]
host = "127.0.0.1"
dbname = "app"
user = "app"
max_size = 8
idle_timeout_secs = 180

[scope]
application_label = "app-*"
"#;

pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("poolwarden-config-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}
