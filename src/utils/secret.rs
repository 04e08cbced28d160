use std::fs;

use tracing::error;

/// Reads a secret from the file named by `<NAME>_FILE` when that variable is
/// set, otherwise from `<NAME>` itself. Empty values count as missing.
pub fn read_secret<F>(name: &str, var: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match var(&format!("{name}_FILE")) {
        Some(secret_file_path) => match fs::read_to_string(&secret_file_path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(%secret_file_path, ?e, "Error reading secret file");
                return None;
            }
        },
        None => var(name)?,
    };

    (!value.is_empty()).then_some(value)
}
