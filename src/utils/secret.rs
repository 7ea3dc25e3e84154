use std::fs;

use tracing::error;

/// Reads a secret either from the file named by `file_var_name` or directly
/// from `var_name`, using `lookup` to resolve variables.
///
/// The file variant wins when both are set. File contents are trimmed.
pub fn get_secret<F>(lookup: &F, file_var_name: &str, var_name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret_file_path) = lookup(file_var_name) {
        match fs::read_to_string(&secret_file_path) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) => {
                error!(%secret_file_path, ?e, "Error reading secret file");
                None
            }
        }
    } else {
        lookup(var_name).filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn reads_plain_variable_when_no_file_is_configured() {
        let vars = HashMap::from([("ADMIN_JWT_SECRET", "plain")]);
        let lookup = |k: &str| vars.get(k).map(|v| v.to_string());
        assert_eq!(
            get_secret(&lookup, "ADMIN_JWT_SECRET_FILE", "ADMIN_JWT_SECRET").as_deref(),
            Some("plain")
        );
    }

    #[test]
    fn file_variant_takes_precedence() {
        let path = std::env::temp_dir().join(format!("reco-secret-{}", uuid::Uuid::new_v4()));
        fs::write(&path, "from-file\n").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let vars = HashMap::from([
            ("ADMIN_JWT_SECRET", "plain".to_string()),
            ("ADMIN_JWT_SECRET_FILE", path_str),
        ]);
        let lookup = |k: &str| vars.get(k).cloned();
        assert_eq!(
            get_secret(&lookup, "ADMIN_JWT_SECRET_FILE", "ADMIN_JWT_SECRET").as_deref(),
            Some("from-file")
        );

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn unreadable_file_yields_none() {
        let vars = HashMap::from([("S_FILE", "/nonexistent/reco/secret")]);
        let lookup = |k: &str| vars.get(k).map(|v| v.to_string());
        assert!(get_secret(&lookup, "S_FILE", "S").is_none());
    }
}
