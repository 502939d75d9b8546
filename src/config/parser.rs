use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use crate::errors::AwdError;

use super::types::{AwdConfig, FieldPart, LOCATION_MARKERS};

pub async fn parse_config(path: &Path) -> Result<AwdConfig, AwdError> {
    if !path.exists() {
        return Err(AwdError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(AwdError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: AwdConfig = serde_yaml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Reject configurations the submission pipeline cannot act on.
pub fn validate(config: &AwdConfig) -> Result<(), AwdError> {
    if config.server.trim().is_empty() {
        return Err(AwdError::Config("Flag server address is empty".into()));
    }
    if config.submit.endpoint.trim().is_empty() {
        return Err(AwdError::Config("Submission endpoint is empty".into()));
    }

    let mut seen: HashSet<(&str, FieldPart)> = HashSet::new();
    for field in &config.submit.fields {
        if field.location.is_empty() {
            return Err(AwdError::Config(format!(
                "Field '{}' declares no location",
                field.name
            )));
        }
        if let Some(marker) = field.location.chars().find(|c| !LOCATION_MARKERS.contains(*c)) {
            return Err(AwdError::Config(format!(
                "Field '{}' has unknown location marker '{}'",
                field.name, marker
            )));
        }
        if !seen.insert((field.name.as_str(), field.part)) {
            return Err(AwdError::Config(format!(
                "Field '{}' is specified twice in the same part",
                field.name
            )));
        }
        if field.part == FieldPart::Base && field.value.is_none() {
            warn!(field = %field.name, "Base field has no default value and will never resolve");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldSpec, FlagSubmitConfig};

    fn minimal_config() -> AwdConfig {
        AwdConfig {
            server: "scoring.example.net".to_string(),
            submit: FlagSubmitConfig {
                endpoint: "/api/flag".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_minimal_config() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_server() {
        let mut config = minimal_config();
        config.server = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_location_marker() {
        let mut config = minimal_config();
        config.submit.fields.push(FieldSpec {
            name: "flag".to_string(),
            part: FieldPart::Once,
            location: "dx".to_string(),
            value: None,
        });
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("unknown location marker 'x'"));
    }

    #[test]
    fn test_validate_rejects_duplicate_field_in_same_part() {
        let mut config = minimal_config();
        for _ in 0..2 {
            config.submit.fields.push(FieldSpec {
                name: "token".to_string(),
                part: FieldPart::Base,
                location: "h".to_string(),
                value: Some("t".to_string()),
            });
        }
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_allows_same_name_across_parts() {
        let mut config = minimal_config();
        config.submit.fields.push(FieldSpec {
            name: "token".to_string(),
            part: FieldPart::Base,
            location: "h".to_string(),
            value: Some("t".to_string()),
        });
        config.submit.fields.push(FieldSpec {
            name: "token".to_string(),
            part: FieldPart::Once,
            location: "h".to_string(),
            value: None,
        });
        assert!(validate(&config).is_ok());
    }

    #[tokio::test]
    async fn test_parse_config_missing_file() {
        let err = parse_config(Path::new("/nonexistent/awd.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, AwdError::Config(_)));
    }

    #[tokio::test]
    async fn test_parse_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("awd.yaml");
        std::fs::write(
            &path,
            "server: scoring.example.net\nsubmit:\n  endpoint: /api/flag\n",
        )
        .unwrap();
        let config = parse_config(&path).await.unwrap();
        assert_eq!(config.server, "scoring.example.net");
    }
}
