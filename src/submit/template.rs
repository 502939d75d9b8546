use std::collections::HashMap;

use crate::config::{AwdConfig, FieldPart, FieldSpec, HttpMethod};

/// Fully resolved flag submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagInfo {
    pub endpoint: String,
    pub data: Option<HashMap<String, String>>,
    pub headers: Option<HashMap<String, String>>,
    pub params: Option<HashMap<String, String>>,
    pub method: HttpMethod,
    pub use_form: bool,
    pub subject: String,
}

/// Caller-supplied replacement for one field, applied only in the
/// locations its tag string names.
#[derive(Debug, Clone)]
pub struct FieldOverride {
    pub value: String,
    pub location: String,
}

impl FieldOverride {
    pub fn new(value: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            location: location.into(),
        }
    }

    fn targets(&self, marker: char) -> bool {
        self.location.contains(marker)
    }
}

#[derive(Default)]
struct Slot {
    base: Option<String>,
    once: Option<String>,
}

/// Merge the template layers into one submission descriptor.
///
/// Precedence per field and location: override > once > base. A field that
/// resolves to nothing is omitted, and a map nobody resolved into stays
/// `None`, since downstream callers distinguish absent from empty.
pub fn build_flag_info(
    config: &AwdConfig,
    subject: &str,
    flag: &str,
    overrides: Option<&HashMap<String, FieldOverride>>,
) -> FlagInfo {
    let mut slots: HashMap<(String, char), Slot> = HashMap::new();
    for field in &config.submit.fields {
        let value = resolve_value(config, field, subject, flag);
        for marker in field.location.chars() {
            let slot = slots.entry((field.name.clone(), marker)).or_default();
            match field.part {
                FieldPart::Base => slot.base = value.clone(),
                FieldPart::Once => slot.once = value.clone(),
            }
        }
    }

    let mut headers: HashMap<String, String> = HashMap::new();
    let mut data: HashMap<String, String> = HashMap::new();
    let mut params: HashMap<String, String> = HashMap::new();
    for ((name, marker), slot) in slots {
        let overridden = overrides
            .and_then(|o| o.get(&name))
            .filter(|o| o.targets(marker))
            .map(|o| o.value.clone());
        let Some(value) = overridden.or(slot.once).or(slot.base) else {
            continue;
        };
        match marker {
            'h' => headers.insert(name, value),
            'd' => data.insert(name, value),
            'p' => params.insert(name, value),
            _ => None,
        };
    }

    FlagInfo {
        endpoint: config.submit.endpoint.clone(),
        data: none_if_empty(data),
        headers: none_if_empty(headers),
        params: none_if_empty(params),
        method: config.submit.method,
        use_form: config.submit.use_form,
        subject: subject.to_string(),
    }
}

/// Value a field contributes before overrides: `base` fields carry their
/// static default; `once` fields named `flag` carry the harvested flag and
/// the rest come from the subject's own entry.
fn resolve_value(config: &AwdConfig, field: &FieldSpec, subject: &str, flag: &str) -> Option<String> {
    match field.part {
        FieldPart::Base => field.value.clone(),
        FieldPart::Once => {
            if field.name == "flag" {
                Some(flag.to_string())
            } else {
                config
                    .subjects
                    .get(subject)
                    .and_then(|entry| entry.fields.get(&field.name).cloned())
            }
        }
    }
}

fn none_if_empty(map: HashMap<String, String>) -> Option<HashMap<String, String>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlagSubmitConfig, SubjectEntry};

    fn config_with_fields(fields: Vec<FieldSpec>) -> AwdConfig {
        AwdConfig {
            server: "scoring.example.net".to_string(),
            submit: FlagSubmitConfig {
                endpoint: "/api/flag".to_string(),
                fields,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn field(name: &str, part: FieldPart, location: &str, value: Option<&str>) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            part,
            location: location.to_string(),
            value: value.map(String::from),
        }
    }

    #[test]
    fn test_flag_field_takes_harvested_flag() {
        let config = config_with_fields(vec![field("flag", FieldPart::Once, "d", None)]);
        let info = build_flag_info(&config, "web", "flag{x}", None);
        assert_eq!(info.data.unwrap()["flag"], "flag{x}");
        assert_eq!(info.headers, None);
        assert_eq!(info.params, None);
        assert_eq!(info.subject, "web");
    }

    #[test]
    fn test_once_field_reads_subject_entry() {
        let mut config = config_with_fields(vec![field("round", FieldPart::Once, "p", None)]);
        let mut fields = HashMap::new();
        fields.insert("round".to_string(), "3".to_string());
        config.subjects.insert("web".to_string(), SubjectEntry { fields });

        let info = build_flag_info(&config, "web", "flag{x}", None);
        assert_eq!(info.params.unwrap()["round"], "3");
    }

    #[test]
    fn test_precedence_override_then_once_then_base() {
        let mut config = config_with_fields(vec![
            field("token", FieldPart::Base, "h", Some("x")),
            field("token", FieldPart::Once, "h", None),
        ]);
        let mut fields = HashMap::new();
        fields.insert("token".to_string(), "y".to_string());
        config.subjects.insert("web".to_string(), SubjectEntry { fields });

        let mut overrides = HashMap::new();
        overrides.insert("token".to_string(), FieldOverride::new("z", "h"));
        let info = build_flag_info(&config, "web", "", Some(&overrides));
        assert_eq!(info.headers.unwrap()["token"], "z");

        let info = build_flag_info(&config, "web", "", None);
        assert_eq!(info.headers.unwrap()["token"], "y");

        config.subjects.clear();
        let info = build_flag_info(&config, "web", "", None);
        assert_eq!(info.headers.unwrap()["token"], "x");
    }

    #[test]
    fn test_declaration_order_does_not_beat_once() {
        // Field declaration order is irrelevant to precedence.
        let mut config = config_with_fields(vec![
            field("token", FieldPart::Once, "h", None),
            field("token", FieldPart::Base, "h", Some("x")),
        ]);
        let mut fields = HashMap::new();
        fields.insert("token".to_string(), "y".to_string());
        config.subjects.insert("web".to_string(), SubjectEntry { fields });

        let info = build_flag_info(&config, "web", "", None);
        assert_eq!(info.headers.unwrap()["token"], "y");
    }

    #[test]
    fn test_override_only_applies_in_targeted_locations() {
        let config = config_with_fields(vec![field("flag", FieldPart::Once, "dp", None)]);
        let mut overrides = HashMap::new();
        overrides.insert("flag".to_string(), FieldOverride::new("other", "p"));

        let info = build_flag_info(&config, "web", "flag{x}", Some(&overrides));
        assert_eq!(info.data.unwrap()["flag"], "flag{x}");
        assert_eq!(info.params.unwrap()["flag"], "other");
    }

    #[test]
    fn test_unresolved_field_is_omitted_not_empty() {
        let config = config_with_fields(vec![
            field("flag", FieldPart::Once, "d", None),
            field("missing", FieldPart::Once, "h", None),
        ]);
        let info = build_flag_info(&config, "web", "flag{x}", None);
        assert!(info.data.is_some());
        // Nothing resolved into headers, so the map is absent entirely.
        assert_eq!(info.headers, None);
    }

    #[test]
    fn test_field_contributes_to_every_tagged_location() {
        let config = config_with_fields(vec![field("flag", FieldPart::Once, "hdp", None)]);
        let info = build_flag_info(&config, "web", "flag{x}", None);
        assert_eq!(info.headers.unwrap()["flag"], "flag{x}");
        assert_eq!(info.data.unwrap()["flag"], "flag{x}");
        assert_eq!(info.params.unwrap()["flag"], "flag{x}");
    }

    #[test]
    fn test_endpoint_and_method_come_from_template() {
        let mut config = config_with_fields(Vec::new());
        config.submit.method = HttpMethod::Get;
        let info = build_flag_info(&config, "web", "", None);
        assert_eq!(info.endpoint, "/api/flag");
        assert_eq!(info.method, HttpMethod::Get);
        assert!(!info.use_form);
    }
}
