//! Descriptor parsing and validation
//!
//! Descriptors are parsed into a generic [`serde_json::Value`] tree first
//! (YAML is re-serialized into JSON values), then walked by hand into typed
//! [`Application`]/[`Component`] values. This is deliberate: a serde
//! `#[serde(untagged)]` enum for `ComponentSource` would happily deserialize
//! but can only report "data did not match any variant" with no path, and
//! this schema needs `InvalidSchema` errors that name the offending field.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{DescriptorFormat, Error};
use crate::types::{AccessMode, Application, AuthConfig, BuildConfig, Component, ComponentSource};

/// Parse and validate a YAML descriptor.
pub fn from_yaml(bytes: &[u8]) -> Result<Application, Error> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_slice(bytes).map_err(|e| Error::InvalidSyntax {
            format: DescriptorFormat::Yaml,
            detail: e.to_string(),
        })?;
    let value = serde_json::to_value(yaml).map_err(|e| Error::InvalidSyntax {
        format: DescriptorFormat::Yaml,
        detail: e.to_string(),
    })?;
    application_from_value(&value)
}

/// Parse and validate a JSON descriptor.
pub fn from_json(bytes: &[u8]) -> Result<Application, Error> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| Error::InvalidSyntax {
        format: DescriptorFormat::Json,
        detail: e.to_string(),
    })?;
    application_from_value(&value)
}

fn schema_err(path: impl Into<String>, reason: impl Into<String>) -> Error {
    Error::InvalidSchema {
        path: path.into(),
        reason: reason.into(),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, Error> {
    value
        .as_object()
        .ok_or_else(|| schema_err(path, "expected an object"))
}

fn deny_unknown_fields(obj: &Map<String, Value>, known: &[&str], path: &str) -> Result<(), Error> {
    for key in obj.keys() {
        if !known.contains(&key.as_str()) {
            return Err(schema_err(path, format!("unknown field `{key}`")));
        }
    }
    Ok(())
}

fn get_str(obj: &Map<String, Value>, key: &str, path: &str) -> Result<String, Error> {
    obj.get(key)
        .ok_or_else(|| schema_err(path, format!("missing required field `{key}`")))?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| schema_err(format!("{path}.{key}"), "expected a string"))
}

fn get_opt_str(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>, Error> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_owned()))
            .ok_or_else(|| schema_err(format!("{path}.{key}"), "expected a string")),
    }
}

fn get_str_or(
    obj: &Map<String, Value>,
    key: &str,
    default: &str,
    path: &str,
) -> Result<String, Error> {
    Ok(get_opt_str(obj, key, path)?.unwrap_or_else(|| default.to_owned()))
}

fn get_str_map(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<HashMap<String, String>, Error> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(HashMap::new()),
        Some(Value::Object(map)) => {
            let field_path = format!("{path}.{key}");
            let mut out = HashMap::with_capacity(map.len());
            for (k, v) in map {
                let s = v
                    .as_str()
                    .ok_or_else(|| schema_err(format!("{field_path}.{k}"), "expected a string"))?;
                out.insert(k.clone(), s.to_owned());
            }
            Ok(out)
        }
        Some(_) => Err(schema_err(format!("{path}.{key}"), "expected an object")),
    }
}

fn get_str_list(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Vec<String>, Error> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let field_path = format!("{path}.{key}");
            items
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    v.as_str().map(str::to_owned).ok_or_else(|| {
                        schema_err(format!("{field_path}[{i}]"), "expected a string")
                    })
                })
                .collect()
        }
        Some(_) => Err(schema_err(format!("{path}.{key}"), "expected an array")),
    }
}

fn application_from_value(value: &Value) -> Result<Application, Error> {
    let root = as_object(value, "$")?;
    deny_unknown_fields(
        root,
        &[
            "name",
            "version",
            "description",
            "access",
            "auth",
            "components",
            "variables",
        ],
        "$",
    )?;

    let name = ftl_serde::NameId::parse(get_str(root, "name", "$")?)
        .map_err(|reason| schema_err("$.name", reason))?;
    let version = get_str_or(root, "version", Application::DEFAULT_VERSION, "$")?;
    semver::Version::parse(&version)
        .map_err(|e| schema_err("$.version", format!("not a valid semver version: {e}")))?;
    let description = get_opt_str(root, "description", "$")?;
    let access = match get_opt_str(root, "access", "$")? {
        None => AccessMode::default(),
        Some(s) => access_mode_from_str(&s).ok_or_else(|| {
            schema_err(
                "$.access",
                format!("must be one of public, private, org, custom; got `{s}`"),
            )
        })?,
    };

    let auth = match root.get("auth") {
        None | Some(Value::Null) => None,
        Some(v) => Some(auth_config_from_value(v, "$.auth")?),
    };

    let components = match root.get("components") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let mut seen = std::collections::HashSet::new();
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let path = format!("$.components[{i}]");
                let component = component_from_value(item, &path)?;
                if !seen.insert(component.id.clone()) {
                    return Err(schema_err(
                        format!("{path}.id"),
                        format!("duplicate component id `{}`", component.id),
                    ));
                }
                out.push(component);
            }
            out
        }
        Some(_) => return Err(schema_err("$.components", "expected an array")),
    };

    let variables = get_str_map(root, "variables", "$")?;

    let app = Application {
        name,
        version,
        description,
        access,
        auth,
        components,
        variables,
    };
    validate_access_auth(&app)?;
    Ok(app)
}

fn access_mode_from_str(s: &str) -> Option<AccessMode> {
    match s {
        "public" => Some(AccessMode::Public),
        "private" => Some(AccessMode::Private),
        "org" => Some(AccessMode::Org),
        "custom" => Some(AccessMode::Custom),
        _ => None,
    }
}

fn auth_config_from_value(value: &Value, path: &str) -> Result<AuthConfig, Error> {
    let obj = as_object(value, path)?;
    let provider = get_str(obj, "provider", path)?;
    match provider.as_str() {
        "workos" => {
            deny_unknown_fields(
                obj,
                &["provider", "org_id", "jwt_issuer", "jwt_audience"],
                path,
            )?;
            Ok(AuthConfig::Workos {
                org_id: get_str(obj, "org_id", path)?,
                jwt_issuer: get_str_or(obj, "jwt_issuer", AuthConfig::DEFAULT_WORKOS_ISSUER, path)?,
                jwt_audience: get_opt_str(obj, "jwt_audience", path)?,
            })
        }
        "custom" => {
            deny_unknown_fields(
                obj,
                &[
                    "provider",
                    "jwt_issuer",
                    "jwt_audience",
                    "jwt_jwks_uri",
                    "policy",
                    "policy_data",
                ],
                path,
            )?;
            Ok(AuthConfig::Custom {
                jwt_issuer: get_str(obj, "jwt_issuer", path)?,
                jwt_audience: get_str(obj, "jwt_audience", path)?,
                jwt_jwks_uri: get_opt_str(obj, "jwt_jwks_uri", path)?,
                policy: get_opt_str(obj, "policy", path)?,
                policy_data: obj.get("policy_data").cloned(),
            })
        }
        other => Err(schema_err(
            format!("{path}.provider"),
            format!("must be `workos` or `custom`; got `{other}`"),
        )),
    }
}

fn component_from_value(value: &Value, path: &str) -> Result<Component, Error> {
    let obj = as_object(value, path)?;
    deny_unknown_fields(obj, &["id", "source", "build", "variables"], path)?;

    let id = ftl_serde::NameId::parse(get_str(obj, "id", path)?)
        .map_err(|reason| schema_err(format!("{path}.id"), reason))?;

    let source_path = format!("{path}.source");
    let source_value = obj
        .get("source")
        .ok_or_else(|| schema_err(path, "missing required field `source`"))?;
    let source = component_source_from_value(source_value, &source_path)?;

    let build = match obj.get("build") {
        None | Some(Value::Null) => None,
        Some(v) => Some(build_config_from_value(v, &format!("{path}.build"))?),
    };
    if matches!(source, ComponentSource::Registry { .. }) && build.is_some() {
        return Err(schema_err(
            path,
            "a registry-sourced component must not have a `build` section",
        ));
    }

    let variables = get_str_map(obj, "variables", path)?;

    Ok(Component {
        id,
        source,
        build,
        variables,
    })
}

fn component_source_from_value(value: &Value, path: &str) -> Result<ComponentSource, Error> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(schema_err(path, "local source path must not be empty"));
            }
            Ok(ComponentSource::Local(trimmed.to_owned()))
        }
        Value::Object(obj) => {
            deny_unknown_fields(obj, &["registry", "package", "version"], path)?;
            let registry = get_str(obj, "registry", path)?;
            let package = get_str(obj, "package", path)?;
            let version = get_str(obj, "version", path)?;
            semver::Version::parse(version.trim_start_matches('v')).map_err(|e| {
                schema_err(format!("{path}.version"), format!("not a valid semver version: {e}"))
            })?;
            Ok(ComponentSource::Registry {
                registry,
                package,
                version,
            })
        }
        _ => Err(schema_err(
            path,
            "expected a local path string or a `{registry, package, version}` mapping",
        )),
    }
}

fn build_config_from_value(value: &Value, path: &str) -> Result<BuildConfig, Error> {
    let obj = as_object(value, path)?;
    deny_unknown_fields(obj, &["command", "workdir", "watch"], path)?;
    Ok(BuildConfig {
        command: get_opt_str(obj, "command", path)?,
        workdir: get_opt_str(obj, "workdir", path)?,
        watch: get_str_list(obj, "watch", path)?,
    })
}

fn validate_access_auth(app: &Application) -> Result<(), Error> {
    match (app.access, &app.auth) {
        (AccessMode::Public, Some(_)) => Err(Error::InconsistentAccess(
            "`access: public` must not specify `auth`".to_owned(),
        )),
        (AccessMode::Private, None) => Ok(()),
        (AccessMode::Private, Some(_)) => Ok(()),
        (AccessMode::Public, None) => Ok(()),
        (AccessMode::Org, Some(AuthConfig::Workos { .. })) => Ok(()),
        (AccessMode::Org, _) => Err(Error::InconsistentAccess(
            "`access: org` requires `auth.provider: workos`".to_owned(),
        )),
        (AccessMode::Custom, Some(AuthConfig::Custom { .. })) => Ok(()),
        (AccessMode::Custom, _) => Err(Error::InconsistentAccess(
            "`access: custom` requires `auth.provider: custom`".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: my-app
components:
  - id: tool1
    source: tool1.wasm
"#;

    #[test]
    fn parses_minimal_descriptor() {
        let app = from_yaml(MINIMAL.as_bytes()).unwrap();
        assert_eq!(app.name.as_ref(), "my-app");
        assert_eq!(app.version, Application::DEFAULT_VERSION);
        assert_eq!(app.access, AccessMode::Public);
        assert_eq!(app.components.len(), 1);
        assert_eq!(
            app.components[0].source,
            ComponentSource::Local("tool1.wasm".into())
        );
    }

    #[test]
    fn parses_registry_source() {
        let yaml = r#"
name: my-app
components:
  - id: tool1
    source:
      registry: ghcr.io
      package: acme/tool
      version: 1.2.3
"#;
        let app = from_yaml(yaml.as_bytes()).unwrap();
        match &app.components[0].source {
            ComponentSource::Registry {
                registry,
                package,
                version,
            } => {
                assert_eq!(registry, "ghcr.io");
                assert_eq!(package, "acme/tool");
                assert_eq!(version, "1.2.3");
            }
            other => panic!("expected Registry source, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_name() {
        let yaml = "name: Not_Valid\ncomponents: []\n";
        let err = from_yaml(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { path, .. } if path == "$.name"));
    }

    #[test]
    fn rejects_duplicate_component_ids() {
        let yaml = r#"
name: my-app
components:
  - id: tool1
    source: a.wasm
  - id: tool1
    source: b.wasm
"#;
        let err = from_yaml(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { path, .. } if path == "$.components[1].id"));
    }

    #[test]
    fn rejects_ambiguous_source_shape() {
        let yaml = r#"
name: my-app
components:
  - id: tool1
    source: 42
"#;
        let err = from_yaml(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { path, .. } if path == "$.components[0].source"));
    }

    #[test]
    fn rejects_custom_access_without_custom_auth() {
        let yaml = r#"
name: my-app
access: custom
components: []
"#;
        let err = from_yaml(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InconsistentAccess(_)));
    }

    #[test]
    fn rejects_registry_component_with_build() {
        let yaml = r#"
name: my-app
components:
  - id: tool1
    source:
      registry: ghcr.io
      package: acme/tool
      version: 1.0.0
    build:
      command: cargo build
"#;
        let err = from_yaml(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { .. }));
    }

    #[test]
    fn parses_custom_auth_with_inline_policy() {
        let yaml = r#"
name: my-app
access: custom
auth:
  provider: custom
  jwt_issuer: https://issuer.example.com
  jwt_audience: my-audience
  policy: "package authz\nallow = true"
components: []
"#;
        let app = from_yaml(yaml.as_bytes()).unwrap();
        match app.auth {
            Some(AuthConfig::Custom {
                jwt_issuer,
                jwt_audience,
                policy,
                ..
            }) => {
                assert_eq!(jwt_issuer, "https://issuer.example.com");
                assert_eq!(jwt_audience, "my-audience");
                assert!(policy.unwrap().contains("allow"));
            }
            other => panic!("expected Custom auth, got {other:?}"),
        }
    }

    #[test]
    fn rejects_custom_auth_missing_jwt_audience() {
        let yaml = r#"
name: my-app
access: custom
auth:
  provider: custom
  jwt_issuer: https://issuer.example.com
components: []
"#;
        let err = from_yaml(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { .. }));
    }

    #[test]
    fn rejects_unknown_top_level_field() {
        let yaml = "name: my-app\ncomponents: []\nbogus: 1\n";
        let err = from_yaml(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { path, .. } if path == "$"));
    }

    #[test]
    fn json_syntax_error_is_reported() {
        let err = from_json(b"{not json}").unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax { format: DescriptorFormat::Json, .. }));
    }
}
