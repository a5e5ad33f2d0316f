//! Transpiler (`.babelrc`) configuration.
//!
//! The file is kept as an untyped JSON object: the build only touches a
//! handful of keys and passes the rest through to the transpiler loader.
use serde_json::{Map, Value, json};

use super::browserslist::TargetList;

/// Preset whose options receive the target environments.
pub const ENV_PRESET: &str = "@babel/preset-env";

/// A parsed `.babelrc` object.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct TranspilerConfig(Map<String, Value>);

/// Why [`TranspilerConfig::prepare`] could not finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// `presets` is present but is not a list.
    PresetsNotAList,
    /// No [`ENV_PRESET`] entry exists.
    MissingEnvPreset,
}

impl TranspilerConfig {
    /// Parse `.babelrc` text.
    ///
    /// # Errors
    ///
    /// Returns the parser message if the text is not JSON or not an object.
    pub fn parse(text: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(text).map_err(|e| e.to_string())? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err("expected a JSON object at the top level".to_string()),
        }
    }

    /// Apply the per-build mutation.
    ///
    /// Forces `babelrc: false` so the loader does not look the file up a
    /// second time, enables the loader cache, and points the environment
    /// preset at `targets` with module transformation left to the bundler.
    /// A bare `"@babel/preset-env"` string is promoted to the
    /// `[name, options]` form.
    ///
    /// # Errors
    ///
    /// Returns a [`PrepareError`] if the preset list is malformed or the
    /// environment preset is absent.
    pub fn prepare(mut self, targets: &TargetList) -> Result<Self, PrepareError> {
        self.0.insert("babelrc".to_string(), Value::Bool(false));
        self.0.insert("cacheDirectory".to_string(), Value::Bool(true));

        let presets = match self.0.get_mut("presets") {
            Some(Value::Array(presets)) => presets,
            Some(_) => return Err(PrepareError::PresetsNotAList),
            None => return Err(PrepareError::MissingEnvPreset),
        };

        let options = presets
            .iter_mut()
            .find_map(env_preset_options)
            .ok_or(PrepareError::MissingEnvPreset)?;
        options.insert("modules".to_string(), Value::Bool(false));
        options.insert("targets".to_string(), json!({ "browsers": targets }));

        Ok(self)
    }

    /// Options object of the environment preset, if present.
    #[must_use]
    pub fn env_options(&self) -> Option<&Map<String, Value>> {
        self.0
            .get("presets")?
            .as_array()?
            .iter()
            .find_map(|preset| match preset.as_array()?.as_slice() {
                [Value::String(name), Value::Object(options), ..] if name == ENV_PRESET => {
                    Some(options)
                }
                _ => None,
            })
    }

    /// Look up a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Normalise one preset entry and return its options if it is the
/// environment preset.
fn env_preset_options(preset: &mut Value) -> Option<&mut Map<String, Value>> {
    if preset.as_str() == Some(ENV_PRESET) {
        *preset = json!([ENV_PRESET, {}]);
    }
    let entry = preset.as_array_mut()?;
    if entry.first().and_then(Value::as_str) != Some(ENV_PRESET) {
        return None;
    }
    if entry.len() < 2 {
        entry.push(json!({}));
    }
    let options = entry.get_mut(1)?;
    if !options.is_object() {
        *options = json!({});
    }
    options.as_object_mut()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn targets() -> TargetList {
        TargetList::from(vec!["> 1%".to_string(), "not dead".to_string()])
    }

    #[test]
    fn prepare_forces_babelrc_off() {
        let config = TranspilerConfig::parse(
            r#"{"babelrc": true, "presets": [["@babel/preset-env", {}]]}"#,
        )
        .unwrap()
        .prepare(&targets())
        .unwrap();
        assert_eq!(config.get("babelrc"), Some(&Value::Bool(false)));
        assert_eq!(config.get("cacheDirectory"), Some(&Value::Bool(true)));
    }

    #[test]
    fn prepare_injects_targets_verbatim() {
        let config = TranspilerConfig::parse(
            r#"{"presets": [["@babel/preset-env", {"useBuiltIns": "usage", "modules": "commonjs"}], "@babel/preset-react"]}"#,
        )
        .unwrap()
        .prepare(&targets())
        .unwrap();
        let env = config.env_options().unwrap();
        assert_eq!(env["modules"], Value::Bool(false));
        assert_eq!(env["targets"], json!({ "browsers": ["> 1%", "not dead"] }));
        assert_eq!(env["useBuiltIns"], json!("usage"));
    }

    #[test]
    fn prepare_promotes_bare_preset_name() {
        let config = TranspilerConfig::parse(r#"{"presets": ["@babel/preset-env"]}"#)
            .unwrap()
            .prepare(&targets())
            .unwrap();
        assert_eq!(
            config.get("presets").unwrap()[0][0],
            json!("@babel/preset-env")
        );
        assert!(config.env_options().unwrap().contains_key("targets"));
    }

    #[test]
    fn prepare_without_env_preset_fails() {
        let err = TranspilerConfig::parse(r#"{"presets": ["@babel/preset-react"]}"#)
            .unwrap()
            .prepare(&targets())
            .unwrap_err();
        assert_eq!(err, PrepareError::MissingEnvPreset);
    }

    #[test]
    fn prepare_rejects_non_list_presets() {
        let err = TranspilerConfig::parse(r#"{"presets": "@babel/preset-env"}"#)
            .unwrap()
            .prepare(&targets())
            .unwrap_err();
        assert_eq!(err, PrepareError::PresetsNotAList);
    }

    #[test]
    fn parse_rejects_non_object() {
        assert!(TranspilerConfig::parse("[1, 2]").is_err());
        assert!(TranspilerConfig::parse("{ nope").is_err());
    }
}
