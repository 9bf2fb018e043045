// ABOUTME: Variable definitions, pattern parsing, and the resolution state machine.
// ABOUTME: Resolution runs once per deployment, before any remote call is made.

use super::de;
use crate::prompt::{PromptError, PromptRequest, VariablePrompt};
use crate::random::random_hex;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Variable id synthesized for the application name of the run.
pub const APP_NAME_VAR: &str = "$$cap_appname";

/// Variable id synthesized for the platform's root domain.
pub const ROOT_DOMAIN_VAR: &str = "$$cap_root_domain";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid validation pattern for variable {id}: {reason}")]
    InvalidPattern { id: String, reason: PatternError },

    #[error("variable {0} is required")]
    Required(String),

    #[error("invalid value for variable {id}: {value:?}")]
    InvalidValue { id: String, value: String },

    #[error("prompt for variable {id} failed: {source}")]
    Prompt { id: String, source: PromptError },
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern does not compile: {0}")]
    Compile(#[from] regex::Error),
}

/// A variable's validation constraint, parsed once at template load.
#[derive(Debug, Clone, Default)]
pub enum ValidRegex {
    /// No `validRegex` on the definition: any value is accepted.
    #[default]
    Unconstrained,
    Pattern(Regex),
}

impl ValidRegex {
    /// Parse an optional `validRegex` value. Template authors write these as
    /// delimited regex literals (`/pattern/flags`); the delimiters and flags
    /// are structural and get stripped before compiling. An empty literal or
    /// a pattern that does not compile is fatal, whether or not any value
    /// ever needs to match it.
    pub fn parse(raw: Option<&str>) -> Result<Self, PatternError> {
        let raw = match raw {
            None => return Ok(ValidRegex::Unconstrained),
            Some(raw) => raw,
        };

        if raw.is_empty() {
            return Err(PatternError::Empty);
        }

        let source = strip_delimiters(raw);
        Ok(ValidRegex::Pattern(Regex::new(source)?))
    }

    /// Unanchored match; patterns that want full-string matching anchor
    /// themselves.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            ValidRegex::Unconstrained => true,
            ValidRegex::Pattern(regex) => regex.is_match(value),
        }
    }
}

/// Strip `/pattern/flags` delimiters. The literal form needs a leading slash
/// and a closing slash with at least one character between them; anything
/// else is taken as a bare pattern.
fn strip_delimiters(raw: &str) -> &str {
    if let Some(rest) = raw.strip_prefix('/') {
        if let Some(closing) = rest.rfind('/') {
            if closing >= 1 {
                return &rest[..closing];
            }
        }
    }
    raw
}

/// One variable as declared in the template's one-click manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    pub id: String,

    #[serde(default)]
    pub label: String,

    #[serde(default, deserialize_with = "de::scalar_string")]
    pub default_value: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub valid_regex: Option<String>,
}

/// The `caproverOneClickApp` section of a raw template, read before
/// substitution. Only the variable list matters to the orchestrator.
#[derive(Debug, Default, Deserialize)]
pub struct VariableManifest {
    #[serde(default)]
    variables: Vec<VariableDefinition>,
}

impl VariableManifest {
    pub fn parse(raw: &str) -> Result<Self, serde_yaml::Error> {
        #[derive(Deserialize)]
        struct RawManifest {
            #[serde(default, rename = "caproverOneClickApp")]
            one_click: Option<VariableManifest>,
        }

        let manifest: RawManifest = serde_yaml::from_str(raw)?;
        Ok(manifest.one_click.unwrap_or_default())
    }

    pub fn variables(&self) -> &[VariableDefinition] {
        &self.variables
    }
}

/// Final variable values for one deployment run. Iteration order is the
/// insertion order and is stable, which substitution depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedVariables {
    entries: Vec<(String, String)>,
}

impl ResolvedVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing in place if the id is already present so the
    /// original position in the iteration order is kept.
    pub fn set(&mut self, id: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == id) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((id.to_string(), value)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merges user-supplied values with template defaults and synthesized seeds,
/// validating each variable against its pattern.
pub struct VariableResolver<'a> {
    prompt: Option<&'a dyn VariablePrompt>,
    hex_source: fn(usize) -> String,
}

impl Default for VariableResolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> VariableResolver<'a> {
    pub fn new() -> Self {
        Self {
            prompt: None,
            hex_source: random_hex,
        }
    }

    /// Attach a prompt collaborator; missing or invalid values are then
    /// requested interactively before resolution fails.
    pub fn with_prompt(mut self, prompt: &'a dyn VariablePrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Override the randomness behind `$$cap_gen_random_hex(N)` defaults.
    /// Production uses OS entropy; tests pin this to a deterministic source.
    pub fn with_hex_source(mut self, hex_source: fn(usize) -> String) -> Self {
        self.hex_source = hex_source;
        self
    }

    /// Resolve all definitions, in definition order. `seeds` win over
    /// `user_supplied` for the same id; both participate in substitution even
    /// when no definition mentions them.
    pub async fn resolve(
        &self,
        definitions: &[VariableDefinition],
        user_supplied: &BTreeMap<String, String>,
        seeds: &ResolvedVariables,
    ) -> Result<ResolvedVariables, ValidationError> {
        let mut resolved = ResolvedVariables::new();
        for (id, value) in user_supplied {
            resolved.set(id, value.clone());
        }
        for (id, value) in seeds.iter() {
            resolved.set(id, value.to_string());
        }

        for definition in definitions {
            self.resolve_one(definition, &mut resolved).await?;
        }

        Ok(resolved)
    }

    async fn resolve_one(
        &self,
        definition: &VariableDefinition,
        resolved: &mut ResolvedVariables,
    ) -> Result<(), ValidationError> {
        let id = &definition.id;

        let pattern = ValidRegex::parse(definition.valid_regex.as_deref()).map_err(|reason| {
            ValidationError::InvalidPattern {
                id: id.clone(),
                reason,
            }
        })?;

        let mut default = definition.default_value.clone();
        if let Some(byte_count) = random_hex_directive(&default) {
            default = (self.hex_source)(byte_count);
        }

        // An empty string counts as absent throughout.
        let mut value = resolved
            .get(id)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if let Some(prompt) = self.prompt {
            if value.is_none() || !pattern.matches(&default) {
                let request = PromptRequest {
                    id,
                    label: &definition.label,
                    description: &definition.description,
                    default: &default,
                    pattern: &pattern,
                };
                let answer =
                    prompt
                        .ask(&request)
                        .await
                        .map_err(|source| ValidationError::Prompt {
                            id: id.clone(),
                            source,
                        })?;
                tracing::debug!(variable = %id, "prompt supplied a value");
                value = Some(answer);
            }
        }

        let accepted = match value {
            None if default.is_empty() => return Err(ValidationError::Required(id.clone())),
            None if pattern.matches(&default) => default,
            None => return Err(ValidationError::Required(id.clone())),
            Some(value) if pattern.matches(&value) => value,
            Some(value) => {
                return Err(ValidationError::InvalidValue {
                    id: id.clone(),
                    value,
                });
            }
        };

        resolved.set(id, accepted);
        Ok(())
    }
}

/// Recognize a `$$cap_gen_random_hex(N)` generator directive in a default
/// value; returns the byte count N.
fn random_hex_directive(default: &str) -> Option<usize> {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    let directive = DIRECTIVE
        .get_or_init(|| Regex::new(r"\$\$cap_gen_random_hex\((\d+)\)").expect("directive regex"));

    directive
        .captures(default)
        .and_then(|captures| captures[1].parse().ok())
}
