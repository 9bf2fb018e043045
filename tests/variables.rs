// ABOUTME: Integration tests for variable definitions, patterns, and resolution.
// ABOUTME: Covers the decision table between user values, defaults, and generators.

use caravel::template::{
    APP_NAME_VAR, ROOT_DOMAIN_VAR, ResolvedVariables, ValidRegex, ValidationError,
    VariableDefinition, VariableManifest, VariableResolver,
};
use std::collections::BTreeMap;

fn definition(id: &str, default: &str, valid_regex: Option<&str>) -> VariableDefinition {
    serde_yaml::from_str(&format!(
        "id: {id:?}\nlabel: {id:?}\ndefaultValue: {default:?}\n{}",
        match valid_regex {
            Some(re) => format!("validRegex: {re:?}\n"),
            None => String::new(),
        }
    ))
    .unwrap()
}

fn pinned_hex(byte_count: usize) -> String {
    "ab".repeat(byte_count)
}

mod patterns {
    use super::*;

    #[test]
    fn absent_pattern_accepts_anything() {
        let pattern = ValidRegex::parse(None).unwrap();
        assert!(pattern.matches(""));
        assert!(pattern.matches("anything at all"));
    }

    #[test]
    fn delimited_literal_is_stripped() {
        let pattern = ValidRegex::parse(Some("/^[a-z]+$/")).unwrap();
        assert!(pattern.matches("abc"));
        assert!(!pattern.matches("abc1"));
    }

    #[test]
    fn delimited_literal_with_flags_is_stripped() {
        let pattern = ValidRegex::parse(Some("/^[0-9]{4}$/g")).unwrap();
        assert!(pattern.matches("1234"));
        assert!(!pattern.matches("123"));
    }

    #[test]
    fn bare_pattern_is_used_as_is() {
        let pattern = ValidRegex::parse(Some("^[a-z]+$")).unwrap();
        assert!(pattern.matches("abc"));
        assert!(!pattern.matches("ABC"));
    }

    #[test]
    fn match_is_unanchored() {
        let pattern = ValidRegex::parse(Some("/[0-9]+/")).unwrap();
        assert!(pattern.matches("v123-x"));
    }

    #[test]
    fn empty_pattern_is_fatal() {
        assert!(ValidRegex::parse(Some("")).is_err());
    }

    #[test]
    fn malformed_pattern_is_fatal() {
        assert!(ValidRegex::parse(Some("/[unclosed/")).is_err());
    }

    #[test]
    fn lone_slash_is_a_bare_pattern() {
        // "/" has no closing delimiter with content between; taken literally.
        let pattern = ValidRegex::parse(Some("/")).unwrap();
        assert!(pattern.matches("a/b"));
        assert!(!pattern.matches("ab"));
    }
}

mod manifest {
    use super::*;

    #[test]
    fn parses_variable_list() {
        let yaml = r#"
captainVersion: 4
caproverOneClickApp:
  variables:
    - id: $$cap_db_pass
      label: Database Password
      defaultValue: $$cap_gen_random_hex(16)
    - id: $$cap_version
      label: Version
      defaultValue: "5.7"
      validRegex: /^([^\s^\/])+$/
"#;
        let manifest = VariableManifest::parse(yaml).unwrap();
        assert_eq!(manifest.variables().len(), 2);
        assert_eq!(manifest.variables()[0].id, "$$cap_db_pass");
        assert_eq!(manifest.variables()[1].default_value, "5.7");
    }

    #[test]
    fn missing_one_click_section_means_no_variables() {
        let manifest = VariableManifest::parse("services: {}\n").unwrap();
        assert!(manifest.variables().is_empty());
    }

    #[test]
    fn numeric_default_is_read_as_text() {
        let yaml = r#"
caproverOneClickApp:
  variables:
    - id: $$cap_port
      defaultValue: 8080
"#;
        let manifest = VariableManifest::parse(yaml).unwrap();
        assert_eq!(manifest.variables()[0].default_value, "8080");
    }
}

mod resolution {
    use super::*;

    #[tokio::test]
    async fn user_value_matching_pattern_is_accepted() {
        let definitions = vec![definition("$$cap_version", "5.7", Some("/^[0-9.]+$/"))];
        let user = BTreeMap::from([("$$cap_version".to_string(), "8.0".to_string())]);

        let resolved = VariableResolver::new()
            .resolve(&definitions, &user, &ResolvedVariables::new())
            .await
            .unwrap();

        assert_eq!(resolved.get("$$cap_version"), Some("8.0"));
    }

    #[tokio::test]
    async fn user_value_failing_pattern_is_rejected() {
        let definitions = vec![definition("$$cap_version", "5.7", Some("/^[0-9.]+$/"))];
        let user = BTreeMap::from([("$$cap_version".to_string(), "latest!".to_string())]);

        let err = VariableResolver::new()
            .resolve(&definitions, &user, &ResolvedVariables::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[tokio::test]
    async fn missing_value_falls_back_to_default() {
        let definitions = vec![definition("$$cap_version", "5.7", Some("/^[0-9.]+$/"))];

        let resolved = VariableResolver::new()
            .resolve(&definitions, &BTreeMap::new(), &ResolvedVariables::new())
            .await
            .unwrap();

        assert_eq!(resolved.get("$$cap_version"), Some("5.7"));
    }

    #[tokio::test]
    async fn missing_value_with_no_default_is_required() {
        let definitions = vec![definition("$$cap_pass", "", None)];

        let err = VariableResolver::new()
            .resolve(&definitions, &BTreeMap::new(), &ResolvedVariables::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::Required(id) if id == "$$cap_pass"));
    }

    #[tokio::test]
    async fn empty_user_value_counts_as_absent() {
        let definitions = vec![definition("$$cap_version", "5.7", None)];
        let user = BTreeMap::from([("$$cap_version".to_string(), String::new())]);

        let resolved = VariableResolver::new()
            .resolve(&definitions, &user, &ResolvedVariables::new())
            .await
            .unwrap();

        assert_eq!(resolved.get("$$cap_version"), Some("5.7"));
    }

    #[tokio::test]
    async fn random_hex_directive_generates_default() {
        let definitions = vec![definition(
            "$$cap_db_pass",
            "$$cap_gen_random_hex(16)",
            None,
        )];

        let resolved = VariableResolver::new()
            .with_hex_source(pinned_hex)
            .resolve(&definitions, &BTreeMap::new(), &ResolvedVariables::new())
            .await
            .unwrap();

        assert_eq!(resolved.get("$$cap_db_pass"), Some("ab".repeat(16).as_str()));
    }

    #[tokio::test]
    async fn user_value_wins_over_generator_default() {
        let definitions = vec![definition(
            "$$cap_db_pass",
            "$$cap_gen_random_hex(16)",
            None,
        )];
        let user = BTreeMap::from([("$$cap_db_pass".to_string(), "hunter2".to_string())]);

        let resolved = VariableResolver::new()
            .with_hex_source(pinned_hex)
            .resolve(&definitions, &user, &ResolvedVariables::new())
            .await
            .unwrap();

        assert_eq!(resolved.get("$$cap_db_pass"), Some("hunter2"));
    }

    #[tokio::test]
    async fn seeds_win_over_user_values() {
        let mut seeds = ResolvedVariables::new();
        seeds.set(APP_NAME_VAR, "prod-wordpress".to_string());
        seeds.set(ROOT_DOMAIN_VAR, "apps.example.com".to_string());

        let user = BTreeMap::from([(APP_NAME_VAR.to_string(), "spoofed".to_string())]);

        let resolved = VariableResolver::new()
            .resolve(&[], &user, &seeds)
            .await
            .unwrap();

        assert_eq!(resolved.get(APP_NAME_VAR), Some("prod-wordpress"));
        assert_eq!(resolved.get(ROOT_DOMAIN_VAR), Some("apps.example.com"));
    }

    #[tokio::test]
    async fn undeclared_user_values_still_participate() {
        let user = BTreeMap::from([("$$cap_extra".to_string(), "kept".to_string())]);

        let resolved = VariableResolver::new()
            .resolve(&[], &user, &ResolvedVariables::new())
            .await
            .unwrap();

        assert_eq!(resolved.get("$$cap_extra"), Some("kept"));
    }

    #[tokio::test]
    async fn invalid_pattern_fails_even_with_valid_user_value() {
        let definitions = vec![definition("$$cap_version", "5.7", Some(""))];
        let user = BTreeMap::from([("$$cap_version".to_string(), "8.0".to_string())]);

        let err = VariableResolver::new()
            .resolve(&definitions, &user, &ResolvedVariables::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn resolution_order_follows_insertion() {
        let definitions = vec![
            definition("$$cap_first", "one", None),
            definition("$$cap_second", "two", None),
        ];
        let mut seeds = ResolvedVariables::new();
        seeds.set(APP_NAME_VAR, "ns-app".to_string());

        let resolved = VariableResolver::new()
            .resolve(&definitions, &BTreeMap::new(), &seeds)
            .await
            .unwrap();

        let order: Vec<&str> = resolved.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![APP_NAME_VAR, "$$cap_first", "$$cap_second"]);
    }
}

mod randomness {
    use caravel::random::random_hex;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hex_output_has_the_right_shape(byte_count in 0usize..64) {
            let hex = random_hex(byte_count);
            prop_assert_eq!(hex.len(), byte_count * 2);
            prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn outputs_are_not_replayed() {
        assert_ne!(random_hex(16), random_hex(16));
    }
}

mod prompting {
    use super::*;
    use async_trait::async_trait;
    use caravel::prompt::{PromptError, PromptRequest, VariablePrompt};
    use std::sync::Mutex;

    struct ScriptedPrompt {
        answers: Mutex<Vec<String>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedPrompt {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().rev().map(|s| s.to_string()).collect()),
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VariablePrompt for ScriptedPrompt {
        async fn ask(&self, request: &PromptRequest<'_>) -> Result<String, PromptError> {
            self.asked.lock().unwrap().push(request.id.to_string());
            self.answers
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| PromptError::Closed(request.id.to_string()))
        }
    }

    #[tokio::test]
    async fn prompt_fills_missing_value() {
        let definitions = vec![definition("$$cap_pass", "", None)];
        let prompt = ScriptedPrompt::new(&["secret"]);

        let resolved = VariableResolver::new()
            .with_prompt(&prompt)
            .resolve(&definitions, &BTreeMap::new(), &ResolvedVariables::new())
            .await
            .unwrap();

        assert_eq!(resolved.get("$$cap_pass"), Some("secret"));
        assert_eq!(*prompt.asked.lock().unwrap(), vec!["$$cap_pass"]);
    }

    #[tokio::test]
    async fn prompt_is_skipped_when_value_present_and_default_valid() {
        let definitions = vec![definition("$$cap_version", "5.7", Some("/^[0-9.]+$/"))];
        let user = BTreeMap::from([("$$cap_version".to_string(), "8.0".to_string())]);
        let prompt = ScriptedPrompt::new(&[]);

        let resolved = VariableResolver::new()
            .with_prompt(&prompt)
            .resolve(&definitions, &user, &ResolvedVariables::new())
            .await
            .unwrap();

        assert_eq!(resolved.get("$$cap_version"), Some("8.0"));
        assert!(prompt.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn closed_prompt_surfaces_as_error() {
        let definitions = vec![definition("$$cap_pass", "", None)];
        let prompt = ScriptedPrompt::new(&[]);

        let err = VariableResolver::new()
            .with_prompt(&prompt)
            .resolve(&definitions, &BTreeMap::new(), &ResolvedVariables::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::Prompt { .. }));
    }
}
