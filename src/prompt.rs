// ABOUTME: Interactive prompt collaborator for non-automated deployments.
// ABOUTME: Asks the operator for variable values constrained by the variable's pattern.

use crate::template::ValidRegex;
use async_trait::async_trait;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed while asking for {0}")]
    Closed(String),

    #[error("I/O error reading input: {0}")]
    Io(#[from] io::Error),
}

/// One question about a template variable.
#[derive(Debug)]
pub struct PromptRequest<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub description: &'a str,
    pub default: &'a str,
    pub pattern: &'a ValidRegex,
}

/// Collaborator that can supply a value for a variable that is missing or
/// whose default does not satisfy its pattern.
#[async_trait]
pub trait VariablePrompt: Send + Sync {
    async fn ask(&self, request: &PromptRequest<'_>) -> Result<String, PromptError>;
}

/// Terminal prompt reading answers from stdin. Re-asks until the answer
/// (or the offered default) satisfies the variable's pattern.
pub struct StdinPrompt;

#[async_trait]
impl VariablePrompt for StdinPrompt {
    async fn ask(&self, request: &PromptRequest<'_>) -> Result<String, PromptError> {
        let question = format_question(request);
        let default = request.default.to_string();
        let pattern = request.pattern.clone();
        let id = request.id.to_string();

        let join_id = id.clone();
        tokio::task::spawn_blocking(move || ask_blocking(&question, &default, &pattern, &id))
            .await
            .map_err(|_| PromptError::Closed(join_id))?
    }
}

fn format_question(request: &PromptRequest<'_>) -> String {
    if request.default.is_empty() {
        format!("{} : {}\n> ", request.label, request.description)
    } else {
        format!(
            "{} : {} [{}]\n> ",
            request.label, request.description, request.default
        )
    }
}

fn ask_blocking(
    question: &str,
    default: &str,
    pattern: &ValidRegex,
    id: &str,
) -> Result<String, PromptError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock();

    loop {
        print!("{question}");
        io::stdout().flush()?;

        let mut line = String::new();
        if lines.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed(id.to_string()));
        }

        let answer = line.trim();
        let answer = if answer.is_empty() { default } else { answer };
        if !answer.is_empty() && pattern.matches(answer) {
            return Ok(answer.to_string());
        }

        eprintln!("value for {id} does not satisfy the required pattern, try again");
    }
}
