//! Diagram generation requests.
//!
//! - free-form: prompt text only (image attached when given)
//! - context-aware: the caller's shape snapshot and next free id are
//!   substituted into the template so the model answers with add/edit/delete
//!   operations
//! - repository: a repository digest becomes the architecture prompt's context

use crate::error::Result;
use crate::github::digest::RepositoryDigest;
use crate::llm::client::{GeminiClient, ThinkingBudget};
use crate::llm::image::ImagePayload;
use crate::prompts::{self, PromptTemplate};
use crate::shapes::ShapeSnapshot;

impl GeminiClient {
    pub async fn generate_diagram(
        &self,
        user_prompt: &str,
        image: Option<&ImagePayload>,
        snapshot: &ShapeSnapshot,
    ) -> Result<String> {
        let (template, prompt) = diagram_prompt(user_prompt, snapshot)?;
        tracing::info!(
            "Generating diagram with {} v{} ({} existing shapes, image: {})",
            template.name,
            template.version,
            snapshot.len(),
            image.is_some()
        );
        self.generate_content(&prompt, image, ThinkingBudget::Off).await
    }

    pub async fn generate_architecture(&self, digest: &RepositoryDigest) -> Result<String> {
        let context = digest.to_string();
        let prompt = prompts::REPOSITORY_ARCHITECTURE.render(&[("repo_context", &context)])?;
        tracing::info!(
            "Generating architecture for {} from a {} byte digest",
            digest.reference,
            context.len()
        );
        self.generate_content(&prompt, None, ThinkingBudget::Off).await
    }
}

/// Picks the incremental template when the canvas already has shapes.
fn diagram_prompt(
    user_prompt: &str,
    snapshot: &ShapeSnapshot,
) -> Result<(&'static PromptTemplate, String)> {
    if snapshot.is_empty() {
        let prompt = prompts::GENERATE.render(&[("user_prompt", user_prompt)])?;
        return Ok((&prompts::GENERATE, prompt));
    }

    let existing = snapshot.to_prompt_json();
    let next_id = snapshot.next_id().to_string();
    let prompt = prompts::GENERATE_WITH_CONTEXT.render(&[
        ("user_prompt", user_prompt),
        ("existing_shapes", &existing),
        ("next_id", &next_id),
    ])?;
    Ok((&prompts::GENERATE_WITH_CONTEXT, prompt))
}
