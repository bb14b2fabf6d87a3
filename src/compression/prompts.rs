//! Prompt templates for every compression operation.
//!
//! Input bodies are wrapped in `<input>` tags so backends (and the mock) can
//! tell instructions from material.

use super::types::{CompressionStyle, DiffInput, Document, ProgressiveStage};
use minijinja::{Environment, context};
use once_cell::sync::Lazy;

pub const SYSTEM_PROMPT: &str = "You are an expert in information compression.
You find the essence of a text and condense it without losing important information.
Keep technical details accurate and produce clear, compact output.";

const SUMMARIZE_TEMPLATE: &str = r#"Summarize the following text {{ style_instruction }}.

Constraints:
- Stay within roughly {{ max_tokens }} tokens
{%- if preserve %}
- Always keep: {{ preserve | join(", ") }}
{%- endif %}
- Keep technical details accurate

<input>
{{ text }}
</input>

Summary:"#;

const COMPRESS_CONTEXT_TEMPLATE: &str = r#"Compress the context below to only what the task needs.

Task: {{ task }}
Target length: {{ target_tokens }} tokens

Drop anything that does not directly serve the task.

<input name="context">
{{ context }}
</input>

Compressed context:"#;

const EXTRACT_ESSENCE_TEMPLATE: &str = r#"Extract the essential information from the document below.

Focus areas:
{% for area in focus_areas -%}
- {{ area }}
{% else -%}
- The document's overall essence
{% endfor %}
Criteria:
- Core concepts and definitions
- Important relationships
- Key figures and specifications
- Information tied to the focus areas comes first

<input name="document">
{{ document }}
</input>

Essence:"#;

const UNIFY_TEMPLATE: &str = r#"Merge the documents below into a single unified summary.

Purpose: {{ purpose }}

{% for doc in documents -%}
<input name="document">
### {{ doc.title }}
{{ doc.content }}
</input>

{% endfor -%}
Guidelines:
- State shared information once
- Call out contradictions explicitly
- Prefer information relevant to the purpose
- Cite document titles where useful

Unified summary:"#;

const DIFF_TEMPLATE: &str = r#"Compare the before and after versions below and summarize the changes.
{% if focus %}
Pay particular attention to: {{ focus }}
{% endif %}
<input name="before">
{{ before }}
</input>

<input name="after">
{{ after }}
</input>

Report:
- What was added
- What was removed
- What was modified
- What is affected

Change summary:"#;

const PROGRESSIVE_TEMPLATE: &str = r#"Compress the text below. This is stage {{ stage_number }} of {{ total_stages }}.

Target ratio: {{ target_ratio }}
{%- if preserve %}
Keep: {{ preserve | join(", ") }}
{%- endif %}

<input>
{{ text }}
</input>

Guidelines:
- Reach the target ratio
- Always keep the listed elements
- Later stages may compress the result further

Compressed text:"#;

/// Appended to code-aware summarize prompts.
pub const CODE_AWARE_SUFFIX: &str = "

Additional instructions for code:
- Code blocks: keep structure (class and function signatures), implementation details may go
- Comments: keep the important ones, drop the obvious ones
- Prose: compress
- Imports: keep only the main ones";

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        ("summarize", SUMMARIZE_TEMPLATE),
        ("compress_context", COMPRESS_CONTEXT_TEMPLATE),
        ("extract_essence", EXTRACT_ESSENCE_TEMPLATE),
        ("unify", UNIFY_TEMPLATE),
        ("diff", DIFF_TEMPLATE),
        ("progressive", PROGRESSIVE_TEMPLATE),
    ] {
        env.add_template(name, source)
            .expect("built-in prompt templates must be valid minijinja syntax");
    }
    env
});

/// Phrase completing "Summarize the following text ...".
pub fn style_instruction(style: CompressionStyle) -> &'static str {
    match style {
        CompressionStyle::Concise => "concisely, in one to three sentences",
        CompressionStyle::Detailed => "in detail, covering every important point",
        CompressionStyle::Bullet => "as a bulleted list",
        CompressionStyle::CodeAware => "keeping code structure intact while compressing the explanation",
        CompressionStyle::Diff => "focusing on what changed",
    }
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template(name)?.render(ctx)
}

pub fn summarize(
    text: &str,
    max_tokens: usize,
    style: CompressionStyle,
    preserve: &[String],
) -> Result<String, minijinja::Error> {
    render(
        "summarize",
        context! {
            style_instruction => style_instruction(style),
            max_tokens => max_tokens,
            preserve => preserve,
            text => text,
        },
    )
}

pub fn compress_context(
    context: &str,
    task: &str,
    target_tokens: usize,
) -> Result<String, minijinja::Error> {
    render(
        "compress_context",
        context! {
            context => context,
            task => task,
            target_tokens => target_tokens,
        },
    )
}

pub fn extract_essence(document: &str, focus_areas: &[String]) -> Result<String, minijinja::Error> {
    render(
        "extract_essence",
        context! {
            document => document,
            focus_areas => focus_areas,
        },
    )
}

pub fn unify(documents: &[Document], purpose: &str) -> Result<String, minijinja::Error> {
    render(
        "unify",
        context! {
            documents => documents,
            purpose => purpose,
        },
    )
}

pub fn diff(input: &DiffInput) -> Result<String, minijinja::Error> {
    render(
        "diff",
        context! {
            before => input.before,
            after => input.after,
            focus => input.focus,
        },
    )
}

pub fn progressive(
    text: &str,
    stage: &ProgressiveStage,
    stage_number: usize,
    total_stages: usize,
) -> Result<String, minijinja::Error> {
    render(
        "progressive",
        context! {
            text => text,
            stage_number => stage_number,
            total_stages => total_stages,
            target_ratio => stage.target_ratio,
            preserve => stage.preserve,
        },
    )
}
