//! `inform ask`: one question, one answer, printed to stdout.

use clap::ValueEnum;
use eyre::{Result, WrapErr, bail};
use inform_client::format::{self, Inline, Node};
use inform_client::{Conversation, HttpBackend, Message, Mode, Settings};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Readable text with markup removed
    Text,
    /// The HTML fragment a browser front end would render
    Html,
    /// The assistant message as JSON
    Json,
}

pub async fn run(
    settings: &Settings,
    mode: Mode,
    question: &str,
    output: OutputFormat,
) -> Result<()> {
    let backend = HttpBackend::new(&settings.api_base)
        .wrap_err_with(|| format!("invalid api_base '{}'", settings.api_base))?;
    debug!(url = %backend.ask_url(), %mode, "asking");

    let mut conversation = Conversation::new(mode);
    // Backend failures come back as an ordinary message, same as in the chat
    let Some(reply) = conversation.handle_send(&backend, question).await else {
        bail!("the question is empty");
    };

    println!("{}", render_reply(reply, output)?);
    Ok(())
}

pub fn render_reply(message: &Message, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text => {
            let body = plain_text(&message.content);
            Ok(match message.confidence {
                Some(confidence) => format!(
                    "Confidence: {} ({})\n\n{body}",
                    confidence.display_percent(),
                    confidence.label.as_str()
                ),
                None => body,
            })
        }
        OutputFormat::Html => Ok(format::split_blocks(&message.content)
            .into_iter()
            .map(format::to_html)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(message)?),
    }
}

fn plain_text(content: &str) -> String {
    let runs_text = |runs: &[Inline]| runs.iter().map(Inline::text).collect::<String>();

    let mut lines = Vec::new();
    for node in format::parse(content).nodes {
        match node {
            Node::Paragraph(runs) => lines.push(runs_text(&runs)),
            Node::List(items) => {
                lines.extend(items.iter().map(|item| format!("• {}", runs_text(item))));
            }
            Node::Break => lines.push(String::new()),
        }
    }
    lines.join("\n")
}
