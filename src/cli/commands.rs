//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::Assistant;
use crate::core::{ProviderType, Result, Role};
use crate::llm::models::{find_preset, presets_for, recommended_models};

/// Result of parsing a command
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
}

/// Parse and handle special commands
pub async fn handle_command(input: &str, assistant: &mut Assistant) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].trim_start_matches('/').to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "reset" => {
            assistant.clear_history();
            Ok(CommandResult::Clear)
        }

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "models" => {
            let models = assistant.list_models().await?;
            let output = format!(
                "Available models from {}:\n{}\n\nCurrent: {}",
                assistant.provider_name(),
                models
                    .iter()
                    .map(|m| format!("  - {}", m))
                    .collect::<Vec<_>>()
                    .join("\n"),
                assistant.config().llm.model,
            );
            Ok(CommandResult::Handled(output))
        }

        "set" => handle_set_command(args, assistant),

        "status" => {
            let config = assistant.config();
            let status = format!(
                "Career Assistant Status:\n\
                 ─────────────────────────────\n\
                 Provider:     {}\n\
                 Model:        {}\n\
                 Temperature:  {}\n\
                 Resume:       {}\n\
                 Output dir:   {}\n\
                 Job backend:  {}\n\
                 Max steps:    {}\n\
                 History:      {} messages\n\
                 Debug:        {}",
                config.llm.provider,
                config.llm.model,
                config.llm.temperature,
                config.resume.path.display(),
                config.resume.output_dir.display(),
                config.job_search.backend,
                config.agent.max_steps,
                assistant.conversation_length(),
                if config.agent.debug { "on" } else { "off" }
            );
            Ok(CommandResult::Handled(status))
        }

        "history" => Ok(CommandResult::Handled(format_history(assistant, args))),

        "recommend" => Ok(CommandResult::Handled(recommend_models())),

        "save-config" => {
            let path = assistant.save_config()?;
            Ok(CommandResult::Handled(format!(
                "Configuration saved to {}",
                path.display()
            )))
        }

        _ => {
            // Not a command, treat as normal input
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Handle 'set' subcommands
fn handle_set_command(args: &str, assistant: &mut Assistant) -> Result<CommandResult> {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();

    if parts.is_empty() || parts[0].is_empty() {
        return Ok(CommandResult::Handled(
            "Usage: set <provider|model|temperature|resume|debug> <value>\n\
             Examples:\n\
               set provider openai\n\
               set model gpt-4o\n\
               set temperature 0.2\n\
               set resume ./cv.pdf\n\
               set debug on"
                .to_string(),
        ));
    }

    let key = parts[0].to_lowercase();
    let value = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match key.as_str() {
        "provider" => {
            if value.is_empty() {
                return Ok(CommandResult::Handled(format!(
                    "Current provider: {}",
                    assistant.config().llm.provider
                )));
            }
            let provider: ProviderType = value.parse()?;
            assistant.set_provider(provider)?;
            Ok(CommandResult::Handled(format!(
                "Provider set to: {} (model: {})",
                provider,
                assistant.config().llm.model
            )))
        }

        "model" => {
            if value.is_empty() {
                return Ok(CommandResult::Handled(format!(
                    "Current model: {}",
                    assistant.config().llm.model
                )));
            }
            assistant.set_model(value);
            let note = match find_preset(value) {
                Some(preset) if !preset.supports_tools => {
                    "\nNote: this model may not follow routing and tool calls reliably."
                }
                _ => "",
            };
            Ok(CommandResult::Handled(format!("Model set to: {}{}", value, note)))
        }

        "temperature" | "temp" => {
            let temperature: f32 = value.parse().map_err(|_| {
                crate::core::CareerError::config(format!("Invalid temperature: '{}'", value))
            })?;
            assistant.set_temperature(temperature)?;
            Ok(CommandResult::Handled(format!(
                "Temperature set to: {}",
                temperature
            )))
        }

        "resume" => {
            if value.is_empty() {
                return Ok(CommandResult::Handled(format!(
                    "Current resume: {}",
                    assistant.config().resume.path.display()
                )));
            }
            assistant.set_resume_path(value)?;
            Ok(CommandResult::Handled(format!("Resume set to: {}", value)))
        }

        "debug" => {
            let enabled = matches!(value.to_lowercase().as_str(), "on" | "true" | "1" | "yes");
            assistant.set_debug(enabled);
            Ok(CommandResult::Handled(format!(
                "Debug mode: {}",
                if enabled { "ON" } else { "OFF" }
            )))
        }

        _ => Ok(CommandResult::Handled(format!(
            "Unknown setting: {}. Available: provider, model, temperature, resume, debug",
            key
        ))),
    }
}

/// Render the last messages of the committed history
fn format_history(assistant: &Assistant, args: &str) -> String {
    let n = args.parse().unwrap_or(10);
    let history = assistant.history();
    if history.is_empty() {
        return "No messages yet.".to_string();
    }

    history
        .last_n(n)
        .into_iter()
        .map(|m| {
            let author = match (m.role, m.name.as_deref()) {
                (Role::Worker, Some(name)) => name.to_string(),
                (role, _) => role.to_string(),
            };
            let preview: String = m.content.chars().take(120).collect();
            format!("[{}] {}", author, preview.replace('\n', " "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate help text
fn help_text() -> String {
    r#"Career Assistant Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit
  clear, reset     Clear conversation history
  status           Show current configuration
  history [n]      Show the last n messages (default 10)
  models           List models offered by the provider
  recommend        Show recommended models
  save-config      Write the current settings to the config file

  set provider <openai|groq|ollama>   Switch LLM provider
  set model <model>                   Set the model
  set temperature <0.0-2.0>           Set the sampling temperature
  set resume <path>                   Use another resume file
  set debug <on|off>                  Enable/disable debug output

Try asking:
  - Summarize my resume
  - Find remote Rust jobs in Berlin
  - Write a cover letter for the first job
  - Research the company behind that posting
─────────────────────────────────────────────"#
        .to_string()
}

/// Generate model recommendations
fn recommend_models() -> String {
    let mut output = String::from("Recommended Models:\n");

    for provider in [ProviderType::OpenAi, ProviderType::Groq, ProviderType::Ollama] {
        output.push_str(&format!("\n{}:\n", provider));
        for model in recommended_models()
            .into_iter()
            .filter(|m| m.provider == provider)
        {
            output.push_str(&format!(
                "  {} (temperature {})\n    {}\n",
                model.name, model.default_temperature, model.description
            ));
        }
        if presets_for(provider).is_empty() {
            output.push_str("  (no presets)\n");
        }
    }

    output
}
