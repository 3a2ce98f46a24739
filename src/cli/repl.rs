//! Interactive REPL for the career assistant
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::agent::{Assistant, WorkerKind};
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    assistant: Assistant,
}

impl Repl {
    /// Create a REPL with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let mut assistant = Assistant::new(config)?;
        assistant.set_observer(Arc::new(print_worker));
        Ok(Self { assistant })
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let resume = &self.assistant.config().resume.path;
        if !resume.exists() {
            println!(
                "No resume found at {}. Use 'set resume <path>' to point at your CV.\n",
                resume.display()
            );
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            // Print prompt
            print!("You: ");
            stdout.flush()?;

            // Read input
            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            // Handle commands
            match handle_command(input, &mut self.assistant).await {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Clear) => {
                    println!("Conversation cleared.\n");
                    continue;
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                    continue;
                }
                Ok(CommandResult::Continue(input)) => {
                    let reply = self.assistant.process(&input).await;
                    println!("\nAssistant:\n{}\n", reply);
                }
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.assistant.config();

        println!(
            r#"
╔═══════════════════════════════════════════════════════════╗
║                                                           ║
║   Career Assistant                                        ║
║   Resume analysis, job search, cover letters, research    ║
║                                                           ║
╚═══════════════════════════════════════════════════════════╝
"#
        );
        println!("Provider:   {}", config.llm.provider);
        println!("Model:      {}", config.llm.model);
        println!("Resume:     {}", config.resume.path.display());
        println!("Jobs via:   {}", config.job_search.backend);
        println!();
        println!("Commands: help, clear, history, status, exit");
        println!("─────────────────────────────────────────────────────────────");
    }
}

/// Announce which worker is acting
pub fn print_worker(kind: WorkerKind) {
    let icon = match kind {
        WorkerKind::ResumeAnalyzer => "📄",
        WorkerKind::CoverLetterGenerator => "✍️",
        WorkerKind::JobSearcher => "💼",
        WorkerKind::WebResearcher => "🔍",
        WorkerKind::ChatBot => "🤖",
    };
    println!("  {} {} working...", icon, kind);
}
