use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use minijinja::Environment;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::{error, info};

use nlq_client::api::http::HttpBackend;
use nlq_client::app::{App, ClickOutcome};
use nlq_client::config::{AppConfig, CliArgs};
use nlq_client::controllers::ingest::IngestOutcome;
use nlq_client::controllers::query::{IgnoreReason, SubmitOutcome};
use nlq_client::controllers::suggest::SuggestionOutcome;
use nlq_client::downloads::DirectorySink;
use nlq_client::ui::dispatch::{Command, ControlId};
use nlq_client::ui::templates::{init_templates, render_screen};
use nlq_client::ui::Confirm;
use nlq_client::util::logging::init_tracing;
use nlq_client::views::catalog::RemoveOutcome;

const HELP: &str = "\
Type a question to run it as a query, or one of:
  :suggest           fill the input with an example query
  :upload <path>     upload a CSV, JSON or Parquet file
  :drop <path>       same as :upload, through the drop zone
  :sample <name>     load a bundled dataset (users, products, events)
  :tables            reload the table list
  :click <id>        press the control shown as [id:label]
  :remove <table>    remove a table (asks first)
  :download <table>  save a table as CSV
  :export            save the current results as CSV
  :toggle            show or hide the results
  :health            check the service
  :help              show this text
  :quit              exit";

type InputLines = Arc<Mutex<Lines<BufReader<Stdin>>>>;

/// Reads the y/N answer from the same stream the shell reads commands from.
struct StdinConfirm {
    lines: InputLines,
}

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();
        match self.lines.lock().await.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Shell {
    app: App,
    templates: Environment<'static>,
}

impl Shell {
    fn print_screen(&self) {
        let text = self.app.screen().read(|s| render_screen(&self.templates, s));
        println!("{}", text);
    }

    fn print_saved(outcome: ClickOutcome) {
        match outcome {
            ClickOutcome::Saved(Some(path)) => println!("Saved {}", path.display()),
            ClickOutcome::Unknown => println!("Nothing to act on; see :help"),
            _ => {}
        }
    }

    async fn handle(&self, line: &str) -> Flow {
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            ":quit" | ":q" => return Flow::Quit,
            ":help" => println!("{}", HELP),
            ":suggest" => match self.app.suggestions.request_suggestion().await {
                SuggestionOutcome::Populated | SuggestionOutcome::NoTables => {
                    let text = self.app.screen().read(|s| s.input.text.clone());
                    println!("Suggestion: {}", text);
                }
                SuggestionOutcome::Failed(_) => self.print_screen(),
                SuggestionOutcome::Ignored => {}
            },
            ":upload" | ":drop" if argument.is_empty() => println!("Usage: {} <path>", command),
            ":upload" => {
                self.app.ingest.pick_file(Path::new(argument)).await;
                self.print_screen();
            }
            ":drop" => {
                self.app.ingest.drag_enter();
                if let IngestOutcome::Created { table_name, .. } =
                    self.app.ingest.drop_file(Path::new(argument)).await
                {
                    info!("Dropped file created table {}", table_name);
                }
                self.print_screen();
            }
            ":sample" => {
                self.app.ingest.load_sample(argument).await;
                self.print_screen();
            }
            ":tables" => {
                self.app.catalog.refresh().await;
                self.print_screen();
            }
            ":click" => match argument.parse::<u64>() {
                Ok(id) => {
                    let outcome = self.app.click(ControlId::from(id)).await;
                    Self::print_saved(outcome);
                    self.print_screen();
                }
                Err(_) => println!("Usage: :click <id>"),
            },
            ":remove" => {
                let outcome = self
                    .app
                    .click_command(&Command::RemoveTable(argument.to_string()))
                    .await;
                match outcome {
                    ClickOutcome::Removal(RemoveOutcome::Declined) => println!("Cancelled"),
                    ClickOutcome::Unknown => println!("No table named \"{}\"", argument),
                    _ => {}
                }
                self.print_screen();
            }
            ":download" => {
                let outcome = self
                    .app
                    .click_command(&Command::DownloadTable(argument.to_string()))
                    .await;
                Self::print_saved(outcome);
            }
            ":export" => {
                Self::print_saved(self.app.click_command(&Command::ExportResults).await);
            }
            ":toggle" => {
                self.app.click_command(&Command::ToggleResults).await;
                self.print_screen();
            }
            ":health" => match self.app.health().await {
                Ok(health) => println!(
                    "{} (version {}, {} tables, database {}, up {:.0}s)",
                    health.status,
                    health.version,
                    health.tables_count,
                    if health.database_connected { "connected" } else { "disconnected" },
                    health.uptime_seconds
                ),
                Err(e) => println!("Health check failed: {}", e),
            },
            _ if command.starts_with(':') => println!("Unknown command {}; see :help", command),
            _ => match self.app.query.submit(line) {
                SubmitOutcome::Armed => {
                    self.app.query.settled().await;
                    self.print_screen();
                }
                SubmitOutcome::Ignored(IgnoreReason::InFlight) => {
                    println!("A query is already running")
                }
                SubmitOutcome::Ignored(IgnoreReason::EmptyQuery) => {}
            },
        }

        Flow::Continue
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(args.log_json);
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    init_tracing(config.logging.json);

    let backend = Arc::new(HttpBackend::new(&config.service).context("Invalid service URL")?);
    let templates = init_templates().context("Failed to load templates")?;
    let lines: InputLines = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));

    info!("Using query service at {}", backend.base_url());
    let app = App::new(
        &config,
        backend.clone(),
        backend,
        Arc::new(DirectorySink::new(&config.ui.download_dir)),
        Arc::new(StdinConfirm {
            lines: lines.clone(),
        }),
    );

    app.start().await;
    let shell = Shell { app, templates };
    shell.print_screen();
    println!("Type :help for commands.");

    loop {
        print!("nlq> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.lock().await.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Flow::Quit = shell.handle(line).await {
            break;
        }
    }

    Ok(())
}
