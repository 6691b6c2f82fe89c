use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::console;
use crate::config::Config;
use crate::dialogs::{ActionMenu, Dialogs, InputOutcome};
use crate::models::analyses::Analysis;
use crate::models::status::EventKind;
use crate::models::{analyses, annotations};
use crate::requests::{HttpRequests, Requests};
use crate::store::{AnalysisStore, AuthStore};
use crate::utils::text;

/// Rosalution - clinical genomics case curation from your terminal
#[derive(Parser)]
#[command(
    name = "rosalution",
    version,
    about = "Clinical genomics case curation from your terminal",
    long_about = r#"Review Rosalution analyses from the command line: list cases, inspect
sections and supporting evidence, fetch gene and variant annotations, attach
evidence, and move cases through the review workflow.

Examples:
  rosalution login -u vrr-prep          # Sign in and cache a session token
  rosalution analyses                   # List analyses available for review
  rosalution analysis CPAM0002          # Show one analysis
  rosalution event CPAM0002 approve     # Push a workflow event"#
)]
pub struct Cli {
    /// Base URL of the Rosalution deployment
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Answer confirmation prompts with their confirm action
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and cache a session token
    Login {
        /// Username; falls back to the configured default
        #[arg(short, long)]
        username: Option<String>,

        /// Password; falls back to ROSALUTION_PASSWORD
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and discard the cached session token
    Logout,

    /// List analyses available for review
    Analyses,

    /// Show an analysis: status, sections and supporting evidence
    Analysis { name: String },

    /// List the legal workflow actions for an analysis
    Actions { name: String },

    /// Push a workflow event onto an analysis
    Event { name: String, event: String },

    /// Attach supporting evidence to an analysis
    Attach {
        name: String,

        /// Attach a file by path
        #[arg(long, conflicts_with = "link")]
        file: Option<PathBuf>,

        /// Attach a URL
        #[arg(long)]
        link: Option<String>,

        /// Comments stored with the attachment
        #[arg(long)]
        comments: Option<String>,

        /// Display name; defaults to the file name or URL
        #[arg(long)]
        display_name: Option<String>,
    },

    /// Fetch annotations for a gene or HGVS variant
    Annotate { unit: String },

    /// Import a new analysis from an exported Phenotips JSON file
    Import { file: PathBuf },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let mut config = Config::init().await?;
        if let Some(url) = &self.url {
            config.base_url = url.clone();
        }
        config.validate()?;

        let requests = Arc::new(HttpRequests::new(&config.base_url, config.timeout_seconds)?);
        if let Some(token) = config.load_token().await {
            requests.set_token(Some(token));
        }

        let transport: Arc<dyn Requests> = requests.clone();
        let app = App {
            config,
            requests,
            dialogs: Dialogs::new(),
            analysis_store: AnalysisStore::new(Arc::clone(&transport)),
            auth_store: AuthStore::new(transport),
            assume_yes: self.assume_yes,
        };

        let result = match self.command {
            Commands::Login { username, password } => app.login(username, password).await,
            Commands::Logout => app.logout().await,
            Commands::Analyses => app.list_analyses().await,
            Commands::Analysis { name } => app.show_analysis(&name).await,
            Commands::Actions { name } => app.list_actions(&name).await,
            Commands::Event { name, event } => app.push_event(&name, &event).await,
            Commands::Attach {
                name,
                file,
                link,
                comments,
                display_name,
            } => app.attach(&name, file, link, comments, display_name).await,
            Commands::Annotate { unit } => app.annotate(&unit).await,
            Commands::Import { file } => app.import(&file).await,
        };

        if let Err(error) = result {
            let _ = app.dialogs.toasts.error(format!("{:#}", error));
            console::drain_toasts(&app.dialogs.toasts);
            std::process::exit(1);
        }

        console::drain_toasts(&app.dialogs.toasts);
        Ok(())
    }
}

/// Everything one command execution needs
struct App {
    config: Config,
    requests: Arc<HttpRequests>,
    dialogs: Dialogs,
    analysis_store: AnalysisStore,
    auth_store: AuthStore,
    assume_yes: bool,
}

impl App {
    async fn login(&self, username: Option<String>, password: Option<String>) -> Result<()> {
        let username = username
            .or_else(|| self.config.username.clone())
            .context("Username required: pass --username or set ROSALUTION_USERNAME")?;
        let password = password
            .or_else(|| std::env::var("ROSALUTION_PASSWORD").ok())
            .context("Password required: pass --password or set ROSALUTION_PASSWORD")?;

        let token = self.auth_store.login(&username, &password).await?;
        self.requests.set_token(Some(token.access_token.clone()));
        self.config.save_token(&token.access_token).await?;

        let session = self.auth_store.verify().await?;
        let _ = self
            .dialogs
            .toasts
            .success(format!("Signed in as {}", session.username));
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.auth_store.logout().await?;
        self.config.clear_token().await?;
        self.requests.set_token(None);

        let ticket = self
            .dialogs
            .notifications
            .title("Signed out")
            .alert("Your session token has been discarded.");
        self.resolve_modal(&self.dialogs.notifications).await?;
        ticket.await;
        Ok(())
    }

    async fn list_analyses(&self) -> Result<()> {
        let summaries = analyses::all(self.requests.as_ref()).await?;
        if summaries.is_empty() {
            let _ = self.dialogs.toasts.info("No analyses available");
            return Ok(());
        }

        for summary in &summaries {
            let status = summary
                .latest_status
                .map(|status| status.display_name())
                .unwrap_or("Preparation");
            println!("{:<12} {:<12} {}", summary.name, status, summary.nominated_by);
            if !summary.description.is_empty() {
                println!("{}", text::wrap_indented(&summary.description, "    "));
            }
        }
        Ok(())
    }

    async fn show_analysis(&self, name: &str) -> Result<()> {
        let analysis = self.analysis_store.load(name).await?;
        print_analysis(&analysis);
        Ok(())
    }

    async fn list_actions(&self, name: &str) -> Result<()> {
        let analysis = self.analysis_store.load(name).await?;
        let status = analysis.latest_status();

        let mut menu = ActionMenu::new();
        menu.add_workflow_actions(status, |_| {});

        if menu.is_empty() {
            let _ = self.dialogs.toasts.info(format!(
                "No workflow actions available from status {}",
                status
            ));
            return Ok(());
        }

        println!("{} is {}. Available actions:", name, status);
        for entry in menu.entries() {
            if let (Some(label), Some(icon)) = (entry.text(), entry.icon()) {
                println!("  [{}] {}", icon, label);
            }
        }
        Ok(())
    }

    async fn push_event(&self, name: &str, event: &str) -> Result<()> {
        let requested: EventKind = event.parse()?;
        let analysis = self.analysis_store.load(name).await?;
        let status = analysis.latest_status();

        let position = status
            .transitions()
            .iter()
            .position(|(_, event)| *event == requested)
            .ok_or_else(|| {
                anyhow!(
                    "'{}' is not a legal action for '{}' in status {}",
                    requested,
                    name,
                    status
                )
            })?;
        let (label, _) = status.transitions()[position];

        // Drive the transition the way a view would: through the menu entry
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        let mut menu = ActionMenu::new();
        menu.add_workflow_actions(status, move |event| {
            let _ = sender.send(event);
        });
        menu.entries()[position].activate();
        drop(menu);
        let dispatched = receiver.recv().await.context("Menu dispatched no event")?;

        let ticket = self
            .dialogs
            .modal
            .title(format!("{} {}", label, name))
            .confirm_text(label)
            .confirm(format!("Push '{}' onto '{}'?", dispatched, name));
        self.resolve_modal(&self.dialogs.modal).await?;

        if !ticket.await {
            let _ = self.dialogs.toasts.info("No changes made");
            return Ok(());
        }

        let updated = self.analysis_store.push_event(dispatched).await?;
        let _ = self.dialogs.toasts.success(format!(
            "'{}' is now {}",
            name,
            updated.latest_status()
        ));
        Ok(())
    }

    async fn attach(
        &self,
        name: &str,
        file: Option<PathBuf>,
        link: Option<String>,
        comments: Option<String>,
        display_name: Option<String>,
    ) -> Result<()> {
        self.analysis_store.load(name).await?;

        let ticket = if let Some(path) = &file {
            let ticket = self
                .dialogs
                .input
                .builder()
                .file(true, "paperclip", ".png, .jpg, .pdf, .json")
                .prompt();
            let mut input = self
                .dialogs
                .input
                .active_tab()
                .context("Input dialog has no active tab")?
                .input;
            input.name = display_name.unwrap_or_else(|| {
                path.file_name()
                    .map(|file_name| file_name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            });
            input.data = path.display().to_string();
            input.comments = comments.unwrap_or_default();
            self.dialogs.input.update_active_tab_input(input);
            ticket
        } else if let Some(url) = &link {
            let ticket = self.dialogs.input.builder().url(true, true).prompt();
            let mut input = self
                .dialogs
                .input
                .active_tab()
                .context("Input dialog has no active tab")?
                .input;
            input.name = display_name.unwrap_or_else(|| url.clone());
            input.data = url.clone();
            input.comments = comments.unwrap_or_default();
            self.dialogs.input.update_active_tab_input(input);
            ticket
        } else {
            return Err(anyhow!("Provide one of --file or --link"));
        };

        self.dialogs.input.confirmation();
        match ticket.await {
            InputOutcome::Confirmed(input) => {
                let attachments = self.analysis_store.add_attachment(&input).await?;
                let _ = self.dialogs.toasts.success(format!(
                    "Attached '{}' ({} total)",
                    input.name,
                    attachments.len()
                ));
            }
            InputOutcome::Canceled | InputOutcome::Deleted => {
                let _ = self.dialogs.toasts.info("No changes made");
            }
        }
        Ok(())
    }

    async fn annotate(&self, unit: &str) -> Result<()> {
        let annotations = annotations::annotate(self.requests.as_ref(), unit).await?;
        if annotations.is_empty() {
            let _ = self
                .dialogs
                .toasts
                .info(format!("No annotations for '{}'", unit));
            return Ok(());
        }

        println!("{}", unit);
        for (dataset, value) in &annotations {
            let rendered = match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            println!("  {}:", dataset);
            println!("{}", text::wrap_indented(&rendered, "    "));
        }
        Ok(())
    }

    async fn import(&self, path: &PathBuf) -> Result<()> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|file_name| file_name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let analysis =
            analyses::import_file(self.requests.as_ref(), &file_name, &contents).await?;
        let _ = self
            .dialogs
            .toasts
            .success(format!("Imported analysis '{}'", analysis.name));
        Ok(())
    }

    /// Resolve a visible modal: immediately with its confirm action under
    /// `--yes`, otherwise interactively from stdin.
    async fn resolve_modal(&self, modal: &crate::dialogs::Modal) -> Result<()> {
        if self.assume_yes {
            modal.confirmation();
            return Ok(());
        }
        console::resolve_modal_from_stdin(modal).await
    }
}

fn print_analysis(analysis: &Analysis) {
    let status = analysis.latest_status();
    println!("{} [{}] {}", analysis.name, status.icon(), status);

    if !analysis.description.is_empty() {
        println!("{}", text::wrap_indented(&analysis.description, "  "));
    }
    if !analysis.nominated_by.is_empty() {
        println!("  Nominated by {}", analysis.nominated_by);
    }

    for unit in &analysis.genomic_units {
        if let Some(gene) = &unit.gene {
            println!("  {}", gene);
        }
        for variant in &unit.variants {
            println!("    {}", variant);
        }
    }

    for section in &analysis.sections {
        println!();
        println!("{}", section.header);
        for field in &section.content {
            println!("  {}:", field.field);
            for value in &field.value {
                println!("{}", text::wrap_indented(value, "    "));
            }
        }
    }

    if !analysis.attachments.is_empty() {
        println!();
        println!("Supporting evidence");
        for attachment in &analysis.attachments {
            println!("  [{}] {} {}", attachment.kind.as_str(), attachment.name, attachment.data);
            if !attachment.comments.is_empty() {
                println!("{}", text::wrap_indented(&attachment.comments, "      "));
            }
        }
    }
}
