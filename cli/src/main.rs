//! MedLens command line.
//!
//! Renders analysis responses into HTML pages, calls the analysis API, and
//! manages the file-backed session.
//!
//! Usage:
//!   medlens render response.json --out report.html
//!   medlens login drsmith --password secret
//!   medlens analyze --text "Patient has diabetes." --out report.html
//!   medlens analyze --pdf a.pdf --pdf b.pdf
//!   medlens spans response.json
//!   medlens sample multi

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use medlens_annotate::{annotate, normalize};
use medlens_client::{AnalysisOptions, ApiClient, AuthDelays, AuthFlow, PdfUpload, ReqwestTransport};
use medlens_config::ClientConfig;
use medlens_contracts::error::{MedlensError, MedlensResult};
use medlens_core::{RecordingNavigator, Routes, SystemClock};
use medlens_session::{FileStorage, SessionStore};
use medlens_web::{mock_data, render_page, render_response, ViewOptions};

/// Session file used when the configuration names none.
const DEFAULT_SESSION_FILE: &str = ".medlens/session.json";

// ── CLI definition ────────────────────────────────────────────────────────────

/// MedLens: clinical document analysis client.
#[derive(Parser)]
#[command(
    name = "medlens",
    about = "MedLens clinical document analysis client",
    long_about = "Renders disease and lab extraction results as highlighted HTML,\n\
                  calls the analysis API, and manages the signed-in session."
)]
struct Cli {
    /// Client configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a saved analysis response into an HTML page.
    Render {
        response: PathBuf,
        /// Text to show when the response carries none.
        #[arg(long)]
        input_text: Option<PathBuf>,
        #[arg(long)]
        show_json: bool,
        /// Write the page here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Analyze text or PDFs and render the result.
    Analyze {
        #[arg(long, conflicts_with = "pdf", required_unless_present = "pdf")]
        text: Option<String>,
        /// PDF to upload; repeat for a combined multi-document summary.
        #[arg(long)]
        pdf: Vec<PathBuf>,
        #[arg(long)]
        patient_id: Option<String>,
        #[arg(long)]
        show_json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Sign in and store the session.
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Print the resolved highlight spans of a saved response.
    Spans { response: PathBuf },
    /// Print a built-in sample response (nested, flat, multi).
    Sample { name: String },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> MedlensResult<()> {
    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    match cli.command {
        Command::Render {
            response,
            input_text,
            show_json,
            out,
        } => {
            let raw = read_json(&response)?;
            let input = input_text
                .as_deref()
                .map(|p| read_text(p, "input_text"))
                .transpose()?;
            let options = ViewOptions {
                input_text: input.as_deref(),
                show_json,
            };
            let title = title_for(&response);
            emit(&render_page(&title, &render_response(&raw, &options)), out.as_deref())
        }
        Command::Analyze {
            text,
            pdf,
            patient_id,
            show_json,
            out,
        } => {
            let app = App::new(config)?;
            app.session.init()?;
            let client = app.client()?;
            let mut options = AnalysisOptions::from_config(&app.config);
            if let Some(id) = patient_id {
                options = options.with_patient(id);
            }
            let analysis = match &text {
                Some(text) => client.analyze_text(text, &options).await?,
                None => {
                    let files = pdf
                        .iter()
                        .map(|p| PdfUpload::from_path(p))
                        .collect::<MedlensResult<Vec<_>>>()?;
                    client.analyze_pdfs(files, &options).await?
                }
            };
            let view_options = ViewOptions {
                input_text: text.as_deref(),
                show_json,
            };
            let page = render_page("Analysis", &render_response(&analysis.raw, &view_options));
            app.report_redirect();
            emit(&page, out.as_deref())
        }
        Command::Login { username, password } => {
            let app = App::new(config)?;
            let client = app.client()?;
            let session = AuthFlow::new(&client, AuthDelays::from_config(&app.config))
                .login(&username, &password)
                .await?;
            println!(
                "Signed in as {} ({})",
                session.user.display_name(),
                session.user.role
            );
            app.report_redirect();
            Ok(())
        }
        Command::Logout => {
            let app = App::new(config)?;
            let client = app.client()?;
            AuthFlow::new(&client, AuthDelays::none()).logout()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let app = App::new(config)?;
            match app.session.current()? {
                Some(session) => println!(
                    "{} <{}> ({}), signed in {}",
                    session.user.display_name(),
                    session.user.email,
                    session.user.role,
                    session.authenticated_at.format("%Y-%m-%d %H:%M UTC")
                ),
                None => println!("Not signed in."),
            }
            Ok(())
        }
        Command::Spans { response } => {
            let raw = read_json(&response)?;
            print!("{}", span_listing(&raw));
            Ok(())
        }
        Command::Sample { name } => {
            let raw = mock_data::sample(&name).ok_or_else(|| MedlensError::Validation {
                field: "sample".to_string(),
                reason: format!(
                    "unknown sample '{}', expected one of: {}",
                    name,
                    mock_data::SAMPLE_NAMES.join(", ")
                ),
            })?;
            println!("{}", pretty(&raw));
            Ok(())
        }
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

/// Session and navigation state shared by the API-backed commands.
struct App {
    config: ClientConfig,
    session: Arc<SessionStore>,
    navigator: RecordingNavigator,
}

impl App {
    fn new(config: ClientConfig) -> MedlensResult<Self> {
        config.validate()?;
        let path = config
            .session_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
        debug!(path = %path.display(), "using session file");
        let session = SessionStore::new(Box::new(FileStorage::new(path)), Box::new(SystemClock))
            .with_ttl(chrono::Duration::hours(config.session_ttl_hours));
        let routes = Routes::new(config.frontend_base.as_str());
        Ok(Self {
            navigator: RecordingNavigator::starting_at(routes.index()),
            session: Arc::new(session),
            config,
        })
    }

    fn client(&self) -> MedlensResult<ApiClient<ReqwestTransport>> {
        Ok(ApiClient::from_config(
            ReqwestTransport::new()?,
            &self.config,
            self.session.clone(),
            Arc::new(self.navigator.clone()),
        ))
    }

    /// There is no browser to follow redirects, so the last one is reported.
    fn report_redirect(&self) {
        if let Some(page) = self.navigator.last_redirect() {
            info!(page = %page, "next page");
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One line per resolved span: `start end category label confidence`.
fn span_listing(raw: &Value) -> String {
    let doc = normalize(raw);
    annotate(&doc.source_text, &doc.diseases, &doc.labs)
        .iter()
        .map(|span| {
            format!(
                "{}\t{}\t{}\t{}\t{:.3}\n",
                span.start,
                span.end,
                span.category.as_str(),
                span.label,
                span.confidence
            )
        })
        .collect()
}

fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| format!("Analysis: {}", s.to_string_lossy()))
        .unwrap_or_else(|| "Analysis".to_string())
}

fn pretty(raw: &Value) -> String {
    serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string())
}

fn read_text(path: &Path, field: &str) -> MedlensResult<String> {
    std::fs::read_to_string(path).map_err(|e| MedlensError::Validation {
        field: field.to_string(),
        reason: format!("cannot read '{}': {}", path.display(), e),
    })
}

fn read_json(path: &Path) -> MedlensResult<Value> {
    let text = read_text(path, "response")?;
    serde_json::from_str(&text).map_err(|e| MedlensError::ResponseParse {
        reason: format!("'{}' is not JSON: {}", path.display(), e),
    })
}

fn emit(page: &str, out: Option<&Path>) -> MedlensResult<()> {
    match out {
        Some(path) => {
            std::fs::write(path, page).map_err(|e| MedlensError::Storage {
                reason: format!("cannot write '{}': {}", path.display(), e),
            })?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        None => {
            print!("{}", page);
            Ok(())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
