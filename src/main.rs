use anyhow::{bail, Context, Result};
use call_review::config::DEFAULT_CONFIG_PATH;
use call_review::{
    CallId, CallRecording, Config, ConsoleEvent, Credential, DraftField, HttpReviewApi,
    ReviewApi, ReviewConsole, SelectOutcome, Selection, SessionContext, TransitionReport,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "call-review", version, about = "Review console for recorded sales calls")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Review server root URL, overrides the config file
    #[arg(long)]
    server: Option<String>,

    /// API token, overrides the config file
    #[arg(long, conflicts_with = "username")]
    token: Option<String>,

    #[arg(long, requires = "password")]
    username: Option<String>,

    #[arg(long, requires = "username")]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List call recordings and their status
    List,
    /// Show transcript and extracted info of one call
    Show { id: CallId },
    /// Approve a call that is ready for review
    Approve(ReviewArgs),
    /// Reject a call that is ready for review
    Reject(ReviewArgs),
    /// Upload an audio file as a new call recording
    Upload { file: PathBuf },
    /// Keep the call list on screen, refreshing until Ctrl-C
    Watch,
}

#[derive(Debug, Args)]
struct ReviewArgs {
    id: CallId,

    /// Edit a field before submitting, e.g. --set client_name=Acme
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    set: Vec<(DraftField, String)>,

    /// Review notes (defaults to a placeholder when empty)
    #[arg(long)]
    notes: Option<String>,
}

fn parse_assignment(s: &str) -> Result<(DraftField, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    let field = field.trim().parse::<DraftField>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    let base_url = cli.server.clone().unwrap_or(cfg.server.base_url.clone());
    let api: Arc<dyn ReviewApi> =
        Arc::new(HttpReviewApi::new(base_url).context("Failed to create HTTP client")?);

    let session = Arc::new(SessionContext::new());
    sign_in(&cli, &cfg, api.as_ref(), &session).await?;

    let console = ReviewConsole::new(api, session, cfg.polling.interval());

    match cli.command {
        Command::List => {
            console.refresh_now().await.context("Failed to fetch call recordings")?;
            print_calls(&console.calls().await);
        }
        Command::Show { id } => {
            let selection = select(&console, &id).await?;
            print_selection(&selection);
        }
        Command::Approve(args) => {
            let report = review(&console, args, true).await?;
            print_report(&report);
        }
        Command::Reject(args) => {
            let report = review(&console, args, false).await?;
            print_report(&report);
        }
        Command::Upload { file } => {
            let created = console
                .upload(&file)
                .await
                .with_context(|| format!("Upload of {} failed", file.display()))?;
            println!("Uploaded call {} ({})", created.id, created.status);
        }
        Command::Watch => watch(&console).await?,
    }

    Ok(())
}

async fn sign_in(
    cli: &Cli,
    cfg: &Config,
    api: &dyn ReviewApi,
    session: &SessionContext,
) -> Result<()> {
    if let (Some(username), Some(password)) = (&cli.username, &cli.password) {
        session
            .login(api, username, password)
            .await
            .context("Login failed. Please check your username and password.")?;
        return Ok(());
    }

    let Some(token) = cli.token.clone().or_else(|| cfg.server.token.clone()) else {
        bail!("No credentials: pass --token or --username/--password, or set server.token in the config");
    };

    let credential = Credential::new(token);
    let status = api
        .user_status(&credential)
        .await
        .context("API token was rejected")?;
    session.init(credential, status.is_superuser);

    Ok(())
}

async fn select(console: &ReviewConsole, id: &CallId) -> Result<Selection> {
    match console
        .select(id)
        .await
        .with_context(|| format!("Failed to load call {}", id))?
    {
        SelectOutcome::Selected(selection) => Ok(selection),
        SelectOutcome::Superseded => bail!("Selection of call {} was superseded", id),
    }
}

async fn review(console: &ReviewConsole, args: ReviewArgs, approve: bool) -> Result<TransitionReport> {
    let selection = select(console, &args.id).await?;
    info!("Reviewing call {} ({})", selection.call.id, selection.call.status);

    for (field, value) in args.set {
        console.edit(field, value).await;
    }

    let notes = args.notes.as_deref();
    let report = if approve {
        console.approve(notes).await
    } else {
        console.reject(notes).await
    };

    Ok(report?)
}

async fn watch(console: &ReviewConsole) -> Result<()> {
    let mut events = console.activate().await;

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            event = events.recv() => match event {
                Some(ConsoleEvent::Refreshed { .. }) => print_calls(&console.calls().await),
                Some(ConsoleEvent::RefreshFailed { message }) => {
                    eprintln!("Refresh failed (showing last list): {}", message);
                }
                Some(ConsoleEvent::SessionExpired) => {
                    break Err(anyhow::anyhow!("Session expired, sign in again"));
                }
                None => break Ok(()),
            },
        }
    };

    console.deactivate().await;
    result
}

fn print_calls(calls: &[CallRecording]) {
    if calls.is_empty() {
        println!("No calls found. Upload one to get started!");
        return;
    }

    for call in calls {
        println!("Call ID: {} - Status: {}", call.id, call.status);
    }
}

fn print_selection(selection: &Selection) {
    let call = &selection.call;
    println!("Details for Call ID: {} ({})", call.id, call.status);
    println!();
    println!("Transcript:");
    println!(
        "{}",
        call.transcript_text
            .as_deref()
            .unwrap_or("Transcript is not yet available.")
    );
    println!();

    if selection.info.is_none() {
        println!("No extracted information yet.");
        return;
    }

    println!("Extracted Information:");
    for field in DraftField::ALL {
        println!(
            "  {:<17} {}",
            format!("{}:", field.label()),
            selection.draft.get(field).unwrap_or("")
        );
    }

    if call.status.is_terminal() {
        println!();
        println!("This record has been {}.", call.status);
    }
}

fn print_report(report: &TransitionReport) {
    println!("{}", report.message);
    println!("Call {} is now {}", report.call_id, report.status);
}
