use crate::infra::{
    parse_date, parse_datetime, parse_role, FixtureBackend, JsonFilePreferenceStore,
};
use crate::report::{
    render_candidature_change, render_evaluation_board, render_offer_board, render_offer_change,
    render_terms,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use stage_flow::config::AppConfig;
use stage_flow::error::AppError;
use stage_flow::telemetry;
use stage_flow::workflows::calendar::{window, Season, Term, TermSelection};
use stage_flow::workflows::eligibility::EligibilityService;
use stage_flow::workflows::status::{Candidature, CandidatureId, ConvocationDraft, Offer, OfferId};
use stage_flow::workflows::{ActionCoordinator, Actor, Role};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "stage-flow-console",
    about = "Inspect terms, dashboards, and workflow actions of the internship platform",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the selectable terms and the actor's current selection
    Terms(ActorArgs),
    /// Select the term dashboards are filtered by
    SelectTerm(SelectTermArgs),
    /// Forget the stored term for an actor (logout)
    ClearTerm(ActorArgs),
    /// Render the dashboards for a platform fixture
    Board(BoardArgs),
    /// Enable or disable an offer in a fixture
    Offer {
        #[command(subcommand)]
        command: OfferCommand,
    },
    /// Convoke, accept, or reject a candidature in a fixture
    Candidature {
        #[command(subcommand)]
        command: CandidatureCommand,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ActorArgs {
    /// Role of the signed-in user (employer, teacher, admin)
    #[arg(long, value_parser = parse_role)]
    pub(crate) role: Option<Role>,
    /// Identifier of the signed-in user
    #[arg(long)]
    pub(crate) user: Option<String>,
    /// Override the current date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

impl ActorArgs {
    fn actor(&self) -> Actor {
        Actor {
            role: self.role,
            user_id: self.user.clone(),
        }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Args, Debug)]
pub(crate) struct SelectTermArgs {
    /// Season of the term (winter, summer, fall)
    season: String,
    year: i32,
    #[command(flatten)]
    actor: ActorArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BoardArgs {
    /// JSON fixture holding offers, candidatures, agreements, and evaluations
    #[arg(long)]
    fixture: PathBuf,
    #[command(flatten)]
    actor: ActorArgs,
    /// Filter by this term (e.g. "FALL 2025") instead of the stored selection
    #[arg(long, conflicts_with = "all_terms")]
    term: Option<String>,
    /// Show records of every term
    #[arg(long)]
    all_terms: bool,
}

#[derive(Subcommand, Debug)]
enum OfferCommand {
    Enable(OfferArgs),
    Disable(OfferArgs),
}

#[derive(Args, Debug)]
pub(crate) struct OfferArgs {
    id: String,
    #[arg(long)]
    fixture: PathBuf,
    /// Override the current date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
enum CandidatureCommand {
    Convoke(ConvokeArgs),
    Accept(CandidatureArgs),
    Reject(CandidatureArgs),
}

#[derive(Args, Debug)]
pub(crate) struct CandidatureArgs {
    id: String,
    #[arg(long)]
    fixture: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ConvokeArgs {
    #[command(flatten)]
    target: CandidatureArgs,
    /// Interview date and time (YYYY-MM-DDTHH:MM)
    #[arg(long, value_parser = parse_datetime)]
    date: Option<NaiveDateTime>,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    message: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(environment = ?config.environment, "console started");

    match cli.command {
        Command::Terms(args) => show_terms(&config, args),
        Command::SelectTerm(args) => select_term(&config, args),
        Command::ClearTerm(args) => clear_term(&config, args),
        Command::Board(args) => show_board(&config, args).await,
        Command::Offer { command } => run_offer(command).await,
        Command::Candidature { command } => run_candidature(command).await,
    }
}

fn term_selection(config: &AppConfig, args: &ActorArgs) -> TermSelection {
    let store = Arc::new(JsonFilePreferenceStore::new(&config.preferences.path));
    TermSelection::initialize(store, &args.actor(), args.today())
}

fn show_terms(config: &AppConfig, args: ActorArgs) -> Result<(), AppError> {
    let today = args.today();
    let selection = term_selection(config, &args);
    render_terms(&window(today), &selection);
    Ok(())
}

fn select_term(config: &AppConfig, args: SelectTermArgs) -> Result<(), AppError> {
    let today = args.actor.today();
    let term = Term::new(args.season.parse::<Season>()?, args.year);
    let mut selection = term_selection(config, &args.actor);
    selection.select(term, today)?;
    render_terms(&window(today), &selection);
    Ok(())
}

fn clear_term(config: &AppConfig, args: ActorArgs) -> Result<(), AppError> {
    let today = args.today();
    let mut selection = term_selection(config, &args);
    selection.clear(today);
    println!(
        "Cleared {}; dashboards fall back to {}",
        selection.key(),
        selection.selected()
    );
    Ok(())
}

async fn show_board(config: &AppConfig, args: BoardArgs) -> Result<(), AppError> {
    let today = args.actor.today();
    let actor = args.actor.actor();
    let term = if args.all_terms {
        None
    } else if let Some(raw) = args.term.as_deref() {
        Some(raw.parse::<Term>()?)
    } else {
        Some(term_selection(config, &args.actor).selected())
    };

    let backend = Arc::new(FixtureBackend::load(&args.fixture)?);
    let service = EligibilityService::new(
        backend.clone(),
        backend,
        config.enrichment.lookup,
        config.enrichment.retain_previous_facts,
    );

    if actor.role != Some(Role::Teacher) {
        if let Some(rows) = service.offer_board(&actor, term, today).await?.rows() {
            render_offer_board(rows, term);
        }
    }
    if actor.role != Some(Role::Employer) {
        if let Some(rows) = service.evaluation_board(&actor, term).await?.rows() {
            render_evaluation_board(rows, term);
        }
    }
    Ok(())
}

async fn run_offer(command: OfferCommand) -> Result<(), AppError> {
    let (args, enable) = match command {
        OfferCommand::Enable(args) => (args, true),
        OfferCommand::Disable(args) => (args, false),
    };
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let backend = Arc::new(FixtureBackend::load(&args.fixture)?);
    let id = OfferId::new(args.id);
    let snapshot = backend
        .offer(&id)
        .ok_or_else(|| AppError::NotFound(format!("offer {id}")))?;

    let coordinator = ActionCoordinator::new(backend.clone());
    let updated = if enable {
        coordinator.enable_offer(&snapshot, today).await?
    } else {
        coordinator.disable_offer(&snapshot).await?
    };
    backend.save()?;

    render_offer_change(&snapshot, &updated);
    Ok(())
}

async fn run_candidature(command: CandidatureCommand) -> Result<(), AppError> {
    match command {
        CandidatureCommand::Convoke(args) => {
            let draft = ConvocationDraft {
                date: args.date,
                location: args.location,
                message: args.message,
            };
            convoke(args.target, draft).await
        }
        CandidatureCommand::Accept(args) => decide(args, true).await,
        CandidatureCommand::Reject(args) => decide(args, false).await,
    }
}

async fn convoke(args: CandidatureArgs, draft: ConvocationDraft) -> Result<(), AppError> {
    let (backend, snapshot, parent) = load_candidature(&args)?;
    let coordinator = ActionCoordinator::new(backend.clone());
    let updated = coordinator.convoke(&snapshot, &parent, &draft).await?;
    backend.save()?;
    render_candidature_change(&snapshot, &updated);
    Ok(())
}

async fn decide(args: CandidatureArgs, accept: bool) -> Result<(), AppError> {
    let (backend, snapshot, parent) = load_candidature(&args)?;
    let coordinator = ActionCoordinator::new(backend.clone());
    let updated = if accept {
        coordinator.accept(&snapshot, &parent).await?
    } else {
        coordinator.reject(&snapshot, &parent).await?
    };
    backend.save()?;
    render_candidature_change(&snapshot, &updated);
    Ok(())
}

fn load_candidature(
    args: &CandidatureArgs,
) -> Result<(Arc<FixtureBackend>, Candidature, Offer), AppError> {
    let backend = Arc::new(FixtureBackend::load(&args.fixture)?);
    let id = CandidatureId::new(args.id.as_str());
    let snapshot = backend
        .candidature(&id)
        .ok_or_else(|| AppError::NotFound(format!("candidature {id}")))?;
    let parent = backend
        .offer(&snapshot.offer_id)
        .ok_or_else(|| AppError::NotFound(format!("offer {}", snapshot.offer_id)))?;
    Ok((backend, snapshot, parent))
}
