//! Portal Sync CLI - manage portal/source sync jobs on a SQLite network

mod logging;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;

use portalsync_core::application::{SyncJob, SyncJobService, SyncPorts};
use portalsync_core::domain::{SyncSettings, TenantId};
use portalsync_infra_sqlite::{create_pool, run_migrations, SqliteNetwork};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.portalsync/network.db";

#[derive(Parser)]
#[command(name = "portalsync")]
#[command(about = "Portal Sync job management CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database path
    #[arg(long, env = "PORTALSYNC_DB_PATH", default_value = DEFAULT_DB_PATH)]
    db_path: String,

    /// Tenant active when no context switch is in effect
    #[arg(long, env = "PORTALSYNC_HOME_TENANT", default_value = "1")]
    home_tenant: TenantId,

    /// URL scheme of generated admin links
    #[arg(long, env = "PORTALSYNC_ADMIN_SCHEME", default_value = "https")]
    admin_scheme: String,

    /// Document kind of job documents
    #[arg(long, env = "PORTALSYNC_JOB_KIND", default_value = "sync_job")]
    job_kind: String,

    /// Log format: pretty or json
    #[arg(long, env = "PORTALSYNC_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tenants
    #[command(subcommand)]
    Tenant(TenantCommands),

    /// Manage one sync job
    #[command(subcommand)]
    Job(JobCommands),

    /// List the jobs registered for a portal or a source
    Jobs(IndexArgs),

    /// Show the network index lists of a portal or a source
    Index(IndexArgs),
}

#[derive(Subcommand)]
enum TenantCommands {
    /// Add a tenant
    Add {
        /// Tenant domain (e.g., news.example.com)
        domain: String,
    },

    /// List tenants
    List,
}

#[derive(Args, Clone, Copy)]
struct PairArgs {
    /// Portal tenant id (receives content)
    #[arg(long, allow_negative_numbers = true)]
    portal: TenantId,

    /// Source tenant id (content is synced out)
    #[arg(long, allow_negative_numbers = true)]
    source: TenantId,
}

#[derive(Args)]
struct IndexArgs {
    /// Portal tenant id
    #[arg(long, conflicts_with = "source", required_unless_present = "source")]
    portal: Option<TenantId>,

    /// Source tenant id
    #[arg(long)]
    source: Option<TenantId>,
}

#[derive(Subcommand)]
enum JobCommands {
    /// Create the job document in the source tenant and register the pair
    Create {
        #[command(flatten)]
        pair: PairArgs,

        /// Job title
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Show a job
    Show {
        #[command(flatten)]
        pair: PairArgs,
    },

    /// Replace the synced post types
    SetPostTypes {
        #[command(flatten)]
        pair: PairArgs,

        /// Post type names, in order
        names: Vec<String>,
    },

    /// Replace the synced taxonomies
    SetTaxonomies {
        #[command(flatten)]
        pair: PairArgs,

        /// Taxonomy names, in order
        names: Vec<String>,
    },

    /// Set the author attributed to pushed content
    SetAuthor {
        #[command(flatten)]
        pair: PairArgs,

        /// Author id on the portal
        #[arg(allow_hyphen_values = true)]
        author: String,
    },

    /// Attach a term to the job document
    AssignTerm {
        #[command(flatten)]
        pair: PairArgs,

        #[arg(long)]
        taxonomy: String,

        #[arg(long)]
        name: String,

        /// Defaults to the lowercased name
        #[arg(long)]
        slug: Option<String>,
    },

    /// Register the pair in the network index
    Register {
        #[command(flatten)]
        pair: PairArgs,
    },

    /// Delete the job document and deregister the pair
    Delete {
        #[command(flatten)]
        pair: PairArgs,
    },

    /// Print the admin edit and delete links
    Links {
        #[command(flatten)]
        pair: PairArgs,
    },
}

#[derive(Tabled)]
struct TenantRow {
    id: TenantId,
    domain: String,
}

#[derive(Tabled)]
struct JobRow {
    id: String,
    title: String,
    portal: String,
    source: String,
    author: i64,
    post_types: String,
    taxonomies: String,
    terms: usize,
}

impl From<&SyncJob> for JobRow {
    fn from(job: &SyncJob) -> Self {
        Self {
            id: job.composite_id().unwrap_or("-").to_string(),
            title: job.title().to_string(),
            portal: job.portal().map(|t| t.domain.clone()).unwrap_or_default(),
            source: job.source().map(|t| t.domain.clone()).unwrap_or_default(),
            author: job.author_id(),
            post_types: job.post_types().join(", "),
            taxonomies: job.taxonomies().join(", "),
            terms: job.term_count(),
        }
    }
}

struct App {
    network: Arc<SqliteNetwork>,
    service: SyncJobService,
}

impl App {
    async fn connect(cli: &Cli) -> Result<Self> {
        let db_path = shellexpand::tilde(&cli.db_path).into_owned();
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        info!(db_path = %db_path, "Opening network database...");
        let pool = create_pool(&db_path)
            .await
            .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
        run_migrations(&pool).await.context("Migration failed")?;

        let settings = SyncSettings {
            job_kind: cli.job_kind.clone(),
            ..SyncSettings::default()
        };
        settings.validate().context("Invalid sync settings")?;

        let network = Arc::new(
            SqliteNetwork::new(pool, cli.home_tenant).with_admin_scheme(cli.admin_scheme.clone()),
        );
        let service = SyncJobService::new(SyncPorts::from_adapter(network.clone()), settings);

        Ok(Self { network, service })
    }

    /// Load a job, warning when the pair does not resolve
    async fn job(&self, pair: PairArgs) -> Result<SyncJob> {
        let job = self
            .service
            .load(pair.portal, pair.source)
            .await
            .with_context(|| format!("Failed to load job {} <- {}", pair.portal, pair.source))?;

        if !job.is_resolved() {
            println!(
                "{}",
                "⚠ Tenant ids must be positive integers; job not resolved".yellow()
            );
        } else if job.document_id().is_none() {
            println!("{}", "○ No job document for this pair".yellow());
        }
        Ok(job)
    }
}

fn print_jobs(jobs: &[SyncJob]) {
    if jobs.is_empty() {
        println!("{}", "No jobs".yellow());
        return;
    }
    let rows: Vec<JobRow> = jobs.iter().map(JobRow::from).collect();
    println!("{}", Table::new(rows));
}

fn print_job_detail(job: &SyncJob) {
    print_jobs(std::slice::from_ref(job));
    for (taxonomy, terms) in job.terms() {
        let names: Vec<&str> = terms.iter().map(|t| t.name.as_str()).collect();
        println!("  {} {}", format!("{}:", taxonomy).bold(), names.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_format)?;
    info!("Portal Sync v{} starting...", VERSION);

    let app = App::connect(&cli).await?;

    match cli.command {
        Commands::Tenant(TenantCommands::Add { domain }) => {
            let tenant = app.network.register_tenant(&domain).await?;
            println!(
                "{}",
                format!("✓ Tenant {} added ({})", tenant.id, tenant.domain)
                    .green()
                    .bold()
            );
        }

        Commands::Tenant(TenantCommands::List) => {
            let rows: Vec<TenantRow> = app
                .network
                .list_tenants()
                .await?
                .into_iter()
                .map(|t| TenantRow {
                    id: t.id,
                    domain: t.domain,
                })
                .collect();
            println!("{}", Table::new(rows));
        }

        Commands::Job(command) => run_job_command(&app, command).await?,

        Commands::Jobs(args) => {
            let jobs = match (args.portal, args.source) {
                (Some(portal), _) => app.service.jobs_for_portal(portal).await?,
                (None, Some(source)) => app.service.jobs_for_source(source).await?,
                (None, None) => anyhow::bail!("Either --portal or --source is required"),
            };
            print_jobs(&jobs);
        }

        Commands::Index(args) => {
            let index = app.service.index();
            let (label, ids) = match (args.portal, args.source) {
                (Some(portal), _) => (
                    format!("Sources of portal {}", portal),
                    index.sources_of(portal).await?,
                ),
                (None, Some(source)) => (
                    format!("Portals of source {}", source),
                    index.portals_of(source).await?,
                ),
                (None, None) => anyhow::bail!("Either --portal or --source is required"),
            };
            let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
            println!("{} [{}]", format!("{}:", label).cyan().bold(), ids.join(", "));
        }
    }

    Ok(())
}

const NO_JOB_DOCUMENT: &str = "✗ No job document for this pair, nothing changed";

async fn run_job_command(app: &App, command: JobCommands) -> Result<()> {
    match command {
        JobCommands::Create { pair, title } => {
            let mut job = app.job(pair).await?;
            anyhow::ensure!(job.is_resolved(), "Cannot create a job for unresolved tenants");
            if let Some(existing) = job.composite_id().filter(|_| job.document_id().is_some()) {
                anyhow::bail!("Job {} already exists for this pair", existing);
            }

            let document = app
                .network
                .create_document(pair.source, &app.service.settings().job_kind, &title)
                .await?;
            anyhow::ensure!(
                job.set_document_id(document).await?,
                "Failed to attach document {}",
                document
            );
            job.register().await?;

            // Reload so the composite id and title reflect the new document
            let job = app.service.load(pair.portal, pair.source).await?;
            println!("{}", "✓ Job created".green().bold());
            print_job_detail(&job);
        }

        JobCommands::Show { pair } => {
            let job = app.job(pair).await?;
            print_job_detail(&job);
        }

        JobCommands::SetPostTypes { pair, names } => {
            let mut job = app.job(pair).await?;
            if job.set_post_types(names).await? {
                println!("{}", "✓ Post types updated".green().bold());
                print_job_detail(&job);
            } else {
                println!("{}", NO_JOB_DOCUMENT.red());
            }
        }

        JobCommands::SetTaxonomies { pair, names } => {
            let mut job = app.job(pair).await?;
            if job.set_taxonomies(names).await? {
                println!("{}", "✓ Taxonomies updated".green().bold());
                print_job_detail(&job);
            } else {
                println!("{}", NO_JOB_DOCUMENT.red());
            }
        }

        JobCommands::SetAuthor { pair, author } => {
            let mut job = app.job(pair).await?;
            let valid = matches!(author.trim().parse::<i64>(), Ok(id) if id > 0);
            if !valid {
                println!(
                    "{}",
                    format!("✗ '{}' is not a valid author id, nothing changed", author).red()
                );
            } else if job.set_author_raw(&author).await? {
                println!("{}", format!("✓ Author set to {}", author).green().bold());
            } else {
                println!("{}", NO_JOB_DOCUMENT.red());
            }
        }

        JobCommands::AssignTerm {
            pair,
            taxonomy,
            name,
            slug,
        } => {
            let job = app.job(pair).await?;
            let document = job
                .document_id()
                .context("No job document to attach the term to")?;
            let slug = slug.unwrap_or_else(|| name.to_lowercase().replace(' ', "-"));
            let term = app
                .network
                .assign_term(pair.source, document, &taxonomy, &name, &slug)
                .await?;
            println!(
                "{}",
                format!("✓ Term '{}' attached under {}", term.name, term.taxonomy)
                    .green()
                    .bold()
            );
        }

        JobCommands::Register { pair } => {
            let job = app.job(pair).await?;
            job.register().await?;
            println!("{}", "✓ Pair registered in network index".green().bold());
        }

        JobCommands::Delete { pair } => {
            let mut job = app.job(pair).await?;
            job.delete().await?;
            println!(
                "{}",
                format!("✓ Job {} deleted", job.composite_id().unwrap_or("-"))
                    .green()
                    .bold()
            );
        }

        JobCommands::Links { pair } => {
            let job = app.job(pair).await?;
            match (job.edit_link().await?, job.delete_link().await?) {
                (Some(edit), Some(delete)) => {
                    println!("  {} {}", "Edit:".bold(), edit);
                    println!("  {} {}", "Delete:".bold(), delete);
                }
                _ => println!("{}", "No links without a job document".yellow()),
            }
        }
    }

    Ok(())
}
