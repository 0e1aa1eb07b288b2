//! rdf4j CLI: command-line access to an RDF4J server
//!
//! Uses the rdf4j-client `Rdf4jClient` to talk to a running server.

mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rdf4j::{NamedNode, QueryType, RdfFormat};
use rdf4j_client::{ClientConfig, QueryOptions, Rdf4jClient, Repository, DEFAULT_BASE_URL};
use tracing::{debug, Level};

use output::{OutputFormat, Renderer};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "rdf4j", version, about = "RDF4J server CLI")]
struct Cli {
    /// Server root URL
    #[arg(long, default_value = DEFAULT_BASE_URL, global = true, env = "RDF4J_URL")]
    url: String,

    /// Repository to work on
    #[arg(long, global = true, env = "RDF4J_REPOSITORY")]
    repo: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    timeout: u64,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List repositories
    Repos,
    /// Run a SPARQL query
    Query {
        sparql: String,

        /// Leave inferred statements out
        #[arg(long)]
        no_infer: bool,
    },
    /// Run a SPARQL update
    Update { sparql: String },
    /// Count statements
    Size,
    /// List namespace prefixes
    Namespaces,
    /// Load an RDF file
    Upload {
        file: PathBuf,

        /// RDF format; guessed from the file extension when omitted
        #[arg(long = "rdf-format")]
        rdf_format: Option<RdfFormat>,

        /// Named graph to load into
        #[arg(long)]
        context: Option<String>,
    },
    /// Create a repository from a Turtle configuration file
    CreateRepo { id: String, config: PathBuf },
    /// Delete a repository
    DeleteRepo { id: String },
    /// Start an interactive REPL
    Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = ClientConfig::new(&cli.url).with_timeout(cli.timeout);
    let client = Rdf4jClient::new(config)?;
    let mut renderer = Renderer::new(cli.format);

    match cli.command {
        Commands::Repos => renderer.repositories(&client.list_repositories().await?),
        Commands::Query { sparql, no_infer } => {
            let repo = select_repository(&client, cli.repo.as_deref())?;
            run_query(&repo, &mut renderer, &sparql, !no_infer).await
        }
        Commands::Update { sparql } => {
            let repo = select_repository(&client, cli.repo.as_deref())?;
            repo.update(&sparql).await?;
            println!("OK");
            Ok(())
        }
        Commands::Size => {
            let repo = select_repository(&client, cli.repo.as_deref())?;
            println!("{}", repo.size().await?);
            Ok(())
        }
        Commands::Namespaces => {
            let repo = select_repository(&client, cli.repo.as_deref())?;
            renderer.namespaces(&repo.namespaces().await?)
        }
        Commands::Upload {
            file,
            rdf_format,
            context,
        } => {
            let repo = select_repository(&client, cli.repo.as_deref())?;
            let format = match rdf_format {
                Some(format) => format,
                None => file
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(RdfFormat::from_extension)
                    .ok_or_else(|| format!("cannot guess RDF format of {}", file.display()))?,
            };
            let context = context.as_deref().map(NamedNode::new).transpose()?;
            let data = std::fs::read_to_string(&file)?;

            repo.upload(&data, format, context.as_ref()).await?;
            println!("Uploaded {}", file.display());
            Ok(())
        }
        Commands::CreateRepo { id, config } => {
            let turtle = std::fs::read_to_string(&config)?;
            client.create_repository(&id, &turtle).await?;
            println!("Created repository {}", id);
            Ok(())
        }
        Commands::DeleteRepo { id } => {
            client.delete_repository(&id).await?;
            println!("Deleted repository {}", id);
            Ok(())
        }
        Commands::Shell => run_shell(&client, &mut renderer, cli.repo).await,
    }
}

fn select_repository(client: &Rdf4jClient, repo: Option<&str>) -> CliResult<Repository> {
    match repo {
        Some(id) => Ok(client.repository(id)),
        None => Err("no repository selected; pass --repo or set RDF4J_REPOSITORY".into()),
    }
}

async fn run_query(
    repo: &Repository,
    renderer: &mut Renderer,
    sparql: &str,
    infer: bool,
) -> CliResult<()> {
    // Repository prefixes make the table output readable
    match repo.namespaces().await {
        Ok(namespaces) => renderer.learn(&namespaces),
        Err(e) => debug!("Not compacting IRIs, namespaces unavailable: {}", e),
    }
    let options = QueryOptions::default().with_infer(infer);
    let results = repo.query_with(sparql, &options).await?;
    renderer.results(&results)
}

async fn run_shell(
    client: &Rdf4jClient,
    renderer: &mut Renderer,
    mut repo: Option<String>,
) -> CliResult<()> {
    println!("RDF4J Interactive Shell");
    println!("Type SPARQL queries or updates, or :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("{}> ", repo.as_deref().unwrap_or("rdf4j"));

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :repo <id>  Switch repository");
                println!("  :repos      List repositories");
                println!("  :size       Count statements");
                println!("  :quit       Exit shell");
                println!("  <sparql>    Run a SPARQL query or update");
            }
            ":repos" => match client.list_repositories().await {
                Ok(repositories) => {
                    if let Err(e) = renderer.repositories(&repositories) {
                        eprintln!("Error: {}", e);
                    }
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            ":size" => match select_repository(client, repo.as_deref()) {
                Ok(r) => match r.size().await {
                    Ok(size) => println!("{}", size),
                    Err(e) => eprintln!("Error: {}", e),
                },
                Err(e) => eprintln!("Error: {}", e),
            },
            command if command.starts_with(":repo ") => {
                let id = command[":repo ".len()..].trim();
                repo = Some(id.to_string());
                println!("Using repository {}", id);
            }
            sparql => {
                if let Err(e) = run_statement(client, renderer, repo.as_deref(), sparql).await {
                    eprintln!("Error: {}", e);
                }
            }
        }
    }

    println!("Bye!");
    Ok(())
}

/// Run a shell line as a query or an update, depending on its form
async fn run_statement(
    client: &Rdf4jClient,
    renderer: &mut Renderer,
    repo: Option<&str>,
    sparql: &str,
) -> CliResult<()> {
    let repo = select_repository(client, repo)?;
    if QueryType::detect(sparql) == Some(QueryType::Update) {
        repo.update(sparql).await?;
        println!("OK");
        Ok(())
    } else {
        run_query(&repo, renderer, sparql, client.config().infer).await
    }
}
