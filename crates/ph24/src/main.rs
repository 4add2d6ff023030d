mod cipher;
mod commands;
mod state;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ph24")]
#[command(about = "PH24 Cloud servers and provisioning from the command line", long_about = None)]
struct Cli {
    /// Directory holding the `.ph24/state.json` service state
    #[arg(long, global = true, env = "PH24_STATE_DIR", default_value = ".")]
    state_dir: std::path::PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information
    Version,
    /// Show API information
    Info,
    /// List availability zones
    Zones,
    /// List server flavors
    Flavors,
    /// List VPS plans
    Plans,
    /// List VPS images
    Images,
    /// List VPS addons
    Addons,
    /// List projects
    Projects,
    /// Manage a project
    #[command(subcommand)]
    Project(ProjectCommands),
    /// List networks in a project
    Networks {
        /// Project ID
        project: String,
    },
    /// List firewalls in a project
    Firewalls {
        /// Project ID
        project: String,
    },
    /// List servers in a project
    Servers {
        /// Project ID
        project: String,
    },
    /// Inspect or change a server
    #[command(subcommand)]
    Server(ServerCommands),
    /// Run a power or lifecycle action on a server
    Action {
        /// Project ID
        project: String,
        /// Server ID
        server: String,
        /// START, STOP, REBOOT, FORCE_REBOOT, RESCALE or REBUILD
        action: String,
        /// Target flavor for RESCALE
        #[arg(long)]
        flavor: Option<String>,
    },
    /// Provision a new service for a customer
    Provision {
        /// Customer ID
        client_id: String,
        /// Server hostname
        hostname: String,
        /// OS image ID
        #[arg(short, long)]
        image: String,
        /// Plan/flavor ID
        #[arg(short, long)]
        flavor: String,
        /// Availability zone
        #[arg(short, long)]
        zone: Option<String>,
        /// Facility ID
        #[arg(long)]
        facility: Option<String>,
        /// Service ID (defaults to the next free ID)
        #[arg(long)]
        service_id: Option<String>,
    },
    /// Terminate a service and delete its server
    Cancel {
        /// Service ID
        service: String,
    },
    /// Suspend a service (stops its server)
    Suspend {
        /// Service ID
        service: String,
    },
    /// Unsuspend a service (starts its server)
    Unsuspend {
        /// Service ID
        service: String,
    },
    /// Show a service's server overview, optionally running a customer action
    Status {
        /// Service ID
        service: String,
        /// START, STOP, REBOOT, FORCE_REBOOT or CHANGE_HOSTNAME
        #[arg(short, long)]
        action: Option<String>,
        /// New hostname for CHANGE_HOSTNAME
        #[arg(long)]
        hostname: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Create a project
    Create {
        /// Project name
        name: String,
    },
    /// Show a project
    Get {
        /// Project ID
        project: String,
    },
    /// Delete a project
    Delete {
        /// Project ID
        project: String,
    },
    /// List images available to a project
    Images {
        /// Project ID
        project: String,
    },
}

#[derive(Subcommand)]
enum ServerCommands {
    /// Show a server
    Get { project: String, server: String },
    /// Rename a server
    Rename {
        project: String,
        server: String,
        /// New server name
        name: String,
    },
    /// Delete a server
    Delete { project: String, server: String },
    /// Show console access details
    Console { project: String, server: String },
    /// Show the server console log
    Logs { project: String, server: String },
    /// List network ports
    Ports { project: String, server: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Version needs no configuration
    if matches!(cli.command, Commands::Version) {
        println!("ph24 {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = ph24_config::Ph24Config::load()?;

    match cli.command {
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
        Commands::Info => commands::api::info(&config).await?,
        Commands::Zones => commands::api::zones(&config).await?,
        Commands::Flavors => commands::api::flavors(&config).await?,
        Commands::Plans => commands::api::plans(&config).await?,
        Commands::Images => commands::api::images(&config).await?,
        Commands::Addons => commands::api::addons(&config).await?,
        Commands::Projects => commands::api::projects(&config).await?,
        Commands::Project(cmd) => match cmd {
            ProjectCommands::Create { name } => {
                commands::api::create_project(&config, &name).await?
            }
            ProjectCommands::Get { project } => commands::api::project(&config, &project).await?,
            ProjectCommands::Delete { project } => {
                commands::api::delete_project(&config, &project).await?
            }
            ProjectCommands::Images { project } => {
                commands::api::project_images(&config, &project).await?
            }
        },
        Commands::Networks { project } => commands::api::networks(&config, &project).await?,
        Commands::Firewalls { project } => commands::api::firewalls(&config, &project).await?,
        Commands::Servers { project } => commands::api::servers(&config, &project).await?,
        Commands::Server(cmd) => match cmd {
            ServerCommands::Get { project, server } => {
                commands::api::server(&config, &project, &server).await?
            }
            ServerCommands::Rename {
                project,
                server,
                name,
            } => commands::api::rename_server(&config, &project, &server, &name).await?,
            ServerCommands::Delete { project, server } => {
                commands::api::delete_server(&config, &project, &server).await?
            }
            ServerCommands::Console { project, server } => {
                commands::api::server_console(&config, &project, &server).await?
            }
            ServerCommands::Logs { project, server } => {
                commands::api::server_logs(&config, &project, &server).await?
            }
            ServerCommands::Ports { project, server } => {
                commands::api::server_ports(&config, &project, &server).await?
            }
        },
        Commands::Action {
            project,
            server,
            action,
            flavor,
        } => {
            commands::api::server_action(&config, &project, &server, &action, flavor.as_deref())
                .await?
        }
        Commands::Provision {
            client_id,
            hostname,
            image,
            flavor,
            zone,
            facility,
            service_id,
        } => {
            let order = commands::service::ProvisionArgs {
                client_id,
                hostname,
                image,
                flavor,
                zone,
                facility,
                service_id,
            };
            commands::service::provision(&config, &cli.state_dir, order).await?
        }
        Commands::Cancel { service } => {
            commands::service::cancel(&config, &cli.state_dir, &service).await?
        }
        Commands::Suspend { service } => {
            commands::service::suspend(&config, &cli.state_dir, &service).await?
        }
        Commands::Unsuspend { service } => {
            commands::service::unsuspend(&config, &cli.state_dir, &service).await?
        }
        Commands::Status {
            service,
            action,
            hostname,
        } => {
            commands::service::status(&config, &cli.state_dir, &service, action, hostname).await?
        }
    }

    Ok(())
}
