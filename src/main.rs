//! CLI entry point for tiny-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiny_blog::config::{Settings, DEFAULT_ADMIN_PASSWORD, DEFAULT_JWT_SECRET};
use tiny_blog::Blog;

#[derive(Parser)]
#[command(name = "tiny-blog")]
#[command(version)]
#[command(about = "A markdown-file blog with a password-protected admin API", long_about = None)]
struct Cli {
    /// Content directory holding posts/, pages/ and images/
    #[arg(long, global = true, env = "CONTENT_DIR", default_value = "content")]
    content_dir: PathBuf,

    /// Site config file
    #[arg(
        long,
        global = true,
        env = "SITE_CONFIG_PATH",
        default_value = "config/site.config.json"
    )]
    config: PathBuf,

    /// Config file that wins over --config whenever it exists
    #[arg(
        long,
        global = true,
        env = "SITE_CONFIG_OVERRIDE",
        default_value = "/app/config/site.config.json"
    )]
    config_override: PathBuf,

    /// Mark the session cookie Secure (serve over HTTPS)
    #[arg(long, global = true, env = "SECURE_COOKIES")]
    secure_cookies: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "127.0.0.1")]
        ip: String,
    },

    /// Create the content directories and a default config
    Init,

    /// Create a new draft post
    New {
        /// Title of the new post
        title: String,

        /// Slug, defaults to the slugified title
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// List blog content
    List {
        /// Type of content to list (post, draft, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            content_dir: self.content_dir.clone(),
            config_path: self.config.clone(),
            config_override: Some(self.config_override.clone()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            secure_cookies: self.secure_cookies,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "tiny_blog=debug,info"
    } else {
        "tiny_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let blog = Blog::new(cli.settings());

    match cli.command {
        Commands::Serve { port, ip } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            tiny_blog::server::start(&blog, &ip, port).await?;
        }

        Commands::Init => {
            blog.init()?;
        }

        Commands::New { title, slug } => {
            tracing::info!("Creating new post with title: {}", title);
            blog.new_post(&title, slug.as_deref())?;
        }

        Commands::List { r#type } => {
            tiny_blog::commands::list::run(&blog, &r#type)?;
        }

        Commands::Version => {
            println!("tiny-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
