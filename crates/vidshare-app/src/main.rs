use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use vidshare_app::config::{DEFAULT_API_URL, DEFAULT_SESSION_DB, DEFAULT_TIMEOUT_SECS};
use vidshare_app::screens::{LoginScreen, ProfileScreen, RegisterScreen};
use vidshare_app::{AppConfig, AppContext, ConsoleNotifier, Navigation, Notifier, Route, ViewStatus};

#[derive(Parser)]
#[command(name = "vidshare", version, about = "Share videos from the terminal")]
struct Cli {
    /// API base URL
    #[arg(long, env = "VIDSHARE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Where the login session is kept
    #[arg(long, env = "VIDSHARE_SESSION_DB", default_value = DEFAULT_SESSION_DB)]
    session_db: PathBuf,

    /// Keep the session in memory only
    #[arg(long)]
    no_persist: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "VIDSHARE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        email: String,
        /// Phone number
        #[arg(long)]
        number: String,
    },
    /// Log in and show the profile
    Login {
        #[arg(long)]
        firstname: String,
        #[arg(long, env = "VIDSHARE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Upload a video
    Upload {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Video file
        #[arg(long)]
        video: Option<PathBuf>,
        /// Thumbnail image
        #[arg(long)]
        thumbnail: Option<PathBuf>,
    },
    /// List everyone's videos, or one user's
    Listing {
        user_id: Option<String>,
    },
    /// Show the page at an app path such as /profile or /listing/<id>
    Open {
        path: String,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Save bio and avatar
    Save {
        #[arg(long)]
        bio: Option<String>,
        /// Avatar image
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_url.clone(),
            session_db: (!self.no_persist).then(|| self.session_db.clone()),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidshare=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    debug!("using API at {}", config.api_base_url);
    let ctx = config.build_context(Arc::new(ConsoleNotifier))?;

    let ok = match cli.command {
        Commands::Register {
            firstname,
            lastname,
            email,
            number,
        } => {
            let mut screen = RegisterScreen::new(&ctx);
            let form = screen.form_mut();
            form.firstname = firstname;
            form.lastname = lastname;
            form.email = email;
            form.number = number;
            follow(&ctx, screen.submit().await).await
        }
        Commands::Login {
            firstname,
            password,
        } => {
            let mut screen = LoginScreen::new(&ctx);
            screen.set_firstname(firstname);
            screen.set_password(password);
            follow(&ctx, screen.submit().await).await
        }
        Commands::Logout => {
            let mut screen = ProfileScreen::new(&ctx);
            screen.logout();
            true
        }
        Commands::Profile { action: None } => show(&ctx, &Route::Profile).await,
        Commands::Profile {
            action: Some(ProfileAction::Save { bio, avatar }),
        } => {
            let mut screen = ProfileScreen::new(&ctx);
            screen.mount().await;
            if screen.status() != ViewStatus::Ready {
                return Ok(ExitCode::FAILURE);
            }
            if let Some(bio) = bio {
                if let Err(e) = screen.set_bio(bio) {
                    ctx.notifier.error(&e.message);
                    return Ok(ExitCode::FAILURE);
                }
            }
            if let Some(avatar) = avatar {
                if screen.select_avatar(&avatar).await.is_err() {
                    return Ok(ExitCode::FAILURE);
                }
            }
            screen.save_profile().await.is_ok()
        }
        Commands::Upload {
            title,
            description,
            video,
            thumbnail,
        } => {
            let mut screen = ProfileScreen::new(&ctx);
            screen.set_title(title);
            screen.set_description(description);
            if let Some(video) = video {
                if screen.select_video(&video).await.is_err() {
                    return Ok(ExitCode::FAILURE);
                }
            }
            if let Some(thumbnail) = thumbnail {
                if screen.select_thumbnail(&thumbnail).await.is_err() {
                    return Ok(ExitCode::FAILURE);
                }
            }
            screen.upload_video().await.is_ok()
        }
        Commands::Listing { user_id: None } => show(&ctx, &Route::Listing).await,
        Commands::Listing { user_id: Some(id) } => show(&ctx, &Route::UserListing(id)).await,
        Commands::Open { path } => match Route::parse(&path) {
            Ok(route) => show(&ctx, &route).await,
            Err(e) => {
                ctx.notifier.error(&e.to_string());
                false
            }
        },
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Act on a screen's navigation outcome. `Stay` after a submit means it failed.
async fn follow(ctx: &AppContext, nav: Navigation) -> bool {
    match nav {
        Navigation::Stay => false,
        Navigation::To(route) => show(ctx, &route).await,
    }
}

async fn show(ctx: &AppContext, route: &Route) -> bool {
    if route.requires_session() && !ctx.session.is_authenticated() {
        ctx.notifier.error("Not logged in. Run `vidshare login` first.");
        return false;
    }
    match ctx.show(route).await {
        Some(page) => {
            print!("{}", page.text);
            page.is_ready()
        }
        None => {
            println!("Next: {}", route_hint(route));
            true
        }
    }
}

fn route_hint(route: &Route) -> &'static str {
    match route {
        Route::Register => "vidshare register --firstname .. --lastname .. --email .. --number ..",
        _ => "vidshare login --firstname .. --password ..",
    }
}
