use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio::sync::Notify;

use spotrev::{
    cli, config, error,
    error::Error,
    management::TokenStore,
    spotify::{AuthFlow, AuthSettings, SpotifyAccounts, SpotifyClient},
    success,
    types::{Authenticated, ClientCredentials, ReverseOptions},
    utils, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a playlist's tracks into another playlist in reverse order
    Reverse(ReverseArgs),

    /// Authorize with the Spotify API and cache the token
    Auth(ClientArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// API client ID
    #[clap(long, env = "SPOTIFY_API_AUTH_CLIENT_ID")]
    pub client_id: String,

    /// API client secret
    #[clap(long, env = "SPOTIFY_API_AUTH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,
}

#[derive(Args, Debug, Clone)]
pub struct ReverseArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// ID of the source playlist
    #[clap(long)]
    pub source_playlist_id: String,

    /// Name of the target playlist. If it already exists, specify
    /// --override-existing. Defaults to "<source name> (reversed)"
    #[clap(long)]
    pub target_playlist_name: Option<String>,

    /// Description used when the target playlist is created
    #[clap(long)]
    pub target_playlist_description: Option<String>,

    /// If a playlist with the target name already exists, replace its tracks
    #[clap(long)]
    pub override_existing: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

impl From<ClientArgs> for ClientCredentials {
    fn from(args: ClientArgs) -> Self {
        ClientCredentials {
            client_id: args.client_id,
            client_secret: args.client_secret,
        }
    }
}

async fn authorize(
    api: &SpotifyClient,
    client: &ClientCredentials,
    interrupt: &Notify,
) -> Authenticated {
    let settings = match AuthSettings::from_config() {
        Ok(settings) => settings,
        Err(e) => error!("{}", e),
    };
    let accounts = SpotifyAccounts::from_config();
    let store = TokenStore::from_config();
    let flow = AuthFlow::new(api, &accounts, &store, settings);

    match cli::auth(&flow, client, interrupt).await {
        Ok(authenticated) => authenticated,
        Err(e) => error!("{}", e),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(args) => {
            let interrupt = utils::interrupt_on_ctrl_c();
            let api = SpotifyClient::from_config();
            authorize(&api, &args.into(), &interrupt).await;
        }
        Command::Reverse(args) => {
            let interrupt = utils::interrupt_on_ctrl_c();
            let api = SpotifyClient::from_config();
            let authenticated = authorize(&api, &args.client.clone().into(), &interrupt).await;
            let options = ReverseOptions {
                source_playlist_id: args.source_playlist_id,
                target_playlist_name: args.target_playlist_name,
                target_playlist_description: args.target_playlist_description,
                override_existing: args.override_existing,
            };

            let run = cli::reverse(&api, &authenticated.credential.access_token, &options);
            match utils::until_interrupted(&interrupt, run).await {
                None => error!("Interrupted, the target playlist may be incomplete."),
                Some(Ok(summary)) => {
                    if summary.skipped > 0 {
                        warning!(
                            "Skipped {} entries without a resolvable track.",
                            summary.skipped
                        );
                    }
                    success!(
                        "Done! Wrote {} tracks to '{}' ({}).",
                        summary.written,
                        summary.target_name,
                        summary.target_id
                    );
                }
                Some(Err(e @ (Error::NotFound(_) | Error::Conflict(_)))) => warning!("{}", e),
                Some(Err(e)) => error!("{}", e),
            }
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
