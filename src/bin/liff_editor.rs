//! liff-editor: 终端版消息编辑器
//!
//! Terminal front-end for the message editor. Opens the view a launch URL resolves to,
//! reads the edited text from stdin and drives the save control.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use clap::Parser;
use liff_editor::config::ConfigLayer;
use liff_editor::session::StoredCredentialProvider;
use liff_editor::{
    bootstrap, Affordance, EditorClient, EditorConfig, HostPage, IdentityProvider,
    LaunchParams, SaveDriver, Ui, View,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "liff-editor")]
#[command(about = "Edit your latest LIFF message from the terminal", long_about = None)]
struct Cli {
    /// Launch URL, including query parameters such as `messageId` or `action=edit&text=...`
    #[arg(long, default_value = "https://liff.line.me/")]
    url: String,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    graphql_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long)]
    liff_id: Option<String>,

    /// Acting user id (defaults to LIFF_USER_ID)
    #[arg(long)]
    user_id: Option<String>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<EditorConfig> {
        let mut layer = match &self.config {
            Some(path) => ConfigLayer::from_yaml_file(path)?,
            None => ConfigLayer::default(),
        };
        layer.apply_env(|key| std::env::var(key).ok());
        layer.override_graphql_url(self.graphql_url.clone());
        layer.override_fetch_timeout_ms(self.timeout_ms);
        layer.override_liff_id(self.liff_id.clone());
        Ok(layer.build()?)
    }
}

struct TerminalUi;

#[async_trait]
impl Ui for TerminalUi {
    fn render(&self, affordance: &Affordance) {
        let state = if affordance.disabled { "disabled" } else { "ready" };
        println!(
            "[{}] ({}, {})",
            affordance.label,
            affordance.tone.color(),
            state
        );
    }

    fn alert(&self, message: &str) {
        println!("! {message}");
    }

    async fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        let _ = std::io::stdout().flush();
        let answer = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;
        matches!(answer, Ok(Ok(line)) if line.trim().eq_ignore_ascii_case("y")
            || line.trim().eq_ignore_ascii_case("yes"))
    }
}

/// The terminal has no page to reload or close; both just report what the browser would do.
struct TerminalHost {
    url: String,
}

#[async_trait]
impl HostPage for TerminalHost {
    fn current_url(&self) -> Option<String> {
        Some(self.url.clone())
    }

    async fn reload(&self) {
        println!("Reload required. Run liff-editor again after signing in.");
    }

    async fn close(&self) {
        println!("Done.");
    }
}

/// Lines up to a line containing only `.`, or EOF. `None` when stdin is already exhausted.
async fn read_block() -> anyhow::Result<Option<String>> {
    let block = tokio::task::spawn_blocking(|| -> std::io::Result<Option<String>> {
        let mut lines = Vec::new();
        let mut saw_input = false;
        for line in std::io::stdin().lock().lines() {
            let line = line?;
            saw_input = true;
            if line == "." {
                break;
            }
            lines.push(line);
        }
        Ok(saw_input.then(|| lines.join("\n")))
    })
    .await
    .context("stdin reader stopped")??;
    Ok(block)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("liff_editor=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = cli.load_config()?;
    let launch = LaunchParams::parse(&cli.url)?;

    let mut provider = StoredCredentialProvider::new();
    if let Some(user_id) = &cli.user_id {
        provider = provider.with_user_id(user_id.clone());
    }
    let provider: Arc<dyn IdentityProvider> = Arc::new(provider);
    let host: Arc<dyn HostPage> = Arc::new(TerminalHost {
        url: launch.url.clone(),
    });

    let client = EditorClient::builder()
        .config(config)
        .provider(provider)
        .host(host)
        .build()?;

    let view = bootstrap(&client, &launch).await;
    info!(view = ?view, "view resolved");

    let target = match &view {
        View::List => {
            println!("Hello World\nList View");
            return Ok(());
        }
        View::Redirecting => {
            println!("Sign-in required. Store an access token and run again.");
            return Ok(());
        }
        View::Error {
            message,
            login_required,
        } => {
            let title = if *login_required { "Login required" } else { "Error" };
            return Err(anyhow!("{title}: {message}"));
        }
        View::OcrEditor {
            recipient: Some(recipient),
            ..
        } => {
            println!("OCR text for {recipient}");
            view.save_target()
        }
        _ => view.save_target(),
    }
    .ok_or_else(|| anyhow!("view has no editor"))?;

    println!("{}", view.initial_text().unwrap_or_default());

    let ui = TerminalUi;
    let mut driver = SaveDriver::new(&client, &ui, target);
    loop {
        println!("Enter the new text, finish with a line containing only '.':");
        let read = read_block();
        tokio::pin!(read);
        // The failure label resets while the user is typing.
        let block = loop {
            tokio::select! {
                block = &mut read => break block?,
                _ = driver.settle(), if driver.has_pending_reset() => {}
            }
        };
        let Some(text) = block else {
            break;
        };
        if driver.submit(&text).await.is_terminal() {
            break;
        }
    }
    Ok(())
}
