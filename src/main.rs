use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use docsearch::config::{CONFIG, Config};
use docsearch::controller::{Controller, UiEvent};
use docsearch::view::ViewState;

/// Terminal front-end for the document search service.
#[derive(Parser)]
#[command(name = "docsearch", version, about = "Search, read and export documents")]
struct Cli {
    /// Service root. Defaults to DOCSEARCH_BASE_URL or http://127.0.0.1:5000/.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory exported PDFs are written to.
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of results.
    Search {
        query: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Print a document's sanitized content.
    Doc { id: String },
    /// Fetch a document and save it as PDF.
    Export { id: String },
    /// Interactive session (the default).
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `log` records from the library are bridged by the subscriber.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config: Config = CONFIG.clone();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }

    let mut controller = Controller::new(&config).context("failed to set up client")?;
    tracing::info!("using search service at {}", config.base_url);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Search { query, page } => {
            controller.set_query(query);
            if page == 0 {
                controller.search().await;
            } else {
                controller.paginate(page).await;
            }
            print_view(&mut controller.view);
        }
        Commands::Doc { id } => {
            if controller.view_document(&id).await {
                for modal in &controller.view.modals {
                    println!("{}", modal.markup());
                }
            }
            print_alerts(&mut controller.view);
        }
        Commands::Export { id } => {
            if controller.view_document(&id).await {
                if let Ok(pdf) = controller.download(0) {
                    println!("saved {}", pdf.path.display());
                }
            }
            print_alerts(&mut controller.view);
        }
        Commands::Shell => shell(controller).await?,
    }
    Ok(())
}

const HELP: &str = "\
<text>       search for <text>
n / p        next / previous page
v <n>        view result number <n> (1-based)
d [<n>]      download open document <n> as PDF (default: last opened)
c [<n>]      close open document <n> (default: last opened)
q            quit";

async fn shell(mut controller: Controller) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let open = controller.view.modals.len();
        let event = match parse_command(line, open) {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::ViewResult(index) => {
                if !controller.view_result(index).await {
                    println!("no result {}", index + 1);
                }
                print_view(&mut controller.view);
                continue;
            }
            Command::Event(event) => event,
        };

        if let UiEvent::Input(_) = event {
            controller.handle(event).await;
            controller.handle(UiEvent::Submit).await;
        } else {
            controller.handle(event).await;
        }
        print_view(&mut controller.view);
    }
    Ok(())
}

enum Command {
    Quit,
    Help,
    ViewResult(usize),
    Event(UiEvent),
}

fn parse_command(line: &str, open_modals: usize) -> Command {
    let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));
    let index = |default: usize| {
        arg.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .unwrap_or(default)
    };
    let last = open_modals.saturating_sub(1);

    match verb {
        "q" | "quit" => Command::Quit,
        "?" | "help" => Command::Help,
        "n" => Command::Event(UiEvent::Next),
        "p" => Command::Event(UiEvent::Prev),
        "v" if !arg.is_empty() => Command::ViewResult(index(0)),
        "d" => Command::Event(UiEvent::Download(index(last))),
        "c" => Command::Event(UiEvent::Close(index(last))),
        _ => Command::Event(UiEvent::Input(line.to_string())),
    }
}

fn print_view(view: &mut ViewState) {
    println!("{}", view.results_html.trim());
    if view.pagination.visible {
        let prev = if view.pagination.prev.disabled { "(prev disabled)" } else { "" };
        println!("-- {} {prev}", view.pagination.label);
    }
    for (i, modal) in view.modals.iter().enumerate() {
        println!("[open {}] {} ({})", i + 1, modal.title, modal.download.label);
    }
    print_alerts(view);
}

fn print_alerts(view: &mut ViewState) {
    for alert in view.take_alerts() {
        eprintln!("!! {alert}");
    }
}
