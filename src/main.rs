use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use topicmap::data::{self, LoadOptions, Source, DEFAULT_DESCRIPTIONS_URL, DEFAULT_POINTS_URL};
use topicmap::plot::DEFAULT_TITLE;
use topicmap::serve::ServeOptions;
use topicmap::AppContext;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "topicmap")]
#[command(author, version, about = "Serve an interactive map of topic-clustered posts")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8050")]
    port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Description table (CSV): URL or local path
    #[arg(long, env = "TOPICMAP_DESCRIPTIONS", default_value = DEFAULT_DESCRIPTIONS_URL)]
    descriptions: String,

    /// Point table (Feather / Arrow IPC): URL or local path
    #[arg(long, env = "TOPICMAP_POINTS", default_value = DEFAULT_POINTS_URL)]
    points: String,

    /// Plot title (plotly markup allowed)
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Timeout for each data download, in seconds
    #[arg(long, default_value = "120")]
    fetch_timeout: u64,

    /// Open the dashboard in the default browser
    #[arg(long)]
    open: bool,

    /// No spinner while loading
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let options = LoadOptions {
        descriptions: Source::parse(&args.descriptions),
        points: Source::parse(&args.points),
        timeout: Duration::from_secs(args.fetch_timeout),
    };

    // Set up spinner
    let spinner = if !args.quiet {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Loading dataset...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = data::load(&options);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let dataset = match result {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("Failed to load dataset: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = AppContext::new(dataset, args.title);

    let serve_options = ServeOptions {
        host: args.host,
        port: args.port,
        open_browser: args.open,
    };

    if let Err(e) = topicmap::serve::start(&ctx, &serve_options) {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
