//! boorucast-bot - image bot daemon
//!
//! Bridges an image board and a Mastodon account: every few cycles it posts
//! a random tagged image, and on every cycle it answers the account's new
//! mentions.

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use libboorucast::booru::{BooruClient, CandidateQueue};
use libboorucast::platforms::mastodon::MastodonClient;
use libboorucast::platforms::Platform;
use libboorucast::{logging, mentions, publisher, Config, CursorFile, Result};

#[derive(Parser, Debug)]
#[command(name = "boorucast-bot")]
#[command(version)]
#[command(about = "Image bot bridging Danbooru and a Mastodon account")]
#[command(long_about = "\
boorucast-bot - image bot daemon

DESCRIPTION:
    boorucast-bot is a long-running daemon. Every cycle it polls the
    account's notifications, answering new mentions and forwarding them to
    the maintainer; every post_interval cycles it fetches a random image
    matching the configured tags from Danbooru and posts it as an unlisted,
    sensitive status.

USAGE:
    # Run in foreground (logs to stderr)
    boorucast-bot --config config.json

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (finishes the current cycle)

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Configuration error
")]
struct Cli {
    /// File to load the config from
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    /// Seconds between scheduler cycles
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    poll_interval: u64,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Run a single cycle and exit (for testing)
    #[arg(long, hide = true)]
    once: bool,
}

/// Everything the scheduler owns. No hidden globals: the candidate queue,
/// the cursor and the post countdown all live here.
struct Bot {
    config: Config,
    platform: Box<dyn Platform>,
    booru: BooruClient,
    queue: CandidateQueue,
    state: CursorFile,
    /// Cycles left until the next image post.
    countdown: i64,
}

impl Bot {
    fn new(config: Config) -> Result<Self> {
        let platform = Box::new(MastodonClient::from_config(&config)?);
        let booru = BooruClient::new()?;
        let state = CursorFile::load(config.state_path());

        Ok(Self {
            config,
            platform,
            booru,
            queue: CandidateQueue::new(),
            state,
            countdown: 0,
        })
    }

    /// One scheduler cycle: maybe post an image, always process mentions.
    async fn cycle(&mut self) {
        if self.countdown <= 0 {
            self.post_image().await;
            self.countdown = i64::from(self.config.post_interval);
        }
        self.countdown -= 1;

        if let Err(e) = mentions::process_notifications(
            self.platform.as_ref(),
            &self.config,
            &mut self.state,
        )
        .await
        {
            error!("error processing notifications: {e}");
        }
    }

    async fn post_image(&mut self) {
        let Some(image) = self
            .queue
            .next(
                &self.booru,
                &self.config.required_tags,
                &self.config.forbidden_tags,
            )
            .await
        else {
            warn!("no publishable image this cycle");
            return;
        };

        match publisher::publish(self.platform.as_ref(), &self.booru, &image).await {
            Ok(()) => info!("posted image {}", image.id),
            Err(e) => error!("failed to publish image {}: {e}", image.id),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_from_path(&cli.config)?;

    info!("boorucast-bot starting");
    info!(
        "poll interval: {}s, image post every {} cycle(s)",
        cli.poll_interval, config.post_interval
    );

    // Set up graceful shutdown
    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone());

    let mut bot = Bot::new(config)?;

    if cli.once {
        bot.cycle().await;
        info!("boorucast-bot: ran one cycle, exiting");
    } else {
        run_loop(&mut bot, cli.poll_interval, shutdown).await;
    }

    info!("boorucast-bot stopped");
    Ok(())
}

/// SIGINT/SIGTERM end the loop after the current cycle.
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("signal handler setup failed, running without: {e}");
            return;
        }
    };

    std::thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGTERM | SIGINT => {
                    info!("received shutdown signal, stopping gracefully...");
                    shutdown.store(true, Ordering::Relaxed);
                    break;
                }
                _ => {}
            }
        }
    });
}

/// Main daemon loop
async fn run_loop(bot: &mut Bot, poll_interval: u64, shutdown: Arc<AtomicBool>) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("shutdown requested, stopping daemon loop");
            break;
        }

        bot.cycle().await;

        // Sleep until the next cycle, checking for shutdown every second.
        for _ in 0..poll_interval {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            sleep(Duration::from_secs(1)).await;
        }
    }
}
