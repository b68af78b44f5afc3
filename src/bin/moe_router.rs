//! MoE router CLI binary.
//!
//! Deterministic mixture-of-experts routing from the command line.
//!
//! # Commands
//!
//! - `route` - Route a single token
//! - `trace` - Tokenize text and route every token
//! - `hash` - Show a token's hash seed and category
//! - `categories` - Print the category table

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use moe_router::{
    config::Config,
    playback::{route_all, Frame, Playback, RoutingView, TraceRecorder},
    routing::{expert_label, semantic_experts, token_hash, RoutingResult, SemanticCategory},
    tokenizer::{tokenize_limited, Token},
    ExpertRole, TokenExpertRouter, VERSION,
};

#[derive(Parser)]
#[command(name = "moe-router")]
#[command(version = VERSION)]
#[command(about = "Deterministic mixture-of-experts routing simulator", long_about = None)]
struct Cli {
    /// Config file path (default: <config dir>/moe-router/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a single token to its experts
    Route {
        /// Token text
        text: String,

        /// Experts per layer, including the shared expert
        #[arg(short, long)]
        experts: Option<usize>,

        /// Routed experts per token
        #[arg(short, long)]
        routed: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tokenize text and route every token
    Trace {
        /// Text to trace (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Experts per layer, including the shared expert
        #[arg(short, long)]
        experts: Option<usize>,

        /// Routed experts per token
        #[arg(short, long)]
        routed: Option<usize>,

        /// Pace output frame by frame
        #[arg(short, long)]
        animate: bool,

        /// Playback speed multiplier (with --animate)
        #[arg(long, default_value = "1.0")]
        speed: f32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a token's hash seed and semantic candidates
    Hash {
        /// Token text
        text: String,
    },

    /// Print the expert category table
    Categories,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Route {
            text,
            experts,
            routed,
            json,
        } => cmd_route(&config, &text, experts, routed, json),

        Commands::Trace {
            input,
            file,
            experts,
            routed,
            animate,
            speed,
            json,
        } => cmd_trace(&config, input, file, experts, routed, animate, speed, json),

        Commands::Hash { text } => cmd_hash(&text),

        Commands::Categories => cmd_categories(),
    }
}

fn build_router(
    config: &Config,
    experts: Option<usize>,
    routed: Option<usize>,
) -> anyhow::Result<TokenExpertRouter> {
    let mut routing = config.routing.clone();
    if let Some(experts) = experts {
        routing.expert_count = experts;
    }
    if let Some(routed) = routed {
        routing.routed_count = routed;
    }
    Ok(TokenExpertRouter::from_config(&routing)?)
}

fn cmd_route(
    config: &Config,
    text: &str,
    experts: Option<usize>,
    routed: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let router = build_router(config, experts, routed)?;
    let result = router.route(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Token:     {text:?}");
    println!("Hash:      {}", result.hash);
    println!(
        "Category:  {}",
        result
            .category
            .map_or_else(|| "-".to_string(), |c| c.to_string())
    );
    println!("Experts:   {}", format_experts(&result));
    println!();
    print_grid(&result);

    let summary = result.activation();
    println!();
    println!(
        "Active:    {}/{} experts ({:.1}%) - {} routed + {} shared",
        summary.active,
        summary.total,
        summary.active_ratio * 100.0,
        summary.routed,
        summary.shared
    );

    Ok(())
}

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
fn cmd_trace(
    config: &Config,
    input: Option<String>,
    file: Option<PathBuf>,
    experts: Option<usize>,
    routed: Option<usize>,
    animate: bool,
    speed: f32,
    json: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let router = build_router(config, experts, routed)?;
    let tokens = tokenize_limited(&content, config.playback.max_tokens);

    if tokens.is_empty() {
        anyhow::bail!("No tokens in input");
    }

    if animate {
        let mut view = ConsoleView::new(config.playback.frame_interval(), tokens.len());
        view.set_animation_speed(speed);
        Playback::new(&router, &tokens, &config.playback)?.drive(&mut view);
        return Ok(());
    }

    if json {
        let mut recorder = TraceRecorder::new();
        Playback::new(&router, &tokens, &config.playback)?.drive(&mut recorder);
        println!("{}", serde_json::to_string_pretty(&recorder.entries)?);
        return Ok(());
    }

    for entry in route_all(&router, &tokens) {
        print_token_line(&entry.token, &entry.routing, tokens.len());
    }

    Ok(())
}

fn cmd_hash(text: &str) -> anyhow::Result<()> {
    let hash = token_hash(text);
    let pick = semantic_experts(text, hash);

    println!("Token:     {text:?}");
    println!("Hash:      {hash}");
    println!(
        "Category:  {}",
        pick.category
            .map_or_else(|| "-".to_string(), |c| c.to_string())
    );
    println!(
        "Semantic:  {}",
        pick.experts
            .iter()
            .map(|e| format!("E{e}"))
            .collect::<Vec<_>>()
            .join(" ")
    );

    Ok(())
}

fn cmd_categories() -> anyhow::Result<()> {
    println!("{:<10} {:<10} Experts", "Category", "Label");
    println!("{}", "-".repeat(40));
    for category in SemanticCategory::ALL {
        let experts = category
            .experts()
            .iter()
            .map(|e| format!("E{e}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<10} {:<10} {}", category.to_string(), category.label(), experts);
    }
    Ok(())
}

/// Slowest playback multiplier `--speed` accepts
const MIN_ANIMATION_SPEED: f32 = 0.01;

/// Paced console output for `trace --animate`
struct ConsoleView {
    interval: Duration,
    speed: f32,
    total_tokens: usize,
}

impl ConsoleView {
    fn new(interval: Duration, total_tokens: usize) -> Self {
        Self {
            interval,
            speed: 1.0,
            total_tokens,
        }
    }

    fn frame_delay(&self) -> Duration {
        self.interval.div_f32(self.speed)
    }
}

impl RoutingView for ConsoleView {
    fn on_frame(&mut self, _frame: &Frame) {
        std::thread::sleep(self.frame_delay());
    }

    fn on_token(&mut self, token: &Token, routing: &RoutingResult) {
        print_token_line(token, routing, self.total_tokens);
    }

    fn on_complete(&mut self) {
        println!("Processing complete. All tokens routed.");
    }

    fn set_animation_speed(&mut self, speed: f32) {
        if speed > 0.0 {
            self.speed = speed.max(MIN_ANIMATION_SPEED);
        }
    }
}

fn print_token_line(token: &Token, routing: &RoutingResult, total: usize) {
    println!(
        "[{:>2}/{}] {:<16} {:<10} {}",
        token.index + 1,
        total,
        token.text,
        routing
            .category
            .map_or_else(|| "-".to_string(), |c| c.to_string()),
        format_experts(routing)
    );
}

fn format_experts(result: &RoutingResult) -> String {
    let mut parts = vec!["S0".to_string()];
    parts.extend(result.iter().map(|e| format!("E{e}")));
    parts.join(" ")
}

fn print_grid(result: &RoutingResult) {
    const COLUMNS: usize = 8;
    let roles = result.roles();

    for (row_index, row) in roles.chunks(COLUMNS).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, role)| {
                let expert = row_index * COLUMNS + col;
                let mark = match role {
                    ExpertRole::Shared => '*',
                    ExpertRole::Routed => '+',
                    ExpertRole::Inactive => '.',
                };
                format!("{mark}{expert:>2} {:<9}", expert_label(expert))
            })
            .collect();
        println!("{}", cells.join(" ").trim_end());
    }
    println!("(* shared, + routed, . inactive)");
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_scales_frame_delay() {
        let mut view = ConsoleView::new(Duration::from_millis(16), 1);
        view.set_animation_speed(2.0);
        let delay = view.frame_delay().as_secs_f64();
        assert!((delay - 0.008).abs() < 1e-6);
    }

    #[test]
    fn test_tiny_speed_is_clamped() {
        let mut view = ConsoleView::new(Duration::from_millis(16), 1);
        view.set_animation_speed(1e-30);
        assert!((view.speed - MIN_ANIMATION_SPEED).abs() < f32::EPSILON);
        assert!(view.frame_delay() <= Duration::from_millis(1700));
    }

    #[test]
    fn test_non_positive_speed_is_ignored() {
        let mut view = ConsoleView::new(Duration::from_millis(16), 1);
        view.set_animation_speed(0.0);
        view.set_animation_speed(-3.0);
        view.set_animation_speed(f32::NAN);
        assert!((view.speed - 1.0).abs() < f32::EPSILON);
    }
}
