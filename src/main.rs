use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Instant, MissedTickBehavior};

use fractal_view::{Field, MemoryUrl, ViewConfig, ViewStores, preview};

#[derive(Parser, Debug)]
#[command(name = "fractal-view")]
#[command(about = "Interactive Mandelbrot view state with query-string sync", long_about = None)]
struct Args {
    /// Initial query string, e.g. "iterations=120&center=-0.5,0&scale=2"
    #[arg(long, value_name = "QUERY", default_value = "")]
    query: String,

    /// JSON file with defaults, durations and limits
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Animation frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Terminal preview width in characters
    #[arg(long, default_value_t = 64)]
    preview_width: u32,

    /// Terminal preview height in characters
    #[arg(long, default_value_t = 24)]
    preview_height: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ViewConfig::load(path)?,
        None => ViewConfig::default(),
    };

    let url = Rc::new(MemoryUrl::from_query(&args.query));
    let mut view = ViewStores::new(&config, url.clone());
    let report = view.hydrate();
    for (field, error) in report.fallbacks() {
        if let Some(error) = error {
            println!("{} fell back to default: {}", field, error);
        }
    }

    println!("\n╭──────────────────────────────────────────╮");
    println!("│            fractal view state            │");
    println!("│                                          │");
    println!("│ /set <key> <value>   /reset <key|all>    │");
    println!("│ /state  /url  /preview  /snapshot <png>  │");
    println!("│ /help   /quit                            │");
    println!("╰──────────────────────────────────────────╯\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut frames = time::interval(Duration::from_secs(1) / args.fps.max(1));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    prompt()?;
    loop {
        tokio::select! {
            now = frames.tick() => {
                view.tick(now - last);
                last = now;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !run_command(line.trim(), &mut view, &url, &args) {
                    break;
                }
                prompt()?;
            }
        }
    }

    println!("final url: ?{}", url.query().encode());
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

/// Returns `false` when the REPL should exit.
fn run_command(input: &str, view: &mut ViewStores, url: &MemoryUrl, args: &Args) -> bool {
    let mut parts = input.split_whitespace();
    let Some(command) = parts.next() else {
        return true;
    };

    match command {
        "/quit" => return false,
        "/help" => {
            let keys: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
            println!("keys: {}\n", keys.join(", "));
        }
        "/set" => {
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                println!("usage: /set <key> <value>\n");
                return true;
            };
            match Field::from_key(key) {
                Some(field) => match view.set_field(field, value) {
                    Ok(_) => println!("{} -> {}\n", field, value),
                    Err(e) => println!("rejected {}: {}\n", field, e),
                },
                None => println!("unknown key '{}'\n", key),
            }
        }
        "/reset" => match parts.next() {
            Some("all") | None => {
                view.reset_all();
                println!("resetting all fields\n");
            }
            Some(key) => match Field::from_key(key) {
                Some(field) => {
                    view.reset(field);
                    println!("resetting {}\n", field);
                }
                None => println!("unknown key '{}'\n", key),
            },
        },
        "/state" => match serde_json::to_string_pretty(&view.snapshot()) {
            Ok(json) => println!("{}{}\n", json, if view.is_animating() { " (animating)" } else { "" }),
            Err(e) => println!("state error: {}\n", e),
        },
        "/url" => println!("?{}\n", url.query().encode()),
        "/preview" => {
            print!("{}", preview::to_ansi(&view.snapshot(), args.preview_width, args.preview_height));
            println!();
        }
        "/snapshot" => {
            let path = parts.next().unwrap_or("view.png");
            match preview::save_png(&view.snapshot(), 800, 600, path) {
                Ok(()) => println!("saved {}\n", path),
                Err(e) => println!("snapshot error: {}\n", e),
            }
        }
        other => println!("unknown command '{}', try /help\n", other),
    }
    true
}
