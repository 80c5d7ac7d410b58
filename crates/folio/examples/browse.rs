//! Folio Browse Example
//!
//! Interactive terminal browser over the artworks collection API.
//!
//! Commands:
//! - `n` / `p` - next / previous page
//! - `g <page>` - go to a page
//! - `s <count>` - select the first `count` artworks of the collection
//! - `q` - quit
//!
//! The API base defaults to the public collection; set `FOLIO_API_BASE` to
//! point elsewhere, or pass a TOML configuration file as the first argument.
//!
//! Run with: cargo run -p folio --example browse [config.toml]

use folio::{BrowserConfig, BrowserController, Item};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn load_config() -> folio::Result<BrowserConfig> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => BrowserConfig::load(path)?,
        None => BrowserConfig::default(),
    };
    if let Ok(api_base) = std::env::var("FOLIO_API_BASE") {
        config = config.with_api_base(api_base);
    }
    config.validate()?;
    Ok(config)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        format!("{text:<width$}")
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn render(browser: &BrowserController<folio::ArtworksApi>) {
    let Some(info) = browser.store().info() else {
        println!("(no page loaded)");
        return;
    };

    println!();
    print!("    {:>8} ", "id");
    for column in Item::COLUMNS.iter().take(2) {
        print!(" {}", truncate(column.header, 32));
    }
    println!();

    for (row, item) in browser.store().items().iter().enumerate() {
        let mark = if browser.is_selected(item.id) { "[x]" } else { "[ ]" };
        print!("{mark} {:>8} ", item.id);
        for column in Item::COLUMNS.iter().take(2) {
            let value = item.field(column.field).unwrap_or_default();
            print!(" {}", truncate(&value, 32));
        }
        println!("  #{}", info.first_row() + row + 1);
    }

    println!(
        "page {}/{}  |  {} selected ({} on this page)",
        info.number,
        info.total_pages,
        browser.selection().len(),
        browser.selected_on_current_page().len()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info")),
        )
        .init();

    let config = load_config()?;
    let browser = BrowserController::from_config(&config)?;

    let _failures = browser
        .fetch_failed
        .connect(|message| eprintln!("error: {message}"));

    if browser.load_initial().await.is_ok() {
        render(&browser);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let argument = parts.next();

        let current = browser.store().current_page().unwrap_or(1);
        let total = browser.store().total_pages().unwrap_or(1);

        let navigated = match (command, argument) {
            ("q", _) => break,
            ("n", _) if current < total => browser.go_to_page(current + 1).await.is_ok(),
            ("p", _) if current > 1 => browser.go_to_page(current - 1).await.is_ok(),
            ("n" | "p", _) => {
                println!("no such page");
                false
            }
            ("g", Some(page)) => match page.parse::<u32>() {
                Ok(page) if (1..=total).contains(&page) => browser.go_to_page(page).await.is_ok(),
                _ => {
                    println!("page must be between 1 and {total}");
                    false
                }
            },
            ("s", Some(count)) => match count.parse::<i64>() {
                Ok(count) => browser.submit_selection(count).await.is_ok(),
                Err(_) => {
                    println!("count must be a number");
                    false
                }
            },
            _ => {
                println!("commands: n, p, g <page>, s <count>, q");
                false
            }
        };

        if navigated {
            render(&browser);
        }
    }

    Ok(())
}
