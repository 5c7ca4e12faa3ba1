use std::{
    error::Error,
    io::{self, Write},
};

use chef_client::{ChatEntry, Conversation, EntryId, HttpRecipeBoundary, RecipeBoundary, render};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const HELP: &str = "Type your ingredients, then your preferences (optional). /quit to leave";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    // Logs go to stderr so they never interleave with the chat.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .try_init()?;

    let api_url = std::env::var("CHEF_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let boundary = HttpRecipeBoundary::new(&api_url)?;
    info!(url = boundary.url(), "chef client ready");

    println!("{}", "Dobby Chef AI".bold());
    println!("{}", "Unhinged recipe ideas from whatever is in your fridge".dimmed());
    println!();

    let mut conversation = Conversation::new();
    let mut shown = None;
    print_new(&conversation, &mut shown);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let ingredients = prompt(&mut input, "Ingredients (Rice, Tomato, Chicken)").await?;
        let Some(ingredients) = ingredients else {
            break;
        };
        match ingredients.trim() {
            "/quit" => break,
            "/help" => {
                conversation.append(ChatEntry::StatusMessage(HELP.to_string()));
                print_new(&conversation, &mut shown);
                continue;
            }
            "" => continue,
            _ => {}
        }
        conversation.set_ingredients(ingredients);

        let preferences = prompt(&mut input, "Preferences (quick, vegan, spicy)").await?;
        let Some(preferences) = preferences else {
            break;
        };
        conversation.set_preferences(preferences);

        let Some(pending) = conversation.begin_submit() else {
            continue;
        };
        print_new(&conversation, &mut shown);

        let outcome = boundary.suggest(pending.query()).await;
        conversation.finish_submit(pending, outcome);
        print_new(&conversation, &mut shown);
    }

    println!("{}", "Bye! 🐾".dimmed());
    Ok(())
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, label: &str) -> io::Result<Option<String>> {
    print!("{} ", format!("{label}>").green());
    io::stdout().flush()?;
    input.next_line().await
}

/// Print entries newer than `shown`, up to the scroll target.
fn print_new(conversation: &Conversation, shown: &mut Option<EntryId>) {
    let Some(target) = conversation.scroll_target() else {
        return;
    };
    for (id, entry) in conversation.entries_after(*shown) {
        if id > target {
            break;
        }
        println!("{}", render::paint_entry(entry));
        println!();
        *shown = Some(id);
    }
}
