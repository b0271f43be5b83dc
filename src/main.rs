//! glowdesk - AI-assisted routine builder
//!
//! Terminal front end over the selection + conversation core: pick beauty
//! products from the catalog, generate a morning routine through the chat
//! proxy, then extend it with the night routine and follow-up questions.

mod catalog;
mod conversation;
mod llm;
mod selection;
mod store;

use catalog::Catalog;
use conversation::{ChatMessage, ConversationEngine, EngineError, Reply, Role};
use llm::{ChatService, LoggingService, ProxyClient, ProxyConfig};
use selection::SelectionStore;
use std::io::{BufRead, Write};
use std::sync::Arc;
use store::{FileStore, KeyValueStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ENDPOINT: &str = "https://chatbot.jenmoon279.workers.dev";
const DEFAULT_CATALOG_PATH: &str = "products.json";

/// One parsed line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Categories,
    Browse(String),
    Add(u32),
    Remove(u32),
    Selected,
    Clear,
    Routine,
    Night,
    History,
    Quit,
    FollowUp(String),
    Empty,
}

impl Command {
    /// Bare keywords and `browse/add/remove` forms are commands; any other
    /// non-empty line is a follow-up question for the assistant.
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        match line {
            "help" => return Command::Help,
            "categories" => return Command::Categories,
            "selected" => return Command::Selected,
            "clear" => return Command::Clear,
            "routine" => return Command::Routine,
            "night" => return Command::Night,
            "history" => return Command::History,
            "quit" | "exit" => return Command::Quit,
            _ => {}
        }

        if let Some(rest) = line.strip_prefix("browse ") {
            let category = rest.trim();
            if !category.is_empty() {
                return Command::Browse(category.to_string());
            }
        }
        if let Some(rest) = line.strip_prefix("add ") {
            if let Ok(id) = rest.trim().parse() {
                return Command::Add(id);
            }
        }
        if let Some(rest) = line.strip_prefix("remove ") {
            if let Ok(id) = rest.trim().parse() {
                return Command::Remove(id);
            }
        }

        Command::FollowUp(line.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; shell output goes to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glowdesk=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    // Configuration
    let endpoint =
        std::env::var("GLOWDESK_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let api_key = std::env::var("GLOWDESK_API_KEY").ok();
    let catalog_path =
        std::env::var("GLOWDESK_CATALOG").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string());
    let data_path = std::env::var("GLOWDESK_DATA_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.glowdesk/state.json")
    });
    let window = std::env::var("GLOWDESK_WINDOW")
        .ok()
        .and_then(|w| w.parse().ok())
        .unwrap_or(conversation::DEFAULT_WINDOW);

    tracing::info!(path = %catalog_path, "Loading catalog");
    let catalog = Catalog::load(&catalog_path)?;
    if catalog.is_empty() {
        tracing::warn!("catalog has no products; nothing will be selectable");
    }
    tracing::info!(products = catalog.len(), "Catalog loaded");

    let file_store = FileStore::open(&data_path)?;
    let selection = SelectionStore::load(file_store);

    let client = ProxyClient::new(ProxyConfig { endpoint, api_key });
    let service: Arc<dyn ChatService> = Arc::new(LoggingService::new(Arc::new(client)));
    let engine = ConversationEngine::with_window(service, window);

    run_shell(catalog, selection, engine).await;
    Ok(())
}

async fn run_shell<S: KeyValueStore>(
    catalog: Catalog,
    mut selection: SelectionStore<S>,
    mut engine: ConversationEngine,
) {
    println!("glowdesk - routine builder");
    if selection.is_empty() {
        println!("No products selected yet. Type `help` for commands.");
    } else {
        println!(
            "Restored {} selected product(s). Type `help` for commands.",
            selection.len()
        );
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Categories => {
                for category in catalog.categories() {
                    println!("  {category}");
                }
            }
            Command::Browse(category) => {
                let products = catalog.in_category(&category);
                if products.is_empty() {
                    println!("No products in category `{category}`.");
                }
                for product in products {
                    let marker = if selection.contains(product.id) {
                        "*"
                    } else {
                        " "
                    };
                    println!(
                        " {marker} [{}] {} {} - {}",
                        product.id, product.brand, product.name, product.description
                    );
                }
            }
            Command::Add(id) => match catalog.get(id) {
                Some(product) => {
                    if selection.add(product.clone()) {
                        println!("Added {} {}.", product.brand, product.name);
                    } else {
                        println!("{} {} is already selected.", product.brand, product.name);
                    }
                }
                None => println!("No product with id {id}."),
            },
            Command::Remove(id) => {
                if selection.remove(id) {
                    println!("Removed product {id}.");
                } else {
                    println!("Product {id} was not selected.");
                }
            }
            Command::Selected => {
                if selection.is_empty() {
                    println!("No products selected yet.");
                }
                for product in selection.items() {
                    println!("  [{}] {} {}", product.id, product.brand, product.name);
                }
            }
            Command::Clear => {
                if selection.is_empty() {
                    println!("Nothing selected.");
                    continue;
                }
                // Destructive: also discards the conversation
                if confirm(
                    "Clear all selected products? This also discards the conversation.",
                    &mut lines,
                ) {
                    selection.clear();
                    engine.reset();
                    println!("Selection cleared.");
                }
            }
            Command::Routine => {
                if selection.is_large()
                    && !confirm(
                        &format!(
                            "You have selected {} products. Selecting many products may result in an incomplete response. Do you want to continue?",
                            selection.len()
                        ),
                        &mut lines,
                    )
                {
                    continue;
                }
                println!("Generating your personalized routine...");
                match engine.start_routine(&selection.to_prompt_payload()).await {
                    Ok(exchange) => {
                        render_reply("Your Morning Routine", &exchange.reply);
                        println!("(Type `night` for the evening/night routine.)");
                    }
                    Err(e) => render_error(
                        "Sorry, there was an error generating your routine. Please try again.",
                        &e,
                    ),
                }
            }
            Command::Night => {
                println!("Generating night routine...");
                match engine.request_night_routine().await {
                    Ok(exchange) => {
                        println!("You: {}", exchange.user_display);
                        render_reply("Your Night Routine", &exchange.reply);
                    }
                    Err(e) => render_error(
                        "Sorry, there was an error generating the night routine.",
                        &e,
                    ),
                }
            }
            Command::History => {
                if engine.state() == conversation::EngineState::Idle {
                    println!("No conversation yet. Select products and type `routine`.");
                }
                for message in engine.transcript() {
                    println!("{}: {}", role_label(message), message.content);
                }
            }
            Command::FollowUp(text) => {
                println!("Thinking...");
                match engine.ask_follow_up(&text).await {
                    Ok(exchange) => {
                        println!("You: {}", exchange.user_display);
                        render_reply("Assistant", &exchange.reply);
                    }
                    Err(e) => render_error(
                        "Sorry, there was an error processing your question.",
                        &e,
                    ),
                }
            }
        }
    }
}

fn print_help() {
    println!("  categories         list catalog categories");
    println!("  browse <category>  list products in a category (* marks selected)");
    println!("  add <id>           select a product");
    println!("  remove <id>        unselect a product");
    println!("  selected           show the current selection");
    println!("  clear              clear the selection and the conversation");
    println!("  routine            generate the morning routine");
    println!("  night              generate the night routine");
    println!("  history            show the conversation so far");
    println!("  quit               leave");
    println!("  anything else      ask the assistant a follow-up question");
}

fn role_label(message: &ChatMessage) -> &'static str {
    match message.role {
        Role::System => "system",
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

/// Print a settled reply under its heading, with the truncation advisory
fn render_reply(heading: &str, reply: &Reply) {
    println!();
    println!("{heading}:");
    println!("{}", reply.content);
    if reply.truncated {
        println!();
        println!("Response incomplete. Type `continue` to see more.");
    }
}

/// Print a failed flow: local aborts inline, request failures with the
/// underlying error on a secondary line
fn render_error(note: &str, error: &EngineError) {
    match error {
        EngineError::EmptySelection | EngineError::NoActiveConversation => println!("{error}"),
        EngineError::Llm(e) => {
            println!("{note}");
            println!("  error: {e}");
        }
    }
}

/// Yes/no gate for destructive or risky actions
fn confirm(prompt: &str, lines: &mut std::io::Lines<std::io::StdinLock<'_>>) -> bool {
    print!("{prompt} [y/N] ");
    let _ = std::io::stdout().flush();
    match lines.next() {
        Some(Ok(answer)) => {
            let answer = answer.trim().to_ascii_lowercase();
            answer == "y" || answer == "yes"
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_commands() {
        assert_eq!(Command::parse("routine"), Command::Routine);
        assert_eq!(Command::parse("  night  "), Command::Night);
        assert_eq!(Command::parse("exit"), Command::Quit);
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_parse_argument_commands() {
        assert_eq!(Command::parse("add 3"), Command::Add(3));
        assert_eq!(Command::parse("remove 12"), Command::Remove(12));
        assert_eq!(
            Command::parse("browse serum"),
            Command::Browse("serum".to_string())
        );
    }

    #[test]
    fn test_unparsable_arguments_fall_through_to_follow_up() {
        assert_eq!(
            Command::parse("add more toner to my routine"),
            Command::FollowUp("add more toner to my routine".to_string())
        );
        assert_eq!(
            Command::parse("can I skip sunscreen?"),
            Command::FollowUp("can I skip sunscreen?".to_string())
        );
    }

    #[test]
    fn test_continue_is_a_follow_up() {
        assert_eq!(
            Command::parse("continue"),
            Command::FollowUp("continue".to_string())
        );
    }
}
