use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::food::ingredients::Diet;
use crate::food::models::RecipeDetail;
use crate::food::recipes::{RecipeFinder, SUGGESTION_LIMIT};
use crate::food::render;
use crate::session::Session;

pub async fn handle_command(input: &str, finder: &RecipeFinder, session: &mut Session) -> Result<(), String> {
    let (command, rest) = split_command(input);

    match command.as_str() {
        "suggest" => {
            if rest.is_empty() {
                println!("Please type part of an ingredient name.");
                println!("Usage: suggest <text>");
                return Ok(());
            }
            let suggestions = finder.suggest(&mut session.notices, rest, SUGGESTION_LIMIT).await;
            if !suggestions.is_empty() {
                println!("\n🧂 Suggestions:");
                for suggestion in suggestions {
                    println!("  • {}", suggestion.bright_cyan());
                }
            }
            Ok(())
        }
        "diet" => {
            if rest.is_empty() {
                println!("Current diet filter: {}", session.diet.to_string().bright_yellow());
                return Ok(());
            }
            let diet: Diet = rest.parse().map_err(|e| format!("{}", e))?;
            session.diet = diet;
            println!("🥗 Diet filter set to: {}", diet.to_string().bright_yellow());
            Ok(())
        }
        "search" | "find" => search(rest, finder, session).await,
        "show" => {
            let recipe = result_at(session, rest)?;
            print_card(recipe);
            Ok(())
        }
        "open" => {
            let link = result_at(session, rest)?.share_link();
            webbrowser::open(&link).map_err(|e| format!("Failed to open {}: {}", link, e))?;
            println!("🔗 Opened {}", link.bright_blue());
            Ok(())
        }
        _ => Err(format!("Unknown recipe command: {}", command)),
    }
}

/// Runs a full lookup and prints the resulting recipe list.
pub async fn search(raw_ingredients: &str, finder: &RecipeFinder, session: &mut Session) -> Result<(), String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map_err(|e| e.to_string())?,
    );
    spinner.set_message("Looking for recipes...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let recipes = finder.find_recipes(session, raw_ingredients).await;
    spinner.finish_and_clear();

    if recipes.is_empty() {
        return Ok(());
    }

    println!("\n🍳 {} (diet: {}):", "Recipes".bright_yellow(), session.diet);
    for (i, recipe) in recipes.iter().enumerate() {
        println!(
            "  {}. {} {}",
            i + 1,
            recipe.title.bright_green(),
            format!("[{}]", render::prep_line(recipe)).dimmed()
        );
    }
    println!("\nUse {} for details, {} to keep one.", "show <n>".cyan(), "save <n>".cyan());
    Ok(())
}

pub fn print_card(recipe: &RecipeDetail) {
    let card = render::recipe_card(recipe);
    let mut lines = card.lines();
    if let Some(title) = lines.next() {
        println!("\n{}", title.bright_yellow().bold());
    }
    for line in lines {
        println!("{}", line);
    }
}

/// Parses a 1-based result number against the session's current results.
pub fn parse_index(arg: &str, len: usize) -> Result<usize, String> {
    let n: usize = arg
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a recipe number", arg.trim()))?;
    if n == 0 || n > len {
        return Err(format!("No recipe #{}. The last search returned {} recipes.", n, len));
    }
    Ok(n - 1)
}

fn result_at<'a>(session: &'a Session, arg: &str) -> Result<&'a RecipeDetail, String> {
    let index = parse_index(arg, session.results.len())?;
    Ok(&session.results[index])
}

pub(crate) fn split_command(input: &str) -> (String, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (input.to_lowercase(), ""),
    }
}
