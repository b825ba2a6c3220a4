use colored::Colorize;

use super::food_cmd::{parse_index, split_command};
use crate::database::Accounts;
use crate::session::Session;

pub async fn handle_command(
    input: &str,
    accounts: Option<&Accounts>,
    session: &mut Session,
) -> Result<(), String> {
    let (command, rest) = split_command(input);

    match command.as_str() {
        "logout" => {
            if !session.is_logged_in() {
                println!("You are not logged in.");
            }
            session.logout();
            return Ok(());
        }
        "whoami" => {
            match &session.user {
                Some(user) => println!("Logged in as {}", user.email.bright_yellow()),
                None => println!("Not logged in. Use: login <email> <password>"),
            }
            return Ok(());
        }
        _ => {}
    }

    let accounts = accounts.ok_or_else(|| {
        "Accounts are unavailable: the identity service failed to initialize.".to_string()
    })?;

    match command.as_str() {
        "login" | "signup" => {
            let mut parts = rest.split_whitespace();
            let (Some(email), Some(password)) = (parts.next(), parts.next()) else {
                println!("Usage: {} <email> <password>", command);
                return Ok(());
            };

            if command == "login" {
                session.login(accounts.identity.as_ref(), email, password).await;
            } else {
                session.signup(accounts.identity.as_ref(), email, password).await;
            }
            Ok(())
        }
        "save" => {
            if !session.is_logged_in() {
                session.notices.warning("Log in to save favorites.");
                return Ok(());
            }
            if rest.is_empty() {
                println!("Usage: save <n>");
                return Ok(());
            }
            let index = parse_index(rest, session.results.len())?;
            session.save_favorite(accounts.favorites.as_ref(), index).await;
            Ok(())
        }
        "favorites" => {
            let favorites = session.favorites(accounts.favorites.as_ref()).await;
            if !favorites.is_empty() {
                println!("\n⭐ {}", "Your Favorite Recipes:".bright_yellow());
                for recipe in favorites {
                    println!("  - {} {}", recipe.title.bright_green(), recipe.share_link().dimmed());
                }
            }
            Ok(())
        }
        _ => Err(format!("Unknown account command: {}", command)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    #[tokio::test]
    async fn test_save_requires_login_before_index() {
        let accounts = Accounts::from_database(Database::open_in_memory().await.unwrap());
        let mut session = Session::new();

        assert!(handle_command("save 1", Some(&accounts), &mut session).await.is_ok());
        let messages: Vec<_> = session.notices.iter().map(|n| n.message.clone()).collect();
        assert_eq!(messages, vec!["Log in to save favorites."]);
    }
}
