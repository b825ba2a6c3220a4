use colored::Colorize;

use crate::database::Accounts;
use crate::food::recipes::RecipeFinder;
use crate::session::{Notice, NoticeLevel, Session};

mod account;
mod system;

pub mod food_cmd;

pub struct CommandHandler {
    finder: RecipeFinder,
    accounts: Option<Accounts>,
    session: Session,
}

impl CommandHandler {
    pub fn new(finder: RecipeFinder, accounts: Option<Accounts>) -> Self {
        Self {
            finder,
            accounts,
            session: Session::new(),
        }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        let command = input
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();

        let result = match command.as_str() {
            "help" | "exit" | "quit" => system::handle_command(&command),
            "suggest" | "diet" | "search" | "find" | "show" | "open" => {
                food_cmd::handle_command(input, &self.finder, &mut self.session).await
            }
            "login" | "signup" | "logout" | "whoami" | "save" | "favorites" => {
                account::handle_command(input, self.accounts.as_ref(), &mut self.session).await
            }
            // Anything else is treated as an ingredient list
            _ => food_cmd::search(input, &self.finder, &mut self.session).await,
        };

        self.print_notices();
        result
    }

    fn print_notices(&mut self) {
        for notice in self.session.notices.take() {
            println!("{}", format_notice(&notice));
        }
    }
}

fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("ℹ️  {}", notice.message.cyan()),
        NoticeLevel::Success => format!("✅ {}", notice.message.green()),
        NoticeLevel::Warning => format!("⚠️  {}", notice.message.yellow()),
        NoticeLevel::Error => format!("❌ {}", notice.message.red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::config::FoodConfig;

    #[tokio::test]
    async fn test_help_ignores_trailing_words() {
        let finder = RecipeFinder::from_config(&FoodConfig::new("test-key")).unwrap();
        let mut handler = CommandHandler::new(finder, None);

        assert!(handler.handle_command("help me").await.is_ok());
        assert!(handler.handle_command("HELP").await.is_ok());
    }
}
