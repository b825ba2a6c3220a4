use colored::Colorize;

pub fn handle_command(input: &str) -> Result<(), String> {
    match input.to_lowercase().as_str() {
        "help" => {
            println!("\n🍽️ {}", "MealMate Commands:".bright_yellow());
            println!("  Just type your ingredients, separated by commas");
            println!("  Example: chicken, rice, garlic");
            println!();

            println!("🔎 Recipe Commands:");
            println!("  search <ingredients>   - Find recipes using these ingredients");
            println!("  suggest <text>         - Suggest ingredient names");
            println!("  diet                   - Show the current diet filter");
            println!("  diet <name>            - Set diet: none, vegan, gluten free, dairy free,");
            println!("                           paleo, ketogenic, low carb");
            println!("  show <n>               - Show recipe #n from the last search");
            println!("  open <n>               - Open the share link of recipe #n");
            println!();

            println!("👤 Account Commands:");
            println!("  signup <email> <password>  - Create an account");
            println!("  login <email> <password>   - Log in");
            println!("  logout                     - Log out");
            println!("  whoami                     - Show the logged in user");
            println!("  save <n>                   - Save recipe #n to favorites");
            println!("  favorites                  - View favorite recipes");
            println!();

            println!("⚙️ System Commands:");
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
            Ok(())
        },
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            std::process::exit(0);
        },
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string())
    }
}
