use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 17] = [
        "RUST_LOG",
        "CHECKOUT_HOST",
        "CHECKOUT_PORT",
        "CHECKOUT_DATABASE_URL",
        "CHECKOUT_MAX_DB_CONNECTIONS",
        "CHECKOUT_CURRENCY",
        "CHECKOUT_EVENT_BUFFER_SIZE",
        "CHECKOUT_ORDER_LINK_MASK",
        "CHECKOUT_PRODUCT_LINK_MASK",
        "CHECKOUT_CARD_HOLD_PUBLIC_KEY",
        "CHECKOUT_CARD_HOLD_API_URL",
        "CHECKOUT_CARD_HOLD_CHECKOUT_URL",
        "CHECKOUT_CARD_HOLD_CALLBACK_URL",
        "CHECKOUT_CARD_HOLD_RESULT_URL",
        "CHECKOUT_PARTS_PAY_API_URL",
        "CHECKOUT_PARTS_PAY_RESPONSE_URL",
        "CHECKOUT_PARTS_PAY_REDIRECT_URL",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
