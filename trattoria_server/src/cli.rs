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
    // TOG_AUTH_SECRET and TOG_PAYU_CLIENT_SECRET are deliberately absent
    const DISPLAY_ENVS: [&str; 15] = [
        "RUST_LOG",
        "TOG_HOST",
        "TOG_PORT",
        "TOG_DATABASE_URL",
        "TOG_RUN_MIGRATIONS",
        "TOG_USE_X_FORWARDED_FOR",
        "TOG_USE_FORWARDED",
        "TOG_PAYU_OAUTH_URL",
        "TOG_PAYU_ORDER_URL",
        "TOG_PAYU_API_URL",
        "TOG_PAYU_CLIENT_ID",
        "TOG_PAYU_POS_ID",
        "TOG_FRONT_BASE_URL",
        "TOG_DEFAULT_CURRENCY",
        "TOG_PAYU_LANGUAGE",
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
