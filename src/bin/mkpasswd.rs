//! Hash a password for the `WAYPOST_AUTH__PASSWORD_HASH` variable.
//! Reads the password from the first argument, or prompts for it.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use waypost::auth::password;

fn main() -> ExitCode {
    let password = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => match prompt() {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: failed to read password: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    if password.is_empty() {
        eprintln!("error: password must not be empty");
        return ExitCode::FAILURE;
    }
    if password.len() < 8 {
        eprintln!("warning: password is shorter than 8 characters");
    }

    match password::hash(&password, password::HASH_COST) {
        Ok(hashed) => {
            println!("{hashed}");
            println!();
            println!("Add this to the service environment (quote it, bcrypt hashes contain '$'):");
            println!("WAYPOST_AUTH__PASSWORD_HASH='{hashed}'");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to hash password: {e}");
            ExitCode::FAILURE
        }
    }
}

fn prompt() -> io::Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
