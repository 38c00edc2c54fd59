//! Password resolution: flag, environment, prompt, or generation.

use std::env;
use std::io::{self, Write as _};

use rand::Rng;
use rand::rngs::OsRng;

use crate::error::CliError;

const PASSWORD_ENV: &str = "LETHE_PASSWORD";
const GENERATED_LEN: usize = 16;
const CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Resolve the password for encryption. Offers to generate one when nothing
/// is supplied; non-interactive mode generates without asking.
pub fn resolve_for_encrypt(
    flag: Option<String>,
    non_interactive: bool,
) -> Result<String, CliError> {
    if let Some(password) = from_flag_or_env(flag) {
        return Ok(password);
    }

    let generate = if non_interactive { true } else { prompt_choice()? };

    if generate {
        let password = generate_password(GENERATED_LEN);
        println!("Generated random password: {password}");
        return Ok(password);
    }

    let password = rpassword::prompt_password("Enter password: ")?;
    let confirmation = rpassword::prompt_password("Confirm password: ")?;
    if password != confirmation {
        return Err(CliError::PasswordMismatch);
    }

    Ok(password)
}

/// Resolve the password for decryption. There is nothing to generate here:
/// without the original password the file is unreadable.
pub fn resolve_for_decrypt(
    flag: Option<String>,
    non_interactive: bool,
) -> Result<String, CliError> {
    if let Some(password) = from_flag_or_env(flag) {
        return Ok(password);
    }

    if non_interactive {
        return Err(CliError::MissingPassword);
    }

    Ok(rpassword::prompt_password("Enter password: ")?)
}

fn from_flag_or_env(flag: Option<String>) -> Option<String> {
    if let Some(password) = flag.filter(|p| !p.is_empty()) {
        return Some(password);
    }

    match env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => {
            println!("Using password from environment variable {PASSWORD_ENV}");
            Some(password)
        },
        _ => None,
    }
}

fn prompt_choice() -> Result<bool, CliError> {
    print!("Do you want to (p)rovide a password or (g)enerate a random one? [p/g]: ");
    io::stdout().flush()?;

    let mut choice = String::new();
    io::stdin().read_line(&mut choice)?;

    match choice.trim().to_lowercase().as_str() {
        "p" | "provide" => Ok(false),
        "g" | "generate" => Ok(true),
        other => Err(CliError::InvalidChoice { choice: other.to_string() }),
    }
}

fn generate_password(length: usize) -> String {
    let mut rng = OsRng;
    (0..length).map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char).collect()
}
