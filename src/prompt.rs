// Terminal password prompts. Input is never echoed (`dialoguer::Password`).

use dialoguer::Password;

use crate::error::{Error, Result};

/// Attempts allowed before giving up on a mismatched confirmation.
pub const MAX_PROMPT_RETRIES: usize = 3;

/// Read one password from the terminal.
pub fn read_password(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| Error::Prompt(format!("failed to read password: {e}")))
}

/// Read a password and its confirmation, retrying on mismatch.
pub fn read_and_confirm_password() -> Result<String> {
    confirm_with(read_password, |msg| eprintln!("{msg}"))
}

fn confirm_with(
    mut read: impl FnMut(&str) -> Result<String>,
    mut notify: impl FnMut(&str),
) -> Result<String> {
    for attempt in 1..=MAX_PROMPT_RETRIES {
        let password = read("Password")?;
        let confirmation = read("Confirm password")?;
        if password == confirmation {
            return Ok(password);
        }
        if attempt < MAX_PROMPT_RETRIES {
            notify("Passwords don't match!");
        }
    }
    Err(Error::Prompt("Passwords don't match".into()))
}
