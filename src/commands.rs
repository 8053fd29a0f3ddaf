// Command layer: runs one parsed command against the client and prints the
// result. The functions are small and synchronous; every command is a single
// service call followed by some formatting.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::cli::{
    AccountArgs, AccountCommands, AliasCommands, AuthCommands, BccCommands, Commands,
    DomainCommands,
};
use crate::client::Client;
use crate::config::Config;
use crate::error::Error;
use crate::model::{Account, Alias, Bcc, Domain};
use crate::prompt::{read_and_confirm_password, read_password};
use crate::services::{BccKind, BccService};
use crate::version::Version;

/// Run `command`. `config_path` is where login tokens are saved and cleared.
pub fn run(command: Commands, client: &Client, config_path: &Path) -> Result<()> {
    match command {
        Commands::Auth(cmd) => auth(cmd, client, config_path),
        Commands::Domain(cmd) => domain(cmd, client),
        Commands::Account(cmd) => account(cmd, client),
        Commands::Alias(cmd) => alias(cmd, client),
        Commands::SenderBcc(cmd) => bcc(cmd, client.bccs(BccKind::Outgoing)),
        Commands::RecipientBcc(cmd) => bcc(cmd, client.bccs(BccKind::Incoming)),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Report a failed command on stderr. When the server rejected the stored
/// token anywhere in the error chain, the saved credentials are cleared so
/// the next run starts logged out. Returns whether they were cleared.
pub fn handle_error(err: &anyhow::Error, config_path: &Path) -> bool {
    let auth_expired = err
        .chain()
        .any(|cause| cause.downcast_ref::<Error>().is_some_and(Error::is_auth_expired));
    if auth_expired {
        if let Err(e) = Config::clear_auth(config_path) {
            warn!("could not clear saved credentials: {e}");
        }
    }
    eprintln!("{} {err:#}", "Error:".red().bold());
    auth_expired
}

pub fn print_version() {
    println!("{}", Version::current().full_version());
}

fn auth(cmd: AuthCommands, client: &Client, config_path: &Path) -> Result<()> {
    match cmd {
        AuthCommands::Login { login } => {
            let password = read_password("Password")?;
            let auth = client.auth.login(&login, &password)?;
            Config::save_auth(config_path, &login, &auth.auth_token, &auth.refresh_token)?;
            success("Logged in successfully.");
        }
        AuthCommands::Logout => {
            // forget local tokens even if the server call fails
            Config::clear_auth(config_path)?;
            client.auth.logout(client.login(), client.refresh_token())?;
            success("Logged out.");
        }
    }
    Ok(())
}

fn domain(cmd: DomainCommands, client: &Client) -> Result<()> {
    let domains = &client.domains;
    match cmd {
        DomainCommands::List => print!("{}", domain_table(&domains.list()?)),
        DomainCommands::Show { domain } => print!("{}", domain_details(&domains.get(&domain)?)),
        DomainCommands::Add { domain } => {
            domains.create(&domain)?;
            success(&format!("Domain '{domain}' added."));
        }
        DomainCommands::Delete { domain } => {
            domains.delete(&domain)?;
            success(&format!("Domain '{domain}' deleted."));
        }
        DomainCommands::Rename { domain, new_name } => {
            domains.rename(&domain, &new_name)?;
            success(&format!("Domain '{domain}' renamed to '{new_name}'."));
        }
        DomainCommands::Disable { domain } => {
            domains.disable(&domain)?;
            success(&format!("Domain '{domain}' disabled."));
        }
        DomainCommands::Enable { domain } => {
            domains.enable(&domain)?;
            success(&format!("Domain '{domain}' enabled."));
        }
    }
    Ok(())
}

fn account(cmd: AccountCommands, client: &Client) -> Result<()> {
    let accounts = &client.accounts;
    match cmd {
        AccountCommands::List { domain } => {
            print!("{}", account_table(&domain, &accounts.list(&domain)?))
        }
        AccountCommands::Show(AccountArgs { domain, username }) => {
            print!("{}", account_details(&domain, &accounts.get(&domain, &username)?))
        }
        AccountCommands::Add(AccountArgs { domain, username }) => {
            let password = read_and_confirm_password()?;
            accounts.create(&domain, &username, &password)?;
            success(&format!("Account '{username}@{domain}' added."));
        }
        AccountCommands::Delete(AccountArgs { domain, username }) => {
            accounts.delete(&domain, &username)?;
            success(&format!("Account '{username}@{domain}' deleted."));
        }
        AccountCommands::Disable(AccountArgs { domain, username }) => {
            accounts.disable(&domain, &username)?;
            success(&format!("Account '{username}@{domain}' disabled."));
        }
        AccountCommands::Enable(AccountArgs { domain, username }) => {
            accounts.enable(&domain, &username)?;
            success(&format!("Account '{username}@{domain}' enabled."));
        }
        AccountCommands::Rename {
            account: AccountArgs { domain, username },
            new_name,
        } => {
            accounts.rename(&domain, &username, &new_name)?;
            success(&format!("Account '{username}@{domain}' renamed to '{new_name}@{domain}'."));
        }
        AccountCommands::Password(AccountArgs { domain, username }) => {
            let password = read_and_confirm_password()?;
            accounts.change_password(&domain, &username, &password)?;
            success(&format!("Password of '{username}@{domain}' changed."));
        }
    }
    Ok(())
}

fn alias(cmd: AliasCommands, client: &Client) -> Result<()> {
    let aliases = &client.aliases;
    match cmd {
        AliasCommands::List { domain } => print!("{}", alias_table(&domain, &aliases.list(&domain)?)),
        AliasCommands::Show {
            domain,
            alias,
            email: Some(email),
        } => print!("{}", alias_details(&aliases.get_for_email(&domain, &alias, &email)?)),
        AliasCommands::Show {
            domain,
            alias,
            email: None,
        } => print!("{}", alias_table(&domain, &aliases.get(&domain, &alias)?)),
        AliasCommands::Add {
            domain,
            alias,
            email,
        } => {
            aliases.create(&domain, &alias, &email)?;
            success(&format!("Alias '{alias}@{domain}' now forwards to '{email}'."));
        }
        AliasCommands::Delete {
            domain,
            alias,
            email: Some(email),
        } => {
            aliases.delete(&domain, &alias, &email)?;
            success(&format!("Alias '{alias}@{domain}' no longer forwards to '{email}'."));
        }
        AliasCommands::Delete {
            domain,
            alias,
            email: None,
        } => {
            let count = with_spinner("Deleting alias recipients...", || {
                aliases.delete_all(&domain, &alias)
            })?;
            success(&format!("Alias '{alias}@{domain}' deleted ({count} recipients)."));
        }
        AliasCommands::Disable {
            domain,
            alias,
            email,
        } => {
            aliases.disable(&domain, &alias, &email)?;
            success(&format!("Alias '{alias}@{domain}' disabled for '{email}'."));
        }
        AliasCommands::Enable {
            domain,
            alias,
            email,
        } => {
            aliases.enable(&domain, &alias, &email)?;
            success(&format!("Alias '{alias}@{domain}' enabled for '{email}'."));
        }
        AliasCommands::Rename {
            domain,
            alias,
            new_name,
            email: Some(email),
        } => {
            aliases.rename(&domain, &alias, &email, &new_name)?;
            success(&format!("Alias '{alias}@{domain}' renamed to '{new_name}' for '{email}'."));
        }
        AliasCommands::Rename {
            domain,
            alias,
            new_name,
            email: None,
        } => {
            let renamed = with_spinner("Renaming alias recipients...", || {
                aliases.rename_all(&domain, &alias, &new_name)
            })?;
            print!("{}", alias_table(&domain, &renamed));
        }
    }
    Ok(())
}

fn bcc(cmd: BccCommands, bccs: &BccService) -> Result<()> {
    let label = match bccs.kind() {
        BccKind::Incoming => "Recipient BCC",
        BccKind::Outgoing => "Sender BCC",
    };
    match cmd {
        BccCommands::Show(AccountArgs { domain, username }) => {
            print!("{}", bcc_details(&bccs.get(&domain, &username)?))
        }
        BccCommands::Add {
            account: AccountArgs { domain, username },
            recipient,
        } => {
            bccs.create(&domain, &username, &recipient)?;
            success(&format!("{label} of '{username}@{domain}' set to '{recipient}'."));
        }
        BccCommands::Delete(AccountArgs { domain, username }) => {
            bccs.delete(&domain, &username)?;
            success(&format!("{label} of '{username}@{domain}' deleted."));
        }
        BccCommands::Enable(AccountArgs { domain, username }) => {
            bccs.enable(&domain, &username)?;
            success(&format!("{label} of '{username}@{domain}' enabled."));
        }
        BccCommands::Disable(AccountArgs { domain, username }) => {
            bccs.disable(&domain, &username)?;
            success(&format!("{label} of '{username}@{domain}' disabled."));
        }
        BccCommands::ChangeRecipient {
            account: AccountArgs { domain, username },
            recipient,
        } => {
            bccs.change_recipient(&domain, &username, &recipient)?;
            success(&format!("{label} of '{username}@{domain}' now goes to '{recipient}'."));
        }
    }
    Ok(())
}

fn success(message: &str) {
    println!("{}", message.green());
}

/// Show a spinner on stderr while `f` runs.
fn with_spinner<T>(message: &'static str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}

fn date(dt: &Option<DateTime<Utc>>) -> String {
    dt.as_ref()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn domain_table(domains: &[Domain]) -> String {
    let mut out = String::from("Domains:\n");
    out += &format!(
        "{:<5}{:<30}{:<10}{:<12}{:<12}\n",
        "ID", "Name", "Enabled", "Created", "Updated"
    );
    for d in domains {
        out += &format!(
            "{:<5}{:<30}{:<10}{:<12}{:<12}\n",
            d.id,
            d.name,
            d.enabled,
            date(&d.created),
            date(&d.updated)
        );
    }
    out
}

fn domain_details(d: &Domain) -> String {
    details(&[
        ("ID", d.id.to_string()),
        ("Domain Name", d.name.clone()),
        ("Enabled", d.enabled.to_string()),
        ("Created", date(&d.created)),
        ("Updated", date(&d.updated)),
    ])
}

fn account_table(domain: &str, accounts: &[Account]) -> String {
    let mut out = format!("Accounts for '{domain}':\n");
    out += &format!(
        "{:<5}{:<30}{:<10}{:<12}{:<12}\n",
        "ID", "Email Address", "Enabled", "Created", "Updated"
    );
    for a in accounts {
        out += &format!(
            "{:<5}{:<30}{:<10}{:<12}{:<12}\n",
            a.id,
            format!("{}@{domain}", a.username),
            a.enabled,
            date(&a.created),
            date(&a.updated)
        );
    }
    out
}

fn account_details(domain: &str, a: &Account) -> String {
    details(&[
        ("ID", a.id.to_string()),
        ("Email", format!("{}@{domain}", a.username)),
        ("Enabled", a.enabled.to_string()),
        ("Created", date(&a.created)),
        ("Updated", date(&a.updated)),
    ])
}

fn alias_table(domain: &str, aliases: &[Alias]) -> String {
    let mut out = format!("Aliases for '{domain}':\n");
    out += &format!(
        "{:<5}{:<30}{:<30}{:<10}{:<12}{:<12}\n",
        "ID", "Alias", "Email Address", "Enabled", "Created", "Updated"
    );
    for a in aliases {
        out += &format!(
            "{:<5}{:<30}{:<30}{:<10}{:<12}{:<12}\n",
            a.id,
            a.name,
            a.email,
            a.enabled,
            date(&a.created),
            date(&a.updated)
        );
    }
    out
}

fn alias_details(a: &Alias) -> String {
    details(&[
        ("ID", a.id.to_string()),
        ("Alias", a.name.clone()),
        ("Email", a.email.clone()),
        ("Enabled", a.enabled.to_string()),
        ("Created", date(&a.created)),
        ("Updated", date(&a.updated)),
    ])
}

fn bcc_details(b: &Bcc) -> String {
    details(&[
        ("ID", b.id.to_string()),
        ("Email", b.email.clone()),
        ("Enabled", b.enabled.to_string()),
        ("Created", date(&b.created)),
        ("Updated", date(&b.updated)),
    ])
}

fn details(rows: &[(&str, String)]) -> String {
    rows.iter()
        .map(|(label, value)| format!("{label:<12}:{value:>30}\n"))
        .collect()
}
