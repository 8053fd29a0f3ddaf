// Command line surface. Every leaf command maps to exactly one service call;
// `commands` runs them.

use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "emailctl")]
#[command(about = "emailctl is a command line interface to the Postfix REST Server")]
pub struct Cli {
    /// Config file (default is $HOME/.emailctl.toml)
    #[arg(long, global = true, value_name = "FILE", env = "EMAILCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication commands
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Domain commands
    #[command(subcommand)]
    Domain(DomainCommands),
    /// Account commands
    #[command(subcommand)]
    Account(AccountCommands),
    /// Alias commands
    #[command(subcommand)]
    Alias(AliasCommands),
    /// BCC rules for mail sent by an account
    #[command(subcommand)]
    SenderBcc(BccCommands),
    /// BCC rules for mail received by an account
    #[command(subcommand)]
    RecipientBcc(BccCommands),
    /// Print the version number of emailctl
    Version,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Log in using the given email address
    #[command(visible_alias = "l")]
    Login {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        login: String,
    },
    /// Log out and forget the saved tokens
    Logout,
}

#[derive(Subcommand, Debug)]
pub enum DomainCommands {
    /// List all domains
    #[command(visible_alias = "l")]
    List,
    /// Show information about a domain
    #[command(visible_alias = "s")]
    Show {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
    },
    /// Add a new domain
    #[command(visible_alias = "a")]
    Add {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
    },
    /// Delete a domain
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
    },
    /// Rename a domain
    #[command(visible_alias = "r")]
    Rename {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        new_name: String,
    },
    /// Disable a domain
    #[command(visible_alias = "d")]
    Disable {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
    },
    /// Enable a domain
    #[command(visible_alias = "e")]
    Enable {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
    },
}

/// Domain and username of an account.
#[derive(Args, Debug)]
pub struct AccountArgs {
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub domain: String,
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub username: String,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// List all accounts of a domain
    #[command(visible_alias = "l")]
    List {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
    },
    /// Show an account
    #[command(visible_alias = "s")]
    Show(AccountArgs),
    /// Add a new account (prompts for the password)
    #[command(visible_alias = "a")]
    Add(AccountArgs),
    /// Delete an account
    #[command(visible_alias = "rm")]
    Delete(AccountArgs),
    /// Disable an account
    #[command(visible_alias = "d")]
    Disable(AccountArgs),
    /// Enable an account
    #[command(visible_alias = "e")]
    Enable(AccountArgs),
    /// Rename an account
    #[command(visible_alias = "r")]
    Rename {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        new_name: String,
    },
    /// Change the password of an account
    #[command(visible_alias = "p")]
    Password(AccountArgs),
}

#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// List the aliases of a domain
    #[command(visible_alias = "l")]
    List {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
    },
    /// Show the recipients of an alias, or one recipient mapping
    #[command(visible_alias = "s")]
    Show {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        alias: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        email: Option<String>,
    },
    /// Forward an alias to a recipient
    #[command(visible_alias = "a")]
    Add {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        alias: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        email: String,
    },
    /// Delete one recipient of an alias, or the whole alias when no email is given
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        alias: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        email: Option<String>,
    },
    /// Disable forwarding of an alias to a recipient
    #[command(visible_alias = "d")]
    Disable {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        alias: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        email: String,
    },
    /// Enable forwarding of an alias to a recipient
    #[command(visible_alias = "e")]
    Enable {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        alias: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        email: String,
    },
    /// Rename one recipient mapping, or every mapping when no email is given
    #[command(visible_alias = "r")]
    Rename {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        domain: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        alias: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        new_name: String,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        email: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BccCommands {
    /// Show the BCC rule of an account
    #[command(visible_alias = "s")]
    Show(AccountArgs),
    /// Set the BCC recipient of an account
    #[command(visible_alias = "a")]
    Add {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        recipient: String,
    },
    /// Delete the BCC rule of an account
    #[command(visible_alias = "rm")]
    Delete(AccountArgs),
    /// Enable the BCC rule of an account
    #[command(visible_alias = "e")]
    Enable(AccountArgs),
    /// Disable the BCC rule of an account
    #[command(visible_alias = "d")]
    Disable(AccountArgs),
    /// Change the recipient of an existing BCC rule
    ChangeRecipient {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        recipient: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_optional_alias_email() {
        let cli = Cli::parse_from(["emailctl", "alias", "rename", "x.com", "sales", "team"]);
        match cli.command {
            Commands::Alias(AliasCommands::Rename { email, new_name, .. }) => {
                assert_eq!(new_name, "team");
                assert!(email.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["emailctl", "alias", "rm", "x.com", "sales", "a@x.com"]);
        assert!(matches!(
            cli.command,
            Commands::Alias(AliasCommands::Delete { email: Some(_), .. })
        ));
    }

    #[test]
    fn bcc_namespaces_and_aliases() {
        let cli = Cli::parse_from([
            "emailctl", "-v", "sender-bcc", "change-recipient", "x.com", "jdoe", "a@x.com",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::SenderBcc(BccCommands::ChangeRecipient { account, recipient }) => {
                assert_eq!(account.username, "jdoe");
                assert_eq!(recipient, "a@x.com");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["emailctl", "recipient-bcc", "e", "x.com", "jdoe"]);
        assert!(matches!(cli.command, Commands::RecipientBcc(BccCommands::Enable(_))));
    }

    #[test]
    fn rejects_missing_arguments() {
        assert!(Cli::try_parse_from(["emailctl", "account", "show", "x.com"]).is_err());
        assert!(Cli::try_parse_from(["emailctl", "domain", "rename", "x.com"]).is_err());
    }

    #[test]
    fn rejects_empty_names() {
        assert!(Cli::try_parse_from(["emailctl", "domain", "delete", ""]).is_err());
        assert!(Cli::try_parse_from(["emailctl", "domain", "rename", "x.com", ""]).is_err());
        assert!(Cli::try_parse_from(["emailctl", "account", "show", "x.com", ""]).is_err());
        assert!(Cli::try_parse_from(["emailctl", "alias", "rm", "x.com", "sales", ""]).is_err());
        assert!(Cli::try_parse_from(["emailctl", "domain", "delete", "x.com"]).is_ok());
    }
}
