//! Command line interface definition

use clap::{Parser, Subcommand};
use pkgsig_types::{PackageKey, Uuid};
use std::path::PathBuf;

/// pkgsig - package signature validation
#[derive(Parser)]
#[command(name = "pkgsig")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate detached package signatures against a trust store")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use alternate state database
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate the signature of a package file and record the result
    Validate {
        /// Package file; detached signatures are looked up next to it
        path: PathBuf,

        /// Package id
        #[arg(long)]
        id: String,

        /// Package version
        #[arg(long)]
        version: String,

        /// Key under which the signing state is recorded
        #[arg(long, allow_negative_numbers = true)]
        package_key: PackageKey,

        /// Correlation id (generated when omitted)
        #[arg(long)]
        validation_id: Option<Uuid>,
    },

    /// Trusted certificate management
    #[command(subcommand)]
    Trust(TrustCommands),

    /// Show the recorded signing state of a package
    Status {
        #[arg(allow_negative_numbers = true)]
        package_key: PackageKey,
    },
}

#[derive(Subcommand)]
pub enum TrustCommands {
    /// Trust a minisign public key
    Add {
        /// Base64 public key line from a minisign .pub file
        public_key: String,

        /// Human-readable owner of the key
        #[arg(long)]
        subject: Option<String>,
    },

    /// List trusted certificates
    List,

    /// Stop trusting a certificate
    Remove {
        /// Thumbprint as shown by `trust list`
        thumbprint: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validate_with_global_flags() {
        let cli = Cli::try_parse_from([
            "pkgsig",
            "validate",
            "pkg.tar",
            "--id",
            "Foo",
            "--version",
            "1.0.0",
            "--package-key",
            "42",
            "--validation-id",
            "b777135f-1aac-4ec2-a3eb-1f64fe1880d5",
            "--json",
        ])
        .unwrap();

        assert!(cli.global.json);
        match cli.command {
            Commands::Validate {
                path,
                id,
                version,
                package_key,
                validation_id,
            } => {
                assert_eq!(path, PathBuf::from("pkg.tar"));
                assert_eq!(id, "Foo");
                assert_eq!(version, "1.0.0");
                assert_eq!(package_key, 42);
                assert_eq!(
                    validation_id.map(|v| v.to_string()).as_deref(),
                    Some("b777135f-1aac-4ec2-a3eb-1f64fe1880d5")
                );
            }
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn validate_requires_identity() {
        assert!(Cli::try_parse_from(["pkgsig", "validate", "pkg.tar"]).is_err());
    }

    #[test]
    fn parses_trust_commands() {
        let cli = Cli::try_parse_from([
            "pkgsig",
            "--config",
            "/etc/pkgsig.toml",
            "trust",
            "add",
            "RWQf6LRCGA9i53mlYecO4IzT51TGPpvWucNSCh1CBM0QTaLn73Y7GFO3",
            "--subject",
            "Demo",
        ])
        .unwrap();

        assert_eq!(cli.global.config, Some(PathBuf::from("/etc/pkgsig.toml")));
        assert!(matches!(
            cli.command,
            Commands::Trust(TrustCommands::Add { subject: Some(ref s), .. }) if s == "Demo"
        ));

        let cli = Cli::try_parse_from(["pkgsig", "trust", "remove", "0123456789abcdef"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Trust(TrustCommands::Remove { .. })
        ));
    }

    #[test]
    fn rejects_malformed_validation_id() {
        assert!(Cli::try_parse_from([
            "pkgsig",
            "validate",
            "pkg.tar",
            "--id",
            "Foo",
            "--version",
            "1.0.0",
            "--package-key",
            "1",
            "--validation-id",
            "not-a-uuid",
        ])
        .is_err());
    }
}
