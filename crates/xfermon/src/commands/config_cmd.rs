//! Config subcommand handlers.

use std::io::Read as _;

use secrecy::{ExposeSecret, SecretString};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Show: effective file contents, tokens redacted ──────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config()?;
            for profile in cfg.profiles.values_mut() {
                if profile.access_token.is_some() {
                    profile.access_token = Some(REDACTED.into());
                }
            }
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg)?
                }
                structured => output::render_structured(structured, &cfg)?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        // ── SetToken: stdin → keyring ───────────────────────────────
        ConfigCommand::SetToken => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            let token = SecretString::from(raw.trim().to_owned());
            if token.expose_secret().is_empty() {
                return Err(CliError::Validation {
                    field: "access_token".into(),
                    reason: "no token on stdin".into(),
                });
            }

            let entry = keyring::Entry::new(
                xfermon_config::KEYRING_SERVICE,
                &format!("{profile_name}/access-token"),
            )
            .map_err(|e| CliError::Keyring {
                message: format!("failed to access keyring: {e}"),
            })?;
            entry
                .set_password(token.expose_secret())
                .map_err(|e| CliError::Keyring {
                    message: format!("failed to store access token: {e}"),
                })?;

            if !global.quiet {
                eprintln!("Access token stored in system keyring for profile '{profile_name}'");
            }
            Ok(())
        }
    }
}
