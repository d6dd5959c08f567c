// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rakan Tani - command-line client for the rice advisory backend.
//!
//! This is the binary entry point: onboarding submission, the UAT chat
//! shell, and two offline helpers.

mod onboard;
mod uat;

use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rakan_config::RakanConfig;
use rakan_core::{ConnectionState, RakanError, Transport};
use rakan_identity::{AccessPacket, PacketKey, packet_link, seal_packet};
use rakan_schedule::{reference_flowchart, reference_schedule};

/// How long a command waits for the broker handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rakan Tani - rice advisory client.
#[derive(Parser, Debug)]
#[command(name = "rakan", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a farmer's plot, variety, and current stage.
    Onboard(onboard::OnboardArgs),
    /// Chat with the assistant as a farmer.
    Uat(uat::UatArgs),
    /// Print the reference schedule flowchart.
    Schedule,
    /// Seal an access packet with the configured passphrase.
    Packet {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        jwt: String,
        /// Print a full link on this base URL instead of the bare packet.
        #[arg(long)]
        link_base: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match rakan_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            rakan_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Onboard(args)) => onboard::run_onboard(&config, args).await,
        Some(Commands::Uat(args)) => uat::run_uat(&config, args).await,
        Some(Commands::Schedule) => print_reference_schedule(),
        Some(Commands::Packet {
            phone,
            jwt,
            link_base,
        }) => print_packet(&config, phone, jwt, link_base.as_deref()),
        None => {
            println!("rakan: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

fn print_reference_schedule() -> Result<(), RakanError> {
    let days = reference_schedule()?;
    print!("{}", reference_flowchart(&days));
    Ok(())
}

fn print_packet(
    config: &RakanConfig,
    phone: String,
    jwt: String,
    link_base: Option<&str>,
) -> Result<(), RakanError> {
    let key = packet_key(config)?;
    let sealed = seal_packet(
        &AccessPacket {
            phone: Some(phone),
            jwt: Some(jwt),
        },
        &key,
    )?;
    match link_base {
        Some(base) => println!("{}", packet_link(base, &sealed)),
        None => println!("{sealed}"),
    }
    Ok(())
}

/// Derives the packet key from `identity.packet_passphrase`.
pub(crate) fn packet_key(config: &RakanConfig) -> Result<PacketKey, RakanError> {
    config
        .identity
        .passphrase()
        .map(PacketKey::from_passphrase)
        .ok_or_else(|| {
            RakanError::Config(
                "identity.packet_passphrase is not set (config file or RAKAN_IDENTITY_PACKET_PASSPHRASE)"
                    .into(),
            )
        })
}

/// Starts a connection attempt and waits until it settles.
///
/// Returns `Connected` or `Failed`, or a timeout error when the broker
/// never answered within [`CONNECT_TIMEOUT`].
pub(crate) async fn establish(transport: &dyn Transport) -> Result<ConnectionState, RakanError> {
    let mut state = transport.connection();
    transport.connect();
    let settled = tokio::time::timeout(
        CONNECT_TIMEOUT,
        state.wait_for(|s| matches!(s, ConnectionState::Connected | ConnectionState::Failed)),
    )
    .await
    .map_err(|_| RakanError::Timeout {
        duration: CONNECT_TIMEOUT,
    })?;
    settled
        .map(|state| *state)
        .map_err(|_| RakanError::Internal(format!("{} dropped its state channel", transport.name())))
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rakan={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rakan_test_utils::MockTransport;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn packet_arguments_parse() {
        let cli = Cli::try_parse_from(["rakan", "packet", "--phone", "6012", "--jwt", "a.b.c"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Packet { ref phone, link_base: None, .. }) if phone == "6012"
        ));
    }

    #[tokio::test]
    async fn establish_returns_connected_state() {
        let mock = MockTransport::new();
        assert_eq!(establish(&mock).await.unwrap(), ConnectionState::Connected);
        assert_eq!(mock.connect_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn establish_times_out_on_silent_broker() {
        let mock = MockTransport::new();
        mock.set_state(ConnectionState::Connecting);
        assert!(matches!(
            establish(&mock).await,
            Err(RakanError::Timeout { duration }) if duration == CONNECT_TIMEOUT
        ));
    }

    #[test]
    fn missing_passphrase_is_a_config_error() {
        let config = RakanConfig::default();
        assert!(matches!(packet_key(&config), Err(RakanError::Config(_))));
    }
}
