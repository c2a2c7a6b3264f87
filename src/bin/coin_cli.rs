use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use suilipse::{
    amm,
    config::{AmmCommand, CliArgs, CliConfig, Command, NetworkCommand},
    gateway::{resolve_url, ConnectionRegistry, Gateway},
    rpc::SuiRpcClient,
    wallet::{display_wallet_status, format_sui},
    CoinClient, CoinOutcome,
};
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = CliArgs::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}

async fn run(cli: CliArgs) -> Result<()> {
    let config = CliConfig::load(cli.chain, cli.state_file)?;
    let mut registry = ConnectionRegistry::<SuiRpcClient>::new();
    registry.set_active(&config.network);

    match cli.command {
        Command::Network { command } => run_network(command, &config, &mut registry),

        Command::Account => {
            let client = setup_client(&config)?;
            let address = client.signer_address()?;
            let balance = client.balance(&registry).await?;
            display_wallet_status(
                &address,
                &config.network,
                &resolve_url(&config.network),
                balance,
            );
            Ok(())
        }

        Command::Object { object_id } => {
            let client = setup_client(&config)?;
            let object = client.lookup_coin_object(&registry, &object_id).await?;
            println!("Object: {}", object.id);
            println!("  Type: {}", object.type_tag);
            println!("  Owner: {}", object.owner);
            Ok(())
        }

        Command::MintAndTransfer {
            cap_id,
            amount,
            recipient,
        } => {
            let client = setup_client(&config)?;
            let outcome = client
                .mint_and_transfer(&registry, &cap_id, amount, &recipient)
                .await?;
            print_outcome("Minted and transferred!", &outcome);
            Ok(())
        }

        Command::Transfer {
            coin_id,
            recipient,
            amount,
        } => {
            let client = setup_client(&config)?;
            let outcome = client
                .transfer(&registry, &coin_id, &recipient, amount)
                .await?;
            print_outcome("Transferred!", &outcome);
            Ok(())
        }

        Command::Merge { primary, to_merge } => {
            let client = setup_client(&config)?;
            let outcome = client.merge(&registry, &primary, &to_merge).await?;
            print_outcome("Merged!", &outcome);
            Ok(())
        }

        // pool math needs neither a connection nor a signer
        Command::Amm { command } => run_amm(&command),
    }
}

fn setup_client(config: &CliConfig) -> Result<CoinClient> {
    let credential = config.credential()?;
    let client = CoinClient::new(credential, config.gas_budget, Arc::new(Mutex::new(())));
    info!(
        signer = %client.signer_address()?,
        network = %config.network,
        gas_budget = client.gas_budget(),
        "Coin client ready"
    );
    Ok(client)
}

fn run_network(
    command: NetworkCommand,
    config: &CliConfig,
    registry: &mut ConnectionRegistry<SuiRpcClient>,
) -> Result<()> {
    match command {
        NetworkCommand::List => {
            let active = registry.active_endpoint();
            println!("Networks:");
            for gateway in Gateway::ALL {
                let marker = if active.as_deref() == Some(gateway.name()) {
                    "*"
                } else {
                    " "
                };
                println!("  {marker} {:<8} {}", gateway.name(), gateway.url());
            }
            if let Some(endpoint) = active.filter(|e| Gateway::from_name(e).is_none()) {
                println!("  * {endpoint} (custom RPC URL)");
            }
        }
        NetworkCommand::Use { endpoint } => {
            registry.set_active(&endpoint);
            config.save_network(&endpoint)?;
            println!("Active network: {endpoint} ({})", resolve_url(&endpoint));
        }
    }
    Ok(())
}

fn run_amm(command: &AmmCommand) -> Result<()> {
    let overflow = || anyhow!("result overflows or divides by zero");
    match *command {
        AmmCommand::Quote {
            reserve_a,
            reserve_b,
            input_a,
        } => {
            let output = amm::quote(reserve_a, reserve_b, input_a).ok_or_else(overflow)?;
            println!("Quote: {output}");
        }
        AmmCommand::Input {
            dx,
            reserve_x,
            reserve_y,
            fee_bps,
        } => {
            let output =
                amm::get_input(dx, reserve_x, reserve_y, fee_bps).ok_or_else(overflow)?;
            println!("Output: {output} (fee {fee_bps} bps)");
        }
        AmmCommand::Lp {
            reserve_x,
            reserve_y,
            dx,
            dy,
            lp_supply,
        } => {
            let minted =
                amm::minted_lp_after_increase_liquidity(reserve_x, reserve_y, dx, dy, lp_supply)
                    .ok_or_else(overflow)?;
            println!("Minted LP: {minted}");
        }
        AmmCommand::Withdraw {
            reserve_x,
            reserve_y,
            lp_value,
            lp_supply,
        } => {
            let (x, y) = amm::withdraw_liquidity(reserve_x, reserve_y, lp_value, lp_supply)
                .ok_or_else(overflow)?;
            println!("Withdrawn: x={x} y={y}");
        }
    }
    Ok(())
}

fn print_outcome(headline: &str, outcome: &CoinOutcome) {
    println!("{headline}");
    println!("Transaction digest: {}", outcome.digest);
    if outcome.gas_cost >= 0 {
        println!("Gas cost: {} SUI", format_sui(outcome.gas_cost as u64));
    } else {
        println!("Gas rebate: {} SUI", format_sui(outcome.gas_cost.unsigned_abs() as u64));
    }
    for id in &outcome.created {
        println!("  Created: {id}");
    }
    for id in &outcome.mutated {
        println!("  Mutated: {id}");
    }
}
