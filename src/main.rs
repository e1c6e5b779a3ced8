//! `lumerin` - CLI for the Lumerin marketplace contracts

use std::path::PathBuf;

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lumerin_contracts::config::{self, Config};
use lumerin_contracts::{
    CloneFactory, EthClient, LumerinDecoder, LumerinToken, ProviderConfig, RentalTerms,
};

const DEFAULT_RPC: &str = "http://localhost:8545";

#[derive(Debug, Parser)]
#[command(name = "lumerin", version, about = "Lumerin marketplace contract toolkit")]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long)]
    ws: Option<String>,

    /// IPC socket path (Unix only)
    #[arg(long)]
    ipc: Option<PathBuf>,

    /// Clonefactory address, overrides the config file
    #[arg(long)]
    clonefactory: Option<String>,

    /// Lumerin token address, overrides the config file
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all rental contracts cloned by the factory
    List,
    /// Show the rental contract at a factory index
    Contract { index: u64 },
    /// Clone a new rental contract (requires LUMERIN_PRIVATE_KEY)
    Create {
        /// Price in LMR for the full duration
        #[arg(long)]
        price: String,
        /// Price variability limit
        #[arg(long, default_value = "0")]
        limit: String,
        /// Hashrate in hashes per second
        #[arg(long)]
        speed: String,
        /// Duration in seconds
        #[arg(long)]
        length: String,
        /// Validator address
        #[arg(long)]
        validator: String,
        /// Seller public key buyers encrypt against
        #[arg(long)]
        pubkey: String,
    },
    /// Purchase a rental contract (requires LUMERIN_PRIVATE_KEY)
    Purchase {
        /// Rental contract address
        contract: String,
        /// Pool destination encrypted against the seller pubkey
        #[arg(long)]
        cipher_text: String,
    },
    /// Stream factory events until interrupted
    Watch,
    /// Lumerin token (LMR) operations
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
    /// Decode calldata against the embedded ABIs
    Decode {
        /// Hex-encoded calldata, 0x prefix optional
        data: String,
    },
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    /// Name, symbol, decimals and total supply
    Info,
    /// LMR balance of an account
    Balance { account: String },
    /// Remaining allowance from owner to spender
    Allowance { owner: String, spender: String },
    /// Transfer LMR (requires LUMERIN_PRIVATE_KEY)
    Transfer { to: String, amount: String },
    /// Approve a spender (requires LUMERIN_PRIVATE_KEY)
    Approve { spender: String, amount: String },
    /// Burn LMR from the signer's balance (requires LUMERIN_PRIVATE_KEY)
    Burn { amount: String },
    /// Current contract owner
    Owner,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = config::load();

    // Decoding is offline, no node needed
    if let Command::Decode { data } = &args.command {
        return run_decode(data);
    }

    let endpoint = resolve_endpoint(&args, &config)?;
    let client = connect(endpoint).await?;

    let Args {
        clonefactory: clonefactory_addr,
        token: token_addr,
        command,
        ..
    } = args;

    match command {
        Command::List => {
            let factory = factory(clonefactory_addr.as_deref(), &config, &client)?;
            let contracts = factory.contract_list().await?;
            if contracts.is_empty() {
                println!("No rental contracts cloned yet");
            }
            for (index, address) in contracts.iter().enumerate() {
                println!("{index:4}  {address}");
            }
        }
        Command::Contract { index } => {
            let factory = factory(clonefactory_addr.as_deref(), &config, &client)?;
            let address = factory.contract_at(U256::from(index)).await?;
            println!("{address}");
        }
        Command::Create {
            price,
            limit,
            speed,
            length,
            validator,
            pubkey,
        } => {
            let factory = factory(clonefactory_addr.as_deref(), &config, &client)?;
            let terms = RentalTerms {
                price: parse_u256(&price, "price")?,
                limit: parse_u256(&limit, "limit")?,
                speed: parse_u256(&speed, "speed")?,
                length: parse_u256(&length, "length")?,
                validator: parse_address(&validator, "validator")?,
            };
            let tx = factory.create_rental_contract(&terms, &pubkey).await?;
            println!("Mined in {tx}");
            println!("New contract address arrives via the contractCreated event");
        }
        Command::Purchase {
            contract,
            cipher_text,
        } => {
            let factory = factory(clonefactory_addr.as_deref(), &config, &client)?;
            let contract = parse_address(&contract, "contract")?;
            let tx = factory
                .purchase_rental_contract(contract, &cipher_text)
                .await?;
            println!("Mined in {tx}");
        }
        Command::Watch => {
            let factory = factory(clonefactory_addr.as_deref(), &config, &client)?;
            run_watch(factory, &client).await?;
        }
        Command::Token { command } => {
            let token = token(token_addr.as_deref(), &config, &client)?;
            run_token(command, token).await?;
        }
        Command::Decode { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn run_watch(factory: CloneFactory, client: &EthClient) -> Result<()> {
    let mut created = factory.watch_created().await?;
    let mut purchased = factory.watch_purchased().await?;
    println!(
        "Watching {} on {} (ctrl-c to stop)",
        factory.address(),
        client.endpoint()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = created.next() => {
                let Some(event) = event else { break };
                println!(
                    "{} created   {} pubkey={}",
                    timestamp(),
                    event.contract,
                    shorten(&event.pubkey),
                );
            }
            event = purchased.next() => {
                let Some(event) = event else { break };
                println!("{} purchased {}", timestamp(), event.contract);
            }
        }
    }
    Ok(())
}

async fn run_token(command: TokenCommand, token: LumerinToken) -> Result<()> {
    match command {
        TokenCommand::Info => {
            let meta = token.metadata().await?;
            println!("name:         {}", meta.name);
            println!("symbol:       {}", meta.symbol);
            println!("decimals:     {}", meta.decimals);
            println!(
                "total supply: {} ({} {})",
                meta.total_supply,
                format_units(meta.total_supply, meta.decimals)?,
                meta.symbol,
            );
        }
        TokenCommand::Balance { account } => {
            let account = parse_address(&account, "account")?;
            let balance = token.balance_of(account).await?;
            let decimals = token.decimals().await?;
            println!("{} ({})", balance, format_units(balance, decimals)?);
        }
        TokenCommand::Allowance { owner, spender } => {
            let owner = parse_address(&owner, "owner")?;
            let spender = parse_address(&spender, "spender")?;
            println!("{}", token.allowance(owner, spender).await?);
        }
        TokenCommand::Transfer { to, amount } => {
            let to = parse_address(&to, "to")?;
            let amount = parse_u256(&amount, "amount")?;
            let tx = token.transfer(to, amount).await?;
            println!("Mined in {tx}");
        }
        TokenCommand::Approve { spender, amount } => {
            let spender = parse_address(&spender, "spender")?;
            let amount = parse_u256(&amount, "amount")?;
            let tx = token.approve(spender, amount).await?;
            println!("Mined in {tx}");
        }
        TokenCommand::Burn { amount } => {
            let amount = parse_u256(&amount, "amount")?;
            let tx = token.burn(amount).await?;
            println!("Mined in {tx}");
        }
        TokenCommand::Owner => {
            println!("{}", token.owner().await?);
        }
    }
    Ok(())
}

fn run_decode(data: &str) -> Result<()> {
    let raw = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(raw).context("Invalid hex calldata")?;
    let decoder = LumerinDecoder::new()?;

    match decoder.decode_calldata(&bytes)? {
        Some(call) => {
            println!("{}  [{}]", call.signature, call.contract);
            for arg in &call.arguments {
                println!("  {}: {} = {}", arg.name, arg.kind, arg.value);
            }
        }
        None => {
            println!("Unknown selector 0x{}", hex::encode(&bytes[..4]));
        }
    }
    Ok(())
}

/// Connect to the endpoint, attaching a signer when `LUMERIN_PRIVATE_KEY`
/// is set
async fn connect(endpoint: ProviderConfig) -> Result<EthClient> {
    let client = match std::env::var("LUMERIN_PRIVATE_KEY") {
        Ok(key) => {
            let signer: PrivateKeySigner = key
                .trim()
                .parse()
                .context("LUMERIN_PRIVATE_KEY is not a valid private key")?;
            tracing::info!(address = %signer.address(), "signer attached");
            EthClient::connect_with_signer(endpoint, signer).await?
        }
        Err(_) => EthClient::connect(endpoint).await?,
    };
    tracing::debug!(endpoint = %client.endpoint(), "connected");
    Ok(client)
}

fn resolve_endpoint(args: &Args, config: &Config) -> Result<ProviderConfig> {
    if let Some(ipc) = args.ipc.clone() {
        #[cfg(unix)]
        {
            return Ok(ProviderConfig::Ipc(ipc));
        }
        #[cfg(not(unix))]
        {
            let _ = ipc;
            anyhow::bail!("IPC endpoints are not supported on this platform");
        }
    }
    if let Some(ws) = trimmed(args.ws.as_deref()) {
        return Ok(ProviderConfig::WebSocket(ws));
    }
    if let Some(rpc) = trimmed(args.rpc.as_deref()) {
        return Ok(ProviderConfig::Http(normalize_http_endpoint(&rpc)));
    }

    for entry in &config.endpoints {
        if let Some(ws) = trimmed(entry.ws.as_deref()) {
            return Ok(ProviderConfig::WebSocket(ws));
        }
        if let Some(rpc) = trimmed(entry.rpc.as_deref()) {
            return Ok(ProviderConfig::Http(normalize_http_endpoint(&rpc)));
        }
        #[cfg(unix)]
        if let Some(ipc) = trimmed(entry.ipc.as_deref()) {
            return Ok(ProviderConfig::Ipc(PathBuf::from(ipc)));
        }
    }

    Ok(ProviderConfig::Http(DEFAULT_RPC.to_string()))
}

fn factory(
    override_addr: Option<&str>,
    config: &Config,
    client: &EthClient,
) -> Result<CloneFactory> {
    let address = override_addr
        .map(str::to_string)
        .or_else(|| config.contracts.clonefactory.clone())
        .context("Clonefactory address required (--clonefactory or [contracts] in config)")?;
    Ok(CloneFactory::new(
        parse_address(&address, "clonefactory")?,
        client.clone(),
    ))
}

fn token(override_addr: Option<&str>, config: &Config, client: &EthClient) -> Result<LumerinToken> {
    let address = override_addr
        .map(str::to_string)
        .or_else(|| config.contracts.token.clone())
        .context("Token address required (--token or [contracts] in config)")?;
    Ok(LumerinToken::new(
        parse_address(&address, "token")?,
        client.clone(),
    ))
}

fn parse_address(value: &str, what: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {what} address '{value}'"))
}

fn parse_u256(value: &str, what: &str) -> Result<U256> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {what} '{value}'"))
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn shorten(value: &str) -> String {
    // Pubkeys are usually hex, but nothing stops a contract emitting
    // arbitrary UTF-8; truncate on char boundaries.
    if value.chars().count() > 20 {
        let head: String = value.chars().take(20).collect();
        format!("{head}..")
    } else {
        value.to_string()
    }
}
