use anyhow::{ Context, Result };
use clap::{ Parser, Subcommand };
use donationkit::config::{ self, Config };
use donationkit::core::constants::{ SYMBOL_CHECK, SYMBOL_CROSS, SYMBOL_MONEY };
use donationkit::donation::{
    self,
    calculate_fee_offset,
    convert_from_fiat,
    convert_to_fiat,
    format_usd,
    sanitize_amount,
    AmountCheck,
    MinimumDonation,
};
use donationkit::logger::{ self, LogTag };
use donationkit::security::{ CsrfManager, MemoryCookieStore };
use serde_json::json;
use std::sync::Arc;

/// Donation amount, fee and token utilities
#[derive(Parser, Debug)]
#[command(name = "donationkit", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = config::CONFIG_FILE_PATH)]
    config: String,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable DEBUG output for one log tag (repeatable), e.g. `--debug cache`
    #[arg(long = "debug", value_name = "TAG", global = true)]
    debug_tags: Vec<String>,

    /// Enable DEBUG output for every tag
    #[arg(long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fee offset so the recipient receives the full amount
    Fee {
        amount: f64,
    },
    /// Convert between crypto and fiat at a token price
    Convert {
        amount: f64,
        #[arg(long)]
        price: Option<f64>,
        /// Treat AMOUNT as fiat and convert to crypto
        #[arg(long)]
        to_crypto: bool,
    },
    /// Quote a crypto donation against the configured bounds
    Quote {
        crypto_amount: f64,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Issue a fresh CSRF token and print its cookie
    Token,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_flags: Vec<String> = cli.debug_tags
        .iter()
        .map(|tag| format!("--debug-{}", tag))
        .collect();
    if cli.verbose {
        log_flags.push("--verbose".to_string());
    }
    if cli.quiet {
        log_flags.push("--quiet".to_string());
    }
    logger::set_logger_config(logger::config_from_args(log_flags));

    let cfg: Config = config::read_config_file(&cli.config).with_context(||
        format!("loading configuration from {}", cli.config)
    )?;
    config::install_config(cfg.clone())?;

    match cli.command {
        Command::Fee { amount } => {
            let offset = calculate_fee_offset(sanitize_amount(amount));
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&offset)?);
            } else {
                println!("{} Fee:   {}", SYMBOL_MONEY, format_usd(offset.fee));
                println!("{} Total: {}", SYMBOL_MONEY, format_usd(offset.total));
            }
        }
        Command::Convert { amount, price, to_crypto } => {
            let amount = sanitize_amount(amount);
            let converted = if to_crypto {
                convert_from_fiat(amount, price)
            } else {
                convert_to_fiat(amount, price)
            };
            let available = donation::usable_price(price).is_some();

            if cli.json {
                let out =
                    json!({
                    "amount": amount,
                    "price": price,
                    "direction": if to_crypto { "fiat_to_crypto" } else { "crypto_to_fiat" },
                    "converted": converted,
                    "available": available,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if !available {
                println!("{} Price unavailable", SYMBOL_CROSS);
            } else if to_crypto {
                println!("{} = {} tokens", format_usd(amount), converted);
            } else {
                println!("{} tokens = {}", amount, format_usd(converted));
            }
        }
        Command::Quote { crypto_amount, price } => {
            let bounds = MinimumDonation::from_config(&cfg.donation);
            let q = donation::quote(crypto_amount, price, &bounds);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&q)?);
            } else {
                println!("Amount:  {} tokens", q.crypto_amount);
                println!("Value:   {}", format_usd(q.fiat_amount));
                println!("Fee:     {}", format_usd(q.fee.fee));
                println!("Total:   {}", format_usd(q.fee.total));
                match q.check {
                    AmountCheck::Accepted => println!("{} Meets donation bounds", SYMBOL_CHECK),
                    AmountCheck::BelowMinimum { shortfall_usd } =>
                        println!(
                            "{} Below the {} minimum by {}",
                            SYMBOL_CROSS,
                            format_usd(bounds.floor_usd),
                            format_usd(shortfall_usd)
                        ),
                    AmountCheck::AboveMaximum { excess_usd } =>
                        println!("{} Above the maximum by {}", SYMBOL_CROSS, format_usd(excess_usd)),
                    AmountCheck::PriceUnavailable =>
                        println!("{} Price unavailable, cannot value donation", SYMBOL_CROSS),
                }
            }
        }
        Command::Token => {
            let cookies = Arc::new(MemoryCookieStore::new());
            let csrf = CsrfManager::new(cfg.csrf.clone(), cookies.clone());
            let token = csrf.get_token().context("issuing CSRF token")?;

            if cli.json {
                let out =
                    json!({
                    "token": token,
                    "header": csrf.header_name(),
                    "set_cookie": cookies.headers(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}: {}", csrf.header_name(), token);
                for header in cookies.headers() {
                    println!("Set-Cookie: {}", header);
                }
            }
            logger::debug(LogTag::Csrf, "Token printed");
        }
    }

    Ok(())
}
