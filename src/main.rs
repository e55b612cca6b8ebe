//! RentSure CLI - search verified student rentals from the terminal
//!
//! Works offline: successful responses are cached on disk and served
//! when the API cannot be reached.

use std::error::Error;

use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use rentsure::cli::{parse_date_arg, Cli, Command, OwnerAction};
use rentsure::config::Config;
use rentsure::data::{
    AgreementRequest, ExpenseSplitRequest, Loaded, PaymentRequest, PropertyForm, RentSureClient,
};
use rentsure::output::{self, OFFLINE_NOTICE};

/// Prints `data` as pretty JSON or through the text renderer
fn emit<T: Serialize + ?Sized>(config: &Config, data: &T, text: impl FnOnce(&T) -> String) -> Result<(), serde_json::Error> {
    if config.json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        println!("{}", text(data));
    }
    Ok(())
}

fn notice_offline<T>(loaded: &Loaded<T>) {
    if loaded.offline {
        eprintln!("{}", OFFLINE_NOTICE);
    }
}

async fn run(command: Command, config: &Config, client: &RentSureClient) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Cities => {
            let loaded = client.cities().await;
            notice_offline(&loaded);
            emit(config, loaded.data.as_slice(), output::format_cities)?;
        }
        Command::Listings(args) => {
            let (query, rank_by, filter) = args.to_query()?;
            let loaded = client.listings(&args.city, &query, rank_by).await;
            notice_offline(&loaded);
            if config.json {
                let visible = filter.apply(&loaded.data.rentals);
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                println!("{}", output::format_listings(&loaded.data, &filter));
            }
        }
        Command::Rental { id, extras } => {
            let loaded = client.rental(&id).await?;
            notice_offline(&loaded);
            let extras = if extras {
                Some(client.rental_extras(&loaded.data).await)
            } else {
                None
            };
            emit(config, &loaded.data, |details| {
                output::format_rental(details, extras.as_ref())
            })?;
        }
        Command::TrustMetrics => {
            let loaded = client.trust_metrics().await?;
            notice_offline(&loaded);
            emit(config, &loaded.data, output::format_trust_metrics)?;
        }
        Command::SplitExpenses {
            rent,
            utilities,
            roommates,
        } => {
            let request = ExpenseSplitRequest {
                total_rent: rent,
                utilities,
                roommates,
            };
            let split = client.split_expenses(&request).await?;
            emit(config, &split, output::format_split)?;
        }
        Command::Agreement {
            property_id,
            tenant,
            start,
            months,
            deposit,
        } => {
            let start_date = match start {
                Some(s) => parse_date_arg(&s)?,
                None => Local::now().date_naive(),
            };
            let request = AgreementRequest {
                property_id,
                tenant_name: tenant,
                start_date: start_date.format("%Y-%m-%d").to_string(),
                duration_months: months,
                deposit_amount: deposit,
            };
            let text = client.generate_agreement(&request).await?;
            emit(config, text.as_str(), str::to_string)?;
        }
        Command::Pay {
            property_id,
            amount,
            method,
        } => {
            let request = PaymentRequest {
                property_id,
                amount,
                method,
            };
            let confirmation = client.pay(&request).await?;
            emit(config, &confirmation, output::format_payment)?;
        }
        Command::Owner { action } => {
            let token = config.require_token()?;
            match action {
                OwnerAction::List => {
                    let properties = client.owner_properties(token).await?;
                    emit(config, properties.as_slice(), output::format_owner_properties)?;
                }
                OwnerAction::Add {
                    city,
                    title,
                    rent,
                    description,
                    safety_score,
                    college,
                    office,
                } => {
                    let mut form = PropertyForm::new(city);
                    form.title = title;
                    form.rent = rent;
                    form.description = description;
                    form.safety_score = safety_score;
                    form.nearby_college = college;
                    form.nearby_office_hub = office;
                    client.create_property(token, &form).await?;
                    println!("Property added");
                }
                OwnerAction::Delete { id } => {
                    client.delete_property(token, id).await?;
                    println!("Property {} deleted", id);
                }
                OwnerAction::Availability { id, available } => {
                    client.set_availability(token, id, available).await?;
                    let state = if available { "available" } else { "unavailable" };
                    println!("Property {} marked {}", id, state);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rentsure=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli);
    let client = config.client();

    if let Err(e) = run(cli.command, &config, &client).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
