//! Command-line interface parsing for the RentSure client
//!
//! Global flags configure the API location, retries and the offline cache;
//! each subcommand maps to one page of the marketplace.

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::DEFAULT_MAX_RETRIES;
use crate::listings::{GenderFilter, ListingFilter, RankBy, DEFAULT_BUDGET_MAX};

/// API used when neither `--api-url` nor `RENTSURE_API_URL` is set
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The ranking name is not recognized
    #[error("Invalid ranking: '{0}'. Valid rankings: match, college, office, safety")]
    InvalidRanking(String),

    /// The gender filter is not recognized
    #[error("Invalid gender filter: '{0}'. Valid values: any, male, female")]
    InvalidGender(String),

    /// The date is not in YYYY-MM-DD form
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    /// An owner command was run without a token
    #[error("Owner commands need a token: pass --token or set RENTSURE_TOKEN")]
    MissingToken,
}

/// RentSure - find verified student rentals from the terminal
#[derive(Parser, Debug)]
#[command(name = "rentsure")]
#[command(about = "Student rental search with offline fallback")]
#[command(version)]
pub struct Cli {
    /// Base URL of the RentSure API
    #[arg(long, global = true, env = "RENTSURE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Owner access token
    #[arg(long, global = true, env = "RENTSURE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Retries after a failed request
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RETRIES)]
    pub retries: u32,

    /// Directory for the offline cache (defaults to the user cache directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Keep cached responses in memory only
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Print raw JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the cities RentSure covers
    Cities,

    /// Show rentals in a city
    Listings(ListingsArgs),

    /// Show one rental in detail
    Rental {
        /// Property id (e.g. PUN-7)
        id: String,

        /// Also load proximity, neighborhood, tiffin and owner details
        #[arg(long)]
        extras: bool,
    },

    /// Explain how trust and safety scores are computed
    TrustMetrics,

    /// Split rent and utilities between roommates
    SplitExpenses {
        /// Total monthly rent
        #[arg(long)]
        rent: f64,

        /// Monthly utilities
        #[arg(long, default_value_t = 0.0)]
        utilities: f64,

        /// Number of people sharing
        #[arg(long, default_value_t = 2)]
        roommates: u32,
    },

    /// Generate a rental agreement
    Agreement {
        property_id: String,

        /// Tenant name on the agreement
        #[arg(long, default_value = "Student Tenant")]
        tenant: String,

        /// Start date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        start: Option<String>,

        /// Length of the agreement in months
        #[arg(long, default_value_t = 11)]
        months: u32,

        /// Security deposit
        #[arg(long, default_value_t = 0)]
        deposit: u32,
    },

    /// Pay rent for a property
    Pay {
        property_id: String,

        #[arg(long)]
        amount: u32,

        /// Payment method (UPI, Bank Transfer, Cash)
        #[arg(long, default_value = "UPI")]
        method: String,
    },

    /// Manage your properties as an owner
    Owner {
        #[command(subcommand)]
        action: OwnerAction,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListingsArgs {
    /// City id (e.g. pune)
    pub city: String,

    /// Free-text search; without it the top recommendations are shown
    #[arg(long, short)]
    pub query: Option<String>,

    /// Ranking for searches: match, college, office, safety
    #[arg(long, default_value = "match")]
    pub rank_by: String,

    /// Only owners with trust score 85 or higher
    #[arg(long)]
    pub verified_only: bool,

    /// Maximum monthly rent
    #[arg(long, default_value_t = DEFAULT_BUDGET_MAX)]
    pub budget_max: u32,

    /// Tenant gender: any, male, female
    #[arg(long, default_value = "any")]
    pub gender: String,

    /// Only rentals near this college, closest first
    #[arg(long)]
    pub college: Option<String>,

    /// Only rentals near this office hub, closest first
    #[arg(long)]
    pub office: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum OwnerAction {
    /// List your properties
    List,

    /// Add a new property
    Add {
        /// City id the property is in
        city: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        rent: u32,

        #[arg(long, default_value = "")]
        description: String,

        /// Safety score out of 5
        #[arg(long, default_value_t = 4.0)]
        safety_score: f64,

        /// Nearest college
        #[arg(long)]
        college: Option<String>,

        /// Nearest office hub
        #[arg(long)]
        office: Option<String>,
    },

    /// Delete a property
    Delete { id: i64 },

    /// Mark a property as available or not
    Availability {
        id: i64,

        #[arg(action = ArgAction::Set)]
        available: bool,
    },
}

/// Parses a ranking argument
pub fn parse_rank_arg(s: &str) -> Result<RankBy, CliError> {
    RankBy::parse(s).ok_or_else(|| CliError::InvalidRanking(s.to_string()))
}

/// Parses a gender filter argument
pub fn parse_gender_arg(s: &str) -> Result<GenderFilter, CliError> {
    GenderFilter::parse(s).ok_or_else(|| CliError::InvalidGender(s.to_string()))
}

/// Parses a YYYY-MM-DD date argument
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

impl ListingsArgs {
    /// Search text, ranking and filter described by the arguments
    pub fn to_query(&self) -> Result<(String, RankBy, ListingFilter), CliError> {
        let rank_by = parse_rank_arg(&self.rank_by)?;
        let filter = ListingFilter {
            verified_only: self.verified_only,
            budget_max: self.budget_max,
            gender: parse_gender_arg(&self.gender)?,
            college: self.college.clone().filter(|c| !c.trim().is_empty()),
            office: self.office.clone().filter(|o| !o.trim().is_empty()),
        };
        Ok((self.query.clone().unwrap_or_default(), rank_by, filter))
    }
}
