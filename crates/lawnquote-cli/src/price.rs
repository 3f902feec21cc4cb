//! Offline pricing from known metrics.

use std::fmt::Write as _;

use clap::Args;
use lawnquote_core::{
    calculate_price, AccessDifficulty, AppConfig, Catalog, DogSize, Frequency, Gradient,
    PriceBreakdown, PriceRequest, PropertyMetrics, SizeCategory,
};

#[derive(Debug, Clone, Args)]
pub struct PriceArgs {
    /// Mowable lawn area in square metres
    #[arg(long)]
    pub lawn_area: u32,
    /// Section area in square metres
    #[arg(long)]
    pub total_area: u32,
    /// flat, gentle, moderate or steep
    #[arg(long, default_value = "flat")]
    pub gradient: Gradient,
    /// easy, standard or tricky
    #[arg(long, default_value = "standard")]
    pub access: AccessDifficulty,
    /// Edging length in metres
    #[arg(long, default_value_t = 0)]
    pub edging: u32,
    /// Hedge length in metres
    #[arg(long, default_value_t = 0)]
    pub hedges: u32,
    /// Comma-separated service ids
    #[arg(long, value_delimiter = ',', default_value = "mowing")]
    pub services: Vec<String>,
    /// weekly, fortnightly or monthly
    #[arg(long, default_value = "fortnightly")]
    pub frequency: Frequency,
    #[arg(long)]
    pub suburb: Option<String>,
    /// small, medium or large; only used with dogcleanup
    #[arg(long)]
    pub dog_size: Option<DogSize>,
    /// Print the breakdown as JSON
    #[arg(long)]
    pub json: bool,
}

impl PriceArgs {
    fn metrics(&self) -> PropertyMetrics {
        PropertyMetrics {
            total_area_sqm: self.total_area,
            lawn_area_sqm: self.lawn_area,
            gradient: self.gradient,
            estimated_edging_m: self.edging,
            access_difficulty: self.access,
            hedge_length_m: self.hedges,
        }
    }
}

/// Price one visit and print the breakdown.
///
/// # Errors
///
/// Returns an error if the configured catalog file cannot be loaded or the
/// lawn area is larger than the section.
pub(crate) fn run_price(config: &AppConfig, args: &PriceArgs) -> anyhow::Result<()> {
    let catalog = match &config.catalog_path {
        Some(path) => lawnquote_core::load_catalog(path)?,
        None => Catalog::builtin(),
    };

    tracing::debug!(
        services = ?args.services,
        catalog_services = catalog.services.len(),
        "pricing"
    );
    let metrics = args.metrics();
    metrics.check_invariants()?;

    let breakdown = calculate_price(
        &catalog,
        &PriceRequest {
            metrics: &metrics,
            services: &args.services,
            frequency: args.frequency,
            suburb: args.suburb.as_deref(),
            dog_size: args.dog_size,
        },
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        print!("{}", format_breakdown(&breakdown));
    }
    Ok(())
}

fn size_label(category: SizeCategory) -> &'static str {
    match category {
        SizeCategory::Small => "small",
        SizeCategory::Medium => "medium",
        SizeCategory::Large => "large",
        SizeCategory::XLarge => "extra large",
    }
}

pub(crate) fn format_breakdown(breakdown: &PriceBreakdown) -> String {
    let mut out = String::new();
    let mut line = |label: &str, amount: String| {
        let _ = writeln!(out, "{label:<24}{amount:>8}");
    };

    line("Base", format!("${}", breakdown.base_price));
    line(
        &format!("Size ({})", size_label(breakdown.size_category)),
        format!("+${}", breakdown.size_adjustment),
    );
    line("Gradient", format!("+${}", breakdown.gradient_adjustment));
    line("Access", format!("+${}", breakdown.access_adjustment));
    line("Travel", format!("+${}", breakdown.travel_adjustment));
    line("Extras", format!("+${}", breakdown.services_total));
    line("Subtotal", format!("${}", breakdown.subtotal));

    let frequency = breakdown.frequency;
    let discount_label = match frequency.discount_label() {
        "" => frequency.label().to_string(),
        label => format!("{} ({label})", frequency.label()),
    };
    line(&discount_label, format!("-${}", breakdown.frequency_discount));
    line("Per visit", format!("${}", breakdown.final_price));
    line(
        "Range",
        format!(
            "${}-${}",
            breakdown.price_range.min, breakdown.price_range.max
        ),
    );
    out
}
