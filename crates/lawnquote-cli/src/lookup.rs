//! Commands that call out to the address and parcel providers.

use lawnquote_core::AppConfig;
use lawnquote_providers::{AnalysisRequest, PropertyAnalysis, PropertyAnalyzer};

/// Analyse one address and print the result.
///
/// # Errors
///
/// Returns an error if the HTTP clients cannot be built or the address cannot
/// be resolved by any configured provider.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    address: &str,
    json: bool,
) -> anyhow::Result<()> {
    let analyzer = PropertyAnalyzer::from_app_config(config)?;
    let sources = analyzer.sources();
    tracing::debug!(
        addy = sources.addy,
        google = sources.google,
        linz = sources.linz,
        "analyzing"
    );
    let request = AnalysisRequest {
        address: Some(address.to_string()),
        ..AnalysisRequest::default()
    };

    let analysis = analyzer.analyze(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", format_analysis(&analysis));
    }
    Ok(())
}

/// Print address suggestions, one per line.
///
/// # Errors
///
/// Returns an error if the HTTP clients cannot be built.
pub(crate) async fn run_suggest(
    config: &AppConfig,
    query: &str,
    json: bool,
) -> anyhow::Result<()> {
    let analyzer = PropertyAnalyzer::from_app_config(config)?;
    let candidates = analyzer.resolver().suggest(query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("no suggestions for '{query}'");
        return Ok(());
    }

    println!("{:<8}{:<40}ADDRESS", "SOURCE", "ID");
    for candidate in &candidates {
        println!(
            "{:<8}{:<40}{}",
            candidate.source.to_string(),
            candidate.handle,
            candidate.address
        );
    }
    Ok(())
}

pub(crate) fn format_analysis(analysis: &PropertyAnalysis) -> String {
    let metrics = &analysis.metrics;
    let property = &analysis.property;
    let mut out = String::new();

    out.push_str(&format!("Address:      {}\n", analysis.address.resolved));
    out.push_str(&format!("Suburb:       {}\n", analysis.suburb));
    out.push_str(&format!(
        "Coordinates:  {:.6}, {:.6}\n",
        analysis.coordinates.lat, analysis.coordinates.lng
    ));
    out.push_str(&format!(
        "Section:      {} m² ({:?})\n",
        metrics.total_area_sqm, property.total_area_source
    ));
    out.push_str(&format!("Lawn:         {} m²\n", metrics.lawn_area_sqm));
    out.push_str(&format!("Gradient:     {}\n", metrics.gradient));
    out.push_str(&format!("Edging:       {} m\n", metrics.estimated_edging_m));
    out.push_str(&format!("Access:       {}\n", metrics.access_difficulty));
    out.push_str(&format!("Hedges:       {} m\n", metrics.hedge_length_m));
    if let Some(slope) = analysis.terrain.slope {
        out.push_str(&format!(
            "Slope:        {:.1}% ({})\n",
            slope.percent, slope.category
        ));
    }
    out.push_str(&format!(
        "Validation:   {}/100 ({})\n",
        analysis.quote.confidence, analysis.quote.message
    ));
    out
}
