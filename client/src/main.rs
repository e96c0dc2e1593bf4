//! AgroVision insights - terminal front end
//!
//! Runs one insights query for a coordinate and renders the resulting view.

use std::sync::Arc;

use agrovision_insights::{Config, InsightsController, RecommendationClient};
use clap::Parser;
use shared::{CoordinateInput, CropCatalog, InsightsView};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crop insights for a coordinate
#[derive(Parser, Debug)]
#[command(name = "agrovision-insights", version, about)]
struct Cli {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: String,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: String,

    /// Print the full view as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    config.validate()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Environment: {}", config.environment);

    let catalog = Arc::new(CropCatalog::bundled()?);
    tracing::info!("Loaded {} crops into the catalog", catalog.len());

    let client = RecommendationClient::from_config(&config.service)?;
    match client.service_status().await {
        Ok(message) => {
            tracing::info!("Recommendation service at {}: {}", client.base_url(), message)
        }
        Err(err) => {
            tracing::warn!("Recommendation service at {} not reachable: {}", client.base_url(), err)
        }
    }

    let controller = InsightsController::new(
        Arc::new(client),
        catalog,
        config.service.request_timeout(),
    );

    let input = CoordinateInput::new(cli.lat, cli.lon);
    match controller.submit_query(&input).await {
        Ok(view) if cli.json => println!("{}", serde_json::to_string_pretty(&view)?),
        Ok(view) => render(&view),
        Err(err) if err.is_user_visible() => {
            tracing::error!(code = err.code(), "Insights query failed: {}", err);
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

fn render(view: &InsightsView) {
    let unknown = || "N/A".to_string();
    let show = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_else(unknown);

    println!("NDVI Analysis");
    println!("  NDVI Value: {} ({})", show(view.ndvi_value), view.ndvi_band);
    if let Some(message) = &view.ndvi_message {
        println!("  {}", message);
    }

    if let Some(fields) = &view.soil_weather_fields {
        println!("Soil & Weather Insights");
        println!("  Soil pH: {}", show(fields.soil_ph));
        if let Some(class) = view.soil_ph_class {
            println!("    {}", class.message());
        }
        println!("  Soil Nitrogen: {}", show(fields.soil_nitrogen));
        println!("  Temperature (°C): {}", show(fields.temperature_c));
        println!("  Humidity (%): {}", show(fields.humidity_pct));
        if let Some(class) = view.humidity_class {
            println!("    {}", class.message());
        }
        println!("  Rainfall (mm): {}", show(fields.rainfall_mm));
    }

    if let Some(crop) = &view.recommended_crop {
        println!("Recommended Crop: {}", crop.display_name);
        println!("  {}", crop.category);
        for benefit in &crop.benefits {
            println!("  - {}", benefit);
        }
        let profile = &crop.agronomic_profile;
        println!("  Soil: {}", profile.soil);
        println!("  pH: {}", profile.ph_range);
        println!("  Irrigation: {}", profile.irrigation);
        println!("  Temperature: {}", profile.temperature);
        println!("  Fertilization: {}", profile.fertilization);
        println!("  Technology: {}", profile.technology);
        for image in &crop.image_refs {
            println!("  Image: {}", image);
        }
    }

    if !view.alternate_crops.is_empty() {
        println!("Other Suitable Crops: {}", view.alternate_crops.join(", "));
    }
}
