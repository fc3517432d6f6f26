use will_it_rain::{ForecastError, Predictor};

#[tokio::main]
async fn main() -> Result<(), ForecastError> {
    let mut args = std::env::args().skip(1);
    let latitude = args.next().and_then(|a| a.parse().ok()).unwrap_or(-23.51);
    let longitude = args.next().and_then(|a| a.parse().ok()).unwrap_or(-47.45);
    let date = args.next().unwrap_or_else(|| "2025-10-01".to_string());

    let predictor = Predictor::builder().build()?;
    let forecast = predictor.predict_iso(&date, latitude, longitude).await?;

    match serde_json::to_string_pretty(&forecast) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Could not serialize forecast: {}", e),
    }
    Ok(())
}
