use crate::context::AppContext;
use anyhow::Result;
use futures::future::join_all;
use log::warn;

pub async fn run_get(app: &AppContext, symbols: &[String]) -> Result<()> {
    let backend = app.backend()?;

    // Independent lookups; one bad symbol must not sink the rest.
    let fetches = symbols.iter().map(|symbol| {
        let backend = &backend;
        async move { (symbol.as_str(), backend.get_beta(symbol).await) }
    });

    for (symbol, outcome) in join_all(fetches).await {
        match outcome {
            Ok(info) => match info.beta {
                Some(beta) => println!(
                    "{:<8} beta {:.3}{}",
                    symbol,
                    beta,
                    info.source
                        .as_deref()
                        .map(|source| format!(" ({})", source))
                        .unwrap_or_default()
                ),
                None => println!("{:<8} beta not set", symbol),
            },
            Err(error) => {
                warn!("Beta lookup failed for {}: {}", symbol, error);
                println!("{:<8} lookup failed", symbol);
            }
        }
    }

    Ok(())
}

pub async fn run_set(app: &AppContext, symbol: &str, beta: f64, source: Option<&str>) -> Result<()> {
    anyhow::ensure!(beta.is_finite(), "beta override must be finite");

    let backend = app.backend()?;
    let info = backend.put_beta(symbol, beta, source).await?;
    println!(
        "{} beta set to {:.3}",
        symbol,
        info.beta.unwrap_or(beta)
    );
    Ok(())
}

pub async fn run_calculate(app: &AppContext, symbol: &str, period: u32) -> Result<()> {
    let backend = app.backend()?;
    let calc = backend.calculate_beta(symbol, period).await?;

    println!("{} beta {:.3} over {} trading days", symbol, calc.beta, period);
    println!("  Correlation: {:.3}", calc.correlation);
    if let (Some(start), Some(end)) = (calc.start_date.as_deref(), calc.end_date.as_deref()) {
        println!("  Window:      {} - {}", start, end);
    }
    println!(
        "  Volatility:  {}",
        if calc.beta < 0.95 {
            "below market"
        } else if calc.beta <= 1.05 {
            "market-like"
        } else {
            "above market"
        }
    );

    Ok(())
}
