use crate::context::AppContext;
use anyhow::Result;
use log::info;

pub async fn run_list(app: &AppContext, limit: u32, offset: u32) -> Result<()> {
    let backend = app.backend()?;
    let listing = backend.list_stocks(limit, offset).await?;

    if listing.stocks.is_empty() {
        println!("No stocks returned (offset {}).", offset);
        return Ok(());
    }

    for symbol in &listing.stocks {
        println!("{}", symbol);
    }
    let shown = listing.stocks.len() as i64;
    let has_more = (offset as i64 + shown) < listing.total_count;
    info!(
        "Listed {} of {} stock(s){}",
        shown,
        listing.total_count,
        if has_more { " (more available)" } else { "" }
    );

    Ok(())
}

pub async fn run_info(app: &AppContext, symbol: &str) -> Result<()> {
    let backend = app.backend()?;
    let info = backend.stock_info(symbol).await?;

    println!("{}", symbol);
    println!("  Company:  {}", info.company_name.as_deref().unwrap_or("unknown"));
    println!("  Sector:   {}", info.sector.as_deref().unwrap_or("unknown"));
    if let Some(market_cap) = info.market_cap {
        println!("  Mkt cap:  {:.0}", market_cap);
    }
    match info.beta {
        Some(beta) => println!("  Beta:     {:.3}", beta),
        None => println!("  Beta:     n/a"),
    }
    println!(
        "  History:  {} - {} ({} trading days)",
        info.first_date.as_deref().unwrap_or("?"),
        info.last_date.as_deref().unwrap_or("?"),
        info.total_days
    );

    Ok(())
}
