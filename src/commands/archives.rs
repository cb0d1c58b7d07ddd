use crate::context::AppContext;
use anyhow::Result;

pub async fn run(app: &AppContext) -> Result<()> {
    let backend = app.backend()?;
    let records = backend.archives().await?;

    if records.is_empty() {
        println!("No archived test runs.");
        return Ok(());
    }

    println!(
        "{:<22} {:<12} {:<40} {}",
        "Timestamp", "Type", "Description", "Folder"
    );
    for record in &records {
        println!(
            "{:<22} {:<12} {:<40} {}",
            record.timestamp, record.test_type, record.description, record.folder
        );
    }
    println!("{} archive(s)", records.len());

    Ok(())
}
