use crate::context::AppContext;
use anyhow::Result;
use log::info;

pub async fn run(app: &AppContext) -> Result<()> {
    let backend = app.backend()?;
    info!("Checking backend health at {}", backend.base_url());

    match backend.health().await {
        Ok(status) => {
            println!("Backend:  healthy");
            println!(
                "Database: {}",
                if status.database {
                    "connected"
                } else {
                    "not connected"
                }
            );
            if let Some(version) = status.version.as_deref() {
                println!("Version:  {}", version);
            }
            println!("Uptime:   {:.0}s", status.uptime);
        }
        Err(error) => {
            println!("Backend:  unreachable ({})", error);
            println!(
                "Ensure the backend API is running at {}",
                backend.base_url()
            );
        }
    }

    Ok(())
}
