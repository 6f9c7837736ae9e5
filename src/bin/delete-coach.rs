/// Permanently delete a coach and every dependent record from the platform.
///
/// Usage: delete-coach --id COACH_ID --yes
///   --yes is required; the deletion cannot be undone.
use clap::Parser;

use elevateflow_api::config::Config;
use elevateflow_api::error::Error;
use elevateflow_api::platform::remote::RemoteStore;
use elevateflow_api::services::cascade::CascadeService;

#[derive(Parser)]
#[command(
    name = "delete-coach",
    about = "Delete a coach and all dependent client data from the platform"
)]
struct Args {
    /// Principal id of the coach to delete
    #[arg(long)]
    id: String,

    /// Confirm the irreversible deletion
    #[arg(long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if !args.yes {
        anyhow::bail!("refusing to delete without --yes; this cannot be undone");
    }

    let config = Config::from_env()?;
    let platform = RemoteStore::new(&config)?;

    tracing::info!("Deleting coach {} and all dependent data...", args.id);

    match CascadeService::delete_coach_and_all_data(&platform, &platform, &args.id).await {
        Ok(report) => {
            tracing::info!(
                "Deleted coach {} ({}): {} clients, {} sessions, {} messages",
                report.coach_email,
                report.coach_id,
                report.clients_removed,
                report.sessions_removed,
                report.messages_removed
            );
            Ok(())
        }
        Err(Error::PartialCascade {
            failed,
            completed,
            source,
        }) => {
            // Completed steps are not rerun automatically; print them so the
            // operator can decide what is safe to repeat.
            tracing::error!(
                "deletion stopped at {failed} (completed: {completed:?}): {source}"
            );
            anyhow::bail!("coach deletion did not complete (stopped at {failed})");
        }
        Err(e) => Err(anyhow::Error::new(e)),
    }
}
