mod report;
mod seed;

use crate::opt::Commands;
use anyhow::Error;
use lms_db::schema::setup_schema;
use lms_db::store::Store;

pub(crate) async fn exec(store: &Store, command: Commands) -> Result<(), Error> {
    match command {
        Commands::Init => {
            setup_schema(store.connection()).await?;
            tracing::info!("tables created");
            Ok(())
        }
        Commands::Seed => seed::seed(store).await,
        Commands::Report(o) => {
            if o.seed {
                seed::seed(store).await?;
            }
            report::report(store, &o).await
        }
    }
}
