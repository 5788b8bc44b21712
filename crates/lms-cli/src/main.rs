mod cli;
mod logging;
mod opt;

use anyhow::Result;
use clap::Parser;
use lms_db::store::Store;

fn main() -> Result<()> {
    let main = async {
        let opt = opt::Cli::parse();
        logging::setup()?;

        let store = Store::connect(&opt.db.store_config()).await?;
        cli::exec(&store, opt.command).await
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(main)
}
