use anyhow::{Context, Result};
use renderer::{ProgramState, Viewer, ViewerConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing();

    let mut state = ProgramState::default();
    state.load(&args.state_file);
    tracing::debug!(
        state_file = %args.state_file.display(),
        assets = %args.assets.display(),
        "starting viewer"
    );

    let viewer = Viewer::new(ViewerConfig {
        surface_size: args.size,
        assets_root: args.assets,
        antialiasing: args.antialias,
        state,
    });
    let final_state = viewer.run()?;

    final_state.save(&args.state_file).with_context(|| {
        format!(
            "failed to persist viewer state to {}",
            args.state_file.display()
        )
    })?;
    tracing::info!(path = %args.state_file.display(), "viewer state saved");
    Ok(())
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
