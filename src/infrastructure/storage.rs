use crate::AppState;
use anyhow::Result;
use tracing::{info, warn};

/// Prepares the upload root and reports on the static assets the routes serve.
pub async fn setup_storage(state: &AppState) -> Result<()> {
    let store = state.intake.store();
    store.ensure_root().await?;

    info!(
        "📂 Upload root: {} (slot: <user>/{})",
        store.root().display(),
        state.config.input_file_name
    );

    for asset in [
        state.config.template_file_name.as_str(),
        "favicon.ico",
    ] {
        let path = state.config.static_dir.join(asset);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!("⚠️  Static asset missing, route will answer 404: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn test_setup_creates_upload_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            upload_path: dir.path().join("nested").join("uploads"),
            static_dir: dir.path().join("static"),
            ..AppConfig::default()
        };
        let state = AppState::new(config);

        setup_storage(&state).await.unwrap();
        assert!(dir.path().join("nested").join("uploads").is_dir());

        // Idempotent
        setup_storage(&state).await.unwrap();
    }
}
