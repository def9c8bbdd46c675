//! Spinner around the deploy stages.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use fwsh_core::{CoreError, DeployStage, RemoteDeploy};

/// Wraps a [`RemoteDeploy`] and shows a spinner while each stage runs.
pub struct WithSpinner<R> {
    inner: R,
}

impl<R> WithSpinner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

fn spinner(stage: DeployStage) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("{stage}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

impl<R: RemoteDeploy + Sync> RemoteDeploy for WithSpinner<R> {
    async fn reload(&self) -> Result<(), CoreError> {
        let pb = spinner(DeployStage::Reload);
        let result = self.inner.reload().await;
        pb.finish_and_clear();
        result
    }

    async fn apply(&self) -> Result<(), CoreError> {
        let pb = spinner(DeployStage::Apply);
        let result = self.inner.apply().await;
        pb.finish_and_clear();
        result
    }

    async fn save(&self) -> Result<(), CoreError> {
        let pb = spinner(DeployStage::Save);
        let result = self.inner.save().await;
        pb.finish_and_clear();
        result
    }

    fn supports_save(&self) -> bool {
        self.inner.supports_save()
    }
}
