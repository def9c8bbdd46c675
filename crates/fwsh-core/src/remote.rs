// ── Deploy sequence ──
//
// Stages run strictly in order and stop at the first failure. Nothing is
// rolled back: a failed apply after a good reload leaves the device with
// a staged but inactive configuration, and the result says so.

use tracing::{info, warn};

use fwsh_api::DeployClient;

use crate::adapter::RemoteDeploy;
use crate::error::CoreError;
use crate::model::{DeployResult, DeployStage};

/// Stages for a full deploy against `remote`.
pub fn full_sequence(remote: &impl RemoteDeploy) -> Vec<DeployStage> {
    let mut stages = vec![DeployStage::Reload, DeployStage::Apply];
    if remote.supports_save() {
        stages.push(DeployStage::Save);
    }
    stages
}

/// Run `stages` in order, stopping at the first failure.
pub async fn run_stages(remote: &impl RemoteDeploy, stages: &[DeployStage]) -> DeployResult {
    for &stage in stages {
        info!(%stage, "deploy stage");
        let result = match stage {
            DeployStage::Reload => remote.reload().await,
            DeployStage::Apply => remote.apply().await,
            DeployStage::Save => remote.save().await,
        };
        if let Err(err) = result {
            warn!(%stage, error = %err, "deploy stage failed");
            return DeployResult::Failure {
                stage,
                message: err.to_string(),
            };
        }
    }
    DeployResult::Success
}

impl RemoteDeploy for DeployClient {
    async fn reload(&self) -> Result<(), CoreError> {
        Ok(DeployClient::reload(self).await?)
    }

    async fn apply(&self) -> Result<(), CoreError> {
        Ok(DeployClient::apply(self).await?)
    }

    async fn save(&self) -> Result<(), CoreError> {
        Ok(DeployClient::save(self).await?)
    }

    fn supports_save(&self) -> bool {
        DeployClient::supports_save(self)
    }
}
