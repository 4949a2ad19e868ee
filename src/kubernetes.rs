use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KubeConfig};

use crate::errors::ReporterError;
use crate::types::Config;

/// Build the kubernetes client for the configured target: in-cluster when
/// running inside the cluster, an explicit kubeconfig path and/or context
/// when given, the ambient default otherwise.
pub async fn build_client(cfg: &Config) -> Result<Client, ReporterError> {
    let kube_config = if cfg.run_local {
        KubeConfig::incluster()?
    } else if let Some(path) = &cfg.config_file {
        let kubeconfig = Kubeconfig::read_from(path)?;
        KubeConfig::from_custom_kubeconfig(kubeconfig, &context_options(cfg)).await?
    } else {
        KubeConfig::from_kubeconfig(&context_options(cfg)).await?
    };
    Client::try_from(kube_config).map_err(ReporterError::ClientBuild)
}

fn context_options(cfg: &Config) -> KubeConfigOptions {
    KubeConfigOptions {
        context: cfg.context.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
  - name: test-cluster
    cluster:
      server: https://127.0.0.1:6443
contexts:
  - name: test-context
    context:
      cluster: test-cluster
      user: test-user
users:
  - name: test-user
    user:
      token: not-a-real-token
current-context: test-context
"#;

    #[test]
    fn test_kubeconfig_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL_KUBECONFIG.as_bytes()).unwrap();

        let kubeconfig = Kubeconfig::read_from(file.path()).unwrap();
        assert_eq!(kubeconfig.current_context.as_deref(), Some("test-context"));
        assert_eq!(kubeconfig.clusters.len(), 1);
    }

    #[test]
    fn test_kubeconfig_read_missing_file_is_an_error() {
        let result = Kubeconfig::read_from("/nonexistent/kubeconfig.yaml");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_custom_kubeconfig_with_unknown_context_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL_KUBECONFIG.as_bytes()).unwrap();
        let kubeconfig = Kubeconfig::read_from(file.path()).unwrap();

        let options = KubeConfigOptions {
            context: Some("no-such-context".to_string()),
            ..Default::default()
        };
        let result = KubeConfig::from_custom_kubeconfig(kubeconfig, &options).await;
        assert!(result.is_err());
    }
}
