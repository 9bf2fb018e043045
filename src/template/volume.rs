// ABOUTME: Volume declaration parsing and wire representation.
// ABOUTME: A leading slash on the label selects host-path binding over a named volume.

use serde::Serialize;

/// One volume binding of a service, in the platform's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VolumeSpec {
    #[serde(rename_all = "camelCase")]
    HostPath {
        host_path: String,
        container_path: String,
    },

    #[serde(rename_all = "camelCase")]
    Named {
        volume_name: String,
        container_path: String,
    },
}

impl VolumeSpec {
    /// Parse a `label-or-path:container-path` declaration. Anything past the
    /// second colon (compose-style mode flags) is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(':');
        let label = parts.next()?;
        let container_path = parts.next()?;

        if label.is_empty() || container_path.is_empty() {
            return None;
        }

        if label.starts_with('/') {
            Some(VolumeSpec::HostPath {
                host_path: label.to_string(),
                container_path: container_path.to_string(),
            })
        } else {
            Some(VolumeSpec::Named {
                volume_name: label.to_string(),
                container_path: container_path.to_string(),
            })
        }
    }

    pub fn container_path(&self) -> &str {
        match self {
            VolumeSpec::HostPath { container_path, .. } => container_path,
            VolumeSpec::Named { container_path, .. } => container_path,
        }
    }
}
