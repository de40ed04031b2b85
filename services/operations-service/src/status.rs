use std::fmt;

/// Installation progress of a campaign asset. Declaration order is the
/// progression order, so the derived `Ord` compares progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstallationStatus {
    Pending,
    Assigned,
    Installed,
    ProofUploaded,
    Verified,
}

impl InstallationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallationStatus::Pending => "Pending",
            InstallationStatus::Assigned => "Assigned",
            InstallationStatus::Installed => "Installed",
            InstallationStatus::ProofUploaded => "Proof Uploaded",
            InstallationStatus::Verified => "Verified",
        }
    }
}

impl fmt::Display for InstallationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InstallationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(InstallationStatus::Pending),
            "Assigned" => Ok(InstallationStatus::Assigned),
            "Installed" => Ok(InstallationStatus::Installed),
            "Proof Uploaded" => Ok(InstallationStatus::ProofUploaded),
            "Verified" => Ok(InstallationStatus::Verified),
            _ => Err(()),
        }
    }
}

/// Status to write when an asset receives a mounter. Returns `None` when the
/// current status is already at or past `Assigned`; missing or unknown
/// statuses are treated as not yet assigned.
pub fn forward_status_on_assign(current: Option<&str>) -> Option<InstallationStatus> {
    let parsed = current.and_then(|value| value.parse::<InstallationStatus>().ok());
    match parsed {
        Some(status) if status >= InstallationStatus::Assigned => None,
        _ => Some(InstallationStatus::Assigned),
    }
}
