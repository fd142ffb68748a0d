use serde::Serialize;

/// Methods of the CertificateManagement contract reachable through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CertificateMethod {
    GetCertificate,
    CreateCertificate,
    GetTempCount,
    SetTempCount,
    HasRole,
    UpdateRole,
}

impl CertificateMethod {
    pub const ALL: [CertificateMethod; 6] = [
        CertificateMethod::GetCertificate,
        CertificateMethod::CreateCertificate,
        CertificateMethod::GetTempCount,
        CertificateMethod::SetTempCount,
        CertificateMethod::HasRole,
        CertificateMethod::UpdateRole,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CertificateMethod::GetCertificate => "getCertificate",
            CertificateMethod::CreateCertificate => "createCertificate",
            CertificateMethod::GetTempCount => "getTempCount",
            CertificateMethod::SetTempCount => "setTempCount",
            CertificateMethod::HasRole => "hasRole",
            CertificateMethod::UpdateRole => "updateRole",
        }
    }

    /// Whether the method changes contract state and needs a signed transaction.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            CertificateMethod::CreateCertificate
                | CertificateMethod::SetTempCount
                | CertificateMethod::UpdateRole
        )
    }
}
