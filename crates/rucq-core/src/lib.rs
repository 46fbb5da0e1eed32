use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod app_config;
pub mod config;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};

/// Taxpayer registry data mapped into the stable output schema.
///
/// Every `String` field defaults to `""` when the provider omits it; the two
/// `Option` fields stay `null`. Serialized names match the SRI field names the
/// rest of the system already speaks (camelCase Spanish).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatosContribuyente {
    pub estado: String,
    pub tipo_contribuyente: String,
    pub regimen: String,
    pub razon_social: String,
    pub actividad_economica_principal: String,
    pub categoria: String,
    pub obligado_llevar_contabilidad: String,
    pub agente_retencion: String,
    pub contribuyente_especial: String,
    /// Shell-company risk indicator, passed through verbatim.
    pub contribuyente_fantasma: String,
    /// Non-existent-transactions risk indicator, passed through verbatim.
    pub transacciones_inexistente: String,
    pub fecha_inicio_actividades: String,
    pub fecha_cese: String,
    pub fecha_reinicio_actividades: String,
    pub fecha_actualizacion: String,
    /// `null` (not `[]`) when the registry lists no legal representatives.
    pub representantes_legales: Option<Vec<RepresentanteLegal>>,
    pub motivo_cancelacion_suspension: Option<String>,
}

/// A legal representative as listed on the taxpayer record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentanteLegal {
    #[serde(default)]
    pub identificacion: String,
    #[serde(default)]
    pub nombre: String,
}

/// One physical establishment of a taxpayer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Establecimiento {
    /// Establishment number, e.g. `"001"` for the headquarters.
    pub num_establecimiento: String,
    /// Trade name; falls back to the taxpayer's legal name.
    pub nombre: String,
    pub ubicacion: String,
    pub estado: String,
    /// Establishment type code, e.g. `"MAT"` for the headquarters.
    pub tipo_establecimiento: String,
    /// Derived from the provider's `matriz == "SI"` flag.
    pub es_matriz: bool,
}

/// Terminal outcome status of a completed (non-failed) query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// Registry data was found and mapped.
    Success,
    /// The registry returned an empty record set for the RUC.
    NoData,
}

/// The assembled result of one successful RUC query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RucQueryResult {
    pub ruc: String,
    pub datos_contribuyente: DatosContribuyente,
    pub establecimientos: Vec<Establecimiento>,
    pub fecha_consulta: DateTime<Utc>,
    pub estado: QueryStatus,
}

/// External error taxonomy reported to callers and the failure sink.
///
/// `CaptchaRequired` is the only kind whose message is remediation-oriented
/// (where a human can resolve the challenge); everything else wraps the
/// underlying technical message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    CaptchaRequired,
    ErrorGeneral,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::CaptchaRequired => "captcha_required",
            FailureKind::ErrorGeneral => "error_general",
        }
    }
}

/// Terminal failure of one RUC query, mutually exclusive with
/// [`RucQueryResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFailure {
    /// Always `false`; kept in the serialized shape for downstream consumers.
    pub success: bool,
    pub error: FailureKind,
    pub message: String,
}

impl QueryFailure {
    #[must_use]
    pub fn new(error: FailureKind, message: String) -> Self {
        Self {
            success: false,
            error,
            message,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datos_contribuyente_serializes_camel_case() {
        let datos = DatosContribuyente {
            razon_social: "ACME SA".to_owned(),
            ..DatosContribuyente::default()
        };
        let json = serde_json::to_value(&datos).unwrap();
        assert_eq!(json["razonSocial"], "ACME SA");
        assert_eq!(json["obligadoLlevarContabilidad"], "");
        assert!(json["representantesLegales"].is_null());
    }

    #[test]
    fn establecimiento_serializes_camel_case() {
        let est = Establecimiento {
            num_establecimiento: "001".to_owned(),
            es_matriz: true,
            ..Establecimiento::default()
        };
        let json = serde_json::to_value(&est).unwrap();
        assert_eq!(json["numEstablecimiento"], "001");
        assert_eq!(json["esMatriz"], true);
    }

    #[test]
    fn query_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(QueryStatus::Success).unwrap(),
            "success"
        );
        assert_eq!(
            serde_json::to_value(QueryStatus::NoData).unwrap(),
            "no_data"
        );
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(FailureKind::CaptchaRequired).unwrap(),
            "captcha_required"
        );
        assert_eq!(FailureKind::ErrorGeneral.as_str(), "error_general");
    }

    #[test]
    fn query_failure_is_not_success() {
        let failure = QueryFailure::new(FailureKind::ErrorGeneral, "boom".to_owned());
        assert!(!failure.success);
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "error_general");
    }
}
