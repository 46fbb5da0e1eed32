//! Raw SRI response types for the two catastro REST endpoints.
//!
//! ## Observed shape from the live portal
//!
//! ### `ConsolidadoContribuyente/obtenerPorNumerosRuc`
//! A JSON **array** with zero or one element per queried RUC. An unknown RUC
//! yields `[]`, not a 404. Flag-like fields (`agenteRetencion`,
//! `contribuyenteEspecial`, ...) are free-form strings such as `"SI"` /
//! `"NO"` / `"NO APLICA"`; we pass them through verbatim.
//!
//! ### `informacionFechasContribuyente`
//! Nested object with the activity dates. May be absent entirely, and any of
//! its fields may be `null`. Dates apply as provider-formatted strings; no
//! date parsing happens here.
//!
//! ### `representantesLegales`
//! Either an array of `{identificacion, nombre}` objects or `null`/absent.
//! Natural persons have no representatives; the distinction between "none"
//! and "empty list" is preserved downstream as `null`.
//!
//! ### `Establecimiento/consultarPorNumeroRuc`
//! A JSON array, one element per establishment. `matriz` is the literal
//! string `"SI"` on the headquarters record. For some taxpayers the endpoint
//! answers an empty or whitespace-only body, or a non-200 status, instead of
//! `[]` — all treated as "no establishments".
//!
//! Every field is optional: the provider omits or nulls fields freely, and a
//! missing field must never be a deserialization error.

use serde::Deserialize;

/// One element of the taxpayer-record array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidadoContribuyente {
    #[serde(default)]
    pub estado_contribuyente_ruc: Option<String>,
    #[serde(default)]
    pub tipo_contribuyente: Option<String>,
    #[serde(default)]
    pub regimen: Option<String>,
    #[serde(default)]
    pub razon_social: Option<String>,
    #[serde(default)]
    pub actividad_economica_principal: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub obligado_llevar_contabilidad: Option<String>,
    #[serde(default)]
    pub agente_retencion: Option<String>,
    #[serde(default)]
    pub contribuyente_especial: Option<String>,
    #[serde(default)]
    pub contribuyente_fantasma: Option<String>,
    #[serde(default)]
    pub transacciones_inexistente: Option<String>,
    #[serde(default)]
    pub informacion_fechas_contribuyente: Option<InformacionFechasContribuyente>,
    #[serde(default)]
    pub representantes_legales: Option<Vec<RepresentanteLegalRaw>>,
    #[serde(default)]
    pub motivo_cancelacion_suspension: Option<String>,
}

/// Nested activity-date block of the taxpayer record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InformacionFechasContribuyente {
    #[serde(default)]
    pub fecha_inicio_actividades: Option<String>,
    #[serde(default)]
    pub fecha_cese: Option<String>,
    #[serde(default)]
    pub fecha_reinicio_actividades: Option<String>,
    #[serde(default)]
    pub fecha_actualizacion: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentanteLegalRaw {
    #[serde(default)]
    pub identificacion: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
}

/// One element of the establishments array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablecimientoRaw {
    #[serde(default)]
    pub numero_establecimiento: Option<String>,
    #[serde(default)]
    pub nombre_fantasia_comercial: Option<String>,
    #[serde(default)]
    pub direccion_completa: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub tipo_establecimiento: Option<String>,
    /// `"SI"` on the headquarters record.
    #[serde(default)]
    pub matriz: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contribuyente_deserializes_full_record() {
        let body = r#"[{
            "estadoContribuyenteRuc": "ACTIVO",
            "tipoContribuyente": "SOCIEDAD",
            "regimen": "GENERAL",
            "razonSocial": "ACME SA",
            "actividadEconomicaPrincipal": "VENTA AL POR MAYOR",
            "categoria": null,
            "obligadoLlevarContabilidad": "SI",
            "agenteRetencion": "NO",
            "contribuyenteEspecial": "NO",
            "contribuyenteFantasma": "NO",
            "transaccionesInexistente": "NO",
            "informacionFechasContribuyente": {
                "fechaInicioActividades": "2001-05-14 00:00:00.0",
                "fechaCese": null,
                "fechaReinicioActividades": null,
                "fechaActualizacion": "2023-02-01 09:12:44.0"
            },
            "representantesLegales": [
                {"identificacion": "1712345678", "nombre": "PEREZ JUAN"}
            ],
            "motivoCancelacionSuspension": null
        }]"#;
        let parsed: Vec<ConsolidadoContribuyente> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.len(), 1);
        let record = &parsed[0];
        assert_eq!(record.razon_social.as_deref(), Some("ACME SA"));
        assert_eq!(record.categoria, None);
        let fechas = record.informacion_fechas_contribuyente.as_ref().unwrap();
        assert_eq!(
            fechas.fecha_inicio_actividades.as_deref(),
            Some("2001-05-14 00:00:00.0")
        );
        let reps = record.representantes_legales.as_ref().unwrap();
        assert_eq!(reps[0].nombre.as_deref(), Some("PEREZ JUAN"));
    }

    #[test]
    fn contribuyente_tolerates_sparse_record() {
        let parsed: Vec<ConsolidadoContribuyente> =
            serde_json::from_str(r#"[{"razonSocial": "ACME SA"}]"#).unwrap();
        let record = &parsed[0];
        assert_eq!(record.razon_social.as_deref(), Some("ACME SA"));
        assert!(record.informacion_fechas_contribuyente.is_none());
        assert!(record.representantes_legales.is_none());
    }

    #[test]
    fn contribuyente_ignores_unknown_fields() {
        let parsed: Vec<ConsolidadoContribuyente> =
            serde_json::from_str(r#"[{"razonSocial": "ACME SA", "nuevoCampo": 7}]"#).unwrap();
        assert_eq!(parsed[0].razon_social.as_deref(), Some("ACME SA"));
    }

    #[test]
    fn establecimiento_deserializes_record() {
        let body = r#"[{
            "numeroEstablecimiento": "002",
            "nombreFantasiaComercial": "ACME NORTE",
            "direccionCompleta": "PICHINCHA / QUITO / AV 10 DE AGOSTO",
            "estado": "ABIERTO",
            "tipoEstablecimiento": "SUC",
            "matriz": "NO"
        }]"#;
        let parsed: Vec<EstablecimientoRaw> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed[0].numero_establecimiento.as_deref(), Some("002"));
        assert_eq!(parsed[0].matriz.as_deref(), Some("NO"));
    }
}
