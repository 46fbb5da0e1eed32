//! Normalization from raw SRI shapes to the [`rucq_core`] output schema.
//!
//! Pure field mapping with default-on-absence semantics: a missing or null
//! provider field becomes `""` (or stays `None` for the two nullable
//! fields), never an error.

use rucq_core::{DatosContribuyente, Establecimiento, RepresentanteLegal};

use crate::types::{ConsolidadoContribuyente, EstablecimientoRaw};

/// Maps a raw taxpayer record into the output schema, flattening the nested
/// date block.
#[must_use]
pub fn normalize_contribuyente(raw: ConsolidadoContribuyente) -> DatosContribuyente {
    let fechas = raw.informacion_fechas_contribuyente.unwrap_or_default();

    let representantes_legales = raw.representantes_legales.map(|reps| {
        reps.into_iter()
            .map(|rep| RepresentanteLegal {
                identificacion: rep.identificacion.unwrap_or_default(),
                nombre: rep.nombre.unwrap_or_default(),
            })
            .collect()
    });

    DatosContribuyente {
        estado: raw.estado_contribuyente_ruc.unwrap_or_default(),
        tipo_contribuyente: raw.tipo_contribuyente.unwrap_or_default(),
        regimen: raw.regimen.unwrap_or_default(),
        razon_social: raw.razon_social.unwrap_or_default(),
        actividad_economica_principal: raw.actividad_economica_principal.unwrap_or_default(),
        categoria: raw.categoria.unwrap_or_default(),
        obligado_llevar_contabilidad: raw.obligado_llevar_contabilidad.unwrap_or_default(),
        agente_retencion: raw.agente_retencion.unwrap_or_default(),
        contribuyente_especial: raw.contribuyente_especial.unwrap_or_default(),
        contribuyente_fantasma: raw.contribuyente_fantasma.unwrap_or_default(),
        transacciones_inexistente: raw.transacciones_inexistente.unwrap_or_default(),
        fecha_inicio_actividades: fechas.fecha_inicio_actividades.unwrap_or_default(),
        fecha_cese: fechas.fecha_cese.unwrap_or_default(),
        fecha_reinicio_actividades: fechas.fecha_reinicio_actividades.unwrap_or_default(),
        fecha_actualizacion: fechas.fecha_actualizacion.unwrap_or_default(),
        representantes_legales,
        motivo_cancelacion_suspension: raw.motivo_cancelacion_suspension,
    }
}

/// Maps the raw establishment list, deriving `es_matriz` from the provider's
/// `matriz == "SI"` flag and falling back to the taxpayer's legal name when
/// an establishment has no trade name.
///
/// When the provider returns no establishments at all, a single synthetic
/// headquarters record is derived from the taxpayer record — a required
/// fallback, not an error: every registered taxpayer has at least its
/// headquarters.
#[must_use]
pub fn normalize_establecimientos(
    raw: Vec<EstablecimientoRaw>,
    razon_social: &str,
    estado_ruc: &str,
) -> Vec<Establecimiento> {
    if raw.is_empty() {
        return vec![Establecimiento {
            num_establecimiento: "001".to_owned(),
            nombre: razon_social.to_owned(),
            ubicacion: "MATRIZ".to_owned(),
            estado: estado_ruc.to_owned(),
            tipo_establecimiento: "MAT".to_owned(),
            es_matriz: true,
        }];
    }

    raw.into_iter()
        .map(|est| Establecimiento {
            num_establecimiento: est.numero_establecimiento.unwrap_or_default(),
            nombre: est
                .nombre_fantasia_comercial
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| razon_social.to_owned()),
            ubicacion: est.direccion_completa.unwrap_or_default(),
            estado: est.estado.unwrap_or_default(),
            tipo_establecimiento: est.tipo_establecimiento.unwrap_or_default(),
            es_matriz: est.matriz.as_deref() == Some("SI"),
        })
        .collect()
}
