//! URL builders for the SRI portal pages and REST endpoints.

/// The consultation entry page. Loading it runs the portal's JS, which sets
/// the cookies/tokens later in-session fetches depend on; it also hosts the
/// form used for manual challenge resolution.
#[must_use]
pub fn entry_url(base: &str) -> String {
    format!(
        "{}/sri-en-linea/SriRucWeb/ConsultaRuc/Consultas/consultaRuc",
        base.trim_end_matches('/')
    )
}

/// Taxpayer-record endpoint. Returns a JSON array with zero or one record.
///
/// The stray `?&` is what the portal's own frontend sends; kept verbatim.
#[must_use]
pub fn contribuyente_url(base: &str, ruc: &str) -> String {
    format!(
        "{}/sri-catastro-sujeto-servicio-internet/rest/ConsolidadoContribuyente/obtenerPorNumerosRuc?&ruc={ruc}",
        base.trim_end_matches('/')
    )
}

/// Establishments endpoint. Returns a JSON array, one element per
/// establishment; may be empty or answer non-200 for taxpayers without any.
#[must_use]
pub fn establecimientos_url(base: &str, ruc: &str) -> String {
    format!(
        "{}/sri-catastro-sujeto-servicio-internet/rest/Establecimiento/consultarPorNumeroRuc?numeroRuc={ruc}",
        base.trim_end_matches('/')
    )
}
