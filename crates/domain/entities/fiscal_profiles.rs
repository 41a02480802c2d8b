use diesel::prelude::*;

use crate::infra::db::postgres::schema::legacy_fiscal_profiles;

/// Pre-verification fiscal record. Only read when an account has no
/// lightweight profile.
#[derive(Debug, Clone, PartialEq, Selectable, Queryable)]
#[diesel(table_name = legacy_fiscal_profiles)]
pub struct LegacyFiscalProfileEntity {
    pub account_id: String,
    pub razon_social: String,
    pub condicion_impositiva: String,
    pub estado: String,
    pub cuit: Option<String>,
    pub cuil: Option<String>,
    pub email_factura: Option<String>,
}
