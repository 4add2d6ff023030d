//! Connection rows, packages and order forms

use crate::error::{ModuleError, Result};
use crate::fields::{
    Field, ModuleFields, PLACEHOLDER_NO_IMAGES, PLACEHOLDER_NO_MODULE, SelectOption, zone_label,
};
use crate::host::Host;
use crate::model::{ConnectionConfig, MetaField, ModuleRow, OrderRequest, PackageInput, PackageMeta};
use crate::module::Ph24Module;
use ph24_api::{AvailabilityZone, Flavor, Image, Ph24Client, Url};
use regex::Regex;
use std::sync::LazyLock;

static HOSTNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9.-]+$").unwrap());

/// Hostname must be present and made of letters, digits, dots and dashes
pub fn validate_hostname(hostname: &str) -> Result<()> {
    let hostname = hostname.trim();
    if hostname.is_empty() {
        return Err(ModuleError::HostnameRequired);
    }

    if !HOSTNAME_PATTERN.is_match(hostname) {
        return Err(ModuleError::HostnameFormat);
    }
    Ok(())
}

impl<H: Host> Ph24Module<H> {
    /// Field rules for a connection row, in form order
    pub(crate) async fn validate_row(&self, input: &ConnectionConfig) -> Result<()> {
        if input.account_name.trim().is_empty() {
            return Err(ModuleError::AccountNameEmpty);
        }

        let api_url = input.api_url.trim();
        if api_url.is_empty() {
            return Err(ModuleError::ApiUrlEmpty);
        }
        if Url::parse(api_url).is_err() {
            return Err(ModuleError::ApiUrlInvalid);
        }

        if input.api_key.trim().is_empty() {
            return Err(ModuleError::ApiKeyEmpty);
        }
        if !input.skip_validation {
            let reachable = match Ph24Client::new(input.api_key.trim(), Some(api_url)) {
                Ok(api) => api.availability_zones().await.is_success(),
                Err(e) => {
                    tracing::debug!("Could not build client for row validation: {}", e);
                    false
                }
            };
            if !reachable {
                return Err(ModuleError::ApiKeyInvalid);
            }
        }

        if input.project_name_template.trim().is_empty() {
            return Err(ModuleError::ProjectNameTemplateEmpty);
        }

        Ok(())
    }

    pub(crate) fn package_meta(&self, input: &PackageInput) -> Result<Vec<MetaField>> {
        let flavor_id = input.get("flavor_id").ok_or(ModuleError::FlavorMissing)?;

        let mut meta = vec![MetaField::plain("flavor_id", flavor_id)];
        for key in ["availability_zone", "facility_id"] {
            if let Some(value) = input.get(key) {
                meta.push(MetaField::plain(key, value));
            }
        }
        Ok(meta)
    }

    /// API client for a row that has a key; `None` means "not configured"
    fn configured_api(&self, row: Option<&ModuleRow>) -> Option<Ph24Client> {
        let row = row.filter(|row| !row.meta.api_key.trim().is_empty())?;
        match self.api(row) {
            Ok(api) => Some(api),
            Err(e) => {
                tracing::warn!("Module row {} has an unusable connection: {}", row.id, e);
                None
            }
        }
    }

    async fn zone_options(&self, api: &Ph24Client, with_availability: bool) -> Vec<SelectOption> {
        let zones: Vec<AvailabilityZone> = api
            .availability_zones()
            .await
            .list()
            .unwrap_or_default();

        zones
            .iter()
            .filter_map(|zone| {
                let id = zone.id()?;
                let mut label = zone_label(&id, Some(zone));
                if with_availability {
                    match zone.available {
                        Some(true) => label.push_str(" (available)"),
                        Some(false) => label.push_str(" (unavailable)"),
                        None => {}
                    }
                }
                Some(SelectOption::new(id, label))
            })
            .collect()
    }

    pub(crate) async fn render_package_fields(
        &self,
        row: Option<&ModuleRow>,
        current: &PackageMeta,
    ) -> ModuleFields {
        let mut flavor_options = Vec::new();
        let mut zone_options = Vec::new();

        if let Some(api) = self.configured_api(row) {
            let response = api.flavors().await;
            if response.is_success() {
                let flavors: Vec<Flavor> = response.list().unwrap_or_default();
                flavor_options = flavors
                    .iter()
                    .filter_map(|flavor| {
                        let id = flavor.id()?;
                        let label = flavor.display_name().unwrap_or_else(|| id.clone());
                        Some(SelectOption::new(id, label))
                    })
                    .collect();
            }
            zone_options = self.zone_options(&api, true).await;
        }

        let mut fields = ModuleFields::new();
        fields.push(Field::select(
            "flavor_id",
            "Plan/Flavor ID",
            flavor_options,
            Some(current.flavor_id.clone()).filter(|id| !id.is_empty()),
            PLACEHOLDER_NO_MODULE,
        ));
        fields.push(Field::select(
            "availability_zone",
            "Availability Zone",
            zone_options,
            current.availability_zone.clone(),
            PLACEHOLDER_NO_MODULE,
        ));
        fields.push(Field::text(
            "facility_id",
            "Facility ID",
            current.facility_id.clone(),
        ));
        fields
    }

    /// Order form: operating system, availability zone and hostname
    pub(crate) async fn render_order_fields(
        &self,
        row: Option<&ModuleRow>,
        vars: &OrderRequest,
    ) -> ModuleFields {
        let mut image_options = Vec::new();
        let mut zone_options = Vec::new();

        if let Some(api) = self.configured_api(row) {
            if let Some(master) = row.and_then(|row| row.meta.master_project()) {
                let response = api.project_images(master).await;
                if response.is_success() {
                    let images: Vec<Image> = response.list().unwrap_or_default();
                    image_options = images
                        .iter()
                        .filter_map(|image| {
                            let id = image.id()?;
                            let label = image.display_name().unwrap_or_else(|| id.clone());
                            Some(SelectOption::new(id, label))
                        })
                        .collect();
                }
            }
            zone_options = self.zone_options(&api, false).await;
        }

        let mut fields = ModuleFields::new();
        fields.push(Field::select(
            "ph24_operating_system",
            "Operating System",
            image_options,
            vars.operating_system.clone(),
            PLACEHOLDER_NO_IMAGES,
        ));
        fields.push(Field::select(
            "availability_zone",
            "Availability Zone",
            zone_options,
            vars.availability_zone.clone(),
            PLACEHOLDER_NO_MODULE,
        ));
        fields.push(Field::text(
            "hostname",
            "Hostname",
            Some(vars.hostname.clone()).filter(|h| !h.is_empty()),
        ));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_rules() {
        assert!(validate_hostname("web-01.example.com").is_ok());
        assert!(validate_hostname("WEB01.Example.COM").is_ok());
        assert!(validate_hostname("10.0.0.1").is_ok());

        assert!(matches!(
            validate_hostname("   "),
            Err(ModuleError::HostnameRequired)
        ));
        assert!(matches!(
            validate_hostname("web_01.example.com"),
            Err(ModuleError::HostnameFormat)
        ));
        assert!(matches!(
            validate_hostname("my server"),
            Err(ModuleError::HostnameFormat)
        ));
    }
}
