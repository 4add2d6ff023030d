//! Provisioning module commands backed by the local state file

use super::print_done;
use crate::state::{FileHost, ServiceRecord};
use colored::Colorize;
use ph24_config::Ph24Config;
use ph24_module::{
    ClientActionRequest, ConnectionConfig, ModuleRow, OrderRequest, Package, PackageMeta,
    Ph24Module, ProvisioningModule, Service, ServiceStatus,
};
use std::path::Path;

pub struct ProvisionArgs {
    pub client_id: String,
    pub hostname: String,
    pub image: String,
    pub flavor: String,
    pub zone: Option<String>,
    pub facility: Option<String>,
    pub service_id: Option<String>,
}

/// Module row for the configured account; credentials are not checked
pub fn module_row(config: &Ph24Config) -> anyhow::Result<ModuleRow> {
    Ok(ModuleRow {
        id: "cli".to_string(),
        meta: ConnectionConfig {
            account_name: "cli".to_string(),
            api_url: config.api_url.clone(),
            api_key: config.api_key()?.to_string(),
            project_name_template: config.project_name_template.clone(),
            master_project_id: config.master_project_id.clone(),
            use_master_project: config.use_master_project,
            skip_validation: true,
        },
    })
}

async fn open(state_dir: &Path) -> anyhow::Result<Ph24Module<FileHost>> {
    let host = FileHost::open(state_dir).await?;
    Ok(Ph24Module::new(host))
}

fn lookup(
    module: &Ph24Module<FileHost>,
    service_id: &str,
) -> anyhow::Result<(ServiceRecord, Service)> {
    let record = module
        .host()
        .service(service_id)
        .ok_or_else(|| anyhow::anyhow!("Service '{}' not found", service_id))?;
    let service = record.to_service(service_id);
    Ok((record, service))
}

pub async fn provision(
    config: &Ph24Config,
    state_dir: &Path,
    args: ProvisionArgs,
) -> anyhow::Result<()> {
    let row = module_row(config)?;
    let module = open(state_dir).await?;

    let service_id = args
        .service_id
        .clone()
        .unwrap_or_else(|| module.host().snapshot().next_service_id());
    if module.host().service(&service_id).is_some() {
        anyhow::bail!("Service '{}' already exists", service_id);
    }

    let package = Package {
        id: "cli".to_string(),
        meta: PackageMeta {
            flavor_id: args.flavor,
            availability_zone: args.zone,
            facility_id: args.facility,
        },
    };
    let vars = OrderRequest {
        client_id: args.client_id.clone(),
        hostname: args.hostname,
        operating_system: Some(args.image),
        ..Default::default()
    };

    module.validate_service(&package, &vars)?;

    println!(
        "Provisioning service {} for customer {}...",
        service_id.cyan(),
        args.client_id.cyan()
    );
    let result = module
        .add_service(&row, &package, &vars, ServiceStatus::Active)
        .await;
    module.host().persist().await?;
    let fields = result?;

    let server_id = fields.get("server_id").unwrap_or_default().to_string();
    let ips = fields.get("ip_addresses").unwrap_or("[]").to_string();
    module
        .host()
        .put_service(
            &service_id,
            ServiceRecord::new(args.client_id, ServiceStatus::Active, fields),
        )
        .await?;

    print_done(&format!(
        "Service {} active (server {}, IPs {})",
        service_id.cyan(),
        server_id,
        ips
    ));
    Ok(())
}

pub async fn cancel(config: &Ph24Config, state_dir: &Path, service_id: &str) -> anyhow::Result<()> {
    let row = module_row(config)?;
    let module = open(state_dir).await?;
    let (_, service) = lookup(&module, service_id)?;

    let result = module
        .cancel_service(&row, &Package::default(), &service)
        .await;

    // The service is canceled even when the remote delete failed
    module
        .host()
        .set_status(service_id, ServiceStatus::Canceled)
        .await?;

    if let Err(e) = result {
        anyhow::bail!(
            "Service {} marked canceled, but the server was not removed: {}",
            service_id,
            e
        );
    }
    print_done(&format!("Service {} canceled", service_id.cyan()));
    Ok(())
}

pub async fn suspend(config: &Ph24Config, state_dir: &Path, service_id: &str) -> anyhow::Result<()> {
    let row = module_row(config)?;
    let module = open(state_dir).await?;
    let (record, service) = lookup(&module, service_id)?;
    if record.status == ServiceStatus::Canceled {
        anyhow::bail!("Service '{}' is canceled", service_id);
    }

    let result = module
        .suspend_service(&row, &Package::default(), &service)
        .await;
    module.host().persist().await?;
    result?;

    module
        .host()
        .set_status(service_id, ServiceStatus::Suspended)
        .await?;
    print_done(&format!("Service {} suspended", service_id.cyan()));
    Ok(())
}

pub async fn unsuspend(
    config: &Ph24Config,
    state_dir: &Path,
    service_id: &str,
) -> anyhow::Result<()> {
    let row = module_row(config)?;
    let module = open(state_dir).await?;
    let (record, service) = lookup(&module, service_id)?;
    if record.status == ServiceStatus::Canceled {
        anyhow::bail!("Service '{}' is canceled", service_id);
    }

    let result = module
        .unsuspend_service(&row, &Package::default(), &service)
        .await;
    module.host().persist().await?;
    result?;

    module
        .host()
        .set_status(service_id, ServiceStatus::Active)
        .await?;
    print_done(&format!("Service {} unsuspended", service_id.cyan()));
    Ok(())
}

pub async fn status(
    config: &Ph24Config,
    state_dir: &Path,
    service_id: &str,
    action: Option<String>,
    hostname: Option<String>,
) -> anyhow::Result<()> {
    // A missing API key is reported by the overview itself
    let row = module_row(config).ok();
    let module = open(state_dir).await?;
    let (record, service) = lookup(&module, service_id)?;

    let request = action.map(|action| ClientActionRequest {
        action,
        new_hostname: hostname,
    });
    let overview = module
        .client_actions(row.as_ref(), &service, request.as_ref())
        .await;
    module.host().persist().await?;

    println!("{} {}", "Service:".bold(), service_id.cyan());
    println!("  Customer: {}", record.client_id);
    println!("  Status:   {}", record.status);
    if let Some(message) = &overview.message {
        println!("  {}", message.yellow());
    }
    if let Some(hostname) = &overview.hostname {
        println!("  Hostname: {}", hostname);
    }
    if let Some(power) = overview.server_status {
        println!(
            "  Power:    {} ({} / {})",
            power.to_string().bold(),
            overview.status.as_deref().unwrap_or("-"),
            overview.power_state.as_deref().unwrap_or("-")
        );
    }
    if let Some(ipv4) = &overview.ipv4_address {
        println!("  IPv4:     {}", ipv4);
    }
    if let Some(ipv6) = &overview.ipv6_address {
        println!("  IPv6:     {}", ipv6);
    }
    if let Some(details) = &overview.details {
        if let Some(zone) = &details.availability_zone {
            println!("  Zone:     {}", zone);
        }
        if let Some(image) = details.image_name.as_ref().or(details.image_id.as_ref()) {
            println!("  Image:    {}", image);
        }
        if let Some(created) = &details.created_at_human {
            println!("  Created:  {} UTC", created);
        }
    }
    if let Some(specs) = &overview.specs {
        println!(
            "  Flavor:   {}",
            specs
                .name
                .as_ref()
                .or(specs.flavor_id.as_ref())
                .map(String::as_str)
                .unwrap_or("-")
        );
    }
    Ok(())
}
