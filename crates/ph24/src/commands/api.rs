//! Direct API commands

use super::{client, ensure_success, print_done, print_json};
use colored::Colorize;
use ph24_api::{AvailabilityZone, Flavor, Server, ServerAction, UpdateServerRequest};
use ph24_config::Ph24Config;

pub async fn info(config: &Ph24Config) -> anyhow::Result<()> {
    let response = client(config)?.info().await;
    ensure_success(&response, "Failed to retrieve API information")?;
    print_json(&response)
}

pub async fn zones(config: &Ph24Config) -> anyhow::Result<()> {
    let response = client(config)?.availability_zones().await;
    ensure_success(&response, "Failed to retrieve availability zones")?;

    let zones: Vec<AvailabilityZone> = response.list().unwrap_or_default();
    if zones.is_empty() {
        println!("{}", "No availability zones".dimmed());
        return Ok(());
    }

    println!("{}", format!("{:<12} {:<40} {}", "ZONE", "NAME", "AVAILABLE").bold());
    println!("{}", "─".repeat(64).dimmed());
    for zone in zones {
        let Some(id) = zone.id() else { continue };
        let available = match zone.available {
            Some(true) => "yes".green(),
            Some(false) => "no".red(),
            None => "-".dimmed(),
        };
        println!(
            "{:<12} {:<40} {}",
            id,
            ph24_module::fields::zone_label(&id, Some(&zone)),
            available
        );
    }
    Ok(())
}

pub async fn flavors(config: &Ph24Config) -> anyhow::Result<()> {
    let response = client(config)?.flavors().await;
    ensure_success(&response, "Failed to retrieve flavors")?;

    let flavors: Vec<Flavor> = response.list().unwrap_or_default();
    if flavors.is_empty() {
        println!("{}", "No flavors".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<24} {:<30} {:>6} {:>10}", "FLAVOR", "NAME", "CORES", "MEMORY").bold()
    );
    println!("{}", "─".repeat(73).dimmed());
    for flavor in flavors {
        let Some(id) = flavor.id() else { continue };
        let meta = flavor.meta.clone().unwrap_or_default();
        println!(
            "{:<24} {:<30} {:>6} {:>10}",
            id.cyan(),
            flavor.display_name().unwrap_or_default(),
            scalar(meta.cores.as_ref()),
            scalar(meta.memory.as_ref())
        );
    }
    Ok(())
}

fn scalar(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

pub async fn plans(config: &Ph24Config) -> anyhow::Result<()> {
    let response = client(config)?.plans().await;
    ensure_success(&response, "Failed to retrieve plans")?;
    print_json(&response)
}

pub async fn images(config: &Ph24Config) -> anyhow::Result<()> {
    let response = client(config)?.images().await;
    ensure_success(&response, "Failed to retrieve images")?;
    print_json(&response)
}

pub async fn addons(config: &Ph24Config) -> anyhow::Result<()> {
    let response = client(config)?.addons().await;
    ensure_success(&response, "Failed to retrieve addons")?;
    print_json(&response)
}

pub async fn projects(config: &Ph24Config) -> anyhow::Result<()> {
    let response = client(config)?.projects().await;
    ensure_success(&response, "Failed to retrieve projects")?;
    print_json(&response)
}

pub async fn create_project(config: &Ph24Config, name: &str) -> anyhow::Result<()> {
    let response = client(config)?.create_project(name).await;
    ensure_success(&response, "Failed to create project")?;

    match response.resource_id() {
        Some(id) => print_done(&format!("Project {} created ({})", name.cyan(), id)),
        None => print_done(&format!("Project {} created", name.cyan())),
    }
    Ok(())
}

pub async fn project(config: &Ph24Config, project_id: &str) -> anyhow::Result<()> {
    let response = client(config)?.project(project_id).await;
    ensure_success(&response, "Failed to retrieve project")?;
    print_json(&response)
}

pub async fn delete_project(config: &Ph24Config, project_id: &str) -> anyhow::Result<()> {
    let response = client(config)?.delete_project(project_id).await;
    ensure_success(&response, "Failed to delete project")?;
    print_done(&format!("Project {} deleted", project_id.cyan()));
    Ok(())
}

pub async fn project_images(config: &Ph24Config, project_id: &str) -> anyhow::Result<()> {
    let response = client(config)?.project_images(project_id).await;
    ensure_success(&response, "Failed to retrieve project images")?;
    print_json(&response)
}

pub async fn networks(config: &Ph24Config, project_id: &str) -> anyhow::Result<()> {
    let response = client(config)?.networks(project_id).await;
    ensure_success(&response, "Failed to retrieve networks from the project")?;
    print_json(&response)
}

pub async fn firewalls(config: &Ph24Config, project_id: &str) -> anyhow::Result<()> {
    let response = client(config)?.firewalls(project_id).await;
    ensure_success(&response, "Failed to retrieve firewalls from the project")?;
    print_json(&response)
}

pub async fn servers(config: &Ph24Config, project_id: &str) -> anyhow::Result<()> {
    let response = client(config)?.servers(project_id).await;
    ensure_success(&response, "Failed to retrieve servers")?;

    let servers: Vec<Server> = response.list().unwrap_or_default();
    if servers.is_empty() {
        println!("{}", "No servers in this project".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<38} {:<28} {:<12} {}", "SERVER", "NAME", "STATUS", "IP").bold()
    );
    println!("{}", "─".repeat(100).dimmed());
    for server in servers {
        let status = server.status.clone().unwrap_or_else(|| "N/A".to_string());
        let status_colored = if status.eq_ignore_ascii_case("active") {
            status.green()
        } else {
            status.yellow()
        };
        println!(
            "{:<38} {:<28} {:<12} {}",
            server.id().unwrap_or_default(),
            server.name.clone().unwrap_or_default(),
            status_colored,
            server.ip_address_strings().join(", ")
        );
    }
    Ok(())
}

pub async fn server(config: &Ph24Config, project_id: &str, server_id: &str) -> anyhow::Result<()> {
    let response = client(config)?.server(project_id, server_id).await;
    ensure_success(&response, "Failed to retrieve server")?;
    print_json(&response)
}

pub async fn rename_server(
    config: &Ph24Config,
    project_id: &str,
    server_id: &str,
    name: &str,
) -> anyhow::Result<()> {
    ph24_module::validate_hostname(name)?;

    let params = UpdateServerRequest {
        name: Some(name.trim().to_string()),
    };
    let response = client(config)?
        .update_server(project_id, server_id, &params)
        .await;
    ensure_success(&response, "Failed to update hostname")?;
    print_done(&format!("Server {} renamed to {}", server_id, name.trim().cyan()));
    Ok(())
}

pub async fn delete_server(
    config: &Ph24Config,
    project_id: &str,
    server_id: &str,
) -> anyhow::Result<()> {
    let response = client(config)?.delete_server(project_id, server_id).await;
    ensure_success(&response, "Failed to delete server")?;
    print_done(&format!("Server {} deleted", server_id.cyan()));
    Ok(())
}

pub async fn server_console(
    config: &Ph24Config,
    project_id: &str,
    server_id: &str,
) -> anyhow::Result<()> {
    let response = client(config)?.server_console(project_id, server_id).await;
    ensure_success(&response, "Failed to retrieve console")?;
    print_json(&response)
}

pub async fn server_logs(
    config: &Ph24Config,
    project_id: &str,
    server_id: &str,
) -> anyhow::Result<()> {
    let response = client(config)?.server_logs(project_id, server_id).await;
    ensure_success(&response, "Failed to retrieve server log")?;
    print_json(&response)
}

pub async fn server_ports(
    config: &Ph24Config,
    project_id: &str,
    server_id: &str,
) -> anyhow::Result<()> {
    let response = client(config)?
        .server_network_ports(project_id, server_id)
        .await;
    ensure_success(&response, "Failed to retrieve network ports")?;
    print_json(&response)
}

pub async fn server_action(
    config: &Ph24Config,
    project_id: &str,
    server_id: &str,
    action: &str,
    flavor_id: Option<&str>,
) -> anyhow::Result<()> {
    let action: ServerAction = action.parse()?;
    if action == ServerAction::Rescale && flavor_id.is_none() {
        anyhow::bail!("RESCALE requires --flavor");
    }

    let response = client(config)?
        .server_action(project_id, server_id, action, flavor_id)
        .await;
    ensure_success(&response, &format!("Action {} failed", action))?;
    print_done(&format!("Action {} accepted", action.to_string().cyan()));
    Ok(())
}
