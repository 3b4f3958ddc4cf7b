use productpro::client::config::ClientConfig;
use productpro::client::services::api_service::ApiClient;
use productpro::common::models::NewProject;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cfg = ClientConfig::from_env();
    let base_url = std::env::args().nth(1).unwrap_or(cfg.api_base_url);
    println!("Using API {}", base_url);

    let api = ApiClient::mount(&base_url).await?;
    let status = api.status().await;
    println!("HEALTH -> connected={} error={:?}", status.is_connected, status.error_message);
    if !status.is_connected {
        return Ok(());
    }

    let project = api
        .create_project(&NewProject::new("Smoke test chair", "furniture")
            .with_template("chair")
            .with_description("Created by api_smoke"))
        .await?;
    println!("CREATE -> {} ({} components)", project.id, project.components.len());

    let command = api.process_command("make it blue and larger", Some(&project.id)).await?;
    println!("COMMAND -> {} => {:?}", command.message, command.result);

    let analysis = api.analyze_project(&project.id).await?;
    println!("ANALYZE -> {} of {} components have a material", analysis.components_with_material, analysis.component_count);

    let export = api.export_project(&project.id, "dxf").await?;
    println!("EXPORT -> format={} extension={}", export.metadata.format, export.file_extension);

    let session = api.create_collaboration_session(&project.id, None).await?;
    println!("COLLAB -> {} \"{}\"", session.session_id, session.name);

    let message = api.delete_project(&project.id).await?;
    println!("DELETE -> {}", message);

    Ok(())
}
