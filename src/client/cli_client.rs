use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader, stdin};

use productpro::client::config::ClientConfig;
use productpro::client::pages::collaboration::CollaborationPage;
use productpro::client::pages::design_studio::DesignStudio;
use productpro::client::pages::export::{ExportFormat, ExportPage};
use productpro::client::pages::material_library::MaterialLibraryPage;
use productpro::client::pages::projects::ProjectsPage;
use productpro::client::pages::settings::SettingsPage;
use productpro::client::pages::standards::StandardsPage;
use productpro::client::pages::tutorials::TutorialsPage;
use productpro::client::services::api_service::ApiClient;
use productpro::common::models::NewProject;

const HELP: &str = "\
Commands:
  /health                          check the backend
  /projects                        list projects
  /create <industry> <name> [--template <id>]
  /delete <project_id>
  /open <project_id>               open a project in the studio
  /cmd <text>                      design command for the open project
  /save                            save the studio design
  /upload <path>                   attach a reference image to the open project
  /export <json|csv|pdf|dxf> [dir] export the open project
  /materials [category]            material library
  /sustainable [category] [min]    sustainable materials
  /standards [industry]            industry standards
  /trends [industry]               market trends
  /collab [name]                   start a collaboration session on the open project
  /tutorials [topic]               tutorials
  /theme                           toggle light/dark theme
  /reset-settings                  forget saved settings
  /help                            this text
  /quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    env_logger::init();

    let mut settings = SettingsPage::load(&config.settings_path);
    // explicit argument > API_BASE_URL > saved settings
    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("API_BASE_URL").ok())
        .unwrap_or_else(|| settings.settings.api_base_url.clone());

    let api = ApiClient::mount(&base_url).await?;
    let status = api.status().await;
    if status.is_connected {
        println!("[CLIENT] Connected to {}", api.base_url());
    } else {
        println!(
            "[CLIENT] Backend not reachable at {}: {}",
            api.base_url(),
            status.error_message.unwrap_or_default()
        );
    }
    println!("[CLIENT] Type /help for the command list.");

    let mut projects = ProjectsPage::new();
    let mut studio = DesignStudio::new();
    let mut export = ExportPage::new();
    let mut materials = MaterialLibraryPage::new();
    let mut standards = StandardsPage::new();
    let mut collaboration = CollaborationPage::new();
    let mut tutorials = TutorialsPage::new();

    let mut input = BufReader::new(stdin());
    let mut input_line = String::new();
    loop {
        input_line.clear();
        print!("> ");
        use std::io::Write;
        std::io::stdout().flush()?;
        let n = input.read_line(&mut input_line).await?;
        if n == 0 { break; }
        let line = input_line.trim();
        if line.is_empty() { continue; }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match command {
            "/health" => {
                let status = api.check_connection().await;
                if status.is_connected {
                    println!("[CLIENT] Backend is healthy");
                } else {
                    println!("[CLIENT] Backend unavailable: {}", status.error_message.unwrap_or_default());
                }
            }
            "/projects" => {
                projects.load(&api).await;
                if let Some(err) = &projects.error {
                    println!("[CLIENT] {}", err);
                } else if projects.projects.is_empty() {
                    println!("[CLIENT] No projects yet");
                }
                for p in &projects.projects {
                    println!("  {}  {:<24} {:<12} {}", p.id, p.name, p.industry, p.status);
                }
            }
            "/create" if args.len() >= 2 => {
                let industry = args[0];
                let mut name_parts = Vec::new();
                let mut template = None;
                let mut iter = args[1..].iter();
                while let Some(arg) = iter.next() {
                    if *arg == "--template" {
                        template = iter.next().copied();
                    } else {
                        name_parts.push(*arg);
                    }
                }
                let mut new = NewProject::new(name_parts.join(" "), industry);
                if let Some(template) = template {
                    new = new.with_template(template);
                }
                match projects.create(&api, new).await {
                    Some(p) => println!("[CLIENT] Created project {} ({})", p.name, p.id),
                    None => println!("[CLIENT] {}", projects.error.as_deref().unwrap_or_default()),
                }
            }
            "/delete" if args.len() == 1 => {
                if projects.delete(&api, args[0]).await {
                    println!("[CLIENT] Project deleted");
                } else {
                    println!("[CLIENT] {}", projects.error.as_deref().unwrap_or_default());
                }
            }
            "/open" if args.len() == 1 => {
                studio.load(&api, args[0]).await;
                match &studio.project {
                    Some(p) if p.id == args[0] => {
                        println!("[CLIENT] Opened {} ({}), design: {:?}", p.name, p.industry, studio.design);
                        println!("[CLIENT] {} templates, {} trends for {}", studio.templates.len(), studio.trends.len(), p.industry);
                        collaboration = CollaborationPage::for_project(p.clone());
                    }
                    _ => {}
                }
                if let Some(err) = &studio.error {
                    println!("[CLIENT] {}", err);
                }
            }
            "/cmd" if !rest.is_empty() => {
                if studio.project.is_none() {
                    println!("[CLIENT] Open a project first (/open <project_id>)");
                    continue;
                }
                println!("[STUDIO] {}", studio.apply_command(rest));
                let d = &studio.design;
                println!("[STUDIO] Design: {} ({}), {} {}, scale {:.1}", d.color, d.color_hex(), d.finish, d.material, d.scale);
            }
            "/save" => {
                if studio.save(&api).await {
                    println!("[CLIENT] Design saved");
                } else {
                    println!("[CLIENT] {}", studio.error.as_deref().unwrap_or_default());
                }
            }
            "/upload" if !rest.is_empty() => {
                if studio.upload_reference(&api, Path::new(rest)).await {
                    if let Some(upload) = &studio.last_upload {
                        println!("[CLIENT] Uploaded to {} ({} bytes)", upload.file_path, upload.analysis.size_bytes);
                    }
                } else {
                    println!("[CLIENT] {}", studio.error.as_deref().unwrap_or_default());
                }
            }
            "/export" if !args.is_empty() => {
                let Some(project_id) = studio.project.as_ref().map(|p| p.id.clone()) else {
                    println!("[CLIENT] Open a project first (/open <project_id>)");
                    continue;
                };
                match args[0].parse::<ExportFormat>() {
                    Ok(format) => export.format = format,
                    Err(e) => {
                        println!("[CLIENT] {}", e);
                        continue;
                    }
                }
                if export.export(&api, &project_id).await.is_none() {
                    println!("[CLIENT] {}", export.error.as_deref().unwrap_or_default());
                    continue;
                }
                let dir = args.get(1).copied().unwrap_or("exports");
                match export.save_to(Path::new(dir)).await {
                    Ok(Some(path)) => println!("[CLIENT] Exported {} to {}", export.format, path.display()),
                    Ok(None) => {}
                    Err(e) => println!("[CLIENT] Failed to write export: {}", e),
                }
            }
            "/materials" => {
                materials.sustainable_only = false;
                materials.min_score = None;
                materials.set_category(&api, args.first().copied()).await;
                print_materials(&materials);
            }
            "/sustainable" => {
                let min_score = args.get(1).and_then(|s| s.parse::<f64>().ok());
                materials.category = args.first().map(|c| c.to_string());
                materials.set_sustainable_only(&api, true, min_score).await;
                print_materials(&materials);
            }
            "/standards" => {
                standards.set_industry(&api, args.first().copied()).await;
                if let Some(err) = &standards.error {
                    println!("[CLIENT] {}", err);
                }
                for s in &standards.standards {
                    let flag = if s.mandatory { "mandatory" } else { "voluntary" };
                    println!("  {:<18} {:<40} {:<12} {}", s.code, s.name, s.industry, flag);
                }
            }
            "/trends" => match api.get_trends(args.first().copied()).await {
                Ok(trends) => {
                    for t in trends {
                        println!("  {:<24} strength {:.2}  growth {:.2}  {}", t.name, t.strength, t.growth_rate, t.maturity);
                    }
                }
                Err(e) => println!("[CLIENT] {}", e),
            },
            "/collab" => {
                let name = if rest.is_empty() { None } else { Some(rest) };
                match collaboration.create_session(&api, name).await {
                    Some(session) => println!("[CLIENT] Session {} \"{}\" is {}", session.session_id, session.name, session.status),
                    None => println!("[CLIENT] {}", collaboration.error.as_deref().unwrap_or_default()),
                }
            }
            "/tutorials" => {
                tutorials.set_topic(args.first().copied());
                for t in tutorials.visible() {
                    println!("  [{}] {} - {}", t.topic, t.title, t.summary);
                    for (i, step) in t.steps.iter().enumerate() {
                        println!("      {}. {}", i + 1, step);
                    }
                }
            }
            "/theme" => {
                let theme = settings.toggle_theme();
                if settings.save() {
                    println!("[CLIENT] Theme set to {}", theme.as_str());
                } else {
                    println!("[CLIENT] {}", settings.error.as_deref().unwrap_or_default());
                }
            }
            "/reset-settings" => {
                if settings.reset() {
                    println!("[CLIENT] Settings reset to defaults");
                } else {
                    println!("[CLIENT] {}", settings.error.as_deref().unwrap_or_default());
                }
            }
            "/help" => println!("{}", HELP),
            "/quit" => break,
            _ => println!("[CLIENT] Invalid command syntax. Type /help for the command list."),
        }
    }
    println!("[CLIENT] Bye!");
    Ok(())
}

fn print_materials(page: &MaterialLibraryPage) {
    if let Some(err) = &page.error {
        println!("[CLIENT] {}", err);
        return;
    }
    for m in &page.materials {
        println!("  {:<20} {:<24} {:<10} sustainability {:.2}", m.id, m.name, m.category, m.sustainability_score);
    }
}
