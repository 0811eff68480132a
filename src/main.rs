use chrono::Local;
use clap::Parser;
use dorm_dashboard::app::{render, Session};
use dorm_dashboard::config::cli::{Cli, Command};
use dorm_dashboard::config::DashboardConfig;
use dorm_dashboard::core::avatar::compress_avatar;
use dorm_dashboard::core::roster::NewStudent;
use dorm_dashboard::domain::model::Scope;
use dorm_dashboard::utils::error::{DashboardError, ErrorSeverity, Result};
use dorm_dashboard::utils::{logger, validation::Validate};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting dorm-dashboard");
    tracing::debug!("CLI arguments: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // Low severity is a full room or a duplicate name: reported, not a failure.
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            DashboardConfig::from_file(path)?
        }
        None => DashboardConfig::default(),
    };

    if let Some(output_path) = &cli.output_path {
        config.export.output_path = output_path.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let mut session = Session::open(config, cli.roster.as_deref(), cli.seed).await?;

    match cli.command {
        Command::Seed => {
            // A session without a snapshot was seeded when it opened.
            if session.is_restored() {
                session.reseed();
            }
            if session.persist().await? {
                println!(
                    "✅ {} talaba bilan yangi ro'yxat saqlandi",
                    session.store().roster().student_count()
                );
            } else {
                tracing::warn!("No --roster file given, generated roster was not saved");
            }
        }
        Command::Stats { dorm } => {
            let scope = session.scope(dorm)?;
            print!("{}", render::stats(&session.stats(scope)));
        }
        Command::Rooms { dorm, room } => {
            let dormitory = session.dormitory(dorm)?;
            match room {
                None => print!("{}", render::room_grid(dormitory)),
                Some(number) => {
                    let room = dormitory
                        .room(number)
                        .ok_or(DashboardError::UnknownRoom { dorm_id: dorm, room: number })?;
                    print!("{}", render::room_detail(dormitory, room));
                }
            }
        }
        Command::Search { query } => {
            let hits = session.search(&query);
            print!("{}", render::search_results(&query, &hits));
        }
        Command::Add {
            dorm,
            room,
            name,
            course,
            group,
            faculty,
            direction,
            custom_direction,
            image,
        } => {
            let image_url = match image {
                Some(path) => {
                    let bytes = tokio::fs::read(&path).await?;
                    Some(compress_avatar(&bytes)?)
                }
                None => None,
            };

            let form = NewStudent {
                full_name: name,
                course,
                group,
                faculty,
                direction,
                custom_direction,
                image_url,
            };
            let student = session.add_student(dorm, room, form)?;
            println!(
                "✅ {} {}-xonaga joylashtirildi (ID: {})",
                student.full_name, room, student.id
            );
            save_edits(&session).await?;
        }
        Command::Remove {
            dorm,
            room,
            student_id,
        } => match session.remove_student(dorm, room, &student_id)? {
            Some(student) => {
                println!("✅ {} xonadan chiqarildi", student.full_name);
                save_edits(&session).await?;
            }
            None => println!("Bu xonada {} ID li talaba yo'q", student_id),
        },
        Command::Export { dorm, format } => {
            let scope = session.scope(dorm)?;
            let path = session
                .export(scope, format, Local::now().date_naive())
                .await?;
            println!("📁 {}", path.display());
        }
        Command::Ask { question } => {
            let assistant = session.assistant()?;
            let stats = session.stats(Scope::All);
            let mut conversation = assistant.conversation();
            if let Some(reply) = conversation
                .send(&assistant, &question, &stats, session.dormitory_count())
                .await
            {
                println!("{}", reply.text);
            }
        }
        Command::Chat => chat(&session).await?,
        Command::Analyze { dorm } => {
            let scope = session.scope(dorm)?;
            let assistant = session.assistant()?;
            let report = assistant.report(&session.stats(scope)).await;
            if report.is_error {
                eprintln!("{}", report.text);
            } else {
                println!("{}", report.text);
            }
        }
    }

    Ok(())
}

async fn save_edits(session: &Session) -> Result<()> {
    if !session.persist().await? {
        tracing::warn!("No --roster file given, the change lasts only for this run");
    }
    Ok(())
}

async fn chat(session: &Session) -> Result<()> {
    let assistant = session.assistant()?;
    let mut conversation = assistant.conversation();
    if let Some(greeting) = conversation.messages().first() {
        println!("🤖 {}", greeting.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question == "exit" || question == "chiqish" {
            break;
        }

        let stats = session.stats(Scope::All);
        if let Some(reply) = conversation
            .send(&assistant, question, &stats, session.dormitory_count())
            .await
        {
            println!("🤖 {}\n", reply.text);
        }
    }

    tracing::debug!("Chat ended after {} messages", conversation.messages().len());
    Ok(())
}
