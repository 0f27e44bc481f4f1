use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use examtrack::alerts::ConsoleAlerts;
use examtrack::documents::csv_templates::{self, TemplateKind};
use examtrack::documents::{DocumentContext, pv, schedule};
use examtrack::models::{Creneau, ExamRow, Formation, Teacher, TeachingAssignment};
use examtrack::routes::{self, Resolution, Route};
use examtrack::services::{ListPage, LoadState, check_all, dispatch};
use examtrack::table::{self, Confirm, FixedAnswer, PageItem, StdinConfirm, TableRow};
use examtrack::{AppContext, AppError, ClientConfig};

#[derive(Parser)]
#[command(name = "examtrack", version, about = "Exam scheduling administration client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session tokens
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    Teachers {
        #[command(subcommand)]
        action: ResourceAction,
    },
    Courses {
        #[command(subcommand)]
        action: ResourceAction,
    },
    Teaching {
        #[command(subcommand)]
        action: ResourceAction,
    },
    Creneaux {
        #[command(subcommand)]
        action: ResourceAction,
    },
    Plannings {
        #[command(subcommand)]
        action: PlanningAction,
    },
    /// Email dispatch
    Send {
        #[command(subcommand)]
        action: SendAction,
    },
    /// PDF generation
    Pdf {
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[command(subcommand)]
        action: PdfAction,
    },
    /// Write a CSV import template
    Template {
        kind: TemplateKind,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Bulk import a spreadsheet (.xlsx, .xls or .csv)
    Upload { model: String, file: PathBuf },
    /// Show where a path leads with the current session
    Route { path: String },
}

#[derive(Subcommand)]
enum ResourceAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    Delete {
        key: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PlanningAction {
    List,
    /// Run the date, schedule and workload checks
    Check {
        #[arg(long)]
        target: Option<u32>,
    },
    Delete {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SendAction {
    BulkPv,
    BulkConvocations,
    Pv { id: i64 },
    Convocation { teacher_code: String },
}

#[derive(Subcommand)]
enum PdfAction {
    Schedule,
    Level { level: String },
    Levels,
    Monitoring,
    Pv { id: i64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "examtrack=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Command::Template { kind, out } = &cli.command {
        let path = csv_templates::write_template(*kind, out)?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = ClientConfig::new_from_env()?;
    let ctx = AppContext::init(config).await?;
    info!("examtrack ready");

    run(&ctx, cli.command).await?;
    Ok(())
}

fn route_of(command: &Command) -> Route {
    match command {
        Command::Login { .. } | Command::Route { .. } => Route::Login,
        Command::Logout => Route::Profile,
        Command::Teachers { .. } => Route::Teachers,
        Command::Courses { .. } => Route::Courses,
        Command::Teaching { .. } => Route::Teaching,
        Command::Upload { .. } | Command::Template { .. } => Route::Settings,
        Command::Creneaux { .. }
        | Command::Plannings { .. }
        | Command::Send { .. }
        | Command::Pdf { .. } => Route::Exams,
    }
}

async fn run(ctx: &AppContext, command: Command) -> Result<(), AppError> {
    if let Resolution::Redirect(Route::Login) =
        routes::resolve(route_of(&command).path(), ctx.is_authenticated())
    {
        return Err(AppError::validation(
            "Not logged in. Run `examtrack login` first.",
        ));
    }

    match command {
        Command::Login { username, password } => {
            ctx.login(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Command::Logout => {
            ctx.logout().await?;
            println!("Logged out");
        }
        Command::Route { path } => {
            let resolution = routes::resolve(&path, ctx.is_authenticated());
            match resolution {
                Resolution::Render(route) => println!("{}", route.path()),
                Resolution::Redirect(route) => println!("{} -> {}", path, route.path()),
            }
        }
        Command::Teachers { action } => run_resource::<Teacher>(ctx, action).await?,
        Command::Courses { action } => run_resource::<Formation>(ctx, action).await?,
        Command::Teaching { action } => run_resource::<TeachingAssignment>(ctx, action).await?,
        Command::Creneaux { action } => run_resource::<Creneau>(ctx, action).await?,
        Command::Plannings { action } => run_plannings(ctx, action).await?,
        Command::Send { action } => run_send(ctx, action).await?,
        Command::Pdf { out, action } => run_pdf(ctx, &out, action).await?,
        Command::Upload { model, file } => {
            let result = ctx.models.upload(&model, &file).await?;
            println!("{}", upload_summary(&result));
        }
        Command::Template { .. } => {}
    }
    Ok(())
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(FixedAnswer(true))
    } else {
        Box::new(StdinConfirm)
    }
}

/// Record carrying only its primary key, parsed as a number when possible.
fn record_with_key<R: TableRow>(key: &str) -> Result<R, AppError> {
    let value = key
        .trim()
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(key.trim()));
    let mut fields = serde_json::Map::new();
    fields.insert(R::KEY_FIELD.to_string(), value);
    Ok(serde_json::from_value(Value::Object(fields))?)
}

async fn run_resource<R: TableRow>(ctx: &AppContext, action: ResourceAction) -> Result<(), AppError> {
    let mut page: ListPage<R> =
        ListPage::new(ctx.models.clone(), ctx.config.page_size, ctx.config.debounce);
    page.mount().await;

    match action {
        ResourceAction::List { page: number, search } => {
            if let Some(term) = search {
                page.set_search(&term);
                page.settle_search().await;
            }
            if number > 1 {
                page.set_page(number).await;
            }
            print_page(&page)?;
        }
        ResourceAction::Delete { key, yes } => {
            let record = record_with_key::<R>(&key)?;
            if page.delete(&record, confirmer(yes).as_ref()).await? {
                println!("Deleted {} {}", R::MODEL, key);
                print_page(&page)?;
            } else {
                println!("Cancelled");
            }
        }
    }
    Ok(())
}

fn print_page<R: TableRow>(page: &ListPage<R>) -> Result<(), AppError> {
    if let LoadState::Error(message) = page.state() {
        return Err(AppError::validation(message.clone()));
    }
    println!("{}", page.table().to_text());
    let strip: Vec<String> = page
        .pagination()
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == page.page() => format!("[{}]", n),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "...".to_string(),
        })
        .collect();
    println!("{}  ({} rows)", strip.join(" "), page.total());
    Ok(())
}

async fn exam_rows(ctx: &AppContext) -> Result<Vec<ExamRow>, AppError> {
    let plannings = ctx.exams.plannings_with_details().await?;
    Ok(plannings.iter().map(ExamRow::from_planning).collect())
}

async fn run_plannings(ctx: &AppContext, action: PlanningAction) -> Result<(), AppError> {
    match action {
        PlanningAction::List => {
            let rows = exam_rows(ctx).await?;
            let rendered = table::RenderedTable {
                headers: std::iter::once("Id")
                    .chain(schedule::SCHEDULE_HEADERS)
                    .map(str::to_string)
                    .collect(),
                rows: rows
                    .iter()
                    .map(|r| {
                        vec![
                            r.planning_id.to_string(),
                            r.level.clone(),
                            r.specialty.clone(),
                            r.semester.clone(),
                            r.section.clone(),
                            r.date.clone(),
                            r.time.clone(),
                            r.exam_room.clone(),
                            r.module_name.clone(),
                            r.module_abbreviation.clone(),
                            r.nbr_se.clone(),
                        ]
                    })
                    .collect(),
            };
            println!("{}", rendered.to_text());
        }
        PlanningAction::Check { target } => {
            let report = check_all(ctx.exams.as_ref(), target).await;
            print_conflicts("Exam dates", &report.exam_dates);
            print_conflicts("Teacher schedules", &report.teacher_schedules);
            match &report.workload {
                Ok(workload) => println!(
                    "Workload: {} teachers, {} surveillances, {:.2} per teacher",
                    workload.teacher_distribution.total_teachers,
                    workload.teacher_distribution.total_surveillances,
                    workload.teacher_distribution.average_per_teacher
                ),
                Err(e) => println!("Workload: failed ({})", e),
            }
        }
        PlanningAction::Delete { id, yes } => {
            if !confirmer(yes).confirm("Are you sure you want to delete this exam planning?") {
                println!("Cancelled");
                return Ok(());
            }
            ctx.exams.delete_planning(id).await?;
            println!("Deleted planning {}", id);
        }
    }
    Ok(())
}

fn print_conflicts(name: &str, outcome: &Result<examtrack::models::ConflictReport, AppError>) {
    match outcome {
        Ok(report) if report.is_clear() => println!(
            "{}: {}",
            name,
            report.message.as_deref().unwrap_or("no conflicts")
        ),
        Ok(report) => {
            println!("{}: {} conflicts", name, report.conflicts.len());
            for conflict in &report.conflicts {
                println!("  {}", conflict);
            }
        }
        Err(e) => println!("{}: failed ({})", name, e),
    }
}

async fn find_planning(
    ctx: &AppContext,
    id: i64,
) -> Result<examtrack::models::PlanningWithDetails, AppError> {
    ctx.exams
        .plannings_with_details()
        .await?
        .into_iter()
        .find(|p| p.id_planning == id)
        .ok_or_else(|| AppError::validation(format!("Planning {} not found", id)))
}

async fn run_send(ctx: &AppContext, action: SendAction) -> Result<(), AppError> {
    let result = match action {
        SendAction::BulkPv => ctx.exams.send_bulk_pv().await?,
        SendAction::BulkConvocations => {
            let plannings = ctx.exams.plannings_with_details().await?;
            dispatch::send_all_convocations(ctx.exams.as_ref(), plannings).await?
        }
        SendAction::Pv { id } => {
            let planning = find_planning(ctx, id).await?;
            dispatch::send_pv_for(ctx.exams.as_ref(), &planning).await?
        }
        SendAction::Convocation { teacher_code } => {
            let plannings = ctx.exams.plannings_with_details().await?;
            dispatch::send_convocation_for(ctx.exams.as_ref(), plannings, &teacher_code).await?
        }
    };
    println!("{}", result.summary());
    Ok(())
}

async fn run_pdf(ctx: &AppContext, out: &std::path::Path, action: PdfAction) -> Result<(), AppError> {
    let doc_ctx = DocumentContext::from_config(&ctx.config);
    let alerts = ConsoleAlerts;

    match action {
        PdfAction::Schedule => {
            let rows = exam_rows(ctx).await?;
            let path = schedule::generate_schedule(&rows, &doc_ctx, out)?;
            println!("{}", path.display());
        }
        PdfAction::Level { level } => {
            let rows = exam_rows(ctx).await?;
            if let Some(path) = schedule::generate_level_schedule(&rows, &level, &doc_ctx, out, &alerts)? {
                println!("{}", path.display());
            }
        }
        PdfAction::Levels => {
            for level in schedule::unique_levels(&exam_rows(ctx).await?) {
                println!("{}", level);
            }
        }
        PdfAction::Monitoring => {
            let written = schedule::generate_monitoring(ctx.exams.as_ref(), &doc_ctx, out, &alerts).await?;
            let path = out.join(schedule::MONITORING_FILE_NAME);
            if written {
                println!("{}", path.display());
            } else {
                println!("{} (fallback)", path.display());
            }
        }
        PdfAction::Pv { id } => {
            let planning = find_planning(ctx, id).await?;
            let roster = ctx.exams.surveillants_by_planning(id).await?;
            let data = dispatch::build_pv(&planning, &roster, doc_ctx.generated_on);
            let path = pv::generate_pv(&data, &doc_ctx, out)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn upload_summary(result: &Value) -> String {
    result
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| result.to_string())
}
