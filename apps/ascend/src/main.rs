use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use ascend::{AppConfig, AppShell, Page};
use clap::{Parser, Subcommand};
use entity::{Priority, Role};
use platform_api::ApiClient;
use platform_authn::{FileStore, SessionStore};
use platform_authz::{RoleSet, require};
use platform_obs::ObsConfig;
use products_hr::{
    ActionError, ActionResult, Notifier, ViewContext,
    forms::FieldError,
    views::{
        assign_task::TaskDraft,
        chatbot::Chatbot,
        employee_list::RoleFilter,
        report,
    },
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "ascend", version, about = "Role-based performance evaluation client")]
struct Cli {
    /// Backend base URL (overrides ASCEND_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Directory holding the persisted session (overrides ASCEND_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
    /// Debug logging for the client crates
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and open your dashboard
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Open a page by path, e.g. `/dashboard`
    Open { path: String },
    /// Generate the performance report for an employee (HR, Manager)
    Report { name: String },
    /// Run a prediction for a staged employee (HR)
    Predict { name: String },
    /// Upload a CSV of employee data (HR)
    Upload {
        file: PathBuf,
        /// Predict for this staged employee once the upload is processed
        #[arg(long)]
        employee: Option<String>,
        /// Predict for the first staged employee
        #[arg(long)]
        predict: bool,
    },
    /// List personnel (HR)
    Employees {
        #[arg(long, value_parser = parse_filter, default_value = "all")]
        filter: RoleFilter,
        #[arg(long)]
        query: Option<String>,
    },
    /// Create, edit or delete employee records (HR)
    Record {
        #[command(subcommand)]
        action: RecordCommand,
    },
    /// Review a direct report (Manager)
    TeamEntry {
        employee: String,
        /// field=value, repeatable
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Assign and track tasks
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Submit your self-assessment (Employee)
    Assess {
        #[arg(long)]
        accomplishments: Option<String>,
        #[arg(long)]
        challenges: Option<String>,
        #[arg(long)]
        collaboration: Option<String>,
        #[arg(long)]
        skills_developed: Option<String>,
        #[arg(long)]
        voluntary_contributions: Option<String>,
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Ask the evaluation assistant (Employee)
    Chat {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Team evaluation progress (Manager)
    Team,
}

#[derive(Subcommand, Debug)]
enum RecordCommand {
    /// Load a record into the form
    Show { employee: String },
    /// Create a record
    New {
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Update a record
    Save {
        employee: String,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Permanently delete a record
    Delete {
        employee: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Assign a task to one team member, or the whole team (Manager)
    Assign {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long, value_parser = parse_priority, default_value = "Medium")]
        priority: Priority,
        /// Employee ID or name; the whole team when omitted
        #[arg(long)]
        to: Option<String>,
    },
    /// Tasks already assigned to a team member (Manager)
    History { employee: String },
    /// Mark one of your tasks completed (Employee)
    Done { task_id: String },
    /// Mark one of your tasks pending again (Employee)
    Reopen { task_id: String },
    /// Flip one of your tasks between pending and completed (Employee)
    Toggle { task_id: String },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))
}

fn parse_priority(raw: &str) -> Result<Priority, String> {
    Priority::parse(raw).ok_or_else(|| format!("unknown priority '{raw}' (Low, Medium, High)"))
}

fn parse_filter(raw: &str) -> Result<RoleFilter, String> {
    RoleFilter::parse(raw).ok_or_else(|| format!("unknown filter '{raw}' (all, employees, team-leaders)"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut obs = ObsConfig::from_env();
    if cli.verbose {
        obs = obs.verbose();
    }
    platform_obs::init_tracing(obs)?;

    let result = run(cli).await;
    platform_obs::shutdown();
    result
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::load()?.with_overrides(cli.api_url, cli.state_dir);
    debug!(api = %config.api_url, state = %config.state_dir.display(), "configuration loaded");

    let api = ApiClient::new(&config.api_url)
        .with_context(|| format!("invalid backend URL {}", config.api_url))?;
    let store = FileStore::open(&config.state_dir).with_context(|| {
        format!("cannot open state directory {}", config.state_dir.display())
    })?;
    let ctx = ViewContext::new(api, SessionStore::new(Arc::new(store)), Notifier::new());
    let shell = AppShell::start(ctx)
        .await
        .context("cannot restore the stored session")?;

    let mut runner = Runner {
        shell,
        failed: false,
        render: true,
    };
    runner.execute(cli.command).await?;
    runner.finish();
    Ok(if runner.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

struct Runner {
    shell: AppShell,
    failed: bool,
    render: bool,
}

impl Runner {
    fn ctx(&self) -> ViewContext {
        self.shell.context().clone()
    }

    fn role(&self) -> Option<Role> {
        self.shell.context().session.role()
    }

    /// Action failures were already surfaced through the notifier.
    fn settle<T>(&mut self, result: ActionResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(ActionError::ConfirmationRequired(prompt)) => {
                println!("{prompt}");
                println!("Re-run with --yes to confirm.");
                self.failed = true;
                None
            }
            Err(err) => {
                debug!(error = %err, "action failed");
                self.failed = true;
                None
            }
        }
    }

    fn field_errors(&mut self, errors: Vec<FieldError>) -> bool {
        let ctx = self.ctx();
        for err in &errors {
            ctx.notifier.error(err.to_string());
        }
        if !errors.is_empty() {
            self.failed = true;
        }
        errors.is_empty()
    }

    /// False when the guard sent us elsewhere; the shell then shows why.
    async fn open(&mut self, path: &str) -> bool {
        let route = self.shell.navigate(path).await;
        let opened = route.path() == path && !matches!(self.shell.page(), Page::Denied { .. });
        if !opened {
            self.failed = true;
        }
        opened
    }

    fn refuse(&mut self, message: String) -> ActionError {
        self.shell.context().notifier.error(message.clone());
        ActionError::Refused(message)
    }

    async fn execute(&mut self, command: Commands) -> Result<()> {
        let ctx = self.ctx();
        match command {
            Commands::Login { email, password } => {
                let result = self.shell.login(&email, &password).await;
                self.settle(result);
            }
            Commands::Logout => {
                self.shell
                    .logout()
                    .await
                    .context("signed out, but the stored session could not be cleared")?;
                println!("Signed out.");
                self.render = false;
            }
            Commands::Whoami => {
                match ctx.session.user() {
                    Some(user) => println!(
                        "{} <{}> ({}, {})",
                        user.name,
                        user.email.as_deref().unwrap_or("no email"),
                        user.role,
                        user.employee_id
                    ),
                    None => println!("Not signed in."),
                }
                self.render = false;
            }
            Commands::Open { path } => {
                self.shell.navigate(&path).await;
            }
            Commands::Report { name } => {
                let role = require(RoleSet::HR_OR_MANAGER, self.role(), "report")?;
                let result = match role {
                    Role::Manager => {
                        if !self.open("/manager-dashboard").await {
                            return Ok(());
                        }
                        match self.shell.page_mut() {
                            Page::ManagerDashboard(view) => view.generate_report(&ctx, &name).await,
                            _ => return Ok(()),
                        }
                    }
                    _ => {
                        if !self.open("/dashboard").await {
                            return Ok(());
                        }
                        match self.shell.page_mut() {
                            Page::HrDashboard(view) => {
                                let status = view.status_of(&name);
                                view.generate_report(&ctx, &name, status).await
                            }
                            _ => return Ok(()),
                        }
                    }
                };
                if let Some(result) = self.settle(result) {
                    self.shell.open_report(result).await;
                }
            }
            Commands::Predict { name } => {
                require(RoleSet::HR, self.role(), "predict")?;
                let result = report::predict(&ctx, &name, "Prediction request failed.").await;
                if let Some(result) = self.settle(result) {
                    self.shell.open_report(result).await;
                }
            }
            Commands::Upload { file, employee, predict } => {
                if !self.open("/upload").await {
                    return Ok(());
                }
                let contents = std::fs::read(&file)
                    .with_context(|| format!("cannot read {}", file.display()))?;
                let file_name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let Page::Upload(view) = self.shell.page_mut() else {
                    return Ok(());
                };
                let uploaded = match view.choose_file(&ctx, &file_name, contents) {
                    Ok(()) => view.upload(&ctx).await,
                    Err(err) => Err(err),
                };
                let mut outcome = uploaded.map(|()| None);
                if outcome.is_ok() && (predict || employee.is_some()) {
                    if let Some(name) = &employee {
                        if !view.select(name) {
                            let message = format!("'{name}' was not in the upload.");
                            ctx.notifier.error(message.clone());
                            outcome = Err(ActionError::Refused(message));
                        }
                    }
                    if outcome.is_ok() {
                        outcome = view.predict(&ctx).await.map(Some);
                    }
                }
                if let Some(Some(result)) = self.settle(outcome) {
                    self.shell.open_report(result).await;
                }
            }
            Commands::Employees { filter, query } => {
                if !self.open("/employees").await {
                    return Ok(());
                }
                if let Page::Employees(view) = self.shell.page_mut() {
                    view.set_filter(filter);
                    view.set_query(query.unwrap_or_default());
                }
            }
            Commands::Record { action } => self.record(&ctx, action).await?,
            Commands::TeamEntry { employee, set } => {
                if !self.open("/manual-complete").await {
                    return Ok(());
                }
                let Page::TeamEntry(view) = self.shell.page_mut() else {
                    return Ok(());
                };
                let selected = view.select(&ctx, &employee).await;
                let mut errors = Vec::new();
                if matches!(selected, Ok(true)) {
                    for (field, value) in &set {
                        if let Err(err) = view.set_field(field, value) {
                            errors.push(err);
                        }
                    }
                }
                let submit = errors.is_empty() && !set.is_empty() && matches!(selected, Ok(true));
                let submitted = if submit { Some(view.submit(&ctx).await) } else { None };
                self.settle(selected);
                if self.field_errors(errors) {
                    if let Some(result) = submitted {
                        self.settle(result);
                    }
                }
            }
            Commands::Task { action } => self.task(&ctx, action).await?,
            Commands::Assess {
                accomplishments,
                challenges,
                collaboration,
                skills_developed,
                voluntary_contributions,
                feedback,
            } => {
                if !self.open("/employee-dashboard").await {
                    return Ok(());
                }
                let Page::EmployeeDashboard(view) = self.shell.page_mut() else {
                    return Ok(());
                };
                let Some(overview) = view.state().data() else {
                    self.failed = true;
                    return Ok(());
                };
                let mut assessment = overview.assessment.clone();
                let updates = [
                    (&mut assessment.accomplishments, accomplishments),
                    (&mut assessment.challenges, challenges),
                    (&mut assessment.collaboration, collaboration),
                    (&mut assessment.skills_developed, skills_developed),
                    (&mut assessment.voluntary_contributions, voluntary_contributions),
                    (&mut assessment.feedback, feedback),
                ];
                for (slot, value) in updates {
                    if let Some(value) = value {
                        *slot = value;
                    }
                }
                let result = view.submit_self_assessment(&ctx, &assessment).await;
                self.settle(result);
            }
            Commands::Chat { message } => {
                require(RoleSet::EMPLOYEE, self.role(), "chat")?;
                let mut bot = Chatbot::new();
                bot.send(&ctx, &message.join(" ")).await;
                print!("{bot}");
                self.render = false;
            }
            Commands::Team => {
                self.open("/insightstl").await;
            }
        }
        Ok(())
    }

    async fn record(&mut self, ctx: &ViewContext, action: RecordCommand) -> Result<()> {
        if !self.open("/manual-entry").await {
            return Ok(());
        }
        let Page::ManualEntry(view) = self.shell.page_mut() else {
            return Ok(());
        };
        let (employee, set) = match &action {
            RecordCommand::Show { employee } | RecordCommand::Delete { employee, .. } => {
                (Some(employee.clone()), Vec::new())
            }
            RecordCommand::Save { employee, set } => (Some(employee.clone()), set.clone()),
            RecordCommand::New { set } => (None, set.clone()),
        };
        if let Some(employee) = employee {
            let loaded = if view.select(&employee) {
                view.load_selected(ctx).await
            } else {
                Err(self.refuse(format!("No employee matches '{employee}'.")))
            };
            if self.settle(loaded).is_none() {
                return Ok(());
            }
        }
        let Page::ManualEntry(view) = self.shell.page_mut() else {
            return Ok(());
        };
        // Role first: changing it resets the ID prefix and visible fields.
        let mut ordered = set;
        ordered.sort_by_key(|(field, _)| field != "role");
        let errors: Vec<FieldError> = ordered
            .iter()
            .filter_map(|(field, value)| view.set_field(field, value).err())
            .collect();
        let result = match action {
            RecordCommand::Show { .. } => return Ok(()),
            RecordCommand::Delete { yes, .. } => view.delete(ctx, yes).await.map(|_| ()),
            RecordCommand::New { .. } | RecordCommand::Save { .. } if errors.is_empty() => {
                view.submit(ctx).await.map(|_| ())
            }
            RecordCommand::New { .. } | RecordCommand::Save { .. } => {
                self.field_errors(errors);
                return Ok(());
            }
        };
        self.settle(result);
        Ok(())
    }

    async fn task(&mut self, ctx: &ViewContext, action: TaskCommand) -> Result<()> {
        match action {
            TaskCommand::Assign {
                title,
                description,
                due,
                priority,
                to,
            } => {
                if !self.open("/assigntask").await {
                    return Ok(());
                }
                let Page::AssignTask(view) = self.shell.page_mut() else {
                    return Ok(());
                };
                if let Some(to) = to {
                    let targeted = view.set_target(ctx, &to).await;
                    if self.settle(targeted).is_none() {
                        return Ok(());
                    }
                }
                let Page::AssignTask(view) = self.shell.page_mut() else {
                    return Ok(());
                };
                view.draft = TaskDraft {
                    title,
                    description,
                    due_date: due,
                    priority,
                };
                let submitted = view.submit(ctx).await;
                if let Some(next) = self.settle(submitted) {
                    self.shell.navigate(next).await;
                }
            }
            TaskCommand::History { employee } => {
                if !self.open("/assigntask").await {
                    return Ok(());
                }
                if let Page::AssignTask(view) = self.shell.page_mut() {
                    let targeted = view.set_target(ctx, &employee).await;
                    self.settle(targeted);
                }
            }
            TaskCommand::Done { task_id } => self.set_task(ctx, &task_id, true).await?,
            TaskCommand::Reopen { task_id } => self.set_task(ctx, &task_id, false).await?,
            TaskCommand::Toggle { task_id } => {
                if !self.open("/employee-dashboard").await {
                    return Ok(());
                }
                if let Page::EmployeeDashboard(view) = self.shell.page_mut() {
                    let toggled = view.toggle_task(ctx, &task_id).await;
                    self.settle(toggled);
                }
            }
        }
        Ok(())
    }

    async fn set_task(&mut self, ctx: &ViewContext, task_id: &str, done: bool) -> Result<()> {
        if !self.open("/employee-dashboard").await {
            return Ok(());
        }
        if let Page::EmployeeDashboard(view) = self.shell.page_mut() {
            let result = view.set_task_done(ctx, task_id, done).await;
            self.settle(result);
        }
        Ok(())
    }

    fn finish(&mut self) {
        if self.render {
            print!("{}", self.shell);
        }
        let notifications = self.shell.context().notifier.drain();
        if !notifications.is_empty() {
            println!();
        }
        for notification in notifications {
            println!("{notification}");
        }
    }
}
