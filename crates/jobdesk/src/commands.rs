//! Command dispatch: one function per subcommand.

use std::io::Write;

use chrono::{Local, NaiveDate, Utc};

use jobsheet::filter::FilterForm;
use jobsheet::job::JobDraft;
use jobsheet::notice::Notice;
use jobsheet::picker::PickerCategory;
use jobsheet::print::render_print_sheet;
use jobsheet::range::{DateRangeKeyword, format_date, resolve};
use jobsheet::session::AppContext;
use jobsheet::table::actions_for;
use jobsheet::users::{NewUser, PASSWORD_UPDATED, PasswordChange, PasswordKind, UserAction};

use crate::api::{HttpClient, JobsApi};
use crate::cli::{
    Cli, Command, DateFilterArgs, InsightsArgs, JobFields, JobsCommand, ListArgs, PasswordArgs,
    PickersCommand, UsersCommand,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::screens::{InsightsScreen, JobListScreen, load_job_sheet_setup};
use crate::session::SessionStore;

const LABEL_WIDTH: usize = 18;

/// Runs the parsed command line.
pub fn run<W: Write>(cli: &Cli, config: &Config, out: &mut Output<W>) -> Result<()> {
    let result = match &cli.command {
        Command::Range(args) => show_ranges(args.range, config.today(), out),
        command => {
            let api = HttpClient::new(&config.base_url, config.timeout)?;
            let store = config.session_store()?;
            let mut runner = Runner {
                api: &api,
                store: &store,
                today: config.today(),
                config,
                out: &mut *out,
            };
            runner.dispatch(command)
        }
    };
    out.flush()?;
    result
}

fn show_ranges<W: Write>(
    keyword: Option<DateRangeKeyword>,
    today: NaiveDate,
    out: &mut Output<W>,
) -> Result<()> {
    match keyword {
        Some(keyword) => out.line(resolve(keyword, today).to_string())?,
        None => {
            for keyword in DateRangeKeyword::ALL {
                out.field(keyword.label(), &resolve(keyword, today).to_string(), 20)?;
            }
        }
    }
    Ok(())
}

struct Runner<'a, A: ?Sized, W: Write> {
    api: &'a A,
    store: &'a SessionStore,
    today: NaiveDate,
    config: &'a Config,
    out: &'a mut Output<W>,
}

impl<A: JobsApi + Sync + ?Sized, W: Write> Runner<'_, A, W> {
    fn dispatch(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Login(args) => self.login(&args.username, &args.password),
            Command::Logout => self.logout(),
            Command::Range(args) => show_ranges(args.range, self.today, &mut *self.out),
            Command::Jobs(jobs) => self.jobs(jobs),
            Command::Pickers(pickers) => self.pickers(pickers),
            Command::Users(users) => self.users(users),
            Command::Password(args) => self.password(args),
            Command::Insights(args) => self.insights(args),
        }
    }

    fn context(&self) -> Result<AppContext> {
        Ok(self.store.load(Utc::now())?)
    }

    fn notice(&mut self, notice: &Notice) -> Result<()> {
        self.out.notice(notice)?;
        Ok(())
    }

    fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let session = self.api.login(username, password)?;
        let expires_at = self.store.save(&session, Utc::now())?;
        let ctx = AppContext::from_login(session);
        self.notice(&Notice::Success(format!(
            "Signed in as {} ({})",
            ctx.display_name(),
            ctx.role()
        )))?;
        self.out.line(format!(
            "Session valid until {}",
            expires_at.with_timezone(&Local).format("%d/%m/%Y %H:%M")
        ))?;
        Ok(())
    }

    /// Tells the backend when a session exists, then always forgets it locally.
    fn logout(&mut self) -> Result<()> {
        match self.store.load(Utc::now()) {
            Ok(ctx) => {
                if let Err(e) = self.api.logout(ctx) {
                    tracing::warn!(error = %e, "backend logout failed");
                }
            }
            Err(e) => tracing::debug!(reason = %e, "no live session to close"),
        }
        self.store.clear()?;
        self.notice(&Notice::Success("Signed out".to_string()))
    }

    fn jobs(&mut self, command: &JobsCommand) -> Result<()> {
        let ctx = self.context()?;
        match command {
            JobsCommand::List(args) => self.list_jobs(&ctx, args),
            JobsCommand::Show { job_id } => self.show_job(&ctx, job_id),
            JobsCommand::Print { job_id } => {
                let job = self.api.get_job(&ctx, job_id.trim())?;
                self.out.block(&render_print_sheet(&job))?;
                Ok(())
            }
            JobsCommand::NextId => {
                let setup = load_job_sheet_setup(self.api, &ctx, self.today)?;
                self.out.line(&setup.job_id)?;
                Ok(())
            }
            JobsCommand::Create(fields) => {
                let setup = load_job_sheet_setup(self.api, &ctx, self.today)?;
                let mut draft = setup.blank_draft(self.today);
                apply_fields(&mut draft, fields);
                draft.name = ctx.display_name().to_string();
                draft.validate()?;
                let response = self.api.create_job(&ctx, &draft)?;
                self.notice(&Notice::from_response(
                    &response,
                    &format!("Job sheet {} created", draft.job_id),
                ))
            }
            JobsCommand::Edit { job_id, fields } => {
                let record = self.api.get_job(&ctx, job_id.trim())?;
                let mut draft = JobDraft::from_record(&record);
                apply_fields(&mut draft, fields);
                draft.name = ctx.display_name().to_string();
                draft.validate()?;
                let response = self.api.update_job(&ctx, &draft)?;
                self.notice(&Notice::from_response(
                    &response,
                    &format!("Job sheet {} updated", draft.job_id),
                ))
            }
            JobsCommand::Delete { job_id, yes } => {
                ctx.require_admin()?;
                confirm(*yes, &format!("delete job {job_id}"))?;
                let response = self.api.delete_job(&ctx, job_id.trim())?;
                self.notice(&Notice::from_response(
                    &response,
                    &format!("Job sheet {job_id} deleted"),
                ))
            }
        }
    }

    fn list_jobs(&mut self, ctx: &AppContext, args: &ListArgs) -> Result<()> {
        let mut screen = JobListScreen::new(self.today, self.config.page_size);
        apply_job_dates(screen.form_mut(), &args.dates, self.today);
        screen.form_mut().set_status(args.status.clone());
        if screen.form().dates().is_stale(self.today) {
            tracing::debug!(summary = %screen.form().summary(), "dates no longer match the range label");
        }

        screen.refresh(self.api, ctx)?;
        let table = screen.table_mut();
        if let Some(search) = &args.search {
            table.set_query(search.clone());
        }
        table.goto_page(args.page)?;

        self.out.heading(&screen.form().summary())?;
        self.out.block(&screen.table().render())?;
        self.out.line(screen.table().footer())?;
        let actions: Vec<&str> = actions_for(ctx.role()).iter().map(|a| a.label()).collect();
        self.out.line(format!("Actions: {}", actions.join(", ")))?;
        Ok(())
    }

    fn show_job(&mut self, ctx: &AppContext, job_id: &str) -> Result<()> {
        let job = self.api.get_job(ctx, job_id.trim())?;
        let profit = job.profit().to_string();
        let amount = job.amount_display();
        let purchase = job
            .purchase_amount
            .map(jobsheet::job::format_amount)
            .unwrap_or_default();
        let rows: &[(&str, &str)] = &[
            ("Job ID", &job.job_id),
            ("Customer", &job.name),
            ("Mobile", &job.mobile),
            ("Email", &job.email),
            ("Address", &job.address),
            ("Engineer", &job.engineer),
            ("MOC", &job.moc),
            ("In date", &job.in_date),
            ("Out date", &job.out_date),
            ("Assets", &job.assets),
            ("Product make", &job.product_make),
            ("Serial no", &job.serial_no),
            ("Description", &job.description),
            ("Fault type", &job.fault_type),
            ("Fault", &job.fault_desc),
            ("Status", &job.job_status),
            ("Solution", &job.solution_provided),
            ("Amount", &amount),
            ("Purchase amount", &purchase),
            ("Purchased", &job.purchased),
            ("Profit", &profit),
            ("Created", &job.created),
            ("Last modified", &job.last_modified),
        ];
        for &(label, value) in rows {
            self.out.field(label, value, LABEL_WIDTH)?;
        }
        Ok(())
    }

    fn pickers(&mut self, command: &PickersCommand) -> Result<()> {
        let ctx = self.context()?;
        match command {
            PickersCommand::List => {
                let pickers = self.api.list_pickers(&ctx)?;
                for category in PickerCategory::ALL {
                    self.out.heading(category.as_str())?;
                    for value in pickers.values(category) {
                        self.out.line(format!("  {value}"))?;
                    }
                }
                Ok(())
            }
            PickersCommand::Category { category } => {
                for value in self.api.pickers_by_category(&ctx, *category)? {
                    self.out.line(value)?;
                }
                Ok(())
            }
            PickersCommand::Add { category, name } => {
                ctx.require_admin()?;
                let response = self.api.insert_picker(&ctx, *category, name.trim())?;
                self.notice(&Notice::from_response(&response, &format!("Added {name} to {category}")))
            }
            PickersCommand::Rename {
                category,
                old_name,
                new_name,
            } => {
                ctx.require_admin()?;
                let response =
                    self.api
                        .update_picker(&ctx, *category, old_name.trim(), new_name.trim())?;
                self.notice(&Notice::from_response(
                    &response,
                    &format!("Renamed {old_name} to {new_name}"),
                ))
            }
            PickersCommand::Remove { category, name } => {
                ctx.require_admin()?;
                let response = self.api.delete_picker(&ctx, *category, name.trim())?;
                self.notice(&Notice::from_response(
                    &response,
                    &format!("Removed {name} from {category}"),
                ))
            }
        }
    }

    fn users(&mut self, command: &UsersCommand) -> Result<()> {
        let ctx = self.context()?;
        ctx.require_admin()?;
        match command {
            UsersCommand::List => {
                let users = self.api.list_users(&ctx)?;
                self.out
                    .heading(&format!("{:<16} {:<24} {}", "USERNAME", "NAME", "LAST LOGIN"))?;
                for user in &users {
                    self.out.line(format!(
                        "{:<16} {:<24} {}",
                        user.username,
                        user.name,
                        user.last_login_display()
                    ))?;
                }
                self.out.line(format!("{} users", users.len()))?;
                Ok(())
            }
            UsersCommand::Create {
                username,
                name,
                password,
                admin_password,
            } => {
                let form = NewUser {
                    user_name: username.clone(),
                    name: name.clone(),
                    password: password.clone(),
                    admin_password: admin_password.clone(),
                };
                form.validate()?;
                let response = self.api.create_user(&ctx, &form.payload(&ctx))?;
                self.notice(&Notice::from_response(
                    &response,
                    &format!("User {username} created"),
                ))
            }
            UsersCommand::ResetPassword { username } => {
                let response = self
                    .api
                    .reset_password(&ctx, &UserAction::new(&ctx, username.clone()))?;
                self.notice(&Notice::from_response(
                    &response,
                    &format!("Password reset for {username}"),
                ))
            }
            UsersCommand::Delete { username, yes } => {
                confirm(*yes, &format!("delete user {username}"))?;
                let response = self
                    .api
                    .delete_user(&ctx, &UserAction::new(&ctx, username.clone()))?;
                self.notice(&Notice::from_response(
                    &response,
                    &format!("User {username} deleted"),
                ))
            }
        }
    }

    fn password(&mut self, args: &PasswordArgs) -> Result<()> {
        let ctx = self.context()?;
        let form = PasswordChange {
            kind: if args.transaction {
                PasswordKind::Transaction
            } else {
                PasswordKind::Login
            },
            old_password: args.old.clone(),
            new_password: args.new.clone(),
            confirm_password: args.confirm.clone(),
        };
        form.validate()?;
        let response = self
            .api
            .change_password(&ctx, form.kind, &form.payload(&ctx))?;
        self.notice(&Notice::from_response(&response, PASSWORD_UPDATED))
    }

    fn insights(&mut self, args: &InsightsArgs) -> Result<()> {
        let ctx = self.context()?;
        ctx.require_admin()?;
        let mut screen = InsightsScreen::new(self.today);
        {
            let filter = screen.filter_mut();
            filter.dimension = args.by;
            let dates = &mut filter.dates;
            if let Some(keyword) = args.dates.range {
                dates.select_range(keyword, self.today);
            }
            if let Some(from) = args.dates.from {
                dates.set_from_date(from);
            }
            if let Some(to) = args.dates.to {
                dates.set_to_date(to);
            }
        }
        screen.refresh(self.api, &ctx)?;

        let filter = screen.filter();
        self.out.heading(&format!(
            "Jobs by {} ({} - {})",
            filter.dimension,
            format_date(filter.dates.from_date()),
            format_date(filter.dates.to_date())
        ))?;
        for row in screen.rows() {
            self.out.field(&row.mode, &row.count.to_string(), 24)?;
        }
        self.out.field("Total", &screen.total().to_string(), 24)?;
        Ok(())
    }
}

fn confirm(yes: bool, action: &str) -> Result<()> {
    if yes {
        Ok(())
    } else {
        Err(Error::NotConfirmed(action.to_string()))
    }
}

fn apply_job_dates(form: &mut FilterForm, args: &DateFilterArgs, today: NaiveDate) {
    if let Some(keyword) = args.range {
        form.select_range(keyword, today);
    }
    if let Some(from) = args.from {
        form.set_from_date(from);
    }
    if let Some(to) = args.to {
        form.set_to_date(to);
    }
}

/// Overwrites the draft fields the operator supplied.
fn apply_fields(draft: &mut JobDraft, fields: &JobFields) {
    fn set(target: &mut String, value: &Option<String>) {
        if let Some(value) = value {
            *target = value.trim().to_string();
        }
    }

    set(&mut draft.customer_name, &fields.customer);
    set(&mut draft.mobile_no, &fields.mobile);
    set(&mut draft.email, &fields.email);
    set(&mut draft.address, &fields.address);
    set(&mut draft.engineer, &fields.engineer);
    set(&mut draft.moc, &fields.moc);
    set(&mut draft.assets, &fields.assets);
    set(&mut draft.product_make, &fields.product);
    set(&mut draft.serial_no, &fields.serial);
    set(&mut draft.description, &fields.description);
    set(&mut draft.fault_type, &fields.fault_type);
    set(&mut draft.fault_desc, &fields.fault_desc);
    set(&mut draft.job_status, &fields.status);
    set(&mut draft.solution_provided, &fields.solution);
    set(&mut draft.amount, &fields.amount);
    set(&mut draft.purchase_amount, &fields.purchase_amount);
    set(&mut draft.purchased_status, &fields.purchased);
    if let Some(date) = fields.in_date {
        draft.in_date = format_date(date);
    }
    if let Some(date) = fields.out_date {
        draft.out_date = format_date(date);
    }
}
