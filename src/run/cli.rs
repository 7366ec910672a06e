use anyhow::{anyhow, bail, Context, Result};
use rust_decimal::Decimal;

use super::{Backend, Paths};
use crate::budget::{AllocationSummary, CategoryDraft};
use crate::config::{BackendKind, Config};
use crate::export::write_categories_csv;
use crate::models::{parse_bill_date, Bill, Category, CategoryType, BILL_DATE_FORMAT};
use crate::repo::{BillRepository, CategoryRepository, Store};
use crate::ui::categories::{self, AmountSort, TypeFilter};
use crate::ui::{bills, util::format_amount};

/// Per-invocation values every backend command needs.
struct Session<'a> {
    user_id: i64,
    symbol: &'a str,
}

pub(crate) fn as_cli(args: &[String], config: &Config, paths: &Paths) -> Result<()> {
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("catbudget {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "config" => cli_config(config, paths),
        "categories" | "ls" | "summary" | "s" | "add-category" | "update-category"
        | "delete-category" | "bills" | "add-bill" | "update-bill" | "delete-bill" | "sync"
        | "export" => run_command(command, &args[1..], config, paths),
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn run_command(command: &str, args: &[String], config: &Config, paths: &Paths) -> Result<()> {
    let session = Session {
        user_id: config.require_user()?,
        symbol: &config.currency_symbol,
    };
    let mut backend = Backend::open(config, &paths.database)?;
    tracing::debug!(
        command,
        user_id = session.user_id,
        backend = %backend.store().describe(),
        "running command"
    );

    match command {
        "categories" | "ls" => cli_categories(args, backend.store(), &session),
        "summary" | "s" => cli_summary(backend.store(), &session),
        "add-category" => cli_add_category(args, backend.store(), &session),
        "update-category" => cli_update_category(args, backend.store(), &session),
        "delete-category" => cli_delete_category(args, &backend, &session),
        "bills" => cli_bills(args, backend.store(), &session),
        "add-bill" => cli_add_bill(args, backend.store(), &session),
        "update-bill" => cli_update_bill(args, backend.store(), &session),
        "delete-bill" => cli_delete_bill(args, backend.store(), &session),
        "sync" => cli_sync(&mut backend, &session),
        "export" => cli_export(args, backend.store(), &session),
        other => bail!("Unknown command: {other}"),
    }
}

fn print_usage() {
    println!("catbudget: category budgets with percentage limits");
    println!();
    println!("Usage: catbudget [--user <id>] [--remote <url> | --local] <command>");
    println!();
    println!("Commands:");
    println!("  categories                        List categories with progress");
    println!("    --type <all|THU|CHI>            Only one category type");
    println!("    --sort <asc|desc>               Order by planned amount");
    println!("  summary                           Allocation per type and bill totals");
    println!("  add-category <name> <type> <percent> <amount>");
    println!("    --description <text>");
    println!("  update-category <id|name>         Change fields of a category");
    println!("    --name, --type, --percent, --amount, --actual, --description");
    println!("  delete-category <id|name>         Delete a category and its bills");
    println!("  bills                             List bills, newest first");
    println!("    --category <id|name>            Only bills filed under one category");
    println!("  add-bill <type> <amount> <dd-mm-yyyy> <category>");
    println!("    --description <text>");
    println!("  update-bill <id>                  Change fields of a bill");
    println!("    --type, --amount, --date, --category, --description");
    println!("  delete-bill <id>");
    println!("  sync                              Recompute actual amounts from bills (local only)");
    println!("  export [path]                     Export categories to CSV");
    println!("  config                            Show the active configuration");
    println!("  --help, -h                        Show this help");
    println!("  --version, -V                     Show version");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither a `--flag` nor a flag's value.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_type(raw: &str) -> Result<CategoryType> {
    CategoryType::parse(raw)
        .ok_or_else(|| anyhow!("Invalid type '{raw}' (expected THU/income or CHI/expense)"))
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid {field}: '{raw}'"))
}

/// Accepts `25` or `25%`.
fn parse_percent(raw: &str) -> Result<Decimal> {
    parse_decimal("percentage", raw.trim().trim_end_matches('%'))
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    let amount = parse_decimal("amount", raw)?;
    if amount < Decimal::ZERO {
        bail!("Amount cannot be negative: {raw}");
    }
    Ok(amount)
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id: '{raw}'"))
}

fn parse_date(raw: &str) -> Result<String> {
    parse_bill_date(raw)
        .map(|d| d.format(BILL_DATE_FORMAT).to_string())
        .ok_or_else(|| anyhow!("Invalid date '{raw}' (expected dd-mm-yyyy)"))
}

/// Look a category up by id, falling back to a case-insensitive name match.
fn resolve_category<'a>(categories: &'a [Category], key: &str) -> Result<&'a Category> {
    let found = match key.trim().parse::<i64>() {
        Ok(id) => Category::find_by_id(categories, id),
        Err(_) => Category::find_by_name(categories, key.trim()),
    };
    found.ok_or_else(|| anyhow!("Category '{key}' not found"))
}

fn category_id(category: &Category) -> Result<i64> {
    category
        .id
        .ok_or_else(|| anyhow!("Category '{}' has no id", category.name))
}

fn load_categories(store: &dyn Store, user_id: i64) -> Result<Vec<Category>> {
    store
        .list(user_id)
        .with_context(|| format!("Failed to load categories ({})", store.describe()))
}

fn load_bills(store: &dyn Store, user_id: i64) -> Result<Vec<Bill>> {
    store
        .list_bills(user_id)
        .with_context(|| format!("Failed to load bills ({})", store.describe()))
}

// ── Categories ───────────────────────────────────────────────

fn cli_categories(args: &[String], store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let filter = match flag(args, "--type") {
        Some(raw) => TypeFilter::parse(raw)
            .ok_or_else(|| anyhow!("Invalid --type '{raw}' (expected all, THU or CHI)"))?,
        None => TypeFilter::All,
    };
    let sort = match flag(args, "--sort") {
        Some(raw) => AmountSort::parse(raw)
            .ok_or_else(|| anyhow!("Invalid --sort '{raw}' (expected asc or desc)"))?,
        None => AmountSort::Default,
    };

    let cats = load_categories(store, session.user_id)?;
    let selected = categories::select(&cats, filter, sort);
    if selected.is_empty() {
        println!("No categories");
        return Ok(());
    }
    for line in categories::render_list(&selected, session.symbol) {
        println!("{line}");
    }
    Ok(())
}

fn cli_summary(store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let cats = load_categories(store, session.user_id)?;
    let bills = load_bills(store, session.user_id)?;
    let summary = AllocationSummary::from_categories(&cats);

    let (income, expenses) = bills.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expenses), bill| {
            if bill.is_income() {
                (income.saturating_add(bill.amount), expenses)
            } else {
                (income, expenses.saturating_add(bill.amount))
            }
        },
    );

    println!("catbudget: user {} ({})", session.user_id, store.describe());
    println!("{}", "─".repeat(50));
    println!("Allocation:");
    for line in categories::render_summary(&summary) {
        println!("{line}");
    }
    println!();
    println!("  Categories: {}", cats.len());
    println!("  Bills:      {}", bills.len());
    println!("  Income:     {}", format_amount(income, session.symbol));
    println!("  Expenses:   {}", format_amount(expenses, session.symbol));
    println!(
        "  Net:        {}",
        format_amount(income.saturating_sub(expenses), session.symbol)
    );

    let over: Vec<&str> = cats
        .iter()
        .filter(|c| c.is_over_budget())
        .map(|c| c.name.as_str())
        .collect();
    if !over.is_empty() {
        println!();
        println!("Over budget: {}", over.join(", "));
    }
    Ok(())
}

fn cli_add_category(args: &[String], store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let &[name, kind, percent, amount] = positionals(args).as_slice() else {
        bail!(
            "Usage: catbudget add-category <name> <type> <percent> <amount> [--description <text>]"
        );
    };

    let mut draft = CategoryDraft::new(
        name.to_string(),
        parse_type(kind)?,
        parse_percent(percent)?,
        parse_decimal("amount", amount)?,
    );
    draft.description = flag(args, "--description").map(str::to_string);

    let snapshot = load_categories(store, session.user_id)?;
    let category = draft
        .build(&snapshot, session.user_id, None)
        .context("Category not saved")?;
    let created = store
        .create(&category)
        .context("Failed to create category")?;
    tracing::info!(id = ?created.id, name = %created.name, "category created");

    println!(
        "Created {} category '{}' ({}% of budget)",
        created.category_type,
        created.name,
        created.percentage_limit.normalize()
    );
    Ok(())
}

fn cli_update_category(args: &[String], store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let &[key] = positionals(args).as_slice() else {
        bail!("Usage: catbudget update-category <id|name> [--name N] [--type T] [--percent P] [--amount A] [--actual A] [--description D]");
    };

    let snapshot = load_categories(store, session.user_id)?;
    let existing = resolve_category(&snapshot, key)?;
    let id = category_id(existing)?;

    let original = CategoryDraft::from_category(existing);
    let mut draft = original.clone();
    if let Some(name) = flag(args, "--name") {
        draft.name = name.to_string();
    }
    if let Some(kind) = flag(args, "--type") {
        draft.category_type = parse_type(kind)?;
    }
    if let Some(percent) = flag(args, "--percent") {
        draft.percentage_limit = parse_percent(percent)?;
    }
    if let Some(amount) = flag(args, "--amount") {
        draft.amount = parse_decimal("amount", amount)?;
    }
    if let Some(actual) = flag(args, "--actual") {
        draft.actual_amount = parse_decimal("actual amount", actual)?;
    }
    if let Some(description) = flag(args, "--description") {
        draft.description = Some(description.to_string());
    }
    if draft == original {
        println!("Nothing to change");
        return Ok(());
    }

    let category = draft
        .build(&snapshot, session.user_id, Some(id))
        .context("Category not saved")?;
    let updated = store
        .update(&category)
        .with_context(|| format!("Failed to update category {id}"))?;
    tracing::info!(id, "category updated");

    println!("Updated category '{}' (id {id})", updated.name);
    Ok(())
}

fn cli_delete_category(args: &[String], backend: &Backend, session: &Session<'_>) -> Result<()> {
    let &[key] = positionals(args).as_slice() else {
        bail!("Usage: catbudget delete-category <id|name>");
    };

    let store = backend.store();
    let snapshot = load_categories(store, session.user_id)?;
    let existing = resolve_category(&snapshot, key)?;
    let id = category_id(existing)?;

    if let Backend::Local(db) = backend {
        let bills = db.bill_count_for_category(id)?;
        if bills > 0 {
            println!("Removing {bills} bill(s) filed under '{}'", existing.name);
        }
    }
    store
        .delete(id)
        .with_context(|| format!("Failed to delete category {id}"))?;
    tracing::info!(id, "category deleted");

    println!("Deleted category '{}' (id {id})", existing.name);
    Ok(())
}

// ── Bills ────────────────────────────────────────────────────

fn cli_bills(args: &[String], store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let cats = load_categories(store, session.user_id)?;
    let mut bill_list = load_bills(store, session.user_id)?;

    if let Some(key) = flag(args, "--category") {
        let id = category_id(resolve_category(&cats, key)?)?;
        bill_list.retain(|b| b.category_id == id);
    }
    // Newest first; unparseable dates sort last.
    bill_list.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));

    if bill_list.is_empty() {
        println!("No bills");
        return Ok(());
    }
    for line in bills::render_list(&bill_list, &cats, session.symbol) {
        println!("{line}");
    }
    Ok(())
}

fn cli_add_bill(args: &[String], store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let &[kind, amount, date, category] = positionals(args).as_slice() else {
        bail!("Usage: catbudget add-bill <type> <amount> <dd-mm-yyyy> <category> [--description <text>]");
    };

    let bill_type = parse_type(kind)?;
    let amount = parse_amount(amount)?;
    let date = parse_bill_date(date)
        .ok_or_else(|| anyhow!("Invalid date '{date}' (expected dd-mm-yyyy)"))?;
    let cats = load_categories(store, session.user_id)?;
    let cat = resolve_category(&cats, category)?;

    if bill_type != cat.category_type {
        eprintln!(
            "Warning: {bill_type} bill filed under {} category '{}'",
            cat.category_type, cat.name
        );
    }

    let mut bill = Bill::new(bill_type, amount, date, category_id(cat)?, session.user_id);
    bill.description = flag(args, "--description").map(str::to_string);
    let created = store.create_bill(&bill).context("Failed to add bill")?;
    tracing::info!(id = ?created.id, category_id = created.category_id, "bill added");

    println!(
        "Added {} bill of {} to '{}' on {}",
        created.bill_type,
        format_amount(created.amount, session.symbol),
        cat.name,
        created.date
    );
    Ok(())
}

fn cli_update_bill(args: &[String], store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let &[raw_id] = positionals(args).as_slice() else {
        bail!("Usage: catbudget update-bill <id> [--type T] [--amount A] [--date D] [--category C] [--description D]");
    };
    let id = parse_id(raw_id)?;

    let original = load_bills(store, session.user_id)?
        .into_iter()
        .find(|b| b.id == Some(id))
        .ok_or_else(|| anyhow!("Bill {id} not found"))?;
    let mut bill = original.clone();

    if let Some(kind) = flag(args, "--type") {
        bill.bill_type = parse_type(kind)?;
    }
    if let Some(amount) = flag(args, "--amount") {
        bill.amount = parse_amount(amount)?;
    }
    if let Some(date) = flag(args, "--date") {
        bill.date = parse_date(date)?;
    }
    if let Some(key) = flag(args, "--category") {
        let cats = load_categories(store, session.user_id)?;
        bill.category_id = category_id(resolve_category(&cats, key)?)?;
    }
    if let Some(description) = flag(args, "--description") {
        bill.description = Some(description.to_string()).filter(|d| !d.trim().is_empty());
    }
    if bill == original {
        println!("Nothing to change");
        return Ok(());
    }

    store
        .update_bill(&bill)
        .with_context(|| format!("Failed to update bill {id}"))?;
    tracing::info!(id, "bill updated");

    println!("Updated bill {id}");
    Ok(())
}

fn cli_delete_bill(args: &[String], store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let &[raw_id] = positionals(args).as_slice() else {
        bail!("Usage: catbudget delete-bill <id>");
    };
    let id = parse_id(raw_id)?;

    // Only the user's own bills may be deleted.
    if !load_bills(store, session.user_id)?
        .iter()
        .any(|b| b.id == Some(id))
    {
        bail!("Bill {id} not found");
    }
    store
        .delete_bill(id)
        .with_context(|| format!("Failed to delete bill {id}"))?;
    tracing::info!(id, "bill deleted");

    println!("Deleted bill {id}");
    Ok(())
}

fn cli_sync(backend: &mut Backend, session: &Session<'_>) -> Result<()> {
    let db = backend
        .local_mut()
        .ok_or_else(|| anyhow!("sync only works with the local database (use --local)"))?;
    let changed = db
        .sync_actual_amounts(session.user_id)
        .context("Failed to sync actual amounts")?;
    let noun = if changed == 1 { "category" } else { "categories" };
    println!("Updated actual amounts on {changed} {noun}");
    Ok(())
}

// ── Export & config ──────────────────────────────────────────

fn cli_export(args: &[String], store: &dyn Store, session: &Session<'_>) -> Result<()> {
    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let date = chrono::Local::now().format("%Y-%m-%d");
            format!("{home}/catbudget-categories-{date}.csv")
        });

    let cats = load_categories(store, session.user_id)?;
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("Failed to create {output_path}"))?;
    let count = write_categories_csv(&cats, file)?;
    if count == 0 {
        println!("No categories; wrote header only to {output_path}");
    } else {
        println!("Exported {count} categories to {output_path}");
    }
    Ok(())
}

fn cli_config(config: &Config, paths: &Paths) -> Result<()> {
    let backend = match config.backend {
        BackendKind::Local => "local",
        BackendKind::Remote => "remote",
    };
    let database = config.database_path.as_deref().unwrap_or(&paths.database);

    println!("Config file:  {}", paths.config_file.display());
    println!(
        "User:         {}",
        config
            .user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(not set)".into())
    );
    println!("Backend:      {backend}");
    println!("Remote URL:   {}", config.remote_url);
    println!("Timeout:      {}s", config.timeout_secs);
    println!("Database:     {}", database.display());
    println!("Currency:     {}", config.currency_symbol);
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
