#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use std::path::Path;

use super::*;
use crate::db::Database;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn setup(dir: &Path) -> (Config, Paths) {
    let config = Config {
        user_id: Some(1),
        ..Config::default()
    };
    let paths = Paths {
        config_file: dir.join("config.json"),
        database: dir.join("data").join("catbudget.db"),
    };
    (config, paths)
}

fn stored(paths: &Paths, user_id: i64) -> Vec<Category> {
    Database::open(&paths.database).unwrap().list(user_id).unwrap()
}

// ── Argument helpers ─────────────────────────────────────────

#[test]
fn test_flag_lookup() {
    let a = args(&["Rent", "--description", "flat", "--type", "chi"]);
    assert_eq!(flag(&a, "--description"), Some("flat"));
    assert_eq!(flag(&a, "--type"), Some("chi"));
    assert_eq!(flag(&a, "--sort"), None);
}

#[test]
fn test_positionals_skip_flag_values() {
    let a = args(&["Rent", "--description", "flat", "CHI", "40", "-5"]);
    assert_eq!(positionals(&a), vec!["Rent", "CHI", "40", "-5"]);
}

#[test]
fn test_parse_percent_accepts_suffix() {
    assert_eq!(parse_percent("25").unwrap(), dec!(25));
    assert_eq!(parse_percent(" 12.5% ").unwrap(), dec!(12.5));
    assert!(parse_percent("lots").is_err());
}

#[test]
fn test_parse_amount_rejects_negative() {
    assert_eq!(parse_amount("10.50").unwrap(), dec!(10.50));
    assert!(parse_amount("-1").is_err());
}

#[test]
fn test_parse_date_normalizes() {
    assert_eq!(parse_date("5/3/2024").unwrap(), "05-03-2024");
    assert!(parse_date("2024-03-05").is_err());
}

#[test]
fn test_resolve_category_by_id_or_name() {
    let mut rent = Category::new("Rent".into(), CategoryType::Expense, dec!(40), dec!(1200), 1);
    rent.id = Some(9);
    let cats = vec![rent];
    assert_eq!(resolve_category(&cats, "9").unwrap().name, "Rent");
    assert_eq!(resolve_category(&cats, "rent").unwrap().id, Some(9));
    assert!(resolve_category(&cats, "10").is_err());
    assert!(resolve_category(&cats, "Food").is_err());
}

#[test]
fn test_shellexpand_home() {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    assert_eq!(shellexpand("~/out.csv"), format!("{home}/out.csv"));
    assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
}

// ── Dispatch ─────────────────────────────────────────────────

#[test]
fn test_unknown_command_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    let err = as_cli(&args(&["frobnicate"]), &config, &paths).unwrap_err();
    assert!(err.to_string().contains("frobnicate"));
}

#[test]
fn test_backend_command_needs_user() {
    let dir = tempfile::tempdir().unwrap();
    let (mut config, paths) = setup(dir.path());
    config.user_id = None;
    assert!(as_cli(&args(&["categories"]), &config, &paths).is_err());
    // Nothing was opened.
    assert!(!paths.database.exists());
}

#[test]
fn test_help_and_config_need_no_backend() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    as_cli(&[], &config, &paths).unwrap();
    as_cli(&args(&["help"]), &config, &paths).unwrap();
    as_cli(&args(&["config"]), &config, &paths).unwrap();
    assert!(!paths.database.exists());
}

// ── Category commands against a local database ──────────────

#[test]
fn test_add_category_and_allocation_gate() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());

    as_cli(
        &args(&["add-category", "Rent", "CHI", "60", "1200", "--description", "flat"]),
        &config,
        &paths,
    )
    .unwrap();
    let err = as_cli(
        &args(&["add-category", "Food", "expense", "45%", "300"]),
        &config,
        &paths,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("at most 40% is free"));

    // Income has its own 100%.
    as_cli(
        &args(&["add-category", "Salary", "THU", "100", "5000"]),
        &config,
        &paths,
    )
    .unwrap();

    let cats = stored(&paths, 1);
    assert_eq!(cats.len(), 2);
    assert_eq!(cats[0].name, "Rent");
    assert_eq!(cats[0].description.as_deref(), Some("flat"));
    assert_eq!(cats[1].category_type, CategoryType::Income);
}

#[test]
fn test_add_category_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    let err = as_cli(&args(&["add-category", "Rent", "CHI"]), &config, &paths).unwrap_err();
    assert!(err.to_string().starts_with("Usage:"));
}

#[test]
fn test_update_category_does_not_double_count_itself() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    as_cli(&args(&["add-category", "Rent", "CHI", "60", "1200"]), &config, &paths).unwrap();
    as_cli(&args(&["add-category", "Food", "CHI", "30", "300"]), &config, &paths).unwrap();

    // 60 -> 70 fits because Rent's own 60 is not counted.
    as_cli(
        &args(&["update-category", "rent", "--percent", "70", "--actual", "900"]),
        &config,
        &paths,
    )
    .unwrap();
    // 70 -> 71 does not.
    assert!(as_cli(
        &args(&["update-category", "Rent", "--percent", "71"]),
        &config,
        &paths
    )
    .is_err());

    let cats = stored(&paths, 1);
    assert_eq!(cats[0].percentage_limit, dec!(70));
    assert_eq!(cats[0].actual_amount, dec!(900));
}

#[test]
fn test_categories_listing_flags() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    as_cli(&args(&["add-category", "Rent", "CHI", "60", "1200"]), &config, &paths).unwrap();

    as_cli(
        &args(&["categories", "--type", "THU", "--sort", "desc"]),
        &config,
        &paths,
    )
    .unwrap();
    as_cli(&args(&["summary"]), &config, &paths).unwrap();
    assert!(as_cli(&args(&["categories", "--sort", "sideways"]), &config, &paths).is_err());
    assert!(as_cli(&args(&["categories", "--type", "both"]), &config, &paths).is_err());
}

#[test]
fn test_categories_are_scoped_to_user() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    as_cli(&args(&["add-category", "Rent", "CHI", "60", "1200"]), &config, &paths).unwrap();

    let other = Config {
        user_id: Some(2),
        ..config.clone()
    };
    // User 2 cannot see or delete user 1's category.
    assert!(as_cli(&args(&["delete-category", "Rent"]), &other, &paths).is_err());
    assert_eq!(stored(&paths, 1).len(), 1);
}

// ── Bill commands & sync ─────────────────────────────────────

#[test]
fn test_bill_lifecycle_and_sync() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    as_cli(&args(&["add-category", "Food", "CHI", "30", "300"]), &config, &paths).unwrap();

    as_cli(
        &args(&["add-bill", "CHI", "120.50", "01-03-2024", "Food"]),
        &config,
        &paths,
    )
    .unwrap();
    as_cli(
        &args(&["add-bill", "CHI", "80", "02/03/2024", "Food", "--description", "market"]),
        &config,
        &paths,
    )
    .unwrap();
    assert!(as_cli(
        &args(&["add-bill", "CHI", "10", "31-02-2024", "Food"]),
        &config,
        &paths
    )
    .is_err());
    assert!(as_cli(
        &args(&["add-bill", "CHI", "10", "01-03-2024", "Nope"]),
        &config,
        &paths
    )
    .is_err());

    as_cli(&args(&["bills", "--category", "food"]), &config, &paths).unwrap();
    as_cli(&args(&["update-bill", "1", "--amount", "100"]), &config, &paths).unwrap();
    as_cli(&args(&["sync"]), &config, &paths).unwrap();
    assert_eq!(stored(&paths, 1)[0].actual_amount, dec!(180));

    as_cli(&args(&["delete-bill", "2"]), &config, &paths).unwrap();
    assert!(as_cli(&args(&["delete-bill", "2"]), &config, &paths).is_err());
    as_cli(&args(&["sync"]), &config, &paths).unwrap();
    assert_eq!(stored(&paths, 1)[0].actual_amount, dec!(100));
}

#[test]
fn test_delete_category_removes_its_bills() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    as_cli(&args(&["add-category", "Food", "CHI", "30", "300"]), &config, &paths).unwrap();
    as_cli(
        &args(&["add-bill", "CHI", "20", "01-03-2024", "1"]),
        &config,
        &paths,
    )
    .unwrap();

    as_cli(&args(&["delete-category", "1"]), &config, &paths).unwrap();
    let db = Database::open(&paths.database).unwrap();
    assert!(db.list(1).unwrap().is_empty());
    assert!(db.list_bills(1).unwrap().is_empty());
}

#[test]
fn test_sync_rejected_for_remote() {
    let dir = tempfile::tempdir().unwrap();
    let (mut config, paths) = setup(dir.path());
    config.backend = BackendKind::Remote;
    config.remote_url = "http://127.0.0.1:9".into();
    let err = as_cli(&args(&["sync"]), &config, &paths).unwrap_err();
    assert!(err.to_string().contains("local"));
}

// ── Export ───────────────────────────────────────────────────

#[test]
fn test_export_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let (config, paths) = setup(dir.path());
    as_cli(&args(&["add-category", "Rent", "CHI", "60", "1200"]), &config, &paths).unwrap();

    let out = dir.path().join("cats.csv");
    as_cli(
        &args(&["export", out.to_str().unwrap()]),
        &config,
        &paths,
    )
    .unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("Rent,CHI,60,1200.00,0.00,0,"));
}
