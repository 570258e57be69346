//! Console reporting for the CLI. ANSI styling only; logging stays with
//! `tracing`.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use crate::error::MongrateError;
use crate::types::state::{ExecutionRecord, MigrationStatus, StateEntry};
use std::path::Path;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const GRAY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

pub fn print_state(entries: &[StateEntry], pending_only: bool, executed_only: bool) {
    if entries.is_empty() {
        println!("{RED}No migrations found.{RESET}");
        return;
    }
    let show_pending = pending_only || !executed_only;
    let show_executed = executed_only || !pending_only;
    for entry in entries {
        match entry.status {
            MigrationStatus::Pending if show_pending => {
                println!("{YELLOW}{}{RESET} is currently {GRAY}{}{RESET}", entry.name, entry.status);
            }
            MigrationStatus::Executed if show_executed => {
                println!("{YELLOW}{}{RESET} has been {GRAY}{}{RESET}", entry.name, entry.status);
            }
            _ => {}
        }
    }
}

pub fn print_migrated(records: &[ExecutionRecord]) {
    if records.is_empty() {
        println!("{GREEN}Nothing new to migrate.{RESET}");
        return;
    }
    for record in records {
        println!("{GREEN}{}{RESET} has been migrated successfully.", record.name);
    }
}

pub fn print_rolled_back(names: &[String]) {
    if names.is_empty() {
        println!("{GREEN}Nothing to rollback.{RESET}");
        return;
    }
    for name in names {
        println!("{GREEN}{name}{RESET} has been rolled back successfully.");
    }
}

pub fn print_seeded(names: &[String]) {
    if names.is_empty() {
        println!("{GREEN}Nothing to seed.{RESET}");
        return;
    }
    for name in names {
        println!("{GREEN}{name}{RESET} has been seeded successfully.");
    }
}

pub fn print_created(kind: &str, name: &str, path: &Path) {
    println!(
        "{GREEN}The {kind} {RESET}{YELLOW}{name}{RESET}{GREEN} has been created as {RESET}[{YELLOW}{}{RESET}]",
        path.display()
    );
}

pub fn print_error(error: &MongrateError) {
    eprintln!("{RED}{error}{RESET}");
}
