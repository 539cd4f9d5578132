//! Writes the TypeScript declarations of every wire type to `shared/types.ts`
//! (or the path given as the first argument).

use std::{fs, path::PathBuf};

use anyhow::Context;
use ts_rs::TS;

fn declarations() -> Vec<String> {
    vec![
        db::models::lead::Lead::decl(),
        db::models::lead::CreateLead::decl(),
        db::models::lead::UpdateLead::decl(),
        db::models::lead::StatusCount::decl(),
        db::models::company::Company::decl(),
        db::models::company::CreateCompany::decl(),
        db::models::company::UpdateCompany::decl(),
        db::models::interaction::Interaction::decl(),
        db::models::interaction::CreateInteraction::decl(),
        db::models::interaction::UpdateInteraction::decl(),
        db::models::deal::Deal::decl(),
        db::models::deal::CreateDeal::decl(),
        db::models::deal::UpdateDeal::decl(),
        db::models::deal::StageCount::decl(),
        db::models::task::Task::decl(),
        db::models::task::TaskStatus::decl(),
        db::models::task::TaskPriority::decl(),
        db::models::task::CreateTask::decl(),
        db::models::task::UpdateTask::decl(),
        db::models::user::Role::decl(),
        db::models::user::User::decl(),
        services::services::rbac::Action::decl(),
        services::services::rbac::Capabilities::decl(),
        services::services::rbac::Permissions::decl(),
        services::services::dashboard::DashboardStats::decl(),
        services::services::health::HealthReport::decl(),
        utils::response::ErrorBody::decl(),
        utils::response::Paginated::<()>::decl(),
    ]
}

fn main() -> anyhow::Result<()> {
    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shared/types.ts"));

    let mut contents = String::from(
        "// This file was generated by `cargo run --bin generate-types`. Do not edit.\n\n",
    );
    for decl in declarations() {
        contents.push_str("export ");
        contents.push_str(&decl);
        contents.push_str("\n\n");
    }

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&out, contents).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}
