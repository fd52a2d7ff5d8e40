//! Schema inspection and rollback for development builds.

#[cfg(debug_assertions)]
use crate::{
    db::{
        db::Db,
        migrations::{get_db_version, needs_migration, MigrationManager},
    },
    libs::messages::Message,
    msg_info, msg_print, msg_success,
};
#[cfg(debug_assertions)]
use anyhow::Result;
#[cfg(debug_assertions)]
use clap::{Args, Subcommand};

#[cfg(debug_assertions)]
#[derive(Debug, Args)]
pub struct MigrationsArgs {
    #[command(subcommand)]
    command: MigrationsCommand,
}

#[cfg(debug_assertions)]
#[derive(Debug, Subcommand)]
enum MigrationsCommand {
    /// Show current database version
    Status,
    /// Show migration history
    History,
    /// Roll the schema back to an earlier version
    Rollback {
        /// Target version to roll back to
        version: u32,
    },
}

#[cfg(debug_assertions)]
pub fn cmd(args: MigrationsArgs) -> Result<()> {
    match args.command {
        MigrationsCommand::Status => {
            let conn = Db::new_without_migrations()?;
            msg_print!(Message::DatabaseVersion(get_db_version(&conn)?));
            if needs_migration(&conn)? {
                msg_info!(Message::DatabaseNeedsUpdate);
            } else {
                msg_info!(Message::DatabaseUpToDate);
            }
        }
        MigrationsCommand::History => {
            let conn = Db::new_without_migrations()?;
            let manager = MigrationManager::new();
            msg_print!(Message::MigrationHistory, true);
            for (version, name, applied_at) in manager.get_migration_history(&conn)? {
                println!("  v{}: {} (applied: {})", version, name, applied_at);
            }
        }
        MigrationsCommand::Rollback { version } => {
            let mut conn = Db::new_without_migrations()?;
            let manager = MigrationManager::new();
            manager.rollback_to(&mut conn, version)?;
            msg_success!(Message::DatabaseVersion(get_db_version(&conn)?));
        }
    }

    Ok(())
}
