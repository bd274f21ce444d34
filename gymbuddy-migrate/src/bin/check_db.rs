// Quick diagnostic to check database state
use gymbuddy_server::db::Database;
use gymbuddy_server::equipment::normalize;
use std::collections::BTreeMap;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gymbuddy.db".to_string());
    let db = Database::new(&path)?;
    let conn = db.pool.get()?;

    println!("=== Database Diagnostic: {} ===\n", path);

    for table in [
        "users",
        "sessions",
        "exercises",
        "workout_plans",
        "profiles",
        "threads",
        "replies",
    ] {
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        println!("{:<15} {}", table, count);
    }

    println!("\n=== Superusers ===");
    let mut stmt = conn.prepare("SELECT username FROM users WHERE is_superuser = 1 ORDER BY username")?;
    let admins = stmt.query_map([], |row| row.get::<_, String>(0))?;
    for (i, admin) in admins.enumerate() {
        println!("  {}. {}", i + 1, admin?);
    }

    // Raw equipment strings grouped by the label shown in the filter dropdown
    println!("\n=== Equipment labels ===");
    let mut stmt = conn.prepare("SELECT equipment FROM exercises WHERE equipment IS NOT NULL")?;
    let raws = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut labels: BTreeMap<String, usize> = BTreeMap::new();
    for raw in raws {
        let normalized = normalize(&raw?);
        *labels.entry(normalized.label().to_string()).or_default() += 1;
    }
    for (label, count) in &labels {
        println!("  {:<20} {}", label, count);
    }

    // Completed plans must carry a timestamp and vice versa
    let inconsistent: i64 = conn.query_row(
        "SELECT COUNT(*) FROM workout_plans
         WHERE (is_completed = 1) <> (completed_at IS NOT NULL)",
        [],
        |row| row.get(0),
    )?;
    println!("\nPlans with inconsistent completion state: {}", inconsistent);

    // Replies whose parent sits in another thread
    let cross_thread: i64 = conn.query_row(
        "SELECT COUNT(*) FROM replies child
         JOIN replies parent ON parent.id = child.parent_id
         WHERE parent.thread_id <> child.thread_id",
        [],
        |row| row.get(0),
    )?;
    println!("Replies attached to a parent in another thread: {}", cross_thread);

    Ok(())
}
