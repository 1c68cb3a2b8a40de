// SQL schema for the standup database. Applied with CREATE TABLE IF NOT
// EXISTS on every startup; there is no separate migration step.

pub const TABLES: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS journal (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry TEXT NOT NULL,
        time TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS exercise (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry TEXT NOT NULL,
        time TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS symptoms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry TEXT NOT NULL,
        time TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reminders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry TEXT NOT NULL,
        reminder_time TEXT NOT NULL,
        time TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_focus (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry TEXT NOT NULL,
        reminder_time TEXT NOT NULL,
        time TEXT NOT NULL
    )
    "#,
];
