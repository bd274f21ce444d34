/// SQL schema for the GymBuddy database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Accounts
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    is_superuser INTEGER NOT NULL DEFAULT 0,
    date_joined TEXT NOT NULL
);

-- Login sessions
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);

-- Exercise catalog (imported reference data)
CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exercise_name TEXT UNIQUE NOT NULL,
    main_muscle TEXT NOT NULL,
    target_muscle TEXT,
    synergist_muscle TEXT,
    equipment TEXT,
    instructions TEXT,
    image TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_exercises_main_muscle ON exercises(main_muscle);

-- Scheduled exercises per user
CREATE TABLE IF NOT EXISTS workout_plans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    exercise_id INTEGER NOT NULL,
    sets INTEGER NOT NULL CHECK(sets > 0),
    reps INTEGER NOT NULL CHECK(reps > 0),
    plan_date TEXT NOT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    description TEXT,
    date_created TEXT NOT NULL,
    CHECK ((is_completed = 1) = (completed_at IS NOT NULL)),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (exercise_id) REFERENCES exercises(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_workout_plans_user_date ON workout_plans(user_id, plan_date);

-- One profile per user
CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY,
    display_name TEXT UNIQUE NOT NULL CHECK(length(display_name) <= 40),
    bio TEXT NOT NULL DEFAULT '',
    profile_picture TEXT,
    -- Comma-separated sport slugs
    favorite_sports TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS favorite_exercises (
    user_id TEXT NOT NULL,
    exercise_id INTEGER NOT NULL,
    PRIMARY KEY (user_id, exercise_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (exercise_id) REFERENCES exercises(id) ON DELETE CASCADE
);

-- Community threads
CREATE TABLE IF NOT EXISTS threads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK(length(title) <= 255),
    content TEXT NOT NULL,
    author_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_threads_created_at ON threads(created_at DESC);

CREATE TABLE IF NOT EXISTS thread_likes (
    thread_id INTEGER NOT NULL,
    user_id TEXT NOT NULL,
    PRIMARY KEY (thread_id, user_id),
    FOREIGN KEY (thread_id) REFERENCES threads(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Replies form an adjacency list through parent_id
CREATE TABLE IF NOT EXISTS replies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    thread_id INTEGER NOT NULL,
    author_id TEXT NOT NULL,
    parent_id INTEGER,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (thread_id) REFERENCES threads(id) ON DELETE CASCADE,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (parent_id) REFERENCES replies(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_replies_thread_id ON replies(thread_id);
CREATE INDEX IF NOT EXISTS idx_replies_parent_id ON replies(parent_id);

CREATE TABLE IF NOT EXISTS reply_likes (
    reply_id INTEGER NOT NULL,
    user_id TEXT NOT NULL,
    PRIMARY KEY (reply_id, user_id),
    FOREIGN KEY (reply_id) REFERENCES replies(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);
"#;

/// Small exercise catalog for local development
pub const SAMPLE_DATA: &str = r#"
INSERT OR IGNORE INTO exercises (exercise_name, main_muscle, target_muscle, synergist_muscle, equipment, instructions, created_at, updated_at) VALUES
    ('Barbell Bench Press', 'Chest', 'Pectoralis Major Sternal Head', 'Triceps Brachii', 'Barbell', 'Lie on the bench and grip the bar slightly wider than shoulder width. Lower the bar to the chest and press it back up.', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00'),
    ('Dumbbell Curl', 'Biceps', 'Biceps Brachii', 'Brachialis', 'Dumbbell', 'Stand holding dumbbells at your sides. Curl the weights up while keeping the elbows fixed.', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00'),
    ('Push Up', 'Chest', 'Pectoralis Major Sternal Head', 'Anterior Deltoid', 'Body Weight', 'Start in a plank position. Lower the body until the chest nearly touches the floor, then push back up.', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00'),
    ('Assisted Pull Up', 'Back', 'Latissimus Dorsi', 'Biceps Brachii', 'Assisted', 'Kneel on the assist pad and grip the bar. Pull up until the chin clears the bar.', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00'),
    ('Self-Assisted Inverted Row', 'Back', 'Latissimus Dorsi', 'Rear Deltoid', 'Self-Assisted Lever', 'Hang under the bar with the feet on the floor. Pull the chest to the bar.', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00'),
    ('Cable Triceps Pushdown', 'Triceps', 'Triceps Brachii', NULL, 'Cable', 'Grip the rope attachment and extend the elbows fully.', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00'),
    ('Kettlebell Swing', 'Hips', 'Gluteus Maximus', 'Hamstrings', 'Kettlebell', 'Hinge at the hips and drive the bell forward to chest height.', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00'),
    ('Lever Leg Extension', 'Thighs', 'Quadriceps', NULL, 'Lever (plate loaded)', 'Sit in the machine and extend the knees until the legs are straight.', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00');
"#;
