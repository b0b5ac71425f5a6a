use fintrack::{
    DbPool, database, load_config,
    models::users::{NewUser, User},
    queries,
};
use std::sync::Once;
use tokio::sync::OnceCell;

static INIT: Once = Once::new();
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connects to the test database and applies migrations once per process.
pub async fn init_test_db() -> DbPool {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
    });

    let config = load_config().expect("Failed to load config");
    let pool = database::connect(&config.database)
        .await
        .expect("Failed to connect to database");

    MIGRATED
        .get_or_init(|| async {
            database::migrate(&pool).await.expect("Failed to run migrations");
        })
        .await;

    pool
}

/// Test database wrapper giving each test its own email namespace.
pub struct TestDb {
    pub pool: DbPool,
    test_prefix: String,
}

impl TestDb {
    /// Creates a test database handle namespaced by `test_name`.
    ///
    /// Use the test function name so leftover rows can be traced back and
    /// are cleaned up when the same test runs again.
    pub async fn new(test_name: &str) -> Self {
        let pool = init_test_db().await;
        let test_prefix = format!("test_{}", test_name);

        Self::cleanup_prefix(&pool, &test_prefix).await;

        Self { pool, test_prefix }
    }

    pub async fn get_connection(&self) -> sqlx::pool::PoolConnection<sqlx::Postgres> {
        self.pool
            .acquire()
            .await
            .expect("Failed to get database connection")
    }

    pub fn test_prefix(&self) -> &str {
        &self.test_prefix
    }

    /// Generates a unique email inside this test's namespace.
    pub fn email(&self) -> String {
        format!(
            "{}_{}@example.com",
            self.test_prefix,
            uuid::Uuid::now_v7().simple()
        )
    }

    /// Inserts a user directly, bypassing registration.
    pub async fn create_user(&self, name: &str) -> User {
        let mut conn = self.get_connection().await;
        queries::users::create_user(
            &mut conn,
            NewUser {
                name: name.to_string(),
                email: self.email(),
                password_hash: "not-a-real-hash".to_string(),
                timezone: None,
            },
        )
        .await
        .expect("Failed to create test user")
    }

    async fn cleanup_prefix(pool: &DbPool, prefix: &str) {
        // Child rows go with the user through ON DELETE CASCADE
        sqlx::query("DELETE FROM users WHERE email LIKE $1")
            .bind(format!("{}_%", prefix))
            .execute(pool)
            .await
            .expect("Failed to cleanup test data");
    }
}
