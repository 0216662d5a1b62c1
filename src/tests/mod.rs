// Tests d'API : application actix complète sur une base SQLite en mémoire

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use crate::config::{
    AuthSettings, DatabaseSettings, JwtSettings, MailBackend, MailSettings, PaginationSettings,
    PasswordPolicy, ServerSettings, Settings,
};
use crate::db;
use crate::mailer::{Email, MailError, Mailer};
use crate::models::users::{self as user_model, apply_role, Role};
use crate::utils::jwt;

/// Construit l'application complète à partir d'un `TestContext`
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::NormalizePath::trim())
                .app_data(actix_web::web::Data::new($ctx.db.clone()))
                .app_data(actix_web::web::Data::new($ctx.settings.clone()))
                .app_data(actix_web::web::Data::from(
                    $ctx.mailer.clone() as std::sync::Arc<dyn crate::mailer::Mailer>
                ))
                .configure(crate::routes::configure_extractors)
                .configure(crate::routes::configure_routes),
        )
        .await
    };
}

/// Envoie une `TestRequest`, renvoie (status, corps JSON ou Null)
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let response = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = response.status();
        let bytes = actix_web::test::read_body(response).await;
        let json: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };
        (status, json)
    }};
}

mod reviews;
mod users;

/// Mailer qui garde les mails en mémoire
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Io(std::io::Error::other("relay unavailable")));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub settings: Settings,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_settings() -> Settings {
    Settings {
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        server: ServerSettings {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
        },
        jwt: JwtSettings {
            secret: "test-secret".to_string(),
            ttl_hours: 1,
        },
        auth: AuthSettings {
            confirmation_code_ttl_minutes: 30,
            default_from_email: "noreply@yamdb.test".to_string(),
        },
        mail: MailSettings {
            backend: MailBackend::Log,
            dir: PathBuf::from("unused"),
        },
        password_policy: PasswordPolicy::default(),
        pagination: PaginationSettings::default(),
    }
}

pub async fn setup_with_mailer(mailer: RecordingMailer) -> TestContext {
    let settings = test_settings();

    // Une seule connexion : chaque connexion SQLite en mémoire a sa propre base
    let mut options = ConnectOptions::new(settings.database.url.clone());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    db::create_schema(&db).await.unwrap();

    TestContext {
        db,
        settings,
        mailer: Arc::new(mailer),
    }
}

pub async fn setup() -> TestContext {
    setup_with_mailer(RecordingMailer::default()).await
}

impl TestContext {
    /// Crée un utilisateur et renvoie (modèle, header Authorization)
    pub async fn user(&self, username: &str, role: Role) -> (user_model::Model, String) {
        let mut active = user_model::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            bio: Set(String::new()),
            password_hash: Set(None),
            confirmation_code: Set(None),
            confirmation_code_expires_at: Set(None),
            date_joined: Set(Utc::now()),
            ..Default::default()
        };
        apply_role(&mut active, role);

        let user = active.insert(&self.db).await.unwrap();
        let token = jwt::generate_token(user.id, &user.username, &self.settings.jwt).unwrap();

        (user, format!("Bearer {token}"))
    }
}
