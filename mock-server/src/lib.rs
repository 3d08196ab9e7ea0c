use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const DEFAULT_JWT_SECRET: &str = "yeslist-development-secret";
const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
}

#[derive(Deserialize)]
pub struct TodoInput {
    pub title: String,
    #[serde(rename = "isDone", default)]
    pub is_done: bool,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Failures surfaced to clients as `{ "message": ... }` bodies.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("User already exists")]
    Conflict,

    #[error("Todo not found")]
    NotFound,

    #[error("Could not issue token")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::Conflict => StatusCode::CONFLICT,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { message: self.to_string() })).into_response()
    }
}

struct User {
    id: i64,
    email: String,
    password_hash: String,
}

struct StoredTodo {
    owner: i64,
    todo: Todo,
}

#[derive(Default)]
struct Db {
    users: HashMap<String, User>,
    todos: BTreeMap<i64, StoredTodo>,
    next_user_id: i64,
    next_todo_id: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

#[derive(Clone)]
pub struct AppState {
    db: Arc<RwLock<Db>>,
    keys: Arc<Keys>,
}

impl AppState {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            db: Arc::new(RwLock::new(Db::default())),
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(jwt_secret.as_bytes()),
                decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
            }),
        }
    }
}

/// The authenticated caller of a `/todo` route.
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ServerError::Unauthorized("Missing bearer token"))?;
        let data = decode::<Claims>(token, &state.keys.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|_| ServerError::Unauthorized("Invalid or expired token"))?;
        let id = data
            .claims
            .sub
            .parse()
            .map_err(|_| ServerError::Unauthorized("Invalid or expired token"))?;
        Ok(AuthUser {
            id,
            email: data.claims.email,
        })
    }
}

pub fn app() -> Router {
    app_with_secret(DEFAULT_JWT_SECRET)
}

pub fn app_with_secret(jwt_secret: &str) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/todo", get(list_todos).post(create_todo))
        .route("/todo/{id}", put(update_todo).delete(delete_todo))
        .with_state(AppState::new(jwt_secret))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_secret(listener: TcpListener, jwt_secret: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_secret(jwt_secret)).await
}

fn hash_password(email: &str, password: &str) -> String {
    format!("{:x}", Sha256::digest(format!("{email}:{password}").as_bytes()))
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisteredUser>), ServerError> {
    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(ServerError::BadRequest("Email and password are required"));
    }
    let mut db = state.db.write().await;
    if db.users.contains_key(&input.email) {
        return Err(ServerError::Conflict);
    }
    db.next_user_id += 1;
    let user = User {
        id: db.next_user_id,
        email: input.email.clone(),
        password_hash: hash_password(&input.email, &input.password),
    };
    let body = RegisteredUser {
        id: user.id,
        email: user.email.clone(),
    };
    db.users.insert(input.email, user);
    info!(user_id = body.id, "registered user");
    Ok((StatusCode::CREATED, Json(body)))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> Result<Json<TokenResponse>, ServerError> {
    let db = state.db.read().await;
    let user = db
        .users
        .get(&input.email)
        .filter(|user| user.password_hash == hash_password(&input.email, &input.password))
        .ok_or_else(|| {
            warn!("rejected login");
            ServerError::Unauthorized("Invalid email or password")
        })?;

    let now = jsonwebtoken::get_current_timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    let token = encode(&Header::new(Algorithm::HS256), &claims, &state.keys.encoding)?;
    info!(user_id = user.id, "issued token");
    Ok(Json(TokenResponse { token }))
}

async fn list_todos(State(state): State<AppState>, user: AuthUser) -> Json<Vec<Todo>> {
    let db = state.db.read().await;
    Json(
        db.todos
            .values()
            .filter(|stored| stored.owner == user.id)
            .map(|stored| stored.todo.clone())
            .collect(),
    )
}

async fn create_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<TodoInput>,
) -> (StatusCode, Json<Todo>) {
    let mut db = state.db.write().await;
    db.next_todo_id += 1;
    let todo = Todo {
        id: db.next_todo_id,
        title: input.title,
        is_done: input.is_done,
    };
    db.todos.insert(
        todo.id,
        StoredTodo {
            owner: user.id,
            todo: todo.clone(),
        },
    );
    info!(user = %user.email, todo_id = todo.id, "created todo");
    (StatusCode::CREATED, Json(todo))
}

async fn update_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<TodoInput>,
) -> Result<Json<Todo>, ServerError> {
    let mut db = state.db.write().await;
    let stored = db
        .todos
        .get_mut(&id)
        .filter(|stored| stored.owner == user.id)
        .ok_or(ServerError::NotFound)?;
    stored.todo.title = input.title;
    stored.todo.is_done = input.is_done;
    Ok(Json(stored.todo.clone()))
}

async fn delete_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    let mut db = state.db.write().await;
    let owned = db.todos.get(&id).is_some_and(|stored| stored.owner == user.id);
    if !owned {
        return Err(ServerError::NotFound);
    }
    db.todos.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}
