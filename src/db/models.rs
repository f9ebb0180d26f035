use super::schema::*;

#[derive(Debug)]
#[derive(Queryable, Insertable)]
#[table_name = "clients"]
pub struct Client {
    pub client_id: String,
    pub name: String,
    pub website: String,
    pub logo: String,
    pub redirect_uri: String,
    pub secret_hash: String,
    pub code: Option<String>,
    pub code_redirect_uri: Option<String>,
    pub code_scope: Option<String>,
    pub code_invalid_after: Option<i64>,
}

#[derive(Debug)]
#[derive(Queryable, Insertable)]
#[table_name = "pending_authorizations"]
pub struct PendingAuthorization {
    pub session_token: String,
    pub code: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub state: String,
    pub created_at: i64,
    pub invalid_after: i64,
}
