table! {
    clients (client_id) {
        client_id -> Text,
        name -> Text,
        website -> Text,
        logo -> Text,
        redirect_uri -> Text,
        secret_hash -> Text,
        code -> Nullable<Text>,
        code_redirect_uri -> Nullable<Text>,
        code_scope -> Nullable<Text>,
        code_invalid_after -> Nullable<Int8>,
    }
}

table! {
    pending_authorizations (session_token) {
        session_token -> Text,
        code -> Text,
        client_id -> Text,
        redirect_uri -> Text,
        scope -> Text,
        state -> Text,
        created_at -> Int8,
        invalid_after -> Int8,
    }
}

joinable!(pending_authorizations -> clients (client_id));

allow_tables_to_appear_in_same_query!(clients, pending_authorizations);
