//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (user_id) {
        user_id -> Uuid,
        #[max_length = 255]
        first_name -> Varchar,
        #[max_length = 255]
        last_name -> Nullable<Varchar>,
        /// Login handle; unique.
        #[max_length = 255]
        email -> Varchar,
        /// PHC-encoded Argon2id hash.
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Document metadata. Bytes live in the object store under `file_path`.
    documents (document_id) {
        document_id -> Uuid,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        original_name -> Varchar,
        user_id -> Uuid,
        file_path -> Text,
        file_size -> Int8,
        #[max_length = 255]
        mime_type -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(documents -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(documents, users);
