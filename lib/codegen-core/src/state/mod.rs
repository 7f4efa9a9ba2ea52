pub mod schema_state;
